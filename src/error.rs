use actix_multipart::MultipartError as MULTIPART_ERROR;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use base64::DecodeError as BASE64_DECODE_ERROR;
use ece::Error as ECE_ERROR;
use jsonwebtoken::errors::Error as JWT_ERROR;
use reqwest::header::InvalidHeaderValue as INVALID_HEADER_VALUE;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use std::{io::Error as IO_ERROR, num::ParseIntError};
use thiserror::Error;
use tokio::{sync::AcquireError as ACQUIRE_ERROR, task::JoinError};
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    Base64DecodeError(#[from] BASE64_DECODE_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    InvalidHeaderValue(#[from] INVALID_HEADER_VALUE),

    #[error("Invalid option {option}")]
    InvalidOption { option: String },

    #[error("{0}")]
    EceError(#[from] ECE_ERROR),

    #[error("{0}")]
    JWT(#[from] JWT_ERROR),

    #[error("Push failed: {status} {reason}")]
    PushFailed { status: u16, reason: String },

    #[error("{0}")]
    Multipart(#[from] MULTIPART_ERROR),

    #[error("{0}")]
    AcquireError(#[from] ACQUIRE_ERROR),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - client sent invalid input
            Error::BadRequest(_)
            | Error::Multipart(_)
            | Error::InvalidOption { .. } => StatusCode::BAD_REQUEST,

            // 502 Bad Gateway - push service error
            Error::ReqwestError(_) | Error::PushFailed { .. } => {
                StatusCode::BAD_GATEWAY
            },

            // 500 Internal Server Error - everything else
            Error::Io(_)
            | Error::URL(_)
            | Error::INT(_)
            | Error::TokioJoinError(_)
            | Error::Base64DecodeError(_)
            | Error::ConfigurationError(_)
            | Error::JsonError(_)
            | Error::SetGlobalDefaultError(_)
            | Error::InvalidHeaderValue(_)
            | Error::EceError(_)
            | Error::JWT(_)
            | Error::AcquireError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": self.to_string(),
            "status": status.as_u16(),
        });
        HttpResponse::build(status).json(body)
    }
}
