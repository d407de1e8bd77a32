use actix_web::{post, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{is_empty_document, Status},
};

#[post("/subscribe")]
pub async fn index(
    state: web::Data<AppState<State>>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let subscription = serde_json::from_slice::<Value>(&body)
        .ok()
        .filter(|value| !is_empty_document(value));

    let Some(subscription) = subscription else {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: String::from("No subscription data"),
        }));
    };

    if state.store.save(subscription).await? {
        info!("New push subscription stored");
    }

    Ok(HttpResponse::Ok().json(Response {
        status: String::from(Status::Success),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
