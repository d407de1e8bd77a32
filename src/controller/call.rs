use actix_multipart::Multipart;
use actix_web::{http::header, post, web, HttpRequest, HttpResponse, Result};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        send_push::broadcast,
        upload::{audio_url, save_audio},
    },
    types::CallMessage,
};

const AUDIO_FIELD: &str = "audio";

#[post("/call")]
pub async fn index(
    state: web::Data<AppState<State>>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, Error> {
    let audio = if is_multipart(&req) {
        let multipart = Multipart::new(req.headers(), payload);
        read_audio(state.get_ref(), multipart).await?
    } else {
        None
    };

    let message = CallMessage::new(
        state.config.call_title.to_owned(),
        state.config.call_body.to_owned(),
        audio,
    );

    let results = broadcast(state.get_ref(), &message).await?;

    Ok(HttpResponse::Ok().json(Response {
        results: results.iter().map(|result| result.to_string()).collect(),
    }))
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value.to_ascii_lowercase().starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Stores the `audio` field, if any, and returns its public URL. Other fields
/// are drained and ignored. Clips above `max_audio_bytes` are rejected.
async fn read_audio(
    state: &AppState<State>,
    mut multipart: Multipart,
) -> Result<Option<String>, Error> {
    let limit = state.config.max_audio_bytes;
    let mut url = None;

    while let Some(item) = multipart.next().await {
        let mut field = item?;
        let is_audio = field.name() == Some(AUDIO_FIELD);
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(|name| name.to_owned());

        if !is_audio {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > limit {
                return Err(Error::BadRequest(format!(
                    "Voice clip exceeds {} bytes",
                    limit
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            continue;
        }

        let name =
            save_audio(&state.config.upload_dir, filename.as_deref(), &data)
                .await?;
        info!("Saved voice clip {} ({} bytes)", name, data.len());
        url = Some(audio_url(&name));
    }

    Ok(url)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub results: Vec<String>,
}
