use actix_web::{post, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{reply_value, Status},
};

#[post("/reply")]
pub async fn index(
    state: web::Data<AppState<State>>,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let data = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&body)
            .map_err(|e| Error::BadRequest(e.to_string()))?
    };

    let minutes = reply_value(data.get("minutes"));
    let message = format!("I'll be there in {} minutes.", minutes);

    info!("Received reply: {}", message);
    state.mailbox.set(message);

    Ok(HttpResponse::Ok().json(Response {
        status: String::from(Status::Received),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
}
