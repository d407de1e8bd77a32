use actix_web::{get, web, Responder, Result};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/poll_reply")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let message = state.mailbox.take_if_present();
    Ok(web::Json(Response { message }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub message: Option<String>,
}
