use std::path::Path;

use actix_web::{get, web, HttpResponse, Result};
use tokio::fs;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/sw.js")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<HttpResponse, Error> {
    let path = Path::new(&state.config.static_dir).join("sw.js");
    let script = fs::read(path).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/javascript")
        .body(script))
}
