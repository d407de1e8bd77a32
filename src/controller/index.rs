use actix_web::{get, web, HttpResponse, Result};
use tokio::fs;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{formatter, Formatter},
};

/// Landing page. `$0` in the template receives the raw VAPID public key and
/// `$1` the same key as a quoted JavaScript string.
#[get("/")]
pub async fn index(
    state: web::Data<AppState<State>>,
) -> Result<HttpResponse, Error> {
    let template = fs::read_to_string(&state.config.index_template).await?;
    let key = state.config.vapid_public_key.to_owned();

    let page = formatter(
        template,
        &[Formatter::Str(key.to_owned()), Formatter::ParsedStr(key)],
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}
