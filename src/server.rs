use actix_cors::Cors;
use actix_files::Files;
use actix_web::{dev::Server, http::header, middleware, web, App, HttpServer};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{call, index, poll_reply, reply, service_worker, subscribe},
    error::Error,
    handler::upload::UPLOAD_URL_PREFIX,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

/// Page, service worker and JSON API routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index::index)
        .service(service_worker::index)
        .service(
            web::scope("/api")
                .service(subscribe::index)
                .service(call::index)
                .service(reply::index)
                .service(poll_reply::index),
        );
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;

    info!("Listening on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let app = app_state.clone();
        let static_dir = app_state.config.static_dir.to_owned();
        let upload_dir = app_state.config.upload_dir.to_owned();
        let allowed_cors = String::from("*");
        let cors_access_all =
            app.config.allowed_origins.contains(&allowed_cors);
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                if cors_access_all {
                    return true;
                }
                let allowed = &app.config.allowed_origins;
                if let Ok(origin) = origin.to_str() {
                    return allowed.contains(&origin.to_owned());
                }
                false
            })
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::ACCEPT])
            .allowed_header(header::CONTENT_TYPE);

        App::new()
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes)
            .service(Files::new(UPLOAD_URL_PREFIX, upload_dir))
            .service(Files::new("/static", static_dir))
    })
    .bind((host, port))?
    .run();
    Ok(server)
}
