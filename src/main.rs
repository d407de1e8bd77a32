use std::sync::Arc;

use tracing::{error, info, Level};

use call_relay::{
    configuration::{get_configuration, set_configuration, AppState, State},
    error::Error,
    provider::HTTP,
    push::WebPush,
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::INFO
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    set_configuration()?;
    let config = get_configuration()?;

    let http = HTTP::new(&config)?;
    let push = WebPush::new(&config, http)?;
    info!(
        "Subscriptions stored in {}",
        config.subscriptions_file.display()
    );

    let state = State::new(config, Arc::new(push));
    let app_state = AppState::new(state);

    server::server_task(&app_state).await
}
