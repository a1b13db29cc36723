use image_labels_shared::config::AppConfig;
use image_labels_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod auth;
mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Validate configuration and initialize AWS clients once at startup
    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_from_env().await;
    let state = AppState::from_aws(config, &sdk_config);

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
