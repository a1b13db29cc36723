use aws_lambda_events::event::s3::S3Event;
use image_labels_shared::config::AppConfig;
use image_labels_shared::{ingest, AppState};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    // Configuration and AWS clients are built once per cold start
    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_from_env().await;
    let state = AppState::from_aws(config, &sdk_config);

    run(service_fn(move |event: LambdaEvent<S3Event>| {
        let state = Arc::clone(&state);
        async move { function_handler(event, &state).await }
    }))
    .await
}

async fn function_handler(event: LambdaEvent<S3Event>, state: &AppState) -> Result<(), Error> {
    tracing::info!(
        "S3 event received with {} records (request {})",
        event.payload.records.len(),
        event.context.request_id
    );

    let notifications = ingest::notifications_from_event(&event.payload)?;
    let processed = ingest::process_batch(state, &notifications).await?;

    tracing::info!("✅ Processed {} notifications", processed);
    Ok(())
}
