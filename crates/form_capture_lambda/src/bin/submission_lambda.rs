use form_capture_lambda::adapters::key_generator::UuidV4Generator;
use form_capture_lambda::adapters::s3_object_store::S3ObjectStore;
use form_capture_lambda::config::HandlerConfig;
use form_capture_lambda::handlers::submission::handle_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_ansi(false)
        .with_target(false)
        .with_current_span(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = HandlerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    info!(
        component = "submission_lambda",
        event = "configured",
        bucket = %config.s3_bucket,
        additional_fields = ?config.additional_fields.names()
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore::new(
        config.s3_bucket.clone(),
        aws_sdk_s3::Client::new(&aws_config),
    );
    let key_generator = UuidV4Generator;

    let config = &config;
    let store = &store;
    let key_generator = &key_generator;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(handle_event(event.payload, config, store, key_generator))
    }))
    .await
}
