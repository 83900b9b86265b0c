use form_capture_core::contract::{ProxyRequest, ProxyResponse};
use form_capture_core::fields::{storage_key, OutputRecord, SerializeError};
use form_capture_core::form::{parse_submission, FormError};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::key_generator::{KeyGenerationError, KeyGenerator};
use crate::adapters::object_store::{classify, Disposition, ObjectStore, StoreError};
use crate::config::HandlerConfig;

const COMPONENT: &str = "submission_handler";

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("error converting proxied request: {0}")]
    Parse(#[from] FormError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    KeyGeneration(#[from] KeyGenerationError),
    #[error("error saving to object store: {0}")]
    Persist(#[from] StoreError),
}

impl SubmissionError {
    pub fn step(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Serialize(_) => "serialize",
            Self::KeyGeneration(_) => "key_generation",
            Self::Persist(_) => "persist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSubmission {
    pub key: String,
    pub field_count: usize,
}

/// Captures one form submission and answers with a redirect.
///
/// Never fails: every error is logged and turned into a redirect to the
/// failure URL.
pub fn handle(
    request: &ProxyRequest,
    config: &HandlerConfig,
    store: &impl ObjectStore,
    key_generator: &impl KeyGenerator,
) -> ProxyResponse {
    match store_submission(request, config, store, key_generator) {
        Ok(stored) => {
            info!(
                component = COMPONENT,
                event = "submission_stored",
                key = %stored.key,
                field_count = stored.field_count
            );
            ProxyResponse::redirect(&config.success_url)
        }
        Err(failure) => {
            error!(
                component = COMPONENT,
                event = "submission_failed",
                step = failure.step(),
                error = %failure
            );
            ProxyResponse::redirect(&config.failure_url)
        }
    }
}

/// Entry point for raw Lambda payloads; events that are not proxy requests
/// also end in the failure redirect.
pub fn handle_event(
    event: Value,
    config: &HandlerConfig,
    store: &impl ObjectStore,
    key_generator: &impl KeyGenerator,
) -> ProxyResponse {
    match serde_json::from_value::<ProxyRequest>(event) {
        Ok(request) => handle(&request, config, store, key_generator),
        Err(parse_error) => {
            error!(
                component = COMPONENT,
                event = "submission_failed",
                step = "event",
                error = %parse_error
            );
            ProxyResponse::redirect(&config.failure_url)
        }
    }
}

pub fn store_submission(
    request: &ProxyRequest,
    config: &HandlerConfig,
    store: &impl ObjectStore,
    key_generator: &impl KeyGenerator,
) -> Result<StoredSubmission, SubmissionError> {
    let submission = parse_submission(request)?;
    debug!(
        component = COMPONENT,
        event = "submission_parsed",
        method = submission.method(),
        content_type = submission.content_type().unwrap_or_default(),
        form_fields = submission.form().len()
    );
    let record = OutputRecord::assemble(submission.form(), &config.additional_fields);
    let body = record.to_json_bytes()?;
    let key = storage_key(&key_generator.generate()?);

    if let Err(store_error) = store.put_object(&key, &body) {
        match classify(&store_error) {
            Disposition::Ignorable => warn!(
                component = COMPONENT,
                event = "store_error_ignored",
                key = %key,
                code = store_error.code().unwrap_or_default(),
                error = %store_error
            ),
            Disposition::Fatal => return Err(store_error.into()),
        }
    }

    Ok(StoredSubmission {
        key,
        field_count: record.field_count(),
    })
}

#[cfg(test)]
mod tests {
    use form_capture_core::fields::FieldList;
    use serde_json::json;

    use super::*;
    use crate::test_support::{
        FailingKeyGenerator, FailingStore, FixedKeyGenerator, RecordingStore,
    };

    fn sample_config() -> HandlerConfig {
        HandlerConfig {
            additional_fields: FieldList::parse("secondary"),
            s3_bucket: "local-bucket".to_string(),
            success_url: "https://success.test.example".to_string(),
            failure_url: "https://failure.test.example".to_string(),
        }
    }

    fn sample_request(body: &str) -> ProxyRequest {
        ProxyRequest::new(
            "POST",
            [("Content-Type", "application/x-www-form-urlencoded")],
            body,
        )
    }

    #[test]
    fn success_redirect_points_at_success_url() {
        let store = RecordingStore::new();
        let response = handle(
            &sample_request("email=x%40y.com&secondary=v1"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        );

        assert_eq!(response.status_code, 302);
        assert_eq!(response.location(), Some("https://success.test.example"));
        assert!(response.body.is_empty());
        assert_eq!(store.keys(), ["fixed-id.json"]);
    }

    #[test]
    fn failure_redirect_points_at_failure_url() {
        let store = RecordingStore::new();
        let response = handle(
            &sample_request("email=%zz"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        );

        assert_eq!(response.status_code, 302);
        assert_eq!(response.location(), Some("https://failure.test.example"));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn malformed_body_fails_at_parse_step() {
        let error = store_submission(
            &sample_request("email=%zz"),
            &sample_config(),
            &RecordingStore::new(),
            &FixedKeyGenerator::new("fixed-id"),
        )
        .expect_err("malformed body should fail");

        assert_eq!(error.step(), "parse");
    }

    #[test]
    fn key_generation_failure_skips_the_write() {
        let store = RecordingStore::new();
        let error = store_submission(
            &sample_request("email=x%40y.com"),
            &sample_config(),
            &store,
            &FailingKeyGenerator,
        )
        .expect_err("key generation failure should fail");

        assert_eq!(error.step(), "key_generation");
        assert!(store.keys().is_empty());
    }

    #[test]
    fn transport_errors_fail_the_persist_step() {
        let store = FailingStore::new(StoreError::Transport("connection reset".to_string()));
        let error = store_submission(
            &sample_request("email=x%40y.com"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        )
        .expect_err("transport error should fail");

        assert_eq!(error.step(), "persist");
        assert_eq!(store.attempts(), 1);
    }

    #[test]
    fn provider_errors_are_tolerated() {
        let store = FailingStore::new(StoreError::provider("SlowDown", "reduce request rate"));
        let response = handle(
            &sample_request("email=x%40y.com"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        );

        assert_eq!(response.location(), Some("https://success.test.example"));
        assert_eq!(store.attempts(), 1);
    }

    #[test]
    fn stored_body_is_the_output_record() {
        let store = RecordingStore::new();
        let stored = store_submission(
            &sample_request("email=x%40y.com&secondary=v1&ignored=nope"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        )
        .expect("submission should be stored");

        assert_eq!(stored.field_count, 2);
        let body = store.body("fixed-id.json").expect("object should be written");
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"email": "x@y.com", "secondary": "v1"}));
    }

    #[test]
    fn raw_events_are_decoded_into_proxy_requests() {
        let store = RecordingStore::new();
        let response = handle_event(
            json!({
                "httpMethod": "POST",
                "headers": {"content-type": "application/x-www-form-urlencoded"},
                "body": "email=x%40y.com",
                "isBase64Encoded": false
            }),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        );

        assert_eq!(response.location(), Some("https://success.test.example"));
        assert_eq!(store.keys(), ["fixed-id.json"]);
    }

    #[test]
    fn non_object_events_redirect_to_failure() {
        let store = RecordingStore::new();
        let response = handle_event(
            json!("not a request"),
            &sample_config(),
            &store,
            &FixedKeyGenerator::new("fixed-id"),
        );

        assert_eq!(response.location(), Some("https://failure.test.example"));
        assert!(store.keys().is_empty());
    }
}
