use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;

use crate::adapters::object_store::{ObjectStore, StoreError};

pub const JSON_CONTENT_TYPE: &str = "application/json";
const UNKNOWN_PROVIDER_CODE: &str = "Unknown";

pub struct S3ObjectStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(bucket: impl Into<String>, s3_client: aws_sdk_s3::Client) -> Self {
        Self {
            bucket: bucket.into(),
            s3_client,
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type(JSON_CONTENT_TYPE)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(store_error_from_sdk)
            })
        })
    }
}

/// Service answers keep their error code; everything else is a transport failure.
pub fn store_error_from_sdk<E, R>(error: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match error {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            StoreError::provider(
                service_error.code().unwrap_or(UNKNOWN_PROVIDER_CODE),
                service_error.message().unwrap_or_default(),
            )
        }
        other => StoreError::Transport(DisplayErrorContext(&other).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::put_object::PutObjectError;

    use super::*;

    #[test]
    fn service_errors_map_to_provider_code() {
        let error = SdkError::<PutObjectError, ()>::service_error(
            PutObjectError::generic(
                ErrorMetadata::builder()
                    .code("SlowDown")
                    .message("Please reduce your request rate.")
                    .build(),
            ),
            (),
        );

        assert_eq!(
            store_error_from_sdk(error),
            StoreError::provider("SlowDown", "Please reduce your request rate.")
        );
    }

    #[test]
    fn service_errors_without_code_use_unknown() {
        let error = SdkError::<PutObjectError, ()>::service_error(
            PutObjectError::generic(ErrorMetadata::builder().build()),
            (),
        );

        assert_eq!(store_error_from_sdk(error).code(), Some(UNKNOWN_PROVIDER_CODE));
    }

    #[test]
    fn construction_failures_map_to_transport() {
        let error = SdkError::<PutObjectError, ()>::construction_failure("bucket is required");

        let StoreError::Transport(message) = store_error_from_sdk(error) else {
            panic!("construction failure should be a transport error");
        };
        assert!(message.contains("bucket is required"));
    }
}
