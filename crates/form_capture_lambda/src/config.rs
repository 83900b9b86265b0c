use config::{Config, Environment};
use form_capture_core::fields::FieldList;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("{name} must be configured")]
    Blank { name: &'static str },
}

/// Process-wide settings, read once at cold start and shared by every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub additional_fields: FieldList,
    pub s3_bucket: String,
    pub success_url: String,
    pub failure_url: String,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    additional_fields: String,
    #[serde(default)]
    s3_bucket: String,
    #[serde(default)]
    success_url: String,
    #[serde(default)]
    failure_url: String,
}

impl HandlerConfig {
    /// Reads `ADDITIONAL_FIELDS`, `S3_BUCKET`, `SUCCESS_URL` and `FAILURE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(Self {
            additional_fields: FieldList::parse(&raw.additional_fields),
            s3_bucket: required("S3_BUCKET", raw.s3_bucket)?,
            success_url: required("SUCCESS_URL", raw.success_url)?,
            failure_url: required("FAILURE_URL", raw.failure_url)?,
        })
    }
}

fn required(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Blank { name });
    }
    Ok(value)
}
