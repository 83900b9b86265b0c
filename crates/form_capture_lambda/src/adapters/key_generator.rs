use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to generate unique id: {message}")]
pub struct KeyGenerationError {
    pub message: String,
}

impl KeyGenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait KeyGenerator {
    fn generate(&self) -> Result<String, KeyGenerationError>;
}

/// Random (version 4) UUIDs in lowercase hyphenated form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV4Generator;

impl KeyGenerator for UuidV4Generator {
    fn generate(&self) -> Result<String, KeyGenerationError> {
        Ok(Uuid::new_v4().hyphenated().to_string())
    }
}
