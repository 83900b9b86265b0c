#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The storage service answered with a coded error.
    #[error("storage provider error {code}: {message}")]
    Provider { code: String, message: String },
    /// The request never produced a service answer (build, dispatch, timeout, I/O).
    #[error("storage request failed: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Provider { code, .. } => Some(code),
            Self::Transport(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Logged and otherwise treated as a successful write.
    Ignorable,
    Fatal,
}

/// Decides whether a failed write aborts the submission.
///
/// Every provider-coded error is currently tolerated; only errors without a
/// provider answer are fatal. Add a guarded `Provider` arm above the
/// catch-all to make a specific code fatal.
pub fn classify(error: &StoreError) -> Disposition {
    match error {
        StoreError::Provider { .. } => Disposition::Ignorable,
        StoreError::Transport(_) => Disposition::Fatal,
    }
}

pub trait ObjectStore {
    fn put_object(&self, key: &str, body: &[u8]) -> Result<(), StoreError>;
}
