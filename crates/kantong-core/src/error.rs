use thiserror::Error;

/// Errors that can occur during Kantong core operations.
#[derive(Debug, Error)]
pub enum KantongError {
    /// The training corpus contains no rows.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// A label was not seen when the encoder was fitted.
    #[error("unknown label: {label:?}")]
    UnknownLabel {
        /// The label that has no assigned id.
        label: String,
    },

    /// The vectorizer was used before `fit` built a vocabulary.
    #[error("vectorizer has not been fitted")]
    NotFitted,

    /// Persisted encoder or vectorizer state could not be read or parsed.
    #[error("failed to load state: {0}")]
    StateLoadError(String),

    /// Persisted state could not be written.
    #[error("failed to save state: {0}")]
    StateSaveError(String),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for Kantong core operations.
pub type Result<T> = std::result::Result<T, KantongError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = KantongError::EmptyCorpus;
        assert_eq!(err.to_string(), "corpus is empty");

        let err = KantongError::UnknownLabel {
            label: "hiburan".into(),
        };
        assert!(err.to_string().contains("hiburan"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KantongError>();
    }
}
