/// Errors raised by the runtime's own plumbing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("{type_name} must be provided by the root view before it is used")]
    MissingContext { type_name: &'static str },
}

/// Failures of a [`Storage`](crate::platform::Storage) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to persist `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode `{key}`: {message}")]
    Encode { key: String, message: String },
}
