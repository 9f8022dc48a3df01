/// Error types shared by the storage layer and the domain services
///
/// # Taxonomy
///
/// - `Validation`: input rejected, with field-level messages
/// - `NotFound`: the addressed entity id does not exist
/// - `Storage`: backend I/O failure (network, parse, filesystem)
/// - `Configuration`: remote backend selected without endpoint/credential
///
/// Adapters never swallow errors and the storage facade propagates them
/// verbatim. The legacy migration engine is the only component that catches
/// errors and reports them as a value instead.
use validator::ValidationErrors;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Entity id not present
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "organization")
        entity: &'static str,

        /// The id that was looked up
        id: String,
    },

    /// Backend I/O failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid deployment configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Creates a not-found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Storage backend errors
///
/// Each variant carries the underlying cause so callers can decide on a
/// retry policy. Nothing in the storage layer retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Remote (PostgreSQL) call failed
    #[error("Remote storage error during {operation}: {source}")]
    Remote {
        /// What the adapter was doing (e.g. "list groups")
        operation: String,

        #[source]
        source: sqlx::Error,
    },

    /// A stored collection could not be (de)serialized
    #[error("Failed to (de)serialize `{key}`: {source}")]
    Serialization {
        key: String,

        #[source]
        source: serde_json::Error,
    },

    /// Local store filesystem failure
    #[error("Local storage I/O error on `{key}`: {source}")]
    Io {
        key: String,

        #[source]
        source: std::io::Error,
    },

    /// Key contains characters the local store cannot address
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// A lock guarding the local store was poisoned by a panicking writer
    #[error("Local storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Builds a closure mapping a sqlx error into `StorageError::Remote`
    pub(crate) fn remote(operation: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let operation = operation.into();
        move |source| StorageError::Remote { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("organization", "abc123");
        assert_eq!(err.to_string(), "organization not found: abc123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: Error = StorageError::InvalidKey("../etc".to_string()).into();
        assert_eq!(err.to_string(), "Invalid storage key: ../etc");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_remote_error_carries_operation() {
        let err = StorageError::remote("list groups")(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("Remote storage error during list groups"));
    }
}
