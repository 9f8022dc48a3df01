/// Storage backend configuration
///
/// The backend is chosen once from deployment configuration and never
/// changes for the lifetime of a [`Storage`](crate::storage::Storage) value:
///
/// | production | remote_enabled | backend |
/// |------------|----------------|---------|
/// | true       | any            | Remote  |
/// | false      | true           | Remote  |
/// | false      | false          | Local   |
///
/// Selecting the remote backend without both an endpoint URL and an access
/// credential is a fatal configuration error. There is no silent fallback
/// to local storage.
use crate::db::pool::DatabaseConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which adapter backs the storage facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local key-value store (memory or files on disk)
    Local,

    /// Remote PostgreSQL database
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment configuration for the storage layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Running in a production deployment (forces remote)
    pub production: bool,

    /// Explicit remote-backend flag (forces remote)
    pub remote_enabled: bool,

    /// Remote endpoint, e.g. "postgresql://db.example.com:5432/attendly"
    pub remote_url: Option<String>,

    /// Remote access credential, used as the connection password
    pub remote_key: Option<String>,

    /// Maximum pooled remote connections
    ///
    /// Default: 10
    pub max_connections: Option<u32>,

    /// Directory for the local file store
    ///
    /// None keeps local data in memory only.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Evaluates which backend this configuration selects
    pub fn backend_kind(&self) -> BackendKind {
        if self.production || self.remote_enabled {
            BackendKind::Remote
        } else {
            BackendKind::Local
        }
    }

    /// Checks that a remote selection carries endpoint and credential
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the remote backend is selected and
    /// either the URL or the credential is missing or blank.
    pub fn validate(&self) -> Result<()> {
        if self.backend_kind() == BackendKind::Local {
            return Ok(());
        }

        if is_blank(&self.remote_url) {
            return Err(Error::Configuration(
                "remote backend selected but ATTENDLY_REMOTE_URL is not set".to_string(),
            ));
        }

        if is_blank(&self.remote_key) {
            return Err(Error::Configuration(
                "remote backend selected but ATTENDLY_REMOTE_KEY is not set".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the pool configuration for the remote backend
    ///
    /// # Errors
    ///
    /// Same conditions as [`StorageConfig::validate`].
    pub fn database_config(&self) -> Result<DatabaseConfig> {
        self.validate()?;

        let mut config = DatabaseConfig {
            url: self.remote_url.clone().unwrap_or_default(),
            credential: self.remote_key.clone(),
            ..Default::default()
        };
        if let Some(max_connections) = self.max_connections {
            config.max_connections = max_connections;
        }

        Ok(config)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_ready() -> StorageConfig {
        StorageConfig {
            remote_url: Some("postgresql://localhost/attendly".to_string()),
            remote_key: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_backend_selection_matrix() {
        let mut config = StorageConfig::default();
        assert_eq!(config.backend_kind(), BackendKind::Local);

        config.remote_enabled = true;
        assert_eq!(config.backend_kind(), BackendKind::Remote);

        config.remote_enabled = false;
        config.production = true;
        assert_eq!(config.backend_kind(), BackendKind::Remote);
    }

    #[test]
    fn test_local_needs_no_remote_settings() {
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_remote_without_url_is_fatal() {
        let config = StorageConfig {
            production: true,
            remote_url: None,
            ..remote_ready()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_remote_with_blank_key_is_fatal() {
        let config = StorageConfig {
            remote_enabled: true,
            remote_key: Some("   ".to_string()),
            ..remote_ready()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_database_config_carries_credential() {
        let config = StorageConfig {
            remote_enabled: true,
            max_connections: Some(4),
            ..remote_ready()
        };
        let db = config.database_config().unwrap();
        assert_eq!(db.url, "postgresql://localhost/attendly");
        assert_eq!(db.credential.as_deref(), Some("secret"));
        assert_eq!(db.max_connections, 4);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Local.to_string(), "local");
        assert_eq!(BackendKind::Remote.to_string(), "remote");
    }
}
