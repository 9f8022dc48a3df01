//! # Attendly Shared Library
//!
//! This crate contains the storage engine, tenant scoping and business logic
//! used by the Attendly API server.
//!
//! ## Module Organization
//!
//! - `config`: Storage backend configuration and selection
//! - `db`: PostgreSQL pool management and schema migrations
//! - `error`: Common error types
//! - `migration`: One-shot upgrade of legacy single-tenant local data
//! - `models`: Organizations, event dates, groups, members, attendances
//! - `services`: Domain services (id generation, cascades, summaries)
//! - `storage`: Local and remote adapters behind one async facade
//! - `tenant`: Active-organization context for row-level security

pub mod config;
pub mod db;
pub mod error;
pub mod migration;
pub mod models;
pub mod services;
pub mod storage;
pub mod tenant;

pub use error::{Error, Result, StorageError};

/// Current version of the Attendly shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
