//! Errors raised at the collaborator boundary
//!
//! The simulation itself never fails; illegal actions are rejected silently.
//! These errors come from storage and outer-shell resources and are logged
//! and recovered by the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Backend unreachable or an I/O failure
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),

    /// A stored record had a field that could not be interpreted
    #[error("invalid profile data in field `{field}`")]
    InvalidProfileData { field: String },

    /// Asset or collaborator absent
    #[error("resource missing: {0}")]
    ResourceMissing(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
