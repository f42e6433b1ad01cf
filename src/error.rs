//! Error types for hrdesk-access

use thiserror::Error;

/// Unified error type for all access-control operations
#[derive(Error, Debug)]
pub enum AccessError {
    // ─── Access Control ───
    /// A role had no entry in the permission catalog. Catalog misses are
    /// configuration bugs and must surface loudly, never default to a grant.
    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    // ─── Authentication ───
    /// The one message every failed login produces, whatever the cause.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ─── Persistence ───
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─── Infrastructure ───
    #[error("Actor unavailable: {0}")]
    ActorUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience result type
pub type Result<T> = std::result::Result<T, AccessError>;
