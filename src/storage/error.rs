//! Storage Errors
//!
//! `TigerStyle`: Explicit error types with context.

use thiserror::Error;

/// Errors from backend storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Record not found
    #[error("record not found: {id}")]
    NotFound {
        /// Record ID that was not found
        id: String,
    },

    /// Record already exists (insert-only operations)
    #[error("duplicate key: {id}")]
    AlreadyExists {
        /// Record ID that already exists
        id: String,
    },

    /// Invalid collection or table name
    #[error("invalid collection name: {name}")]
    InvalidCollection {
        /// The rejected name
        name: String,
    },

    /// Connection error
    #[error("connection error: {message}")]
    Connection {
        /// Connection error message
        message: String,
    },

    /// Query error
    #[error("query error: {message}")]
    Query {
        /// Query error message
        message: String,
    },

    /// Serialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Serialization error message
        message: String,
    },

    /// Simulated fault (for DST)
    #[error("simulated fault: {fault_type}")]
    SimulatedFault {
        /// Type of simulated fault
        fault_type: String,
    },

    /// Internal error
    #[error("internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an already exists error.
    #[must_use]
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Create an invalid collection error.
    #[must_use]
    pub fn invalid_collection(name: impl Into<String>) -> Self {
        Self::InvalidCollection { name: name.into() }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a simulated fault error.
    #[must_use]
    pub fn simulated_fault(fault_type: impl Into<String>) -> Self {
        Self::SimulatedFault {
            fault_type: fault_type.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a read error (wraps query error for reads).
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Query {
            message: format!("read: {}", message.into()),
        }
    }

    /// Create a write error (wraps query error for writes).
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Query {
            message: format!("write: {}", message.into()),
        }
    }

    /// Check if this is a transient error (can be retried by callers).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::SimulatedFault { .. })
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
