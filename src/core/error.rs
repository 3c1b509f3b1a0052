//! Error types for the value metadata system
//!
//! This module defines all error types that can occur while converting, comparing,
//! serializing or mapping values.

/// Result type alias for metadata operations
pub type Result<T> = std::result::Result<T, MetaError>;

/// Error types for metadata operations
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// A value could not be parsed or converted under the active rules
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The runtime type of a value does not match the declared type
    #[error("Type mismatch: expecting value of type {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// No descriptor is registered for a type id or name
    #[error("Plugin lookup error: no value metadata registered for type '{0}'")]
    PluginLookup(String),

    /// Indexed storage offset outside the dictionary
    #[error("Index {index} out of range for dictionary of size {size}")]
    IndexOutOfRange { index: i64, size: usize },

    /// Operation only answered by specialized descriptors
    #[error("Unimplemented operation: {0}")]
    Unimplemented(String),

    /// Descriptor is in a state that does not allow the operation
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Stream ended before a complete record was read
    #[error("Unexpected end of stream")]
    Eof,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl MetaError {
    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        MetaError::Conversion(msg.into())
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        MetaError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a new plugin lookup error
    pub fn plugin_lookup<S: Into<String>>(type_desc: S) -> Self {
        MetaError::PluginLookup(type_desc.into())
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: i64, size: usize) -> Self {
        MetaError::IndexOutOfRange { index, size }
    }

    /// Create a new unimplemented operation error
    pub fn unimplemented<S: Into<String>>(msg: S) -> Self {
        MetaError::Unimplemented(msg.into())
    }

    /// Create a new invalid metadata error
    pub fn invalid_metadata<S: Into<String>>(msg: S) -> Self {
        MetaError::InvalidMetadata(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MetaError::Other(msg.into())
    }

    /// Map an IO error, turning a short read into [`MetaError::Eof`]
    pub fn from_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            MetaError::Eof
        } else {
            MetaError::IoError(err)
        }
    }

    /// Check if this is a conversion error
    pub fn is_conversion(&self) -> bool {
        matches!(self, MetaError::Conversion(_))
    }
}
