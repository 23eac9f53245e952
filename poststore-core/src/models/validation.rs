//! Validation error types

use std::fmt;

/// Validation error for a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Id field is not a well-formed id
    InvalidId { field: &'static str },

    /// Timestamp that must be set is zero or negative
    InvalidTimestamp { field: &'static str },

    /// Reply names a parent but no thread root
    MissingRoot,

    /// Field could not be serialized for storage
    InvalidFormat { field: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidId { field } => write!(f, "{} is not a valid id", field),
            Self::InvalidTimestamp { field } => write!(f, "{} must be set", field),
            Self::MissingRoot => write!(f, "root_id must be set when parent_id is set"),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "hashtags",
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "hashtags exceeds maximum length of 1000 characters"
        );
        assert_eq!(
            ValidationError::InvalidId { field: "user_id" }.to_string(),
            "user_id is not a valid id"
        );
    }
}
