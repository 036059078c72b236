//! Error taxonomy for ranking operations.

use thiserror::Error;

/// Errors surfaced by the ranking engine.
///
/// Empty corpora are never an error; they produce empty results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankError {
    /// The target article of a similarity lookup does not exist.
    #[error("article not found: {0}")]
    NotFound(i64),

    /// A parameter is outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Check that a result-size limit is at least 1.
pub fn validate_limit(name: &str, limit: usize) -> Result<(), RankError> {
    if limit == 0 {
        return Err(RankError::InvalidParameter(format!("{} must be >= 1", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_invalid() {
        let err = validate_limit("limit", 0).unwrap_err();
        assert_eq!(err, RankError::InvalidParameter("limit must be >= 1".into()));
        assert!(validate_limit("limit", 1).is_ok());
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(RankError::NotFound(42).to_string(), "article not found: 42");
    }
}
