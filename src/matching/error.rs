//! Matching error types.

use thiserror::Error;

/// Structural failures of the selector. Per-point classification misses are
/// never errors; they surface as unmapped points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The catalog holds no candidate to compare against.
    #[error("no ideal function available for training series '{training}'")]
    EmptyCatalog { training: String },

    /// A training series and a candidate are not sampled on the same x domain.
    #[error(
        "training series '{training}' ({training_len} samples) and ideal function \
         '{candidate}' ({candidate_len} samples) do not share an x domain"
    )]
    DomainMismatch {
        training: String,
        candidate: String,
        training_len: usize,
        candidate_len: usize,
    },

    /// Every candidate produced a non-finite squared error.
    #[error("no ideal function has a finite squared error for training series '{training}'")]
    NoAdmissibleCandidate { training: String },
}

/// Result type for matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_message() {
        let error = MatchError::EmptyCatalog {
            training: "y1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no ideal function available for training series 'y1'"
        );
    }

    #[test]
    fn test_domain_mismatch_message() {
        let error = MatchError::DomainMismatch {
            training: "y2".to_string(),
            candidate: "y17".to_string(),
            training_len: 400,
            candidate_len: 399,
        };
        assert_eq!(
            error.to_string(),
            "training series 'y2' (400 samples) and ideal function 'y17' (399 samples) \
             do not share an x domain"
        );
    }

    #[test]
    fn test_error_is_std_error() {
        let error: Box<dyn std::error::Error> = Box::new(MatchError::NoAdmissibleCandidate {
            training: "y3".to_string(),
        });
        assert!(error.to_string().contains("'y3'"));
    }
}
