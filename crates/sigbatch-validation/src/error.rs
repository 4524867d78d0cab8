use sigbatch_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by batched and cached signature checks.
///
/// None of these is fatal. Each one tells the caller which signatures still
/// need an individual check.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Batch accumulator is unusable, {discarded} pending signatures discarded")]
    Unusable { discarded: usize },

    #[error("Invalid public key encoding")]
    InvalidPublicKey,

    #[error("Signature rejected by the batch accumulator")]
    Rejected,

    #[error("Batch verification failed, {discarded} pending signatures discarded")]
    BatchFailed { discarded: usize },

    #[error("Signature check failed: {0}")]
    Crypto(#[from] CryptoError),
}

impl ValidationError {
    /// The signature in hand was not queued and must be verified individually.
    pub fn requires_fallback(&self) -> bool {
        matches!(
            self,
            ValidationError::Unusable { .. }
                | ValidationError::InvalidPublicKey
                | ValidationError::Rejected
        )
    }

    /// A batch was verified and at least one signature in it was invalid.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, ValidationError::BatchFailed { .. })
    }

    /// Number of pending signatures whose commit actions were dropped.
    pub fn discarded(&self) -> usize {
        match self {
            ValidationError::Unusable { discarded } | ValidationError::BatchFailed { discarded } => {
                *discarded
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError::BatchFailed { discarded: 3 };
        assert!(err.to_string().contains("3 pending"));

        let err: ValidationError = CryptoError::VerificationFailed.into();
        assert!(err.to_string().contains("verification failed"));
    }

    #[test]
    fn test_classification() {
        assert!(ValidationError::Rejected.requires_fallback());
        assert!(ValidationError::InvalidPublicKey.requires_fallback());
        assert!(ValidationError::Unusable { discarded: 0 }.requires_fallback());
        assert!(!ValidationError::BatchFailed { discarded: 1 }.requires_fallback());

        assert!(ValidationError::BatchFailed { discarded: 1 }.is_batch_failure());
        assert!(!ValidationError::Unusable { discarded: 2 }.is_batch_failure());
        assert_eq!(ValidationError::Unusable { discarded: 2 }.discarded(), 2);
        assert_eq!(ValidationError::Rejected.discarded(), 0);
    }
}
