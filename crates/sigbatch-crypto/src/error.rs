use sigbatch_types::TypesError;
use thiserror::Error;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CryptoError {
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Signature verification failed")]
    VerificationFailed,
}

impl From<TypesError> for CryptoError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidPublicKeyLength { .. } => CryptoError::InvalidPublicKey,
            other => CryptoError::InvalidSignature(other.to_string()),
        }
    }
}
