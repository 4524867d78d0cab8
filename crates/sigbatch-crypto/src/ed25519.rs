use crate::error::CryptoError;
use ed25519_dalek::Signer;
use rand::rngs::OsRng;
use sigbatch_types::{Ed25519PublicKey, Ed25519Signature, Hash};
use std::fmt;

/// Ed25519 keypair.
/// The signing key is zeroized on drop by `ed25519-dalek`.
pub struct Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let signature = self.signing_key.sign(message);
        Ed25519Signature::from_bytes(signature.to_bytes())
    }

    /// Sign a 32-byte message digest, the form every batched check uses.
    pub fn sign_digest(&self, digest: &Hash) -> Ed25519Signature {
        self.sign(digest.as_bytes())
    }

    /// Export private key bytes (CAUTION: sensitive)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.to_bytes())
    }
}

/// Verify a single Ed25519 signature.
///
/// Uses the same (ZIP-215) acceptance rules as [`crate::Ed25519Accumulator`],
/// so a signature rejected by a batch is rejected here too and vice versa.
pub fn verify(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    let key = ed25519_consensus::VerificationKey::try_from(&public_key.as_bytes()[..])
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let signature = ed25519_consensus::Signature::from(*signature.as_bytes());
    key.verify(&signature, message)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Verify a signature given in raw encodings over a message digest.
///
/// This is the individual fallback a caller runs when a signature could not be
/// batched or when a batch it belonged to failed.
pub fn verify_bytes(
    signature: &[u8],
    public_key: &[u8],
    digest: &Hash,
) -> Result<(), CryptoError> {
    let public_key = Ed25519PublicKey::from_slice(public_key)?;
    let signature = Ed25519Signature::from_slice(signature)?;
    verify(&public_key, digest.as_bytes(), &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);

        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_ne!(kp1.public_key(), Keypair::from_seed(&[43u8; 32]).public_key());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::generate();
        let message = b"Hello, sigbatch!";

        let signature = keypair.sign(message);
        assert_ne!(signature, Ed25519Signature::default());
        assert!(verify(&keypair.public_key(), message, &signature).is_ok());

        let result = verify(&keypair.public_key(), b"Wrong message", &signature);
        assert_eq!(result, Err(CryptoError::VerificationFailed));
    }

    #[test]
    fn test_verify_bytes() {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        let digest = Hash::compute(b"spend");
        let signature = keypair.sign_digest(&digest);

        assert!(verify_bytes(signature.as_bytes(), keypair.public_key().as_bytes(), &digest).is_ok());

        let other = Hash::compute(b"other spend");
        assert_eq!(
            verify_bytes(signature.as_bytes(), keypair.public_key().as_bytes(), &other),
            Err(CryptoError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_bytes_rejects_bad_lengths() {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        let digest = Hash::compute(b"spend");
        let signature = keypair.sign_digest(&digest);

        assert!(matches!(
            verify_bytes(&signature.as_bytes()[..63], keypair.public_key().as_bytes(), &digest),
            Err(CryptoError::InvalidSignature(_))
        ));
        assert_eq!(
            verify_bytes(signature.as_bytes(), &[1u8; 31], &digest),
            Err(CryptoError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_keypair_clone() {
        let kp1 = Keypair::generate();
        let kp2 = kp1.clone();

        assert_eq!(kp1.public_key(), kp2.public_key());

        let msg = b"test";
        assert_eq!(kp1.sign(msg), kp2.sign(msg));
    }
}
