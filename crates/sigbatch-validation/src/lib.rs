//! Sigbatch Validation - Batched signature checks with a signature result cache.
//!
//! Signatures that miss the cache are queued into a bounded batch owned by a
//! [`BatchVerifier`]. Each queued signature carries a [`CommitAction`] that
//! records it in the cache, and those actions run only after the batch that
//! held the signature has verified. A failed batch drops its actions; the
//! caller re-checks the affected signatures one by one.
//!
//! A validation pass looks like:
//!
//! ```ignore
//! let checker = BatchingSignatureChecker::new(cache.clone(), &verifier, true);
//! for (sig, key, digest) in signatures {
//!     checker.check_signature_with_fallback(sig, key, digest)?;
//! }
//! verifier.verify()?; // flush the partially filled batch
//! ```

pub mod cache;
pub mod checker;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod verifier;

pub use cache::{SignatureCache, SignatureResultCache, DEFAULT_SIGNATURE_CACHE_BYTES};
pub use checker::{BatchingSignatureChecker, CachingSignatureChecker, CheckStatus};
pub use config::{LoggingConfig, ValidationConfig};
pub use error::ValidationError;
pub use verifier::{AddOutcome, BatchVerifier, CommitAction};
