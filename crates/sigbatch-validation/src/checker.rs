//! Cache-first signature checkers.

use crate::cache::SignatureCache;
use crate::error::ValidationError;
use crate::verifier::{AddOutcome, BatchVerifier, CommitAction};
use sigbatch_crypto::{ed25519, BatchAccumulator, Ed25519Accumulator};
use sigbatch_types::Hash;
use std::sync::Arc;

/// How a signature check was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Found in the signature cache.
    Cached,
    /// Queued into a batch; proven only once that batch verifies.
    Queued,
    /// Cryptographically verified before the call returned.
    Verified,
}

/// Checks signatures one at a time, consulting the cache first.
#[derive(Clone)]
pub struct CachingSignatureChecker {
    cache: Arc<dyn SignatureCache>,
    store: bool,
}

impl CachingSignatureChecker {
    /// `store` controls whether newly verified signatures are cached. When it
    /// is off, a cache hit also erases the entry since it will not be needed
    /// again.
    pub fn new(cache: Arc<dyn SignatureCache>, store: bool) -> Self {
        Self { cache, store }
    }

    pub fn cache(&self) -> &Arc<dyn SignatureCache> {
        &self.cache
    }

    pub fn store(&self) -> bool {
        self.store
    }

    pub fn check_signature(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &Hash,
    ) -> Result<CheckStatus, ValidationError> {
        let entry = self.cache.compute_entry(digest, signature, public_key);
        if self.lookup(&entry) {
            return Ok(CheckStatus::Cached);
        }

        ed25519::verify_bytes(signature, public_key, digest)?;
        if self.store {
            self.cache.insert(entry);
        }
        Ok(CheckStatus::Verified)
    }

    fn lookup(&self, entry: &Hash) -> bool {
        if !self.cache.lookup(entry) {
            return false;
        }
        if !self.store {
            self.cache.erase(entry);
        }
        true
    }
}

/// Checks signatures through a shared [`BatchVerifier`], consulting the cache
/// first.
///
/// A [`CheckStatus::Queued`] result is provisional. The caller must call
/// [`BatchVerifier::verify`] before treating its validation as final, and on
/// failure re-check every signature added since the last successful flush,
/// e.g. with [`BatchingSignatureChecker::revalidate_individually`].
pub struct BatchingSignatureChecker<'a, A: BatchAccumulator = Ed25519Accumulator> {
    inner: CachingSignatureChecker,
    batch: &'a BatchVerifier<A>,
}

impl<'a, A: BatchAccumulator> BatchingSignatureChecker<'a, A> {
    pub fn new(cache: Arc<dyn SignatureCache>, batch: &'a BatchVerifier<A>, store: bool) -> Self {
        Self {
            inner: CachingSignatureChecker::new(cache, store),
            batch,
        }
    }

    pub fn check_signature(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &Hash,
    ) -> Result<CheckStatus, ValidationError> {
        let entry = self.inner.cache.compute_entry(digest, signature, public_key);
        if self.inner.lookup(&entry) {
            return Ok(CheckStatus::Cached);
        }

        let action = CommitAction::new(self.inner.cache.clone(), entry);
        match self.batch.add(signature, public_key, digest, action)? {
            AddOutcome::Queued => Ok(CheckStatus::Queued),
            AddOutcome::Committed { .. } => Ok(CheckStatus::Verified),
        }
    }

    /// Like [`check_signature`](Self::check_signature), but verifies the
    /// signature individually when it could not be queued.
    pub fn check_signature_with_fallback(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &Hash,
    ) -> Result<CheckStatus, ValidationError> {
        match self.check_signature(signature, public_key, digest) {
            Err(e) if e.requires_fallback() => {
                tracing::debug!(error = %e, "Falling back to individual verification");
                self.inner.check_signature(signature, public_key, digest)
            }
            other => other,
        }
    }

    /// Re-check signatures individually after a failed batch.
    ///
    /// Valid signatures are cached when `store` is set. Returns the indices of
    /// the signatures that failed.
    pub fn revalidate_individually<S, K>(&self, items: &[(S, K, Hash)]) -> Vec<usize>
    where
        S: AsRef<[u8]>,
        K: AsRef<[u8]>,
    {
        items
            .iter()
            .enumerate()
            .filter(|(_, (signature, public_key, digest))| {
                self.inner
                    .check_signature(signature.as_ref(), public_key.as_ref(), digest)
                    .is_err()
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn batch(&self) -> &BatchVerifier<A> {
        self.batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SignatureResultCache;
    use sigbatch_crypto::Keypair;
    use sigbatch_types::Ed25519Signature;

    fn cache() -> Arc<SignatureResultCache> {
        Arc::new(SignatureResultCache::with_salt([8u8; 32], 1024 * Hash::LEN))
    }

    fn signed(seed: u8) -> (Ed25519Signature, [u8; 32], Hash) {
        let keypair = Keypair::from_seed(&[seed; 32]);
        let digest = Hash::compute(&[seed, 0xee]);
        (keypair.sign_digest(&digest), *keypair.public_key().as_bytes(), digest)
    }

    #[test]
    fn test_individual_check_caches_when_storing() {
        let cache = cache();
        let checker = CachingSignatureChecker::new(cache.clone(), true);
        let (sig, key, digest) = signed(1);

        assert_eq!(checker.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Verified));
        assert_eq!(checker.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Cached));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_individual_check_without_store_erases_hits() {
        let cache = cache();
        let storing = CachingSignatureChecker::new(cache.clone(), true);
        let reading = CachingSignatureChecker::new(cache.clone(), false);
        let (sig, key, digest) = signed(2);

        storing.check_signature(sig.as_bytes(), &key, &digest).unwrap();
        assert_eq!(reading.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Cached));
        assert!(cache.is_empty());

        assert_eq!(reading.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Verified));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_individual_check_rejects_invalid() {
        let cache = cache();
        let checker = CachingSignatureChecker::new(cache.clone(), true);
        let (sig, key, _) = signed(3);

        let result = checker.check_signature(sig.as_bytes(), &key, &Hash::compute(b"forged"));
        assert!(matches!(result, Err(ValidationError::Crypto(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_batching_check_queues_then_commits() {
        let cache = cache();
        let verifier: BatchVerifier = BatchVerifier::with_capacity(8);
        let checker = BatchingSignatureChecker::new(cache.clone(), &verifier, true);
        let (sig, key, digest) = signed(4);

        assert_eq!(checker.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Queued));
        assert!(cache.is_empty());

        assert_eq!(checker.batch().verify(), Ok(1));
        assert_eq!(checker.check_signature(sig.as_bytes(), &key, &digest), Ok(CheckStatus::Cached));
        assert_eq!(verifier.pending_len(), 0);
    }

    #[test]
    fn test_fallback_on_rejected_signature() {
        let cache = cache();
        let verifier: BatchVerifier = BatchVerifier::with_capacity(8);
        let checker = BatchingSignatureChecker::new(cache.clone(), &verifier, true);
        let (sig, key, digest) = signed(5);

        let short = &sig.as_bytes()[..32];
        assert_eq!(
            checker.check_signature(short, &key, &digest),
            Err(ValidationError::Rejected)
        );
        assert!(matches!(
            checker.check_signature_with_fallback(short, &key, &digest),
            Err(ValidationError::Crypto(_))
        ));
        assert_eq!(verifier.pending_len(), 0);
    }

    #[test]
    fn test_revalidate_individually_reports_bad_indices() {
        let cache = cache();
        let verifier: BatchVerifier = BatchVerifier::with_capacity(8);
        let checker = BatchingSignatureChecker::new(cache.clone(), &verifier, true);

        let (good_sig, good_key, good_digest) = signed(6);
        let (bad_sig, bad_key, _) = signed(7);
        let items = vec![
            (good_sig.as_bytes().to_vec(), good_key, good_digest),
            (bad_sig.as_bytes().to_vec(), bad_key, Hash::compute(b"not what was signed")),
        ];

        assert_eq!(checker.revalidate_individually(&items), vec![1]);
        assert_eq!(cache.len(), 1);
    }
}
