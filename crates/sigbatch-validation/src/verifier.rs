//! Batch accumulator controller.
//!
//! Multiplexes signature checks from many threads onto one bounded
//! accumulator. The accumulator and the commit actions of the signatures it
//! holds live behind a single lock so they can never drift apart.

use crate::cache::SignatureCache;
use crate::error::ValidationError;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use sigbatch_crypto::{BatchAccumulator, Ed25519Accumulator, MAX_BATCH_SIZE};
use sigbatch_types::Hash;
use std::fmt;
use std::sync::Arc;

/// Deferred write of a proven signature into the result cache.
#[derive(Clone)]
pub struct CommitAction {
    cache: Arc<dyn SignatureCache>,
    key: Hash,
}

impl CommitAction {
    pub fn new(cache: Arc<dyn SignatureCache>, key: Hash) -> Self {
        Self { cache, key }
    }

    /// Cache entry this action will insert.
    pub fn key(&self) -> &Hash {
        &self.key
    }

    fn commit(self) {
        self.cache.insert(self.key);
    }
}

impl fmt::Debug for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitAction").field("key", &self.key).finish()
    }
}

/// Result of a successful [`BatchVerifier::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Accepted into the batch. Not proven until a later flush succeeds.
    Queued,
    /// This add filled the batch, the batch verified, and `count` commit
    /// actions (this one included) have run.
    Committed { count: usize },
}

struct BatchState<A> {
    accumulator: A,
    pending: Vec<CommitAction>,
}

impl<A: BatchAccumulator> BatchState<A> {
    fn discard(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }

    fn flush(&mut self) -> Result<usize, ValidationError> {
        if !self.accumulator.is_usable() {
            let discarded = self.discard();
            tracing::warn!(discarded, "Batch accumulator unusable, pending signatures dropped");
            return Err(ValidationError::Unusable { discarded });
        }
        debug_assert_eq!(self.accumulator.len(), self.pending.len());

        if !self.accumulator.verify() {
            let discarded = self.discard();
            tracing::warn!(discarded, "Batch verification failed");
            return Err(ValidationError::BatchFailed { discarded });
        }

        let count = self.pending.len();
        for action in self.pending.drain(..) {
            action.commit();
        }
        if count > 0 {
            tracing::debug!(count, "Batch verified, signatures cached");
        }
        Ok(count)
    }
}

/// Owns one batch accumulator and the commit actions of the signatures in it.
///
/// `add` may be called from any number of threads; calls are serialized by
/// an internal lock. Once a logical unit of work (e.g. a block) has issued all
/// of its adds, the caller must [`verify`](BatchVerifier::verify) to flush the
/// partially filled batch.
///
/// An accumulator that becomes unusable stays unusable for the lifetime of
/// the verifier; every later add fails with [`ValidationError::Unusable`].
pub struct BatchVerifier<A: BatchAccumulator = Ed25519Accumulator> {
    state: Mutex<BatchState<A>>,
}

impl<A: BatchAccumulator> BatchVerifier<A> {
    /// Create a verifier with the largest efficient batch size.
    pub fn new() -> Self {
        Self::with_capacity(MAX_BATCH_SIZE)
    }

    /// Create a verifier whose batches hold at most `capacity` signatures.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);
        Self::from_accumulator(A::new(capacity, nonce))
    }

    /// Wrap an already constructed accumulator.
    ///
    /// Every signature in the accumulator must have a commit action, so
    /// signatures it already holds are verified and dropped first. If that
    /// verification fails the verifier starts out unusable.
    pub fn from_accumulator(mut accumulator: A) -> Self {
        if !accumulator.is_empty() {
            let held = accumulator.len();
            let verified = accumulator.verify();
            tracing::warn!(held, verified, "Accumulator was not empty, held signatures flushed");
        }
        let pending = Vec::with_capacity(accumulator.capacity());
        Self {
            state: Mutex::new(BatchState {
                accumulator,
                pending,
            }),
        }
    }

    /// Queue a signature over `digest` for batch verification.
    ///
    /// When this add fills the batch, the batch is verified before returning
    /// and, on success, every pending commit action runs. Any error other than
    /// [`ValidationError::BatchFailed`] means the signature was not queued and
    /// has to be verified individually.
    pub fn add(
        &self,
        signature: &[u8],
        public_key: &[u8],
        digest: &Hash,
        action: CommitAction,
    ) -> Result<AddOutcome, ValidationError> {
        let mut state = self.state.lock();

        if !state.accumulator.is_usable() {
            let discarded = state.discard();
            tracing::warn!(discarded, "Batch accumulator unusable");
            return Err(ValidationError::Unusable { discarded });
        }

        let key = A::parse_public_key(public_key).ok_or(ValidationError::InvalidPublicKey)?;

        if !state.accumulator.add(signature, digest, &key) {
            if !state.accumulator.is_usable() {
                let discarded = state.discard();
                tracing::warn!(discarded, "Batch accumulator became unusable during add");
                return Err(ValidationError::Unusable { discarded });
            }
            tracing::debug!(key = %action.key(), "Signature rejected by batch accumulator");
            return Err(ValidationError::Rejected);
        }

        state.pending.push(action);
        if state.pending.len() < state.accumulator.capacity() {
            return Ok(AddOutcome::Queued);
        }

        let count = state.flush()?;
        Ok(AddOutcome::Committed { count })
    }

    /// Verify everything currently queued.
    ///
    /// Returns the number of commit actions executed. An empty batch verifies
    /// trivially with no side effects. On failure no commit action runs; every
    /// signature added since the last successful flush must be re-checked
    /// individually to find the invalid one.
    pub fn verify(&self) -> Result<usize, ValidationError> {
        self.state.lock().flush()
    }

    /// Number of queued signatures awaiting proof.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Keys of the queued commit actions, in insertion order.
    pub fn pending_keys(&self) -> Vec<Hash> {
        self.state.lock().pending.iter().map(|a| *a.key()).collect()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().accumulator.capacity()
    }

    pub fn is_usable(&self) -> bool {
        self.state.lock().accumulator.is_usable()
    }
}

impl<A: BatchAccumulator> Default for BatchVerifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: BatchAccumulator> fmt::Debug for BatchVerifier<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BatchVerifier")
            .field("pending", &state.pending.len())
            .field("capacity", &state.accumulator.capacity())
            .field("usable", &state.accumulator.is_usable())
            .finish()
    }
}
