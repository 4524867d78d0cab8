//! Signature result cache.
//!
//! An entry's presence means the signature it was computed from has been
//! proven valid. Entries are only inserted after a proof, so a hit is
//! authoritative and never needs re-checking.

use lru::LruCache;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use sigbatch_types::Hash;
use std::fmt;
use std::num::NonZeroUsize;

/// Default memory budget for the signature cache: 32 MiB.
pub const DEFAULT_SIGNATURE_CACHE_BYTES: usize = 32 << 20;

/// Domain tag mixed into every entry so entries cannot collide with other
/// keyed hashes sharing the salt.
const ENTRY_DOMAIN: &[u8] = b"sigbatch/ed25519-entry";

/// Thread-safe store of proven-valid signatures.
///
/// Implementations are shared between many verifiers and checkers and must
/// not call back into a [`crate::BatchVerifier`] from `insert`: commit actions
/// run while the verifier's lock is held.
pub trait SignatureCache: Send + Sync {
    /// Derive the cache entry for a (digest, signature, public key) triple.
    fn compute_entry(&self, digest: &Hash, signature: &[u8], public_key: &[u8]) -> Hash;

    fn lookup(&self, entry: &Hash) -> bool;

    fn insert(&self, entry: Hash);

    fn erase(&self, entry: &Hash);
}

/// Bounded, salted LRU signature cache.
pub struct SignatureResultCache {
    salt: [u8; 32],
    entries: Mutex<LruCache<Hash, ()>>,
}

impl SignatureResultCache {
    /// Create a cache with a fresh random salt and a memory budget in bytes.
    pub fn new(max_bytes: usize) -> Self {
        let mut salt = [0u8; 32];
        OsRng.fill_bytes(&mut salt);
        Self::with_salt(salt, max_bytes)
    }

    /// Create a cache with a fixed salt.
    pub fn with_salt(salt: [u8; 32], max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(max_bytes / Hash::LEN).unwrap_or(NonZeroUsize::MIN);
        tracing::debug!(entries = capacity.get(), "Signature cache created");
        Self {
            salt,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Maximum number of entries held before the least recently used is evicted.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for SignatureResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_CACHE_BYTES)
    }
}

impl SignatureCache for SignatureResultCache {
    fn compute_entry(&self, digest: &Hash, signature: &[u8], public_key: &[u8]) -> Hash {
        Hash::compute_keyed(
            &self.salt,
            &[ENTRY_DOMAIN, digest.as_bytes(), signature, public_key],
        )
    }

    fn lookup(&self, entry: &Hash) -> bool {
        self.entries.lock().get(entry).is_some()
    }

    fn insert(&self, entry: Hash) {
        self.entries.lock().put(entry, ());
    }

    fn erase(&self, entry: &Hash) {
        self.entries.lock().pop(entry);
    }
}

impl fmt::Debug for SignatureResultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("SignatureResultCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}
