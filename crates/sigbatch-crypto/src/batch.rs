//! Bounded batch accumulators.
//!
//! An accumulator collects (signature, digest, public key) triples and proves
//! them all valid with one randomized multi-scalar multiplication. It is a
//! capability object: callers see only whether it is usable, whether an add
//! was accepted, and whether a verification succeeded.

use ed25519_consensus::{batch, Signature, VerificationKey, VerificationKeyBytes};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sigbatch_types::{Ed25519Signature, Hash};
use std::fmt;

/// Largest batch for which the multi-scalar multiplication stays on Straus'
/// algorithm.
///
/// Every queued signature contributes two points (`R` and `A`) and the batch
/// shares one basepoint term. `ed25519-consensus` evaluates the equation with
/// `curve25519-dalek-ng`, which switches to Pippenger at 190 points, and
/// `2 * 94 + 1 = 189`. Changing the backend means re-deriving this.
pub const MAX_BATCH_SIZE: usize = 94;

/// A bounded accumulator of signatures awaiting one batch verification.
///
/// Destroying an accumulator is dropping it.
pub trait BatchAccumulator: Send {
    /// Parsed public key accepted by [`BatchAccumulator::add`].
    type PublicKey;

    /// Create an accumulator holding at most `capacity` signatures.
    ///
    /// `nonce` seeds the random weights of the batch equation; without it an
    /// attacker could craft invalid signatures whose errors cancel out.
    fn new(capacity: usize, nonce: [u8; 32]) -> Self
    where
        Self: Sized;

    /// Decode a public key, returning `None` for malformed encodings.
    fn parse_public_key(bytes: &[u8]) -> Option<Self::PublicKey>;

    /// Whether the accumulator can still accept signatures.
    fn is_usable(&self) -> bool;

    /// Queue one signature. Returns `false` if it was not accepted.
    fn add(&mut self, signature: &[u8], digest: &Hash, public_key: &Self::PublicKey) -> bool;

    /// Verify every queued signature, consuming the batch on success.
    fn verify(&mut self) -> bool;

    /// Number of signatures currently queued.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// Ed25519 batch accumulator backed by `ed25519-consensus`.
///
/// When an add arrives while the batch is full, the held batch is verified
/// first. A failed verification, explicit or implicit, poisons the
/// accumulator: it stays unusable and every later `verify` fails.
pub struct Ed25519Accumulator {
    verifier: batch::Verifier,
    len: usize,
    capacity: usize,
    rng: ChaCha20Rng,
    usable: bool,
}

impl Ed25519Accumulator {
    /// Create an accumulator seeded from the operating system RNG.
    pub fn with_random_nonce(capacity: usize) -> Self {
        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);
        <Self as BatchAccumulator>::new(capacity, nonce)
    }
}

impl BatchAccumulator for Ed25519Accumulator {
    type PublicKey = VerificationKey;

    fn new(capacity: usize, nonce: [u8; 32]) -> Self {
        Self {
            verifier: batch::Verifier::new(),
            len: 0,
            capacity: capacity.clamp(1, MAX_BATCH_SIZE),
            rng: ChaCha20Rng::from_seed(nonce),
            usable: true,
        }
    }

    fn parse_public_key(bytes: &[u8]) -> Option<VerificationKey> {
        VerificationKey::try_from(bytes).ok()
    }

    fn is_usable(&self) -> bool {
        self.usable
    }

    fn add(&mut self, signature: &[u8], digest: &Hash, public_key: &VerificationKey) -> bool {
        if !self.usable {
            return false;
        }
        let Ok(signature) = Ed25519Signature::from_slice(signature) else {
            return false;
        };
        if self.len >= self.capacity && !self.verify() {
            return false;
        }

        let key_bytes: VerificationKeyBytes = (*public_key).into();
        let item = batch::Item::from((
            key_bytes,
            Signature::from(*signature.as_bytes()),
            digest.as_bytes(),
        ));
        self.verifier.queue(item);
        self.len += 1;
        true
    }

    fn verify(&mut self) -> bool {
        if !self.usable {
            return false;
        }
        if self.len == 0 {
            return true;
        }

        let verifier = std::mem::replace(&mut self.verifier, batch::Verifier::new());
        self.len = 0;
        if verifier.verify(&mut self.rng).is_err() {
            self.usable = false;
        }
        self.usable
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for Ed25519Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Accumulator")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("usable", &self.usable)
            .finish()
    }
}
