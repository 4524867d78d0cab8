//! Sigbatch Crypto - Signature primitives consumed by the validation core.
//!
//! This crate provides:
//! - Ed25519 key generation and signing
//! - Individual Ed25519 verification (the fallback path)
//! - `BatchAccumulator`, the capability interface over a bounded batch, and
//!   its Ed25519 implementation

pub mod ed25519;
pub mod batch;
pub mod error;

pub use ed25519::{Keypair, verify as ed25519_verify, verify_bytes as ed25519_verify_bytes};
pub use batch::{BatchAccumulator, Ed25519Accumulator, MAX_BATCH_SIZE};
pub use error::CryptoError;
