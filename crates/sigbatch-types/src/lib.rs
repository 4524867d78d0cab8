//! Sigbatch Types - Value types shared by the sigbatch crates.
//!
//! This crate provides:
//! - `Hash` (32-byte digests: message digests and signature cache entries)
//! - `Ed25519PublicKey` and `Ed25519Signature` in their wire encodings

pub mod hash;
pub mod signature;
pub mod error;

pub use hash::Hash;
pub use signature::{Ed25519PublicKey, Ed25519Signature};
pub use error::TypesError;

