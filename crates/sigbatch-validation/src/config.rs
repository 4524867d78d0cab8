//! Validation configuration.
//!
//! Loaded from TOML; every field has a default so a partial file is valid.

use crate::cache::{SignatureResultCache, DEFAULT_SIGNATURE_CACHE_BYTES};
use crate::verifier::BatchVerifier;
use serde::{Deserialize, Serialize};
use sigbatch_crypto::{Ed25519Accumulator, MAX_BATCH_SIZE};
use sigbatch_types::Hash;
use std::path::Path;

/// Signature validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Signatures per batch, at most `MAX_BATCH_SIZE`
    pub batch_capacity: usize,
    /// Memory budget of the signature result cache in bytes
    pub signature_cache_bytes: usize,
    /// Cache signatures proven by individual checks
    pub store_signatures: bool,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            batch_capacity: MAX_BATCH_SIZE,
            signature_cache_bytes: DEFAULT_SIGNATURE_CACHE_BYTES,
            store_signatures: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::from_toml_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to load config file '{}': {}", path.display(), e))
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: ValidationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_capacity == 0 || self.batch_capacity > MAX_BATCH_SIZE {
            anyhow::bail!(
                "batch_capacity must be between 1 and {}, got {}",
                MAX_BATCH_SIZE,
                self.batch_capacity
            );
        }

        let cache_entries = self.signature_cache_bytes / Hash::LEN;
        if cache_entries < self.batch_capacity {
            anyhow::bail!(
                "signature_cache_bytes must hold at least one full batch ({} entries, {} bytes), got {}",
                self.batch_capacity,
                self.batch_capacity * Hash::LEN,
                self.signature_cache_bytes
            );
        }

        Ok(())
    }

    pub fn build_cache(&self) -> SignatureResultCache {
        SignatureResultCache::new(self.signature_cache_bytes)
    }

    pub fn build_verifier(&self) -> BatchVerifier<Ed25519Accumulator> {
        BatchVerifier::with_capacity(self.batch_capacity)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter directive (e.g. "info", "sigbatch_validation=debug")
    pub level: String,
    /// Emit JSON instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
