//! Pluggable chain hashers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::checksum::rolling_checksum;
use crate::hash::sha256_hex;
use crate::CryptoError;

/// Digest strategy used to link blocks and sign receipts.
pub trait ChainHasher: Send + Sync + fmt::Debug {
    /// Algorithm name reported in ledger stats.
    fn name(&self) -> &'static str;

    /// Digest a preimage into a hex string.
    fn digest(&self, preimage: &str) -> String;
}

/// SHA-256 over the UTF-8 preimage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ChainHasher for Sha256Hasher {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, preimage: &str) -> String {
        sha256_hex(preimage.as_bytes())
    }
}

/// The legacy 32-bit rolling checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollingChecksum;

impl ChainHasher for RollingChecksum {
    fn name(&self) -> &'static str {
        "checksum"
    }

    fn digest(&self, preimage: &str) -> String {
        rolling_checksum(preimage)
    }
}

/// Configurable hash algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Checksum,
}

impl HashAlgorithm {
    /// Build the hasher for this algorithm.
    pub fn hasher(&self) -> Arc<dyn ChainHasher> {
        match self {
            HashAlgorithm::Sha256 => Arc::new(Sha256Hasher),
            HashAlgorithm::Checksum => Arc::new(RollingChecksum),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "checksum" | "legacy" => Ok(HashAlgorithm::Checksum),
            other => Err(CryptoError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "sha256"),
            HashAlgorithm::Checksum => write!(f, "checksum"),
        }
    }
}
