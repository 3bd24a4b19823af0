//! ClaimRoot Chain Hashing
//!
//! Provides the digest functions used to link ledger blocks and sign
//! receipts. The algorithm is chosen through the [`ChainHasher`] trait so the
//! ledger's block-linking logic never depends on a concrete hash.

pub mod hash;
pub mod checksum;
pub mod hasher;

pub use hash::{sha256, sha256_hex};
pub use checksum::rolling_checksum;
pub use hasher::{ChainHasher, HashAlgorithm, RollingChecksum, Sha256Hasher};

/// Errors from hashing configuration.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
