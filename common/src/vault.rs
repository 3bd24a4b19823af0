//! Vault levels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClaimRootError, Result};

/// A tiered rank attribute carried by members, blocks and receipts.
///
/// Levels run from 1 (BRONZE) to 7 (NEXUS_SOVEREIGN) and have no effect on
/// voting arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VaultLevel(u8);

impl VaultLevel {
    /// Lowest level, assigned to members by default.
    pub const BRONZE: VaultLevel = VaultLevel(1);
    /// Highest level, used for blocks and receipts.
    pub const NEXUS_SOVEREIGN: VaultLevel = VaultLevel(7);

    /// Create a vault level, rejecting values outside 1..=7.
    pub fn new(level: u8) -> Result<Self> {
        if (1..=7).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ClaimRootError::InvalidVaultLevel(level))
        }
    }

    /// Numeric level.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Display name of the level.
    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "BRONZE",
            2 => "SILVER",
            3 => "GOLD",
            4 => "PLATINUM",
            5 => "DIAMOND",
            6 => "EMERALD",
            _ => "NEXUS_SOVEREIGN",
        }
    }
}

impl Default for VaultLevel {
    fn default() -> Self {
        Self::BRONZE
    }
}

impl TryFrom<u8> for VaultLevel {
    type Error = ClaimRootError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<VaultLevel> for u8 {
    fn from(level: VaultLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for VaultLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}
