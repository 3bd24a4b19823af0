//! Member directory types.

use claimroot_common::{Address, Timestamp, VaultLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reputation every member starts with.
pub const INITIAL_REPUTATION: u32 = 100;

/// Registration input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberProfile {
    pub name: String,
    pub role: String,
    /// Defaults to 1 when absent.
    pub voting_power: Option<Decimal>,
    /// Defaults to BRONZE when absent.
    pub vault_level: Option<VaultLevel>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl MemberProfile {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_voting_power(mut self, voting_power: Decimal) -> Self {
        self.voting_power = Some(voting_power);
        self
    }

    pub fn with_vault_level(mut self, vault_level: VaultLevel) -> Self {
        self.vault_level = Some(vault_level);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A registered member. Voting power is fixed at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub address: Address,
    pub name: String,
    pub role: String,
    pub voting_power: Decimal,
    pub reputation: u32,
    pub vault_level: VaultLevel,
    pub registered_at: Timestamp,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Member {
    pub(crate) fn from_profile(address: Address, profile: MemberProfile, registered_at: Timestamp) -> Self {
        Self {
            address,
            name: profile.name,
            role: profile.role,
            voting_power: profile.voting_power.unwrap_or(Decimal::ONE),
            reputation: INITIAL_REPUTATION,
            vault_level: profile.vault_level.unwrap_or_default(),
            registered_at,
            metadata: profile.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimroot_common::now;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profile_defaults() {
        let member = Member::from_profile(Address::new("alice"), MemberProfile::new("Alice", "Steward"), now());

        assert_eq!(member.voting_power, dec!(1));
        assert_eq!(member.vault_level, VaultLevel::BRONZE);
        assert_eq!(member.reputation, 100);
    }

    #[test]
    fn test_profile_overrides() {
        let profile = MemberProfile::new("Heyns", "VaultCommander")
            .with_voting_power(dec!(10000))
            .with_vault_level(VaultLevel::NEXUS_SOVEREIGN);
        let member = Member::from_profile(Address::new("VAULT-COMMANDER-001"), profile, now());

        assert_eq!(member.voting_power, dec!(10000));
        assert_eq!(member.vault_level.value(), 7);
    }
}
