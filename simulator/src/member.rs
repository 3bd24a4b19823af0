//! Simulated members.

use claimroot_common::{Address, VaultLevel};
use claimroot_governance::MemberProfile;
use rand::Rng;
use rust_decimal::Decimal;

/// A member the simulator registers and votes on behalf of.
#[derive(Debug, Clone)]
pub struct SimulatedMember {
    pub address: Address,
    pub profile: MemberProfile,
}

impl SimulatedMember {
    pub fn new(address: impl Into<Address>, name: &str, voting_power: Decimal) -> Self {
        Self {
            address: address.into(),
            profile: MemberProfile::new(name, "Member").with_voting_power(voting_power),
        }
    }
}

/// Member factory for random runs.
pub struct MemberFactory;

impl MemberFactory {
    /// Create `count` members with random voting power and vault level.
    ///
    /// The first member always clears the default proposal threshold so a
    /// random run can open proposals.
    pub fn create_members(count: usize, rng: &mut impl Rng) -> Vec<SimulatedMember> {
        let names = [
            ("STEWARD_A", "Amara Grove"),
            ("STEWARD_B", "Bongani Reed"),
            ("STEWARD_C", "Chen Orchard"),
            ("STEWARD_D", "Dara Fields"),
            ("STEWARD_E", "Esi Harbor"),
            ("STEWARD_F", "Farid Stone"),
        ];

        (0..count)
            .map(|i| {
                let (address, name) = match names.get(i) {
                    Some((address, name)) => (address.to_string(), name.to_string()),
                    None => (format!("STEWARD_{}", i + 1), format!("Steward {}", i + 1)),
                };

                let power = if i == 0 {
                    rng.gen_range(1_000..5_000)
                } else {
                    rng.gen_range(100..3_000)
                };
                let level = VaultLevel::new(rng.gen_range(1..=7)).unwrap_or_default();

                let mut member = SimulatedMember::new(address, &name, Decimal::from(power));
                member.profile = member.profile.with_vault_level(level);
                member
            })
            .collect()
    }
}
