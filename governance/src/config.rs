//! Governance configuration.

use chrono::Duration;
use claimroot_common::constants::{default_execution_delay, default_voting_period};
use claimroot_common::{ClaimRootError, Result};
use claimroot_crypto::HashAlgorithm;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Longest accepted voting period or execution delay: 100 years.
pub const MAX_PERIOD_HOURS: i64 = 100 * 365 * 24;

/// Quorum, threshold and timing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceRules {
    /// Share of total voting power (0-100] that must participate.
    pub quorum_percentage: Decimal,
    /// Hours a proposal stays open for voting.
    pub voting_period_hours: i64,
    /// Minimum voting power needed to open a proposal.
    pub proposal_threshold: Decimal,
    /// Hours between passing and earliest execution.
    pub execution_delay_hours: i64,
}

impl GovernanceRules {
    /// Voting period, clamped to `0..=MAX_PERIOD_HOURS`.
    pub fn voting_period(&self) -> Duration {
        Duration::hours(self.voting_period_hours.clamp(0, MAX_PERIOD_HOURS))
    }

    /// Execution delay, clamped to `0..=MAX_PERIOD_HOURS`.
    pub fn execution_delay(&self) -> Duration {
        Duration::hours(self.execution_delay_hours.clamp(0, MAX_PERIOD_HOURS))
    }

    /// Validate quorum, threshold and timing bounds.
    pub fn validate(&self) -> Result<()> {
        if self.quorum_percentage <= Decimal::ZERO || self.quorum_percentage > Decimal::ONE_HUNDRED {
            return Err(ClaimRootError::ConfigurationError(format!(
                "quorum percentage must be in (0, 100], got {}",
                self.quorum_percentage
            )));
        }

        if self.voting_period_hours <= 0 || self.voting_period_hours > MAX_PERIOD_HOURS {
            return Err(ClaimRootError::ConfigurationError(format!(
                "voting period must be in 1..={MAX_PERIOD_HOURS} hours, got {}",
                self.voting_period_hours
            )));
        }

        if self.proposal_threshold.is_sign_negative() {
            return Err(ClaimRootError::ConfigurationError(
                "proposal threshold cannot be negative".to_string(),
            ));
        }

        if self.execution_delay_hours < 0 || self.execution_delay_hours > MAX_PERIOD_HOURS {
            return Err(ClaimRootError::ConfigurationError(format!(
                "execution delay must be in 0..={MAX_PERIOD_HOURS} hours, got {}",
                self.execution_delay_hours
            )));
        }

        Ok(())
    }
}

impl Default for GovernanceRules {
    fn default() -> Self {
        Self {
            quorum_percentage: Decimal::from(51),
            voting_period_hours: default_voting_period().num_hours(),
            proposal_threshold: Decimal::from(1000),
            execution_delay_hours: default_execution_delay().num_hours(),
        }
    }
}

/// Main governance configuration.
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Proposal rules.
    pub rules: GovernanceRules,
    /// Chain hash algorithm.
    pub hash_algorithm: HashAlgorithm,
    /// Log level.
    pub log_level: String,
    /// Key prefix for engine backups.
    pub backup_prefix: String,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            rules: GovernanceRules::default(),
            hash_algorithm: HashAlgorithm::default(),
            log_level: "info".to_string(),
            backup_prefix: "backups/".to_string(),
        }
    }
}

impl GovernanceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("CLAIMROOT_QUORUM_PERCENTAGE") {
            if let Ok(value) = value.parse() {
                config.rules.quorum_percentage = value;
            }
        }

        if let Ok(value) = std::env::var("CLAIMROOT_VOTING_PERIOD_HOURS") {
            if let Ok(value) = value.parse() {
                config.rules.voting_period_hours = value;
            }
        }

        if let Ok(value) = std::env::var("CLAIMROOT_PROPOSAL_THRESHOLD") {
            if let Ok(value) = value.parse() {
                config.rules.proposal_threshold = value;
            }
        }

        if let Ok(value) = std::env::var("CLAIMROOT_EXECUTION_DELAY_HOURS") {
            if let Ok(value) = value.parse() {
                config.rules.execution_delay_hours = value;
            }
        }

        if let Ok(value) = std::env::var("CLAIMROOT_HASH_ALGORITHM") {
            if let Ok(value) = value.parse() {
                config.hash_algorithm = value;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.rules.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GovernanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.voting_period(), Duration::days(7));
        assert_eq!(config.rules.execution_delay(), Duration::hours(24));
        assert_eq!(config.rules.proposal_threshold, Decimal::from(1000));
    }

    #[test]
    fn test_invalid_quorum() {
        let mut config = GovernanceConfig::default();
        config.rules.quorum_percentage = Decimal::ZERO;
        assert!(config.validate().is_err());

        config.rules.quorum_percentage = Decimal::from(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_periods() {
        let mut config = GovernanceConfig::default();
        config.rules.voting_period_hours = 0;
        assert!(config.validate().is_err());

        let mut config = GovernanceConfig::default();
        config.rules.execution_delay_hours = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_periods_rejected() {
        let mut config = GovernanceConfig::default();
        config.rules.voting_period_hours = i64::MAX;
        assert!(config.validate().is_err());
        // accessors clamp instead of overflowing
        assert_eq!(config.rules.voting_period(), Duration::hours(MAX_PERIOD_HOURS));

        let mut config = GovernanceConfig::default();
        config.rules.execution_delay_hours = MAX_PERIOD_HOURS + 1;
        assert!(config.validate().is_err());

        config.rules.execution_delay_hours = MAX_PERIOD_HOURS;
        assert!(config.validate().is_ok());
    }
}
