//! Error types for ClaimRoot governance and ledger operations.

use crate::{Address, ProposalId, ProposalStatus, Timestamp};
use rust_decimal::Decimal;
use thiserror::Error;

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Referenced entity does not exist.
    NotFound,
    /// Request conflicts with current state.
    StateConflict,
    /// Chain data failed verification.
    Integrity,
    /// Serialization or configuration problem outside the business rules.
    Infrastructure,
}

/// Main error type for ClaimRoot operations.
#[derive(Error, Debug)]
pub enum ClaimRootError {
    /// Transaction is missing a required field.
    #[error("Invalid transaction: {message}")]
    InvalidTransaction {
        message: String,
        field: Option<String>,
    },

    /// Vote type is not one of for/against/abstain.
    #[error("Invalid vote type: {0}")]
    InvalidVoteType(String),

    /// Vault level outside 1..=7.
    #[error("Invalid vault level: {0}")]
    InvalidVaultLevel(u8),

    /// Address is not a registered member.
    #[error("Unknown member: {0}")]
    UnknownMember(Address),

    /// Proposal does not exist.
    #[error("Proposal not found: {0}")]
    UnknownProposal(ProposalId),

    /// Address is already registered.
    #[error("Member already registered: {0}")]
    DuplicateMember(Address),

    /// Member already voted on this proposal.
    #[error("Member {voter} has already voted on proposal {proposal_id}")]
    AlreadyVoted {
        proposal_id: ProposalId,
        voter: Address,
    },

    /// Proposal is not open for voting.
    #[error("Proposal {proposal_id} is not active (status {status})")]
    ProposalNotActive {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },

    /// Voting window has elapsed.
    #[error("Voting period has ended for proposal {0}")]
    VotingClosed(ProposalId),

    /// Proposal has not passed.
    #[error("Proposal {proposal_id} has not passed (status {status})")]
    ProposalNotPassed {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },

    /// Execution delay is still running.
    #[error("Execution delay has not elapsed for proposal {proposal_id}, executable at {execution_time}")]
    ExecutionDelayNotElapsed {
        proposal_id: ProposalId,
        execution_time: Timestamp,
    },

    /// Creator lacks the voting power needed to open a proposal.
    #[error("Insufficient voting power: required {required}, available {available}")]
    InsufficientVotingPower {
        required: Decimal,
        available: Decimal,
    },

    /// Chain failed verification.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ClaimRootError {
    /// Shorthand for a missing-field transaction error.
    pub fn missing_field(field: &str) -> Self {
        ClaimRootError::InvalidTransaction {
            message: format!("Transaction must include a non-empty '{field}' address"),
            field: Some(field.to_string()),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimRootError::InvalidTransaction { .. }
            | ClaimRootError::InvalidVoteType(_)
            | ClaimRootError::InvalidVaultLevel(_) => ErrorKind::Validation,
            ClaimRootError::UnknownMember(_) | ClaimRootError::UnknownProposal(_) => {
                ErrorKind::NotFound
            }
            ClaimRootError::DuplicateMember(_)
            | ClaimRootError::AlreadyVoted { .. }
            | ClaimRootError::ProposalNotActive { .. }
            | ClaimRootError::VotingClosed(_)
            | ClaimRootError::ProposalNotPassed { .. }
            | ClaimRootError::ExecutionDelayNotElapsed { .. }
            | ClaimRootError::InsufficientVotingPower { .. } => ErrorKind::StateConflict,
            ClaimRootError::IntegrityViolation(_) => ErrorKind::Integrity,
            ClaimRootError::Serialization(_) | ClaimRootError::ConfigurationError(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Get error code for reporting to callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClaimRootError::InvalidTransaction { .. } => "INVALID_TRANSACTION",
            ClaimRootError::InvalidVoteType(_) => "INVALID_VOTE_TYPE",
            ClaimRootError::InvalidVaultLevel(_) => "INVALID_VAULT_LEVEL",
            ClaimRootError::UnknownMember(_) => "UNKNOWN_MEMBER",
            ClaimRootError::UnknownProposal(_) => "UNKNOWN_PROPOSAL",
            ClaimRootError::DuplicateMember(_) => "DUPLICATE_MEMBER",
            ClaimRootError::AlreadyVoted { .. } => "ALREADY_VOTED",
            ClaimRootError::ProposalNotActive { .. } => "PROPOSAL_NOT_ACTIVE",
            ClaimRootError::VotingClosed(_) => "VOTING_CLOSED",
            ClaimRootError::ProposalNotPassed { .. } => "PROPOSAL_NOT_PASSED",
            ClaimRootError::ExecutionDelayNotElapsed { .. } => "EXECUTION_DELAY_NOT_ELAPSED",
            ClaimRootError::InsufficientVotingPower { .. } => "INSUFFICIENT_VOTING_POWER",
            ClaimRootError::IntegrityViolation(_) => "INTEGRITY_VIOLATION",
            ClaimRootError::Serialization(_) => "SERIALIZATION_ERROR",
            ClaimRootError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for ClaimRoot operations.
pub type Result<T> = std::result::Result<T, ClaimRootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ClaimRootError::missing_field("from").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ClaimRootError::UnknownMember(Address::new("ghost")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ClaimRootError::VotingClosed(ProposalId::new()).kind(),
            ErrorKind::StateConflict
        );
    }

    #[test]
    fn test_error_codes() {
        let err = ClaimRootError::AlreadyVoted {
            proposal_id: ProposalId::new(),
            voter: Address::new("alice"),
        };
        assert_eq!(err.error_code(), "ALREADY_VOTED");
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_missing_field_names_field() {
        match ClaimRootError::missing_field("to") {
            ClaimRootError::InvalidTransaction { field, .. } => {
                assert_eq!(field.as_deref(), Some("to"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
