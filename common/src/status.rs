//! Proposal lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proposal status representing the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    /// Open for voting.
    Active,
    /// Voting window has elapsed, outcome not yet resolved.
    Ended,
    /// Quorum met and more power for than against.
    Passed,
    /// Quorum met but for did not exceed against.
    Rejected,
    /// Participation below the quorum percentage.
    FailedQuorum,
    /// Passed proposal that has been executed.
    Executed,
}

impl ProposalStatus {
    /// Check if this is a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Executed | ProposalStatus::Rejected | ProposalStatus::FailedQuorum
        )
    }

    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[ProposalStatus] {
        match self {
            ProposalStatus::Active => &[ProposalStatus::Ended],
            ProposalStatus::Ended => &[
                ProposalStatus::Passed,
                ProposalStatus::Rejected,
                ProposalStatus::FailedQuorum,
            ],
            ProposalStatus::Passed => &[ProposalStatus::Executed],
            ProposalStatus::Rejected => &[],
            ProposalStatus::FailedQuorum => &[],
            ProposalStatus::Executed => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Wire name, e.g. `FAILED_QUORUM`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "ACTIVE",
            ProposalStatus::Ended => "ENDED",
            ProposalStatus::Passed => "PASSED",
            ProposalStatus::Rejected => "REJECTED",
            ProposalStatus::FailedQuorum => "FAILED_QUORUM",
            ProposalStatus::Executed => "EXECUTED",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
