//! Vote records.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use claimroot_common::{Address, ClaimRootError, ProposalId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ballot choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    For,
    Against,
    Abstain,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::For => "for",
            VoteType::Against => "against",
            VoteType::Abstain => "abstain",
        }
    }
}

impl FromStr for VoteType {
    type Err = ClaimRootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "for" => Ok(VoteType::For),
            "against" => Ok(VoteType::Against),
            "abstain" => Ok(VoteType::Abstain),
            other => Err(ClaimRootError::InvalidVoteType(other.to_string())),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique key of a vote: one per member per proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoteKey {
    pub proposal_id: ProposalId,
    pub voter: Address,
}

impl VoteKey {
    pub fn new(proposal_id: ProposalId, voter: Address) -> Self {
        Self { proposal_id, voter }
    }
}

/// A recorded vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: Address,
    pub vote_type: VoteType,
    pub voting_power: Decimal,
    pub timestamp: Timestamp,
    /// Position among every vote accepted by the engine.
    #[serde(default)]
    pub sequence: u64,
}

impl Vote {
    pub fn key(&self) -> VoteKey {
        VoteKey::new(self.proposal_id, self.voter.clone())
    }

    /// Order in which votes were cast.
    pub fn cast_order(&self, other: &Vote) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
            .then_with(|| self.key().cmp(&other.key()))
    }
}
