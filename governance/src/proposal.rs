//! Proposal types and lifecycle rules.
//!
//! Deadline and outcome evaluation are pure functions so the lazy status
//! transitions the engine applies can be tested on their own.

use std::collections::BTreeSet;

use claimroot_common::{has_elapsed, Address, ProposalId, ProposalStatus, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GovernanceRules;
use crate::vote::VoteType;

/// Category of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalType {
    #[default]
    General,
    ParameterChange,
    Treasury,
    Membership,
}

/// Proposal creation input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalData {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub proposal_type: ProposalType,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl ProposalData {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, proposal_type: ProposalType) -> Self {
        self.proposal_type = proposal_type;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Voting power accumulated per choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(rename = "for")]
    pub in_favor: Decimal,
    pub against: Decimal,
    pub abstain: Decimal,
}

impl VoteTally {
    pub fn add(&mut self, vote_type: VoteType, power: Decimal) {
        match vote_type {
            VoteType::For => self.in_favor += power,
            VoteType::Against => self.against += power,
            VoteType::Abstain => self.abstain += power,
        }
    }

    /// All participating power, abstentions included.
    pub fn total(&self) -> Decimal {
        self.in_favor
            .saturating_add(self.against)
            .saturating_add(self.abstain)
    }

    /// Participation as a percentage of `total_voting_power`; zero when nobody holds power.
    pub fn participation(&self, total_voting_power: Decimal) -> Decimal {
        if total_voting_power.is_zero() {
            return Decimal::ZERO;
        }
        self.total()
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(total_voting_power))
            .unwrap_or(Decimal::MAX)
    }
}

/// A governance proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub status: ProposalStatus,
    pub created_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub votes: VoteTally,
    pub voters: BTreeSet<Address>,
    /// Earliest execution instant; set when the proposal passes.
    pub execution_time: Option<Timestamp>,
    pub executed_at: Option<Timestamp>,
    pub executed_by: Option<Address>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Proposal {
    pub(crate) fn open(creator: Address, data: ProposalData, now: Timestamp, rules: &GovernanceRules) -> Self {
        Self {
            id: ProposalId::new(),
            creator,
            title: data.title,
            description: data.description,
            proposal_type: data.proposal_type,
            status: ProposalStatus::Active,
            created_at: now,
            voting_ends_at: now + rules.voting_period(),
            votes: VoteTally::default(),
            voters: BTreeSet::new(),
            execution_time: None,
            executed_at: None,
            executed_by: None,
            metadata: data.metadata,
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    /// Voting window has passed at `now`.
    pub fn voting_elapsed(&self, now: Timestamp) -> bool {
        has_elapsed(self.voting_ends_at, now)
    }
}

/// Status after applying the voting deadline at `now`.
///
/// An ACTIVE proposal whose window has elapsed becomes ENDED; every other
/// status is returned unchanged.
pub fn evaluate_deadline(proposal: &Proposal, now: Timestamp) -> ProposalStatus {
    if proposal.status == ProposalStatus::Active && proposal.voting_elapsed(now) {
        ProposalStatus::Ended
    } else {
        proposal.status
    }
}

/// Outcome of an ended vote.
///
/// Quorum is met when participation reaches `quorum_percentage`; passing also
/// requires strictly more power for than against, so ties reject.
pub fn resolve_outcome(tally: &VoteTally, total_voting_power: Decimal, rules: &GovernanceRules) -> ProposalStatus {
    if tally.participation(total_voting_power) < rules.quorum_percentage {
        ProposalStatus::FailedQuorum
    } else if tally.in_favor > tally.against {
        ProposalStatus::Passed
    } else {
        ProposalStatus::Rejected
    }
}

/// Optional filters for listing proposals.
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub creator: Option<Address>,
}

impl ProposalFilter {
    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_creator(mut self, creator: impl Into<Address>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn matches(&self, proposal: &Proposal) -> bool {
        self.status.map_or(true, |s| proposal.status == s)
            && self.creator.as_ref().map_or(true, |c| &proposal.creator == c)
    }
}
