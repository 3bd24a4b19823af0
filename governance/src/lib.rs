//! ClaimRoot Governance Engine
//!
//! Members hold voting power, open proposals and vote on them. The engine
//! applies quorum and threshold rules, drives proposals through their
//! lifecycle, and records every action on the ledger it owns.

pub mod engine;
pub mod config;
pub mod member;
pub mod proposal;
pub mod vote;
pub mod snapshot;
pub mod service;

pub use engine::{ExecutionOutcome, GovernanceEngine, GovernanceStats, VoteOutcome};
pub use config::{GovernanceConfig, GovernanceRules};
pub use member::{Member, MemberProfile};
pub use proposal::{evaluate_deadline, resolve_outcome, Proposal, ProposalData, ProposalFilter, ProposalType, VoteTally};
pub use vote::{Vote, VoteKey, VoteType};
pub use snapshot::GovernanceSnapshot;
pub use service::GovernanceService;
