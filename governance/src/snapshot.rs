//! Serializable engine state for backup and restore.

use std::collections::HashMap;
use std::sync::Arc;

use claimroot_common::{ClaimRootError, Clock, ProposalStatus, Result, Timestamp};
use claimroot_crypto::HashAlgorithm;
use claimroot_ledger::{Ledger, LedgerSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::GovernanceRules;
use crate::engine::{add_voting_power, GovernanceEngine};
use crate::member::Member;
use crate::proposal::Proposal;
use crate::vote::Vote;

/// Full copy of a governance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub taken_at: Timestamp,
    pub rules: GovernanceRules,
    /// Name of the chain hasher, e.g. `sha256`.
    pub hash_algorithm: String,
    pub members: Vec<Member>,
    pub proposals: Vec<Proposal>,
    pub votes: Vec<Vote>,
    pub ledger: LedgerSnapshot,
}

impl GovernanceEngine {
    /// Capture the engine state.
    pub fn snapshot(&self) -> GovernanceSnapshot {
        let mut members: Vec<Member> = self.members.values().cloned().collect();
        members.sort_by(|a, b| a.registered_at.cmp(&b.registered_at).then_with(|| a.address.cmp(&b.address)));

        let mut votes: Vec<Vote> = self.votes.values().cloned().collect();
        votes.sort_by(|a, b| a.cast_order(b));

        GovernanceSnapshot {
            taken_at: self.now(),
            rules: self.rules.clone(),
            hash_algorithm: self.ledger.hasher().name().to_string(),
            members,
            proposals: self.proposals.clone(),
            votes,
            ledger: self.ledger.snapshot(),
        }
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// Fails when the rules are out of bounds, a member's voting power is
    /// negative or overflows the total, the chain does not verify, a passed
    /// proposal lacks its execution time, or a vote refers to a proposal that
    /// does not list its voter.
    #[instrument(skip(snapshot, clock), fields(taken_at = %snapshot.taken_at))]
    pub fn restore(snapshot: GovernanceSnapshot, clock: Arc<dyn Clock>) -> Result<Self> {
        let algorithm: HashAlgorithm = snapshot
            .hash_algorithm
            .parse()
            .map_err(|e| ClaimRootError::ConfigurationError(format!("{e}")))?;

        snapshot.rules.validate()?;

        let mut total_voting_power = Decimal::ZERO;
        for member in &snapshot.members {
            total_voting_power = add_voting_power(total_voting_power, member.voting_power)
                .map_err(|e| ClaimRootError::IntegrityViolation(format!("member {}: {e}", member.address)))?;
        }

        let ledger = Ledger::restore(snapshot.ledger, algorithm.hasher(), clock.clone())?;

        if let Some(proposal) = snapshot
            .proposals
            .iter()
            .find(|p| p.status == ProposalStatus::Passed && p.execution_time.is_none())
        {
            return Err(ClaimRootError::IntegrityViolation(format!(
                "passed proposal {} has no execution time",
                proposal.id
            )));
        }

        for vote in &snapshot.votes {
            let recorded = snapshot
                .proposals
                .iter()
                .any(|p| p.id == vote.proposal_id && p.has_voted(&vote.voter));
            if !recorded {
                return Err(ClaimRootError::IntegrityViolation(format!(
                    "vote by {} on {} has no matching proposal record",
                    vote.voter, vote.proposal_id
                )));
            }
        }

        let mut engine = GovernanceEngine::with_ledger(snapshot.rules, ledger, clock);
        engine.members = snapshot
            .members
            .into_iter()
            .map(|m| (m.address.clone(), m))
            .collect::<HashMap<_, _>>();
        engine.proposals = snapshot.proposals;
        engine.votes = snapshot.votes.into_iter().map(|v| (v.key(), v)).collect();

        info!(
            members = engine.members.len(),
            proposals = engine.proposals.len(),
            "Governance engine restored"
        );

        Ok(engine)
    }
}
