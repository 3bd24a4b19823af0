//! Core governance engine.

use std::collections::HashMap;
use std::sync::Arc;

use claimroot_common::{
    Address, ClaimRootError, Clock, ProposalId, ProposalStatus, Result, Timestamp,
};
use claimroot_ledger::{Block, ChainStats, Ledger, Receipt, TransactionRequest, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::{GovernanceConfig, GovernanceRules};
use crate::member::{Member, MemberProfile};
use crate::proposal::{evaluate_deadline, resolve_outcome, Proposal, ProposalData, ProposalFilter};
use crate::vote::{Vote, VoteKey, VoteType};

/// Result of a successful vote.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub proposal: Proposal,
    pub vote: Vote,
}

/// Result of a successful execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub proposal: Proposal,
    pub receipt: Receipt,
}

/// Aggregate counts for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceStats {
    pub total_members: usize,
    pub total_proposals: usize,
    pub active_proposals: usize,
    pub passed_proposals: usize,
    pub executed_proposals: usize,
    pub rejected_proposals: usize,
    pub failed_quorum_proposals: usize,
    pub total_voting_power: Decimal,
    pub governance_rules: GovernanceRules,
    pub chain_stats: ChainStats,
}

/// Governance engine owning its member directory, proposals, votes and ledger.
///
/// Single writer: every mutation takes `&mut self`. Wrap in
/// [`crate::GovernanceService`] for shared use.
#[derive(Debug)]
pub struct GovernanceEngine {
    pub(crate) rules: GovernanceRules,
    pub(crate) ledger: Ledger,
    pub(crate) members: HashMap<Address, Member>,
    pub(crate) proposals: Vec<Proposal>,
    pub(crate) votes: HashMap<VoteKey, Vote>,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Add a member's power to `total`, rejecting negative power and totals
/// whose participation percentage could not be computed.
pub(crate) fn add_voting_power(total: Decimal, voting_power: Decimal) -> Result<Decimal> {
    if voting_power < Decimal::ZERO {
        return Err(ClaimRootError::InvalidTransaction {
            message: format!("voting power cannot be negative, got {voting_power}"),
            field: Some("voting_power".to_string()),
        });
    }

    total
        .checked_add(voting_power)
        .filter(|sum| sum.checked_mul(Decimal::ONE_HUNDRED).is_some())
        .ok_or_else(|| ClaimRootError::InvalidTransaction {
            message: format!("voting power {voting_power} overflows the total"),
            field: Some("voting_power".to_string()),
        })
}

impl GovernanceEngine {
    /// Create an engine and its ledger from configuration.
    pub fn new(config: &GovernanceConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let ledger = Ledger::new(config.hash_algorithm.hasher(), clock.clone());
        Ok(Self::with_ledger(config.rules.clone(), ledger, clock))
    }

    /// Create an engine around an existing ledger.
    pub fn with_ledger(rules: GovernanceRules, ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            ledger,
            members: HashMap::new(),
            proposals: Vec::new(),
            votes: HashMap::new(),
            clock,
        }
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }

    /// Read access to the owned ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Commit every queued governance transaction into a block.
    pub fn commit_pending(&mut self, committer: &Address) -> Block {
        self.ledger.commit_pending(committer)
    }

    /// Register a member and record the grant of voting power.
    #[instrument(skip(self, profile))]
    pub fn register_member(&mut self, address: Address, profile: MemberProfile) -> Result<Member> {
        if address.is_blank() {
            return Err(ClaimRootError::missing_field("address"));
        }

        if address.is_reserved() {
            return Err(ClaimRootError::InvalidTransaction {
                message: format!("{address} is a reserved system address"),
                field: Some("address".to_string()),
            });
        }

        if self.members.contains_key(&address) {
            warn!("Duplicate registration rejected");
            return Err(ClaimRootError::DuplicateMember(address));
        }

        add_voting_power(self.total_voting_power(), profile.voting_power.unwrap_or(Decimal::ONE))?;

        let metadata = serde_json::to_value(&profile)?;
        let member = Member::from_profile(address.clone(), profile, self.clock.now());

        self.ledger.queue_transaction(
            TransactionRequest::new(
                Address::system(),
                address.clone(),
                member.voting_power,
                TransactionType::MemberRegistration,
            )
            .with_metadata(metadata),
        )?;

        info!(
            voting_power = %member.voting_power,
            vault_level = member.vault_level.value(),
            "Member registered"
        );

        self.members.insert(address, member.clone());
        Ok(member)
    }

    pub fn get_member(&self, address: &Address) -> Option<&Member> {
        self.members.get(address)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Open a proposal on behalf of a member holding enough voting power.
    #[instrument(skip(self, data), fields(title = %data.title))]
    pub fn create_proposal(&mut self, creator: &Address, data: ProposalData) -> Result<Proposal> {
        let member = self
            .members
            .get(creator)
            .ok_or_else(|| ClaimRootError::UnknownMember(creator.clone()))?;

        if member.voting_power < self.rules.proposal_threshold {
            warn!(voting_power = %member.voting_power, "Proposal threshold not met");
            return Err(ClaimRootError::InsufficientVotingPower {
                required: self.rules.proposal_threshold,
                available: member.voting_power,
            });
        }

        let proposal = Proposal::open(creator.clone(), data, self.clock.now(), &self.rules);

        self.ledger.queue_transaction(
            TransactionRequest::new(
                creator.clone(),
                Address::governance(),
                Decimal::ZERO,
                TransactionType::ProposalCreated,
            )
            .with_metadata(json!({
                "proposal_id": proposal.id,
                "title": proposal.title,
            })),
        )?;

        info!(
            proposal_id = %proposal.id,
            voting_ends_at = %proposal.voting_ends_at,
            "Proposal created"
        );

        self.proposals.push(proposal.clone());
        Ok(proposal)
    }

    /// Cast a member's full voting power on an active proposal.
    ///
    /// If the voting window has elapsed the proposal is moved to ENDED
    /// before the call fails with [`ClaimRootError::VotingClosed`].
    #[instrument(skip(self))]
    pub fn cast_vote(
        &mut self,
        voter: &Address,
        proposal_id: ProposalId,
        vote_type: VoteType,
    ) -> Result<VoteOutcome> {
        let now = self.clock.now();

        let voting_power = self
            .members
            .get(voter)
            .map(|m| m.voting_power)
            .ok_or_else(|| ClaimRootError::UnknownMember(voter.clone()))?;

        let idx = self.proposal_index(proposal_id)?;

        let status = self.proposals[idx].status;
        if status != ProposalStatus::Active {
            return Err(ClaimRootError::ProposalNotActive {
                proposal_id,
                status,
            });
        }

        if evaluate_deadline(&self.proposals[idx], now) == ProposalStatus::Ended {
            self.proposals[idx].status = ProposalStatus::Ended;
            warn!("Vote arrived after voting period; proposal ended");
            return Err(ClaimRootError::VotingClosed(proposal_id));
        }

        if self.proposals[idx].has_voted(voter) {
            return Err(ClaimRootError::AlreadyVoted {
                proposal_id,
                voter: voter.clone(),
            });
        }

        self.ledger.queue_transaction(
            TransactionRequest::new(
                voter.clone(),
                Address::governance(),
                voting_power,
                TransactionType::VoteCast,
            )
            .with_metadata(json!({
                "proposal_id": proposal_id,
                "vote_type": vote_type,
            })),
        )?;

        let vote = Vote {
            proposal_id,
            voter: voter.clone(),
            vote_type,
            voting_power,
            timestamp: now,
            sequence: self.votes.len() as u64,
        };

        let proposal = &mut self.proposals[idx];
        proposal.votes.add(vote_type, voting_power);
        proposal.voters.insert(voter.clone());
        self.votes.insert(vote.key(), vote.clone());

        info!(voting_power = %voting_power, "Vote recorded");

        self.refresh_status(idx, now);

        Ok(VoteOutcome {
            proposal: self.proposals[idx].clone(),
            vote,
        })
    }

    /// Apply deadline and outcome evaluation to a proposal.
    ///
    /// With `force`, an ACTIVE proposal's voting window is closed at the
    /// current time before evaluation.
    #[instrument(skip(self))]
    pub fn finalize_proposal(&mut self, proposal_id: ProposalId, force: bool) -> Result<ProposalStatus> {
        let now = self.clock.now();
        let idx = self.proposal_index(proposal_id)?;

        let proposal = &mut self.proposals[idx];
        if force && proposal.status == ProposalStatus::Active {
            proposal.voting_ends_at = proposal.voting_ends_at.min(now);
            proposal.status = ProposalStatus::Ended;
            info!("Voting closed early");
        }

        Ok(self.refresh_status(idx, now))
    }

    /// Execute a passed proposal once its execution delay has elapsed.
    #[instrument(skip(self))]
    pub fn execute_proposal(&mut self, proposal_id: ProposalId, executor: &Address) -> Result<ExecutionOutcome> {
        let now = self.clock.now();
        let idx = self.proposal_index(proposal_id)?;

        let status = self.refresh_status(idx, now);
        if status != ProposalStatus::Passed {
            return Err(ClaimRootError::ProposalNotPassed {
                proposal_id,
                status,
            });
        }

        let execution_time = self.proposals[idx].execution_time.ok_or_else(|| {
            ClaimRootError::IntegrityViolation(format!("passed proposal {proposal_id} has no execution time"))
        })?;
        if now < execution_time {
            return Err(ClaimRootError::ExecutionDelayNotElapsed {
                proposal_id,
                execution_time,
            });
        }

        let title = self.proposals[idx].title.clone();
        let transaction = self.ledger.queue_transaction(
            TransactionRequest::new(
                Address::governance(),
                executor.clone(),
                Decimal::ZERO,
                TransactionType::ProposalExecuted,
            )
            .with_metadata(json!({
                "proposal_id": proposal_id,
                "title": title,
                "result": "EXECUTED",
            })),
        )?;

        let proposal = &mut self.proposals[idx];
        proposal.status = ProposalStatus::Executed;
        proposal.executed_at = Some(now);
        proposal.executed_by = Some(executor.clone());

        let receipt = self.ledger.mint_receipt(&transaction);

        info!(receipt_id = %receipt.receipt_id, "Proposal executed");

        Ok(ExecutionOutcome {
            proposal: self.proposals[idx].clone(),
            receipt,
        })
    }

    pub fn get_proposal(&self, proposal_id: ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == proposal_id)
    }

    /// Proposals matching `filter`, newest first.
    pub fn get_all_proposals(&self, filter: &ProposalFilter) -> Vec<&Proposal> {
        let mut proposals: Vec<&Proposal> =
            self.proposals.iter().filter(|p| filter.matches(p)).collect();
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        proposals
    }

    /// Votes on a proposal in the order they were cast.
    pub fn get_votes_by_proposal(&self, proposal_id: ProposalId) -> Vec<&Vote> {
        let mut votes: Vec<&Vote> = self
            .votes
            .values()
            .filter(|v| v.proposal_id == proposal_id)
            .collect();
        votes.sort_by(|a, b| a.cast_order(b));
        votes
    }

    pub fn get_vote(&self, proposal_id: ProposalId, voter: &Address) -> Option<&Vote> {
        self.votes.get(&VoteKey::new(proposal_id, voter.clone()))
    }

    /// Sum of every member's voting power, computed on each call.
    ///
    /// Registration keeps the sum representable; the fold saturates rather
    /// than panic on state restored from elsewhere.
    pub fn total_voting_power(&self) -> Decimal {
        self.members
            .values()
            .fold(Decimal::ZERO, |total, m| total.saturating_add(m.voting_power))
    }

    pub fn get_governance_stats(&self) -> GovernanceStats {
        let count = |status: ProposalStatus| self.proposals.iter().filter(|p| p.status == status).count();

        GovernanceStats {
            total_members: self.members.len(),
            total_proposals: self.proposals.len(),
            active_proposals: count(ProposalStatus::Active),
            passed_proposals: count(ProposalStatus::Passed),
            executed_proposals: count(ProposalStatus::Executed),
            rejected_proposals: count(ProposalStatus::Rejected),
            failed_quorum_proposals: count(ProposalStatus::FailedQuorum),
            total_voting_power: self.total_voting_power(),
            governance_rules: self.rules.clone(),
            chain_stats: self.ledger.stats(),
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- Private methods ---

    fn proposal_index(&self, proposal_id: ProposalId) -> Result<usize> {
        self.proposals
            .iter()
            .position(|p| p.id == proposal_id)
            .ok_or(ClaimRootError::UnknownProposal(proposal_id))
    }

    /// Lazy lifecycle evaluation: ACTIVE past its deadline becomes ENDED, and
    /// ENDED is resolved to PASSED, REJECTED or FAILED_QUORUM.
    fn refresh_status(&mut self, idx: usize, now: Timestamp) -> ProposalStatus {
        let total_voting_power = self.total_voting_power();
        let rules = &self.rules;
        let proposal = &mut self.proposals[idx];

        let next = evaluate_deadline(proposal, now);
        if next != proposal.status {
            info!(proposal_id = %proposal.id, from = %proposal.status, to = %next, "Voting period elapsed");
            proposal.status = next;
        }

        if proposal.status == ProposalStatus::Ended {
            let outcome = resolve_outcome(&proposal.votes, total_voting_power, rules);
            debug_assert!(proposal.status.can_transition_to(outcome));
            if outcome == ProposalStatus::Passed {
                proposal.execution_time = Some(now + rules.execution_delay());
            }

            info!(
                proposal_id = %proposal.id,
                outcome = %outcome,
                participation = %proposal.votes.participation(total_voting_power),
                "Proposal resolved"
            );
            proposal.status = outcome;
        }

        proposal.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use claimroot_common::{ErrorKind, ManualClock, VaultLevel};
    use claimroot_crypto::HashAlgorithm;
    use rust_decimal_macros::dec;

    struct Harness {
        engine: GovernanceEngine,
        clock: ManualClock,
    }

    fn harness_with(rules: GovernanceRules) -> Harness {
        let clock = ManualClock::starting_now();
        let config = GovernanceConfig {
            rules,
            ..GovernanceConfig::default()
        };
        let engine = GovernanceEngine::new(&config, Arc::new(clock.clone())).unwrap();
        Harness { engine, clock }
    }

    fn harness() -> Harness {
        harness_with(GovernanceRules::default())
    }

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn register(engine: &mut GovernanceEngine, who: &str, power: Decimal) {
        engine
            .register_member(addr(who), MemberProfile::new(who, "Member").with_voting_power(power))
            .unwrap();
    }

    fn open_proposal(engine: &mut GovernanceEngine, creator: &str) -> ProposalId {
        engine
            .create_proposal(&addr(creator), ProposalData::new("Expand the grove", "Plant 1000 trees"))
            .unwrap()
            .id
    }

    /// Two members (60, 40), threshold low enough for either to propose.
    fn sixty_forty() -> Harness {
        let mut h = harness_with(GovernanceRules {
            proposal_threshold: dec!(10),
            ..GovernanceRules::default()
        });
        register(&mut h.engine, "alice", dec!(60));
        register(&mut h.engine, "bob", dec!(40));
        h
    }

    #[test]
    fn test_register_member_queues_registration() {
        let mut h = harness();
        let member = h
            .engine
            .register_member(
                addr("VAULT-COMMANDER-001"),
                MemberProfile::new("Heyns Schoeman", "VaultCommander")
                    .with_voting_power(dec!(10000))
                    .with_vault_level(VaultLevel::NEXUS_SOVEREIGN),
            )
            .unwrap();

        assert_eq!(member.voting_power, dec!(10000));
        let pending = h.engine.ledger().pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tx_type, TransactionType::MemberRegistration);
        assert_eq!(pending[0].from, Address::system());
        assert_eq!(pending[0].amount, dec!(10000));
        assert_eq!(pending[0].metadata["name"], "Heyns Schoeman");
    }

    #[test]
    fn test_register_defaults() {
        let mut h = harness();
        let member = h
            .engine
            .register_member(addr("carol"), MemberProfile::new("Carol", "Member"))
            .unwrap();
        assert_eq!(member.voting_power, dec!(1));
        assert_eq!(member.vault_level, VaultLevel::BRONZE);
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let mut h = harness();
        register(&mut h.engine, "alice", dec!(5));

        let err = h
            .engine
            .register_member(addr("alice"), MemberProfile::new("Alice", "Member"))
            .unwrap_err();

        assert!(matches!(err, ClaimRootError::DuplicateMember(_)));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(h.engine.ledger().pending().len(), 1);
    }

    #[test]
    fn test_reserved_and_blank_addresses_rejected() {
        let mut h = harness();
        assert!(h
            .engine
            .register_member(Address::system(), MemberProfile::default())
            .is_err());
        assert!(h
            .engine
            .register_member(addr(""), MemberProfile::default())
            .is_err());
        assert_eq!(h.engine.members().count(), 0);
        assert!(h.engine.ledger().pending().is_empty());
    }

    #[test]
    fn test_negative_voting_power_rejected() {
        let mut h = harness();
        register(&mut h.engine, "alice", dec!(10));

        let err = h
            .engine
            .register_member(addr("mallory"), MemberProfile::new("Mallory", "Member").with_voting_power(dec!(-90)))
            .unwrap_err();

        assert!(matches!(
            err,
            ClaimRootError::InvalidTransaction { ref field, .. } if field.as_deref() == Some("voting_power")
        ));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(h.engine.get_member(&addr("mallory")).is_none());
        assert_eq!(h.engine.total_voting_power(), dec!(10));
        assert_eq!(h.engine.ledger().pending().len(), 1);
    }

    #[test]
    fn test_overflowing_voting_power_rejected() {
        let mut h = harness();
        register(&mut h.engine, "whale", Decimal::MAX / dec!(1000));

        let err = h
            .engine
            .register_member(addr("orca"), MemberProfile::new("Orca", "Member").with_voting_power(Decimal::MAX))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSACTION");
        assert_eq!(h.engine.members().count(), 1);

        // stats stay computable
        let stats = h.engine.get_governance_stats();
        assert_eq!(stats.total_voting_power, Decimal::MAX / dec!(1000));
    }

    #[test]
    fn test_zero_voting_power_allowed() {
        let mut h = harness();
        let member = h
            .engine
            .register_member(addr("observer"), MemberProfile::new("Observer", "Member").with_voting_power(Decimal::ZERO))
            .unwrap();
        assert_eq!(member.voting_power, Decimal::ZERO);
    }

    #[test]
    fn test_proposal_threshold() {
        let mut h = harness();
        register(&mut h.engine, "small", dec!(500));
        register(&mut h.engine, "large", dec!(1500));

        let err = h
            .engine
            .create_proposal(&addr("small"), ProposalData::new("t", "d"))
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimRootError::InsufficientVotingPower { required, available }
                if required == dec!(1000) && available == dec!(500)
        ));

        let proposal = h
            .engine
            .create_proposal(&addr("large"), ProposalData::new("t", "d"))
            .unwrap();
        assert_eq!(proposal.status, ProposalStatus::Active);
        assert_eq!(proposal.voting_ends_at - proposal.created_at, Duration::hours(168));
        assert_eq!(proposal.votes.total(), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_creator() {
        let mut h = harness();
        let err = h
            .engine
            .create_proposal(&addr("ghost"), ProposalData::new("t", "d"))
            .unwrap_err();
        assert!(matches!(err, ClaimRootError::UnknownMember(_)));
    }

    #[test]
    fn test_create_proposal_queues_transaction() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");

        let tx = h.engine.ledger().pending().last().unwrap();
        assert_eq!(tx.tx_type, TransactionType::ProposalCreated);
        assert_eq!(tx.to, Address::governance());
        assert_eq!(tx.amount, Decimal::ZERO);
        assert_eq!(tx.metadata["proposal_id"], id.to_string());
    }

    #[test]
    fn test_cast_vote_records_tally_and_vote() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");

        let outcome = h.engine.cast_vote(&addr("bob"), id, VoteType::Against).unwrap();

        assert_eq!(outcome.proposal.votes.against, dec!(40));
        assert!(outcome.proposal.has_voted(&addr("bob")));
        assert_eq!(outcome.vote.voting_power, dec!(40));
        assert_eq!(outcome.proposal.status, ProposalStatus::Active);
        assert!(h.engine.get_vote(id, &addr("bob")).is_some());

        let tx = h.engine.ledger().pending().last().unwrap();
        assert_eq!(tx.tx_type, TransactionType::VoteCast);
        assert_eq!(tx.amount, dec!(40));
        assert_eq!(tx.metadata["vote_type"], "against");
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();

        for vote_type in [VoteType::For, VoteType::Against, VoteType::Abstain] {
            let err = h.engine.cast_vote(&addr("alice"), id, vote_type).unwrap_err();
            assert!(matches!(err, ClaimRootError::AlreadyVoted { .. }));
        }

        let proposal = h.engine.get_proposal(id).unwrap();
        assert_eq!(proposal.votes.in_favor, dec!(60));
        assert_eq!(h.engine.get_votes_by_proposal(id).len(), 1);
    }

    #[test]
    fn test_vote_on_unknown_proposal_or_by_stranger() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");

        assert!(matches!(
            h.engine.cast_vote(&addr("ghost"), id, VoteType::For),
            Err(ClaimRootError::UnknownMember(_))
        ));
        assert!(matches!(
            h.engine.cast_vote(&addr("alice"), ProposalId::new(), VoteType::For),
            Err(ClaimRootError::UnknownProposal(_))
        ));
    }

    #[test]
    fn test_late_vote_ends_proposal_and_fails() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        let pending_before = h.engine.ledger().pending().len();

        h.clock.advance(Duration::hours(169));
        let err = h.engine.cast_vote(&addr("bob"), id, VoteType::For).unwrap_err();

        assert!(matches!(err, ClaimRootError::VotingClosed(_)));
        assert_eq!(h.engine.get_proposal(id).unwrap().status, ProposalStatus::Ended);
        assert_eq!(h.engine.ledger().pending().len(), pending_before);

        let err = h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap_err();
        assert!(matches!(
            err,
            ClaimRootError::ProposalNotActive { status: ProposalStatus::Ended, .. }
        ));
    }

    #[test]
    fn test_quorum_pass_after_period_elapses() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();

        h.clock.advance(Duration::hours(169));
        let status = h.engine.finalize_proposal(id, false).unwrap();

        assert_eq!(status, ProposalStatus::Passed);
        let proposal = h.engine.get_proposal(id).unwrap();
        assert_eq!(proposal.execution_time, Some(h.clock.now() + Duration::hours(24)));
    }

    #[test]
    fn test_forced_end_passes_immediately() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();

        assert_eq!(h.engine.finalize_proposal(id, true).unwrap(), ProposalStatus::Passed);
    }

    #[test]
    fn test_finalize_without_force_keeps_active() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        assert_eq!(h.engine.finalize_proposal(id, false).unwrap(), ProposalStatus::Active);
    }

    #[test]
    fn test_tie_and_low_turnout() {
        let mut h = harness_with(GovernanceRules {
            proposal_threshold: dec!(1),
            ..GovernanceRules::default()
        });
        register(&mut h.engine, "a", dec!(50));
        register(&mut h.engine, "b", dec!(50));
        register(&mut h.engine, "c", dec!(100));

        let tie = open_proposal(&mut h.engine, "a");
        h.engine.cast_vote(&addr("a"), tie, VoteType::For).unwrap();
        h.engine.cast_vote(&addr("b"), tie, VoteType::Against).unwrap();
        h.engine.cast_vote(&addr("c"), tie, VoteType::Abstain).unwrap();

        let quiet = open_proposal(&mut h.engine, "a");
        h.engine.cast_vote(&addr("a"), quiet, VoteType::For).unwrap();

        assert_eq!(h.engine.finalize_proposal(tie, true).unwrap(), ProposalStatus::Rejected);
        assert_eq!(h.engine.finalize_proposal(quiet, true).unwrap(), ProposalStatus::FailedQuorum);
    }

    #[test]
    fn test_execute_respects_delay_and_runs_once() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();
        h.clock.advance(Duration::hours(169));

        // First attempt resolves the proposal lazily, then hits the delay.
        let err = h.engine.execute_proposal(id, &addr("bob")).unwrap_err();
        assert!(matches!(err, ClaimRootError::ExecutionDelayNotElapsed { .. }));
        assert_eq!(h.engine.get_proposal(id).unwrap().status, ProposalStatus::Passed);

        h.clock.advance(Duration::hours(23));
        assert!(h.engine.execute_proposal(id, &addr("bob")).is_err());

        h.clock.advance(Duration::hours(1));
        let outcome = h.engine.execute_proposal(id, &addr("bob")).unwrap();

        assert_eq!(outcome.proposal.status, ProposalStatus::Executed);
        assert_eq!(outcome.proposal.executed_by, Some(addr("bob")));
        assert_eq!(outcome.receipt.transaction.tx_type, TransactionType::ProposalExecuted);
        assert_eq!(outcome.receipt.transaction.metadata["result"], "EXECUTED");
        assert_eq!(outcome.receipt.vault_level.value(), 7);

        let err = h.engine.execute_proposal(id, &addr("bob")).unwrap_err();
        assert!(matches!(
            err,
            ClaimRootError::ProposalNotPassed { status: ProposalStatus::Executed, .. }
        ));

        let executed: Vec<_> = h
            .engine
            .ledger()
            .pending()
            .iter()
            .filter(|tx| tx.tx_type == TransactionType::ProposalExecuted)
            .collect();
        assert_eq!(executed.len(), 1);
    }

    #[test]
    fn test_execute_active_proposal_fails() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");

        let err = h.engine.execute_proposal(id, &addr("alice")).unwrap_err();
        assert!(matches!(
            err,
            ClaimRootError::ProposalNotPassed { status: ProposalStatus::Active, .. }
        ));
        assert!(matches!(
            h.engine.execute_proposal(ProposalId::new(), &addr("alice")),
            Err(ClaimRootError::UnknownProposal(_))
        ));
    }

    #[test]
    fn test_get_all_proposals_filters_and_sorts() {
        let mut h = sixty_forty();
        let first = open_proposal(&mut h.engine, "alice");
        h.clock.advance(Duration::minutes(5));
        let second = open_proposal(&mut h.engine, "bob");
        h.clock.advance(Duration::minutes(5));
        let third = open_proposal(&mut h.engine, "alice");

        let all = h.engine.get_all_proposals(&ProposalFilter::default());
        let ids: Vec<_> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let by_alice = h
            .engine
            .get_all_proposals(&ProposalFilter::default().with_creator("alice"));
        assert_eq!(by_alice.len(), 2);

        h.engine.cast_vote(&addr("alice"), second, VoteType::For).unwrap();
        h.engine.finalize_proposal(second, true).unwrap();
        let passed = h
            .engine
            .get_all_proposals(&ProposalFilter::default().with_status(ProposalStatus::Passed));
        assert_eq!(passed.len(), 1);
        assert_eq!(passed[0].id, second);
    }

    #[test]
    fn test_votes_listed_in_cast_order() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("bob"), id, VoteType::Abstain).unwrap();
        h.clock.advance(Duration::seconds(1));
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();

        let voters: Vec<_> = h
            .engine
            .get_votes_by_proposal(id)
            .iter()
            .map(|v| v.voter.clone())
            .collect();
        assert_eq!(voters, vec![addr("bob"), addr("alice")]);
    }

    #[test]
    fn test_same_instant_votes_keep_cast_order() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("bob"), id, VoteType::Against).unwrap();
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();

        let votes = h.engine.get_votes_by_proposal(id);
        assert_eq!(votes[0].timestamp, votes[1].timestamp);
        let voters: Vec<_> = votes.iter().map(|v| v.voter.clone()).collect();
        assert_eq!(voters, vec![addr("bob"), addr("alice")]);
    }

    #[test]
    fn test_passed_proposal_without_execution_time_is_refused() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();
        h.engine.finalize_proposal(id, true).unwrap();

        let idx = h.engine.proposal_index(id).unwrap();
        h.engine.proposals[idx].execution_time = None;
        h.clock.advance(Duration::hours(48));

        let err = h.engine.execute_proposal(id, &addr("bob")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert_eq!(h.engine.get_proposal(id).unwrap().status, ProposalStatus::Passed);
    }

    #[test]
    fn test_stats_and_ledger_balances() {
        let mut h = sixty_forty();
        let id = open_proposal(&mut h.engine, "alice");
        h.engine.cast_vote(&addr("alice"), id, VoteType::For).unwrap();
        h.engine.commit_pending(&addr("alice"));

        let stats = h.engine.get_governance_stats();
        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.total_proposals, 1);
        assert_eq!(stats.active_proposals, 1);
        assert_eq!(stats.total_voting_power, dec!(100));
        assert_eq!(stats.chain_stats.total_blocks, 2);
        assert_eq!(stats.chain_stats.pending_transactions, 0);
        assert!(stats.chain_stats.is_valid);

        let ledger = h.engine.ledger();
        // +60 registration, -60 vote
        assert_eq!(ledger.balance_of(&addr("alice")), Decimal::ZERO);
        assert_eq!(ledger.balance_of(&addr("bob")), dec!(40));
        assert_eq!(ledger.balance_of(&Address::governance()), dec!(60));
        assert_eq!(ledger.history_of(&addr("alice")).len(), 3);
    }

    #[test]
    fn test_checksum_configuration() {
        let config = GovernanceConfig {
            hash_algorithm: HashAlgorithm::Checksum,
            ..GovernanceConfig::default()
        };
        let mut engine = GovernanceEngine::new(&config, Arc::new(ManualClock::starting_now())).unwrap();
        register(&mut engine, "alice", dec!(1));
        engine.commit_pending(&addr("alice"));

        assert_eq!(engine.ledger().stats().hash_algorithm, "checksum");
        assert!(engine.ledger().verify_integrity());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GovernanceConfig::default();
        config.rules.quorum_percentage = Decimal::ZERO;
        assert!(GovernanceEngine::new(&config, Arc::new(ManualClock::starting_now())).is_err());
    }

    mod properties {
        use super::*;
        use crate::proposal::VoteTally;
        use proptest::prelude::*;

        fn vote_type() -> impl Strategy<Value = VoteType> {
            prop_oneof![Just(VoteType::For), Just(VoteType::Against), Just(VoteType::Abstain)]
        }

        proptest! {
            #[test]
            fn tally_counts_each_member_once(
                powers in prop::collection::vec(1u32..500, 1..6),
                ballots in prop::collection::vec((0usize..6, vote_type()), 0..20),
            ) {
                let mut h = harness_with(GovernanceRules {
                    proposal_threshold: Decimal::ZERO,
                    ..GovernanceRules::default()
                });
                for (i, power) in powers.iter().enumerate() {
                    register(&mut h.engine, &format!("m{i}"), Decimal::from(*power));
                }
                let id = open_proposal(&mut h.engine, "m0");

                let mut expected = VoteTally::default();
                let mut seen = std::collections::HashSet::new();
                for (who, vote_type) in ballots {
                    let voter = addr(&format!("m{who}"));
                    let result = h.engine.cast_vote(&voter, id, vote_type);
                    if who >= powers.len() {
                        let unknown = matches!(result, Err(ClaimRootError::UnknownMember(_)));
                        prop_assert!(unknown);
                    } else if seen.insert(who) {
                        prop_assert!(result.is_ok());
                        expected.add(vote_type, Decimal::from(powers[who]));
                    } else {
                        let already = matches!(result, Err(ClaimRootError::AlreadyVoted { .. }));
                        prop_assert!(already);
                    }
                }

                let proposal = h.engine.get_proposal(id).unwrap();
                prop_assert_eq!(proposal.votes, expected);
                prop_assert_eq!(proposal.voters.len(), seen.len());
                prop_assert!(proposal.votes.total() <= h.engine.total_voting_power());
            }
        }
    }
}
