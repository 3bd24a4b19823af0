//! Thread-safe handle around a [`GovernanceEngine`].

use std::sync::Arc;

use claimroot_common::{Address, ProposalId, ProposalStatus, Result};
use claimroot_ledger::{Block, ChainStats, HistoryEntry};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::engine::{ExecutionOutcome, GovernanceEngine, GovernanceStats, VoteOutcome};
use crate::member::{Member, MemberProfile};
use crate::proposal::{Proposal, ProposalData, ProposalFilter};
use crate::snapshot::GovernanceSnapshot;
use crate::vote::{Vote, VoteType};

/// Cloneable service that serializes every operation through one lock.
///
/// Each call runs to completion under the lock, so concurrent callers never
/// observe a half-applied vote or registration.
#[derive(Debug, Clone)]
pub struct GovernanceService {
    inner: Arc<Mutex<GovernanceEngine>>,
}

impl GovernanceService {
    pub fn new(engine: GovernanceEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GovernanceEngine) -> R) -> R {
        let mut engine = self.inner.lock();
        f(&mut engine)
    }

    pub fn register_member(&self, address: Address, profile: MemberProfile) -> Result<Member> {
        self.inner.lock().register_member(address, profile)
    }

    pub fn get_member(&self, address: &Address) -> Option<Member> {
        self.inner.lock().get_member(address).cloned()
    }

    pub fn create_proposal(&self, creator: &Address, data: ProposalData) -> Result<Proposal> {
        self.inner.lock().create_proposal(creator, data)
    }

    pub fn cast_vote(&self, voter: &Address, proposal_id: ProposalId, vote_type: VoteType) -> Result<VoteOutcome> {
        self.inner.lock().cast_vote(voter, proposal_id, vote_type)
    }

    pub fn finalize_proposal(&self, proposal_id: ProposalId, force: bool) -> Result<ProposalStatus> {
        self.inner.lock().finalize_proposal(proposal_id, force)
    }

    pub fn execute_proposal(&self, proposal_id: ProposalId, executor: &Address) -> Result<ExecutionOutcome> {
        self.inner.lock().execute_proposal(proposal_id, executor)
    }

    pub fn get_proposal(&self, proposal_id: ProposalId) -> Option<Proposal> {
        self.inner.lock().get_proposal(proposal_id).cloned()
    }

    pub fn get_all_proposals(&self, filter: &ProposalFilter) -> Vec<Proposal> {
        self.inner
            .lock()
            .get_all_proposals(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_votes_by_proposal(&self, proposal_id: ProposalId) -> Vec<Vote> {
        self.inner
            .lock()
            .get_votes_by_proposal(proposal_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn total_voting_power(&self) -> Decimal {
        self.inner.lock().total_voting_power()
    }

    pub fn get_governance_stats(&self) -> GovernanceStats {
        self.inner.lock().get_governance_stats()
    }

    pub fn commit_pending(&self, committer: &Address) -> Block {
        self.inner.lock().commit_pending(committer)
    }

    pub fn verify_integrity(&self) -> bool {
        self.inner.lock().ledger().verify_integrity()
    }

    pub fn chain_stats(&self) -> ChainStats {
        self.inner.lock().ledger().stats()
    }

    pub fn balance_of(&self, address: &Address) -> Decimal {
        self.inner.lock().ledger().balance_of(address)
    }

    pub fn history_of(&self, address: &Address) -> Vec<HistoryEntry> {
        self.inner.lock().ledger().history_of(address)
    }

    pub fn snapshot(&self) -> GovernanceSnapshot {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use claimroot_common::ManualClock;
    use rust_decimal_macros::dec;

    use crate::config::GovernanceConfig;

    fn service() -> GovernanceService {
        let engine = GovernanceEngine::new(
            &GovernanceConfig::default(),
            Arc::new(ManualClock::starting_now()),
        )
        .unwrap();
        GovernanceService::new(engine)
    }

    #[test]
    fn test_concurrent_registration() {
        let service = service();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                thread::spawn(move || {
                    service
                        .register_member(
                            Address::new(format!("member-{i}")),
                            MemberProfile::new(format!("Member {i}"), "Member"),
                        )
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.total_voting_power(), dec!(8));
        assert_eq!(service.chain_stats().pending_transactions, 8);
    }

    #[test]
    fn test_concurrent_votes_count_once() {
        let service = service();
        service
            .register_member(
                Address::new("alice"),
                MemberProfile::new("Alice", "Steward").with_voting_power(dec!(1000)),
            )
            .unwrap();
        let proposal = service
            .create_proposal(&Address::new("alice"), ProposalData::new("t", "d"))
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                thread::spawn(move || {
                    service
                        .cast_vote(&Address::new("alice"), proposal.id, VoteType::For)
                        .is_ok()
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(accepted, 1);
        let stored = service.get_proposal(proposal.id).unwrap();
        assert_eq!(stored.votes.in_favor, dec!(1000));
        assert_eq!(service.get_votes_by_proposal(proposal.id).len(), 1);
    }

    #[test]
    fn test_commit_and_balances_through_service() {
        let service = service();
        service
            .register_member(Address::new("bob"), MemberProfile::new("Bob", "Member").with_voting_power(dec!(5)))
            .unwrap();

        let block = service.commit_pending(&Address::new("bob"));
        assert_eq!(block.index, 1);
        assert!(service.verify_integrity());
        assert_eq!(service.balance_of(&Address::new("bob")), dec!(5));
        assert_eq!(service.history_of(&Address::new("bob")).len(), 1);
        assert_eq!(service.with_engine(|e| e.members().count()), 1);
    }
}
