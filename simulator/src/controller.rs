//! Simulation controller.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use claimroot_common::{Address, ManualClock, ProposalId, ProposalStatus};
use claimroot_governance::{
    GovernanceConfig, GovernanceEngine, GovernanceService, GovernanceSnapshot, ProposalData, VoteOutcome,
    VoteType,
};
use claimroot_storage::{BackupManager, BackupRecord, InMemoryObjectStore};

use crate::member::{MemberFactory, SimulatedMember};
use crate::metrics::SimulationMetrics;
use crate::scenario::{AssertCondition, Scenario, ScenarioStep};

/// Outcome of a backup and restore round trip.
#[derive(Debug, Clone, Serialize)]
pub struct BackupSummary {
    pub backup_id: String,
    pub size: u64,
    pub etag: String,
    pub restored_blocks: u64,
    pub restored_members: usize,
}

/// Controls the simulation.
pub struct SimulationController {
    /// Configuration the engine was built from.
    config: GovernanceConfig,
    /// Simulation clock; moves only when a step advances it.
    clock: ManualClock,
    /// Engine under test.
    service: GovernanceService,
    /// Random number generator.
    rng: StdRng,
    /// Proposal ids by title.
    proposals: HashMap<String, ProposalId>,
    /// Simulation metrics.
    metrics: SimulationMetrics,
}

impl SimulationController {
    /// Create a new simulation controller.
    pub fn new(config: GovernanceConfig, seed: Option<u64>) -> anyhow::Result<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let clock = ManualClock::starting_now();
        let engine = GovernanceEngine::new(&config, Arc::new(clock.clone()))
            .context("invalid governance configuration")?;

        Ok(Self {
            config,
            clock,
            service: GovernanceService::new(engine),
            rng,
            proposals: HashMap::new(),
            metrics: SimulationMetrics::new(),
        })
    }

    pub fn service(&self) -> &GovernanceService {
        &self.service
    }

    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Run a scenario step by step. Refused operations are counted; failed
    /// assertions abort the run.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        for step in &scenario.steps {
            self.execute_step(step)?;
        }

        Ok(())
    }

    /// Run `rounds` proposals among randomly generated members.
    pub fn run_random(&mut self, member_count: usize, rounds: usize) -> anyhow::Result<()> {
        if member_count == 0 {
            bail!("at least one member is required");
        }

        let members = MemberFactory::create_members(member_count, &mut self.rng);
        for member in &members {
            self.register(member.clone());
        }
        self.commit(&members[0].address);

        let threshold = self.config.rules.proposal_threshold;
        let proposers: Vec<&SimulatedMember> = members
            .iter()
            .filter(|m| m.profile.voting_power.unwrap_or(Decimal::ONE) >= threshold)
            .collect();
        if proposers.is_empty() {
            bail!("no member meets the proposal threshold of {threshold}");
        }

        for round in 0..rounds {
            let creator = proposers[self.rng.gen_range(0..proposers.len())].address.clone();
            let title = format!("Proposal {}", round + 1);

            self.propose(&creator, &title);
            let Some(&proposal_id) = self.proposals.get(&title) else {
                continue;
            };

            for member in &members {
                if self.rng.gen_bool(0.7) {
                    let vote_type = match self.rng.gen_range(0..10) {
                        0..=5 => VoteType::For,
                        6..=8 => VoteType::Against,
                        _ => VoteType::Abstain,
                    };
                    let result = self.service.cast_vote(&member.address, proposal_id, vote_type);
                    self.vote(result);
                }
            }

            self.advance(self.config.rules.voting_period() + Duration::hours(1));
            let status = self.record(self.service.finalize_proposal(proposal_id, false), "finalize");

            if status == Some(ProposalStatus::Passed) {
                self.advance(self.config.rules.execution_delay());
                let executor = members[self.rng.gen_range(0..members.len())].address.clone();
                self.execute(proposal_id, &executor);
            }

            self.commit(&creator);
        }

        if !self.service.verify_integrity() {
            bail!("chain failed verification after random run");
        }

        Ok(())
    }

    /// Back up the engine snapshot to an in-memory store, read it back and
    /// rebuild an engine from it.
    pub async fn backup_and_restore(&self) -> anyhow::Result<BackupSummary> {
        let store = Arc::new(InMemoryObjectStore::new());
        store.initialize().await;
        let manager = BackupManager::with_prefix(store, self.config.backup_prefix.clone());

        let snapshot = self.service.snapshot();
        let (record, receipt) = manager.create_backup(None, &snapshot).await?;
        let backup_id = record.id.clone();

        let restored: BackupRecord<GovernanceSnapshot> = manager.restore_backup(&backup_id).await?;
        let engine = GovernanceEngine::restore(restored.payload, Arc::new(self.clock.clone()))?;

        if !engine.ledger().verify_integrity() {
            bail!("restored chain failed verification");
        }

        let original = self.service.get_governance_stats();
        let rebuilt = engine.get_governance_stats();
        if original.total_members != rebuilt.total_members
            || original.total_proposals != rebuilt.total_proposals
            || original.chain_stats.total_blocks != rebuilt.chain_stats.total_blocks
        {
            bail!("restored engine does not match the original");
        }

        info!(backup_id = %backup_id, size = receipt.size, "Backup verified");

        Ok(BackupSummary {
            backup_id,
            size: receipt.size,
            etag: receipt.etag,
            restored_blocks: engine.ledger().height(),
            restored_members: rebuilt.total_members,
        })
    }

    /// Execute a single scenario step.
    fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::Register {
                address,
                name,
                voting_power,
            } => {
                let power = Decimal::from_str_exact(voting_power)
                    .with_context(|| format!("bad voting power {voting_power}"))?;
                self.register(SimulatedMember::new(address.as_str(), name, power));
            }
            ScenarioStep::Propose { creator, title } => {
                self.propose(&Address::new(creator.as_str()), title);
            }
            ScenarioStep::Vote {
                voter,
                proposal,
                vote,
            } => {
                let proposal_id = self.proposal_id(proposal)?;
                let result = vote
                    .parse::<VoteType>()
                    .and_then(|vote_type| self.service.cast_vote(&Address::new(voter.as_str()), proposal_id, vote_type));
                self.vote(result);
            }
            ScenarioStep::AdvanceHours { hours } => {
                self.advance(Duration::hours(*hours));
            }
            ScenarioStep::Finalize { proposal, force } => {
                let proposal_id = self.proposal_id(proposal)?;
                if let Some(status) = self.record(self.service.finalize_proposal(proposal_id, *force), "finalize") {
                    info!("Proposal '{}' is {}", proposal, status);
                }
            }
            ScenarioStep::Execute { proposal, executor } => {
                let proposal_id = self.proposal_id(proposal)?;
                self.execute(proposal_id, &Address::new(executor.as_str()));
            }
            ScenarioStep::Commit { committer } => {
                self.commit(&Address::new(committer.as_str()));
            }
            ScenarioStep::Assert { condition } => {
                self.check(condition)?;
            }
        }

        Ok(())
    }

    fn check(&self, condition: &AssertCondition) -> anyhow::Result<()> {
        match condition {
            AssertCondition::ProposalStatus { proposal, status } => {
                let proposal_id = self.proposal_id(proposal)?;
                let actual = self
                    .service
                    .get_proposal(proposal_id)
                    .map(|p| p.status)
                    .ok_or_else(|| anyhow!("proposal '{proposal}' disappeared"))?;
                if actual != *status {
                    bail!("expected '{proposal}' to be {status}, found {actual}");
                }
            }
            AssertCondition::BalanceEquals { address, amount } => {
                let expected = Decimal::from_str_exact(amount)?;
                let actual = self.service.balance_of(&Address::new(address.as_str()));
                if actual != expected {
                    bail!("expected balance {expected} for {address}, found {actual}");
                }
            }
            AssertCondition::ChainValid => {
                if !self.service.verify_integrity() {
                    bail!("chain failed verification");
                }
            }
        }

        info!("Assertion held: {:?}", condition);
        Ok(())
    }

    fn register(&mut self, member: SimulatedMember) {
        if self
            .record(self.service.register_member(member.address, member.profile), "register_member")
            .is_some()
        {
            self.metrics.record_registration();
        }
    }

    fn propose(&mut self, creator: &Address, title: &str) {
        let result = self.service.create_proposal(creator, ProposalData::new(title, "Simulated proposal"));
        if let Some(proposal) = self.record(result, "create_proposal") {
            self.proposals.insert(title.to_string(), proposal.id);
            self.metrics.record_proposal();
        }
    }

    fn execute(&mut self, proposal_id: ProposalId, executor: &Address) {
        if let Some(outcome) = self.record(self.service.execute_proposal(proposal_id, executor), "execute") {
            info!(receipt_id = %outcome.receipt.receipt_id, "Execution receipt issued");
            self.metrics.record_execution();
        }
    }

    fn commit(&mut self, committer: &Address) {
        let block = self.service.commit_pending(committer);
        info!(index = block.index, transactions = block.transactions.len(), "Block committed");
        self.metrics.record_commit();
    }

    fn advance(&self, by: Duration) {
        self.clock.advance(by);
        info!("Clock advanced by {}h", by.num_hours());
    }

    fn proposal_id(&self, title: &str) -> anyhow::Result<ProposalId> {
        self.proposals
            .get(title)
            .copied()
            .ok_or_else(|| anyhow!("no proposal titled '{title}'"))
    }

    fn vote(&mut self, result: claimroot_common::Result<VoteOutcome>) {
        if let Some(outcome) = self.record(result, "cast_vote") {
            debug!(voter = %outcome.vote.voter, power = %outcome.vote.voting_power, "Vote counted");
            self.metrics.record_vote();
        }
    }

    /// Count a refused operation; accepted ones are counted by the caller.
    fn record<T>(&mut self, result: claimroot_common::Result<T>, operation: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(operation, code = e.error_code(), "Refused: {}", e);
                self.metrics.record_rejection();
                None
            }
        }
    }
}
