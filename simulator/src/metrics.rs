//! Simulation metrics.

use serde::Serialize;

/// Counts of simulated operations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationMetrics {
    /// Members registered.
    pub members_registered: u64,
    /// Proposals opened.
    pub proposals_created: u64,
    /// Votes accepted.
    pub votes_cast: u64,
    /// Proposals executed.
    pub proposals_executed: u64,
    /// Blocks committed.
    pub blocks_committed: u64,
    /// Operations the engine refused.
    pub operations_rejected: u64,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_registration(&mut self) {
        self.members_registered += 1;
    }

    pub fn record_proposal(&mut self) {
        self.proposals_created += 1;
    }

    pub fn record_vote(&mut self) {
        self.votes_cast += 1;
    }

    pub fn record_execution(&mut self) {
        self.proposals_executed += 1;
    }

    pub fn record_commit(&mut self) {
        self.blocks_committed += 1;
    }

    pub fn record_rejection(&mut self) {
        self.operations_rejected += 1;
    }

    /// Total operations attempted, commits excluded.
    pub fn total_operations(&self) -> u64 {
        self.members_registered
            + self.proposals_created
            + self.votes_cast
            + self.proposals_executed
            + self.operations_rejected
    }

    /// Share of attempted operations the engine accepted.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.total_operations();
        if total == 0 {
            return 0.0;
        }

        (total - self.operations_rejected) as f64 / total as f64
    }
}
