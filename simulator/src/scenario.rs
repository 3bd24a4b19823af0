//! Simulation scenarios.

use claimroot_common::ProposalStatus;
use serde::{Deserialize, Serialize};

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
///
/// Proposals are referred to by title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Register a member.
    Register {
        address: String,
        name: String,
        voting_power: String,
    },
    /// Open a proposal.
    Propose { creator: String, title: String },
    /// Vote. `vote` is the wire form: for, against or abstain.
    Vote {
        voter: String,
        proposal: String,
        vote: String,
    },
    /// Move the simulation clock forward.
    AdvanceHours { hours: i64 },
    /// Evaluate a proposal, closing voting early when forced.
    Finalize { proposal: String, force: bool },
    /// Execute a passed proposal.
    Execute { proposal: String, executor: String },
    /// Commit pending transactions.
    Commit { committer: String },
    /// Check a condition; a failed check aborts the run.
    Assert { condition: AssertCondition },
}

/// Conditions that can be asserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssertCondition {
    /// Proposal has the given status.
    ProposalStatus {
        proposal: String,
        status: ProposalStatus,
    },
    /// Ledger balance equals.
    BalanceEquals { address: String, amount: String },
    /// Chain verifies.
    ChainValid,
}

impl Scenario {
    /// Load a built-in scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "quorum-pass" => Ok(Self::quorum_pass()),
            "tie-reject" => Ok(Self::tie_reject()),
            "low-turnout" => Ok(Self::low_turnout()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Names accepted by [`Scenario::load`].
    pub fn builtin_names() -> &'static [&'static str] {
        &["quorum-pass", "tie-reject", "low-turnout"]
    }

    /// 60/40 split where the majority holder votes for, then executes.
    fn quorum_pass() -> Self {
        let title = "Fund the river grove";
        Self {
            name: "quorum-pass".to_string(),
            description: "Majority vote passes, waits out the delay and executes".to_string(),
            steps: vec![
                register("ALICE", "Alice", "6000"),
                register("BOB", "Bob", "4000"),
                ScenarioStep::Commit {
                    committer: "ALICE".to_string(),
                },
                propose("ALICE", title),
                vote("ALICE", title, "for"),
                // repeat vote is rejected and counted as a failure
                vote("ALICE", title, "for"),
                ScenarioStep::AdvanceHours { hours: 169 },
                ScenarioStep::Finalize {
                    proposal: title.to_string(),
                    force: false,
                },
                expect_status(title, ProposalStatus::Passed),
                // execution delay still running
                execute(title, "BOB"),
                ScenarioStep::AdvanceHours { hours: 24 },
                execute(title, "BOB"),
                expect_status(title, ProposalStatus::Executed),
                ScenarioStep::Commit {
                    committer: "BOB".to_string(),
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::BalanceEquals {
                        address: "BOB".to_string(),
                        amount: "4000".to_string(),
                    },
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::ChainValid,
                },
            ],
        }
    }

    /// Full turnout with for and against tied.
    fn tie_reject() -> Self {
        let title = "Rename the treasury";
        Self {
            name: "tie-reject".to_string(),
            description: "Equal power for and against rejects the proposal".to_string(),
            steps: vec![
                register("ALICE", "Alice", "3000"),
                register("BOB", "Bob", "3000"),
                register("CAROL", "Carol", "4000"),
                propose("CAROL", title),
                vote("ALICE", title, "for"),
                vote("BOB", title, "against"),
                vote("CAROL", title, "abstain"),
                ScenarioStep::AdvanceHours { hours: 169 },
                ScenarioStep::Finalize {
                    proposal: title.to_string(),
                    force: false,
                },
                expect_status(title, ProposalStatus::Rejected),
                execute(title, "CAROL"),
                ScenarioStep::Commit {
                    committer: "CAROL".to_string(),
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::ChainValid,
                },
            ],
        }
    }

    /// One small holder votes; a late vote is refused.
    fn low_turnout() -> Self {
        let title = "Extend the seed program";
        Self {
            name: "low-turnout".to_string(),
            description: "Participation below quorum fails the proposal".to_string(),
            steps: vec![
                register("ALICE", "Alice", "1000"),
                register("BOB", "Bob", "2000"),
                register("CAROL", "Carol", "3000"),
                propose("ALICE", title),
                vote("ALICE", title, "for"),
                vote("BOB", title, "maybe"),
                ScenarioStep::AdvanceHours { hours: 169 },
                // arrives after the window and ends the proposal
                vote("CAROL", title, "for"),
                expect_status(title, ProposalStatus::Ended),
                ScenarioStep::Finalize {
                    proposal: title.to_string(),
                    force: false,
                },
                expect_status(title, ProposalStatus::FailedQuorum),
                ScenarioStep::Commit {
                    committer: "ALICE".to_string(),
                },
                ScenarioStep::Assert {
                    condition: AssertCondition::ChainValid,
                },
            ],
        }
    }
}

fn register(address: &str, name: &str, voting_power: &str) -> ScenarioStep {
    ScenarioStep::Register {
        address: address.to_string(),
        name: name.to_string(),
        voting_power: voting_power.to_string(),
    }
}

fn propose(creator: &str, title: &str) -> ScenarioStep {
    ScenarioStep::Propose {
        creator: creator.to_string(),
        title: title.to_string(),
    }
}

fn vote(voter: &str, proposal: &str, vote: &str) -> ScenarioStep {
    ScenarioStep::Vote {
        voter: voter.to_string(),
        proposal: proposal.to_string(),
        vote: vote.to_string(),
    }
}

fn execute(proposal: &str, executor: &str) -> ScenarioStep {
    ScenarioStep::Execute {
        proposal: proposal.to_string(),
        executor: executor.to_string(),
    }
}

fn expect_status(proposal: &str, status: ProposalStatus) -> ScenarioStep {
    ScenarioStep::Assert {
        condition: AssertCondition::ProposalStatus {
            proposal: proposal.to_string(),
            status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_builtins() {
        for name in Scenario::builtin_names() {
            let scenario = Scenario::load(name).unwrap();
            assert_eq!(&scenario.name, name);
            assert!(!scenario.steps.is_empty());
        }
        assert!(Scenario::load("nope").is_err());
    }
}
