//! Exact-match prover: the cheapest, always-available member of the
//! portfolio. Complexity is linear in the number of assumptions.

use std::time::Duration;

use crate::equality::EqualityGraph;
use crate::formula::{Formula, Term};
use crate::provers::{Prover, Verdict};

pub struct PatternProver;

impl PatternProver {
    pub fn new() -> Self {
        PatternProver
    }
}

impl Default for PatternProver {
    fn default() -> Self {
        Self::new()
    }
}

impl Prover for PatternProver {
    fn name(&self) -> &str {
        "Pattern Prover"
    }

    fn prove(&self, assumptions: &[Formula], goal: &Formula, _budget: Duration) -> (Verdict, String) {
        let goal_text = goal.canonical();
        let negated_text = goal.negated().canonical();

        if assumptions.iter().any(|a| a.canonical() == goal_text) {
            return (
                Verdict::Proved,
                format!("{} found an exact match for the goal in the assumptions", self.name()),
            );
        }
        if assumptions.iter().any(|a| a.canonical() == negated_text) {
            return (
                Verdict::Refuted,
                format!(
                    "{} found the negation of the goal in the assumptions",
                    self.name()
                ),
            );
        }
        if let Formula::Equals(Term::Constant(a), Term::Constant(b)) = goal {
            let graph = EqualityGraph::from_assumptions(assumptions);
            if graph.are_equal(a, b) {
                return (
                    Verdict::Proved,
                    format!("{} found a chain of equalities connecting {a} and {b}", self.name()),
                );
            }
        }
        (
            Verdict::Unknown,
            format!("{} found neither the goal nor its negation", self.name()),
        )
    }

    fn validate_syntax(&self, _goal: &Formula) -> (bool, String) {
        (true, "pattern prover accepts any well-formed formula".to_string())
    }
}
