//! Detects violations of functional-dependency axioms: for a functional
//! predicate `P`, the last argument is determined by the earlier ones.
//! This prover never returns `Proved` — it only ever refutes or shrugs.
//! It doubles as the KB's insertion-time consistency check.

use std::collections::HashSet;
use std::time::Duration;

use crate::formula::{Formula, Term};
use crate::provers::{Prover, Verdict};

pub struct FunctionalConstraintProver {
    functional_predicates: HashSet<String>,
}

impl FunctionalConstraintProver {
    pub fn new(functional_predicates: HashSet<String>) -> Self {
        Self {
            functional_predicates,
        }
    }

    pub fn is_functional(&self, predicate: &str) -> bool {
        self.functional_predicates.contains(predicate)
    }

    /// Finds a fact in `assumptions` that shares `predicate` and every
    /// argument but the last with `args`, yet disagrees on the last one.
    /// Returns `(conflicting_value, fact)` when found.
    fn find_conflict<'a>(
        &self,
        assumptions: &'a [Formula],
        predicate: &str,
        args: &[Term],
    ) -> Option<&'a Term> {
        let (leading, trailing) = args.split_at(args.len() - 1);
        let trailing = &trailing[0];
        for fact in assumptions {
            if let Formula::Atom {
                predicate: other_pred,
                args: other_args,
            } = fact
            {
                if other_pred != predicate || other_args.len() != args.len() {
                    continue;
                }
                let (other_leading, other_trailing) = other_args.split_at(other_args.len() - 1);
                if other_leading == leading && &other_trailing[0] != trailing {
                    return Some(&other_trailing[0]);
                }
            }
        }
        None
    }
}

impl Prover for FunctionalConstraintProver {
    fn name(&self) -> &str {
        "Functional-Constraint Prover"
    }

    fn prove(&self, assumptions: &[Formula], goal: &Formula, _budget: Duration) -> (Verdict, String) {
        let Formula::Atom { predicate, args } = goal else {
            return (
                Verdict::Unknown,
                format!("{} only inspects atomic goals", self.name()),
            );
        };
        if !self.is_functional(predicate) || args.len() < 2 {
            return (
                Verdict::Unknown,
                format!("{predicate} is not a recognized functional predicate"),
            );
        }
        let (leading, trailing) = args.split_at(args.len() - 1);
        if let Some(conflict) = self.find_conflict(assumptions, predicate, args) {
            let leading_text: Vec<String> = leading.iter().map(|t| t.to_string()).collect();
            return (
                Verdict::Refuted,
                format!(
                    "{} found {predicate}({}, {}) conflicts with {predicate}({}, {conflict}) for leading argument(s) [{}]",
                    self.name(),
                    leading_text.join(", "),
                    trailing[0],
                    leading_text.join(", "),
                    leading_text.join(", "),
                ),
            );
        }
        (
            Verdict::Unknown,
            format!("{} found no conflicting binding", self.name()),
        )
    }

    fn validate_syntax(&self, goal: &Formula) -> (bool, String) {
        if goal.is_atomic() {
            (true, "atomic goal accepted".to_string())
        } else {
            (
                false,
                format!("{} only accepts atomic goals", self.name()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn prover() -> FunctionalConstraintProver {
        FunctionalConstraintProver::new(HashSet::from(["Capital".to_string()]))
    }

    #[test]
    fn refutes_conflicting_binding() {
        let p = prover();
        let fact = parse("Capital(France, Paris).").unwrap();
        let goal = parse("Capital(France, Berlin).").unwrap();
        let (verdict, reason) = p.prove(&[fact], &goal, Duration::from_secs(1));
        assert_eq!(verdict, Verdict::Refuted);
        assert!(reason.contains("France"));
        assert!(reason.contains("Paris"));
        assert!(reason.contains("Berlin"));
    }

    #[test]
    fn never_proves() {
        let p = prover();
        let fact = parse("Capital(France, Paris).").unwrap();
        let goal = parse("Capital(France, Paris).").unwrap();
        let (verdict, _) = p.prove(&[fact], &goal, Duration::from_secs(1));
        assert_eq!(verdict, Verdict::Unknown);
    }

    #[test]
    fn unknown_for_non_functional_predicate() {
        let p = prover();
        let goal = parse("Likes(Alice, Bob).").unwrap();
        let (verdict, _) = p.prove(&[], &goal, Duration::from_secs(1));
        assert_eq!(verdict, Verdict::Unknown);
    }
}
