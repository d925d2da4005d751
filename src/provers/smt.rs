//! Wraps an SMT solver: translates a formula into a uniform-integer-sort
//! encoding and asks whether `assumptions ∧ ¬goal` is unsatisfiable.
//!
//! Every predicate becomes an uninterpreted function `Int^n -> Bool`;
//! every identifier (variable, constant, or number) becomes an `Int`
//! term. This keeps the fragment decidable for the equality- and
//! predicate-only formulas this kernel reasons about, at the cost of no
//! genuine arithmetic (see the open question recorded in DESIGN.md).

use std::collections::HashMap;
use std::time::Duration;

use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, FuncDecl, SatResult, Solver, Sort};

use crate::formula::{Formula, Term};
use crate::provers::{Prover, Verdict};

pub struct SmtAdapter;

impl SmtAdapter {
    pub fn new() -> Self {
        SmtAdapter
    }
}

impl Default for SmtAdapter {
    fn default() -> Self {
        Self::new()
    }
}

struct Translator<'ctx> {
    ctx: &'ctx Context,
    consts: HashMap<String, Int<'ctx>>,
    funcs: HashMap<(String, usize), FuncDecl<'ctx>>,
}

impl<'ctx> Translator<'ctx> {
    fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            consts: HashMap::new(),
            funcs: HashMap::new(),
        }
    }

    fn term(&mut self, bound: &HashMap<String, Int<'ctx>>, term: &Term) -> Int<'ctx> {
        match term {
            Term::Number(n) => Int::from_i64(self.ctx, *n),
            Term::Variable(name) => {
                if let Some(bound_var) = bound.get(name) {
                    return bound_var.clone();
                }
                self.consts
                    .entry(name.clone())
                    .or_insert_with(|| Int::new_const(self.ctx, name.as_str()))
                    .clone()
            }
            Term::Constant(name) => self
                .consts
                .entry(name.clone())
                .or_insert_with(|| Int::new_const(self.ctx, name.as_str()))
                .clone(),
        }
    }

    fn predicate(&mut self, name: &str, arity: usize) -> FuncDecl<'ctx> {
        let key = (name.to_string(), arity);
        if let Some(decl) = self.funcs.get(&key) {
            return decl.clone();
        }
        let domain: Vec<Sort> = (0..arity).map(|_| Sort::int(self.ctx)).collect();
        let domain_refs: Vec<&Sort> = domain.iter().collect();
        let decl = FuncDecl::new(self.ctx, name, &domain_refs, &Sort::bool(self.ctx));
        self.funcs.insert(key.clone(), decl.clone());
        decl
    }

    fn translate(&mut self, bound: &HashMap<String, Int<'ctx>>, formula: &Formula) -> Bool<'ctx> {
        match formula {
            Formula::Atom { predicate, args } => {
                let decl = self.predicate(predicate, args.len());
                let z3_args: Vec<Int<'ctx>> = args.iter().map(|t| self.term(bound, t)).collect();
                let arg_refs: Vec<&dyn Ast> = z3_args.iter().map(|a| a as &dyn Ast).collect();
                decl.apply(&arg_refs)
                    .as_bool()
                    .expect("predicate declared with Bool range")
            }
            Formula::Equals(l, r) => {
                let l = self.term(bound, l);
                let r = self.term(bound, r);
                l._eq(&r)
            }
            Formula::Not(inner) => self.translate(bound, inner).not(),
            Formula::And(l, r) => Bool::and(self.ctx, &[&self.translate(bound, l), &self.translate(bound, r)]),
            Formula::Or(l, r) => Bool::or(self.ctx, &[&self.translate(bound, l), &self.translate(bound, r)]),
            Formula::Implies(l, r) => self.translate(bound, l).implies(&self.translate(bound, r)),
            Formula::ForAll(var, body) => {
                let bound_var = Int::new_const(self.ctx, var.as_str());
                let mut extended = bound.clone();
                extended.insert(var.clone(), bound_var.clone());
                let inner = self.translate(&extended, body);
                z3::ast::forall_const(self.ctx, &[&bound_var], &[], &inner)
            }
        }
    }
}

/// Without at least one assumption that shares a predicate with the
/// goal, the goal's predicate is wholly unconstrained in the
/// translation: `¬goal` is trivially satisfiable by assigning that
/// predicate false everywhere, which would make every unestablished
/// goal spuriously "refuted" rather than merely unproven. Require
/// relevance before asking the solver at all.
fn has_relevant_assumption(assumptions: &[Formula], goal: &Formula) -> bool {
    let goal_predicates: std::collections::HashSet<String> =
        goal.extract_predicates().into_iter().collect();
    if goal_predicates.is_empty() {
        return true;
    }
    assumptions.iter().any(|a| {
        a.extract_predicates()
            .into_iter()
            .any(|p| goal_predicates.contains(&p))
    })
}

impl Prover for SmtAdapter {
    fn name(&self) -> &str {
        "SMT Adapter"
    }

    fn prove(&self, assumptions: &[Formula], goal: &Formula, budget: Duration) -> (Verdict, String) {
        if !has_relevant_assumption(assumptions, goal) {
            return (
                Verdict::Unknown,
                format!(
                    "{} found no assumption referencing the goal's predicate(s)",
                    self.name()
                ),
            );
        }
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        solver.set_timeout_msec(budget.as_millis().min(u64::MAX as u128) as u64);

        let mut translator = Translator::new(&ctx);
        let empty = HashMap::new();
        for assumption in assumptions {
            let translated = translator.translate(&empty, assumption);
            solver.assert(&translated);
        }
        let negated_goal = translator.translate(&empty, &goal.negated());
        solver.assert(&negated_goal);

        match solver.check() {
            SatResult::Unsat => (
                Verdict::Proved,
                format!("{} proved unsatisfiability of assumptions ∧ ¬goal", self.name()),
            ),
            SatResult::Sat => {
                let model_text = solver
                    .get_model()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "<no model>".to_string());
                (
                    Verdict::Refuted,
                    format!("{} found a counter-model: {model_text}", self.name()),
                )
            }
            SatResult::Unknown => (
                Verdict::Unknown,
                format!(
                    "{} could not decide within the time budget: {}",
                    self.name(),
                    solver.get_reason_unknown().unwrap_or_default()
                ),
            ),
        }
    }

    fn validate_syntax(&self, goal: &Formula) -> (bool, String) {
        // The translation handles the entire formula grammar; rejection
        // can only come from the solver invocation itself, surfaced as
        // Unknown rather than here.
        let _ = goal;
        (true, format!("{} accepts any well-formed formula", self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn proves_universal_instantiation() {
        let prover = SmtAdapter::new();
        let rule = parse("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap();
        let fact = parse("IsLegacy(BillingSystem).").unwrap();
        let goal = parse("ShouldRefactor(BillingSystem).").unwrap();
        let (verdict, _) = prover.prove(&[rule, fact], &goal, Duration::from_secs(10));
        assert_eq!(verdict, Verdict::Proved);
    }

    #[test]
    fn refutes_contradicted_goal() {
        let prover = SmtAdapter::new();
        let fact = parse("¬IsOnline(ServerA).").unwrap();
        let goal = parse("IsOnline(ServerA).").unwrap();
        let (verdict, _) = prover.prove(&[fact], &goal, Duration::from_secs(10));
        assert_eq!(verdict, Verdict::Refuted);
    }

    #[test]
    fn unknown_with_no_relevant_assumptions() {
        let prover = SmtAdapter::new();
        let goal = parse("Likes(Alice, Bob).").unwrap();
        let (verdict, _) = prover.prove(&[], &goal, Duration::from_secs(10));
        assert_eq!(verdict, Verdict::Unknown);
    }
}
