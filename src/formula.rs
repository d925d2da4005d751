//! The formula AST. A [`Formula`] is the immutable syntactic object every
//! other module operates on: facts stored in the knowledge base, goals
//! handed to a prover, and axioms are all just formulas.

use std::fmt;

/// A term: the argument of a predicate, or a side of an equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// Lowercase-initial identifier, bound by an enclosing quantifier or free.
    Variable(String),
    /// Uppercase- or umlaut-initial identifier naming an entity.
    Constant(String),
    /// An integer literal (underscore digit-grouping already stripped).
    Number(i64),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{v}"),
            Term::Constant(c) => write!(f, "{c}"),
            Term::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A first-order formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// `P(t1, ..., tn)`. Arity zero is the nullary predicate `P()`.
    Atom { predicate: String, args: Vec<Term> },
    /// `t1 = t2`.
    Equals(Term, Term),
    /// `¬φ`.
    Not(Box<Formula>),
    /// `φ ∧ ψ`.
    And(Box<Formula>, Box<Formula>),
    /// `φ ∨ ψ`.
    Or(Box<Formula>, Box<Formula>),
    /// `φ → ψ`.
    Implies(Box<Formula>, Box<Formula>),
    /// `∀x.φ`.
    ForAll(String, Box<Formula>),
}

impl Formula {
    pub fn atom(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Formula::Atom {
            predicate: predicate.into(),
            args,
        }
    }

    pub fn nullary(predicate: impl Into<String>) -> Self {
        Formula::Atom {
            predicate: predicate.into(),
            args: Vec::new(),
        }
    }

    /// The outermost predicate name, if this formula (after peeling any
    /// leading negations) is an atom. Used by the complexity analyzer and
    /// the oracle adapter, which only reason about atomic goals.
    pub fn outer_predicate(&self) -> Option<&str> {
        match self {
            Formula::Atom { predicate, .. } => Some(predicate),
            Formula::Not(inner) => inner.outer_predicate(),
            _ => None,
        }
    }

    /// True iff this formula has no connectives or quantifiers, i.e. it is
    /// a bare atom (not even a negation).
    pub fn is_atomic(&self) -> bool {
        matches!(self, Formula::Atom { .. })
    }

    /// The syntactic negation of this formula: `¬¬φ` collapses to `φ`
    /// rather than accumulating, matching the normalizer's own collapse
    /// rule so cache keys stay canonical.
    pub fn negated(&self) -> Formula {
        match self {
            Formula::Not(inner) => (**inner).clone(),
            other => Formula::Not(Box::new(other.clone())),
        }
    }

    /// Counts conjunctions and disjunctions at any depth, used by the
    /// complexity analyzer's "more than two binary connectives" rule.
    pub fn binary_connective_count(&self) -> usize {
        match self {
            Formula::Atom { .. } | Formula::Equals(_, _) => 0,
            Formula::Not(inner) => inner.binary_connective_count(),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
                1 + l.binary_connective_count() + r.binary_connective_count()
            }
            Formula::ForAll(_, body) => body.binary_connective_count(),
        }
    }

    pub fn has_quantifier(&self) -> bool {
        match self {
            Formula::Atom { .. } | Formula::Equals(_, _) => false,
            Formula::ForAll(_, _) => true,
            Formula::Not(inner) => inner.has_quantifier(),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
                l.has_quantifier() || r.has_quantifier()
            }
        }
    }

    pub fn has_connective(&self) -> bool {
        matches!(
            self,
            Formula::Not(_) | Formula::And(_, _) | Formula::Or(_, _) | Formula::Implies(_, _)
        ) || self.has_quantifier()
    }

    /// Distinct predicate names appearing anywhere in the formula, in
    /// first-occurrence order. Mirrors `extract_predicates` over a parsed
    /// tree.
    pub fn extract_predicates(&self) -> Vec<String> {
        let mut seen = Vec::new();
        self.collect_predicates(&mut seen);
        seen
    }

    fn collect_predicates(&self, out: &mut Vec<String>) {
        match self {
            Formula::Atom { predicate, .. } => {
                if !out.iter().any(|p| p == predicate) {
                    out.push(predicate.clone());
                }
            }
            Formula::Equals(_, _) => {}
            Formula::Not(inner) => inner.collect_predicates(out),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) => {
                l.collect_predicates(out);
                r.collect_predicates(out);
            }
            Formula::ForAll(_, body) => body.collect_predicates(out),
        }
    }

    /// The canonical textual form used as the KB uniqueness key and the
    /// proof-cache key. Always terminates with a period.
    pub fn canonical(&self) -> String {
        format!("{}.", self.render())
    }

    fn render(&self) -> String {
        match self {
            Formula::Atom { predicate, args } => {
                if args.is_empty() {
                    format!("{predicate}()")
                } else {
                    let parts: Vec<String> = args.iter().map(|t| t.to_string()).collect();
                    format!("{predicate}({})", parts.join(", "))
                }
            }
            Formula::Equals(l, r) => format!("{l}={r}"),
            Formula::Not(inner) => format!("¬{}", inner.render_paren()),
            Formula::And(l, r) => format!("{} ∧ {}", l.render_paren(), r.render_paren()),
            Formula::Or(l, r) => format!("{} ∨ {}", l.render_paren(), r.render_paren()),
            Formula::Implies(l, r) => format!("{} → {}", l.render_paren(), r.render_paren()),
            Formula::ForAll(var, body) => format!("∀{var}.{}", body.render_paren()),
        }
    }

    fn render_paren(&self) -> String {
        match self {
            Formula::Atom { .. } | Formula::Equals(_, _) | Formula::Not(_) => self.render(),
            _ => format!("({})", self.render()),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_stable() {
        let f = Formula::atom("Capital", vec![Term::Constant("France".into()), Term::Constant("Paris".into())]);
        assert_eq!(f.canonical(), "Capital(France, Paris).");
    }

    #[test]
    fn double_negation_collapses() {
        let f = Formula::nullary("IsOnline");
        let negated_twice = f.negated().negated();
        assert_eq!(negated_twice, f);
    }

    #[test]
    fn extract_predicates_is_first_occurrence_order_and_deduped() {
        let p = Formula::nullary("P");
        let q = Formula::nullary("Q");
        let f = Formula::And(
            Box::new(Formula::Implies(Box::new(p.clone()), Box::new(q.clone()))),
            Box::new(p),
        );
        assert_eq!(f.extract_predicates(), vec!["P".to_string(), "Q".to_string()]);
    }

    #[test]
    fn outer_predicate_peels_negation() {
        let f = Formula::nullary("Likes").negated();
        assert_eq!(f.outer_predicate(), Some("Likes"));
    }
}
