//! The knowledge base: an insertion-ordered, uniqueness-checked store of
//! facts. Consistency enforcement (negation-freeness, functional-
//! dependency violations) lives in the reasoning kernel, which is the
//! only thing with access to the prover portfolio; this module is pure
//! storage and indexing.

use std::collections::HashSet;

use crate::formula::{Formula, Term};

/// The initial functional-predicate set the kernel ships with. Drivers
/// may extend this set at construction time.
pub const DEFAULT_FUNCTIONAL_PREDICATES: &[&str] = &[
    "Inhabitant",
    "Capital",
    "LocatedIn",
    "Area",
    "Population",
    "BirthYear",
    "Temperature",
];

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    facts: Vec<Formula>,
    canonical: HashSet<String>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fact: &Formula) -> bool {
        self.canonical.contains(&fact.canonical())
    }

    /// Inserts `fact` if it is not already present. Returns `true` if it
    /// was newly inserted.
    pub fn insert(&mut self, fact: Formula) -> bool {
        if self.canonical.contains(&fact.canonical()) {
            return false;
        }
        self.canonical.insert(fact.canonical());
        self.facts.push(fact);
        true
    }

    /// Removes the fact matching `fact`'s canonical form. Returns `true`
    /// if something was removed.
    pub fn remove(&mut self, fact: &Formula) -> bool {
        let text = fact.canonical();
        if !self.canonical.remove(&text) {
            return false;
        }
        self.facts.retain(|f| f.canonical() != text);
        true
    }

    pub fn facts(&self) -> &[Formula] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Insertion-ordered canonical strings, for `Kernel::snapshot()`.
    pub fn snapshot(&self) -> Vec<String> {
        self.facts.iter().map(|f| f.canonical()).collect()
    }

    /// A stable, order-independent fingerprint used as half of the
    /// proof-cache key: two KBs with the same facts in any order
    /// fingerprint identically.
    pub fn fingerprint(&self) -> String {
        let mut sorted: Vec<String> = self.snapshot();
        sorted.sort();
        sorted.join("\u{1}")
    }
}

/// Builds the shipped functional-dependency axiom for a binary
/// predicate: `∀x.∀y.∀z.((P(x,y) ∧ P(x,z)) → y=z)`.
pub fn functional_dependency_axiom(predicate: &str) -> Formula {
    let x = Term::Variable("x".to_string());
    let y = Term::Variable("y".to_string());
    let z = Term::Variable("z".to_string());
    let p_xy = Formula::atom(predicate, vec![x.clone(), y.clone()]);
    let p_xz = Formula::atom(predicate, vec![x, z.clone()]);
    let body = Formula::Implies(
        Box::new(Formula::And(Box::new(p_xy), Box::new(p_xz))),
        Box::new(Formula::Equals(y, z)),
    );
    Formula::ForAll(
        "x".to_string(),
        Box::new(Formula::ForAll(
            "y".to_string(),
            Box::new(Formula::ForAll("z".to_string(), Box::new(body))),
        )),
    )
}

/// Host-introspection facts appended at startup: the OS family, the
/// preferred shell, and this crate's own version with dots folded to
/// underscores.
pub fn system_facts(os_family: &str, shell: &str, crate_version: &str) -> Vec<Formula> {
    vec![
        Formula::atom("RunsOn", vec![Term::Constant(os_family.to_string())]),
        Formula::atom("UsesShell", vec![Term::Constant(shell.to_string())]),
        Formula::atom(
            "KernelVersion",
            vec![Term::Constant(crate_version.replace('.', "_"))],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn duplicate_insertion_is_rejected() {
        let mut kb = KnowledgeBase::new();
        assert!(kb.insert(parse("Foo().").unwrap()));
        assert!(!kb.insert(parse("Foo().").unwrap()));
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let mut a = KnowledgeBase::new();
        a.insert(parse("Foo().").unwrap());
        a.insert(parse("Bar().").unwrap());

        let mut b = KnowledgeBase::new();
        b.insert(parse("Bar().").unwrap());
        b.insert(parse("Foo().").unwrap());

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn functional_dependency_axiom_has_expected_shape() {
        let axiom = functional_dependency_axiom("Capital");
        assert_eq!(
            axiom.canonical(),
            "∀x.∀y.∀z.((Capital(x, y) ∧ Capital(x, z)) → y=z)."
        );
    }

    #[test]
    fn remove_drops_fact_and_canonical_entry() {
        let mut kb = KnowledgeBase::new();
        let f = parse("Foo().").unwrap();
        kb.insert(f.clone());
        assert!(kb.remove(&f));
        assert!(!kb.contains(&f));
        assert_eq!(kb.len(), 0);
    }
}
