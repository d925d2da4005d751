//! A small undirected equivalence-class tracker over constant names,
//! built from `t1 = t2` facts. Generalizes the provenance-tracking
//! equality graph this crate's dependency stack (`petgraph`) is drawn
//! from into plain constant-equality reasoning: the Pattern Prover uses
//! it so `A=B.` and `B=A.` (or any transitive chain) are recognized as
//! the same fact without needing a full SMT round trip.

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::formula::{Formula, Term};

#[derive(Debug, Default)]
pub struct EqualityGraph {
    graph: UnGraph<String, ()>,
    node_of: HashMap<String, NodeIndex>,
}

impl EqualityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from every `Equals` fact in `assumptions`.
    pub fn from_assumptions(assumptions: &[Formula]) -> Self {
        let mut graph = Self::new();
        for assumption in assumptions {
            if let Formula::Equals(Term::Constant(a), Term::Constant(b)) = assumption {
                graph.add_equality(a, b);
            }
        }
        graph
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_of.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_of.insert(name.to_string(), idx);
        idx
    }

    pub fn add_equality(&mut self, a: &str, b: &str) {
        let na = self.node(a);
        let nb = self.node(b);
        self.graph.update_edge(na, nb, ());
    }

    /// True iff `a` and `b` are in the same equivalence class, including
    /// the reflexive case where they're textually identical.
    pub fn are_equal(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let (Some(&na), Some(&nb)) = (self.node_of.get(a), self.node_of.get(b)) else {
            return false;
        };
        has_path_connecting(&self.graph, na, nb, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitive_equality_is_detected() {
        let mut g = EqualityGraph::new();
        g.add_equality("A", "B");
        g.add_equality("B", "C");
        assert!(g.are_equal("A", "C"));
    }

    #[test]
    fn unrelated_constants_are_not_equal() {
        let mut g = EqualityGraph::new();
        g.add_equality("A", "B");
        assert!(!g.are_equal("A", "D"));
    }
}
