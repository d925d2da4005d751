//! The reasoning kernel: owns the knowledge base, the prover portfolio,
//! and both caches, and orchestrates the add/retract/prove lifecycle.
//! Everything else in this crate is a building block this module wires
//! together.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;

use crate::cache::VerdictCache;
use crate::complexity::{ComplexityAnalyzer, DEFAULT_ORACLE_PREDICATES};
use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::formula::Formula;
use crate::kb::{self, KnowledgeBase};
use crate::normalize::{self, SynonymTable};
use crate::parser;
use crate::persistence;
use crate::portfolio::{PerformanceRecord, PortfolioManager};
use crate::provers::functional::FunctionalConstraintProver;
use crate::provers::oracle::OracleAdapter;
use crate::provers::pattern::PatternProver;
use crate::provers::smt::SmtAdapter;
use crate::provers::{Prover, Verdict};

const FUNCTIONAL_CONSTRAINT_PROVER: &str = "Functional-Constraint Prover";

#[derive(Debug, Clone, Serialize)]
pub struct KernelStats {
    pub fact_count: usize,
    pub proof_cache_size: usize,
    pub proof_cache_hit_rate: f64,
    pub portfolio: HashMap<String, PerformanceRecord>,
}

pub struct ReasoningKernel {
    kb: KnowledgeBase,
    provers: Vec<Arc<dyn Prover>>,
    oracle: Arc<OracleAdapter>,
    portfolio: PortfolioManager,
    complexity_analyzer: ComplexityAnalyzer,
    proof_cache: VerdictCache<String>,
    synonyms: SynonymTable,
    config: KernelConfig,
    persistence_path: Option<PathBuf>,
}

impl ReasoningKernel {
    /// Builds a fresh kernel: loads any persisted state at
    /// `config.kb_persistence_path`, then seeds the shipped functional-
    /// dependency axioms and host-introspection facts.
    pub fn new(config: KernelConfig) -> Self {
        let functional_predicates: HashSet<String> = kb::DEFAULT_FUNCTIONAL_PREDICATES
            .iter()
            .map(|s| s.to_string())
            .collect();

        let oracle = Arc::new(OracleAdapter::new(
            config.oracle_endpoint.clone(),
            Duration::from_secs_f64(config.oracle_http_timeout_seconds),
            config.oracle_cache_ttl_seconds,
        ));
        let complexity_analyzer = ComplexityAnalyzer::new(
            DEFAULT_ORACLE_PREDICATES.iter().map(|p| p.to_string()).collect(),
        );

        let mut kb = KnowledgeBase::new();
        let mut portfolio = PortfolioManager::new();
        let mut proof_cache = VerdictCache::new(None);
        let persistence_path = config.kb_persistence_path.as_ref().map(PathBuf::from);

        if let Some(path) = &persistence_path {
            let state = persistence::load(path);
            for fact_text in &state.facts {
                match parser::parse(fact_text) {
                    Ok(fact) => {
                        kb.insert(fact);
                    }
                    Err(e) => log::warn!("dropping unparseable persisted fact {fact_text:?}: {e}"),
                }
            }
            portfolio = PortfolioManager::from_records(state.portfolio_stats);
            for (key, entry) in state.proof_cache {
                proof_cache.put(key, entry.verdict, entry.reason, entry.inserted_at);
            }
        }

        for predicate in &functional_predicates {
            kb.insert(kb::functional_dependency_axiom(predicate));
        }
        for fact in kb::system_facts(std::env::consts::OS, &default_shell(), env!("CARGO_PKG_VERSION")) {
            kb.insert(fact);
        }

        let provers: Vec<Arc<dyn Prover>> = vec![
            Arc::new(PatternProver::new()),
            Arc::new(FunctionalConstraintProver::new(functional_predicates)),
            Arc::new(SmtAdapter::new()),
            oracle.clone(),
        ];

        Self {
            kb,
            provers,
            oracle,
            portfolio,
            complexity_analyzer,
            proof_cache,
            synonyms: SynonymTable::new(),
            config,
            persistence_path,
        }
    }

    /// Adds a driver-extensible synonym entry used by the normalizer.
    pub fn add_synonym(&mut self, surface: impl Into<String>, canonical: impl Into<String>) {
        self.synonyms.insert(surface.into(), canonical.into());
    }

    /// Replaces the predicate set the complexity analyzer treats as
    /// oracle-backed (in addition to its own pattern-based heuristics).
    pub fn set_oracle_predicates(&mut self, predicates: HashSet<String>) {
        self.complexity_analyzer = ComplexityAnalyzer::new(predicates);
    }

    /// Normalizes, parses, and inserts `fact_text` after checking it does
    /// not contradict the existing knowledge base: neither is its
    /// negation provable, nor does it violate a functional-dependency
    /// axiom already on file.
    pub fn add_fact(&mut self, fact_text: &str) -> Result<(), KernelError> {
        let normalized = normalize::normalize_with_synonyms(fact_text, &self.synonyms);
        let fact = parser::parse(&normalized)?;
        let budget = self.prover_budget();
        let assumptions = self.kb.facts();

        let negated = fact.negated();
        for prover in self.symbolic_provers() {
            let (verdict, reason) = prover.prove(assumptions, &negated, budget);
            if verdict == Verdict::Proved {
                return Err(KernelError::Inconsistent(format!(
                    "negation of this fact is already provable: {reason}"
                )));
            }
        }

        if let Some(functional_prover) = self.find_prover(FUNCTIONAL_CONSTRAINT_PROVER) {
            let (verdict, reason) = functional_prover.prove(assumptions, &fact, budget);
            if verdict == Verdict::Refuted {
                return Err(KernelError::Inconsistent(format!(
                    "functional-dependency violation: {reason}"
                )));
            }
        }

        if self.kb.insert(fact) {
            self.proof_cache.clear();
        }
        Ok(())
    }

    /// Removes a fact if present. Returns `false` if it was not in the KB.
    pub fn retract_fact(&mut self, fact_text: &str) -> Result<bool, KernelError> {
        let normalized = normalize::normalize_with_synonyms(fact_text, &self.synonyms);
        let fact = parser::parse(&normalized)?;
        let removed = self.kb.remove(&fact);
        if removed {
            self.proof_cache.clear();
        }
        Ok(removed)
    }

    /// Proves `goal_text` against the current knowledge base. Checks the
    /// proof cache first; on a miss, runs the complexity-ordered prover
    /// portfolio and caches the first definitive verdict. An all-`Unknown`
    /// outcome is never cached, since a later fact could change it.
    pub fn prove(&mut self, goal_text: &str) -> Result<(Verdict, String), KernelError> {
        let normalized = normalize::normalize_with_synonyms(goal_text, &self.synonyms);
        let goal = parser::parse(&normalized)?;
        let cache_key = self.cache_key(&goal);
        let now = chrono::Utc::now().timestamp();

        if let Some(cached) = self.proof_cache.get(&cache_key, now) {
            return Ok((cached.verdict, format!("{} (cached)", cached.reason)));
        }

        let report = self.complexity_analyzer.analyze(&goal);
        // Oracle Adapter only enters the ordering when the complexity
        // analyzer actually recommends it, so a goal with no oracle
        // relevance never triggers an outbound request just because the
        // prover happens to be registered.
        let available: Vec<&str> = self
            .provers
            .iter()
            .filter(|p| report.requires_oracle || p.name() != self.oracle.name())
            .map(|p| p.name())
            .collect();
        let ordered_names = self.portfolio.order_provers(&report, &available);
        let budget = self.prover_budget();
        let assumptions = self.kb.facts();

        for name in ordered_names {
            let prover = self
                .find_prover(name)
                .expect("ordered name came from the available-provers list");
            let started = Instant::now();
            let (verdict, reason) = prover.prove(assumptions, &goal, budget);
            self.portfolio
                .update_performance(name, verdict.is_definitive(), started.elapsed());
            if verdict.is_definitive() {
                self.proof_cache.put(cache_key, verdict, reason.clone(), now);
                return Ok((verdict, reason));
            }
        }

        Ok((
            Verdict::Unknown,
            "no prover found a definitive answer".to_string(),
        ))
    }

    /// Checks every fact in the KB against the rest for a functional-
    /// dependency conflict. Used for an explicit, whole-KB health check
    /// rather than the incremental one `add_fact` performs.
    pub fn check_consistency(&self) -> Result<(), KernelError> {
        let Some(functional_prover) = self.find_prover(FUNCTIONAL_CONSTRAINT_PROVER) else {
            return Ok(());
        };
        let facts = self.kb.facts();
        let budget = self.prover_budget();
        for (i, fact) in facts.iter().enumerate() {
            let rest: Vec<Formula> = facts
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, f)| f.clone())
                .collect();
            let (verdict, reason) = functional_prover.prove(&rest, fact, budget);
            if verdict == Verdict::Refuted {
                return Err(KernelError::Inconsistent(reason));
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.kb.snapshot()
    }

    pub fn stats(&self) -> KernelStats {
        KernelStats {
            fact_count: self.kb.len(),
            proof_cache_size: self.proof_cache.size(),
            proof_cache_hit_rate: self.proof_cache.stats().hit_rate(),
            portfolio: self.portfolio.performance_report(),
        }
    }

    /// Clears the proof cache and the oracle's own TTL cache.
    pub fn clear_caches(&mut self) {
        self.proof_cache.clear();
        self.oracle.clear_cache();
    }

    /// Persists the KB, proof cache, and portfolio statistics to
    /// `config.kb_persistence_path`, if one was configured.
    pub fn save(&self) -> Result<(), KernelError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let mut state = persistence::PersistedState::default();
        state.facts = self.kb.snapshot();
        state.proof_cache = self
            .proof_cache
            .entries()
            .map(|(key, cached)| {
                (
                    key.clone(),
                    persistence::CachedEntry {
                        verdict: cached.verdict,
                        reason: cached.reason.clone(),
                        inserted_at: cached.inserted_at,
                    },
                )
            })
            .collect();
        state.portfolio_stats = self.portfolio.performance_report();
        persistence::save(path, &state)
    }

    fn prover_budget(&self) -> Duration {
        Duration::from_secs_f64(self.config.prover_time_budget_seconds)
    }

    fn find_prover(&self, name: &str) -> Option<Arc<dyn Prover>> {
        self.provers.iter().find(|p| p.name() == name).cloned()
    }

    fn symbolic_provers(&self) -> impl Iterator<Item = &Arc<dyn Prover>> {
        self.provers.iter().filter(|p| p.name() != self.oracle.name())
    }

    fn cache_key(&self, goal: &Formula) -> String {
        format!("{}\u{1}{}", self.kb.fingerprint(), goal.canonical())
    }
}

fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel() -> ReasoningKernel {
        ReasoningKernel::new(KernelConfig::default())
    }

    #[test]
    fn proves_exact_match_and_caches_it() {
        let mut k = kernel();
        k.add_fact("IsPhilosopher(Socrates).").unwrap();
        let (verdict, _) = k.prove("IsPhilosopher(Socrates).").unwrap();
        assert_eq!(verdict, Verdict::Proved);
        assert_eq!(k.stats().proof_cache_size, 1);

        let (cached_verdict, reason) = k.prove("IsPhilosopher(Socrates).").unwrap();
        assert_eq!(cached_verdict, Verdict::Proved);
        assert!(reason.contains("cached"));
    }

    #[test]
    fn rejects_fact_that_contradicts_existing_negation() {
        let mut k = kernel();
        k.add_fact("¬IsOnline(ServerA).").unwrap();
        let err = k.add_fact("IsOnline(ServerA).").unwrap_err();
        assert!(matches!(err, KernelError::Inconsistent(_)));
    }

    #[test]
    fn rejects_functional_dependency_violation() {
        let mut k = kernel();
        k.add_fact("Capital(France, Paris).").unwrap();
        let err = k.add_fact("Capital(France, Berlin).").unwrap_err();
        assert!(matches!(err, KernelError::Inconsistent(_)));
    }

    #[test]
    fn unknown_goal_with_empty_kb_is_never_cached() {
        let mut k = kernel();
        let (verdict, reason) = k.prove("Likes(Alice,Bob).").unwrap();
        assert_eq!(verdict, Verdict::Unknown);
        assert!(reason.contains("no prover found a definitive answer"));
        assert_eq!(k.stats().proof_cache_size, 0);
    }

    #[test]
    fn retract_then_prove_returns_to_unknown() {
        let mut k = kernel();
        k.add_fact("IsPhilosopher(Socrates).").unwrap();
        assert!(k.retract_fact("IsPhilosopher(Socrates).").unwrap());
        let (verdict, _) = k.prove("IsPhilosopher(Socrates).").unwrap();
        assert_eq!(verdict, Verdict::Unknown);
    }
}
