//! Classifies a goal before the portfolio manager picks a prover order:
//! what kind of query is this, how hard does it look, and does it need
//! the external oracle?

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::formula::Formula;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Logic,
    Knowledge,
    Mathematical,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub query_type: QueryType,
    pub complexity_level: ComplexityLevel,
    pub requires_oracle: bool,
    pub estimated_time_seconds: f64,
    pub confidence: f64,
    pub recommended_provers: Vec<String>,
    pub reasoning: String,
}

/// The initial oracle-predicate set, driver-extensible like
/// [`crate::kb::DEFAULT_FUNCTIONAL_PREDICATES`]. This is independent of
/// the Oracle Adapter's own phrase table: a predicate can require the
/// oracle without the adapter knowing how to phrase it yet, in which
/// case the adapter itself falls back to `Unknown`.
pub const DEFAULT_ORACLE_PREDICATES: &[&str] = &[
    "PopulationDensity",
    "CapitalOf",
    "WeatherIn",
    "TemperatureIn",
    "Integral",
    "DerivativeOf",
    "CurrencyOf",
    "AreaOf",
    "Population",
    "TimezoneOf",
    "CurrentTime",
    "Conversion",
    "Unit",
    "Solution",
    "Factorization",
    "GreaterThan",
    "LessThan",
    "Inhabitant",
    "Capital",
];

lazy_static! {
    static ref ORACLE_NAME_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)of$").unwrap(),
        Regex::new(r"(?i)in$").unwrap(),
        Regex::new(r"(?i)^compute").unwrap(),
        Regex::new(r"(?i)^calculate").unwrap(),
    ];
    static ref ORACLE_TEXT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)weather").unwrap(),
        Regex::new(r"(?i)currency").unwrap(),
        Regex::new(r"(?i)temperature").unwrap(),
        Regex::new(r"(?i)population").unwrap(),
    ];
    static ref UNIT_SUFFIX: Regex =
        Regex::new(r"(?i)\d+.*(?:km|kg|€|\$|°c|°f|%|meter|degrees?)").unwrap();
    static ref MATH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)integral").unwrap(),
        Regex::new(r"(?i)derivative").unwrap(),
        Regex::new(r"(?i)solve").unwrap(),
        Regex::new(r"(?i)factor").unwrap(),
        Regex::new(r"(?i)limit").unwrap(),
    ];
    static ref ATOMIC_FORM: Regex =
        Regex::new(r"^[A-ZÄÖÜ][A-Za-z0-9ÄÖÜäöüß_]*\([^)]*\)\.$").unwrap();
}

pub struct ComplexityAnalyzer {
    oracle_predicates: HashSet<String>,
}

impl ComplexityAnalyzer {
    pub fn new(oracle_predicates: HashSet<String>) -> Self {
        Self { oracle_predicates }
    }

    pub fn analyze(&self, goal: &Formula) -> ComplexityReport {
        let predicate = goal.outer_predicate().unwrap_or("").to_string();
        let text = goal.canonical();

        let requires_oracle = self.requires_oracle(&predicate, &text);
        let query_type = self.query_type(&predicate, goal, &text, requires_oracle);
        let complexity_level = self.complexity_level(goal, &text);
        let estimated_time_seconds = self.estimate_time(complexity_level, requires_oracle);
        let recommended_provers = self.recommend_provers(query_type, requires_oracle);
        let confidence = self.confidence(&predicate, &text);
        let reasoning = self.reasoning(&predicate, requires_oracle, query_type, complexity_level);

        ComplexityReport {
            query_type,
            complexity_level,
            requires_oracle,
            estimated_time_seconds,
            confidence,
            recommended_provers,
            reasoning,
        }
    }

    fn requires_oracle(&self, predicate: &str, text: &str) -> bool {
        if self.oracle_predicates.contains(predicate) {
            return true;
        }
        if ORACLE_NAME_PATTERNS.iter().any(|p| p.is_match(predicate)) {
            return true;
        }
        if UNIT_SUFFIX.is_match(text) {
            return true;
        }
        if MATH_PATTERNS.iter().any(|p| p.is_match(text)) {
            return true;
        }
        ORACLE_TEXT_PATTERNS.iter().any(|p| p.is_match(text))
    }

    fn query_type(
        &self,
        predicate: &str,
        goal: &Formula,
        text: &str,
        requires_oracle: bool,
    ) -> QueryType {
        if MATH_PATTERNS.iter().any(|p| p.is_match(text)) {
            return QueryType::Mathematical;
        }
        if requires_oracle || self.oracle_predicates.contains(predicate) {
            return QueryType::Knowledge;
        }
        if goal.has_connective() {
            return QueryType::Logic;
        }
        QueryType::Mixed
    }

    fn complexity_level(&self, goal: &Formula, text: &str) -> ComplexityLevel {
        if goal.has_quantifier() || goal.binary_connective_count() > 2 {
            return ComplexityLevel::High;
        }
        if goal.binary_connective_count() > 1 {
            return ComplexityLevel::Medium;
        }
        if ATOMIC_FORM.is_match(text) {
            return ComplexityLevel::Low;
        }
        ComplexityLevel::Unknown
    }

    fn estimate_time(&self, level: ComplexityLevel, requires_oracle: bool) -> f64 {
        let base = match level {
            ComplexityLevel::Low => 0.1,
            ComplexityLevel::Medium => 0.5,
            ComplexityLevel::High => 2.0,
            ComplexityLevel::Unknown => 1.0,
        };
        if requires_oracle {
            base + 1.5
        } else {
            base
        }
    }

    fn recommend_provers(&self, query_type: QueryType, requires_oracle: bool) -> Vec<String> {
        let mut recommended = Vec::new();
        if requires_oracle {
            recommended.push("Oracle Adapter".to_string());
        }
        recommended.push("Functional-Constraint Prover".to_string());
        recommended.push("Pattern Prover".to_string());
        if matches!(query_type, QueryType::Logic | QueryType::Mixed) {
            recommended.push("SMT Adapter".to_string());
        }
        recommended
    }

    fn confidence(&self, predicate: &str, text: &str) -> f64 {
        let mut confidence = 0.5;
        if self.oracle_predicates.contains(predicate) {
            confidence += 0.3;
        }
        if ORACLE_NAME_PATTERNS.iter().any(|p| p.is_match(predicate)) {
            confidence += 0.2;
        }
        if ATOMIC_FORM.is_match(text) {
            confidence += 0.1;
        }
        confidence.min(1.0)
    }

    fn reasoning(
        &self,
        predicate: &str,
        requires_oracle: bool,
        query_type: QueryType,
        complexity_level: ComplexityLevel,
    ) -> String {
        let mut reasons = Vec::new();
        if requires_oracle {
            if self.oracle_predicates.contains(predicate) {
                reasons.push(format!("'{predicate}' is a known oracle predicate"));
            } else {
                reasons.push("pattern suggests a knowledge query".to_string());
            }
        }
        reasons.push(format!("query type: {query_type:?}"));
        reasons.push(format!("complexity: {complexity_level:?}"));
        reasons.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn analyzer() -> ComplexityAnalyzer {
        ComplexityAnalyzer::new(
            DEFAULT_ORACLE_PREDICATES.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn atomic_goal_is_low_complexity_and_mixed() {
        let report = analyzer().analyze(&parse("Likes(Alice, Bob).").unwrap());
        assert_eq!(report.complexity_level, ComplexityLevel::Low);
        assert_eq!(report.query_type, QueryType::Mixed);
        assert!(!report.requires_oracle);
    }

    #[test]
    fn known_oracle_predicate_requires_oracle_and_recommends_it_first() {
        let report = analyzer().analyze(&parse("Population(Vienna, x).").unwrap());
        assert!(report.requires_oracle);
        assert_eq!(report.query_type, QueryType::Knowledge);
        assert_eq!(report.recommended_provers[0], "Oracle Adapter");
    }

    #[test]
    fn quantified_goal_is_high_complexity_and_recommends_smt() {
        let report = analyzer()
            .analyze(&parse("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap());
        assert_eq!(report.complexity_level, ComplexityLevel::High);
        assert!(report.recommended_provers.contains(&"SMT Adapter".to_string()));
    }

    #[test]
    fn pattern_prover_runs_before_smt_adapter() {
        let report = analyzer().analyze(
            &parse("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap(),
        );
        let pattern_idx = report
            .recommended_provers
            .iter()
            .position(|p| p == "Pattern Prover")
            .unwrap();
        let smt_idx = report
            .recommended_provers
            .iter()
            .position(|p| p == "SMT Adapter")
            .unwrap();
        assert!(pattern_idx < smt_idx);
    }

    #[test]
    fn oracle_predicate_outside_the_phrase_table_still_requires_oracle() {
        let report = analyzer().analyze(&parse("Inhabitant(Austria, x).").unwrap());
        assert!(report.requires_oracle);
        assert_eq!(report.query_type, QueryType::Knowledge);
    }

    #[test]
    fn comparison_predicate_requires_oracle() {
        let report = analyzer().analyze(&parse("GreaterThan(5, 3).").unwrap());
        assert!(report.requires_oracle);
    }
}
