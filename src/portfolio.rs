//! Orders the prover portfolio per query and tracks each prover's
//! running performance so future ordering decisions (and the driver's
//! own dashboards) can see which provers actually pay off.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::complexity::ComplexityReport;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub success_rate: f64,
    pub avg_duration_seconds: f64,
    pub usage_count: u64,
}

impl Default for PerformanceRecord {
    fn default() -> Self {
        Self {
            success_rate: 0.0,
            avg_duration_seconds: 0.0,
            usage_count: 0,
        }
    }
}

impl PerformanceRecord {
    /// Folds in one more `prove` invocation using the standard
    /// incremental-average formula.
    pub fn record(&mut self, definitive: bool, duration: Duration) {
        let n = self.usage_count as f64;
        let success = if definitive { 1.0 } else { 0.0 };
        self.success_rate = (self.success_rate * n + success) / (n + 1.0);
        self.avg_duration_seconds =
            (self.avg_duration_seconds * n + duration.as_secs_f64()) / (n + 1.0);
        self.usage_count += 1;
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PortfolioManager {
    records: HashMap<String, PerformanceRecord>,
}

impl PortfolioManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: HashMap<String, PerformanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &HashMap<String, PerformanceRecord> {
        &self.records
    }

    /// Orders `available` (the names of provers actually registered in
    /// the kernel) by the complexity report's recommendation, appending
    /// any registered prover the report didn't mention at the tail.
    pub fn order_provers<'a>(&self, report: &ComplexityReport, available: &[&'a str]) -> Vec<&'a str> {
        let mut ordered: Vec<&str> = Vec::with_capacity(available.len());
        for recommended in &report.recommended_provers {
            if let Some(&name) = available.iter().find(|&&a| a == recommended) {
                if !ordered.contains(&name) {
                    ordered.push(name);
                }
            }
        }
        for &name in available {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        ordered
    }

    pub fn update_performance(&mut self, prover: &str, definitive: bool, duration: Duration) {
        self.records
            .entry(prover.to_string())
            .or_default()
            .record(definitive, duration);
    }

    pub fn performance_report(&self) -> HashMap<String, PerformanceRecord> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_average_matches_manual_computation() {
        let mut record = PerformanceRecord::default();
        record.record(true, Duration::from_millis(100));
        record.record(false, Duration::from_millis(300));
        assert_eq!(record.usage_count, 2);
        assert!((record.success_rate - 0.5).abs() < 1e-9);
        assert!((record.avg_duration_seconds - 0.2).abs() < 1e-9);
    }

    #[test]
    fn ordering_follows_recommendation_then_appends_unreferenced() {
        let manager = PortfolioManager::new();
        let report = ComplexityReport {
            query_type: crate::complexity::QueryType::Mixed,
            complexity_level: crate::complexity::ComplexityLevel::Low,
            requires_oracle: false,
            estimated_time_seconds: 0.1,
            confidence: 0.5,
            recommended_provers: vec!["Functional-Constraint Prover".to_string(), "Pattern Prover".to_string()],
            reasoning: String::new(),
        };
        let available = ["Pattern Prover", "SMT Adapter", "Functional-Constraint Prover"];
        let ordered = manager.order_provers(&report, &available);
        assert_eq!(
            ordered,
            vec!["Functional-Constraint Prover", "Pattern Prover", "SMT Adapter"]
        );
    }
}
