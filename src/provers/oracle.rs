//! Queries an external knowledge oracle over HTTP for atomic facts the
//! symbolic provers cannot settle on their own (capitals, populations,
//! weather, basic arithmetic, ...). Results are cached by query string
//! with a TTL, independent from the KB-keyed proof cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::VerdictCache;
use crate::formula::{Formula, Term};
use crate::provers::{Prover, Verdict};

#[derive(Debug, Deserialize)]
struct OracleResponse {
    #[serde(default)]
    answers: Vec<String>,
}

pub struct OracleAdapter {
    endpoint: String,
    http_timeout: Duration,
    phrases: HashMap<String, String>,
    term_translations: HashMap<String, String>,
    cache: Mutex<VerdictCache<String>>,
    client: reqwest::blocking::Client,
}

fn default_phrases() -> HashMap<String, String> {
    [
        ("CapitalOf", "capital of {}"),
        ("Capital", "capital of {}"),
        ("Population", "population of {}"),
        ("PopulationDensity", "population density of {}"),
        ("WeatherIn", "weather in {}"),
        ("TemperatureIn", "temperature in {}"),
        ("CurrencyOf", "currency of {}"),
        ("AreaOf", "area of {}"),
        ("TimezoneOf", "timezone of {}"),
        ("Integral", "integral of {}"),
        ("DerivativeOf", "derivative of {}"),
        ("Conversion", "conversion of {}"),
        ("Unit", "unit of {}"),
        ("Solution", "solution of {}"),
        ("Factorization", "factorization of {}"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_term_translations() -> HashMap<String, String> {
    [
        ("usa", "united states"),
        ("uk", "united kingdom"),
        ("uae", "united arab emirates"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl OracleAdapter {
    pub fn new(endpoint: impl Into<String>, http_timeout: Duration, cache_ttl_seconds: i64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(http_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            endpoint: endpoint.into(),
            http_timeout,
            phrases: default_phrases(),
            term_translations: default_term_translations(),
            cache: Mutex::new(VerdictCache::new(Some(cache_ttl_seconds))),
            client,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().expect("oracle cache mutex poisoned").clear();
    }

    fn translate_term(&self, raw: &str) -> String {
        let lower = raw.to_lowercase();
        self.term_translations
            .get(&lower)
            .cloned()
            .unwrap_or(lower)
    }

    /// Translates an atomic goal to a natural-language query, honoring
    /// the free-variable "what is the ..." form.
    fn translate(&self, predicate: &str, args: &[Term]) -> Option<String> {
        let template = self.phrases.get(predicate)?;
        let has_variable = args.iter().any(|a| matches!(a, Term::Variable(_)));
        let known_arg = args.iter().find_map(|a| match a {
            Term::Constant(c) => Some(self.translate_term(c)),
            Term::Number(n) => Some(n.to_string()),
            Term::Variable(_) => None,
        });
        let filled = match known_arg {
            Some(arg) => template.replace("{}", &arg),
            None => template.replace(" of {}", "").replace("{}", ""),
        };
        if has_variable {
            Some(format!("what is the {filled}"))
        } else {
            Some(filled)
        }
    }

    fn extract_answer(&self, query: &str, answers: &[String]) -> Option<String> {
        let query_lower = query.to_lowercase();
        for answer in answers {
            let answer_lower = answer.to_lowercase();
            if answer.trim().len() <= 2 {
                continue;
            }
            if query_lower.contains("capital") {
                let looks_like_city = answer
                    .split_whitespace()
                    .any(|word| word.chars().next().is_some_and(|c| c.is_uppercase()));
                if looks_like_city {
                    return Some(format!("capital: {answer}"));
                }
                continue;
            }
            if query_lower.contains("population") {
                if answer.chars().any(|c| c.is_ascii_digit()) {
                    return Some(format!("population: {answer}"));
                }
                continue;
            }
            if answer_lower.len() > 5 {
                return Some(format!("oracle: {answer}"));
            }
        }
        None
    }
}

impl Prover for OracleAdapter {
    fn name(&self) -> &str {
        "Oracle Adapter"
    }

    fn prove(&self, _assumptions: &[Formula], goal: &Formula, _budget: Duration) -> (Verdict, String) {
        if goal.has_connective() {
            return (
                Verdict::Unknown,
                "oracle supports atomic facts only".to_string(),
            );
        }
        let Formula::Atom { predicate, args } = goal else {
            return (
                Verdict::Unknown,
                "oracle supports atomic facts only".to_string(),
            );
        };
        let Some(query) = self.translate(predicate, args) else {
            return (
                Verdict::Unknown,
                format!("could not translate {predicate} into a natural-language query"),
            );
        };

        {
            let mut cache = self.cache.lock().expect("oracle cache mutex poisoned");
            let now = chrono::Utc::now().timestamp();
            if let Some(cached) = cache.get(&query, now) {
                return (cached.verdict, format!("{} (from cache)", cached.reason));
            }
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str())])
            .send();

        let body = match response {
            Ok(resp) => resp.json::<OracleResponse>(),
            Err(e) => {
                log::warn!("{}: oracle request failed: {e}", self.name());
                return (Verdict::Unknown, format!("oracle request failed: {e}"));
            }
        };

        let parsed = match body {
            Ok(b) => b,
            Err(e) => {
                log::warn!("{}: oracle response malformed: {e}", self.name());
                return (Verdict::Unknown, format!("oracle response malformed: {e}"));
            }
        };

        match self.extract_answer(&query, &parsed.answers) {
            Some(reason) => {
                let mut cache = self.cache.lock().expect("oracle cache mutex poisoned");
                let now = chrono::Utc::now().timestamp();
                cache.put(query, Verdict::Proved, reason.clone(), now);
                (Verdict::Proved, reason)
            }
            None => (
                Verdict::Unknown,
                "no usable answer in the oracle response".to_string(),
            ),
        }
    }

    fn validate_syntax(&self, goal: &Formula) -> (bool, String) {
        if goal.has_connective() {
            (
                false,
                format!("{} does not support logical operators", self.name()),
            )
        } else {
            (true, "atomic goal accepted".to_string())
        }
    }
}
