//! Layered kernel configuration: compiled-in defaults, overridden by an
//! optional TOML file, overridden by environment variables prefixed
//! `NOESIS_`. Every layer is optional; a missing file or absent
//! environment variables never fail the load.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct KernelConfig {
    #[serde(default = "default_prover_time_budget_seconds")]
    pub prover_time_budget_seconds: f64,
    #[serde(default = "default_oracle_http_timeout_seconds")]
    pub oracle_http_timeout_seconds: f64,
    #[serde(default = "default_oracle_cache_ttl_seconds")]
    pub oracle_cache_ttl_seconds: i64,
    #[serde(default = "default_oracle_endpoint")]
    pub oracle_endpoint: String,
    #[serde(default)]
    pub kb_persistence_path: Option<String>,
}

fn default_prover_time_budget_seconds() -> f64 {
    10.0
}

fn default_oracle_http_timeout_seconds() -> f64 {
    5.0
}

fn default_oracle_cache_ttl_seconds() -> i64 {
    3600
}

fn default_oracle_endpoint() -> String {
    "http://localhost:9000/oracle".to_string()
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            prover_time_budget_seconds: default_prover_time_budget_seconds(),
            oracle_http_timeout_seconds: default_oracle_http_timeout_seconds(),
            oracle_cache_ttl_seconds: default_oracle_cache_ttl_seconds(),
            oracle_endpoint: default_oracle_endpoint(),
            kb_persistence_path: None,
        }
    }
}

impl KernelConfig {
    /// Loads configuration.
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables prefixed `NOESIS_` (e.g. `NOESIS_ORACLE_ENDPOINT`).
    /// 2. `config_path`, if given and present on disk.
    /// 3. Compiled-in defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("prover_time_budget_seconds", default_prover_time_budget_seconds())?
            .set_default("oracle_http_timeout_seconds", default_oracle_http_timeout_seconds())?
            .set_default("oracle_cache_ttl_seconds", default_oracle_cache_ttl_seconds())?
            .set_default("oracle_endpoint", default_oracle_endpoint())?;

        if let Some(path) = config_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("NOESIS"));

        let config = builder.build()?.try_deserialize()?;
        log::info!("loaded kernel configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn defaults_when_nothing_present() {
        let cfg = KernelConfig::load(None).expect("defaults always load");
        assert_eq!(cfg.prover_time_budget_seconds, 10.0);
        assert_eq!(cfg.oracle_cache_ttl_seconds, 3600);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kernel.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "prover_time_budget_seconds = 20.0").unwrap();
        let cfg = KernelConfig::load(Some(path)).expect("file should load");
        assert_eq!(cfg.prover_time_budget_seconds, 20.0);
        assert_eq!(cfg.oracle_cache_ttl_seconds, 3600);
    }
}
