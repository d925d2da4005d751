use thiserror::Error;

use crate::parser::ParseError;

/// The complete error taxonomy the kernel surfaces to callers. Every
/// variant here has a fixed recovery policy documented on the method
/// that produces it; none of them is allowed to unwind past the kernel
/// boundary.
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("failed to parse formula: {0}")]
    Parse(#[from] ParseError),

    #[error("SMT translation rejected formula: {0}")]
    SyntaxRejection(String),

    #[error("inconsistent with knowledge base: {0}")]
    Inconsistent(String),

    #[error("prover '{prover}' failed: {reason}")]
    ProverFailure { prover: String, reason: String },

    #[error("oracle request timed out after {0:.1}s")]
    OracleTimeout(f64),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl KernelError {
    pub fn prover_failure(prover: impl Into<String>, reason: impl Into<String>) -> Self {
        KernelError::ProverFailure {
            prover: prover.into(),
            reason: reason.into(),
        }
    }
}
