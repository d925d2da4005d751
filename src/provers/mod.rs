//! The prover portfolio: a common contract ([`Prover`]) and its four
//! implementations.

pub mod functional;
pub mod oracle;
pub mod pattern;
pub mod smt;

use std::time::Duration;

use crate::formula::Formula;

/// The outcome of a single `prove` call. Only `Proved` and `Refuted` are
/// "definitive" — see [`Verdict::is_definitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    Proved,
    Refuted,
    Unknown,
}

impl Verdict {
    pub fn is_definitive(self) -> bool {
        matches!(self, Verdict::Proved | Verdict::Refuted)
    }
}

/// The shared capability every prover in the portfolio implements. A
/// prover never panics or returns an `Err` across this boundary: any
/// internal failure becomes `(Verdict::Unknown, reason)`.
pub trait Prover: Send + Sync {
    fn name(&self) -> &str;

    /// Attempts to decide `goal` given `assumptions`, within `budget`.
    /// Must not block past `budget`.
    fn prove(&self, assumptions: &[Formula], goal: &Formula, budget: Duration) -> (Verdict, String);

    /// A syntax pre-check specific to what this prover can handle (e.g.
    /// the oracle adapter rejects non-atomic goals here).
    fn validate_syntax(&self, goal: &Formula) -> (bool, String);
}
