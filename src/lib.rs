//! A neuro-symbolic reasoning kernel: a first-order-logic grammar and
//! parser, a normalizer, a portfolio of provers ordered by query
//! complexity, a consistency-checked knowledge base, and a proof cache
//! keyed by the full assumption set.
//!
//! The public surface is [`ReasoningKernel`]; everything else is exposed
//! for drivers that want to work at a lower level (a custom CLI, an
//! embedding host, a test harness).

pub mod cache;
pub mod complexity;
pub mod config;
pub mod equality;
pub mod error;
pub mod formula;
pub mod kb;
pub mod kernel;
pub mod normalize;
pub mod parser;
pub mod persistence;
pub mod portfolio;
pub mod provers;

pub use complexity::{ComplexityAnalyzer, ComplexityLevel, ComplexityReport, QueryType};
pub use config::KernelConfig;
pub use error::KernelError;
pub use formula::{Formula, Term};
pub use kb::KnowledgeBase;
pub use kernel::{KernelStats, ReasoningKernel};
pub use parser::{parse, ParseError};
pub use provers::{Prover, Verdict};
