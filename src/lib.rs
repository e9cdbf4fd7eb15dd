//! logtriage — tiered log classification engine.
//!
//! Routes each (source, message) pair through deterministic regex rules,
//! a local embedding classifier, or a generative endpoint, and yields one
//! label per record.

pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod pipeline;
