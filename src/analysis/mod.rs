//! Analysis modules.
//!
//! Accumulation of per-scaffold rows into per-assembly summaries, and the
//! errors that abort a comparison run.

pub mod aggregator;
pub mod error;

pub use aggregator::*;
pub use error::AggregateError;
