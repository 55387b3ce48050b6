//! Reference host document for the range engine.
//!
//! A real editor owns text storage, mapping positions through edits, and
//! re-reading marks after history or paste steps. This crate provides a
//! minimal in-memory stand-in with exactly those duties: a rope buffer
//! with inline mark spans, delta-based position maps, the per-rail range
//! scan, and the sanitize pass that re-keys drifted-apart mark ids.
//! Integration tests drive the engine through it one update per edit
//! event, the way a host would.

pub mod document;
pub mod mapping;
pub mod sanitize;
pub mod scan;

pub use document::{DocError, Edit, MarkSpan, MarkedDoc};
pub use mapping::DeltaMap;
pub use sanitize::sanitize_spans;
