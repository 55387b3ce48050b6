//! Annotation-range engine: typed, identified, non-overlapping intervals
//! anchored to positions in a mutable text sequence.
//!
//! Given old state plus an edit/selection/toggle event, the engine
//! produces new state: a pure, synchronous value transformation. The host
//! editing surface supplies position remapping and document scans through
//! the traits in [`map`], drives everything through
//! [`RailSet::update`](ranges::rail_set::RailSet::update), and reads back
//! the flattened ranges and cursor spec to re-materialize marks and place
//! the caret.

pub mod map;
pub mod ranges;
pub mod snap;

// Re-export key types for easier usage
pub use map::{IdentityMap, PositionMap, RangeSource, RangeSpec, ToggleSpec};
pub use ranges::{bias::*, ids::*, rail::*, rail_set::*, range::*};
