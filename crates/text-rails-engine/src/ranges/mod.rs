//! The range/rail/rail-set core.
//!
//! Three layers, leaf-first:
//!
//! - [`Range`](range::Range): an immutable, typed, identified half-open
//!   interval with remapping and slicing.
//! - [`Rail`](rail::Rail): a collection of mutually non-overlapping
//!   ranges with add/toggle/merge normalization and bias-aware boundary
//!   queries.
//! - [`RailSet`](rail_set::RailSet): named rails plus selection/cursor
//!   state, cross-rail cursor-move disambiguation and the pending
//!   placeholder.
//!
//! Everything here is a value: operations consume `&self` and return a new
//! snapshot, and no-ops return storage-sharing copies so callers can
//! detect "nothing changed" cheaply.

pub mod bias;
pub mod ids;
pub mod rail;
pub mod rail_set;
pub mod range;

pub use bias::{Assoc, Bias, Dir, MoveType};
pub use ids::{IdSource, RangeId, SequentialIds, SharedIds, V4Ids};
pub use rail::Rail;
pub use rail_set::{Placeholder, RailSet};
pub use range::{Kind, Position, Range};
