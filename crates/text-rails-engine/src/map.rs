//! The seams between the engine and its host: position remapping through
//! edits, full-document range scans, and toggle requests.

use crate::ranges::bias::Assoc;
use crate::ranges::ids::RangeId;
use crate::ranges::range::{Kind, Position, Range};

/// Maps positions forward through one edit.
///
/// Supplied by the host once per edit event. The engine calls it with an
/// [`Assoc`] nudge to choose which side of an insertion boundary a
/// position prefers.
pub trait PositionMap {
    fn map(&self, pos: Position, assoc: Assoc) -> Position;
}

impl<F> PositionMap for F
where
    F: Fn(Position, Assoc) -> Position,
{
    fn map(&self, pos: Position, assoc: Assoc) -> Position {
        self(pos, assoc)
    }
}

/// The identity mapping, for pure selection/cursor updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMap;

impl PositionMap for IdentityMap {
    fn map(&self, pos: Position, _assoc: Assoc) -> Position {
        pos
    }
}

/// One aggregated range read back from a document scan: the id's minimal
/// `from` and maximal `to` across every span carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub id: RangeId,
    pub from: Position,
    pub to: Position,
    pub kind: Kind,
}

impl From<&Range> for RangeSpec {
    fn from(range: &Range) -> Self {
        RangeSpec {
            id: range.id(),
            from: range.from(),
            to: range.to(),
            kind: range.kind().clone(),
        }
    }
}

/// Re-reads the ranges backing a rail from the host document.
///
/// Used when an edit's positional deltas cannot be trusted incrementally
/// (undo, redo, paste) and every rail is rebuilt from scratch. The scan
/// coalesces by id only; guarding against falsely-fused discontiguous
/// same-id spans is the host's sanitize pass, run before this.
pub trait RangeSource {
    fn read_ranges(&self, rail: &str) -> Vec<RangeSpec>;
}

/// A host toggle request: flip `kind` on the named rail at the current
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSpec {
    pub rail: String,
    pub kind: Kind,
}

impl ToggleSpec {
    pub fn new(rail: &str, kind: &str) -> Self {
        ToggleSpec { rail: rail.to_string(), kind: Kind::new(kind) }
    }
}
