//! Position mapping through one edit's delta.

use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

use text_rails_engine::{Assoc, Position, PositionMap};

/// A [`PositionMap`] over the delta of one applied edit.
///
/// `Assoc::After` sticks a position to the right of text inserted exactly
/// there; `Assoc::Before` keeps it on the left.
#[derive(Debug)]
pub struct DeltaMap {
    delta: Delta<RopeInfo>,
}

impl DeltaMap {
    pub fn new(delta: Delta<RopeInfo>) -> Self {
        DeltaMap { delta }
    }
}

impl PositionMap for DeltaMap {
    fn map(&self, pos: Position, assoc: Assoc) -> Position {
        let mut transformer = Transformer::new(&self.delta);
        transformer.transform(pos, assoc == Assoc::After)
    }
}
