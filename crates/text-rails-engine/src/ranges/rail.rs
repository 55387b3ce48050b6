//! The `Rail`: an immutable collection of mutually non-overlapping ranges
//! sharing one id source.
//!
//! All operations return a new rail; a no-op returns a rail sharing the
//! same range storage, so callers can detect "nothing changed" without a
//! structural comparison (see [`Rail::ptr_eq`]).

use std::fmt;
use std::sync::Arc;

use crate::map::RangeSpec;
use crate::ranges::bias::{Bias, Dir, MoveType};
use crate::ranges::ids::{RangeId, SharedIds};
use crate::ranges::range::{Kind, Position, Range};

#[derive(Clone)]
pub struct Rail {
    ranges: Arc<[Range]>,
    ids: SharedIds,
}

impl Rail {
    pub fn empty(ids: SharedIds) -> Self {
        Rail { ranges: Vec::new().into(), ids }
    }

    /// Builds a rail by adding every spec in order, which normalizes
    /// overlaps and merges abutting same-kind spans as it goes.
    pub fn create(specs: impl IntoIterator<Item = RangeSpec>, ids: SharedIds) -> Self {
        specs
            .into_iter()
            .fold(Rail::empty(ids), |rail, spec| {
                rail.add(spec.from, spec.to, spec.kind, Some(spec.id))
            })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> impl Iterator<Item = &Range> {
        self.ranges.iter()
    }

    pub fn as_slice(&self) -> &[Range] {
        &self.ranges
    }

    /// Smallest `from` of any range on the rail.
    pub fn min_pos(&self) -> Option<Position> {
        self.ranges.iter().map(Range::from).min()
    }

    /// Largest `to` of any range on the rail.
    pub fn max_pos(&self) -> Option<Position> {
        self.ranges.iter().map(Range::to).max()
    }

    /// True when both rails share the same underlying range storage, which
    /// is how no-op results advertise themselves.
    pub fn ptr_eq(&self, other: &Rail) -> bool {
        Arc::ptr_eq(&self.ranges, &other.ranges)
    }

    pub(crate) fn ids(&self) -> SharedIds {
        Arc::clone(&self.ids)
    }

    pub(crate) fn fresh_id(&self) -> RangeId {
        self.ids.next_id()
    }

    /// The range touching the zero-width position `pos` under `bias`.
    pub fn range_at(&self, pos: Position, bias: Bias) -> Option<&Range> {
        self.ranges.iter().find(|r| r.touches(pos, pos, bias))
    }

    /// Like [`Rail::range_at`], filtered by a predicate.
    pub fn range_at_matching<P>(&self, pos: Position, bias: Bias, predicate: P) -> Option<&Range>
    where
        P: Fn(&Range) -> bool,
    {
        self.ranges
            .iter()
            .find(|r| r.touches(pos, pos, bias) && predicate(r))
    }

    fn kind_at(&self, pos: Position, bias: Bias, kind: &Kind) -> Option<&Range> {
        self.range_at_matching(pos, bias, |r| r.kind() == kind)
    }

    /// Remaps every range; empties are dropped. A mapping that moves
    /// nothing returns a storage-sharing rail.
    pub fn map<F>(&self, f: F) -> Rail
    where
        F: Fn(Position) -> Position,
    {
        self.map_ends(&f, &f)
    }

    /// Remaps every range, `from` endpoints through `map_from` and `to`
    /// endpoints through `map_to`.
    pub fn map_ends<F, G>(&self, map_from: F, map_to: G) -> Rail
    where
        F: Fn(Position) -> Position,
        G: Fn(Position) -> Position,
    {
        let mut changed = false;
        let mut next = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.iter() {
            let mapped = range.map_ends(&map_from, &map_to);
            changed |= mapped.from() != range.from() || mapped.to() != range.to();
            if mapped.is_empty() {
                changed = true;
            } else {
                next.push(mapped);
            }
        }
        if changed { self.with_ranges(next) } else { self.clone() }
    }

    /// Inserts a range of `kind` covering `[start, end)`.
    ///
    /// A same-kind range touching `start` from the left or `end` from the
    /// right is absorbed: the new range extends to the neighbor's bounds
    /// and inherits its id (left neighbor first, then right, then the
    /// caller-supplied id, then a fresh one). Existing ranges within the
    /// final span are sliced out first. Adding cover that one same-kind
    /// range already provides is an identity-stable no-op.
    pub fn add(&self, start: Position, end: Position, kind: Kind, id: Option<RangeId>) -> Rail {
        // identity-stable no-op: one same-kind range already covers the
        // whole span, and the requested id (if any) is that range's
        if let Some(covering) = self
            .ranges
            .iter()
            .find(|r| r.kind() == &kind && r.from() <= start && end <= r.to())
            && id.is_none_or(|requested| requested == covering.id())
        {
            return self.clone();
        }

        let left = self
            .kind_at(start, Bias::Left, &kind)
            .map(|r| (r.from(), r.id()));
        let right = self
            .kind_at(end, Bias::Right, &kind)
            .map(|r| (r.to(), r.id()));

        let (from, left_id) = left.map_or((start, None), |(from, id)| (from, Some(id)));
        let (to, right_id) = right.map_or((end, None), |(to, id)| (to, Some(id)));
        let new_id = left_id
            .or(right_id)
            .or(id)
            .unwrap_or_else(|| self.ids.next_id());

        let mut next = self.sliced_out(from, to);
        next.push(Range::new(new_id, from, to, kind));
        next.retain(|r| !r.is_empty());
        self.with_ranges(next)
    }

    /// Removes the range with the given id. Removing nothing returns a
    /// storage-sharing rail.
    pub fn remove(&self, id: RangeId) -> Rail {
        if !self.ranges.iter().any(|r| r.id() == id) {
            return self.clone();
        }
        self.with_ranges(
            self.ranges
                .iter()
                .filter(|r| r.id() != id)
                .cloned()
                .collect(),
        )
    }

    /// Carves `[from, to)` out of every range, splitting overlappers.
    pub fn remove_slice(&self, from: Position, to: Position) -> Rail {
        self.with_ranges(self.sliced_out(from, to))
    }

    /// The central editing operation: toggling `kind` over the selection
    /// `[from, to]` under the cursor `bias`.
    ///
    /// When the selection sits inside a single existing range of `kind`
    /// (a neutral cursor counts as inside an enclosing range), toggling
    /// removes: the whole range for a cursor, just the covered slice for a
    /// span. Anything else adds, which merges via [`Rail::add`].
    pub fn toggle(&self, from: Position, to: Position, bias: Bias, kind: &Kind) -> Rail {
        let r_from = self.range_at(from, bias.or(Bias::Right));
        let r_to = self.range_at(to, bias.or(Bias::Left));

        let enclosing = match (r_from, r_to) {
            (Some(a), Some(b)) if a.eq_span(b) && a.kind() == kind => Some(a.id()),
            _ => None,
        };
        match enclosing {
            Some(id) if from == to => self.remove(id),
            Some(_) => self.remove_slice(from, to),
            None => self.add(from, to, kind.clone(), None),
        }
    }

    /// Classifies what a one-step move by `dir` at `pos` means for this
    /// rail: entering a range, leaving one, sidestepping directly between
    /// two adjacent ones, or nothing.
    pub fn get_move_type(&self, pos: Position, dir: Dir, bias: Bias) -> MoveType {
        let inside = self.range_at(pos, bias).is_some();
        let will_be_inside = self.range_at(pos, dir.bias()).is_some();
        let between = bias.opposes(dir)
            && inside
            && will_be_inside
            && self.range_at(pos, Bias::Neutral).is_none();

        if between {
            MoveType::Between
        } else if inside && !will_be_inside {
            MoveType::Out
        } else if !inside && will_be_inside {
            MoveType::In
        } else {
            MoveType::None
        }
    }

    fn sliced_out(&self, from: Position, to: Position) -> Vec<Range> {
        let mut next = Vec::with_capacity(self.ranges.len() + 1);
        for range in self.ranges.iter() {
            let (left, right) = range.slice(from, to, &*self.ids);
            next.extend(left);
            next.extend(right);
        }
        next
    }

    fn with_ranges(&self, ranges: Vec<Range>) -> Rail {
        Rail { ranges: ranges.into(), ids: Arc::clone(&self.ids) }
    }
}

impl PartialEq for Rail {
    fn eq(&self, other: &Rail) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl fmt::Debug for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}
