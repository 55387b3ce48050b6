//! The `Range` primitive: an immutable, typed, identified half-open
//! interval anchored to positions in the document.

use std::fmt;
use std::sync::Arc;

use crate::ranges::bias::Bias;
use crate::ranges::ids::{IdSource, RangeId};

/// A byte offset into the document sequence.
pub type Position = usize;

/// Semantic category of a range ("note", "flag", ...). Cheap to clone and
/// compare; hosts define the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kind(Arc<str>);

impl Kind {
    pub fn new(name: &str) -> Self {
        Kind(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Kind {
    fn from(name: &str) -> Self {
        Kind::new(name)
    }
}

impl AsRef<str> for Kind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable interval `[from, to)` with a stable identity and a kind.
///
/// `from` may transiently exceed `to` as an intermediate mapped value; the
/// structure does not clamp, callers filter empties after mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    id: RangeId,
    from: Position,
    to: Position,
    kind: Kind,
}

impl Range {
    pub fn new(id: RangeId, from: Position, to: Position, kind: Kind) -> Self {
        Range { id, from, to, kind }
    }

    pub fn id(&self) -> RangeId {
        self.id
    }

    pub fn from(&self) -> Position {
        self.from
    }

    pub fn to(&self) -> Position {
        self.to
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Structural equality of span and kind; ids are ignored.
    pub fn eq_span(&self, other: &Range) -> bool {
        self.from == other.from && self.to == other.to && self.kind == other.kind
    }

    /// Remaps both endpoints through `f`.
    pub fn map<F>(&self, f: F) -> Range
    where
        F: Fn(Position) -> Position,
    {
        self.map_ends(&f, &f)
    }

    /// Remaps `from` through `map_from` and `to` through `map_to`.
    ///
    /// The endpoints take independent functions because an insertion at a
    /// boundary should grow or not grow the range depending on which end
    /// it hits.
    pub fn map_ends<F, G>(&self, map_from: F, map_to: G) -> Range
    where
        F: Fn(Position) -> Position,
        G: Fn(Position) -> Position,
    {
        let from = map_from(self.from);
        let to = map_to(self.to);
        if from == self.from && to == self.to {
            self.clone()
        } else {
            Range { id: self.id, from, to, kind: self.kind.clone() }
        }
    }

    /// Removes the sub-interval `[min, max)` from this range.
    ///
    /// Returns the surviving piece before the window (keeps this id) and
    /// the surviving piece after it (fresh id; it is a new logical range).
    /// Empty pieces are omitted. A window that does not reach into the
    /// range leaves it byte-identical, id included.
    pub fn slice(
        &self,
        min: Position,
        max: Position,
        ids: &dyn IdSource,
    ) -> (Option<Range>, Option<Range>) {
        if min >= self.to {
            return (Some(self.clone()), None);
        }
        if max <= self.from {
            return (None, Some(self.clone()));
        }
        let left = (self.from < min)
            .then(|| Range::new(self.id, self.from, min, self.kind.clone()));
        let right = (max < self.to)
            .then(|| Range::new(ids.next_id(), max, self.to, self.kind.clone()));
        (left, right)
    }

    /// The bias-aware intersection predicate.
    ///
    /// A zero-width query exactly at `to` touches only under a leftward
    /// bias, exactly at `from` only under a rightward one; interior
    /// positions always touch. A non-empty query touches iff it overlaps
    /// the interior at all, independent of bias.
    pub fn touches(&self, start: Position, end: Position, bias: Bias) -> bool {
        (start < self.to || (start == self.to && bias.is_leftward()))
            && (end > self.from || (end == self.from && bias.is_rightward()))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{},{})#{}", self.kind, self.from, self.to, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::ids::SequentialIds;
    use rstest::rstest;

    fn note(id: u64, from: Position, to: Position) -> Range {
        Range::new(RangeId::from_u64(id), from, to, Kind::new("note"))
    }

    #[test]
    fn map_applies_independent_endpoint_functions() {
        let r = note(1, 0, 1);
        let mapped = r.map_ends(|from| from + 1, |to| to + 2);
        assert_eq!((mapped.from(), mapped.to()), (1, 3));
        assert_eq!(mapped.id(), r.id());
    }

    #[test]
    fn map_may_invert_the_interval() {
        let r = note(1, 0, 1);
        let mapped = r.map_ends(|from| from + 1, |to| to - 1);
        assert_eq!((mapped.from(), mapped.to()), (1, 0));
        assert!(mapped.is_empty());
    }

    #[test]
    fn slice_splits_around_the_window() {
        let ids = SequentialIds::starting_at(100);
        let (left, right) = note(1, 2, 8).slice(4, 6, &ids);
        let left = left.unwrap();
        let right = right.unwrap();
        assert_eq!((left.from(), left.to()), (2, 4));
        assert_eq!(left.id(), RangeId::from_u64(1));
        assert_eq!((right.from(), right.to()), (6, 8));
        assert_eq!(right.id(), RangeId::from_u64(100));
    }

    #[test]
    fn slice_taking_the_tail_keeps_only_the_left_piece() {
        let ids = SequentialIds::starting_at(100);
        let (left, right) = note(1, 2, 8).slice(4, 8, &ids);
        let left = left.unwrap();
        assert_eq!((left.from(), left.to()), (2, 4));
        assert_eq!(left.id(), RangeId::from_u64(1));
        assert!(right.is_none());
    }

    #[test]
    fn slice_covering_the_range_removes_it() {
        let ids = SequentialIds::starting_at(100);
        let (left, right) = note(1, 2, 8).slice(2, 8, &ids);
        assert!(left.is_none());
        assert!(right.is_none());
    }

    #[test]
    fn slice_missing_the_range_keeps_it_intact() {
        let ids = SequentialIds::starting_at(100);
        let r = note(1, 2, 8);

        let (left, right) = r.slice(8, 12, &ids);
        assert_eq!(left.as_ref(), Some(&r));
        assert!(right.is_none());

        let (left, right) = r.slice(0, 2, &ids);
        assert!(left.is_none());
        // the id survives: nothing was cut out of the range
        assert_eq!(right.as_ref(), Some(&r));
    }

    #[rstest]
    #[case(8, 8, Bias::Left, true)]
    #[case(8, 8, Bias::Right, false)]
    #[case(2, 2, Bias::Right, true)]
    #[case(2, 2, Bias::Left, false)]
    #[case(2, 2, Bias::Neutral, false)]
    #[case(8, 8, Bias::Neutral, false)]
    #[case(5, 5, Bias::Neutral, true)]
    #[case(5, 5, Bias::Left, true)]
    #[case(5, 5, Bias::Right, true)]
    fn touches_boundary_rule(
        #[case] start: Position,
        #[case] end: Position,
        #[case] bias: Bias,
        #[case] expected: bool,
    ) {
        assert_eq!(note(1, 2, 8).touches(start, end, bias), expected);
    }

    #[test]
    fn touches_span_queries_ignore_bias() {
        let r = note(1, 2, 8);
        assert!(r.touches(0, 3, Bias::Neutral));
        assert!(r.touches(7, 12, Bias::Neutral));
        assert!(!r.touches(0, 2, Bias::Neutral));
        assert!(!r.touches(8, 12, Bias::Neutral));
    }

    #[test]
    fn eq_span_ignores_ids() {
        assert!(note(1, 2, 8).eq_span(&note(2, 2, 8)));
        assert!(!note(1, 2, 8).eq_span(&note(1, 2, 9)));
    }
}
