//! The `RailSet`: every rail for a document plus selection/cursor state,
//! cross-rail cursor-movement disambiguation, and the pending-placeholder
//! lifecycle for toggles at an uncovered cursor.

use std::collections::BTreeMap;

use crate::map::{PositionMap, RangeSource, ToggleSpec};
use crate::ranges::bias::{Bias, Dir, MoveType};
use crate::ranges::rail::Rail;
use crate::ranges::range::{Kind, Position, Range};

/// A pending zero-width range proposed at the cursor, not yet committed to
/// its rail. Previews where a forthcoming insertion will land after a
/// toggle at a cursor outside any existing coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    rail: String,
    range: Range,
}

impl Placeholder {
    pub fn rail(&self) -> &str {
        &self.rail
    }

    pub fn range(&self) -> &Range {
        &self.range
    }
}

/// Aggregate meaning of a one-step cursor move across every rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossRailMove {
    /// No rail's boundary is involved; the move goes through.
    Clean,
    /// One or more rails enter, or one or more leave, but not both: hold
    /// one step and record the attempted direction.
    OneSided,
    /// A sidestep directly between ranges, or one rail entering while
    /// another leaves: hold and reset.
    Straddling,
}

fn classify_move(moves: impl Iterator<Item = MoveType>) -> CrossRailMove {
    let mut saw_in = false;
    let mut saw_out = false;
    for move_type in moves {
        match move_type {
            MoveType::Between => return CrossRailMove::Straddling,
            MoveType::In => saw_in = true,
            MoveType::Out => saw_out = true,
            MoveType::None => {}
        }
    }
    match (saw_in, saw_out) {
        (true, true) => CrossRailMove::Straddling,
        (true, false) | (false, true) => CrossRailMove::OneSided,
        (false, false) => CrossRailMove::Clean,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RailSet {
    rails: BTreeMap<String, Rail>,
    from: Position,
    to: Position,
    bias: Bias,
    placeholder: Option<Placeholder>,
}

impl RailSet {
    /// Builds a set over named rails with an initial selection.
    ///
    /// The set starts without a meaningful prior cursor, so the first
    /// cursor update always reads as a jump.
    pub fn create<N>(rails: impl IntoIterator<Item = (N, Rail)>, from: Position, to: Position) -> RailSet
    where
        N: Into<String>,
    {
        RailSet {
            rails: rails.into_iter().map(|(n, r)| (n.into(), r)).collect(),
            from: 0,
            to: 0,
            bias: Bias::Unreachable,
            placeholder: None,
        }
        .update_selection(from, to, false)
    }

    /// Builds a set by scanning `source` for every named rail, the way a
    /// host boots from an existing document.
    pub fn from_source<N>(
        names: impl IntoIterator<Item = N>,
        source: &dyn RangeSource,
        ids: crate::ranges::ids::SharedIds,
        from: Position,
        to: Position,
    ) -> RailSet
    where
        N: Into<String>,
    {
        let rails: Vec<(String, Rail)> = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let rail = Rail::create(source.read_ranges(&name), ids.clone());
                (name, rail)
            })
            .collect();
        RailSet::create(rails, from, to)
    }

    /// The cursor position, or `None` when the selection is a span.
    pub fn cursor(&self) -> Option<Position> {
        (self.from == self.to).then_some(self.from)
    }

    pub fn selection(&self) -> (Position, Position) {
        (self.from, self.to)
    }

    pub fn bias(&self) -> Bias {
        self.bias
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    pub fn rail(&self, name: &str) -> Option<&Rail> {
        self.rails.get(name)
    }

    pub fn rails(&self) -> impl Iterator<Item = (&str, &Rail)> {
        self.rails.iter().map(|(name, rail)| (name.as_str(), rail))
    }

    pub fn rail_names(&self) -> impl Iterator<Item = &str> {
        self.rails.keys().map(String::as_str)
    }

    /// Every committed range, flattened across rails and tagged with its
    /// owning rail. This is the complete, normalized target state the host
    /// re-materializes marks from.
    pub fn ranges(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.rails
            .iter()
            .flat_map(|(name, rail)| rail.ranges().map(move |r| (name.as_str(), r)))
    }

    /// The range touching the zero-width position under the current bias.
    pub fn range_at(&self, rail_name: &str, pos: Position) -> Option<&Range> {
        self.rails.get(rail_name)?.range_at(pos, self.bias)
    }

    /// The cursor position iff it coincides exactly with some committed
    /// range's boundary; a caret-styling hint, nothing more.
    pub fn cursor_at_boundary(&self) -> Option<Position> {
        let cursor = self.cursor()?;
        self.rails
            .values()
            .flat_map(Rail::ranges)
            .any(|r| r.from() == cursor || r.to() == cursor)
            .then_some(cursor)
    }

    /// Overwrites or adds a rail.
    pub fn set_rail(&self, name: &str, rail: Rail) -> RailSet {
        let mut rails = self.rails.clone();
        rails.insert(name.to_string(), rail);
        RailSet { rails, ..self.clone() }
    }

    /// Moves the cursor without a document change.
    pub fn update_cursor(&self, pos: Position) -> RailSet {
        self.update_selection(pos, pos, false)
    }

    /// Recomputes selection/cursor state for a new `(from, to)`.
    pub fn update_selection(&self, from: Position, to: Position, doc_changed: bool) -> RailSet {
        if self.from == from && self.to == to && self.bias != Bias::Unreachable {
            return self.clone();
        }
        let next_cursor = (from == to).then_some(from);
        match (self.cursor(), next_cursor) {
            (Some(pos), Some(candidate)) if self.bias != Bias::Unreachable => {
                let (pos, bias) = self.next_cursor_spec(pos, candidate, doc_changed);
                self.with_selection(pos, pos, bias)
            }
            // a span selection on either side carries no boundary
            // ambiguity to resolve
            _ => self.with_selection(from, to, Bias::Neutral),
        }
    }

    /// Remaps every rail and the placeholder through one edit.
    ///
    /// Each endpoint takes a half-step nudge off the inverted cursor bias,
    /// so an insertion exactly at a boundary lands inside or outside
    /// according to which side the cursor logically occupies.
    pub fn map(&self, mapper: &dyn PositionMap) -> RailSet {
        let assoc_from = self.bias.assoc_from();
        let assoc_to = self.bias.assoc_to();
        let map_from = |pos| mapper.map(pos, assoc_from);
        let map_to = |pos| mapper.map(pos, assoc_to);
        let rails = self
            .rails
            .iter()
            .map(|(name, rail)| (name.clone(), rail.map_ends(map_from, map_to)))
            .collect();
        let placeholder = self.placeholder.as_ref().map(|ph| Placeholder {
            rail: ph.rail.clone(),
            range: ph.range.map_ends(map_from, map_to),
        });
        RailSet {
            rails,
            from: self.from,
            to: self.to,
            bias: self.bias,
            placeholder,
        }
    }

    /// The single entry point driven by a host edit event: remap (or
    /// rebuild), resolve the placeholder, recompute the cursor spec, then
    /// apply a pending toggle.
    pub fn update(
        &self,
        mapper: &dyn PositionMap,
        from: Position,
        to: Position,
        doc_changed: bool,
        rebuild: Option<&dyn RangeSource>,
        toggle: Option<&ToggleSpec>,
    ) -> RailSet {
        let next = match rebuild {
            // positional deltas can't be trusted (undo/redo/paste):
            // discard everything and re-read the document
            Some(source) => self.rebuilt_from(source).update_selection(from, to, false),
            None => self
                .map(mapper)
                .commit_grown_placeholder()
                .update_selection(from, to, doc_changed)
                .drop_abandoned_placeholder(),
        };
        match toggle {
            Some(spec) => next.toggle(&spec.rail, &spec.kind),
            None => next,
        }
    }

    /// Toggles `kind` on the named rail at the current selection.
    ///
    /// A span selection, or a cursor inside matching coverage, delegates
    /// to the rail. A cursor outside coverage proposes a placeholder
    /// instead of mutating the rail; a second identical toggle cancels it.
    ///
    /// # Panics
    ///
    /// Panics when no rail with that name is registered; that is a wiring
    /// bug between host configuration and call sites.
    pub fn toggle(&self, rail_name: &str, kind: &Kind) -> RailSet {
        let Some(rail) = self.rails.get(rail_name) else {
            panic!("no rail named `{rail_name}` registered; add it before toggling");
        };

        if let Some(cursor) = self.cursor() {
            if let Some(ph) = &self.placeholder
                && ph.rail == rail_name
                && ph.range.kind() == kind
                && ph.range.from() == cursor
            {
                // second toggle aborts the pending range
                let mut next = self.clone();
                next.placeholder = None;
                next.bias = Bias::Neutral;
                return next;
            }
            if !self.removal_applies(rail, cursor, kind) {
                // nothing to remove here: propose a range so the host can
                // preview it; LeftSoft makes it absorb the next insertion
                let range = Range::new(rail.fresh_id(), cursor, cursor, kind.clone());
                let mut next = self.clone();
                next.placeholder = Some(Placeholder {
                    rail: rail_name.to_string(),
                    range,
                });
                next.bias = Bias::LeftSoft;
                return next;
            }
        }

        let toggled = rail.toggle(self.from, self.to, self.bias, kind);
        let mut next = self.set_rail(rail_name, toggled);
        next.placeholder = None;
        next
    }

    /// Whether a cursor toggle would remove existing coverage rather than
    /// add: both bias-defaulted probes resolve to one range of `kind`.
    fn removal_applies(&self, rail: &Rail, cursor: Position, kind: &Kind) -> bool {
        let r_from = rail.range_at(cursor, self.bias.or(Bias::Right));
        let r_to = rail.range_at(cursor, self.bias.or(Bias::Left));
        matches!(
            (r_from, r_to),
            (Some(a), Some(b)) if a.eq_span(b) && a.kind() == kind
        )
    }

    fn rebuilt_from(&self, source: &dyn RangeSource) -> RailSet {
        let rails = self
            .rails
            .iter()
            .map(|(name, rail)| (name.clone(), Rail::create(source.read_ranges(name), rail.ids())))
            .collect();
        RailSet {
            rails,
            from: 0,
            to: 0,
            bias: Bias::Unreachable,
            placeholder: None,
        }
    }

    /// Commits a placeholder that an edit grew into a real span; it joins
    /// its rail through `add`, so abutting same-kind neighbors merge.
    fn commit_grown_placeholder(&self) -> RailSet {
        let Some(ph) = &self.placeholder else {
            return self.clone();
        };
        if ph.range.is_empty() {
            return self.clone();
        }
        let committed = self.rails[&ph.rail].add(
            ph.range.from(),
            ph.range.to(),
            ph.range.kind().clone(),
            Some(ph.range.id()),
        );
        let mut next = self.set_rail(&ph.rail, committed);
        next.placeholder = None;
        next
    }

    /// Discards a still-empty placeholder once the cursor leaves it.
    fn drop_abandoned_placeholder(&self) -> RailSet {
        match &self.placeholder {
            Some(ph) if self.cursor() != Some(ph.range.from()) => {
                let mut next = self.clone();
                next.placeholder = None;
                next
            }
            _ => self.clone(),
        }
    }

    fn next_cursor_spec(&self, pos: Position, candidate: Position, doc_changed: bool) -> (Position, Bias) {
        if doc_changed {
            // an edit carried the cursor along; trust it and keep the bias
            return (candidate, self.bias);
        }
        let offset = candidate as isize - pos as isize;
        let Some(dir) = Dir::from_offset(offset) else {
            // a deliberate jump (click, word-wise motion, ...)
            return (candidate, Bias::Neutral);
        };
        let moves = self
            .rails
            .values()
            .map(|rail| rail.get_move_type(pos, dir, self.bias));
        match classify_move(moves) {
            CrossRailMove::Straddling => (pos, Bias::Neutral),
            CrossRailMove::OneSided => (pos, dir.bias()),
            CrossRailMove::Clean => (candidate, dir.opposite().bias()),
        }
    }

    fn with_selection(&self, from: Position, to: Position, bias: Bias) -> RailSet {
        RailSet {
            rails: self.rails.clone(),
            from,
            to,
            bias,
            placeholder: self.placeholder.clone(),
        }
    }
}
