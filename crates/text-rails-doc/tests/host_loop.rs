//! Drives the engine through the reference document the way a host
//! editing surface would: one `update` per edit event, marks
//! re-materialized from engine output after every mutating step.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use text_rails_doc::{Edit, MarkSpan, MarkedDoc};
use text_rails_engine::{
    IdentityMap, Kind, Position, RailSet, RangeId, RangeSource, SequentialIds, SharedIds,
    ToggleSpec,
};

struct Host {
    doc: MarkedDoc,
    rs: RailSet,
    ids: SharedIds,
}

impl Host {
    fn new(rail: &str, markup: &str) -> Host {
        let doc = MarkedDoc::from_markup(rail, markup).expect("valid fixture markup");
        let ids: SharedIds = Arc::new(SequentialIds::starting_at(100));
        let rs = RailSet::from_source([rail], &doc as &dyn RangeSource, ids.clone(), 0, 0);
        Host { doc, rs, ids }
    }

    fn select(&mut self, from: Position, to: Position) {
        self.rs = self.rs.update(&IdentityMap, from, to, false, None, None);
    }

    fn edit(&mut self, edit: Edit, from: Position, to: Position) {
        let map = self.doc.apply(&edit).expect("edit in bounds");
        self.rs = self.rs.update(&map, from, to, true, None, None);
        self.rematerialize();
    }

    fn toggle(&mut self, rail: &str, kind: &str) {
        self.rs = self.rs.update(
            &IdentityMap,
            self.rs.selection().0,
            self.rs.selection().1,
            false,
            None,
            Some(&ToggleSpec::new(rail, kind)),
        );
        self.rematerialize();
    }

    /// The host contract: drop all of a rail's marks and reapply exactly
    /// the engine's exported list.
    fn rematerialize(&mut self) {
        let names: Vec<String> = self.rs.rail_names().map(str::to_string).collect();
        for name in names {
            let ranges: Vec<_> = self.rs.rail(&name).unwrap().ranges().cloned().collect();
            self.doc.apply_ranges(&name, ranges.iter());
        }
    }

    /// An undo/redo/paste-shaped step: sanitize the document's marks,
    /// then rebuild every rail from a fresh scan.
    fn rebuild(&mut self, from: Position, to: Position) {
        self.doc.sanitize(false, &*self.ids);
        self.rs = self.rs.update(
            &IdentityMap,
            from,
            to,
            true,
            Some(&self.doc as &dyn RangeSource),
            None,
        );
        self.rematerialize();
    }

    fn markup(&self, rail: &str) -> String {
        self.doc.to_markup(rail)
    }
}

#[test]
fn toggling_a_selection_marks_the_text() {
    let mut host = Host::new("margin", "hello world");
    host.select(0, 5);
    host.toggle("margin", "note");
    assert_eq!(host.markup("margin"), "[note:100|hello] world");

    // toggling the same selection again unmarks it
    host.toggle("margin", "note");
    assert_eq!(host.markup("margin"), "hello world");
}

#[test]
fn typing_inside_a_range_grows_it() {
    let mut host = Host::new("margin", "ab[note:1|cd]ef");
    host.select(3, 3);
    host.edit(
        Edit::Insert { at: 3, text: "XY".to_string() },
        5,
        5,
    );
    assert_eq!(host.markup("margin"), "ab[note:1|cXYd]ef");
}

#[test]
fn typing_at_a_range_end_with_a_neutral_cursor_extends_it() {
    let mut host = Host::new("margin", "ab[note:1|cd]ef");
    // a click on the boundary: neutral bias, cursor at the range end
    host.select(4, 4);
    host.edit(
        Edit::Insert { at: 4, text: "X".to_string() },
        5,
        5,
    );
    assert_eq!(host.markup("margin"), "ab[note:1|cdX]ef");
}

#[test]
fn deleting_a_range_entirely_removes_it() {
    let mut host = Host::new("margin", "ab[note:1|cd]ef");
    host.select(1, 1);
    host.edit(Edit::Delete { from: 1, to: 5 }, 1, 1);
    assert_eq!(host.markup("margin"), "af");
    assert_eq!(host.rs.ranges().count(), 0);
}

#[test]
fn toggling_a_sub_span_off_splits_the_mark() {
    let mut host = Host::new("margin", "[note:1|abcdef]");
    host.select(2, 4);
    host.toggle("margin", "note");

    let spans: Vec<_> = host
        .rs
        .ranges()
        .map(|(_, r)| (r.from(), r.to(), r.id()))
        .collect();
    assert_eq!((spans[0].0, spans[0].1), (0, 2));
    assert_eq!(spans[0].2, RangeId::from_u64(1));
    assert_eq!((spans[1].0, spans[1].1), (4, 6));
    assert_ne!(spans[1].2, RangeId::from_u64(1));
}

#[test]
fn placeholder_becomes_a_mark_once_text_is_typed() {
    let mut host = Host::new("margin", "plain text");
    host.select(5, 5);
    host.toggle("margin", "note");
    // nothing in the document yet, only the pending preview
    assert_eq!(host.markup("margin"), "plain text");
    assert!(host.rs.placeholder().is_some());

    host.edit(
        Edit::Insert { at: 5, text: "new".to_string() },
        8,
        8,
    );
    assert_eq!(host.markup("margin"), "plain[note:100|new] text");
    assert!(host.rs.placeholder().is_none());
}

#[test]
fn pasted_marks_get_fresh_ids() {
    let mut host = Host::new("margin", "[note:1|ab] and ");
    // paste a copy of the note at the end of "ab and "
    host.doc
        .insert_markup(7, "margin", "[note:1|copy]", &*host.ids)
        .unwrap();
    let pasted = host
        .doc
        .marks()
        .iter()
        .find(|m| m.from == 7)
        .expect("pasted mark present");
    assert_ne!(pasted.id, RangeId::from_u64(1));

    // the rebuild keeps the two notes separate
    host.rebuild(11, 11);
    let spans: Vec<_> = host
        .rs
        .ranges()
        .map(|(_, r)| (r.from(), r.to()))
        .collect();
    assert_eq!(spans, vec![(0, 2), (7, 11)]);
}

#[test]
fn rebuild_after_marks_drift_apart_does_not_fuse_them() {
    let mut host = Host::new("margin", "ab--cd");
    // a history step left the same id in two drifted-apart places
    for (from, to) in [(0, 2), (4, 6)] {
        host.doc.push_mark(MarkSpan {
            rail: "margin".to_string(),
            kind: Kind::new("note"),
            id: RangeId::from_u64(1),
            from,
            to,
        });
    }

    host.rebuild(0, 0);
    let spans: Vec<_> = host
        .rs
        .ranges()
        .map(|(_, r)| (r.from(), r.to(), r.id()))
        .collect();
    // two ranges, not one fused [0,6); the first keeps its id
    assert_eq!((spans[0].0, spans[0].1), (0, 2));
    assert_eq!(spans[0].2, RangeId::from_u64(1));
    assert_eq!((spans[1].0, spans[1].1), (4, 6));
    assert_ne!(spans[1].2, RangeId::from_u64(1));
}

#[test]
fn cursoring_over_document_marks_follows_the_reference_walk() {
    let host = Host::new("margin", "a[note:1|b]c[note:2|d][flag:3|e]f");
    // marks sit at [1,2), [3,4), [4,5): the canonical walk fixture
    let mut rs = host.rs.update(&IdentityMap, 1, 1, false, None, None);
    let mut visited = Vec::new();
    for _ in 0..10 {
        rs = rs.update_cursor(rs.cursor().unwrap() + 1);
        let coverage = rs
            .range_at("margin", rs.cursor().unwrap())
            .map(|r| r.id().to_string());
        visited.push((rs.cursor().unwrap(), coverage));
    }
    let expected = vec![
        (1, Some("1".to_string())),
        (2, Some("1".to_string())),
        (2, None),
        (3, None),
        (3, Some("2".to_string())),
        (4, Some("2".to_string())),
        (4, None),
        (4, Some("3".to_string())),
        (5, Some("3".to_string())),
        (5, None),
    ];
    assert_eq!(visited, expected);
}
