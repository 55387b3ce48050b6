//! Re-keying of discontiguous same-id mark runs.
//!
//! After a paste or an undo, the document may contain the same mark id in
//! places that have drifted apart, e.g. `[note:1|test]` some
//! `[note:1|stuff]`. A rebuild scan coalesces by id, so left alone this
//! would fuse into one range spanning both extremes. This pass gives every
//! non-contiguous repeat of an id a fresh one; "contiguous" means the same
//! id repeated with no intervening unmarked text (judged per rail and
//! kind).

use std::collections::HashMap;

use text_rails_engine::{IdSource, RangeId};

use crate::document::MarkSpan;

/// Rewrites ids in place. The first run of each id keeps it, unless
/// `replace_all` asks for fresh ids throughout (the paste path, where
/// incoming ids must not collide with the document's).
pub fn sanitize_spans(marks: &mut Vec<MarkSpan>, replace_all: bool, ids: &dyn IdSource) {
    let mut order: Vec<usize> = (0..marks.len()).collect();
    order.sort_by(|&a, &b| {
        let a = &marks[a];
        let b = &marks[b];
        (&a.rail, &a.kind, a.from, a.to).cmp(&(&b.rail, &b.kind, b.from, b.to))
    });

    let mut group: Option<(String, text_rails_engine::Kind)> = None;
    let mut id_map: HashMap<RangeId, RangeId> = HashMap::new();
    // the run the walk is currently inside: its original id and end
    let mut run: Option<(RangeId, usize)> = None;

    for index in order {
        let span_group = (marks[index].rail.clone(), marks[index].kind.clone());
        if group.as_ref() != Some(&span_group) {
            group = Some(span_group);
            id_map.clear();
            run = None;
        }

        let (old_id, from, to) = (marks[index].id, marks[index].from, marks[index].to);
        let continues = run.is_some_and(|(id, end)| id == old_id && from <= end);
        if continues {
            let (_, end) = run.as_mut().unwrap();
            *end = (*end).max(to);
        } else {
            let fresh = id_map.contains_key(&old_id) || replace_all;
            let new_id = if fresh { ids.next_id() } else { old_id };
            id_map.insert(old_id, new_id);
            run = Some((old_id, to));
        }
        marks[index].id = id_map[&old_id];
    }
}
