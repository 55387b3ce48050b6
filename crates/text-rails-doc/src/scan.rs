//! The full-document range scan backing engine rebuilds.

use std::collections::HashMap;

use text_rails_engine::{RangeSource, RangeSpec};

use crate::document::MarkedDoc;

impl RangeSource for MarkedDoc {
    /// One spec per distinct id on `rail`: the id's minimal `from` and
    /// maximal `to` across every span carrying it, in first-seen order.
    /// Coalescing only by id is deliberate; the sanitize pass has already
    /// re-keyed spans that must not fuse.
    fn read_ranges(&self, rail: &str) -> Vec<RangeSpec> {
        let mut specs: Vec<RangeSpec> = Vec::new();
        let mut by_id: HashMap<_, usize> = HashMap::new();
        for span in self.marks().iter().filter(|m| m.rail == rail) {
            match by_id.get(&span.id) {
                Some(&i) => {
                    specs[i].from = specs[i].from.min(span.from);
                    specs[i].to = specs[i].to.max(span.to);
                }
                None => {
                    by_id.insert(span.id, specs.len());
                    specs.push(RangeSpec {
                        id: span.id,
                        from: span.from,
                        to: span.to,
                        kind: span.kind.clone(),
                    });
                }
            }
        }
        specs
    }
}
