//! Serializable descriptions of a rail set.
//!
//! Hosts can ship these over a boundary or log them; tests snapshot the
//! `Display` form, which keeps one rail per line in deterministic order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ranges::rail_set::RailSet;

/// One range, flattened to plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeSnap {
    pub id: String,
    pub from: usize,
    pub to: usize,
    pub kind: String,
}

/// A rail set, flattened to plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RailSetSnap {
    pub cursor: Option<usize>,
    pub bias: String,
    pub rails: BTreeMap<String, Vec<RangeSnap>>,
    pub placeholder: Option<RangeSnap>,
}

/// Flattens a rail set; ranges are ordered by position within each rail.
pub fn describe(rs: &RailSet) -> RailSetSnap {
    let mut rails: BTreeMap<String, Vec<RangeSnap>> = rs
        .rail_names()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    for (name, range) in rs.ranges() {
        rails
            .get_mut(name)
            .expect("ranges() only yields known rails")
            .push(RangeSnap {
                id: range.id().to_string(),
                from: range.from(),
                to: range.to(),
                kind: range.kind().to_string(),
            });
    }
    for ranges in rails.values_mut() {
        ranges.sort_by_key(|r| (r.from, r.to, r.kind.clone()));
    }
    RailSetSnap {
        cursor: rs.cursor(),
        bias: format!("{:?}", rs.bias()),
        rails,
        placeholder: rs.placeholder().map(|ph| RangeSnap {
            id: ph.range().id().to_string(),
            from: ph.range().from(),
            to: ph.range().to(),
            kind: ph.range().kind().to_string(),
        }),
    }
}

impl fmt::Display for RailSetSnap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cursor {
            Some(pos) => write!(f, "cursor={pos} bias={}", self.bias)?,
            None => write!(f, "cursor=- bias={}", self.bias)?,
        }
        for (name, ranges) in &self.rails {
            write!(f, "\n{name}:")?;
            if ranges.is_empty() {
                write!(f, " (empty)")?;
            }
            for r in ranges {
                write!(f, " {}[{},{})#{}", r.kind, r.from, r.to, r.id)?;
            }
        }
        if let Some(ph) = &self.placeholder {
            write!(f, "\npending: {}[{},{})#{}", ph.kind, ph.from, ph.to, ph.id)?;
        }
        Ok(())
    }
}
