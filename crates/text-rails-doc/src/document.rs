//! The reference host document: an `xi-rope` buffer plus flat mark spans.
//!
//! Edits compile to deltas and are applied buffer-first; mark spans are
//! transformed through the delta, the way an editor keeps stable
//! references alive across edits. The engine remains the authority on
//! range geometry: after every engine update the host calls
//! [`MarkedDoc::apply_ranges`] to replace a rail's marks with the
//! engine's exported list.

use xi_rope::interval::Interval;
use xi_rope::{Delta, Rope, RopeInfo};

use text_rails_engine::{Assoc, Kind, PositionMap, Position, Range, RangeId};

use crate::mapping::DeltaMap;
use crate::sanitize::sanitize_spans;

/// One contiguous run of marked text. Several spans may share an id when a
/// mark has been fragmented by edits; the scan coalesces them by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub rail: String,
    pub kind: Kind,
    pub id: RangeId,
    pub from: Position,
    pub to: Position,
}

/// A host edit, compiled to a delta on application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { at: Position, text: String },
    Delete { from: Position, to: Position },
    Replace { from: Position, to: Position, text: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("edit out of bounds: {from}..{to} beyond document length {len}")]
    OutOfBounds { from: Position, to: Position, len: usize },
    #[error("unbalanced markup: {0}")]
    Markup(String),
}

pub struct MarkedDoc {
    buffer: Rope,
    marks: Vec<MarkSpan>,
    version: u64,
}

impl MarkedDoc {
    pub fn new(text: &str) -> Self {
        MarkedDoc {
            buffer: Rope::from(text),
            marks: Vec::new(),
            version: 0,
        }
    }

    /// Parses fixture markup where marked spans are written inline as
    /// `[kind:id|text]`, e.g. `"ab[note:1|cd]ef"`. Every mark belongs to
    /// `rail`; marks do not nest.
    pub fn from_markup(rail: &str, markup: &str) -> anyhow::Result<Self> {
        let mut text = String::new();
        let mut marks = Vec::new();
        let mut open: Option<(Kind, RangeId, Position)> = None;

        let mut chars = markup.chars();
        while let Some(c) = chars.next() {
            match c {
                '[' if open.is_none() => {
                    let mut header = String::new();
                    loop {
                        match chars.next() {
                            Some('|') => break,
                            Some('[') | Some(']') | None => {
                                return Err(DocError::Markup(format!(
                                    "mark header `{header}` not closed with `|`"
                                ))
                                .into());
                            }
                            Some(c) => header.push(c),
                        }
                    }
                    let (kind, id) = header.split_once(':').ok_or_else(|| {
                        DocError::Markup(format!("mark header `{header}` is not `kind:id`"))
                    })?;
                    let id: u64 = id.parse().map_err(|_| {
                        DocError::Markup(format!("mark id `{id}` is not a number"))
                    })?;
                    open = Some((Kind::new(kind), RangeId::from_u64(id), text.len()));
                }
                '[' => {
                    return Err(DocError::Markup("marks do not nest".to_string()).into());
                }
                ']' => {
                    let Some((kind, id, from)) = open.take() else {
                        return Err(DocError::Markup("unmatched `]`".to_string()).into());
                    };
                    marks.push(MarkSpan {
                        rail: rail.to_string(),
                        kind,
                        id,
                        from,
                        to: text.len(),
                    });
                }
                c => text.push(c),
            }
        }
        if open.is_some() {
            return Err(DocError::Markup("unterminated mark".to_string()).into());
        }

        Ok(MarkedDoc {
            buffer: Rope::from(text.as_str()),
            marks,
            version: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn marks(&self) -> &[MarkSpan] {
        &self.marks
    }

    pub fn push_mark(&mut self, span: MarkSpan) {
        self.marks.push(span);
    }

    /// Applies an edit buffer-first, transforms every mark span through
    /// the delta, and returns the position map for the engine update.
    pub fn apply(&mut self, edit: &Edit) -> Result<DeltaMap, DocError> {
        let delta = self.compile_edit(edit)?;
        self.buffer = delta.apply(&self.buffer);
        let map = DeltaMap::new(delta);
        for span in &mut self.marks {
            span.from = map.map(span.from, Assoc::After);
            span.to = map.map(span.to, Assoc::After);
        }
        self.marks.retain(|span| span.from < span.to);
        self.version += 1;
        Ok(map)
    }

    /// Replaces every mark of `rail` with the engine's exported range
    /// list, which is the complete normalized target state.
    pub fn apply_ranges<'a>(&mut self, rail: &str, ranges: impl IntoIterator<Item = &'a Range>) {
        self.marks.retain(|span| span.rail != rail);
        for range in ranges {
            if !range.is_empty() {
                self.marks.push(MarkSpan {
                    rail: rail.to_string(),
                    kind: range.kind().clone(),
                    id: range.id(),
                    from: range.from(),
                    to: range.to(),
                });
            }
        }
        self.marks.sort_by_key(|span| (span.from, span.to));
        self.version += 1;
    }

    /// The paste path: splices a markup fragment at `at`, giving every
    /// incoming mark a fresh id so pasted copies never collide with marks
    /// already in the document.
    pub fn insert_markup(
        &mut self,
        at: Position,
        rail: &str,
        markup: &str,
        ids: &dyn text_rails_engine::IdSource,
    ) -> anyhow::Result<()> {
        let fragment = MarkedDoc::from_markup(rail, markup)?;
        let mut incoming = fragment.marks.clone();
        sanitize_spans(&mut incoming, true, ids);

        self.apply(&Edit::Insert { at, text: fragment.text() })?;
        for span in incoming {
            self.marks.push(MarkSpan {
                from: at + span.from,
                to: at + span.to,
                ..span
            });
        }
        self.marks.sort_by_key(|span| (span.from, span.to));
        Ok(())
    }

    /// Re-keys non-contiguous repeats of a mark id, per rail and kind.
    /// Run before a rebuild scan so drifted-apart spans cannot fuse.
    pub fn sanitize(&mut self, replace_all_ids: bool, ids: &dyn text_rails_engine::IdSource) {
        sanitize_spans(&mut self.marks, replace_all_ids, ids);
    }

    /// Renders `rail`'s marks back into fixture markup.
    pub fn to_markup(&self, rail: &str) -> String {
        let text = self.text();
        let mut spans: Vec<&MarkSpan> = self.marks.iter().filter(|m| m.rail == rail).collect();
        spans.sort_by_key(|span| (span.from, span.to));

        let mut out = String::new();
        let mut pos = 0;
        for span in spans {
            if span.from < pos {
                continue;
            }
            out.push_str(&text[pos..span.from]);
            out.push('[');
            out.push_str(span.kind.as_str());
            out.push(':');
            out.push_str(&span.id.to_string());
            out.push('|');
            out.push_str(&text[span.from..span.to]);
            out.push(']');
            pos = span.to;
        }
        out.push_str(&text[pos..]);
        out
    }

    fn compile_edit(&self, edit: &Edit) -> Result<Delta<RopeInfo>, DocError> {
        let len = self.buffer.len();
        let (from, to, text) = match edit {
            Edit::Insert { at, text } => (*at, *at, text.as_str()),
            Edit::Delete { from, to } => (*from, *to, ""),
            Edit::Replace { from, to, text } => (*from, *to, text.as_str()),
        };
        if from > to || to > len {
            return Err(DocError::OutOfBounds { from, to, len });
        }
        Ok(Delta::simple_edit(
            Interval::new(from, to),
            Rope::from(text),
            len,
        ))
    }
}
