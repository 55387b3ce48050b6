//! Range identity and the id-generation seam.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Stable identity of a range, preserved across edits and merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(Uuid);

impl RangeId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        RangeId(uuid)
    }

    /// The id a [`SequentialIds`] source yields for `n`. Handy for pinning
    /// expected ids in tests and fixtures.
    pub fn from_u64(n: u64) -> Self {
        RangeId(Uuid::from_u128(u128::from(n)))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sequential ids print as bare numbers, which keeps fixtures and
        // snapshots readable; random ids fall back to the full uuid.
        let n = self.0.as_u128();
        if n <= u128::from(u64::MAX) {
            write!(f, "{n}")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Source of fresh range ids.
///
/// Injected into every structure that can fabricate ranges, so tests can
/// substitute a deterministic sequence. Called at most once per newly
/// fabricated range per operation.
pub trait IdSource {
    fn next_id(&self) -> RangeId;
}

/// A shared handle to an id source; rails created from the same set share
/// one generator.
pub type SharedIds = Arc<dyn IdSource>;

/// Random v4 ids, the production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct V4Ids;

impl V4Ids {
    pub fn shared() -> SharedIds {
        Arc::new(V4Ids)
    }
}

impl IdSource for V4Ids {
    fn next_id(&self) -> RangeId {
        RangeId(Uuid::new_v4())
    }
}

/// Monotonic ids starting at 1, for deterministic tests and fixtures.
#[derive(Debug)]
pub struct SequentialIds(AtomicU64);

impl SequentialIds {
    pub fn starting_at(n: u64) -> Self {
        SequentialIds(AtomicU64::new(n))
    }

    pub fn shared() -> SharedIds {
        Arc::new(Self::default())
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> RangeId {
        RangeId::from_u64(self.0.fetch_add(1, Ordering::Relaxed))
    }
}
