//! Cursor records and their heap ordering

use serde::{Deserialize, Serialize};

/// One unit of pending pagination work
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorRecord {
    /// Hierarchy level this cursor pages through
    pub resource_kind: String,
    /// Opaque token to resume from; `None` means the first page
    pub cursor_token: Option<String>,
    /// Owning parent resource, `None` for top-level cursors
    pub parent_id: Option<String>,
    /// Insertion counter, only used to break priority ties
    pub sequence_number: u64,
}

impl CursorRecord {
    pub fn new(
        resource_kind: impl Into<String>,
        cursor_token: Option<String>,
        parent_id: Option<String>,
        sequence_number: u64,
    ) -> Self {
        Self {
            resource_kind: resource_kind.into(),
            cursor_token,
            parent_id,
            sequence_number,
        }
    }
}

impl std::fmt::Display for CursorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_kind, self.cursor_token.as_deref().unwrap_or("-"))?;
        if let Some(parent) = &self.parent_id {
            write!(f, " (parent {})", parent)?;
        }
        Ok(())
    }
}

/// Heap entry pairing a record with its priority rank
#[derive(Debug, Clone)]
pub(crate) struct QueuedCursor {
    pub rank: usize,
    pub record: CursorRecord,
}

impl QueuedCursor {
    pub fn key(&self) -> (usize, u64) {
        (self.rank, self.record.sequence_number)
    }
}

impl Eq for QueuedCursor {}

impl PartialEq for QueuedCursor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Ord for QueuedCursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap: the smallest (rank, sequence) must compare greatest
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for QueuedCursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
