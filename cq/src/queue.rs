//! Priority cursor queue

use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::QueueError;
use crate::level::Levels;
use crate::record::{CursorRecord, QueuedCursor};

/// Counters for a queue instance
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueStats {
    pub total_enqueued: u64,
    pub total_dequeued: u64,
    pub peak_depth: usize,
    /// Pending records per level, in declaration order
    pub depth_by_level: Vec<(String, usize)>,
}

/// Strict-priority work queue over cursor records.
///
/// Records at the last declared level always dequeue before anything else;
/// records at the same level dequeue in insertion order. Not synchronized:
/// one crawl driver owns the queue.
#[derive(Debug, Clone)]
pub struct CursorQueue {
    levels: Levels,
    heap: BinaryHeap<QueuedCursor>,
    next_sequence: u64,
    stats: QueueStats,
}

impl CursorQueue {
    /// Create an empty queue for the given levels, outermost first
    pub fn new<I, S>(levels: I) -> Result<Self, QueueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::with_levels(Levels::new(levels)?))
    }

    pub fn with_levels(levels: Levels) -> Self {
        debug!(%levels, "CursorQueue::with_levels: called");
        Self {
            levels,
            heap: BinaryHeap::new(),
            next_sequence: 0,
            stats: QueueStats::default(),
        }
    }

    /// Add a cursor. Unknown kinds are rejected and leave the queue untouched.
    pub fn enqueue(
        &mut self,
        resource_kind: &str,
        cursor_token: Option<String>,
        parent_id: Option<String>,
    ) -> Result<(), QueueError> {
        debug!(%resource_kind, ?cursor_token, ?parent_id, "CursorQueue::enqueue: called");
        let rank = self.levels.rank(resource_kind)?;

        let sequence_number = self.next_sequence;
        self.next_sequence += 1;

        self.heap.push(QueuedCursor {
            rank,
            record: CursorRecord::new(resource_kind, cursor_token, parent_id, sequence_number),
        });

        self.stats.total_enqueued += 1;
        self.stats.peak_depth = self.stats.peak_depth.max(self.heap.len());
        Ok(())
    }

    /// Put a dequeued record back under its original sequence number, so it
    /// keeps its place ahead of later siblings.
    pub(crate) fn requeue(&mut self, record: CursorRecord) -> Result<(), QueueError> {
        debug!(%record, "CursorQueue::requeue: called");
        let rank = self.levels.rank(&record.resource_kind)?;
        self.next_sequence = self.next_sequence.max(record.sequence_number + 1);
        self.heap.push(QueuedCursor { rank, record });
        self.stats.peak_depth = self.stats.peak_depth.max(self.heap.len());
        Ok(())
    }

    /// Remove the highest priority, earliest inserted record.
    ///
    /// `None` means there is no pending work; it is not an error.
    pub fn dequeue(&mut self) -> Option<CursorRecord> {
        let entry = self.heap.pop()?;
        self.stats.total_dequeued += 1;
        debug!(record = %entry.record, rank = entry.rank, "CursorQueue::dequeue: popped");
        Some(entry.record)
    }

    pub fn peek(&self) -> Option<&CursorRecord> {
        self.heap.peek().map(|entry| &entry.record)
    }

    /// Number of pending records
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    /// Pending records in the order they would be dequeued
    pub fn pending(&self) -> Vec<CursorRecord> {
        self.heap
            .clone()
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|entry| entry.record)
            .collect()
    }

    /// Drop all pending records. Counters and sequence numbers continue.
    pub fn clear(&mut self) {
        debug!(dropped = self.heap.len(), "CursorQueue::clear: called");
        self.heap.clear();
    }

    pub fn stats(&self) -> QueueStats {
        let mut stats = self.stats.clone();
        stats.depth_by_level = self
            .levels
            .labels()
            .iter()
            .map(|label| {
                let depth = self.heap.iter().filter(|e| &e.record.resource_kind == label).count();
                (label.clone(), depth)
            })
            .collect();
        stats
    }
}

impl Default for CursorQueue {
    fn default() -> Self {
        Self::with_levels(Levels::default())
    }
}
