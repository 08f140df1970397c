//! Persisting pending cursors across restarts
//!
//! A checkpoint file is JSON lines: a header with the level list, then one
//! cursor record per line in drain order.
//!
//! ```text
//! {"levels":["PullRequest","PullRequestReview","PullRequestReviewComment","Reaction"]}
//! {"resource_kind":"Reaction","cursor_token":"c2","parent_id":"p1","sequence_number":1}
//! {"resource_kind":"PullRequest","cursor_token":"c1","parent_id":null,"sequence_number":0}
//! ```

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::QueueError;
use crate::level::Levels;
use crate::queue::CursorQueue;
use crate::record::CursorRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Header {
    levels: Levels,
}

/// Snapshot of a queue's pending work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub levels: Levels,
    /// Pending records in drain order
    pub pending: Vec<CursorRecord>,
}

impl Checkpoint {
    pub fn capture(queue: &CursorQueue) -> Self {
        debug!(pending = queue.size(), "Checkpoint::capture: called");
        Self {
            levels: queue.levels().clone(),
            pending: queue.pending(),
        }
    }

    /// Write the checkpoint, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create checkpoint directory")?;
        }

        let mut file =
            fs::File::create(path).context(format!("Failed to create checkpoint {}", path.display()))?;

        let header = Header {
            levels: self.levels.clone(),
        };
        writeln!(file, "{}", serde_json::to_string(&header)?)?;
        for record in &self.pending {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }

        info!(path = %path.display(), pending = self.pending.len(), "Checkpoint saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).context(format!("Failed to open checkpoint {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        let header_line = lines
            .next()
            .ok_or_else(|| eyre!("Checkpoint {} is empty", path.display()))??;
        let header: Header = serde_json::from_str(&header_line).context("Invalid checkpoint header")?;

        let mut pending = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CursorRecord =
                serde_json::from_str(&line).context(format!("Invalid checkpoint record on line {}", i + 2))?;
            pending.push(record);
        }

        debug!(path = %path.display(), pending = pending.len(), "Checkpoint loaded");
        Ok(Self {
            levels: header.levels,
            pending,
        })
    }

    /// Rebuild a queue by enqueuing the pending records in saved order.
    ///
    /// Sequence numbers are reassigned; the relative drain order is kept.
    pub fn restore(&self) -> Result<CursorQueue, QueueError> {
        let mut queue = CursorQueue::with_levels(self.levels.clone());
        for record in &self.pending {
            queue.enqueue(&record.resource_kind, record.cursor_token.clone(), record.parent_id.clone())?;
        }
        Ok(queue)
    }
}
