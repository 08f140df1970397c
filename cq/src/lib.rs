//! CursorQueue - depth-first scheduling of nested pagination cursors
//!
//! A crawl of a paginated resource hierarchy (pull requests → reviews →
//! review comments → reactions) produces "more pages" cursors at several
//! levels at once. [`CursorQueue`] hands them back deepest level first, and in
//! insertion order within a level, so every nested collection is exhausted
//! before its parent's next page is requested.
//!
//! # Modules
//!
//! - [`queue`] - the priority cursor queue
//! - [`level`] - level labels and priority ranks
//! - [`crawl`] - crawl driver over an abstract page source
//! - [`checkpoint`] - saving and restoring pending cursors
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```
//! use cursorqueue::CursorQueue;
//!
//! let mut queue = CursorQueue::new(["PullRequest", "PullRequestReview", "PullRequestReviewComment", "Reaction"])?;
//! queue.enqueue("PullRequest", Some("c1".into()), None)?;
//! queue.enqueue("Reaction", Some("c2".into()), Some("p1".into()))?;
//!
//! assert_eq!(queue.dequeue().unwrap().resource_kind, "Reaction");
//! assert_eq!(queue.dequeue().unwrap().resource_kind, "PullRequest");
//! assert!(queue.dequeue().is_none());
//! # Ok::<(), cursorqueue::QueueError>(())
//! ```

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod level;
pub mod queue;
pub mod record;

pub use checkpoint::Checkpoint;
pub use config::Config;
pub use crawl::{CrawlOptions, CrawlScript, CrawlSummary, Crawler, FollowUp, Page, PageSource, ScriptedSource, Visit};
pub use error::QueueError;
pub use level::{DEFAULT_LEVELS, Levels};
pub use queue::{CursorQueue, QueueStats};
pub use record::CursorRecord;
