//! Crawl driver
//!
//! Drains a [`CursorQueue`](crate::CursorQueue) against a [`PageSource`],
//! enqueuing the follow-up cursors each fetched page reports so nested
//! collections are exhausted before their parents move on.

mod driver;
mod script;

pub use driver::{CrawlOptions, CrawlSummary, Crawler, FollowUp, Page, PageSource, Visit};
pub use script::{CrawlScript, ScriptedPage, ScriptedSource};
