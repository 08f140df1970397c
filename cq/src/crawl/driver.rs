//! Crawler implementation

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::queue::CursorQueue;
use crate::record::CursorRecord;

/// A cursor reported by a fetched page for a level with more pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub resource_kind: String,
    #[serde(default)]
    pub cursor_token: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl FollowUp {
    pub fn new(resource_kind: impl Into<String>, cursor_token: Option<String>, parent_id: Option<String>) -> Self {
        Self {
            resource_kind: resource_kind.into(),
            cursor_token,
            parent_id,
        }
    }
}

/// Result of fetching one cursor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Records emitted by this fetch
    #[serde(default)]
    pub records: usize,
    /// Cursors for levels that still have pages
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
}

/// Anything that can fetch the page a cursor points at
pub trait PageSource {
    fn fetch(&mut self, cursor: &CursorRecord) -> Result<Page>;
}

impl<F> PageSource for F
where
    F: FnMut(&CursorRecord) -> Result<Page>,
{
    fn fetch(&mut self, cursor: &CursorRecord) -> Result<Page> {
        self(cursor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Stop after this many fetches, leaving the rest pending
    pub max_fetches: Option<usize>,
}

/// One completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub cursor: CursorRecord,
    pub records: usize,
    pub follow_ups: usize,
}

/// Totals for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub fetches: usize,
    pub records: usize,
    pub follow_ups: usize,
    /// True when the queue was drained
    pub completed: bool,
    /// Fetches per level, in declaration order
    pub per_level: Vec<(String, usize)>,
}

/// Single-threaded crawl driver owning its queue
pub struct Crawler {
    queue: CursorQueue,
    options: CrawlOptions,
    summary: CrawlSummary,
}

impl Crawler {
    pub fn new(queue: CursorQueue, options: CrawlOptions) -> Self {
        debug!(pending = queue.size(), ?options, "Crawler::new: called");
        let per_level = queue.levels().labels().iter().map(|l| (l.clone(), 0)).collect();
        Self {
            queue,
            options,
            summary: CrawlSummary {
                per_level,
                ..Default::default()
            },
        }
    }

    /// Enqueue a starting cursor
    pub fn seed(&mut self, resource_kind: &str, cursor_token: Option<String>, parent_id: Option<String>) -> Result<()> {
        self.queue
            .enqueue(resource_kind, cursor_token, parent_id)
            .context("Failed to seed crawl")
    }

    pub fn queue(&self) -> &CursorQueue {
        &self.queue
    }

    pub fn into_queue(self) -> CursorQueue {
        self.queue
    }

    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Fetch the next pending cursor and enqueue its follow-ups.
    ///
    /// Returns `Ok(None)` when nothing is pending. On failure the cursor is put
    /// back in its original position so it can be retried or checkpointed.
    pub fn step(&mut self, source: &mut dyn PageSource) -> Result<Option<Visit>> {
        let Some(cursor) = self.queue.dequeue() else {
            debug!("Crawler::step: queue empty");
            return Ok(None);
        };
        debug!(%cursor, "Crawler::step: fetching");

        let page = match source.fetch(&cursor) {
            Ok(page) => page,
            Err(err) => {
                warn!(%cursor, error = %err, "Fetch failed, cursor returned to queue");
                self.requeue(&cursor)?;
                return Err(err.wrap_err(format!("Failed to fetch {}", cursor)));
            }
        };

        if let Some(bad) = page.follow_ups.iter().find(|f| !self.queue.levels().contains(&f.resource_kind)) {
            let kind = bad.resource_kind.clone();
            self.requeue(&cursor)?;
            return Err(eyre!("Page for {} reported a follow-up at unknown level {}", cursor, kind));
        }

        for follow_up in &page.follow_ups {
            self.queue.enqueue(
                &follow_up.resource_kind,
                follow_up.cursor_token.clone(),
                follow_up.parent_id.clone(),
            )?;
        }

        self.summary.fetches += 1;
        self.summary.records += page.records;
        self.summary.follow_ups += page.follow_ups.len();
        if let Some((_, count)) = self
            .summary
            .per_level
            .iter_mut()
            .find(|(label, _)| *label == cursor.resource_kind)
        {
            *count += 1;
        }

        Ok(Some(Visit {
            records: page.records,
            follow_ups: page.follow_ups.len(),
            cursor,
        }))
    }

    /// Drain the queue, calling `on_visit` after every fetch
    pub fn run_with<F>(&mut self, source: &mut dyn PageSource, mut on_visit: F) -> Result<CrawlSummary>
    where
        F: FnMut(&Visit),
    {
        let mut fetched = 0usize;
        loop {
            if let Some(max) = self.options.max_fetches
                && fetched >= max
            {
                debug!(max, "Crawler::run: fetch limit reached");
                break;
            }
            match self.step(source)? {
                Some(visit) => {
                    fetched += 1;
                    on_visit(&visit);
                }
                None => break,
            }
        }

        self.summary.completed = self.queue.is_empty();
        info!(
            fetches = self.summary.fetches,
            records = self.summary.records,
            pending = self.queue.size(),
            completed = self.summary.completed,
            "Crawl finished"
        );
        Ok(self.summary.clone())
    }

    pub fn run(&mut self, source: &mut dyn PageSource) -> Result<CrawlSummary> {
        self.run_with(source, |_| {})
    }

    fn requeue(&mut self, cursor: &CursorRecord) -> Result<()> {
        self.queue
            .requeue(cursor.clone())
            .context("Failed to return cursor to queue")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    /// One pull request page with two reviews, the first of which has a second page
    fn tree_source() -> impl FnMut(&CursorRecord) -> Result<Page> {
        let mut pages: HashMap<(String, Option<String>), Page> = HashMap::new();
        pages.insert(
            ("PullRequest".to_string(), None),
            Page {
                records: 2,
                follow_ups: vec![
                    FollowUp::new("PullRequest", s("pr-2"), None),
                    FollowUp::new("PullRequestReview", s("rv-2"), s("PR_1")),
                    FollowUp::new("PullRequestReviewComment", s("cm-2"), s("RV_1")),
                ],
            },
        );
        pages.insert(("PullRequest".to_string(), s("pr-2")), Page { records: 1, follow_ups: vec![] });
        pages.insert(
            ("PullRequestReview".to_string(), s("rv-2")),
            Page {
                records: 3,
                follow_ups: vec![FollowUp::new("Reaction", s("re-2"), s("CM_9"))],
            },
        );
        pages.insert(("PullRequestReviewComment".to_string(), s("cm-2")), Page { records: 4, follow_ups: vec![] });
        pages.insert(("Reaction".to_string(), s("re-2")), Page { records: 5, follow_ups: vec![] });

        move |cursor: &CursorRecord| {
            pages
                .get(&(cursor.resource_kind.clone(), cursor.cursor_token.clone()))
                .cloned()
                .ok_or_else(|| eyre!("missing page"))
        }
    }

    #[test]
    fn test_crawl_is_depth_first() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        crawler.seed("PullRequest", None, None).unwrap();

        let mut source = tree_source();
        let mut order = Vec::new();
        let summary = crawler
            .run_with(&mut source, |visit| {
                order.push(visit.cursor.cursor_token.clone().unwrap_or_default())
            })
            .unwrap();

        assert_eq!(order, vec!["", "cm-2", "rv-2", "re-2", "pr-2"]);
        assert!(summary.completed);
        assert_eq!(summary.fetches, 5);
        assert_eq!(summary.records, 15);
        assert_eq!(summary.follow_ups, 4);
        assert_eq!(
            summary.per_level,
            vec![
                ("PullRequest".to_string(), 2),
                ("PullRequestReview".to_string(), 1),
                ("PullRequestReviewComment".to_string(), 1),
                ("Reaction".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_max_fetches_leaves_pending() {
        let mut crawler = Crawler::new(
            CursorQueue::default(),
            CrawlOptions {
                max_fetches: Some(2),
            },
        );
        crawler.seed("PullRequest", None, None).unwrap();

        let summary = crawler.run(&mut tree_source()).unwrap();
        assert_eq!(summary.fetches, 2);
        assert!(!summary.completed);

        let pending: Vec<_> = crawler
            .queue()
            .pending()
            .into_iter()
            .map(|r| r.cursor_token.unwrap())
            .collect();
        assert_eq!(pending, vec!["rv-2", "pr-2"]);
    }

    #[test]
    fn test_fetch_error_requeues_cursor() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        crawler.seed("PullRequest", s("boom"), None).unwrap();

        let mut source = tree_source();
        let err = crawler.run(&mut source).unwrap_err();
        assert!(err.to_string().contains("PullRequest/boom"));

        assert_eq!(crawler.queue().size(), 1);
        assert_eq!(crawler.queue().peek().unwrap().cursor_token, s("boom"));
        assert_eq!(crawler.summary().fetches, 0);
    }

    #[test]
    fn test_failed_cursor_stays_ahead_of_siblings() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        crawler.seed("PullRequest", s("boom"), None).unwrap();
        crawler.seed("PullRequest", s("pr-2"), None).unwrap();

        let mut source = tree_source();
        assert!(crawler.step(&mut source).is_err());

        let pending: Vec<_> = crawler
            .queue()
            .pending()
            .into_iter()
            .map(|r| (r.cursor_token.unwrap(), r.sequence_number))
            .collect();
        assert_eq!(pending, vec![("boom".to_string(), 0), ("pr-2".to_string(), 1)]);
    }

    #[test]
    fn test_unknown_follow_up_level() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        crawler.seed("PullRequest", None, None).unwrap();

        let mut source = |_: &CursorRecord| -> Result<Page> {
            Ok(Page {
                records: 1,
                follow_ups: vec![
                    FollowUp::new("Reaction", s("ok"), None),
                    FollowUp::new("Commit", s("bad"), None),
                ],
            })
        };

        let err = crawler.step(&mut source).unwrap_err();
        assert!(err.to_string().contains("Commit"));
        // Nothing from the bad page was enqueued
        assert_eq!(crawler.queue().size(), 1);
        assert_eq!(crawler.queue().peek().unwrap().resource_kind, "PullRequest");
    }

    #[test]
    fn test_seed_unknown_level() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        assert!(crawler.seed("Issue", None, None).is_err());
        assert!(crawler.queue().is_empty());
    }

    #[test]
    fn test_step_on_empty_queue() {
        let mut crawler = Crawler::new(CursorQueue::default(), CrawlOptions::default());
        let mut source = tree_source();
        assert!(crawler.step(&mut source).unwrap().is_none());

        let summary = crawler.run(&mut source).unwrap();
        assert!(summary.completed);
        assert_eq!(summary.fetches, 0);
    }
}
