//! Scripted page source for replaying a crawl from a YAML file

use std::collections::HashMap;
use std::path::Path;

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::level::Levels;
use crate::record::CursorRecord;

use super::driver::{FollowUp, Page, PageSource};

/// A page keyed by the cursor that fetches it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedPage {
    pub resource_kind: String,
    #[serde(default)]
    pub cursor_token: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub page: Page,
}

/// Recorded crawl: starting cursors plus the page each cursor returns.
///
/// ```yaml
/// levels: [PullRequest, PullRequestReview]
/// seed:
///   - resource_kind: PullRequest
/// pages:
///   - resource_kind: PullRequest
///     records: 2
///     follow_ups:
///       - resource_kind: PullRequestReview
///         cursor_token: rv-2
///         parent_id: PR_1
///   - resource_kind: PullRequestReview
///     cursor_token: rv-2
///     parent_id: PR_1
///     records: 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlScript {
    /// Overrides the configured levels when present
    #[serde(default)]
    pub levels: Option<Levels>,
    #[serde(default)]
    pub seed: Vec<FollowUp>,
    #[serde(default)]
    pub pages: Vec<ScriptedPage>,
}

impl CrawlScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read crawl script {}", path.display()))?;
        Self::from_yaml(&content).context(format!("Failed to parse crawl script {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

type PageKey = (String, Option<String>, Option<String>);

/// [`PageSource`] answering from a [`CrawlScript`]
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pages: HashMap<PageKey, Page>,
}

impl ScriptedSource {
    pub fn new(script: &CrawlScript) -> Self {
        let pages = script
            .pages
            .iter()
            .map(|p| {
                (
                    (p.resource_kind.clone(), p.cursor_token.clone(), p.parent_id.clone()),
                    p.page.clone(),
                )
            })
            .collect();
        Self { pages }
    }
}

impl PageSource for ScriptedSource {
    fn fetch(&mut self, cursor: &CursorRecord) -> Result<Page> {
        debug!(%cursor, "ScriptedSource::fetch: called");
        let key = (
            cursor.resource_kind.clone(),
            cursor.cursor_token.clone(),
            cursor.parent_id.clone(),
        );
        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| eyre!("No scripted page for {}", cursor))
    }
}
