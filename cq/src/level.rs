//! Hierarchy levels and their priority ranks

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Default crawl hierarchy, outermost first
pub const DEFAULT_LEVELS: [&str; 4] = ["PullRequest", "PullRequestReview", "PullRequestReviewComment", "Reaction"];

/// Ordered set of hierarchy level labels.
///
/// The last declared label gets rank 0 and is drained first. The lookup table
/// is built once and never changes for the life of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Levels {
    labels: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl Levels {
    /// Build the rank table from labels declared outermost first
    pub fn new<I, S>(labels: I) -> Result<Self, QueueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(QueueError::NoLevels);
        }
        if let Some(position) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(QueueError::EmptyLevel { position });
        }

        let mut ranks = HashMap::with_capacity(labels.len());
        for (rank, label) in labels.iter().rev().enumerate() {
            if ranks.insert(label.clone(), rank).is_some() {
                return Err(QueueError::DuplicateLevel { kind: label.clone() });
            }
        }

        Ok(Self { labels, ranks })
    }

    /// Rank of a label; lower ranks dequeue first
    pub fn rank(&self, kind: &str) -> Result<usize, QueueError> {
        self.ranks
            .get(kind)
            .copied()
            .ok_or_else(|| QueueError::UnknownLevel { kind: kind.to_string() })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.ranks.contains_key(kind)
    }

    /// Labels in declaration order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect(),
            ranks: DEFAULT_LEVELS
                .iter()
                .rev()
                .enumerate()
                .map(|(rank, label)| (label.to_string(), rank))
                .collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Levels {
    type Error = QueueError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<Levels> for Vec<String> {
    fn from(levels: Levels) -> Self {
        levels.labels
    }
}

impl std::fmt::Display for Levels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.labels.join(","))
    }
}

impl std::str::FromStr for Levels {
    type Err = QueueError;

    /// Parse a comma separated list, outermost level first
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(',').map(str::trim).filter(|l| !l.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_declared_has_rank_zero() {
        let levels = Levels::default();
        assert_eq!(levels.rank("Reaction").unwrap(), 0);
        assert_eq!(levels.rank("PullRequestReviewComment").unwrap(), 1);
        assert_eq!(levels.rank("PullRequestReview").unwrap(), 2);
        assert_eq!(levels.rank("PullRequest").unwrap(), 3);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(Levels::default(), Levels::new(DEFAULT_LEVELS).unwrap());
    }

    #[test]
    fn test_unknown_rank() {
        let levels = Levels::new(["a", "b"]).unwrap();
        assert_eq!(
            levels.rank("c"),
            Err(QueueError::UnknownLevel { kind: "c".to_string() })
        );
        assert!(!levels.contains("c"));
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert_eq!(
            Levels::new(["a", "b", "a"]),
            Err(QueueError::DuplicateLevel { kind: "a".to_string() })
        );
        assert_eq!(Levels::new(Vec::<String>::new()), Err(QueueError::NoLevels));
    }

    #[test]
    fn test_rejects_blank_labels() {
        assert_eq!(Levels::new(["", "Reaction"]), Err(QueueError::EmptyLevel { position: 0 }));
        assert_eq!(Levels::new(["a", "  "]), Err(QueueError::EmptyLevel { position: 1 }));
        assert!(serde_yaml::from_str::<Levels>("[\"\", \"  \", a]").is_err());
    }

    #[test]
    fn test_five_levels() {
        let levels: Levels = "Repo, Issue, Comment, Reaction, User".parse().unwrap();
        assert_eq!(levels.labels().len(), 5);
        assert_eq!(levels.rank("User").unwrap(), 0);
        assert_eq!(levels.rank("Repo").unwrap(), 4);
        assert_eq!(levels.to_string(), "Repo,Issue,Comment,Reaction,User");
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!(" , ".parse::<Levels>().is_err());
    }

    #[test]
    fn test_levels_serde() {
        let levels = Levels::new(["a", "b"]).unwrap();
        let json = serde_json::to_string(&levels).unwrap();
        assert_eq!(json, r#"["a","b"]"#);

        let back: Levels = serde_json::from_str(&json).unwrap();
        assert_eq!(back, levels);

        assert!(serde_json::from_str::<Levels>(r#"["a","a"]"#).is_err());
    }
}
