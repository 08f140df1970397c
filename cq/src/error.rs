//! Queue error types

use thiserror::Error;

/// Errors raised by level configuration and enqueue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Unknown level: {kind}")]
    UnknownLevel { kind: String },

    #[error("Level declared more than once: {kind}")]
    DuplicateLevel { kind: String },

    #[error("Level {position} has a blank label")]
    EmptyLevel { position: usize },

    #[error("No levels configured")]
    NoLevels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_message() {
        let err = QueueError::UnknownLevel {
            kind: "Commit".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Unknown level"));
        assert!(msg.contains("Commit"));
    }

    #[test]
    fn test_empty_level_message() {
        let err = QueueError::EmptyLevel { position: 2 };
        assert_eq!(err.to_string(), "Level 2 has a blank label");
        assert_eq!(QueueError::NoLevels.to_string(), "No levels configured");
    }
}
