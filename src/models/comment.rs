use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub username: String,
    pub avatar: Option<String>,
}

impl CommentAuthor {
    /// Letter shown in place of a missing avatar.
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

impl Default for CommentAuthor {
    fn default() -> Self {
        Self {
            username: ANONYMOUS_AUTHOR.to_string(),
            avatar: None,
        }
    }
}

/// Comments are displayed newest first and never edited by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: CommentAuthor,
}
