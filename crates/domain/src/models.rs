use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelNameError {
    #[error("Channel name is empty.")]
    Empty,
    #[error("Channel name '{0}' contains invalid characters (letters, digits and '_' only).")]
    InvalidCharacters(String),
    #[error("Channel name '{0}' must be between 2 and 21 characters.")]
    BadLength(String),
}

/// A subreddit name, without the `r/` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    pub fn new(s: impl Into<String>) -> Result<Self, ChannelNameError> {
        let s = s.into();
        let trimmed = s.trim();
        let name = trimmed
            .strip_prefix("/r/")
            .or_else(|| trimmed.strip_prefix("r/"))
            .unwrap_or(trimmed);

        if name.is_empty() {
            return Err(ChannelNameError::Empty);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ChannelNameError::InvalidCharacters(name.to_string()));
        }
        if name.len() < 2 || name.len() > 21 {
            return Err(ChannelNameError::BadLength(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(value: ChannelName) -> Self {
        value.0
    }
}

/// A comment as it arrives from the channel listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    /// Typed identifier (`t1_...`), the target for replies.
    pub name: String,
    pub body: String,
    /// Parent post (`t3_...`).
    pub link_id: String,
    pub author: String,
    pub subreddit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub created_utc: f64,
    pub link_flair_text: Option<String>,
    pub selftext: String,
    pub title: String,
    pub url: String,
    pub ups: i64,
    pub subreddit: String,
}

impl Post {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.created_utc * 1000.0) as i64)
    }
}

/// Body sent to the submission endpoint.
///
/// Only [`crate::ValidationRules::evaluate`] builds one, so holding a payload
/// means the post passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    id: String,
    author: String,
    created_utc: f64,
    selftext: String,
    title: String,
    url: String,
    subreddit: String,
}

impl SubmissionPayload {
    pub(crate) fn from_validated(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            author: post.author.clone(),
            created_utc: post.created_utc,
            selftext: crate::sanitize::sanitize(&post.selftext),
            title: crate::sanitize::trim_text(&post.title),
            url: post.url.clone(),
            subreddit: post.subreddit.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn selftext(&self) -> &str {
        &self.selftext
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }
}
