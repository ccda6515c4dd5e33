use async_trait::async_trait;
use domain::{ChannelName, Comment, Post};

use crate::error::ForumError;

#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Newest comments of a channel, newest first, at most `limit`.
    async fn new_comments(&self, channel: &ChannelName, limit: u32)
        -> Result<Vec<Comment>, ForumError>;

    /// `post_id` may carry the `t3_` prefix or not.
    async fn fetch_post(&self, post_id: &str) -> Result<Post, ForumError>;

    async fn reply(&self, comment: &Comment, text: &str) -> Result<(), ForumError>;
}
