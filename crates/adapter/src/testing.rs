//! In-memory forum used by the unit tests.

use async_trait::async_trait;
use domain::{ChannelName, Comment, Post};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use crate::error::ForumError;
use crate::traits::ForumClient;

#[derive(Default)]
pub(crate) struct FakeForum {
    posts: Mutex<HashMap<String, Post>>,
    batches: Mutex<VecDeque<Result<Vec<Comment>, ForumError>>>,
    fetches: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, String)>>,
    fail_replies: bool,
}

impl FakeForum {
    pub fn with_post(post: Post) -> Self {
        let forum = Self::default();
        forum.add_post(post);
        forum
    }

    pub fn failing_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id.clone(), post);
    }

    pub fn push_batch(&self, comments: Vec<Comment>) {
        self.batches.lock().unwrap().push_back(Ok(comments));
    }

    pub fn push_error(&self, err: ForumError) {
        self.batches.lock().unwrap().push_back(Err(err));
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    /// `(comment fullname, text)` pairs in posting order.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForumClient for FakeForum {
    async fn new_comments(
        &self,
        _channel: &ChannelName,
        limit: u32,
    ) -> Result<Vec<Comment>, ForumError> {
        match self.batches.lock().unwrap().pop_front() {
            Some(Ok(mut batch)) => {
                batch.truncate(limit as usize);
                Ok(batch)
            }
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_post(&self, post_id: &str) -> Result<Post, ForumError> {
        self.fetches.lock().unwrap().push(post_id.to_string());
        let key = post_id.trim_start_matches("t3_");
        self.posts
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ForumError::NotFound(post_id.to_string()))
    }

    async fn reply(&self, comment: &Comment, text: &str) -> Result<(), ForumError> {
        if self.fail_replies {
            return Err(ForumError::Rejected("THREAD_LOCKED".to_string()));
        }
        self.replies
            .lock()
            .unwrap()
            .push((comment.name.clone(), text.to_string()));
        Ok(())
    }
}

pub(crate) fn sample_post(flair: &str, ups: i64) -> Post {
    Post {
        id: "p1".into(),
        author: "DeepValue".into(),
        created_utc: 1_620_000_000.0,
        link_flair_text: Some(flair.into()),
        selftext: "## Thesis\n\nShort interest is **huge**. See https://example.com/si".into(),
        title: "The squeeze thesis".into(),
        url: "https://www.reddit.com/r/GME/comments/p1/".into(),
        ups,
        subreddit: "GME".into(),
    }
}

pub(crate) fn sample_comment(id: &str, body: &str, post_id: &str) -> Comment {
    Comment {
        id: id.into(),
        name: format!("t1_{}", id),
        body: body.into(),
        link_id: format!("t3_{}", post_id),
        author: "ape".into(),
        subreddit: "GME".into(),
    }
}

/// Collects formatted log output from a scoped subscriber.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
