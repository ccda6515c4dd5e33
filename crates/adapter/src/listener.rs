use domain::{ChannelName, Comment};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn, Instrument};

use crate::error::ForumError;
use crate::pipeline::{Outcome, Pipeline};
use crate::traits::ForumClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_BATCH_SIZE: u32 = 10;
const SEEN_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Polling,
    Matching,
    Processing,
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub channel: ChannelName,
    pub poll_interval: Duration,
    pub batch_size: u32,
}

impl ListenerConfig {
    pub fn new(channel: ChannelName) -> Self {
        Self {
            channel,
            poll_interval: DEFAULT_POLL_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Comment ids already handed out, oldest evicted first.
struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenSet {
    fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// `true` if the id was not seen before.
    fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.ids.insert(id.to_string());
        self.order.push_back(id.to_string());
        true
    }
}

/// Polls one channel and dispatches triggering comments to the pipeline.
pub struct ChannelListener {
    config: ListenerConfig,
    forum: Arc<dyn ForumClient>,
    pipeline: Arc<Pipeline>,
    seen: SeenSet,
    state: ListenerState,
}

impl ChannelListener {
    pub fn new(
        config: ListenerConfig,
        forum: Arc<dyn ForumClient>,
        pipeline: Arc<Pipeline>,
    ) -> Self {
        Self {
            config,
            forum,
            pipeline,
            seen: SeenSet::new(SEEN_CAPACITY),
            state: ListenerState::Idle,
        }
    }

    pub fn channel(&self) -> &ChannelName {
        &self.config.channel
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    fn transition(&mut self, next: ListenerState) {
        trace!(channel = %self.config.channel, from = ?self.state, to = ?next, "listener state");
        self.state = next;
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!("Listening to stream from r/{}", self.config.channel);

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tasks: JoinSet<Option<Outcome>> = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once(&mut tasks).await {
                        warn!(channel = %self.config.channel, "Poll failed: {}", e);
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(channel = %self.config.channel, "Pipeline task aborted: {:?}", e);
                    }
                },
                _ = cancel.cancelled() => break,
            }
        }

        // 等待进行中的评论处理完成
        while tasks.join_next().await.is_some() {}
        info!("Stopped listening to r/{}", self.config.channel);
    }

    /// One poll: fetch the newest batch, skip seen comments, spawn a pipeline
    /// task per trigger match. Returns how many were dispatched.
    pub async fn poll_once(
        &mut self,
        tasks: &mut JoinSet<Option<Outcome>>,
    ) -> Result<usize, ForumError> {
        self.transition(ListenerState::Polling);
        let batch = match self
            .forum
            .new_comments(&self.config.channel, self.config.batch_size)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                self.transition(ListenerState::Idle);
                return Err(e);
            }
        };

        let mut dispatched = 0;
        // 列表按新到旧排列，倒序处理
        for comment in batch.into_iter().rev() {
            if !self.seen.insert(&comment.id) {
                continue;
            }
            self.transition(ListenerState::Matching);
            if !self.pipeline.is_triggered(&comment) {
                continue;
            }

            info!(channel = %self.config.channel, comment = %comment.id, "MATCH FOUND for !moontimer");
            self.transition(ListenerState::Processing);
            self.dispatch(comment, tasks);
            dispatched += 1;
        }

        self.transition(ListenerState::Idle);
        Ok(dispatched)
    }

    fn dispatch(&self, comment: Comment, tasks: &mut JoinSet<Option<Outcome>>) {
        let pipeline = self.pipeline.clone();
        tasks.spawn(async move { pipeline.handle(comment).await }.in_current_span());
    }
}
