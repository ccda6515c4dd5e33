use domain::{Comment, RejectReason, ReplyComposer, TriggerSet, Verdict};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{PipelineError, ReplyError};
use crate::forwarder::SubmissionForwarder;
use crate::traits::ForumClient;
use crate::validator::PostValidator;

/// What happens to a pipeline failure once it is caught.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorVisibility {
    #[default]
    Log,
    Silent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No trigger phrase in the comment.
    Ignored,
    Rejected(RejectReason),
    /// `reply_posted` is false when the acknowledgment failed after the
    /// submission went through.
    Submitted {
        count: Option<u64>,
        reply_posted: bool,
    },
}

/// validator → forwarder → composer → reply, for one triggering comment.
pub struct Pipeline {
    forum: Arc<dyn ForumClient>,
    triggers: TriggerSet,
    validator: PostValidator,
    forwarder: SubmissionForwarder,
    composer: ReplyComposer,
    visibility: ErrorVisibility,
}

impl Pipeline {
    pub fn new(
        forum: Arc<dyn ForumClient>,
        triggers: TriggerSet,
        validator: PostValidator,
        forwarder: SubmissionForwarder,
        composer: ReplyComposer,
        visibility: ErrorVisibility,
    ) -> Self {
        Self {
            forum,
            triggers,
            validator,
            forwarder,
            composer,
            visibility,
        }
    }

    pub fn is_triggered(&self, comment: &Comment) -> bool {
        self.triggers.matches(&comment.body)
    }

    pub async fn process(&self, comment: &Comment) -> Result<Outcome, PipelineError> {
        if !self.is_triggered(comment) {
            return Ok(Outcome::Ignored);
        }

        let payload = match self.validator.validate(&comment.link_id).await? {
            Verdict::Accepted(payload) => payload,
            Verdict::Rejected(reason) => return Ok(Outcome::Rejected(reason)),
        };

        let receipt = self.forwarder.forward(&payload).await?;
        info!(
            comment = %comment.id,
            post = payload.id(),
            "Post added to MoonTimers from r/{}",
            payload.subreddit()
        );

        // 提交已成功；回复失败不做回滚
        let text = self.composer.compose(payload.author(), receipt.count);
        let reply_posted = match self.forum.reply(comment, &text).await {
            Ok(()) => true,
            Err(source) => {
                self.report(
                    &comment.id,
                    ReplyError {
                        comment: comment.name.clone(),
                        source,
                    },
                );
                false
            }
        };

        Ok(Outcome::Submitted {
            count: receipt.count,
            reply_posted,
        })
    }

    /// Runs [`Self::process`] and swallows the error after reporting it, so a
    /// failing comment never reaches the listener.
    pub async fn handle(&self, comment: Comment) -> Option<Outcome> {
        match self.process(&comment).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.report(&comment.id, e);
                None
            }
        }
    }

    fn report<E>(&self, comment_id: &str, err: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if self.visibility == ErrorVisibility::Log {
            error!(comment = %comment_id, "Pipeline failed: {:#}", anyhow::Error::new(err));
        }
    }
}
