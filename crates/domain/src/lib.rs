mod models;
mod reply;
mod rules;
pub mod sanitize;
mod triggers;

pub use models::{ChannelName, ChannelNameError, Comment, Post, SubmissionPayload};
pub use reply::{ordinal, ReplyComposer, DEFAULT_SITE_URL};
pub use rules::{RejectReason, ValidationRules, Verdict, DEFAULT_MIN_SCORE, DEFAULT_REQUIRED_MARKER};
pub use triggers::{TriggerSet, DEFAULT_TRIGGERS};
