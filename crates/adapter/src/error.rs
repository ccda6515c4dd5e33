use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("forum request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("forum api returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("forum authentication failed: {0}")]
    Auth(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("forum rejected the request: {0}")]
    Rejected(String),
}

/// The post behind a comment could not be retrieved.
#[derive(Debug, Error)]
#[error("failed to fetch post {post_id}")]
pub struct FetchError {
    pub post_id: String,
    #[source]
    pub source: ForumError,
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("submission request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("submission endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// The submission went through but the acknowledgment could not be posted.
#[derive(Debug, Error)]
#[error("failed to reply to {comment}")]
pub struct ReplyError {
    pub comment: String,
    #[source]
    pub source: ForumError,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Forward(#[from] ForwardError),
}
