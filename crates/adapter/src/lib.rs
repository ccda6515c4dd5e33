mod drivers;
mod error;
mod forwarder;
mod listener;
mod pipeline;
mod traits;
mod validator;

#[cfg(test)]
mod testing;

pub use drivers::reddit::{
    RedditClient, RedditConfig, DEFAULT_API_BASE, DEFAULT_AUTH_BASE, DEFAULT_USER_AGENT,
};
pub use error::{FetchError, ForumError, ForwardError, PipelineError, ReplyError};
pub use forwarder::{ForwardReceipt, SubmissionForwarder, DEFAULT_SUBMISSION_ENDPOINT};
pub use listener::{
    ChannelListener, ListenerConfig, ListenerState, DEFAULT_BATCH_SIZE, DEFAULT_POLL_INTERVAL,
};
pub use pipeline::{ErrorVisibility, Outcome, Pipeline};
pub use traits::ForumClient;
pub use validator::PostValidator;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

/// Runs every listener on its own task until `cancel_token` fires.
pub async fn start_with_cancel_token(
    listeners: Vec<ChannelListener>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    if listeners.is_empty() {
        anyhow::bail!("No channels configured");
    }
    info!("Starting {} channel listener(s)...", listeners.len());

    let handles: Vec<_> = listeners
        .into_iter()
        .map(|listener| {
            let channel = listener.channel().clone();
            let token = cancel_token.clone();
            let span = info_span!("listener", channel = %channel);
            (channel, tokio::spawn(listener.run(token).instrument(span)))
        })
        .collect();

    for (channel, handle) in handles {
        if let Err(e) = handle.await {
            error!("Listener for r/{} crashed: {:?}", channel, e);
        }
    }
    Ok(())
}
