mod config;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use adapter::{
    ChannelListener, ForumClient, ListenerConfig, Pipeline, PostValidator, RedditClient,
    SubmissionForwarder,
};
use config::Settings;
use domain::{ChannelName, ReplyComposer, TriggerSet, ValidationRules};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let settings = Settings::new().context("Failed to load configuration")?;
    logging::init(&settings.logging).context("Failed to initialize logging")?;

    let root = info_span!("bot", service = logging::SERVICE_NAME);
    run(settings).instrument(root).await
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    info!("Starting Server");

    let forum: Arc<dyn ForumClient> = Arc::new(
        RedditClient::new(settings.reddit.to_client_config())
            .context("Failed to build Reddit client")?,
    );

    let validator = PostValidator::new(
        forum.clone(),
        ValidationRules::new(
            settings.validation.required_marker.clone(),
            settings.validation.min_score,
        ),
    );
    let forwarder = SubmissionForwarder::new(
        settings.submission.endpoint.clone(),
        Duration::from_secs(settings.submission.timeout_secs),
    )
    .context("Failed to build submission client")?;
    info!("Submissions go to {}", forwarder.endpoint());

    let triggers = TriggerSet::new(&settings.listener.triggers);
    if triggers.is_empty() {
        warn!("No trigger phrases configured; no comment will ever match");
    }

    let pipeline = Arc::new(Pipeline::new(
        forum.clone(),
        triggers,
        validator,
        forwarder,
        ReplyComposer::new(settings.submission.site_url.clone()),
        settings.listener.error_visibility,
    ));

    let listeners = settings
        .listener
        .channels
        .iter()
        .map(|name| -> anyhow::Result<ChannelListener> {
            let channel = ChannelName::new(name.as_str())
                .with_context(|| format!("Invalid channel in configuration: {}", name))?;
            let config = ListenerConfig {
                channel,
                poll_interval: Duration::from_millis(settings.listener.poll_interval_ms),
                batch_size: settings.listener.batch_size,
            };
            Ok(ChannelListener::new(config, forum.clone(), pipeline.clone()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cancel_token = CancellationToken::new();
    let mut worker = tokio::spawn(
        adapter::start_with_cancel_token(listeners, cancel_token.clone()).in_current_span(),
    );

    tokio::select! {
        signal = shutdown_signal() => {
            if let Err(e) = signal {
                error!("{:#}", e);
            }
            cancel_token.cancel();
        },
        res = &mut worker => {
            return res.context("Listener supervisor panicked")?;
        },
    }

    worker.await.context("Listener supervisor panicked")??;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for Ctrl+C")?;
                info!("Ctrl+C received, stopping listeners");
            },
            _ = term.recv() => info!("SIGTERM received, stopping listeners"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Ctrl+C received, stopping listeners");
    }

    Ok(())
}
