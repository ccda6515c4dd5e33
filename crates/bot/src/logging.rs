use anyhow::Context;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::{self, FilterExt};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogSettings;

pub const SERVICE_NAME: &str = "mt-reddit-bot";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Events at `level` (or `RUST_LOG`). Spans always pass so every record keeps
/// the root `service` span whatever the event level.
fn events_at<S>(level: &str) -> impl Filter<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level))
        .or(filter::filter_fn(|meta| meta.is_span()))
}

fn errors_only<S>() -> impl Filter<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    filter::filter_fn(|meta| meta.is_span() || *meta.level() == Level::ERROR)
}

/// JSON records to `info.log` (everything at level) and `error.log` (errors
/// only), plus an optional console layer. `RUST_LOG` overrides the level.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let dir = Path::new(&settings.dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let info_file = open_append(&dir.join("info.log"))?;
    let error_file = open_append(&dir.join("error.log"))?;

    let timer = ChronoLocal::new(TIME_FORMAT.to_string());

    // Mutex 保证并发写入时单条记录不被打断
    let info_layer = fmt::layer()
        .json()
        .with_timer(timer.clone())
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(Mutex::new(info_file))
        .with_filter(events_at(&settings.level));

    let error_layer = fmt::layer()
        .json()
        .with_timer(timer.clone())
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(Mutex::new(error_file))
        .with_filter(errors_only());

    let console_layer = settings.console.then(|| {
        fmt::layer()
            .with_timer(timer)
            .with_target(true)
            .with_filter(events_at(&settings.level))
    });

    tracing_subscriber::registry()
        .with(info_layer)
        .with(error_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
