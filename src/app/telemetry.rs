use super::{AppError, LogLevel};
use std::path::Path;
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Name of the structured log written next to the results
const LOG_FILE: &str = "electron-post.log";

/// Console events go to `console::Term::stderr`, leaving stdout to the result tables. Every event is
/// also written as JSON, including the enclosing engine spans, to `electron-post.log` in `directory`.
///
/// `RUST_LOG` takes precedence over the level given on the command line.
pub(crate) fn get_subscriber(
    level: LogLevel,
    directory: &Path,
) -> (impl Subscriber + Send + Sync, WorkerGuard) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let console = fmt::Layer::new()
        .with_writer(console::Term::stderr)
        .with_target(false)
        .without_time();

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, LOG_FILE));
    let file = fmt::Layer::new()
        .with_writer(writer)
        .json()
        .with_current_span(true);

    (Registry::default().with(filter).with(console).with(file), guard)
}

/// Routes `log` records into `tracing` and installs the subscriber for the process
pub(crate) fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), AppError> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
