use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{Event, Span, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry};

use crate::error::Result;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Per-run state handed to every stage: the run timestamp that suffixes all
/// output files, and the span every log line of the run is recorded under.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub timestamp: String,
    pub span: Span,
}

impl RunContext {
    pub fn new(timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        let span = tracing::info_span!("silver", run = %timestamp);
        Self { timestamp, span }
    }
}

/// `timestamp - LEVEL - message`, one line per event. Span fields are not
/// printed; the run is already named by the log file.
struct LogLine;

impl<S, N> FormatEvent<S, N> for LogLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Local::now().format(TIME_FORMAT);
        write!(writer, "{now} - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

pub fn log_file_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("silver_{timestamp}.log"))
}

/// Run `f` with a subscriber that writes to the console and to a fresh log
/// file for this run. The subscriber is dropped when `f` returns.
pub fn with_run_logging<T>(log_dir: &Path, timestamp: &str, f: impl FnOnce() -> T) -> Result<T> {
    std::fs::create_dir_all(log_dir)?;
    let file = File::create(log_file_path(log_dir, timestamp))?;
    let file = Mutex::new(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(LogLine);
    let log_file = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .event_format(LogLine);

    let subscriber = Registry::default().with(filter).with(console).with(log_file);
    Ok(tracing::subscriber::with_default(subscriber, f))
}
