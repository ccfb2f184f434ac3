//! Logging configuration: dual sinks on the process-wide subscriber.
//!
//! Two layers share one registry. The file layer records everything at
//! TRACE through a size-rotated log file using the format
//! `[timestamp] LEVEL target message`; the console layer writes bare
//! messages to stderr, filtered by the verbosity mapping below. The
//! subscriber has process lifetime: installed once during `run`, never
//! torn down.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Size threshold at which the log file rotates.
pub(crate) const LOG_MAX_BYTES: u64 = 10 * 1024;

/// Maps a verbosity level to the console sink's minimum severity.
///
/// Total: every level at or above 2 maps to DEBUG.
pub(crate) fn console_level(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// A writer that rotates its file when a write would push it past the
/// size cap, keeping one prior rotation under `<path>.1`.
pub(crate) struct RotatingWriter {
    path: PathBuf,
    backup: PathBuf,
    max_bytes: u64,
    file: File,
    written: u64,
}

impl RotatingWriter {
    pub(crate) fn create(path: PathBuf, max_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        let mut backup = OsString::from(path.as_os_str());
        backup.push(".1");
        Ok(Self {
            path,
            backup: PathBuf::from(backup),
            max_bytes,
            file,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        // One retained rotation: any earlier backup is overwritten.
        fs::rename(&self.path, &self.backup)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Event format for the file sink: `[timestamp] LEVEL target message`.
struct FileFormat;

impl<S, N> FormatEvent<S, N> for FileFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        write!(writer, "[")?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, "] {:<8} {} ", meta.level().to_string(), meta.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Attaches the file and console sinks to the process-wide subscriber.
///
/// Called once per run. When a subscriber is already installed (a second
/// run in the same process), the existing sinks win and this is a no-op.
pub(crate) fn configure(log_file: &Path, verbosity: usize) -> anyhow::Result<()> {
    let writer = RotatingWriter::create(log_file.to_path_buf(), LOG_MAX_BYTES)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(FileFormat)
        .with_writer(Mutex::new(writer))
        .with_filter(LevelFilter::TRACE);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_level(false)
        .with_filter(console_level(verbosity));

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();
    Ok(())
}
