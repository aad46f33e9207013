//! 日志输出：默认写入按天滚动的日志文件，`--log-stderr` 时写到标准错误

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`.
const FILTER_ENV: &str = "DASHGRID_LOG";
const DEFAULT_FILTER: &str = "dashgrid=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    File,
    Stderr,
}

/// Flushes buffered records when dropped. Hold it until `main` returns.
pub struct LoggingGuard {
    _flush: WorkerGuard,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// `None` when logging to stderr.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

pub fn init(target: LogTarget) -> Option<LoggingGuard> {
    let (writer, flush, log_dir) = match target {
        LogTarget::Stderr => {
            let (writer, flush) = tracing_appender::non_blocking(std::io::stderr());
            (writer, flush, None)
        }
        LogTarget::File => {
            let dir = log_dir()?;
            let appender = tracing_appender::rolling::daily(&dir, "dashgrid.log");
            let (writer, flush) = tracing_appender::non_blocking(appender);
            (writer, flush, Some(dir))
        }
    };

    install(writer, target == LogTarget::Stderr)?;
    tracing::info!(?target, log_dir = ?log_dir, "tracing initialized");

    Some(LoggingGuard {
        _flush: flush,
        log_dir,
    })
}

fn log_dir() -> Option<PathBuf> {
    dashgrid::kernel::services::adapters::ensure_log_dir()
        .or_else(|_| {
            let dir = std::env::temp_dir().join("dashgrid").join("logs");
            std::fs::create_dir_all(&dir).map(|()| dir)
        })
        .ok()
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Returns `None` when a global subscriber is already set.
fn install(writer: NonBlocking, terminal: bool) -> Option<()> {
    // File records keep source locations; terminal records stay short.
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(!terminal)
        .with_file(!terminal)
        .with_line_number(!terminal);
    tracing_subscriber::registry()
        .with(filter())
        .with(layer)
        .try_init()
        .ok()?;

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "panic");
    }));
    Some(())
}
