use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive. Dropping it flushes pending file output.
pub type LogGuard = WorkerGuard;

/// Installs the process-wide `tracing` subscriber.
///
/// `RUST_LOG` wins over `settings.level`. When `settings.directory` is set,
/// output goes to a daily rolling `pulse.log` file and the returned guard must
/// be kept alive for as long as logs should be written.
///
/// Installing twice is harmless: the second call leaves the existing
/// subscriber in place and returns `None`.
pub fn init_tracing(settings: &LoggingSettings) -> Option<LogGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "pulse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .ok()
                .map(|_| guard)
        }
        None => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            None
        }
    }
}
