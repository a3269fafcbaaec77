//! Tracing setup.
//!
//! Logs go to a daily file under `<home>/logs/` so they never interleave with
//! command output. The filter comes from `MOVIERAMA_LOG` (default `warn`).

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use movierama_core::config::paths;

pub const LOG_ENV: &str = "MOVIERAMA_LOG";

/// Installs the global subscriber. The returned guard flushes on drop and
/// must outlive the command.
///
/// Returns `None` when the log directory cannot be created; logging is then
/// disabled rather than failing the command.
pub fn init() -> Option<WorkerGuard> {
    let dir = paths::logs_dir();
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: logging disabled, cannot create {}: {err}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, "movierama.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init();

    installed.ok().map(|()| guard)
}
