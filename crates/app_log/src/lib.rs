//! FileDesk logging & crash reporting
//!
//! Structured logging to console and a rotating JSON file, a panic hook that
//! writes crash reports, and log retention.

mod panic_hook;
mod logging;

pub use panic_hook::{init_panic_hook, crash_report, panic_message};
pub use logging::{init_logging, cleanup_old_logs, cleanup_logs_in, LogGuard};

use std::path::PathBuf;
use directories::ProjectDirs;

/// File name prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "filedesk.log";

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "FileDesk", "FileDesk")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the process.
pub fn init() -> anyhow::Result<LogGuard> {
    let guard = init_logging()?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    init_deadlock_detector();

    Ok(guard)
}

#[cfg(debug_assertions)]
fn init_deadlock_detector() {
    use std::thread;
    use std::time::Duration;

    thread::Builder::new()
        .name("deadlock-detector".into())
        .spawn(|| loop {
            thread::sleep(Duration::from_secs(10));
            let deadlocks = parking_lot::deadlock::check_deadlock();
            if deadlocks.is_empty() {
                continue;
            }
            tracing::error!(count = deadlocks.len(), "Deadlock detected");
            for (i, threads) in deadlocks.iter().enumerate() {
                for t in threads {
                    tracing::error!(
                        deadlock = i,
                        thread_id = ?t.thread_id(),
                        "{:#?}",
                        t.backtrace()
                    );
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| tracing::warn!("Failed to start deadlock detector: {}", e));
}
