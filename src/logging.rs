// src/logging.rs
//
// Timestamped diagnostics to stderr, optionally teed to a session log file.
//
// The console runs one interactive session per process, so there is no log
// rotation: the caller opens the tee once at startup and closes it when the
// session ends. Operator-facing output goes to stdout, diagnostics to
// stderr, so the two never interleave.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

/// Session log file handle. When `Some`, `tlog!` writes to both stderr and
/// this file.
pub(crate) static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

/// Timestamped logging macro.
/// Prepends `HH:MM:SS.mmm` local time to every message written to stderr.
/// Also writes to the session log file when one is open.
macro_rules! tlog {
    ($($arg:tt)*) => {{
        use std::io::Write as _;
        let msg = format!("{} {}", chrono::Local::now().format("%H:%M:%S%.3f"), format_args!($($arg)*));
        eprintln!("{}", msg);
        if let Ok(mut guard) = $crate::logging::LOG_FILE.lock() {
            if let Some(ref mut f) = *guard {
                let _ = writeln!(f, "{}", msg);
            }
        }
    }};
}

/// Tee diagnostics to `path` for the rest of the session. The file is
/// appended to, so repeated sessions against the same path accumulate.
pub fn start_session_log(path: &Path) -> Result<(), String> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?;
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }
    tlog!("[logging] session log started: {}", path.display());
    Ok(())
}

/// Close the session log. Diagnostics keep going to stderr.
pub fn stop_session_log() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if guard.take().is_some() {
            eprintln!(
                "{} [logging] session log closed",
                chrono::Local::now().format("%H:%M:%S%.3f")
            );
        }
    }
}
