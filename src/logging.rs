//! Logging initialisation.
//!
//! Installs a global `tracing` subscriber once. In the browser every
//! formatted event is forwarded to `console.log`; on native targets events
//! go to stderr. Timestamps are omitted because the system clock is not
//! available to wasm32-unknown-unknown.

use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::Level;

static INITIALISED: OnceLock<Level> = OnceLock::new();

/// Errors raised while initialising logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The requested level is not one of trace, debug, info, warn, error.
    #[error("unsupported log level `{provided}`; expected trace, debug, info, warn or error")]
    UnsupportedLevel {
        /// Raw value supplied by the caller.
        provided: String,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install tracing subscriber: {reason}")]
    InstallFailed {
        /// Error reported by `tracing_subscriber`.
        reason: String,
    },
}

/// Parse a level name such as `"debug"`.
///
/// # Errors
///
/// Returns `UnsupportedLevel` for anything `tracing` does not recognise.
pub fn parse_level(raw: &str) -> Result<Level, LoggingError> {
    Level::from_str(raw.trim()).map_err(|_| LoggingError::UnsupportedLevel {
        provided: raw.to_string(),
    })
}

/// Install the global subscriber at `level` if none was installed yet.
///
/// Repeated calls are no-ops and report the level chosen first.
///
/// # Errors
///
/// Returns `LoggingError` if the level is unknown or another subscriber
/// already owns the global dispatcher.
pub fn init_logging(level: &str) -> Result<Level, LoggingError> {
    let level = parse_level(level)?;
    if let Some(&installed) = INITIALISED.get() {
        return Ok(installed);
    }

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(make_writer)
        .try_init()
        .map_err(|err| LoggingError::InstallFailed {
            reason: err.to_string(),
        })?;

    Ok(*INITIALISED.get_or_init(|| level))
}

#[cfg(target_arch = "wasm32")]
fn make_writer() -> console::ConsoleWriter {
    console::ConsoleWriter::default()
}

#[cfg(not(target_arch = "wasm32"))]
fn make_writer() -> std::io::Stderr {
    std::io::stderr()
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io::{self, Write};

    use wasm_bindgen::JsValue;

    /// Buffers one formatted event and hands it to `console.log` on flush.
    #[derive(Default)]
    pub(super) struct ConsoleWriter {
        buffer: Vec<u8>,
    }

    impl Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if !self.buffer.is_empty() {
                let line = String::from_utf8_lossy(&self.buffer);
                web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
                self.buffer.clear();
            }
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let _ = self.flush();
        }
    }
}
