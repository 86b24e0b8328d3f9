//! src/logsink.rs
//!
//! The append-only text log sink named in §6/§4.8: one line per
//! significant request-handling event, written to `<server_name>_log.txt`,
//! truncated fresh at startup. This is distinct from `tracing`'s structured
//! diagnostic logging — it is the literal per-request trace the protocol's
//! reference deployment keeps, and its content is advisory (§4.8): tests
//! must not assert on it.

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// An opaque `log(line)` sink. If the backing file cannot be opened, the
/// sink silently degrades to a no-op rather than taking the server down —
/// losing the advisory trace is not worth failing requests over.
pub struct LogSink {
    writer: Option<Mutex<BufWriter<File>>>,
}

impl LogSink {
    /// Opens (truncating) `path` for the sink. Logs a warning and degrades
    /// to a no-op on failure instead of propagating the error.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match File::create(path).await {
            Ok(file) => Self {
                writer: Some(Mutex::new(BufWriter::new(file))),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not open log sink file; logging will be skipped");
                Self { writer: None }
            }
        }
    }

    /// Writes one line to the sink, flushing immediately so the file stays
    /// readable by tools tailing it live.
    pub async fn log(&self, message: &str) {
        let Some(writer) = &self.writer else { return };
        let mut writer = writer.lock().await;
        if let Err(e) = writer.write_all(message.as_bytes()).await {
            tracing::warn!(error = %e, "failed to write to log sink");
            return;
        }
        if let Err(e) = writer.write_all(b"\n").await {
            tracing::warn!(error = %e, "failed to write to log sink");
            return;
        }
        let _ = writer.flush().await;
    }
}
