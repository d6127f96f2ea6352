//! Human-readable status output.
//!
//! Status lines go to the host's output pane through a [`StatusSink`]. When
//! the pane is unavailable (typically while the host shuts down) the line is
//! shown through the sink's fallback notification instead, and if that fails
//! too it is only traced. Nothing here ever returns an error to the caller.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors from a status sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output channel is not available
    #[error("status channel unavailable: {0}")]
    Unavailable(String),
}

/// Destination for status lines.
pub trait StatusSink: Send + Sync {
    /// Write a line to the primary output channel.
    fn output(&self, line: &str) -> Result<(), SinkError>;

    /// Show a line through the fallback channel (a modal message).
    fn notify(&self, line: &str) -> Result<(), SinkError> {
        Err(SinkError::Unavailable(format!(
            "no fallback channel for {line:?}"
        )))
    }
}

/// Best-effort status logger shared by the policy store and orchestrator.
#[derive(Clone, Default)]
pub struct StatusLog {
    sink: Option<Arc<dyn StatusSink>>,
}

impl fmt::Debug for StatusLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLog")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl StatusLog {
    /// Create a logger writing to `sink`.
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A logger that only traces.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Emit a status line.
    pub fn line(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        tracing::info!(status = %line, "autosave status");

        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(primary) = sink.output(line)
            && let Err(fallback) = sink.notify(line)
        {
            tracing::warn!(
                error = %primary,
                fallback_error = %fallback,
                status = %line,
                "status line dropped"
            );
        }
    }

    /// Emit a diagnostic line. Only traced, never shown to the user.
    pub fn debug(&self, line: impl AsRef<str>) {
        tracing::debug!(detail = %line.as_ref(), "autosave diagnostic");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FlakySink {
        output_up: bool,
        notify_up: bool,
        outputs: Mutex<Vec<String>>,
        notices: Mutex<Vec<String>>,
    }

    impl StatusSink for FlakySink {
        fn output(&self, line: &str) -> Result<(), SinkError> {
            if !self.output_up {
                return Err(SinkError::Unavailable("pane gone".to_string()));
            }
            self.outputs.lock().unwrap().push(line.to_string());
            Ok(())
        }

        fn notify(&self, line: &str) -> Result<(), SinkError> {
            if !self.notify_up {
                return Err(SinkError::Unavailable("shell gone".to_string()));
            }
            self.notices.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_line_goes_to_output() {
        let sink = Arc::new(FlakySink {
            output_up: true,
            ..Default::default()
        });
        StatusLog::new(sink.clone()).line("saved");
        assert_eq!(*sink.outputs.lock().unwrap(), vec!["saved"]);
        assert!(sink.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_falls_back_to_notify() {
        let sink = Arc::new(FlakySink {
            notify_up: true,
            ..Default::default()
        });
        StatusLog::new(sink.clone()).line("saved");
        assert!(sink.outputs.lock().unwrap().is_empty());
        assert_eq!(*sink.notices.lock().unwrap(), vec!["saved"]);
    }

    #[test]
    fn test_both_channels_down_is_silent() {
        let sink = Arc::new(FlakySink::default());
        StatusLog::new(sink.clone()).line("saved");
        assert!(sink.outputs.lock().unwrap().is_empty());
        assert!(sink.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_lines_skip_sink() {
        let sink = Arc::new(FlakySink {
            output_up: true,
            ..Default::default()
        });
        StatusLog::new(sink.clone()).debug("GotFocus: a.rs");
        assert!(sink.outputs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detached_log_does_not_panic() {
        StatusLog::detached().line("nothing attached");
    }
}
