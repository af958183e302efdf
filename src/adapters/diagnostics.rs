//! Sinks for diagnostics about skipped or malformed content.
//!
//! Capturing is fire-and-forget: a sink never fails and never blocks on
//! anything slower than a mutex.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// A captured diagnostic
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub level: DiagnosticLevel,
    pub extra: Value,
}

/// Receiver for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn capture(&self, message: &str, level: DiagnosticLevel, extra: Value);
}

/// Forwards diagnostics to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn capture(&self, message: &str, level: DiagnosticLevel, extra: Value) {
        match level {
            DiagnosticLevel::Info => info!(%extra, "{}", message),
            DiagnosticLevel::Warning => warn!(%extra, "{}", message),
            DiagnosticLevel::Error => error!(%extra, "{}", message),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    captured: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> Vec<Diagnostic> {
        self.captured
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.captured.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn capture(&self, message: &str, level: DiagnosticLevel, extra: Value) {
        self.captured
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Diagnostic {
                message: message.to_string(),
                level,
                extra,
            });
    }
}
