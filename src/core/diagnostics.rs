use std::fmt;

use log::{info, warn};

/// Why a record was left out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ArityMismatch { expected: usize, found: usize },
    /// 1-based column of the first value XML cannot carry
    InvalidValue { column: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ArityMismatch { expected, found } => {
                write!(f, "arity mismatch, expected {} fields, found {}", expected, found)
            }
            SkipReason::InvalidValue { column } => {
                write!(f, "column {} holds a character XML cannot represent", column)
            }
        }
    }
}

/// Structured events reported while converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    RecordSkipped { line: usize, reason: SkipReason },
    ParseFailure { line: usize, content: String },
    ConversionComplete { emitted: usize, skipped: usize },
}

/// Receiver of conversion diagnostics.
///
/// The converter never logs by itself: everything it has to say goes through
/// this trait, so callers decide where it ends up.
pub trait Diagnostics: Send + Sync {
    fn report(&self, event: DiagnosticEvent);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::RecordSkipped { line, reason } => {
                warn!("Record skipped at line {}: {}", line, reason)
            }
            DiagnosticEvent::ParseFailure { line, content } => {
                warn!("Parse failure at line {}: {}", line, content)
            }
            DiagnosticEvent::ConversionComplete { emitted, skipped } => {
                info!(
                    "Conversion complete: {} records emitted, {} skipped",
                    emitted, skipped
                )
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn report(&self, _event: DiagnosticEvent) {}
}
