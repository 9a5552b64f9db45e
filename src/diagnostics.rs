//! # diagnostics
//!
//! Sink receiving the failures which are reported but not returned

/// Receives diagnostics which the client does not return to the caller:
/// construction failures, failed lookups and swallowed release errors.
pub trait DiagnosticSink {
    fn error(&self, message: &str);
}

/// Sink forwarding every diagnostic to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str),
{
    fn error(&self, message: &str) {
        self(message)
    }
}
