//! Destination-tagged output.
//!
//! The session reports everything worth showing a user through an
//! [`OutputSink`]. The destination is [`STATUS`], [`ERROR`], a channel
//! name, a command verb, or `""` for untargeted lines. Calls arrive on the
//! session task; routing them elsewhere is up to the implementor.

/// Destination for connection status lines.
pub const STATUS: &str = "Status";

/// Destination for parse failures.
pub const ERROR: &str = "Error";

/// Receiver of session output.
pub trait OutputSink: Send + Sync + 'static {
    /// Handle one line of output for `destination`.
    fn write_line(&self, destination: &str, line: &str);
}

impl<F> OutputSink for F
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    fn write_line(&self, destination: &str, line: &str) {
        self(destination, line)
    }
}
