//! Trait for reporting per-package progress.

use std::time::Duration;

/// Receives progress while targets run.
///
/// This trait lets the core library announce work without writing to
/// stdout/stderr itself; the command line supplies a colored implementation.
pub trait RunReporter: Send + Sync {
    /// A target is about to run (or, for `echo`, has been selected).
    ///
    /// # Arguments
    ///
    /// * `label` - The package and target, e.g. `//libs/core:test`
    fn started(&self, label: &str);

    /// A target finished after `elapsed` wall-clock time.
    fn finished(&self, label: &str, elapsed: Duration, success: bool);

    /// Output buffered for a target that failed.
    fn output(&self, label: &str, output: &str);
}

