//! Run reporter implementation for CLI.

use std::io::Write;
use std::time::Duration;

use strata_core::RunReporter;

use crate::formatting::{format_duration, Status};

/// CLI implementation of RunReporter.
pub struct CliRunReporter;

impl RunReporter for CliRunReporter {
    fn started(&self, label: &str) {
        println!("{}", Status::Started.format(label));
        let _ = std::io::stdout().flush();
    }

    fn finished(&self, label: &str, elapsed: Duration, success: bool) {
        let status = if success {
            Status::Succeeded
        } else {
            Status::Failed
        };
        let message = format!(
            "{} (Elapsed time: {})",
            label,
            format_duration(elapsed)
        );
        println!("{}", status.format(&message));
    }

    fn output(&self, _label: &str, output: &str) {
        print!("{}", output);
        let _ = std::io::stdout().flush();
    }
}
