//! Status indicators for per-package progress lines.

use owo_colors::OwoColorize;

/// Status types for consistent formatting.
#[derive(Debug, Clone, Copy)]
pub enum Status {
    Started,
    Succeeded,
    Failed,
}

impl Status {
    /// Returns the symbol for this status.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Started => "⇘",
            Status::Succeeded => "✔",
            Status::Failed => "✘",
        }
    }

    /// Formats a status line: symbol and message share the status color.
    pub fn format(&self, message: &str) -> String {
        let line = format!("{} {}", self.symbol(), message);
        match self {
            Status::Started => line.cyan().to_string(),
            Status::Succeeded => line.green().to_string(),
            Status::Failed => line.red().bold().to_string(),
        }
    }
}
