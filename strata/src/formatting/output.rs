//! General output formatting utilities.

use std::time::Duration;

use owo_colors::OwoColorize;

/// Prints one fact on a single line.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}

/// Prints a key followed by one indented line per item.
pub fn print_key_list(key: &str, items: &[String]) {
    println!("  {}", key.bright_black().bold());
    for item in items {
        println!("    {}", item.white());
    }
}

/// Renders an elapsed time as `250ms`, `3.50s` or `2m 5.0s`.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else {
        format!("{}m {:.1}s", elapsed.as_secs() / 60, seconds % 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(3500)), "3.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5.0s");
    }
}
