//! CLI formatting utilities.
//!
//! Colors and symbols are kept here so every command prints progress and
//! facts the same way.

mod headers;
mod output;
mod status;

pub use headers::print_section_header;
pub use output::{format_duration, print_key_list, print_key_value};
pub use status::Status;
