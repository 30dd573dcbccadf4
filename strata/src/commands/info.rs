//! The `info` command.

use std::env;

use anyhow::Result;
use strata_core::{FactValue, Info};

use crate::formatting::{print_key_list, print_key_value, print_section_header};

use super::current_workspace;

/// Prints one fact as plain text for scripts, or every fact for people.
pub fn cmd_info(fact: Option<String>) -> Result<()> {
    let workspace = current_workspace()?;
    let cwd = env::current_dir()?;
    let info = Info::new(&workspace, &cwd);

    if let Some(name) = fact {
        let value = info.fact(&name)?;
        if value != FactValue::Missing {
            println!("{}", value);
        }
        return Ok(());
    }

    print_section_header("Workspace Info");
    for (name, value) in info.collect()? {
        match value {
            FactValue::Missing => print_key_value(name, "-"),
            FactValue::Text(text) => print_key_value(name, &text),
            FactValue::List(items) => print_key_list(name, &items),
        }
    }
    Ok(())
}
