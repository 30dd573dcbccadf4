mod commands;
mod formatting;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::Level;

use commands::{SelectionArgs, TestOutput};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Label-driven build orchestration for polyglot monorepos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, action, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the `test` target, dependencies first.
    Test {
        /// Label selecting packages and optionally a target, e.g. //libs:test
        label: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long = "test_output", value_enum, default_value_t = TestOutput::Streamed)]
        test_output: TestOutput,
    },
    /// Run an explicit target, forwarding ctrl-c to the running process.
    Run {
        label: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Run the `clean` target, dependents first.
    Clean {
        label: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Run the `format` target in every selected package.
    Format {
        label: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print the packages and target a label selects, without running anything.
    Echo {
        label: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print facts about the workspace and the current package.
    Info {
        fact: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Test {
            label,
            selection,
            test_output,
        } => commands::cmd_test(label.unwrap_or_default(), selection, test_output),
        Commands::Run { label, selection } => commands::cmd_run(label, selection),
        Commands::Clean { label, selection } => {
            commands::cmd_clean(label.unwrap_or_default(), selection)
        }
        Commands::Format { label, selection } => {
            commands::cmd_format(label.unwrap_or_default(), selection)
        }
        Commands::Echo { label, selection } => {
            commands::cmd_echo(label.unwrap_or_default(), selection)
        }
        Commands::Info { fact } => commands::cmd_info(fact),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
