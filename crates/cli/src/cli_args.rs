//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the
//! `clap` crate.

use clap::Parser;

/// Command-line arguments for the `sc` binary.
///
/// With no key, an interactive numbered menu is shown. With a key, the
/// shortcut is run directly with any trailing arguments.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use shortcuts_cli::cli_args::Args;
///
/// let args = Args::parse_from(["sc", "deploy", "prod"]);
/// assert_eq!(args.key.as_deref(), Some("deploy"));
/// ```
#[derive(Parser, Debug)]
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the shortcut JSON file.
    ///
    /// If not provided, `$SHORTCUT` is used, then `~/shortcut.json`, then
    /// `./shortcut.json`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// List the shortcuts and exit.
    #[arg(long, short = 'l', action)]
    pub list: bool,

    /// Run the shortcut at this position in the list (1-based).
    #[arg(long = "run", short = 'r')]
    pub run_index: Option<usize>,

    /// Key of the shortcut to run.
    #[arg(num_args(1), allow_hyphen_values = true)]
    pub key: Option<String>,

    /// Arguments substituted into the shortcut's command templates.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub arguments: Vec<String>,
}

impl Args {
    /// The menu position requested with `--run`. Zero means no position,
    /// leaving the interactive menu in charge.
    pub fn run_position(&self) -> Option<usize> {
        self.run_index.filter(|&index| index > 0)
    }
}
