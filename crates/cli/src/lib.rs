//! Shortcuts CLI Library
//!
//! This crate provides the command-line front end for shortcuts. It finds
//! the shortcut file, lists the shortcuts as a numbered menu, prompts for
//! runtime arguments and hands the chosen shortcut to the core to run.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`config`]: Shortcut file discovery
//! - [`menu`]: Numbered menu rendering and interactive selection
//! - [`input`]: Interactive argument prompts
//!
//! # Examples
//!
//! The CLI binary (`sc`) can be used in several ways:
//!
//! ```bash
//! # Interactive mode - shows the numbered menu
//! sc
//!
//! # List shortcuts
//! sc --list
//!
//! # Run the second shortcut in the list, prompting for its arguments
//! sc --run 2
//!
//! # Run by key with arguments
//! sc deploy prod
//!
//! # Use a specific shortcut file
//! SHORTCUT=~/work/shortcut.json sc
//! ```

pub mod cli_args;
pub mod config;
pub mod input;
pub mod menu;
