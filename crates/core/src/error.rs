use std::fmt::{Display, Formatter};
use std::process::ExitStatus;

use thiserror::Error;

use crate::key::Key;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid shortcut JSON: {}", .message)]
    Schema { message: String },

    #[error("Executable `{}` could not be found: {}", .name, .reason)]
    ExecutableNotFound { name: String, reason: String },

    #[error("Invalid environment entry `{}`: expected KEY=VALUE", .0)]
    InvalidEnvironment(String),

    #[error("A command sequence needs at least one command.")]
    EmptySequence,

    #[error("The shortcut store is empty.")]
    EmptyStore,

    #[error("{}", arg_count_message(.need, .got))]
    ArgCountMismatch { need: i32, got: usize },

    #[error("Loop arguments are not supported in a sequence of commands.")]
    LoopNotSupported,

    #[error("Command `{}` has {} placeholder(s) but declares {}", .name, .placeholders, .expected)]
    PlaceholderMismatch {
        name: String,
        placeholders: usize,
        expected: String,
    },

    #[error("Out of range (1-{}): {}", .count, .index)]
    OutOfRange { index: usize, count: usize },

    #[error("The sub process `{}` exited with non-success status: {}", .command, .status)]
    SubProcessExit { command: String, status: ExitStatus },

    #[error("Error with sub process `{}`: {}", .command, .original)]
    SubProcess {
        command: String,
        original: std::io::Error,
    },

    #[error("Sub process `{}` was cancelled.", .command)]
    Cancelled { command: String },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("{}", EntryErrors(.0))]
    InvalidEntries(Vec<(Key, Error)>),

    #[error("Shortcut `{}` not found", .0)]
    ShortcutNotFound(String),

    #[error("No shortcut file found. Set SHORTCUT or create ~/shortcut.json")]
    NoConfigFound,

    #[error("Bad choice: `{}`", .0)]
    BadChoice(String),

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),
}

impl Error {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn sub_process(command: String, original: std::io::Error) -> Self {
        Self::SubProcess { command, original }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::schema(value.to_string())
    }
}

fn arg_count_message(need: &i32, got: &usize) -> String {
    if *need < 0 {
        format!("Expected at least one argument, got {got}")
    } else {
        format!("Expected {need} argument(s), got {got}")
    }
}

struct EntryErrors<'a>(&'a [(Key, Error)]);

impl Display for EntryErrors<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, (key, error)) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            write!(f, "Shortcut `{key}`: {error}")?;
        }
        Ok(())
    }
}
