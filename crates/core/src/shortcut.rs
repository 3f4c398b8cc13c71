use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::command::Command;
use crate::context::Context;
use crate::error::Result;
use crate::sequence::CommandSequence;

/// A storable, invocable unit: either one command or a sequence of them.
///
/// Callers run a shortcut the same way whichever variant it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    Command(Command),
    Sequence(CommandSequence),
}

impl Shortcut {
    /// Wraps one command directly and several as a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::EmptySequence`] if `commands` is empty.
    pub fn from_commands(mut commands: Vec<Command>) -> Result<Self> {
        if commands.len() == 1 {
            if let Some(command) = commands.pop() {
                return Ok(Shortcut::Command(command));
            }
        }
        CommandSequence::new(commands).map(Shortcut::Sequence)
    }

    /// Number of runtime arguments expected; `-1` means loop arguments.
    pub fn args(&self) -> i32 {
        match self {
            Shortcut::Command(command) => command.args(),
            Shortcut::Sequence(sequence) => sequence.args(),
        }
    }

    pub fn run<S: AsRef<str>>(&self, arguments: &[S]) -> Result<()> {
        self.run_context(&Context::background(), arguments)
    }

    pub fn run_context<S: AsRef<str>>(&self, context: &Context, arguments: &[S]) -> Result<()> {
        match self {
            Shortcut::Command(command) => command.run_context(context, arguments),
            Shortcut::Sequence(sequence) => sequence.run_context(context, arguments),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Display for Shortcut {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Shortcut::Command(command) => write!(formatter, "{command}"),
            Shortcut::Sequence(sequence) => write!(formatter, "{sequence}"),
        }
    }
}

impl Serialize for Shortcut {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Shortcut::Command(command) => command.serialize(serializer),
            Shortcut::Sequence(sequence) => sequence.serialize(serializer),
        }
    }
}

impl From<Command> for Shortcut {
    fn from(value: Command) -> Self {
        Shortcut::Command(value)
    }
}

impl From<CommandSequence> for Shortcut {
    fn from(value: CommandSequence) -> Self {
        Shortcut::Sequence(value)
    }
}
