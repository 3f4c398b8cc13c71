use std::fmt::{Display, Formatter};

use log::debug;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::command::{Arity, Command, CommandDefinition};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::execution::{self, Invocation};
use crate::template::Substitution;

/// An ordered, non-empty list of commands run one after another.
///
/// Runtime arguments are shared across the whole sequence: they are
/// consumed left to right through the members' placeholders in command
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    /// # Errors
    ///
    /// Returns [`Error::EmptySequence`] if `commands` is empty.
    pub fn new(commands: Vec<Command>) -> Result<Self> {
        if commands.is_empty() {
            return Err(Error::EmptySequence);
        }
        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Decodes either a single command object or an array of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the JSON is neither shape,
    /// [`Error::EmptySequence`] for an empty array, and any error from
    /// building the member commands.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub(crate) fn from_value(value: Value) -> Result<Self> {
        let single_error = match serde_json::from_value::<CommandDefinition>(value.clone()) {
            Ok(definition) => return Self::new(vec![Command::from_definition(definition)?]),
            Err(e) => e,
        };

        let definitions: Vec<CommandDefinition> = serde_json::from_value(value)
            .map_err(|list_error| Error::schema(format!("{single_error}\n{list_error}")))?;

        let commands = definitions
            .into_iter()
            .map(Command::from_definition)
            .collect::<Result<Vec<_>>>()?;

        Self::new(commands)
    }

    /// Encodes a single-command sequence as the bare command object and
    /// anything longer as an array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Derived arity: the sum of the members' arities, or `-1` if any member
    /// takes loop arguments.
    pub fn args(&self) -> i32 {
        if self
            .commands
            .iter()
            .any(|command| command.arity() == Arity::Loop)
        {
            return -1;
        }
        self.commands.iter().map(Command::args).sum()
    }

    /// Substitutes `arguments` across all members in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoopNotSupported`] for a multi-command sequence with
    /// a loop member and [`Error::ArgCountMismatch`] if the argument count is
    /// not the derived arity.
    pub fn invocations<S: AsRef<str>>(&self, arguments: &[S]) -> Result<Vec<Invocation>> {
        if let [command] = self.commands.as_slice() {
            return Ok(vec![command.invocation(arguments)?]);
        }

        let need = self.args();
        let Ok(expected) = usize::try_from(need) else {
            return Err(Error::LoopNotSupported);
        };

        let mismatch = || Error::ArgCountMismatch {
            need,
            got: arguments.len(),
        };
        if arguments.len() != expected {
            return Err(mismatch());
        }

        let mut substitution = Substitution::new(arguments);
        self.commands
            .iter()
            .map(|command| command.substitute(&mut substitution).ok_or_else(mismatch))
            .collect()
    }

    pub fn run<S: AsRef<str>>(&self, arguments: &[S]) -> Result<()> {
        self.run_context(&Context::background(), arguments)
    }

    /// Runs every member in order, stopping at the first failure. Members
    /// that already ran are not undone.
    pub fn run_context<S: AsRef<str>>(&self, context: &Context, arguments: &[S]) -> Result<()> {
        let invocations = self.invocations(arguments)?;
        let total = invocations.len();

        for (index, invocation) in invocations.iter().enumerate() {
            debug!("Running command {} of {}", index + 1, total);
            execution::execute(invocation, context)?;
        }

        Ok(())
    }
}

impl Display for CommandSequence {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, command) in self.commands.iter().enumerate() {
            if index != 0 {
                formatter.write_str("\n")?;
            }
            write!(formatter, "{command}")?;
        }
        Ok(())
    }
}

impl Serialize for CommandSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.commands.as_slice() {
            [command] => command.serialize(serializer),
            commands => commands.serialize(serializer),
        }
    }
}
