use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::execution::{self, Invocation};
use crate::template::{ArgsTemplate, Substitution};

/// How many runtime arguments a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No substitution; the template runs as written.
    None,
    /// Exactly this many arguments, one per placeholder.
    Exact(usize),
    /// One or more arguments, each expanding the first placeholder token.
    Loop,
}

impl Arity {
    /// The integer form used in JSON and by interactive callers:
    /// `0`, the exact count, or `-1` for loop mode.
    pub fn as_int(self) -> i32 {
        match self {
            Arity::None => 0,
            Arity::Exact(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Arity::Loop => -1,
        }
    }
}

impl From<i32> for Arity {
    fn from(value: i32) -> Self {
        match value {
            0 => Arity::None,
            n if n < 0 => Arity::Loop,
            n => Arity::Exact(n.unsigned_abs() as usize),
        }
    }
}

/// The persisted shape of a single command.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    #[serde(alias = "Name", alias = "NAME")]
    pub name: String,
    #[serde(default, alias = "N")]
    pub n: i32,
    #[serde(default, alias = "Args", alias = "ARGS")]
    pub args: Vec<String>,
    #[serde(default, alias = "Env", alias = "ENV")]
    pub env: Vec<String>,
}

/// A single executable with an argument template.
///
/// The executable is resolved when the command is built, so a `Command`
/// that exists always names something that could be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    program: PathBuf,
    arity: Arity,
    template: ArgsTemplate,
    env: Vec<String>,
}

impl Command {
    /// Builds a command, resolving `name` and checking that the template
    /// holds the placeholders `arity` asks for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExecutableNotFound`] if `name` does not resolve and
    /// [`Error::PlaceholderMismatch`] if the template and arity disagree.
    pub fn new<I, S>(name: impl Into<String>, arity: Arity, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let program = resolve_executable(&name)?;
        let template = ArgsTemplate::parse(args.into_iter().map(Into::into).collect());

        let placeholders = template.placeholder_count();
        let expected = match arity {
            Arity::Exact(n) if placeholders != n => Some(n.to_string()),
            Arity::Loop if template.loop_position().is_none() => Some("loop arguments".to_string()),
            _ => None,
        };
        if let Some(expected) = expected {
            return Err(Error::PlaceholderMismatch {
                name,
                placeholders,
                expected,
            });
        }

        Ok(Self {
            name,
            program,
            arity,
            template,
            env: Vec::new(),
        })
    }

    /// Sets `KEY=VALUE` environment overrides. When multiple entries share a
    /// key the last one wins; with no entries the parent environment is
    /// inherited unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEnvironment`] for an entry without `=`.
    pub fn with_env<I, S>(mut self, env: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let env: Vec<String> = env.into_iter().map(Into::into).collect();
        if let Some(invalid) = env.iter().find(|entry| !entry.contains('=')) {
            return Err(Error::InvalidEnvironment(invalid.clone()));
        }
        self.env = env;
        Ok(self)
    }

    pub fn from_definition(definition: CommandDefinition) -> Result<Self> {
        Self::new(definition.name, Arity::from(definition.n), definition.args)?.with_env(definition.env)
    }

    pub fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: self.name.clone(),
            n: self.arity.as_int(),
            args: self.template.raw(),
            env: self.env.clone(),
        }
    }

    /// Decodes a command from its JSON object form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for malformed JSON and the same errors as
    /// [`Command::new`] for a definition that does not validate.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let definition: CommandDefinition = serde_json::from_slice(bytes)?;
        Self::from_definition(definition)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn environment(&self) -> &[String] {
        &self.env
    }

    /// Number of runtime arguments expected; `-1` means one or more.
    pub fn args(&self) -> i32 {
        self.arity.as_int()
    }

    /// Checks the argument count and substitutes `arguments` into the
    /// template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgCountMismatch`] if the count does not satisfy the
    /// command's arity.
    pub fn invocation<S: AsRef<str>>(&self, arguments: &[S]) -> Result<Invocation> {
        let mismatch = || Error::ArgCountMismatch {
            need: self.args(),
            got: arguments.len(),
        };

        let rendered = match self.arity {
            Arity::None if arguments.is_empty() => self.template.raw(),
            Arity::Exact(n) if arguments.len() == n => {
                let mut substitution = Substitution::new(arguments);
                self.template.render(&mut substitution).ok_or_else(mismatch)?
            }
            Arity::Loop if !arguments.is_empty() => self.template.render_loop(arguments),
            _ => return Err(mismatch()),
        };

        Ok(self.invocation_with(rendered))
    }

    /// Renders this command as part of a shared pass over the arguments of
    /// a sequence. Commands without arity are left verbatim.
    pub(crate) fn substitute<S: AsRef<str>>(
        &self,
        substitution: &mut Substitution<'_, S>,
    ) -> Option<Invocation> {
        let rendered = match self.arity {
            Arity::Exact(_) => self.template.render(substitution)?,
            Arity::None | Arity::Loop => self.template.raw(),
        };
        Some(self.invocation_with(rendered))
    }

    fn invocation_with(&self, arguments: Vec<String>) -> Invocation {
        Invocation {
            program: self.program.clone(),
            arguments,
            environment: self.env.clone(),
        }
    }

    pub fn run<S: AsRef<str>>(&self, arguments: &[S]) -> Result<()> {
        self.run_context(&Context::background(), arguments)
    }

    /// Runs the command and blocks until it exits or `context` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument count is wrong, or if the process
    /// fails to start, exits unsuccessfully or is cancelled.
    pub fn run_context<S: AsRef<str>>(&self, context: &Context, arguments: &[S]) -> Result<()> {
        let invocation = self.invocation(arguments)?;
        execution::execute(&invocation, context)
    }
}

impl Display for Command {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.invocation_with(self.template.raw()))
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.definition().serialize(serializer)
    }
}

fn resolve_executable(name: &str) -> Result<PathBuf> {
    let not_found = |reason: String| Error::ExecutableNotFound {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(not_found("empty executable name".to_string()));
    }

    if name.contains(|c: char| c == '/' || c == MAIN_SEPARATOR) {
        let path = Path::new(name);
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(not_found("no such file".to_string()))
        };
    }

    let program = which::which(name).map_err(|e| not_found(e.to_string()))?;
    debug!("Resolved `{}` to `{}`", name, program.display());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn program_file() -> (NamedTempFile, String) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        (file, path)
    }

    #[test]
    fn test_arity_from_int() {
        assert_eq!(Arity::from(0), Arity::None);
        assert_eq!(Arity::from(2), Arity::Exact(2));
        assert_eq!(Arity::from(-5), Arity::Loop);
        assert_eq!(Arity::Loop.as_int(), -1);
    }

    #[test]
    fn test_new_missing_path() {
        let result = Command::new("/this/path/does/not/exist", Arity::None, Vec::<String>::new());
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[test]
    fn test_new_missing_on_path() {
        let result = Command::new("no-such-shortcut-binary-xyz", Arity::None, Vec::<String>::new());
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[test]
    fn test_new_empty_name() {
        let result = Command::new("", Arity::None, Vec::<String>::new());
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[test]
    fn test_new_placeholder_mismatch() {
        let (_file, path) = program_file();
        let result = Command::new(path.as_str(), Arity::Exact(2), ["%s"]);
        assert!(matches!(
            result,
            Err(Error::PlaceholderMismatch { placeholders: 1, .. })
        ));

        let result = Command::new(path.as_str(), Arity::Loop, ["plain"]);
        assert!(matches!(result, Err(Error::PlaceholderMismatch { .. })));
    }

    #[test]
    fn test_invocation_substitutes_arguments() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::Exact(1), ["%s"]).unwrap();

        let invocation = command.invocation(&["test"]).unwrap();
        assert_eq!(invocation.to_string(), format!("{path} test"));
    }

    #[test]
    fn test_invocation_count_mismatch() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::Exact(1), ["%s"]).unwrap();

        let result = command.invocation::<&str>(&[]);
        assert!(matches!(result, Err(Error::ArgCountMismatch { need: 1, got: 0 })));

        let result = command.invocation(&["a", "b"]);
        assert!(matches!(result, Err(Error::ArgCountMismatch { need: 1, got: 2 })));
    }

    #[test]
    fn test_invocation_no_arity_rejects_arguments() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::None, ["%s"]).unwrap();

        assert_eq!(command.invocation::<&str>(&[]).unwrap().arguments, vec!["%s"]);
        assert!(matches!(
            command.invocation(&["x"]),
            Err(Error::ArgCountMismatch { need: 0, got: 1 })
        ));
    }

    #[test]
    fn test_invocation_loop() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::Loop, ["-%s"]).unwrap();

        let invocation = command.invocation(&["a", "b", "c"]).unwrap();
        assert_eq!(invocation.to_string(), format!("{path} -a -b -c"));

        let result = command.invocation::<&str>(&[]);
        assert!(matches!(result, Err(Error::ArgCountMismatch { need: -1, got: 0 })));
    }

    #[test]
    fn test_display_with_environment() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::None, Vec::<String>::new())
            .unwrap()
            .with_env(["TEST=test"])
            .unwrap();

        assert_eq!(command.to_string(), format!("TEST=test {path}"));
    }

    #[test]
    fn test_display_shows_raw_template() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::Exact(1), ["--name=%s", "100%%"]).unwrap();
        assert_eq!(command.to_string(), format!("{path} --name=%s 100%%"));
    }

    #[test]
    fn test_with_env_rejects_missing_equals() {
        let (_file, path) = program_file();
        let result = Command::new(path.as_str(), Arity::None, Vec::<String>::new())
            .unwrap()
            .with_env(["NOT_AN_ASSIGNMENT"]);
        assert!(matches!(result, Err(Error::InvalidEnvironment(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::Exact(2), ["%s", "--", "%s"])
            .unwrap()
            .with_env(["A=1"])
            .unwrap();

        let encoded = command.to_json().unwrap();
        let decoded = Command::from_json(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_json_encoding_shape() {
        let (_file, path) = program_file();
        let command = Command::new(path.as_str(), Arity::None, ["x"]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&command.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "name": path, "n": 0, "args": ["x"], "env": [] })
        );
    }

    #[test]
    fn test_json_defaults() {
        let (_file, path) = program_file();
        let json = serde_json::json!({ "name": path }).to_string();

        let command = Command::from_json(json.as_bytes()).unwrap();
        assert_eq!(command.args(), 0);
        assert!(command.environment().is_empty());
    }

    #[test]
    fn test_json_capitalized_field_names() {
        let (_file, path) = program_file();
        let json = serde_json::json!({ "Name": path, "N": 1, "Args": ["%s"], "Env": ["A=1"] }).to_string();

        let command = Command::from_json(json.as_bytes()).unwrap();
        assert_eq!(command.args(), 1);
        assert_eq!(command.environment(), ["A=1"]);
    }

    #[test]
    fn test_json_schema_error() {
        assert!(matches!(Command::from_json(b"json"), Err(Error::Schema { .. })));
        assert!(matches!(
            Command::from_json(br#"{"name":1}"#),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_json_missing_executable() {
        let result = Command::from_json(br#"{"name":"/this/path/does/not/exist"}"#);
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_with_wrong_count_spawns_nothing() {
        let directory = tempfile::tempdir().unwrap();
        let marker = directory.path().join("marker");
        let marker = marker.to_str().unwrap();
        let command = Command::new("sh", Arity::Exact(1), ["-c", "touch %s"]).unwrap();

        assert!(matches!(
            command.run::<&str>(&[]),
            Err(Error::ArgCountMismatch { .. })
        ));
        assert!(matches!(
            command.run(&[marker, "extra"]),
            Err(Error::ArgCountMismatch { .. })
        ));
        assert!(!Path::new(marker).exists());

        command.run(&[marker]).unwrap();
        assert!(Path::new(marker).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_failure() {
        let command = Command::new("false", Arity::None, Vec::<String>::new()).unwrap();
        assert!(matches!(
            command.run::<&str>(&[]),
            Err(Error::SubProcessExit { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_context_cancelled() {
        let command = Command::new("sleep", Arity::Exact(1), ["%s"]).unwrap();
        let context = Context::background();
        context.cancel();
        assert!(matches!(
            command.run_context(&context, &["30"]),
            Err(Error::Cancelled { .. })
        ));
    }
}
