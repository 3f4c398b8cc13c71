//! Shortcut file discovery.
//!
//! Candidate locations are tried in order: an explicit `--config-path`,
//! the `SHORTCUT` environment variable, `~/shortcut.json` and finally
//! `./shortcut.json`. Explicit locations are taken as given; the fallback
//! files are only used if they exist.

use std::env;
use std::path::PathBuf;

use log::debug;
use shortcuts_core::error::{Error, Result};

/// Environment variable naming the shortcut file
pub const CONFIG_ENV: &str = "SHORTCUT";
/// File name looked for in the home and working directories
pub const CONFIG_FILE_NAME: &str = "shortcut.json";

/// One place the shortcut file may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Used whether or not it exists; a missing file is reported on load.
    Given(PathBuf),
    /// Used only if the file exists.
    IfExists(PathBuf),
}

impl Candidate {
    fn resolve(&self) -> Option<PathBuf> {
        match self {
            Candidate::Given(path) => Some(path.clone()),
            Candidate::IfExists(path) if path.is_file() => Some(path.clone()),
            Candidate::IfExists(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    candidates: Vec<Candidate>,
}

impl Discovery {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Builds the standard candidate list from the flag, the environment and
    /// the home and working directories. `~` is expanded in given paths.
    pub fn from_environment(config_path: Option<&str>) -> Self {
        let mut candidates = Vec::new();

        if let Some(config_path) = config_path {
            candidates.push(Candidate::Given(expand(config_path)));
        }

        if let Some(from_env) = env::var(CONFIG_ENV).ok().filter(|value| !value.is_empty()) {
            candidates.push(Candidate::Given(expand(&from_env)));
        }

        let home = shellexpand::tilde("~");
        if home != "~" {
            candidates.push(Candidate::IfExists(
                PathBuf::from(home.as_ref()).join(CONFIG_FILE_NAME),
            ));
        }

        if let Ok(working_directory) = env::current_dir() {
            candidates.push(Candidate::IfExists(working_directory.join(CONFIG_FILE_NAME)));
        }

        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns the first candidate that resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoConfigFound`] if none does.
    pub fn resolve(&self) -> Result<PathBuf> {
        let path = self
            .candidates
            .iter()
            .find_map(Candidate::resolve)
            .ok_or(Error::NoConfigFound)?;

        debug!("Config path: `{}`", path.display());
        Ok(path)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
