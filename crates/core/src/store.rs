//! Concurrent registry of shortcuts by key.
//!
//! The store is internally synchronized, so it can be shared between
//! threads and read or written without external locking. Listing and
//! index-based selection use the lexicographic order of the keys.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::Value;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::sequence::CommandSequence;
use crate::shortcut::Shortcut;

#[derive(Debug, Default)]
pub struct ShortcutStore {
    entries: RwLock<HashMap<Key, Arc<Shortcut>>>,
}

/// A key and its shortcut, with the widest key width in the store so that
/// listings line up.
#[derive(Debug, Clone)]
pub struct Pair {
    pub key: Key,
    pub shortcut: Arc<Shortcut>,
    pub width: usize,
}

impl Display for Pair {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{:<width$}    {}",
            self.key.as_str(),
            self.shortcut,
            width = self.width
        )
    }
}

impl ShortcutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one command directly, or several as a sequence.
    ///
    /// # Panics
    ///
    /// Panics if `commands` is empty; storing nothing under a key is a
    /// caller bug, not a runtime condition.
    pub fn store(&self, key: impl Into<Key>, commands: Vec<Command>) {
        let key = key.into();
        assert!(!commands.is_empty(), "no commands provided for key: {key}");

        match Shortcut::from_commands(commands) {
            Ok(shortcut) => self.insert(key, shortcut),
            Err(e) => panic!("{e} (key: {key})"),
        }
    }

    pub fn insert(&self, key: impl Into<Key>, shortcut: impl Into<Shortcut>) {
        let _ = self
            .entries
            .write()
            .insert(key.into(), Arc::new(shortcut.into()));
    }

    pub fn load(&self, key: &str) -> Option<Arc<Shortcut>> {
        self.entries.read().get(key).cloned()
    }

    pub fn delete(&self, key: &str) {
        let _ = self.entries.write().remove(key);
    }

    /// Calls `visit` for each entry until it breaks.
    ///
    /// Iterates over a snapshot taken when the call starts, so `visit` may
    /// itself modify the store. Order is unspecified.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&Key, &Shortcut) -> ControlFlow<()>,
    {
        for (key, shortcut) in self.snapshot() {
            if visit(&key, &shortcut).is_break() {
                break;
            }
        }
    }

    fn snapshot(&self) -> Vec<(Key, Arc<Shortcut>)> {
        self.entries
            .read()
            .iter()
            .map(|(key, shortcut)| (key.clone(), Arc::clone(shortcut)))
            .collect()
    }

    /// Loads every entry of a JSON object mapping keys to a command object
    /// or an array of command objects.
    ///
    /// Nothing is stored unless every entry decodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the document is not a JSON object, and
    /// [`Error::InvalidEntries`] listing every entry that failed to decode.
    pub fn from_json(&self, bytes: &[u8]) -> Result<()> {
        let document: BTreeMap<Key, Value> = serde_json::from_slice(bytes)?;

        let mut decoded = Vec::with_capacity(document.len());
        let mut failures = Vec::new();
        for (key, value) in document {
            match CommandSequence::from_value(value) {
                Ok(sequence) => decoded.push((key, sequence)),
                Err(e) => {
                    debug!("Shortcut `{}` failed to decode: {}", key, e);
                    failures.push((key, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(Error::InvalidEntries(failures));
        }

        info!("Loaded {} shortcut(s)", decoded.len());
        let mut entries = self.entries.write();
        for (key, sequence) in decoded {
            let _ = entries.insert(key, Arc::new(Shortcut::Sequence(sequence)));
        }

        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the same
    /// errors as [`ShortcutStore::from_json`].
    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            Error::io_error("shortcut".to_string(), path.display().to_string(), e)
        })?;
        self.from_json(&bytes)
    }

    /// Encodes the store as a JSON object with keys in sorted order.
    pub fn to_json(&self) -> Result<String> {
        let entries = self.entries.read();
        let document: BTreeMap<&Key, &Shortcut> = entries
            .iter()
            .map(|(key, shortcut)| (key, shortcut.as_ref()))
            .collect();
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// All entries sorted by key, each annotated with the widest key width.
    pub fn pairs(&self) -> Vec<Pair> {
        let snapshot = self.snapshot();
        let width = snapshot
            .iter()
            .map(|(key, _)| key.width())
            .max()
            .unwrap_or_default();

        snapshot
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(key, shortcut)| Pair {
                key,
                shortcut,
                width,
            })
            .collect()
    }

    /// Returns the entry at the 1-based `ordinal` in key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if there are no entries and
    /// [`Error::OutOfRange`] if `ordinal` is not in `1..=count`.
    pub fn index(&self, ordinal: usize) -> Result<(Key, Arc<Shortcut>)> {
        let mut pairs = self.pairs();
        let count = pairs.len();

        if count == 0 {
            return Err(Error::EmptyStore);
        }
        if ordinal < 1 || ordinal > count {
            return Err(Error::OutOfRange {
                index: ordinal,
                count,
            });
        }

        let pair = pairs.swap_remove(ordinal - 1);
        Ok((pair.key, pair.shortcut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Arity;
    use std::io::Write;
    use std::thread;
    use tempfile::NamedTempFile;

    fn program_file() -> (NamedTempFile, String) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        (file, path)
    }

    fn command(path: &str) -> Command {
        Command::new(path, Arity::None, Vec::<String>::new()).unwrap()
    }

    #[test]
    fn test_store_load_delete() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();

        store.store("one", vec![command(&path)]);
        store.store("many", vec![command(&path), command(&path)]);

        assert!(matches!(store.load("one").as_deref(), Some(Shortcut::Command(_))));
        assert!(matches!(store.load("many").as_deref(), Some(Shortcut::Sequence(_))));
        assert!(store.load("missing").is_none());

        store.delete("one");
        assert!(store.load("one").is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    #[should_panic(expected = "no commands provided for key: empty")]
    fn test_store_without_commands_panics() {
        ShortcutStore::new().store("empty", vec![]);
    }

    #[test]
    fn test_store_replaces_existing_key() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();

        store.store("key", vec![command(&path)]);
        store.store("key", vec![command(&path), command(&path)]);

        assert_eq!(store.count(), 1);
        assert!(matches!(store.load("key").as_deref(), Some(Shortcut::Sequence(_))));
    }

    #[test]
    fn test_range_stops_on_break() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        for key in ["a", "b", "c"] {
            store.store(key, vec![command(&path)]);
        }

        let mut visited = 0;
        store.range(|_, _| {
            visited += 1;
            ControlFlow::Break(())
        });
        assert_eq!(visited, 1);

        let mut keys = Vec::new();
        store.range(|key, _| {
            keys.push(key.clone());
            ControlFlow::Continue(())
        });
        keys.sort();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b"), Key::from("c")]);
    }

    #[test]
    fn test_range_may_modify_store() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        store.store("a", vec![command(&path)]);
        store.store("b", vec![command(&path)]);

        store.range(|key, _| {
            store.delete(key.as_str());
            ControlFlow::Continue(())
        });
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_from_json_shapes() {
        let (_file, path) = program_file();
        let json = serde_json::json!({
            "a": { "name": path, "args": [".."] },
            "b": [
                { "name": path, "args": [".."] },
                { "name": path, "args": ["test"] }
            ],
            "c": { "name": path, "args": ["%s"] },
            "d": [
                { "name": path, "n": 1, "args": ["%s"] },
                { "name": path, "n": 1, "args": ["%s"] }
            ]
        })
        .to_string();

        let store = ShortcutStore::new();
        store.store("e", vec![command(&path)]);
        store.from_json(json.as_bytes()).unwrap();

        for (key, expected) in [
            ("a", format!("{path} ..")),
            ("b", format!("{path} ..\n{path} test")),
            ("c", format!("{path} %s")),
            ("d", format!("{path} %s\n{path} %s")),
            ("e", path.clone()),
        ] {
            let shortcut = store.load(key).unwrap_or_else(|| panic!("key {key} not found"));
            assert_eq!(shortcut.to_string(), expected, "key {key}");
        }
        assert_eq!(store.load("c").unwrap().args(), 0);
        assert_eq!(store.load("d").unwrap().args(), 2);
    }

    #[test]
    fn test_from_json_errors() {
        let store = ShortcutStore::new();

        assert!(matches!(store.from_json(b"json"), Err(Error::Schema { .. })));
        assert!(matches!(store.from_json(b"[]"), Err(Error::Schema { .. })));
        assert!(store.from_json(b"{}").is_ok());
        assert_eq!(store.count(), 0);

        match store.from_json(br#"{"a":{"name":1}}"#) {
            Err(Error::InvalidEntries(failures)) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(failures[0].1, Error::Schema { .. }));
            }
            other => panic!("Expected InvalidEntries, got {other:?}"),
        }

        match store.from_json(br#"{"a":[]}"#) {
            Err(Error::InvalidEntries(failures)) => {
                assert!(matches!(failures[0].1, Error::EmptySequence));
            }
            other => panic!("Expected InvalidEntries, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_is_all_or_nothing() {
        let (_file, path) = program_file();
        let json = serde_json::json!({
            "good": { "name": path },
            "bad": { "name": "/this/path/does/not/exist" },
            "worse": []
        })
        .to_string();

        let store = ShortcutStore::new();
        match store.from_json(json.as_bytes()) {
            Err(Error::InvalidEntries(failures)) => {
                let keys: Vec<&str> = failures.iter().map(|(key, _)| key.as_str()).collect();
                assert_eq!(keys, vec!["bad", "worse"]);
            }
            other => panic!("Expected InvalidEntries, got {other:?}"),
        }
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_from_file() {
        let (_file, path) = program_file();
        let mut config = NamedTempFile::new().unwrap();
        write!(config, "{}", serde_json::json!({ "x": { "name": path } })).unwrap();

        let store = ShortcutStore::new();
        store.from_file(config.path()).unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_from_file_not_found() {
        let result = ShortcutStore::new().from_file("/this/path/does/not/exist.json");
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_to_json_round_trip() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        store.store("single", vec![command(&path)]);
        store.store("double", vec![command(&path), command(&path)]);

        let encoded = store.to_json().unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert!(value["single"].is_object());
        assert!(value["double"].is_array());

        let decoded = ShortcutStore::new();
        decoded.from_json(encoded.as_bytes()).unwrap();
        assert_eq!(decoded.count(), 2);
        assert_eq!(decoded.load("double").unwrap().to_string(), store.load("double").unwrap().to_string());
    }

    #[test]
    fn test_index_is_one_based_and_sorted() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        store.store("b", vec![command(&path)]);
        store.store("a", vec![command(&path)]);

        let (key, _) = store.index(1).unwrap();
        assert_eq!(key.as_str(), "a");
        let (key, _) = store.index(2).unwrap();
        assert_eq!(key.as_str(), "b");

        assert!(matches!(store.index(0), Err(Error::OutOfRange { index: 0, count: 2 })));
        assert!(matches!(store.index(3), Err(Error::OutOfRange { index: 3, count: 2 })));
    }

    #[test]
    fn test_index_empty_store() {
        assert!(matches!(ShortcutStore::new().index(1), Err(Error::EmptyStore)));
    }

    #[test]
    fn test_pairs_are_aligned() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        store.store("long-key", vec![command(&path)]);
        store.store("k", vec![command(&path)]);

        let lines: Vec<String> = store.pairs().iter().map(ToString::to_string).collect();
        assert_eq!(lines[0], format!("k           {path}"));
        assert_eq!(lines[1], format!("long-key    {path}"));
        assert!(store.pairs().iter().all(|pair| pair.width == 8));
    }

    #[test]
    fn test_concurrent_access() {
        let (_file, path) = program_file();
        let store = ShortcutStore::new();
        let template = command(&path);

        thread::scope(|scope| {
            for worker in 0..4 {
                let store = &store;
                let template = template.clone();
                scope.spawn(move || {
                    for i in 0..50 {
                        let key = format!("{worker}-{i}");
                        store.store(key.as_str(), vec![template.clone()]);
                        assert!(store.load(&key).is_some());
                        let _ = store.pairs();
                        if i % 2 == 0 {
                            store.delete(&key);
                        }
                    }
                });
            }
        });

        assert_eq!(store.count(), 100);
    }
}
