//! Shortcuts Core Library
//!
//! This crate provides the core of shortcuts, a personal command launcher
//! that registers named shortcuts (one or more templated commands) and runs
//! them later by key, substituting runtime arguments into the stored
//! templates.
//!
//! # Key Features
//!
//! - **Commands**: An executable resolved at load time plus an argument template
//! - **Sequences**: Several commands sharing one pass over the runtime arguments,
//!   run in order and stopping at the first failure
//! - **Loop Arguments**: One placeholder token expanded once per argument
//! - **Shortcut Store**: A concurrent, key-ordered registry loaded from JSON
//! - **Cancellation**: Running processes are killed when their [`context::Context`] is cancelled
//!
//! # Examples
//!
//! Loading shortcuts from JSON and running one by index:
//!
//! ```no_run
//! use shortcuts_core::store::ShortcutStore;
//!
//! let store = ShortcutStore::new();
//! store.from_json(br#"{"list": {"name": "ls", "n": 1, "args": ["-la", "%s"]}}"#)?;
//!
//! let (key, shortcut) = store.index(1)?;
//! println!("Run {key}");
//! shortcut.run(&["/tmp"])?;
//! # Ok::<(), shortcuts_core::error::Error>(())
//! ```

pub mod command;
pub mod context;
pub mod error;
pub mod execution;
pub mod key;
pub mod sequence;
pub mod shortcut;
pub mod store;
pub mod template;

pub use command::{Arity, Command};
pub use context::Context;
pub use key::Key;
pub use sequence::CommandSequence;
pub use shortcut::Shortcut;
pub use store::ShortcutStore;
