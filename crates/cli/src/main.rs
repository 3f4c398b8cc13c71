use std::io::{stdin, stdout};
use std::process::ExitCode;

use clap::Parser;
use crossterm::tty::IsTty;
use log::{debug, info};
use shortcuts_core::error::{Error, Result};
use shortcuts_core::{Shortcut, ShortcutStore};

use shortcuts_cli::cli_args::Args;
use shortcuts_cli::config::Discovery;
use shortcuts_cli::{input, menu};

/// Load the shortcut store from the discovered file
fn initialize_store(args: &Args) -> Result<ShortcutStore> {
    let config_path = Discovery::from_environment(args.config_path.as_deref()).resolve()?;

    let store = ShortcutStore::new();
    store.from_file(&config_path)?;
    debug!("Loaded {} shortcut(s) from `{}`", store.count(), config_path.display());

    Ok(store)
}

/// Prompt for any arguments the shortcut needs, then run it
fn run_interactively(shortcut: &Shortcut) -> Result<()> {
    if shortcut.args() == 0 {
        return shortcut.run::<&str>(&[]);
    }

    println!("{shortcut}");
    let arguments = input::prompt_arguments(shortcut.args(), &mut stdin().lock(), &mut stdout())?;
    shortcut.run(&arguments)
}

fn execute() -> Result<()> {
    let args = Args::parse();
    let store = initialize_store(&args)?;

    if store.count() == 0 {
        info!("No shortcut loaded");
        println!("No shortcut loaded.");
        return Ok(());
    }

    let colored = stdout().is_tty();

    if args.list {
        print!("{}", menu::render_menu(&store.pairs(), false, colored));
        return Ok(());
    }

    if let Some(run_index) = args.run_position() {
        let (key, shortcut) = store.index(run_index)?;
        println!("Run {key}");
        return run_interactively(&shortcut);
    }

    if let Some(key) = args.key {
        let shortcut = store.load(&key).ok_or(Error::ShortcutNotFound(key))?;
        return shortcut.run(&args.arguments);
    }

    match menu::choose(&store, &mut stdin().lock(), &mut stdout(), colored)? {
        Some((key, shortcut)) => {
            println!("Run {key}");
            run_interactively(&shortcut)
        }
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
