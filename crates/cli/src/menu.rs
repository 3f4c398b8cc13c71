//! Numbered shortcut menu and interactive selection.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crossterm::style::Stylize;
use shortcuts_core::error::{Error, Result};
use shortcuts_core::store::{Pair, ShortcutStore};
use shortcuts_core::{Key, Shortcut};

/// Input that leaves the menu without running anything
pub const QUIT_OPTION: &str = "q";
/// The menu is shown again after this many bad choices in a row
const REPEAT_MENU_EVERY: usize = 5;

#[derive(Debug, PartialEq, Eq)]
pub enum Choice {
    /// 1-based position in the menu
    Index(usize),
    Quit,
}

/// Renders one numbered line per shortcut, keys aligned. Continuation lines
/// of multi-command shortcuts are indented under the first command.
pub fn render_menu(pairs: &[Pair], show_quit: bool, colored: bool) -> String {
    let digits = pairs.len().to_string().len();
    let mut menu = String::new();

    for (index, pair) in pairs.iter().enumerate() {
        let number = format!("{:>digits$}", index + 1);
        let key = format!("{:<width$}", pair.key.as_str(), width = pair.width);
        let indent = " ".repeat(digits + 2 + pair.width + 4);
        let shortcut = pair
            .shortcut
            .to_string()
            .replace('\n', &format!("\n{indent}"));

        if colored {
            menu.push_str(&format!("{}. {}    {}\n", number.cyan(), key.bold(), shortcut));
        } else {
            menu.push_str(&format!("{number}. {key}    {shortcut}\n"));
        }
    }

    if show_quit {
        menu.push_str(&format!("{QUIT_OPTION:>digits$}. Quit\n"));
    }

    menu
}

/// Interprets one line of menu input.
///
/// # Errors
///
/// Returns [`Error::BadChoice`] for anything that is neither the quit option
/// nor a number in `1..=count`.
pub fn parse_choice(input: &str, count: usize) -> Result<Choice> {
    let input = input.trim();

    if input.eq_ignore_ascii_case(QUIT_OPTION) {
        return Ok(Choice::Quit);
    }

    match input.parse::<usize>() {
        Ok(index) if (1..=count).contains(&index) => Ok(Choice::Index(index)),
        _ => Err(Error::BadChoice(input.to_string())),
    }
}

/// Shows the menu and reads choices until a valid one is made.
///
/// Returns `None` if the user quits or input ends.
///
/// # Errors
///
/// Returns [`Error::EmptyStore`] if there is nothing to choose, or an IO
/// error from reading or writing.
pub fn choose<R: BufRead, W: Write>(
    store: &ShortcutStore,
    input: &mut R,
    output: &mut W,
    colored: bool,
) -> Result<Option<(Key, Arc<Shortcut>)>> {
    let pairs = store.pairs();
    if pairs.is_empty() {
        return Err(Error::EmptyStore);
    }

    write!(output, "{}", render_menu(&pairs, true, colored))?;

    let mut bad_choices = 0;
    loop {
        write!(output, "Please enter your choice: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_choice(&line, pairs.len()) {
            Ok(Choice::Quit) => return Ok(None),
            Ok(Choice::Index(index)) => {
                let pair = &pairs[index - 1];
                return Ok(Some((pair.key.clone(), Arc::clone(&pair.shortcut))));
            }
            Err(e) => {
                writeln!(output, "{e}")?;
                bad_choices += 1;
                if bad_choices % REPEAT_MENU_EVERY == 0 {
                    write!(output, "{}", render_menu(&pairs, true, colored))?;
                }
            }
        }
    }
}
