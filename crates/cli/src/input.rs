use std::io::{BufRead, ErrorKind, Write};

use shortcuts_core::error::Result;

/// Prompts for the runtime arguments of a shortcut.
///
/// A non-negative `args` asks for exactly that many values. A negative
/// `args` (loop arguments) keeps asking until an empty line once at least
/// one value was given.
///
/// # Errors
///
/// Returns an error if reading or writing fails, or if input ends before
/// an exact number of arguments was read.
pub fn prompt_arguments<R: BufRead, W: Write>(
    args: i32,
    input: &mut R,
    output: &mut W,
) -> Result<Vec<String>> {
    if let Ok(count) = usize::try_from(args) {
        let mut arguments = Vec::with_capacity(count);
        for number in 1..=count {
            match read_argument(number, "", input, output)? {
                Some(argument) => arguments.push(argument),
                None => return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into()),
            }
        }
        return Ok(arguments);
    }

    let mut arguments: Vec<String> = Vec::new();
    loop {
        let hint = if arguments.is_empty() {
            ""
        } else {
            " (empty line to finish)"
        };

        match read_argument(arguments.len() + 1, hint, input, output)? {
            None => break,
            Some(argument) if argument.is_empty() => {
                if !arguments.is_empty() {
                    break;
                }
            }
            Some(argument) => arguments.push(argument),
        }
    }

    Ok(arguments)
}

fn read_argument<R: BufRead, W: Write>(
    number: usize,
    hint: &str,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    write!(output, "Please input argument {number}{hint}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
