// src/input.rs
//
// Blocking operator input. Every menu prompt goes through `read_choice`,
// which re-prompts until the answer matches one of the allowed characters.
// There is no timeout and no retry bound — the session is single-threaded
// and waits as long as the operator does.

use std::io::{BufRead, Error, ErrorKind, Write};

/// Read one choice from the operator, re-prompting until the first character
/// of the entered token is a member of `allowed`.
///
/// Case handling is the caller's: menus pass both `'a'` and `'A'` for the
/// same action, numeric sub-menus pass digits only.
///
/// End of input mid-prompt is an `UnexpectedEof` error — the session cannot
/// continue without an operator.
pub fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    allowed: &[char],
) -> std::io::Result<char> {
    loop {
        match read_raw(input)? {
            Some(c) if allowed.contains(&c) => return Ok(c),
            Some(_) | None => {
                writeln!(
                    output,
                    "Input did not match expected options. Please try again."
                )?;
            }
        }
    }
}

/// Read a single line and return the first character of its first token, or
/// `Ok(None)` on a blank line. End of input is an `UnexpectedEof` error.
///
/// Used directly by the top-level menu, which treats an unknown character as
/// a fatal exit rather than re-prompting.
pub fn read_raw<R: BufRead>(input: &mut R) -> std::io::Result<Option<char>> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    if n == 0 {
        return Err(Error::new(ErrorKind::UnexpectedEof, "end of input"));
    }
    Ok(line.trim().chars().next())
}
