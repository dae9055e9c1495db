//! Yes/no confirmation on stdin.

use std::io::{self, BufRead, Write};

/// Writes `<question> (y/n): ` and reads one line. Only `y` (any case, surrounding
/// whitespace ignored) counts as yes; EOF counts as no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{question} (y/n): ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
