//! Line-oriented interactive prompts.
//!
//! The cleanup workflow talks to the user only through [`Prompter`], so the
//! same loop runs against a terminal or against scripted input in tests.

use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Prints `message` (no newline) and reads one line.
    ///
    /// Returns the line without its terminator, untrimmed otherwise, or
    /// `None` at end of input.
    fn ask(&mut self, message: &str) -> io::Result<Option<String>>;

    /// Prints `text` as-is.
    fn say(&mut self, text: &str) -> io::Result<()>;
}

/// [`Prompter`] over any reader/writer pair.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Prompter bound to the process's stdin and stdout.
pub fn stdio() -> LinePrompter<io::StdinLock<'static>, io::Stdout> {
    LinePrompter::new(io::stdin().lock(), io::stdout())
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, message: &str) -> io::Result<Option<String>> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_terminator(line)))
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()
    }
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_and_reports_eof() {
        let input: &[u8] = b"shop\r\n  Spaced  \n";
        let mut p = LinePrompter::new(input, Vec::new());

        assert_eq!(p.ask("db? ").unwrap().as_deref(), Some("shop"));
        assert_eq!(p.ask("db? ").unwrap().as_deref(), Some("  Spaced  "));
        assert_eq!(p.ask("db? ").unwrap(), None);

        let out = String::from_utf8(p.into_writer()).unwrap();
        assert_eq!(out, "db? db? db? ");
    }
}
