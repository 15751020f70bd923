//! Console input and styled output

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, BufRead, Write};

/// Source of user input lines
pub trait Prompt {
    /// Show `prompt` and read one line without its newline; `None` at end of input
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompt reading from standard input
pub struct StdinPrompt {
    stdin: io::Stdin,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for StdinPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

fn colored<W: Write>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(color),
        Print(text),
        ResetColor,
        Print("\n")
    )?;
    out.flush()
}

pub fn info<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    colored(out, Color::Cyan, text)
}

pub fn warn<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    colored(out, Color::Yellow, text)
}

pub fn error<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    colored(out, Color::Red, text)
}

pub fn success<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    colored(out, Color::Green, text)
}

/// Bold heading in `color`
pub fn heading<W: Write>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(color),
        SetAttribute(Attribute::Bold),
        Print(text),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print("\n")
    )?;
    out.flush()
}

pub fn plain<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{text}")?;
    out.flush()
}
