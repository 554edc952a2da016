//! Interactive prompts on the terminal.
//!
//! Prompts are written to stderr and answers read from stdin, keeping stdout
//! free for command output. API keys are read in raw mode so they are never
//! echoed.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::error::{AppError, Result};

/// Source of answers to interactive questions.
pub trait Prompter {
    /// Pick one of `choices`. `Ok(None)` means the user cancelled.
    fn select(&self, message: &str, choices: &[String]) -> Result<Option<String>>;

    /// Ask a yes/no question; anything but an explicit yes is a no.
    fn confirm(&self, message: &str) -> Result<bool>;

    /// Read a line of visible text.
    fn input(&self, message: &str) -> Result<String>;

    /// Read a line without echoing it.
    fn secret(&self, message: &str) -> Result<String>;
}

/// Prompter reading from the process's stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(&self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_secret_raw(&self) -> Result<String> {
        terminal::enable_raw_mode()?;
        let result = read_secret_keys();
        terminal::disable_raw_mode()?;
        eprintln!();
        result
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, choices: &[String]) -> Result<Option<String>> {
        let mut stderr = io::stderr();
        writeln!(stderr, "? {}", message)?;
        for (index, choice) in choices.iter().enumerate() {
            writeln!(stderr, "  {}) {}", index + 1, choice)?;
        }

        loop {
            write!(stderr, "Enter a number (blank to cancel): ")?;
            stderr.flush()?;

            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            if answer.trim().is_empty() {
                return Ok(None);
            }
            match parse_selection(&answer, choices.len()) {
                Some(index) => return Ok(Some(choices[index].clone())),
                None => writeln!(stderr, "Please enter a number between 1 and {}", choices.len())?,
            }
        }
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "? {} [y/N] ", message)?;
        stderr.flush()?;

        Ok(self
            .read_line()?
            .map(|answer| is_yes(&answer))
            .unwrap_or(false))
    }

    fn input(&self, message: &str) -> Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{}: ", message)?;
        stderr.flush()?;

        self.read_line()?.ok_or(AppError::Aborted)
    }

    fn secret(&self, message: &str) -> Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{}: ", message)?;
        stderr.flush()?;

        if io::stdin().is_terminal() {
            self.read_secret_raw()
        } else {
            self.read_line()?.ok_or(AppError::Aborted)
        }
    }
}

/// Outcome of feeding one key press to a hidden input line.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

fn read_secret_keys() -> Result<String> {
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_secret_key(&mut buffer, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => return Ok(buffer),
                KeyOutcome::Cancel => return Err(AppError::Aborted),
            }
        }
    }
}

fn apply_secret_key(buffer: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }

    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyOutcome::Cancel,
        KeyCode::Backspace => {
            buffer.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Parse a 1-based menu answer into an index.
fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
