//! Where builtins read and write
//!
//! The interpreter never touches stdin/stdout directly. It hands a
//! [`Console`] to every builtin, so embedders and tests can capture output or
//! feed scripted input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Console {
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Read one line, including its terminator if present. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// The process's standard input and output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        io::stdout().lock().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }
}

/// In-memory console with scripted input and captured output
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: String,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console whose input yields the lines of `input`
    pub fn with_input(input: &str) -> Self {
        Self {
            input: input.lines().map(|l| format!("{}\n", l)).collect(),
            output: String::new(),
        }
    }

    /// Everything written so far
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Console for BufferConsole {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }
}
