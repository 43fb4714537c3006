//! Interactive line I/O for the chat loops.
//!
//! The session code talks to a [`Console`] trait so the turn-taking logic can
//! be driven by scripted input in tests. The real implementation prompts on
//! stdout and reads one line at a time from stdin.

use std::io::{self, BufRead, Write};

/// Local line input and peer message display.
pub trait Console {
    /// Prompt for and read one line of local input, with the trailing
    /// line terminator stripped. EOF on input is an error: the chat has no
    /// way to continue without a local turn.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Display a message received from the peer.
    fn show(&mut self, label: &str, text: &str);
}

/// Console backed by the process's stdin and stdout.
pub struct StdConsole {
    stdin: io::Stdin,
}

impl StdConsole {
    pub fn new() -> Self {
        StdConsole { stdin: io::stdin() }
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        let n = self.stdin.lock().read_line(&mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }

        strip_terminator(&mut line);
        Ok(line)
    }

    fn show(&mut self, label: &str, text: &str) {
        println!("{label}: {text}");
    }
}

/// Strip one trailing `\n` or `\r\n`. Other whitespace is part of the
/// message.
fn strip_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
