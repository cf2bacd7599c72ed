//! Line-based text entry on the console.

use std::io::{self, BufRead, Stdin, Stdout, Write};

use crate::renderer::TextEntry;

/// Canonical, echoing input on a terminal for as long as the guard lives.
///
/// The display keeps the terminal in raw mode, where Enter arrives as `\r`
/// and nothing is echoed. The previous settings come back on drop.
#[cfg(unix)]
struct CookedMode {
    fd: i32,
    saved: libc::termios,
}

#[cfg(unix)]
impl CookedMode {
    /// Returns `None` when `fd` is not a terminal.
    fn enter(fd: i32) -> io::Result<Option<Self>> {
        // SAFETY: `termios` is a plain C struct fully initialized by tcgetattr
        // before it is read; an invalid `fd` only makes the calls fail.
        unsafe {
            let mut saved: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut saved) != 0 {
                return Ok(None);
            }
            let mut cooked = saved;
            cooked.c_iflag |= libc::ICRNL;
            cooked.c_oflag |= libc::OPOST;
            cooked.c_lflag |= libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN;
            if libc::tcsetattr(fd, libc::TCSANOW, &cooked) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Some(Self { fd, saved }))
        }
    }
}

#[cfg(unix)]
impl Drop for CookedMode {
    fn drop(&mut self) {
        // SAFETY: restores settings read from the same descriptor in `enter`.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved) } != 0 {
            log::warn!(
                "Failed to restore terminal mode: {}",
                io::Error::last_os_error()
            );
        }
    }
}

/// Prompts on `output` and reads one line from `input`.
///
/// End of input (Ctrl+D on a terminal) cancels the prompt. When `input` is
/// a terminal, register its descriptor with [`LinePrompt::with_tty`] so the
/// line is read in canonical mode even while the display holds raw mode.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
    tty_fd: Option<i32>,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            tty_fd: None,
        }
    }

    /// Terminal descriptor backing `input`.
    pub fn with_tty(mut self, fd: i32) -> Self {
        self.tty_fd = Some(fd);
        self
    }

    fn ask(&mut self, title: &str, message: &str) -> io::Result<Option<String>> {
        #[cfg(unix)]
        let _cooked = match self.tty_fd {
            Some(fd) => CookedMode::enter(fd)?,
            None => None,
        };

        write!(self.output, "\n== {} ==\n{}\n> ", title, message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead, W: Write> TextEntry for LinePrompt<R, W> {
    fn prompt(&mut self, title: &str, message: &str) -> Option<String> {
        match self.ask(title, message) {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Text prompt failed: {}", e);
                None
            }
        }
    }
}

/// Prompt bound to the process's stdin and stdout.
pub type ConsolePrompt = LinePrompt<io::StdinLock<'static>, Stdout>;

pub fn console_prompt() -> ConsolePrompt {
    let stdin: Stdin = io::stdin();
    let prompt = LinePrompt::new(stdin.lock(), io::stdout());
    #[cfg(unix)]
    let prompt = prompt.with_tty(libc::STDIN_FILENO);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_one_line() {
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new(Cursor::new("guest@party.org\r\nnext\n"), &mut output);
        assert_eq!(
            prompt.prompt("Enter your email", "Address?"),
            Some("guest@party.org".to_string())
        );
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Enter your email"));
        assert!(shown.contains("Address?"));
    }

    #[test]
    fn test_empty_line_is_empty_answer() {
        let mut prompt = LinePrompt::new(Cursor::new("\n"), Vec::new());
        assert_eq!(prompt.prompt("t", "m"), Some(String::new()));
    }

    #[test]
    fn test_non_terminal_descriptor_is_ignored() {
        let mut prompt =
            LinePrompt::new(Cursor::new("guest@party.org\n"), Vec::new()).with_tty(-1);
        assert_eq!(
            prompt.prompt("t", "m"),
            Some("guest@party.org".to_string())
        );
    }

    #[test]
    fn test_eof_cancels() {
        let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.prompt("t", "m"), None);
    }
}
