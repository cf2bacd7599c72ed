//! Hardware button listener.
//!
//! The button controller writes one token per line on a serial device:
//! `d` when the button goes down and `r` once it is ready. The listener runs
//! on its own thread and turns button presses into [`BoothEvent::ButtonPressed`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use super::events::{BoothEvent, EventSender};

/// A parsed line from the button controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalToken {
    ButtonDown,
    Ready,
    Unknown,
}

impl SignalToken {
    pub fn parse(line: &str) -> Self {
        match line.trim_end() {
            "d" => SignalToken::ButtonDown,
            "r" => SignalToken::Ready,
            _ => SignalToken::Unknown,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputSourceError {
    #[error("Failed to open signal source '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read tokens until the source closes or fails, posting button presses.
///
/// Returns the number of events posted.
pub fn listen<R: BufRead>(reader: R, events: &EventSender) -> usize {
    let mut posted = 0;
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("Signal source read failed: {}", e);
                break;
            }
        };
        match SignalToken::parse(&line) {
            SignalToken::ButtonDown => {
                if events.post(BoothEvent::ButtonPressed) {
                    posted += 1;
                }
            }
            SignalToken::Ready => log::info!("Ready signal received from button controller"),
            SignalToken::Unknown => log::debug!("Ignoring signal token {:?}", line),
        }
    }
    posted
}

/// Open the signal device, configuring it as a raw serial line when it is a TTY.
pub fn open_source(path: &Path, baud_rate: u32) -> Result<BufReader<File>, InputSourceError> {
    let file = File::open(path).map_err(|e| InputSourceError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    configure_tty(&file, baud_rate);
    #[cfg(not(unix))]
    let _ = baud_rate;

    Ok(BufReader::new(file))
}

/// Put a TTY into raw mode at the requested speed. Non-TTY sources are left alone.
#[cfg(unix)]
fn configure_tty(file: &File, baud_rate: u32) {
    use std::os::unix::io::AsRawFd;

    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        _ => libc::B9600,
    };

    let fd = file.as_raw_fd();
    // SAFETY: `fd` is a valid open descriptor for the lifetime of `file`, and
    // `termios` is a plain C struct fully initialized by tcgetattr.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            log::debug!("Signal source is not a TTY, skipping line setup");
            return;
        }
        libc::cfmakeraw(&mut termios);
        libc::cfsetispeed(&mut termios, speed);
        libc::cfsetospeed(&mut termios, speed);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        if libc::tcsetattr(fd, libc::TCSANOW, &termios) != 0 {
            log::warn!(
                "Failed to configure signal source: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}

/// Spawn the listener thread.
///
/// If the device cannot be opened the failure is logged and the thread
/// exits; the booth stays usable from the keyboard.
pub fn spawn_listener(
    device: PathBuf,
    baud_rate: u32,
    events: EventSender,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("signal-listener".to_string())
        .spawn(move || {
            let reader = match open_source(&device, baud_rate) {
                Ok(r) => r,
                Err(e) => {
                    log::error!("{}", e);
                    return;
                }
            };
            log::info!("Signal listener attached to {}", device.display());
            let posted = listen(reader, &events);
            log::info!("Signal listener detached after {} button press(es)", posted);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::events::event_queue;
    use std::io::Cursor;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(SignalToken::parse("d"), SignalToken::ButtonDown);
        assert_eq!(SignalToken::parse("d\r"), SignalToken::ButtonDown);
        assert_eq!(SignalToken::parse("r"), SignalToken::Ready);
        assert_eq!(SignalToken::parse("dd"), SignalToken::Unknown);
        assert_eq!(SignalToken::parse(""), SignalToken::Unknown);
    }

    #[test]
    fn test_listen_posts_only_button_presses() {
        let (tx, rx) = event_queue(8);
        let input = Cursor::new("r\nd\nnoise\nd\r\n\n");
        let posted = listen(input, &tx);
        assert_eq!(posted, 2);
        assert_eq!(
            rx.drain(),
            vec![BoothEvent::ButtonPressed, BoothEvent::ButtonPressed]
        );
    }

    #[test]
    fn test_open_missing_device() {
        let err = open_source(Path::new("/nonexistent/ttyACM9"), 9600).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ttyACM9"));
    }

    #[test]
    fn test_listener_thread_exits_quietly_on_open_failure() {
        let (tx, rx) = event_queue(4);
        let handle = spawn_listener(PathBuf::from("/nonexistent/ttyACM9"), 9600, tx).unwrap();
        handle.join().expect("listener must not panic");
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_listener_thread_reads_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signals");
        std::fs::write(&path, "r\nd\n").unwrap();

        let (tx, rx) = event_queue(4);
        let handle = spawn_listener(path, 9600, tx).unwrap();
        handle.join().unwrap();
        assert_eq!(rx.drain(), vec![BoothEvent::ButtonPressed]);
    }
}
