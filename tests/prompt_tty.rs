//! Console prompt on a pseudo-terminal the display has left in raw mode.
//!
//! Checks that a typed address ending in Enter (`\r` in raw mode) completes the
//! prompt, and that raw mode is back once the prompt returns.

#![cfg(unix)]

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::os::unix::io::FromRawFd;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use photobooth::renderer::TextEntry;
use photobooth::terminal::LinePrompt;

/// Master and slave ends of a new pty, with the slave in raw mode.
fn open_raw_pty() -> (File, File, i32) {
    let mut master = -1;
    let mut slave = -1;
    // SAFETY: out-pointers are valid; null name, termios and winsize are allowed.
    let rc = unsafe {
        libc::openpty(
            &mut master,
            &mut slave,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };
    assert_eq!(rc, 0, "openpty failed: {}", io::Error::last_os_error());

    // SAFETY: the termios is filled by tcgetattr before use.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        assert_eq!(libc::tcgetattr(slave, &mut termios), 0);
        libc::cfmakeraw(&mut termios);
        assert_eq!(libc::tcsetattr(slave, libc::TCSANOW, &termios), 0);
    }

    // SAFETY: both descriptors were just opened and are owned by nothing else.
    let files = unsafe { (File::from_raw_fd(master), File::from_raw_fd(slave)) };
    (files.0, files.1, slave)
}

fn is_canonical(fd: i32) -> bool {
    // SAFETY: the termios is filled by tcgetattr before use.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios) == 0 && termios.c_lflag & libc::ICANON != 0
    }
}

#[test]
fn test_prompt_reads_address_from_raw_terminal() {
    let (mut master, slave, slave_fd) = open_raw_pty();
    assert!(!is_canonical(slave_fd));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut prompt = LinePrompt::new(BufReader::new(slave), Vec::new()).with_tty(slave_fd);
        let answer = prompt.prompt("Enter your email", "Where should we send the strip?");
        let _ = tx.send((answer, is_canonical(slave_fd)));
    });

    let deadline = Instant::now() + Duration::from_secs(3);
    while !is_canonical(slave_fd) {
        assert!(
            Instant::now() < deadline,
            "prompt never switched the terminal to line mode"
        );
        thread::sleep(Duration::from_millis(5));
    }
    master.write_all(b"guest@party.org\r").unwrap();

    let (answer, canonical_after) = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("prompt still waiting after Enter");
    assert_eq!(answer, Some("guest@party.org".to_string()));
    assert!(!canonical_after, "raw mode not restored after the prompt");
    drop(master);
}
