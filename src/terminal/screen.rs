//! Fullscreen terminal mode management with panic-safe cleanup.

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static flag to track if the booth owns the screen (for panic handler)
pub(crate) static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard holding the terminal in raw mode on the alternate screen.
/// Dropping it restores the normal screen, including on panic.
pub struct ScreenGuard {
    active: bool,
}

impl ScreenGuard {
    /// Enter raw mode on the alternate screen with the cursor hidden.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { active: true })
    }

    /// Restore the normal screen now. Drop becomes a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            execute!(io::stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if self.active {
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
        }
    }
}

/// Install a panic hook that restores the terminal before the panic message prints.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if SCREEN_ACTIVE.load(Ordering::SeqCst) {
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
        }

        original_hook(panic_info);
    }));
}
