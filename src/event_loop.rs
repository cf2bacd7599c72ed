//! Main render/update loop.
//!
//! Single-threaded: local input and queued background events are fed to the
//! booth, the current state draws one frame, and the loop sleeps out the rest
//! of the frame budget for the booth's current rate.

use std::thread;
use std::time::{Duration, Instant};

use crate::booth::Booth;
use crate::bridge::EventReceiver;
use crate::renderer::{RenderError, Renderer};

/// Paces the loop to a target frame rate.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    frame_start: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self { frame_start: now }
    }

    /// Time allotted to one frame at `fps`. Zero disables pacing.
    pub fn budget(fps: u32) -> Duration {
        if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        }
    }

    /// Unused part of the current frame's budget as of `now`.
    pub fn remaining(&self, fps: u32, now: Instant) -> Duration {
        Self::budget(fps).saturating_sub(now.saturating_duration_since(self.frame_start))
    }

    /// Sleep out the current frame and start the next one.
    pub fn wait(&mut self, fps: u32) {
        let remaining = self.remaining(fps, Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        self.frame_start = Instant::now();
    }
}

/// Drive the booth until a quit event arrives.
pub fn run(
    booth: &mut Booth,
    renderer: &mut dyn Renderer,
    events: &EventReceiver,
) -> Result<(), RenderError> {
    let mut clock = FrameClock::new(Instant::now());
    log::info!("Booth ready");

    while booth.is_running() {
        let now = Instant::now();

        let mut pending = renderer.poll_events()?;
        pending.extend(events.drain());
        for event in pending {
            booth.handle_event(event, now);
        }
        if !booth.is_running() {
            break;
        }

        booth.tick(now, renderer)?;
        renderer.present()?;
        clock.wait(booth.target_fps());
    }

    log::info!("Main loop stopped");
    Ok(())
}
