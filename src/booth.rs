//! Top-level booth state machine.
//!
//! The booth cycles Waiting → Shooting → CollectingEmail → Thanks → Waiting.
//! It is driven entirely from the main loop: events are handed in through
//! [`Booth::handle_event`] and time advances through [`Booth::tick`], so all
//! session state is mutated on one thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::bridge::{BoothEvent, EmailPolicy, StripMailer};
use crate::camera::CameraDriver;
use crate::compositor::{Rotation, StripCompositor};
use crate::config::BoothConfig;
use crate::renderer::{prepare_preview, RenderError, Renderer, TextEntry, TextStyle};
use crate::session::{FileNaming, Session};
use crate::shoot::{Advance, ShootPhase, ShootSequencer, ShootTiming};

const CALL_TO_ACTION: &str = "PRESS THE BIG RED BUTTON TO START";
const RETRY_NOTICE: &str = "Hold still, trying again...";
const EMAIL_TITLE: &str = "Enter your email";
const EMAIL_MESSAGE: &str = "Enter your email address if you'd like a copy sent to you:";

/// Which screen the booth is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothState {
    Waiting,
    Shooting,
    CollectingEmail,
    Thanks,
}

/// External collaborators owned by the booth.
pub struct Collaborators {
    pub camera: Box<dyn CameraDriver>,
    pub prompt: Box<dyn TextEntry>,
    pub mailer: Box<dyn StripMailer>,
}

pub struct Booth {
    state: BoothState,
    running: bool,
    session: Session,
    sequencer: ShootSequencer,
    compositor: StripCompositor,
    naming: FileNaming,
    policy: EmailPolicy,
    camera: Box<dyn CameraDriver>,
    prompt: Box<dyn TextEntry>,
    mailer: Box<dyn StripMailer>,
    preview_rotation: Rotation,
    fullscreen: bool,
    idle_fps: u32,
    shooting_fps: u32,
    fps: u32,
    max_capture_attempts: u32,
    capture_failures: u32,
    last_strip: Option<PathBuf>,
}

impl Booth {
    pub fn new(
        config: &BoothConfig,
        compositor: StripCompositor,
        naming: FileNaming,
        parts: Collaborators,
    ) -> Self {
        let timing = ShootTiming {
            ready_wait: config.timing.ready_wait(),
            countdown_wait: config.timing.countdown_wait(),
        };
        Self {
            state: BoothState::Waiting,
            running: true,
            session: Session::new(config.shoot.shot_count),
            sequencer: ShootSequencer::new(timing, Instant::now()),
            compositor,
            naming,
            policy: EmailPolicy::from_config(&config.mail),
            camera: parts.camera,
            prompt: parts.prompt,
            mailer: parts.mailer,
            preview_rotation: config.template.rotation,
            fullscreen: config.fullscreen,
            idle_fps: config.timing.idle_fps,
            shooting_fps: config.timing.shooting_fps,
            fps: config.timing.idle_fps,
            max_capture_attempts: config.shoot.max_capture_attempts.max(1),
            capture_failures: 0,
            last_strip: None,
        }
    }

    pub fn state(&self) -> BoothState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Countdown phase; only meaningful while shooting.
    pub fn phase(&self) -> ShootPhase {
        self.sequencer.phase()
    }

    /// False once a quit event has been handled.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame rate the main loop should run at in the current state.
    pub fn target_fps(&self) -> u32 {
        self.fps
    }

    /// Most recent strip written, if any.
    pub fn last_strip(&self) -> Option<&Path> {
        self.last_strip.as_deref()
    }

    /// React to one input event.
    pub fn handle_event(&mut self, event: BoothEvent, now: Instant) {
        if !self.running {
            return;
        }
        match event {
            BoothEvent::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
            event if event.is_start_request() && self.state == BoothState::Waiting => {
                if event == BoothEvent::ButtonPressed {
                    log::info!("Actioning button press");
                }
                self.switch_state(BoothState::Shooting, now);
            }
            _ => log::debug!("Ignoring {:?} while {:?}", event, self.state),
        }
    }

    /// Run one frame of the current state.
    ///
    /// Per-session failures are logged and contained here; only display
    /// errors propagate.
    pub fn tick(&mut self, now: Instant, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        if !self.running {
            return Ok(());
        }
        match self.state {
            BoothState::Waiting => self.wait_state(renderer),
            BoothState::Shooting => self.shoot_state(now, renderer),
            BoothState::CollectingEmail => self.collect_email(now, renderer),
            BoothState::Thanks => {
                self.switch_state(BoothState::Waiting, now);
                Ok(())
            }
        }
    }

    fn wait_state(&mut self, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        self.update_preview(renderer, true)?;
        renderer.draw_centered_text(CALL_TO_ACTION, TextStyle::Large)
    }

    fn shoot_state(&mut self, now: Instant, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        self.update_preview(renderer, false)?;

        let result = self.sequencer.advance(
            now,
            &mut self.session,
            self.camera.as_mut(),
            &self.naming,
        );
        match result {
            Ok(Advance::ShotTaken { path, complete }) => {
                self.capture_failures = 0;
                log::info!(
                    "Shot {}/{} of session {} saved to {}",
                    self.session.images().len(),
                    self.session.shot_count(),
                    self.session.session_id(),
                    path.display()
                );
                if complete {
                    self.switch_state(BoothState::CollectingEmail, now);
                    return Ok(());
                }
            }
            Ok(Advance::PhaseChanged(_)) | Ok(Advance::Waiting) => {}
            Err(e) => {
                self.capture_failures += 1;
                log::warn!(
                    "Capture attempt {}/{} failed: {}",
                    self.capture_failures,
                    self.max_capture_attempts,
                    e
                );
                if self.capture_failures >= self.max_capture_attempts {
                    log::error!(
                        "Abandoning session {} after {} failed captures",
                        self.session.session_id(),
                        self.capture_failures
                    );
                    self.switch_state(BoothState::Thanks, now);
                    return Ok(());
                }
            }
        }

        match self.sequencer.phase().overlay_text() {
            Some(text) => renderer.draw_centered_text(text, TextStyle::Huge),
            None if self.capture_failures > 0 => {
                renderer.draw_centered_text(RETRY_NOTICE, TextStyle::Large)
            }
            None => Ok(()),
        }
    }

    fn collect_email(&mut self, now: Instant, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
        let started = Instant::now();
        let output = self.naming.strip_path(self.session.session_id());
        match self.compositor.compose_to(self.session.images(), &output) {
            Ok(strip) => {
                log::info!(
                    "Strip generated in {:.2}s: {}",
                    started.elapsed().as_secs_f64(),
                    strip.display()
                );
                self.last_strip = Some(strip.clone());
                self.request_email(strip, renderer);
            }
            Err(e) => {
                // Nothing worth mailing, go straight to the thanks screen
                log::error!(
                    "Strip for session {} failed: {}",
                    self.session.session_id(),
                    e
                );
            }
        }
        self.switch_state(BoothState::Thanks, now);
        Ok(())
    }

    /// Ask for an address and queue the strip. Display failures around the
    /// prompt are logged; the session always moves on.
    fn request_email(&mut self, strip: PathBuf, renderer: &mut dyn Renderer) {
        if self.fullscreen {
            if let Err(e) = renderer.set_fullscreen(false) {
                log::warn!("Could not leave fullscreen for the email prompt: {}", e);
            }
        }
        let answer = self.prompt.prompt(EMAIL_TITLE, EMAIL_MESSAGE);
        if self.fullscreen {
            if let Err(e) = renderer.set_fullscreen(true) {
                log::warn!("Could not restore fullscreen: {}", e);
            }
        }

        match answer.as_deref().and_then(|a| self.policy.accept(a)) {
            Some(address) => {
                log::info!("Queueing strip {} for {}", strip.display(), address);
                self.mailer.dispatch(address, strip);
            }
            None => log::info!(
                "No email for session {} ({:?})",
                self.session.session_id(),
                answer
            ),
        }
    }

    fn update_preview(&mut self, renderer: &mut dyn Renderer, dim: bool) -> Result<(), RenderError> {
        match self.camera.capture_preview() {
            Ok(frame) => {
                let prepared =
                    prepare_preview(&frame, self.preview_rotation, renderer.screen_size(), dim);
                renderer.draw_frame(&prepared.image, 0, prepared.offset_y)
            }
            Err(e) => {
                log::warn!("Preview unavailable: {}", e);
                Ok(())
            }
        }
    }

    fn switch_state(&mut self, target: BoothState, now: Instant) {
        let previous = self.state;
        match target {
            BoothState::Shooting => {
                self.session.begin_shooting();
                self.sequencer.reset(now);
                self.capture_failures = 0;
                self.fps = self.shooting_fps;
            }
            BoothState::Waiting => self.fps = self.idle_fps,
            BoothState::CollectingEmail | BoothState::Thanks => {}
        }
        if previous == BoothState::Thanks {
            self.session.finish();
        }
        self.state = target;
        log::info!(
            "{:?} -> {:?} (session {})",
            previous,
            target,
            self.session.session_id()
        );
    }
}
