//! Countdown pacing for the shooting state.
//!
//! A shoot cycles "Get Ready!" → 3 → 2 → 1 → capture, then 3 → 2 → 1 →
//! capture again until the session's shot quota is met. Each phase has its
//! own timer; the phase after a capture runs twice as long to absorb the
//! camera's capture latency.

use std::time::{Duration, Instant};

use crate::camera::{CameraDriver, CameraError};
use crate::session::{FileNaming, Session};

/// A step of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootPhase {
    GetReady,
    CountdownThree,
    CountdownTwo,
    CountdownOne,
    Capture,
}

impl ShootPhase {
    /// Successor in the cycle. `GetReady` is only ever entered by a reset.
    pub fn next(self) -> Self {
        match self {
            ShootPhase::GetReady => ShootPhase::CountdownThree,
            ShootPhase::CountdownThree => ShootPhase::CountdownTwo,
            ShootPhase::CountdownTwo => ShootPhase::CountdownOne,
            ShootPhase::CountdownOne => ShootPhase::Capture,
            ShootPhase::Capture => ShootPhase::CountdownThree,
        }
    }

    /// Text shown over the live preview during this phase.
    pub fn overlay_text(self) -> Option<&'static str> {
        match self {
            ShootPhase::GetReady => Some("Get Ready!"),
            ShootPhase::CountdownThree => Some("3"),
            ShootPhase::CountdownTwo => Some("2"),
            ShootPhase::CountdownOne => Some("1"),
            ShootPhase::Capture => None,
        }
    }
}

/// Wall-clock timer for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootTimer {
    pub phase_start: Instant,
    pub phase_duration: Duration,
}

impl ShootTimer {
    pub fn new(phase_start: Instant, phase_duration: Duration) -> Self {
        Self {
            phase_start,
            phase_duration,
        }
    }

    /// True once `now` has reached the end of the phase.
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.phase_start + self.phase_duration
    }
}

/// Phase durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootTiming {
    /// "Get Ready!" duration
    pub ready_wait: Duration,
    /// Duration of each countdown number
    pub countdown_wait: Duration,
}

impl ShootTiming {
    /// Duration of the phase following a capture.
    pub fn after_capture(&self) -> Duration {
        self.countdown_wait * 2
    }
}

/// What a call to [`ShootSequencer::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Current phase still running
    Waiting,
    /// Moved to a new countdown phase
    PhaseChanged(ShootPhase),
    /// A still was captured. `complete` is set when it was the last shot.
    ShotTaken { path: std::path::PathBuf, complete: bool },
}

/// Sub-state machine driving one session's captures.
#[derive(Debug, Clone)]
pub struct ShootSequencer {
    phase: ShootPhase,
    timer: ShootTimer,
    timing: ShootTiming,
    finished: bool,
}

impl ShootSequencer {
    pub fn new(timing: ShootTiming, now: Instant) -> Self {
        Self {
            phase: ShootPhase::GetReady,
            timer: ShootTimer::new(now, timing.ready_wait),
            timing,
            finished: false,
        }
    }

    /// Restart at "Get Ready!" with the long ready duration.
    pub fn reset(&mut self, now: Instant) {
        self.phase = ShootPhase::GetReady;
        self.timer = ShootTimer::new(now, self.timing.ready_wait);
        self.finished = false;
    }

    pub fn phase(&self) -> ShootPhase {
        self.phase
    }

    pub fn timer(&self) -> ShootTimer {
        self.timer
    }

    /// True once the final shot has been taken; further advances are no-ops.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Move the countdown forward if the current phase has elapsed.
    ///
    /// In the capture phase this takes a still into the path reserved for the
    /// session's next shot and records it. A failed capture leaves the phase
    /// at `Capture` and re-arms the timer with the short countdown so the
    /// caller can retry without skipping a shot.
    pub fn advance(
        &mut self,
        now: Instant,
        session: &mut Session,
        camera: &mut dyn CameraDriver,
        naming: &FileNaming,
    ) -> Result<Advance, CameraError> {
        if self.finished || !self.timer.expired(now) {
            return Ok(Advance::Waiting);
        }

        if self.phase != ShootPhase::Capture {
            self.phase = self.phase.next();
            self.timer = ShootTimer::new(now, self.timing.countdown_wait);
            return Ok(Advance::PhaseChanged(self.phase));
        }

        if session.is_complete() {
            self.finished = true;
            return Ok(Advance::Waiting);
        }

        let path = naming.capture_path(session.session_id(), session.shot_counter());
        if let Err(e) = camera.capture_still(&path) {
            self.timer = ShootTimer::new(now, self.timing.countdown_wait);
            return Err(e);
        }

        session.record_capture(path.clone());
        self.phase = self.phase.next();
        self.timer = ShootTimer::new(now, self.timing.after_capture());

        let complete = session.is_complete();
        if complete {
            self.finished = true;
        }
        Ok(Advance::ShotTaken { path, complete })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::path::{Path, PathBuf};

    const SEC: Duration = Duration::from_secs(1);

    fn timing() -> ShootTiming {
        ShootTiming {
            ready_wait: Duration::from_secs(5),
            countdown_wait: SEC,
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        fail_next: u32,
        stills: Vec<PathBuf>,
    }

    impl CameraDriver for FakeCamera {
        fn capture_preview(&mut self) -> Result<RgbImage, CameraError> {
            Ok(RgbImage::new(4, 3))
        }

        fn capture_still(&mut self, path: &Path) -> Result<(), CameraError> {
            if self.fail_next > 0 {
                self.fail_next -= 1;
                return Err(CameraError::CaptureFailed {
                    path: path.to_path_buf(),
                    message: "busy".to_string(),
                });
            }
            self.stills.push(path.to_path_buf());
            Ok(())
        }
    }

    fn naming() -> FileNaming {
        FileNaming::new("images", "Booth", "Strip", 1)
    }

    #[test]
    fn test_phase_cycle() {
        assert_eq!(ShootPhase::GetReady.next(), ShootPhase::CountdownThree);
        assert_eq!(ShootPhase::CountdownThree.next(), ShootPhase::CountdownTwo);
        assert_eq!(ShootPhase::CountdownTwo.next(), ShootPhase::CountdownOne);
        assert_eq!(ShootPhase::CountdownOne.next(), ShootPhase::Capture);
        assert_eq!(ShootPhase::Capture.next(), ShootPhase::CountdownThree);
    }

    #[test]
    fn test_overlay_text() {
        assert_eq!(ShootPhase::GetReady.overlay_text(), Some("Get Ready!"));
        assert_eq!(ShootPhase::CountdownTwo.overlay_text(), Some("2"));
        assert_eq!(ShootPhase::Capture.overlay_text(), None);
    }

    #[test]
    fn test_timer_expiry_boundary() {
        let t0 = Instant::now();
        let timer = ShootTimer::new(t0, SEC);
        assert!(!timer.expired(t0));
        assert!(!timer.expired(t0 + Duration::from_millis(999)));
        assert!(timer.expired(t0 + SEC));
    }

    #[test]
    fn test_no_advance_before_deadline() {
        let t0 = Instant::now();
        let mut seq = ShootSequencer::new(timing(), t0);
        let mut session = Session::new(3);
        let mut camera = FakeCamera::default();

        let result = seq
            .advance(t0 + Duration::from_secs(4), &mut session, &mut camera, &naming())
            .unwrap();
        assert_eq!(result, Advance::Waiting);
        assert_eq!(seq.phase(), ShootPhase::GetReady);
    }

    #[test]
    fn test_four_advances_reach_capture() {
        let t0 = Instant::now();
        let mut seq = ShootSequencer::new(timing(), t0);
        let mut session = Session::new(3);
        let mut camera = FakeCamera::default();

        let mut now = t0 + Duration::from_secs(5);
        for expected in [
            ShootPhase::CountdownThree,
            ShootPhase::CountdownTwo,
            ShootPhase::CountdownOne,
            ShootPhase::Capture,
        ] {
            let result = seq
                .advance(now, &mut session, &mut camera, &naming())
                .unwrap();
            assert_eq!(result, Advance::PhaseChanged(expected));
            now += SEC;
        }
        assert_eq!(seq.phase(), ShootPhase::Capture);
        assert!(camera.stills.is_empty());
    }

    #[test]
    fn test_capture_decrements_and_doubles_timer() {
        let t0 = Instant::now();
        let mut seq = ShootSequencer::new(timing(), t0);
        let mut session = Session::new(3);
        session.begin_shooting();
        let mut camera = FakeCamera::default();

        let mut now = t0 + Duration::from_secs(5);
        for _ in 0..4 {
            seq.advance(now, &mut session, &mut camera, &naming()).unwrap();
            now += SEC;
        }

        let result = seq
            .advance(now, &mut session, &mut camera, &naming())
            .unwrap();
        assert_eq!(
            result,
            Advance::ShotTaken {
                path: PathBuf::from("images/Booth1-000100.jpg"),
                complete: false
            }
        );
        assert_eq!(session.shots_left(), 2);
        assert_eq!(session.shot_counter(), 1);
        assert_eq!(seq.phase(), ShootPhase::CountdownThree);
        assert_eq!(seq.timer().phase_duration, Duration::from_secs(2));

        // One second later the doubled phase is still running
        let result = seq
            .advance(now + SEC, &mut session, &mut camera, &naming())
            .unwrap();
        assert_eq!(result, Advance::Waiting);
    }

    #[test]
    fn test_capture_failure_keeps_phase() {
        let t0 = Instant::now();
        let mut seq = ShootSequencer::new(timing(), t0);
        let mut session = Session::new(1);
        session.begin_shooting();
        let mut camera = FakeCamera {
            fail_next: 1,
            ..Default::default()
        };

        let mut now = t0 + Duration::from_secs(5);
        for _ in 0..4 {
            seq.advance(now, &mut session, &mut camera, &naming()).unwrap();
            now += SEC;
        }

        let err = seq
            .advance(now, &mut session, &mut camera, &naming())
            .unwrap_err();
        assert!(matches!(err, CameraError::CaptureFailed { .. }));
        assert_eq!(seq.phase(), ShootPhase::Capture);
        assert_eq!(session.shots_left(), 1);
        assert!(session.images().is_empty());

        // Retry after the short re-arm succeeds and completes the sequence
        now += SEC;
        let result = seq
            .advance(now, &mut session, &mut camera, &naming())
            .unwrap();
        assert!(matches!(result, Advance::ShotTaken { complete: true, .. }));
        assert!(seq.is_finished());

        // Finished sequencer ignores further advances
        let result = seq
            .advance(now + Duration::from_secs(10), &mut session, &mut camera, &naming())
            .unwrap();
        assert_eq!(result, Advance::Waiting);
        assert_eq!(camera.stills.len(), 1);
    }

    #[test]
    fn test_reset_returns_to_get_ready() {
        let t0 = Instant::now();
        let mut seq = ShootSequencer::new(timing(), t0);
        let mut session = Session::new(3);
        let mut camera = FakeCamera::default();
        seq.advance(t0 + Duration::from_secs(5), &mut session, &mut camera, &naming())
            .unwrap();

        let t1 = t0 + Duration::from_secs(30);
        seq.reset(t1);
        assert_eq!(seq.phase(), ShootPhase::GetReady);
        assert_eq!(seq.timer(), ShootTimer::new(t1, Duration::from_secs(5)));
    }
}
