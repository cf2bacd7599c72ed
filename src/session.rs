//! Per-session counters, captured images, and storage naming.

use std::path::PathBuf;

/// Counters and captures for the guest currently using the booth.
///
/// While shooting, `images().len() + shots_left() == shot_count()` holds
/// after every operation.
#[derive(Debug, Clone)]
pub struct Session {
    shot_count: u32,
    shots_left: u32,
    shot_counter: u32,
    session_id: u32,
    images: Vec<PathBuf>,
}

impl Session {
    /// Create the first session of a run.
    pub fn new(shot_count: u32) -> Self {
        Self {
            shot_count,
            shots_left: shot_count,
            shot_counter: 0,
            session_id: 1,
            images: Vec::with_capacity(shot_count as usize),
        }
    }

    /// Reset the shot quota and drop the previous guest's image handles.
    ///
    /// Files already written stay on disk.
    pub fn begin_shooting(&mut self) {
        self.shots_left = self.shot_count;
        self.images.clear();
    }

    /// Record a successful capture.
    pub fn record_capture(&mut self, path: PathBuf) {
        debug_assert!(self.shots_left > 0, "capture recorded past the shot quota");
        self.images.push(path);
        self.shots_left = self.shots_left.saturating_sub(1);
        self.shot_counter += 1;
    }

    /// Advance to the next session id. Called when leaving the thanks screen.
    pub fn finish(&mut self) {
        self.session_id += 1;
        self.shot_counter = 0;
    }

    pub fn shot_count(&self) -> u32 {
        self.shot_count
    }

    pub fn shots_left(&self) -> u32 {
        self.shots_left
    }

    pub fn shot_counter(&self) -> u32 {
        self.shot_counter
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_complete(&self) -> bool {
        self.shots_left == 0
    }
}

/// Deterministic file names for captures and strips.
///
/// Captures: `<store>/<prefix><run>-<session:04><shot:02>.jpg`
/// Strips: `<store>/<prefix><run>-<session:04>-<suffix>.jpg`
#[derive(Debug, Clone)]
pub struct FileNaming {
    store_dir: PathBuf,
    prefix: String,
    strip_suffix: String,
    run_id: u32,
}

impl FileNaming {
    pub fn new(
        store_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        strip_suffix: impl Into<String>,
        run_id: u32,
    ) -> Self {
        Self {
            store_dir: store_dir.into(),
            prefix: prefix.into(),
            strip_suffix: strip_suffix.into(),
            run_id,
        }
    }

    pub fn capture_path(&self, session_id: u32, shot: u32) -> PathBuf {
        self.store_dir.join(format!(
            "{}{}-{:04}{:02}.jpg",
            self.prefix, self.run_id, session_id, shot
        ))
    }

    pub fn strip_path(&self, session_id: u32) -> PathBuf {
        self.store_dir.join(format!(
            "{}{}-{:04}-{}.jpg",
            self.prefix, self.run_id, session_id, self.strip_suffix
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new(3);
        assert_eq!(session.session_id(), 1);
        assert_eq!(session.shots_left(), 3);
        assert_eq!(session.shot_counter(), 0);
        assert!(session.images().is_empty());
    }

    #[test]
    fn test_capture_invariant_holds() {
        let mut session = Session::new(3);
        session.begin_shooting();
        for i in 0..3 {
            assert_eq!(session.images().len() as u32 + session.shots_left(), 3);
            session.record_capture(PathBuf::from(format!("shot{}.jpg", i)));
            assert_eq!(session.images().len() as u32 + session.shots_left(), 3);
        }
        assert!(session.is_complete());
        assert_eq!(session.shot_counter(), 3);
    }

    #[test]
    fn test_finish_advances_id_and_resets_counter() {
        let mut session = Session::new(2);
        session.begin_shooting();
        session.record_capture(PathBuf::from("a.jpg"));
        session.record_capture(PathBuf::from("b.jpg"));
        session.finish();
        assert_eq!(session.session_id(), 2);
        assert_eq!(session.shot_counter(), 0);

        // Images are only cleared when the next shoot begins
        assert_eq!(session.images().len(), 2);
        session.begin_shooting();
        assert!(session.images().is_empty());
        assert_eq!(session.shots_left(), 2);
    }

    #[test]
    fn test_capture_path_format() {
        let naming = FileNaming::new("images", "Booth", "Strip", 4242);
        assert_eq!(
            naming.capture_path(7, 2),
            PathBuf::from("images/Booth4242-000702.jpg")
        );
    }

    #[test]
    fn test_strip_path_format() {
        let naming = FileNaming::new("images", "Booth", "Strip", 4242);
        assert_eq!(
            naming.strip_path(12),
            PathBuf::from("images/Booth4242-0012-Strip.jpg")
        );
    }
}
