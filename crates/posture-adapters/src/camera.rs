//! Filesystem camera adapter.

use std::path::{Path, PathBuf};

use posture_core::{Camera, CameraError, Frame};
use tracing::{debug, warn};

/// Supported frame extensions.
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// A camera whose "device" is a directory of still frames.
///
/// Opening scans the directory; each capture returns the next frame in file
/// name order, wrapping around at the end. The position survives
/// close/open, so a monitor that reopens the camera every cycle walks
/// through the whole directory.
pub struct DirectoryCamera {
    dir: PathBuf,
    frames: Option<Vec<PathBuf>>,
    cursor: usize,
}

impl DirectoryCamera {
    /// Creates a closed camera for `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: None,
            cursor: 0,
        }
    }

    /// The directory backing this camera.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn could_not_open(&self) -> CameraError {
        CameraError::CouldNotOpenDevice {
            device: self.dir.display().to_string(),
        }
    }
}

impl Camera for DirectoryCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.frames.is_some() {
            return Err(CameraError::AlreadyOpen);
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            warn!("Failed to read camera directory {}: {e}", self.dir.display());
            self.could_not_open()
        })?;

        let mut frames: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_supported_frame(path))
            .collect();

        if frames.is_empty() {
            return Err(self.could_not_open());
        }

        frames.sort();
        debug!("Opened {} with {} frame(s)", self.dir.display(), frames.len());
        self.frames = Some(frames);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let frames = self.frames.as_ref().ok_or(CameraError::NotOpen)?;
        let path = &frames[self.cursor % frames.len()];
        self.cursor = self.cursor.wrapping_add(1);

        let image = image::open(path).map_err(|e| CameraError::FrameRead {
            reason: format!("{}: {e}", path.display()),
        })?;

        Ok(Frame::new(image))
    }

    fn close(&mut self) {
        if self.frames.take().is_some() {
            debug!("Closed {}", self.dir.display());
        }
    }

    fn is_open(&self) -> bool {
        self.frames.is_some()
    }
}

/// Checks if a path has a supported frame extension.
fn is_supported_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.as_str()))
}
