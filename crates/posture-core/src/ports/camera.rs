//! Camera port for acquiring frames.

use crate::domain::Frame;
use crate::error::CameraError;

/// Port for a video device that is opened and closed around each capture.
pub trait Camera: Send {
    /// Acquires the device handle.
    ///
    /// # Errors
    ///
    /// - [`CameraError::AlreadyOpen`] if the device is already open
    /// - [`CameraError::CouldNotOpenDevice`] if the device is missing or busy
    fn open(&mut self) -> Result<(), CameraError>;

    /// Reads one frame from the open device.
    ///
    /// # Errors
    ///
    /// - [`CameraError::NotOpen`] if `open` has not succeeded
    /// - [`CameraError::FrameRead`] if no frame could be read
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Releases the device handle. Does nothing if the device is not open.
    fn close(&mut self);

    /// Returns `true` while a device handle is held.
    fn is_open(&self) -> bool;
}
