//! Frame sources for the capture host.
//!
//! A [`FrameSource`] hands out one decoded frame per call, either from a
//! webcam driven through `ffmpeg` or from still images on disk.

pub mod camera;
pub mod eye;
pub mod source;

pub use camera::{CameraSettings, FfmpegCamera, RawFrames};
pub use eye::StillFrames;
pub use source::{CaptureError, FrameSource};
