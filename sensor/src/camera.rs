use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use std::process::Stdio;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, ChildStdout, Command},
};
use tracing::info;

use crate::{CaptureError, FrameSource};

/// Where and how `ffmpeg` grabs the webcam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraSettings {
    /// Device name as ffmpeg expects it, e.g. `/dev/video0` or `0`.
    pub device: String,
    /// ffmpeg input format: `v4l2`, `avfoundation` or `dshow`.
    pub input_format: String,
    pub width: u32,
    pub height: u32,
    pub framerate: Option<u32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".into(),
            input_format: "v4l2".into(),
            width: 640,
            height: 480,
            framerate: None,
        }
    }
}

/// Decodes packed `rgb24` frames of a fixed size from a byte stream.
pub struct RawFrames<R> {
    reader: R,
    width: u32,
    height: u32,
}

impl<R> RawFrames<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        Self { reader, width, height }
    }

    pub fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub async fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        let mut buffer = vec![0u8; self.frame_size()];
        match self.reader.read_exact(&mut buffer).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(CaptureError::Ended)
            }
            Err(e) => return Err(e.into()),
        }
        let len = buffer.len();
        RgbImage::from_raw(self.width, self.height, buffer)
            .map(DynamicImage::ImageRgb8)
            .ok_or(CaptureError::Shape {
                len,
                width: self.width,
                height: self.height,
            })
    }
}

#[async_trait]
impl<R> FrameSource for RawFrames<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        self.read_frame().await
    }

    fn description(&self) -> String {
        format!("Raw rgb24 stream {}x{}", self.width, self.height)
    }
}

/// Webcam capture through an `ffmpeg` child process.
///
/// The child is killed when the camera is dropped.
pub struct FfmpegCamera {
    device: String,
    frames: RawFrames<ChildStdout>,
    _child: Child,
}

impl FfmpegCamera {
    pub fn spawn(settings: &CameraSettings) -> Result<Self, CaptureError> {
        let size = format!("{}x{}", settings.width, settings.height);
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-loglevel", "error", "-hide_banner", "-fflags", "nobuffer"])
            .args(["-f", settings.input_format.as_str()])
            .args(["-video_size", size.as_str()]);
        if let Some(fps) = settings.framerate {
            let fps = fps.to_string();
            cmd.args(["-framerate", fps.as_str()]);
        }
        cmd.args(["-i", settings.device.as_str()])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;
        let stdout = child.stdout.take().ok_or(CaptureError::Ended)?;
        info!(device = %settings.device, format = %settings.input_format, "camera started");
        Ok(Self {
            device: settings.device.clone(),
            frames: RawFrames::new(stdout, settings.width, settings.height),
            _child: child,
        })
    }
}

#[async_trait]
impl FrameSource for FfmpegCamera {
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        self.frames.read_frame().await
    }

    fn description(&self) -> String {
        format!("Webcam: {}", self.device)
    }
}
