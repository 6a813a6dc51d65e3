use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid frame pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no frames match {0}")]
    NoFrames(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    #[error("frame of {len} bytes does not fit {width}x{height}")]
    Shape { len: usize, width: u32, height: u32 },
    #[error("capture stream ended")]
    Ended,
}

/// Anything that can hand out camera frames, one at a time.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame. An error means the source is done.
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError>;
    /// Human-readable description of where frames come from.
    fn description(&self) -> String;
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        (**self).next_frame().await
    }

    fn description(&self) -> String {
        (**self).description()
    }
}
