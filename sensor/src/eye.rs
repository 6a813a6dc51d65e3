use async_trait::async_trait;
use glob::glob;
use image::DynamicImage;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::{CaptureError, FrameSource};

/// Reads image files from disk as simulated webcam frames.
pub struct StillFrames {
    pattern: String,
    paths: Vec<PathBuf>,
    index: usize,
    repeat: bool,
}

impl StillFrames {
    /// Create a source that cycles files matching `pattern`, in name order.
    pub fn new(pattern: &str) -> Result<Self, CaptureError> {
        let mut paths: Vec<PathBuf> = glob(pattern)?.filter_map(Result::ok).collect();
        if paths.is_empty() {
            return Err(CaptureError::NoFrames(pattern.to_string()));
        }
        paths.sort();
        Ok(Self {
            pattern: pattern.to_string(),
            paths,
            index: 0,
            repeat: true,
        })
    }

    /// Stop after the last file instead of starting over.
    pub fn once(mut self) -> Self {
        self.repeat = false;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[async_trait]
impl FrameSource for StillFrames {
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        if self.index >= self.paths.len() {
            if !self.repeat {
                return Err(CaptureError::Ended);
            }
            self.index = 0;
        }
        let path = &self.paths[self.index];
        self.index += 1;
        debug!(path = %path.display(), "reading still frame");
        let bytes = fs::read(path).await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    fn description(&self) -> String {
        format!("Still frames: {}", self.pattern)
    }
}
