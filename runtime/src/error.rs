use link::LinkError;
use sensor::CaptureError;
use thiserror::Error;
use vision::{EngineError, LoadError};

/// Anything that stops the host before the loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] LinkError),
    #[error(transparent)]
    Database(#[from] LoadError),
    #[error("cannot load face model: {0}")]
    Engine(#[from] EngineError),
    #[error("cannot start capture: {0}")]
    Camera(#[from] CaptureError),
}
