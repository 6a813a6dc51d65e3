//! Face recognition for the capture host.
//!
//! Faces are located and described by a [`FaceEngine`]. Known people live in
//! a [`FaceDatabase`] built once at startup, and each frame is reduced to a
//! single [`RecognitionOutcome`].

pub mod database;
pub mod engine;
pub mod face;
pub mod recognize;

pub use database::{reference_images, FaceDatabase, LoadError, ReferenceFace};
pub use engine::{Descriptor, Detection, EngineError, FaceEngine, FaceRegion};
pub use face::{describe, DetectorSettings, SeetaEngine, DEFAULT_TOLERANCE};
pub use recognize::{classify, first_match, FrameObservation, MatchPolicy, RecognitionOutcome};
