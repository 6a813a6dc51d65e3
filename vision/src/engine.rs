use image::DynamicImage;
use thiserror::Error;

/// Axis-aligned face box in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Fixed-length vector describing one face.
///
/// The numbers are only meaningful to the engine that produced them; callers
/// compare descriptors and never interpret them.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance. Descriptors of different length are never close.
    pub fn distance(&self, other: &Descriptor) -> f32 {
        if self.0.len() != other.0.len() {
            return f32::INFINITY;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// One face found in an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub region: FaceRegion,
    pub descriptor: Descriptor,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("model error: {0}")]
    Model(String),
}

/// External face recognition capability.
///
/// Accuracy and thresholds are the engine's business; the rest of the system
/// only asks where the faces are and whether two of them are the same person.
pub trait FaceEngine: Send + Sync {
    /// Locate every face in `image` and describe it, in detection order.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, EngineError>;

    /// Whether `candidate` belongs to the same person as `known`.
    fn matches(&self, known: &Descriptor, candidate: &Descriptor) -> bool;
}

impl<E: FaceEngine + ?Sized> FaceEngine for Box<E> {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, EngineError> {
        (**self).detect(image)
    }

    fn matches(&self, known: &Descriptor, candidate: &Descriptor) -> bool {
        (**self).matches(known, candidate)
    }
}
