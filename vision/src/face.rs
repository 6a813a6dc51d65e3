use image::{imageops::FilterType, DynamicImage};
use rustface::{create_detector_with_model, read_model, Detector, ImageData};
use std::{fs, io::Cursor, path::Path};
use tracing::debug;

use crate::engine::{Descriptor, Detection, EngineError, FaceEngine, FaceRegion};

/// Side of the square grey patch a face is reduced to.
pub const PATCH_SIZE: u32 = 32;

/// Largest descriptor distance still considered the same person.
pub const DEFAULT_TOLERANCE: f32 = 0.6;

/// Tuning passed to the SeetaFace detector.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorSettings {
    pub min_face_size: u32,
    pub score_thresh: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: (u32, u32),
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_face_size: 40,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

/// [`FaceEngine`] backed by the `rustface` frontal face detector.
///
/// Each face crop is described by a mean-centred, unit-length 32x32 grey
/// patch; two faces match when their patches are within `tolerance`.
pub struct SeetaEngine {
    model: Vec<u8>,
    settings: DetectorSettings,
    tolerance: f32,
}

impl SeetaEngine {
    /// Load a SeetaFace model (`seeta_fd_frontal_v1.0.bin`) from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Use an in-memory model. The bytes are validated once up front.
    pub fn from_bytes(model: Vec<u8>) -> Result<Self, EngineError> {
        read_model(Cursor::new(&model)).map_err(|e| EngineError::Model(e.to_string()))?;
        Ok(Self {
            model,
            settings: DetectorSettings::default(),
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    fn detector(&self) -> Result<Box<dyn Detector>, EngineError> {
        let model =
            read_model(Cursor::new(&self.model)).map_err(|e| EngineError::Model(e.to_string()))?;
        let mut det = create_detector_with_model(model);
        det.set_min_face_size(self.settings.min_face_size);
        det.set_score_thresh(self.settings.score_thresh);
        det.set_pyramid_scale_factor(self.settings.pyramid_scale_factor);
        let (step_x, step_y) = self.settings.slide_window_step;
        det.set_slide_window_step(step_x, step_y);
        Ok(det)
    }
}

impl FaceEngine for SeetaEngine {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, EngineError> {
        let mut det = self.detector()?;
        let gray = image.to_luma8();
        let (w, h) = gray.dimensions();
        let mut data = ImageData::new(&gray, w, h);
        let faces = det.detect(&mut data);
        debug!(faces = faces.len(), "seeta detection finished");

        let detections = faces
            .iter()
            .filter_map(|f| {
                let bbox = f.bbox();
                clamp_region(bbox.x(), bbox.y(), bbox.width(), bbox.height(), w, h)
            })
            .map(|region| Detection {
                descriptor: describe(image, region),
                region,
            })
            .collect();
        Ok(detections)
    }

    fn matches(&self, known: &Descriptor, candidate: &Descriptor) -> bool {
        known.distance(candidate) <= self.tolerance
    }
}

/// Reduce the face inside `region` to a fixed-length descriptor.
pub fn describe(image: &DynamicImage, region: FaceRegion) -> Descriptor {
    let patch = image
        .crop_imm(region.x, region.y, region.width, region.height)
        .to_luma8();
    let resized = image::imageops::resize(&patch, PATCH_SIZE, PATCH_SIZE, FilterType::Triangle);
    let mut values: Vec<f32> = resized.into_raw().into_iter().map(|b| b as f32 / 255.0).collect();

    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter_mut().for_each(|v| *v -= mean);
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        values.iter_mut().for_each(|v| *v /= norm);
    }
    Descriptor::new(values)
}

// Detector boxes may poke outside the frame.
fn clamp_region(x: i32, y: i32, width: u32, height: u32, frame_w: u32, frame_h: u32) -> Option<FaceRegion> {
    let left = x.max(0) as i64;
    let top = y.max(0) as i64;
    let right = (x as i64 + width as i64).min(frame_w as i64);
    let bottom = (y as i64 + height as i64).min(frame_h as i64);
    if right <= left || bottom <= top {
        return None;
    }
    Some(FaceRegion::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}
