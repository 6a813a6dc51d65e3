use crate::{
    database::{FaceDatabase, ReferenceFace},
    engine::{Detection, FaceEngine},
};

/// What one frame amounts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// A known person, by reference label.
    Known(String),
    /// Faces were found but none is known.
    Unknown,
    /// No face in the frame.
    NoneDetected,
}

/// How the faces of a single frame are scanned.
///
/// Within the scan every face is compared with the database in database order
/// and the first reference that matches wins, never the closest one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Faces are tried in detection order; the first one that matches any
    /// reference decides the frame and the rest are ignored.
    #[default]
    FirstMatchingFace,
    /// Only the first detected face is tried. A stranger in front of a known
    /// person makes the whole frame `Unknown`.
    FirstDetectedFace,
}

/// Detections of one captured frame, in detection order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameObservation {
    pub detections: Vec<Detection>,
}

impl FrameObservation {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Short-circuiting search for the face that decides the frame.
pub fn first_match<'a>(
    engine: &dyn FaceEngine,
    database: &'a FaceDatabase,
    observation: &'a FrameObservation,
    policy: MatchPolicy,
) -> Option<(&'a Detection, &'a ReferenceFace)> {
    let scanned = match policy {
        MatchPolicy::FirstMatchingFace => observation.detections.len(),
        MatchPolicy::FirstDetectedFace => 1,
    };
    observation
        .detections
        .iter()
        .take(scanned)
        .find_map(|detection| {
            database
                .first_match(engine, &detection.descriptor)
                .map(|reference| (detection, reference))
        })
}

/// Reduce a frame to a single outcome. Pure: same inputs, same answer.
pub fn classify(
    engine: &dyn FaceEngine,
    database: &FaceDatabase,
    observation: &FrameObservation,
    policy: MatchPolicy,
) -> RecognitionOutcome {
    if observation.is_empty() {
        return RecognitionOutcome::NoneDetected;
    }
    match first_match(engine, database, observation, policy) {
        Some((_, reference)) => RecognitionOutcome::Known(reference.label.clone()),
        None => RecognitionOutcome::Unknown,
    }
}
