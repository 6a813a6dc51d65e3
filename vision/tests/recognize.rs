use image::DynamicImage;
use vision::{
    classify, first_match, Descriptor, Detection, EngineError, FaceDatabase, FaceEngine,
    FaceRegion, FrameObservation, MatchPolicy, RecognitionOutcome, ReferenceFace,
};

struct NearEngine;

impl FaceEngine for NearEngine {
    fn detect(&self, _: &DynamicImage) -> Result<Vec<Detection>, EngineError> {
        Ok(Vec::new())
    }

    fn matches(&self, known: &Descriptor, candidate: &Descriptor) -> bool {
        known.distance(candidate) < 0.5
    }
}

fn face(value: f32) -> Detection {
    Detection {
        region: FaceRegion::new(0, 0, 10, 10),
        descriptor: Descriptor::new(vec![value]),
    }
}

fn database() -> FaceDatabase {
    FaceDatabase::new(vec![
        ReferenceFace::new("zhang_san", Descriptor::new(vec![1.0])),
        ReferenceFace::new("li_si", Descriptor::new(vec![2.0])),
    ])
}

#[test]
fn empty_frame_is_none_detected() {
    let outcome = classify(&NearEngine, &database(), &FrameObservation::default(), MatchPolicy::default());
    assert_eq!(outcome, RecognitionOutcome::NoneDetected);
}

#[test]
fn single_known_face() {
    let frame = FrameObservation::new(vec![face(2.1)]);
    let outcome = classify(&NearEngine, &database(), &frame, MatchPolicy::default());
    assert_eq!(outcome, RecognitionOutcome::Known("li_si".into()));
}

#[test]
fn stranger_is_unknown() {
    let frame = FrameObservation::new(vec![face(9.0)]);
    let outcome = classify(&NearEngine, &database(), &frame, MatchPolicy::default());
    assert_eq!(outcome, RecognitionOutcome::Unknown);
}

#[test]
fn empty_database_sees_only_strangers() {
    let frame = FrameObservation::new(vec![face(1.0)]);
    let outcome = classify(&NearEngine, &FaceDatabase::default(), &frame, MatchPolicy::default());
    assert_eq!(outcome, RecognitionOutcome::Unknown);
}

// Stranger detected first, known person second.

#[test]
fn first_detected_face_policy_reports_stranger() {
    let frame = FrameObservation::new(vec![face(9.0), face(1.0)]);
    let outcome = classify(&NearEngine, &database(), &frame, MatchPolicy::FirstDetectedFace);
    assert_eq!(outcome, RecognitionOutcome::Unknown);
}

#[test]
fn first_matching_face_policy_skips_stranger() {
    let frame = FrameObservation::new(vec![face(9.0), face(1.0)]);
    let outcome = classify(&NearEngine, &database(), &frame, MatchPolicy::FirstMatchingFace);
    assert_eq!(outcome, RecognitionOutcome::Known("zhang_san".into()));
}

#[test]
fn earlier_face_wins_over_later_face() {
    let frame = FrameObservation::new(vec![face(2.0), face(1.0)]);
    let db = database();
    let (detection, reference) =
        first_match(&NearEngine, &db, &frame, MatchPolicy::FirstMatchingFace).unwrap();
    assert_eq!(detection.descriptor, Descriptor::new(vec![2.0]));
    assert_eq!(reference.label, "li_si");
}

#[test]
fn earlier_reference_wins_over_closer_reference() {
    let db = FaceDatabase::new(vec![
        ReferenceFace::new("wide", Descriptor::new(vec![1.4])),
        ReferenceFace::new("exact", Descriptor::new(vec![1.0])),
    ]);
    let frame = FrameObservation::new(vec![face(1.0)]);
    let outcome = classify(&NearEngine, &db, &frame, MatchPolicy::default());
    assert_eq!(outcome, RecognitionOutcome::Known("wide".into()));
}
