use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use link::{CommandTable, CommandToken, LineLink, Link, LinkError};
use runtime::{
    encoder::Command,
    session::{Delivery, Session, StopReason},
};
use sensor::{CaptureError, FrameSource};
use std::{
    collections::VecDeque,
    io::{self, Write},
    sync::{Arc, Mutex},
    time::Duration,
};
use vision::{
    Descriptor, Detection, EngineError, FaceDatabase, FaceEngine, FaceRegion, MatchPolicy,
    RecognitionOutcome, ReferenceFace,
};

/// Returns one scripted detection list per call; `None` is an engine failure.
struct ScriptedEngine {
    script: Mutex<VecDeque<Option<Vec<Detection>>>>,
}

impl ScriptedEngine {
    fn new(script: Vec<Option<Vec<Detection>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl FaceEngine for ScriptedEngine {
    fn detect(&self, _: &DynamicImage) -> Result<Vec<Detection>, EngineError> {
        match self.script.lock().unwrap().pop_front() {
            Some(Some(faces)) => Ok(faces),
            Some(None) => Err(EngineError::Model("scripted failure".into())),
            None => Ok(Vec::new()),
        }
    }

    fn matches(&self, known: &Descriptor, candidate: &Descriptor) -> bool {
        known.distance(candidate) < 0.5
    }
}

struct BlankFrames {
    remaining: usize,
}

#[async_trait]
impl FrameSource for BlankFrames {
    async fn next_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        if self.remaining == 0 {
            return Err(CaptureError::Ended);
        }
        self.remaining -= 1;
        Ok(DynamicImage::ImageRgb8(RgbImage::new(32, 24)))
    }

    fn description(&self) -> String {
        "blank".into()
    }
}

#[derive(Clone, Default)]
struct Wire(Arc<Mutex<Vec<u8>>>);

impl Wire {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Wire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct UnpluggedLink;

impl Link for UnpluggedLink {
    fn send(&mut self, _: &CommandToken) -> Result<(), LinkError> {
        Err(LinkError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")))
    }

    fn description(&self) -> String {
        "unplugged".into()
    }
}

fn face(value: f32) -> Detection {
    Detection {
        region: FaceRegion::new(2, 2, 10, 10),
        descriptor: Descriptor::new(vec![value]),
    }
}

fn database() -> FaceDatabase {
    FaceDatabase::new(vec![
        ReferenceFace::new("li_si", Descriptor::new(vec![2.0])),
        ReferenceFace::new("wang_wu", Descriptor::new(vec![3.0])),
        ReferenceFace::new("zhang_san", Descriptor::new(vec![1.0])),
    ])
}

fn session(script: Vec<Option<Vec<Detection>>>, frames: usize, wire: &Wire) -> Session {
    Session::new(
        Box::new(ScriptedEngine::new(script)),
        database(),
        Box::new(BlankFrames { remaining: frames }),
        Box::new(LineLink::new(wire.clone(), "wire")),
    )
    .with_interval(Duration::ZERO)
}

fn frame() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(32, 24))
}

#[test]
fn empty_frame_sends_nothing() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![])], 0, &wire);
    let step = session.step(&frame()).unwrap();
    assert_eq!(step.outcome, RecognitionOutcome::NoneDetected);
    assert_eq!(step.command, Command::Silent);
    assert_eq!(step.delivery, Delivery::NotSent);
    assert_eq!(wire.text(), "");
}

#[test]
fn known_face_sends_its_token_once() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(1.1)])], 0, &wire);
    let step = session.step(&frame()).unwrap();
    assert_eq!(step.outcome, RecognitionOutcome::Known("zhang_san".into()));
    assert_eq!(step.delivery, Delivery::Sent);
    assert_eq!(wire.text(), "FACE1\n");
}

#[test]
fn stranger_sends_unknown() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(9.0)])], 0, &wire);
    session.step(&frame()).unwrap();
    assert_eq!(wire.text(), "UNKNOWN\n");
}

#[test]
fn known_person_without_command_stays_silent() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(3.0)])], 0, &wire);
    let step = session.step(&frame()).unwrap();
    assert_eq!(step.command, Command::Unmapped("wang_wu".into()));
    assert_eq!(wire.text(), "");
}

#[test]
fn custom_table_is_used() {
    let wire = Wire::default();
    let table = CommandTable::new(CommandToken::unknown()).with("wang_wu", CommandToken::face2());
    let mut session = session(vec![Some(vec![face(3.0)]), Some(vec![face(1.0)])], 0, &wire).with_table(table);
    session.step(&frame()).unwrap();
    session.step(&frame()).unwrap();
    assert_eq!(wire.text(), "FACE2\n");
}

#[test]
fn policy_decides_stranger_in_front() {
    let faces = || Some(vec![face(9.0), face(2.0)]);

    let wire = Wire::default();
    let mut session = session(vec![faces()], 0, &wire);
    session.step(&frame()).unwrap();
    assert_eq!(wire.text(), "FACE2\n");

    let wire = Wire::default();
    let mut session = self::session(vec![faces()], 0, &wire).with_policy(MatchPolicy::FirstDetectedFace);
    session.step(&frame()).unwrap();
    assert_eq!(wire.text(), "UNKNOWN\n");
}

#[test]
fn overlay_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latest.png");
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(1.0)])], 0, &wire).with_overlay(Some(path.clone()));
    session.step(&frame()).unwrap();
    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (32, 24));
    assert_eq!(saved.get_pixel(2, 2).0, [255, 0, 0]);
    assert_eq!(saved.get_pixel(20, 20).0, [0, 0, 0]);
}

#[tokio::test]
async fn loop_ends_when_capture_ends() {
    let wire = Wire::default();
    let script = vec![Some(vec![face(1.0)]), Some(vec![]), Some(vec![face(9.0)])];
    let mut session = session(script, 3, &wire);
    let summary = session.run(std::future::pending()).await;
    assert_eq!(summary.stop, StopReason::CaptureEnded);
    assert_eq!(summary.frames, 3);
    assert_eq!(summary.commands_sent, 2);
    assert_eq!(wire.text(), "FACE1\nUNKNOWN\n");
}

#[tokio::test]
async fn send_failures_do_not_stop_the_loop() {
    let mut session = Session::new(
        Box::new(ScriptedEngine::new(vec![Some(vec![face(1.0)]); 3])),
        database(),
        Box::new(BlankFrames { remaining: 3 }),
        Box::new(UnpluggedLink),
    )
    .with_interval(Duration::ZERO);
    let summary = session.run(std::future::pending()).await;
    assert_eq!(summary.frames, 3);
    assert_eq!(summary.send_failures, 3);
    assert_eq!(summary.commands_sent, 0);
    assert_eq!(summary.stop, StopReason::CaptureEnded);
}

#[tokio::test]
async fn engine_failure_skips_the_frame() {
    let wire = Wire::default();
    let mut session = session(vec![None, Some(vec![face(2.0)])], 2, &wire);
    let summary = session.run(std::future::pending()).await;
    assert_eq!(summary.skipped_frames, 1);
    assert_eq!(summary.commands_sent, 1);
    assert_eq!(wire.text(), "FACE2\n");
}

#[tokio::test]
async fn frame_limit_stops_the_loop() {
    let wire = Wire::default();
    let mut session = session(vec![], 10, &wire).with_frame_limit(Some(4));
    let summary = session.run(std::future::pending()).await;
    assert_eq!(summary.stop, StopReason::FrameLimit);
    assert_eq!(summary.frames, 4);
}

#[tokio::test]
async fn zero_frame_limit_captures_nothing() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(1.0)])], 10, &wire).with_frame_limit(Some(0));
    let summary = session.run(std::future::pending()).await;
    assert_eq!(summary.stop, StopReason::FrameLimit);
    assert_eq!(summary.frames, 0);
    assert_eq!(wire.text(), "");
}

#[tokio::test]
async fn shutdown_stops_before_the_first_frame() {
    let wire = Wire::default();
    let mut session = session(vec![Some(vec![face(1.0)])], 10, &wire);
    let summary = session.run(async {}).await;
    assert_eq!(summary.stop, StopReason::Quit);
    assert_eq!(wire.text(), "");
}
