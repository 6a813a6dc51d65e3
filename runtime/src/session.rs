use image::DynamicImage;
use link::{open_serial, CommandTable, Link, LineLink};
use sensor::{FfmpegCamera, FrameSource};
use std::{future::Future, io, path::PathBuf, time::Duration};
use tokio::time;
use tracing::{debug, info, warn};
use vision::{classify, EngineError, FaceDatabase, FaceEngine, FrameObservation, MatchPolicy, RecognitionOutcome, SeetaEngine};

use crate::{
    config::RunArgs,
    digest::log_reference_digests,
    encoder::{encode, Command},
    error::StartupError,
    overlay,
};

/// Read timeout for the serial port. The host only writes.
const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

/// What happened to the command of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed,
    NotSent,
}

/// Result of processing one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: FrameObservation,
    pub outcome: RecognitionOutcome,
    pub command: Command,
    pub delivery: Delivery,
}

/// Why the loop ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal fired.
    #[default]
    Quit,
    /// The frame source failed or ran dry.
    CaptureEnded,
    /// `max_frames` were processed.
    FrameLimit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub commands_sent: u64,
    pub send_failures: u64,
    pub skipped_frames: u64,
    pub stop: StopReason,
}

/// Everything the loop holds: engine, known faces, camera and link.
///
/// Dropping the session releases the camera and closes the port on every
/// exit path.
pub struct Session {
    engine: Box<dyn FaceEngine>,
    database: FaceDatabase,
    camera: Box<dyn FrameSource>,
    link: Box<dyn Link>,
    table: CommandTable,
    policy: MatchPolicy,
    interval: Duration,
    overlay: Option<PathBuf>,
    max_frames: Option<u64>,
}

impl Session {
    pub fn new(
        engine: Box<dyn FaceEngine>,
        database: FaceDatabase,
        camera: Box<dyn FrameSource>,
        link: Box<dyn Link>,
    ) -> Self {
        Self {
            engine,
            database,
            camera,
            link,
            table: CommandTable::default(),
            policy: MatchPolicy::default(),
            interval: Duration::from_secs(1),
            overlay: None,
            max_frames: None,
        }
    }

    /// Acquire the link, the known faces and the camera, in that order.
    ///
    /// Anything acquired before a failure is released on return.
    pub fn open(args: &RunArgs) -> Result<Self, StartupError> {
        let table = args.command_table()?;
        let interval = args.interval()?;

        let link: Box<dyn Link> = if args.dry_run {
            Box::new(LineLink::new(io::stdout(), "stdout"))
        } else {
            let port = args
                .port
                .as_deref()
                .ok_or_else(|| StartupError::Config("no serial port given".into()))?;
            Box::new(LineLink::new(open_serial(port, args.baud, SERIAL_TIMEOUT)?, port))
        };

        let engine = SeetaEngine::from_file(&args.model)?.with_tolerance(args.tolerance);
        let database = FaceDatabase::load(&args.faces, &engine)?;
        if database.is_empty() {
            warn!(dir = %args.faces.display(), "no reference faces, every face will be unknown");
        }
        log_reference_digests(&args.faces);

        let camera: Box<dyn FrameSource> = match args.still_frames()? {
            Some(frames) => Box::new(frames),
            None => Box::new(FfmpegCamera::spawn(&args.camera_settings())?),
        };
        info!(camera = %camera.description(), link = %link.description(), "session open");

        Ok(Self::new(Box::new(engine), database, camera, link)
            .with_table(table)
            .with_policy(args.policy.into())
            .with_interval(interval)
            .with_overlay(args.overlay.clone())
            .with_frame_limit(args.max_frames))
    }

    pub fn with_table(mut self, table: CommandTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_overlay(mut self, path: Option<PathBuf>) -> Self {
        self.overlay = path;
        self
    }

    pub fn with_frame_limit(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn database(&self) -> &FaceDatabase {
        &self.database
    }

    /// Detect, classify, encode and send for a single frame.
    ///
    /// A failed send is logged and reported in the step; the next frame
    /// tries again.
    pub fn step(&mut self, frame: &DynamicImage) -> Result<Step, EngineError> {
        let observation = FrameObservation::new(self.engine.detect(frame)?);
        let outcome = classify(&*self.engine, &self.database, &observation, self.policy);
        let command = encode(&self.table, &outcome);

        let delivery = match &command {
            Command::Send(token) => {
                match &outcome {
                    RecognitionOutcome::Known(label) => info!(%label, %token, "recognised face, sending command"),
                    _ => info!(%token, faces = observation.detections.len(), "unknown face, sending command"),
                }
                match self.link.send(token) {
                    Ok(()) => Delivery::Sent,
                    Err(e) => {
                        warn!(error = %e, %token, "failed to send command");
                        Delivery::Failed
                    }
                }
            }
            Command::Unmapped(label) => {
                debug!(%label, "no command for this person");
                Delivery::NotSent
            }
            Command::Silent => Delivery::NotSent,
        };

        if let Some(path) = &self.overlay {
            if let Err(e) = overlay::save(frame, &observation, path) {
                warn!(path = %path.display(), error = %e, "cannot write overlay");
            }
        }

        Ok(Step {
            observation,
            outcome,
            command,
            delivery,
        })
    }

    /// Capture and process frames until `shutdown` completes, the camera
    /// fails or the frame limit is reached. Shutdown wins over a ready frame.
    pub async fn run<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        summary.stop = loop {
            if self.limit_reached(summary.frames) {
                break StopReason::FrameLimit;
            }
            let frame = tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Quit,
                frame = self.camera.next_frame() => frame,
            };
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "capture stopped");
                    break StopReason::CaptureEnded;
                }
            };

            summary.frames += 1;
            match self.step(&frame) {
                Ok(step) => match step.delivery {
                    Delivery::Sent => summary.commands_sent += 1,
                    Delivery::Failed => summary.send_failures += 1,
                    Delivery::NotSent => {}
                },
                Err(e) => {
                    warn!(error = %e, "face engine failed, skipping frame");
                    summary.skipped_frames += 1;
                }
            }

            if self.limit_reached(summary.frames) {
                break StopReason::FrameLimit;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Quit,
                _ = time::sleep(self.interval) => {}
            }
        };

        info!(?summary, "recognition loop finished");
        summary
    }

    fn limit_reached(&self, frames: u64) -> bool {
        self.max_frames.is_some_and(|limit| frames >= limit)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(camera = %self.camera.description(), link = %self.link.description(), "releasing session");
    }
}
