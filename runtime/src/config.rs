use clap::{Args, Parser, Subcommand, ValueEnum};
use link::{parse_entry, CommandTable, CommandToken, BAUD_RATE};
use sensor::{CameraSettings, CaptureError, StillFrames};
use std::{path::PathBuf, time::Duration};
use vision::{MatchPolicy, DEFAULT_TOLERANCE};

use crate::error::StartupError;

#[derive(Parser, Debug)]
#[command(name = "facebit", author, version, about = "Face recognition host for a serial display")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch the camera and send a command for every frame with faces
    Run(RunArgs),
    /// Print SHA-256 digests of image files or face directories
    Hash(HashArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory of `<label>.jpg` / `<label>.png` reference images
    #[arg(long, env = "FACEBIT_FACES", default_value = "known_faces")]
    pub faces: PathBuf,
    /// SeetaFace frontal detector model
    #[arg(long, env = "FACEBIT_MODEL", default_value = "seeta_fd_frontal_v1.0.bin")]
    pub model: PathBuf,
    /// Serial port the display listens on
    #[arg(long, env = "FACEBIT_PORT", required_unless_present = "dry_run")]
    pub port: Option<String>,
    #[arg(long, env = "FACEBIT_BAUD", default_value_t = BAUD_RATE)]
    pub baud: u32,
    /// Write commands to stdout instead of a serial port
    #[arg(long)]
    pub dry_run: bool,
    /// Read frames from images matching this glob instead of the webcam
    #[arg(long, env = "FACEBIT_FRAMES")]
    pub frames: Option<String>,
    /// Stop after the last image instead of starting over
    #[arg(long, requires = "frames")]
    pub frames_once: bool,
    /// Webcam device handed to ffmpeg
    #[arg(long, env = "FACEBIT_CAMERA", default_value = "/dev/video0")]
    pub camera: String,
    /// ffmpeg input format of the webcam
    #[arg(long, default_value = "v4l2")]
    pub input_format: String,
    /// Capture size as WIDTHxHEIGHT
    #[arg(long, default_value = "640x480", value_parser = parse_size)]
    pub size: (u32, u32),
    /// Seconds to wait after each frame
    #[arg(long, value_parser = parse_seconds)]
    pub interval: Option<f32>,
    /// Largest descriptor distance that still counts as the same person
    #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_parser = parse_tolerance)]
    pub tolerance: f32,
    /// LABEL=TOKEN command for a known person, may repeat
    #[arg(long = "map", value_parser = parse_map)]
    pub map: Vec<(String, CommandToken)>,
    /// Start from an empty table instead of the built-in one
    #[arg(long)]
    pub no_default_map: bool,
    /// Token sent when faces are seen but none is known
    #[arg(long, default_value = "UNKNOWN")]
    pub unknown_token: CommandToken,
    /// Allow tokens the display has no picture for
    #[arg(long)]
    pub allow_custom_tokens: bool,
    #[arg(long, value_enum, default_value_t = Policy::FirstMatchingFace)]
    pub policy: Policy,
    /// Keep the latest frame, with boxes around detected faces, at this path
    #[arg(long)]
    pub overlay: Option<PathBuf>,
    /// Stop after this many frames
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_frames: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct HashArgs {
    /// Files, or directories of reference images
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Command-line names for [`MatchPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    FirstMatchingFace,
    FirstDetectedFace,
}

impl From<Policy> for MatchPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::FirstMatchingFace => MatchPolicy::FirstMatchingFace,
            Policy::FirstDetectedFace => MatchPolicy::FirstDetectedFace,
        }
    }
}

impl RunArgs {
    /// Label-to-token table after `--map` overrides.
    ///
    /// Tokens the display cannot show are rejected unless
    /// `--allow-custom-tokens` is given.
    pub fn command_table(&self) -> Result<CommandTable, StartupError> {
        let mut table = CommandTable::new(self.unknown_token.clone());
        if !self.no_default_map {
            for (label, token) in CommandTable::default().entries() {
                table.insert(label, token.clone());
            }
        }
        for (label, token) in &self.map {
            table.insert(label.clone(), token.clone());
        }
        if !self.allow_custom_tokens {
            let unsupported = table.unsupported();
            if !unsupported.is_empty() {
                let names: Vec<&str> = unsupported.iter().map(|t| t.as_str()).collect();
                return Err(StartupError::Config(format!(
                    "the display has no picture for {}",
                    names.join(", ")
                )));
            }
        }
        Ok(table)
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            device: self.camera.clone(),
            input_format: self.input_format.clone(),
            width: self.size.0,
            height: self.size.1,
            ..CameraSettings::default()
        }
    }

    /// Delay after each frame, from `--interval`, `FACEBIT_INTERVAL` or 1 s.
    pub fn interval(&self) -> Result<Duration, StartupError> {
        let secs = crate::tick_rate(self.interval);
        Duration::try_from_secs_f32(secs)
            .map_err(|e| StartupError::Config(format!("interval of {secs} s: {e}")))
    }

    /// The `--frames` source, if one was asked for.
    pub fn still_frames(&self) -> Result<Option<StillFrames>, CaptureError> {
        let Some(pattern) = &self.frames else {
            return Ok(None);
        };
        let frames = StillFrames::new(pattern)?;
        Ok(Some(if self.frames_once { frames.once() } else { frames }))
    }
}

fn parse_map(s: &str) -> Result<(String, CommandToken), String> {
    parse_entry(s).map_err(|e| e.to_string())
}

/// Parse a delay in seconds: zero or more, and small enough for a [`Duration`].
pub fn parse_seconds(s: &str) -> Result<f32, String> {
    let secs: f32 = s.trim().parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    Duration::try_from_secs_f32(secs)
        .map(|_| secs)
        .map_err(|_| format!("{s} is not a usable number of seconds"))
}

/// Parse a match tolerance: a finite distance, zero or more.
pub fn parse_tolerance(s: &str) -> Result<f32, String> {
    match s.trim().parse::<f32>() {
        Ok(tolerance) if tolerance.is_finite() && tolerance >= 0.0 => Ok(tolerance),
        _ => Err(format!("tolerance must be a finite distance of zero or more, got {s}")),
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| match v.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("bad dimension {v:?} in {s:?}")),
    };
    Ok((parse(w)?, parse(h)?))
}
