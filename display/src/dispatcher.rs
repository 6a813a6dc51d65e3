use link::{Line, LineReceiver, LinkError, MAX_LINE};
use std::{
    io::Read,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{DisplayState, Screen};

/// Maps incoming tokens to pictures.
///
/// Stays on the last picture until the next token, unless an idle timeout
/// is configured.
pub struct Dispatcher<S> {
    screen: S,
    state: DisplayState,
    idle_after: Option<Duration>,
    last_token: Instant,
}

impl<S: Screen> Dispatcher<S> {
    /// Start in [`DisplayState::Idle`] and show it.
    pub fn new(mut screen: S) -> Self {
        screen.show(DisplayState::Idle);
        Self {
            screen,
            state: DisplayState::Idle,
            idle_after: None,
            last_token: Instant::now(),
        }
    }

    /// Go back to the sleeping face after `after` without a token.
    pub fn with_idle_timeout(mut self, after: Duration) -> Self {
        self.idle_after = Some(after);
        self
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn into_screen(self) -> S {
        self.screen
    }

    pub fn handle(&mut self, token: &str) -> DisplayState {
        self.handle_at(token, Instant::now())
    }

    pub fn handle_at(&mut self, token: &str, now: Instant) -> DisplayState {
        let next = DisplayState::for_token(token);
        if next == DisplayState::ShowingUnknownGlyph {
            debug!(%token, "unrecognised command");
        }
        self.last_token = now;
        self.enter(next);
        next
    }

    /// Like [`Dispatcher::handle`], but an overlong line shows the unknown
    /// glyph whatever it started with.
    pub fn handle_line(&mut self, line: &Line) -> DisplayState {
        match line {
            Line::Text(token) => self.handle(token),
            Line::Overlong => {
                debug!(max = MAX_LINE, "overlong command discarded");
                self.last_token = Instant::now();
                self.enter(DisplayState::ShowingUnknownGlyph);
                self.state
            }
        }
    }

    /// Apply the idle timeout, if any, as of `now`.
    pub fn tick(&mut self, now: Instant) -> DisplayState {
        if let Some(after) = self.idle_after {
            if self.state != DisplayState::Idle && now.saturating_duration_since(self.last_token) >= after {
                info!("no command for a while, going idle");
                self.enter(DisplayState::Idle);
            }
        }
        self.state
    }

    /// Poll `rx` every `poll` until its input ends; returns the final state.
    ///
    /// Read errors other than end of input are logged and polling goes on.
    /// The idle timeout is only checked between polls, so a reader that
    /// blocks until the next line delays it.
    pub fn run<R: Read>(&mut self, rx: &mut LineReceiver<R>, poll: Duration) -> DisplayState {
        loop {
            match rx.poll() {
                Ok(Some(line)) => {
                    self.handle_line(&line);
                }
                Ok(None) => {}
                Err(LinkError::Closed) => return self.state,
                Err(e) => warn!(error = %e, "serial read failed"),
            }
            self.tick(Instant::now());
            thread::sleep(poll);
        }
    }

    fn enter(&mut self, next: DisplayState) {
        debug!(from = ?self.state, to = ?next, "display transition");
        self.state = next;
        self.screen.show(next);
    }
}

/// Parse `--idle-after` seconds. Must be a positive, representable duration.
pub fn parse_idle_after(s: &str) -> Result<Duration, String> {
    let secs: f32 = s.trim().parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    match Duration::try_from_secs_f32(secs) {
        Ok(after) if !after.is_zero() => Ok(after),
        _ => Err(format!("idle timeout must be a positive number of seconds, got {s}")),
    }
}
