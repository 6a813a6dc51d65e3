//! Remote display for the face link.
//!
//! Reads newline-terminated command tokens from a serial line and switches a
//! 5x5 picture: a digit for each known person, a skull for strangers and a
//! question mark for anything it does not understand.

pub mod dispatcher;
pub mod screen;
pub mod state;

pub use dispatcher::{parse_idle_after, Dispatcher};
pub use screen::{Screen, TerminalScreen};
pub use state::DisplayState;
