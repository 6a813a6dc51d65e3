use std::{fmt, str::FromStr};
use thiserror::Error;

/// Line speed used by both ends.
pub const BAUD_RATE: u32 = 9600;

/// Terminates every command on the wire.
pub const DELIMITER: u8 = b'\n';

/// Longest line the receiver keeps; extra bytes are dropped.
pub const MAX_LINE: usize = 64;

pub const FACE1: &str = "FACE1";
pub const FACE2: &str = "FACE2";
pub const UNKNOWN: &str = "UNKNOWN";

/// Every token the remote display knows how to show.
pub const VOCABULARY: &[&str] = &[FACE1, FACE2, UNKNOWN];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("command token is empty")]
    Empty,
    #[error("command token {0:?} must be printable ASCII without spaces")]
    Invalid(String),
    #[error("command token is {0} bytes, longer than {}", MAX_LINE)]
    TooLong(usize),
}

/// A command as sent over the wire, without its delimiter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandToken(String);

impl CommandToken {
    pub fn new(token: impl Into<String>) -> Result<Self, TokenError> {
        let token = token.into();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if token.len() > MAX_LINE {
            return Err(TokenError::TooLong(token.len()));
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TokenError::Invalid(token));
        }
        Ok(Self(token))
    }

    pub fn face1() -> Self {
        Self(FACE1.into())
    }

    pub fn face2() -> Self {
        Self(FACE2.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the remote display has a dedicated picture for this token.
    pub fn is_understood(&self) -> bool {
        VOCABULARY.contains(&self.0.as_str())
    }
}

impl FromStr for CommandToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CommandToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bytes written for `token`: the token itself and one newline.
pub fn encode_line(token: &CommandToken) -> Vec<u8> {
    let mut line = Vec::with_capacity(token.0.len() + 1);
    line.extend_from_slice(token.0.as_bytes());
    line.push(DELIMITER);
    line
}

/// One complete line as seen by the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// The line's text with surrounding whitespace stripped.
    Text(String),
    /// More than [`MAX_LINE`] bytes arrived before the delimiter. The
    /// content is discarded, so it can never be mistaken for a token.
    Overlong,
}

impl Line {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Overlong => None,
        }
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Reassembles newline-terminated tokens from a byte stream.
///
/// Holds at most one partial line. Completed lines have surrounding
/// whitespace stripped, so `\r\n` senders work too.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    overflowed: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a line when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        if byte == DELIMITER {
            let line = if self.overflowed {
                Line::Overlong
            } else {
                Line::Text(String::from_utf8_lossy(&self.pending).trim().to_string())
            };
            self.pending.clear();
            self.overflowed = false;
            return Some(line);
        }
        if self.pending.len() < MAX_LINE {
            self.pending.push(byte);
        } else {
            self.overflowed = true;
        }
        None
    }

    /// Feed a chunk and collect every line it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Line> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Bytes received since the last delimiter, up to [`MAX_LINE`].
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
