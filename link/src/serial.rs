use serialport::SerialPort;
use std::{
    io::{self, Read, Write},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::protocol::{encode_line, CommandToken, Line, LineDecoder};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("cannot open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("link closed")]
    Closed,
}

/// Outgoing half of the link.
pub trait Link: Send {
    /// Write one command followed by the delimiter.
    fn send(&mut self, token: &CommandToken) -> Result<(), LinkError>;
    /// Human-readable name of the other end.
    fn description(&self) -> String;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send(&mut self, token: &CommandToken) -> Result<(), LinkError> {
        (**self).send(token)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// [`Link`] that writes newline-terminated tokens to any writer.
pub struct LineLink<W> {
    writer: W,
    name: String,
}

impl<W: Write + Send> LineLink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Link for LineLink<W> {
    fn send(&mut self, token: &CommandToken) -> Result<(), LinkError> {
        self.writer.write_all(&encode_line(token))?;
        self.writer.flush()?;
        debug!(%token, to = %self.name, "command written");
        Ok(())
    }

    fn description(&self) -> String {
        self.name.clone()
    }
}

/// Open `port` at `baud`. Reads give up after `timeout`.
pub fn open_serial(port: &str, baud: u32, timeout: Duration) -> Result<Box<dyn SerialPort>, LinkError> {
    let handle = serialport::new(port, baud)
        .timeout(timeout)
        .open()
        .map_err(|source| LinkError::Open {
            port: port.to_string(),
            source,
        })?;
    info!(%port, baud, "serial port open");
    Ok(handle)
}

/// Incoming half of the link: polls a reader for complete lines.
pub struct LineReceiver<R> {
    reader: R,
    decoder: LineDecoder,
}

impl<R: Read> LineReceiver<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: LineDecoder::new(),
        }
    }

    /// Read until a line completes or no more input is waiting.
    ///
    /// Returns `Ok(None)` when the reader times out mid-line and
    /// [`LinkError::Closed`] at end of input. At most one line is taken per
    /// call; anything after it stays in the transport's buffer.
    pub fn poll(&mut self) -> Result<Option<Line>, LinkError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Err(LinkError::Closed),
                Ok(_) => {
                    if let Some(line) = self.decoder.push(byte[0]) {
                        return Ok(Some(line));
                    }
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
