//! Serial link between the capture host and the remote display.
//!
//! The protocol is one-way and minimal: each command is a short ASCII token
//! followed by `\n`, sent at 9600 baud with no checksum, acknowledgement or
//! length prefix.

pub mod protocol;
pub mod serial;
pub mod table;

pub use protocol::{
    encode_line, CommandToken, Line, LineDecoder, TokenError, BAUD_RATE, DELIMITER, MAX_LINE, VOCABULARY,
};
pub use serial::{open_serial, Link, LinkError, LineLink, LineReceiver};
pub use table::{parse_entry, CommandTable, EntryError};
