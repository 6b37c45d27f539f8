//! Newline-delimited command encoding for the graph engine channel.
//!
//! Every command travels as one UTF-8 text line:
//!
//! ```text
//! <verb><SP><label><LF>
//! ```
//!
//! The encoder validates labels before anything reaches the wire, so a line
//! never carries an embedded terminator that would desynchronize the reader.
//! [`LineReader`] and [`LineWriter`] handle partial reads and writes.

pub mod codec;
pub mod error;
pub mod reader;
pub mod verb;
pub mod writer;

pub use codec::{
    decode_line, encode, encode_with_config, parse_command, Command, EncodedLine, LineConfig,
    DEFAULT_MAX_LINE,
};
pub use error::{LineError, Result, ValidationError};
pub use reader::LineReader;
pub use verb::Verb;
pub use writer::LineWriter;
