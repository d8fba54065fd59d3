// RR log format reader
//
// Wire layout, schema model and the single-pass stream decoder.

pub mod cursor;
pub mod error;
pub mod log_file;
pub mod reader;
pub mod schema;
pub mod types;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export main types
pub use cursor::ByteCursor;
pub use error::{DecodeError, ErrorKind, Result};
pub use log_file::{Channel, LogFile};
pub use reader::{
    decode_bytes, decode_bytes_with, decode_file, decode_file_with, decode_reader,
    decode_reader_with, BoolDecoding, ChannelRef, ChannelSummary, DecodeOptions, LogReader,
    MessageSink, StreamSummary,
};
pub use schema::{PrimitiveKind, Schema};
pub use types::{
    RR_ENTRY_CHANNEL, RR_ENTRY_MESSAGE, RR_MAGIC, RR_SCHEMA_BOOLEAN, RR_SCHEMA_ENUM,
    RR_SCHEMA_FLOAT64, RR_SCHEMA_INT32, RR_SCHEMA_INT64, RR_SCHEMA_STRING, RR_SCHEMA_STRUCT,
    RR_VERSION,
};
pub use value::Value;
