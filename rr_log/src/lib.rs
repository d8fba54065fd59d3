//! Decoder for RR telemetry logs.
//!
//! An RR log is a self-describing binary stream: channel declarations carry a
//! schema, and every later message on that channel is laid out according to
//! it. [`format`] turns such a stream into a [`LogFile`]; [`pose`] pulls robot
//! poses out of decoded channels for replay consumers.

pub mod format;
pub mod pose;

pub use format::{
    decode_bytes, decode_bytes_with, decode_file, decode_file_with, decode_reader,
    decode_reader_with, BoolDecoding, Channel, ChannelRef, ChannelSummary, DecodeError,
    DecodeOptions, ErrorKind, LogFile, LogReader, MessageSink, PrimitiveKind, Result, Schema,
    StreamSummary, Value,
};
pub use pose::{PoseError, PoseWithTime};
