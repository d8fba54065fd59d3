// RR log stream reader
//
// Validates the header, then walks entries until the source is exhausted at
// an entry boundary. Channel declarations grow the registry; messages are
// decoded with the schema of the channel they name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use memmap2::Mmap;
use tracing::{debug, trace};

use super::cursor::ByteCursor;
use super::error::{DecodeError, Result};
use super::log_file::{Channel, LogFile};
use super::schema::{read_schema, Schema};
use super::types::{
    DEFAULT_MAX_SCHEMA_DEPTH, RR_ENTRY_CHANNEL, RR_ENTRY_MESSAGE, RR_MAGIC, RR_VERSION,
};
use super::value::{read_value, Value};

pub use super::cursor::BoolDecoding;

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub bool_decoding: BoolDecoding,
    /// Deepest struct nesting accepted in a channel schema.
    pub max_schema_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            bool_decoding: BoolDecoding::Strict,
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn with_bool_decoding(mut self, bool_decoding: BoolDecoding) -> Self {
        self.bool_decoding = bool_decoding;
        self
    }

    pub fn with_max_schema_depth(mut self, max_schema_depth: usize) -> Self {
        self.max_schema_depth = max_schema_depth;
        self
    }
}

/// Borrowed view of a declared channel, handed to a [`MessageSink`].
#[derive(Debug, Clone, Copy)]
pub struct ChannelRef<'a> {
    pub name: &'a str,
    pub index: usize,
    pub schema: &'a Schema,
}

/// Receives entries as they are decoded by [`LogReader::stream`].
pub trait MessageSink {
    /// Called once per channel declaration, before any of its messages.
    fn channel(&mut self, _channel: ChannelRef<'_>) {}

    fn message(&mut self, channel: ChannelRef<'_>, value: Value);
}

impl<F> MessageSink for F
where
    F: FnMut(ChannelRef<'_>, Value),
{
    fn message(&mut self, channel: ChannelRef<'_>, value: Value) {
        self(channel, value)
    }
}

/// Per-channel outcome of a streaming decode.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub name: String,
    pub index: usize,
    pub schema: Schema,
    pub message_count: usize,
}

/// Result of [`LogReader::stream`]: everything except the messages.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    pub version: i16,
    pub channels: Vec<ChannelSummary>,
}

impl StreamSummary {
    pub fn message_count(&self) -> usize {
        self.channels.iter().map(|c| c.message_count).sum()
    }
}

enum Entry {
    Channel { index: usize },
    Message { index: usize, value: Value },
}

/// Single-pass reader over one log stream.
pub struct LogReader<R> {
    cursor: ByteCursor<R>,
    options: DecodeOptions,
    version: i16,
    /// Declared channels; position in the map is the channel index.
    registry: IndexMap<String, Schema>,
}

impl<R: Read> LogReader<R> {
    /// Validate the header and position the reader at the first entry.
    pub fn open(source: R, options: DecodeOptions) -> Result<Self> {
        let mut cursor = ByteCursor::new(source);

        // A short read is only truncation while it is still a prefix of "RR".
        let magic = cursor.read_up_to(RR_MAGIC.len())?;
        if !RR_MAGIC.starts_with(&magic) {
            return Err(DecodeError::InvalidMagic {
                got: magic,
                offset: 0,
            });
        }
        if magic.len() < RR_MAGIC.len() {
            return Err(DecodeError::Truncated {
                needed: RR_MAGIC.len(),
                available: magic.len(),
                offset: cursor.position(),
            });
        }

        let version_offset = cursor.position();
        let version = cursor.read_i16_be()?;
        if version != RR_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                version,
                offset: version_offset,
            });
        }

        debug!(version, "RR log header accepted");

        Ok(LogReader {
            cursor,
            options,
            version,
            registry: IndexMap::new(),
        })
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    /// Decode every remaining entry, keeping all messages in memory.
    pub fn decode(self) -> Result<LogFile> {
        let mut collector = Collector::default();
        let summary = self.stream(&mut collector)?;

        let channels = summary
            .channels
            .into_iter()
            .zip(collector.messages)
            .map(|(channel, messages)| {
                let name = channel.name;
                let decoded = Channel::new(name.clone(), channel.index, channel.schema, messages);
                (name, decoded)
            })
            .collect();

        Ok(LogFile::new(summary.version, channels))
    }

    /// Decode every remaining entry, passing channels and messages to `sink`
    /// instead of buffering them.
    pub fn stream<S>(mut self, sink: &mut S) -> Result<StreamSummary>
    where
        S: MessageSink + ?Sized,
    {
        let mut counts: Vec<usize> = Vec::new();

        while let Some(entry) = self.next_entry()? {
            match entry {
                Entry::Channel { index } => {
                    counts.push(0);
                    if let Some(channel) = channel_ref(&self.registry, index) {
                        sink.channel(channel);
                    }
                }
                Entry::Message { index, value } => {
                    counts[index] += 1;
                    trace!(channel = index, "message decoded");
                    if let Some(channel) = channel_ref(&self.registry, index) {
                        sink.message(channel, value);
                    }
                }
            }
        }

        debug!(
            channels = self.registry.len(),
            messages = counts.iter().sum::<usize>(),
            bytes = self.cursor.position(),
            "RR log decoded"
        );

        Ok(StreamSummary {
            version: self.version,
            channels: self
                .registry
                .into_iter()
                .zip(counts)
                .enumerate()
                .map(|(index, ((name, schema), message_count))| ChannelSummary {
                    name,
                    index,
                    schema,
                    message_count,
                })
                .collect(),
        })
    }

    /// `Ok(None)` only when the source ends exactly between entries.
    fn next_entry(&mut self) -> Result<Option<Entry>> {
        let entry_offset = self.cursor.position();
        let tag = match self.cursor.read_i32_at_boundary() {
            Ok(Some(tag)) => tag,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e.within_entry(entry_offset)),
        };

        self.read_entry(tag, entry_offset)
            .map(Some)
            .map_err(|e| e.within_entry(entry_offset))
    }

    fn read_entry(&mut self, tag: i32, entry_offset: u64) -> Result<Entry> {
        match tag {
            RR_ENTRY_CHANNEL => {
                let name_offset = self.cursor.position();
                let name = self.cursor.read_string()?;
                let schema = read_schema(&mut self.cursor, self.options.max_schema_depth)?;

                if self.registry.contains_key(&name) {
                    return Err(DecodeError::DuplicateChannel {
                        name,
                        offset: name_offset,
                    });
                }

                let index = self.registry.len();
                debug!(channel = %name, index, schema = %schema, "channel declared");
                self.registry.insert(name, schema);
                Ok(Entry::Channel { index })
            }
            RR_ENTRY_MESSAGE => {
                let index_offset = self.cursor.position();
                let raw_index = self.cursor.read_i32_be()?;
                let (index, schema) = usize::try_from(raw_index)
                    .ok()
                    .and_then(|i| self.registry.get_index(i).map(|(_, schema)| (i, schema)))
                    .ok_or(DecodeError::UndefinedChannel {
                        index: raw_index,
                        declared: self.registry.len(),
                        offset: index_offset,
                    })?;

                let value = read_value(&mut self.cursor, schema, self.options.bool_decoding)?;
                Ok(Entry::Message { index, value })
            }
            tag => Err(DecodeError::UnknownEntryType {
                tag,
                offset: entry_offset,
            }),
        }
    }
}

fn channel_ref(registry: &IndexMap<String, Schema>, index: usize) -> Option<ChannelRef<'_>> {
    registry
        .get_index(index)
        .map(|(name, schema)| ChannelRef {
            name,
            index,
            schema,
        })
}

#[derive(Default)]
struct Collector {
    messages: Vec<Vec<Value>>,
}

impl MessageSink for Collector {
    fn channel(&mut self, _channel: ChannelRef<'_>) {
        self.messages.push(Vec::new());
    }

    fn message(&mut self, channel: ChannelRef<'_>, value: Value) {
        self.messages[channel.index].push(value);
    }
}

/// Decode a complete log from any byte source with default options.
pub fn decode_reader<R: Read>(source: R) -> Result<LogFile> {
    decode_reader_with(source, DecodeOptions::default())
}

pub fn decode_reader_with<R: Read>(source: R, options: DecodeOptions) -> Result<LogFile> {
    LogReader::open(source, options)?.decode()
}

/// Decode a complete in-memory log with default options.
pub fn decode_bytes(bytes: &[u8]) -> Result<LogFile> {
    decode_bytes_with(bytes, DecodeOptions::default())
}

pub fn decode_bytes_with(bytes: &[u8], options: DecodeOptions) -> Result<LogFile> {
    decode_reader_with(bytes, options)
}

/// Memory-map and decode a log file with default options.
pub fn decode_file(path: &Path) -> Result<LogFile> {
    decode_file_with(path, DecodeOptions::default())
}

pub fn decode_file_with(path: &Path, options: DecodeOptions) -> Result<LogFile> {
    let file = File::open(path)?;

    // Zero-length files cannot be mapped on every platform
    if file.metadata()?.len() == 0 {
        return decode_bytes_with(&[], options);
    }

    // SAFETY: the mapping is read-only and dropped before this function returns
    let mmap = unsafe { Mmap::map(&file)? };
    debug!(path = %path.display(), bytes = mmap.len(), "decoding RR log file");
    decode_bytes_with(&mmap, options)
}
