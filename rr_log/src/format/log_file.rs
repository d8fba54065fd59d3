// Decoded log aggregate: channels in declaration order with their messages.

use indexmap::IndexMap;

use super::schema::Schema;
use super::value::Value;

/// A named, schema-typed message stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    index: usize,
    schema: Schema,
    messages: Vec<Value>,
}

impl Channel {
    pub(crate) fn new(name: String, index: usize, schema: Schema, messages: Vec<Value>) -> Self {
        Channel {
            name,
            index,
            schema,
            messages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration position in the stream, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Messages in the order they appeared in the stream.
    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A fully decoded log. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFile {
    version: i16,
    channels: IndexMap<String, Channel>,
}

impl LogFile {
    /// `channels` must be keyed by name and ordered by index.
    pub(crate) fn new(version: i16, channels: IndexMap<String, Channel>) -> Self {
        debug_assert!(channels
            .values()
            .enumerate()
            .all(|(i, channel)| channel.index == i));
        LogFile { version, channels }
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Channel by declaration index.
    pub fn channel_at(&self, index: usize) -> Option<&Channel> {
        self.channels.get_index(index).map(|(_, channel)| channel)
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> impl ExactSizeIterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn channel_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Messages across all channels.
    pub fn message_count(&self) -> usize {
        self.channels.values().map(Channel::len).sum()
    }
}
