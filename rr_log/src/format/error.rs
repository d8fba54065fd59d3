// Error handling for the RR log decoder

use std::string::FromUtf8Error;

use thiserror::Error;

/// Failure category of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic or unsupported version.
    Format,
    /// Unknown schema tag, duplicate field or constant, malformed schema.
    Schema,
    /// Unknown entry type, undefined or duplicate channel, truncated entry.
    CorruptEntry,
    /// Enum ordinal outside the declared constants.
    EnumRange,
    /// String bytes are not valid UTF-8.
    InvalidUtf8,
    /// Not enough bytes for a fixed-size read.
    TruncatedStream,
    /// The byte source itself failed.
    Io,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid magic bytes at byte {offset}: expected \"RR\", got {got:?}")]
    InvalidMagic { got: Vec<u8>, offset: u64 },

    #[error("Unsupported version {version} at byte {offset}")]
    UnsupportedVersion { version: i16, offset: u64 },

    #[error("Unknown schema type tag {tag} at byte {offset}")]
    UnknownSchemaTag { tag: i32, offset: u64 },

    #[error("Duplicate struct field {name:?} at byte {offset}")]
    DuplicateField { name: String, offset: u64 },

    #[error("Duplicate enum constant {name:?} at byte {offset}")]
    DuplicateEnumConstant { name: String, offset: u64 },

    #[error("Negative {what} count {count} at byte {offset}")]
    NegativeCount {
        what: &'static str,
        count: i32,
        offset: u64,
    },

    #[error("Schema nesting exceeds {max} levels at byte {offset}")]
    SchemaTooDeep { max: usize, offset: u64 },

    #[error("Unknown entry type {tag} at byte {offset}")]
    UnknownEntryType { tag: i32, offset: u64 },

    #[error("Undefined channel index {index} at byte {offset} ({declared} declared)")]
    UndefinedChannel {
        index: i32,
        declared: usize,
        offset: u64,
    },

    #[error("Duplicate channel name {name:?} at byte {offset}")]
    DuplicateChannel { name: String, offset: u64 },

    #[error("Truncated entry starting at byte {entry_offset}: stream ended at byte {offset}")]
    TruncatedEntry { entry_offset: u64, offset: u64 },

    #[error("Enum ordinal {ordinal} out of range for {len} constants at byte {offset}")]
    EnumOutOfRange {
        ordinal: i32,
        len: usize,
        offset: u64,
    },

    #[error("Invalid UTF-8 string at byte {offset}: {source}")]
    InvalidUtf8 {
        offset: u64,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Invalid boolean byte {byte:#04x} at byte {offset}")]
    InvalidBool { byte: u8, offset: u64 },

    #[error("Truncated stream at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        needed: usize,
        available: usize,
        offset: u64,
    },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl DecodeError {
    /// Category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Io(_) => ErrorKind::Io,
            DecodeError::InvalidMagic { .. } | DecodeError::UnsupportedVersion { .. } => {
                ErrorKind::Format
            }
            DecodeError::UnknownSchemaTag { .. }
            | DecodeError::DuplicateField { .. }
            | DecodeError::DuplicateEnumConstant { .. }
            | DecodeError::NegativeCount { .. }
            | DecodeError::SchemaTooDeep { .. } => ErrorKind::Schema,
            DecodeError::UnknownEntryType { .. }
            | DecodeError::UndefinedChannel { .. }
            | DecodeError::DuplicateChannel { .. }
            | DecodeError::TruncatedEntry { .. }
            | DecodeError::InvalidBool { .. } => ErrorKind::CorruptEntry,
            DecodeError::EnumOutOfRange { .. } => ErrorKind::EnumRange,
            DecodeError::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            DecodeError::Truncated { .. } => ErrorKind::TruncatedStream,
        }
    }

    /// Byte offset at which the failure was detected, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            DecodeError::Io(_) => None,
            DecodeError::InvalidMagic { offset, .. }
            | DecodeError::UnsupportedVersion { offset, .. }
            | DecodeError::UnknownSchemaTag { offset, .. }
            | DecodeError::DuplicateField { offset, .. }
            | DecodeError::DuplicateEnumConstant { offset, .. }
            | DecodeError::NegativeCount { offset, .. }
            | DecodeError::SchemaTooDeep { offset, .. }
            | DecodeError::UnknownEntryType { offset, .. }
            | DecodeError::UndefinedChannel { offset, .. }
            | DecodeError::DuplicateChannel { offset, .. }
            | DecodeError::TruncatedEntry { offset, .. }
            | DecodeError::EnumOutOfRange { offset, .. }
            | DecodeError::InvalidUtf8 { offset, .. }
            | DecodeError::InvalidBool { offset, .. }
            | DecodeError::Truncated { offset, .. } => Some(*offset),
        }
    }

    /// Re-labels an underrun as a truncated entry. Used once the entry tag has
    /// been consumed, so running out of bytes is corruption, not a clean end.
    pub(crate) fn within_entry(self, entry_offset: u64) -> Self {
        match self {
            DecodeError::Truncated { offset, .. } => DecodeError::TruncatedEntry {
                entry_offset,
                offset,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn decode_error__kind__then_matches_taxonomy() {
        assert_eq!(
            DecodeError::InvalidMagic {
                got: b"XX".to_vec(),
                offset: 0
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            DecodeError::UnsupportedVersion {
                version: 3,
                offset: 2
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            DecodeError::UnknownSchemaTag { tag: 9, offset: 8 }.kind(),
            ErrorKind::Schema
        );
        assert_eq!(
            DecodeError::UndefinedChannel {
                index: 2,
                declared: 1,
                offset: 30
            }
            .kind(),
            ErrorKind::CorruptEntry
        );
        assert_eq!(
            DecodeError::EnumOutOfRange {
                ordinal: -1,
                len: 2,
                offset: 12
            }
            .kind(),
            ErrorKind::EnumRange
        );
        assert_eq!(
            DecodeError::Truncated {
                needed: 4,
                available: 1,
                offset: 2
            }
            .kind(),
            ErrorKind::TruncatedStream
        );
    }

    #[test]
    fn decode_error__within_entry__then_truncation_becomes_corrupt_entry() {
        let err = DecodeError::Truncated {
            needed: 8,
            available: 3,
            offset: 40,
        }
        .within_entry(28);

        assert!(matches!(
            err,
            DecodeError::TruncatedEntry {
                entry_offset: 28,
                offset: 40
            }
        ));
        assert_eq!(err.kind(), ErrorKind::CorruptEntry);
        assert_eq!(err.offset(), Some(40));
    }

    #[test]
    fn decode_error__within_entry__then_other_errors_unchanged() {
        let err = DecodeError::UnknownEntryType { tag: 7, offset: 4 }.within_entry(4);
        assert!(matches!(err, DecodeError::UnknownEntryType { tag: 7, .. }));
    }

    #[test]
    fn decode_error__display__then_includes_offset() {
        let err = DecodeError::DuplicateChannel {
            name: "TEMP".to_string(),
            offset: 52,
        };
        let message = err.to_string();
        assert!(message.contains("TEMP"));
        assert!(message.contains("52"));
    }

    #[test]
    fn decode_error__header_errors__then_offsets_reported() {
        let magic = DecodeError::InvalidMagic {
            got: b"X".to_vec(),
            offset: 0,
        };
        let version = DecodeError::UnsupportedVersion {
            version: 7,
            offset: 2,
        };
        assert_eq!(magic.offset(), Some(0));
        assert_eq!(version.offset(), Some(2));
        assert!(version.to_string().contains("byte 2"));
    }

    #[test]
    fn decode_error__from_io__then_io_kind_without_offset() {
        let err = DecodeError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.offset(), None);
        assert!(err.to_string().contains("denied"));
    }
}
