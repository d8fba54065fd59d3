// Wire constants for the RR log format.
//
// All multi-byte integers on the wire are big-endian.

/// File magic, the first two bytes of every log.
pub const RR_MAGIC: [u8; 2] = *b"RR";

/// The only supported format version.
pub const RR_VERSION: i16 = 0;

/// Header size: magic (2) + version (2)
pub const RR_HEADER_LEN: usize = 4;

// Entry types
pub const RR_ENTRY_CHANNEL: i32 = 0;
pub const RR_ENTRY_MESSAGE: i32 = 1;

// Schema type tags
pub const RR_SCHEMA_STRUCT: i32 = 0;
pub const RR_SCHEMA_INT32: i32 = 1;
pub const RR_SCHEMA_INT64: i32 = 2;
pub const RR_SCHEMA_FLOAT64: i32 = 3;
pub const RR_SCHEMA_STRING: i32 = 4;
pub const RR_SCHEMA_BOOLEAN: i32 = 5;
pub const RR_SCHEMA_ENUM: i32 = 6;

/// Default bound on struct nesting while reading a schema.
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 64;
