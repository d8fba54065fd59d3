// Schema model and the schema reader.
//
// A schema is declared once per channel and drives every value read on it.

use std::fmt;
use std::io::Read;

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::cursor::ByteCursor;
use super::error::{DecodeError, Result};
use super::types::{
    RR_SCHEMA_BOOLEAN, RR_SCHEMA_ENUM, RR_SCHEMA_FLOAT64, RR_SCHEMA_INT32, RR_SCHEMA_INT64,
    RR_SCHEMA_STRING, RR_SCHEMA_STRUCT,
};

/// Leaf value encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int32,
    Int64,
    Float64,
    String,
    Boolean,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Float64 => "float64",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
        }
    }

    fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            RR_SCHEMA_INT32 => Some(PrimitiveKind::Int32),
            RR_SCHEMA_INT64 => Some(PrimitiveKind::Int64),
            RR_SCHEMA_FLOAT64 => Some(PrimitiveKind::Float64),
            RR_SCHEMA_STRING => Some(PrimitiveKind::String),
            RR_SCHEMA_BOOLEAN => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }
}

/// Shape of a channel's messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Named fields in declaration order. Names are unique.
    Struct(IndexMap<String, Schema>),
    Primitive(PrimitiveKind),
    /// Constant names; position is the ordinal. Names are unique.
    Enum(Vec<String>),
}

impl Schema {
    /// Field schemas of a struct, in declaration order.
    pub fn fields(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Schema::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.fields()?.get(name)
    }

    pub fn constants(&self) -> Option<&[String]> {
        match self {
            Schema::Enum(constants) => Some(constants),
            _ => None,
        }
    }

    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Schema::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Struct nesting depth; primitives and enums are 0.
    pub fn depth(&self) -> usize {
        match self {
            Schema::Struct(fields) => 1 + fields.values().map(Schema::depth).max().unwrap_or(0),
            Schema::Primitive(_) | Schema::Enum(_) => 0,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Struct(fields) => {
                if fields.is_empty() {
                    return f.write_str("struct {}");
                }
                f.write_str("struct { ")?;
                for (i, (name, schema)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {schema}")?;
                }
                f.write_str(" }")
            }
            Schema::Primitive(kind) => f.write_str(kind.name()),
            Schema::Enum(constants) => write!(f, "enum {{ {} }}", constants.join(", ")),
        }
    }
}

// {"struct": {...}}, "float64", {"enum": [...]}
impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Schema::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("struct", fields)?;
                map.end()
            }
            Schema::Primitive(kind) => serializer.serialize_str(kind.name()),
            Schema::Enum(constants) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("enum", constants)?;
                map.end()
            }
        }
    }
}

/// Read one schema, rejecting struct nesting deeper than `max_depth`.
pub fn read_schema<R: Read>(cursor: &mut ByteCursor<R>, max_depth: usize) -> Result<Schema> {
    read_schema_at(cursor, 0, max_depth)
}

fn read_schema_at<R: Read>(
    cursor: &mut ByteCursor<R>,
    depth: usize,
    max_depth: usize,
) -> Result<Schema> {
    let offset = cursor.position();
    let tag = cursor.read_i32_be()?;

    match tag {
        RR_SCHEMA_STRUCT => {
            if depth >= max_depth {
                return Err(DecodeError::SchemaTooDeep {
                    max: max_depth,
                    offset,
                });
            }
            let count = read_count(cursor, "field")?;
            let mut fields: IndexMap<String, Schema> = IndexMap::with_capacity(count.min(64));
            for _ in 0..count {
                let name_offset = cursor.position();
                let name = cursor.read_string()?;
                let schema = read_schema_at(cursor, depth + 1, max_depth)?;
                match fields.entry(name) {
                    Entry::Occupied(entry) => {
                        return Err(DecodeError::DuplicateField {
                            name: entry.key().clone(),
                            offset: name_offset,
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(schema);
                    }
                }
            }
            Ok(Schema::Struct(fields))
        }
        RR_SCHEMA_ENUM => {
            let count = read_count(cursor, "enum constant")?;
            let mut seen: IndexSet<String> = IndexSet::with_capacity(count.min(64));
            for _ in 0..count {
                let name_offset = cursor.position();
                let name = cursor.read_string()?;
                if seen.contains(&name) {
                    return Err(DecodeError::DuplicateEnumConstant {
                        name,
                        offset: name_offset,
                    });
                }
                seen.insert(name);
            }
            Ok(Schema::Enum(seen.into_iter().collect()))
        }
        tag => PrimitiveKind::from_tag(tag)
            .map(Schema::Primitive)
            .ok_or(DecodeError::UnknownSchemaTag { tag, offset }),
    }
}

fn read_count<R: Read>(cursor: &mut ByteCursor<R>, what: &'static str) -> Result<usize> {
    let offset = cursor.position();
    let count = cursor.read_i32_be()?;
    usize::try_from(count).map_err(|_| DecodeError::NegativeCount {
        what,
        count,
        offset,
    })
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::format::error::ErrorKind;
    use crate::format::fixtures::{encode_schema, put_i32, put_string};

    fn read(bytes: &[u8]) -> Result<Schema> {
        read_schema(&mut ByteCursor::new(bytes), 64)
    }

    fn pose_schema() -> Schema {
        Schema::Struct(IndexMap::from([
            ("x".to_string(), Schema::Primitive(PrimitiveKind::Float64)),
            ("y".to_string(), Schema::Primitive(PrimitiveKind::Float64)),
            ("heading".to_string(), Schema::Primitive(PrimitiveKind::Float64)),
            ("timestamp".to_string(), Schema::Primitive(PrimitiveKind::Int64)),
        ]))
    }

    #[test]
    fn test_read_schema__primitive_tags__then_kinds() {
        let expected = [
            PrimitiveKind::Int32,
            PrimitiveKind::Int64,
            PrimitiveKind::Float64,
            PrimitiveKind::String,
            PrimitiveKind::Boolean,
        ];
        for (tag, kind) in (1..=5).zip(expected) {
            let mut bytes = Vec::new();
            put_i32(&mut bytes, tag);
            assert_eq!(read(&bytes).unwrap(), Schema::Primitive(kind));
        }
    }

    #[test]
    fn test_read_schema__nested_struct__then_field_order_preserved() {
        let schema = Schema::Struct(IndexMap::from([
            ("pose".to_string(), pose_schema()),
            ("mode".to_string(), Schema::Enum(vec!["IDLE".into(), "RUN".into()])),
            ("label".to_string(), Schema::Primitive(PrimitiveKind::String)),
        ]));
        let bytes = encode_schema(&schema);

        let decoded = read(&bytes).unwrap();
        assert_eq!(decoded, schema);
        let names: Vec<&str> = decoded.fields().unwrap().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["pose", "mode", "label"]);
        assert_eq!(decoded.depth(), 2);
    }

    #[test]
    fn test_read_schema__enum__then_constants_in_ordinal_order() {
        let schema = Schema::Enum(vec!["OFF".into(), "ON".into(), "FAULT".into()]);
        let decoded = read(&encode_schema(&schema)).unwrap();
        assert_eq!(decoded.constants().unwrap(), ["OFF", "ON", "FAULT"]);
    }

    #[test]
    fn test_read_schema__empty_struct__then_accepted() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, RR_SCHEMA_STRUCT);
        put_i32(&mut bytes, 0);
        assert_eq!(read(&bytes).unwrap(), Schema::Struct(IndexMap::new()));
    }

    #[test]
    fn test_read_schema__unknown_tag__then_schema_error() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, 7);
        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSchemaTag { tag: 7, offset: 0 }));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_read_schema__duplicate_field__then_schema_error() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, RR_SCHEMA_STRUCT);
        put_i32(&mut bytes, 2);
        put_string(&mut bytes, "x");
        put_i32(&mut bytes, RR_SCHEMA_FLOAT64);
        put_string(&mut bytes, "x");
        put_i32(&mut bytes, RR_SCHEMA_INT32);

        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::DuplicateField { ref name, offset: 17 } if name == "x"));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_read_schema__duplicate_enum_constant__then_schema_error() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, RR_SCHEMA_ENUM);
        put_i32(&mut bytes, 2);
        put_string(&mut bytes, "ON");
        put_string(&mut bytes, "ON");

        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::DuplicateEnumConstant { ref name, .. } if name == "ON"));
    }

    #[test]
    fn test_read_schema__negative_count__then_schema_error() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, RR_SCHEMA_ENUM);
        put_i32(&mut bytes, -1);
        assert!(matches!(
            read(&bytes),
            Err(DecodeError::NegativeCount { count: -1, offset: 4, .. })
        ));
    }

    #[test]
    fn test_read_schema__too_deep__then_schema_error() {
        let mut bytes = Vec::new();
        for _ in 0..3 {
            put_i32(&mut bytes, RR_SCHEMA_STRUCT);
            put_i32(&mut bytes, 1);
            put_string(&mut bytes, "inner");
        }
        put_i32(&mut bytes, RR_SCHEMA_INT32);

        let err = read_schema(&mut ByteCursor::new(bytes.as_slice()), 2).unwrap_err();
        assert!(matches!(err, DecodeError::SchemaTooDeep { max: 2, .. }));
        assert!(read_schema(&mut ByteCursor::new(bytes.as_slice()), 3).is_ok());
    }

    #[test]
    fn test_read_schema__truncated_field_list__then_truncated() {
        let mut bytes = Vec::new();
        put_i32(&mut bytes, RR_SCHEMA_STRUCT);
        put_i32(&mut bytes, 2);
        put_string(&mut bytes, "x");
        put_i32(&mut bytes, RR_SCHEMA_FLOAT64);
        assert!(matches!(read(&bytes), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_schema__display__then_compact_expression() {
        let schema = Schema::Struct(IndexMap::from([
            ("x".to_string(), Schema::Primitive(PrimitiveKind::Float64)),
            ("state".to_string(), Schema::Enum(vec!["OFF".into(), "ON".into()])),
        ]));
        assert_eq!(schema.to_string(), "struct { x: float64, state: enum { OFF, ON } }");
        assert_eq!(Schema::Struct(IndexMap::new()).to_string(), "struct {}");
    }

    #[test]
    fn test_schema__serialize__then_json_shape() {
        let schema = Schema::Struct(IndexMap::from([
            ("b".to_string(), Schema::Primitive(PrimitiveKind::Boolean)),
            ("a".to_string(), Schema::Enum(vec!["L".into(), "R".into()])),
        ]));
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"{"struct":{"b":"boolean","a":{"enum":["L","R"]}}}"#);
    }
}
