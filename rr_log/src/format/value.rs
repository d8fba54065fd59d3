// Decoded message values and the schema-driven value reader.

use std::io::Read;

use indexmap::IndexMap;
use serde::Serialize;

use super::cursor::{BoolDecoding, ByteCursor};
use super::error::{DecodeError, Result};
use super::schema::{PrimitiveKind, Schema};

/// One decoded message, shaped like the schema it was read with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Field values in the schema's declaration order.
    Struct(IndexMap<String, Value>),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bool(bool),
    /// The resolved constant name, not the ordinal.
    Enum(String),
}

impl Value {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Int64 values, and Int32 values widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Int32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Struct field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields()?.get(name)
    }

    /// Struct field by declaration position.
    pub fn field_at(&self, index: usize) -> Option<(&str, &Value)> {
        self.fields()?
            .get_index(index)
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// Read one value laid out according to `schema`.
///
/// Field names are taken from the schema; only field payloads are on the wire.
pub fn read_value<R: Read>(
    cursor: &mut ByteCursor<R>,
    schema: &Schema,
    bools: BoolDecoding,
) -> Result<Value> {
    match schema {
        Schema::Struct(fields) => {
            let mut values = IndexMap::with_capacity(fields.len());
            for (name, field_schema) in fields {
                let value = read_value(cursor, field_schema, bools)?;
                values.insert(name.clone(), value);
            }
            Ok(Value::Struct(values))
        }
        Schema::Primitive(kind) => match kind {
            PrimitiveKind::Int32 => cursor.read_i32_be().map(Value::Int32),
            PrimitiveKind::Int64 => cursor.read_i64_be().map(Value::Int64),
            PrimitiveKind::Float64 => cursor.read_f64_be().map(Value::Float64),
            PrimitiveKind::String => cursor.read_string().map(Value::String),
            PrimitiveKind::Boolean => cursor.read_bool(bools).map(Value::Bool),
        },
        Schema::Enum(constants) => {
            let offset = cursor.position();
            let ordinal = cursor.read_i32_be()?;
            usize::try_from(ordinal)
                .ok()
                .and_then(|i| constants.get(i))
                .map(|constant| Value::Enum(constant.clone()))
                .ok_or(DecodeError::EnumOutOfRange {
                    ordinal,
                    len: constants.len(),
                    offset,
                })
        }
    }
}
