// Test-only byte builders for the RR wire format.

use super::schema::{PrimitiveKind, Schema};
use super::types::{
    RR_ENTRY_CHANNEL, RR_ENTRY_MESSAGE, RR_MAGIC, RR_SCHEMA_BOOLEAN, RR_SCHEMA_ENUM,
    RR_SCHEMA_FLOAT64, RR_SCHEMA_INT32, RR_SCHEMA_INT64, RR_SCHEMA_STRING, RR_SCHEMA_STRUCT,
    RR_VERSION,
};
use super::value::Value;

pub fn put_i16(buf: &mut Vec<u8>, v: i16) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

pub fn put_schema(buf: &mut Vec<u8>, schema: &Schema) {
    match schema {
        Schema::Struct(fields) => {
            put_i32(buf, RR_SCHEMA_STRUCT);
            put_i32(buf, fields.len() as i32);
            for (name, field) in fields {
                put_string(buf, name);
                put_schema(buf, field);
            }
        }
        Schema::Primitive(kind) => put_i32(
            buf,
            match kind {
                PrimitiveKind::Int32 => RR_SCHEMA_INT32,
                PrimitiveKind::Int64 => RR_SCHEMA_INT64,
                PrimitiveKind::Float64 => RR_SCHEMA_FLOAT64,
                PrimitiveKind::String => RR_SCHEMA_STRING,
                PrimitiveKind::Boolean => RR_SCHEMA_BOOLEAN,
            },
        ),
        Schema::Enum(constants) => {
            put_i32(buf, RR_SCHEMA_ENUM);
            put_i32(buf, constants.len() as i32);
            for constant in constants {
                put_string(buf, constant);
            }
        }
    }
}

pub fn put_value(buf: &mut Vec<u8>, schema: &Schema, value: &Value) {
    match (schema, value) {
        (Schema::Struct(fields), Value::Struct(values)) => {
            for (name, field) in fields {
                put_value(buf, field, &values[name.as_str()]);
            }
        }
        (Schema::Enum(constants), Value::Enum(name)) => {
            let ordinal = constants
                .iter()
                .position(|c| c == name)
                .expect("constant declared in schema");
            put_i32(buf, ordinal as i32);
        }
        (_, Value::Int32(v)) => put_i32(buf, *v),
        (_, Value::Int64(v)) => put_i64(buf, *v),
        (_, Value::Float64(v)) => put_f64(buf, *v),
        (_, Value::String(v)) => put_string(buf, v),
        (_, Value::Bool(v)) => buf.push(u8::from(*v)),
        (schema, value) => panic!("value {value:?} does not match schema {schema}"),
    }
}

pub fn encode_schema(schema: &Schema) -> Vec<u8> {
    let mut buf = Vec::new();
    put_schema(&mut buf, schema);
    buf
}

pub fn encode_value(schema: &Schema, value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    put_value(&mut buf, schema, value);
    buf
}

/// Builds a complete log: header, then entries in call order.
pub struct LogBuilder {
    bytes: Vec<u8>,
    schemas: Vec<Schema>,
}

impl LogBuilder {
    pub fn new() -> Self {
        let mut bytes = RR_MAGIC.to_vec();
        put_i16(&mut bytes, RR_VERSION);
        LogBuilder {
            bytes,
            schemas: Vec::new(),
        }
    }

    pub fn channel(mut self, name: &str, schema: Schema) -> Self {
        put_i32(&mut self.bytes, RR_ENTRY_CHANNEL);
        put_string(&mut self.bytes, name);
        put_schema(&mut self.bytes, &schema);
        self.schemas.push(schema);
        self
    }

    pub fn message(mut self, index: usize, value: &Value) -> Self {
        put_i32(&mut self.bytes, RR_ENTRY_MESSAGE);
        put_i32(&mut self.bytes, index as i32);
        let schema = self.schemas[index].clone();
        put_value(&mut self.bytes, &schema, value);
        self
    }

    /// Append raw bytes, for malformed input.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
