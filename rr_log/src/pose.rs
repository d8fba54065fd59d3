//! Robot pose samples extracted from decoded channels.
//!
//! Drive logs record the estimated pose as a struct message with `x`, `y`,
//! `heading` and `timestamp` fields. Replay tooling wants those as plain
//! numbers ordered by time.

use serde::Serialize;
use thiserror::Error;

use crate::format::{Channel, Value};

#[derive(Debug, Error, PartialEq)]
pub enum PoseError {
    #[error("pose message is not a struct")]
    NotAStruct,

    #[error("pose message has no field {0:?}")]
    MissingField(&'static str),

    #[error("pose field {field:?} is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("message {index}: {source}")]
    InMessage {
        index: usize,
        #[source]
        source: Box<PoseError>,
    },
}

/// Position (field units), heading (radians) and the logger's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseWithTime {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub timestamp: i64,
}

impl PoseWithTime {
    pub fn from_value(value: &Value) -> Result<Self, PoseError> {
        if value.fields().is_none() {
            return Err(PoseError::NotAStruct);
        }

        Ok(PoseWithTime {
            x: float_field(value, "x")?,
            y: float_field(value, "y")?,
            heading: float_field(value, "heading")?,
            timestamp: int_field(value, "timestamp")?,
        })
    }

    /// Every message of `channel` as a pose, ordered by timestamp. Messages
    /// with equal timestamps keep their stream order.
    pub fn timeline(channel: &Channel) -> Result<Vec<Self>, PoseError> {
        let mut poses = channel
            .messages()
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Self::from_value(value).map_err(|e| PoseError::InMessage {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        poses.sort_by_key(|pose| pose.timestamp);
        Ok(poses)
    }
}

impl TryFrom<&Value> for PoseWithTime {
    type Error = PoseError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn float_field(value: &Value, field: &'static str) -> Result<f64, PoseError> {
    value
        .get(field)
        .ok_or(PoseError::MissingField(field))?
        .as_f64()
        .ok_or(PoseError::WrongType {
            field,
            expected: "float64",
        })
}

fn int_field(value: &Value, field: &'static str) -> Result<i64, PoseError> {
    value
        .get(field)
        .ok_or(PoseError::MissingField(field))?
        .as_i64()
        .ok_or(PoseError::WrongType {
            field,
            expected: "an integer",
        })
}
