//! Output formatters for decoded logs
//!
//! Supports text and JSON output formats.

use rr_log::{Channel, LogFile, PoseWithTime, Schema, Value};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format '{}'. Use 'text' or 'json'", s)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Format log summary
pub fn format_summary(log: &LogFile, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_summary_text(log),
        OutputFormat::Json => format_summary_json(log),
    }
}

fn format_summary_text(log: &LogFile) -> String {
    let mut output = String::new();

    output.push_str(&format!("Version:  {}\n", log.version()));
    output.push_str(&format!("Channels: {}\n", log.len()));
    output.push_str(&format!("Messages: {:>6}\n", log.message_count()));

    if !log.is_empty() {
        output.push('\n');
        for channel in log.channels() {
            output.push_str(&format!(
                "[{}] {}: {:>6} messages\n",
                channel.index(),
                channel.name(),
                channel.len()
            ));
        }
    }

    output
}

fn format_summary_json(log: &LogFile) -> String {
    #[derive(Serialize)]
    struct JsonSummary<'a> {
        version: i16,
        channel_count: usize,
        total_messages: usize,
        channels: Vec<JsonChannelCount<'a>>,
    }

    #[derive(Serialize)]
    struct JsonChannelCount<'a> {
        index: usize,
        name: &'a str,
        message_count: usize,
    }

    to_json(&JsonSummary {
        version: log.version(),
        channel_count: log.len(),
        total_messages: log.message_count(),
        channels: log
            .channels()
            .map(|channel| JsonChannelCount {
                index: channel.index(),
                name: channel.name(),
                message_count: channel.len(),
            })
            .collect(),
    })
}

/// Format channel list with schemas
pub fn format_channels(log: &LogFile, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!("Channels ({}):\n\n", log.len());
            for channel in log.channels() {
                output.push_str(&format!(
                    "[{}] {}: {}\n",
                    channel.index(),
                    channel.name(),
                    channel.schema()
                ));
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct JsonChannel<'a> {
                index: usize,
                name: &'a str,
                schema: &'a Schema,
            }

            let channels: Vec<JsonChannel> = log
                .channels()
                .map(|channel| JsonChannel {
                    index: channel.index(),
                    name: channel.name(),
                    schema: channel.schema(),
                })
                .collect();
            to_json(&channels)
        }
    }
}

/// Format a window of one channel's messages, each paired with its position
/// in the channel.
pub fn format_messages(
    channel: &Channel,
    messages: &[(usize, &Value)],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!(
                "{} ({} of {} messages):\n\n",
                channel.name(),
                messages.len(),
                channel.len()
            );
            for (seq, value) in messages {
                output.push_str(&format!("{:>6}  {}\n", seq, render_value(value)));
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct JsonMessages<'a> {
                channel: &'a str,
                total: usize,
                messages: Vec<JsonMessage<'a>>,
            }

            #[derive(Serialize)]
            struct JsonMessage<'a> {
                seq: usize,
                value: &'a Value,
            }

            to_json(&JsonMessages {
                channel: channel.name(),
                total: channel.len(),
                messages: messages
                    .iter()
                    .map(|(seq, value)| JsonMessage {
                        seq: *seq,
                        value: *value,
                    })
                    .collect(),
            })
        }
    }
}

/// Format a pose timeline
pub fn format_poses(poses: &[PoseWithTime], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!("Poses ({}):\n\n", poses.len());
            output.push_str(&format!(
                "{:>16} {:>10} {:>10} {:>9}\n",
                "timestamp", "x", "y", "heading"
            ));
            for pose in poses {
                output.push_str(&format!(
                    "{:>16} {:>10.3} {:>10.3} {:>9.4}\n",
                    pose.timestamp, pose.x, pose.y, pose.heading
                ));
            }
            output
        }
        OutputFormat::Json => to_json(&poses),
    }
}

/// One-line rendering of a value: `{ x: 1, y: 2 }` for structs.
fn render_value(value: &Value) -> String {
    match value {
        Value::Struct(fields) => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let parts: Vec<String> = fields
                .iter()
                .map(|(name, field)| format!("{name}: {}", render_value(field)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::String(v) => format!("{v:?}"),
        Value::Bool(v) => v.to_string(),
        Value::Enum(v) => v.clone(),
    }
}
