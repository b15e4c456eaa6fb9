//! Topic and payload construction into fixed-size buffers.
//!
//! Topics are `<prefix>/<metric>`; payloads are ASCII decimal strings with
//! two fractional digits, or a fixed diagnostic word.
use crate::error::FormatError;
use core::fmt::Write;
use heapless::String;


/// Capacity of a topic buffer.
pub const MAX_TOPIC_LEN: usize = 96;
/// Capacity of a payload buffer.
pub const MAX_PAYLOAD_LEN: usize = 32;

pub type Topic = String<MAX_TOPIC_LEN>;
pub type Payload = String<MAX_PAYLOAD_LEN>;

pub const METRIC_HUMIDITY: &str = "humidity";
pub const METRIC_TEMPERATURE: &str = "temperature";
pub const METRIC_DIAG: &str = "diag";

/// Diagnostic payload of a cycle that measured successfully.
pub const DIAG_OK: &str = "OK";
/// Diagnostic payload of a cycle whose sensor failed.
pub const DIAG_SENSOR_FAILED: &str = "ERR sensor";

/// `<prefix>/<metric>`.
pub fn topic_for(prefix: &str, metric: &str) -> Result<Topic, FormatError> {
    let mut topic = Topic::new();
    write!(topic, "{}/{}", prefix, metric).map_err(|_| FormatError::Overflow {
        capacity: MAX_TOPIC_LEN,
    })?;
    Ok(topic)
}

/// Decimal rendering with two fractional digits.
pub fn format_value(value: f32) -> Result<Payload, FormatError> {
    let mut payload = Payload::new();
    write!(payload, "{:.2}", value).map_err(|_| FormatError::Overflow {
        capacity: MAX_PAYLOAD_LEN,
    })?;
    Ok(payload)
}

/// Copy a fixed text into a payload buffer.
pub fn text(value: &str) -> Result<Payload, FormatError> {
    let mut payload = Payload::new();
    payload.push_str(value).map_err(|_| FormatError::Overflow {
        capacity: MAX_PAYLOAD_LEN,
    })?;
    Ok(payload)
}
