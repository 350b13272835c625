//! Chart payloads returned by the presence API.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::ChartKind;

/// Errors while decoding a chart response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartDataError {
    #[error("expected a JSON array of rows")]
    NotAnArray,

    #[error("row #{index} is malformed: {reason}")]
    BadRow { index: usize, reason: String },
}

/// Time of day, as the API encodes it: `[hour, minute, second]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Clock {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self { hour, minute, second }
    }

    pub fn seconds_since_midnight(self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    fn from_json(value: &Value) -> Option<Self> {
        let parts = value.as_array()?;
        if parts.len() != 3 {
            return None;
        }
        let part = |i: usize, max: u64| {
            parts[i]
                .as_u64()
                .filter(|v| *v <= max)
                .and_then(|v| u8::try_from(v).ok())
        };
        Some(Self::new(part(0, 23)?, part(1, 59)?, part(2, 59)?))
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Decoded chart, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// One duration in seconds per weekday.
    Bars(Vec<(String, f64)>),
    /// Average start and end per weekday.
    Spans(Vec<(String, Clock, Clock)>),
}

impl ChartData {
    /// Decode a chart response of the given kind. Header rows (a label
    /// row with no numeric value) are skipped.
    pub fn from_json(kind: ChartKind, body: &Value) -> Result<Self, ChartDataError> {
        let rows = body.as_array().ok_or(ChartDataError::NotAnArray)?;
        match kind {
            ChartKind::PresenceWeekday | ChartKind::MeanTimeWeekday => {
                let mut bars = Vec::with_capacity(rows.len());
                for (index, row) in rows.iter().enumerate() {
                    let (label, cells) = split_row(index, row)?;
                    match cells.first() {
                        Some(Value::Number(n)) => {
                            let secs = n.as_f64().ok_or_else(|| bad_row(index, "value out of range"))?;
                            bars.push((label, secs));
                        }
                        Some(Value::String(_)) if bars.is_empty() => continue,
                        _ => return Err(bad_row(index, "expected a numeric value")),
                    }
                }
                Ok(ChartData::Bars(bars))
            }
            ChartKind::PresenceStartEnd => {
                let mut spans = Vec::with_capacity(rows.len());
                for (index, row) in rows.iter().enumerate() {
                    let (label, cells) = split_row(index, row)?;
                    if cells.len() != 2 {
                        return Err(bad_row(index, "expected start and end"));
                    }
                    let start = Clock::from_json(&cells[0])
                        .ok_or_else(|| bad_row(index, "start is not [h, m, s]"))?;
                    let end = Clock::from_json(&cells[1])
                        .ok_or_else(|| bad_row(index, "end is not [h, m, s]"))?;
                    spans.push((label, start, end));
                }
                Ok(ChartData::Spans(spans))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Bars(rows) => rows.is_empty(),
            ChartData::Spans(rows) => rows.is_empty(),
        }
    }
}

/// Format a duration in seconds as `H:MM:SS`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

fn split_row(index: usize, row: &Value) -> Result<(String, &[Value]), ChartDataError> {
    let cells = row
        .as_array()
        .ok_or_else(|| bad_row(index, "row is not an array"))?;
    let (label, rest) = cells
        .split_first()
        .ok_or_else(|| bad_row(index, "row is empty"))?;
    let label = label
        .as_str()
        .ok_or_else(|| bad_row(index, "label is not a string"))?;
    Ok((label.to_string(), rest))
}

fn bad_row(index: usize, reason: &str) -> ChartDataError {
    ChartDataError::BadRow {
        index,
        reason: reason.to_string(),
    }
}
