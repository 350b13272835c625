//! Shared types used across all modules.
//!
//! Users, identifiers, selections, and chart payloads live here so the
//! selector, the sources, and the renderers can share them without
//! reaching into each other's internals.

pub mod chart;
pub mod user;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

pub use chart::{ChartData, ChartDataError, Clock};
pub use user::{AvatarIndex, DirectoryError, User, UserDirectory};

/// Identifier of a user, as used for the selection control's option values.
///
/// The users listing has carried both integer and string ids over time;
/// both normalise to their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalise a JSON identifier. Only strings and numbers qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<usize> for UserId {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

/// The current value of the selection control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing chosen, or the "all users" sentinel.
    #[default]
    None,
    /// A concrete user.
    User(UserId),
}

impl Selection {
    /// Interpret a raw control value. The empty string and `sentinel`
    /// both mean "no selection".
    pub fn parse(value: &str, sentinel: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == sentinel.trim() {
            Selection::None
        } else {
            Selection::User(UserId::new(value))
        }
    }

    pub fn user(&self) -> Option<&UserId> {
        match self {
            Selection::None => None,
            Selection::User(id) => Some(id),
        }
    }
}

/// Where a record's identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdField {
    /// Position of the record in the response array.
    Index,
    /// A named field of the record, e.g. `id` or `user_id`.
    Field(String),
}

impl Default for IdField {
    fn default() -> Self {
        IdField::Field(crate::constants::DEFAULT_ID_FIELD.to_string())
    }
}

impl fmt::Display for IdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdField::Index => f.write_str("index"),
            IdField::Field(name) => f.write_str(name),
        }
    }
}

impl std::str::FromStr for IdField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("id field must not be empty".to_string()),
            "index" => Ok(IdField::Index),
            name => Ok(IdField::Field(name.to_string())),
        }
    }
}

impl TryFrom<String> for IdField {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IdField> for String {
    fn from(field: IdField) -> Self {
        field.to_string()
    }
}

/// Presence charts served by the analyzer API.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChartKind {
    /// Total presence per weekday.
    #[default]
    PresenceWeekday,
    /// Mean presence per weekday.
    MeanTimeWeekday,
    /// Average arrival and departure per weekday.
    PresenceStartEnd,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::PresenceWeekday => "Presence by weekday",
            ChartKind::MeanTimeWeekday => "Mean presence time by weekday",
            ChartKind::PresenceStartEnd => "Presence start-end",
        }
    }
}
