//! Typed field diffs for session updates and the audit vocabulary.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DeliveryMode;
use crate::domain::foundation::{Level, ValidationError};

/// One requested edit to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SessionChange {
    Subject(String),
    Topic(String),
    Level(Level),
    Details(String),
    Date(NaiveDate),
    StartTime(NaiveTime),
    Duration(u32),
    Mode(DeliveryMode),
}

/// Session columns that appear in the update history.
///
/// Includes the derived columns (`end_time`, `location`, `online_link`) and
/// `status`, which are never edited directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditedField {
    Subject,
    Topic,
    Level,
    Details,
    Date,
    StartTime,
    Duration,
    EndTime,
    Mode,
    Location,
    OnlineLink,
    Status,
}

impl AuditedField {
    const ALL: [AuditedField; 12] = [
        AuditedField::Subject,
        AuditedField::Topic,
        AuditedField::Level,
        AuditedField::Details,
        AuditedField::Date,
        AuditedField::StartTime,
        AuditedField::Duration,
        AuditedField::EndTime,
        AuditedField::Mode,
        AuditedField::Location,
        AuditedField::OnlineLink,
        AuditedField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditedField::Subject => "subject",
            AuditedField::Topic => "topic",
            AuditedField::Level => "level",
            AuditedField::Details => "details",
            AuditedField::Date => "date",
            AuditedField::StartTime => "start_time",
            AuditedField::Duration => "duration",
            AuditedField::EndTime => "end_time",
            AuditedField::Mode => "mode",
            AuditedField::Location => "location",
            AuditedField::OnlineLink => "online_link",
            AuditedField::Status => "status",
        }
    }
}

impl fmt::Display for AuditedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditedField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("field", format!("unknown field '{}'", s)))
    }
}

/// A single changed column with its before and after values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: AuditedField,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldChange {
    /// Returns a change only if the values differ.
    pub(crate) fn diff(
        field: AuditedField,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Option<Self> {
        (old_value != new_value).then_some(Self {
            field,
            old_value,
            new_value,
        })
    }
}

/// Audit rendering of a time of day.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Audit rendering of a date.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_uses_field_value_tags() {
        let change: SessionChange =
            serde_json::from_str(r#"{"field":"start_time","value":"11:00:00"}"#).unwrap();
        assert_eq!(
            change,
            SessionChange::StartTime(NaiveTime::from_hms_opt(11, 0, 0).unwrap())
        );
    }

    #[test]
    fn mode_change_carries_its_link() {
        let change: SessionChange = serde_json::from_str(
            r#"{"field":"mode","value":{"mode":"In-person","location":"Room 4"}}"#,
        )
        .unwrap();
        assert_eq!(
            change,
            SessionChange::Mode(DeliveryMode::in_person("Room 4").unwrap())
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<SessionChange, _> =
            serde_json::from_str(r#"{"field":"tutor_id","value":"ttr_002"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn audited_field_names_roundtrip() {
        for field in AuditedField::ALL {
            assert_eq!(field.as_str().parse::<AuditedField>().unwrap(), field);
        }
    }

    #[test]
    fn diff_skips_equal_values() {
        assert!(FieldChange::diff(AuditedField::Topic, Some("a".into()), Some("a".into())).is_none());
        assert!(FieldChange::diff(AuditedField::Location, None, Some("Room".into())).is_some());
    }

    #[test]
    fn times_render_without_seconds() {
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "09:05");
    }
}
