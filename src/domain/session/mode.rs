//! How a session is delivered.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Delivery mode. Each mode carries exactly one of link or location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum DeliveryMode {
    #[serde(rename = "Online")]
    Online { online_link: String },
    #[serde(rename = "In-person")]
    InPerson { location: String },
}

impl DeliveryMode {
    pub fn online(link: impl Into<String>) -> Result<Self, ValidationError> {
        let link = link.into().trim().to_string();
        if link.is_empty() {
            return Err(ValidationError::empty_field("online_link"));
        }
        Ok(DeliveryMode::Online { online_link: link })
    }

    pub fn in_person(location: impl Into<String>) -> Result<Self, ValidationError> {
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err(ValidationError::empty_field("location"));
        }
        Ok(DeliveryMode::InPerson { location })
    }

    /// Re-runs the constructor checks, e.g. on a deserialized value.
    pub fn validated(self) -> Result<Self, ValidationError> {
        match self {
            DeliveryMode::Online { online_link } => Self::online(online_link),
            DeliveryMode::InPerson { location } => Self::in_person(location),
        }
    }

    /// Rebuilds the mode from its stored columns.
    pub fn from_columns(
        mode: &str,
        location: Option<String>,
        online_link: Option<String>,
    ) -> Result<Self, ValidationError> {
        match mode.to_ascii_lowercase().as_str() {
            "online" => Self::online(online_link.unwrap_or_default()),
            "in-person" | "in_person" => Self::in_person(location.unwrap_or_default()),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown mode '{}'", other),
            )),
        }
    }

    /// Display and storage name of the mode.
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryMode::Online { .. } => "Online",
            DeliveryMode::InPerson { .. } => "In-person",
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            DeliveryMode::InPerson { location } => Some(location),
            DeliveryMode::Online { .. } => None,
        }
    }

    pub fn online_link(&self) -> Option<&str> {
        match self {
            DeliveryMode::Online { online_link } => Some(online_link),
            DeliveryMode::InPerson { .. } => None,
        }
    }
}
