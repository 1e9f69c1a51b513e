//! Reminder field types shared by the sync queue and the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often a reminder repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Fires once.
    #[default]
    Once,
    /// Every day at the same time.
    Daily,
    /// Every week on the same weekday.
    Weekly,
    /// Every month on the same day.
    Monthly,
    /// User-defined; the backend owns the rule.
    Custom,
}

impl Frequency {
    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// Reminder priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Full field set of a new reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderFields {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reminder_datetime: DateTime<Utc>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub priority: Priority,
}

impl ReminderFields {
    /// A one-shot, medium-priority reminder.
    #[must_use]
    pub fn new(title: impl Into<String>, reminder_datetime: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            reminder_datetime,
            frequency: Frequency::default(),
            priority: Priority::default(),
        }
    }
}

/// Partial update of a reminder. Absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl ReminderPatch {
    /// True when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.reminder_datetime.is_none()
            && self.frequency.is_none()
            && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Weekly".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert!("yearly".parse::<Frequency>().is_err());
        assert_eq!(Frequency::default(), Frequency::Once);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(" HIGH ".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(Priority::default().to_string(), "medium");
    }

    #[test]
    fn test_fields_wire_shape() {
        let when = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let mut fields = ReminderFields::new("Take pills", when);
        fields.priority = Priority::High;

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["title"], "Take pills");
        assert_eq!(json["reminder_datetime"], "2025-01-01T08:00:00Z");
        assert_eq!(json["frequency"], "once");
        assert_eq!(json["priority"], "high");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_fields_defaults_on_read() {
        let json = r#"{"title":"Walk","reminder_datetime":"2025-03-01T09:30:00Z"}"#;
        let fields: ReminderFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.frequency, Frequency::Once);
        assert_eq!(fields.priority, Priority::Medium);
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = ReminderPatch {
            title: Some("New title".to_string()),
            ..ReminderPatch::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"title":"New title"}"#
        );
        assert!(ReminderPatch::default().is_empty());
    }
}
