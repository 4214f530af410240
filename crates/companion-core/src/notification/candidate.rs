use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::signals::ActivityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    Important,
    Normal,
}

/// Type tag. Cooldowns are tracked per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    System,
    Health,
    Power,
    Fun,
    Weather,
    Interaction,
}

/// What pressing a message button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionKind {
    /// The user did the thing: write the activity back and thank them.
    RecordActivity { activity: ActivityKind },
    /// The user will do it later.
    Defer { activity: ActivityKind },
    /// Silence the daily weather prompt for `day`.
    AcknowledgeWeather { day: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
    pub kind: ActionKind,
}

impl NotificationAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

/// A proposed message. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationCandidate {
    pub text: String,
    pub priority: Priority,
    pub kind: NotificationKind,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    /// Overrides the length-based display duration.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl NotificationCandidate {
    pub fn new(text: impl Into<String>, priority: Priority, kind: NotificationKind) -> Self {
        Self {
            text: text.into(),
            priority,
            kind,
            actions: Vec::new(),
            duration_secs: None,
        }
    }

    pub fn normal(text: impl Into<String>, kind: NotificationKind) -> Self {
        Self::new(text, Priority::Normal, kind)
    }

    pub fn with_actions(mut self, actions: Vec<NotificationAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}
