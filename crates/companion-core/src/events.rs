use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::awareness::LoadLevel;
use crate::geometry::Point;
use crate::motion::{DockEdge, MotionState};
use crate::notification::{NotificationKind, Priority, Rejection};

/// Every state change in the engine produces an Event.
/// Front ends poll for them; the simulator prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MotionChanged {
        from: MotionState,
        to: MotionState,
        at: NaiveDateTime,
    },
    Docked {
        edge: DockEdge,
        at: NaiveDateTime,
    },
    Undocked {
        edge: DockEdge,
        at: NaiveDateTime,
    },
    AgentMoved {
        origin: Point,
        at: NaiveDateTime,
    },
    /// A stable load level was announced to the user.
    LoadLevelChanged {
        level: LoadLevel,
        at: NaiveDateTime,
    },
    NotificationAccepted {
        id: Uuid,
        kind: NotificationKind,
        priority: Priority,
        text: String,
        at: NaiveDateTime,
    },
    NotificationRejected {
        kind: NotificationKind,
        priority: Priority,
        rejection: Rejection,
        at: NaiveDateTime,
    },
    /// Answer to a pressed button. Bypasses the arbiter.
    ReplyPresented {
        id: Uuid,
        text: String,
        at: NaiveDateTime,
    },
    MessageDismissed {
        id: Uuid,
        at: NaiveDateTime,
    },
    ActionInvoked {
        action_id: String,
        at: NaiveDateTime,
    },
    IdleEntered {
        at: NaiveDateTime,
    },
    IdleExited {
        at: NaiveDateTime,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn tagged_by_type() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let json = serde_json::to_value(Event::Docked {
            edge: DockEdge::Left,
            at,
        })
        .unwrap();
        assert_eq!(json["type"], "Docked");
        assert_eq!(json["edge"], "left");

        let json = serde_json::to_value(Event::NotificationRejected {
            kind: NotificationKind::Fun,
            priority: Priority::Normal,
            rejection: Rejection::Suspended,
            at,
        })
        .unwrap();
        assert_eq!(json["rejection"]["reason"], "suspended");
    }
}
