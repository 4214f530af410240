//! What is on screen right now.
//!
//! The board turns an accepted candidate into a `Presentation`: it picks
//! the display duration, decides which action buttons survive, and hands the
//! message being replaced to the sink so it can play an exit transition.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::{NotificationAction, NotificationCandidate, NotificationKind, Priority};
use crate::geometry::Point;
use crate::storage::PresentationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub id: String,
    pub label: String,
}

/// The message pushed off screen by a newer one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiredMessage {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: Uuid,
    pub text: String,
    /// `None` for replies to an action button.
    pub kind: Option<NotificationKind>,
    pub priority: Option<Priority>,
    pub duration_secs: f64,
    pub actions: Vec<ActionButton>,
    pub replaces: Option<RetiredMessage>,
    /// Agent origin the message is anchored to.
    pub anchor: Point,
}

/// Surface that shows messages. Layout and styling live behind it.
pub trait PresentationSink {
    fn present(&mut self, presentation: &Presentation);
    fn dismiss(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Present(Presentation),
    Dismiss,
}

/// Sink that remembers every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> Vec<&Presentation> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Present(p) => Some(p),
                SinkCall::Dismiss => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.presented().iter().map(|p| p.text.as_str()).collect()
    }

    pub fn last_presented(&self) -> Option<&Presentation> {
        self.presented().last().copied()
    }

    pub fn dismiss_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Dismiss))
            .count()
    }
}

impl PresentationSink for RecordingSink {
    fn present(&mut self, presentation: &Presentation) {
        self.calls.push(SinkCall::Present(presentation.clone()));
    }

    fn dismiss(&mut self) {
        self.calls.push(SinkCall::Dismiss);
    }
}

#[derive(Debug, Clone)]
struct ActiveMessage {
    id: Uuid,
    text: String,
    shown_at: NaiveDateTime,
    duration_secs: f64,
}

#[derive(Debug, Clone)]
pub struct MessageBoard {
    config: PresentationConfig,
    current: Option<ActiveMessage>,
    actions: Vec<NotificationAction>,
}

impl MessageBoard {
    pub fn new(config: PresentationConfig) -> Self {
        Self {
            config,
            current: None,
            actions: Vec::new(),
        }
    }

    /// `min(max, base + per_char * characters)` unless `explicit` is given.
    pub fn display_duration(&self, text: &str, explicit: Option<f64>) -> f64 {
        explicit.unwrap_or_else(|| {
            let chars = text.chars().count() as f64;
            (self.config.base_secs + self.config.per_char_secs * chars).min(self.config.max_secs)
        })
    }

    fn matches_interactive_keyword(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.config
            .interactive_keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }

    fn rotate(&mut self) -> Option<RetiredMessage> {
        self.current.take().map(|m| RetiredMessage {
            id: m.id,
            text: m.text,
        })
    }

    fn put(
        &mut self,
        text: String,
        kind: Option<NotificationKind>,
        priority: Option<Priority>,
        duration_secs: f64,
        now: NaiveDateTime,
        anchor: Point,
    ) -> Presentation {
        let replaces = self.rotate();
        let id = Uuid::new_v4();
        self.current = Some(ActiveMessage {
            id,
            text: text.clone(),
            shown_at: now,
            duration_secs,
        });
        Presentation {
            id,
            text,
            kind,
            priority,
            duration_secs,
            actions: self
                .actions
                .iter()
                .map(|a| ActionButton {
                    id: a.id.clone(),
                    label: a.label.clone(),
                })
                .collect(),
            replaces,
            anchor,
        }
    }

    /// Show an accepted candidate.
    ///
    /// A candidate with its own buttons replaces the current ones. Without
    /// buttons, the current ones survive only if the new text matches an
    /// interactive keyword.
    pub fn show(
        &mut self,
        candidate: &NotificationCandidate,
        now: NaiveDateTime,
        anchor: Point,
    ) -> Presentation {
        if !candidate.actions.is_empty() {
            self.actions = candidate.actions.clone();
        } else if !(self.has_actions() && self.matches_interactive_keyword(&candidate.text)) {
            self.actions.clear();
        }
        let duration = self.display_duration(&candidate.text, candidate.duration_secs);
        self.put(
            candidate.text.clone(),
            Some(candidate.kind),
            Some(candidate.priority),
            duration,
            now,
            anchor,
        )
    }

    /// Show the answer to a pressed button. Replies carry no buttons.
    pub fn show_reply(&mut self, text: &str, now: NaiveDateTime, anchor: Point) -> Presentation {
        self.actions.clear();
        let duration = self.config.reply_secs;
        self.put(text.to_string(), None, None, duration, now, anchor)
    }

    /// Hide the message and drop its buttons. Returns whether anything was
    /// visible.
    pub fn dismiss(&mut self) -> bool {
        self.actions.clear();
        self.current.take().is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current.as_ref().map(|m| m.id)
    }

    pub fn current_text(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.text.as_str())
    }

    /// When the visible message should go away.
    pub fn expires_at(&self) -> Option<NaiveDateTime> {
        self.current
            .as_ref()
            .map(|m| crate::clock::deadline_after(m.shown_at, m.duration_secs))
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn actions(&self) -> &[NotificationAction] {
        &self.actions
    }

    pub fn find_action(&self, id: &str) -> Option<&NotificationAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::candidate::ActionKind;
    use crate::signals::ActivityKind;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn board() -> MessageBoard {
        MessageBoard::new(PresentationConfig::default())
    }

    fn water_prompt() -> NotificationCandidate {
        NotificationCandidate::new(
            "Time for a glass of water?",
            Priority::Critical,
            NotificationKind::Health,
        )
        .with_actions(vec![
            NotificationAction::new(
                "water_done",
                "Done",
                ActionKind::RecordActivity {
                    activity: ActivityKind::Water,
                },
            ),
            NotificationAction::new(
                "water_later",
                "Later",
                ActionKind::Defer {
                    activity: ActivityKind::Water,
                },
            ),
        ])
        .with_duration(10.0)
    }

    #[test]
    fn duration_scales_with_length_and_caps() {
        let b = board();
        let ten = "a".repeat(10);
        let long = "b".repeat(200);
        assert!((b.display_duration(&ten, None) - 2.5).abs() < 1e-9);
        assert_eq!(b.display_duration(&long, None), 5.0);
        assert_eq!(b.display_duration("", None), 1.5);
        assert_eq!(b.display_duration(&long, Some(15.0)), 15.0);
    }

    #[test]
    fn duration_counts_characters_not_bytes() {
        let b = board();
        // Five multi-byte characters.
        assert!((b.display_duration("水水水水水", None) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn new_message_retires_visible_one() {
        let mut b = board();
        let first = b.show(
            &NotificationCandidate::normal("first", NotificationKind::Fun),
            t0(),
            Point::default(),
        );
        assert!(first.replaces.is_none());
        let second = b.show(
            &NotificationCandidate::normal("second", NotificationKind::Fun),
            t0(),
            Point::default(),
        );
        assert_eq!(
            second.replaces,
            Some(RetiredMessage {
                id: first.id,
                text: "first".into()
            })
        );

        b.dismiss();
        let third = b.show(
            &NotificationCandidate::normal("third", NotificationKind::Fun),
            t0(),
            Point::default(),
        );
        assert!(third.replaces.is_none());
    }

    #[test]
    fn unrelated_message_clears_buttons() {
        let mut b = board();
        b.show(&water_prompt(), t0(), Point::default());
        assert!(b.has_actions());
        let p = b.show(
            &NotificationCandidate::normal("I'm on patrol!", NotificationKind::Fun),
            t0(),
            Point::default(),
        );
        assert!(p.actions.is_empty());
        assert!(!b.has_actions());
    }

    #[test]
    fn keyword_message_preserves_buttons() {
        let mut b = board();
        b.show(&water_prompt(), t0(), Point::default());
        let p = b.show(
            &NotificationCandidate::normal("Good evening! Busy day?", NotificationKind::Weather),
            t0(),
            Point::default(),
        );
        assert_eq!(p.actions.len(), 2);
        assert!(b.find_action("water_done").is_some());
    }

    #[test]
    fn keyword_without_existing_buttons_adds_none() {
        let mut b = board();
        let p = b.show(
            &NotificationCandidate::normal("Drink water", NotificationKind::Health),
            t0(),
            Point::default(),
        );
        assert!(p.actions.is_empty());
    }

    #[test]
    fn reply_drops_buttons_and_uses_reply_duration() {
        let mut b = board();
        b.show(&water_prompt(), t0(), Point::default());
        let reply = b.show_reply("Nice!", t0(), Point::default());
        assert!(reply.actions.is_empty());
        assert_eq!(reply.duration_secs, 3.0);
        assert!(reply.kind.is_none());
    }

    #[test]
    fn expiry_follows_duration() {
        let mut b = board();
        b.show(&water_prompt(), t0(), Point::default());
        assert_eq!(b.expires_at(), Some(t0() + chrono::Duration::seconds(10)));
        assert!(b.dismiss());
        assert!(!b.dismiss());
        assert!(b.expires_at().is_none());
    }
}
