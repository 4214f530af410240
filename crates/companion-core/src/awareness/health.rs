//! Health schedule: the end-of-day summary and the hourly water reminder.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::clock::secs_since;
use crate::notification::{
    ActionKind, NotificationAction, NotificationCandidate, NotificationKind, Priority,
};
use crate::signals::{ActivityKind, HealthCounters};
use crate::storage::HealthConfig;

const FULL_WATER: u32 = 8;
const FULL_STAND: u32 = 5;

/// Which schedule the last raised candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Raised {
    Summary(NaiveDate),
    Water,
}

/// Schedules advance only when the engine confirms a candidate was shown,
/// so a rejected summary or reminder is raised again on the next poll.
#[derive(Debug, Clone)]
pub struct HealthEvaluator {
    config: HealthConfig,
    summary_shown_on: Option<NaiveDate>,
    last_water_at: Option<NaiveDateTime>,
    raised: Option<Raised>,
}

impl HealthEvaluator {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            summary_shown_on: None,
            last_water_at: None,
            raised: None,
        }
    }

    /// The candidate from the last `evaluate` was shown at `now`.
    pub fn confirm(&mut self, now: NaiveDateTime) {
        match self.raised.take() {
            Some(Raised::Summary(day)) => self.summary_shown_on = Some(day),
            Some(Raised::Water) => self.last_water_at = Some(now),
            None => {}
        }
    }

    fn in_summary_window(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.config.summary_hour
            && (self.config.summary_start_minute..=self.config.summary_end_minute)
                .contains(&now.minute())
    }

    /// The summary wins when both schedules are due in the same poll; the
    /// water reminder is picked up on the next one.
    pub fn evaluate(
        &mut self,
        counters: Option<HealthCounters>,
        input_frequency: Option<u32>,
        now: NaiveDateTime,
    ) -> Option<NotificationCandidate> {
        self.raised = None;
        let today = now.date();
        if self.in_summary_window(now) && self.summary_shown_on != Some(today) {
            if let Some(counters) = counters {
                self.raised = Some(Raised::Summary(today));
                return Some(
                    NotificationCandidate::new(
                        daily_summary(counters),
                        Priority::Critical,
                        NotificationKind::Health,
                    )
                    .with_duration(self.config.summary_duration_secs),
                );
            }
        }

        let active = input_frequency.is_some_and(|f| f > self.config.min_activity);
        if active && secs_since(self.last_water_at, now) >= self.config.water_interval_secs {
            self.raised = Some(Raised::Water);
            return Some(self.reminder(ActivityKind::Water));
        }
        None
    }

    /// A reminder prompt with acknowledge/defer buttons.
    pub fn reminder(&self, activity: ActivityKind) -> NotificationCandidate {
        let (text, done_label, later_label) = match activity {
            ActivityKind::Water => (
                "You've been busy for a while. How about a warm glass of water?",
                "Drank it",
                "In a bit",
            ),
            ActivityKind::Stand => (
                "Time to stand up and stretch? Sitting too long isn't good for you~",
                "Stood up",
                "Later",
            ),
        };
        let prefix = match activity {
            ActivityKind::Water => "water",
            ActivityKind::Stand => "stand",
        };
        NotificationCandidate::new(text, Priority::Critical, NotificationKind::Health)
            .with_actions(vec![
                NotificationAction::new(
                    format!("{prefix}_done"),
                    done_label,
                    ActionKind::RecordActivity { activity },
                ),
                NotificationAction::new(
                    format!("{prefix}_later"),
                    later_label,
                    ActionKind::Defer { activity },
                ),
            ])
            .with_duration(self.config.reminder_duration_secs)
    }
}

/// Text of the end-of-day health summary.
pub fn daily_summary(counters: HealthCounters) -> String {
    if counters.water_count == 0 && counters.stand_count == 0 {
        return "Looks like you were too busy to log anything today. Remember to drink water and stand up often!".to_string();
    }
    let water = if counters.water_count >= FULL_WATER {
        "hit the full 8 glasses of water!".to_string()
    } else {
        format!("drank {} glasses of water, keep it up~", counters.water_count)
    };
    let stand = if counters.stand_count >= FULL_STAND {
        format!("Stood up and stretched {} times, great job!", counters.stand_count)
    } else {
        format!("Stood up {} times, remember to move around.", counters.stand_count)
    };
    format!("Today's health summary: you {water}\n{stand}\nLet's do it again tomorrow!")
}

/// Reply shown after a reminder button is pressed.
pub fn reminder_reply(action: &ActionKind) -> Option<&'static str> {
    match action {
        ActionKind::RecordActivity {
            activity: ActivityKind::Water,
        } => Some("Yay! Great job, keep it up~"),
        ActionKind::RecordActivity {
            activity: ActivityKind::Stand,
        } => Some("Feels better after a stretch, right?"),
        ActionKind::Defer {
            activity: ActivityKind::Water,
        } => Some("Okay, but don't forget to drink some water once you're done!"),
        ActionKind::Defer {
            activity: ActivityKind::Stand,
        } => Some("Alright, but don't sit too long, your back is complaining~"),
        ActionKind::AcknowledgeWeather { .. } => None,
    }
}
