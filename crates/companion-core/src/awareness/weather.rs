use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::clock::secs_since;
use crate::notification::{
    ActionKind, NotificationAction, NotificationCandidate, NotificationKind, Priority,
};
use crate::signals::WeatherSnapshot;
use crate::storage::WeatherConfig;

/// Greeting for the hour of day (0..=23).
pub fn time_of_day_greeting(hour: u32) -> &'static str {
    match hour {
        0..=4 => "Still up this late?",
        5..=8 => "Good morning!",
        9..=11 => "Good morning, working hard?",
        12..=13 => "Good afternoon! Had lunch yet?",
        14..=17 => "Good afternoon!",
        18..=21 => "Good evening! Busy day?",
        _ => "It's getting late, time to rest soon.",
    }
}

/// Reply shown after the daily weather prompt is acknowledged.
pub const ACKNOWLEDGE_REPLY: &str = "Got it! Enjoy your day~";

#[derive(Debug, Clone)]
pub struct WeatherEvaluator {
    config: WeatherConfig,
    acknowledged_day: Option<NaiveDate>,
    last_prompt_at: Option<NaiveDateTime>,
    last_seen: Option<(i32, String)>,
}

impl WeatherEvaluator {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            config,
            acknowledged_day: None,
            last_prompt_at: None,
            last_seen: None,
        }
    }

    /// Silence the daily prompt for `day`.
    pub fn acknowledge(&mut self, day: NaiveDate) {
        self.acknowledged_day = Some(day);
    }

    pub fn acknowledged_day(&self) -> Option<NaiveDate> {
        self.acknowledged_day
    }

    /// The daily prompt re-arms every `rearm_secs` until acknowledged. A
    /// change in conditions is reported on its own path with no buttons; it
    /// yields to the daily prompt when both are due in the same poll. The
    /// last-seen snapshot advances on every call.
    pub fn evaluate(
        &mut self,
        snapshot: Option<WeatherSnapshot>,
        now: NaiveDateTime,
    ) -> Option<NotificationCandidate> {
        let snapshot = snapshot?;
        let changed = self.last_seen.as_ref().is_some_and(|(temp, text)| {
            *text != snapshot.condition_text
                || (snapshot.temperature - temp).abs() >= self.config.temperature_shift
        });
        self.last_seen = Some((snapshot.temperature, snapshot.condition_text.clone()));

        if self.acknowledged_day != Some(snapshot.day)
            && secs_since(self.last_prompt_at, now) >= self.config.rearm_secs
        {
            self.last_prompt_at = Some(now);
            return Some(self.daily_prompt(&snapshot, now));
        }

        if changed {
            return Some(NotificationCandidate::new(
                format!(
                    "The weather changed: now {}, {}°C.",
                    snapshot.condition_text, snapshot.temperature
                ),
                Priority::Important,
                NotificationKind::Weather,
            ));
        }
        None
    }

    fn daily_prompt(&self, snapshot: &WeatherSnapshot, now: NaiveDateTime) -> NotificationCandidate {
        let text = format!(
            "{} Today's weather: {}, {}°C.",
            time_of_day_greeting(now.hour()),
            snapshot.condition_text,
            snapshot.temperature
        );
        NotificationCandidate::new(text, Priority::Important, NotificationKind::Weather)
            .with_actions(vec![NotificationAction::new(
                "weather_ack",
                "Got it",
                ActionKind::AcknowledgeWeather { day: snapshot.day },
            )])
            .with_duration(self.config.prompt_duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::duration_from_secs;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(secs: f64) -> NaiveDateTime {
        day().and_hms_opt(8, 0, 0).unwrap() + duration_from_secs(secs)
    }

    fn snap(text: &str, temp: i32) -> Option<WeatherSnapshot> {
        Some(WeatherSnapshot {
            condition_text: text.into(),
            temperature: temp,
            day: day(),
        })
    }

    #[test]
    fn greeting_buckets() {
        assert_eq!(time_of_day_greeting(3), "Still up this late?");
        assert_eq!(time_of_day_greeting(5), "Good morning!");
        assert_eq!(time_of_day_greeting(12), "Good afternoon! Had lunch yet?");
        assert_eq!(time_of_day_greeting(18), "Good evening! Busy day?");
        assert_eq!(time_of_day_greeting(23), "It's getting late, time to rest soon.");
    }

    #[test]
    fn no_snapshot_no_candidate() {
        let mut e = WeatherEvaluator::new(WeatherConfig::default());
        assert!(e.evaluate(None, at(0.0)).is_none());
    }

    #[test]
    fn daily_prompt_rearms_until_acknowledged() {
        let mut e = WeatherEvaluator::new(WeatherConfig::default());
        let c = e.evaluate(snap("Sunny", 20), at(0.0)).unwrap();
        assert_eq!(c.priority, Priority::Important);
        assert_eq!(c.kind, NotificationKind::Weather);
        assert!(c.text.starts_with("Good morning!"));
        assert_eq!(
            c.actions[0].kind,
            ActionKind::AcknowledgeWeather { day: day() }
        );

        assert!(e.evaluate(snap("Sunny", 20), at(1799.0)).is_none());
        assert!(e.evaluate(snap("Sunny", 20), at(1800.0)).is_some());

        e.acknowledge(day());
        assert!(e.evaluate(snap("Sunny", 20), at(9000.0)).is_none());
    }

    #[test]
    fn change_path_ignores_acknowledgement() {
        let mut e = WeatherEvaluator::new(WeatherConfig::default());
        e.acknowledge(day());
        assert!(e.evaluate(snap("Sunny", 20), at(0.0)).is_none());
        assert!(e.evaluate(snap("Sunny", 24), at(10.0)).is_none());

        let c = e.evaluate(snap("Rain", 24), at(20.0)).unwrap();
        assert!(c.actions.is_empty());
        assert!(c.text.contains("Rain"));

        // Shift measured against the last snapshot, not the first.
        assert!(e.evaluate(snap("Rain", 28), at(30.0)).is_none());
        assert!(e.evaluate(snap("Rain", 33), at(40.0)).is_some());
        assert!(e.evaluate(snap("Rain", 28), at(50.0)).is_some());
    }

    #[test]
    fn daily_prompt_wins_over_change() {
        let mut e = WeatherEvaluator::new(WeatherConfig::default());
        e.evaluate(snap("Sunny", 20), at(0.0));
        let c = e.evaluate(snap("Snow", -2), at(1800.0)).unwrap();
        assert_eq!(c.actions.len(), 1);
        // The change was absorbed into the snapshot memory.
        assert!(e.evaluate(snap("Snow", -2), at(1801.0)).is_none());
    }
}
