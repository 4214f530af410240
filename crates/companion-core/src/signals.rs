//! Signal sources consumed by the engine.
//!
//! Sampling (processor load, input capture, weather fetch, power
//! notifications) happens elsewhere. The engine only reads the latest cached
//! value at tick time, and a value that was never produced reads as `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geometry::{Display, Point};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition_text: String,
    /// Degrees Celsius.
    pub temperature: i32,
    /// Calendar day the observation belongs to.
    pub day: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthCounters {
    pub water_count: u32,
    pub stand_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Water,
    Stand,
}

/// Read side of every ambient signal, plus the single write-back used by
/// health action buttons.
pub trait SignalSource {
    /// Processor load, 0.0 ..= 100.0.
    fn current_load(&self) -> Option<f64>;

    /// Name of the frontmost application.
    fn active_application(&self) -> Option<String>;

    /// Key presses and clicks counted in the last sampling window.
    fn input_frequency(&self) -> Option<u32>;

    fn is_idle(&self) -> bool;

    fn is_system_sleeping(&self) -> bool;

    fn latest_weather(&self) -> Option<WeatherSnapshot>;

    fn health_counters(&self) -> Option<HealthCounters>;

    /// Invoked only from a message's action callback.
    fn record_activity(&mut self, kind: ActivityKind);

    /// Connected displays. Empty when the platform has not reported any.
    fn displays(&self) -> Vec<Display>;

    /// Agent origin reported by the platform while the user presses and
    /// drags it; `None` when no drag is in progress.
    fn drag_position(&self) -> Option<Point>;
}

/// A signal source backed by plain cached values.
///
/// Platform glue writes the latest sample into the matching field; tests and
/// the scenario simulator use it directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub load: Option<f64>,
    pub active_app: Option<String>,
    pub input_frequency: Option<u32>,
    pub idle: bool,
    pub system_sleeping: bool,
    pub weather: Option<WeatherSnapshot>,
    pub health: Option<HealthCounters>,
    pub displays: Vec<Display>,
    pub drag: Option<Point>,
}

impl SignalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.displays.push(display);
        self
    }
}

impl SignalSource for SignalSnapshot {
    fn current_load(&self) -> Option<f64> {
        self.load
    }

    fn active_application(&self) -> Option<String> {
        self.active_app.clone()
    }

    fn input_frequency(&self) -> Option<u32> {
        self.input_frequency
    }

    fn is_idle(&self) -> bool {
        self.idle
    }

    fn is_system_sleeping(&self) -> bool {
        self.system_sleeping
    }

    fn latest_weather(&self) -> Option<WeatherSnapshot> {
        self.weather.clone()
    }

    fn health_counters(&self) -> Option<HealthCounters> {
        self.health
    }

    fn record_activity(&mut self, kind: ActivityKind) {
        let counters = self.health.get_or_insert_with(HealthCounters::default);
        match kind {
            ActivityKind::Water => counters.water_count += 1,
            ActivityKind::Stand => counters.stand_count += 1,
        }
    }

    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }

    fn drag_position(&self) -> Option<Point> {
        self.drag
    }
}
