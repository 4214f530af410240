//! Scripted scenarios.
//!
//! A scenario is a TOML file with a start time, the connected displays and
//! a list of timed steps that change signals, press buttons or deliver power
//! events. The engine runs on a manual clock at the configured tick rate and
//! every event and sink call is printed as one JSON line.
//!
//! ```toml
//! start = "2026-03-02T09:00:00"
//! duration_secs = 12.0
//!
//! [[displays]]
//! id = 1
//! frame = { x = 0.0, y = 0.0, width = 1920.0, height = 1080.0 }
//!
//! [[steps]]
//! at_secs = 4.0
//! load = 60.0
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use companion_core::clock::duration_from_secs;
use companion_core::{
    ActivityKind, Clock, Display, Engine, EngineConfig, HealthCounters, ManualClock, Point,
    PowerEvent, Presentation, PresentationSink, Rect, SignalSnapshot, SystemClock,
    WeatherSnapshot,
};
use serde::{Deserialize, Serialize};

use super::config_path;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Local wall time of the first tick; the current time when absent.
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    pub duration_secs: f64,
    /// Overrides the config file when present.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub displays: Vec<DisplaySpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct DisplaySpec {
    pub id: u32,
    pub frame: Rect,
    /// Defaults to the full frame.
    #[serde(default)]
    pub visible: Option<Rect>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherSpec {
    pub condition_text: String,
    pub temperature: i32,
    /// Defaults to the scenario's start date.
    #[serde(default)]
    pub day: Option<NaiveDate>,
}

/// Everything that can change at one instant. Fields left out keep their
/// previous value.
#[derive(Debug, Default, Deserialize)]
pub struct Step {
    pub at_secs: f64,
    pub load: Option<f64>,
    pub app: Option<String>,
    pub input: Option<u32>,
    pub weather: Option<WeatherSpec>,
    pub health: Option<HealthCounters>,
    /// Agent origin while the user drags it.
    pub drag: Option<Point>,
    /// End the current drag.
    #[serde(default)]
    pub release: bool,
    pub idle: Option<bool>,
    pub power: Option<PowerEvent>,
    /// Press a message button.
    pub action: Option<String>,
    /// Force a health reminder.
    pub reminder: Option<ActivityKind>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut scenario: Scenario = toml::from_str(content)?;
        if !(scenario.duration_secs.is_finite() && scenario.duration_secs >= 0.0) {
            return Err("duration_secs must be a non-negative number".into());
        }
        if let Some(config) = &scenario.config {
            config.validate()?;
        }
        scenario.steps.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Ok(scenario)
    }
}

/// One printed sink call.
#[derive(Serialize)]
#[serde(tag = "sink", rename_all = "snake_case")]
enum SinkLine {
    Present { presentation: Presentation },
    Dismiss,
}

/// Sink that buffers calls as JSON lines until the runner flushes them.
#[derive(Default)]
struct JsonLinesSink {
    lines: Vec<String>,
}

impl JsonLinesSink {
    fn push(&mut self, line: &SinkLine) {
        match serde_json::to_string(line) {
            Ok(json) => self.lines.push(json),
            Err(e) => tracing::warn!("dropping unserializable sink call: {e}"),
        }
    }
}

impl PresentationSink for JsonLinesSink {
    fn present(&mut self, presentation: &Presentation) {
        self.push(&SinkLine::Present {
            presentation: presentation.clone(),
        });
    }

    fn dismiss(&mut self) {
        self.push(&SinkLine::Dismiss);
    }
}

type SimEngine = Engine<SignalSnapshot, JsonLinesSink, Rc<ManualClock>>;

fn apply_step(engine: &mut SimEngine, step: &Step, today: NaiveDate) {
    let signals = engine.signals_mut();
    if let Some(load) = step.load {
        signals.load = Some(load);
    }
    if let Some(app) = &step.app {
        signals.active_app = Some(app.clone());
    }
    if let Some(input) = step.input {
        signals.input_frequency = Some(input);
    }
    if let Some(weather) = &step.weather {
        signals.weather = Some(WeatherSnapshot {
            condition_text: weather.condition_text.clone(),
            temperature: weather.temperature,
            day: weather.day.unwrap_or(today),
        });
    }
    if let Some(health) = step.health {
        signals.health = Some(health);
    }
    if let Some(drag) = step.drag {
        signals.drag = Some(drag);
    }
    if step.release {
        signals.drag = None;
    }
    if let Some(idle) = step.idle {
        signals.idle = idle;
    }

    if let Some(event) = step.power {
        engine.handle_power_event(event);
    }
    if let Some(activity) = step.reminder {
        engine.trigger_reminder(activity);
    }
    if let Some(id) = &step.action {
        if !engine.on_action(id) {
            tracing::warn!(action = %id, "button not on screen");
        }
    }
}

/// Run `scenario` and write one JSON line per event or sink call to `out`.
/// Returns the number of lines written.
pub fn run_scenario<W: Write>(
    scenario: &Scenario,
    config: EngineConfig,
    out: &mut W,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start = scenario.start.unwrap_or_else(|| SystemClock.now());
    let clock = Rc::new(ManualClock::new(start));
    let mut signals = SignalSnapshot::new();
    for d in &scenario.displays {
        signals = signals.with_display(Display::new(d.id, d.frame, d.visible.unwrap_or(d.frame)));
    }

    let interval = config.tick_interval_secs();
    let mut engine = Engine::new(config, signals, JsonLinesSink::default(), Rc::clone(&clock));
    let ticks = (scenario.duration_secs / interval).round() as u64;
    let mut steps = scenario.steps.iter().peekable();
    let mut written = 0;

    for n in 0..=ticks {
        let elapsed = n as f64 * interval;
        clock.set(start + duration_from_secs(elapsed));
        while let Some(step) = steps.next_if(|s| s.at_secs <= elapsed + 1e-9) {
            apply_step(&mut engine, step, start.date());
        }

        for event in engine.tick() {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
            written += 1;
        }
        for line in engine.sink_mut().lines.drain(..) {
            writeln!(out, "{line}")?;
            written += 1;
        }
    }
    Ok(written)
}

pub fn run(scenario_path: &Path, config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(scenario_path)?;
    let scenario = Scenario::from_toml_str(&content)?;
    let config = match &scenario.config {
        Some(config) => config.clone(),
        None => EngineConfig::load_or_default(&config_path(config)?),
    };
    config.validate()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = run_scenario(&scenario, config, &mut out)?;
    tracing::info!(lines = written, "scenario finished");
    Ok(())
}
