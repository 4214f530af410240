//! TOML-based engine configuration.
//!
//! Holds every threshold the engine uses:
//! - Motion: tick rate, wandering, docking geometry
//! - Load classification breakpoints and stability filter
//! - Per-priority cooldowns and the docked multipliers
//! - Intent, health, weather and power timing
//! - Message duration policy and the interactive keyword allow-list
//! - Per-family feature switches
//!
//! The engine receives a fully built `EngineConfig` at construction. The
//! file at `~/.config/companion/config.toml` is only read by front ends.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::clock::MAX_SPAN_SECS;
use crate::error::{ConfigError, CoreError, ValidationError};

/// Agent motion and docking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,
    /// Distance covered per tick while walking.
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "default_arrival_distance")]
    pub arrival_distance: f64,
    /// Chance per idle tick of starting a walk once the cooldown has passed.
    #[serde(default = "default_walk_probability")]
    pub walk_probability: f64,
    #[serde(default = "default_walk_cooldown_secs")]
    pub walk_cooldown_secs: f64,
    /// Inset from the visible area that walk targets stay inside.
    #[serde(default = "default_walk_margin")]
    pub walk_margin: f64,
    #[serde(default = "default_wander_quip_probability")]
    pub wander_quip_probability: f64,
    #[serde(default = "default_dock_threshold")]
    pub dock_threshold: f64,
    /// Distance from the frame edge the agent center rests at when docked left/right.
    #[serde(default = "default_side_inset")]
    pub side_inset: f64,
    /// Same, for top/bottom.
    #[serde(default = "default_vertical_inset")]
    pub vertical_inset: f64,
    /// How far inside the visible area a dragged-away agent is pushed back.
    #[serde(default = "default_recovery_inset")]
    pub recovery_inset: f64,
    #[serde(default = "default_agent_size")]
    pub agent_width: f64,
    #[serde(default = "default_agent_size")]
    pub agent_height: f64,
}

/// Load classifier breakpoints and stability filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Samples below this are `Low`.
    #[serde(default = "default_low_below")]
    pub low_below: f64,
    /// Samples below this (and not `Low`) are `Medium`.
    #[serde(default = "default_medium_below")]
    pub medium_below: f64,
    #[serde(default = "default_stability_secs")]
    pub stability_secs: f64,
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: f64,
}

/// Arbiter cooldowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_critical_secs")]
    pub critical_secs: f64,
    #[serde(default = "default_important_secs")]
    pub important_secs: f64,
    #[serde(default = "default_normal_secs")]
    pub normal_secs: f64,
    #[serde(default = "default_docked_important_multiplier")]
    pub docked_important_multiplier: f64,
    #[serde(default = "default_docked_normal_multiplier")]
    pub docked_normal_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub min_gap_secs: f64,
    pub high_activity_threshold: u32,
    pub zero_input_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub summary_hour: u32,
    pub summary_start_minute: u32,
    pub summary_end_minute: u32,
    pub summary_duration_secs: f64,
    pub water_interval_secs: f64,
    /// Input count above which the user is considered at the keyboard.
    pub min_activity: u32,
    pub reminder_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub rearm_secs: f64,
    pub temperature_shift: i32,
    pub prompt_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub wake_delay_min_secs: f64,
    pub wake_delay_max_secs: f64,
}

/// Message duration policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_base_secs")]
    pub base_secs: f64,
    #[serde(default = "default_per_char_secs")]
    pub per_char_secs: f64,
    #[serde(default = "default_max_secs")]
    pub max_secs: f64,
    #[serde(default = "default_reply_secs")]
    pub reply_secs: f64,
    /// A new message whose text contains one of these keeps the buttons of
    /// the message it replaces.
    #[serde(default = "default_interactive_keywords")]
    pub interactive_keywords: Vec<String>,
}

/// Per-family switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub self_awareness: bool,
    #[serde(default = "default_true")]
    pub system_awareness: bool,
    #[serde(default = "default_true")]
    pub intent_awareness: bool,
    #[serde(default = "default_true")]
    pub health_reminders: bool,
    #[serde(default = "default_true")]
    pub weather_insights: bool,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/companion/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval of the health/weather sweep.
    #[serde(default = "default_awareness_sweep_secs")]
    pub awareness_sweep_secs: f64,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

// Default functions
fn default_tick_hz() -> f64 {
    10.0
}
fn default_step() -> f64 {
    1.0
}
fn default_arrival_distance() -> f64 {
    2.0
}
fn default_walk_probability() -> f64 {
    0.03
}
fn default_walk_cooldown_secs() -> f64 {
    30.0
}
fn default_walk_margin() -> f64 {
    150.0
}
fn default_wander_quip_probability() -> f64 {
    0.4
}
fn default_dock_threshold() -> f64 {
    80.0
}
fn default_side_inset() -> f64 {
    20.0
}
fn default_vertical_inset() -> f64 {
    30.0
}
fn default_recovery_inset() -> f64 {
    10.0
}
fn default_agent_size() -> f64 {
    120.0
}
fn default_low_below() -> f64 {
    15.0
}
fn default_medium_below() -> f64 {
    50.0
}
fn default_stability_secs() -> f64 {
    4.0
}
fn default_min_gap_secs() -> f64 {
    5.0
}
fn default_critical_secs() -> f64 {
    5.0
}
fn default_important_secs() -> f64 {
    300.0
}
fn default_normal_secs() -> f64 {
    600.0
}
fn default_docked_important_multiplier() -> f64 {
    3.0
}
fn default_docked_normal_multiplier() -> f64 {
    5.0
}
fn default_base_secs() -> f64 {
    1.5
}
fn default_per_char_secs() -> f64 {
    0.1
}
fn default_max_secs() -> f64 {
    5.0
}
fn default_reply_secs() -> f64 {
    3.0
}
fn default_interactive_keywords() -> Vec<String> {
    [
        "water", "stretch", "stand", "morning", "afternoon", "evening", "night", "got it",
        "summary", "weather",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_true() -> bool {
    true
}
fn default_awareness_sweep_secs() -> f64 {
    1.0
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            step: default_step(),
            arrival_distance: default_arrival_distance(),
            walk_probability: default_walk_probability(),
            walk_cooldown_secs: default_walk_cooldown_secs(),
            walk_margin: default_walk_margin(),
            wander_quip_probability: default_wander_quip_probability(),
            dock_threshold: default_dock_threshold(),
            side_inset: default_side_inset(),
            vertical_inset: default_vertical_inset(),
            recovery_inset: default_recovery_inset(),
            agent_width: default_agent_size(),
            agent_height: default_agent_size(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            low_below: default_low_below(),
            medium_below: default_medium_below(),
            stability_secs: default_stability_secs(),
            min_gap_secs: default_min_gap_secs(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            critical_secs: default_critical_secs(),
            important_secs: default_important_secs(),
            normal_secs: default_normal_secs(),
            docked_important_multiplier: default_docked_important_multiplier(),
            docked_normal_multiplier: default_docked_normal_multiplier(),
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            min_gap_secs: 120.0,
            high_activity_threshold: 100,
            zero_input_secs: 600.0,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            summary_hour: 17,
            summary_start_minute: 30,
            summary_end_minute: 35,
            summary_duration_secs: 15.0,
            water_interval_secs: 3600.0,
            min_activity: 5,
            reminder_duration_secs: 10.0,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            rearm_secs: 1800.0,
            temperature_shift: 5,
            prompt_duration_secs: 15.0,
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            wake_delay_min_secs: 1.0,
            wake_delay_max_secs: 3.0,
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            base_secs: default_base_secs(),
            per_char_secs: default_per_char_secs(),
            max_secs: default_max_secs(),
            reply_secs: default_reply_secs(),
            interactive_keywords: default_interactive_keywords(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            self_awareness: true,
            system_awareness: true,
            intent_awareness: true,
            health_reminders: true,
            weather_insights: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            load: LoadConfig::default(),
            cooldown: CooldownConfig::default(),
            intent: IntentConfig::default(),
            health: HealthConfig::default(),
            weather: WeatherConfig::default(),
            power: PowerConfig::default(),
            presentation: PresentationConfig::default(),
            features: FeaturesConfig::default(),
            awareness_sweep_secs: default_awareness_sweep_secs(),
            seed: None,
        }
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::Probability {
            field: field.into(),
            value,
        })
    }
}

fn check_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotPositive {
            field: field.into(),
            value,
        })
    }
}

/// A duration in seconds: finite, non-negative and no longer than a century.
fn check_span(field: &str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=MAX_SPAN_SECS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!("must be between 0 and {MAX_SPAN_SECS} seconds, got {value}"),
        })
    }
}

fn check_range(field: &str, min: f64, max: f64) -> Result<(), ValidationError> {
    if min <= max {
        Ok(())
    } else {
        Err(ValidationError::InvertedRange {
            field: field.into(),
            min,
            max,
        })
    }
}

impl EngineConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // `seed` is the only optional leaf.
                serde_json::Value::Null => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn default_path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let cfg: EngineConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `path`, writing and returning the default when the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default cannot be written.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                CoreError::Config(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            CoreError::Config(ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("falling back to default configuration: {e}");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result is validated
    /// before it replaces `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: EngineConfig = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let m = &self.motion;
        check_positive("motion.tick_hz", m.tick_hz)?;
        check_positive("motion.step", m.step)?;
        check_positive("motion.arrival_distance", m.arrival_distance)?;
        check_positive("motion.agent_width", m.agent_width)?;
        check_positive("motion.agent_height", m.agent_height)?;
        check_probability("motion.walk_probability", m.walk_probability)?;
        check_probability("motion.wander_quip_probability", m.wander_quip_probability)?;

        check_range("load", self.load.low_below, self.load.medium_below)?;

        let c = &self.cooldown;
        for (field, value) in [
            ("cooldown.critical_secs", c.critical_secs),
            ("cooldown.important_secs", c.important_secs),
            ("cooldown.normal_secs", c.normal_secs),
        ] {
            if value < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "cooldown cannot be negative".into(),
                });
            }
        }
        check_positive("cooldown.docked_important_multiplier", c.docked_important_multiplier)?;
        check_positive("cooldown.docked_normal_multiplier", c.docked_normal_multiplier)?;

        let h = &self.health;
        if h.summary_hour > 23 || h.summary_end_minute > 59 {
            return Err(ValidationError::InvalidValue {
                field: "health".into(),
                message: "summary window must be a valid time of day".into(),
            });
        }
        check_range(
            "health.summary_minute",
            h.summary_start_minute as f64,
            h.summary_end_minute as f64,
        )?;

        check_range(
            "power.wake_delay",
            self.power.wake_delay_min_secs,
            self.power.wake_delay_max_secs,
        )?;
        check_positive("awareness_sweep_secs", self.awareness_sweep_secs)?;

        let p = &self.presentation;
        for (field, value) in [
            ("awareness_sweep_secs", self.awareness_sweep_secs),
            ("motion.walk_cooldown_secs", m.walk_cooldown_secs),
            ("load.stability_secs", self.load.stability_secs),
            ("load.min_gap_secs", self.load.min_gap_secs),
            ("cooldown.critical_secs", c.critical_secs),
            ("cooldown.important_secs", c.important_secs),
            ("cooldown.normal_secs", c.normal_secs),
            ("intent.min_gap_secs", self.intent.min_gap_secs),
            ("intent.zero_input_secs", self.intent.zero_input_secs),
            ("health.summary_duration_secs", h.summary_duration_secs),
            ("health.water_interval_secs", h.water_interval_secs),
            ("health.reminder_duration_secs", h.reminder_duration_secs),
            ("weather.rearm_secs", self.weather.rearm_secs),
            ("weather.prompt_duration_secs", self.weather.prompt_duration_secs),
            ("power.wake_delay_min_secs", self.power.wake_delay_min_secs),
            ("power.wake_delay_max_secs", self.power.wake_delay_max_secs),
            ("presentation.base_secs", p.base_secs),
            ("presentation.per_char_secs", p.per_char_secs),
            ("presentation.max_secs", p.max_secs),
            ("presentation.reply_secs", p.reply_secs),
        ] {
            check_span(field, value)?;
        }
        Ok(())
    }

    /// Seconds between two ticks.
    pub fn tick_interval_secs(&self) -> f64 {
        1.0 / self.motion.tick_hz
    }
}
