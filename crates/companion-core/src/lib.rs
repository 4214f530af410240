//! # Companion Core Library
//!
//! Behavior engine for an always-running desktop companion: a small agent
//! that sits on screen, reacts to ambient signals and now and then says
//! something.
//!
//! ## Architecture
//!
//! - **Awareness**: one evaluator per signal family (system load, user
//!   intent, health schedule, weather) proposing candidate notifications
//! - **Notification**: the arbiter that rate-limits candidates per type and
//!   the message board that tracks what is on screen
//! - **Motion**: the agent's idle/walking/interacting/docked state machine
//!   and edge geometry
//! - **Power**: idle and sleep tracking that suspends everything
//! - **Engine**: a wall-clock state machine tying the above together; the
//!   caller drives it with `tick()`
//!
//! ## Key Components
//!
//! - [`Engine`]: the coordination context
//! - [`SignalSource`]: what the engine reads from the platform
//! - [`PresentationSink`]: where accepted messages go
//! - [`EngineConfig`]: thresholds, cooldowns and feature switches

pub mod awareness;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod motion;
pub mod notification;
pub mod power;
pub mod signals;
pub mod storage;
pub mod timers;

pub use awareness::LoadLevel;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Engine;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use geometry::{Display, Point, Rect, Size};
pub use motion::{DockEdge, MotionState};
pub use notification::{
    ActionKind, NotificationCandidate, NotificationKind, Presentation, PresentationSink, Priority,
    RecordingSink,
};
pub use power::{PowerEvent, PowerState};
pub use signals::{ActivityKind, HealthCounters, SignalSnapshot, SignalSource, WeatherSnapshot};
pub use storage::EngineConfig;
