//! Awareness evaluators.
//!
//! One evaluator per signal family. Each is polled with the latest cached
//! signal and its own memory, and proposes at most one candidate per poll.
//! An evaluator updates its memory when it proposes; whether the arbiter
//! lets the candidate through is not its concern.

mod health;
mod intent;
mod load;
mod system;
mod weather;

pub use health::{daily_summary, reminder_reply, HealthEvaluator};
pub use intent::{AppCategory, IntentEvaluator};
pub use load::{LoadClassifier, LoadLevel, LoadReading};
pub use system::SystemLoadEvaluator;
pub use weather::{time_of_day_greeting, WeatherEvaluator, ACKNOWLEDGE_REPLY};

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one line from a canned pool.
pub(crate) fn pick<R: Rng + ?Sized>(pool: &[&str], rng: &mut R) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}
