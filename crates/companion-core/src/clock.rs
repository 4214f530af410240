//! Wall-clock abstraction.
//!
//! All engine time is local wall time (`NaiveDateTime`): the health schedule
//! and the weather greeting depend on the local hour, and cooldowns are plain
//! differences between two readings.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDateTime};

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Share it through `Rc` so a test or
/// a simulator can advance the same instance the engine reads.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(duration_from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Seconds from `earlier` to `later`, negative when `later` is before.
pub fn secs_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Seconds elapsed since an optional instant. `None` means "never", which
/// is infinitely long ago.
pub fn secs_since(since: Option<NaiveDateTime>, now: NaiveDateTime) -> f64 {
    since.map_or(f64::INFINITY, |t| secs_between(t, now))
}

/// Longest span a configured duration may cover: one hundred years.
pub const MAX_SPAN_SECS: f64 = 100.0 * 365.0 * 86_400.0;

/// Clamped to `MAX_SPAN_SECS` either way; NaN is zero.
pub fn duration_from_secs(secs: f64) -> Duration {
    let secs = if secs.is_nan() {
        0.0
    } else {
        secs.clamp(-MAX_SPAN_SECS, MAX_SPAN_SECS)
    };
    Duration::microseconds((secs * 1_000_000.0).round() as i64)
}

/// `now` plus `secs`, saturating at the latest representable time.
pub fn deadline_after(now: NaiveDateTime, secs: f64) -> NaiveDateTime {
    now.checked_add_signed(duration_from_secs(secs))
        .unwrap_or(NaiveDateTime::MAX)
}
