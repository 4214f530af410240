//! Load classifier.
//!
//! Maps a processor load percentage to a three-level category and filters
//! out flapping: a level has to hold for the stability window before it is
//! reported, and two reports are always separated by the minimum gap.
//!
//! A report only counts once the caller confirms it was delivered. Until
//! then the level stays eligible and is offered again after another gap.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::secs_since;
use crate::storage::LoadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReading {
    /// Level of the latest sample.
    pub level: LoadLevel,
    /// True exactly when this sample made `level` eligible for a notification.
    pub just_stabilized: bool,
}

#[derive(Debug, Clone)]
pub struct LoadClassifier {
    config: LoadConfig,
    pending: LoadLevel,
    /// `None` means the pending level has held since before tracking began.
    stable_since: Option<NaiveDateTime>,
    last_notified: LoadLevel,
    last_notified_at: Option<NaiveDateTime>,
    last_raised_at: Option<NaiveDateTime>,
}

impl LoadClassifier {
    /// Start at `Low`, with `Low` counted as already notified.
    pub fn new(config: LoadConfig) -> Self {
        Self {
            config,
            pending: LoadLevel::Low,
            stable_since: None,
            last_notified: LoadLevel::Low,
            last_notified_at: None,
            last_raised_at: None,
        }
    }

    pub fn classify(&self, percentage: f64) -> LoadLevel {
        if percentage < self.config.low_below {
            LoadLevel::Low
        } else if percentage < self.config.medium_below {
            LoadLevel::Medium
        } else {
            LoadLevel::High
        }
    }

    pub fn observe(&mut self, percentage: f64, now: NaiveDateTime) -> LoadReading {
        let level = self.classify(percentage.clamp(0.0, 100.0));

        if level != self.pending {
            self.pending = level;
            self.stable_since = Some(now);
        }

        let gap = self.config.min_gap_secs;
        let eligible = level != self.last_notified
            && secs_since(self.stable_since, now) >= self.config.stability_secs
            && secs_since(self.last_notified_at, now) >= gap
            && secs_since(self.last_raised_at, now) >= gap;

        if eligible {
            self.last_raised_at = Some(now);
        }

        LoadReading {
            level,
            just_stabilized: eligible,
        }
    }

    /// Record that `level` was actually delivered at `now`.
    pub fn confirm(&mut self, level: LoadLevel, now: NaiveDateTime) {
        self.last_notified = level;
        self.last_notified_at = Some(now);
    }

    /// Start the stability window over at `now`. Called when the engine
    /// resumes from idle so time spent suspended earns no credit.
    pub fn restart_stability(&mut self, now: NaiveDateTime) {
        self.stable_since = Some(now);
    }

    pub fn pending(&self) -> LoadLevel {
        self.pending
    }

    pub fn last_notified(&self) -> LoadLevel {
        self.last_notified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::duration_from_secs;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(secs: f64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + duration_from_secs(secs)
    }

    #[test]
    fn breakpoints() {
        let c = LoadClassifier::new(LoadConfig::default());
        assert_eq!(c.classify(0.0), LoadLevel::Low);
        assert_eq!(c.classify(14.9), LoadLevel::Low);
        assert_eq!(c.classify(15.0), LoadLevel::Medium);
        assert_eq!(c.classify(49.9), LoadLevel::Medium);
        assert_eq!(c.classify(50.0), LoadLevel::High);
        assert_eq!(c.classify(100.0), LoadLevel::High);
    }

    #[test]
    fn spike_to_high_reports_after_four_seconds() {
        let mut c = LoadClassifier::new(LoadConfig::default());
        let samples = [5.0, 5.0, 5.0, 5.0, 60.0, 60.0, 60.0, 60.0, 60.0];
        let mut fired = Vec::new();
        for (t, pct) in samples.iter().enumerate() {
            let r = c.observe(*pct, at(t as f64));
            if r.just_stabilized {
                c.confirm(r.level, at(t as f64));
                fired.push(t);
            }
        }
        assert_eq!(fired, vec![8]);
        assert_eq!(c.last_notified(), LoadLevel::High);
    }

    #[test]
    fn transient_spike_is_ignored() {
        let mut c = LoadClassifier::new(LoadConfig::default());
        for t in 0..3 {
            assert!(!c.observe(80.0, at(t as f64)).just_stabilized);
        }
        for t in 3..20 {
            assert!(!c.observe(5.0, at(t as f64)).just_stabilized);
        }
    }

    #[test]
    fn same_level_is_reported_once_per_entry() {
        let mut c = LoadClassifier::new(LoadConfig::default());
        let mut count = 0;
        for t in 0..30 {
            let r = c.observe(30.0, at(t as f64));
            if r.just_stabilized {
                c.confirm(r.level, at(t as f64));
                count += 1;
            }
        }
        assert_eq!(count, 1);

        // Leave and come back: eligible again.
        let mut again = false;
        for t in 30..50 {
            let pct = if t < 40 { 5.0 } else { 30.0 };
            let r = c.observe(pct, at(t as f64));
            if r.just_stabilized {
                c.confirm(r.level, at(t as f64));
                again = r.level == LoadLevel::Medium;
            }
        }
        assert!(again);
    }

    #[test]
    fn min_gap_separates_reports() {
        let config = LoadConfig {
            stability_secs: 0.0,
            min_gap_secs: 5.0,
            ..LoadConfig::default()
        };
        let mut c = LoadClassifier::new(config);
        assert!(c.observe(30.0, at(0.0)).just_stabilized);
        c.confirm(LoadLevel::Medium, at(0.0));
        assert!(!c.observe(80.0, at(1.0)).just_stabilized);
        assert!(!c.observe(80.0, at(4.9)).just_stabilized);
        assert!(c.observe(80.0, at(5.0)).just_stabilized);
    }

    #[test]
    fn restart_denies_credit_for_suspended_time() {
        let mut c = LoadClassifier::new(LoadConfig::default());
        c.observe(60.0, at(8.0));
        // Suspended from t=10 to t=1000.
        c.restart_stability(at(1000.0));
        assert!(!c.observe(60.0, at(1000.0)).just_stabilized);
        assert!(!c.observe(60.0, at(1003.9)).just_stabilized);
        assert!(c.observe(60.0, at(1004.0)).just_stabilized);
    }

    #[test]
    fn undelivered_level_is_offered_again() {
        let mut c = LoadClassifier::new(LoadConfig::default());
        for t in 0..4 {
            c.observe(60.0, at(t as f64));
        }
        let r = c.observe(60.0, at(4.0));
        assert!(r.just_stabilized);
        c.confirm(LoadLevel::High, at(4.0));

        // Low becomes eligible at 13 but is never confirmed.
        let raised: Vec<u32> = (9..40)
            .filter(|t| c.observe(5.0, at(*t as f64)).just_stabilized)
            .collect();
        assert_eq!(raised, vec![13, 18, 23, 28, 33, 38]);
        assert_eq!(c.last_notified(), LoadLevel::High);

        c.confirm(LoadLevel::Low, at(38.0));
        assert!((40..100).all(|t| !c.observe(5.0, at(t as f64)).just_stabilized));
    }

    proptest! {
        #[test]
        fn reports_are_spaced_and_never_repeat_a_delivered_level(
            samples in proptest::collection::vec((0.0f64..100.0, any::<bool>()), 1..200)
        ) {
            let mut c = LoadClassifier::new(LoadConfig::default());
            let mut last: Option<f64> = None;
            let mut delivered = LoadLevel::Low;
            for (i, (pct, accept)) in samples.iter().enumerate() {
                let t = i as f64 * 0.5;
                let r = c.observe(*pct, at(t));
                if r.just_stabilized {
                    prop_assert_ne!(r.level, delivered);
                    if let Some(prev_t) = last {
                        prop_assert!(t - prev_t >= 4.0);
                    }
                    last = Some(t);
                    if *accept {
                        c.confirm(r.level, at(t));
                        delivered = r.level;
                    }
                }
            }
        }
    }
}
