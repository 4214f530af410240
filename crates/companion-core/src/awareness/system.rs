use chrono::NaiveDateTime;
use rand::Rng;

use super::load::{LoadClassifier, LoadLevel};
use super::pick;
use crate::notification::{NotificationCandidate, NotificationKind};
use crate::storage::LoadConfig;

const LOW_QUOTES: &[&str] = &[
    "The computer finally cooled down, nice~",
    "Phew, it was getting hot in here. Much better now.",
    "Nice and quiet. Perfect for daydreaming~",
];

const MEDIUM_QUOTES: &[&str] = &[
    "The workload is picking up, you got this!",
    "Getting a little warm in here...",
    "I'm working hard right alongside you.",
];

const HIGH_QUOTES: &[&str] = &[
    "Whoa! The computer is about to explode, take a break!",
    "So hot! Are you running a simulation?",
    "My halo just turned red, calm down!",
];

/// Turns stable load transitions into Normal `system` candidates.
#[derive(Debug, Clone)]
pub struct SystemLoadEvaluator {
    classifier: LoadClassifier,
    level: Option<LoadLevel>,
    raised: Option<LoadLevel>,
}

impl SystemLoadEvaluator {
    pub fn new(config: LoadConfig) -> Self {
        Self {
            classifier: LoadClassifier::new(config),
            level: None,
            raised: None,
        }
    }

    /// Level of the most recent sample, `None` before the first one.
    pub fn level(&self) -> Option<LoadLevel> {
        self.level
    }

    pub fn classifier(&self) -> &LoadClassifier {
        &self.classifier
    }

    pub fn restart_stability(&mut self, now: NaiveDateTime) {
        self.classifier.restart_stability(now);
    }

    /// The candidate from the last `evaluate` was shown. Returns the level
    /// it announced.
    pub fn confirm(&mut self, now: NaiveDateTime) -> Option<LoadLevel> {
        let level = self.raised.take()?;
        self.classifier.confirm(level, now);
        Some(level)
    }

    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        load: Option<f64>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Option<NotificationCandidate> {
        self.raised = None;
        let pct = load.filter(|p| p.is_finite())?;
        let reading = self.classifier.observe(pct, now);
        self.level = Some(reading.level);
        if !reading.just_stabilized {
            return None;
        }
        self.raised = Some(reading.level);
        let pool = match reading.level {
            LoadLevel::Low => LOW_QUOTES,
            LoadLevel::Medium => MEDIUM_QUOTES,
            LoadLevel::High => HIGH_QUOTES,
        };
        Some(NotificationCandidate::normal(
            pick(pool, rng),
            NotificationKind::System,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::duration_from_secs;
    use crate::notification::Priority;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn at(secs: f64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + duration_from_secs(secs)
    }

    #[test]
    fn missing_sample_raises_nothing() {
        let mut e = SystemLoadEvaluator::new(LoadConfig::default());
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        for t in 0..20 {
            assert!(e.evaluate(None, at(t as f64), &mut rng).is_none());
        }
        assert!(e.level().is_none());
        assert!(e.evaluate(Some(f64::NAN), at(21.0), &mut rng).is_none());
    }

    #[test]
    fn high_load_raises_from_high_pool() {
        let mut e = SystemLoadEvaluator::new(LoadConfig::default());
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        let mut raised = Vec::new();
        for t in 0..10 {
            if let Some(c) = e.evaluate(Some(90.0), at(t as f64), &mut rng) {
                raised.push((t, c));
            }
        }
        assert_eq!(raised.len(), 1);
        let (t, c) = &raised[0];
        assert_eq!(*t, 4);
        assert_eq!(c.priority, Priority::Normal);
        assert_eq!(c.kind, NotificationKind::System);
        assert!(HIGH_QUOTES.contains(&c.text.as_str()));
        assert_eq!(e.level(), Some(LoadLevel::High));
    }

    #[test]
    fn only_confirmed_levels_count_as_notified() {
        let mut e = SystemLoadEvaluator::new(LoadConfig::default());
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        for t in 0..4 {
            e.evaluate(Some(90.0), at(t as f64), &mut rng);
        }
        assert!(e.evaluate(Some(90.0), at(4.0), &mut rng).is_some());
        assert_eq!(e.classifier().last_notified(), LoadLevel::Low);

        // Shown on the retry.
        assert!(e.evaluate(Some(90.0), at(9.0), &mut rng).is_some());
        assert_eq!(e.confirm(at(9.0)), Some(LoadLevel::High));
        assert_eq!(e.classifier().last_notified(), LoadLevel::High);
        assert_eq!(e.confirm(at(9.0)), None);
        assert!(e.evaluate(Some(90.0), at(20.0), &mut rng).is_none());
    }
}
