//! Notification arbiter.
//!
//! The single gate every candidate passes through. Each type tag has its own
//! cooldown window whose length depends on the candidate's priority and is
//! stretched while the agent is docked. The cooldown table is written only
//! when a candidate is accepted.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::candidate::{NotificationCandidate, NotificationKind, Priority};
use crate::clock::secs_since;
use crate::storage::CooldownConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Same type accepted too recently.
    Cooldown { remaining_secs: f64 },
    /// The engine is idle; nothing is shown and no cooldown is written.
    Suspended,
}

#[derive(Debug, Clone)]
pub struct Arbiter {
    config: CooldownConfig,
    last_accepted: HashMap<NotificationKind, NaiveDateTime>,
}

impl Arbiter {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            config,
            last_accepted: HashMap::new(),
        }
    }

    /// Cooldown in seconds for a priority, including the docked penalty.
    pub fn effective_cooldown_secs(&self, priority: Priority, docked: bool) -> f64 {
        match priority {
            Priority::Critical => self.config.critical_secs,
            Priority::Important if docked => {
                self.config.important_secs * self.config.docked_important_multiplier
            }
            Priority::Important => self.config.important_secs,
            Priority::Normal if docked => {
                self.config.normal_secs * self.config.docked_normal_multiplier
            }
            Priority::Normal => self.config.normal_secs,
        }
    }

    /// Decide without side effects.
    pub fn check(
        &self,
        candidate: &NotificationCandidate,
        now: NaiveDateTime,
        docked: bool,
    ) -> Result<(), Rejection> {
        if candidate.kind == NotificationKind::Power {
            return Ok(());
        }
        let cooldown = self.effective_cooldown_secs(candidate.priority, docked);
        // A type never accepted before reads as infinitely long ago.
        let elapsed = secs_since(self.last_accepted.get(&candidate.kind).copied(), now);
        if elapsed < cooldown {
            return Err(Rejection::Cooldown {
                remaining_secs: cooldown - elapsed,
            });
        }
        Ok(())
    }

    /// Decide and, on acceptance, stamp the candidate's type.
    pub fn submit(
        &mut self,
        candidate: &NotificationCandidate,
        now: NaiveDateTime,
        docked: bool,
    ) -> Result<(), Rejection> {
        self.check(candidate, now, docked)?;
        self.last_accepted.insert(candidate.kind, now);
        Ok(())
    }

    pub fn last_accepted(&self, kind: NotificationKind) -> Option<NaiveDateTime> {
        self.last_accepted.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::duration_from_secs;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn at(secs: f64) -> NaiveDateTime {
        t0() + duration_from_secs(secs)
    }

    fn candidate(priority: Priority, kind: NotificationKind) -> NotificationCandidate {
        NotificationCandidate::new("hello", priority, kind)
    }

    #[test]
    fn unseen_type_is_accepted() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        assert!(arbiter
            .submit(&candidate(Priority::Normal, NotificationKind::Fun), t0(), false)
            .is_ok());
        assert_eq!(arbiter.last_accepted(NotificationKind::Fun), Some(t0()));
    }

    #[test]
    fn normal_cooldown_boundary() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        let c = candidate(Priority::Normal, NotificationKind::System);
        arbiter.submit(&c, at(0.0), false).unwrap();
        assert!(arbiter.submit(&c, at(599.9), false).is_err());
        assert!(arbiter.submit(&c, at(600.0), false).is_ok());
    }

    #[test]
    fn docked_important_is_tripled() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        let c = candidate(Priority::Important, NotificationKind::Weather);
        arbiter.submit(&c, at(0.0), true).unwrap();
        assert!(matches!(
            arbiter.submit(&c, at(899.9), true),
            Err(Rejection::Cooldown { .. })
        ));
        assert!(arbiter.submit(&c, at(900.1), true).is_ok());
    }

    #[test]
    fn docked_normal_is_quintupled_and_critical_untouched() {
        let arbiter = Arbiter::new(CooldownConfig::default());
        assert_eq!(arbiter.effective_cooldown_secs(Priority::Normal, true), 3000.0);
        assert_eq!(arbiter.effective_cooldown_secs(Priority::Critical, true), 5.0);
        assert_eq!(arbiter.effective_cooldown_secs(Priority::Critical, false), 5.0);
    }

    #[test]
    fn power_bypasses_cooldown() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        let c = candidate(Priority::Critical, NotificationKind::Power);
        assert!(arbiter.submit(&c, at(0.0), false).is_ok());
        assert!(arbiter.submit(&c, at(0.01), true).is_ok());
        assert_eq!(arbiter.last_accepted(NotificationKind::Power), Some(at(0.01)));
    }

    #[test]
    fn rejection_leaves_table_untouched() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        let c = candidate(Priority::Critical, NotificationKind::Health);
        arbiter.submit(&c, at(0.0), false).unwrap();
        let err = arbiter.submit(&c, at(2.0), false).unwrap_err();
        assert_eq!(err, Rejection::Cooldown { remaining_secs: 3.0 });
        assert_eq!(arbiter.last_accepted(NotificationKind::Health), Some(at(0.0)));
    }

    #[test]
    fn cooldowns_are_per_type() {
        let mut arbiter = Arbiter::new(CooldownConfig::default());
        arbiter
            .submit(&candidate(Priority::Normal, NotificationKind::Fun), at(0.0), false)
            .unwrap();
        assert!(arbiter
            .submit(&candidate(Priority::Normal, NotificationKind::System), at(1.0), false)
            .is_ok());
    }

    proptest! {
        #[test]
        fn accepts_iff_cooldown_elapsed(
            gap in 0.0f64..4000.0,
            docked in any::<bool>(),
            priority in prop_oneof![
                Just(Priority::Critical),
                Just(Priority::Important),
                Just(Priority::Normal),
            ],
        ) {
            let mut arbiter = Arbiter::new(CooldownConfig::default());
            let c = candidate(priority, NotificationKind::Interaction);
            arbiter.submit(&c, at(0.0), docked).unwrap();
            let cooldown = arbiter.effective_cooldown_secs(priority, docked);
            // Stay clear of the microsecond rounding at the boundary.
            prop_assume!((gap - cooldown).abs() > 0.001);
            let accepted = arbiter.submit(&c, at(gap), docked).is_ok();
            prop_assert_eq!(accepted, gap >= cooldown);
        }
    }
}
