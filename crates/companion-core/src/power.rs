//! Power coordinator.
//!
//! Folds display, screen-lock and system sleep notifications (plus the
//! polled idle flags of the signal source) into one idle boolean. The engine
//! suspends everything while it is set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerEvent {
    SystemWillSleep,
    /// Clears system sleep and display sleep together.
    SystemDidWake,
    DisplaySlept,
    DisplayWoke,
    ScreenLocked,
    ScreenUnlocked,
    /// Test harness: force idle.
    SimulateIdle,
    /// Test harness: clear every condition, including system sleep.
    SimulationFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    Active,
    Idle,
    /// Implies idle.
    SystemSleeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    EnteredIdle,
    ExitedIdle,
}

#[derive(Debug, Clone, Default)]
pub struct PowerCoordinator {
    system_sleeping: bool,
    display_sleeping: bool,
    screen_locked: bool,
    simulated_idle: bool,
    reported_idle: bool,
    /// Last polled system-sleep flag, for edge detection.
    polled_sleeping: bool,
    idle: bool,
}

impl PowerCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn is_system_sleeping(&self) -> bool {
        self.system_sleeping
    }

    pub fn state(&self) -> PowerState {
        if self.system_sleeping {
            PowerState::SystemSleeping
        } else if self.idle {
            PowerState::Idle
        } else {
            PowerState::Active
        }
    }

    /// Apply a platform notification.
    ///
    /// Unlocking the screen or waking the display only clears its own
    /// condition, so neither can end idle while the system is still asleep.
    pub fn handle(&mut self, event: PowerEvent) -> Option<PowerTransition> {
        match event {
            PowerEvent::SystemWillSleep => self.system_sleeping = true,
            PowerEvent::SystemDidWake => {
                self.system_sleeping = false;
                self.display_sleeping = false;
            }
            PowerEvent::DisplaySlept => self.display_sleeping = true,
            PowerEvent::DisplayWoke => self.display_sleeping = false,
            PowerEvent::ScreenLocked => self.screen_locked = true,
            PowerEvent::ScreenUnlocked => self.screen_locked = false,
            PowerEvent::SimulateIdle => self.simulated_idle = true,
            PowerEvent::SimulationFinished => {
                self.system_sleeping = false;
                self.display_sleeping = false;
                self.screen_locked = false;
                self.simulated_idle = false;
                self.reported_idle = false;
            }
        }
        self.settle()
    }

    /// Fold in the flags polled from the signal source.
    ///
    /// The polled sleep flag is edge-triggered so a stale `false` reading
    /// cannot cancel a `SystemWillSleep` notification.
    pub fn sync(&mut self, idle: bool, system_sleeping: bool) -> Option<PowerTransition> {
        self.reported_idle = idle;
        if system_sleeping != self.polled_sleeping {
            self.polled_sleeping = system_sleeping;
            self.system_sleeping = system_sleeping;
        }
        self.settle()
    }

    fn settle(&mut self) -> Option<PowerTransition> {
        let idle = self.system_sleeping
            || self.display_sleeping
            || self.screen_locked
            || self.simulated_idle
            || self.reported_idle;
        if idle == self.idle {
            return None;
        }
        self.idle = idle;
        Some(if idle {
            PowerTransition::EnteredIdle
        } else {
            PowerTransition::ExitedIdle
        })
    }
}
