//! The engine wires every component to one coordination context.
//!
//! There are no threads and no callbacks: the caller invokes `tick()` at the
//! configured rate (see [`EngineConfig::tick_interval_secs`]) and forwards
//! power notifications and button presses as they arrive. Every entry point
//! records what happened as [`Event`]s, drained by `tick()` or
//! [`Engine::take_events`].
//!
//! ## Tick order
//!
//! ```text
//! power sync -> (stop if idle) -> motion -> load -> intent -> due timers
//! ```

use chrono::NaiveDateTime;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use crate::awareness::{
    pick, reminder_reply, HealthEvaluator, IntentEvaluator, SystemLoadEvaluator,
    WeatherEvaluator, ACKNOWLEDGE_REPLY,
};
use crate::clock::{deadline_after, Clock};
use crate::events::Event;
use crate::geometry::Point;
use crate::motion::{DockEdge, MotionController, MotionEffect, MotionState};
use crate::notification::{
    ActionKind, Arbiter, MessageBoard, NotificationCandidate, NotificationKind, PresentationSink,
    Priority, Rejection,
};
use crate::power::{PowerCoordinator, PowerEvent, PowerState, PowerTransition};
use crate::signals::{ActivityKind, SignalSource};
use crate::storage::EngineConfig;
use crate::timers::{TimerId, TimerSet};

const WAKE_QUOTES: &[&str] = &[
    "I'm back! Did you miss me?",
    "Yawn... what a nice nap.",
    "Welcome back! Let's keep going.",
];

pub struct Engine<S, P, C>
where
    S: SignalSource,
    P: PresentationSink,
    C: Clock,
{
    config: EngineConfig,
    signals: S,
    sink: P,
    clock: C,
    rng: Mcg128Xsl64,
    arbiter: Arbiter,
    board: MessageBoard,
    motion: MotionController,
    power: PowerCoordinator,
    system: SystemLoadEvaluator,
    intent: IntentEvaluator,
    health: HealthEvaluator,
    weather: WeatherEvaluator,
    timers: TimerSet,
    pending: Vec<Event>,
}

impl<S, P, C> Engine<S, P, C>
where
    S: SignalSource,
    P: PresentationSink,
    C: Clock,
{
    /// Build an engine. The agent starts centered on the first display's
    /// visible area (or at the origin when no display is known yet).
    pub fn new(config: EngineConfig, signals: S, sink: P, clock: C) -> Self {
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        let origin = signals
            .displays()
            .first()
            .map(|d| {
                let c = d.visible.center();
                Point::new(
                    c.x - config.motion.agent_width / 2.0,
                    c.y - config.motion.agent_height / 2.0,
                )
            })
            .unwrap_or_default();

        let mut timers = TimerSet::new();
        timers.schedule(
            TimerId::AwarenessSweep,
            deadline_after(clock.now(), config.awareness_sweep_secs),
        );

        Self {
            arbiter: Arbiter::new(config.cooldown.clone()),
            board: MessageBoard::new(config.presentation.clone()),
            motion: MotionController::new(config.motion.clone(), origin),
            power: PowerCoordinator::new(),
            system: SystemLoadEvaluator::new(config.load.clone()),
            intent: IntentEvaluator::new(config.intent.clone()),
            health: HealthEvaluator::new(config.health.clone()),
            weather: WeatherEvaluator::new(config.weather.clone()),
            timers,
            pending: Vec::new(),
            rng,
            config,
            signals,
            sink,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn signals(&self) -> &S {
        &self.signals
    }

    /// Platform glue writes fresh samples through here.
    pub fn signals_mut(&mut self) -> &mut S {
        &mut self.signals
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion.state()
    }

    pub fn dock_edge(&self) -> DockEdge {
        self.motion.edge()
    }

    pub fn position(&self) -> Point {
        self.motion.origin()
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn is_idle(&self) -> bool {
        self.power.is_idle()
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn board(&self) -> &MessageBoard {
        &self.board
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// Drain events recorded outside `tick()`.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the engine to the clock's current time.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();

        let transition = self
            .power
            .sync(self.signals.is_idle(), self.signals.is_system_sleeping());
        if let Some(t) = transition {
            self.apply_power(t, now);
        }
        if self.power.is_idle() {
            return self.take_events();
        }

        let drag = self.signals.drag_position();
        let displays = self.signals.displays();
        let effects = self.motion.tick(
            now,
            &displays,
            drag,
            self.config.features.self_awareness,
            &mut self.rng,
        );
        self.apply_motion(effects, now);

        // Awareness waits while the user is dragging the agent around.
        if drag.is_none() {
            self.poll_awareness(now);
        }

        for id in self.timers.take_due(now) {
            self.fire(id, now);
        }

        self.take_events()
    }

    /// Offer a candidate to the arbiter. Returns whether it was shown.
    pub fn submit(&mut self, candidate: NotificationCandidate) -> bool {
        let now = self.clock.now();
        self.offer(candidate, now)
    }

    /// Feed a platform power notification.
    pub fn handle_power_event(&mut self, event: PowerEvent) -> Option<PowerTransition> {
        let now = self.clock.now();
        let transition = self.power.handle(event);
        if let Some(t) = transition {
            self.apply_power(t, now);
        }
        transition
    }

    /// A message button was pressed. Runs the action, dismisses the
    /// message and shows the reply. Unknown ids do nothing.
    pub fn on_action(&mut self, action_id: &str) -> bool {
        let now = self.clock.now();
        let Some(action) = self.board.find_action(action_id).cloned() else {
            tracing::debug!(action_id, "no such action on screen");
            return false;
        };
        self.pending.push(Event::ActionInvoked {
            action_id: action.id.clone(),
            at: now,
        });

        let reply = match action.kind {
            ActionKind::RecordActivity { activity } => {
                self.signals.record_activity(activity);
                reminder_reply(&action.kind)
            }
            ActionKind::Defer { .. } => reminder_reply(&action.kind),
            ActionKind::AcknowledgeWeather { day } => {
                self.weather.acknowledge(day);
                Some(ACKNOWLEDGE_REPLY)
            }
        };

        self.dismiss_at(now);
        if let Some(text) = reply {
            let presentation = self.board.show_reply(text, now, self.motion.origin());
            self.sink.present(&presentation);
            self.timers.schedule(
                TimerId::MessageDismiss,
                deadline_after(now, presentation.duration_secs),
            );
            self.pending.push(Event::ReplyPresented {
                id: presentation.id,
                text: presentation.text,
                at: now,
            });
        }
        true
    }

    /// Force a health reminder through the arbiter.
    pub fn trigger_reminder(&mut self, activity: ActivityKind) -> bool {
        let candidate = self.health.reminder(activity);
        self.submit(candidate)
    }

    /// Hide the visible message. Returns whether one was visible.
    pub fn dismiss(&mut self) -> bool {
        let now = self.clock.now();
        self.dismiss_at(now)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn offer(&mut self, candidate: NotificationCandidate, now: NaiveDateTime) -> bool {
        let verdict = if self.power.is_idle() {
            Err(Rejection::Suspended)
        } else {
            self.arbiter
                .submit(&candidate, now, self.motion.is_docked())
        };

        if let Err(rejection) = verdict {
            tracing::debug!(kind = ?candidate.kind, ?rejection, "candidate rejected");
            self.pending.push(Event::NotificationRejected {
                kind: candidate.kind,
                priority: candidate.priority,
                rejection,
                at: now,
            });
            return false;
        }

        let presentation = self.board.show(&candidate, now, self.motion.origin());
        tracing::info!(kind = ?candidate.kind, text = %candidate.text, "notification accepted");
        self.sink.present(&presentation);
        self.timers.schedule(
            TimerId::MessageDismiss,
            deadline_after(now, presentation.duration_secs),
        );
        self.pending.push(Event::NotificationAccepted {
            id: presentation.id,
            kind: candidate.kind,
            priority: candidate.priority,
            text: candidate.text,
            at: now,
        });

        let effect = if self.board.has_actions() {
            self.motion.begin_interaction()
        } else {
            self.motion.end_interaction()
        };
        self.apply_motion(effect, now);
        true
    }

    fn dismiss_at(&mut self, now: NaiveDateTime) -> bool {
        let id = self.board.current_id();
        self.timers.cancel(TimerId::MessageDismiss);
        let effect = self.motion.end_interaction();
        let shown = match id {
            Some(id) if self.board.dismiss() => {
                self.sink.dismiss();
                self.pending.push(Event::MessageDismissed { id, at: now });
                true
            }
            _ => false,
        };
        self.apply_motion(effect, now);
        shown
    }

    fn apply_motion(&mut self, effects: impl IntoIterator<Item = MotionEffect>, now: NaiveDateTime) {
        for effect in effects {
            match effect {
                MotionEffect::StateChanged { from, to } => {
                    self.pending.push(Event::MotionChanged { from, to, at: now })
                }
                MotionEffect::Docked { edge } => self.pending.push(Event::Docked { edge, at: now }),
                MotionEffect::Undocked { edge } => {
                    self.pending.push(Event::Undocked { edge, at: now })
                }
                MotionEffect::Moved { origin } => {
                    self.pending.push(Event::AgentMoved { origin, at: now })
                }
                MotionEffect::Quip(candidate) => {
                    self.offer(candidate, now);
                }
            }
        }
    }

    fn poll_awareness(&mut self, now: NaiveDateTime) {
        if self.config.features.system_awareness {
            let load = self.signals.current_load();
            if let Some(candidate) = self.system.evaluate(load, now, &mut self.rng) {
                if self.offer(candidate, now) {
                    if let Some(level) = self.system.confirm(now) {
                        self.pending.push(Event::LoadLevelChanged { level, at: now });
                    }
                }
            }
        }
        if self.config.features.intent_awareness {
            let app = self.signals.active_application();
            let frequency = self.signals.input_frequency();
            if let Some(candidate) = self.intent.evaluate(app, frequency, now, &mut self.rng) {
                self.offer(candidate, now);
            }
        }
    }

    fn fire(&mut self, id: TimerId, now: NaiveDateTime) {
        match id {
            TimerId::AwarenessSweep => {
                if self.config.features.health_reminders {
                    let counters = self.signals.health_counters();
                    let frequency = self.signals.input_frequency();
                    if let Some(candidate) = self.health.evaluate(counters, frequency, now) {
                        if self.offer(candidate, now) {
                            self.health.confirm(now);
                        }
                    }
                }
                if self.config.features.weather_insights {
                    let snapshot = self.signals.latest_weather();
                    if let Some(candidate) = self.weather.evaluate(snapshot, now) {
                        self.offer(candidate, now);
                    }
                }
                self.schedule_sweep(now);
            }
            TimerId::MessageDismiss => {
                self.dismiss_at(now);
            }
            TimerId::WakeGreeting => {
                let text = pick(WAKE_QUOTES, &mut self.rng);
                self.offer(
                    NotificationCandidate::new(text, Priority::Critical, NotificationKind::Power),
                    now,
                );
            }
        }
    }

    fn schedule_sweep(&mut self, now: NaiveDateTime) {
        self.timers.schedule(
            TimerId::AwarenessSweep,
            deadline_after(now, self.config.awareness_sweep_secs),
        );
    }

    fn apply_power(&mut self, transition: PowerTransition, now: NaiveDateTime) {
        match transition {
            PowerTransition::EnteredIdle => {
                tracing::info!("entering idle, suspending timers");
                self.timers.cancel_all();
                let effect = self.motion.suspend();
                self.apply_motion(effect, now);
                self.dismiss_at(now);
                self.pending.push(Event::IdleEntered { at: now });
            }
            PowerTransition::ExitedIdle => {
                tracing::info!("leaving idle, resuming");
                // No credit for time spent suspended.
                self.system.restart_stability(now);
                self.intent.restart_quiet_stretch(now);
                self.schedule_sweep(now);
                let delay = self.wake_delay_secs();
                self.timers
                    .schedule(TimerId::WakeGreeting, deadline_after(now, delay));
                self.pending.push(Event::IdleExited { at: now });
            }
        }
    }

    fn wake_delay_secs(&mut self) -> f64 {
        let lo = self.config.power.wake_delay_min_secs;
        let hi = self.config.power.wake_delay_max_secs;
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::geometry::{Display, Rect};
    use crate::notification::RecordingSink;
    use crate::signals::SignalSnapshot;
    use chrono::NaiveDate;
    use std::rc::Rc;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn quiet_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.seed = Some(42);
        config.features.self_awareness = false;
        config.features.intent_awareness = false;
        config.features.health_reminders = false;
        config.features.weather_insights = false;
        config
    }

    fn engine(
        config: EngineConfig,
    ) -> (Engine<SignalSnapshot, RecordingSink, Rc<ManualClock>>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(t0()));
        let signals = SignalSnapshot::new()
            .with_display(Display::unobstructed(1, Rect::new(0.0, 0.0, 1920.0, 1080.0)));
        let engine = Engine::new(config, signals, RecordingSink::new(), Rc::clone(&clock));
        (engine, clock)
    }

    #[test]
    fn starts_centered_and_idle() {
        let (e, _) = engine(quiet_config());
        assert_eq!(e.position(), Point::new(900.0, 480.0));
        assert_eq!(e.motion_state(), MotionState::Idle);
        assert_eq!(e.power_state(), PowerState::Active);
        assert!(e.timers().is_armed(TimerId::AwarenessSweep));
    }

    #[test]
    fn accepted_message_auto_dismisses() {
        let (mut e, clock) = engine(quiet_config());
        assert!(e.submit(NotificationCandidate::normal("0123456789", NotificationKind::Fun)));
        assert_eq!(e.sink().texts(), vec!["0123456789"]);

        clock.advance_secs(2.4);
        e.tick();
        assert!(e.board().is_visible());
        clock.advance_secs(0.2);
        let events = e.tick();
        assert!(!e.board().is_visible());
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::MessageDismissed { .. })));
        assert_eq!(e.sink().dismiss_count(), 1);
    }

    #[test]
    fn rejected_candidate_is_reported() {
        let (mut e, _) = engine(quiet_config());
        assert!(e.submit(NotificationCandidate::normal("one", NotificationKind::Fun)));
        assert!(!e.submit(NotificationCandidate::normal("two", NotificationKind::Fun)));
        let events = e.take_events();
        assert!(events.iter().any(|ev| matches!(
            ev,
            Event::NotificationRejected {
                rejection: Rejection::Cooldown { .. },
                ..
            }
        )));
    }

    #[test]
    fn prompt_with_buttons_means_interacting() {
        let (mut e, _) = engine(quiet_config());
        assert!(e.trigger_reminder(ActivityKind::Stand));
        assert_eq!(e.motion_state(), MotionState::Interacting);
        assert!(e.dismiss());
        assert_eq!(e.motion_state(), MotionState::Idle);
        assert!(!e.dismiss());
    }

    #[test]
    fn idle_rejects_everything_including_power() {
        let (mut e, _) = engine(quiet_config());
        e.handle_power_event(PowerEvent::SimulateIdle);
        assert!(!e.submit(NotificationCandidate::new(
            "hi",
            Priority::Critical,
            NotificationKind::Power
        )));
        assert!(e.arbiter().last_accepted(NotificationKind::Power).is_none());
        assert!(e.timers().is_empty());
    }
}
