//! Motion controller.
//!
//! Owns the agent origin and the motion state. Driven by `tick()` at the
//! configured rate; every change is returned as a `MotionEffect` for the
//! engine to turn into events and candidates.

use chrono::NaiveDateTime;
use rand::Rng;

use super::docking::{nearest_edge, push_back, snap_origin};
use super::{DockEdge, MotionState};
use crate::awareness::pick;
use crate::clock::secs_since;
use crate::geometry::{active_display, Display, Point, Rect, Size};
use crate::notification::{NotificationCandidate, NotificationKind};
use crate::storage::MotionConfig;

const HIDING_QUOTES: &[&str] = &[
    "Can't see me~",
    "I'll hide over here for a bit.",
    "Peekaboo!",
];

const FOUND_QUOTES: &[&str] = &[
    "You found me!",
    "Aww, caught already?",
    "Okay okay, I'm out.",
];

const WANDER_QUOTES: &[&str] = &[
    "Just taking a stroll~",
    "I'm on patrol!",
    "Nice view from over here.",
];

#[derive(Debug, Clone, PartialEq)]
pub enum MotionEffect {
    StateChanged { from: MotionState, to: MotionState },
    Docked { edge: DockEdge },
    Undocked { edge: DockEdge },
    Moved { origin: Point },
    Quip(NotificationCandidate),
}

/// Random walk target (agent center) inside `visible` shrunk by `margin`.
pub fn pick_walk_target<R: Rng + ?Sized>(visible: &Rect, margin: f64, rng: &mut R) -> Option<Point> {
    let area = visible.inset(margin)?;
    let low = Point::new(area.min_x(), area.min_y());
    let high = Point::new(area.max_x(), area.max_y());
    if !(low.is_finite() && high.is_finite()) {
        return None;
    }
    Some(Point::new(
        rng.gen_range(low.x..=high.x),
        rng.gen_range(low.y..=high.y),
    ))
}

#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    origin: Point,
    display_id: Option<u32>,
    state: MotionState,
    edge: DockEdge,
    walk_target: Option<Point>,
    last_walk_at: Option<NaiveDateTime>,
    interacting: bool,
    degenerate_reported: bool,
}

impl MotionController {
    pub fn new(config: MotionConfig, origin: Point) -> Self {
        Self {
            config,
            origin,
            display_id: None,
            state: MotionState::Idle,
            edge: DockEdge::None,
            walk_target: None,
            last_walk_at: None,
            interacting: false,
            degenerate_reported: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn edge(&self) -> DockEdge {
        self.edge
    }

    pub fn is_docked(&self) -> bool {
        self.state == MotionState::Docked
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn display_id(&self) -> Option<u32> {
        self.display_id
    }

    pub fn walk_target(&self) -> Option<Point> {
        self.walk_target
    }

    pub fn last_walk_at(&self) -> Option<NaiveDateTime> {
        self.last_walk_at
    }

    pub fn size(&self) -> Size {
        Size::new(self.config.agent_width, self.config.agent_height)
    }

    pub fn center(&self) -> Point {
        let size = self.size();
        Point::new(
            self.origin.x + size.width / 2.0,
            self.origin.y + size.height / 2.0,
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move the agent without any state change.
    pub fn place(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Buttons are showing. Docking keeps precedence.
    pub fn begin_interaction(&mut self) -> Option<MotionEffect> {
        self.interacting = true;
        if self.is_docked() {
            return None;
        }
        self.walk_target = None;
        self.set_state(MotionState::Interacting)
    }

    pub fn end_interaction(&mut self) -> Option<MotionEffect> {
        self.interacting = false;
        if self.state == MotionState::Interacting {
            self.set_state(MotionState::Idle)
        } else {
            None
        }
    }

    /// Stop walking before the tick loop is suspended. Docking is kept.
    pub fn suspend(&mut self) -> Option<MotionEffect> {
        if self.state == MotionState::Walking {
            self.walk_target = None;
            self.set_state(MotionState::Idle)
        } else {
            None
        }
    }

    fn set_state(&mut self, to: MotionState) -> Option<MotionEffect> {
        let from = self.state;
        if from == to {
            return None;
        }
        tracing::debug!(?from, ?to, "motion state changed");
        self.state = to;
        Some(MotionEffect::StateChanged { from, to })
    }

    fn move_to(&mut self, origin: Point, effects: &mut Vec<MotionEffect>) {
        if origin != self.origin {
            self.origin = origin;
            effects.push(MotionEffect::Moved { origin });
        }
    }

    fn quip<R: Rng + ?Sized>(pool: &[&str], rng: &mut R) -> MotionEffect {
        MotionEffect::Quip(NotificationCandidate::normal(
            pick(pool, rng),
            NotificationKind::Fun,
        ))
    }

    /// One controller step.
    ///
    /// `drag` is the origin reported by an ongoing press-and-drag. `wander`
    /// enables random walks; turning it off mid-walk stops the walk.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: NaiveDateTime,
        displays: &[Display],
        drag: Option<Point>,
        wander: bool,
        rng: &mut R,
    ) -> Vec<MotionEffect> {
        let mut effects = Vec::new();

        let dragging = drag.is_some();
        if let Some(p) = drag.filter(|p| p.is_finite()) {
            self.move_to(p, &mut effects);
        }
        if dragging && self.state == MotionState::Walking {
            // The walk cooldown is left alone.
            self.walk_target = None;
            effects.extend(self.set_state(MotionState::Idle));
        }

        let display = active_display(displays, self.center()).cloned();
        if let Some(d) = &display {
            self.display_id = Some(d.id);
        }

        let edge = match &display {
            Some(d) if d.is_degenerate() => {
                if !self.degenerate_reported {
                    tracing::warn!(display = d.id, "display has no area, skipping docking");
                    self.degenerate_reported = true;
                }
                DockEdge::None
            }
            Some(d) => {
                self.degenerate_reported = false;
                nearest_edge(d, self.center(), self.config.dock_threshold)
            }
            None => DockEdge::None,
        };
        self.apply_edge(edge, rng, &mut effects);

        let Some(display) = display else {
            return effects;
        };
        if display.is_degenerate() {
            return effects;
        }

        if dragging {
            let recovered = push_back(
                &display,
                self.origin,
                self.size(),
                self.config.recovery_inset,
            );
            if let Some(origin) = recovered {
                self.move_to(origin, &mut effects);
            }
            return effects;
        }

        match self.state {
            MotionState::Docked => {
                let target =
                    snap_origin(&display, self.edge, self.origin, self.size(), &self.config);
                if target.distance_to(self.origin) > 1.0 {
                    self.move_to(target, &mut effects);
                }
            }
            MotionState::Walking if !wander => {
                self.walk_target = None;
                effects.extend(self.set_state(MotionState::Idle));
            }
            MotionState::Walking => self.step_walk(now, rng, &mut effects),
            MotionState::Idle => {
                if wander
                    && secs_since(self.last_walk_at, now) > self.config.walk_cooldown_secs
                    && rng.gen::<f64>() < self.config.walk_probability
                {
                    if let Some(target) =
                        pick_walk_target(&display.visible, self.config.walk_margin, rng)
                    {
                        self.walk_target = Some(target);
                        effects.extend(self.set_state(MotionState::Walking));
                    }
                }
            }
            MotionState::Interacting => {}
        }

        effects
    }

    fn apply_edge<R: Rng + ?Sized>(
        &mut self,
        edge: DockEdge,
        rng: &mut R,
        effects: &mut Vec<MotionEffect>,
    ) {
        let previous = self.edge;
        if edge == previous {
            return;
        }
        self.edge = edge;
        match (previous.is_none(), edge.is_none()) {
            (true, false) => {
                self.walk_target = None;
                effects.extend(self.set_state(MotionState::Docked));
                effects.push(MotionEffect::Docked { edge });
                effects.push(Self::quip(HIDING_QUOTES, rng));
            }
            (false, true) => {
                let next = if self.interacting {
                    MotionState::Interacting
                } else {
                    MotionState::Idle
                };
                effects.extend(self.set_state(next));
                effects.push(MotionEffect::Undocked { edge: previous });
                effects.push(Self::quip(FOUND_QUOTES, rng));
            }
            // Slid from one edge straight to another.
            _ => effects.push(MotionEffect::Docked { edge }),
        }
    }

    fn step_walk<R: Rng + ?Sized>(
        &mut self,
        now: NaiveDateTime,
        rng: &mut R,
        effects: &mut Vec<MotionEffect>,
    ) {
        let Some(target) = self.walk_target else {
            effects.extend(self.set_state(MotionState::Idle));
            return;
        };
        let center = self.center();
        let distance = center.distance_to(target);
        if distance > 0.0 {
            let step = self.config.step.min(distance);
            let dx = (target.x - center.x) / distance * step;
            let dy = (target.y - center.y) / distance * step;
            self.move_to(Point::new(self.origin.x + dx, self.origin.y + dy), effects);
        }

        if self.center().distance_to(target) < self.config.arrival_distance {
            self.walk_target = None;
            self.last_walk_at = Some(now);
            effects.extend(self.set_state(MotionState::Idle));
            if rng.gen::<f64>() < self.config.wander_quip_probability {
                effects.push(Self::quip(WANDER_QUOTES, rng));
            }
        }
    }
}
