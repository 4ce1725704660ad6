//! counting — hysteresis repetition counters
//!
//! Turns a noisy per-frame joint angle into discrete repetition events. Every
//! counter uses two thresholds with a dead zone between them, so a signal
//! hovering around one cutoff cannot produce a burst of reps.
//!
//! Two shapes exist:
//!
//! * contraction counters fire on the edge into the contracted band and
//!   re-arm once the limb is released past the high threshold;
//! * phase counters walk a `Down`/`Up` stage and fire on one specific edge.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Thresholds ───────────────────────────────────────────────────────────────

/// Hysteresis pair in degrees. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Below this the joint is contracted / lowered.
    pub low: f32,
    /// Above this the joint is released / raised.
    pub high: f32,
}

impl Threshold {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

/// Stage of a two-phase exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Down,
    Up,
}

/// Which stage edge completes a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountEdge {
    /// Counted when re-entering `Down` after `Up` (leg raise).
    EnterDown,
    /// Counted when re-entering `Up` after `Down` (glute bridge).
    EnterUp,
}

// ── Pure transitions ─────────────────────────────────────────────────────────

/// One step of a contraction counter. Returns `(contracted, completed)`.
pub fn contraction_step(contracted: bool, angle: f32, threshold: Threshold) -> (bool, bool) {
    if angle < threshold.low && !contracted {
        return (true, true);
    }
    if angle > threshold.high {
        return (false, false);
    }
    (contracted, false)
}

/// One step of a phase counter. Returns `(stage, completed)`.
///
/// Above `high` a `Down` stage rises to `Up`; any other stage is kept, so an
/// unset stage stays unset until the joint has been lowered once. Below `low`
/// the stage always becomes `Down`.
pub fn phase_step(
    stage: Option<Stage>,
    angle: f32,
    threshold: Threshold,
    edge: CountEdge,
) -> (Option<Stage>, bool) {
    if angle > threshold.high {
        if stage == Some(Stage::Down) {
            return (Some(Stage::Up), edge == CountEdge::EnterUp);
        }
        return (stage, false);
    }
    if angle < threshold.low {
        let completed = stage == Some(Stage::Up) && edge == CountEdge::EnterDown;
        return (Some(Stage::Down), completed);
    }
    (stage, false)
}

// ── RepCounter ───────────────────────────────────────────────────────────────

/// Result of feeding one angle into a counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<S> {
    pub state: S,
    pub completed: bool,
}

/// Capability shared by every counter shape.
pub trait RepCounter {
    type State: Copy + PartialEq + std::fmt::Debug;

    /// Feed the angle measured on this frame.
    fn update(&mut self, angle: f32) -> Transition<Self::State>;

    /// Completed repetitions so far. Never decreases.
    fn reps(&self) -> u32;

    fn state(&self) -> Self::State;
}

/// Counts on the edge into the contracted band (knee raise, butt kick).
#[derive(Debug, Clone)]
pub struct ContractionCounter {
    threshold: Threshold,
    contracted: bool,
    reps: u32,
}

impl ContractionCounter {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            contracted: false,
            reps: 0,
        }
    }
}

impl RepCounter for ContractionCounter {
    type State = bool;

    fn update(&mut self, angle: f32) -> Transition<bool> {
        let (contracted, completed) = contraction_step(self.contracted, angle, self.threshold);
        self.contracted = contracted;
        if completed {
            self.reps += 1;
            debug!(angle, reps = self.reps, "contraction rep");
        }
        Transition {
            state: contracted,
            completed,
        }
    }

    fn reps(&self) -> u32 {
        self.reps
    }

    fn state(&self) -> bool {
        self.contracted
    }
}

/// Counts on a `Down`/`Up` edge (leg raise, glute bridge).
#[derive(Debug, Clone)]
pub struct PhaseCounter {
    threshold: Threshold,
    edge: CountEdge,
    stage: Option<Stage>,
    reps: u32,
}

impl PhaseCounter {
    pub fn new(threshold: Threshold, edge: CountEdge, initial: Option<Stage>) -> Self {
        Self {
            threshold,
            edge,
            stage: initial,
            reps: 0,
        }
    }
}

impl RepCounter for PhaseCounter {
    type State = Option<Stage>;

    fn update(&mut self, angle: f32) -> Transition<Option<Stage>> {
        let (stage, completed) = phase_step(self.stage, angle, self.threshold, self.edge);
        if stage != self.stage {
            debug!(angle, from = ?self.stage, to = ?stage, "stage change");
        }
        self.stage = stage;
        if completed {
            self.reps += 1;
            debug!(angle, reps = self.reps, "phase rep");
        }
        Transition { state: stage, completed }
    }

    fn reps(&self) -> u32 {
        self.reps
    }

    fn state(&self) -> Option<Stage> {
        self.stage
    }
}

// ── Counting strategy ────────────────────────────────────────────────────────

/// Serializable description of how an exercise counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Counting {
    Contraction,
    Phase {
        edge: CountEdge,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial: Option<Stage>,
    },
}

/// A counter built from a [`Counting`] strategy, for per-side storage.
#[derive(Debug, Clone)]
pub enum LimbCounter {
    Contraction(ContractionCounter),
    Phase(PhaseCounter),
}

impl LimbCounter {
    pub fn new(counting: Counting, threshold: Threshold) -> Self {
        match counting {
            Counting::Contraction => Self::Contraction(ContractionCounter::new(threshold)),
            Counting::Phase { edge, initial } => {
                Self::Phase(PhaseCounter::new(threshold, edge, initial))
            }
        }
    }

    /// Feed one angle; true when a repetition completed on this frame.
    pub fn update(&mut self, angle: f32) -> bool {
        match self {
            Self::Contraction(c) => c.update(angle).completed,
            Self::Phase(c) => c.update(angle).completed,
        }
    }

    pub fn reps(&self) -> u32 {
        match self {
            Self::Contraction(c) => c.reps(),
            Self::Phase(c) => c.reps(),
        }
    }

    /// Short label for display.
    pub fn stage_label(&self) -> &'static str {
        match self {
            Self::Contraction(c) if c.state() => "contracted",
            Self::Contraction(_) => "released",
            Self::Phase(c) => match c.state() {
                Some(Stage::Down) => "down",
                Some(Stage::Up) => "up",
                None => "-",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNEE: Threshold = Threshold::new(100.0, 160.0);
    const LEG: Threshold = Threshold::new(60.0, 150.0);
    const GLUTE: Threshold = Threshold::new(140.0, 170.0);

    #[test]
    fn contraction_counts_once_per_cycle() {
        let mut c = ContractionCounter::new(KNEE);
        let hits: Vec<bool> = [170.0, 90.0, 80.0, 95.0, 170.0, 90.0]
            .into_iter()
            .map(|a| c.update(a).completed)
            .collect();
        assert_eq!(hits, [false, true, false, false, false, true]);
        assert_eq!(c.reps(), 2);
    }

    #[test]
    fn contraction_needs_release_past_high() {
        let mut c = ContractionCounter::new(KNEE);
        for a in [90.0, 150.0, 90.0, 160.0, 90.0] {
            c.update(a);
        }
        // 150 and exactly 160 are inside the dead zone.
        assert_eq!(c.reps(), 1);
        assert!(c.state());
    }

    #[test]
    fn contraction_boundaries_are_strict() {
        assert_eq!(contraction_step(false, 100.0, KNEE), (false, false));
        assert_eq!(contraction_step(false, 99.9, KNEE), (true, true));
        assert_eq!(contraction_step(true, 160.0, KNEE), (true, false));
        assert_eq!(contraction_step(true, 160.1, KNEE), (false, false));
    }

    #[test]
    fn leg_raise_completes_on_enter_down() {
        let mut c = PhaseCounter::new(LEG, CountEdge::EnterDown, Some(Stage::Down));
        let hits: Vec<bool> = [170.0, 40.0, 175.0]
            .into_iter()
            .map(|a| c.update(a).completed)
            .collect();
        assert_eq!(hits, [false, true, false]);
        assert_eq!(c.state(), Some(Stage::Up));
    }

    #[test]
    fn glute_bridge_completes_on_enter_up() {
        let mut c = PhaseCounter::new(GLUTE, CountEdge::EnterUp, None);
        let hits: Vec<bool> = [170.0, 100.0, 175.0]
            .into_iter()
            .map(|a| c.update(a).completed)
            .collect();
        assert_eq!(hits, [false, false, true]);
        assert_eq!(c.reps(), 1);
    }

    #[test]
    fn unset_stage_ignores_first_raise() {
        let (stage, completed) = phase_step(None, 175.0, GLUTE, CountEdge::EnterUp);
        assert_eq!(stage, None);
        assert!(!completed);
    }

    #[test]
    fn limb_counter_labels() {
        let mut c = LimbCounter::new(
            Counting::Phase {
                edge: CountEdge::EnterUp,
                initial: None,
            },
            GLUTE,
        );
        assert_eq!(c.stage_label(), "-");
        c.update(120.0);
        assert_eq!(c.stage_label(), "down");
        assert!(c.update(171.0));
        assert_eq!(c.stage_label(), "up");
        assert_eq!(c.reps(), 1);
    }
}
