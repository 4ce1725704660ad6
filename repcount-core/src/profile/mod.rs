//! profile — per-exercise thresholds, joints and messages
//!
//! Built-in profiles carry the tuned thresholds for each exercise. A profile
//! can be written to TOML, edited and loaded back to override them.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::counting::{CountEdge, Counting, Stage, Threshold};
use crate::feedback::{FeedbackBand, FeedbackCategory};
use crate::landmarks::{CoordinateSpace, Joint, Side, DEFAULT_MIN_VISIBILITY};

/// Spoken when the tracked joints drop below the visibility threshold.
pub const NO_PERSON_MESSAGE: &str =
    "Person not detected. Please position yourself correctly in front of the camera.";

/// Upper bound for the top feedback band so that a fully straight 180° joint
/// is still inside it.
const BAND_CEILING: f32 = 181.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exercise {
    KneeRaise,
    ButtKick,
    LegRaise,
    GluteBridge,
}

impl Exercise {
    pub const ALL: [Exercise; 4] = [
        Exercise::KneeRaise,
        Exercise::ButtKick,
        Exercise::LegRaise,
        Exercise::GluteBridge,
    ];
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Exercise::KneeRaise => "knee-raise",
            Exercise::ButtKick => "butt-kick",
            Exercise::LegRaise => "leg-raise",
            Exercise::GluteBridge => "glute-bridge",
        };
        f.pad(name)
    }
}

/// The three joints whose angle is measured for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimbJoints {
    pub side: Side,
    pub proximal: Joint,
    pub vertex: Joint,
    pub distal: Joint,
}

impl LimbJoints {
    pub fn all(&self) -> [Joint; 3] {
        [self.proximal, self.vertex, self.distal]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: Exercise,
    pub name: String,
    pub limbs: Vec<LimbJoints>,
    #[serde(default)]
    pub space: CoordinateSpace,
    pub threshold: Threshold,
    pub counting: Counting,
    #[serde(default)]
    pub feedback_bands: Vec<FeedbackBand>,
    /// Template with `{side}` and `{reps}` placeholders.
    pub rep_message: String,
    /// Announce only every Nth repetition.
    #[serde(default = "default_announce_every")]
    pub announce_every: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_message: Option<String>,
    #[serde(default = "default_no_person_message")]
    pub no_person_message: String,
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
    /// Process only every Nth frame unless the caller overrides it.
    #[serde(default = "default_frame_stride")]
    pub frame_stride: u32,
    /// Forget the last feedback category whenever a rep completes, so the
    /// band the rep lands in is announced again.
    #[serde(default)]
    pub reset_feedback_on_rep: bool,
}

fn default_announce_every() -> u32 {
    1
}

fn default_no_person_message() -> String {
    NO_PERSON_MESSAGE.to_string()
}

fn default_min_visibility() -> f32 {
    DEFAULT_MIN_VISIBILITY
}

fn default_frame_stride() -> u32 {
    1
}

impl ExerciseProfile {
    pub fn builtin(exercise: Exercise) -> Self {
        match exercise {
            Exercise::KneeRaise => Self {
                exercise,
                name: "Knee raises".into(),
                limbs: legs(&[Side::Left, Side::Right]),
                space: CoordinateSpace::Normalized,
                threshold: Threshold::new(100.0, 160.0),
                counting: Counting::Contraction,
                feedback_bands: Vec::new(),
                rep_message: "Good job! {side} knee repetition {reps}".into(),
                announce_every: 5,
                start_message: Some(
                    "Starting knee raises detection. Please begin your exercise.".into(),
                ),
                end_message: Some("Exercise session ended. Great job!".into()),
                no_person_message: NO_PERSON_MESSAGE.into(),
                min_visibility: DEFAULT_MIN_VISIBILITY,
                frame_stride: 5,
                reset_feedback_on_rep: false,
            },
            Exercise::ButtKick => Self {
                exercise,
                name: "Butt kicks".into(),
                limbs: legs(&[Side::Left, Side::Right]),
                space: CoordinateSpace::Normalized,
                threshold: Threshold::new(50.0, 120.0),
                counting: Counting::Contraction,
                feedback_bands: Vec::new(),
                rep_message: "{side} Butt Kick rep {reps} completed.".into(),
                announce_every: 1,
                start_message: None,
                end_message: None,
                no_person_message: NO_PERSON_MESSAGE.into(),
                min_visibility: DEFAULT_MIN_VISIBILITY,
                frame_stride: 1,
                reset_feedback_on_rep: false,
            },
            Exercise::LegRaise => Self {
                exercise,
                name: "Leg raises".into(),
                limbs: legs(&[Side::Left]),
                space: CoordinateSpace::Pixel,
                threshold: Threshold::new(60.0, 150.0),
                counting: Counting::Phase {
                    edge: CountEdge::EnterDown,
                    initial: Some(Stage::Down),
                },
                feedback_bands: vec![
                    FeedbackBand::new(
                        FeedbackCategory::Position,
                        0.0,
                        70.0,
                        "Ensure your leg is straight in the lowered position.",
                    ),
                    FeedbackBand::new(
                        FeedbackCategory::Lift,
                        70.0,
                        150.0,
                        "Raise your leg higher!",
                    ),
                    FeedbackBand::new(
                        FeedbackCategory::Hold,
                        150.0,
                        BAND_CEILING,
                        "Great form! Hold it steady.",
                    ),
                ],
                rep_message: "Reps: {reps}. Great job!".into(),
                announce_every: 1,
                start_message: None,
                end_message: None,
                no_person_message: NO_PERSON_MESSAGE.into(),
                min_visibility: DEFAULT_MIN_VISIBILITY,
                frame_stride: 1,
                reset_feedback_on_rep: false,
            },
            Exercise::GluteBridge => Self {
                exercise,
                name: "Glute bridges".into(),
                limbs: vec![LimbJoints {
                    side: Side::Left,
                    proximal: Joint::LeftShoulder,
                    vertex: Joint::LeftHip,
                    distal: Joint::LeftKnee,
                }],
                space: CoordinateSpace::Pixel,
                threshold: Threshold::new(140.0, 170.0),
                counting: Counting::Phase {
                    edge: CountEdge::EnterUp,
                    initial: None,
                },
                feedback_bands: vec![
                    FeedbackBand::new(
                        FeedbackCategory::Position,
                        0.0,
                        130.0,
                        "Get into position. Lie flat with knees bent.",
                    ),
                    FeedbackBand::new(
                        FeedbackCategory::Lift,
                        140.0,
                        170.0,
                        "Lift your hips higher!",
                    ),
                    FeedbackBand::new(
                        FeedbackCategory::Hold,
                        170.0,
                        BAND_CEILING,
                        "Great form! Hold the position.",
                    ),
                ],
                rep_message: "Reps: {reps}. Great job!".into(),
                announce_every: 1,
                start_message: None,
                end_message: None,
                no_person_message: NO_PERSON_MESSAGE.into(),
                min_visibility: DEFAULT_MIN_VISIBILITY,
                frame_stride: 1,
                reset_feedback_on_rep: true,
            },
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let profile: Self = toml::from_str(&content)
            .with_context(|| format!("invalid profile {}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("failed to serialize profile")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write profile {}", path.display()))?;
        Ok(())
    }

    /// Reject profiles the counters cannot run with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.limbs.is_empty(), "profile tracks no limbs");
        anyhow::ensure!(
            self.threshold.low < self.threshold.high,
            "low threshold {} must be below high threshold {}",
            self.threshold.low,
            self.threshold.high
        );
        anyhow::ensure!(self.announce_every > 0, "announce_every must be at least 1");
        anyhow::ensure!(self.frame_stride > 0, "frame_stride must be at least 1");
        Ok(())
    }

    /// Every joint that must be visible for a person to count as detected.
    pub fn required_joints(&self) -> Vec<Joint> {
        let mut joints: Vec<Joint> = Vec::new();
        for joint in self.limbs.iter().flat_map(LimbJoints::all) {
            if !joints.contains(&joint) {
                joints.push(joint);
            }
        }
        joints
    }
}

fn legs(sides: &[Side]) -> Vec<LimbJoints> {
    sides
        .iter()
        .map(|&side| match side {
            Side::Left => LimbJoints {
                side,
                proximal: Joint::LeftHip,
                vertex: Joint::LeftKnee,
                distal: Joint::LeftAnkle,
            },
            Side::Right => LimbJoints {
                side,
                proximal: Joint::RightHip,
                vertex: Joint::RightKnee,
                distal: Joint::RightAnkle,
            },
        })
        .collect()
}
