//! landmarks — per-frame body keypoints and the person-detected gate
//!
//! Keypoints follow the 33-point BlazePose topology. Coordinates arrive
//! normalised to `[0, 1]` relative to the frame; a frame may also carry no
//! detection at all.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

/// Number of keypoints produced by the pose model.
pub const LANDMARK_COUNT: usize = 33;
/// Default visibility a joint must exceed to count as seen.
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

// ── Joint ────────────────────────────────────────────────────────────────────

/// Named body joint. The discriminant is its index in the landmark array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose = 0,
    LeftEar = 7,
    RightEar = 8,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Joint {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which side of the body a counter tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Coordinate space used when measuring angles.
///
/// Pixel space scales `x` by the frame width and `y` by the height, so the
/// same normalised pose gives a different angle on a non-square frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    #[default]
    Normalized,
    Pixel,
}

// ── Frame data ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

/// One frame of pose-model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub width: u32,
    pub height: u32,
    /// `None` when the model found nobody in the frame.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl PoseFrame {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            landmarks: None,
        }
    }

    pub fn landmark(&self, joint: Joint) -> Option<&Landmark> {
        self.landmarks.as_ref()?.get(joint.index())
    }

    /// 2D position of `joint` in the requested space.
    pub fn point(&self, joint: Joint, space: CoordinateSpace) -> Option<Point2<f32>> {
        let lm = self.landmark(joint)?;
        Some(match space {
            CoordinateSpace::Normalized => Point2::new(lm.x, lm.y),
            CoordinateSpace::Pixel => {
                Point2::new(lm.x * self.width as f32, lm.y * self.height as f32)
            }
        })
    }

    /// True when a detection exists and every joint in `joints` is strictly
    /// more visible than `min_visibility`.
    pub fn person_detected(&self, joints: &[Joint], min_visibility: f32) -> bool {
        if self.landmarks.is_none() {
            return false;
        }
        joints.iter().all(|&joint| {
            self.landmark(joint)
                .is_some_and(|lm| lm.visibility > min_visibility)
        })
    }
}
