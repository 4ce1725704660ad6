#![allow(dead_code)]

use repcount_core::landmarks::{Joint, Landmark, PoseFrame, LANDMARK_COUNT};

/// Square frame so normalised and pixel angles agree.
pub const FRAME_SIZE: u32 = 1000;

fn put(lms: &mut [Landmark], joint: Joint, x: f32, y: f32, visibility: f32) {
    lms[joint.index()] = Landmark {
        x,
        y,
        z: 0.0,
        visibility,
    };
}

/// Place `proximal` straight above `vertex` and `distal` so that the angle
/// at `vertex` is `degrees`.
fn bend(lms: &mut [Landmark], joints: [Joint; 3], origin: (f32, f32), degrees: f32, vis: f32) {
    let (cx, cy) = origin;
    let r = 0.15;
    let t = degrees.to_radians();
    put(lms, joints[0], cx, cy - r, vis);
    put(lms, joints[1], cx, cy, vis);
    put(lms, joints[2], cx + r * t.sin(), cy - r * t.cos(), vis);
}

fn frame(lms: Vec<Landmark>) -> PoseFrame {
    PoseFrame {
        width: FRAME_SIZE,
        height: FRAME_SIZE,
        landmarks: Some(lms),
    }
}

fn blank() -> Vec<Landmark> {
    vec![
        Landmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
            visibility: 0.9,
        };
        LANDMARK_COUNT
    ]
}

/// Both legs bent at the given knee angles.
pub fn legs(left: f32, right: f32) -> PoseFrame {
    let mut lms = blank();
    bend(
        &mut lms,
        [Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle],
        (0.6, 0.5),
        left,
        0.9,
    );
    bend(
        &mut lms,
        [Joint::RightHip, Joint::RightKnee, Joint::RightAnkle],
        (0.4, 0.5),
        right,
        0.9,
    );
    frame(lms)
}

/// Left leg only; the right leg is hidden.
pub fn left_leg(angle: f32) -> PoseFrame {
    let mut f = legs(angle, 180.0);
    if let Some(lms) = f.landmarks.as_mut() {
        for j in [Joint::RightHip, Joint::RightKnee, Joint::RightAnkle] {
            lms[j.index()].visibility = 0.1;
        }
    }
    f
}

/// Shoulder-hip-knee angle for a bridge.
pub fn hips(angle: f32) -> PoseFrame {
    let mut lms = blank();
    bend(
        &mut lms,
        [Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee],
        (0.5, 0.5),
        angle,
        0.9,
    );
    frame(lms)
}

/// Landmarks present but the tracked joints barely visible.
pub fn hidden() -> PoseFrame {
    let mut lms = blank();
    for lm in &mut lms {
        lm.visibility = 0.3;
    }
    frame(lms)
}

pub fn nobody() -> PoseFrame {
    PoseFrame::empty(FRAME_SIZE, FRAME_SIZE)
}
