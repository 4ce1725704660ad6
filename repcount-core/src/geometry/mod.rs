//! geometry — interior joint angle from three 2D keypoints
//!
//! The angle at vertex `b` is the absolute difference of the two ray
//! directions `b→a` and `b→c`, folded into `[0, 180]` degrees.

use nalgebra::Point2;

/// Interior angle at `vertex` in degrees, always within `[0, 180]`.
///
/// `proximal` and `distal` are the two neighbouring joints, e.g. hip and ankle
/// around a knee. Swapping them yields the same angle.
///
/// Coincident points are not rejected: `atan2(0, 0)` is `0`, so a zero-length
/// ray contributes a direction of 0° and the result stays finite.
pub fn joint_angle(proximal: Point2<f32>, vertex: Point2<f32>, distal: Point2<f32>) -> f32 {
    let to_distal = distal - vertex;
    let to_proximal = proximal - vertex;

    let radians = to_distal.y.atan2(to_distal.x) - to_proximal.y.atan2(to_proximal.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}
