//! Minimal-displacement correction for a pair of overlapping footprints.

use crate::geometry::Aabb;

/// Clearance left between a corrected footprint and the neighbor it was
/// pushed away from, in meters.
pub const CLEARANCE_MARGIN: f64 = 0.05;

/// Direction the target is pushed, relative to the neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushSide {
    /// Toward -x, past the neighbor's left edge.
    Left,
    /// Toward +x, past the neighbor's right edge.
    Right,
    /// Toward -z, past the neighbor's top edge.
    Top,
    /// Toward +z, past the neighbor's bottom edge.
    Bottom,
}

/// Choose the push with the smallest displacement that separates
/// `target` from `collided`.
///
/// Ties go to the first of left, right, top, bottom.
pub fn choose_push_side(target: &Aabb, collided: &Aabb) -> PushSide {
    let dist_left = target.right - collided.left;
    let dist_right = collided.right - target.left;
    let dist_top = target.bottom - collided.top;
    let dist_bottom = collided.bottom - target.top;

    let min = dist_left.min(dist_right).min(dist_top).min(dist_bottom);
    if dist_left == min {
        PushSide::Left
    } else if dist_right == min {
        PushSide::Right
    } else if dist_top == min {
        PushSide::Top
    } else {
        PushSide::Bottom
    }
}

/// Corrected `(x, z)` center for `target` so it clears `collided` by
/// `clearance` on the chosen side. The other coordinate is unchanged.
///
/// Only this one neighbor is considered; the returned spot may overlap
/// something else.
pub fn resolve_overlap_with(target: &Aabb, collided: &Aabb, clearance: f64) -> (f64, f64) {
    let half_w = target.effective_width / 2.0;
    let half_d = target.effective_depth / 2.0;
    let (x, z) = (target.center_x(), target.center_z());
    match choose_push_side(target, collided) {
        PushSide::Left => (collided.left - half_w - clearance, z),
        PushSide::Right => (collided.right + half_w + clearance, z),
        PushSide::Top => (x, collided.top - half_d - clearance),
        PushSide::Bottom => (x, collided.bottom + half_d + clearance),
    }
}

/// [`resolve_overlap_with`] using [`CLEARANCE_MARGIN`].
pub fn resolve_overlap(target: &Aabb, collided: &Aabb) -> (f64, f64) {
    resolve_overlap_with(target, collided, CLEARANCE_MARGIN)
}
