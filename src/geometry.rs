//! Rotation-aware axis-aligned footprints on the floor plan.
//!
//! Rotations are restricted to quarter turns, so a footprint is always an
//! axis-aligned rectangle: 90 and 270 degrees swap width and depth, 0 and
//! 180 keep them. Height never takes part.

use std::f64::consts::PI;

use crate::types::{FurnitureItem, Position, Room, Rotation};

/// Footprint rectangle on the plan. `top` is the low-z edge and `bottom`
/// the high-z edge, matching the 2D editor's screen orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub effective_width: f64,
    pub effective_depth: f64,
}

impl Aabb {
    pub fn centered(x: f64, z: f64, effective_width: f64, effective_depth: f64) -> Self {
        let half_w = effective_width / 2.0;
        let half_d = effective_depth / 2.0;
        Self {
            left: x - half_w,
            right: x + half_w,
            top: z - half_d,
            bottom: z + half_d,
            effective_width,
            effective_depth,
        }
    }

    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn center_z(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// True if the interiors overlap. Shared edges and corners do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// True if the rectangle lies within (or on) the room walls.
    pub fn within(&self, room: &Room) -> bool {
        -room.half_width() <= self.left
            && self.right <= room.half_width()
            && -room.half_length() <= self.top
            && self.bottom <= room.half_length()
    }
}

/// Width and depth of the footprint at `rotation`.
pub fn effective_footprint(item: &FurnitureItem, rotation: Rotation) -> (f64, f64) {
    let dims = item.base_dimensions();
    if rotation.swaps_footprint() {
        (dims.depth, dims.width)
    } else {
        (dims.width, dims.depth)
    }
}

/// Footprint of `item`, optionally evaluated at a hypothetical pose instead
/// of its stored one.
pub fn compute_bounding_box(
    item: &FurnitureItem,
    position: Option<Position>,
    rotation: Option<Rotation>,
) -> Aabb {
    let position = position.unwrap_or_else(|| item.position());
    let rotation = rotation.unwrap_or_else(|| item.rotation());
    let (w, d) = effective_footprint(item, rotation);
    Aabb::centered(position.x, position.z, w, d)
}

/// Clamp a footprint center so the footprint stays inside the room.
///
/// A footprint larger than the room along an axis is centered on that
/// axis rather than pushed against one wall.
pub fn clamp_to_room(
    center_x: f64,
    center_z: f64,
    effective_width: f64,
    effective_depth: f64,
    room: &Room,
) -> (f64, f64) {
    (
        clamp_axis(center_x, room.half_width() - effective_width / 2.0),
        clamp_axis(center_z, room.half_length() - effective_depth / 2.0),
    )
}

fn clamp_axis(value: f64, limit: f64) -> f64 {
    if limit < 0.0 {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}

/// Rotation about the vertical axis, in radians, for the 3D scene.
/// The sign is inverted relative to the plan's rotation sense.
pub fn scene_rotation_radians(rotation: Rotation) -> f64 {
    -(rotation.degrees() as f64) * PI / 180.0
}
