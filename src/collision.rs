//! Footprint collision and bounds checking.
//!
//! Footprints are axis-aligned, so overlap is a strict interval test on
//! both axes. Touching (shared edge or corner) is NOT counted as overlap.

use crate::geometry::{compute_bounding_box, Aabb};
use crate::types::{FurnitureItem, FurnitureId, Position, Room, Rotation};

/// First item in `items` (other than `target` itself) whose footprint
/// overlaps the target's.
///
/// The target is evaluated at the optional pose overrides; neighbors at
/// their stored pose. The scan runs in collection order and stops at the
/// first hit, so with several overlapping neighbors the result depends
/// on ordering. Callers rely on that "bump into whatever comes first"
/// behavior.
pub fn find_collision<'a>(
    target: &FurnitureItem,
    items: &'a [FurnitureItem],
    position: Option<Position>,
    rotation: Option<Rotation>,
) -> Option<&'a FurnitureItem> {
    let target_box = compute_bounding_box(target, position, rotation);
    items
        .iter()
        .filter(|other| other.id() != target.id())
        .find(|other| target_box.overlaps(&compute_bounding_box(other, None, None)))
}

/// Every overlapping pair in the collection, by id, in collection order.
pub fn find_overlapping_pairs(items: &[FurnitureItem]) -> Vec<(FurnitureId, FurnitureId)> {
    let boxes: Vec<Aabb> = items
        .iter()
        .map(|it| compute_bounding_box(it, None, None))
        .collect();
    let mut pairs = Vec::new();
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if boxes[i].overlaps(&boxes[j]) {
                pairs.push((items[i].id().clone(), items[j].id().clone()));
            }
        }
    }
    pairs
}

/// Ids of items whose footprint crosses a wall.
pub fn out_of_bounds_items(items: &[FurnitureItem], room: &Room) -> Vec<FurnitureId> {
    items
        .iter()
        .filter(|it| !compute_bounding_box(it, None, None).within(room))
        .map(|it| it.id().clone())
        .collect()
}

/// True if the layout has no overlaps and nothing crosses a wall.
pub fn is_valid_layout(items: &[FurnitureItem], room: &Room) -> bool {
    find_overlapping_pairs(items).is_empty() && out_of_bounds_items(items, room).is_empty()
}
