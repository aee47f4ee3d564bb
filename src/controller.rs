//! Owned layout state and the commands that change it.
//!
//! The controller is the single writer of the room and the furniture
//! collection. Every command runs to completion synchronously; a drag is a
//! sequence of independent `begin_drag` / `drag_move` / `end_drag` calls
//! with the in-between state held in [`InteractionState`]. Each write
//! replaces a whole item (or the whole collection), so listeners always see
//! a consistent snapshot.
//!
//! Guarantees after `end_drag` and `rotate`:
//! - the moved item's footprint lies inside the room (when
//!   `clamp_after_resolve` is on, which is the default);
//! - it does not overlap the *one* neighbor found in the collision scan.
//!
//! Only one neighbor is corrected per commit. With three or more items
//! packed together the corrected spot may still overlap another item;
//! [`crate::collision::find_overlapping_pairs`] reports that case.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::catalog::CatalogTemplate;
use crate::collision::find_collision;
use crate::config::EngineConfig;
use crate::error::{LayoutError, Result};
use crate::geometry::{clamp_to_room, compute_bounding_box, effective_footprint};
use crate::ids::{fresh_id, IdSource, UuidIds};
use crate::persistence::{DesignStore, SaveAck};
use crate::resolve::resolve_overlap_with;
use crate::types::{
    items_from_records, Color, DesignDocument, FurnitureId, FurnitureItem, Position, Room,
    Rotation,
};

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item_id: FurnitureId,
    /// Where the item was when the drag began. Pointer deltas are measured
    /// from here.
    pub start_position: Position,
    /// Set while the live position overlaps a neighbor.
    pub colliding: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging(DragSession),
    Rotating { item_id: FurnitureId },
}

/// Notification sent to subscribers after each committed change.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    ItemAdded {
        id: FurnitureId,
    },
    ItemRemoved {
        id: FurnitureId,
    },
    DragStarted {
        id: FurnitureId,
    },
    ItemMoved {
        id: FurnitureId,
        position: Position,
    },
    CollisionChanged {
        id: FurnitureId,
        colliding: bool,
    },
    DragEnded {
        id: FurnitureId,
        position: Position,
        resolved: bool,
    },
    ItemRotated {
        id: FurnitureId,
        rotation: Rotation,
        position: Position,
        resolved: bool,
    },
    RoomChanged,
    FurnitureReplaced,
    DesignLoaded {
        name: String,
    },
    DesignRenamed {
        name: String,
    },
}

type Listener = Box<dyn FnMut(&LayoutEvent)>;

pub struct LayoutController {
    config: EngineConfig,
    room: Room,
    design_name: String,
    furniture: Vec<FurnitureItem>,
    state: InteractionState,
    ids: Box<dyn IdSource>,
    listeners: Vec<Listener>,
}

impl LayoutController {
    /// Empty layout in the configured default room.
    pub fn new(config: EngineConfig, ids: impl IdSource + 'static) -> Result<Self> {
        let room = config.room.to_room()?;
        Ok(Self::with_room(config, room, Box::new(ids)))
    }

    /// Stock config, 10 x 10 room, random ids.
    pub fn with_defaults() -> Self {
        Self::with_room(EngineConfig::default(), Room::default(), Box::new(UuidIds))
    }

    fn with_room(config: EngineConfig, room: Room, ids: Box<dyn IdSource>) -> Self {
        Self {
            config,
            room,
            design_name: String::new(),
            furniture: Vec::new(),
            state: InteractionState::Idle,
            ids,
            listeners: Vec::new(),
        }
    }

    // -- Read access -----------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn design_name(&self) -> &str {
        &self.design_name
    }

    pub fn set_design_name(&mut self, name: impl Into<String>) {
        self.design_name = name.into();
        self.emit(LayoutEvent::DesignRenamed {
            name: self.design_name.clone(),
        });
    }

    pub fn furniture(&self) -> &[FurnitureItem] {
        &self.furniture
    }

    pub fn item(&self, id: &FurnitureId) -> Option<&FurnitureItem> {
        self.furniture.iter().find(|it| it.id() == id)
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.state
    }

    /// True while `id` is being dragged and currently overlaps a neighbor.
    pub fn is_colliding(&self, id: &FurnitureId) -> bool {
        matches!(&self.state, InteractionState::Dragging(s) if &s.item_id == id && s.colliding)
    }

    /// Register a listener called after every committed change.
    pub fn subscribe(&mut self, listener: impl FnMut(&LayoutEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -- Collection commands ---------------------------------------

    /// Instantiate `template` at the room center under an id no current
    /// item uses. No collision correction is applied; the item settles on
    /// its first drag or rotation.
    pub fn add_item(&mut self, template: &CatalogTemplate) -> FurnitureId {
        let taken: HashSet<FurnitureId> = self.furniture.iter().map(|it| it.id().clone()).collect();
        let id = fresh_id(self.ids.as_mut(), &taken);
        let item = template.instantiate_as(id.clone());
        debug!(%id, template = %template.key, "item added");
        self.furniture.push(item);
        self.emit(LayoutEvent::ItemAdded { id: id.clone() });
        id
    }

    pub fn remove_item(&mut self, id: &FurnitureId) -> Result<FurnitureItem> {
        self.require_idle()?;
        let idx = self.index_of(id)?;
        let removed = self.furniture.remove(idx);
        debug!(%id, "item removed");
        self.emit(LayoutEvent::ItemRemoved { id: id.clone() });
        Ok(removed)
    }

    /// Replace the whole collection. Repeated ids get fresh ones that no
    /// other item in `items` uses.
    pub fn set_furniture(&mut self, items: Vec<FurnitureItem>) -> Result<()> {
        self.require_idle()?;
        let mut taken: HashSet<FurnitureId> = items.iter().map(|it| it.id().clone()).collect();
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.id().clone()) {
                unique.push(item);
            } else {
                let fresh = fresh_id(self.ids.as_mut(), &taken);
                warn!(duplicate = %item.id(), %fresh, "duplicate furniture id reassigned");
                taken.insert(fresh.clone());
                seen.insert(fresh.clone());
                unique.push(item.with_id(fresh));
            }
        }
        debug!(count = unique.len(), "furniture replaced");
        self.furniture = unique;
        self.emit(LayoutEvent::FurnitureReplaced);
        Ok(())
    }

    // -- Room commands ---------------------------------------------

    /// Resize the room and clamp every item into the new footprint.
    /// Non-finite or non-positive sizes are rejected and nothing changes.
    pub fn set_room_dimensions(&mut self, width: f64, length: f64) -> Result<()> {
        self.require_idle()?;
        let room = self.room.resized(width, length).map_err(|e| {
            warn!(width, length, "room dimensions rejected");
            e
        })?;
        let refit: Vec<FurnitureItem> = self
            .furniture
            .iter()
            .map(|item| {
                let b = compute_bounding_box(item, None, None);
                let (x, z) = clamp_to_room(
                    b.center_x(),
                    b.center_z(),
                    b.effective_width,
                    b.effective_depth,
                    &room,
                );
                item.with_pose(item.position().with_plan(x, z), item.rotation())
            })
            .collect();
        debug!(width, length, "room resized");
        self.room = room;
        self.furniture = refit;
        self.emit(LayoutEvent::RoomChanged);
        Ok(())
    }

    pub fn set_room_colors(&mut self, floor_color: Color, wall_color: Color) {
        self.room = self.room.recolored(floor_color, wall_color);
        self.emit(LayoutEvent::RoomChanged);
    }

    // -- Drag ------------------------------------------------------

    pub fn begin_drag(&mut self, id: &FurnitureId) -> Result<()> {
        self.require_idle()?;
        let idx = self.index_of(id)?;
        let start_position = self.furniture[idx].position();
        debug!(%id, ?start_position, "drag started");
        self.state = InteractionState::Dragging(DragSession {
            item_id: id.clone(),
            start_position,
            colliding: false,
        });
        self.emit(LayoutEvent::DragStarted { id: id.clone() });
        Ok(())
    }

    /// Move the dragged item to its start position plus `(delta_x,
    /// delta_z)`, clamped into the room. The position is written even if it
    /// overlaps a neighbor; the overlap is only flagged.
    ///
    /// Returns whether the item now overlaps a neighbor.
    pub fn drag_move(&mut self, delta_x: f64, delta_z: f64) -> Result<bool> {
        let session = match &self.state {
            InteractionState::Dragging(session) => session.clone(),
            _ => return Err(LayoutError::NotDragging),
        };
        let idx = self.index_of(&session.item_id)?;
        let item = &self.furniture[idx];
        let (w, d) = effective_footprint(item, item.rotation());
        let (x, z) = clamp_to_room(
            session.start_position.x + delta_x,
            session.start_position.z + delta_z,
            w,
            d,
            &self.room,
        );
        let position = item.position().with_plan(x, z);
        let moved = item.with_pose(position, item.rotation());
        self.furniture[idx] = moved;

        let colliding = find_collision(&self.furniture[idx], &self.furniture, None, None).is_some();
        trace!(id = %session.item_id, x, z, colliding, "drag move");

        let was_colliding = session.colliding;
        self.state = InteractionState::Dragging(DragSession {
            colliding,
            ..session.clone()
        });
        self.emit(LayoutEvent::ItemMoved {
            id: session.item_id.clone(),
            position,
        });
        if colliding != was_colliding {
            self.emit(LayoutEvent::CollisionChanged {
                id: session.item_id,
                colliding,
            });
        }
        Ok(colliding)
    }

    /// Commit the drag: if the final position overlaps a neighbor, move the
    /// item clear of it. The collision flag is always cleared.
    pub fn end_drag(&mut self) -> Result<Position> {
        let session = match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Dragging(session) => session,
            other => {
                self.state = other;
                return Err(LayoutError::NotDragging);
            }
        };
        let idx = self.index_of(&session.item_id)?;
        let item = &self.furniture[idx];
        let (position, resolved) = self.settle(item, item.position(), item.rotation());
        let settled = item.with_pose(position, item.rotation());
        self.furniture[idx] = settled;
        debug!(id = %session.item_id, ?position, resolved, "drag ended");

        if session.colliding {
            self.emit(LayoutEvent::CollisionChanged {
                id: session.item_id.clone(),
                colliding: false,
            });
        }
        self.emit(LayoutEvent::DragEnded {
            id: session.item_id,
            position,
            resolved,
        });
        Ok(position)
    }

    /// A whole drag in one call: pick `id` up and drop it at `(x, z)`.
    pub fn move_item(&mut self, id: &FurnitureId, x: f64, z: f64) -> Result<Position> {
        self.begin_drag(id)?;
        let start = match &self.state {
            InteractionState::Dragging(session) => session.start_position,
            _ => return Err(LayoutError::NotDragging),
        };
        self.drag_move(x - start.x, z - start.z)?;
        self.end_drag()
    }

    // -- Rotate ----------------------------------------------------

    /// Turn `id` a quarter turn. The center is clamped so the rotated
    /// footprint fits the room, then moved clear of an overlapping
    /// neighbor. Rotation and position are committed together.
    pub fn rotate(&mut self, id: &FurnitureId) -> Result<FurnitureItem> {
        self.require_idle()?;
        let idx = self.index_of(id)?;
        self.state = InteractionState::Rotating {
            item_id: id.clone(),
        };

        let item = &self.furniture[idx];
        let rotation = item.rotation().next();
        let (w, d) = effective_footprint(item, rotation);
        let current = item.position();
        let (x, z) = clamp_to_room(current.x, current.z, w, d, &self.room);
        let (position, resolved) = self.settle(item, current.with_plan(x, z), rotation);
        let rotated = item.with_pose(position, rotation);

        self.furniture[idx] = rotated.clone();
        self.state = InteractionState::Idle;
        debug!(%id, degrees = rotation.degrees(), ?position, resolved, "item rotated");
        self.emit(LayoutEvent::ItemRotated {
            id: id.clone(),
            rotation,
            position,
            resolved,
        });
        Ok(rotated)
    }

    // -- Designs ---------------------------------------------------

    /// Replace room and furniture with a stored design, applying defaults
    /// to sparse records. If the room is invalid nothing changes.
    pub fn load_design(&mut self, design: &DesignDocument) -> Result<()> {
        self.require_idle()?;
        let room = Room::from_record(&design.room_dimensions, &self.room)?;
        let furniture =
            items_from_records(&design.furniture, self.ids.as_mut(), &self.config.default_color);
        debug!(name = %design.name, items = furniture.len(), "design loaded");
        self.room = room;
        self.furniture = furniture;
        self.design_name = design.name.clone();
        self.emit(LayoutEvent::DesignLoaded {
            name: design.name.clone(),
        });
        Ok(())
    }

    pub fn to_document(&self) -> DesignDocument {
        DesignDocument {
            name: self.design_name.clone(),
            room_dimensions: self.room.to_record(),
            furniture: self.furniture.iter().map(FurnitureItem::to_record).collect(),
        }
    }

    pub fn load_from(&mut self, store: &dyn DesignStore, design_id: &str) -> Result<()> {
        let design = store.load(design_id)?;
        self.load_design(&design)
    }

    pub fn save_to(&self, store: &mut dyn DesignStore, design_id: &str) -> Result<SaveAck> {
        store.save(design_id, &self.to_document())
    }

    // -- Internals -------------------------------------------------

    /// Final position for `item` at the given pose: unchanged if it
    /// overlaps nothing, otherwise pushed clear of the first neighbor found.
    fn settle(
        &self,
        item: &FurnitureItem,
        position: Position,
        rotation: Rotation,
    ) -> (Position, bool) {
        let Some(other) = find_collision(item, &self.furniture, Some(position), Some(rotation))
        else {
            return (position, false);
        };
        let target = compute_bounding_box(item, Some(position), Some(rotation));
        let neighbor = compute_bounding_box(other, None, None);
        let (mut x, mut z) = resolve_overlap_with(&target, &neighbor, self.config.clearance_margin);
        if self.config.clamp_after_resolve {
            (x, z) = clamp_to_room(
                x,
                z,
                target.effective_width,
                target.effective_depth,
                &self.room,
            );
        }
        debug!(id = %item.id(), neighbor = %other.id(), x, z, "overlap resolved");
        (position.with_plan(x, z), true)
    }

    fn index_of(&self, id: &FurnitureId) -> Result<usize> {
        self.furniture
            .iter()
            .position(|it| it.id() == id)
            .ok_or_else(|| LayoutError::ItemNotFound(id.clone()))
    }

    fn require_idle(&self) -> Result<()> {
        match self.state {
            InteractionState::Idle => Ok(()),
            _ => Err(LayoutError::InteractionInProgress),
        }
    }

    fn emit(&mut self, event: LayoutEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::collision::{find_overlapping_pairs, out_of_bounds_items};
    use crate::ids::SequentialIds;
    use crate::persistence::MemoryStore;
    use crate::types::{Dimensions, FurnitureKind};

    fn controller() -> LayoutController {
        LayoutController::new(EngineConfig::default(), SequentialIds::new("item")).unwrap()
    }

    fn template(w: f64, h: f64, d: f64) -> CatalogTemplate {
        CatalogTemplate::new("box", "Box", Dimensions::new(w, h, d), "#cccccc")
    }

    fn placed(id: &str, w: f64, d: f64, x: f64, z: f64) -> FurnitureItem {
        FurnitureItem::new(
            FurnitureId::new(id),
            id,
            FurnitureKind::Box,
            Dimensions::new(w, 1.0, d),
            Color::default(),
        )
        .with_pose(Position::new(x, 0.5, z), Rotation::Deg0)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    fn assert_settled(c: &LayoutController) {
        assert!(find_overlapping_pairs(c.furniture()).is_empty());
        assert!(out_of_bounds_items(c.furniture(), c.room()).is_empty());
    }

    #[test]
    fn added_items_start_at_center() {
        let mut c = controller();
        let id = c.add_item(&template(1.2, 0.75, 0.6));
        assert_eq!(id.as_str(), "item_1");
        let item = c.item(&id).unwrap();
        assert_eq!(item.position(), Position::new(0.0, 0.375, 0.0));
        assert_eq!(item.rotation(), Rotation::Deg0);
    }

    #[test]
    fn stacked_square_boxes_push_left_on_drop() {
        let mut c = controller();
        let a = c.add_item(&template(2.0, 0.8, 2.0));
        let b = c.add_item(&template(2.0, 0.8, 2.0));
        let hit = find_collision(c.item(&b).unwrap(), c.furniture(), None, None).unwrap();
        assert_eq!(hit.id(), &a);

        c.begin_drag(&b).unwrap();
        let pos = c.end_drag().unwrap();
        assert_close(pos.x, -2.05);
        assert_close(pos.z, 0.0);
        assert_eq!(pos.y, 0.4);
        assert_settled(&c);
    }

    #[test]
    fn stacked_wide_boxes_push_along_shorter_axis() {
        let mut c = controller();
        c.add_item(&template(2.0, 0.8, 1.0));
        let b = c.add_item(&template(2.0, 0.8, 1.0));
        let pos = c.move_item(&b, 0.0, 0.0).unwrap();
        assert_close(pos.x, 0.0);
        assert_close(pos.z, -1.05);
        assert_settled(&c);
    }

    #[test]
    fn drag_flags_overlap_without_correcting() {
        let mut c = controller();
        c.set_furniture(vec![
            placed("a", 1.0, 1.0, 0.0, 0.0),
            placed("b", 1.0, 1.0, 3.0, 0.0),
        ])
        .unwrap();
        let b = FurnitureId::new("b");
        c.begin_drag(&b).unwrap();
        assert!(!c.drag_move(-1.0, 0.0).unwrap());
        assert!(c.drag_move(-2.5, 0.0).unwrap());
        assert!(c.is_colliding(&b));
        assert_close(c.item(&b).unwrap().position().x, 0.5);

        let pos = c.end_drag().unwrap();
        assert!(!c.is_colliding(&b));
        assert_eq!(c.interaction(), &InteractionState::Idle);
        // 0.5 overlap on the right is the smallest push.
        assert_close(pos.x, 1.05);
        assert_settled(&c);
    }

    #[test]
    fn drag_is_clamped_to_walls() {
        let mut c = controller();
        let id = c.add_item(&template(2.0, 1.0, 1.0));
        c.begin_drag(&id).unwrap();
        c.drag_move(100.0, -100.0).unwrap();
        let p = c.item(&id).unwrap().position();
        assert_eq!((p.x, p.z), (4.0, -4.5));
        c.end_drag().unwrap();
        assert_settled(&c);
    }

    #[test]
    fn drag_commands_require_a_drag() {
        let mut c = controller();
        assert!(matches!(c.drag_move(1.0, 0.0), Err(LayoutError::NotDragging)));
        assert!(matches!(c.end_drag(), Err(LayoutError::NotDragging)));
    }

    #[test]
    fn commands_wait_for_drag_to_finish() {
        let mut c = controller();
        let a = c.add_item(&template(1.0, 1.0, 1.0));
        c.begin_drag(&a).unwrap();
        assert!(matches!(c.rotate(&a), Err(LayoutError::InteractionInProgress)));
        assert!(matches!(c.remove_item(&a), Err(LayoutError::InteractionInProgress)));
        assert!(matches!(c.begin_drag(&a), Err(LayoutError::InteractionInProgress)));
        c.end_drag().unwrap();
        assert!(c.rotate(&a).is_ok());
    }

    #[test]
    fn unknown_items_are_errors() {
        let mut c = controller();
        let ghost = FurnitureId::new("ghost");
        assert!(matches!(c.rotate(&ghost), Err(LayoutError::ItemNotFound(_))));
        assert!(matches!(c.begin_drag(&ghost), Err(LayoutError::ItemNotFound(_))));
        assert!(matches!(c.remove_item(&ghost), Err(LayoutError::ItemNotFound(_))));
    }

    #[test]
    fn four_rotations_restore_pose() {
        let mut c = controller();
        let id = c.add_item(&template(2.0, 0.8, 1.0));
        let before = compute_bounding_box(c.item(&id).unwrap(), None, None);
        let mut widths = vec![];
        for _ in 0..4 {
            let item = c.rotate(&id).unwrap();
            widths.push(compute_bounding_box(&item, None, None).effective_width);
        }
        assert_eq!(widths, vec![1.0, 2.0, 1.0, 2.0]);
        let item = c.item(&id).unwrap();
        assert_eq!(item.rotation(), Rotation::Deg0);
        assert_eq!(compute_bounding_box(item, None, None), before);
    }

    #[test]
    fn rotation_near_wall_is_clamped() {
        let mut c = controller();
        c.set_furniture(vec![placed("a", 2.0, 1.0, 0.0, 4.5)]).unwrap();
        let a = FurnitureId::new("a");
        let item = c.rotate(&a).unwrap();
        assert_eq!(item.rotation(), Rotation::Deg90);
        assert_eq!(item.position().z, 4.0);
        assert_settled(&c);
    }

    #[test]
    fn rotation_into_neighbor_is_resolved() {
        let mut c = controller();
        c.set_furniture(vec![
            placed("b", 1.0, 3.0, 0.0, 0.0),
            placed("a", 1.0, 1.0, 1.5, 0.0),
        ])
        .unwrap();
        let b = FurnitureId::new("b");
        let item = c.rotate(&b).unwrap();
        assert_eq!(item.rotation(), Rotation::Deg90);
        assert_close(item.position().x, -0.55);
        assert_close(item.position().z, 0.0);
        assert_settled(&c);
    }

    #[test]
    fn cube_rotation_near_wall_keeps_position() {
        let mut c = controller();
        let id = c.add_item(&template(1.0, 1.0, 1.0));
        for _ in 0..3 {
            c.rotate(&id).unwrap();
        }
        assert_eq!(c.item(&id).unwrap().rotation(), Rotation::Deg270);
        let moved = c.move_item(&id, 5.0 - 0.1, 0.0).unwrap();
        assert_eq!(moved.x, 4.5);
        let item = c.rotate(&id).unwrap();
        assert_eq!(item.rotation(), Rotation::Deg0);
        assert_eq!(item.position(), moved);
    }

    #[test]
    fn resolved_position_stays_inside_room() {
        let mut c = controller();
        c.set_furniture(vec![
            placed("a", 2.0, 2.0, -3.5, 0.0),
            placed("b", 2.0, 2.0, 3.0, 0.0),
        ])
        .unwrap();
        // Dropped on a, b would be pushed left through the wall.
        c.move_item(&FurnitureId::new("b"), -3.6, 0.0).unwrap();
        assert!(out_of_bounds_items(c.furniture(), c.room()).is_empty());
        // The wall wins: b is clamped back over a and the overlap remains.
        assert_close(c.item(&FurnitureId::new("b")).unwrap().position().x, -4.0);
        assert_eq!(
            find_overlapping_pairs(c.furniture()),
            vec![(FurnitureId::new("a"), FurnitureId::new("b"))]
        );
    }

    #[test]
    fn invalid_room_dimensions_are_rejected() {
        let mut c = controller();
        for (w, l) in [(0.0, 5.0), (5.0, -2.0), (f64::NAN, 5.0), (5.0, f64::INFINITY)] {
            assert!(matches!(
                c.set_room_dimensions(w, l),
                Err(LayoutError::InvalidRoomDimensions { .. })
            ));
        }
        assert_eq!(c.room().width(), 10.0);
        assert_eq!(c.room().length(), 10.0);
    }

    #[test]
    fn shrinking_room_refits_items() {
        let mut c = controller();
        c.set_furniture(vec![placed("a", 1.0, 1.0, 4.0, -4.0)]).unwrap();
        c.set_room_dimensions(4.0, 6.0).unwrap();
        let p = c.item(&FurnitureId::new("a")).unwrap().position();
        assert_eq!((p.x, p.z), (1.5, -2.5));
        assert_settled(&c);
    }

    #[test]
    fn set_furniture_reassigns_duplicate_ids() {
        let mut c = controller();
        c.set_furniture(vec![
            placed("a", 1.0, 1.0, -2.0, 0.0),
            placed("a", 1.0, 1.0, 2.0, 0.0),
        ])
        .unwrap();
        let ids: Vec<&str> = c.furniture().iter().map(|it| it.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "item_1"]);
    }

    fn assert_unique_ids(c: &LayoutController) {
        let ids: HashSet<&FurnitureId> = c.furniture().iter().map(|it| it.id()).collect();
        assert_eq!(ids.len(), c.furniture().len(), "{:?}", c.furniture());
    }

    #[test]
    fn set_furniture_reassigned_id_skips_ids_in_use() {
        let mut c = controller();
        c.set_furniture(vec![
            placed("item_1", 1.0, 1.0, -3.0, 0.0),
            placed("a", 1.0, 1.0, 0.0, 0.0),
            placed("a", 1.0, 1.0, 3.0, 0.0),
        ])
        .unwrap();
        let ids: Vec<&str> = c.furniture().iter().map(|it| it.id().as_str()).collect();
        assert_eq!(ids, vec!["item_1", "a", "item_2"]);
    }

    #[test]
    fn add_after_load_gets_an_unused_id() {
        let mut c = controller();
        let doc = DesignDocument::from_json(
            r#"{ "name": "r", "roomDimensions": { "width": 6, "length": 6 },
                 "furniture": [{ "id": "item_1" }] }"#,
        )
        .unwrap();
        c.load_design(&doc).unwrap();
        let id = c.add_item(&template(1.0, 1.0, 1.0));
        assert_eq!(id.as_str(), "item_2");
        assert_unique_ids(&c);
    }

    #[test]
    fn ids_stay_unique_with_an_overlapping_id_source() {
        // A source that restarts its count every three draws keeps
        // answering with ids the layout already holds.
        let mut n = 0;
        let ids = move || {
            n += 1;
            FurnitureId::new(format!("item_{}", (n - 1) % 3 + 1))
        };
        let mut c = LayoutController::new(EngineConfig::default(), ids).unwrap();
        let doc = DesignDocument::from_json(
            r#"{ "name": "r", "roomDimensions": { "width": 8, "length": 8 },
                 "furniture": [{}, { "id": "item_2" }, {}, { "id": "item_2" }] }"#,
        )
        .unwrap();
        c.load_design(&doc).unwrap();
        assert_unique_ids(&c);

        for _ in 0..4 {
            c.add_item(&template(0.5, 0.5, 0.5));
            assert_unique_ids(&c);
        }

        let mut doubled = c.furniture().to_vec();
        doubled.extend(c.furniture().iter().cloned());
        c.set_furniture(doubled).unwrap();
        assert_eq!(c.furniture().len(), 16);
        assert_unique_ids(&c);

        let doc = c.to_document();
        c.load_design(&doc).unwrap();
        assert_unique_ids(&c);
    }

    #[test]
    fn remove_item_drops_it() {
        let mut c = controller();
        let a = c.add_item(&template(1.0, 1.0, 1.0));
        let b = c.add_item(&template(1.0, 1.0, 1.0));
        let removed = c.remove_item(&a).unwrap();
        assert_eq!(removed.id(), &a);
        assert_eq!(c.furniture().len(), 1);
        assert_eq!(c.furniture()[0].id(), &b);
    }

    #[test]
    fn listeners_see_transitions_in_order() {
        let mut c = controller();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        c.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let a = c.add_item(&template(1.0, 1.0, 1.0));
        let b = c.add_item(&template(1.0, 1.0, 1.0));
        c.begin_drag(&b).unwrap();
        c.drag_move(0.2, 0.0).unwrap();
        c.end_drag().unwrap();

        let events = log.borrow();
        assert_eq!(events[0], LayoutEvent::ItemAdded { id: a });
        assert_eq!(events[1], LayoutEvent::ItemAdded { id: b.clone() });
        assert_eq!(events[2], LayoutEvent::DragStarted { id: b.clone() });
        assert!(matches!(events[3], LayoutEvent::ItemMoved { .. }));
        assert_eq!(
            events[4],
            LayoutEvent::CollisionChanged {
                id: b.clone(),
                colliding: true
            }
        );
        assert_eq!(
            events[5],
            LayoutEvent::CollisionChanged {
                id: b.clone(),
                colliding: false
            }
        );
        assert!(matches!(
            &events[6],
            LayoutEvent::DragEnded { id, resolved: true, .. } if id == &b
        ));
    }

    #[test]
    fn renaming_the_design_notifies_listeners() {
        let mut c = controller();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        c.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        c.set_design_name("bedroom");
        assert_eq!(c.design_name(), "bedroom");
        assert_eq!(
            *log.borrow(),
            vec![LayoutEvent::DesignRenamed {
                name: "bedroom".to_string()
            }]
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut c = controller();
        c.set_design_name("bedroom");
        let bed = c.add_item(&template(1.8, 0.5, 2.0));
        c.rotate(&bed).unwrap();
        let chair = c.add_item(
            &CatalogTemplate::new("chair", "Chair", Dimensions::new(0.5, 0.5, 0.5), "#64B5F6")
                .with_model("/models/chair.glb"),
        );
        c.move_item(&chair, 3.0, -2.0).unwrap();

        let mut store = MemoryStore::new();
        c.save_to(&mut store, "my-room").unwrap();

        let mut restored = controller();
        restored.load_from(&store, "my-room").unwrap();
        assert_eq!(restored.design_name(), "bedroom");
        assert_eq!(restored.room(), c.room());
        assert_eq!(restored.furniture(), c.furniture());
    }

    #[test]
    fn load_with_bad_room_changes_nothing() {
        let mut c = controller();
        let a = c.add_item(&template(1.0, 1.0, 1.0));
        let doc = DesignDocument::from_json(
            r#"{ "name": "bad", "roomDimensions": { "width": 0, "length": 4 }, "furniture": [] }"#,
        )
        .unwrap();
        assert!(c.load_design(&doc).is_err());
        assert_eq!(c.furniture().len(), 1);
        assert_eq!(c.furniture()[0].id(), &a);
        assert_eq!(c.room().width(), 10.0);
    }
}
