//! Data model for rooms and furniture, plus the JSON interchange records
//! a design document is stored as.
//!
//! Domain types keep their fields private so that the only way to change
//! an item's pose is to build a replacement through [`FurnitureItem::with_pose`].
//! The `*Record` structs mirror the persisted document and tolerate missing
//! or malformed fields; converting a record into a domain value resolves
//! every default in one place.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LayoutError, Result};
use crate::ids::{fresh_id, IdSource};

// -- Identifiers / colors ------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FurnitureId(String);

impl FurnitureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FurnitureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CSS-style color string, e.g. `#E57373`. Renderers interpret it; the
/// engine only carries it around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(color: impl Into<String>) -> Self {
        Self(color.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("#ffffff")
    }
}

// -- Geometry primitives -------------------------------------------

/// Item extent in meters, measured at rotation 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub const UNIT: Dimensions = Dimensions {
        width: 1.0,
        height: 1.0,
        depth: 1.0,
    };

    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// All three extents finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [w, h, d] => Some(Self::new(*w, *h, *d)).filter(Dimensions::is_valid),
            _ => None,
        }
    }
}

impl From<[f64; 3]> for Dimensions {
    fn from([width, height, depth]: [f64; 3]) -> Self {
        Self::new(width, height, depth)
    }
}

impl From<Dimensions> for [f64; 3] {
    fn from(d: Dimensions) -> Self {
        [d.width, d.height, d.depth]
    }
}

/// World position in meters. `y` is elevation; `x`/`z` are plan
/// coordinates with the room centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same elevation, new plan coordinates.
    pub fn with_plan(self, x: f64, z: f64) -> Self {
        Self { x, z, ..self }
    }

    fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
                Some(Self::new(*x, *y, *z))
            }
            _ => None,
        }
    }
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Position> for [f64; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Rotation about the vertical axis, restricted to quarter turns.
///
/// Serialized as integer degrees. Deserializing any other number snaps it
/// to the nearest quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn from_quarter_turns(turns: i64) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    /// Nearest quarter turn to `degrees`, modulo 360. Non-finite input is 0.
    pub fn snapped(degrees: f64) -> Self {
        if !degrees.is_finite() {
            warn!(degrees, "non-finite rotation replaced with 0");
            return Rotation::Deg0;
        }
        let turns = (degrees / 90.0).round();
        if turns * 90.0 != degrees {
            warn!(degrees, "rotation snapped to nearest quarter turn");
        }
        Self::from_quarter_turns(turns as i64)
    }

    /// One quarter turn further: `(deg + 90) mod 360`.
    pub fn next(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i64 + 1)
    }

    /// 90 and 270 swap the footprint's width and depth.
    pub fn swaps_footprint(self) -> bool {
        self.quarter_turns() % 2 == 1
    }
}

impl From<f64> for Rotation {
    fn from(degrees: f64) -> Self {
        Self::snapped(degrees)
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

// -- Room ----------------------------------------------------------

/// Rectangular room centered at the world origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    width: f64,
    length: f64,
    floor_color: Color,
    wall_color: Color,
}

impl Room {
    pub fn new(width: f64, length: f64, floor_color: Color, wall_color: Color) -> Result<Self> {
        validate_room_dimensions(width, length)?;
        Ok(Self {
            width,
            length,
            floor_color,
            wall_color,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }

    pub fn floor_color(&self) -> &Color {
        &self.floor_color
    }

    pub fn wall_color(&self) -> &Color {
        &self.wall_color
    }

    /// Same colors, new extent. Rejects non-finite or non-positive sizes.
    pub fn resized(&self, width: f64, length: f64) -> Result<Self> {
        Self::new(width, length, self.floor_color.clone(), self.wall_color.clone())
    }

    pub fn recolored(&self, floor_color: Color, wall_color: Color) -> Self {
        Self {
            floor_color,
            wall_color,
            ..self.clone()
        }
    }

    pub fn to_record(&self) -> RoomRecord {
        RoomRecord {
            width: self.width,
            length: self.length,
            floor_color: Some(self.floor_color.clone()),
            wall_color: Some(self.wall_color.clone()),
        }
    }

    /// Build a room from a stored record; absent colors fall back to
    /// those of `defaults`.
    pub fn from_record(record: &RoomRecord, defaults: &Room) -> Result<Self> {
        Self::new(
            record.width,
            record.length,
            record
                .floor_color
                .clone()
                .unwrap_or_else(|| defaults.floor_color.clone()),
            record
                .wall_color
                .clone()
                .unwrap_or_else(|| defaults.wall_color.clone()),
        )
    }
}

impl Default for Room {
    /// 10 x 10 meters with light gray floor and walls.
    fn default() -> Self {
        Self {
            width: 10.0,
            length: 10.0,
            floor_color: Color::new(DEFAULT_FLOOR_COLOR),
            wall_color: Color::new(DEFAULT_WALL_COLOR),
        }
    }
}

pub(crate) const DEFAULT_FLOOR_COLOR: &str = "#e0e0e0";
pub(crate) const DEFAULT_WALL_COLOR: &str = "#f5f5f5";

fn validate_room_dimensions(width: f64, length: f64) -> Result<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if ok(width) && ok(length) {
        Ok(())
    } else {
        Err(LayoutError::InvalidRoomDimensions { width, length })
    }
}

// -- Furniture -----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FurnitureKind {
    /// Plain colored box.
    Box,
    /// Loaded from an external asset; `color` is the fallback if it fails.
    Model { asset_ref: String },
}

impl FurnitureKind {
    /// `Model` when an asset reference is present and non-empty.
    pub fn from_asset_ref(asset_ref: Option<&str>) -> Self {
        match asset_ref {
            Some(url) if !url.trim().is_empty() => FurnitureKind::Model {
                asset_ref: url.to_string(),
            },
            _ => FurnitureKind::Box,
        }
    }

    pub fn asset_ref(&self) -> Option<&str> {
        match self {
            FurnitureKind::Box => None,
            FurnitureKind::Model { asset_ref } => Some(asset_ref),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FurnitureKind::Box => "box",
            FurnitureKind::Model { .. } => "model",
        }
    }
}

/// A piece of furniture placed in the room.
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureItem {
    id: FurnitureId,
    name: String,
    kind: FurnitureKind,
    base_dimensions: Dimensions,
    color: Color,
    position: Position,
    rotation: Rotation,
}

impl FurnitureItem {
    /// Create an item resting on the floor at the room center, unrotated.
    /// Invalid dimensions are replaced with [`Dimensions::UNIT`].
    pub fn new(
        id: FurnitureId,
        name: impl Into<String>,
        kind: FurnitureKind,
        base_dimensions: Dimensions,
        color: Color,
    ) -> Self {
        let base_dimensions = if base_dimensions.is_valid() {
            base_dimensions
        } else {
            warn!(%id, ?base_dimensions, "invalid dimensions replaced with 1x1x1");
            Dimensions::UNIT
        };
        Self {
            position: Position::new(0.0, base_dimensions.height / 2.0, 0.0),
            rotation: Rotation::Deg0,
            id,
            name: name.into(),
            kind,
            base_dimensions,
            color,
        }
    }

    /// A copy of this item at a new pose. Every other field is carried over.
    pub fn with_pose(&self, position: Position, rotation: Rotation) -> Self {
        Self {
            position,
            rotation,
            ..self.clone()
        }
    }

    pub(crate) fn with_id(&self, id: FurnitureId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &FurnitureId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FurnitureKind {
        &self.kind
    }

    pub fn base_dimensions(&self) -> Dimensions {
        self.base_dimensions
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Build an item from a stored record, resolving every missing field.
    ///
    /// `id` is used when the record has none (or a duplicate, decided by
    /// the caller).
    fn from_record(record: &FurnitureRecord, id: FurnitureId, default_color: &Color) -> Self {
        let dims = match record.dimensions.as_deref() {
            None => Dimensions::UNIT,
            Some(values) => Dimensions::from_slice(values).unwrap_or_else(|| {
                warn!(%id, ?values, "invalid dimensions replaced with 1x1x1");
                Dimensions::UNIT
            }),
        };
        let kind = FurnitureKind::from_asset_ref(record.model_url.as_deref());
        let color = record.color.clone().unwrap_or_else(|| default_color.clone());
        let name = record.name.clone().unwrap_or_default();
        let item = Self::new(id, name, kind, dims, color);

        let position = match record.position.as_deref() {
            None => item.position,
            Some(values) => Position::from_slice(values).unwrap_or_else(|| {
                warn!(id = %item.id, ?values, "invalid position replaced with room center");
                item.position
            }),
        };
        item.with_pose(position, record.rotation.unwrap_or_default())
    }

    pub fn to_record(&self) -> FurnitureRecord {
        FurnitureRecord {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            kind: Some(self.kind.type_name().to_string()),
            position: Some(<[f64; 3]>::from(self.position).to_vec()),
            dimensions: Some(<[f64; 3]>::from(self.base_dimensions).to_vec()),
            rotation: Some(self.rotation),
            color: Some(self.color.clone()),
            model_url: self.kind.asset_ref().map(str::to_string),
        }
    }
}

/// Turn stored records into items. Missing ids, and ids already used by an
/// earlier record, get a fresh id from `ids` that no record in the batch
/// uses.
pub fn items_from_records(
    records: &[FurnitureRecord],
    ids: &mut dyn IdSource,
    default_color: &Color,
) -> Vec<FurnitureItem> {
    let mut taken: HashSet<FurnitureId> = records
        .iter()
        .filter_map(|r| r.id.clone())
        .filter(|id| !id.as_str().is_empty())
        .collect();
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let id = match &record.id {
            Some(id) if !id.as_str().is_empty() && !seen.contains(id) => id.clone(),
            Some(id) if !id.as_str().is_empty() => {
                let fresh = fresh_id(ids, &taken);
                warn!(duplicate = %id, %fresh, "duplicate furniture id reassigned");
                fresh
            }
            _ => fresh_id(ids, &taken),
        };
        taken.insert(id.clone());
        seen.insert(id.clone());
        items.push(FurnitureItem::from_record(record, id, default_color));
    }
    items
}

// -- Interchange records -------------------------------------------

/// A furniture entry as stored in a design document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FurnitureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub width: f64,
    pub length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_color: Option<Color>,
}

/// A complete saved design: room plus furniture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    #[serde(default)]
    pub name: String,
    pub room_dimensions: RoomRecord,
    #[serde(default)]
    pub furniture: Vec<FurnitureRecord>,
}

impl DesignDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// -- Tests ---------------------------------------------------------
