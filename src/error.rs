use thiserror::Error;

use crate::types::FurnitureId;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout controller and its collaborators.
///
/// Geometry, collision detection, overlap resolution and clamping never
/// fail; everything here comes from commands or I/O around them.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid room dimensions {width} x {length}: both must be finite and positive")]
    InvalidRoomDimensions { width: f64, length: f64 },
    #[error("furniture item `{0}` not found")]
    ItemNotFound(FurnitureId),
    #[error("an interaction is already in progress")]
    InteractionInProgress,
    #[error("no drag in progress")]
    NotDragging,
    #[error("design `{0}` not found")]
    DesignNotFound(String),
    #[error("invalid design id `{0}`")]
    InvalidDesignId(String),
    #[error("invalid design JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid engine config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
