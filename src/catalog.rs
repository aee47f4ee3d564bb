//! Furniture templates that new items are instantiated from.

use serde::{Deserialize, Serialize};

use crate::ids::IdSource;
use crate::types::{Color, Dimensions, FurnitureId, FurnitureItem, FurnitureKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTemplate {
    /// Stable catalog key, e.g. `bed_double`. Not an item id.
    pub key: String,
    pub name: String,
    /// `[width, height, depth]` in meters.
    pub dimensions: Dimensions,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

impl CatalogTemplate {
    pub fn new(key: &str, name: &str, dimensions: Dimensions, color: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            dimensions,
            color: Color::new(color),
            model_url: None,
        }
    }

    pub fn with_model(mut self, model_url: impl Into<String>) -> Self {
        self.model_url = Some(model_url.into());
        self
    }

    pub fn kind(&self) -> FurnitureKind {
        FurnitureKind::from_asset_ref(self.model_url.as_deref())
    }

    /// A new item with a fresh id, centered in the room and unrotated.
    pub fn instantiate(&self, ids: &mut dyn IdSource) -> FurnitureItem {
        self.instantiate_as(ids.next_id())
    }

    /// Like [`CatalogTemplate::instantiate`], with an id the caller has
    /// already checked.
    pub fn instantiate_as(&self, id: FurnitureId) -> FurnitureItem {
        FurnitureItem::new(
            id,
            self.name.clone(),
            self.kind(),
            self.dimensions,
            self.color.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<CatalogTemplate>,
}

impl Catalog {
    pub fn get(&self, key: &str) -> Option<&CatalogTemplate> {
        self.items.iter().find(|t| t.key == key)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The built-in bedroom/office starter set.
pub fn default_catalog() -> Catalog {
    Catalog {
        items: vec![
            CatalogTemplate::new(
                "bed_double",
                "Double bed",
                Dimensions::new(1.8, 0.5, 2.0),
                "#E57373",
            ),
            CatalogTemplate::new(
                "desk_office",
                "Office desk",
                Dimensions::new(1.2, 0.75, 0.6),
                "#FFF176",
            ),
            CatalogTemplate::new(
                "wardrobe",
                "Wardrobe",
                Dimensions::new(0.8, 2.0, 0.6),
                "#81C784",
            ),
            CatalogTemplate::new("chair", "Chair", Dimensions::new(0.5, 0.5, 0.5), "#64B5F6"),
        ],
    }
}
