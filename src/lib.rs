//! Roomcraft spatial layout engine.
//!
//! Keeps furniture inside a rectangular room and apart from each other
//! while items are dragged and rotated on a floor plan. The engine does no
//! rendering and no I/O of its own beyond the optional design stores.
//!
//! JSON entrypoints take a design document and return the corrected
//! document. With the `python` feature they are also exposed as a Python
//! extension module.

pub mod catalog;
pub mod collision;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod persistence;
pub mod resolve;
pub mod types;

pub use controller::{InteractionState, LayoutController, LayoutEvent};
pub use error::{LayoutError, Result};
pub use types::{DesignDocument, FurnitureId, FurnitureItem, Room, Rotation};

fn controller_for(design_json: &str) -> Result<LayoutController> {
    let design = DesignDocument::from_json(design_json)?;
    let mut controller = LayoutController::with_defaults();
    controller.load_design(&design)?;
    Ok(controller)
}

/// Parse a design, fill in every missing field, and serialize it again.
pub fn normalize_design_json(design_json: &str) -> Result<String> {
    controller_for(design_json)?.to_document().to_json()
}

/// Drop `item_id` at `(x, z)` and return the design with the settled
/// position.
pub fn move_item_json(design_json: &str, item_id: &str, x: f64, z: f64) -> Result<String> {
    let mut controller = controller_for(design_json)?;
    controller.move_item(&FurnitureId::new(item_id), x, z)?;
    controller.to_document().to_json()
}

/// Rotate `item_id` a quarter turn and return the updated design.
pub fn rotate_item_json(design_json: &str, item_id: &str) -> Result<String> {
    let mut controller = controller_for(design_json)?;
    controller.rotate(&FurnitureId::new(item_id))?;
    controller.to_document().to_json()
}

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;

    fn to_py_err(e: crate::LayoutError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
    }

    #[pyfunction]
    fn normalize_design_json(design_json: &str) -> PyResult<String> {
        crate::normalize_design_json(design_json).map_err(to_py_err)
    }

    #[pyfunction]
    fn move_item_json(design_json: &str, item_id: &str, x: f64, z: f64) -> PyResult<String> {
        crate::move_item_json(design_json, item_id, x, z).map_err(to_py_err)
    }

    #[pyfunction]
    fn rotate_item_json(design_json: &str, item_id: &str) -> PyResult<String> {
        crate::rotate_item_json(design_json, item_id).map_err(to_py_err)
    }

    /// Roomcraft layout engine, importable from Python.
    #[pymodule]
    fn roomcraft_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(normalize_design_json, m)?)?;
        m.add_function(wrap_pyfunction!(move_item_json, m)?)?;
        m.add_function(wrap_pyfunction!(rotate_item_json, m)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESIGN: &str = r##"{
        "name": "my-room",
        "roomDimensions": { "width": 6.0, "length": 4.0 },
        "furniture": [
            { "id": "bed", "name": "Bed", "position": [0.0, 0.25, 0.0],
              "dimensions": [1.8, 0.5, 2.0], "color": "#E57373" },
            { "id": "desk", "name": "Desk", "position": [2.0, 0.375, -1.0],
              "dimensions": [1.2, 0.75, 0.6] },
            { "name": "Mystery" }
        ]
    }"##;

    #[test]
    fn normalize_fills_defaults() {
        let out = DesignDocument::from_json(&normalize_design_json(DESIGN).unwrap()).unwrap();
        assert_eq!(out.furniture.len(), 3);
        let mystery = &out.furniture[2];
        assert!(mystery.id.is_some());
        assert_eq!(mystery.dimensions, Some(vec![1.0, 1.0, 1.0]));
        assert_eq!(mystery.rotation, Some(Rotation::Deg0));
        assert_eq!(mystery.kind.as_deref(), Some("box"));
        assert!(out.room_dimensions.floor_color.is_some());
    }

    #[test]
    fn move_settles_against_neighbor() {
        let out = move_item_json(DESIGN, "desk", 0.5, 0.0).unwrap();
        let out = DesignDocument::from_json(&out).unwrap();
        let desk = out
            .furniture
            .iter()
            .find(|r| r.id.as_ref().map(|id| id.as_str()) == Some("desk"))
            .unwrap();
        let pos = desk.position.clone().unwrap();
        // Desk [-0.1, 1.1] overlaps bed [-0.9, 0.9]; pushing right is shortest.
        assert!((pos[0] - 1.55).abs() < 1e-9, "{pos:?}");
        assert_eq!(pos[2], 0.0);
    }

    #[test]
    fn rotate_reports_unknown_item() {
        assert!(matches!(
            rotate_item_json(DESIGN, "sofa"),
            Err(LayoutError::ItemNotFound(_))
        ));
    }

    #[test]
    fn rotate_updates_rotation() {
        let out = DesignDocument::from_json(&rotate_item_json(DESIGN, "bed").unwrap()).unwrap();
        assert_eq!(out.furniture[0].rotation, Some(Rotation::Deg90));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(normalize_design_json("{"), Err(LayoutError::Json(_))));
    }
}
