//! Furniture identifier sources.
//!
//! The controller never generates ids itself; it asks an [`IdSource`] so
//! hosts get random ids and tests get predictable ones.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::types::FurnitureId;

/// Draws [`fresh_id`] makes before giving up on the source.
const MAX_DRAWS: usize = 1024;

pub trait IdSource {
    fn next_id(&mut self) -> FurnitureId;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> FurnitureId {
        FurnitureId::new(Uuid::new_v4().simple().to_string())
    }
}

/// `<prefix>_1`, `<prefix>_2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> FurnitureId {
        let id = FurnitureId::new(format!("{}_{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<F> IdSource for F
where
    F: FnMut() -> FurnitureId,
{
    fn next_id(&mut self) -> FurnitureId {
        self()
    }
}

/// Draw from `ids` until the answer is non-empty and not in `taken`.
///
/// A source that keeps answering with taken ids (a restarted counter, a
/// constant closure) is abandoned after `MAX_DRAWS` draws and its last
/// answer gets a numeric suffix instead.
pub fn fresh_id(ids: &mut dyn IdSource, taken: &HashSet<FurnitureId>) -> FurnitureId {
    let mut candidate = ids.next_id();
    for _ in 1..MAX_DRAWS {
        if is_free(&candidate, taken) {
            return candidate;
        }
        candidate = ids.next_id();
    }
    if is_free(&candidate, taken) {
        return candidate;
    }
    warn!(last = %candidate, draws = MAX_DRAWS, "id source keeps repeating taken ids");
    let mut n = 2u64;
    loop {
        let suffixed = FurnitureId::new(format!("{candidate}_{n}"));
        if is_free(&suffixed, taken) {
            return suffixed;
        }
        n += 1;
    }
}

fn is_free(id: &FurnitureId, taken: &HashSet<FurnitureId>) -> bool {
    !id.as_str().is_empty() && !taken.contains(id)
}
