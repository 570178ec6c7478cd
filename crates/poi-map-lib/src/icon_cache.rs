//! Glyph cache keyed by (icon, pixel size)
//!
//! Owned by the [`MapSurface`](crate::MapSurface): created when the surface is attached
//! to a host and cleared when it is detached.

use std::collections::HashMap;

use crate::model::PoiType;
use crate::render::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    Poi(PoiType),
    Checkmark,
    Footprint,
}

impl IconKey {
    pub fn text(self) -> &'static str {
        match self {
            IconKey::Poi(poi_type) => poi_type.glyph(),
            IconKey::Checkmark => "✔️",
            IconKey::Footprint => "👣",
        }
    }
}

pub struct IconCache<G> {
    entries: HashMap<(IconKey, u32), G>,
}

impl<G: Clone> Default for IconCache<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Clone> IconCache<G> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached glyph, rasterizing it through `canvas` on first use
    pub fn get<C>(&mut self, canvas: &mut C, key: IconKey, size: f32) -> G
    where
        C: Canvas<Glyph = G> + ?Sized,
    {
        let size_px = size.round().max(1.0) as u32;
        self.entries
            .entry((key, size_px))
            .or_insert_with(|| {
                tracing::trace!(?key, size_px, "Rasterizing glyph");
                canvas.rasterize_glyph(key.text(), size_px as f32)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
