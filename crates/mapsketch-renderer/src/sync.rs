use mapsketch_core::LayerStore;

use crate::engine::DrawingEngine;
use crate::render_data::FeatureCollection;

/// Mirrors the store into the engine's committed-feature display.
///
/// Each pass clears the display and resubmits every visible feature, styled
/// with its layer's colour as of this pass. No diffing.
#[derive(Debug, Default)]
pub struct RenderSynchronizer {
    passes: u64,
    last_emitted: usize,
}

impl RenderSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collection a pass over `store` would emit.
    pub fn visible_collection(store: &LayerStore) -> FeatureCollection {
        FeatureCollection::new(store.visible_features())
    }

    /// Run one full pass. Returns the number of features emitted.
    pub fn sync<E: DrawingEngine + ?Sized>(&mut self, store: &LayerStore, engine: &mut E) -> usize {
        engine.clear_displayed_features();
        let collection = Self::visible_collection(store);
        engine.replace_displayed_features(&collection);

        self.passes += 1;
        self.last_emitted = collection.len();
        log::debug!(
            "Render pass {} at store revision {}: {} feature(s) from {} layer(s)",
            self.passes,
            store.revision(),
            collection.len(),
            store.layer_count()
        );
        collection.len()
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn last_emitted(&self) -> usize {
        self.last_emitted
    }
}
