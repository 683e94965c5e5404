use serde::Serialize;

use crate::color::LayerColor;
use crate::feature::Feature;
use crate::layer::{Layer, LayerId};

/// The authoritative collection of layers and the active-layer pointer.
///
/// Every operation is synchronous and total: unknown ids are silently
/// ignored rather than reported. Callers that mirror the store into a
/// drawing engine re-render after each call.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LayerStore {
    /// Layers in creation order.
    layers: Vec<Layer>,
    /// Layer that receives newly drawn shapes.
    active_layer_id: Option<LayerId>,
    /// Bumped on every state change.
    #[serde(skip)]
    revision: u64,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Layer management ─────────────────────────────────────────────

    /// Create a layer, append it, and make it the active layer.
    ///
    /// Without an explicit colour the layer gets a random pastel one.
    pub fn add_layer(&mut self, name: &str, color: Option<LayerColor>) -> LayerId {
        let mut layer = Layer::new(name);
        if let Some(color) = color {
            layer.color = color;
        }
        let id = layer.id;
        log::debug!("Adding layer {:?} ({}) with colour {}", name, id, layer.color);
        self.layers.push(layer);
        self.active_layer_id = Some(id);
        self.touch();
        id
    }

    /// Remove a layer. Clears the active pointer if it pointed at it.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        let removed = self.layers.remove(index);
        if self.active_layer_id == Some(id) {
            self.active_layer_id = None;
        }
        self.touch();
        Some(removed)
    }

    /// Point the active layer at `id`.
    ///
    /// The id is not checked against the collection; a dangling pointer is
    /// simply never resolved by [`LayerStore::active_layer`].
    pub fn set_active_layer(&mut self, id: LayerId) {
        self.active_layer_id = Some(id);
        self.touch();
    }

    pub fn toggle_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = !layer.visible;
            self.touch();
        }
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layer_mut(id) {
            if layer.visible != visible {
                layer.visible = visible;
                self.touch();
            }
        }
    }

    /// Change a layer's colour. Already stored features keep their stamped
    /// colour; renders pick up the new one.
    pub fn set_layer_color(&mut self, id: LayerId, color: LayerColor) {
        if let Some(layer) = self.layer_mut(id) {
            layer.color = color;
            self.touch();
        }
    }

    // ── Features ─────────────────────────────────────────────────────

    /// Append a copy of `feature`, stamped with the layer's current colour.
    pub fn add_feature_to_layer(&mut self, id: LayerId, feature: Feature) {
        if let Some(layer) = self.layer_mut(id) {
            layer.push_feature(feature);
            self.touch();
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer_id
    }

    /// The active layer, if the pointer is set and still resolves.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer_id.and_then(|id| self.layer(id))
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Features of every visible layer, in layer order then insertion order,
    /// each styled with its layer's current colour.
    pub fn visible_features(&self) -> Vec<Feature> {
        self.visible_layers()
            .flat_map(Layer::styled_features)
            .collect()
    }

    /// Current visibility of every layer, in layer order.
    pub fn visibility_snapshot(&self) -> Vec<(LayerId, bool)> {
        self.layers.iter().map(|l| (l.id, l.visible)).collect()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn feature_count(&self) -> usize {
        self.layers.iter().map(Layer::feature_count).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
