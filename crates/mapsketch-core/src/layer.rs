use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::LayerColor;
use crate::feature::Feature;

/// Unique layer identifier, generated when the layer is created.
pub type LayerId = Uuid;

/// A named, coloured, independently toggleable collection of features.
///
/// Features keep their insertion order and are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub color: LayerColor,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            visible: true,
            color: LayerColor::random(),
            features: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: LayerColor) -> Self {
        self.color = color;
        self
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Stamp the layer's current colour onto `feature` and append it.
    pub(crate) fn push_feature(&mut self, feature: Feature) {
        self.features.push(feature.stamped(self.color));
    }

    /// Features styled with the layer's current colour, for rendering.
    pub fn styled_features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().map(|f| f.stamped(self.color))
    }
}
