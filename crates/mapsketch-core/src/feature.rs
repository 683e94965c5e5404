use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::color::LayerColor;
use crate::geometry::Geometry;

/// Property key under which a feature carries its owning layer's colour.
///
/// Both the store (on commit) and the render pass (on every sync) write
/// this one key.
pub const COLOR_PROPERTY: &str = "color";

/// A GeoJSON feature: one shape plus free-form properties.
///
/// `geometry` is optional because drawing engines can hand over features
/// without a usable shape; such features are never committed to a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn has_valid_geometry(&self) -> bool {
        self.geometry.as_ref().is_some_and(Geometry::is_valid)
    }

    /// The colour currently stamped on this feature, if any.
    pub fn stamped_color(&self) -> Option<LayerColor> {
        self.properties
            .get(COLOR_PROPERTY)
            .and_then(Value::as_str)
            .and_then(|s| LayerColor::parse(s).ok())
    }

    pub fn stamp_color(&mut self, color: LayerColor) {
        self.properties
            .insert(COLOR_PROPERTY.to_string(), Value::String(color.to_css()));
    }

    /// A copy of this feature with `color` stamped on it. `self` is untouched.
    pub fn stamped(&self, color: LayerColor) -> Self {
        let mut copy = self.clone();
        copy.stamp_color(color);
        copy
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_stamped_copy_leaves_original() {
        let f = Feature::new(Geometry::Point(Point::new(1.0, 2.0))).with_property("name", "well");
        let s = f.stamped(LayerColor::rgb(255, 0, 0));
        assert_eq!(s.stamped_color(), Some(LayerColor::rgb(255, 0, 0)));
        assert_eq!(s.properties["name"], "well");
        assert!(f.stamped_color().is_none());
    }

    #[test]
    fn test_geojson_round_trip_with_null_properties() {
        let json = serde_json::json!({
            "type": "Feature",
            "id": "abc",
            "geometry": {"type": "Point", "coordinates": [72.8, 19.0]},
            "properties": null
        });
        let f: Feature = serde_json::from_value(json).unwrap();
        assert!(f.properties.is_empty());
        assert!(f.has_valid_geometry());

        let out = serde_json::to_value(&f).unwrap();
        assert_eq!(out["type"], "Feature");
        assert_eq!(out["geometry"]["type"], "Point");
    }

    #[test]
    fn test_missing_geometry_is_invalid() {
        let json = serde_json::json!({"type": "Feature", "geometry": null, "properties": {}});
        let f: Feature = serde_json::from_value(json).unwrap();
        assert!(!f.has_valid_geometry());
    }
}
