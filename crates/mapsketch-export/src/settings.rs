use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::page::Orientation;

/// Where and how exports are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// File name for a full-view export.
    pub view_file_name: String,
    /// File name for an isolated-layer export; `{name}` is replaced by the
    /// layer's name.
    pub layer_file_pattern: String,
    pub orientation: Orientation,
    /// Time given to the engine to settle after isolating a layer.
    pub settle_delay_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            view_file_name: "map-export.pdf".to_string(),
            layer_file_pattern: "layer-{name}.pdf".to_string(),
            orientation: Orientation::Landscape,
            settle_delay_ms: 500,
        }
    }
}

impl ExportSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn view_path(&self) -> PathBuf {
        self.output_dir.join(&self.view_file_name)
    }

    pub fn layer_path(&self, layer_name: &str) -> PathBuf {
        let file = self
            .layer_file_pattern
            .replace("{name}", &sanitize_file_stem(layer_name));
        self.output_dir.join(file)
    }
}

fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "layer".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_path_sanitized() {
        let s = ExportSettings {
            output_dir: PathBuf::from("out"),
            ..ExportSettings::default()
        };
        assert_eq!(s.layer_path("Main Roads/2024"), PathBuf::from("out/layer-Main_Roads_2024.pdf"));
        assert_eq!(s.layer_path("   "), PathBuf::from("out/layer-layer.pdf"));
        assert_eq!(s.view_path(), PathBuf::from("out/map-export.pdf"));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let s: ExportSettings = serde_json::from_str(r#"{"settle_delay_ms": 0}"#).unwrap();
        assert_eq!(s.settle_delay(), Duration::ZERO);
        assert_eq!(s.orientation, Orientation::Landscape);
        assert_eq!(s.view_file_name, "map-export.pdf");
    }
}
