use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MapError;

/// RGB colour assigned to a layer and stamped onto its features.
///
/// Serialized as a CSS hex string (`#rrggbb`) so stamped feature properties
/// can be handed straight to a style expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LayerColor {
    fn default() -> Self {
        Self {
            r: 128,
            g: 128,
            b: 128,
        }
    }
}

impl LayerColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pastel colour with a random hue (`hsl(hue, 70%, 80%)`).
    pub fn random() -> Self {
        let hue = rand::thread_rng().gen_range(0..360);
        Self::from_hsl(hue as f64, 0.7, 0.8)
    }

    /// Convert from HSL. `hue` in degrees, `saturation` and `lightness` in 0.0..=1.0.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = to_channel(l);
            return Self::rgb(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::rgb(
            to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_channel(hue_to_rgb(p, q, h)),
            to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Parse a CSS colour: `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `hsl(h, s%, l%)`.
    pub fn parse(input: &str) -> Result<Self, MapError> {
        let s = input.trim();
        let invalid = || MapError::InvalidColor(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(args) = function_args(s, "rgb") {
            let parts = split_args(args);
            if parts.len() != 3 {
                return Err(invalid());
            }
            let mut channels = [0u8; 3];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                *slot = part.parse::<u8>().map_err(|_| invalid())?;
            }
            return Ok(Self::rgb(channels[0], channels[1], channels[2]));
        }
        if let Some(args) = function_args(s, "hsl") {
            let parts = split_args(args);
            if parts.len() != 3 {
                return Err(invalid());
            }
            let hue: f64 = parts[0].trim_end_matches("deg").parse().map_err(|_| invalid())?;
            let sat = parse_percent(parts[1]).ok_or_else(invalid)?;
            let light = parse_percent(parts[2]).ok_or_else(invalid)?;
            return Ok(Self::from_hsl(hue, sat, light));
        }
        Err(invalid())
    }

    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn parse_hex(hex: &str) -> Option<LayerColor> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(LayerColor::rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(LayerColor::rgb(r, g, b))
        }
        _ => None,
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let lower = s.to_ascii_lowercase();
    if !lower.starts_with(name) {
        return None;
    }
    let rest = s[name.len()..].trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

fn parse_percent(s: &str) -> Option<f64> {
    let v: f64 = s.strip_suffix('%')?.trim().parse().ok()?;
    Some(v / 100.0)
}

impl fmt::Display for LayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for LayerColor {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LayerColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for LayerColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(LayerColor::parse("#ff8000").unwrap(), LayerColor::rgb(255, 128, 0));
        assert_eq!(LayerColor::parse("#f80").unwrap(), LayerColor::rgb(255, 136, 0));
        assert!(LayerColor::parse("#ff80").is_err());
        assert!(LayerColor::parse("red").is_err());
    }

    #[test]
    fn test_parse_rgb_and_hsl() {
        assert_eq!(
            LayerColor::parse("rgb(10, 20, 30)").unwrap(),
            LayerColor::rgb(10, 20, 30)
        );
        assert_eq!(
            LayerColor::parse("hsl(0, 100%, 50%)").unwrap(),
            LayerColor::rgb(255, 0, 0)
        );
        assert_eq!(
            LayerColor::parse("hsl(120, 100%, 50%)").unwrap(),
            LayerColor::rgb(0, 255, 0)
        );
    }

    #[test]
    fn test_random_is_pastel() {
        for _ in 0..32 {
            let c = LayerColor::random();
            // 80% lightness keeps every channel well above black.
            assert!(c.r >= 150 && c.g >= 150 && c.b >= 150, "{c}");
        }
    }

    #[test]
    fn test_css_serialization() {
        let c = LayerColor::rgb(1, 2, 255);
        assert_eq!(c.to_css(), "#0102ff");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#0102ff\"");
        let back: LayerColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
