//! Panel options
//!
//! Read once when a session is constructed, never mid-game. The host stores
//! options as a flat JSON object whose keys are the human-facing option
//! names; values may be numbers or numeric strings. Out-of-range values are
//! clamped rather than rejected.

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::surface::OverlayMode;

/// How the game composites over existing panel content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverlayStyle {
    #[default]
    #[serde(alias = "overwrite")]
    Overwrite,
    #[serde(alias = "transparent")]
    Transparent,
}

impl OverlayStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayStyle::Overwrite => "Overwrite",
            OverlayStyle::Transparent => "Transparent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Some(OverlayStyle::Overwrite),
            "transparent" => Some(OverlayStyle::Transparent),
            _ => None,
        }
    }

    /// Panel mode to switch to while the game owns the panel
    pub fn overlay_mode(&self) -> OverlayMode {
        match self {
            OverlayStyle::Overwrite => OverlayMode::Enabled,
            OverlayStyle::Transparent => OverlayMode::TransparentRgb,
        }
    }
}

/// Highest life count any game allows
pub const MAX_LIVES: i32 = 5;

/// Options for every cabinet game on a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeOptions {
    // === Shared ===
    /// Each logical cell renders as an N x N pixel block
    #[serde(rename = "Pixel Scaling", deserialize_with = "lenient_int")]
    pub pixel_scaling: i32,
    #[serde(rename = "overlay")]
    pub overlay: OverlayStyle,
    /// Fixed RNG seed (random per session when absent)
    #[serde(rename = "Seed")]
    pub seed: Option<u64>,

    // === Breakout ===
    #[serde(rename = "Lives", deserialize_with = "lenient_int")]
    pub lives: i32,

    // === Pong ===
    /// Key scheme 1..=3
    #[serde(rename = "Controls", deserialize_with = "lenient_int")]
    pub controls: i32,

    // === Tetris ===
    #[serde(rename = "Rows", deserialize_with = "lenient_int")]
    pub rows: i32,
    #[serde(rename = "Colums", alias = "Columns", deserialize_with = "lenient_int")]
    pub columns: i32,

    // === Frogger ===
    /// River and road lane count
    #[serde(rename = "Lanes", deserialize_with = "lenient_int")]
    pub lanes: i32,
    /// 1..=10
    #[serde(rename = "River Speed", deserialize_with = "lenient_int")]
    pub river_speed: i32,
    /// 1..=10
    #[serde(rename = "Road Speed", deserialize_with = "lenient_int")]
    pub road_speed: i32,
    /// Lane-to-lane speed spread in percent
    #[serde(rename = "Speed Variability", deserialize_with = "lenient_int")]
    pub speed_variability: i32,
}

impl Default for ArcadeOptions {
    fn default() -> Self {
        Self {
            pixel_scaling: 1,
            overlay: OverlayStyle::Overwrite,
            seed: None,
            lives: 3,
            controls: 1,
            rows: 20,
            columns: 11,
            lanes: 5,
            river_speed: 1,
            road_speed: 1,
            speed_variability: 20,
        }
    }
}

impl ArcadeOptions {
    /// Parse options JSON and clamp every field
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let options: ArcadeOptions = serde_json::from_str(json)?;
        Ok(options.sanitized())
    }

    /// Parse options JSON, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("Invalid panel options ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Clamp every field into its playable range
    pub fn sanitized(&self) -> Self {
        Self {
            pixel_scaling: self.pixel_scaling.clamp(1, 20),
            overlay: self.overlay,
            seed: self.seed,
            lives: self.lives.clamp(1, MAX_LIVES),
            controls: self.controls.clamp(1, 3),
            rows: self.rows.clamp(4, 200),
            columns: self.columns.clamp(4, 200),
            lanes: self.lanes.clamp(1, 20),
            river_speed: self.river_speed.clamp(1, 10),
            road_speed: self.road_speed.clamp(1, 10),
            speed_variability: self.speed_variability.clamp(0, 100),
        }
    }

    /// Seed for a new session: the configured one, or a fresh random one
    pub fn session_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Map a 1..=10 speed setting onto a 0.6x..1.8x multiplier
pub fn speed_multiplier(setting: i32) -> f32 {
    let s = setting.clamp(1, 10);
    0.6 + (s - 1) as f32 * (1.2 / 9.0)
}

/// Accept integers, floats and numeric strings
fn lenient_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let n = match &value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| de::Error::custom(format!("invalid number {n}")))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {s:?}")))?,
        other => return Err(de::Error::custom(format!("expected an integer, got {other}"))),
    };
    Ok(n.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let options = ArcadeOptions::from_json("{}").unwrap();
        assert_eq!(options, ArcadeOptions::default());
    }

    #[test]
    fn test_string_and_number_values() {
        let options = ArcadeOptions::from_json(
            r#"{"Pixel Scaling": "2", "Lanes": 7, "overlay": "Transparent", "Colums": "12", "Seed": 42}"#,
        )
        .unwrap();
        assert_eq!(options.pixel_scaling, 2);
        assert_eq!(options.lanes, 7);
        assert_eq!(options.columns, 12);
        assert_eq!(options.overlay, OverlayStyle::Transparent);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.session_seed(), 42);
    }

    #[test]
    fn test_columns_alias() {
        let options = ArcadeOptions::from_json(r#"{"Columns": 9}"#).unwrap();
        assert_eq!(options.columns, 9);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let options = ArcadeOptions::from_json(
            r#"{"Pixel Scaling": 0, "Lives": 99, "Lanes": -3, "Speed Variability": 400, "Rows": 1}"#,
        )
        .unwrap();
        assert_eq!(options.pixel_scaling, 1);
        assert_eq!(options.lives, MAX_LIVES);
        assert_eq!(options.lanes, 1);
        assert_eq!(options.speed_variability, 100);
        assert_eq!(options.rows, 4);
    }

    #[test]
    fn test_malformed_falls_back_to_default() {
        assert!(ArcadeOptions::from_json(r#"{"Lanes": "many"}"#).is_err());
        assert_eq!(
            ArcadeOptions::from_json_or_default(r#"{"Lanes": "many"}"#),
            ArcadeOptions::default()
        );
        assert_eq!(
            ArcadeOptions::from_json_or_default("not json"),
            ArcadeOptions::default()
        );
    }

    #[test]
    fn test_overlay_style() {
        assert_eq!(OverlayStyle::from_str("TRANSPARENT"), Some(OverlayStyle::Transparent));
        assert_eq!(OverlayStyle::from_str("blend"), None);
        assert_eq!(OverlayStyle::Transparent.as_str(), "Transparent");
        assert_eq!(OverlayStyle::Overwrite.overlay_mode(), OverlayMode::Enabled);
        assert_eq!(
            OverlayStyle::Transparent.overlay_mode(),
            OverlayMode::TransparentRgb
        );
    }

    #[test]
    fn test_speed_multiplier_range() {
        assert!((speed_multiplier(1) - 0.6).abs() < 1e-6);
        assert!((speed_multiplier(10) - 1.8).abs() < 1e-5);
        assert!((speed_multiplier(0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_json_round_trip_keeps_host_keys() {
        let json = ArcadeOptions::default().to_json();
        assert!(json.contains("\"Pixel Scaling\""));
        assert!(json.contains("\"Speed Variability\""));
        assert_eq!(ArcadeOptions::from_json(&json).unwrap(), ArcadeOptions::default());
    }
}
