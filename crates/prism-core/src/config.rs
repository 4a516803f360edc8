//! Layered configuration system
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Environment variable: `PRISM_HIGHLIGHT_COLOR`
//! 2. Project-local: `.prism/config.toml`
//! 3. Global: `~/.prism/config.toml`
//! 4. Built-in defaults
//!
//! Layers are deep-merged as TOML tables, so a file only needs to name
//! the keys it overrides.

use crate::error::{PrismError, Result};
use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `highlight.color`
pub const HIGHLIGHT_COLOR_ENV: &str = "PRISM_HIGHLIGHT_COLOR";

/// Viewer camera defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 30.0,
            near: 0.1,
            far: 20.0,
            position: [0.0, 1.0, 5.0],
            target: [0.0, 1.0, 0.0],
        }
    }
}

/// Visual style of highlight gizmos and recolors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Hex color (`#rrggbb`) for gizmos and recolored spring bones
    pub color: String,
    /// Radius of the wireframe marker sphere
    pub gizmo_radius: f32,
    /// Render order given to gizmos so they draw on top
    pub render_order: i32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            color: "#ffa000".to_string(),
            gizmo_radius: 0.2,
            render_order: 10_000,
        }
    }
}

impl HighlightConfig {
    /// Parsed highlight color
    pub fn color(&self) -> Result<Color> {
        Color::parse_hex(&self.color).ok_or_else(|| {
            PrismError::ConfigError(format!("invalid highlight color '{}'", self.color))
        })
    }
}

/// Camera layer bits used for first/third person rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub first_person_only: u8,
    pub third_person_only: u8,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            first_person_only: 9,
            third_person_only: 10,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub camera: CameraConfig,
    pub highlight: HighlightConfig,
    pub layers: LayerConfig,
}

impl PrismConfig {
    /// Load config with layered precedence: defaults < global < project < env
    pub fn load() -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(global) = Self::global_config_path() {
            layers.push(global);
        }
        layers.push(PathBuf::from(".prism/config.toml"));
        Self::load_layers(&layers)
    }

    /// Load from an explicit list of files, lowest precedence first.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in paths {
            if path.exists() {
                let layer = Self::load_table(path)?;
                merge_tables(&mut merged, layer);
            }
        }

        let mut config: PrismConfig = toml::Value::Table(merged).try_into()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from TOML text (no env overrides)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PrismConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".prism").join("config.toml"))
    }

    fn load_table(path: &Path) -> Result<toml::Table> {
        let text = std::fs::read_to_string(path)?;
        text.parse::<toml::Table>().map_err(|e| {
            PrismError::TomlParseError(format!("{}: {}", path.display(), e))
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(color) = std::env::var(HIGHLIGHT_COLOR_ENV) {
            if !color.trim().is_empty() {
                self.highlight.color = color;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        self.highlight.color()?;
        if self.layers.first_person_only >= 32 || self.layers.third_person_only >= 32 {
            return Err(PrismError::ConfigError(
                "layer bits must be below 32".to_string(),
            ));
        }
        if self.layers.first_person_only == self.layers.third_person_only {
            return Err(PrismError::ConfigError(
                "first and third person layers must differ".to_string(),
            ));
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PrismConfig::default();
        assert_eq!(config.highlight.render_order, 10_000);
        assert_eq!(config.layers.first_person_only, 9);
        assert_eq!(config.layers.third_person_only, 10);
        assert!(config.highlight.color().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PrismConfig::from_toml_str(
            r##"
            [highlight]
            gizmo_radius = 0.5
            "##,
        )
        .unwrap();
        assert_eq!(config.highlight.gizmo_radius, 0.5);
        assert_eq!(config.highlight.render_order, 10_000);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result = PrismConfig::from_toml_str(
            r##"
            [highlight]
            color = "not-a-color"
            "##,
        );
        assert!(matches!(result, Err(PrismError::ConfigError(_))));
    }

    #[test]
    fn test_same_layers_rejected() {
        let result = PrismConfig::from_toml_str(
            r#"
            [layers]
            first_person_only = 3
            third_person_only = 3
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_tables_deep() {
        let mut base: toml::Table = toml::from_str(
            r#"
            [camera]
            fov = 45.0
            near = 0.5
            "#,
        )
        .unwrap();
        let overlay: toml::Table = toml::from_str(
            r#"
            [camera]
            fov = 60.0
            "#,
        )
        .unwrap();

        merge_tables(&mut base, overlay);

        let camera = base.get("camera").and_then(|v| v.as_table()).unwrap();
        assert_eq!(camera.get("fov").and_then(|v| v.as_float()), Some(60.0));
        assert_eq!(camera.get("near").and_then(|v| v.as_float()), Some(0.5));
    }

    #[test]
    fn test_load_layers_project_wins() {
        let dir = std::env::temp_dir().join(format!("prism_config_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let global = dir.join("global.toml");
        let local = dir.join("local.toml");
        std::fs::write(&global, "[camera]\nfov = 40.0\nfar = 50.0\n").unwrap();
        std::fs::write(&local, "[camera]\nfov = 70.0\n").unwrap();

        let config = PrismConfig::load_layers(&[global, local, dir.join("missing.toml")]).unwrap();
        assert_eq!(config.camera.fov, 70.0);
        assert_eq!(config.camera.far, 50.0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
