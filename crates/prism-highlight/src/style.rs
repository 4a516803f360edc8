//! Highlight appearance

use prism_core::{Color, HighlightConfig, Result};

/// Color, gizmo size and draw order used by highlights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    pub color: Color,
    pub gizmo_radius: f32,
    pub render_order: i32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xffa000),
            gizmo_radius: 0.2,
            render_order: 10_000,
        }
    }
}

impl HighlightStyle {
    pub fn from_config(config: &HighlightConfig) -> Result<Self> {
        Ok(Self {
            color: config.color()?,
            gizmo_radius: config.gizmo_radius,
            render_order: config.render_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_config_default() {
        let style = HighlightStyle::from_config(&HighlightConfig::default()).unwrap();
        assert_eq!(style, HighlightStyle::default());
    }

    #[test]
    fn test_bad_color_is_error() {
        let config = HighlightConfig {
            color: "orange".into(),
            ..Default::default()
        };
        assert!(HighlightStyle::from_config(&config).is_err());
    }
}
