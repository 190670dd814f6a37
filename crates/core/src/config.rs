//! Engine configuration
//!
//! Settings can be built programmatically, deserialized from a config file
//! (see the storage crate) or overlaid from environment variables.

use crate::error::{EngineError, EngineResult};
use crate::geometry::DEFAULT_EXPANSION_FACTOR;
use crate::stroke::StrokeStyle;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`EngineConfig::expansion_factor`]
pub const ENV_EXPANSION_FACTOR: &str = "INKMARGIN_EXPANSION_FACTOR";
/// Environment variable overriding [`EngineConfig::max_undo_depth`]
pub const ENV_MAX_UNDO_DEPTH: &str = "INKMARGIN_MAX_UNDO_DEPTH";
/// Environment variable overriding [`EngineConfig::eraser_radius`]
pub const ENV_ERASER_RADIUS: &str = "INKMARGIN_ERASER_RADIUS";

/// Configuration for the annotation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drawing surface size as a multiple of the page size
    pub expansion_factor: f32,
    /// Tool in effect before the user picks one
    pub default_pen: StrokeStyle,
    /// Undo snapshots kept for the current page
    pub max_undo_depth: usize,
    /// Eraser hit radius in surface units
    pub eraser_radius: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            default_pen: StrokeStyle::pen(),
            max_undo_depth: 100,
            eraser_radius: 4.0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expansion_factor(mut self, factor: f32) -> Self {
        self.expansion_factor = factor;
        self
    }

    pub fn with_max_undo_depth(mut self, depth: usize) -> Self {
        self.max_undo_depth = depth;
        self
    }

    pub fn with_eraser_radius(mut self, radius: f32) -> Self {
        self.eraser_radius = radius;
        self
    }

    /// Defaults overlaid with any `INKMARGIN_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from a key lookup. Unparsable values are logged and ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = parse_var::<f32>(&lookup, ENV_EXPANSION_FACTOR) {
            self.expansion_factor = value;
        }
        if let Some(value) = parse_var::<usize>(&lookup, ENV_MAX_UNDO_DEPTH) {
            self.max_undo_depth = value;
        }
        if let Some(value) = parse_var::<f32>(&lookup, ENV_ERASER_RADIUS) {
            self.eraser_radius = value;
        }
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.expansion_factor.is_finite() || self.expansion_factor < 1.0 {
            return Err(EngineError::InvalidExpansionFactor(self.expansion_factor));
        }
        if !self.eraser_radius.is_finite() || self.eraser_radius < 0.0 {
            return Err(EngineError::InvalidEraserRadius(self.eraser_radius));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.expansion_factor - 2.8).abs() < 0.001);
        assert_eq!(config.default_pen, StrokeStyle::pen());
        assert_eq!(config.max_undo_depth, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_expansion_factor(2.0)
            .with_max_undo_depth(5)
            .with_eraser_radius(1.5);
        assert_eq!(config.expansion_factor, 2.0);
        assert_eq!(config.max_undo_depth, 5);
        assert_eq!(config.eraser_radius, 1.5);
    }

    #[test]
    fn test_validate_expansion_factor() {
        assert!(EngineConfig::new().with_expansion_factor(1.0).validate().is_ok());
        assert!(matches!(
            EngineConfig::new().with_expansion_factor(0.5).validate(),
            Err(EngineError::InvalidExpansionFactor(_))
        ));
        assert!(EngineConfig::new().with_expansion_factor(f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_validate_eraser_radius() {
        assert!(EngineConfig::new().with_eraser_radius(0.0).validate().is_ok());
        assert!(matches!(
            EngineConfig::new().with_eraser_radius(-5.0).validate(),
            Err(EngineError::InvalidEraserRadius(_))
        ));
        assert!(EngineConfig::new().with_eraser_radius(f32::NAN).validate().is_err());

        let lookup = |key: &str| (key == ENV_ERASER_RADIUS).then(|| "-5".to_string());
        let config = EngineConfig::default().overlay(lookup);
        assert_eq!(config.eraser_radius, -5.0);
        assert!(matches!(config.validate(), Err(EngineError::InvalidEraserRadius(_))));
    }

    #[test]
    fn test_overlay() {
        let vars: HashMap<&str, &str> = [
            (ENV_EXPANSION_FACTOR, "3.5"),
            (ENV_MAX_UNDO_DEPTH, "not-a-number"),
            (ENV_ERASER_RADIUS, " 8 "),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default().overlay(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.expansion_factor, 3.5);
        assert_eq!(config.max_undo_depth, 100);
        assert_eq!(config.eraser_radius, 8.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "expansion_factor": 2.0 }"#).unwrap();
        assert_eq!(config.expansion_factor, 2.0);
        assert_eq!(config.max_undo_depth, 100);
    }
}
