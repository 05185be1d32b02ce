//! Collision tuning
//!
//! Numeric tolerances used by the swept tests. Defaults come from
//! [`crate::consts`]; a JSON file can override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BlammoError, BlammoResult};

/// Tolerances for the swept collision routines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Binary search stops when |dist² - radius²| drops below this
    pub binary_search_tolerance: f32,
    /// Binary search gives up after this many halvings
    pub binary_search_max_iterations: u32,
    /// Hits within this many seconds of the earliest one blend their normals
    pub simultaneous_hit_epsilon: f32,
    /// Seconds a weakpoint stays invulnerable after taking damage
    pub weakpoint_invulnerable_secs: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            binary_search_tolerance: BINARY_SEARCH_TOLERANCE,
            binary_search_max_iterations: BINARY_SEARCH_MAX_ITERATIONS,
            simultaneous_hit_epsilon: SIMULTANEOUS_HIT_EPSILON,
            weakpoint_invulnerable_secs: WEAKPOINT_INVULNERABLE_SECS,
        }
    }
}

impl CollisionConfig {
    /// Parse and validate a JSON config (missing fields take defaults)
    pub fn from_json(json: &str) -> BlammoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> BlammoResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| BlammoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded collision config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> BlammoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the numeric routines
    pub fn validate(&self) -> BlammoResult<()> {
        if self.binary_search_tolerance.is_nan() || self.binary_search_tolerance <= 0.0 {
            return Err(BlammoError::InvalidConfig(format!(
                "binary_search_tolerance must be > 0 (got {})",
                self.binary_search_tolerance
            )));
        }
        if self.binary_search_max_iterations == 0 {
            return Err(BlammoError::InvalidConfig(
                "binary_search_max_iterations must be at least 1".into(),
            ));
        }
        if self.simultaneous_hit_epsilon.is_nan() || self.simultaneous_hit_epsilon < 0.0 {
            return Err(BlammoError::InvalidConfig(format!(
                "simultaneous_hit_epsilon must be >= 0 (got {})",
                self.simultaneous_hit_epsilon
            )));
        }
        if self.weakpoint_invulnerable_secs.is_nan() || self.weakpoint_invulnerable_secs < 0.0 {
            return Err(BlammoError::InvalidConfig(format!(
                "weakpoint_invulnerable_secs must be >= 0 (got {})",
                self.weakpoint_invulnerable_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_consts() {
        let config = CollisionConfig::default();
        assert_eq!(config.binary_search_tolerance, BINARY_SEARCH_TOLERANCE);
        assert_eq!(config.binary_search_max_iterations, BINARY_SEARCH_MAX_ITERATIONS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CollisionConfig::from_json(r#"{ "binary_search_max_iterations": 40 }"#)
            .expect("valid config");
        assert_eq!(config.binary_search_max_iterations, 40);
        assert_eq!(config.binary_search_tolerance, BINARY_SEARCH_TOLERANCE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = CollisionConfig::from_json(r#"{ "binary_search_tolerance": 0.0 }"#);
        assert!(matches!(err, Err(BlammoError::InvalidConfig(_))));

        let err = CollisionConfig::from_json(r#"{ "binary_search_max_iterations": 0 }"#);
        assert!(matches!(err, Err(BlammoError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = CollisionConfig {
            simultaneous_hit_epsilon: 0.01,
            ..Default::default()
        };
        let json = config.to_json().expect("serializes");
        assert_eq!(CollisionConfig::from_json(&json).expect("parses"), config);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = CollisionConfig::load("/definitely/not/here.json");
        assert!(matches!(err, Err(BlammoError::ConfigRead { .. })));
    }
}
