//! Engine Configuration
//!
//! Tunables for a projectile system, loadable from JSON. Every field has a
//! default, so a config file only needs the values it changes.
//!
//! ```json
//! {
//!     "worker_threads": 4,
//!     "debug_timings": true,
//!     "hitbox_sizes": { "zombie": { "x_half": 0.5, "z_half": 0.5, "y_height": 2.0, "y_offset": 0.0 } },
//!     "block_collision": { "glass": true }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::hitbox::HitboxSize;
use crate::raytrace::{DEFAULT_CONTINUITY_MARGIN, DEFAULT_MAX_DISTANCE_MARGIN};
use crate::systems::dynamics::DEFAULT_HITBOX_SEARCH_MARGIN;
use crate::world::block::Material;
use crate::world::entity::EntityKind;

/// Configuration for one [`ProjectileSystem`](crate::systems::ProjectileSystem).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dynamics worker threads; 0 runs dynamics on the calling thread
    pub worker_threads: usize,
    /// How long `update` waits for dynamics workers (milliseconds)
    pub worker_timeout_ms: u64,
    /// Padding around each projectile's path when gathering hitboxes (blocks)
    pub hitbox_search_margin: f32,
    /// How far the voxel march runs past the end of the tick's segment (blocks)
    pub raytrace_continuity_margin: f32,
    /// Slack added to `max_distance` during the voxel march (blocks)
    pub max_distance_margin: f32,
    /// Initial capacity of the live and staging projectile buffers
    pub staging_capacity: usize,
    /// Measure and log per-phase tick timings
    pub debug_timings: bool,
    /// Per-kind hitbox size overrides
    pub hitbox_sizes: HashMap<EntityKind, HitboxSize>,
    /// Per-kind targetable overrides
    pub targetable: HashMap<EntityKind, bool>,
    /// Force materials solid (`true`) or non-colliding (`false`)
    pub block_collision: HashMap<Material, bool>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: thread::available_parallelism().map_or(1, |n| n.get()),
            worker_timeout_ms: 1000,
            hitbox_search_margin: DEFAULT_HITBOX_SEARCH_MARGIN,
            raytrace_continuity_margin: DEFAULT_CONTINUITY_MARGIN,
            max_distance_margin: DEFAULT_MAX_DISTANCE_MARGIN,
            staging_capacity: 2000,
            debug_timings: false,
            hitbox_sizes: HashMap::new(),
            targetable: HashMap::new(),
            block_collision: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Single-threaded config: dynamics run inline in `update`.
    pub fn inline() -> Self {
        Self {
            worker_threads: 0,
            ..Self::default()
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            worker_threads: workers,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.worker_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "worker_timeout_ms must be greater than 0".into(),
            ));
        }
        let margins = [
            ("hitbox_search_margin", self.hitbox_search_margin),
            ("raytrace_continuity_margin", self.raytrace_continuity_margin),
            ("max_distance_margin", self.max_distance_margin),
        ];
        for (name, value) in margins {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        for (kind, size) in &self.hitbox_sizes {
            let dims = [size.x_half, size.z_half, size.y_height];
            if dims.iter().any(|d| !d.is_finite() || *d < 0.0) || !size.y_offset.is_finite() {
                return Err(EngineError::InvalidConfig(format!(
                    "hitbox size for {kind:?} must be finite and non-negative"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.worker_threads >= 1);
        assert_eq!(config.worker_timeout_ms, 1000);
        assert_eq!(config.hitbox_search_margin, 8.0);
        assert_eq!(config.raytrace_continuity_margin, 2.0);
        assert_eq!(config.max_distance_margin, 1.0);
        assert!(!config.debug_timings);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "worker_threads": 3,
            "debug_timings": true,
            "hitbox_sizes": { "zombie": { "x_half": 0.5, "z_half": 0.5, "y_height": 2.0, "y_offset": 0.0 } },
            "targetable": { "armor_stand": true },
            "block_collision": { "glass": true }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.worker_threads, 3);
        assert!(config.debug_timings);
        assert_eq!(config.worker_timeout_ms, 1000);
        assert_eq!(config.hitbox_sizes[&EntityKind::Zombie].y_height, 2.0);
        assert_eq!(config.targetable.get(&EntityKind::ArmorStand), Some(&true));
        assert_eq!(config.block_collision.get(&Material::Glass), Some(&true));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EngineConfig::inline();
        config.block_collision.insert(Material::Leaves, true);
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "worker_timeout_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_json_str(r#"{ "hitbox_search_margin": -1.0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/engine.json").unwrap_err();
        assert!(matches!(err, EngineError::ConfigRead { .. }));
    }
}
