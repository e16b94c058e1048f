//! # Court and Batch Configuration
//!
//! Court constants (basket positions, court bounds, node-id sentinels) and
//! batch-driver settings live here and are handed to the builder and driver
//! explicitly.
//!
//! ```rust
//! use cg_core::config::{BatchConfig, CourtConfig, FailurePolicy};
//!
//! let court = CourtConfig::default();
//! let batch = BatchConfig {
//!     policy: FailurePolicy::SkipAndRecord,
//!     ..BatchConfig::default()
//! };
//! assert_eq!(court.basket1.x, 5.25);
//! assert!(!batch.parallel);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::geometry::Point;
use crate::graph::NodeId;

/// Court constants used by the frame graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtConfig {
    /// Basket 1 position (default: 5.25, 25)
    pub basket1: Point,
    /// Basket 2 position (default: 88.75, 25)
    pub basket2: Point,

    // === Court bounds ===
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,

    // === Node ids ===
    pub ball_id: NodeId,
    pub basket1_id: NodeId,
    pub basket2_id: NodeId,

    // === Name sentinels for non-player nodes ===
    pub ball_name: i32,
    pub basket1_name: i32,
    pub basket2_name: i32,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            basket1: Point::new(5.25, 25.0),
            basket2: Point::new(88.75, 25.0),

            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 50.0,

            ball_id: 10,
            basket1_id: 11,
            basket2_id: 12,

            ball_name: -1,
            basket1_name: -2,
            basket2_name: -3,
        }
    }
}

impl CourtConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s).map_err(|e| GraphError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| GraphError::InvalidConfig {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the builder cannot work with.
    ///
    /// Player ids occupy 0..10, so the ball and basket ids must sit at or
    /// above 10 and be pairwise distinct.
    pub fn validate(&self) -> Result<()> {
        if !self.basket1.is_finite() || !self.basket2.is_finite() {
            return Err(GraphError::InvalidConfig {
                reason: "basket coordinates must be finite".to_string(),
            });
        }
        if self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(GraphError::InvalidConfig {
                reason: format!(
                    "empty court bounds x[{}, {}] y[{}, {}]",
                    self.x_min, self.x_max, self.y_min, self.y_max
                ),
            });
        }
        let ids = [self.ball_id, self.basket1_id, self.basket2_id];
        if ids.iter().any(|&id| (id as usize) < crate::models::PLAYER_COUNT) {
            return Err(GraphError::InvalidConfig {
                reason: format!("ball/basket ids {ids:?} collide with player ids"),
            });
        }
        if ids[0] == ids[1] || ids[0] == ids[2] || ids[1] == ids[2] {
            return Err(GraphError::InvalidConfig {
                reason: format!("ball/basket ids {ids:?} must be distinct"),
            });
        }
        Ok(())
    }
}

/// What the batch driver does when a single frame cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing frame and return its error
    #[default]
    Abort,
    /// Skip failing frames and list them in the batch report
    SkipAndRecord,
}

/// Batch driver settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub policy: FailurePolicy,
    /// Build frames on the rayon pool (output order is unchanged)
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = CourtConfig::default();
        assert_eq!(cfg.basket1, Point::new(5.25, 25.0));
        assert_eq!(cfg.basket2, Point::new(88.75, 25.0));
        assert_eq!((cfg.ball_id, cfg.basket1_id, cfg.basket2_id), (10, 11, 12));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let cfg = CourtConfig::from_yaml_str("basket2:\n  x: 90.0\n  y: 25.0\n").unwrap();
        assert_eq!(cfg.basket2, Point::new(90.0, 25.0));
        assert_eq!(cfg.basket1, CourtConfig::default().basket1);
    }

    #[test]
    fn test_json_rejects_colliding_ids() {
        let err = CourtConfig::from_json_str(r#"{"ball_id": 3}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let cfg = CourtConfig {
            basket2_id: 11,
            ..CourtConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_basket() {
        let cfg = CourtConfig {
            basket1: Point::new(f64::NAN, 25.0),
            ..CourtConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&FailurePolicy::SkipAndRecord).unwrap();
        assert_eq!(json, "\"skip_and_record\"");
    }
}
