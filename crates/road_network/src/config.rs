//! Tunables for the road layout builder.
//!
//! All four values mirror the scalars a level designer sets on a settlement:
//! how far a road may reach, how densely waypoints are placed along a road,
//! and how many roads may meet at a single POI.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Parameters consumed by [`crate::layout::build_road_layout`].
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLayoutParams {
    /// Connections longer than this are pruning candidates, and only
    /// connections within it can be restored after pruning.
    pub max_poi_connection_distance: f32,
    /// Spacing quantum for waypoint subdivision. Must be positive.
    pub min_intersection_distance: f32,
    /// Degree cap per POI. Pruning fires on `degree > cap`, restoration
    /// requires `degree < cap`.
    pub max_poi_connections: u32,
    /// Reserved. Read from config files but not enforced by the builder.
    pub max_intersection_connections: u32,
}

impl Default for RoadLayoutParams {
    fn default() -> Self {
        Self {
            max_poi_connection_distance: 60.0,
            min_intersection_distance: 12.0,
            max_poi_connections: 3,
            max_intersection_connections: 4,
        }
    }
}

impl RoadLayoutParams {
    /// Check that the values can drive a build.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.min_intersection_distance.is_finite() || self.min_intersection_distance <= 0.0 {
            return Err(LayoutError::InvalidParams(format!(
                "min_intersection_distance must be finite and > 0, got {}",
                self.min_intersection_distance
            )));
        }
        if self.max_poi_connection_distance.is_nan() || self.max_poi_connection_distance < 0.0 {
            return Err(LayoutError::InvalidParams(format!(
                "max_poi_connection_distance must be >= 0, got {}",
                self.max_poi_connection_distance
            )));
        }
        Ok(())
    }

    /// Parse a JSON override. Fields missing from the file keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(RoadLayoutParams::default().validate().is_ok());
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let params = RoadLayoutParams {
            min_intersection_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(LayoutError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_nan_spacing_rejected() {
        let params = RoadLayoutParams {
            min_intersection_distance: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_max_distance_rejected() {
        let params = RoadLayoutParams {
            max_poi_connection_distance: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_infinite_max_distance_allowed() {
        let params = RoadLayoutParams {
            max_poi_connection_distance: f32::INFINITY,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial_override() {
        let params =
            RoadLayoutParams::from_json(r#"{ "max_poi_connections": 2 }"#).expect("parse");
        assert_eq!(params.max_poi_connections, 2);
        let defaults = RoadLayoutParams::default();
        assert_eq!(
            params.min_intersection_distance,
            defaults.min_intersection_distance
        );
        assert_eq!(
            params.max_poi_connection_distance,
            defaults.max_poi_connection_distance
        );
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let result = RoadLayoutParams::from_json(r#"{ "min_intersection_distance": -3.0 }"#);
        assert!(matches!(result, Err(LayoutError::InvalidParams(_))));
    }

    #[test]
    fn test_from_json_rejects_malformed_file() {
        let result = RoadLayoutParams::from_json("max_poi_connections = 2");
        assert!(matches!(result, Err(LayoutError::ParseParams(_))));
    }

    #[test]
    fn test_serde_roundtrip() {
        let params = RoadLayoutParams {
            max_poi_connection_distance: 80.0,
            min_intersection_distance: 5.0,
            max_poi_connections: 5,
            max_intersection_connections: 2,
        };
        let json = serde_json::to_string(&params).expect("serialize");
        let restored: RoadLayoutParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, params);
    }
}
