//! Layout configuration
//!
//! Gap, margin and container constants. Every struct implements `Default`
//! with the values the editor uses, and deserializes from JSON so callers
//! can override individual fields.

use serde::{Deserialize, Serialize};

/// Spacing for one run of the layered layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum gap between nodes sharing a rank
    pub node_sep: f64,
    /// Minimum gap between consecutive ranks
    pub rank_sep: f64,
    /// Left margin of the translated layout
    pub margin_x: f64,
    /// Top margin of the translated layout
    pub margin_y: f64,
    /// Barycenter sweeps used to reduce crossings
    pub ordering_passes: usize,
}

impl LayoutConfig {
    /// Spacing for graphs laid out without containers
    pub fn top_level() -> Self {
        Self {
            node_sep: 60.0,
            rank_sep: 80.0,
            margin_x: 40.0,
            margin_y: 40.0,
            ordering_passes: 4,
        }
    }

    /// Tighter spacing used inside a lane; margins reserve the lane's
    /// left and top padding
    pub fn lane() -> Self {
        let padding = LanePadding::default();
        Self {
            node_sep: 50.0,
            rank_sep: 70.0,
            margin_x: padding.left,
            margin_y: padding.top,
            ordering_passes: 4,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::top_level()
    }
}

/// Inner padding of a lane around its content
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanePadding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for LanePadding {
    fn default() -> Self {
        Self {
            top: 30.0,
            bottom: 30.0,
            left: 50.0,
            right: 40.0,
        }
    }
}

/// Pool and lane box constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Header strip at the left of every pool
    pub pool_header_width: f64,
    /// Header strip at the left of every lane
    pub lane_header_width: f64,
    pub lane_padding: LanePadding,
    /// Box of a lane without content
    pub placeholder_width: f64,
    pub placeholder_height: f64,
    /// Floor applied to every lane's height
    pub min_lane_height: f64,
    /// Floor applied to a pool's normalized lane width
    pub min_lane_width: f64,
    /// Vertical gap between stacked pools
    pub pool_gap: f64,
    /// Left edge of every pool
    pub pool_x: f64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            pool_header_width: 36.0,
            lane_header_width: 30.0,
            lane_padding: LanePadding::default(),
            placeholder_width: 400.0,
            placeholder_height: 120.0,
            min_lane_height: 120.0,
            min_lane_width: 600.0,
            pool_gap: 60.0,
            pool_x: 40.0,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub top_level: LayoutConfig,
    /// Fields left out of a partial `lane` object take the top-level
    /// defaults, so an override should spell out the whole object
    pub lane: LayoutConfig,
    pub containers: ContainerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_level: LayoutConfig::top_level(),
            lane: LayoutConfig::lane(),
            containers: ContainerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration; missing fields keep their defaults
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_config_uses_padding_as_margin() {
        let lane = LayoutConfig::lane();
        assert_eq!(lane.node_sep, 50.0);
        assert_eq!(lane.rank_sep, 70.0);
        assert_eq!(lane.margin_x, 50.0);
        assert_eq!(lane.margin_y, 30.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"top_level": {"node_sep": 10.0}}"#).unwrap();
        assert_eq!(config.top_level.node_sep, 10.0);
        assert_eq!(config.top_level.rank_sep, 80.0);
        assert_eq!(config.containers, ContainerConfig::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }
}
