use serde::{Deserialize, Serialize};

/// Which handle-role pairings may form a connection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Only source to target (or target to source when dragging from a target)
    #[default]
    Strict,
    /// Any pairing except a handle with itself
    Loose,
}

/// Edge band tuning for the auto-pan loop, in container pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPanConfig {
    /// Width of the band along each container edge that triggers panning
    pub edge_distance: f32,
    /// Pan per frame at full saturation
    pub speed: f32,
    /// Distance past the band's inner border at which speed saturates
    pub ramp: f32,
}

impl Default for AutoPanConfig {
    fn default() -> Self {
        Self {
            edge_distance: 35.0,
            speed: 20.0,
            ramp: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub connection_mode: ConnectionMode,
    /// Snap radius around handles, in diagram units
    pub connection_radius: f32,
    pub auto_pan_on_connect: bool,
    pub auto_pan: AutoPanConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_mode: ConnectionMode::Strict,
            connection_radius: 20.0,
            auto_pan_on_connect: true,
            auto_pan: AutoPanConfig::default(),
        }
    }
}
