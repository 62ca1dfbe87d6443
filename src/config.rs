use std::path::Path;

use serde::{Deserialize, Serialize};

/// Knobs for the proportional-area strategies (treemap slicing and the
/// fixed-size hierarchy tree).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Visual gutter shaved off every treemap slice.
    pub gutter: f32,
    pub node_width: f32,
    pub node_height: f32,
    /// Upper bound on the vertical step between hierarchy levels.
    pub level_step: f32,
    pub sibling_gap: f32,
    pub min_node_width: f32,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            gutter: 3.0,
            node_width: 132.0,
            node_height: 46.0,
            level_step: 110.0,
            sibling_gap: 14.0,
            min_node_width: 24.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub node_width: f32,
    pub node_gap: f32,
    pub min_node_height: f32,
    pub min_link_thickness: f32,
    /// Floor applied to a node's effective value so zero-value nodes stay
    /// visible.
    pub value_floor: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            node_width: 16.0,
            node_gap: 10.0,
            min_node_height: 4.0,
            min_link_thickness: 1.5,
            value_floor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Fraction of the usable height the tallest plain bar occupies.
    pub fill_factor: f32,
    /// Fraction of each slot occupied by the bar itself.
    pub bar_fraction: f32,
    /// Symmetric headroom added to the waterfall scale range, as a fraction
    /// of the endpoint span.
    pub scale_headroom: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            fill_factor: 0.85,
            bar_fraction: 0.68,
            scale_headroom: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub max_card_width: f32,
    pub min_card_width: f32,
    pub card_height: f32,
    pub gap: f32,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            max_card_width: 180.0,
            min_card_width: 96.0,
            card_height: 104.0,
            gap: 16.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub area: AreaConfig,
    pub flow: FlowConfig,
    pub bars: BarConfig,
    pub metrics: MetricConfig,
}

/// Loads a layout config from an optional JSON file, merging it over the
/// defaults. JSON5 is accepted for hand-edited files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = match serde_json::from_str::<LayoutConfig>(&contents) {
        Ok(config) => config,
        Err(_) => json5::from_str::<LayoutConfig>(&contents)?,
    };
    Ok(config)
}
