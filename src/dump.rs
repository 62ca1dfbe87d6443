use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::layout::LayoutResult;
use crate::spec::Trend;

/// Serializable mirror of a layout result, for the CLI and for fixture
/// comparisons in tests.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub kind: String,
    pub width: f32,
    pub height: f32,
    pub elements: Vec<ElementDump>,
    pub links: Vec<LinkDump>,
    pub bridges: Vec<BridgeDump>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ElementDump {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub value: f32,
    pub thickness: f32,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub control1: [f32; 2],
    pub control2: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct BridgeDump {
    pub from: String,
    pub to: String,
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl LayoutDump {
    pub fn from_result(result: &LayoutResult) -> Self {
        let elements = result
            .elements
            .values()
            .map(|element| ElementDump {
                id: element.id.clone(),
                label: element.label.clone(),
                value: element.value,
                display_value: element.display_value.clone(),
                x: element.x,
                y: element.y,
                width: element.width,
                height: element.height,
                depth: element.depth,
                level: element.level,
                trend: element.trend,
            })
            .collect();
        let links = result
            .links
            .iter()
            .map(|link| LinkDump {
                source: link.source.clone(),
                target: link.target.clone(),
                value: link.value,
                thickness: link.thickness,
                start: [link.start.0, link.start.1],
                end: [link.end.0, link.end.1],
                control1: [link.control1.0, link.control1.1],
                control2: [link.control2.0, link.control2.1],
            })
            .collect();
        let bridges = result
            .bridges
            .iter()
            .map(|bridge| BridgeDump {
                from: bridge.from.clone(),
                to: bridge.to.clone(),
                start: [bridge.start.0, bridge.start.1],
                end: [bridge.end.0, bridge.end.1],
            })
            .collect();
        Self {
            kind: result.kind.as_str().to_string(),
            width: result.width,
            height: result.height,
            elements,
            links,
            bridges,
            warnings: result.warnings.clone(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_layout_dump(path: &Path, result: &LayoutResult) -> anyhow::Result<()> {
    let dump = LayoutDump::from_result(result);
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
