use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Element kinds the engine understands. Anything else is rejected at parse
/// time, before layout runs.
const KNOWN_KINDS: [&str; 5] = ["bar", "box", "flowNode", "metric", "text"];

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("element {index}: unknown kind `{kind}`")]
    UnknownKind { index: usize, kind: String },
    #[error("element {index}: missing `kind` discriminator")]
    MissingKind { index: usize },
    #[error("element {index}: duplicate id `{id}`")]
    DuplicateId { index: usize, id: String },
    #[error("spec is not valid JSON: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarElement {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub value: f32,
    pub display_value: Option<String>,
    pub category: Option<String>,
    pub group: Option<String>,
    pub order: Option<i32>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxElement {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub value: Option<f32>,
    pub percentage: Option<f32>,
    pub parent_id: Option<String>,
    pub category: Option<String>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeElement {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub value: Option<f32>,
    /// Explicit stage index. When absent the level is inferred from the
    /// connection graph.
    pub column: Option<usize>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricElement {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub value: Option<f32>,
    pub display_value: Option<String>,
    pub trend: Option<Trend>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Element {
    #[serde(rename = "bar")]
    Bar(BarElement),
    #[serde(rename = "box")]
    Box(BoxElement),
    #[serde(rename = "flowNode")]
    FlowNode(FlowNodeElement),
    #[serde(rename = "metric")]
    Metric(MetricElement),
    #[serde(rename = "text")]
    Text(TextElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Bar(e) => &e.id,
            Element::Box(e) => &e.id,
            Element::FlowNode(e) => &e.id,
            Element::Metric(e) => &e.id,
            Element::Text(e) => &e.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Element::Bar(e) => &e.label,
            Element::Box(e) => &e.label,
            Element::FlowNode(e) => &e.label,
            Element::Metric(e) => &e.label,
            Element::Text(e) => &e.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub value: Option<f32>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    Horizontal,
    Vertical,
    Grid,
    Tree,
    Flow,
    Waterfall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutHints {
    pub arrangement: Option<Arrangement>,
    pub group_by: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

/// Per-edge canvas padding. The top and bottom defaults reserve the bands a
/// host renderer uses for title and legend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 48.0,
            right: 24.0,
            bottom: 36.0,
            left: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub padding: Padding,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            padding: Padding::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSpec {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub layout_hints: LayoutHints,
    /// Optional embedded canvas; callers may also pass one explicitly.
    pub canvas: Option<CanvasConfig>,
}

/// Parses a diagram spec from JSON. Strict JSON is tried first; JSON5 is
/// accepted as a fallback for hand-written fixtures. Elements with an unknown
/// `kind` are rejected with a typed error naming the offending element, so a
/// spec that parses is guaranteed to lay out.
pub fn parse_spec(input: &str) -> Result<DiagramSpec, SpecError> {
    let value = match serde_json::from_str::<serde_json::Value>(input) {
        Ok(value) => value,
        Err(_) => {
            json5::from_str::<serde_json::Value>(input).map_err(|err| SpecError::Parse(err.to_string()))?
        }
    };
    spec_from_value(value)
}

fn spec_from_value(value: serde_json::Value) -> Result<DiagramSpec, SpecError> {
    if let Some(elements) = value.get("elements").and_then(|v| v.as_array()) {
        for (index, element) in elements.iter().enumerate() {
            match element.get("kind").and_then(|k| k.as_str()) {
                Some(kind) if KNOWN_KINDS.contains(&kind) => {}
                Some(kind) => {
                    return Err(SpecError::UnknownKind {
                        index,
                        kind: kind.to_string(),
                    });
                }
                None => return Err(SpecError::MissingKind { index }),
            }
        }
    }
    let spec: DiagramSpec =
        serde_json::from_value(value).map_err(|err| SpecError::Parse(err.to_string()))?;
    let mut seen: HashSet<&str> = HashSet::new();
    for (index, element) in spec.elements.iter().enumerate() {
        if !seen.insert(element.id()) {
            return Err(SpecError::DuplicateId {
                index,
                id: element.id().to_string(),
            });
        }
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_elements() {
        let spec = parse_spec(
            r#"{
                "elements": [
                    {"kind": "bar", "id": "q1", "label": "Q1", "value": 12.5},
                    {"kind": "box", "id": "tech", "label": "Tech", "percentage": 40},
                    {"kind": "flowNode", "id": "rev", "label": "Revenue", "column": 0},
                    {"kind": "metric", "id": "pe", "label": "P/E", "value": 24.1, "trend": "up"},
                    {"kind": "text", "id": "note", "label": "est.", "x": 10, "y": 20}
                ],
                "connections": [{"from": "rev", "to": "tech", "value": 5}]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.elements.len(), 5);
        assert_eq!(spec.connections.len(), 1);
        match &spec.elements[3] {
            Element::Metric(metric) => assert_eq!(metric.trend, Some(Trend::Up)),
            other => panic!("expected metric, got {other:?}"),
        }
    }

    #[test]
    fn accepts_json5_fallback() {
        let spec = parse_spec(
            "{ elements: [ {kind: 'bar', id: 'a', label: 'A', value: 1}, ], }",
        )
        .unwrap();
        assert_eq!(spec.elements[0].id(), "a");
    }

    #[test]
    fn rejects_unknown_kind_with_index() {
        let err = parse_spec(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 1},
                {"kind": "sparkline", "id": "b"}
            ]}"#,
        )
        .unwrap_err();
        match err {
            SpecError::UnknownKind { index, kind } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "sparkline");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_spec(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 1},
                {"kind": "bar", "id": "a", "value": 2}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::DuplicateId { index: 1, .. }));
    }

    #[test]
    fn hints_and_canvas_are_optional() {
        let spec = parse_spec(r#"{"elements": []}"#).unwrap();
        assert!(spec.layout_hints.arrangement.is_none());
        assert!(spec.canvas.is_none());
    }
}
