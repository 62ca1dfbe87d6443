use std::collections::BTreeMap;

use crate::spec::{CanvasConfig, Trend};

/// The strategy the dispatcher settled on for one layout call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Empty,
    Treemap,
    Hierarchy,
    Flow,
    Bars,
    Waterfall,
    MetricGrid,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Empty => "empty",
            LayoutKind::Treemap => "treemap",
            LayoutKind::Hierarchy => "hierarchy",
            LayoutKind::Flow => "flow",
            LayoutKind::Bars => "bars",
            LayoutKind::Waterfall => "waterfall",
            LayoutKind::MetricGrid => "metricGrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn inset(self, pad: f32) -> Self {
        let pad = pad.max(0.0);
        Self {
            x: self.x + pad,
            y: self.y + pad,
            w: (self.w - pad * 2.0).max(0.0),
            h: (self.h - pad * 2.0).max(0.0),
        }
    }
}

/// Concrete geometry for one element, with label/value echoed through for
/// the renderer's convenience.
#[derive(Debug, Clone)]
pub struct ElementLayout {
    pub id: String,
    pub label: String,
    pub value: Option<f32>,
    pub display_value: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Hierarchy depth (hierarchy mode only).
    pub depth: Option<usize>,
    /// Flow level (flow mode only).
    pub level: Option<usize>,
    pub trend: Option<Trend>,
}

impl ElementLayout {
    pub fn new(id: &str, label: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value: None,
            display_value: None,
            x,
            y,
            width,
            height,
            depth: None,
            level: None,
            trend: None,
        }
    }
}

/// A routed flow connection: cubic curve between the source's right edge and
/// the target's left edge, stroked at `thickness`.
#[derive(Debug, Clone)]
pub struct FlowLinkLayout {
    pub source: String,
    pub target: String,
    pub value: f32,
    pub thickness: f32,
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
}

/// Horizontal connector between consecutive waterfall bars at the running
/// total's y-level.
#[derive(Debug, Clone)]
pub struct BridgeLayout {
    pub from: String,
    pub to: String,
    pub start: (f32, f32),
    pub end: (f32, f32),
}

#[derive(Debug, Clone, Copy)]
pub struct FlowMeta {
    pub node_width: f32,
    pub levels: usize,
    pub value_scale: f32,
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub kind: LayoutKind,
    pub elements: BTreeMap<String, ElementLayout>,
    pub links: Vec<FlowLinkLayout>,
    pub bridges: Vec<BridgeLayout>,
    pub flow: Option<FlowMeta>,
    /// Recovered anomalies (dropped connections, broken cycles, level
    /// fallbacks). The engine does no I/O, so these surface on the result
    /// for the host to log.
    pub warnings: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl LayoutResult {
    pub fn new(kind: LayoutKind, canvas: &CanvasConfig) -> Self {
        Self {
            kind,
            elements: BTreeMap::new(),
            links: Vec::new(),
            bridges: Vec::new(),
            flow: None,
            warnings: Vec::new(),
            width: canvas.width,
            height: canvas.height,
        }
    }

    pub fn empty(canvas: &CanvasConfig) -> Self {
        Self::new(LayoutKind::Empty, canvas)
    }
}
