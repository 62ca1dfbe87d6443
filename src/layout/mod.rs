mod area;
mod bars;
mod flow;
mod metrics;
pub(crate) mod types;

pub use types::*;

use crate::config::LayoutConfig;
use crate::spec::{Arrangement, CanvasConfig, DiagramSpec, Element};

/// Picks exactly one layout strategy for the spec.
///
/// Counting rule: the element kind with the most members wins, ties broken in
/// the fixed priority `bar > box > flowNode > metric`. Text elements are
/// annotations and never vote. An explicit `tree`, `flow`, or `waterfall`
/// arrangement hint overrides the count when at least one element of the
/// matching kind is present; otherwise it is ignored and the count decides.
pub fn select_layout(spec: &DiagramSpec) -> LayoutKind {
    if spec.elements.is_empty() {
        return LayoutKind::Empty;
    }

    let mut bars = 0usize;
    let mut boxes = 0usize;
    let mut flow_nodes = 0usize;
    let mut metrics = 0usize;
    let mut any_parent = false;
    for element in &spec.elements {
        match element {
            Element::Bar(_) => bars += 1,
            Element::Box(b) => {
                boxes += 1;
                any_parent |= b.parent_id.is_some();
            }
            Element::FlowNode(_) => flow_nodes += 1,
            Element::Metric(_) => metrics += 1,
            Element::Text(_) => {}
        }
    }

    match spec.layout_hints.arrangement {
        Some(Arrangement::Tree) if boxes > 0 => return LayoutKind::Hierarchy,
        Some(Arrangement::Flow) if flow_nodes > 0 => return LayoutKind::Flow,
        Some(Arrangement::Waterfall) if bars > 0 => return LayoutKind::Waterfall,
        _ => {}
    }

    // Fixed priority on ties: bar > box > flowNode > metric.
    let counts = [
        (bars, LayoutKind::Bars),
        (boxes, LayoutKind::Treemap),
        (flow_nodes, LayoutKind::Flow),
        (metrics, LayoutKind::MetricGrid),
    ];
    let (mut count, mut kind) = counts[0];
    for (candidate_count, candidate_kind) in counts.into_iter().skip(1) {
        if candidate_count > count {
            count = candidate_count;
            kind = candidate_kind;
        }
    }
    if count == 0 {
        // Only text elements present; the trivial grid carries the
        // annotations.
        return LayoutKind::MetricGrid;
    }
    if kind == LayoutKind::Treemap && any_parent {
        kind = LayoutKind::Hierarchy;
    }
    kind
}

/// Computes one complete layout. Pure: never mutates the spec, never fails
/// on a structurally valid spec, and identical input yields identical
/// geometry.
pub fn compute_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    config: &LayoutConfig,
) -> LayoutResult {
    let usable = usable_rect(canvas);
    let kind = select_layout(spec);
    let mut result = match kind {
        LayoutKind::Empty => LayoutResult::empty(canvas),
        LayoutKind::Treemap => area::compute_treemap_layout(spec, canvas, usable, config),
        LayoutKind::Hierarchy => area::compute_hierarchy_layout(spec, canvas, usable, config),
        LayoutKind::Flow => flow::compute_flow_layout(spec, canvas, usable, config),
        LayoutKind::Bars => bars::compute_bar_layout(spec, canvas, usable, config),
        LayoutKind::Waterfall => bars::compute_waterfall_layout(spec, canvas, usable, config),
        LayoutKind::MetricGrid => metrics::compute_metric_grid_layout(spec, canvas, usable, config),
    };
    place_annotations(spec, canvas, usable, &mut result);
    result
}

/// The drawing rectangle shared by every strategy: the canvas minus its
/// per-edge padding.
pub fn usable_rect(canvas: &CanvasConfig) -> Rect {
    let pad = canvas.padding;
    Rect::new(
        pad.left,
        pad.top,
        (canvas.width - pad.left - pad.right).max(0.0),
        (canvas.height - pad.top - pad.bottom).max(0.0),
    )
}

/// Text elements are zero-impact annotations: they take their explicit
/// position when given (clamped into the canvas) and otherwise stack along
/// the top band. They are exempt from the no-overlap invariant.
fn place_annotations(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    result: &mut LayoutResult,
) {
    let mut stacked = 0usize;
    for element in &spec.elements {
        let Element::Text(text) = element else {
            continue;
        };
        let (x, y) = match (text.x, text.y) {
            (Some(x), Some(y)) => (
                x.clamp(0.0, canvas.width),
                y.clamp(0.0, canvas.height),
            ),
            _ => {
                let y = (usable.y + stacked as f32 * 16.0).min(canvas.height);
                stacked += 1;
                (usable.x, y)
            }
        };
        result
            .elements
            .insert(text.id.clone(), ElementLayout::new(&text.id, &text.label, x, y, 0.0, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec;

    fn spec_of(json: &str) -> DiagramSpec {
        parse_spec(json).unwrap()
    }

    #[test]
    fn empty_spec_selects_empty() {
        let spec = spec_of(r#"{"elements": []}"#);
        assert_eq!(select_layout(&spec), LayoutKind::Empty);
        let result = compute_layout(&spec, &CanvasConfig::default(), &LayoutConfig::default());
        assert_eq!(result.kind, LayoutKind::Empty);
        assert!(result.elements.is_empty());
    }

    #[test]
    fn majority_kind_wins() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 1},
                {"kind": "bar", "id": "b", "value": 2},
                {"kind": "metric", "id": "m", "value": 3}
            ]}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::Bars);
    }

    #[test]
    fn ties_follow_fixed_priority() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "box", "id": "a"},
                {"kind": "bar", "id": "b", "value": 1}
            ]}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::Bars);
    }

    #[test]
    fn parent_ids_switch_boxes_to_hierarchy() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "box", "id": "root"},
                {"kind": "box", "id": "leaf", "parentId": "root"}
            ]}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::Hierarchy);
    }

    #[test]
    fn waterfall_hint_overrides_count() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 1},
                {"kind": "metric", "id": "m1", "value": 1},
                {"kind": "metric", "id": "m2", "value": 1}
            ], "layoutHints": {"arrangement": "waterfall"}}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::Waterfall);
    }

    #[test]
    fn incompatible_hint_falls_back_to_count() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "metric", "id": "m", "value": 1}
            ], "layoutHints": {"arrangement": "tree"}}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::MetricGrid);
    }

    #[test]
    fn text_elements_never_vote() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "text", "id": "t1"},
                {"kind": "text", "id": "t2"},
                {"kind": "bar", "id": "b", "value": 1}
            ]}"#,
        );
        assert_eq!(select_layout(&spec), LayoutKind::Bars);
    }

    #[test]
    fn annotations_take_explicit_position() {
        let spec = spec_of(
            r#"{"elements": [
                {"kind": "bar", "id": "b", "value": 1},
                {"kind": "text", "id": "note", "label": "est.", "x": 300, "y": 12}
            ]}"#,
        );
        let result = compute_layout(&spec, &CanvasConfig::default(), &LayoutConfig::default());
        let note = result.elements.get("note").unwrap();
        assert_eq!((note.x, note.y), (300.0, 12.0));
    }

    #[test]
    fn usable_rect_subtracts_padding() {
        let canvas = CanvasConfig::default();
        let usable = usable_rect(&canvas);
        assert_eq!(usable.x, canvas.padding.left);
        assert_eq!(usable.y, canvas.padding.top);
        assert_eq!(usable.right(), canvas.width - canvas.padding.right);
        assert_eq!(usable.bottom(), canvas.height - canvas.padding.bottom);
    }
}
