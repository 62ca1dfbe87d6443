use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::spec::{CanvasConfig, DiagramSpec, Element};

use super::{ElementLayout, FlowLinkLayout, FlowMeta, LayoutKind, LayoutResult, Rect};

#[derive(Debug, Clone)]
struct FlowEdge {
    from_idx: usize,
    to_idx: usize,
    value: f32,
}

pub(super) fn compute_flow_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::Flow, canvas);
    let fc = &config.flow;

    struct FlowItem<'a> {
        id: &'a str,
        label: &'a str,
        value: Option<f32>,
        column: Option<usize>,
    }

    let items: Vec<FlowItem> = spec
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::FlowNode(node) => Some(FlowItem {
                id: &node.id,
                label: &node.label,
                value: node.value,
                column: node.column,
            }),
            _ => None,
        })
        .collect();
    let node_count = items.len();
    if node_count == 0 {
        return result;
    }
    let id_to_idx: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.id, idx))
        .collect();

    // Resolve connections; unknown endpoints are dropped, not fatal.
    let mut edges: Vec<FlowEdge> = Vec::new();
    let mut incoming_value = vec![0.0f32; node_count];
    for connection in &spec.connections {
        let (Some(&from_idx), Some(&to_idx)) = (
            id_to_idx.get(connection.from.as_str()),
            id_to_idx.get(connection.to.as_str()),
        ) else {
            result.warnings.push(format!(
                "flow: dropped connection `{}` -> `{}` (unknown endpoint)",
                connection.from, connection.to
            ));
            continue;
        };
        let value = connection.value.unwrap_or(1.0).max(0.0);
        incoming_value[to_idx] += value;
        edges.push(FlowEdge {
            from_idx,
            to_idx,
            value,
        });
    }

    // Level assignment. Sources (no incoming value) and explicitly pinned
    // columns seed the levels; `level(to) = max(level(to), level(from)+1)`
    // propagates to a fixed point, bounded by the node count so a cycle can
    // never spin forever. Nodes still unresolved at the bound fall back to
    // level 0.
    let mut level: Vec<Option<usize>> = vec![None; node_count];
    let mut pinned = vec![false; node_count];
    for (idx, item) in items.iter().enumerate() {
        if let Some(column) = item.column {
            level[idx] = Some(column);
            pinned[idx] = true;
        } else if incoming_value[idx] == 0.0 {
            level[idx] = Some(0);
        }
    }
    for _ in 0..node_count {
        let mut changed = false;
        for edge in &edges {
            if pinned[edge.to_idx] {
                continue;
            }
            let Some(from_level) = level[edge.from_idx] else {
                continue;
            };
            let candidate = from_level + 1;
            if level[edge.to_idx].is_none_or(|current| candidate > current) {
                level[edge.to_idx] = Some(candidate);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    let levels: Vec<usize> = level
        .iter()
        .enumerate()
        .map(|(idx, assigned)| match assigned {
            Some(value) => *value,
            None => {
                result.warnings.push(format!(
                    "flow: level for `{}` unresolved, defaulting to 0",
                    items[idx].id
                ));
                0
            }
        })
        .collect();

    let max_level = levels.iter().copied().max().unwrap_or(0);
    let column_span = usable.w / (max_level + 1) as f32;

    // Effective node value: the larger of declared and aggregated incoming,
    // floored so zero-value nodes remain visible.
    let totals: Vec<f32> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.value
                .unwrap_or(0.0)
                .max(incoming_value[idx])
                .max(fc.value_floor)
        })
        .collect();

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); max_level + 1];
    for (idx, &lvl) in levels.iter().enumerate() {
        columns[lvl].push(idx);
    }

    // One scale for the whole diagram, chosen so the column with the largest
    // total exactly fills the usable height minus its inter-node gaps.
    let mut value_scale = f32::MAX;
    let mut densest_total = 0.0f32;
    for column in &columns {
        if column.is_empty() {
            continue;
        }
        let total: f32 = column.iter().map(|&idx| totals[idx]).sum();
        let gaps = fc.node_gap * column.len().saturating_sub(1) as f32;
        let available = (usable.h - gaps).max(1.0);
        if total > densest_total {
            densest_total = total;
            value_scale = available / total;
        }
    }
    if !value_scale.is_finite() || value_scale == f32::MAX {
        value_scale = 1.0;
    }

    let mut node_x = vec![0.0f32; node_count];
    let mut node_y = vec![0.0f32; node_count];
    let mut node_h = vec![0.0f32; node_count];
    for column in &columns {
        if column.is_empty() {
            continue;
        }
        let mut heights: Vec<f32> = column
            .iter()
            .map(|&idx| (totals[idx] * value_scale).max(fc.min_node_height))
            .collect();
        let gaps = fc.node_gap * column.len().saturating_sub(1) as f32;
        let mut stack_h: f32 = heights.iter().sum::<f32>() + gaps;
        // Minimum-height floors can push a dense column past the usable
        // band; shrink that column's nodes back into it.
        if stack_h > usable.h && stack_h > gaps {
            let squeeze = (usable.h - gaps).max(1.0) / (stack_h - gaps);
            for height in &mut heights {
                *height *= squeeze;
            }
            stack_h = heights.iter().sum::<f32>() + gaps;
        }
        let mut cursor = usable.y + ((usable.h - stack_h) / 2.0).max(0.0);
        for (&idx, height) in column.iter().zip(heights) {
            node_x[idx] = usable.x + levels[idx] as f32 * column_span;
            node_y[idx] = cursor;
            node_h[idx] = height;
            cursor += height + fc.node_gap;
        }
    }

    // Route links in declaration order, stacking parallel links with running
    // offsets on both the source's right edge and the target's left edge.
    let mut out_offset = vec![0.0f32; node_count];
    let mut in_offset = vec![0.0f32; node_count];
    for edge in &edges {
        let thickness = (edge.value * value_scale).max(fc.min_link_thickness);
        let start_x = node_x[edge.from_idx] + fc.node_width;
        let start_y =
            (node_y[edge.from_idx] + out_offset[edge.from_idx] + thickness / 2.0)
                .min(node_y[edge.from_idx] + node_h[edge.from_idx]);
        let end_x = node_x[edge.to_idx];
        let end_y = (node_y[edge.to_idx] + in_offset[edge.to_idx] + thickness / 2.0)
            .min(node_y[edge.to_idx] + node_h[edge.to_idx]);
        out_offset[edge.from_idx] += thickness;
        in_offset[edge.to_idx] += thickness;

        let mid_x = (start_x + end_x) / 2.0;
        result.links.push(FlowLinkLayout {
            source: items[edge.from_idx].id.to_string(),
            target: items[edge.to_idx].id.to_string(),
            value: edge.value,
            thickness,
            start: (start_x, start_y),
            end: (end_x, end_y),
            control1: (mid_x, start_y),
            control2: (mid_x, end_y),
        });
    }

    for (idx, item) in items.iter().enumerate() {
        let mut layout = ElementLayout::new(
            item.id,
            item.label,
            node_x[idx],
            node_y[idx],
            fc.node_width,
            node_h[idx],
        );
        layout.value = Some(totals[idx]);
        layout.level = Some(levels[idx]);
        result.elements.insert(item.id.to_string(), layout);
    }
    result.flow = Some(FlowMeta {
        node_width: fc.node_width,
        levels: max_level + 1,
        value_scale,
    });
    result
}
