use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::LayoutConfig;
use crate::spec::{CanvasConfig, DiagramSpec, Element};

use super::{ElementLayout, LayoutKind, LayoutResult, Rect};

struct AreaItem<'a> {
    id: &'a str,
    label: &'a str,
    value: Option<f32>,
    parent: Option<&'a str>,
    weight: f32,
}

fn collect_boxes<'a>(spec: &'a DiagramSpec) -> Vec<AreaItem<'a>> {
    spec.elements
        .iter()
        .filter_map(|element| match element {
            Element::Box(b) => Some(AreaItem {
                id: &b.id,
                label: &b.label,
                value: b.value.or(b.percentage),
                parent: b.parent_id.as_deref(),
                weight: b.percentage.or(b.value).unwrap_or(0.0).max(0.0),
            }),
            _ => None,
        })
        .collect()
}

/// Treemap mode: repeatedly cut the longer side of the remaining rectangle
/// proportionally to the next element's share of the remaining total, largest
/// elements first. Each slice is inset by a fixed gutter.
pub(super) fn compute_treemap_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::Treemap, canvas);
    let items = collect_boxes(spec);
    let total: f32 = items.iter().map(|item| item.weight).sum();
    if total <= 0.0 {
        result
            .warnings
            .push("treemap: total value is zero, no geometry emitted".to_string());
        return result;
    }

    // Descending by weight; ties keep input order, then id.
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        items[b]
            .weight
            .partial_cmp(&items[a].weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
            .then(items[a].id.cmp(items[b].id))
    });

    let mut remaining = usable;
    let mut remaining_total = total;
    for &idx in &order {
        let item = &items[idx];
        if remaining_total <= 0.0 {
            break;
        }
        let share = (item.weight / remaining_total).clamp(0.0, 1.0);
        let slice = if remaining.w >= remaining.h {
            let w = remaining.w * share;
            let slice = Rect::new(remaining.x, remaining.y, w, remaining.h);
            remaining.x += w;
            remaining.w -= w;
            slice
        } else {
            let h = remaining.h * share;
            let slice = Rect::new(remaining.x, remaining.y, remaining.w, h);
            remaining.y += h;
            remaining.h -= h;
            slice
        };
        remaining_total -= item.weight;

        let cell = slice.inset(config.area.gutter);
        let mut layout = ElementLayout::new(item.id, item.label, cell.x, cell.y, cell.w, cell.h);
        layout.value = item.value;
        result.elements.insert(item.id.to_string(), layout);
    }
    result
}

/// Hierarchy mode: fixed-size boxes, children centered beneath their parent,
/// parents re-centered over their already placed children bottom-up. Cycles
/// in `parentId` links are broken by re-rooting the revisited node.
pub(super) fn compute_hierarchy_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::Hierarchy, canvas);
    let items = collect_boxes(spec);
    if items.is_empty() {
        return result;
    }

    let known: HashSet<&str> = items.iter().map(|item| item.id).collect();
    let mut parent: HashMap<&str, &str> = HashMap::new();
    for item in &items {
        let Some(declared) = item.parent else {
            continue;
        };
        if declared == item.id || !known.contains(declared) {
            if !known.contains(declared) {
                result.warnings.push(format!(
                    "hierarchy: `{}` names missing parent `{}`, treated as root",
                    item.id, declared
                ));
            }
            continue;
        }
        parent.insert(item.id, declared);
    }

    // Cycle guard: walk each node's ancestor chain; the first node revisited
    // on a walk is re-rooted, which breaks the cycle for every later walk.
    for item in &items {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(item.id);
        let mut cursor = item.id;
        while let Some(&up) = parent.get(cursor) {
            if !seen.insert(up) {
                parent.remove(up);
                result.warnings.push(format!(
                    "hierarchy: cycle through `{up}` broken, treated as root"
                ));
                break;
            }
            cursor = up;
        }
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut roots: Vec<&str> = Vec::new();
    for item in &items {
        match parent.get(item.id) {
            Some(&up) => children.entry(up).or_default().push(item.id),
            None => roots.push(item.id),
        }
    }

    // Depth by BFS from the roots; every node is reachable once cycles are
    // broken.
    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for &root in &roots {
        depth.insert(root, 0);
        queue.push_back(root);
    }
    let mut max_depth = 0usize;
    while let Some(id) = queue.pop_front() {
        let d = depth[id];
        max_depth = max_depth.max(d);
        if let Some(kids) = children.get(id) {
            for &kid in kids {
                depth.insert(kid, d + 1);
                queue.push_back(kid);
            }
        }
    }

    let level_height = config
        .area
        .level_step
        .min(usable.h / (max_depth + 1) as f32);
    // Rows never spill past their level band, however deep the chain gets.
    let node_h = config
        .area
        .node_height
        .min((level_height - 6.0).max(8.0))
        .min(level_height);

    let gap = config.area.sibling_gap;
    let leaf_count = items
        .iter()
        .filter(|item| !children.contains_key(item.id))
        .count()
        .max(1);
    // Leaves shrink to share the usable width, but never below the readable
    // minimum; past that point the forest is allowed to run wide instead.
    let fit = ((usable.w - gap * (leaf_count - 1) as f32) / leaf_count as f32).max(1.0);
    if fit < config.area.min_node_width {
        result.warnings.push(format!(
            "hierarchy: {leaf_count} leaves shrink nodes to the minimum width"
        ));
    }
    let node_w = config
        .area
        .node_width
        .min(fit.max(config.area.min_node_width));

    // Subtree block width: wide enough for the node itself and for all child
    // blocks side by side.
    fn block_width(
        id: &str,
        children: &HashMap<&str, Vec<&str>>,
        node_w: f32,
        gap: f32,
        memo: &mut HashMap<String, f32>,
    ) -> f32 {
        if let Some(&w) = memo.get(id) {
            return w;
        }
        let width = match children.get(id) {
            Some(kids) if !kids.is_empty() => {
                let sum: f32 = kids
                    .iter()
                    .map(|kid| block_width(kid, children, node_w, gap, memo))
                    .sum();
                (sum + gap * (kids.len() - 1) as f32).max(node_w)
            }
            _ => node_w,
        };
        memo.insert(id.to_string(), width);
        width
    }

    let mut memo: HashMap<String, f32> = HashMap::new();
    let total_width: f32 = roots
        .iter()
        .map(|root| block_width(root, &children, node_w, gap, &mut memo))
        .sum::<f32>()
        + gap * roots.len().saturating_sub(1) as f32;

    // Place subtrees left-to-right, bottom-up centering each parent over the
    // midpoint of its children's centers. Returns the node's center x.
    fn place(
        id: &str,
        left: f32,
        children: &HashMap<&str, Vec<&str>>,
        memo: &HashMap<String, f32>,
        node_w: f32,
        gap: f32,
        centers: &mut HashMap<String, f32>,
    ) -> f32 {
        let block = memo.get(id).copied().unwrap_or(node_w);
        let center = match children.get(id) {
            Some(kids) if !kids.is_empty() => {
                let mut cursor = left + (block - inner_width(kids, memo, node_w, gap)) / 2.0;
                let mut first = f32::MAX;
                let mut last = f32::MIN;
                for &kid in kids {
                    let kid_block = memo.get(kid).copied().unwrap_or(node_w);
                    let kid_center = place(kid, cursor, children, memo, node_w, gap, centers);
                    first = first.min(kid_center);
                    last = last.max(kid_center);
                    cursor += kid_block + gap;
                }
                (first + last) / 2.0
            }
            _ => left + block / 2.0,
        };
        centers.insert(id.to_string(), center);
        center
    }

    fn inner_width(
        kids: &[&str],
        memo: &HashMap<String, f32>,
        node_w: f32,
        gap: f32,
    ) -> f32 {
        let sum: f32 = kids
            .iter()
            .map(|kid| memo.get(*kid).copied().unwrap_or(node_w))
            .sum();
        sum + gap * kids.len().saturating_sub(1) as f32
    }

    let mut centers: HashMap<String, f32> = HashMap::new();
    let mut cursor = usable.x + ((usable.w - total_width) / 2.0).max(0.0);
    for &root in &roots {
        let block = memo.get(root).copied().unwrap_or(node_w);
        place(root, cursor, &children, &memo, node_w, gap, &mut centers);
        cursor += block + gap;
    }

    for item in &items {
        let center = centers.get(item.id).copied().unwrap_or(usable.x + node_w / 2.0);
        let d = depth.get(item.id).copied().unwrap_or(0);
        let x = center - node_w / 2.0;
        let y = usable.y + d as f32 * level_height;
        let mut layout = ElementLayout::new(item.id, item.label, x, y, node_w, node_h);
        layout.value = item.value;
        layout.depth = Some(d);
        result.elements.insert(item.id.to_string(), layout);
    }
    result
}
