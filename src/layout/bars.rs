use crate::config::LayoutConfig;
use crate::spec::{CanvasConfig, DiagramSpec, Element};

use super::{BridgeLayout, ElementLayout, LayoutKind, LayoutResult, Rect};

#[derive(Clone, Copy)]
struct BarItem<'a> {
    id: &'a str,
    label: &'a str,
    value: f32,
    display_value: Option<&'a str>,
    order: Option<i32>,
}

/// Bars in layout order: explicit `order` first, input order as the
/// fallback and the tie-break.
fn collect_bars<'a>(spec: &'a DiagramSpec) -> Vec<BarItem<'a>> {
    let mut items: Vec<(usize, BarItem)> = spec
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Bar(bar) => Some(BarItem {
                id: &bar.id,
                label: &bar.label,
                value: bar.value,
                display_value: bar.display_value.as_deref(),
                order: bar.order,
            }),
            _ => None,
        })
        .enumerate()
        .collect();
    items.sort_by_key(|&(idx, item)| (item.order.unwrap_or(idx as i32), idx));
    items.into_iter().map(|(_, item)| item).collect()
}

/// Plain bars: one shared baseline at the bottom of the usable rectangle,
/// heights proportional to `abs(value)` against the largest magnitude.
pub(super) fn compute_bar_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::Bars, canvas);
    let items = collect_bars(spec);
    if items.is_empty() {
        return result;
    }

    let max_abs = items
        .iter()
        .map(|item| item.value.abs())
        .fold(0.0f32, f32::max);
    let slot = usable.w / items.len() as f32;
    let bar_w = slot * config.bars.bar_fraction;
    let baseline = usable.bottom();

    for (idx, item) in items.iter().enumerate() {
        let height = if max_abs > 0.0 {
            item.value.abs() / max_abs * usable.h * config.bars.fill_factor
        } else {
            0.0
        };
        let x = usable.x + idx as f32 * slot + (slot - bar_w) / 2.0;
        let mut layout =
            ElementLayout::new(item.id, item.label, x, baseline - height, bar_w, height);
        layout.value = Some(item.value);
        layout.display_value = item.display_value.map(str::to_string);
        result.elements.insert(item.id.to_string(), layout);
    }
    result
}

/// Waterfall: the first and last bars are absolute totals spanning
/// `[0, value]`; every interior bar spans the delta it applies to the
/// running total. Bridges join consecutive bars at the cumulative y-level.
pub(super) fn compute_waterfall_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::Waterfall, canvas);
    let items = collect_bars(spec);
    if items.is_empty() {
        return result;
    }
    let count = items.len();

    // Value intervals, plus the cumulative total after each bar (the level
    // the next bridge sits at).
    let mut spans: Vec<(f32, f32)> = Vec::with_capacity(count);
    let mut cumulative: Vec<f32> = Vec::with_capacity(count);
    let mut running = 0.0f32;
    for (idx, item) in items.iter().enumerate() {
        let absolute = idx == 0 || idx == count - 1;
        let (lo, hi) = if absolute {
            (item.value.min(0.0), item.value.max(0.0))
        } else {
            let next = running + item.value;
            (running.min(next), running.max(next))
        };
        if absolute {
            if idx == 0 {
                running = item.value;
            }
        } else {
            running += item.value;
        }
        spans.push((lo, hi));
        cumulative.push(running);
    }

    // Scale over every interval endpoint so dips below zero stay on canvas,
    // with symmetric headroom.
    let mut min_v = f32::MAX;
    let mut max_v = f32::MIN;
    for &(lo, hi) in &spans {
        min_v = min_v.min(lo);
        max_v = max_v.max(hi);
    }
    let headroom = (max_v - min_v).max(1.0) * config.bars.scale_headroom;
    let floor = min_v - headroom;
    let range = (max_v - min_v + headroom * 2.0).max(f32::EPSILON);
    let to_y = |value: f32| usable.bottom() - (value - floor) / range * usable.h;

    let slot = usable.w / count as f32;
    let bar_w = slot * config.bars.bar_fraction;

    for (idx, item) in items.iter().enumerate() {
        let (lo, hi) = spans[idx];
        let x = usable.x + idx as f32 * slot + (slot - bar_w) / 2.0;
        let y = to_y(hi);
        let height = (to_y(lo) - y).max(0.0);
        let mut layout = ElementLayout::new(item.id, item.label, x, y, bar_w, height);
        layout.value = Some(item.value);
        layout.display_value = item.display_value.map(str::to_string);
        result.elements.insert(item.id.to_string(), layout);

        if idx + 1 < count {
            let level = to_y(cumulative[idx]);
            let next_x = usable.x + (idx + 1) as f32 * slot + (slot - bar_w) / 2.0;
            result.bridges.push(BridgeLayout {
                from: item.id.to_string(),
                to: items[idx + 1].id.to_string(),
                start: (x + bar_w, level),
                end: (next_x, level),
            });
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::spec::parse_spec;

    fn layout(json: &str) -> LayoutResult {
        let spec = parse_spec(json).unwrap();
        compute_layout(&spec, &CanvasConfig::default(), &LayoutConfig::default())
    }

    #[test]
    fn plain_bars_share_baseline_and_scale_by_magnitude() {
        let result = layout(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 50},
                {"kind": "bar", "id": "b", "value": 100},
                {"kind": "bar", "id": "c", "value": -25}
            ]}"#,
        );
        let a = result.elements.get("a").unwrap();
        let b = result.elements.get("b").unwrap();
        let c = result.elements.get("c").unwrap();
        let baseline = a.y + a.height;
        assert!((b.y + b.height - baseline).abs() < 0.01);
        assert!((c.y + c.height - baseline).abs() < 0.01);
        assert!((b.height / a.height - 2.0).abs() < 0.01);
        assert!((a.height / c.height - 2.0).abs() < 0.01);
    }

    #[test]
    fn explicit_order_beats_input_order() {
        let result = layout(
            r#"{"elements": [
                {"kind": "bar", "id": "second", "value": 1, "order": 5},
                {"kind": "bar", "id": "first", "value": 1, "order": 1}
            ]}"#,
        );
        let first = result.elements.get("first").unwrap();
        let second = result.elements.get("second").unwrap();
        assert!(first.x < second.x);
    }

    #[test]
    fn all_zero_values_stay_finite() {
        let result = layout(
            r#"{"elements": [
                {"kind": "bar", "id": "a", "value": 0},
                {"kind": "bar", "id": "b", "value": 0}
            ]}"#,
        );
        for element in result.elements.values() {
            assert!(element.height == 0.0);
            assert!(element.x.is_finite() && element.y.is_finite());
        }
    }

    #[test]
    fn waterfall_tracks_running_total() {
        let spec = parse_spec(
            r#"{"elements": [
                {"kind": "bar", "id": "start", "value": 100},
                {"kind": "bar", "id": "d1", "value": -20},
                {"kind": "bar", "id": "d2", "value": 50},
                {"kind": "bar", "id": "end", "value": 130}
            ], "layoutHints": {"arrangement": "waterfall"}}"#,
        )
        .unwrap();
        let canvas = CanvasConfig::default();
        let config = LayoutConfig::default();
        let result = compute_layout(&spec, &canvas, &config);
        assert_eq!(result.kind, LayoutKind::Waterfall);

        // Reconstruct the value scale to assert the spans in value space:
        // endpoints are 0..130, headroom 8%.
        let usable_h = canvas.height - canvas.padding.top - canvas.padding.bottom;
        let bottom = canvas.height - canvas.padding.bottom;
        let headroom = 130.0 * config.bars.scale_headroom;
        let floor = 0.0 - headroom;
        let range = 130.0 + headroom * 2.0;
        let value_at = |y: f32| floor + (bottom - y) / usable_h * range;

        let d1 = result.elements.get("d1").unwrap();
        assert!((value_at(d1.y) - 100.0).abs() < 0.5, "d1 top should be 100");
        assert!(
            (value_at(d1.y + d1.height) - 80.0).abs() < 0.5,
            "d1 bottom should be 80"
        );
        let d2 = result.elements.get("d2").unwrap();
        assert!((value_at(d2.y) - 130.0).abs() < 0.5);
        assert!((value_at(d2.y + d2.height) - 80.0).abs() < 0.5);
        let end = result.elements.get("end").unwrap();
        assert!((value_at(end.y) - 130.0).abs() < 0.5);
        assert!((value_at(end.y + end.height) - 0.0).abs() < 0.5);
    }

    #[test]
    fn waterfall_bridges_sit_at_cumulative_level() {
        let result = layout(
            r#"{"elements": [
                {"kind": "bar", "id": "start", "value": 100},
                {"kind": "bar", "id": "d1", "value": -20},
                {"kind": "bar", "id": "end", "value": 80}
            ], "layoutHints": {"arrangement": "waterfall"}}"#,
        );
        assert_eq!(result.bridges.len(), 2);
        let start = result.elements.get("start").unwrap();
        // First bridge leaves the top of the opening total.
        assert!((result.bridges[0].start.1 - start.y).abs() < 0.01);
        let d1 = result.elements.get("d1").unwrap();
        // Second bridge leaves the bottom of the negative delta.
        assert!((result.bridges[1].start.1 - (d1.y + d1.height)).abs() < 0.01);
        for bridge in &result.bridges {
            assert_eq!(bridge.start.1, bridge.end.1);
            assert!(bridge.end.0 > bridge.start.0);
        }
    }

    #[test]
    fn waterfall_negative_dip_stays_in_canvas() {
        let result = layout(
            r#"{"elements": [
                {"kind": "bar", "id": "start", "value": 10},
                {"kind": "bar", "id": "crash", "value": -60},
                {"kind": "bar", "id": "end", "value": -50}
            ], "layoutHints": {"arrangement": "waterfall"}}"#,
        );
        let canvas = CanvasConfig::default();
        for element in result.elements.values() {
            assert!(element.y >= 0.0);
            assert!(element.y + element.height <= canvas.height + 0.01);
        }
    }
}
