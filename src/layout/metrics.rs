use crate::config::LayoutConfig;
use crate::spec::{CanvasConfig, DiagramSpec, Element};

use super::{ElementLayout, LayoutKind, LayoutResult, Rect};

/// Metric cards in a single centered row. Cards are fixed-size up to a cap;
/// when the row would overflow they shrink together, flagged once they drop
/// below the minimum readable width. No wrapping at this scope.
pub(super) fn compute_metric_grid_layout(
    spec: &DiagramSpec,
    canvas: &CanvasConfig,
    usable: Rect,
    config: &LayoutConfig,
) -> LayoutResult {
    let mut result = LayoutResult::new(LayoutKind::MetricGrid, canvas);
    let metrics: Vec<_> = spec
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Metric(metric) => Some(metric),
            _ => None,
        })
        .collect();
    if metrics.is_empty() {
        return result;
    }

    let mc = &config.metrics;
    let count = metrics.len() as f32;
    let fit = ((usable.w - mc.gap * (count - 1.0)) / count).max(1.0);
    let card_w = fit.min(mc.max_card_width);
    if card_w < mc.min_card_width {
        result.warnings.push(format!(
            "metrics: {} cards shrink below the minimum readable width",
            metrics.len()
        ));
    }
    let card_h = mc.card_height.min(usable.h);
    let row_w = card_w * count + mc.gap * (count - 1.0);
    let start_x = usable.x + ((usable.w - row_w) / 2.0).max(0.0);
    let y = usable.y + ((usable.h - card_h) / 2.0).max(0.0);

    for (idx, metric) in metrics.iter().enumerate() {
        let x = start_x + idx as f32 * (card_w + mc.gap);
        let mut layout = ElementLayout::new(&metric.id, &metric.label, x, y, card_w, card_h);
        layout.value = metric.value;
        layout.display_value = metric.display_value.clone();
        layout.trend = metric.trend;
        result.elements.insert(metric.id.clone(), layout);
    }
    result
}
