use cv_root::BinAxis;

use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Axis over a histogram's bin range.
///
/// A log axis keeps the bin range; when it starts at or below zero it begins
/// at the upper edge of the bin holding `0.01 * bin_width`, as ROOT's log
/// pads do. A range with no positive part falls back to linear.
pub fn bin_range_axis(bins: &BinAxis, log: bool, target_ticks: usize) -> Axis {
    if log {
        let lo = if bins.lo > 0.0 {
            bins.lo
        } else {
            let w = bins.bin_width();
            bins.lo + (((0.01 * w - bins.lo) / w).floor() + 1.0) * w
        };
        if lo < bins.hi {
            return Axis::log_range(lo, bins.hi);
        }
        tracing::warn!(
            lo = bins.lo,
            hi = bins.hi,
            "no positive range for a log axis; drawing it linear"
        );
    }
    Axis::linear(bins.lo, bins.hi, target_ticks)
}

/// Draw a standard box frame with axes, ticks, grid, and labels.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &RenderConfig,
) {
    let frame_color = config.colors.frame;
    let tick_style_line = LineStyle::solid(frame_color, config.axes.line_width * 0.75);
    let minor_tick_style = LineStyle::solid(frame_color, config.axes.line_width * 0.5);
    let grid_style = LineStyle::dashed(config.grid.color.with_alpha(config.grid.alpha), 0.5);

    // Ticks point into the frame when `dir` is -1.
    let dir = if config.axes.tick_direction == "in" { -1.0 } else { 1.0 };
    let tl = config.axes.tick_length;
    let mtl = config.axes.minor_tick_length;
    let outside = if dir > 0.0 { tl } else { 0.0 };

    // Frame rectangle
    let frame = Style::stroked(frame_color, config.axes.line_width);
    canvas.rect(area.left, area.top, area.width, area.height, &frame);

    let tick_label_style = TextStyle {
        size: config.font.tick_size,
        color: config.colors.text,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };

    // --- X axis ticks ---
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        if config.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
        canvas.line(px, area.bottom(), px, area.bottom() + dir * tl, &tick_style_line);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - dir * tl, &tick_style_line);
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            let label_y = area.bottom() + outside + 4.0;
            canvas.text(px, label_y, label, &tick_label_style);
        }
    }

    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        canvas.line(px, area.bottom(), px, area.bottom() + dir * mtl, &minor_tick_style);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - dir * mtl, &minor_tick_style);
        }
    }

    // --- Y axis ticks ---
    let y_tick_label_style = TextStyle {
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..tick_label_style.clone()
    };

    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if config.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
        canvas.line(area.left, py, area.left - dir * tl, py, &tick_style_line);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() + dir * tl, py, &tick_style_line);
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            let label_x = area.left - outside - 4.0;
            canvas.text(label_x, py, label, &y_tick_label_style);
        }
    }

    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        canvas.line(area.left, py, area.left - dir * mtl, py, &minor_tick_style);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() + dir * mtl, py, &minor_tick_style);
        }
    }

    // --- Axis labels ---
    let label_style = TextStyle {
        size: config.font.label_size,
        color: config.colors.text,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };

    if !x_axis.label.is_empty() {
        let label_y = area.bottom() + outside + config.font.tick_size + 16.0;
        canvas.text(area.left + area.width / 2.0, label_y, &x_axis.label, &label_style);
    }

    if !y_axis.label.is_empty() {
        let widest = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &y_tick_label_style).width)
            .fold(0.0_f64, f64::max);
        let label_x = area.left - outside - widest - 12.0;
        let label_y = area.top + area.height / 2.0;
        canvas.text_rotated(label_x, label_y, &y_axis.label, &label_style, -90.0);
    }
}

/// Histogram title, centred above the frame.
pub fn draw_title(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &RenderConfig) {
    if title.is_empty() {
        return;
    }
    let style = TextStyle {
        size: config.font.title_size,
        color: config.colors.text,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    canvas.text(area.left + area.width / 2.0, area.top - config.font.title_size * 0.6, title, &style);
}
