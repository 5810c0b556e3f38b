use cv_root::Hist2D;

use crate::canvas::Canvas;
use crate::color::Colormap;
use crate::config::RenderConfig;
use crate::draw_options::{DrawOptions, Style2D};
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{bin_range_axis, draw_axes, draw_title};
use crate::plots::stats::{StatsBox, format_g};
use crate::primitives::*;

/// Gap between the frame and the colour bar.
const COLORBAR_GAP: f64 = 10.0;
/// Gradient stripes in the colour bar.
const COLORBAR_STEPS: usize = 64;

pub fn render(h: &Hist2D, options: &DrawOptions, config: &RenderConfig) -> crate::Result<String> {
    let (nx, ny) = (h.x_axis.n_bins, h.y_axis.n_bins);
    if nx == 0 || ny == 0 || h.content.len() != nx * ny {
        return Err(crate::RenderError::EmptyHistogram(h.name.clone()));
    }

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_background(config.colors.background);

    let x_axis = bin_range_axis(&h.x_axis, options.log_x, 7);
    let y_axis = bin_range_axis(&h.y_axis, options.log_y, 6);
    let z_axis = color_axis(h, options);

    let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };
    let right_extra = match (options.style_2d, &z_axis) {
        (Style2D::ColZ, Some(z)) => {
            let labels = z
                .tick_labels
                .iter()
                .map(|l| canvas.measure_text(l, &tick_style).width)
                .fold(0.0_f64, f64::max);
            COLORBAR_GAP + config.hist2d.colorbar_width + labels + 8.0
        }
        _ => 0.0,
    };
    let area =
        PlotArea::auto(&canvas, &y_axis, &x_axis, config, !h.title.is_empty(), right_extra);

    let x_edges: Vec<f64> = h
        .x_axis
        .edges()
        .iter()
        .map(|&e| x_axis.data_to_pixel(e, area.left, area.right()))
        .collect();
    let y_edges: Vec<f64> = h
        .y_axis
        .edges()
        .iter()
        .map(|&e| y_axis.data_to_pixel(e, area.bottom(), area.top))
        .collect();
    // Pixel rectangle (x, y, w, h) of cell (ix, iy); iy grows upward. Cells
    // below a log axis' start collapse to zero size.
    let cell = |ix: usize, iy: usize| {
        let (x0, x1) = (x_edges[ix], x_edges[ix + 1]);
        let (y0, y1) = (y_edges[iy], y_edges[iy + 1]);
        (x0, y1, x1 - x0, y0 - y1)
    };

    canvas.push_clip(area.left, area.top, area.width, area.height);
    if let Some(z) = &z_axis {
        match options.style_2d {
            Style2D::Col | Style2D::ColZ => {
                let cmap = config.colormap();
                for_each_drawn(h, z, |ix, iy, c| {
                    let (x, y, w, hh) = cell(ix, iy);
                    if w > 0.0 && hh > 0.0 {
                        canvas.rect(x, y, w, hh, &Style::filled(cmap.at(z.fraction(c))));
                    }
                });
            }
            Style2D::Box => {
                let style = Style::stroked(config.colors.line, 0.8);
                for_each_drawn(h, z, |ix, iy, c| {
                    let (x, y, cw, ch) = cell(ix, iy);
                    let s = z.fraction(c).clamp(0.0, 1.0);
                    let (w, hh) = (cw * s, ch * s);
                    if w > 0.0 && hh > 0.0 {
                        canvas.rect(x + (cw - w) / 2.0, y + (ch - hh) / 2.0, w, hh, &style);
                    }
                });
            }
            Style2D::Scatter => {
                let marker = MarkerStyle {
                    shape: MarkerShape::Dot,
                    size: 1.0,
                    color: config.colors.marker,
                };
                let total: f64 = h.content.iter().filter(|&&c| c > 0.0).sum();
                let per_unit = (config.hist2d.scatter_max_markers as f64 / total).min(1.0);
                for_each_drawn(h, z, |ix, iy, c| {
                    let (x, y, w, hh) = cell(ix, iy);
                    if w <= 0.0 || hh <= 0.0 {
                        return;
                    }
                    let n = (c * per_unit).round().max(1.0) as usize;
                    let mut rng = XorShift::for_cell(ix, iy);
                    for _ in 0..n {
                        let (u, v) = (rng.next_f64(), rng.next_f64());
                        canvas.marker(x + u * w, y + v * hh, &marker);
                    }
                });
            }
        }
    }
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    draw_title(&mut canvas, &area, &h.title, config);

    if let (Style2D::ColZ, Some(z)) = (options.style_2d, &z_axis) {
        draw_colorbar(&mut canvas, &area, z, config.colormap(), config);
    }

    if config.stats.show {
        let stats = StatsBox {
            name: &h.name,
            rows: vec![
                ("Entries", h.entries.to_string()),
                ("Mean x", format_g(h.mean_x(), 4)),
                ("Mean y", format_g(h.mean_y(), 4)),
                ("Std Dev x", format_g(h.std_dev_x(), 4)),
                ("Std Dev y", format_g(h.std_dev_y(), 4)),
            ],
        };
        stats.draw(&mut canvas, &area, config);
    }

    Ok(canvas.finish_svg())
}

/// Colour (content) axis. `None` when nothing would be drawn.
fn color_axis(h: &Hist2D, options: &DrawOptions) -> Option<Axis> {
    let max = h.max_content();
    if options.log_z {
        let min = h.min_positive()?;
        return Some(Axis::auto_log(min, max));
    }
    if max <= 0.0 {
        return None;
    }
    let min = h.content.iter().copied().fold(0.0_f64, f64::min);
    Some(Axis::linear(min, max, 5))
}

/// Visit cells that are drawn: non-zero, and positive on a log scale.
fn for_each_drawn(h: &Hist2D, z: &Axis, mut f: impl FnMut(usize, usize, f64)) {
    let nx = h.x_axis.n_bins;
    for (i, &c) in h.content.iter().enumerate() {
        if c == 0.0 || c.is_nan() || (z.log && c < 0.0) {
            continue;
        }
        f(i % nx, i / nx, c);
    }
}

fn draw_colorbar(
    canvas: &mut Canvas,
    area: &PlotArea,
    z: &Axis,
    cmap: Colormap,
    config: &RenderConfig,
) {
    let x = area.right() + COLORBAR_GAP;
    let w = config.hist2d.colorbar_width;
    let step_h = area.height / COLORBAR_STEPS as f64;
    for i in 0..COLORBAR_STEPS {
        let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let y = area.bottom() - (i + 1) as f64 * step_h;
        // Overlap stripes slightly to avoid hairline seams in rasterized output.
        canvas.rect(x, y - 0.2, w, step_h + 0.4, &Style::filled(cmap.at(t)));
    }
    canvas.rect(x, area.top, w, area.height, &Style::stroked(config.colors.frame, 0.8));

    let tick = LineStyle::solid(config.colors.frame, 0.6);
    let label_style = TextStyle {
        size: config.font.tick_size,
        color: config.colors.text,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    for (i, &val) in z.tick_positions.iter().enumerate() {
        let py = z.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        canvas.line(x + w - 4.0, py, x + w, py, &tick);
        if let Some(label) = z.tick_labels.get(i) {
            canvas.text(x + w + 4.0, py, label, &label_style);
        }
    }
}

/// Small deterministic generator so scatter plots are reproducible.
struct XorShift(u64);

impl XorShift {
    fn for_cell(ix: usize, iy: usize) -> Self {
        let seed = (((ix as u64) << 32) | iy as u64) ^ 0x9E37_79B9_7F4A_7C15;
        Self(seed.max(1))
    }

    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}
