use cv_root::Hist1D;

use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::draw_options::{DrawOptions, Style1D};
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{bin_range_axis, draw_axes, draw_title};
use crate::plots::stats::{StatsBox, format_g};
use crate::primitives::*;

pub fn render(h: &Hist1D, options: &DrawOptions, config: &RenderConfig) -> crate::Result<String> {
    let n_bins = h.axis.n_bins;
    if n_bins == 0 || h.content.len() != n_bins || h.axis.lo >= h.axis.hi {
        return Err(crate::RenderError::EmptyHistogram(h.name.clone()));
    }

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)
        .with_background(config.colors.background);

    let x_axis = bin_range_axis(&h.axis, options.log_x, 7);
    let y_axis = value_axis(h, options);
    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, config, !h.title.is_empty(), 0.0);

    let edges = h.axis.edges();
    let px = |x: f64| x_axis.data_to_pixel(x, area.left, area.right());
    let py = |y: f64| {
        let y = if y_axis.log && y <= 0.0 { y_axis.min } else { y };
        y_axis.data_to_pixel(y, area.bottom(), area.top)
    };
    let base = if y_axis.log { y_axis.min } else { 0.0_f64.max(y_axis.min) };

    canvas.push_clip(area.left, area.top, area.width, area.height);
    match options.style_1d {
        Style1D::Hist => {
            let mut points = Vec::with_capacity(2 * n_bins + 2);
            points.push((px(edges[0]), py(base)));
            for (i, &c) in h.content.iter().enumerate() {
                points.push((px(edges[i]), py(c)));
                points.push((px(edges[i + 1]), py(c)));
            }
            points.push((px(edges[n_bins]), py(base)));
            canvas.polyline(&points, &LineStyle::solid(config.colors.line, 1.5));
        }
        Style1D::Bar => {
            let style = Style::filled_stroked(config.colors.fill, config.colors.line, 0.8);
            for (i, &c) in h.content.iter().enumerate() {
                if c == 0.0 {
                    continue;
                }
                let (x0, x1) = (px(edges[i]), px(edges[i + 1]));
                let (y0, y1) = (py(base), py(c));
                canvas.rect(x0, y0.min(y1), x1 - x0, (y1 - y0).abs(), &style);
            }
        }
        Style1D::Errors => {
            let marker = MarkerStyle { color: config.colors.marker, ..Default::default() };
            let bar = LineStyle::solid(config.colors.marker, 1.0);
            for (i, &c) in h.content.iter().enumerate() {
                let err = h.error(i);
                // Empty bins are not drawn, as with ROOT's `E` (`E0` draws them).
                if (c == 0.0 && err == 0.0) || (y_axis.log && c <= 0.0) {
                    continue;
                }
                let cx = px(h.axis.center(i));
                let cy = py(c);
                canvas.error_bar(cx, py(c - err), py(c + err), 0.0, &bar);
                canvas.line(px(edges[i]), cy, px(edges[i + 1]), cy, &bar);
                canvas.marker(cx, cy, &marker);
            }
        }
    }
    canvas.pop_clip();

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);
    draw_title(&mut canvas, &area, &h.title, config);

    if config.stats.show {
        let stats = StatsBox {
            name: &h.name,
            rows: vec![
                ("Entries", h.entries.to_string()),
                ("Mean", format_g(h.mean(), 4)),
                ("Std Dev", format_g(h.std_dev(), 4)),
            ],
        };
        stats.draw(&mut canvas, &area, config);
    }

    Ok(canvas.finish_svg())
}

/// Vertical axis: `[0, 1.05 * max]` linear, whole decades when logarithmic.
fn value_axis(h: &Hist1D, options: &DrawOptions) -> Axis {
    let with_errors = options.style_1d == Style1D::Errors;
    let hi = (0..h.axis.n_bins)
        .map(|i| h.content[i] + if with_errors { h.error(i) } else { 0.0 })
        .fold(0.0_f64, f64::max);

    if options.log_y {
        let lo = h.content.iter().copied().filter(|&c| c > 0.0).reduce(f64::min);
        return match lo {
            Some(lo) => Axis::auto_log(lo * 0.5, hi * 2.0),
            None => Axis::auto_log(0.1, 10.0),
        };
    }

    let lo = h.content.iter().copied().fold(0.0_f64, f64::min);
    let hi = if hi > 0.0 { hi * 1.05 } else if lo < 0.0 { 0.0 } else { 1.0 };
    let lo = if lo < 0.0 { lo * 1.05 } else { 0.0 };
    Axis::linear(lo, hi, 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cv_root::BinAxis;

    fn sample() -> Hist1D {
        let mut h = Hist1D::new("hist_a", "energy {nhits > 25}", BinAxis::new(4, 0.0, 4.0));
        for (x, w) in [(0.5, 1.0), (1.5, 1.0), (1.5, 1.0), (2.5, 4.0)] {
            h.fill(x, w);
        }
        h
    }

    #[test]
    fn hist_style_draws_step_outline() {
        let svg = render(&sample(), &DrawOptions::parse("HIST"), &RenderConfig::default()).unwrap();
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("energy {nhits &gt; 25}"));
        assert!(svg.contains(">Entries</text>"));
        assert!(svg.contains(">Std Dev</text>"));
    }

    #[test]
    fn bar_style_skips_empty_bins() {
        let mut config = RenderConfig::default();
        config.stats.show = false;
        let svg = render(&sample(), &DrawOptions::parse("BAR"), &config).unwrap();
        let fill = config.colors.fill.to_svg_fill();
        assert_eq!(svg.matches(&format!(r#"fill="{fill}""#)).count(), 3);
        assert!(!svg.contains(">Entries</text>"));
    }

    #[test]
    fn error_style_draws_markers() {
        let svg = render(&sample(), &DrawOptions::parse("E"), &RenderConfig::default()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn colour_log_toggle_leaves_1d_render_unchanged() {
        let mut h = Hist1D::new("hist_c", "ene_l", BinAxis::new(3, 0.0, 3.0));
        for (x, w) in [(0.5, 1.0), (1.5, 100.0), (2.5, 10000.0)] {
            h.fill(x, w);
        }
        let config = RenderConfig::default();
        for opts in ["", "E", "BAR"] {
            let plain = render(&h, &DrawOptions::parse(opts).with_log(false), &config).unwrap();
            let logged = render(&h, &DrawOptions::parse(opts).with_log(true), &config).unwrap();
            assert_eq!(plain, logged, "option '{opts}'");
        }
    }

    #[test]
    fn logy_option_gives_log_value_axis() {
        let h = sample();
        let o = DrawOptions::parse("LOGY");
        let axis = value_axis(&h, &o);
        assert!(axis.log);
        assert!(axis.min <= 0.5 && axis.max >= 8.0);
        render(&h, &o, &RenderConfig::default()).unwrap();
    }

    #[test]
    fn logx_option_gives_log_bin_axis() {
        let mut h = Hist1D::new("h", "", BinAxis::new(10, 0.0, 1000.0));
        h.fill(150.0, 1.0);
        h.fill(850.0, 2.0);
        let linear = render(&h, &DrawOptions::default(), &RenderConfig::default()).unwrap();
        let logged = render(&h, &DrawOptions::parse("LOGX"), &RenderConfig::default()).unwrap();
        assert!(!linear.contains("10\u{00B3}"));
        assert!(logged.contains("10\u{00B2}") && logged.contains("10\u{00B3}"));
    }

    #[test]
    fn linear_axis_headroom() {
        let axis = value_axis(&sample(), &DrawOptions::default());
        assert_relative_eq!(axis.min, 0.0);
        assert_relative_eq!(axis.max, 4.2);
    }

    #[test]
    fn empty_histogram_still_renders() {
        let h = Hist1D::new("h", "", BinAxis::new(10, 0.0, 1.0));
        let svg = render(&h, &DrawOptions::default(), &RenderConfig::default()).unwrap();
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn zero_bins_is_an_error() {
        let h = Hist1D::new("h", "", BinAxis { n_bins: 0, lo: 0.0, hi: 1.0 });
        assert!(matches!(
            render(&h, &DrawOptions::default(), &RenderConfig::default()),
            Err(crate::RenderError::EmptyHistogram(_))
        ));
    }
}
