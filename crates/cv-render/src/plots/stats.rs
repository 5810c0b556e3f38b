//! The statistics box drawn in the top-right corner of the frame.

use crate::canvas::Canvas;
use crate::config::RenderConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Name/value rows of a stats box, headed by the histogram name.
pub struct StatsBox<'a> {
    pub name: &'a str,
    pub rows: Vec<(&'static str, String)>,
}

impl StatsBox<'_> {
    pub fn draw(&self, canvas: &mut Canvas, area: &PlotArea, config: &RenderConfig) {
        let size = config.stats.font_size;
        let label_style = TextStyle {
            size,
            color: config.colors.text,
            baseline: TextBaseline::Central,
            ..Default::default()
        };
        let value_style = TextStyle { anchor: TextAnchor::End, ..label_style.clone() };
        let header_style = TextStyle { anchor: TextAnchor::Middle, ..label_style.clone() };

        let pad = size * 0.5;
        let row_h = size * 1.5;
        let label_w = self
            .rows
            .iter()
            .map(|(l, _)| canvas.measure_text(l, &label_style).width)
            .fold(0.0_f64, f64::max);
        let value_w = self
            .rows
            .iter()
            .map(|(_, v)| canvas.measure_text(v, &value_style).width)
            .fold(0.0_f64, f64::max);
        let header_w = canvas.measure_text(self.name, &header_style).width;
        let width = (label_w + value_w + 3.0 * pad).max(header_w + 2.0 * pad);
        let height = row_h * (self.rows.len() + 1) as f64;

        let x = area.right() - width;
        let y = area.top;
        let frame = Style::filled_stroked(config.colors.background, config.colors.frame, 0.8);
        canvas.rect(x, y, width, height, &frame);

        canvas.text(x + width / 2.0, y + row_h / 2.0, self.name, &header_style);
        let sep = LineStyle::solid(config.colors.frame, 0.5);
        canvas.line(x, y + row_h, x + width, y + row_h, &sep);

        for (i, (label, value)) in self.rows.iter().enumerate() {
            let ry = y + row_h * (i as f64 + 1.5);
            canvas.text(x + pad, ry, label, &label_style);
            canvas.text(x + width - pad, ry, value, &value_style);
        }
    }
}

/// Format like C's `%.{sig}g`.
pub fn format_g(value: f64, sig: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let exp = value.abs().log10().floor() as i32;
    if exp < -4 || exp >= sig as i32 {
        let s = format!("{:.*e}", sig.saturating_sub(1), value);
        // `1.235e3` -> `1.235e+03`, trimming mantissa zeros
        match s.split_once('e') {
            Some((mantissa, e)) => {
                let mantissa = trim_zeros(mantissa);
                let e: i32 = e.parse().unwrap_or(0);
                format!("{mantissa}e{}{:02}", if e < 0 { '-' } else { '+' }, e.abs())
            }
            None => s,
        }
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') } else { s }
}
