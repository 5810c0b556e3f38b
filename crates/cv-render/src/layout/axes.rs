/// Axis configuration with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Linear axis spanning exactly `[min, max]` with "nice number" ticks
    /// inside it, as ROOT draws a histogram's bin range.
    pub fn linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let (min, max) = if (max - min).abs() < 1e-15 { (min - 1.0, max + 1.0) } else { (min, max) };
        let step = nice_step((max - min) / (target_ticks.max(2) - 1) as f64);
        let eps = step * 1e-6;

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let first = (min / step - 1e-9).ceil();
        let mut k = 0.0;
        loop {
            let v = (first + k) * step;
            if v > max + eps {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1.0;
        }

        // Minor ticks: 5 subdivisions per major
        let minor_step = step / 5.0;
        let mut minor = Vec::new();
        let first_minor = (min / minor_step - 1e-9).ceil();
        let mut k = 0.0;
        loop {
            let mv = (first_minor + k) * minor_step;
            if mv > max + eps {
                break;
            }
            if !ticks.iter().any(|t| (t - mv).abs() < minor_step * 0.01) {
                minor.push(mv);
            }
            k += 1.0;
        }

        Self {
            min,
            max,
            log: false,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// Auto-scale logarithmic axis to whole decades.
    pub fn auto_log(data_min: f64, data_max: f64) -> Self {
        let log_min = data_min.max(1e-20).log10().floor() as i32;
        let mut log_max = data_max.max(1e-20).log10().ceil() as i32;
        if log_max <= log_min {
            log_max = log_min + 1;
        }

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();

        for exp in log_min..=log_max {
            let v = 10.0_f64.powi(exp);
            ticks.push(v);
            labels.push(format!("10{}", superscript(exp)));
            if exp < log_max {
                // Minor ticks at 2..9
                for m in 2..=9 {
                    minor.push(m as f64 * v);
                }
            }
        }

        Self {
            min: 10.0_f64.powi(log_min),
            max: 10.0_f64.powi(log_max),
            log: true,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// Logarithmic axis spanning exactly `[min, max]`, the way ROOT draws a
    /// bin range on a log pad. Decades inside the range are labelled; when
    /// fewer than two fit, the 2..9 multiples carry plain labels instead.
    pub fn log_range(min: f64, max: f64) -> Self {
        let min = min.max(1e-300);
        let max = if max > min { max } else { min * 10.0 };
        let inside = |v: f64| v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9);

        let mut ticks = Vec::new();
        let mut minor = Vec::new();
        for exp in min.log10().floor() as i32..=max.log10().ceil() as i32 {
            let v = 10.0_f64.powi(exp);
            if inside(v) {
                ticks.push(v);
            }
            minor.extend((2..=9).map(|m| m as f64 * v).filter(|&mv| inside(mv)));
        }

        let labels = if ticks.len() >= 2 {
            ticks.iter().map(|v| format!("10{}", superscript(v.log10().round() as i32))).collect()
        } else {
            ticks.append(&mut minor);
            ticks.sort_by(f64::total_cmp);
            ticks.iter().map(|&v| format_tick(v, 10.0_f64.powf(v.log10().floor()))).collect()
        };

        Self {
            min,
            max,
            log: true,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Fraction of the axis length at `value`; log axes clamp values below
    /// their minimum to the axis start.
    pub fn fraction(&self, value: f64) -> f64 {
        if self.log {
            let log_val = value.max(self.min).max(1e-300).ln();
            let log_min = self.min.max(1e-300).ln();
            let log_max = self.max.max(1e-300).ln();
            (log_val - log_min) / (log_max - log_min)
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        px_min + self.fraction(value) * (px_max - px_min)
    }
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    if decimals == 0 {
        // Avoid "-0"
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{}", v.round() as i64)
    } else {
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{:.prec$}", v, prec = decimals)
    }
}

fn superscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '\u{207B}',
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            '9' => '\u{2079}',
            _ => c,
        })
        .collect()
}
