//! Fixed-binning 1-D and 2-D histograms produced by tree projection.

/// Uniform binning of one axis: `n_bins` equal bins over `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAxis {
    /// Number of bins, excluding under/overflow.
    pub n_bins: usize,
    /// Lower edge of the first bin.
    pub lo: f64,
    /// Upper edge of the last bin.
    pub hi: f64,
}

/// Where a value falls on a [`BinAxis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinIndex {
    /// Below `lo`.
    Underflow,
    /// In-range bin, 0-based.
    Bin(usize),
    /// At or above `hi`.
    Overflow,
}

impl BinAxis {
    /// Axis with `n_bins` bins over `[lo, hi)`.
    pub fn new(n_bins: usize, lo: f64, hi: f64) -> Self {
        Self { n_bins, lo, hi }
    }

    /// Width of each bin.
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.n_bins as f64
    }

    /// Lower edge of bin `i`.
    pub fn low_edge(&self, i: usize) -> f64 {
        self.lo + i as f64 * self.bin_width()
    }

    /// Center of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.lo + (i as f64 + 0.5) * self.bin_width()
    }

    /// All `n_bins + 1` edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins).map(|i| self.low_edge(i)).collect()
    }

    /// Locate `x`. NaN is reported as overflow.
    pub fn find_bin(&self, x: f64) -> BinIndex {
        if x < self.lo {
            return BinIndex::Underflow;
        }
        if x >= self.hi || x.is_nan() {
            return BinIndex::Overflow;
        }
        let i = ((x - self.lo) / self.bin_width()) as usize;
        // guard against rounding at the upper edge
        BinIndex::Bin(i.min(self.n_bins - 1))
    }
}

/// Weighted moments of the in-range fills of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Moments {
    sum_w: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Moments {
    fn add(&mut self, x: f64, w: f64) {
        self.sum_w += w;
        self.sum_wx += w * x;
        self.sum_wx2 += w * x * x;
    }

    fn mean(&self) -> f64 {
        if self.sum_w == 0.0 { 0.0 } else { self.sum_wx / self.sum_w }
    }

    fn std_dev(&self) -> f64 {
        if self.sum_w == 0.0 {
            return 0.0;
        }
        let m = self.mean();
        (self.sum_wx2 / self.sum_w - m * m).max(0.0).sqrt()
    }
}

/// A 1-D histogram.
#[derive(Debug, Clone)]
pub struct Hist1D {
    /// Unique name.
    pub name: String,
    /// Title, usually the draw expression.
    pub title: String,
    /// Binning.
    pub axis: BinAxis,
    /// Sum of weights per in-range bin.
    pub content: Vec<f64>,
    /// Sum of squared weights per in-range bin.
    pub sumw2: Vec<f64>,
    /// Sum of weights below the axis.
    pub underflow: f64,
    /// Sum of weights at or above the axis end.
    pub overflow: f64,
    /// Number of fills, flows included.
    pub entries: u64,
    moments: Moments,
}

impl Hist1D {
    /// Empty histogram.
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: BinAxis) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            axis,
            content: vec![0.0; axis.n_bins],
            sumw2: vec![0.0; axis.n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            moments: Moments::default(),
        }
    }

    /// Add `x` with weight `w`.
    pub fn fill(&mut self, x: f64, w: f64) {
        self.entries += 1;
        match self.axis.find_bin(x) {
            BinIndex::Underflow => self.underflow += w,
            BinIndex::Overflow => self.overflow += w,
            BinIndex::Bin(i) => {
                self.content[i] += w;
                self.sumw2[i] += w * w;
                self.moments.add(x, w);
            }
        }
    }

    /// Statistical error of bin `i`.
    pub fn error(&self, i: usize) -> f64 {
        self.sumw2[i].sqrt()
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        self.content.iter().sum()
    }

    /// Weighted mean of in-range fills.
    pub fn mean(&self) -> f64 {
        self.moments.mean()
    }

    /// Weighted standard deviation of in-range fills.
    pub fn std_dev(&self) -> f64 {
        self.moments.std_dev()
    }

    /// Largest bin content, 0 when empty.
    pub fn max_content(&self) -> f64 {
        self.content.iter().copied().fold(0.0, f64::max)
    }
}

/// A 2-D histogram. Contents are stored row-major: `iy * nx + ix`.
#[derive(Debug, Clone)]
pub struct Hist2D {
    /// Unique name.
    pub name: String,
    /// Title, usually the draw expression.
    pub title: String,
    /// Horizontal binning.
    pub x_axis: BinAxis,
    /// Vertical binning.
    pub y_axis: BinAxis,
    /// Sum of weights per in-range cell.
    pub content: Vec<f64>,
    /// Sum of squared weights per in-range cell.
    pub sumw2: Vec<f64>,
    /// Sum of weights that missed the in-range cells on either axis.
    pub outside: f64,
    /// Number of fills, flows included.
    pub entries: u64,
    x_moments: Moments,
    y_moments: Moments,
}

impl Hist2D {
    /// Empty histogram.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x_axis: BinAxis,
        y_axis: BinAxis,
    ) -> Self {
        let cells = x_axis.n_bins * y_axis.n_bins;
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_axis,
            content: vec![0.0; cells],
            sumw2: vec![0.0; cells],
            outside: 0.0,
            entries: 0,
            x_moments: Moments::default(),
            y_moments: Moments::default(),
        }
    }

    /// Add `(x, y)` with weight `w`.
    pub fn fill(&mut self, x: f64, y: f64, w: f64) {
        self.entries += 1;
        match (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            (BinIndex::Bin(ix), BinIndex::Bin(iy)) => {
                let k = iy * self.x_axis.n_bins + ix;
                self.content[k] += w;
                self.sumw2[k] += w * w;
                self.x_moments.add(x, w);
                self.y_moments.add(y, w);
            }
            _ => self.outside += w,
        }
    }

    /// Content of cell `(ix, iy)`.
    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.content[iy * self.x_axis.n_bins + ix]
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        self.content.iter().sum()
    }

    /// Weighted mean along x.
    pub fn mean_x(&self) -> f64 {
        self.x_moments.mean()
    }

    /// Weighted mean along y.
    pub fn mean_y(&self) -> f64 {
        self.y_moments.mean()
    }

    /// Weighted standard deviation along x.
    pub fn std_dev_x(&self) -> f64 {
        self.x_moments.std_dev()
    }

    /// Weighted standard deviation along y.
    pub fn std_dev_y(&self) -> f64 {
        self.y_moments.std_dev()
    }

    /// Largest cell content, 0 when empty.
    pub fn max_content(&self) -> f64 {
        self.content.iter().copied().fold(0.0, f64::max)
    }

    /// Smallest strictly positive cell content.
    pub fn min_positive(&self) -> Option<f64> {
        self.content.iter().copied().filter(|&c| c > 0.0).reduce(f64::min)
    }
}

/// A projected histogram of either dimension.
#[derive(Debug, Clone)]
pub enum Histogram {
    /// From an `x` expression.
    H1(Hist1D),
    /// From a `y:x` expression.
    H2(Hist2D),
}

impl Histogram {
    /// Unique name.
    pub fn name(&self) -> &str {
        match self {
            Histogram::H1(h) => &h.name,
            Histogram::H2(h) => &h.name,
        }
    }

    /// Title.
    pub fn title(&self) -> &str {
        match self {
            Histogram::H1(h) => &h.title,
            Histogram::H2(h) => &h.title,
        }
    }

    /// Number of fills.
    pub fn entries(&self) -> u64 {
        match self {
            Histogram::H1(h) => h.entries,
            Histogram::H2(h) => h.entries,
        }
    }

    /// 1 or 2.
    pub fn dimension(&self) -> usize {
        match self {
            Histogram::H1(_) => 1,
            Histogram::H2(_) => 2,
        }
    }

    /// The 1-D histogram, if this is one.
    pub fn as_1d(&self) -> Option<&Hist1D> {
        match self {
            Histogram::H1(h) => Some(h),
            Histogram::H2(_) => None,
        }
    }

    /// The 2-D histogram, if this is one.
    pub fn as_2d(&self) -> Option<&Hist2D> {
        match self {
            Histogram::H2(h) => Some(h),
            Histogram::H1(_) => None,
        }
    }
}

impl From<Hist1D> for Histogram {
    fn from(h: Hist1D) -> Self {
        Histogram::H1(h)
    }
}

impl From<Hist2D> for Histogram {
    fn from(h: Hist2D) -> Self {
        Histogram::H2(h)
    }
}
