//! Per-reader session toggles.

/// Display settings applied to subsequent `save` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Batch mode: images are written silently. Rendering never opens a
    /// window either way.
    pub batch: bool,
    /// Draw the statistics box.
    pub opt_stat: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { batch: false, opt_stat: true }
    }
}
