//! The analysis-file reader: projects the event tree into histograms and
//! saves them as images.

use std::path::Path;

use cv_render::{DrawOptions, Plottable, RenderConfig};
use cv_root::{Binning, ColumnSource, Histogram, RootFile, Tree, TreeSource, project};
use uuid::Uuid;

use crate::config::{AnalysisConfig, DEFAULT_CVVAR_PATH, DEFAULT_TREE_NAME};
use crate::error::Result;
use crate::settings::Settings;

/// An open analysis file bound to its event tree.
pub struct CvvarReader {
    file: RootFile,
    tree: Tree,
    settings: Settings,
    render: RenderConfig,
}

impl CvvarReader {
    /// Open `path` and bind the `cvvar_tree` tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DEFAULT_TREE_NAME)
    }

    /// Open `cvvar.root` in the current directory.
    pub fn open_default() -> Result<Self> {
        Self::open(DEFAULT_CVVAR_PATH)
    }

    /// Open `path` and bind the tree called `tree_name`.
    pub fn open_with(path: impl AsRef<Path>, tree_name: &str) -> Result<Self> {
        let file = RootFile::open(path)?;
        let tree = file.get_tree(tree_name)?;
        tracing::debug!(
            path = %file.path().display(),
            tree = tree_name,
            entries = tree.entries,
            branches = tree.branches.len(),
            "bound event tree"
        );
        Ok(Self { file, tree, settings: Settings::default(), render: RenderConfig::default() })
    }

    /// Open the file and tree named by `config`, with its settings and
    /// render configuration.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let mut reader = Self::open_with(&config.cvvar_path, &config.tree_name)?;
        reader.settings = config.settings();
        reader.render = config.render_config()?;
        Ok(reader)
    }

    /// Replace the render configuration used by [`Self::save`].
    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Record batch mode. Rendering is always off-screen; outside batch mode
    /// each saved image is reported at `info` level.
    pub fn set_batch(&mut self, batch: bool) {
        self.settings.batch = batch;
    }

    /// Show or hide the statistics box on subsequent saves.
    pub fn set_opt_stat(&mut self, show: bool) {
        self.settings.opt_stat = show;
    }

    /// Current session toggles.
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Name of the bound tree.
    pub fn tree_name(&self) -> &str {
        &self.tree.name
    }

    /// Entries in the bound tree.
    pub fn entries(&self) -> u64 {
        self.tree.entries
    }

    /// Branch names of the bound tree, in file order.
    pub fn branch_names(&self) -> Vec<&str> {
        self.tree.branch_names()
    }

    /// Project `branch` (`x` or `y:x`) with `binning` under the selection `cut`.
    ///
    /// `binning` is any prefix of `"nx, xlo, xhi, ny, ylo, yhi"`; `""` and
    /// `"100"` leave ranges to the data (see [`cv_root::binning`]).
    ///
    /// Each call returns a new histogram with a unique `hist_<uuid>` name.
    ///
    /// ```no_run
    /// # fn main() -> cv_analysis::Result<()> {
    /// let reader = cv_analysis::CvvarReader::open("cvvar.root")?;
    /// let h = reader.hist("length:ene_l", "100, 0, 50, 100, 0, 5", "length < 5")?;
    /// reader.save(&h, "COLZ", "length_vs_energy.png", true)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn hist(&self, branch: &str, binning: &str, cut: &str) -> Result<Histogram> {
        let source = TreeSource::new(&self.file, &self.tree);
        hist_from(&source, branch, binning, cut)
    }

    /// Draw `object` with the ROOT-style `draw_options` and write it to
    /// `path`; the extension picks SVG, PNG or PDF. `log_scale` makes the
    /// colour axis of 2-D plots logarithmic and leaves 1-D plots as they are;
    /// `LOGX`/`LOGY` in `draw_options` set the other axes.
    pub fn save<'a>(
        &self,
        object: impl Into<Plottable<'a>>,
        draw_options: &str,
        path: impl AsRef<Path>,
        log_scale: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        let object = object.into();
        let options = DrawOptions::parse(draw_options).with_log(log_scale);
        let mut config = self.render.clone();
        config.stats.show = self.settings.opt_stat;
        cv_render::render_to_file(object, &options, path, &config)?;
        if !self.settings.batch {
            tracing::info!(path = %path.display(), hist = object.name(), "saved image");
        }
        Ok(())
    }
}

/// Fresh unique histogram name.
fn unique_hist_name() -> String {
    format!("hist_{}", Uuid::new_v4())
}

fn hist_from(
    source: &dyn ColumnSource,
    branch: &str,
    binning: &str,
    cut: &str,
) -> Result<Histogram> {
    let name = unique_hist_name();
    let binning = Binning::parse(binning)?;
    Ok(project(source, &name, branch, &binning, cut)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use cv_root::{MemoryColumns, RootError};

    fn source() -> MemoryColumns {
        MemoryColumns::new(5)
            .with_column("ene_l", vec![5.0, 15.0, 25.0, 35.0, 45.0])
            .unwrap()
            .with_column("length", vec![0.5, 1.5, 2.5, 3.5, 6.0])
            .unwrap()
    }

    #[test]
    fn identical_calls_give_independent_histograms() {
        let src = source();
        let a = hist_from(&src, "ene_l", "5, 0, 50", "").unwrap();
        let b = hist_from(&src, "ene_l", "5, 0, 50", "").unwrap();
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("hist_"));
        assert_eq!(a.as_1d().unwrap().content, b.as_1d().unwrap().content);
    }

    #[test]
    fn two_dimensional_with_cut() {
        let h = hist_from(&source(), "length:ene_l", "5, 0, 50, 5, 0, 5", "length < 5").unwrap();
        let h = h.as_2d().unwrap();
        assert_eq!(h.entries, 4);
        assert_eq!(h.title, "length:ene_l {length < 5}");
    }

    #[test]
    fn errors_surface_from_the_root_layer() {
        let src = source();
        assert!(matches!(
            hist_from(&src, "ene_l", "5, 0, 50, 5", ""),
            Err(AnalysisError::Root(RootError::Binning(_)))
        ));
        assert!(matches!(
            hist_from(&src, "charge", "5, 0, 50", ""),
            Err(AnalysisError::Root(RootError::BranchNotFound(_)))
        ));
        assert!(matches!(
            hist_from(&src, "ene_l +", "5, 0, 50", ""),
            Err(AnalysisError::Root(RootError::Expression(_)))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CvvarReader::open("/nonexistent/cvvar.root").err().unwrap();
        assert!(matches!(err, AnalysisError::Root(RootError::Io(_))));
    }

    #[test]
    fn non_root_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cvvar.root");
        std::fs::write(&path, vec![b'x'; 256]).unwrap();
        let err = CvvarReader::open(&path).err().unwrap();
        assert!(matches!(err, AnalysisError::Root(RootError::BadMagic)));
    }
}
