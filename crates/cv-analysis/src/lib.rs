//! # cv-analysis
//!
//! Convenience layer for the gaseous-TPC neutron analysis: open the
//! `cvvar.root` analysis file, project its event tree into histograms, save
//! them as images, and load SRIM recoil tables.
//!
//! ```no_run
//! use cv_analysis::{CvvarReader, SrimTables};
//!
//! # fn main() -> cv_analysis::Result<()> {
//! let mut reader = CvvarReader::open_default()?;
//! reader.set_batch(true);
//! let h = reader.hist("ene_l", "100, 0, 1000", "")?;
//! reader.save(&h, "HIST", "ene_l.png", false)?;
//!
//! let (energy, length) = SrimTables::from_env().hydrogen()?;
//! assert_eq!(energy.len(), length.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod model;
pub mod reader;
pub mod settings;
pub mod srim;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result, SrimError};
pub use model::{Range, Region};
pub use reader::CvvarReader;
pub use settings::Settings;
pub use srim::{Energy, Length, SrimConfig, SrimData, SrimTables};
