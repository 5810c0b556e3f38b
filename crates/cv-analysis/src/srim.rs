//! SRIM recoil reference tables: kinetic energy versus projected range.
//!
//! A table has one `<energy_keV> <length_mm>` pair per line. Lengths are
//! converted to centimetres on load.

use std::ffi::OsString;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SrimError;

/// Default file name of the hydrogen-recoil table.
pub const HYDROGEN_TABLE: &str = "SRIM_H_in_760torr_ArC2H6.dat";
/// Default file name of the argon-recoil table.
pub const ARGON_TABLE: &str = "SRIM_Ar_in_760torr_ArC2H6.dat";

/// Directory holding both tables.
pub const ENV_SRIM_DIR: &str = "CVVAR_SRIM_DIR";
/// Full path of the hydrogen table, overriding the directory.
pub const ENV_SRIM_HYDROGEN: &str = "CVVAR_SRIM_HYDROGEN";
/// Full path of the argon table, overriding the directory.
pub const ENV_SRIM_ARGON: &str = "CVVAR_SRIM_ARGON";

/// Recoil energies in keV.
#[derive(Debug, Clone, PartialEq)]
pub struct Energy(Vec<f64>);

/// Projected ranges in cm.
#[derive(Debug, Clone, PartialEq)]
pub struct Length(Vec<f64>);

impl Deref for Energy {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for Length {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Loader for SRIM tables.
pub struct SrimData;

impl SrimData {
    /// Read a table. Every line must hold exactly two numbers; the first
    /// malformed line aborts the load.
    pub fn read(path: impl AsRef<Path>) -> Result<(Energy, Length), SrimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| SrimError::Io { path: path.to_path_buf(), source })?;

        let mut energy = Vec::new();
        let mut length = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let (e, l) = parse_row(line).ok_or_else(|| SrimError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                content: line.to_string(),
            })?;
            energy.push(e);
            // mm -> cm
            length.push(l / 10.0);
        }

        tracing::debug!(path = %path.display(), rows = energy.len(), "loaded SRIM table");
        Ok((Energy(energy), Length(length)))
    }
}

fn parse_row(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let e = tokens.next()?.parse().ok()?;
    let l = tokens.next()?.parse().ok()?;
    match tokens.next() {
        Some(_) => None,
        None => Some((e, l)),
    }
}

/// Where the tables live, as given in the `srim:` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SrimConfig {
    /// Directory holding both tables under their default names.
    pub dir: Option<PathBuf>,
    /// Explicit hydrogen table path.
    pub hydrogen: Option<PathBuf>,
    /// Explicit argon table path.
    pub argon: Option<PathBuf>,
}

impl SrimConfig {
    /// Override fields from `CVVAR_SRIM_*` variables, read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<OsString>) {
        if let Some(dir) = var(ENV_SRIM_DIR) {
            self.dir = Some(dir.into());
        }
        if let Some(p) = var(ENV_SRIM_HYDROGEN) {
            self.hydrogen = Some(p.into());
        }
        if let Some(p) = var(ENV_SRIM_ARGON) {
            self.argon = Some(p.into());
        }
    }
}

/// The two recoil tables computed for 1 atm Ar:C2H6 = 9:1.
///
/// The gas mixture is a property of the table files and is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct SrimTables {
    hydrogen: PathBuf,
    argon: PathBuf,
}

impl SrimTables {
    /// Tables at explicit paths.
    pub fn new(hydrogen: impl Into<PathBuf>, argon: impl Into<PathBuf>) -> Self {
        Self { hydrogen: hydrogen.into(), argon: argon.into() }
    }

    /// Tables under their default names in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(HYDROGEN_TABLE), dir.join(ARGON_TABLE))
    }

    /// Resolve from configuration; a missing directory means the current one.
    pub fn from_config(config: &SrimConfig) -> Self {
        let dir = config.dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let defaults = Self::in_dir(&dir);
        Self {
            hydrogen: config.hydrogen.clone().unwrap_or(defaults.hydrogen),
            argon: config.argon.clone().unwrap_or(defaults.argon),
        }
    }

    /// Resolve from `CVVAR_SRIM_DIR`, `CVVAR_SRIM_HYDROGEN` and
    /// `CVVAR_SRIM_ARGON`.
    pub fn from_env() -> Self {
        let mut config = SrimConfig::default();
        config.apply_env(|k| std::env::var_os(k));
        Self::from_config(&config)
    }

    /// Path of the hydrogen-recoil table.
    pub fn hydrogen_path(&self) -> &Path {
        &self.hydrogen
    }

    /// Path of the argon-recoil table.
    pub fn argon_path(&self) -> &Path {
        &self.argon
    }

    /// Load the hydrogen-recoil table.
    pub fn hydrogen(&self) -> Result<(Energy, Length), SrimError> {
        SrimData::read(&self.hydrogen)
    }

    /// Load the argon-recoil table.
    pub fn argon(&self) -> Result<(Energy, Length), SrimError> {
        SrimData::read(&self.argon)
    }
}
