use std::path::Path;

use crate::RenderError;

#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "png")]
pub mod png;

/// Image formats a histogram can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
    #[cfg(feature = "pdf")]
    Pdf,
}

impl OutputFormat {
    /// Format named by a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> crate::Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            #[cfg(feature = "png")]
            "png" => Ok(Self::Png),
            #[cfg(feature = "pdf")]
            "pdf" => Ok(Self::Pdf),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }

    /// Format of `path`, from its extension.
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            RenderError::UnknownFormat(format!("{} has no extension", path.display()))
        })?;
        Self::from_extension(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup() {
        assert_eq!(OutputFormat::from_extension("SVG").unwrap(), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("out/h.svg")).unwrap(), OutputFormat::Svg);
        assert!(matches!(
            OutputFormat::from_path(Path::new("h.gif")),
            Err(RenderError::UnknownFormat(ref e)) if e == "gif"
        ));
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }
}
