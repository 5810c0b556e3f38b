//! ROOT-style draw option strings (`"HIST"`, `"E"`, `"COLZ"`, ...).
//!
//! Tokens are case-insensitive and may be glued together (`"colz"`) or
//! separated by spaces/commas. Unknown tokens are logged and ignored, the
//! way `TH1::Draw` ignores options it does not understand.

/// How a 1-D histogram is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style1D {
    /// Step outline.
    #[default]
    Hist,
    /// Markers with √sumw2 error bars.
    Errors,
    /// Filled bars.
    Bar,
}

/// How a 2-D histogram is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style2D {
    /// Random markers, density proportional to content.
    #[default]
    Scatter,
    /// Boxes with area proportional to content.
    Box,
    /// Colour cells.
    Col,
    /// Colour cells plus a colour bar.
    ColZ,
}

/// Parsed draw options plus log-scale flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOptions {
    pub style_1d: Style1D,
    pub style_2d: Style2D,
    pub log_x: bool,
    pub log_y: bool,
    pub log_z: bool,
}

/// Recognised tokens, longest first so `COLZ` wins over `COL`.
const TOKENS: &[&str] = &["COLZ", "HIST", "SCAT", "LOGX", "LOGY", "LOGZ", "COL", "BOX", "BAR", "E"];

impl DrawOptions {
    pub fn parse(options: &str) -> Self {
        let mut out = Self::default();
        for word in options.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
            let mut rest = word.to_ascii_uppercase();
            while !rest.is_empty() {
                match TOKENS.iter().find(|t| rest.starts_with(**t)) {
                    Some(token) => {
                        out.apply(token);
                        rest.drain(..token.len());
                    }
                    None => {
                        tracing::warn!(option = %rest, "ignoring unknown draw option");
                        break;
                    }
                }
            }
        }
        out
    }

    fn apply(&mut self, token: &str) {
        match token {
            "HIST" => self.style_1d = Style1D::Hist,
            "E" => self.style_1d = Style1D::Errors,
            "BAR" => self.style_1d = Style1D::Bar,
            "SCAT" => self.style_2d = Style2D::Scatter,
            "BOX" => self.style_2d = Style2D::Box,
            "COL" => self.style_2d = Style2D::Col,
            "COLZ" => self.style_2d = Style2D::ColZ,
            "LOGX" => self.log_x = true,
            "LOGY" => self.log_y = true,
            "LOGZ" => self.log_z = true,
            _ => {}
        }
    }

    /// Apply a log colour-scale toggle (`SetLogz`). 1-D plots have no colour
    /// axis and are unaffected; `LOGY` in the option string still applies.
    pub fn with_log(mut self, log: bool) -> Self {
        if log {
            self.log_z = true;
        }
        self
    }
}
