//! Label geometry.
//!
//! The printer driver expects a raster whose pixel size matches the label
//! exactly and performs no scaling of its own. This module knows the printable
//! area of the common Brother QL label codes so a configuration can name only
//! the label and have the pixel size derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Pixel dimensions of a raster image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDimensions {
            value: s.to_string(),
        };
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for Dimensions {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimensions> for String {
    fn from(dims: Dimensions) -> Self {
        dims.to_string()
    }
}

/// Physical form of a label roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelForm {
    /// Continuous tape; the printed length follows the image height.
    Endless,
    /// Pre-cut rectangular labels.
    DieCut,
    /// Pre-cut round labels.
    Round,
}

impl fmt::Display for LabelForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endless => write!(f, "endless"),
            Self::DieCut => write!(f, "die-cut"),
            Self::Round => write!(f, "round"),
        }
    }
}

/// A label code understood by the printer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelSpec {
    /// Code passed to the driver's `--label` option.
    pub code: &'static str,
    /// Physical form.
    pub form: LabelForm,
    /// Printable width in pixels at 300 dpi.
    pub width: u32,
    /// Printable height in pixels, or 0 for endless tape.
    pub height: u32,
}

impl LabelSpec {
    /// Fixed raster dimensions for this label, if the label has a fixed length.
    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        (self.height > 0).then(|| Dimensions::new(self.width, self.height))
    }

    /// Check whether a raster of the given size fits this label exactly.
    ///
    /// Endless labels only constrain the width.
    #[must_use]
    pub fn accepts(&self, dims: Dimensions) -> bool {
        match self.form {
            LabelForm::Endless => dims.width == self.width,
            LabelForm::DieCut | LabelForm::Round => {
                dims.width == self.width && dims.height == self.height
            }
        }
    }
}

const fn endless(code: &'static str, width: u32) -> LabelSpec {
    LabelSpec {
        code,
        form: LabelForm::Endless,
        width,
        height: 0,
    }
}

const fn die_cut(code: &'static str, width: u32, height: u32) -> LabelSpec {
    LabelSpec {
        code,
        form: LabelForm::DieCut,
        width,
        height,
    }
}

const fn round(code: &'static str, diameter: u32) -> LabelSpec {
    LabelSpec {
        code,
        form: LabelForm::Round,
        width: diameter,
        height: diameter,
    }
}

/// Labels known to the `brother_ql` driver.
pub const KNOWN_LABELS: &[LabelSpec] = &[
    endless("12", 106),
    endless("29", 306),
    endless("38", 413),
    endless("50", 554),
    endless("54", 590),
    endless("62", 696),
    endless("62red", 696),
    endless("102", 1164),
    die_cut("17x54", 165, 566),
    die_cut("17x87", 165, 956),
    die_cut("23x23", 202, 202),
    die_cut("29x42", 306, 425),
    die_cut("29x90", 306, 991),
    die_cut("39x90", 413, 991),
    die_cut("39x48", 425, 495),
    die_cut("52x29", 578, 271),
    die_cut("62x29", 696, 271),
    die_cut("62x100", 696, 1109),
    die_cut("102x51", 1164, 526),
    die_cut("102x152", 1164, 1660),
    round("d12", 94),
    round("d24", 236),
    round("d58", 618),
];

/// Look up a label by its driver code (case-insensitive).
#[must_use]
pub fn find_label(code: &str) -> Option<&'static LabelSpec> {
    let code = code.trim();
    KNOWN_LABELS
        .iter()
        .find(|label| label.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        let dims: Dimensions = "696x1109".parse().unwrap();
        assert_eq!(dims, Dimensions::new(696, 1109));

        let dims: Dimensions = " 306 X 991 ".parse().unwrap();
        assert_eq!(dims, Dimensions::new(306, 991));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        for bad in ["", "696", "696x", "x1109", "696by1109", "-1x10", "0x100", "100x0"] {
            let result = bad.parse::<Dimensions>();
            assert!(result.is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(696, 1109).to_string(), "696x1109");
    }

    #[test]
    fn test_dimensions_serde_as_string() {
        let json = serde_json::to_string(&Dimensions::new(696, 271)).unwrap();
        assert_eq!(json, "\"696x271\"");

        let dims: Dimensions = serde_json::from_str("\"413x991\"").unwrap();
        assert_eq!(dims, Dimensions::new(413, 991));

        assert!(serde_json::from_str::<Dimensions>("\"nope\"").is_err());
    }

    #[test]
    fn test_find_label() {
        let label = find_label("62x100").unwrap();
        assert_eq!(label.form, LabelForm::DieCut);
        assert_eq!(label.dimensions(), Some(Dimensions::new(696, 1109)));

        assert!(find_label("62RED").is_some());
        assert!(find_label("63x100").is_none());
    }

    #[test]
    fn test_endless_label_has_no_fixed_dimensions() {
        let label = find_label("62").unwrap();
        assert_eq!(label.form, LabelForm::Endless);
        assert!(label.dimensions().is_none());
        assert!(label.accepts(Dimensions::new(696, 300)));
        assert!(label.accepts(Dimensions::new(696, 5000)));
        assert!(!label.accepts(Dimensions::new(306, 300)));
    }

    #[test]
    fn test_die_cut_accepts_exact_size_only() {
        let label = find_label("29x90").unwrap();
        assert!(label.accepts(Dimensions::new(306, 991)));
        assert!(!label.accepts(Dimensions::new(306, 990)));
    }

    #[test]
    fn test_round_label_is_square() {
        let label = find_label("d24").unwrap();
        assert_eq!(label.dimensions(), Some(Dimensions::new(236, 236)));
    }

    #[test]
    fn test_known_labels_are_unique() {
        for (i, a) in KNOWN_LABELS.iter().enumerate() {
            for b in &KNOWN_LABELS[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
