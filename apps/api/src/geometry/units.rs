//! Length units and standard paper formats.
//!
//! All conversions go through millimetres. Format tables are portrait and in mm;
//! callers convert into the document's unit with [`LengthUnit::from_mm`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EditError;

// ────────────────────────────────────────────────────────────────────────────
// Length units
// ────────────────────────────────────────────────────────────────────────────

/// Length unit used for every page measurement of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    Cm,
    In,
    /// PostScript point, 1/72 in.
    Pt,
    /// CSS pixel, 1/96 in.
    Px,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 5] = [
        LengthUnit::Mm,
        LengthUnit::Cm,
        LengthUnit::In,
        LengthUnit::Pt,
        LengthUnit::Px,
    ];

    /// Millimetres in one of this unit.
    pub fn mm_per_unit(self) -> f64 {
        match self {
            LengthUnit::Mm => 1.0,
            LengthUnit::Cm => 10.0,
            LengthUnit::In => 25.4,
            LengthUnit::Pt => 25.4 / 72.0,
            LengthUnit::Px => 25.4 / 96.0,
        }
    }

    pub fn to_mm(self, value: f64) -> f64 {
        value * self.mm_per_unit()
    }

    pub fn from_mm(self, mm: f64) -> f64 {
        mm / self.mm_per_unit()
    }

    /// Converts `value` expressed in `self` into `target`, preserving physical length.
    pub fn convert(self, value: f64, target: LengthUnit) -> f64 {
        if self == target {
            return value;
        }
        target.from_mm(self.to_mm(value))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
            LengthUnit::Pt => "pt",
            LengthUnit::Px => "px",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthUnit::ALL
            .into_iter()
            .find(|u| u.as_str() == s.trim())
            .ok_or_else(|| EditError::InvalidUnit(s.to_string()))
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paper formats
// ────────────────────────────────────────────────────────────────────────────

/// Named paper size. `Custom` means the dimensions were set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    #[serde(rename = "custom")]
    Custom,
}

impl PaperFormat {
    pub const ALL: [PaperFormat; 6] = [
        PaperFormat::A3,
        PaperFormat::A4,
        PaperFormat::A5,
        PaperFormat::Letter,
        PaperFormat::Legal,
        PaperFormat::Custom,
    ];

    /// Portrait `(width, height)` in millimetres, `None` for `Custom`.
    pub fn dimensions_mm(self) -> Option<(f64, f64)> {
        match self {
            PaperFormat::A3 => Some((297.0, 420.0)),
            PaperFormat::A4 => Some((210.0, 297.0)),
            PaperFormat::A5 => Some((148.0, 210.0)),
            PaperFormat::Letter => Some((215.9, 279.4)),
            PaperFormat::Legal => Some((215.9, 355.6)),
            PaperFormat::Custom => None,
        }
    }

    /// Portrait `(width, height)` in `unit`, `None` for `Custom`.
    pub fn dimensions_in(self, unit: LengthUnit) -> Option<(f64, f64)> {
        self.dimensions_mm()
            .map(|(w, h)| (unit.from_mm(w), unit.from_mm(h)))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperFormat::A3 => "A3",
            PaperFormat::A4 => "A4",
            PaperFormat::A5 => "A5",
            PaperFormat::Letter => "Letter",
            PaperFormat::Legal => "Legal",
            PaperFormat::Custom => "custom",
        }
    }
}

impl FromStr for PaperFormat {
    type Err = EditError;

    /// Standard names match case-insensitively ("a4", "LETTER").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaperFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EditError::InvalidValue(format!("unknown paper format '{s}'")))
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_units() {
        assert_eq!("mm".parse::<LengthUnit>().unwrap(), LengthUnit::Mm);
        assert_eq!(" in ".parse::<LengthUnit>().unwrap(), LengthUnit::In);
        assert_eq!("px".parse::<LengthUnit>().unwrap(), LengthUnit::Px);
    }

    #[test]
    fn test_unknown_unit_is_invalid_unit() {
        let err = "furlong".parse::<LengthUnit>().unwrap_err();
        assert_eq!(err, EditError::InvalidUnit("furlong".to_string()));
    }

    #[test]
    fn test_inch_to_points() {
        let pt = LengthUnit::In.convert(1.0, LengthUnit::Pt);
        assert!((pt - 72.0).abs() < 1e-9);
        let px = LengthUnit::In.convert(1.0, LengthUnit::Px);
        assert!((px - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_round_trip_is_lossless_within_tolerance() {
        for a in LengthUnit::ALL {
            for b in LengthUnit::ALL {
                let back = b.convert(a.convert(123.456, b), a);
                assert!((back - 123.456).abs() < 1e-9, "{a} -> {b} -> {a} gave {back}");
            }
        }
    }

    #[test]
    fn test_format_names_are_case_insensitive() {
        assert_eq!("a4".parse::<PaperFormat>().unwrap(), PaperFormat::A4);
        assert_eq!("LETTER".parse::<PaperFormat>().unwrap(), PaperFormat::Letter);
        assert_eq!("custom".parse::<PaperFormat>().unwrap(), PaperFormat::Custom);
        assert!(matches!(
            "B5".parse::<PaperFormat>(),
            Err(EditError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_a4_in_inches() {
        let (w, h) = PaperFormat::A4.dimensions_in(LengthUnit::In).unwrap();
        assert!((w - 8.2677).abs() < 1e-3);
        assert!((h - 11.6929).abs() < 1e-3);
        assert!(PaperFormat::Custom.dimensions_in(LengthUnit::Mm).is_none());
    }

    #[test]
    fn test_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&LengthUnit::Cm).unwrap(), "\"cm\"");
        assert_eq!(serde_json::to_string(&PaperFormat::Custom).unwrap(), "\"custom\"");
        assert_eq!(serde_json::to_string(&PaperFormat::A4).unwrap(), "\"A4\"");
    }
}
