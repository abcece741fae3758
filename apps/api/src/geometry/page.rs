//! Page geometry: format, unit, dimensions and margins.
//!
//! # Invariants
//! - `width > 0`, `height > 0`
//! - `margin.top + margin.bottom < height`, `margin.left + margin.right < width`
//! - every margin is `>= 0`, and linked margins are equal
//!
//! Every setter builds a candidate, validates it, and only then replaces `self`,
//! so a rejected call leaves the geometry untouched.

use serde::{Deserialize, Serialize};

use crate::errors::EditError;
use crate::geometry::margin::{Edge, Margin};
use crate::geometry::units::{LengthUnit, PaperFormat};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    format: PaperFormat,
    unit: LengthUnit,
    width: f64,
    height: f64,
    margin: Margin,
}

impl PageGeometry {
    /// Builds a validated geometry.
    pub fn new(
        format: PaperFormat,
        unit: LengthUnit,
        width: f64,
        height: f64,
        margin: Margin,
    ) -> Result<Self, EditError> {
        let page = Self {
            format,
            unit,
            width,
            height,
            margin,
        };
        page.validate()?;
        Ok(page)
    }

    /// A standard format in `unit` with the given margins.
    pub fn standard(format: PaperFormat, unit: LengthUnit, margin: Margin) -> Result<Self, EditError> {
        let (width, height) = format.dimensions_in(unit).ok_or_else(|| {
            EditError::InvalidValue("a custom page needs explicit dimensions".to_string())
        })?;
        Self::new(format, unit, width, height, margin)
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn format(&self) -> PaperFormat {
        self.format
    }

    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn margin(&self) -> &Margin {
        &self.margin
    }

    /// Printable height: `height - margin.top - margin.bottom`.
    pub fn content_area_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Printable width: `width - margin.left - margin.right`.
    pub fn content_area_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    // ── mutations ───────────────────────────────────────────────────────────

    /// Selects a paper format by name. Standard formats replace the dimensions;
    /// `"custom"` only changes the label.
    pub fn set_format(&mut self, name: &str) -> Result<(), EditError> {
        let format: PaperFormat = name.parse()?;
        self.set_paper_format(format)
    }

    pub fn set_paper_format(&mut self, format: PaperFormat) -> Result<(), EditError> {
        let mut candidate = *self;
        candidate.format = format;
        if let Some((width, height)) = format.dimensions_in(self.unit) {
            candidate.width = width;
            candidate.height = height;
        }
        self.commit(candidate)
    }

    /// Switches unit, converting dimensions and margins so physical size is kept.
    pub fn set_unit(&mut self, unit: &str) -> Result<(), EditError> {
        let unit: LengthUnit = unit.parse()?;
        self.set_length_unit(unit);
        Ok(())
    }

    pub fn set_length_unit(&mut self, unit: LengthUnit) {
        let from = self.unit;
        if from == unit {
            return;
        }
        self.width = from.convert(self.width, unit);
        self.height = from.convert(self.height, unit);
        self.margin = self.margin.map(|v| from.convert(v, unit));
        self.unit = unit;
    }

    /// Writes one edge, or all four while linked.
    pub fn set_margin(&mut self, edge: Edge, value: f64) -> Result<(), EditError> {
        if !value.is_finite() || value < 0.0 {
            return Err(EditError::InvalidValue(format!(
                "margin {edge} must be a non-negative number, got {value}"
            )));
        }
        let mut candidate = *self;
        candidate.margin = self.margin.with_edge(edge, value);
        self.commit(candidate)
    }

    pub fn set_linked(&mut self, linked: bool) -> Result<(), EditError> {
        let mut candidate = *self;
        candidate.margin = self.margin.with_linked(linked);
        self.commit(candidate)
    }

    /// Sets explicit dimensions. The format becomes `custom`.
    pub fn set_dimensions(&mut self, width: f64, height: f64) -> Result<(), EditError> {
        let candidate = Self {
            format: PaperFormat::Custom,
            width,
            height,
            ..*self
        };
        self.commit(candidate)
    }

    // ── validation ──────────────────────────────────────────────────────────

    pub fn validate(&self) -> Result<(), EditError> {
        for (label, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EditError::InvalidValue(format!(
                    "page {label} must be a positive number, got {value}"
                )));
            }
        }
        for edge in Edge::ALL {
            let value = self.margin.get(edge);
            if !value.is_finite() || value < 0.0 {
                return Err(EditError::InvalidValue(format!(
                    "margin {edge} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.margin.is_consistent() {
            return Err(EditError::InvalidValue(
                "linked margins must be equal on all four edges".to_string(),
            ));
        }
        if self.content_area_height() <= 0.0 {
            return Err(EditError::InvalidValue(format!(
                "top + bottom margins ({} {unit}) leave no content height on a {} {unit} page",
                self.margin.top + self.margin.bottom,
                self.height,
                unit = self.unit,
            )));
        }
        if self.content_area_width() <= 0.0 {
            return Err(EditError::InvalidValue(format!(
                "left + right margins ({} {unit}) leave no content width on a {} {unit} page",
                self.margin.left + self.margin.right,
                self.width,
                unit = self.unit,
            )));
        }
        Ok(())
    }

    fn commit(&mut self, candidate: Self) -> Result<(), EditError> {
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

impl Default for PageGeometry {
    /// A4 portrait in millimetres with 20 mm linked margins.
    fn default() -> Self {
        Self {
            format: PaperFormat::A4,
            unit: LengthUnit::Mm,
            width: 210.0,
            height: 297.0,
            margin: Margin::uniform(20.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageGeometry {
        PageGeometry::default()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    // ── content area ────────────────────────────────────────────────────────

    #[test]
    fn test_a4_content_area() {
        let page = a4();
        assert_close(page.content_area_height(), 257.0);
        assert_close(page.content_area_width(), 170.0);
    }

    // ── set_format ──────────────────────────────────────────────────────────

    #[test]
    fn test_set_standard_format_replaces_dimensions() {
        let mut page = a4();
        page.set_format("Letter").unwrap();
        assert_eq!(page.format(), PaperFormat::Letter);
        assert_close(page.width(), 215.9);
        assert_close(page.height(), 279.4);
    }

    #[test]
    fn test_set_format_uses_current_unit() {
        let mut page = a4();
        page.set_unit("in").unwrap();
        page.set_format("Letter").unwrap();
        assert_close(page.width(), 8.5);
        assert_close(page.height(), 11.0);
    }

    #[test]
    fn test_custom_format_keeps_dimensions() {
        let mut page = a4();
        page.set_format("custom").unwrap();
        assert_eq!(page.format(), PaperFormat::Custom);
        assert_close(page.width(), 210.0);
        assert_close(page.height(), 297.0);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let mut page = a4();
        assert!(matches!(page.set_format("Folio"), Err(EditError::InvalidValue(_))));
        assert_eq!(page, a4());
    }

    #[test]
    fn test_format_that_breaks_margins_is_rejected() {
        let mut page = a4();
        page.set_margin(Edge::Top, 80.0).unwrap(); // linked: 80 on every edge
        // A5 is 148 wide: 80 + 80 > 148.
        let before = page;
        assert!(matches!(page.set_format("A5"), Err(EditError::InvalidValue(_))));
        assert_eq!(page, before);
    }

    // ── set_unit ────────────────────────────────────────────────────────────

    #[test]
    fn test_set_unit_converts_everything() {
        let mut page = a4();
        page.set_unit("cm").unwrap();
        assert_eq!(page.unit(), LengthUnit::Cm);
        assert_close(page.width(), 21.0);
        assert_close(page.height(), 29.7);
        assert_close(page.margin().top, 2.0);
        assert_close(page.margin().left, 2.0);
        assert!(page.margin().linked);
    }

    #[test]
    fn test_unit_round_trip() {
        let mut page = a4();
        page.set_unit("pt").unwrap();
        page.set_unit("px").unwrap();
        page.set_unit("mm").unwrap();
        assert!((page.width() - 210.0).abs() < 1e-9);
        assert!((page.height() - 297.0).abs() < 1e-9);
        assert!((page.margin().bottom - 20.0).abs() < 1e-9);
        assert!(page.content_area_height() > 0.0);
    }

    #[test]
    fn test_invalid_unit_leaves_state() {
        let mut page = a4();
        assert_eq!(
            page.set_unit("ell"),
            Err(EditError::InvalidUnit("ell".to_string()))
        );
        assert_eq!(page, a4());
    }

    // ── set_margin ──────────────────────────────────────────────────────────

    #[test]
    fn test_linked_margin_write_sets_all_edges() {
        let mut page = a4();
        page.set_margin(Edge::Top, 30.0).unwrap();
        let m = page.margin();
        assert_eq!((m.top, m.right, m.bottom, m.left), (30.0, 30.0, 30.0, 30.0));
        assert_close(page.content_area_height(), 237.0);
    }

    #[test]
    fn test_unlinked_margin_write_sets_one_edge() {
        let mut page = a4();
        page.set_linked(false).unwrap();
        page.set_margin(Edge::Bottom, 35.0).unwrap();
        assert_eq!(page.margin().bottom, 35.0);
        assert_eq!(page.margin().top, 20.0);
        assert_close(page.content_area_height(), 242.0);
    }

    #[test]
    fn test_negative_margin_rejected() {
        let mut page = a4();
        assert!(matches!(
            page.set_margin(Edge::Left, -1.0),
            Err(EditError::InvalidValue(_))
        ));
        assert!(matches!(
            page.set_margin(Edge::Left, f64::NAN),
            Err(EditError::InvalidValue(_))
        ));
        assert_eq!(page, a4());
    }

    #[test]
    fn test_margin_that_eats_content_area_rejected() {
        let mut page = a4();
        page.set_linked(false).unwrap();
        // 20 + 277 = 297: zero content height is not allowed.
        assert!(page.set_margin(Edge::Bottom, 277.0).is_err());
        assert!(page.set_margin(Edge::Bottom, 276.0).is_ok());
        assert!(page.content_area_height() > 0.0);
    }

    // ── set_linked ──────────────────────────────────────────────────────────

    #[test]
    fn test_relinking_unifies_to_top() {
        let mut page = a4();
        page.set_linked(false).unwrap();
        page.set_margin(Edge::Top, 12.0).unwrap();
        page.set_margin(Edge::Right, 40.0).unwrap();
        page.set_linked(true).unwrap();
        assert_eq!(*page.margin(), Margin::uniform(12.0));
    }

    #[test]
    fn test_relinking_that_breaks_width_rejected() {
        let mut page = a4();
        page.set_linked(false).unwrap();
        page.set_margin(Edge::Left, 0.0).unwrap();
        page.set_margin(Edge::Right, 0.0).unwrap();
        page.set_margin(Edge::Bottom, 0.0).unwrap();
        page.set_margin(Edge::Top, 120.0).unwrap();
        let before = page;
        assert!(page.set_linked(true).is_err());
        assert_eq!(page, before);
    }

    // ── set_dimensions ──────────────────────────────────────────────────────

    #[test]
    fn test_set_dimensions_marks_custom() {
        let mut page = a4();
        page.set_dimensions(200.0, 250.0).unwrap();
        assert_eq!(page.format(), PaperFormat::Custom);
        assert_close(page.content_area_height(), 210.0);
    }

    #[test]
    fn test_set_dimensions_rejects_non_positive() {
        let mut page = a4();
        assert!(page.set_dimensions(0.0, 100.0).is_err());
        assert!(page.set_dimensions(100.0, -5.0).is_err());
        assert!(page.set_dimensions(100.0, 40.0).is_err()); // 20 + 20 >= 40
        assert_eq!(page, a4());
    }

    #[test]
    fn test_new_rejects_inconsistent_linked_margin() {
        let margin = Margin {
            top: 10.0,
            right: 20.0,
            bottom: 10.0,
            left: 10.0,
            linked: true,
        };
        assert!(PageGeometry::new(PaperFormat::A4, LengthUnit::Mm, 210.0, 297.0, margin).is_err());
    }

    #[test]
    fn test_serde_shape() {
        let value = serde_json::to_value(a4()).unwrap();
        assert_eq!(value["format"], "A4");
        assert_eq!(value["unit"], "mm");
        assert_eq!(value["width"], 210.0);
        assert_eq!(value["margin"]["linked"], true);
    }
}
