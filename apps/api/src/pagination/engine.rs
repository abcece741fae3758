//! Page-fitting pass — maps variable-height sections onto fixed-height pages.
//!
//! # Fitting rules
//! - A section fits when `used + height <= content_height` (an exact fill stays on the page).
//! - A section that does not fit on a page that already holds content starts a new page.
//! - A section taller than the whole content area is oversized. If it arrives on an
//!   empty page it stays there; either way the page it lands on counts as full.
//!
//! `paginate` is pure apart from tracing output: identical inputs give identical results.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sections::{Section, SectionId};

/// Absorbs float noise from unit conversion when comparing against the content height.
const FIT_TOLERANCE: f64 = 1e-9;

// ────────────────────────────────────────────────────────────────────────────
// Result type
// ────────────────────────────────────────────────────────────────────────────

/// Derived page layout of a certificate.
///
/// `page_breaks` lists, in print order, every section that begins a new page.
/// The first page always begins at the first section, so `total_pages` is
/// `page_breaks.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub enabled: bool,
    /// 1-based page the editor is showing.
    pub current_page: u32,
    pub total_pages: u32,
    pub page_breaks: Vec<SectionId>,
    /// Sections taller than the content area, in print order.
    #[serde(default)]
    pub oversized: Vec<SectionId>,
}

impl PaginationResult {
    /// Single-page result used when pagination is switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            current_page: 1,
            total_pages: 1,
            page_breaks: Vec::new(),
            oversized: Vec::new(),
        }
    }

    /// Page number (1-based) holding `id`, or `None` if `id` is not in `sections`.
    pub fn page_of(&self, sections: &[Section], id: SectionId) -> Option<u32> {
        self.page_assignments(sections)
            .into_iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, page)| page)
    }

    /// Ids of the sections printed on `page`, in order.
    pub fn sections_on_page(&self, sections: &[Section], page: u32) -> Vec<SectionId> {
        self.page_assignments(sections)
            .into_iter()
            .filter(|(_, p)| *p == page)
            .map(|(id, _)| id)
            .collect()
    }

    /// `(section, page)` for every section, in print order.
    pub fn page_assignments(&self, sections: &[Section]) -> Vec<(SectionId, u32)> {
        let breaks: HashSet<SectionId> = self.page_breaks.iter().copied().collect();
        let mut page = 1u32;
        sections
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i > 0 && breaks.contains(&s.id) {
                    page += 1;
                }
                (s.id, page)
            })
            .collect()
    }
}

impl Default for PaginationResult {
    fn default() -> Self {
        Self {
            enabled: true,
            ..Self::disabled()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core function
// ────────────────────────────────────────────────────────────────────────────

/// Assigns `sections` (in print order) to pages of `content_height`.
///
/// `current_page` in the returned result is always 1; the container re-resolves it
/// against the section the user was viewing.
pub fn paginate(content_height: f64, sections: &[Section], enabled: bool) -> PaginationResult {
    if !enabled {
        return PaginationResult::disabled();
    }

    let mut page_breaks = Vec::new();
    let mut oversized = Vec::new();
    let mut used = 0.0_f64;

    for section in sections {
        let height = section.render_height;
        let too_tall = height > content_height + FIT_TOLERANCE;
        if too_tall {
            warn!(
                section = %section.id,
                name = %section.name,
                height,
                content_height,
                "Section is taller than the page content area"
            );
            oversized.push(section.id);
        }

        if used + height <= content_height + FIT_TOLERANCE {
            used += height;
        } else if used == 0.0 {
            // Alone on an empty page: keep it here rather than emit blank pages.
            used = content_height;
        } else {
            page_breaks.push(section.id);
            used = if too_tall { content_height } else { height };
        }
    }

    let total_pages = page_breaks.len() as u32 + 1;
    debug!(
        sections = sections.len(),
        total_pages,
        oversized = oversized.len(),
        "Paginated certificate"
    );

    PaginationResult {
        enabled: true,
        current_page: 1,
        total_pages,
        page_breaks,
        oversized,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
