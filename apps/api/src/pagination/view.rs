//! Current-page resolution after a repagination.
//!
//! The editor tracks the section it is looking at (the anchor). When the layout
//! changes, the current page follows the anchor to wherever it now lands; if the
//! anchor is gone, the previous page number is clamped into `[1, total_pages]`.

use crate::pagination::engine::PaginationResult;
use crate::sections::{Section, SectionId};

/// Sets `result.current_page` and returns the anchor to track from now on.
pub fn resolve_current_page(
    result: &mut PaginationResult,
    sections: &[Section],
    previous_page: u32,
    anchor: Option<SectionId>,
) -> Option<SectionId> {
    if let Some(id) = anchor {
        if let Some(page) = result.page_of(sections, id) {
            result.current_page = page;
            return Some(id);
        }
    }

    result.current_page = previous_page.clamp(1, result.total_pages.max(1));
    result
        .sections_on_page(sections, result.current_page)
        .first()
        .copied()
}
