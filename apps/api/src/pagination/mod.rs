// Pagination engine: turns geometry + section heights into page breaks.
// `paginate` is pure; `view` keeps the editor's current page pinned to the section in view.

pub mod engine;
pub mod view;

pub use engine::{paginate, PaginationResult};
pub use view::resolve_current_page;
