// Geometry model: page size, unit and margins.
// Any change here moves the content-area height, so the container repaginates after each setter.

pub mod margin;
pub mod page;
pub mod units;

pub use margin::{Edge, Margin};
pub use page::PageGeometry;
pub use units::{LengthUnit, PaperFormat};
