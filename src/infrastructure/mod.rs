pub mod page_surface;
pub mod surface;

#[cfg(test)]
pub(crate) mod fake;

pub use page_surface::PageSurface;
pub use surface::{Locator, OrderSurface};
