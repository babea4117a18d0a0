//! Domain models for the Aftab Autos ERP

mod document;
mod line_item;
mod product;
mod totals;

pub use document::*;
pub use line_item::*;
pub use product::*;
pub use totals::*;
