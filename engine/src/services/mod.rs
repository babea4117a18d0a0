//! Document editing services

pub mod catalog;
pub mod composer;
pub mod editor;
pub mod lifecycle;

pub use catalog::{build_search_index, search, Catalog, SearchRow, DEFAULT_RESULT_LIMIT};
pub use composer::{LineItemComposer, LineItemEdit};
pub use editor::{DateField, DocumentEditor, HeaderEdit};
pub use lifecycle::{DocumentAction, SaveAction};
