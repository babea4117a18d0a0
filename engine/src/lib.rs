//! Aftab Autos document engine
//!
//! Composes purchase and sales documents from the product catalog: packaging
//! resolution, product search, line-item editing, totals and the document
//! lifecycle. Persistence is delegated to a [`store::DocumentStore`].

pub mod config;
pub mod error;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{EngineError, EngineResult, ErrorDetail};
pub use services::*;
pub use store::{DocumentStore, InMemoryDocumentStore, SaveRequest};
