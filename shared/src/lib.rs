//! Shared types and models for the Aftab Autos ERP
//!
//! This crate contains the document, line-item and packaging types shared
//! between the editing engine, the browser (via WASM), and other components
//! of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
