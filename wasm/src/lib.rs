//! WebAssembly module for Aftab Autos documents
//!
//! Provides client-side computation for:
//! - Packaging resolution and product search
//! - Line amounts and document totals
//! - Document ids, dates and linked references
//! - A stateful editing session (see [`EditorHandle`])
//!
//! Values cross the boundary as JSON strings. Errors are thrown as the JSON
//! form of [`engine::ErrorDetail`].

use chrono::NaiveDate;
use engine::{Catalog, EngineError, ErrorDetail};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{LineItem, Product};
use wasm_bindgen::prelude::*;

mod editor;

pub use editor::EditorHandle;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("aftab-autos-wasm ready"));
}

// ============================================================================
// Boundary helpers
// ============================================================================

pub(crate) fn invalid_input(what: &str, err: impl std::fmt::Display) -> ErrorDetail {
    EngineError::Validation {
        field: what.to_string(),
        message: format!("Invalid {} JSON: {}", what, err),
    }
    .detail()
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    what: &str,
    json: &str,
) -> Result<T, ErrorDetail> {
    serde_json::from_str(json).map_err(|e| invalid_input(what, e))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, ErrorDetail> {
    serde_json::to_string(value).map_err(|e| EngineError::StorageError(e.to_string()).detail())
}

pub(crate) fn to_js(detail: ErrorDetail) -> JsValue {
    JsValue::from_str(&serde_json::to_string(&detail).unwrap_or(detail.message))
}

/// `YYYY-MM-DD` from the host, or the browser's local date
pub(crate) fn today_or(text: Option<String>) -> Result<NaiveDate, ErrorDetail> {
    match text {
        Some(text) => shared::parse_iso_date(&text).ok_or_else(|| {
            EngineError::Validation {
                field: "today".to_string(),
                message: format!("Invalid date: {}", text),
            }
            .detail()
        }),
        None => {
            let now = js_sys::Date::new_0();
            NaiveDate::from_ymd_opt(
                now.get_full_year() as i32,
                now.get_month() + 1,
                now.get_date(),
            )
            .ok_or_else(|| EngineError::Configuration("Browser clock".to_string()).detail())
        }
    }
}

// ============================================================================
// Packaging and search
// ============================================================================

fn packaging_options_json(product_json: &str) -> Result<String, ErrorDetail> {
    let product: Product = from_json("product", product_json)?;
    to_json(&shared::resolve_packaging_options(&product))
}

fn default_packaging_json(product_json: &str) -> Result<String, ErrorDetail> {
    let product: Product = from_json("product", product_json)?;
    to_json(&shared::resolve_default_packaging(&product))
}

fn search_json(products_json: &str, query: &str, limit: usize) -> Result<String, ErrorDetail> {
    let products: Vec<Product> = from_json("products", products_json)?;
    let catalog = Catalog::new(products);
    to_json(&catalog.search(query, limit))
}

/// Selectable packaging options for a product, base unit first
#[wasm_bindgen]
pub fn resolve_packaging_options(product_json: &str) -> Result<String, JsValue> {
    packaging_options_json(product_json).map_err(to_js)
}

/// The option a new line should start with
#[wasm_bindgen]
pub fn default_packaging(product_json: &str) -> Result<String, JsValue> {
    default_packaging_json(product_json).map_err(to_js)
}

/// Search a product list at packaging level
#[wasm_bindgen]
pub fn search_products(products_json: &str, query: &str, limit: usize) -> Result<String, JsValue> {
    search_json(products_json, query, limit).map_err(to_js)
}

// ============================================================================
// Amounts
// ============================================================================

fn line_view_json(item_json: &str) -> Result<String, ErrorDetail> {
    let item: LineItem = from_json("line item", item_json)?;
    to_json(&item.view())
}

fn totals_json(items_json: &str, overall_discount: &str) -> Result<String, ErrorDetail> {
    let items: Vec<LineItem> = from_json("line items", items_json)?;
    let overall = shared::parse_amount_or_zero(overall_discount).max(Decimal::ZERO);
    to_json(&shared::calculate_totals(&items, overall))
}

/// A line item with its derived qtyBase, gross, discount and net amounts
#[wasm_bindgen]
pub fn compute_line_amounts(item_json: &str) -> Result<String, JsValue> {
    line_view_json(item_json).map_err(to_js)
}

/// Document totals for a list of line items
#[wasm_bindgen]
pub fn compute_totals(items_json: &str, overall_discount: &str) -> Result<String, JsValue> {
    totals_json(items_json, overall_discount).map_err(to_js)
}

/// Lenient amount parsing; unparsable input gives "0"
#[wasm_bindgen]
pub fn parse_amount(text: &str) -> String {
    shared::parse_amount_or_zero(text).to_string()
}

// ============================================================================
// Ids, dates, references
// ============================================================================

fn next_id(prefix: &str, existing_json: &str) -> Result<String, ErrorDetail> {
    let existing: Vec<String> = from_json("document ids", existing_json)?;
    Ok(shared::next_document_id(
        prefix,
        existing.iter().map(String::as_str),
    ))
}

/// Next free id under `prefix` given the ids already issued
#[wasm_bindgen]
pub fn next_document_id(prefix: &str, existing_json: &str) -> Result<String, JsValue> {
    next_id(prefix, existing_json).map_err(to_js)
}

/// `DD/MM/YYYY` to `YYYY-MM-DD`; `None` for anything that is not a real date
#[wasm_bindgen]
pub fn parse_display_date(text: &str) -> Option<String> {
    shared::parse_display_date(text).map(shared::format_iso_date)
}

/// `YYYY-MM-DD` to `DD/MM/YYYY`
#[wasm_bindgen]
pub fn format_display_date(iso: &str) -> Option<String> {
    shared::parse_iso_date(iso).map(shared::format_display_date)
}

/// Whether `reference` names a controlling document under a comma-separated
/// prefix list, e.g. `"PI"`
#[wasm_bindgen]
pub fn is_linked_reference(reference: &str, prefixes: &str) -> bool {
    let prefixes: Vec<&str> = prefixes
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    shared::is_linked_reference(reference, prefixes.as_slice())
}
