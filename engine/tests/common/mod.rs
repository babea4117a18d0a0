//! Shared fixtures for engine tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use engine::{Catalog, Config, DocumentEditor, DocumentStore, EngineError, EngineResult, SaveRequest};
use rust_decimal::Decimal;
use shared::{DocumentKind, Packaging, Product};

/// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

pub fn packaging(id: &str, name: &str, factor: &str, sale: &str, cost: &str) -> Packaging {
    Packaging {
        id: id.to_string(),
        name: name.to_string(),
        code: None,
        display_name: None,
        display_code: None,
        factor: Some(dec(factor)),
        sale_price: Some(dec(sale)),
        cost_price: Some(dec(cost)),
        is_default: false,
        is_active: true,
    }
}

pub fn product(id: &str, name: &str, code: &str, unit: &str, price: &str, cost: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        product_code: code.to_string(),
        unit: unit.to_string(),
        price: Some(dec(price)),
        cost_price: Some(dec(cost)),
        stock: dec("120"),
        reorder_point: dec("24"),
        brand: None,
        category: None,
        barcode: None,
        packaging: Vec::new(),
    }
}

/// Product P from the reference scenario: Piece at 100/80, Box of 12 at 1100/900
pub fn oil_filter() -> Product {
    let mut p = product("p-oil", "Oil Filter", "OF-100", "Piece", "100", "80");
    p.brand = Some("Guard".to_string());
    p.category = Some("Filters".to_string());
    p.barcode = Some("8964000123456".to_string());
    p.packaging = vec![packaging("pk-box", "Box", "12", "1100", "900")];
    p
}

pub fn spark_plug() -> Product {
    let mut p = product("p-plug", "Spark Plug", "SP-20", "Piece", "450", "380");
    p.brand = Some("NGK".to_string());
    p.packaging = vec![
        packaging("pk-pack", "Pack", "4", "1700", "1450"),
        packaging("pk-carton", "Carton", "40", "16000", "14000"),
    ];
    p
}

pub fn engine_oil() -> Product {
    let mut p = product("p-eo", "Engine Oil 4L", "EO-4L", "Can", "5200", "4600");
    p.category = Some("Lubricants".to_string());
    p.packaging = vec![packaging("pk-ctn", "Carton", "6", "30000", "27000")];
    p
}

pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(vec![oil_filter(), spark_plug(), engine_oil()]))
}

pub fn config() -> Arc<Config> {
    Arc::new(Config::default())
}

pub fn new_editor<S: DocumentStore>(kind: DocumentKind, store: &S) -> DocumentEditor {
    DocumentEditor::create(kind, store, catalog(), config(), today()).unwrap()
}

/// Store that refuses every save
#[derive(Default)]
pub struct FailingStore;

impl DocumentStore for FailingStore {
    fn document_ids(&self, _prefix: &str) -> EngineResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn save(&mut self, _request: &SaveRequest) -> EngineResult<()> {
        Err(EngineError::StorageError("connection reset".to_string()))
    }
}
