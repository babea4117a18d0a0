//! Product catalog and packaging models

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{deserialize_lenient_amount, DocumentMode};
use crate::validation::validate_pack_factor;

/// A catalog product with its base unit and alternate packagings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_code: String,
    /// Base unit label, e.g. "Piece"
    #[serde(default)]
    pub unit: String,
    /// Base sale price
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub price: Option<Decimal>,
    /// Base cost price
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Decimal,
    #[serde(default)]
    pub reorder_point: Decimal,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub packaging: Vec<Packaging>,
}

/// An explicit packaging row stored against a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Packaging {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Overrides the search label when present
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_code: Option<String>,
    /// Base units per one packaging unit
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub factor: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub sale_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Identity of a packaging option: the product's implicit base unit or a
/// named packaging row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PackagingRef {
    Base,
    Named(String),
}

impl PackagingRef {
    pub fn is_base(&self) -> bool {
        matches!(self, PackagingRef::Base)
    }
}

impl fmt::Display for PackagingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingRef::Base => write!(f, "base"),
            PackagingRef::Named(id) => write!(f, "{}", id),
        }
    }
}

/// A selectable packaging resolved against its product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOption {
    pub packaging: PackagingRef,
    pub name: String,
    pub code: Option<String>,
    pub display_name: Option<String>,
    pub display_code: Option<String>,
    pub factor: Decimal,
    pub sale_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub is_default: bool,
}

impl PackagingOption {
    /// Price used as the line default: cost for purchases, sale otherwise
    pub fn price_for(&self, mode: DocumentMode) -> Option<Decimal> {
        match mode {
            DocumentMode::Purchase => self.cost_price,
            DocumentMode::Sales => self.sale_price,
        }
    }
}

impl Packaging {
    /// Whether this row may be offered for selection
    pub fn is_selectable(&self) -> bool {
        let factor_ok = self.factor.is_some_and(|f| validate_pack_factor(f).is_ok());
        self.is_active && factor_ok && !self.name.trim().is_empty()
    }
}

impl Product {
    /// The implicit base-unit option every product carries
    pub fn base_option(&self) -> PackagingOption {
        PackagingOption {
            packaging: PackagingRef::Base,
            name: self.unit.clone(),
            code: None,
            display_name: None,
            display_code: None,
            factor: Decimal::ONE,
            sale_price: self.price,
            cost_price: self.cost_price,
            is_default: true,
        }
    }

    /// Look up a resolved option by reference
    pub fn find_option(&self, packaging: &PackagingRef) -> Option<PackagingOption> {
        resolve_packaging_options(self)
            .into_iter()
            .find(|o| &o.packaging == packaging)
    }
}

/// Derive the ordered packaging options for a product.
///
/// The base option always comes first. Rows with a blank name, a missing or
/// non-positive factor, or `is_active == false` are skipped. Absent prices fall
/// back to the product's base price and cost.
pub fn resolve_packaging_options(product: &Product) -> Vec<PackagingOption> {
    let mut options = vec![product.base_option()];

    let mut explicit_default_taken = false;
    for row in product.packaging.iter().filter(|p| p.is_selectable()) {
        let is_default = row.is_default && !explicit_default_taken;
        explicit_default_taken |= is_default;

        options.push(PackagingOption {
            packaging: PackagingRef::Named(row.id.clone()),
            name: row.name.trim().to_string(),
            code: row.code.clone(),
            display_name: row.display_name.clone(),
            display_code: row.display_code.clone(),
            factor: row.factor.unwrap_or(Decimal::ONE),
            sale_price: row.sale_price.or(product.price),
            cost_price: row.cost_price.or(product.cost_price),
            is_default,
        });
    }

    if explicit_default_taken {
        options[0].is_default = false;
    }

    options
}

/// The product's default packaging option. Never fails: falls back to the
/// base option.
pub fn resolve_default_packaging(product: &Product) -> PackagingOption {
    let mut options = resolve_packaging_options(product);
    match options.iter().position(|o| o.is_default) {
        Some(i) => options.swap_remove(i),
        None => options.swap_remove(0),
    }
}
