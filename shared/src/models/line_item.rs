//! Document line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PackagingOption, PackagingRef, Product};
use crate::types::{DiscountType, DocumentMode};

/// Session-scoped line item identifier
pub type LineItemId = Uuid;

/// One row of a purchase or sales document.
///
/// Only canonical fields are stored; base quantity and amounts are derived
/// on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    pub packaging: PackagingRef,
    pub packaging_name: String,
    /// Factor copied at selection time; not refreshed if the catalog changes
    pub pack_factor: Decimal,
    /// Quantity in packaging units
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
}

impl LineItem {
    /// Build a fresh line for one unit of `option`, priced for `mode`.
    /// A missing price becomes zero.
    pub fn new(product: &Product, option: &PackagingOption, mode: DocumentMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product.id.clone(),
            product_code: product.product_code.clone(),
            product_name: product.name.clone(),
            description: String::new(),
            packaging: option.packaging.clone(),
            packaging_name: option.name.clone(),
            pack_factor: option.factor,
            quantity: Decimal::ONE,
            unit: option.name.clone(),
            unit_price: option.price_for(mode).unwrap_or(Decimal::ZERO),
            discount_value: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
        }
    }

    /// Quantity in base units. Zero when the product is not representable.
    pub fn qty_base(&self) -> Decimal {
        self.quantity
            .checked_mul(self.pack_factor)
            .unwrap_or(Decimal::ZERO)
    }

    /// Zero when the product is not representable
    pub fn gross_amount(&self) -> Decimal {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn discount_amount(&self) -> Decimal {
        match self.discount_type {
            DiscountType::Percent => self
                .gross_amount()
                .checked_mul(self.discount_value)
                .and_then(|d| d.checked_div(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO),
            DiscountType::Fixed => self.discount_value,
        }
    }

    /// Gross less discount. Not clamped: large discounts give a negative net.
    pub fn net_amount(&self) -> Decimal {
        self.gross_amount()
            .checked_sub(self.discount_amount())
            .unwrap_or(Decimal::ZERO)
    }

    /// Set quantity in packaging units, clamping negatives to zero
    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity.max(Decimal::ZERO);
    }

    /// Switch to another packaging of the same product, keeping the packaging
    /// quantity. The price only changes when the new option has one.
    pub fn apply_packaging(&mut self, option: &PackagingOption, mode: DocumentMode) {
        self.packaging = option.packaging.clone();
        self.packaging_name = option.name.clone();
        self.unit = option.name.clone();
        self.pack_factor = option.factor;
        if let Some(price) = option.price_for(mode) {
            self.unit_price = price;
        }
    }

    /// Clone with a new session id
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// Line with its derived figures, for export
    pub fn view(&self) -> LineItemView {
        LineItemView {
            item: self.clone(),
            qty_base: self.qty_base(),
            gross_amount: self.gross_amount(),
            discount_amount: self.discount_amount(),
            net_amount: self.net_amount(),
        }
    }
}

/// A line item together with its computed amounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    #[serde(flatten)]
    pub item: LineItem,
    pub qty_base: Decimal,
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub net_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{resolve_packaging_options, Packaging};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn filter_product() -> Product {
        Product {
            id: "p1".to_string(),
            name: "Oil Filter".to_string(),
            product_code: "OF-100".to_string(),
            unit: "Piece".to_string(),
            price: Some(dec("100")),
            cost_price: Some(dec("80")),
            stock: Decimal::ZERO,
            reorder_point: Decimal::ZERO,
            brand: None,
            category: None,
            barcode: None,
            packaging: vec![Packaging {
                id: "box".to_string(),
                name: "Box".to_string(),
                code: None,
                display_name: None,
                display_code: None,
                factor: Some(dec("12")),
                sale_price: Some(dec("1100")),
                cost_price: Some(dec("900")),
                is_default: false,
                is_active: true,
            }],
        }
    }

    #[test]
    fn test_new_line_from_box_in_sales_mode() {
        let product = filter_product();
        let options = resolve_packaging_options(&product);
        let line = LineItem::new(&product, &options[1], DocumentMode::Sales);

        assert_eq!(line.unit_price, dec("1100"));
        assert_eq!(line.pack_factor, dec("12"));
        assert_eq!(line.quantity, Decimal::ONE);
        assert_eq!(line.qty_base(), dec("12"));
        assert_eq!(line.unit, "Box");
    }

    #[test]
    fn test_new_line_without_price_defaults_to_zero() {
        let mut product = filter_product();
        product.cost_price = None;
        let base = product.base_option();
        let line = LineItem::new(&product, &base, DocumentMode::Purchase);
        assert_eq!(line.unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_percent_discount_net() {
        let product = filter_product();
        let mut line = LineItem::new(&product, &product.base_option(), DocumentMode::Sales);
        line.unit_price = dec("50");
        line.set_quantity(dec("4"));
        line.discount_type = DiscountType::Percent;
        line.discount_value = dec("10");

        assert_eq!(line.gross_amount(), dec("200"));
        assert_eq!(line.discount_amount(), dec("20"));
        assert_eq!(line.net_amount(), dec("180"));
    }

    #[test]
    fn test_oversized_discount_goes_negative() {
        let product = filter_product();
        let mut line = LineItem::new(&product, &product.base_option(), DocumentMode::Sales);
        line.discount_type = DiscountType::Percent;
        line.discount_value = dec("150");
        assert_eq!(line.net_amount(), dec("-50"));

        line.discount_type = DiscountType::Fixed;
        line.discount_value = dec("250");
        assert_eq!(line.net_amount(), dec("-150"));
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let product = filter_product();
        let mut line = LineItem::new(&product, &product.base_option(), DocumentMode::Sales);
        line.set_quantity(dec("-3"));
        assert_eq!(line.quantity, Decimal::ZERO);
        assert_eq!(line.qty_base(), Decimal::ZERO);
    }

    #[test]
    fn test_apply_packaging_keeps_pack_quantity() {
        let product = filter_product();
        let options = resolve_packaging_options(&product);
        let mut line = LineItem::new(&product, &options[0], DocumentMode::Purchase);
        line.set_quantity(dec("3"));

        line.apply_packaging(&options[1], DocumentMode::Purchase);
        assert_eq!(line.quantity, dec("3"));
        assert_eq!(line.qty_base(), dec("36"));
        assert_eq!(line.unit_price, dec("900"));
        assert_eq!(line.packaging_name, "Box");
    }

    #[test]
    fn test_apply_packaging_without_price_keeps_price() {
        let mut product = filter_product();
        product.price = None;
        product.packaging[0].sale_price = None;
        let options = resolve_packaging_options(&product);

        let mut line = LineItem::new(&product, &options[0], DocumentMode::Sales);
        line.unit_price = dec("77");
        line.apply_packaging(&options[1], DocumentMode::Sales);
        assert_eq!(line.unit_price, dec("77"));
        assert_eq!(line.pack_factor, dec("12"));
    }

    #[test]
    fn test_view_serializes_derived_fields() {
        let product = filter_product();
        let line = LineItem::new(&product, &product.base_option(), DocumentMode::Sales);
        let json = serde_json::to_value(line.view()).unwrap();
        assert_eq!(json["productId"], "p1");
        assert!(json.get("qtyBase").is_some());
        assert!(json.get("netAmount").is_some());
    }

    #[test]
    fn test_unrepresentable_amounts_fall_back_to_zero() {
        let product = filter_product();
        let mut line = LineItem::new(&product, &product.base_option(), DocumentMode::Sales);
        line.unit_price = dec("5200");
        line.pack_factor = dec("1000");
        line.set_quantity(dec("99999999999999999999999999"));

        assert_eq!(line.gross_amount(), Decimal::ZERO);
        assert_eq!(line.qty_base(), Decimal::ZERO);
        assert_eq!(line.net_amount(), Decimal::ZERO);

        line.set_quantity(dec("1000000000000"));
        line.unit_price = dec("1000000000000");
        line.discount_type = DiscountType::Percent;
        line.discount_value = dec("99999999999999");
        assert_eq!(line.gross_amount(), dec("1000000000000000000000000"));
        assert_eq!(line.discount_amount(), Decimal::ZERO);

        line.discount_type = DiscountType::Fixed;
        line.discount_value = Decimal::MIN;
        line.unit_price = Decimal::MAX;
        line.set_quantity(Decimal::ONE);
        assert_eq!(line.net_amount(), Decimal::ZERO);
        let _ = line.view();
    }
}
