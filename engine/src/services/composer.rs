//! Line-item composer: the ordered item list of a document being edited,
//! plus the bulk-selection set and the active input row.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use shared::{
    parse_amount_or_zero, DiscountType, DocumentMode, LineItem, LineItemId, PackagingOption,
    PackagingRef, Product,
};

use super::catalog::Catalog;

/// A single field change on a line item
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemEdit {
    /// Quantity in packaging units; negatives clamp to zero
    Quantity(Decimal),
    /// Switch packaging, keeping the packaging quantity
    Packaging(PackagingRef),
    UnitPrice(Decimal),
    DiscountValue(Decimal),
    DiscountType(DiscountType),
    Description(String),
}

impl LineItemEdit {
    /// Coerce a raw UI input into an edit. Unparsable numbers become zero;
    /// unknown fields yield `None`.
    pub fn from_input(field: &str, value: &str) -> Option<Self> {
        let edit = match field {
            "quantity" | "qtyPack" => LineItemEdit::Quantity(parse_amount_or_zero(value)),
            "packagingId" => {
                let id = value.trim();
                if id.is_empty() {
                    LineItemEdit::Packaging(PackagingRef::Base)
                } else {
                    LineItemEdit::Packaging(PackagingRef::Named(id.to_string()))
                }
            }
            "unitPrice" | "price" => LineItemEdit::UnitPrice(parse_amount_or_zero(value)),
            "discountValue" | "discount" => {
                LineItemEdit::DiscountValue(parse_amount_or_zero(value))
            }
            "discountType" => match value.trim().to_lowercase().as_str() {
                "percent" | "%" => LineItemEdit::DiscountType(DiscountType::Percent),
                _ => LineItemEdit::DiscountType(DiscountType::Fixed),
            },
            "description" => LineItemEdit::Description(value.to_string()),
            _ => return None,
        };
        Some(edit)
    }
}

/// Ordered line items with selection state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemComposer {
    items: Vec<LineItem>,
    selected: BTreeSet<LineItemId>,
    active: Option<LineItemId>,
}

impl LineItemComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<LineItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Row whose quantity input should hold focus
    pub fn active(&self) -> Option<LineItemId> {
        self.active
    }

    pub fn selected(&self) -> &BTreeSet<LineItemId> {
        &self.selected
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Swap in a whole new item list, as on document load or reset
    pub fn replace_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.selected.clear();
        self.active = None;
    }

    /// Append one unit of `option` and make it the active row
    pub fn add(
        &mut self,
        product: &Product,
        option: &PackagingOption,
        mode: DocumentMode,
    ) -> LineItemId {
        let item = LineItem::new(product, option, mode);
        let id = item.id;

        tracing::debug!(
            "Adding line {} for product {} ({}, factor {})",
            id,
            product.id,
            option.name,
            option.factor
        );

        self.items.push(item);
        self.active = Some(id);
        id
    }

    /// Apply one field change. Returns false when the row is unknown or a
    /// packaging change cannot be resolved against the catalog.
    pub fn update(
        &mut self,
        id: LineItemId,
        edit: LineItemEdit,
        catalog: &Catalog,
        mode: DocumentMode,
    ) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };

        match edit {
            LineItemEdit::Quantity(quantity) => item.set_quantity(quantity),
            LineItemEdit::Packaging(packaging) => {
                let Some(option) = catalog.option(&item.product_id, &packaging) else {
                    tracing::warn!(
                        "Packaging {} is not available for product {}",
                        packaging,
                        item.product_id
                    );
                    return false;
                };
                item.apply_packaging(&option, mode);
            }
            LineItemEdit::UnitPrice(price) => item.unit_price = price,
            LineItemEdit::DiscountValue(value) => item.discount_value = value,
            LineItemEdit::DiscountType(kind) => item.discount_type = kind,
            LineItemEdit::Description(text) => item.description = text,
        }

        tracing::debug!("Updated line {}", id);
        true
    }

    pub fn remove(&mut self, id: LineItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.selected.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        before != self.items.len()
    }

    /// Move `drag` into the position `drop` held before the move.
    /// No-op when either id is unknown or both are the same.
    pub fn reorder(&mut self, drag: LineItemId, drop: LineItemId) -> bool {
        if drag == drop {
            return false;
        }
        let from = self.items.iter().position(|i| i.id == drag);
        let to = self.items.iter().position(|i| i.id == drop);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Mark or unmark a row for bulk actions. Unknown ids are ignored.
    pub fn set_selected(&mut self, id: LineItemId, selected: bool) -> bool {
        if selected {
            if self.item(id).is_none() {
                return false;
            }
            self.selected.insert(id)
        } else {
            self.selected.remove(&id)
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.items.iter().map(|i| i.id).collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Remove every selected row; returns how many went
    pub fn delete_selected(&mut self) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let before = self.items.len();
        let selected = std::mem::take(&mut self.selected);
        self.items.retain(|i| !selected.contains(&i.id));
        if self.active.is_some_and(|a| selected.contains(&a)) {
            self.active = None;
        }
        before - self.items.len()
    }
}
