//! Validation utilities for documents and catalog data

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{document_sequence, DocumentHeader, LineItem};
use crate::types::DocumentMode;

/// A save attempt blocked by the validation gate. `field` names the first
/// offending input so the UI can focus it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SaveValidationError {
    pub field: String,
    pub message: String,
}

impl SaveValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Document Validations
// ============================================================================

/// Field path for a line item's quantity input
pub fn quantity_field(item: &LineItem) -> String {
    format!("items.{}.quantity", item.id)
}

/// Gate run before any save transition.
///
/// Checks in order: a party is selected, at least one line exists, and every
/// line has a positive quantity. Stops at the first failure.
pub fn validate_for_save(
    header: &DocumentHeader,
    items: &[LineItem],
) -> Result<(), SaveValidationError> {
    let has_party = header
        .party_id
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());

    if !has_party {
        let message = match header.mode() {
            DocumentMode::Purchase => "Please select a vendor",
            DocumentMode::Sales => "Please select a customer",
        };
        return Err(SaveValidationError::new("partyId", message));
    }

    if items.is_empty() {
        return Err(SaveValidationError::new(
            "items",
            "Please add at least one product",
        ));
    }

    if let Some(item) = items.iter().find(|i| i.quantity <= Decimal::ZERO) {
        return Err(SaveValidationError::new(
            quantity_field(item),
            format!("Quantity for {} must be greater than zero", item.product_name),
        ));
    }

    Ok(())
}

/// A document is linked when its reference is another document's id under
/// one of `linked_prefixes`, e.g. `PI-000123`
pub fn is_linked_reference<S: AsRef<str>>(reference: &str, linked_prefixes: &[S]) -> bool {
    let reference = reference.trim();
    linked_prefixes
        .iter()
        .any(|p| document_sequence(reference, p.as_ref()).is_some())
}

/// Validate a document id against its expected prefix
pub fn validate_document_id(id: &str, prefix: &str) -> Result<(), &'static str> {
    if document_sequence(id, prefix).is_none() {
        return Err("Document id must be in format <PREFIX>-NNNNNN");
    }
    Ok(())
}

/// Validate the overall discount on a document header
pub fn validate_overall_discount(discount: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO {
        return Err("Overall discount cannot be negative");
    }
    Ok(())
}

/// Validate a packaging conversion factor
pub fn validate_pack_factor(factor: Decimal) -> Result<(), &'static str> {
    if factor <= Decimal::ZERO {
        return Err("Packaging factor must be greater than zero");
    }
    Ok(())
}
