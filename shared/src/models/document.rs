//! Purchase and sales document models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{calculate_totals, LineItem, LineItemView, Totals};
use crate::types::{DocumentMode, PaymentStatus};

/// Kinds of documents composed from line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PurchaseOrder,
    PurchaseInvoice,
    SalesOrder,
    SalesInvoice,
}

impl DocumentKind {
    /// Id prefix, e.g. `PO` in `PO-000001`
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::PurchaseInvoice => "PI",
            DocumentKind::SalesOrder => "SO",
            DocumentKind::SalesInvoice => "SI",
        }
    }

    pub fn mode(&self) -> DocumentMode {
        match self {
            DocumentKind::PurchaseOrder | DocumentKind::PurchaseInvoice => DocumentMode::Purchase,
            DocumentKind::SalesOrder | DocumentKind::SalesInvoice => DocumentMode::Sales,
        }
    }

    /// Downstream document an approved document of this kind converts into
    pub fn conversion_target(&self) -> Option<DocumentKind> {
        match self {
            DocumentKind::PurchaseOrder => Some(DocumentKind::PurchaseInvoice),
            DocumentKind::SalesOrder => Some(DocumentKind::SalesInvoice),
            DocumentKind::PurchaseInvoice | DocumentKind::SalesInvoice => None,
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "PO" => Some(DocumentKind::PurchaseOrder),
            "PI" => Some(DocumentKind::PurchaseInvoice),
            "SO" => Some(DocumentKind::SalesOrder),
            "SI" => Some(DocumentKind::SalesInvoice),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::PurchaseOrder => write!(f, "Purchase Order"),
            DocumentKind::PurchaseInvoice => write!(f, "Purchase Invoice"),
            DocumentKind::SalesOrder => write!(f, "Sales Order"),
            DocumentKind::SalesInvoice => write!(f, "Sales Invoice"),
        }
    }
}

/// Document status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Void,
    Deleted,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Draft => write!(f, "Draft"),
            DocumentStatus::Pending => write!(f, "Pending"),
            DocumentStatus::Approved => write!(f, "Approved"),
            DocumentStatus::Void => write!(f, "Void"),
            DocumentStatus::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Document header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    /// `<PREFIX>-NNNNNN`
    pub id: String,
    pub kind: DocumentKind,
    /// Customer or vendor reference
    #[serde(default)]
    pub party_id: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub overall_discount: Decimal,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl DocumentHeader {
    /// A blank draft dated `today`
    pub fn new(kind: DocumentKind, id: String, today: NaiveDate) -> Self {
        Self {
            id,
            kind,
            party_id: None,
            date: today,
            due_date: today,
            reference: String::new(),
            vehicle_number: String::new(),
            notes: String::new(),
            overall_discount: Decimal::ZERO,
            status: DocumentStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    pub fn mode(&self) -> DocumentMode {
        self.kind.mode()
    }
}

/// A header with its ordered line items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub header: DocumentHeader,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Document {
    pub fn totals(&self) -> Totals {
        calculate_totals(&self.items, self.header.overall_discount)
    }

    /// The `(header, items, totals)` tuple handed to print and export
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            header: self.header.clone(),
            items: self.items.iter().map(LineItem::view).collect(),
            totals: self.totals(),
        }
    }
}

/// Fully derived document for print/export collaborators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub header: DocumentHeader,
    pub items: Vec<LineItemView>,
    pub totals: Totals,
}

/// Width of the zero-padded sequence in a document id
pub const DOCUMENT_SEQUENCE_WIDTH: usize = 6;

/// Format a document id, e.g. `PO-000001`
pub fn format_document_id(prefix: &str, sequence: u128) -> String {
    format!("{}-{:0width$}", prefix, sequence, width = DOCUMENT_SEQUENCE_WIDTH)
}

/// Sequence number of `id` if it is exactly `<prefix>-<digits>`
pub fn document_sequence(id: &str, prefix: &str) -> Option<u128> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Next id for `prefix`: one past the highest matching existing id.
/// Saturates at the largest sequence.
pub fn next_document_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| document_sequence(id, prefix))
        .max()
        .unwrap_or(0);
    format_document_id(prefix, max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_document_id_skips_gaps() {
        let ids = ["PO-000001", "PO-000003"];
        assert_eq!(next_document_id("PO", ids), "PO-000004");
    }

    #[test]
    fn test_next_document_id_first() {
        assert_eq!(next_document_id("SI", Vec::<&str>::new()), "SI-000001");
    }

    #[test]
    fn test_next_document_id_scoped_per_prefix() {
        let ids = ["PO-000009", "PI-000002", "PIX-000050", "PI-abc", "PI-"];
        assert_eq!(next_document_id("PI", ids), "PI-000003");
    }

    #[test]
    fn test_next_document_id_past_padding() {
        let ids = ["PO-999999"];
        assert_eq!(next_document_id("PO", ids), "PO-1000000");
    }

    #[test]
    fn test_next_document_id_at_sequence_limits() {
        let ids = ["PO-18446744073709551615"];
        assert_eq!(next_document_id("PO", ids), "PO-18446744073709551616");

        let top = format_document_id("PO", u128::MAX);
        assert_eq!(next_document_id("PO", [top.as_str()]), top);

        let beyond = format!("{}0", top);
        assert_eq!(document_sequence(&beyond, "PO"), None);
        assert_eq!(next_document_id("PO", [beyond.as_str()]), "PO-000001");
    }

    #[test]
    fn test_document_sequence() {
        assert_eq!(document_sequence("PO-000012", "PO"), Some(12));
        assert_eq!(document_sequence("PO000012", "PO"), None);
        assert_eq!(document_sequence("PO-12a", "PO"), None);
    }

    #[test]
    fn test_kind_mode_and_conversion() {
        assert_eq!(DocumentKind::PurchaseOrder.mode(), DocumentMode::Purchase);
        assert_eq!(DocumentKind::SalesInvoice.mode(), DocumentMode::Sales);
        assert_eq!(
            DocumentKind::PurchaseOrder.conversion_target(),
            Some(DocumentKind::PurchaseInvoice)
        );
        assert_eq!(DocumentKind::PurchaseInvoice.conversion_target(), None);
        assert_eq!(DocumentKind::from_prefix("SO"), Some(DocumentKind::SalesOrder));
    }

    #[test]
    fn test_new_header_is_unpaid_draft() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let header = DocumentHeader::new(DocumentKind::SalesOrder, "SO-000001".into(), today);
        assert_eq!(header.status, DocumentStatus::Draft);
        assert_eq!(header.payment_status, PaymentStatus::Unpaid);
        assert_eq!(header.due_date, today);
    }

    #[test]
    fn test_header_dates_serialize_iso() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let header = DocumentHeader::new(DocumentKind::PurchaseOrder, "PO-000001".into(), today);
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["status"], "draft");
    }
}
