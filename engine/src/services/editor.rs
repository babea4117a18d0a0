//! Document editing session
//!
//! Ties a document header to its line-item composer and enforces the
//! lifecycle guard on every mutation, so a locked document cannot change no
//! matter which caller drives it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{
    is_linked_reference, next_document_id, parse_amount_or_zero, parse_display_date,
    validate_document_id, validate_for_save, validate_overall_discount, Document, DocumentHeader,
    DocumentKind, DocumentMode, DocumentSnapshot, DocumentStatus, LineItem, LineItemId,
    PackagingRef, PaymentStatus, Totals,
};

use super::catalog::{Catalog, SearchRow};
use super::composer::{LineItemComposer, LineItemEdit};
use super::lifecycle::{self, DocumentAction, SaveAction};
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::store::{DocumentStore, SaveRequest};

/// A header field change
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderEdit {
    Party(Option<String>),
    Date(NaiveDate),
    DueDate(NaiveDate),
    Reference(String),
    VehicleNumber(String),
    Notes(String),
    /// Negative amounts clamp to zero
    OverallDiscount(Decimal),
}

impl HeaderEdit {
    /// Coerce a raw UI input into a header edit. Blank party clears it;
    /// unknown fields yield `None`.
    pub fn from_input(field: &str, value: &str) -> Option<Self> {
        let edit = match field {
            "partyId" => {
                let party = value.trim();
                HeaderEdit::Party((!party.is_empty()).then(|| party.to_string()))
            }
            "reference" => HeaderEdit::Reference(value.trim().to_string()),
            "vehicleNumber" => HeaderEdit::VehicleNumber(value.trim().to_string()),
            "notes" => HeaderEdit::Notes(value.to_string()),
            "overallDiscount" => HeaderEdit::OverallDiscount(parse_amount_or_zero(value)),
            _ => return None,
        };
        Some(edit)
    }
}

/// Header dates editable as `DD/MM/YYYY` text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Date,
    DueDate,
}

/// One editing session over one document
#[derive(Debug, Clone)]
pub struct DocumentEditor {
    header: DocumentHeader,
    composer: LineItemComposer,
    revising: bool,
    /// State to restore if a revision is abandoned
    revision_base: Option<Document>,
    price_updates: BTreeMap<String, Decimal>,
    catalog: Arc<Catalog>,
    config: Arc<Config>,
}

impl DocumentEditor {
    /// Start a blank draft with the next free id for `kind`
    pub fn create<S>(
        kind: DocumentKind,
        store: &S,
        catalog: Arc<Catalog>,
        config: Arc<Config>,
        today: NaiveDate,
    ) -> EngineResult<Self>
    where
        S: DocumentStore + ?Sized,
    {
        let id = allocate_id(store, kind)?;
        tracing::info!("Creating {} {}", kind, id);
        let document = Document {
            header: DocumentHeader::new(kind, id, today),
            items: Vec::new(),
        };
        Ok(Self::open(document, catalog, config))
    }

    /// Load an existing document, replacing any item state wholesale
    pub fn open(document: Document, catalog: Arc<Catalog>, config: Arc<Config>) -> Self {
        let header = &document.header;
        if let Err(e) = validate_document_id(&header.id, header.kind.prefix()) {
            tracing::warn!("Opening {} as {}: {}", header.id, header.kind, e);
        }
        Self {
            header: document.header,
            composer: LineItemComposer::with_items(document.items),
            revising: false,
            revision_base: None,
            price_updates: BTreeMap::new(),
            catalog,
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn items(&self) -> &[LineItem] {
        self.composer.items()
    }

    pub fn composer(&self) -> &LineItemComposer {
        &self.composer
    }

    pub fn status(&self) -> DocumentStatus {
        self.header.status
    }

    pub fn mode(&self) -> DocumentMode {
        self.header.mode()
    }

    pub fn is_revising(&self) -> bool {
        self.revising
    }

    pub fn is_locked(&self) -> bool {
        lifecycle::is_locked(self.header.status, self.revising)
    }

    /// Whether another document controls this one's lifecycle
    pub fn is_linked(&self) -> bool {
        is_linked_reference(
            &self.header.reference,
            self.config.documents.linked_reference_prefixes.as_slice(),
        )
    }

    pub fn price_updates(&self) -> &BTreeMap<String, Decimal> {
        &self.price_updates
    }

    pub fn totals(&self) -> Totals {
        shared::calculate_totals(self.composer.items(), self.header.overall_discount)
    }

    pub fn document(&self) -> Document {
        Document {
            header: self.header.clone(),
            items: self.composer.items().to_vec(),
        }
    }

    /// `(header, items, totals)` for print and export
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.document().snapshot()
    }

    pub fn available_actions(&self) -> Vec<DocumentAction> {
        lifecycle::available_actions(
            self.header.status,
            self.revising,
            self.is_linked(),
            self.header.kind,
        )
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Swap in a freshly loaded catalog. Existing lines keep their copied
    /// factors and prices.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
    }

    pub fn search(&self, query: &str) -> Vec<&SearchRow> {
        self.catalog.search(query, self.config.search.result_limit)
    }

    // ------------------------------------------------------------------------
    // Line items
    // ------------------------------------------------------------------------

    fn ensure_editable(&self) -> EngineResult<()> {
        if self.is_locked() {
            tracing::warn!(
                "Refusing to modify {} while {}",
                self.header.id,
                self.header.status
            );
            return Err(EngineError::DocumentLocked {
                status: self.header.status.to_string(),
            });
        }
        Ok(())
    }

    /// Add the packaging picked from a search result
    pub fn add_item(&mut self, row: &SearchRow) -> EngineResult<LineItemId> {
        self.ensure_editable()?;
        let product = self
            .catalog
            .product(&row.product_id)
            .ok_or_else(|| EngineError::NotFound(format!("Product {}", row.product_id)))?;
        Ok(self.composer.add(product, &row.option, self.header.mode()))
    }

    /// Add a product by id, at `packaging` or its default packaging
    pub fn add_product(
        &mut self,
        product_id: &str,
        packaging: Option<&PackagingRef>,
    ) -> EngineResult<LineItemId> {
        self.ensure_editable()?;
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| EngineError::NotFound(format!("Product {}", product_id)))?;

        let option = match packaging {
            Some(packaging) => product.find_option(packaging).ok_or_else(|| {
                EngineError::NotFound(format!("Packaging {} of product {}", packaging, product_id))
            })?,
            None => shared::resolve_default_packaging(product),
        };

        Ok(self.composer.add(product, &option, self.header.mode()))
    }

    /// Apply a field change to one line. `Ok(false)` means the change could
    /// not be resolved and nothing moved.
    pub fn update_item(&mut self, id: LineItemId, edit: LineItemEdit) -> EngineResult<bool> {
        self.ensure_editable()?;
        if self.composer.item(id).is_none() {
            return Err(EngineError::NotFound(format!("Line item {}", id)));
        }
        let mode = self.header.mode();
        Ok(self.composer.update(id, edit, &self.catalog, mode))
    }

    /// Apply raw UI input to one line, coercing unparsable numbers to zero
    pub fn update_item_input(
        &mut self,
        id: LineItemId,
        field: &str,
        value: &str,
    ) -> EngineResult<bool> {
        let edit = LineItemEdit::from_input(field, value).ok_or_else(|| EngineError::Validation {
            field: field.to_string(),
            message: format!("Unknown line item field: {}", field),
        })?;
        self.update_item(id, edit)
    }

    pub fn remove_item(&mut self, id: LineItemId) -> EngineResult<bool> {
        self.ensure_editable()?;
        Ok(self.composer.remove(id))
    }

    pub fn reorder_items(&mut self, drag: LineItemId, drop: LineItemId) -> EngineResult<bool> {
        self.ensure_editable()?;
        Ok(self.composer.reorder(drag, drop))
    }

    pub fn set_selected(&mut self, id: LineItemId, selected: bool) -> EngineResult<bool> {
        self.ensure_editable()?;
        Ok(self.composer.set_selected(id, selected))
    }

    pub fn select_all(&mut self) -> EngineResult<()> {
        self.ensure_editable()?;
        self.composer.select_all();
        Ok(())
    }

    pub fn select_none(&mut self) -> EngineResult<()> {
        self.ensure_editable()?;
        self.composer.select_none();
        Ok(())
    }

    pub fn delete_selected(&mut self) -> EngineResult<usize> {
        self.ensure_editable()?;
        let removed = self.composer.delete_selected();
        tracing::debug!("Deleted {} selected lines from {}", removed, self.header.id);
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------------

    pub fn update_header(&mut self, edit: HeaderEdit) -> EngineResult<()> {
        self.ensure_editable()?;
        match edit {
            HeaderEdit::Party(party) => self.header.party_id = party,
            HeaderEdit::Date(date) => self.header.date = date,
            HeaderEdit::DueDate(date) => self.header.due_date = date,
            HeaderEdit::Reference(reference) => {
                if self.is_linked() && reference != self.header.reference {
                    tracing::warn!(
                        "Reference of {} is controlled by {}",
                        self.header.id,
                        self.header.reference
                    );
                    return Err(EngineError::LinkedDocument(format!(
                        "Reference is controlled by {}",
                        self.header.reference
                    )));
                }
                self.header.reference = reference;
            }
            HeaderEdit::VehicleNumber(number) => self.header.vehicle_number = number,
            HeaderEdit::Notes(notes) => self.header.notes = notes,
            HeaderEdit::OverallDiscount(discount) => {
                self.header.overall_discount = match validate_overall_discount(discount) {
                    Ok(()) => discount,
                    Err(e) => {
                        tracing::debug!("{}, using zero", e);
                        Decimal::ZERO
                    }
                }
            }
        }
        Ok(())
    }

    /// Set a header date from `DD/MM/YYYY` text. Text that does not parse to
    /// a real calendar date leaves the date untouched and returns false.
    pub fn set_date_text(&mut self, field: DateField, text: &str) -> EngineResult<bool> {
        self.ensure_editable()?;
        let Some(date) = parse_display_date(text) else {
            tracing::debug!("Ignoring unparsable date input {:?}", text);
            return Ok(false);
        };
        match field {
            DateField::Date => self.header.date = date,
            DateField::DueDate => self.header.due_date = date,
        }
        Ok(true)
    }

    /// Record a proposed new sale price for a product, passed to the store on
    /// save. Only purchase documents collect these.
    pub fn propose_sale_price(&mut self, product_id: &str, price: Decimal) -> EngineResult<bool> {
        self.ensure_editable()?;
        if self.header.mode() != DocumentMode::Purchase {
            tracing::warn!(
                "Ignoring sale price proposal on {} document {}",
                self.header.mode(),
                self.header.id
            );
            return Ok(false);
        }
        if self.catalog.product(product_id).is_none() {
            return Err(EngineError::NotFound(format!("Product {}", product_id)));
        }
        self.price_updates.insert(product_id.to_string(), price);
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Run the save gate without saving
    pub fn validate(&self) -> EngineResult<()> {
        validate_for_save(&self.header, self.composer.items())?;
        Ok(())
    }

    fn persist<S>(
        &self,
        store: &mut S,
        status: DocumentStatus,
        stay_on_page: bool,
    ) -> EngineResult<()>
    where
        S: DocumentStore + ?Sized,
    {
        let mut document = self.document();
        document.header.status = status;

        let price_updates = match self.header.mode() {
            DocumentMode::Purchase => self.price_updates.clone(),
            DocumentMode::Sales => BTreeMap::new(),
        };

        let request = SaveRequest {
            totals: document.totals(),
            document,
            stay_on_page,
            price_updates,
        };
        store.save(&request)
    }

    /// Validate, hand the document to the store, then commit the new status.
    /// Nothing changes here if validation or the store fails.
    pub fn save<S>(
        &mut self,
        store: &mut S,
        action: SaveAction,
        stay_on_page: bool,
    ) -> EngineResult<DocumentStatus>
    where
        S: DocumentStore + ?Sized,
    {
        let target = lifecycle::save_target(self.header.status, self.revising, action)?;

        if let Err(err) = validate_for_save(&self.header, self.composer.items()) {
            tracing::warn!("Save of {} blocked on {}: {}", self.header.id, err.field, err);
            return Err(err.into());
        }

        self.persist(store, target, stay_on_page)?;

        tracing::info!(
            "Saved {} ({} -> {})",
            self.header.id,
            self.header.status,
            target
        );

        self.header.status = target;
        if action == SaveAction::SaveRevision {
            self.revising = false;
            self.revision_base = None;
        }
        self.price_updates.clear();
        Ok(target)
    }

    /// Re-open an approved document for editing
    pub fn begin_revision(&mut self) -> EngineResult<()> {
        if !lifecycle::can_revise(self.header.status, self.revising) {
            return Err(EngineError::InvalidStateTransition(format!(
                "Cannot revise a {} document",
                self.header.status.to_string().to_lowercase()
            )));
        }
        tracing::info!("Revising {}", self.header.id);
        self.revision_base = Some(self.document());
        self.revising = true;
        Ok(())
    }

    /// Abandon a revision, restoring the approved state
    pub fn cancel_revision(&mut self) -> EngineResult<()> {
        if !self.revising {
            return Err(EngineError::InvalidStateTransition(
                "No revision in progress".to_string(),
            ));
        }
        if let Some(base) = self.revision_base.take() {
            self.header = base.header;
            self.composer.replace_items(base.items);
        }
        self.revising = false;
        self.price_updates.clear();
        tracing::info!("Revision of {} cancelled", self.header.id);
        Ok(())
    }

    /// Void a pending or approved document. Linked documents are refused.
    pub fn void<S>(&mut self, store: &mut S) -> EngineResult<()>
    where
        S: DocumentStore + ?Sized,
    {
        let target = lifecycle::void_target(self.header.status, self.is_linked()).map_err(|e| {
            tracing::warn!("Void of {} refused: {}", self.header.id, e);
            e
        })?;

        // A revision in progress is discarded, not saved
        let mut base = self.clone();
        if base.revising {
            base.cancel_revision()?;
        }
        base.persist(store, target, true)?;

        tracing::info!("Voided {}", self.header.id);
        *self = base;
        self.header.status = target;
        Ok(())
    }

    /// Soft-delete a draft or pending document
    pub fn delete<S>(&mut self, store: &mut S) -> EngineResult<()>
    where
        S: DocumentStore + ?Sized,
    {
        let target = lifecycle::delete_target(self.header.status, self.is_linked())?;
        self.persist(store, target, false)?;
        tracing::info!("Deleted {}", self.header.id);
        self.header.status = target;
        Ok(())
    }

    /// A new draft duplicating this document under a fresh id. The reference
    /// is cleared, so the copy is never linked.
    pub fn copy_as_draft<S>(&self, store: &S, today: NaiveDate) -> EngineResult<Document>
    where
        S: DocumentStore + ?Sized,
    {
        if !lifecycle::can_copy(self.header.status) {
            return Err(EngineError::InvalidStateTransition(format!(
                "Cannot copy a {} document",
                self.header.status.to_string().to_lowercase()
            )));
        }

        let id = allocate_id(store, self.header.kind)?;
        tracing::info!("Copying {} to {}", self.header.id, id);

        let header = DocumentHeader {
            id,
            date: today,
            due_date: today,
            reference: String::new(),
            status: DocumentStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
            ..self.header.clone()
        };

        Ok(Document {
            header,
            items: self.composer.items().iter().map(LineItem::duplicate).collect(),
        })
    }

    /// The downstream draft for an approved document, e.g. an order's
    /// invoice. This document is left as it is.
    pub fn convert<S>(&self, store: &S, today: NaiveDate) -> EngineResult<Document>
    where
        S: DocumentStore + ?Sized,
    {
        let kind = self.header.kind;
        let target = kind
            .conversion_target()
            .filter(|_| lifecycle::can_convert(self.header.status, self.revising, kind))
            .ok_or_else(|| {
                EngineError::InvalidStateTransition(format!(
                    "Cannot convert a {} {}",
                    self.header.status.to_string().to_lowercase(),
                    kind
                ))
            })?;

        let id = allocate_id(store, target)?;
        tracing::info!("Converting {} into {} {}", self.header.id, target, id);

        let mut header = DocumentHeader::new(target, id, today);
        header.party_id = self.header.party_id.clone();
        header.reference = self.header.id.clone();
        header.vehicle_number = self.header.vehicle_number.clone();
        header.notes = self.header.notes.clone();
        header.overall_discount = self.header.overall_discount;

        Ok(Document {
            header,
            items: self.composer.items().iter().map(LineItem::duplicate).collect(),
        })
    }
}

fn allocate_id<S>(store: &S, kind: DocumentKind) -> EngineResult<String>
where
    S: DocumentStore + ?Sized,
{
    let existing = store.document_ids(kind.prefix())?;
    Ok(next_document_id(
        kind.prefix(),
        existing.iter().map(String::as_str),
    ))
}
