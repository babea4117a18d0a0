//! Stateful editing session for the browser
//!
//! The host owns persistence. Saves are queued here and drained with
//! [`EditorHandle::take_saves`]; ids already issued are supplied up front so
//! new documents get the next free number.

use std::sync::Arc;

use engine::{
    Config, DateField, DocumentEditor, DocumentStore, EngineError, EngineResult, ErrorDetail,
    HeaderEdit, SaveAction, SaveRequest,
};
use shared::{Document, DocumentKind, LineItemId, PackagingRef, Product};
use wasm_bindgen::prelude::*;

use crate::{from_json, to_js, to_json, today_or};

/// Store that records saves for the host to pick up
#[derive(Debug, Default)]
struct HostStore {
    ids: Vec<String>,
    saves: Vec<SaveRequest>,
}

impl DocumentStore for HostStore {
    fn document_ids(&self, prefix: &str) -> EngineResult<Vec<String>> {
        Ok(self
            .ids
            .iter()
            .filter(|id| shared::document_sequence(id, prefix).is_some())
            .cloned()
            .collect())
    }

    fn save(&mut self, request: &SaveRequest) -> EngineResult<()> {
        let id = &request.document.header.id;
        if !self.ids.contains(id) {
            self.ids.push(id.clone());
        }
        self.saves.push(request.clone());
        Ok(())
    }
}

fn parse_kind(prefix: &str) -> Result<DocumentKind, ErrorDetail> {
    DocumentKind::from_prefix(prefix).ok_or_else(|| {
        EngineError::Validation {
            field: "kind".to_string(),
            message: format!("Unknown document kind: {}", prefix),
        }
        .detail()
    })
}

fn parse_line_id(id: &str) -> Result<LineItemId, ErrorDetail> {
    id.parse()
        .map_err(|_| EngineError::NotFound(format!("Line item {}", id)).detail())
}

fn parse_date_field(field: &str) -> Result<DateField, ErrorDetail> {
    match field {
        "date" => Ok(DateField::Date),
        "dueDate" => Ok(DateField::DueDate),
        _ => Err(EngineError::Validation {
            field: field.to_string(),
            message: format!("Unknown date field: {}", field),
        }
        .detail()),
    }
}

fn packaging_ref(id: Option<String>) -> Option<PackagingRef> {
    id.map(|id| {
        if id.trim().is_empty() {
            PackagingRef::Base
        } else {
            PackagingRef::Named(id)
        }
    })
}

/// One document being edited in the browser
#[wasm_bindgen]
pub struct EditorHandle {
    editor: DocumentEditor,
    store: HostStore,
}

impl EditorHandle {
    fn build(
        products_json: &str,
        ids_json: &str,
        make: impl FnOnce(&HostStore, Arc<engine::Catalog>) -> Result<DocumentEditor, ErrorDetail>,
    ) -> Result<Self, ErrorDetail> {
        let products: Vec<Product> = from_json("products", products_json)?;
        let ids: Vec<String> = from_json("document ids", ids_json)?;
        let store = HostStore {
            ids,
            saves: Vec::new(),
        };
        let catalog = Arc::new(engine::Catalog::new(products));
        let editor = make(&store, catalog)?;
        Ok(Self { editor, store })
    }

    pub(crate) fn create_with(
        kind: &str,
        products_json: &str,
        ids_json: &str,
        today: Option<String>,
    ) -> Result<Self, ErrorDetail> {
        let kind = parse_kind(kind)?;
        let today = today_or(today)?;
        Self::build(products_json, ids_json, |store, catalog| {
            DocumentEditor::create(kind, store, catalog, Arc::new(Config::default()), today)
                .map_err(|e| e.detail())
        })
    }

    pub(crate) fn open_with(
        document_json: &str,
        products_json: &str,
        ids_json: &str,
    ) -> Result<Self, ErrorDetail> {
        let document: Document = from_json("document", document_json)?;
        Self::build(products_json, ids_json, |_, catalog| {
            Ok(DocumentEditor::open(
                document,
                catalog,
                Arc::new(Config::default()),
            ))
        })
    }

    pub(crate) fn add_with(
        &mut self,
        product_id: &str,
        packaging_id: Option<String>,
    ) -> Result<String, ErrorDetail> {
        let packaging = packaging_ref(packaging_id);
        self.editor
            .add_product(product_id, packaging.as_ref())
            .map(|id| id.to_string())
            .map_err(|e| e.detail())
    }

    pub(crate) fn update_with(
        &mut self,
        line_id: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, ErrorDetail> {
        let id = parse_line_id(line_id)?;
        self.editor
            .update_item_input(id, field, value)
            .map_err(|e| e.detail())
    }

    pub(crate) fn header_with(&mut self, field: &str, value: &str) -> Result<bool, ErrorDetail> {
        if let Ok(date_field) = parse_date_field(field) {
            return self
                .editor
                .set_date_text(date_field, value)
                .map_err(|e| e.detail());
        }
        let edit = HeaderEdit::from_input(field, value).ok_or_else(|| {
            EngineError::Validation {
                field: field.to_string(),
                message: format!("Unknown header field: {}", field),
            }
            .detail()
        })?;
        self.editor.update_header(edit).map_err(|e| e.detail())?;
        Ok(true)
    }

    pub(crate) fn save_with(&mut self, action: &str, stay_on_page: bool) -> Result<String, ErrorDetail> {
        let action = SaveAction::from_name(action).ok_or_else(|| {
            EngineError::InvalidStateTransition(format!("Unknown save action: {}", action))
                .detail()
        })?;
        let status = self
            .editor
            .save(&mut self.store, action, stay_on_page)
            .map_err(|e| e.detail())?;
        Ok(status.to_string())
    }
}

#[wasm_bindgen]
impl EditorHandle {
    /// Start a new draft of `kind` ("PO", "PI", "SO" or "SI")
    #[wasm_bindgen(constructor)]
    pub fn new(
        kind: &str,
        products_json: &str,
        ids_json: &str,
        today: Option<String>,
    ) -> Result<EditorHandle, JsValue> {
        Self::create_with(kind, products_json, ids_json, today).map_err(to_js)
    }

    /// Open a saved document
    pub fn open(
        document_json: &str,
        products_json: &str,
        ids_json: &str,
    ) -> Result<EditorHandle, JsValue> {
        Self::open_with(document_json, products_json, ids_json).map_err(to_js)
    }

    pub fn search(&self, query: &str) -> Result<String, JsValue> {
        to_json(&self.editor.search(query)).map_err(to_js)
    }

    /// Add a product at a packaging ("" for the base unit), or at its
    /// default packaging when omitted. Returns the new line id.
    pub fn add_item(
        &mut self,
        product_id: &str,
        packaging_id: Option<String>,
    ) -> Result<String, JsValue> {
        self.add_with(product_id, packaging_id).map_err(to_js)
    }

    pub fn update_item(&mut self, line_id: &str, field: &str, value: &str) -> Result<bool, JsValue> {
        self.update_with(line_id, field, value).map_err(to_js)
    }

    pub fn remove_item(&mut self, line_id: &str) -> Result<bool, JsValue> {
        let id = parse_line_id(line_id).map_err(to_js)?;
        self.editor.remove_item(id).map_err(|e| to_js(e.detail()))
    }

    pub fn reorder_items(&mut self, drag_id: &str, drop_id: &str) -> Result<bool, JsValue> {
        let drag = parse_line_id(drag_id).map_err(to_js)?;
        let drop = parse_line_id(drop_id).map_err(to_js)?;
        self.editor
            .reorder_items(drag, drop)
            .map_err(|e| to_js(e.detail()))
    }

    pub fn set_selected(&mut self, line_id: &str, selected: bool) -> Result<bool, JsValue> {
        let id = parse_line_id(line_id).map_err(to_js)?;
        self.editor
            .set_selected(id, selected)
            .map_err(|e| to_js(e.detail()))
    }

    pub fn select_all(&mut self) -> Result<(), JsValue> {
        self.editor.select_all().map_err(|e| to_js(e.detail()))
    }

    pub fn select_none(&mut self) -> Result<(), JsValue> {
        self.editor.select_none().map_err(|e| to_js(e.detail()))
    }

    pub fn delete_selected(&mut self) -> Result<usize, JsValue> {
        self.editor.delete_selected().map_err(|e| to_js(e.detail()))
    }

    /// Set a header field; `date` and `dueDate` take `DD/MM/YYYY` text and
    /// return false when it is not a real date
    pub fn set_header(&mut self, field: &str, value: &str) -> Result<bool, JsValue> {
        self.header_with(field, value).map_err(to_js)
    }

    pub fn propose_sale_price(&mut self, product_id: &str, price: &str) -> Result<bool, JsValue> {
        self.editor
            .propose_sale_price(product_id, shared::parse_amount_or_zero(price))
            .map_err(|e| to_js(e.detail()))
    }

    /// Returns the resulting status name
    pub fn save(&mut self, action: &str, stay_on_page: bool) -> Result<String, JsValue> {
        self.save_with(action, stay_on_page).map_err(to_js)
    }

    pub fn begin_revision(&mut self) -> Result<(), JsValue> {
        self.editor.begin_revision().map_err(|e| to_js(e.detail()))
    }

    pub fn cancel_revision(&mut self) -> Result<(), JsValue> {
        self.editor.cancel_revision().map_err(|e| to_js(e.detail()))
    }

    pub fn void(&mut self) -> Result<(), JsValue> {
        self.editor
            .void(&mut self.store)
            .map_err(|e| to_js(e.detail()))
    }

    pub fn delete(&mut self) -> Result<(), JsValue> {
        self.editor
            .delete(&mut self.store)
            .map_err(|e| to_js(e.detail()))
    }

    pub fn copy_as_draft(&self, today: Option<String>) -> Result<String, JsValue> {
        let today = today_or(today).map_err(to_js)?;
        let copy = self
            .editor
            .copy_as_draft(&self.store, today)
            .map_err(|e| to_js(e.detail()))?;
        to_json(&copy).map_err(to_js)
    }

    pub fn convert(&self, today: Option<String>) -> Result<String, JsValue> {
        let today = today_or(today).map_err(to_js)?;
        let converted = self
            .editor
            .convert(&self.store, today)
            .map_err(|e| to_js(e.detail()))?;
        to_json(&converted).map_err(to_js)
    }

    /// `{header, items, totals}` for print and export
    pub fn snapshot(&self) -> Result<String, JsValue> {
        to_json(&self.editor.snapshot()).map_err(to_js)
    }

    pub fn available_actions(&self) -> Result<String, JsValue> {
        to_json(&self.editor.available_actions()).map_err(to_js)
    }

    pub fn is_locked(&self) -> bool {
        self.editor.is_locked()
    }

    pub fn is_linked(&self) -> bool {
        self.editor.is_linked()
    }

    /// Save requests queued since the last call, oldest first
    pub fn take_saves(&mut self) -> Result<String, JsValue> {
        let saves = std::mem::take(&mut self.store.saves);
        to_json(&saves).map_err(to_js)
    }
}
