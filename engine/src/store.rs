//! Persistence collaborator boundary
//!
//! The engine never talks to a database. It hands a validated, fully derived
//! document to a [`DocumentStore`] and only commits its own state once the
//! store accepts it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Document, Totals};

use crate::error::EngineResult;

/// Everything handed over on save
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub document: Document,
    pub totals: Totals,
    /// Keep the editor open after saving
    pub stay_on_page: bool,
    /// Proposed sale price per product id (purchase documents only),
    /// applied by the store, not by the engine
    pub price_updates: BTreeMap<String, Decimal>,
}

/// Where finished documents go
pub trait DocumentStore {
    /// Ids already issued under `prefix`
    fn document_ids(&self, prefix: &str) -> EngineResult<Vec<String>>;

    fn save(&mut self, request: &SaveRequest) -> EngineResult<()>;
}

/// Store keeping documents in memory, keyed by id
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: BTreeMap<String, Document>,
    requests: Vec<SaveRequest>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a previously saved document
    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.header.id.clone(), document);
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every save request received, oldest first
    pub fn requests(&self) -> &[SaveRequest] {
        &self.requests
    }

    pub fn last_request(&self) -> Option<&SaveRequest> {
        self.requests.last()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn document_ids(&self, prefix: &str) -> EngineResult<Vec<String>> {
        let ids = self
            .documents
            .keys()
            .filter(|id| shared::document_sequence(id, prefix).is_some())
            .cloned()
            .collect();
        Ok(ids)
    }

    fn save(&mut self, request: &SaveRequest) -> EngineResult<()> {
        let document = request.document.clone();
        tracing::debug!(
            "Storing {} as {}",
            document.header.id,
            document.header.status
        );
        self.documents.insert(document.header.id.clone(), document);
        self.requests.push(request.clone());
        Ok(())
    }
}
