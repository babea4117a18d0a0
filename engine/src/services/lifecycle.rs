//! Document lifecycle guard
//!
//! Status transitions and the mutability rules derived from them. All checks
//! live here so callers never re-derive them from the status.

use serde::Serialize;
use shared::{DocumentKind, DocumentStatus};

use crate::error::{EngineError, EngineResult};

/// Save buttons offered by the editor
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// Persist and keep editing
    SaveAndEdit,
    SaveAndPending,
    SaveAndApproved,
    /// Re-commit an approved document being revised
    SaveRevision,
}

impl SaveAction {
    /// Parse the snake_case name a front end sends, e.g. `save_and_pending`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "save_and_edit" => Some(SaveAction::SaveAndEdit),
            "save_and_pending" => Some(SaveAction::SaveAndPending),
            "save_and_approved" => Some(SaveAction::SaveAndApproved),
            "save_revision" => Some(SaveAction::SaveRevision),
            _ => None,
        }
    }
}

/// Every action a UI may render for a document
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentAction {
    SaveAndEdit,
    SaveAndPending,
    SaveAndApproved,
    Revise,
    SaveRevision,
    CancelRevision,
    Void,
    Delete,
    Copy,
    Convert,
}

/// Revising only means something on an approved document
fn revising_approved(status: DocumentStatus, revising: bool) -> bool {
    revising && status == DocumentStatus::Approved
}

/// Whether inputs must be disabled and mutations refused
pub fn is_locked(status: DocumentStatus, revising: bool) -> bool {
    match status {
        DocumentStatus::Draft | DocumentStatus::Pending => false,
        DocumentStatus::Approved => !revising,
        DocumentStatus::Void | DocumentStatus::Deleted => true,
    }
}

pub fn can_edit(status: DocumentStatus, revising: bool) -> bool {
    !is_locked(status, revising)
}

pub fn can_void(status: DocumentStatus, linked: bool) -> bool {
    !linked && matches!(status, DocumentStatus::Pending | DocumentStatus::Approved)
}

pub fn can_delete(status: DocumentStatus, linked: bool) -> bool {
    !linked && matches!(status, DocumentStatus::Draft | DocumentStatus::Pending)
}

pub fn can_copy(status: DocumentStatus) -> bool {
    matches!(
        status,
        DocumentStatus::Approved | DocumentStatus::Void | DocumentStatus::Deleted
    )
}

pub fn can_revise(status: DocumentStatus, revising: bool) -> bool {
    status == DocumentStatus::Approved && !revising
}

pub fn can_convert(status: DocumentStatus, revising: bool, kind: DocumentKind) -> bool {
    status == DocumentStatus::Approved && !revising && kind.conversion_target().is_some()
}

/// Status a save action lands on, or why it is refused
pub fn save_target(
    status: DocumentStatus,
    revising: bool,
    action: SaveAction,
) -> EngineResult<DocumentStatus> {
    let revising = revising_approved(status, revising);

    match (status, action) {
        (DocumentStatus::Approved, SaveAction::SaveRevision) if revising => {
            Ok(DocumentStatus::Approved)
        }
        (DocumentStatus::Approved, _) if revising => Err(EngineError::InvalidStateTransition(
            "An approved document under revision can only be saved as a revision".to_string(),
        )),
        (_, SaveAction::SaveRevision) => Err(EngineError::InvalidStateTransition(format!(
            "Cannot save a revision of a {} document",
            status.to_string().to_lowercase()
        ))),
        (DocumentStatus::Draft, SaveAction::SaveAndEdit) => Ok(DocumentStatus::Draft),
        (DocumentStatus::Pending, SaveAction::SaveAndEdit) => Ok(DocumentStatus::Pending),
        (DocumentStatus::Draft | DocumentStatus::Pending, SaveAction::SaveAndPending) => {
            Ok(DocumentStatus::Pending)
        }
        (DocumentStatus::Draft | DocumentStatus::Pending, SaveAction::SaveAndApproved) => {
            Ok(DocumentStatus::Approved)
        }
        (status, _) => Err(EngineError::DocumentLocked {
            status: status.to_string(),
        }),
    }
}

/// Status after voiding, or why voiding is refused
pub fn void_target(status: DocumentStatus, linked: bool) -> EngineResult<DocumentStatus> {
    if linked {
        return Err(EngineError::LinkedDocument(
            "This document was generated from another document and cannot be voided directly"
                .to_string(),
        ));
    }
    if !can_void(status, linked) {
        return Err(EngineError::InvalidStateTransition(format!(
            "Cannot void a {} document",
            status.to_string().to_lowercase()
        )));
    }
    Ok(DocumentStatus::Void)
}

/// Status after deleting, or why deleting is refused
pub fn delete_target(status: DocumentStatus, linked: bool) -> EngineResult<DocumentStatus> {
    if linked {
        return Err(EngineError::LinkedDocument(
            "This document was generated from another document and cannot be deleted directly"
                .to_string(),
        ));
    }
    if !can_delete(status, linked) {
        return Err(EngineError::InvalidStateTransition(format!(
            "Cannot delete a {} document",
            status.to_string().to_lowercase()
        )));
    }
    Ok(DocumentStatus::Deleted)
}

/// Actions valid for the current state, in display order
pub fn available_actions(
    status: DocumentStatus,
    revising: bool,
    linked: bool,
    kind: DocumentKind,
) -> Vec<DocumentAction> {
    let revising = revising_approved(status, revising);
    let mut actions = Vec::new();

    match status {
        DocumentStatus::Draft | DocumentStatus::Pending => {
            actions.extend([
                DocumentAction::SaveAndEdit,
                DocumentAction::SaveAndPending,
                DocumentAction::SaveAndApproved,
            ]);
        }
        DocumentStatus::Approved if revising => {
            actions.extend([DocumentAction::SaveRevision, DocumentAction::CancelRevision]);
        }
        _ => {}
    }

    if can_revise(status, revising) {
        actions.push(DocumentAction::Revise);
    }
    if can_convert(status, revising, kind) {
        actions.push(DocumentAction::Convert);
    }
    if can_copy(status) {
        actions.push(DocumentAction::Copy);
    }
    if can_void(status, linked) {
        actions.push(DocumentAction::Void);
    }
    if can_delete(status, linked) {
        actions.push(DocumentAction::Delete);
    }

    actions
}
