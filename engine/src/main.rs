//! Aftab Autos document tool
//!
//! Loads a product catalog and a document from JSON, re-derives every line
//! amount and total, runs the save gate, and prints the export tuple.
//!
//! Usage: `aftab-docs <catalog.json> <document.json>`

use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use engine::{Catalog, Config, DocumentAction, DocumentEditor, ErrorDetail};
use serde::Serialize;
use shared::{Document, DocumentSnapshot, Product};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// What the tool prints
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    snapshot: DocumentSnapshot,
    locked: bool,
    linked: bool,
    actions: Vec<DocumentAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_error: Option<ErrorDetail>,
}

fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Environment: {}", config.environment);

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        anyhow::bail!("usage: {} <catalog.json> <document.json>", args[0]);
    }

    let products: Vec<Product> = read_json(Path::new(&args[1]))?;
    let document: Document = read_json(Path::new(&args[2]))?;

    tracing::info!(
        "Loaded {} products and document {}",
        products.len(),
        document.header.id
    );

    let catalog = Arc::new(Catalog::new(products));
    let editor = DocumentEditor::open(document, catalog, Arc::new(config));

    let validation_error = editor.validate().err().map(|e| {
        tracing::warn!("Document does not pass the save gate: {}", e);
        e.detail()
    });

    let report = Report {
        snapshot: editor.snapshot(),
        locked: editor.is_locked(),
        linked: editor.is_linked(),
        actions: editor.available_actions(),
        validation_error,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
