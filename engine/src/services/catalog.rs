//! Product catalog and packaging-level search index

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{resolve_packaging_options, PackagingOption, PackagingRef, Product};

/// Default cap on search results
pub const DEFAULT_RESULT_LIMIT: usize = 30;

/// One searchable (product, packaging) pair
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow {
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub option: PackagingOption,
    /// Label shown in the result list
    pub label: String,
    pub display_code: String,
    /// Whole packaging units covered by current stock
    pub available_packs: Decimal,
    /// Lowercased match text
    #[serde(skip)]
    pub corpus: String,
}

impl SearchRow {
    fn new(product: &Product, option: PackagingOption) -> Self {
        let label = display_label(product, &option);
        let display_code = non_blank(option.display_code.as_deref())
            .or(non_blank(option.code.as_deref()))
            .unwrap_or(product.product_code.as_str())
            .to_string();

        let corpus = [
            label.as_str(),
            display_code.as_str(),
            option.name.as_str(),
            product.name.as_str(),
            product.product_code.as_str(),
            product.brand.as_deref().unwrap_or_default(),
            product.category.as_deref().unwrap_or_default(),
            product.barcode.as_deref().unwrap_or_default(),
            product.id.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

        let available_packs = if option.factor > Decimal::ZERO {
            product
                .stock
                .checked_div(option.factor)
                .map(|packs| packs.floor())
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        Self {
            product_id: product.id.clone(),
            product_code: product.product_code.clone(),
            product_name: product.name.clone(),
            option,
            label,
            display_code,
            available_packs,
            corpus,
        }
    }

    /// Every keyword must appear somewhere in the corpus
    pub fn matches(&self, keywords: &[String]) -> bool {
        keywords.iter().all(|k| self.corpus.contains(k.as_str()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn display_label(product: &Product, option: &PackagingOption) -> String {
    if let Some(name) = non_blank(option.display_name.as_deref()) {
        return name.to_string();
    }
    match option.packaging {
        PackagingRef::Base => product.name.clone(),
        PackagingRef::Named(_) => format!("{} ({})", product.name, option.name),
    }
}

/// Flatten every product into one row per resolved packaging option
pub fn build_search_index(products: &[Product]) -> Vec<SearchRow> {
    products
        .iter()
        .flat_map(|product| {
            resolve_packaging_options(product)
                .into_iter()
                .map(move |option| SearchRow::new(product, option))
        })
        .collect()
}

/// Ranked keyword search over an index.
///
/// Rows whose label starts with the whole query rank first, then by label
/// ignoring case. An empty query returns nothing.
pub fn search<'a>(index: &'a [SearchRow], query: &str, limit: usize) -> Vec<&'a SearchRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let keywords: Vec<String> = needle.split_whitespace().map(str::to_string).collect();

    let mut hits: Vec<(bool, String, &SearchRow)> = index
        .iter()
        .filter(|row| row.matches(&keywords))
        .map(|row| {
            let label = row.label.to_lowercase();
            (label.starts_with(&needle), label, row)
        })
        .collect();

    hits.sort_by(|a, b| match (a.0, b.0) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.1.cmp(&b.1),
    });

    hits.into_iter().take(limit).map(|(_, _, row)| row).collect()
}

/// Products refreshed wholesale from the catalog source, with their index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<String, usize>,
    index: Vec<SearchRow>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let by_id = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let index = build_search_index(&products);

        tracing::debug!(
            "Catalog loaded: {} products, {} search rows",
            products.len(),
            index.len()
        );

        Self {
            products,
            by_id,
            index,
        }
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.by_id.get(id).map(|&i| &self.products[i])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn index(&self) -> &[SearchRow] {
        &self.index
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<&SearchRow> {
        search(&self.index, query, limit)
    }

    /// Resolve one packaging option of a product
    pub fn option(&self, product_id: &str, packaging: &PackagingRef) -> Option<PackagingOption> {
        self.product(product_id)?.find_option(packaging)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
