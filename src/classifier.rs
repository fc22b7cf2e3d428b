// 🔎 Scan Classifier - what kind of thing did we just scan?
// Pure and total: every payload gets exactly one Category.

use crate::catalog::CatalogStore;
use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Category {
    /// Payload is the id of a product in the catalog
    ProductReference { product_id: String },
    WifiCredential,
    Url,
    EmailAddress,
    PhoneNumber,
    PlainText,
}

impl Category {
    /// Display name used in scan history
    pub fn label(&self) -> &'static str {
        match self {
            Category::ProductReference { .. } => "Product ID",
            Category::WifiCredential => "Wi-Fi Network",
            Category::Url => "URL",
            Category::EmailAddress => "Email Address",
            Category::PhoneNumber => "Phone Number",
            Category::PlainText => "Plain Text",
        }
    }
}

/// Prefix rules, checked in order after the catalog lookup
const PREFIX_RULES: &[(&str, Category)] = &[
    ("WIFI:", Category::WifiCredential),
    ("http://", Category::Url),
    ("https://", Category::Url),
    ("mailto:", Category::EmailAddress),
    ("tel:", Category::PhoneNumber),
];

/// Classify a decoded payload. First match wins:
/// catalog id, `WIFI:`, `http://`/`https://`, `mailto:`, `tel:`, otherwise plain text.
///
/// Matching is exact and case-sensitive.
pub fn classify(payload: &str, catalog: &CatalogStore) -> Category {
    if catalog.contains(payload) {
        return Category::ProductReference {
            product_id: payload.to_string(),
        };
    }

    PREFIX_RULES
        .iter()
        .find(|(prefix, _)| payload.starts_with(prefix))
        .map(|(_, category)| category.clone())
        .unwrap_or(Category::PlainText)
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Category plus the detail text a front end shows next to the scan result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanAnalysis {
    pub category: Category,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

pub fn describe(payload: &str, catalog: &CatalogStore) -> ScanAnalysis {
    let category = classify(payload, catalog);
    let info = match &category {
        Category::ProductReference { product_id } => {
            catalog.lookup(product_id).map(|product| product.summary())
        }
        _ => None,
    };

    ScanAnalysis {
        label: category.label(),
        category,
        info,
    }
}
