// 🏷️ Product Catalog - keyed product records persisted as one JSON document
//
// Document shape (keys kept in catalog order):
//   { "PID001": { "name": "Widget", "price": "₹12.50" }, ... }
//
// Every mutation is flushed immediately. A failed save keeps the in-memory change
// and reports a Storage error so the caller can warn about the divergence.

use crate::error::StoreError;
use crate::storage::{to_pretty_json, write_atomically};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Currency symbol prefixed to every displayed price
pub const CURRENCY_SYMBOL: &str = "₹";

/// Default catalog location, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "products_database.json";

/// CSV export header
pub const EXPORT_HEADER: [&str; 3] = ["product_id", "name", "price"];

// ============================================================================
// PRICE
// ============================================================================

/// Product price.
///
/// Input is always a non-negative amount held as whole cents. A stored value that does
/// not read as one (older files may hold "₹-5.00") is kept verbatim so saving never
/// rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Price {
    Amount(u128),
    Verbatim(String),
}

impl Price {
    pub fn from_cents(cents: u128) -> Self {
        Price::Amount(cents)
    }

    pub fn cents(&self) -> Option<u128> {
        match self {
            Price::Amount(cents) => Some(*cents),
            Price::Verbatim(_) => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        self.cents().map(|cents| cents as f64 / 100.0)
    }

    /// Parse user input.
    ///
    /// Accepts an optional leading currency symbol ("₹12.5" and "12.5" are the same).
    /// The amount is rounded to two decimals the same way it is displayed.
    pub fn parse(input: &str) -> Result<Price, StoreError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix(CURRENCY_SYMBOL)
            .unwrap_or(trimmed)
            .trim();

        let value: f64 = digits
            .parse()
            .map_err(|_| StoreError::validation("price", "Price must be a valid number."))?;

        if !value.is_finite() {
            return Err(StoreError::validation("price", "Price must be a valid number."));
        }
        if value < 0.0 {
            return Err(StoreError::validation("price", "Price must not be negative."));
        }

        // -0.0 would otherwise format as "-0.00"
        let value = if value == 0.0 { 0.0 } else { value };

        let formatted = format!("{:.2}", value);
        let too_large = || StoreError::validation("price", "Price is too large.");
        let (whole, fraction) = formatted.split_once('.').ok_or_else(too_large)?;
        let whole: u128 = whole.parse().map_err(|_| too_large())?;
        let fraction: u128 = fraction.parse().map_err(|_| too_large())?;

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(too_large)?;

        Ok(Price::Amount(cents))
    }

    /// Read a price from the catalog file. Never fails.
    pub fn from_stored(raw: &str) -> Price {
        Price::parse(raw).unwrap_or_else(|_| Price::Verbatim(raw.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(cents) => write!(f, "{}{}.{:02}", CURRENCY_SYMBOL, cents / 100, cents % 100),
            Price::Verbatim(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Price::from_stored(&raw))
    }
}

// ============================================================================
// PRODUCT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Caller-supplied key, never changes once created
    pub id: String,
    pub name: String,
    pub price: Price,
}

impl ProductRecord {
    /// Build a record from raw form input (trimmed, all fields required)
    pub fn from_input(id: &str, name: &str, price: &str) -> Result<Self, StoreError> {
        let (id, name, price) = (id.trim(), name.trim(), price.trim());

        for (field, value) in [("id", id), ("name", name), ("price", price)] {
            if value.is_empty() {
                return Err(StoreError::validation(field, "All product fields are required."));
            }
        }

        Ok(ProductRecord {
            id: id.to_string(),
            name: name.to_string(),
            price: Price::parse(price)?,
        })
    }

    /// Detail text shown when a scan resolves to this product
    pub fn summary(&self) -> String {
        format!("Name: {}\nPrice: {}", self.name, self.price)
    }
}

/// Value side of the persisted document
#[derive(Serialize, Deserialize)]
struct StoredProduct {
    name: String,
    price: Price,
}

/// Whether `create_or_replace` added a new id or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Replaced,
}

// ============================================================================
// CATALOG STORE
// ============================================================================

/// Result of opening a catalog: always a usable store, plus the error if loading degraded
#[derive(Debug)]
pub struct LoadReport {
    pub store: CatalogStore,
    pub notice: Option<StoreError>,
}

#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    /// Catalog order = order of first creation
    products: Vec<ProductRecord>,
}

impl CatalogStore {
    /// Empty catalog bound to `path` (nothing is read or written)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CatalogStore {
            path: path.as_ref().to_path_buf(),
            products: Vec::new(),
        }
    }

    /// Open the catalog at `path`.
    ///
    /// Never fails. A missing file is an empty catalog. An unreadable or corrupt file
    /// is also an empty catalog, with the error returned as `notice`.
    pub fn open<P: AsRef<Path>>(path: P) -> LoadReport {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "no catalog file yet, starting empty");
            return LoadReport {
                store: CatalogStore::new(path),
                notice: None,
            };
        }

        match read_products(path) {
            Ok(products) => {
                info!(path = %path.display(), count = products.len(), "catalog loaded");
                LoadReport {
                    store: CatalogStore {
                        path: path.to_path_buf(),
                        products,
                    },
                    notice: None,
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read catalog, starting empty");
                LoadReport {
                    store: CatalogStore::new(path),
                    notice: Some(err),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Ids are matched after trimming, as every mutation trims them
    pub fn lookup(&self, id: &str) -> Option<&ProductRecord> {
        let id = id.trim();
        self.products.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// All records in catalog order
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        let id = id.trim();
        self.products.iter().position(|p| p.id == id)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Insert a product, or overwrite the record with the same id in place
    pub fn create_or_replace(&mut self, id: &str, name: &str, price: &str) -> Result<Upsert, StoreError> {
        let record = ProductRecord::from_input(id, name, price)?;
        let id = record.id.clone();

        let outcome = match self.position(&record.id) {
            Some(idx) => {
                self.products[idx] = record;
                Upsert::Replaced
            }
            None => {
                self.products.push(record);
                Upsert::Created
            }
        };

        self.save()?;
        info!(id = %id, ?outcome, "product saved");
        Ok(outcome)
    }

    /// Change name and price of an existing product
    pub fn update(&mut self, id: &str, name: &str, price: &str) -> Result<&ProductRecord, StoreError> {
        let id = id.trim();
        let idx = self
            .position(id)
            .ok_or_else(|| StoreError::not_found(format!("Product '{}'", id)))?;

        let (name, price) = (name.trim(), price.trim());
        if name.is_empty() || price.is_empty() {
            let field = if name.is_empty() { "name" } else { "price" };
            return Err(StoreError::validation(field, "All fields are required."));
        }
        let price = Price::parse(price)?;

        let record = &mut self.products[idx];
        record.name = name.to_string();
        record.price = price;

        self.save()?;
        info!(id = %id, "product updated");
        Ok(&self.products[idx])
    }

    /// Remove a product, returning the removed record
    pub fn delete(&mut self, id: &str) -> Result<ProductRecord, StoreError> {
        let id = id.trim();
        let idx = self
            .position(id)
            .ok_or_else(|| StoreError::not_found(format!("Product '{}'", id)))?;

        let removed = self.products.remove(idx);
        self.save()?;
        info!(id = %removed.id, "product deleted");
        Ok(removed)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Write the whole catalog to its file
    pub fn save(&self) -> Result<(), StoreError> {
        let mut doc = serde_json::Map::new();
        for product in &self.products {
            let value = serde_json::to_value(StoredProduct {
                name: product.name.clone(),
                price: product.price.clone(),
            })
            .map_err(|e| StoreError::storage(&self.path, e))?;
            doc.insert(product.id.clone(), value);
        }

        let bytes = to_pretty_json(&doc).map_err(|e| StoreError::storage(&self.path, e))?;
        write_atomically(&self.path, &bytes)?;
        debug!(path = %self.path.display(), count = self.products.len(), "catalog flushed");
        Ok(())
    }

    /// Write `product_id,name,price` rows in catalog order; returns the row count
    pub fn export<W: io::Write>(&self, writer: W) -> Result<usize, StoreError> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(EXPORT_HEADER).map_err(export_error)?;
        for product in &self.products {
            let price = product.price.to_string();
            wtr.write_record([product.id.as_str(), product.name.as_str(), price.as_str()])
                .map_err(export_error)?;
        }
        wtr.flush().map_err(export_error)?;

        Ok(self.products.len())
    }

    /// Create (or truncate) `path` and export into it
    pub fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|e| StoreError::storage(path, e))?;
        let rows = self
            .export(io::BufWriter::new(file))
            .map_err(|e| match e {
                StoreError::Storage { message, .. } => StoreError::storage(path, message),
                other => other,
            })?;
        info!(path = %path.display(), rows, "catalog exported");
        Ok(rows)
    }
}

fn export_error(err: impl fmt::Display) -> StoreError {
    StoreError::storage_target("csv export", err)
}

/// Strict loader behind `CatalogStore::open`. Only an unreadable or malformed
/// document fails; prices are taken as stored.
pub fn read_products<P: AsRef<Path>>(path: P) -> Result<Vec<ProductRecord>, StoreError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StoreError::storage(path, e))?;

    let doc: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| StoreError::storage(path, e))?;

    let mut products = Vec::with_capacity(doc.len());
    for (id, value) in doc {
        let stored: StoredProduct = serde_json::from_value(value)
            .map_err(|e| StoreError::storage(path, format!("product '{}': {}", id, e)))?;
        products.push(ProductRecord {
            id,
            name: stored.name,
            price: stored.price,
        });
    }

    Ok(products)
}

// ============================================================================
// TESTS
// ============================================================================
