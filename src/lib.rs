// QuantumLink - Core Library
// Product catalog, scan history and payload classification for the QR/barcode workbench.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod error;
pub mod storage;
pub mod catalog;
pub mod classifier;
pub mod ledger;
pub mod payload;
pub mod batch;
pub mod render;
pub mod config;
pub mod workbench;

// Only compiled with the HTTP front end
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::StoreError;
pub use catalog::{
    CatalogStore, LoadReport, Price, ProductRecord, Upsert,
    read_products, CURRENCY_SYMBOL, DEFAULT_DATA_FILE,
};
pub use classifier::{classify, describe, Category, ScanAnalysis};
pub use ledger::{ScanEvent, ScanLedger, TIMESTAMP_FORMAT};
pub use payload::{payload_from_bytes, product_qr_filename, wifi_payload, WifiEncryption};
pub use batch::{plan_batch, run_batch, write_batch_log, BatchItem, BatchSummary, QrRenderer};
pub use render::{render_product_qr, PngRenderer};
pub use config::{init_logging, AppConfig};
pub use workbench::{ScanReport, Workbench};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
