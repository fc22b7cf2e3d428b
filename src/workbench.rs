// 🧰 Workbench - the one place front ends talk to
//
// Owns the catalog, the scan ledger and the config. Mutations take `&mut self`: capture
// threads hand payloads to the owning thread, the HTTP server wraps it in a Mutex.

use crate::catalog::CatalogStore;
use crate::classifier::{describe, ScanAnalysis};
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::ledger::{ScanEvent, ScanLedger};
use crate::payload::payload_from_bytes;
use serde::Serialize;
use tracing::info;

/// What a front end shows after a scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub event: ScanEvent,
    pub analysis: ScanAnalysis,
}

#[derive(Debug)]
pub struct Workbench {
    config: AppConfig,
    catalog: CatalogStore,
    ledger: ScanLedger,
    notice: Option<StoreError>,
}

impl Workbench {
    /// Open the catalog named by `config`. Load problems are kept for `take_notice`.
    pub fn open(config: AppConfig) -> Self {
        let report = CatalogStore::open(&config.data_file);
        Workbench {
            config,
            catalog: report.store,
            ledger: ScanLedger::new(),
            notice: report.notice,
        }
    }

    /// The catalog load error, if any, handed out once
    pub fn take_notice(&mut self) -> Option<StoreError> {
        self.notice.take()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogStore {
        &mut self.catalog
    }

    pub fn ledger(&self) -> &ScanLedger {
        &self.ledger
    }

    // ========================================================================
    // SCANNING
    // ========================================================================

    /// Classify a decoded payload against the current catalog and record it
    pub fn record_scan(&mut self, payload: &str) -> ScanReport {
        let analysis = describe(payload, &self.catalog);
        let event = self
            .ledger
            .append(payload, analysis.category.clone())
            .clone();

        info!(kind = analysis.label, "scan processed");
        ScanReport { event, analysis }
    }

    /// Same as `record_scan` for raw decoder output
    pub fn record_scan_bytes(&mut self, bytes: &[u8]) -> ScanReport {
        let payload = payload_from_bytes(bytes);
        self.record_scan(&payload)
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Delete the selected history rows. An empty selection is NotFound.
    pub fn delete_history<I: IntoIterator<Item = usize>>(&mut self, indices: I) -> Result<usize, StoreError> {
        let selected: Vec<usize> = indices.into_iter().collect();
        if selected.is_empty() {
            return Err(StoreError::not_found("No history item selected."));
        }

        let removed = self.ledger.delete(selected);
        info!(removed, "history items deleted");
        Ok(removed)
    }

    /// Payload of the history row at `index` (the "copy data" action)
    pub fn history_payload(&self, index: usize) -> Result<&str, StoreError> {
        self.ledger
            .get(index)
            .map(|event| event.payload.as_str())
            .ok_or_else(|| StoreError::not_found("No item selected in history."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use std::fs;

    fn workbench() -> (tempfile::TempDir, Workbench) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_file: dir.path().join("products.json"),
            ..AppConfig::default()
        };
        (dir, Workbench::open(config))
    }

    #[test]
    fn test_record_scan_classifies_and_appends() {
        let (_dir, mut bench) = workbench();
        bench.catalog_mut().create_or_replace("PID001", "Widget", "12.5").unwrap();

        let report = bench.record_scan("PID001");
        assert_eq!(report.analysis.label, "Product ID");
        assert_eq!(report.analysis.info.as_deref(), Some("Name: Widget\nPrice: ₹12.50"));
        assert_eq!(report.event.payload, "PID001");

        bench.record_scan("https://example.com");
        let kinds: Vec<&str> = bench.ledger().all().iter().map(|e| e.category.label()).collect();
        assert_eq!(kinds, vec!["URL", "Product ID"]);
    }

    #[test]
    fn test_history_category_is_not_reevaluated() {
        let (_dir, mut bench) = workbench();
        bench.catalog_mut().create_or_replace("PID001", "Widget", "1").unwrap();
        bench.record_scan("PID001");

        bench.catalog_mut().delete("PID001").unwrap();
        assert_eq!(
            bench.ledger().all()[0].category,
            Category::ProductReference { product_id: "PID001".to_string() }
        );
        assert_eq!(bench.record_scan("PID001").analysis.category, Category::PlainText);
    }

    #[test]
    fn test_record_scan_bytes() {
        let (_dir, mut bench) = workbench();
        let report = bench.record_scan_bytes(b"tel:\xff555");
        assert_eq!(report.event.payload, "tel:555");
        assert_eq!(report.analysis.category, Category::PhoneNumber);
    }

    #[test]
    fn test_delete_history() {
        let (_dir, mut bench) = workbench();
        bench.record_scan("a");
        bench.record_scan("b");
        bench.record_scan("c");

        let err = bench.delete_history(Vec::<usize>::new()).unwrap_err();
        assert_eq!(err, StoreError::not_found("No history item selected."));

        assert_eq!(bench.delete_history([0, 2]).unwrap(), 2);
        assert_eq!(bench.history_payload(0).unwrap(), "b");
        assert!(bench.history_payload(1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_config_changes_persist() {
        let (dir, mut bench) = workbench();
        let path = dir.path().join("app_config.json");

        bench.config_mut().theme = "darkly".to_string();
        bench.config_mut().geometry = Some("1200x850+0+0".to_string());
        bench.config().save(&path).unwrap();

        let loaded = AppConfig::try_load(&path).unwrap();
        assert_eq!(loaded.theme, "darkly");
        assert_eq!(loaded.geometry.as_deref(), Some("1200x850+0+0"));
        assert_eq!(&loaded, bench.config());
    }

    #[test]
    fn test_open_keeps_load_notice() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("products.json");
        fs::write(&data_file, "[1, 2").unwrap();

        let mut bench = Workbench::open(AppConfig {
            data_file,
            ..AppConfig::default()
        });
        assert!(bench.catalog().is_empty());
        assert!(bench.take_notice().unwrap().is_storage());
        assert!(bench.take_notice().is_none());
    }
}
