// 🖨️ QR rendering - PNG output for product, Wi-Fi and batch codes

use crate::batch::QrRenderer;
use crate::payload::product_qr_filename;
use anyhow::{anyhow, Context, Result};
use image::Luma;
use qrcode::{EcLevel, QrCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pixels per QR module
pub const DEFAULT_MODULE_SIZE: u32 = 10;

/// Grayscale PNG encoder with high error correction and a 4-module quiet zone
#[derive(Debug, Clone, Copy)]
pub struct PngRenderer {
    pub module_size: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        PngRenderer {
            module_size: DEFAULT_MODULE_SIZE,
        }
    }
}

impl QrRenderer for PngRenderer {
    fn render(&self, payload: &str, dest: &Path) -> Result<()> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
            .map_err(|e| anyhow!("cannot encode payload: {}", e))?;

        let img = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_size, self.module_size)
            .quiet_zone(true)
            .build();

        img.save(dest)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        debug!(dest = %dest.display(), "qr image written");
        Ok(())
    }
}

/// Write the QR image for a product id into `qr_folder`, creating the folder if needed
pub fn render_product_qr<R: QrRenderer + ?Sized>(
    renderer: &R,
    qr_folder: &Path,
    product_id: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(qr_folder)
        .with_context(|| format!("Failed to create {}", qr_folder.display()))?;

    let dest = qr_folder.join(product_qr_filename(product_id.trim()));
    renderer.render(product_id.trim(), &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_renderer_writes_square_image() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("code.png");

        PngRenderer::default().render("https://example.com", &dest).unwrap();

        let img = image::open(&dest).unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % DEFAULT_MODULE_SIZE, 0);
    }

    #[test]
    fn test_png_renderer_rejects_oversized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("big.png");

        let payload = "x".repeat(4000);
        assert!(PngRenderer::default().render(&payload, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_render_product_qr_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("QRCodes");

        let path = render_product_qr(&PngRenderer::default(), &folder, " PID/001 ").unwrap();
        assert_eq!(path, folder.join("PID001.png"));
        assert!(image::open(&path).is_ok());
    }

    #[test]
    fn test_batch_with_png_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let summary = crate::batch::run_batch("alpha\n\nbeta", dir.path(), &PngRenderer::default()).unwrap();

        assert_eq!(summary.rendered.len(), 2);
        assert!(summary.failed.is_empty());
        assert!(image::open(dir.path().join("qr_3_beta.png")).is_ok());
        assert!(dir.path().join(crate::batch::BATCH_LOG_FILE).exists());
    }
}
