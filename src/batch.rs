// 🗂️ Batch generation - one QR image per input line, plus a CSV log of what went where

use crate::error::StoreError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const BATCH_LOG_FILE: &str = "batch_log.csv";
pub const BATCH_LOG_HEADER: [&str; 2] = ["InputData", "Filename"];

/// Alphanumeric characters of the payload kept in each file name
const FILENAME_STEM_CHARS: usize = 20;

/// Turns a payload into an image on disk (`render::PngRenderer` in production)
pub trait QrRenderer {
    fn render(&self, payload: &str, dest: &Path) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    /// 1-based line number, counted from the first non-blank line, blank lines included
    pub line_number: usize,
    pub payload: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub rendered: Vec<BatchItem>,
    pub failed: Vec<BatchItem>,
}

/// Split input text into numbered items, skipping blank lines
pub fn plan_batch(text: &str) -> Vec<BatchItem> {
    text.trim()
        .split('\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let payload = line.trim();
            if payload.is_empty() {
                return None;
            }
            let line_number = i + 1;
            let stem: String = payload
                .chars()
                .filter(|c| c.is_alphanumeric())
                .take(FILENAME_STEM_CHARS)
                .collect();
            Some(BatchItem {
                line_number,
                payload: payload.to_string(),
                filename: format!("qr_{}_{}.png", line_number, stem),
            })
        })
        .collect()
}

/// Write the `InputData,Filename` log
pub fn write_batch_log<W: io::Write>(writer: W, items: &[BatchItem]) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let fail = |e: csv::Error| StoreError::storage_target("batch log", e);

    wtr.write_record(BATCH_LOG_HEADER).map_err(fail)?;
    for item in items {
        wtr.write_record([item.payload.as_str(), item.filename.as_str()])
            .map_err(fail)?;
    }
    wtr.flush()
        .map_err(|e| StoreError::storage_target("batch log", e))?;
    Ok(())
}

/// Render every line of `text` into `output_dir` and log the results.
///
/// Items the renderer fails on are reported in `failed` and left out of the log.
pub fn run_batch<R: QrRenderer + ?Sized>(
    text: &str,
    output_dir: &Path,
    renderer: &R,
) -> Result<BatchSummary, StoreError> {
    let plan = plan_batch(text);
    if plan.is_empty() {
        return Err(StoreError::validation("batch", "No data for batch generation."));
    }

    let mut rendered = Vec::new();
    let mut failed = Vec::new();
    for item in plan {
        let dest = output_dir.join(&item.filename);
        match renderer.render(&item.payload, &dest) {
            Ok(()) => rendered.push(item),
            Err(err) => {
                warn!(line = item.line_number, error = %err, "batch item not rendered");
                failed.push(item);
            }
        }
    }

    let log_path = output_dir.join(BATCH_LOG_FILE);
    let file = fs::File::create(&log_path).map_err(|e| StoreError::storage(&log_path, e))?;
    write_batch_log(io::BufWriter::new(file), &rendered)?;

    info!(
        dir = %output_dir.display(),
        rendered = rendered.len(),
        failed = failed.len(),
        "batch complete"
    );

    Ok(BatchSummary {
        output_dir: output_dir.to_path_buf(),
        rendered,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Writes the payload as text instead of an image
    struct TextRenderer;

    impl QrRenderer for TextRenderer {
        fn render(&self, payload: &str, dest: &Path) -> anyhow::Result<()> {
            if payload.contains("fail") {
                bail!("cannot encode {}", payload);
            }
            fs::write(dest, payload)?;
            Ok(())
        }
    }

    #[test]
    fn test_plan_numbers_lines_and_skips_blanks() {
        let plan = plan_batch("https://a.example\n\n  hello world  \n");

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].line_number, 1);
        assert_eq!(plan[0].filename, "qr_1_httpsaexample.png");
        assert_eq!(plan[1].line_number, 3);
        assert_eq!(plan[1].payload, "hello world");
        assert_eq!(plan[1].filename, "qr_3_helloworld.png");
    }

    #[test]
    fn test_plan_counts_from_first_non_blank_line() {
        let plan = plan_batch("\n\n  first\r\nsecond");
        assert_eq!(plan[0].filename, "qr_1_first.png");
        assert_eq!(plan[0].payload, "first");
        assert_eq!(plan[1].line_number, 2);
    }

    #[test]
    fn test_plan_truncates_filename_stem() {
        let plan = plan_batch("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(plan[0].filename, "qr_1_abcdefghijklmnopqrst.png");
    }

    #[test]
    fn test_write_batch_log() {
        let items = plan_batch("one, two\nthree");
        let mut buf = Vec::new();
        write_batch_log(&mut buf, &items).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "InputData,Filename\n\"one, two\",qr_1_onetwo.png\nthree,qr_2_three.png\n"
        );
    }

    #[test]
    fn test_run_batch_renders_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let summary = run_batch("alpha\nfail me\nbeta", dir.path(), &TextRenderer).unwrap();

        assert_eq!(summary.rendered.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("qr_1_alpha.png")).unwrap(),
            "alpha"
        );

        let mut rdr = csv::Reader::from_path(dir.path().join(BATCH_LOG_FILE)).unwrap();
        let rows: Vec<(String, String)> = rdr
            .records()
            .map(|r| {
                let r = r.unwrap();
                (r[0].to_string(), r[1].to_string())
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("alpha".to_string(), "qr_1_alpha.png".to_string()),
                ("beta".to_string(), "qr_3_beta.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_run_batch_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_batch(" \n\n", dir.path(), &TextRenderer).unwrap_err();
        assert!(err.is_validation());
        assert!(!dir.path().join(BATCH_LOG_FILE).exists());
    }
}
