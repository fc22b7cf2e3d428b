use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

// Use library instead of local modules
use quantumlink::{
    describe, init_logging, render_product_qr, run_batch, wifi_payload, AppConfig, PngRenderer,
    QrRenderer, StoreError, Upsert, WifiEncryption, Workbench,
};

#[derive(Parser)]
#[command(name = "quantumlink", version, about = "Product catalog and scan tools for QR/barcodes")]
struct Cli {
    /// Config file (defaults to $QUANTUMLINK_CONFIG or app_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a product, or replace the one with the same id
    Add { id: String, name: String, price: String },
    /// Change name and price of an existing product
    Edit { id: String, name: String, price: String },
    /// Delete a product
    Remove { id: String },
    /// Show one product
    Show { id: String },
    /// List all products
    List,
    /// Export the catalog as CSV
    Export { path: PathBuf },
    /// Classify payloads without recording them
    Classify { payloads: Vec<String> },
    /// Record payloads as scans and print this session's history
    Scan { payloads: Vec<String> },
    /// Build a Wi-Fi login payload
    Wifi {
        ssid: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value_t = WifiEncryption::Wpa, value_parser = parse_encryption)]
        encryption: WifiEncryption,
        /// Also write the QR image to this PNG file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// One QR image per line of a text file, plus batch_log.csv
    Batch { input: PathBuf, out_dir: PathBuf },
    /// Show the saved theme, or change it
    Theme { name: Option<String> },
}

fn parse_encryption(s: &str) -> Result<WifiEncryption, StoreError> {
    s.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::try_load(&config_path);
    let config_error = config.as_ref().err().cloned();
    let config = config.unwrap_or_default();

    init_logging(&config.log_level);
    if let Some(err) = config_error {
        warn!(error = %err, "using default configuration");
    }

    let mut bench = Workbench::open(config);
    if let Some(notice) = bench.take_notice() {
        eprintln!("⚠️  Database Error: {}", notice);
        eprintln!("   Continuing with an empty catalog.");
    }

    run(cli.command, &mut bench, &config_path)
}

fn run(command: Command, bench: &mut Workbench, config_path: &Path) -> Result<()> {
    match command {
        Command::Add { id, name, price } => {
            let outcome = saved(bench.catalog_mut().create_or_replace(&id, &name, &price))?;
            let verb = match outcome {
                Upsert::Created => "Added",
                Upsert::Replaced => "Replaced",
            };
            println!("✔️ {} product '{}'.", verb, id.trim());
            let qr_file = render_product_qr(&PngRenderer::default(), &bench.config().qr_folder, &id)
                .context("Product saved, but its QR image could not be written")?;
            println!("   QR image: {}", qr_file.display());
        }

        Command::Edit { id, name, price } => {
            let product = saved(bench.catalog_mut().update(&id, &name, &price))?;
            println!("✔️ Product '{}' updated: {} {}", product.id, product.name, product.price);
        }

        Command::Remove { id } => {
            let removed = saved(bench.catalog_mut().delete(&id))?;
            println!("✔️ Product '{}' deleted.", removed.id);
        }

        Command::Show { id } => match bench.catalog().lookup(&id) {
            Some(product) => println!("{}\t{}\t{}", product.id, product.name, product.price),
            None => bail!("Product '{}' not found", id),
        },

        Command::List => {
            if bench.catalog().is_empty() {
                println!("(no products)");
            }
            for product in bench.catalog().products() {
                println!("{}\t{}\t{}", product.id, product.name, product.price);
            }
        }

        Command::Export { path } => {
            if bench.catalog().is_empty() {
                println!("⚠️  Export Failed: the product database is empty.");
                return Ok(());
            }
            let rows = bench.catalog().export_to_path(&path)?;
            println!("✔️ Database exported successfully ({} rows) to {}", rows, path.display());
        }

        Command::Classify { payloads } => {
            for payload in payloads {
                let analysis = describe(&payload, bench.catalog());
                println!("{}\t{}", analysis.label, payload);
                if let Some(info) = analysis.info {
                    for line in info.lines() {
                        println!("\t{}", line);
                    }
                }
            }
        }

        Command::Scan { payloads } => {
            for payload in payloads {
                let scan = bench.record_scan(&payload);
                println!("🔔 {}: {}", scan.analysis.label, scan.event.payload);
            }
            println!("\n📜 Scan History");
            for event in bench.ledger().all() {
                println!("{}\t{}\t{}", event.timestamp, event.category.label(), event.payload);
            }
        }

        Command::Wifi { ssid, password, encryption, out } => {
            let payload = wifi_payload(&ssid, &password, encryption)?;
            println!("{}", payload);
            if let Some(out) = out {
                PngRenderer::default().render(&payload, &out)?;
                println!("✔️ Wi-Fi QR for '{}' saved to {}", ssid.trim(), out.display());
            }
        }

        Command::Batch { input, out_dir } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            let summary = run_batch(&text, &out_dir, &PngRenderer::default())?;
            for item in &summary.failed {
                eprintln!("⚠️  Line {} skipped: could not encode '{}'", item.line_number, item.payload);
            }
            println!(
                "✔️ {} QR codes generated in '{}'.",
                summary.rendered.len(),
                summary.output_dir.display()
            );
        }

        Command::Theme { name } => match name {
            None => println!("{}", bench.config().theme),
            Some(name) => {
                if name.trim().is_empty() {
                    bail!("Theme name must not be empty");
                }
                bench.config_mut().theme = name.trim().to_string();
                bench.config().save(config_path)?;
                println!("✔️ Theme changed to '{}'.", bench.config().theme);
            }
        },
    }

    Ok(())
}

/// Catalog mutations keep their in-memory change when the save fails; say so
fn saved<T>(result: Result<T, StoreError>) -> Result<T> {
    result.map_err(|err| {
        if err.is_storage() {
            eprintln!("⚠️  The change was applied but could not be saved to disk.");
        }
        err.into()
    })
}
