// QuantumLink - Web Server
// JSON API over the product catalog and scan history

use anyhow::{Context, Result};
use quantumlink::api::{router, AppState};
use quantumlink::{init_logging, AppConfig, Workbench};
use tracing::{info, warn};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = AppConfig::default_path();
    let config = AppConfig::try_load(&config_path);
    let config_error = config.as_ref().err().cloned();
    let config = config.unwrap_or_default();

    init_logging(&config.log_level);
    if let Some(err) = config_error {
        warn!(error = %err, "using default configuration");
    }

    println!("🌐 QuantumLink - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let addr = config.server_addr.clone();
    let mut bench = Workbench::open(config);
    if let Some(notice) = bench.take_notice() {
        eprintln!("⚠️  Catalog could not be read, starting empty: {}", notice);
    }
    println!(
        "✓ Catalog opened: {} ({} products)",
        bench.catalog().path().display(),
        bench.catalog().len()
    );

    let app = router(AppState::new(bench));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/products", addr);
    println!("\n   Press Ctrl+C to stop\n");
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
