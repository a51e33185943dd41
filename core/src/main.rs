// PAYGRADE - Salary Classification Core
// Loads the trained classifier artifact and serves predictions to the
// hosting UI until shutdown.

use std::sync::Arc;

use tokio::sync::oneshot;

use paygrade_core::config::CoreConfig;
use paygrade_core::http::{self, ApiState};
use paygrade_core::ml::load_model;
use paygrade_core::telemetry::TelemetryStore;

fn main() {
    let _ = env_logger::try_init();

    if let Err(error) = run() {
        eprintln!("[PAYGRADE] {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(CoreConfig::from_env());

    // No predictions can happen without a loaded model; bail out before
    // binding the API.
    let model = match load_model(&config.model_path) {
        Ok(model) => model,
        Err(error) => {
            return Err(format!("Error loading model: {}", error).into());
        }
    };

    println!("==========================================");
    println!("=   PAYGRADE - SALARY CLASSIFICATION     =");
    println!("==========================================");
    println!(
        "[OK] Model: {} classes, {} input columns",
        model.classes().len(),
        model.n_features()
    );
    println!("[OK] Artifact: {}", config.model_path.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let telemetry = Arc::new(TelemetryStore::new());
        let state = ApiState {
            model: Arc::new(model),
            telemetry: Arc::clone(&telemetry),
            config: Arc::clone(&config),
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                eprintln!("[PAYGRADE] Failed to listen for shutdown: {}", error);
            }
            let _ = shutdown_tx.send(());
        });

        let api_addr =
            std::env::var("PAYGRADE_API_ADDR").unwrap_or_else(|_| "127.0.0.1:8090".to_string());
        println!("[OK] API: listening on {}\n", api_addr);

        let api_handle = tokio::spawn(async move {
            if let Err(error) = http::serve(api_addr, state).await {
                eprintln!("[API] Server error: {}", error);
            }
        });

        let _ = shutdown_rx.await;

        let stats = telemetry.snapshot_stats().await;
        println!(
            "\n[PAYGRADE] Shutting down: single={}, batches={}, rows={}, failures={}",
            stats.single_predictions, stats.batch_runs, stats.batch_rows, stats.failures
        );
        api_handle.abort();
    });

    Ok(())
}
