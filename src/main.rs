//! Binary entry point: read settings, start logging, open the store, and hand
//! control to the TUI.
use anyhow::Context;
use routine_tracker::logging::init_logging;
use routine_tracker::{run_app, App, AppConfig, SqliteStore};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("routine-tracker-io")
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let database = config.database_path();
    info!(path = %database.display(), "opening routine database");
    let store = SqliteStore::open(&database)?;

    let mut app = App::new(runtime.handle().clone(), store, &config);
    app.load()?;
    let result = run_app(&mut app);

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    info!("routine tracker exited");
    result
}
