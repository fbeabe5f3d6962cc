//! Main application entry point (native).

#[cfg(not(target_arch = "wasm32"))]
use dndsort_app::{App, AppConfig, AppError};
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Environment variable naming a JSON config file.
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_ENV: &str = "DNDSORT_CONFIG";

#[cfg(not(target_arch = "wasm32"))]
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from)
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), AppError> {
    let config = match config_path() {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };

    let mut app = App::new(config);
    let order = app.run();
    log::info!(
        "Final order after {} reorder(s): [{}]",
        app.reorders().len(),
        order.join(", ")
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Starting DnDSort");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build starts from `dndsort_app::run_wasm`.
}
