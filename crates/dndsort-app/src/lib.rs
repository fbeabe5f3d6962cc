//! DnDSort demo: replays scripted drags against a simulated column.

mod app;
mod script;

pub use app::{App, AppConfig, AppError, DEFAULT_ITEM_COUNT};
pub use script::{DragScript, Step};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebDemo, run_wasm};
