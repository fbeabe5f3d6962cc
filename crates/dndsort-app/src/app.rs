//! Demo application: a column of items driven by a drag script.

use crate::script::{DragScript, Step};
use dndsort_core::sim::{ColumnLayout, SimHost, SimList};
use dndsort_core::{ConfigError, EngineConfig, Reorder, ReorderEngine};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Number of items in the default list.
pub const DEFAULT_ITEM_COUNT: usize = 10;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Items are labelled "0", "1", ... in initial order.
    pub items: usize,
    pub script: DragScript,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            items: DEFAULT_ITEM_COUNT,
            script: DragScript::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// The demo list and its engine.
pub struct App {
    engine: ReorderEngine<String, SimHost>,
    list: SimList,
    script: DragScript,
    reorders: Rc<RefCell<Vec<Reorder>>>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let values: Vec<String> = (0..config.items).map(|i| i.to_string()).collect();
        let reorders: Rc<RefCell<Vec<Reorder>>> = Rc::default();
        let sink = Rc::clone(&reorders);
        let mut engine = ReorderEngine::with_config(values, SimHost::new(), config.engine)
            .on_reorder(move |reorder, values| {
                log::info!(
                    "order changed ({} -> {}): [{}]",
                    reorder.from,
                    reorder.to,
                    values.join(", ")
                );
                sink.borrow_mut().push(reorder.clone());
            });
        let mut list = SimList::new(ColumnLayout::default());
        list.render(&mut engine);

        Self {
            engine,
            list,
            script: config.script,
            reorders,
        }
    }

    /// Replay the script and return the final order.
    pub fn run(&mut self) -> Vec<String> {
        let steps = self.script.steps.clone();
        for step in steps {
            log::debug!("step: {:?}", step);
            match step {
                Step::Grab { index, at } => {
                    let input = self.script.input(at);
                    if !self.list.grab(&mut self.engine, index, &input) {
                        log::warn!("grab on item {} did not start a drag", index);
                    }
                }
                Step::MoveTo { at } => {
                    let input = self.script.input(at);
                    self.list.drag_to(&mut self.engine, &input);
                }
                Step::Wait { ms } => {
                    self.list
                        .pump(&mut self.engine, Duration::from_millis(ms));
                }
                Step::Release { at } => {
                    let input = self.script.release_input(at);
                    self.engine.release(&input);
                }
            }
        }
        self.engine.values().to_vec()
    }

    /// Reorders committed so far.
    pub fn reorders(&self) -> Vec<Reorder> {
        self.reorders.borrow().clone()
    }

    pub fn engine(&self) -> &ReorderEngine<String, SimHost> {
        &self.engine
    }
}
