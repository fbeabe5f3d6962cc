//! DnDSort Core Library
//!
//! Platform-agnostic engine for pointer-driven list reordering with FLIP
//! style transitions. Rendering hosts plug in through [`host::Host`].

pub mod config;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod identity;
pub mod input;
pub mod interaction;
pub mod notify;
pub mod sim;
pub mod task;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Reorder, RenderItem, ReorderEngine, TrackedElement};
pub use hit_test::{Candidate, HitTestStrategy, Probe};
pub use host::{Cursor, Document, Host, Surface, Timing, Transition};
pub use identity::{ItemKey, KeyGenerator, KeyRegistry, UuidKeys};
pub use input::{InputModality, PointerInput, PointerKind};
pub use interaction::InteractionGuard;
pub use notify::ReorderQueue;
pub use task::Deferred;
