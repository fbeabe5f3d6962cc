//! Abstractions over the rendering host.
//!
//! The engine never owns rendered surfaces or the document. It talks to them
//! through these traits so the same engine runs against the DOM, a native
//! widget tree, or the in-memory [`crate::sim`] host.

use crate::input::InputModality;
use crate::task::Deferred;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pointer cursor shown over a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Grab,
    Grabbing,
}

/// Transform transition enabled after a FLIP settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: u64,
}

/// Non-owning handle to a rendered list item.
///
/// Cloning must be cheap and yield a handle to the same surface.
pub trait Surface: Clone {
    /// Current visual bounding box in viewport coordinates, including any
    /// applied transform. `None` once the surface is no longer mounted.
    fn bounding_box(&self) -> Option<Rect>;

    /// Apply a translation, or clear it with `None`.
    fn set_transform(&self, offset: Option<Vec2>);

    /// Enable a transform transition, or disable it with `None`.
    fn set_transition(&self, transition: Option<Transition>);

    /// Raise the surface above its siblings (stacking and shadow).
    fn set_elevated(&self, elevated: bool);

    fn set_cursor(&self, cursor: Cursor);
}

/// Document-wide interaction state.
pub trait Document {
    /// Disable text selection and scrolling for the whole document.
    fn suspend_interaction(&self);

    /// Restore text selection and scrolling.
    fn resume_interaction(&self);
}

/// When a deferred task should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// After the given delay.
    After(Duration),
    /// Before the next visual paint.
    NextFrame,
}

/// Rendering host the engine is mounted in.
pub trait Host {
    type Surface: Surface;
    type Document: Document;
    /// Registration of drag move/end listeners. Dropping it unregisters them.
    type Subscription;

    fn document(&self) -> Self::Document;

    /// Register move/end listeners for a drag started with `modality` on
    /// `surface`. Touch subscriptions also block native scrolling on the
    /// surface for as long as they live.
    fn subscribe(&self, modality: InputModality, surface: &Self::Surface) -> Self::Subscription;

    /// Run `task` later by handing it back to
    /// [`crate::ReorderEngine::run_deferred`]. Scheduled tasks are never
    /// cancelled.
    fn schedule(&self, timing: Timing, task: Deferred);
}
