//! Deferred continuations scheduled through [`crate::host::Host::schedule`].

use crate::identity::ItemKey;
use serde::{Deserialize, Serialize};

/// Work the engine asked the host to run later.
///
/// Tasks are fire-and-forget: they may arrive after the drag that scheduled
/// them has ended, so each one re-checks engine state when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deferred {
    /// Allow the next collision check.
    ReopenCollisionGate,
    /// Second half of a FLIP: drop the inverse offset and let the item
    /// transition into its new slot.
    Settle { key: ItemKey },
}
