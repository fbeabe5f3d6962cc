//! Scoped suspension of document interaction during a drag.

use crate::host::Document;

/// Keeps document selection and scrolling disabled while alive.
///
/// Interaction is suspended when the guard is created and resumed when it
/// is dropped, whichever way the drag ends.
pub struct InteractionGuard<D: Document> {
    document: D,
}

impl<D: Document> InteractionGuard<D> {
    pub fn acquire(document: D) -> Self {
        document.suspend_interaction();
        Self { document }
    }
}

impl<D: Document> Drop for InteractionGuard<D> {
    fn drop(&mut self) {
        self.document.resume_interaction();
    }
}
