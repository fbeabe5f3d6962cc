//! Reorder notifications delivered outside the engine borrow.
//!
//! Hosts that share the engine as `Rc<RefCell<_>>` cannot let the owner's
//! callback run inside `pointer_move`: an owner that re-renders from the
//! callback would need the engine again. The engine is given
//! [`ReorderQueue::sink`] instead, and the host calls
//! [`ReorderQueue::flush`] once its borrow has ended.

use crate::engine::Reorder;
use std::cell::RefCell;
use std::rc::Rc;

type Callback<T> = Box<dyn FnMut(&Reorder, &[T])>;

/// Reorders waiting for the owner.
pub struct ReorderQueue<T> {
    pending: RefCell<Vec<(Reorder, Vec<T>)>>,
    callback: RefCell<Callback<T>>,
}

impl<T: Clone + 'static> ReorderQueue<T> {
    pub fn new(callback: impl FnMut(&Reorder, &[T]) + 'static) -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(Vec::new()),
            callback: RefCell::new(Box::new(callback)),
        })
    }

    /// Callback for [`ReorderEngine::on_reorder`](crate::ReorderEngine::on_reorder)
    /// that only records the reorder.
    pub fn sink(self: &Rc<Self>) -> impl FnMut(&Reorder, &[T]) + use<T> {
        let queue = Rc::clone(self);
        move |reorder: &Reorder, values: &[T]| {
            queue
                .pending
                .borrow_mut()
                .push((reorder.clone(), values.to_vec()));
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Hand queued reorders to the owner, oldest first.
    pub fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let Ok(mut callback) = self.callback.try_borrow_mut() else {
            log::warn!("{} reorder notification(s) dropped: owner callback busy", pending.len());
            return;
        };
        for (reorder, values) in &pending {
            callback(reorder, values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerInput;
    use crate::sim::{ColumnLayout, SimHost, SimList};
    use crate::ReorderEngine;

    type Shared = Rc<RefCell<ReorderEngine<u32, SimHost>>>;

    #[test]
    fn test_owner_can_rerender_from_callback() {
        let list = Rc::new(RefCell::new(SimList::new(ColumnLayout::default())));
        let engine: Rc<RefCell<Option<Shared>>> = Rc::default();
        let seen: Rc<RefCell<Vec<Vec<u32>>>> = Rc::default();

        let queue = {
            let engine = Rc::clone(&engine);
            let list = Rc::clone(&list);
            let seen = Rc::clone(&seen);
            ReorderQueue::new(move |_reorder, values: &[u32]| {
                seen.borrow_mut().push(values.to_vec());
                if let Some(engine) = engine.borrow().as_ref() {
                    list.borrow_mut().render(&mut *engine.borrow_mut());
                }
            })
        };
        let shared: Shared = Rc::new(RefCell::new(
            ReorderEngine::new(vec![0, 1, 2], SimHost::new()).on_reorder(queue.sink()),
        ));
        *engine.borrow_mut() = Some(Rc::clone(&shared));
        list.borrow_mut().render(&mut *shared.borrow_mut());

        {
            let mut engine = shared.borrow_mut();
            list.borrow_mut()
                .grab(&mut *engine, 0, &PointerInput::mouse(175.0, 29.0));
            assert!(engine.pointer_move(&PointerInput::mouse(175.0, 69.0)).is_some());
            assert_eq!(queue.len(), 1);
            assert!(seen.borrow().is_empty());
        }
        queue.flush();

        assert!(queue.is_empty());
        assert_eq!(*seen.borrow(), vec![vec![1, 0, 2]]);
        let engine = shared.borrow();
        let tracked: Vec<u32> = engine.tracked().iter().map(|element| element.value).collect();
        assert_eq!(tracked, vec![1, 0, 2]);
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let queue = ReorderQueue::<u32>::new(move |_, _| *counter.borrow_mut() += 1);
        queue.flush();
        assert_eq!(*calls.borrow(), 0);
    }
}
