//! In-memory host for headless use and tests.
//!
//! Surfaces are plain rectangles, time is a virtual clock advanced by the
//! caller, and deferred tasks sit in queues until they are due.

use crate::engine::{Reorder, RenderItem, ReorderEngine};
use crate::host::{Cursor, Document, Host, Surface, Timing, Transition};
use crate::identity::ItemKey;
use crate::input::{InputModality, PointerInput};
use crate::task::Deferred;
use kurbo::{Point, Rect, Size, Vec2};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use std::time::Duration;

/// Observable state of a [`SimSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimSurfaceState {
    /// Box assigned by layout, before transforms.
    pub layout: Rect,
    pub transform: Option<Vec2>,
    pub transition: Option<Transition>,
    pub elevated: bool,
    pub cursor: Cursor,
    pub mounted: bool,
}

/// A rectangle standing in for a rendered item.
#[derive(Debug, Clone)]
pub struct SimSurface(Rc<RefCell<SimSurfaceState>>);

impl SimSurface {
    /// Create a mounted surface laid out at `layout`.
    pub fn new(layout: Rect) -> Self {
        Self(Rc::new(RefCell::new(SimSurfaceState {
            layout,
            transform: None,
            transition: None,
            elevated: false,
            cursor: Cursor::Grab,
            mounted: true,
        })))
    }

    pub fn set_layout(&self, layout: Rect) {
        self.0.borrow_mut().layout = layout;
    }

    pub fn unmount(&self) {
        self.0.borrow_mut().mounted = false;
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SimSurfaceState {
        self.0.borrow().clone()
    }

    pub fn transform(&self) -> Option<Vec2> {
        self.0.borrow().transform
    }

    /// Top-left corner as currently drawn.
    pub fn visual_origin(&self) -> Point {
        let state = self.0.borrow();
        let offset = state.transform.unwrap_or(Vec2::ZERO);
        Point::new(state.layout.x0, state.layout.y0) + offset
    }

    /// Check if both handles refer to the same surface.
    pub fn same_surface(&self, other: &SimSurface) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Surface for SimSurface {
    fn bounding_box(&self) -> Option<Rect> {
        let state = self.0.borrow();
        if !state.mounted {
            return None;
        }
        Some(state.layout + state.transform.unwrap_or(Vec2::ZERO))
    }

    fn set_transform(&self, offset: Option<Vec2>) {
        self.0.borrow_mut().transform = offset;
    }

    fn set_transition(&self, transition: Option<Transition>) {
        self.0.borrow_mut().transition = transition;
    }

    fn set_elevated(&self, elevated: bool) {
        self.0.borrow_mut().elevated = elevated;
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.0.borrow_mut().cursor = cursor;
    }
}

/// Document that records whether interaction is suspended.
#[derive(Debug, Clone, Default)]
pub struct SimDocument {
    suspended: Rc<Cell<bool>>,
    suspensions: Rc<Cell<u32>>,
}

impl SimDocument {
    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }

    /// Total number of suspensions so far.
    pub fn suspensions(&self) -> u32 {
        self.suspensions.get()
    }
}

impl Document for SimDocument {
    fn suspend_interaction(&self) {
        self.suspended.set(true);
        self.suspensions.set(self.suspensions.get() + 1);
    }

    fn resume_interaction(&self) {
        self.suspended.set(false);
    }
}

#[derive(Debug, Default)]
struct SimHostState {
    now: Duration,
    timers: Vec<(Duration, Deferred)>,
    frame: Vec<Deferred>,
    subscriptions: Vec<(u64, InputModality)>,
    next_subscription: u64,
}

/// Host with a virtual clock. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SimHost {
    state: Rc<RefCell<SimHostState>>,
    document: SimDocument,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Move the clock forward and return the timers that became due, in
    /// due order.
    pub fn advance(&self, elapsed: Duration) -> Vec<Deferred> {
        let mut state = self.state.borrow_mut();
        state.now += elapsed;
        let now = state.now;
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.timers)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        state.timers = pending;
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, task)| task).collect()
    }

    /// Take the tasks waiting for the next frame.
    pub fn take_frame(&self) -> Vec<Deferred> {
        std::mem::take(&mut self.state.borrow_mut().frame)
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frame_tasks(&self) -> usize {
        self.state.borrow().frame.len()
    }

    /// Modalities with live listener subscriptions.
    pub fn active_subscriptions(&self) -> Vec<InputModality> {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .map(|(_, modality)| *modality)
            .collect()
    }

    /// Handle to the shared document.
    pub fn sim_document(&self) -> SimDocument {
        self.document.clone()
    }
}

/// Listener registration on a [`SimHost`].
#[derive(Debug)]
pub struct SimSubscription {
    id: u64,
    state: Rc<RefCell<SimHostState>>,
}

impl Drop for SimSubscription {
    fn drop(&mut self) {
        self.state
            .borrow_mut()
            .subscriptions
            .retain(|(id, _)| *id != self.id);
    }
}

impl Host for SimHost {
    type Surface = SimSurface;
    type Document = SimDocument;
    type Subscription = SimSubscription;

    fn document(&self) -> SimDocument {
        self.document.clone()
    }

    fn subscribe(&self, modality: InputModality, _surface: &SimSurface) -> SimSubscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscriptions.push((id, modality));
        SimSubscription {
            id,
            state: Rc::clone(&self.state),
        }
    }

    fn schedule(&self, timing: Timing, task: Deferred) {
        let mut state = self.state.borrow_mut();
        match timing {
            Timing::After(delay) => {
                let at = state.now + delay;
                state.timers.push((at, task));
            }
            Timing::NextFrame => state.frame.push(task),
        }
    }
}

/// Vertical stack of equally sized items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub origin: Point,
    pub item_size: Size,
    pub gap: f64,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            item_size: Size::new(350.0, 58.0),
            gap: 16.0,
        }
    }
}

impl ColumnLayout {
    /// Layout box of the item at `index`.
    pub fn slot(&self, index: usize) -> Rect {
        let y = self.origin.y + index as f64 * (self.item_size.height + self.gap);
        Rect::from_origin_size(Point::new(self.origin.x, y), self.item_size)
    }
}

/// Renders an engine's items into a [`ColumnLayout`] of sim surfaces.
#[derive(Debug, Default)]
pub struct SimList {
    layout: ColumnLayout,
    surfaces: HashMap<ItemKey, SimSurface>,
}

impl SimList {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            surfaces: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn surface(&self, key: &ItemKey) -> Option<&SimSurface> {
        self.surfaces.get(key)
    }

    /// Lay items out in engine order and attach every surface.
    pub fn render<T>(&mut self, engine: &mut ReorderEngine<T, SimHost>) -> Vec<RenderItem<T>>
    where
        T: Eq + Hash + Clone,
    {
        let items = engine.render_items();
        for (index, item) in items.iter().enumerate() {
            let slot = self.layout.slot(index);
            let surface = self
                .surfaces
                .entry(item.key.clone())
                .or_insert_with(|| SimSurface::new(slot))
                .clone();
            surface.set_layout(slot);
            engine.attach(item, Some(surface));
        }
        items
    }

    /// Press on the item rendered at `index`. Returns whether a drag started.
    pub fn grab<T>(
        &mut self,
        engine: &mut ReorderEngine<T, SimHost>,
        index: usize,
        input: &PointerInput,
    ) -> bool
    where
        T: Eq + Hash + Clone,
    {
        let items = engine.render_items();
        let Some(item) = items.get(index) else {
            return false;
        };
        let Some(surface) = self.surfaces.get(&item.key).cloned() else {
            return false;
        };
        engine.grab_start(item, surface, input);
        engine.dragged_key() == Some(&item.key)
    }

    /// Forward a move event and re-render if it committed a reorder.
    pub fn drag_to<T>(
        &mut self,
        engine: &mut ReorderEngine<T, SimHost>,
        input: &PointerInput,
    ) -> Option<Reorder>
    where
        T: Eq + Hash + Clone,
    {
        let reorder = engine.pointer_move(input);
        if reorder.is_some() {
            self.render(engine);
        }
        reorder
    }

    /// Advance the clock, then run due timers and the next frame's tasks.
    pub fn pump<T>(&mut self, engine: &mut ReorderEngine<T, SimHost>, elapsed: Duration)
    where
        T: Eq + Hash + Clone,
    {
        let due = engine.host().advance(elapsed);
        for task in due {
            engine.run_deferred(task);
        }
        let frame = engine.host().take_frame();
        for task in frame {
            engine.run_deferred(task);
        }
    }
}
