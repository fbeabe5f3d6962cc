//! The reorder engine: drag lifecycle, geometry cache and list mutation.
//!
//! One engine is mounted per sortable list. The host renders
//! [`ReorderEngine::render_items`] in order, reports each item's surface
//! through [`ReorderEngine::attach`], and forwards pointer events while a
//! drag is active. Committed moves are reported through the
//! [`ReorderEngine::on_reorder`] callback and the return value of
//! [`ReorderEngine::pointer_move`].

use crate::config::EngineConfig;
use crate::geometry::{is_negligible, offset_between, top_left};
use crate::hit_test::{Candidate, Probe};
use crate::host::{Cursor, Host, Surface, Timing};
use crate::identity::{ItemKey, KeyGenerator, KeyRegistry};
use crate::input::{InputModality, PointerInput};
use crate::interaction::InteractionGuard;
use crate::task::Deferred;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// One entry of the sequence the host must render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderItem<T> {
    pub key: ItemKey,
    pub value: T,
}

/// Last known geometry of a mounted item.
#[derive(Debug, Clone)]
pub struct TrackedElement<T, S> {
    pub key: ItemKey,
    pub value: T,
    /// Top-left of the untransformed layout box.
    pub position: Point,
    pub surface: S,
}

/// A committed move of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reorder {
    pub key: ItemKey,
    /// Index before the move.
    pub from: usize,
    /// Index after the move.
    pub to: usize,
}

type ReorderCallback<T> = Box<dyn FnMut(&Reorder, &[T])>;

/// State of the item held by the pointer.
struct DragSession<H: Host> {
    key: ItemKey,
    surface: H::Surface,
    modality: InputModality,
    /// Where the item is drawn relative to `anchor`, as a top-left corner.
    origin: Point,
    /// Pointer position the drag offset is measured from.
    anchor: Point,
    last_pointer: Point,
    // Released on drop, in declaration order.
    _subscription: H::Subscription,
    _interaction: InteractionGuard<H::Document>,
}

impl<H: Host> DragSession<H> {
    /// Translation that keeps the item under the pointer, given its current
    /// layout position.
    fn offset(&self, layout: Point) -> Vec2 {
        (self.origin - layout) + (self.last_pointer - self.anchor)
    }
}

/// Drag-and-reorder engine for one list.
pub struct ReorderEngine<T, H: Host> {
    host: H,
    config: EngineConfig,
    keys: KeyRegistry<T>,
    /// Committed order, as last emitted.
    values: Vec<T>,
    /// Mounted items in visual order.
    tracked: Vec<TrackedElement<T, H::Surface>>,
    drag: Option<DragSession<H>>,
    collision_gate_open: bool,
    /// Slot vacated by the last commit of the current drag.
    bounce_slot: Option<usize>,
    on_reorder: Option<ReorderCallback<T>>,
}

impl<T, H> ReorderEngine<T, H>
where
    T: Eq + Hash + Clone,
    H: Host,
{
    /// Create an engine with the default configuration.
    pub fn new(values: impl Into<Vec<T>>, host: H) -> Self {
        Self::with_config(values, host, EngineConfig::default())
    }

    pub fn with_config(values: impl Into<Vec<T>>, host: H, config: EngineConfig) -> Self {
        let mut engine = Self {
            host,
            config,
            keys: KeyRegistry::new(),
            values: values.into(),
            tracked: Vec::new(),
            drag: None,
            collision_gate_open: true,
            bounce_slot: None,
            on_reorder: None,
        };
        engine.mint_keys();
        engine
    }

    /// Replace the key source. Call before the first render; keys minted
    /// earlier are discarded.
    pub fn with_key_generator(mut self, generator: impl KeyGenerator + 'static) -> Self {
        self.keys = KeyRegistry::with_generator(generator);
        self.mint_keys();
        self
    }

    /// Provide a callback invoked after every committed reorder with the
    /// new full order.
    pub fn on_reorder(mut self, on_reorder: impl FnMut(&Reorder, &[T]) + 'static) -> Self {
        self.on_reorder = Some(Box::new(on_reorder));
        self
    }

    fn mint_keys(&mut self) {
        for value in &self.values {
            self.keys.key_for(value);
        }
    }

    /// Items to render, in the engine's current order.
    pub fn render_items(&mut self) -> Vec<RenderItem<T>> {
        let mut items = Vec::with_capacity(self.values.len());
        for value in &self.values {
            items.push(RenderItem {
                key: self.keys.key_for(value),
                value: value.clone(),
            });
        }
        items
    }

    /// Committed order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn tracked(&self) -> &[TrackedElement<T, H::Surface>] {
        &self.tracked
    }

    /// Key of the item currently held by the pointer.
    pub fn dragged_key(&self) -> Option<&ItemKey> {
        self.drag.as_ref().map(|drag| &drag.key)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer position drag offsets are currently measured from.
    pub fn pointer_anchor(&self) -> Option<Point> {
        self.drag.as_ref().map(|drag| drag.anchor)
    }

    pub fn collision_gate_open(&self) -> bool {
        self.collision_gate_open
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn tracked_index(&self, key: &ItemKey) -> Option<usize> {
        self.tracked.iter().position(|element| &element.key == key)
    }

    /// Position in committed order, or past the end for unknown values.
    fn rank(&self, value: &T) -> usize {
        self.values
            .iter()
            .position(|candidate| candidate == value)
            .unwrap_or(self.values.len())
    }

    /// Index in `tracked` that keeps mounted items in committed order.
    fn mount_slot(&self, value: &T) -> usize {
        let rank = self.rank(value);
        self.tracked
            .iter()
            .position(|element| self.rank(&element.value) > rank)
            .unwrap_or(self.tracked.len())
    }

    /// Whether `tracked` mirrors `values` one to one.
    fn tracked_in_committed_order(&self) -> bool {
        self.tracked.len() == self.values.len()
            && self
                .tracked
                .iter()
                .zip(&self.values)
                .all(|(element, value)| &element.value == value)
    }

    /// Record an item's surface after it mounts or re-renders.
    ///
    /// Siblings that moved get an inverse offset now and settle into their
    /// new slot on the next frame. The dragged item is re-based so it stays
    /// under the pointer. `None` or an unmounted surface is ignored.
    pub fn attach(&mut self, item: &RenderItem<T>, surface: Option<H::Surface>) {
        let Some(surface) = surface else {
            log::trace!("attach ignored for {}: no surface", item.key);
            return;
        };

        surface.set_transform(None);
        let Some(bounds) = surface.bounding_box() else {
            log::trace!("attach ignored for {}: surface not mounted", item.key);
            return;
        };
        let position = top_left(bounds);

        let Some(index) = self.tracked_index(&item.key) else {
            let slot = self.mount_slot(&item.value);
            if self.drag.is_some() {
                self.bounce_slot = None;
            }
            self.tracked.insert(
                slot,
                TrackedElement {
                    key: item.key.clone(),
                    value: item.value.clone(),
                    position,
                    surface,
                },
            );
            return;
        };

        match self.drag.as_mut().filter(|drag| drag.key == item.key) {
            Some(drag) => {
                let delta = offset_between(drag.origin, position);
                drag.anchor = drag.anchor - delta;
                drag.origin = position;
                drag.surface = surface.clone();
                let offset = drag.offset(position);
                surface.set_transform((!is_negligible(offset)).then_some(offset));
            }
            None => {
                let delta = offset_between(self.tracked[index].position, position);
                if !is_negligible(delta) {
                    surface.set_transition(None);
                    surface.set_transform(Some(delta));
                    self.host.schedule(
                        Timing::NextFrame,
                        Deferred::Settle {
                            key: item.key.clone(),
                        },
                    );
                }
            }
        }

        self.tracked[index] = TrackedElement {
            key: item.key.clone(),
            value: item.value.clone(),
            position,
            surface,
        };
    }

    /// Start dragging `item` from a press on `surface`.
    ///
    /// Ignored while another drag is active, and when the item has not been
    /// attached yet.
    pub fn grab_start(&mut self, item: &RenderItem<T>, surface: H::Surface, input: &PointerInput) {
        if let Some(drag) = &self.drag {
            log::trace!("grab on {} ignored: {} is already dragged", item.key, drag.key);
            return;
        }
        let Some(pointer) = input.position() else {
            return;
        };
        if self.tracked_index(&item.key).is_none() {
            log::trace!("grab on {} ignored: item not attached", item.key);
            return;
        }
        let Some(bounds) = surface.bounding_box() else {
            log::trace!("grab on {} ignored: surface not mounted", item.key);
            return;
        };

        surface.set_transition(None);
        surface.set_elevated(true);
        surface.set_cursor(Cursor::Grabbing);

        let modality = input.modality();
        let subscription = self.host.subscribe(modality, &surface);
        let interaction = InteractionGuard::acquire(self.host.document());

        log::debug!("drag start: {} ({:?}) at {:?}", item.key, modality, pointer);
        self.bounce_slot = None;
        self.drag = Some(DragSession {
            key: item.key.clone(),
            surface,
            modality,
            origin: top_left(bounds),
            anchor: pointer,
            last_pointer: pointer,
            _subscription: subscription,
            _interaction: interaction,
        });
    }

    /// Follow the pointer and, when the collision gate is open, try to move
    /// the dragged item into the slot it hovers.
    pub fn pointer_move(&mut self, input: &PointerInput) -> Option<Reorder> {
        let Some(drag) = self.drag.as_mut() else {
            log::trace!("move ignored: no active drag");
            return None;
        };
        if input.modality() != drag.modality {
            log::trace!("move ignored: {:?} event during {:?} drag", input.modality(), drag.modality);
            return None;
        }
        let pointer = input.position()?;
        drag.last_pointer = pointer;

        let layout = self
            .tracked
            .iter()
            .find(|element| element.key == drag.key)
            .map(|element| element.position)
            .unwrap_or(drag.origin);
        drag.surface.set_transform(Some(drag.offset(layout)));
        drag.surface.set_elevated(true);
        drag.surface.set_cursor(Cursor::Grabbing);

        if !self.collision_gate_open {
            return None;
        }
        self.collision_gate_open = false;
        self.host.schedule(
            Timing::After(self.config.collision_interval()),
            Deferred::ReopenCollisionGate,
        );

        self.resolve(pointer)
    }

    fn resolve(&mut self, pointer: Point) -> Option<Reorder> {
        let drag = self.drag.as_ref()?;
        let dragged_index = self.tracked_index(&drag.key)?;
        let dragged = drag.surface.bounding_box()?;

        if !self.tracked_in_committed_order() {
            log::trace!(
                "collision check skipped: {} of {} items mounted in order",
                self.tracked.len(),
                self.values.len()
            );
            return None;
        }

        let candidates: Vec<Candidate> = self
            .tracked
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != dragged_index)
            .filter_map(|(index, element)| {
                element
                    .surface
                    .bounding_box()
                    .map(|bounds| Candidate { index, bounds })
            })
            .collect();

        let probe = Probe {
            pointer,
            dragged,
            dragged_index,
            candidates: &candidates,
        };
        let Some(target) = self.config.hit_test.resolve(&probe) else {
            self.bounce_slot = None;
            return None;
        };

        if target == dragged_index {
            return None;
        }
        if self.config.suppress_bounce && self.bounce_slot == Some(target) {
            log::trace!("target {} ignored: slot just vacated", target);
            return None;
        }

        Some(self.commit(dragged_index, target, pointer))
    }

    fn commit(&mut self, from: usize, to: usize, pointer: Point) -> Reorder {
        let element = self.tracked.remove(from);
        self.tracked.insert(to, element);

        let value = self.values.remove(from);
        self.values.insert(to, value);

        let key = self.tracked[to].key.clone();
        if let Some(drag) = self.drag.as_mut() {
            drag.anchor = pointer;
            if let Some(bounds) = drag.surface.bounding_box() {
                drag.origin = top_left(bounds);
            }
        }
        self.bounce_slot = Some(from);

        let reorder = Reorder { key, from, to };
        log::debug!("reorder: {} moved {} -> {}", reorder.key, from, to);

        if let Some(on_reorder) = self.on_reorder.as_mut() {
            on_reorder(&reorder, &self.values);
        }
        reorder
    }

    /// End the drag. Always restores the dragged surface and the document.
    pub fn release(&mut self, input: &PointerInput) {
        let Some(drag) = self.drag.as_ref() else {
            log::trace!("release ignored: no active drag");
            return;
        };
        if input.modality() != drag.modality {
            log::trace!("release ignored: {:?} event during {:?} drag", input.modality(), drag.modality);
            return;
        }
        if let Some(drag) = self.drag.take() {
            drag.surface.set_transform(None);
            drag.surface.set_elevated(false);
            drag.surface.set_cursor(Cursor::Grab);
            log::debug!("drag end: {}", drag.key);
        }
    }

    /// Run a task previously handed to [`Host::schedule`].
    pub fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::ReopenCollisionGate => {
                self.collision_gate_open = true;
            }
            Deferred::Settle { key } => {
                if self.drag.as_ref().is_some_and(|drag| drag.key == key) {
                    log::trace!("settle skipped for {}: item is dragged", key);
                    return;
                }
                let Some(element) = self.tracked.iter().find(|element| element.key == key) else {
                    log::trace!("settle skipped for {}: item no longer tracked", key);
                    return;
                };
                element.surface.set_transform(None);
                element.surface.set_transition(Some(self.config.transition()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitTestStrategy;
    use crate::sim::{ColumnLayout, SimHost, SimList, SimSurface};
    use kurbo::{Rect, Size};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(150);

    fn mounted(values: Vec<u32>) -> (ReorderEngine<u32, SimHost>, SimList) {
        let mut engine = ReorderEngine::new(values, SimHost::new());
        let mut list = SimList::new(ColumnLayout::default());
        list.render(&mut engine);
        (engine, list)
    }

    fn moved(previous: &[u32], from: usize, to: usize) -> Vec<u32> {
        let mut expected = previous.to_vec();
        let value = expected.remove(from);
        expected.insert(to, value);
        expected
    }

    #[test]
    fn test_first_render_tracks_every_item() {
        let (engine, list) = mounted((0..10).collect());
        assert_eq!(engine.tracked().len(), 10);
        for (index, element) in engine.tracked().iter().enumerate() {
            assert_eq!(element.value, index as u32);
            let slot = list.layout().slot(index);
            assert!((element.position.y - slot.y0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_drag_item_past_three_siblings() {
        let (mut engine, mut list) = mounted((0..10).collect());
        assert!(list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0)));

        let mut reorders = Vec::new();
        for y in [69.0, 149.0, 229.0] {
            let previous = engine.values().to_vec();
            if let Some(reorder) = list.drag_to(&mut engine, &PointerInput::mouse(175.0, y)) {
                assert_eq!(engine.values(), moved(&previous, reorder.from, reorder.to).as_slice());
                reorders.push((reorder.from, reorder.to));
            }
            list.pump(&mut engine, TICK);
        }
        engine.release(&PointerInput::mouse(175.0, 229.0));

        assert_eq!(reorders, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(engine.values(), &[1, 2, 3, 0, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_dragged_item_stays_under_pointer_across_reorder() {
        let (mut engine, mut list) = mounted((0..4).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        let key = engine.dragged_key().cloned().unwrap();

        list.drag_to(&mut engine, &PointerInput::mouse(175.0, 69.0)).unwrap();
        let surface = list.surface(&key).unwrap().clone();
        // Re-laid out into slot 1 but still drawn where the pointer left it.
        assert!((surface.state().layout.y0 - 74.0).abs() < f64::EPSILON);
        assert!((surface.visual_origin().y - 40.0).abs() < f64::EPSILON);

        list.pump(&mut engine, TICK);
        engine.pointer_move(&PointerInput::mouse(175.0, 79.0));
        assert!((surface.visual_origin().y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_displaced_sibling_flips_then_settles() {
        let (mut engine, mut list) = mounted((0..4).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        list.drag_to(&mut engine, &PointerInput::mouse(175.0, 69.0)).unwrap();

        let sibling = engine.tracked()[0].key.clone();
        let surface = list.surface(&sibling).unwrap().clone();
        assert_eq!(surface.transform(), Some(Vec2::new(0.0, 74.0)));
        assert_eq!(surface.state().transition, None);
        assert_eq!(engine.host().pending_frame_tasks(), 1);

        list.pump(&mut engine, Duration::ZERO);
        assert_eq!(surface.transform(), None);
        assert_eq!(surface.state().transition, Some(engine.config().transition()));
    }

    #[test]
    fn test_point_containment_targets_hovered_sibling() {
        let layout = ColumnLayout {
            origin: Point::new(80.0, 30.0),
            item_size: Size::new(70.0, 50.0),
            gap: 10.0,
        };
        let config = EngineConfig {
            hit_test: HitTestStrategy::PointContainment,
            suppress_bounce: false,
            ..EngineConfig::default()
        };
        let mut engine = ReorderEngine::with_config(vec!["a", "b"], SimHost::new(), config);
        let mut list = SimList::new(layout);
        list.render(&mut engine);
        assert_eq!(layout.slot(1), Rect::new(80.0, 90.0, 150.0, 140.0));

        list.grab(&mut engine, 0, &PointerInput::mouse(100.0, 100.0));
        let reorder = list.drag_to(&mut engine, &PointerInput::mouse(100.0, 120.0));
        assert_eq!(reorder.map(|r| (r.from, r.to)), Some((0, 1)));
        assert_eq!(engine.values(), &["b", "a"]);

        list.pump(&mut engine, TICK);
        assert!(list.drag_to(&mut engine, &PointerInput::mouse(500.0, 500.0)).is_none());
        assert_eq!(engine.values(), &["b", "a"]);
    }

    #[test]
    fn test_release_restores_rest_state_without_reorder() {
        let (mut engine, mut list) = mounted((0..3).collect());
        let document = engine.host().sim_document();
        list.grab(&mut engine, 1, &PointerInput::mouse(175.0, 103.0));
        let key = engine.dragged_key().cloned().unwrap();
        let surface = list.surface(&key).unwrap().clone();

        assert!(document.is_suspended());
        assert_eq!(engine.host().active_subscriptions(), vec![InputModality::Mouse]);
        engine.pointer_move(&PointerInput::mouse(180.0, 105.0));
        assert!(surface.state().elevated);
        assert_eq!(surface.state().cursor, Cursor::Grabbing);

        engine.release(&PointerInput::mouse(180.0, 105.0));

        assert!(!engine.is_dragging());
        assert!(engine.dragged_key().is_none());
        assert!(!document.is_suspended());
        assert!(engine.host().active_subscriptions().is_empty());
        let state = surface.state();
        assert_eq!(state.transform, None);
        assert!(!state.elevated);
        assert_eq!(state.cursor, Cursor::Grab);
        assert_eq!(engine.values(), &[0, 1, 2]);
    }

    #[test]
    fn test_duplicate_values_share_key() {
        let mut engine = ReorderEngine::new(vec![7, 7, 8], SimHost::new());
        let items = engine.render_items();
        assert_eq!(items[0].key, items[1].key);
        assert_ne!(items[0].key, items[2].key);

        let mut list = SimList::new(ColumnLayout::default());
        list.render(&mut engine);
        assert_eq!(engine.tracked().len(), 2);

        // Rendered and committed orders cannot be aligned, so no reorder.
        list.grab(&mut engine, 2, &PointerInput::mouse(175.0, 177.0));
        assert!(list.drag_to(&mut engine, &PointerInput::mouse(175.0, 120.0)).is_none());
        assert_eq!(engine.values(), &[7, 7, 8]);
    }

    #[test]
    fn test_keys_survive_reorders() {
        let (mut engine, mut list) = mounted((0..6).collect());
        let before: HashMap<u32, ItemKey> = engine
            .render_items()
            .into_iter()
            .map(|item| (item.value, item.key))
            .collect();

        for (index, y) in [(0, 29.0), (5, 399.0), (2, 177.0)] {
            list.grab(&mut engine, index, &PointerInput::mouse(175.0, y));
            for step in 1..=6 {
                let dy = if index == 5 { -40.0 } else { 40.0 };
                list.drag_to(&mut engine, &PointerInput::mouse(175.0, y + dy * step as f64));
                list.pump(&mut engine, TICK);
            }
            engine.release(&PointerInput::mouse(0.0, 0.0));
        }

        assert_ne!(engine.values(), &[0, 1, 2, 3, 4, 5]);
        for item in engine.render_items() {
            assert_eq!(before[&item.value], item.key);
        }
    }

    #[test]
    fn test_second_render_is_idempotent() {
        let (mut engine, mut list) = mounted((0..5).collect());
        let positions: Vec<Point> = engine.tracked().iter().map(|e| e.position).collect();

        list.render(&mut engine);

        assert_eq!(engine.host().pending_frame_tasks(), 0);
        for (element, position) in engine.tracked().iter().zip(&positions) {
            assert_eq!(element.position, *position);
            assert_eq!(list.surface(&element.key).unwrap().transform(), None);
        }
    }

    #[test]
    fn test_dragged_rerender_does_not_drift() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        let key = engine.dragged_key().cloned().unwrap();
        let surface = list.surface(&key).unwrap().clone();
        engine.pointer_move(&PointerInput::mouse(180.0, 39.0));
        let anchor = engine.pointer_anchor();
        let origin = surface.visual_origin();

        list.render(&mut engine);
        list.render(&mut engine);

        assert_eq!(engine.pointer_anchor(), anchor);
        assert_eq!(surface.visual_origin(), origin);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let (mut engine, _list) = mounted((0..3).collect());
        assert!(engine.pointer_move(&PointerInput::mouse(175.0, 100.0)).is_none());
        assert_eq!(engine.host().pending_timers(), 0);
        assert!(engine.collision_gate_open());
        assert_eq!(engine.values(), &[0, 1, 2]);
    }

    #[test]
    fn test_stray_release_is_ignored() {
        let (mut engine, _list) = mounted((0..3).collect());
        engine.release(&PointerInput::mouse(0.0, 0.0));
        assert_eq!(engine.host().sim_document().suspensions(), 0);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_collision_checks_are_throttled() {
        let (mut engine, mut list) = mounted((0..10).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));

        let mut committed = 0;
        for step in 1..=20 {
            let y = 29.0 + step as f64 * 10.0;
            if list.drag_to(&mut engine, &PointerInput::mouse(175.0, y)).is_some() {
                committed += 1;
            }
        }
        assert!(committed <= 1);
        assert_eq!(engine.host().pending_timers(), 1);
        assert!(!engine.collision_gate_open());

        list.pump(&mut engine, Duration::from_millis(149));
        assert!(!engine.collision_gate_open());
        list.pump(&mut engine, Duration::from_millis(1));
        assert!(engine.collision_gate_open());

        list.drag_to(&mut engine, &PointerInput::mouse(175.0, 240.0));
        assert_eq!(engine.host().pending_timers(), 1);
    }

    #[test]
    fn test_gate_reopens_after_drag_ended() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        engine.pointer_move(&PointerInput::mouse(175.0, 30.0));
        engine.release(&PointerInput::mouse(175.0, 30.0));

        list.pump(&mut engine, TICK);
        assert!(engine.collision_gate_open());
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_settle_skips_dragged_and_unknown_keys() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        let key = engine.dragged_key().cloned().unwrap();
        engine.pointer_move(&PointerInput::mouse(175.0, 39.0));
        let surface = list.surface(&key).unwrap().clone();

        engine.run_deferred(Deferred::Settle { key: key.clone() });
        assert_eq!(surface.transform(), Some(Vec2::new(0.0, 10.0)));

        engine.run_deferred(Deferred::Settle {
            key: ItemKey::new("gone"),
        });
        assert_eq!(engine.tracked().len(), 3);
    }

    #[test]
    fn test_attach_without_surface_is_ignored() {
        let mut engine = ReorderEngine::new(vec![1, 2], SimHost::new());
        let items = engine.render_items();

        engine.attach(&items[0], None);
        let unmounted = SimSurface::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        unmounted.unmount();
        engine.attach(&items[1], Some(unmounted));

        assert!(engine.tracked().is_empty());
    }

    #[test]
    fn test_late_mount_keeps_committed_order() {
        let mut engine = ReorderEngine::new(vec![0, 1, 2], SimHost::new());
        let layout = ColumnLayout::default();
        let items = engine.render_items();
        let surfaces: Vec<SimSurface> = (0..3).map(|i| SimSurface::new(layout.slot(i))).collect();

        engine.attach(&items[0], None);
        engine.attach(&items[1], Some(surfaces[1].clone()));
        engine.attach(&items[2], Some(surfaces[2].clone()));
        for (item, surface) in items.iter().zip(&surfaces) {
            engine.attach(item, Some(surface.clone()));
        }
        let tracked: Vec<u32> = engine.tracked().iter().map(|element| element.value).collect();
        assert_eq!(tracked, vec![0, 1, 2]);

        engine.grab_start(&items[1], surfaces[1].clone(), &PointerInput::mouse(175.0, 103.0));
        let reorder = engine.pointer_move(&PointerInput::mouse(175.0, 177.0)).unwrap();

        assert_eq!(reorder.key, items[1].key);
        assert_eq!((reorder.from, reorder.to), (1, 2));
        assert_eq!(engine.values(), &[0, 2, 1]);
        let tracked: Vec<u32> = engine.tracked().iter().map(|element| element.value).collect();
        assert_eq!(tracked, engine.values());
    }

    #[test]
    fn test_grab_requires_attached_item() {
        let mut engine = ReorderEngine::new(vec![1, 2], SimHost::new());
        let items = engine.render_items();
        let surface = SimSurface::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        engine.grab_start(&items[0], surface, &PointerInput::mouse(5.0, 5.0));
        assert!(!engine.is_dragging());
        assert_eq!(engine.host().sim_document().suspensions(), 0);
    }

    #[test]
    fn test_second_grab_is_ignored() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        let first = engine.dragged_key().cloned();
        assert!(!list.grab(&mut engine, 1, &PointerInput::mouse(175.0, 103.0)));
        assert_eq!(engine.dragged_key().cloned(), first);
        assert_eq!(engine.host().sim_document().suspensions(), 1);
    }

    #[test]
    fn test_touch_drag_ignores_mouse_events() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::touch(175.0, 29.0));
        assert_eq!(engine.host().active_subscriptions(), vec![InputModality::Touch]);

        assert!(engine.pointer_move(&PointerInput::mouse(175.0, 69.0)).is_none());
        assert!(engine.collision_gate_open());
        engine.release(&PointerInput::mouse(175.0, 69.0));
        assert!(engine.is_dragging());

        let reorder = list.drag_to(&mut engine, &PointerInput::touch(175.0, 69.0));
        assert!(reorder.is_some());
        engine.release(&PointerInput::touch_lifted());
        assert!(!engine.is_dragging());
        assert!(engine.host().active_subscriptions().is_empty());
    }

    #[test]
    fn test_vacated_slot_is_not_retargeted() {
        let (mut engine, mut list) = mounted((0..3).collect());
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        list.drag_to(&mut engine, &PointerInput::mouse(175.0, 69.0)).unwrap();
        assert_eq!(engine.values(), &[1, 0, 2]);

        // Only the timer runs; the displaced sibling is still drawn in slot 1.
        let due = engine.host().advance(TICK);
        for task in due {
            engine.run_deferred(task);
        }
        // Dragged center at 75, displaced sibling still centered at 103.
        assert!(list.drag_to(&mut engine, &PointerInput::mouse(175.0, 75.0)).is_none());
        assert_eq!(engine.values(), &[1, 0, 2]);
    }

    #[test]
    fn test_on_reorder_receives_new_order() {
        let seen: Rc<RefCell<Vec<(Reorder, Vec<u32>)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut engine = ReorderEngine::new(vec![0, 1, 2], SimHost::new())
            .on_reorder(move |reorder, values| sink.borrow_mut().push((reorder.clone(), values.to_vec())));
        let mut list = SimList::new(ColumnLayout::default());
        list.render(&mut engine);

        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        list.drag_to(&mut engine, &PointerInput::mouse(175.0, 69.0));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!((seen[0].0.from, seen[0].0.to), (0, 1));
        assert_eq!(seen[0].1, vec![1, 0, 2]);
    }

    #[test]
    fn test_dropping_engine_mid_drag_resumes_document() {
        let (mut engine, mut list) = mounted((0..3).collect());
        let host = engine.host().clone();
        list.grab(&mut engine, 0, &PointerInput::mouse(175.0, 29.0));
        assert!(host.sim_document().is_suspended());

        drop(engine);

        assert!(!host.sim_document().is_suspended());
        assert!(host.active_subscriptions().is_empty());
    }
}
