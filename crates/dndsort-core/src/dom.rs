//! Browser host: drives the engine from DOM elements and events.
//!
//! The engine lives in an `Rc<RefCell<_>>`. Listeners and scheduled
//! callbacks hold a `Weak` to it and do nothing once it is gone. The
//! owner's reorder callback runs after the listener has released the
//! engine, so it may call back into [`DomSortable`] to re-render.

use crate::config::EngineConfig;
use crate::engine::{Reorder, RenderItem, ReorderEngine};
use crate::host::{Cursor, Document, Host, Surface, Timing, Transition};
use crate::input::{InputModality, PointerInput, PointerKind};
use crate::notify::ReorderQueue;
use crate::task::Deferred;
use kurbo::{Point, Rect, Vec2};
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, EventTarget, HtmlElement, Window};

/// Engine shared between the owner and DOM callbacks.
pub type SharedEngine<T> = Rc<RefCell<ReorderEngine<T, DomHost<T>>>>;

/// A rendered list item.
#[derive(Debug, Clone)]
pub struct DomSurface(pub HtmlElement);

impl DomSurface {
    fn set_style(&self, property: &str, value: &str) {
        let _ = self.0.style().set_property(property, value);
    }
}

impl Surface for DomSurface {
    fn bounding_box(&self) -> Option<Rect> {
        if !self.0.is_connected() {
            return None;
        }
        let rect = self.0.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom()))
    }

    fn set_transform(&self, offset: Option<Vec2>) {
        let value = offset
            .map(|offset| format!("translate({}px, {}px)", offset.x, offset.y))
            .unwrap_or_default();
        self.set_style("transform", &value);
    }

    fn set_transition(&self, transition: Option<Transition>) {
        let value = transition
            .map(|transition| format!("all {}ms", transition.duration_ms))
            .unwrap_or_default();
        self.set_style("transition", &value);
    }

    fn set_elevated(&self, elevated: bool) {
        if elevated {
            self.set_style("z-index", "100");
            self.set_style("box-shadow", "var(--shadow-elevation-high)");
        } else {
            self.set_style("z-index", "");
            self.set_style("box-shadow", "var(--shadow-elevation-medium)");
        }
    }

    fn set_cursor(&self, cursor: Cursor) {
        let value = match cursor {
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
        };
        self.set_style("cursor", value);
    }
}

/// The page body, whose selection and scrolling are frozen during a drag.
#[derive(Debug, Clone)]
pub struct DomDocument(HtmlElement);

impl Document for DomDocument {
    fn suspend_interaction(&self) {
        let style = self.0.style();
        let _ = style.set_property("user-select", "none");
        let _ = style.set_property("overflow", "hidden");
    }

    fn resume_interaction(&self) {
        let style = self.0.style();
        let _ = style.set_property("user-select", "");
        let _ = style.set_property("overflow", "");
    }
}

type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Registered drag listeners. Dropping removes them.
pub struct DomSubscription {
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl DomSubscription {
    fn listen(&mut self, target: EventTarget, event: &'static str, listener: Listener) {
        let _ = target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        self.listeners.push((target, event, listener));
    }
}

impl Drop for DomSubscription {
    fn drop(&mut self) {
        for (target, event, listener) in &self.listeners {
            let _ = target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}

/// Convert a DOM pointer or touch event into engine input.
pub fn pointer_input(event: &web_sys::Event) -> Option<PointerInput> {
    if let Some(event) = event.dyn_ref::<web_sys::PointerEvent>() {
        let kind = match event.pointer_type().as_str() {
            "mouse" => PointerKind::Mouse,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Touch,
        };
        return Some(PointerInput::Pointer {
            position: Point::new(event.client_x() as f64, event.client_y() as f64),
            kind,
        });
    }
    let event = event.dyn_ref::<web_sys::TouchEvent>()?;
    let list = event.touches();
    let touches = (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|touch| Point::new(touch.client_x() as f64, touch.client_y() as f64))
        .collect();
    Some(PointerInput::Touch { touches })
}

/// Host backed by the browser window.
pub struct DomHost<T> {
    window: Window,
    body: HtmlElement,
    engine: Weak<RefCell<ReorderEngine<T, DomHost<T>>>>,
    notifications: Rc<ReorderQueue<T>>,
}

impl<T: Eq + Hash + Clone + 'static> DomHost<T> {
    fn listener(&self, handle: fn(&mut ReorderEngine<T, DomHost<T>>, &PointerInput)) -> Listener {
        let engine = self.engine.clone();
        let notifications = Rc::clone(&self.notifications);
        Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(input) = pointer_input(&event) else {
                return;
            };
            let Some(engine) = engine.upgrade() else {
                return;
            };
            match engine.try_borrow_mut() {
                Ok(mut engine) => handle(&mut engine, &input),
                Err(_) => log::warn!("{} dropped: engine busy", event.type_()),
            };
            notifications.flush();
        }) as Box<dyn FnMut(web_sys::Event)>)
    }
}

impl<T: Eq + Hash + Clone + 'static> Host for DomHost<T> {
    type Surface = DomSurface;
    type Document = DomDocument;
    type Subscription = DomSubscription;

    fn document(&self) -> DomDocument {
        DomDocument(self.body.clone())
    }

    fn subscribe(&self, modality: InputModality, surface: &DomSurface) -> DomSubscription {
        let window: EventTarget = self.window.clone().into();
        let on_move = self.listener(|engine, input| {
            engine.pointer_move(input);
        });
        let on_end = self.listener(|engine, input| engine.release(input));

        let mut subscription = DomSubscription {
            listeners: Vec::new(),
        };
        match modality {
            InputModality::Mouse => {
                subscription.listen(window.clone(), "pointermove", on_move);
                subscription.listen(window, "pointerup", on_end);
            }
            InputModality::Touch => {
                let block_scroll = Closure::wrap(Box::new(|event: web_sys::Event| {
                    event.prevent_default();
                }) as Box<dyn FnMut(web_sys::Event)>);
                let options = AddEventListenerOptions::new();
                options.set_passive(false);
                let element: EventTarget = surface.0.clone().into();
                let _ = element.add_event_listener_with_callback_and_add_event_listener_options(
                    "touchmove",
                    block_scroll.as_ref().unchecked_ref(),
                    &options,
                );
                subscription.listeners.push((element, "touchmove", block_scroll));
                subscription.listen(window.clone(), "touchmove", on_move);
                subscription.listen(window, "touchend", on_end);
            }
        }
        subscription
    }

    fn schedule(&self, timing: Timing, task: Deferred) {
        let engine = self.engine.clone();
        let notifications = Rc::clone(&self.notifications);
        let callback = Closure::once_into_js(move || {
            let Some(engine) = engine.upgrade() else {
                return;
            };
            match engine.try_borrow_mut() {
                Ok(mut engine) => engine.run_deferred(task),
                Err(_) => log::warn!("deferred {:?} dropped: engine busy", task),
            };
            notifications.flush();
        });
        let callback: &js_sys::Function = callback.unchecked_ref();
        let scheduled = match timing {
            Timing::After(delay) => self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay.as_millis() as i32),
            Timing::NextFrame => self.window.request_animation_frame(callback),
        };
        if let Err(err) = scheduled {
            log::error!("failed to schedule {:?}: {:?}", timing, err);
        }
    }
}

/// A sortable list bound to DOM elements.
pub struct DomSortable<T> {
    engine: SharedEngine<T>,
}

impl<T: Eq + Hash + Clone + 'static> DomSortable<T> {
    /// Mount an engine on the current window. Returns `None` outside a
    /// browser page.
    ///
    /// `on_reorder` runs once the event that caused the reorder has been
    /// handled; it may call [`render_items`](Self::render_items) and
    /// [`attach`](Self::attach).
    pub fn new(
        values: Vec<T>,
        config: EngineConfig,
        on_reorder: impl FnMut(&Reorder, &[T]) + 'static,
    ) -> Option<Self> {
        let window = web_sys::window()?;
        let body = window.document()?.body()?;
        let notifications = ReorderQueue::new(on_reorder);
        let engine = Rc::new_cyclic(|weak| {
            let host = DomHost {
                window,
                body,
                engine: weak.clone(),
                notifications: Rc::clone(&notifications),
            };
            RefCell::new(ReorderEngine::with_config(values, host, config).on_reorder(notifications.sink()))
        });
        Some(Self { engine })
    }

    pub fn engine(&self) -> &SharedEngine<T> {
        &self.engine
    }

    /// Items to render, or `None` while the engine is handling an event.
    pub fn render_items(&self) -> Option<Vec<RenderItem<T>>> {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => Some(engine.render_items()),
            Err(_) => {
                log::warn!("render_items skipped: engine busy");
                None
            }
        }
    }

    /// Ref callback for an item element; pass `None` when it unmounts.
    pub fn attach(&self, item: &RenderItem<T>, element: Option<HtmlElement>) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.attach(item, element.map(DomSurface)),
            Err(_) => log::warn!("attach for {} skipped: engine busy", item.key),
        }
    }

    /// `pointerdown` handler for an item element.
    pub fn on_pointer_down(&self, item: &RenderItem<T>, event: &web_sys::PointerEvent) {
        let Some(element) = event
            .current_target()
            .and_then(|target| target.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let Some(input) = pointer_input(event) else {
            return;
        };
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.grab_start(item, DomSurface(element), &input),
            Err(_) => log::warn!("grab on {} skipped: engine busy", item.key),
        }
    }
}
