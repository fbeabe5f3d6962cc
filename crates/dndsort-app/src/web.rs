//! WebAssembly entry point: mounts the demo list into the page.

use crate::app::DEFAULT_ITEM_COUNT;
use dndsort_core::dom::DomSortable;
use dndsort_core::{EngineConfig, ItemKey, Reorder, RenderItem};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

type PointerListener = Closure<dyn FnMut(web_sys::PointerEvent)>;

thread_local! {
    static DEMO: RefCell<Option<Rc<WebDemo>>> = const { RefCell::new(None) };
}

/// The demo list rendered as DOM elements.
pub struct WebDemo {
    document: Document,
    container: HtmlElement,
    sortable: DomSortable<String>,
    elements: RefCell<HashMap<ItemKey, HtmlElement>>,
    listeners: RefCell<Vec<PointerListener>>,
}

impl WebDemo {
    /// Build the list inside a new container appended to the page body.
    pub fn mount(items: usize, config: EngineConfig) -> Option<Rc<Self>> {
        let document = web_sys::window()?.document()?;
        let body = document.body()?;
        let container: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
        let style = container.style();
        let _ = style.set_property("display", "flex");
        let _ = style.set_property("flex-direction", "column");
        let _ = style.set_property("gap", "16px");
        let _ = style.set_property("width", "350px");
        body.append_child(&container).ok()?;

        let this: Rc<RefCell<Weak<WebDemo>>> = Rc::default();
        let on_reorder = {
            let this = Rc::clone(&this);
            move |_: &Reorder, values: &[String]| {
                log::info!("order changed: [{}]", values.join(", "));
                if let Some(demo) = this.borrow().upgrade() {
                    demo.render();
                }
            }
        };
        let values = (0..items).map(|i| i.to_string()).collect();
        let sortable = DomSortable::new(values, config, on_reorder)?;

        let demo = Rc::new(Self {
            document,
            container,
            sortable,
            elements: RefCell::default(),
            listeners: RefCell::default(),
        });
        *this.borrow_mut() = Rc::downgrade(&demo);
        demo.render();
        Some(demo)
    }

    /// Move elements into engine order, then report each to the engine.
    pub fn render(self: &Rc<Self>) {
        let Some(items) = self.sortable.render_items() else {
            return;
        };
        let mut placed = Vec::with_capacity(items.len());
        for item in &items {
            let Some(element) = self.element_for(item) else {
                continue;
            };
            let _ = self.container.append_child(&element);
            placed.push((item, element));
        }
        for (item, element) in placed {
            self.sortable.attach(item, Some(element));
        }
    }

    fn element_for(self: &Rc<Self>, item: &RenderItem<String>) -> Option<HtmlElement> {
        if let Some(element) = self.elements.borrow().get(&item.key) {
            return Some(element.clone());
        }

        let element: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;
        element.set_text_content(Some(&item.value));
        let style = element.style();
        let _ = style.set_property("height", "58px");
        let _ = style.set_property("cursor", "grab");
        let _ = style.set_property("touch-action", "none");
        let _ = style.set_property("box-shadow", "var(--shadow-elevation-medium)");

        let demo = Rc::downgrade(self);
        let grabbed = item.clone();
        let listener = Closure::wrap(Box::new(move |event: web_sys::PointerEvent| {
            if let Some(demo) = demo.upgrade() {
                demo.sortable.on_pointer_down(&grabbed, &event);
            }
        }) as Box<dyn FnMut(web_sys::PointerEvent)>);
        let _ = element
            .add_event_listener_with_callback("pointerdown", listener.as_ref().unchecked_ref());
        self.listeners.borrow_mut().push(listener);

        self.elements
            .borrow_mut()
            .insert(item.key.clone(), element.clone());
        Some(element)
    }
}

/// Initialize logging and mount the demo list.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Starting DnDSort (WASM)");

    match WebDemo::mount(DEFAULT_ITEM_COUNT, EngineConfig::default()) {
        Some(demo) => DEMO.with(|slot| *slot.borrow_mut() = Some(demo)),
        None => log::error!("Failed to mount demo list: no document body"),
    }
}
