#![forbid(unsafe_code)]

//! `web-sys` implementation of the framestage environment seams.
//!
//! Only compiled on `wasm32` targets. Browser callbacks never touch
//! controllers directly: each one forwards a [`HostEvent`] to the
//! [`EventSink`] supplied by the page, which routes it by [`ControllerId`].

use core::time::Duration;
use std::collections::HashMap;
use std::rc::Rc;

use framestage_core::{
    Control, ControllerId, Dom, DomError, FullscreenApi, FullscreenRequest, HostBindings,
    HostEvent, Listener, ListenerKind,
};
use js_sys::{Function, Promise, Reflect};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Node, Window};

use crate::vendor;

/// Receiver of browser-originated events.
pub type EventSink = Rc<dyn Fn(&ControllerId, HostEvent)>;

type EventClosure = Closure<dyn FnMut(Event)>;

struct ActiveListener {
    target: EventTarget,
    names: &'static [&'static str],
}

struct WakeTimer {
    closure: Closure<dyn FnMut()>,
    handle: Option<i32>,
}

/// Browser document bound to the controller seams.
///
/// Callbacks are created once per `(owner, listener)` and `(owner, control)`
/// and kept until [`WebEnv::release`], so a callback is never freed while it
/// runs.
pub struct WebEnv {
    window: Window,
    document: Document,
    sink: EventSink,
    callbacks: HashMap<(ControllerId, ListenerKind), EventClosure>,
    active: HashMap<(ControllerId, ListenerKind), ActiveListener>,
    timers: HashMap<(ControllerId, Control), WakeTimer>,
}

fn js_error(context: &str, err: &JsValue) -> DomError {
    let detail = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    DomError::host(format!("{context}: {detail}"))
}

fn as_element(node: &Node) -> Option<&Element> {
    node.dyn_ref::<Element>()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Look up the first callable member of `target` among `names`.
fn vendor_method(target: &JsValue, names: &[&str]) -> Option<Function> {
    names.iter().find_map(|name| {
        Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    })
}

impl WebEnv {
    pub fn new(window: Window, document: Document, sink: EventSink) -> Self {
        Self {
            window,
            document,
            sink,
            callbacks: HashMap::new(),
            active: HashMap::new(),
            timers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Elements matching `selector`, in document order.
    pub fn query_all(&self, selector: &str) -> Result<Vec<Node>, DomError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|err| js_error("querySelectorAll", &err))?;
        Ok((0..list.length())
            .filter_map(|index| list.get(index))
            .collect())
    }

    /// Drop every callback and timer owned by `owner`.
    pub fn release(&mut self, owner: &ControllerId) {
        let kinds: Vec<ListenerKind> = self
            .callbacks
            .keys()
            .filter(|(id, _)| id == owner)
            .map(|(_, kind)| *kind)
            .collect();
        for kind in kinds {
            self.unlisten(owner, kind);
            self.callbacks.remove(&(owner.clone(), kind));
        }
        for control in Control::ALL {
            self.cancel_wake(owner, control);
            self.timers.remove(&(owner.clone(), control));
        }
    }

    fn make_callback(&self, owner: &ControllerId, kind: ListenerKind) -> EventClosure {
        let sink = Rc::clone(&self.sink);
        let owner = owner.clone();
        Closure::new(move |event: Event| {
            let host_event = match kind {
                ListenerKind::FullscreenChange => vendor::fullscreen_event(&event.type_()),
                ListenerKind::CancelKey => {
                    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    HostEvent::key(key.key(), key.key_code())
                }
                ListenerKind::OverlayClick => HostEvent::OverlayClicked,
                ListenerKind::ControlClick(control) => {
                    event.prevent_default();
                    event.stop_propagation();
                    HostEvent::ControlClicked(control)
                }
            };
            sink(&owner, host_event);
        })
    }

    fn make_wake(&self, owner: &ControllerId, control: Control) -> Closure<dyn FnMut()> {
        let sink = Rc::clone(&self.sink);
        let owner = owner.clone();
        Closure::new(move || sink(&owner, HostEvent::DebounceElapsed(control)))
    }

    fn watch_rejection(&self, owner: &ControllerId, promise: &Promise) {
        let sink = Rc::clone(&self.sink);
        let owner = owner.clone();
        // Settles at most once; the JS function frees itself when called.
        let on_reject = Closure::once_into_js(move |_reason: JsValue| {
            sink(&owner, HostEvent::NativeFullscreenRejected);
        });
        let Some(catch) = vendor_method(promise.as_ref(), &["catch"]) else {
            return;
        };
        if let Err(err) = catch.call1(promise.as_ref(), &on_reject) {
            warn!(error = ?err, "could not observe fullscreen request");
        }
    }
}

impl Dom for WebEnv {
    type Node = Node;

    fn create_element(&mut self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(|err| js_error("createElement", &err))
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Node::from)
    }

    fn head(&self) -> Option<Node> {
        self.document.head().map(Node::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Node::from)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn is_connected(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn insert_before(
        &mut self,
        parent: &Node,
        child: &Node,
        reference: Option<&Node>,
    ) -> Result<(), DomError> {
        parent
            .insert_before(child, reference)
            .map(|_| ())
            .map_err(|err| js_error("insertBefore", &err))
    }

    fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        as_element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        let element = as_element(node).ok_or_else(|| DomError::host("not an element"))?;
        element
            .set_attribute(name, value)
            .map_err(|err| js_error("setAttribute", &err))
    }

    fn set_text(&mut self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_markup(&mut self, node: &Node, markup: &str) {
        if let Some(element) = as_element(node) {
            element.set_inner_html(markup);
        }
    }

    fn add_class(&mut self, node: &Node, class: &str) {
        if let Some(element) = as_element(node) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, node: &Node, class: &str) {
        if let Some(element) = as_element(node) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        as_element(node).is_some_and(|element| element.class_list().contains(class))
    }

    fn inline_style(&self, node: &Node, property: &str) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        element
            .style()
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }

    fn set_inline_style(&mut self, node: &Node, property: &str, value: Option<&str>) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let _ = match value {
            Some(value) => style.set_property(property, value),
            None => style.remove_property(property).map(|_| ()),
        };
    }

    fn computed_style(&self, node: &Node, property: &str) -> Option<String> {
        let element = as_element(node)?;
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()?
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }
}

impl FullscreenApi for WebEnv {
    fn request_fullscreen(&mut self, owner: &ControllerId, target: &Node) -> FullscreenRequest {
        let Some(request) = vendor_method(target.as_ref(), &vendor::REQUEST_FULLSCREEN) else {
            return FullscreenRequest::Unavailable;
        };
        match request.call0(target.as_ref()) {
            Ok(result) => {
                if let Some(promise) = result.dyn_ref::<Promise>() {
                    self.watch_rejection(owner, promise);
                }
                FullscreenRequest::Pending
            }
            Err(err) => {
                trace!(owner = %owner, error = ?err, "fullscreen request threw");
                FullscreenRequest::Rejected
            }
        }
    }

    fn exit_fullscreen(&mut self) {
        let Some(exit) = vendor_method(self.document.as_ref(), &vendor::EXIT_FULLSCREEN) else {
            return;
        };
        match exit.call0(self.document.as_ref()) {
            Ok(result) => {
                if let Some(promise) = result.dyn_ref::<Promise>() {
                    // Exit races with user-initiated exits; a rejection carries no state.
                    let ignore = Closure::once_into_js(|_reason: JsValue| {});
                    if let Some(catch) = vendor_method(promise.as_ref(), &["catch"]) {
                        let _ = catch.call1(promise.as_ref(), &ignore);
                    }
                }
            }
            Err(err) => warn!(error = ?err, "fullscreen exit threw"),
        }
    }

    fn is_fullscreen_active(&self) -> bool {
        vendor::FULLSCREEN_ELEMENT.iter().any(|name| {
            Reflect::get(self.document.as_ref(), &JsValue::from_str(name))
                .is_ok_and(|value| !value.is_null() && !value.is_undefined())
        })
    }
}

impl HostBindings for WebEnv {
    fn listen(&mut self, owner: &ControllerId, listener: Listener<Node>) -> Result<(), DomError> {
        let kind = listener.kind();
        let key = (owner.clone(), kind);
        if self.active.contains_key(&key) {
            return Ok(());
        }
        let target: EventTarget = match listener {
            Listener::FullscreenChange | Listener::CancelKey => self.document.clone().into(),
            Listener::OverlayClick(node) | Listener::ControlClick(_, node) => node.into(),
        };
        if !self.callbacks.contains_key(&key) {
            let callback = self.make_callback(owner, kind);
            self.callbacks.insert(key.clone(), callback);
        }
        let Some(callback) = self.callbacks.get(&key) else {
            return Err(DomError::host("listener callback missing"));
        };
        let function: &Function = callback.as_ref().unchecked_ref();
        let names = vendor::event_names(kind);
        for (index, name) in names.iter().enumerate() {
            if let Err(err) = target.add_event_listener_with_callback(name, function) {
                for added in &names[..index] {
                    let _ = target.remove_event_listener_with_callback(added, function);
                }
                return Err(js_error("addEventListener", &err));
            }
        }
        self.active.insert(key, ActiveListener { target, names });
        Ok(())
    }

    fn unlisten(&mut self, owner: &ControllerId, kind: ListenerKind) {
        let key = (owner.clone(), kind);
        let Some(active) = self.active.remove(&key) else {
            return;
        };
        let Some(callback) = self.callbacks.get(&key) else {
            return;
        };
        let function: &Function = callback.as_ref().unchecked_ref();
        for name in active.names {
            let _ = active
                .target
                .remove_event_listener_with_callback(name, function);
        }
    }

    fn schedule_wake(&mut self, owner: &ControllerId, control: Control, delay: Duration) {
        let key = (owner.clone(), control);
        if !self.timers.contains_key(&key) {
            let closure = self.make_wake(owner, control);
            self.timers.insert(
                key.clone(),
                WakeTimer {
                    closure,
                    handle: None,
                },
            );
        }
        let Some(timer) = self.timers.get_mut(&key) else {
            return;
        };
        if let Some(handle) = timer.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                timer.closure.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(handle) => timer.handle = Some(handle),
            Err(err) => warn!(owner = %owner, error = ?err, "setTimeout failed"),
        }
    }

    fn cancel_wake(&mut self, owner: &ControllerId, control: Control) {
        let Some(timer) = self.timers.get_mut(&(owner.clone(), control)) else {
            return;
        };
        if let Some(handle) = timer.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
