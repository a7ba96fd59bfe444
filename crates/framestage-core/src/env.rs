#![forbid(unsafe_code)]

//! Environment seams consumed by the controller.
//!
//! The controller never touches a browser directly. Everything it needs is
//! expressed through three traits:
//! - [`Dom`]: node tree, attributes, classes and style reads/writes,
//! - [`FullscreenApi`]: native full-viewport request/exit/query, with vendor
//!   variants resolved by the implementation at call time,
//! - [`HostBindings`]: listener registration and debounce wake timers.
//!
//! `framestage-web` binds these to `web-sys`; `framestage-harness` provides a
//! deterministic in-memory implementation for tests.

use core::fmt;
use core::time::Duration;

use crate::error::DomError;
use crate::id::ControllerId;

/// One of the two header controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Control {
    Theater,
    Fullscreen,
}

impl Control {
    pub const ALL: [Self; 2] = [Self::Theater, Self::Fullscreen];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Theater => 0,
            Self::Fullscreen => 1,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theater => "theater",
            Self::Fullscreen => "fullscreen",
        }
    }
}

/// Node tree access.
///
/// `Node` is a cheap handle; equality means identity.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

    fn body(&self) -> Option<Self::Node>;

    fn head(&self) -> Option<Self::Node>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// True when `node` is reachable from the document root.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Insert `child` into `parent` before `reference`, or last when `None`.
    /// `child` is detached from its previous parent first.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Detach `node` from its parent. No-op when already detached.
    fn remove(&mut self, node: &Self::Node);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
    -> Result<(), DomError>;

    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Replace the children of `node` with parsed `markup` (icons only).
    fn set_markup(&mut self, node: &Self::Node, markup: &str);

    fn add_class(&mut self, node: &Self::Node, class: &str);

    fn remove_class(&mut self, node: &Self::Node, class: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Inline (`style` attribute) value of one CSS property.
    fn inline_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Set or clear (`None`) one inline CSS property.
    fn set_inline_style(&mut self, node: &Self::Node, property: &str, value: Option<&str>);

    /// Resolved (computed) value of one CSS property.
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;
}

/// Result of asking the environment for native fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    /// Accepted and resolving asynchronously. A later rejection is reported
    /// as [`crate::HostEvent::NativeFullscreenRejected`].
    Pending,
    /// Refused synchronously.
    Rejected,
    /// No vendor variant of the request exists.
    Unavailable,
}

/// Native fullscreen capability.
pub trait FullscreenApi: Dom {
    fn request_fullscreen(
        &mut self,
        owner: &ControllerId,
        target: &Self::Node,
    ) -> FullscreenRequest;

    fn exit_fullscreen(&mut self);

    /// True when any element of the document is in native fullscreen.
    fn is_fullscreen_active(&self) -> bool;
}

/// Listener registration request.
#[derive(Debug, Clone, PartialEq)]
pub enum Listener<N> {
    /// Document fullscreen-change notification, all vendor variants. Hosts
    /// whose request API reports refusals as events route those here too.
    FullscreenChange,
    /// Document-level key presses, filtered for the cancel key by the controller.
    CancelKey,
    OverlayClick(N),
    ControlClick(Control, N),
}

impl<N> Listener<N> {
    #[must_use]
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::FullscreenChange => ListenerKind::FullscreenChange,
            Self::CancelKey => ListenerKind::CancelKey,
            Self::OverlayClick(_) => ListenerKind::OverlayClick,
            Self::ControlClick(control, _) => ListenerKind::ControlClick(*control),
        }
    }
}

/// Key identifying one registered listener of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    FullscreenChange,
    CancelKey,
    OverlayClick,
    ControlClick(Control),
}

impl ListenerKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullscreenChange => "fullscreen_change",
            Self::CancelKey => "cancel_key",
            Self::OverlayClick => "overlay_click",
            Self::ControlClick(Control::Theater) => "theater_click",
            Self::ControlClick(Control::Fullscreen) => "fullscreen_click",
        }
    }
}

/// Event wiring and timers owned by the host.
pub trait HostBindings: Dom {
    fn listen(
        &mut self,
        owner: &ControllerId,
        listener: Listener<Self::Node>,
    ) -> Result<(), DomError>;

    /// Remove a listener. No-op when it is not registered.
    fn unlisten(&mut self, owner: &ControllerId, kind: ListenerKind);

    /// Arm (or re-arm) the debounce wake of `control`. The host must deliver
    /// [`crate::HostEvent::DebounceElapsed`] once `delay` has passed.
    fn schedule_wake(&mut self, owner: &ControllerId, control: Control, delay: Duration);

    fn cancel_wake(&mut self, owner: &ControllerId, control: Control);
}

/// Everything a controller needs from its host.
pub trait Environment: Dom + FullscreenApi + HostBindings {}

impl<T: Dom + FullscreenApi + HostBindings> Environment for T {}
