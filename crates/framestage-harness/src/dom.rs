#![forbid(unsafe_code)]

//! Arena-backed document implementing every framestage environment seam.

use core::time::Duration;
use std::collections::BTreeMap;

use framestage_core::{
    Control, ControllerId, Dom, DomError, FullscreenApi, FullscreenRequest, HostBindings, Listener,
    ListenerKind,
};
use tracing::trace;

/// Handle of one node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// How the document answers native fullscreen requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenBehavior {
    /// No vendor variant exists.
    Unavailable,
    /// Request goes pending and the target becomes the fullscreen element.
    #[default]
    Accept,
    /// Request is refused synchronously.
    Reject,
    /// Request goes pending but never takes effect; the test delivers the
    /// rejection itself.
    RejectAsync,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    inline: BTreeMap<String, String>,
    computed: BTreeMap<String, String>,
    markup: Option<String>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            inline: BTreeMap::new(),
            computed: BTreeMap::new(),
            markup: None,
        }
    }
}

/// Deterministic in-memory document.
///
/// Besides the environment traits it records fullscreen requests, registered
/// listeners and armed wakes so tests can assert on them directly.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    document: NodeId,
    head: Option<NodeId>,
    body: Option<NodeId>,
    fullscreen_behavior: FullscreenBehavior,
    fullscreen_element: Option<NodeId>,
    fullscreen_requests: u32,
    fullscreen_exits: u32,
    listeners: BTreeMap<(ControllerId, ListenerKind), Option<NodeId>>,
    wakes: BTreeMap<(ControllerId, Control), Duration>,
    fail_listen: Option<ListenerKind>,
    fail_create: Option<String>,
    fail_insert: Option<NodeId>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// `#document > html > (head, body)`, native fullscreen accepted.
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self::bare();
        let html = dom.append_element(dom.document, "html");
        dom.head = Some(dom.append_element(html, "head"));
        dom.body = Some(dom.append_element(html, "body"));
        dom
    }

    /// Document with an `html` element but neither head nor body.
    #[must_use]
    pub fn without_body() -> Self {
        let mut dom = Self::bare();
        dom.append_element(dom.document, "html");
        dom
    }

    fn bare() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            document: NodeId(0),
            head: None,
            body: None,
            fullscreen_behavior: FullscreenBehavior::default(),
            fullscreen_element: None,
            fullscreen_requests: 0,
            fullscreen_exits: 0,
            listeners: BTreeMap::new(),
            wakes: BTreeMap::new(),
            fail_listen: None,
            fail_create: None,
            fail_insert: None,
        }
    }

    #[must_use]
    pub fn with_fullscreen(mut self, behavior: FullscreenBehavior) -> Self {
        self.fullscreen_behavior = behavior;
        self
    }

    pub fn set_fullscreen_behavior(&mut self, behavior: FullscreenBehavior) {
        self.fullscreen_behavior = behavior;
    }

    /// Make every `listen` for `kind` fail.
    pub fn fail_listen_on(&mut self, kind: Option<ListenerKind>) {
        self.fail_listen = kind;
    }

    /// Make every `create_element` for `tag` fail.
    pub fn fail_create_on(&mut self, tag: Option<&str>) {
        self.fail_create = tag.map(str::to_owned);
    }

    /// Make every `insert_before` into `parent` fail.
    pub fn fail_insert_into(&mut self, parent: Option<NodeId>) {
        self.fail_insert = parent;
    }

    #[must_use]
    pub const fn document(&self) -> NodeId {
        self.document
    }

    // -- tree building -----------------------------------------------------

    /// Create a detached element.
    pub fn element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(tag.to_owned()))
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.element(tag);
        self.link(parent, node, None);
        node
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.push(NodeKind::Text(text.to_owned()));
        self.link(parent, node, None);
        node
    }

    /// Override the computed value of one style property.
    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.computed.insert(property.to_owned(), value.to_owned());
        }
    }

    /// Leave native fullscreen without going through the controller.
    pub fn simulate_user_exit(&mut self) {
        self.fullscreen_element = None;
    }

    // -- inspection --------------------------------------------------------

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Document | NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(node.0)
            .map(|data| data.classes.clone())
            .unwrap_or_default()
    }

    /// Concatenated text content of `node` and its descendants.
    #[must_use]
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    #[must_use]
    pub fn markup(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.markup.as_deref()
    }

    /// Connected elements with `tag`, in document order.
    #[must_use]
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.document, &mut |id, data| {
            if matches!(&data.kind, NodeKind::Element(t) if t == tag) {
                out.push(id);
            }
            false
        });
        out
    }

    /// Connected elements carrying `class`, in document order.
    #[must_use]
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.document, &mut |id, data| {
            if data.classes.iter().any(|c| c == class) {
                out.push(id);
            }
            false
        });
        out
    }

    /// Deterministic serialization of `node` and its subtree.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    #[must_use]
    pub const fn fullscreen_element(&self) -> Option<NodeId> {
        self.fullscreen_element
    }

    #[must_use]
    pub const fn fullscreen_requests(&self) -> u32 {
        self.fullscreen_requests
    }

    #[must_use]
    pub const fn fullscreen_exits(&self) -> u32 {
        self.fullscreen_exits
    }

    /// Listener kinds `owner` currently holds.
    #[must_use]
    pub fn active_listeners(&self, owner: &ControllerId) -> Vec<ListenerKind> {
        self.listeners
            .keys()
            .filter(|(id, _)| id == owner)
            .map(|(_, kind)| *kind)
            .collect()
    }

    #[must_use]
    pub fn listener_target(&self, owner: &ControllerId, kind: ListenerKind) -> Option<NodeId> {
        self.listeners
            .get(&(owner.clone(), kind))
            .copied()
            .flatten()
    }

    /// Total listeners registered across all owners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delay of the armed wake of `control`, if any.
    #[must_use]
    pub fn wake(&self, owner: &ControllerId, control: Control) -> Option<Duration> {
        self.wakes.get(&(owner.clone(), control)).copied()
    }

    /// Fire the armed wake of `control` once, as a host timer would.
    /// Returns its delay, or `None` when nothing was armed.
    pub fn fire_wake(&mut self, owner: &ControllerId, control: Control) -> Option<Duration> {
        self.wakes.remove(&(owner.clone(), control))
    }

    #[must_use]
    pub fn wake_count(&self) -> usize {
        self.wakes.len()
    }

    // -- internals ---------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|data| data.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
    }

    /// Move `node` under `parent` before `reference`. Callers validate.
    fn link(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        self.unlink(node);
        let children = &mut self.nodes[parent.0].children;
        let position = reference
            .and_then(|reference| children.iter().position(|child| *child == reference))
            .unwrap_or(children.len());
        children.insert(position, node);
        self.nodes[node.0].parent = Some(parent);
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn replace_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.unlink(child);
        }
    }

    /// Pre-order walk of the connected tree; `visit` returns `true` to stop.
    fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId, &NodeData) -> bool) -> bool {
        let data = &self.nodes[node.0];
        if visit(node, data) {
            return true;
        }
        for child in &data.children {
            if self.walk(*child, &mut *visit) {
                return true;
            }
        }
        false
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeKind::Text(text) = &data.kind {
            out.push_str(text);
        }
        for child in &data.children {
            self.collect_text(*child, out);
        }
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        let tag = match &data.kind {
            NodeKind::Text(text) => {
                out.push_str(text);
                return;
            }
            NodeKind::Document => "#document",
            NodeKind::Element(tag) => tag.as_str(),
        };
        out.push('<');
        out.push_str(tag);
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        if !data.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", data.classes.join(" ")));
        }
        if !data.inline.is_empty() {
            let style: Vec<String> = data
                .inline
                .iter()
                .map(|(property, value)| format!("{property}: {value}"))
                .collect();
            out.push_str(&format!(" style=\"{}\"", style.join("; ")));
        }
        out.push('>');
        if let Some(markup) = &data.markup {
            out.push_str(markup);
        }
        for child in &data.children {
            self.serialize(*child, out);
        }
        out.push_str(&format!("</{tag}>"));
    }
}

fn default_computed(property: &str) -> Option<&'static str> {
    match property {
        "position" => Some("static"),
        "top" | "left" | "z-index" | "width" | "height" => Some("auto"),
        "transform" => Some("none"),
        "margin" | "padding" | "border-radius" => Some("0px"),
        "border" => Some("0px none rgb(0, 0, 0)"),
        _ => None,
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if self.fail_create.as_deref() == Some(tag) {
            return Err(DomError::host(format!("createElement({tag}) refused")));
        }
        Ok(self.element(tag))
    }

    fn body(&self) -> Option<NodeId> {
        self.body.filter(|body| self.is_connected(body))
    }

    fn head(&self) -> Option<NodeId> {
        self.head.filter(|head| self.is_connected(head))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut found = None;
        self.walk(self.document, &mut |node, data| {
            if data.attributes.get("id").is_some_and(|value| value == id) {
                found = Some(node);
                return true;
            }
            false
        });
        found
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|child| child == node)?;
        siblings.get(position + 1).copied()
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.contains(*node) && self.is_inclusive_ancestor(self.document, *node)
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        if !self.contains(*parent) || !self.contains(*child) {
            return Err(DomError::UnknownNode);
        }
        if self.fail_insert == Some(*parent) {
            return Err(DomError::host("insertBefore refused"));
        }
        if self.is_inclusive_ancestor(*child, *parent) {
            return Err(DomError::HierarchyRequest);
        }
        let mut reference = reference.copied();
        if let Some(node) = reference {
            if self.parent(&node) != Some(*parent) {
                return Err(DomError::NotAChild);
            }
            if node == *child {
                reference = self.next_sibling(child);
            }
        }
        self.link(*parent, *child, reference);
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) {
        self.unlink(*node);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let data = self.nodes.get(node.0)?;
        if name == "class" {
            return (!data.classes.is_empty()).then(|| data.classes.join(" "));
        }
        data.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let data = self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode)?;
        data.attributes.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        if !self.contains(*node) {
            return;
        }
        self.replace_children(*node);
        self.nodes[node.0].markup = None;
        self.append_text(*node, text);
    }

    fn set_markup(&mut self, node: &NodeId, markup: &str) {
        if !self.contains(*node) {
            return;
        }
        self.replace_children(*node);
        self.nodes[node.0].markup = Some(markup.to_owned());
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        let Some(data) = self.nodes.get_mut(node.0) else {
            return;
        };
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|data| data.classes.iter().any(|c| c == class))
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.nodes.get(node.0)?.inline.get(property).cloned()
    }

    fn set_inline_style(&mut self, node: &NodeId, property: &str, value: Option<&str>) {
        let Some(data) = self.nodes.get_mut(node.0) else {
            return;
        };
        match value {
            Some(value) => {
                data.inline.insert(property.to_owned(), value.to_owned());
            }
            None => {
                data.inline.remove(property);
            }
        }
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> Option<String> {
        let data = self.nodes.get(node.0)?;
        data.inline
            .get(property)
            .or_else(|| data.computed.get(property))
            .cloned()
            .or_else(|| default_computed(property).map(str::to_owned))
    }
}

impl FullscreenApi for MemoryDom {
    fn request_fullscreen(&mut self, owner: &ControllerId, target: &NodeId) -> FullscreenRequest {
        self.fullscreen_requests += 1;
        trace!(owner = %owner, behavior = ?self.fullscreen_behavior, "fullscreen requested");
        match self.fullscreen_behavior {
            FullscreenBehavior::Unavailable => FullscreenRequest::Unavailable,
            FullscreenBehavior::Reject => FullscreenRequest::Rejected,
            FullscreenBehavior::RejectAsync => FullscreenRequest::Pending,
            FullscreenBehavior::Accept => {
                self.fullscreen_element = Some(*target);
                FullscreenRequest::Pending
            }
        }
    }

    fn exit_fullscreen(&mut self) {
        self.fullscreen_exits += 1;
        self.fullscreen_element = None;
    }

    fn is_fullscreen_active(&self) -> bool {
        self.fullscreen_element.is_some()
    }
}

impl HostBindings for MemoryDom {
    fn listen(&mut self, owner: &ControllerId, listener: Listener<NodeId>) -> Result<(), DomError> {
        let kind = listener.kind();
        if self.fail_listen == Some(kind) {
            return Err(DomError::host(format!("listener {} refused", kind.label())));
        }
        let target = match listener {
            Listener::OverlayClick(node) | Listener::ControlClick(_, node) => Some(node),
            Listener::FullscreenChange | Listener::CancelKey => None,
        };
        self.listeners.insert((owner.clone(), kind), target);
        Ok(())
    }

    fn unlisten(&mut self, owner: &ControllerId, kind: ListenerKind) {
        self.listeners.remove(&(owner.clone(), kind));
    }

    fn schedule_wake(&mut self, owner: &ControllerId, control: Control, delay: Duration) {
        self.wakes.insert((owner.clone(), control), delay);
    }

    fn cancel_wake(&mut self, owner: &ControllerId, control: Control) {
        self.wakes.remove(&(owner.clone(), control));
    }
}
