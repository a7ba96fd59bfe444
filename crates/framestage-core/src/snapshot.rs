#![forbid(unsafe_code)]

//! Original placement capture and exact restore.
//!
//! A snapshot is taken once, before the frame is wrapped, and is consumed
//! only when the controller detaches. Restore is idempotent: once the frame
//! sits at its captured position with its captured inline style, further
//! calls change nothing.

use crate::classes;
use crate::env::Dom;
use crate::error::{DomError, FrameStageError};

/// Style properties recorded by [`OriginalPlacement::capture`].
pub const SNAPSHOT_PROPERTIES: [&str; 11] = [
    "width",
    "height",
    "position",
    "top",
    "left",
    "z-index",
    "transform",
    "margin",
    "padding",
    "border",
    "border-radius",
];

/// One captured style property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleValue {
    pub property: &'static str,
    /// Value of the `style` attribute at capture time.
    pub inline: Option<String>,
    /// Inline value when present, otherwise the computed value.
    pub resolved: Option<String>,
}

/// Outcome of [`OriginalPlacement::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The frame was moved back to its captured position.
    Reinserted,
    /// The frame already sat at its captured position.
    AlreadyInPlace,
    /// The captured parent left the document; reinsertion was skipped.
    ParentDisconnected,
}

/// Captured DOM placement and style of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalPlacement<N> {
    parent: N,
    next_sibling: Option<N>,
    style: Vec<StyleValue>,
    parent_position: Option<String>,
    parent_class: Option<String>,
}

impl<N: Clone + PartialEq> OriginalPlacement<N> {
    /// Read placement and style of `frame`.
    pub fn capture<D>(dom: &D, frame: &N) -> Result<Self, FrameStageError>
    where
        D: Dom<Node = N>,
    {
        let parent = dom.parent(frame).ok_or(FrameStageError::NoParent)?;
        let next_sibling = dom.next_sibling(frame);
        let style = SNAPSHOT_PROPERTIES
            .into_iter()
            .map(|property| {
                let inline = dom.inline_style(frame, property);
                let resolved = inline
                    .clone()
                    .or_else(|| dom.computed_style(frame, property));
                StyleValue {
                    property,
                    inline,
                    resolved,
                }
            })
            .collect();
        let parent_position = dom
            .inline_style(&parent, "position")
            .or_else(|| dom.computed_style(&parent, "position"));
        let parent_class = dom.attribute(&parent, "class");
        Ok(Self {
            parent,
            next_sibling,
            style,
            parent_position,
            parent_class,
        })
    }

    #[must_use]
    pub fn parent(&self) -> &N {
        &self.parent
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<&N> {
        self.next_sibling.as_ref()
    }

    /// Resolved `position` of the parent at capture time.
    #[must_use]
    pub fn parent_position(&self) -> Option<&str> {
        self.parent_position.as_deref()
    }

    /// `class` attribute of the parent at capture time.
    #[must_use]
    pub fn parent_class(&self) -> Option<&str> {
        self.parent_class.as_deref()
    }

    #[must_use]
    pub fn style(&self) -> &[StyleValue] {
        &self.style
    }

    #[must_use]
    pub fn style_value(&self, property: &str) -> Option<&StyleValue> {
        self.style.iter().find(|value| value.property == property)
    }

    /// True when `frame` sits under the captured parent, right before the
    /// captured sibling (or last, if that sibling has left the parent).
    #[must_use]
    pub fn is_in_place<D>(&self, dom: &D, frame: &N) -> bool
    where
        D: Dom<Node = N>,
    {
        if dom.parent(frame).as_ref() != Some(&self.parent) {
            return false;
        }
        let current_next = dom.next_sibling(frame);
        match self.live_reference(dom) {
            Some(reference) => current_next.as_ref() == Some(&reference),
            None => current_next.is_none(),
        }
    }

    /// Put `frame` back where it was captured and strip controller state
    /// from it.
    pub fn restore<D>(&self, dom: &mut D, frame: &N) -> Result<RestoreOutcome, DomError>
    where
        D: Dom<Node = N>,
    {
        self.restore_frame_state(dom, frame);

        if !dom.is_connected(&self.parent) {
            return Ok(RestoreOutcome::ParentDisconnected);
        }
        if self.is_in_place(dom, frame) {
            return Ok(RestoreOutcome::AlreadyInPlace);
        }
        let reference = self.live_reference(dom);
        dom.insert_before(&self.parent, frame, reference.as_ref())?;
        Ok(RestoreOutcome::Reinserted)
    }

    /// Captured sibling, if it is still a child of the captured parent.
    fn live_reference<D>(&self, dom: &D) -> Option<N>
    where
        D: Dom<Node = N>,
    {
        let sibling = self.next_sibling.as_ref()?;
        (dom.parent(sibling).as_ref() == Some(&self.parent)).then(|| sibling.clone())
    }

    fn restore_frame_state<D>(&self, dom: &mut D, frame: &N)
    where
        D: Dom<Node = N>,
    {
        for class in classes::ALL {
            if dom.has_class(frame, class) {
                dom.remove_class(frame, class);
            }
        }
        for value in &self.style {
            let current = dom.inline_style(frame, value.property);
            if current != value.inline {
                dom.set_inline_style(frame, value.property, value.inline.as_deref());
            }
        }
    }
}
