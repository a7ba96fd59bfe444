#![forbid(unsafe_code)]

//! Per-frame presentation controller.
//!
//! A [`FrameController`] is created as an inert descriptor and only touches
//! the document in [`FrameController::attach`]. Once attached it enforces:
//! - exactly one presentation state, mirrored by at most one mode class on
//!   the container,
//! - overlay and scroll lock active only in theater and simulated fullscreen,
//! - a cancel-key listener registered exactly while the state is not normal,
//! - full undo of DOM and listener changes in [`FrameController::detach`].
//!
//! Native fullscreen is requested optimistically. A pending request that
//! later rejects degrades in place to simulated fullscreen, and an external
//! exit of native fullscreen is picked up from the change notification.

use core::fmt;
use core::time::Duration;

use bitflags::bitflags;
use tracing::{debug, trace, warn};

use crate::classes;
use crate::config::FrameStageConfig;
use crate::debounce::Debouncer;
use crate::env::{Control, Dom, Environment, FullscreenRequest, Listener, ListenerKind};
use crate::error::{DomError, FrameStageError};
use crate::event::{HostEvent, is_cancel_key};
use crate::header::{HeaderNodes, HeaderSpec, render_header};
use crate::id::ControllerId;
use crate::log::{
    DispatchOutcome, IgnoredReason, MAX_TRANSITION_LOGS, TransitionDispatch, TransitionLogEntry,
    Trigger, push_bounded,
};
use crate::snapshot::{OriginalPlacement, RestoreOutcome};
use crate::state::{FullscreenVariant, Mode, Presentation};

bitflags! {
    /// Listeners a controller currently holds with its host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ListenerSet: u8 {
        const FULLSCREEN_CHANGE = 1 << 0;
        const CANCEL_KEY = 1 << 1;
        const OVERLAY_CLICK = 1 << 2;
        const THEATER_CLICK = 1 << 3;
        const FULLSCREEN_CLICK = 1 << 4;
    }
}

impl ListenerSet {
    #[must_use]
    pub const fn for_kind(kind: ListenerKind) -> Self {
        match kind {
            ListenerKind::FullscreenChange => Self::FULLSCREEN_CHANGE,
            ListenerKind::CancelKey => Self::CANCEL_KEY,
            ListenerKind::OverlayClick => Self::OVERLAY_CLICK,
            ListenerKind::ControlClick(Control::Theater) => Self::THEATER_CLICK,
            ListenerKind::ControlClick(Control::Fullscreen) => Self::FULLSCREEN_CLICK,
        }
    }

    const KINDS: [ListenerKind; 5] = [
        ListenerKind::FullscreenChange,
        ListenerKind::CancelKey,
        ListenerKind::OverlayClick,
        ListenerKind::ControlClick(Control::Theater),
        ListenerKind::ControlClick(Control::Fullscreen),
    ];
}

/// DOM lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Attached,
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// Frame is back at its captured position; container and overlay are gone.
    Restored,
    /// The captured parent left the document. The frame stays inside its
    /// container; overlay and listeners were still removed.
    ParentDisconnected,
}

struct AttachedParts<N> {
    placement: OriginalPlacement<N>,
    container: N,
    header: HeaderNodes<N>,
    overlay: N,
}

/// Presentation controller for one content frame.
pub struct FrameController<D: Dom> {
    id: ControllerId,
    frame: D::Node,
    config: FrameStageConfig,
    lifecycle: Lifecycle,
    presentation: Presentation,
    parts: Option<AttachedParts<D::Node>>,
    debouncer: Debouncer,
    listeners: ListenerSet,
    logs: Vec<TransitionLogEntry>,
    next_sequence: u64,
}

impl<D: Dom> fmt::Debug for FrameController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameController")
            .field("id", &self.id)
            .field("frame", &self.frame)
            .field("lifecycle", &self.lifecycle)
            .field("presentation", &self.presentation)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<D: Environment> FrameController<D> {
    /// Describe a controller for `frame` without touching the document.
    #[must_use]
    pub fn create(frame: D::Node, config: FrameStageConfig) -> Self {
        let id = ControllerId::generate(&config.id_prefix);
        Self::with_id(id, frame, config)
    }

    /// Like [`FrameController::create`] with an explicit id.
    #[must_use]
    pub fn with_id(id: ControllerId, frame: D::Node, config: FrameStageConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce());
        Self {
            id,
            frame,
            config,
            lifecycle: Lifecycle::Created,
            presentation: Presentation::Normal,
            parts: None,
            debouncer,
            listeners: ListenerSet::empty(),
            logs: Vec::new(),
            next_sequence: 1,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ControllerId {
        &self.id
    }

    #[must_use]
    pub fn frame(&self) -> &D::Node {
        &self.frame
    }

    #[must_use]
    pub fn config(&self) -> &FrameStageConfig {
        &self.config
    }

    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.presentation.mode()
    }

    #[must_use]
    pub const fn presentation(&self) -> Presentation {
        self.presentation
    }

    #[must_use]
    pub const fn listeners(&self) -> ListenerSet {
        self.listeners
    }

    #[must_use]
    pub const fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    #[must_use]
    pub fn container(&self) -> Option<&D::Node> {
        self.parts.as_ref().map(|parts| &parts.container)
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&D::Node> {
        self.parts.as_ref().map(|parts| &parts.overlay)
    }

    #[must_use]
    pub fn header(&self) -> Option<&HeaderNodes<D::Node>> {
        self.parts.as_ref().map(|parts| &parts.header)
    }

    #[must_use]
    pub fn placement(&self) -> Option<&OriginalPlacement<D::Node>> {
        self.parts.as_ref().map(|parts| &parts.placement)
    }

    /// Structured records of recent dispatches, oldest first.
    #[must_use]
    pub fn log_entries(&self) -> &[TransitionLogEntry] {
        &self.logs
    }

    /// Drain recent dispatch records as rendered lines.
    pub fn take_logs(&mut self) -> Vec<String> {
        let id = &self.id;
        self.logs.drain(..).map(|entry| entry.render(id)).collect()
    }

    /// Check the DOM against the presentation state.
    #[must_use]
    pub fn is_consistent(&self, env: &D) -> bool {
        let Some(parts) = self.parts.as_ref() else {
            return self.presentation.is_normal();
        };
        let expected = self.presentation.mode_class();
        let classes_match = classes::MODE_CLASSES
            .into_iter()
            .all(|class| env.has_class(&parts.container, class) == (Some(class) == expected));
        let overlay_matches =
            env.has_class(&parts.overlay, classes::OVERLAY_ACTIVE) == self.presentation.dims_page();
        let cancel_matches =
            self.listeners.contains(ListenerSet::CANCEL_KEY) != self.presentation.is_normal();
        classes_match && overlay_matches && cancel_matches
    }

    // -- lifecycle ---------------------------------------------------------

    /// Capture the frame's placement, wrap it, render the header and overlay,
    /// and register listeners.
    ///
    /// On failure every partial change is undone and the controller stays in
    /// [`Lifecycle::Created`].
    pub fn attach(&mut self, env: &mut D) -> Result<(), FrameStageError> {
        if self.lifecycle != Lifecycle::Created {
            return Err(FrameStageError::AlreadyAttached {
                id: self.id.to_string(),
            });
        }

        let placement = OriginalPlacement::capture(env, &self.frame)?;
        let body = env.body().ok_or(FrameStageError::NoBody)?;

        let container = env.create_element("div")?;
        env.add_class(&container, classes::CONTAINER);
        env.set_attribute(&container, "id", self.id.as_str())?;

        let title = env.attribute(&self.frame, "title");
        let spec = HeaderSpec::for_frame(title.as_deref(), &self.config);
        let header = render_header(env, &spec)?;

        let overlay = env.create_element("div")?;
        env.add_class(&overlay, classes::OVERLAY);
        env.set_attribute(&overlay, "id", &self.id.overlay_id())?;

        if let Err(err) = self.wrap(env, &placement, &container, &header.header, &overlay, &body) {
            unwind_wrap(env, &placement, &self.frame, &container, &overlay);
            return Err(err.into());
        }

        if let Err(err) = self.bind(env, &header, &overlay) {
            self.release_listeners(env);
            unwind_wrap(env, &placement, &self.frame, &container, &overlay);
            return Err(err.into());
        }

        self.parts = Some(AttachedParts {
            placement,
            container,
            header,
            overlay,
        });
        self.lifecycle = Lifecycle::Attached;
        debug!(id = %self.id, title = %spec.title, "frame stage attached");
        Ok(())
    }

    /// Force normal mode, drop listeners and pending wakes, restore the
    /// frame and remove the container and overlay.
    ///
    /// A failed restore still leaves the controller detached: the overlay is
    /// gone and nothing is listened to, but the frame stays in its bare
    /// container.
    pub fn detach(&mut self, env: &mut D) -> Result<DetachOutcome, FrameStageError> {
        if self.lifecycle != Lifecycle::Attached {
            return Err(FrameStageError::NotAttached {
                id: self.id.to_string(),
            });
        }
        if !self.presentation.is_normal() {
            self.exit_with(env, Trigger::Detach);
        }
        let dropped = self.debouncer.clear();
        if !dropped.is_empty() {
            debug!(id = %self.id, pending = dropped.len(), "pending activations dropped");
        }
        for control in Control::ALL {
            env.cancel_wake(&self.id, control);
        }
        self.release_listeners(env);

        let Some(parts) = self.parts.take() else {
            return Err(FrameStageError::NotAttached {
                id: self.id.to_string(),
            });
        };
        self.lifecycle = Lifecycle::Detached;
        env.remove(&parts.overlay);

        let restored = match parts.placement.restore(env, &self.frame) {
            Ok(restored) => restored,
            Err(err) => {
                warn!(
                    id = %self.id,
                    error = %err,
                    "frame restore failed; frame kept in its container"
                );
                return Err(err.into());
            }
        };
        match restored {
            RestoreOutcome::ParentDisconnected => {
                warn!(
                    id = %self.id,
                    "original parent left the document; frame kept in its container"
                );
                Ok(DetachOutcome::ParentDisconnected)
            }
            RestoreOutcome::Reinserted | RestoreOutcome::AlreadyInPlace => {
                env.remove(&parts.container);
                debug!(id = %self.id, "frame stage detached");
                Ok(DetachOutcome::Restored)
            }
        }
    }

    // -- transitions -------------------------------------------------------

    /// Normal <-> theater. From fullscreen, leaves fullscreen first.
    pub fn toggle_theater(&mut self, env: &mut D) -> TransitionDispatch {
        let trigger = Trigger::ToggleTheater;
        let Some((container, overlay)) = self.nodes() else {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        };
        let from = self.presentation;
        match from {
            Presentation::Theater => self.exit_with(env, trigger),
            Presentation::Normal => {
                self.enter_theater(env, &container, &overlay);
                self.applied(trigger, from, None)
            }
            Presentation::Fullscreen(_) => {
                self.clear_presentation(env, &container, &overlay);
                self.enter_theater(env, &container, &overlay);
                self.applied(trigger, from, None)
            }
        }
    }

    /// Normal <-> fullscreen. From theater, leaves theater first.
    pub fn toggle_fullscreen(&mut self, env: &mut D) -> TransitionDispatch {
        let trigger = Trigger::ToggleFullscreen;
        let Some((container, overlay)) = self.nodes() else {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        };
        let from = self.presentation;
        match from {
            Presentation::Fullscreen(_) => self.exit_with(env, trigger),
            Presentation::Normal => {
                let request = self.enter_fullscreen(env, &container, &overlay);
                self.applied(trigger, from, Some(request))
            }
            Presentation::Theater => {
                self.clear_presentation(env, &container, &overlay);
                let request = self.enter_fullscreen(env, &container, &overlay);
                self.applied(trigger, from, Some(request))
            }
        }
    }

    /// Return to normal mode. No-op when already normal.
    pub fn exit_mode(&mut self, env: &mut D) -> TransitionDispatch {
        self.exit_with(env, Trigger::ExitMode)
    }

    /// A pending native request was rejected after the fact.
    pub fn native_fullscreen_rejected(&mut self, env: &mut D) -> TransitionDispatch {
        let trigger = Trigger::NativeRejected;
        let Some((_, overlay)) = self.nodes() else {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        };
        let from = self.presentation;
        if from != Presentation::Fullscreen(FullscreenVariant::Native) {
            return self.ignored(trigger, IgnoredReason::NotNativeFullscreen);
        }
        // Only a request that never took effect can be rejected.
        if env.is_fullscreen_active() {
            return self.ignored(trigger, IgnoredReason::NativeFullscreenStillActive);
        }
        self.dim_page(env, &overlay);
        self.presentation = Presentation::Fullscreen(FullscreenVariant::Simulated);
        self.applied(trigger, from, None)
    }

    /// Resynchronize with the document after a fullscreen-change notification.
    pub fn fullscreen_changed(&mut self, env: &mut D) -> TransitionDispatch {
        let trigger = Trigger::FullscreenChange;
        if self.parts.is_none() {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        }
        if self.presentation.mode() != Mode::Fullscreen {
            return self.ignored(trigger, IgnoredReason::NotFullscreen);
        }
        if env.is_fullscreen_active() {
            return self.ignored(trigger, IgnoredReason::NativeFullscreenStillActive);
        }
        self.exit_with(env, trigger)
    }

    pub fn key_pressed(&mut self, env: &mut D, key: &str, key_code: u32) -> TransitionDispatch {
        let trigger = Trigger::CancelKey;
        if self.parts.is_none() {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        }
        if !is_cancel_key(key, key_code) {
            return self.ignored(trigger, IgnoredReason::NotCancelKey);
        }
        self.exit_with(env, trigger)
    }

    pub fn overlay_clicked(&mut self, env: &mut D) -> TransitionDispatch {
        self.exit_with(env, Trigger::OverlayClick)
    }

    /// Park a control click in the debouncer and arm the host wake.
    pub fn activate(&mut self, env: &mut D, control: Control, now: Duration) -> TransitionDispatch {
        let trigger = Trigger::ControlClick(control);
        if self.parts.is_none() {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        }
        let deadline = self.debouncer.activate(control, now);
        env.schedule_wake(&self.id, control, self.debouncer.delay());
        let entry = TransitionLogEntry {
            sequence: None,
            trigger,
            from: self.presentation,
            to: self.presentation,
            outcome: DispatchOutcome::Scheduled { deadline },
        };
        trace!(id = %self.id, control = control.label(), "control activation scheduled");
        self.record(entry, None)
    }

    /// Apply every debounced toggle due at `now`, oldest activation first.
    ///
    /// The returned entry spans all applied toggles and carries the sequence
    /// number of the last one. It is not pushed to the transition log.
    pub fn flush_debounced(&mut self, env: &mut D, now: Duration) -> TransitionDispatch {
        let trigger = Trigger::DebounceFlush;
        if self.parts.is_none() {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        }
        let due = self.debouncer.take_due(now);
        if due.is_empty() {
            return self.ignored(trigger, IgnoredReason::NothingDue);
        }
        let from = self.presentation;
        let mut request = None;
        let mut sequence = None;
        for control in due {
            let dispatch = match control {
                Control::Theater => self.toggle_theater(env),
                Control::Fullscreen => self.toggle_fullscreen(env),
            };
            if dispatch.fullscreen_request.is_some() {
                request = dispatch.fullscreen_request;
            }
            sequence = dispatch.log.sequence;
        }
        TransitionDispatch {
            log: TransitionLogEntry {
                sequence,
                trigger,
                from,
                to: self.presentation,
                outcome: DispatchOutcome::Applied,
            },
            fullscreen_request: request,
        }
    }

    /// Route one host signal.
    pub fn handle(&mut self, env: &mut D, event: HostEvent, now: Duration) -> TransitionDispatch {
        match event {
            HostEvent::ControlClicked(control) => self.activate(env, control, now),
            HostEvent::DebounceElapsed(control) => {
                let dispatch = self.flush_debounced(env, now);
                self.rearm(env, control, now);
                dispatch
            }
            HostEvent::OverlayClicked => self.overlay_clicked(env),
            HostEvent::Key { key, key_code } => self.key_pressed(env, &key, key_code),
            HostEvent::FullscreenChanged => self.fullscreen_changed(env),
            HostEvent::NativeFullscreenRejected => self.native_fullscreen_rejected(env),
        }
    }

    // -- internals ---------------------------------------------------------

    fn wrap(
        &self,
        env: &mut D,
        placement: &OriginalPlacement<D::Node>,
        container: &D::Node,
        header: &D::Node,
        overlay: &D::Node,
        body: &D::Node,
    ) -> Result<(), DomError> {
        env.insert_before(placement.parent(), container, Some(&self.frame))?;
        env.append_child(container, &self.frame)?;
        env.append_child(container, header)?;
        env.append_child(body, overlay)?;
        Ok(())
    }

    fn bind(
        &mut self,
        env: &mut D,
        header: &HeaderNodes<D::Node>,
        overlay: &D::Node,
    ) -> Result<(), DomError> {
        self.listen(env, Listener::FullscreenChange)?;
        for control in Control::ALL {
            let button = header.button(control).clone();
            self.listen(env, Listener::ControlClick(control, button))?;
        }
        self.listen(env, Listener::OverlayClick(overlay.clone()))
    }

    fn listen(&mut self, env: &mut D, listener: Listener<D::Node>) -> Result<(), DomError> {
        let flag = ListenerSet::for_kind(listener.kind());
        if self.listeners.contains(flag) {
            return Ok(());
        }
        env.listen(&self.id, listener)?;
        self.listeners.insert(flag);
        Ok(())
    }

    fn unlisten(&mut self, env: &mut D, kind: ListenerKind) {
        let flag = ListenerSet::for_kind(kind);
        if self.listeners.contains(flag) {
            env.unlisten(&self.id, kind);
            self.listeners.remove(flag);
        }
    }

    fn release_listeners(&mut self, env: &mut D) {
        for kind in ListenerSet::KINDS {
            self.unlisten(env, kind);
        }
    }

    fn rearm(&mut self, env: &mut D, control: Control, now: Duration) {
        if let Some(deadline) = self.debouncer.deadline(control) {
            env.schedule_wake(&self.id, control, deadline.saturating_sub(now));
        }
    }

    fn nodes(&self) -> Option<(D::Node, D::Node)> {
        self.parts
            .as_ref()
            .map(|parts| (parts.container.clone(), parts.overlay.clone()))
    }

    fn enter_theater(&mut self, env: &mut D, container: &D::Node, overlay: &D::Node) {
        env.add_class(container, classes::THEATER_MODE);
        self.dim_page(env, overlay);
        self.listen_cancel_key(env);
        self.presentation = Presentation::Theater;
    }

    fn enter_fullscreen(
        &mut self,
        env: &mut D,
        container: &D::Node,
        overlay: &D::Node,
    ) -> FullscreenRequest {
        let request = env.request_fullscreen(&self.id, container);
        env.add_class(container, classes::FULLSCREEN_MODE);
        self.presentation = match request {
            FullscreenRequest::Pending => Presentation::Fullscreen(FullscreenVariant::Native),
            FullscreenRequest::Rejected | FullscreenRequest::Unavailable => {
                self.dim_page(env, overlay);
                Presentation::Fullscreen(FullscreenVariant::Simulated)
            }
        };
        self.listen_cancel_key(env);
        request
    }

    fn dim_page(&self, env: &mut D, overlay: &D::Node) {
        env.add_class(overlay, classes::OVERLAY_ACTIVE);
        if let Some(body) = env.body() {
            env.add_class(&body, classes::BODY_NO_SCROLL);
        }
    }

    fn listen_cancel_key(&mut self, env: &mut D) {
        if let Err(err) = self.listen(env, Listener::CancelKey) {
            warn!(id = %self.id, error = %err, "cancel key listener unavailable");
        }
    }

    fn exit_with(&mut self, env: &mut D, trigger: Trigger) -> TransitionDispatch {
        let from = self.presentation;
        let Some((container, overlay)) = self.nodes() else {
            return self.ignored(trigger, IgnoredReason::NotAttached);
        };
        if from.is_normal() {
            return self.ignored(trigger, IgnoredReason::AlreadyNormal);
        }
        self.clear_presentation(env, &container, &overlay);
        self.applied(trigger, from, None)
    }

    fn clear_presentation(&mut self, env: &mut D, container: &D::Node, overlay: &D::Node) {
        if env.is_fullscreen_active() {
            env.exit_fullscreen();
        }
        for class in classes::MODE_CLASSES {
            env.remove_class(container, class);
        }
        env.remove_class(overlay, classes::OVERLAY_ACTIVE);
        if let Some(body) = env.body() {
            env.remove_class(&body, classes::BODY_NO_SCROLL);
        }
        self.unlisten(env, ListenerKind::CancelKey);
        self.presentation = Presentation::Normal;
    }

    fn applied(
        &mut self,
        trigger: Trigger,
        from: Presentation,
        request: Option<FullscreenRequest>,
    ) -> TransitionDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let entry = TransitionLogEntry {
            sequence: Some(sequence),
            trigger,
            from,
            to: self.presentation,
            outcome: DispatchOutcome::Applied,
        };
        debug!(
            id = %self.id,
            seq = sequence,
            trigger = trigger.label(),
            from = from.label(),
            to = self.presentation.label(),
            "frame stage transition"
        );
        self.record(entry, request)
    }

    fn ignored(&mut self, trigger: Trigger, reason: IgnoredReason) -> TransitionDispatch {
        trace!(
            id = %self.id,
            trigger = trigger.label(),
            reason = reason.label(),
            "frame stage signal ignored"
        );
        let entry = TransitionLogEntry {
            sequence: None,
            trigger,
            from: self.presentation,
            to: self.presentation,
            outcome: DispatchOutcome::Ignored(reason),
        };
        self.record(entry, None)
    }

    fn record(
        &mut self,
        entry: TransitionLogEntry,
        fullscreen_request: Option<FullscreenRequest>,
    ) -> TransitionDispatch {
        push_bounded(&mut self.logs, entry, MAX_TRANSITION_LOGS);
        TransitionDispatch {
            log: entry,
            fullscreen_request,
        }
    }
}

/// Undo a partial wrap: frame back in place, container and overlay removed.
fn unwind_wrap<D: Dom>(
    env: &mut D,
    placement: &OriginalPlacement<D::Node>,
    frame: &D::Node,
    container: &D::Node,
    overlay: &D::Node,
) {
    if let Err(err) = placement.restore(env, frame) {
        warn!(error = %err, "failed to restore frame while unwinding attach");
    }
    env.remove(container);
    env.remove(overlay);
}
