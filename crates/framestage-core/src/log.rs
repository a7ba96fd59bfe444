#![forbid(unsafe_code)]

//! Structured transition records.
//!
//! Every dispatch produces one [`TransitionLogEntry`]; controllers keep a
//! bounded buffer of them that hosts drain as `key=value` lines.

use core::time::Duration;

use crate::env::{Control, FullscreenRequest};
use crate::id::ControllerId;
use crate::state::Presentation;

pub(crate) const MAX_TRANSITION_LOGS: usize = 256;

/// What asked for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ToggleTheater,
    ToggleFullscreen,
    ExitMode,
    ControlClick(Control),
    DebounceFlush,
    OverlayClick,
    CancelKey,
    FullscreenChange,
    NativeRejected,
    Detach,
}

impl Trigger {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ToggleTheater => "toggle_theater",
            Self::ToggleFullscreen => "toggle_fullscreen",
            Self::ExitMode => "exit_mode",
            Self::ControlClick(Control::Theater) => "theater_click",
            Self::ControlClick(Control::Fullscreen) => "fullscreen_click",
            Self::DebounceFlush => "debounce_flush",
            Self::OverlayClick => "overlay_click",
            Self::CancelKey => "cancel_key",
            Self::FullscreenChange => "fullscreen_change",
            Self::NativeRejected => "native_rejected",
            Self::Detach => "detach",
        }
    }
}

/// Why a signal left the controller untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    NotAttached,
    AlreadyNormal,
    NotCancelKey,
    NothingDue,
    NativeFullscreenStillActive,
    NotNativeFullscreen,
    NotFullscreen,
}

impl IgnoredReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotAttached => "not_attached",
            Self::AlreadyNormal => "already_normal",
            Self::NotCancelKey => "not_cancel_key",
            Self::NothingDue => "nothing_due",
            Self::NativeFullscreenStillActive => "native_fullscreen_still_active",
            Self::NotNativeFullscreen => "not_native_fullscreen",
            Self::NotFullscreen => "not_fullscreen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// Activation parked in the debouncer until `deadline`.
    Scheduled {
        deadline: Duration,
    },
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionLogEntry {
    /// Assigned to applied transitions only.
    pub sequence: Option<u64>,
    pub trigger: Trigger,
    pub from: Presentation,
    pub to: Presentation,
    pub outcome: DispatchOutcome,
}

impl TransitionLogEntry {
    #[must_use]
    pub fn render(&self, owner: &ControllerId) -> String {
        let mut line = format!(
            "frame_stage id={owner} trigger={} from={} to={}",
            self.trigger.label(),
            self.from.label(),
            self.to.label()
        );
        if let Some(sequence) = self.sequence {
            line.push_str(&format!(" seq={sequence}"));
        }
        match self.outcome {
            DispatchOutcome::Applied => line.push_str(" outcome=applied"),
            DispatchOutcome::Scheduled { deadline } => {
                line.push_str(&format!(
                    " outcome=scheduled deadline_ms={}",
                    deadline.as_millis()
                ));
            }
            DispatchOutcome::Ignored(reason) => {
                line.push_str(&format!(" outcome=ignored reason={}", reason.label()));
            }
        }
        line
    }
}

/// Result of one controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDispatch {
    pub log: TransitionLogEntry,
    /// Answer of the native fullscreen request, when one was made.
    pub fullscreen_request: Option<FullscreenRequest>,
}

impl TransitionDispatch {
    #[must_use]
    pub const fn applied(&self) -> bool {
        matches!(self.log.outcome, DispatchOutcome::Applied)
    }

    #[must_use]
    pub fn ignored_reason(&self) -> Option<IgnoredReason> {
        match self.log.outcome {
            DispatchOutcome::Ignored(reason) => Some(reason),
            _ => None,
        }
    }
}

pub(crate) fn push_bounded<T>(queue: &mut Vec<T>, item: T, limit: usize) {
    if queue.len() >= limit {
        let overflow = queue.len() - limit + 1;
        queue.drain(..overflow);
    }
    queue.push(item);
}
