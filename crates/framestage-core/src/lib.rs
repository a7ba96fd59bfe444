#![forbid(unsafe_code)]

//! `framestage-core` adds theater and fullscreen presentation modes to
//! embedded content frames.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment implements the
//!   [`Dom`], [`FullscreenApi`] and [`HostBindings`] seams and pushes input
//!   as [`HostEvent`]s.
//! - **Deterministic time**: debounce deadlines are computed from a
//!   monotonic [`core::time::Duration`] supplied by the host.
//! - **Exact undo**: detaching a controller restores the frame's original
//!   position and inline style and removes every node and listener it added.
//!
//! A page owns one [`Registry`]; each frame gets one [`FrameController`].

pub mod classes;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod env;
pub mod error;
pub mod event;
pub mod header;
pub mod id;
pub mod log;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod stylesheet;

pub use config::{ConfigError, FrameStageConfig};
pub use controller::{DetachOutcome, FrameController, Lifecycle, ListenerSet};
pub use debounce::Debouncer;
pub use env::{
    Control, Dom, Environment, FullscreenApi, FullscreenRequest, HostBindings, Listener,
    ListenerKind,
};
pub use error::{DomError, FrameStageError, Result};
pub use event::{HostEvent, is_cancel_key};
pub use header::{HeaderNodes, HeaderSpec};
pub use id::ControllerId;
pub use log::{DispatchOutcome, IgnoredReason, TransitionDispatch, TransitionLogEntry, Trigger};
pub use registry::{BootstrapReport, Registry, TeardownReport};
pub use snapshot::{OriginalPlacement, RestoreOutcome};
pub use state::{FullscreenVariant, Mode, Presentation};
pub use stylesheet::{STYLESHEET_ID, ensure_stylesheet, stylesheet_text};
