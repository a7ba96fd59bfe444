#![forbid(unsafe_code)]

//! Page-level ownership of frame controllers.
//!
//! The registry injects the shared stylesheet, attaches one controller per
//! discovered frame, routes host events by [`ControllerId`], and tears every
//! controller down on page exit. A failing frame never blocks its siblings.

use core::time::Duration;

use tracing::{debug, warn};

use crate::config::FrameStageConfig;
use crate::controller::{DetachOutcome, FrameController};
use crate::env::Environment;
use crate::error::FrameStageError;
use crate::event::HostEvent;
use crate::id::ControllerId;
use crate::log::TransitionDispatch;
use crate::stylesheet::ensure_stylesheet;

/// Result of [`Registry::bootstrap`].
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub attached: Vec<ControllerId>,
    /// Index of the frame in the bootstrap input and why it was skipped.
    pub failures: Vec<(usize, FrameStageError)>,
    pub stylesheet_injected: bool,
}

/// Result of [`Registry::teardown`].
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub restored: usize,
    pub parent_disconnected: usize,
    pub failures: Vec<(ControllerId, FrameStageError)>,
}

/// Controllers of one page, in attach order.
pub struct Registry<D: Environment> {
    config: FrameStageConfig,
    controllers: Vec<FrameController<D>>,
}

impl<D: Environment> core::fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("controllers", &self.controllers)
            .finish_non_exhaustive()
    }
}

impl<D: Environment> Registry<D> {
    #[must_use]
    pub fn new(config: FrameStageConfig) -> Self {
        Self {
            config,
            controllers: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FrameStageConfig {
        &self.config
    }

    /// Inject the stylesheet and attach a controller to each frame.
    pub fn bootstrap<I>(&mut self, env: &mut D, frames: I) -> BootstrapReport
    where
        I: IntoIterator<Item = D::Node>,
    {
        let mut report = BootstrapReport::default();
        match ensure_stylesheet(env, &self.config) {
            Ok(injected) => report.stylesheet_injected = injected,
            Err(err) => warn!(error = %err, "stylesheet injection failed"),
        }

        for (index, frame) in frames.into_iter().enumerate() {
            if self.controllers.iter().any(|c| c.frame() == &frame) {
                continue;
            }
            let mut controller = FrameController::create(frame, self.config.clone());
            match controller.attach(env) {
                Ok(()) => {
                    report.attached.push(controller.id().clone());
                    self.controllers.push(controller);
                }
                Err(err) => {
                    warn!(index, error = %err, "frame skipped");
                    report.failures.push((index, err));
                }
            }
        }
        debug!(
            attached = report.attached.len(),
            failed = report.failures.len(),
            "frame stage bootstrap complete"
        );
        report
    }

    /// Register an already attached controller.
    pub fn adopt(&mut self, controller: FrameController<D>) -> Result<(), FrameStageError> {
        if controller.container().is_none() {
            return Err(FrameStageError::NotAttached {
                id: controller.id().to_string(),
            });
        }
        self.controllers.push(controller);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ControllerId> {
        self.controllers.iter().map(FrameController::id)
    }

    #[must_use]
    pub fn get(&self, id: &ControllerId) -> Option<&FrameController<D>> {
        self.controllers.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: &ControllerId) -> Option<&mut FrameController<D>> {
        self.controllers.iter_mut().find(|c| c.id() == id)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &FrameController<D>> {
        self.controllers.iter()
    }

    /// Route a host event to its controller. `None` for unknown ids, which
    /// happens when a callback races a teardown.
    pub fn dispatch(
        &mut self,
        env: &mut D,
        id: &ControllerId,
        event: HostEvent,
        now: Duration,
    ) -> Option<TransitionDispatch> {
        let Some(controller) = self.get_mut(id) else {
            debug!(id = %id, "event for unknown controller dropped");
            return None;
        };
        Some(controller.handle(env, event, now))
    }

    /// Drain rendered transition logs of every controller.
    pub fn take_logs(&mut self) -> Vec<String> {
        self.controllers
            .iter_mut()
            .flat_map(FrameController::take_logs)
            .collect()
    }

    /// Detach every controller. Failures are isolated per controller.
    pub fn teardown(&mut self, env: &mut D) -> TeardownReport {
        let mut report = TeardownReport::default();
        for mut controller in self.controllers.drain(..) {
            match controller.detach(env) {
                Ok(DetachOutcome::Restored) => report.restored += 1,
                Ok(DetachOutcome::ParentDisconnected) => report.parent_disconnected += 1,
                Err(err) => {
                    warn!(id = %controller.id(), error = %err, "controller teardown failed");
                    report.failures.push((controller.id().clone(), err));
                }
            }
        }
        debug!(
            restored = report.restored,
            parent_disconnected = report.parent_disconnected,
            failed = report.failures.len(),
            "frame stage teardown complete"
        );
        report
    }
}
