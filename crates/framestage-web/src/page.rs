#![forbid(unsafe_code)]

//! Page-wide state: one environment and one registry per document.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use framestage_core::{
    BootstrapReport, ControllerId, FrameStageConfig, HostEvent, Registry, TeardownReport,
};
use tracing::{debug, warn};
use wasm_bindgen::JsValue;
use web_time::Instant;

use crate::web_env::{EventSink, WebEnv};

struct PageState {
    env: WebEnv,
    registry: Registry<WebEnv>,
    epoch: Instant,
}

thread_local! {
    static PAGE: RefCell<Option<PageState>> = const { RefCell::new(None) };
}

/// Route a browser event to its controller.
///
/// Events arriving while the page state is borrowed (a synchronous
/// re-entrant dispatch) or after teardown are dropped.
pub(crate) fn dispatch_to(id: &ControllerId, event: HostEvent) {
    PAGE.with(|page| {
        let Ok(mut guard) = page.try_borrow_mut() else {
            warn!(id = %id, ?event, "re-entrant event dropped");
            return;
        };
        let Some(state) = guard.as_mut() else {
            return;
        };
        let now = state.epoch.elapsed();
        state.registry.dispatch(&mut state.env, id, event, now);
    });
}

pub(crate) fn is_active() -> bool {
    PAGE.with(|page| page.try_borrow().is_ok_and(|guard| guard.is_some()))
}

pub(crate) fn controller_count() -> usize {
    PAGE.with(|page| {
        page.try_borrow()
            .map(|guard| guard.as_ref().map_or(0, |state| state.registry.len()))
            .unwrap_or(0)
    })
}

/// Attach controllers to every frame matching the configured selector.
pub(crate) fn boot(config: FrameStageConfig) -> Result<BootstrapReport, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let sink: EventSink = Rc::new(|id: &ControllerId, event: HostEvent| dispatch_to(id, event));
    let mut env = WebEnv::new(window, document, sink);

    let frames = env
        .query_all(&config.frame_selector)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let mut registry = Registry::new(config);
    let report = registry.bootstrap(&mut env, frames);

    let state = PageState {
        env,
        registry,
        epoch: Instant::now(),
    };
    PAGE.with(|page| {
        page.try_borrow_mut()
            .map(|mut guard| *guard = Some(state))
            .map_err(|_| JsValue::from_str("page state is busy"))
    })?;
    Ok(report)
}

/// Detach every controller and drop the page state.
pub(crate) fn shutdown() -> Option<TeardownReport> {
    let state = PAGE.with(|page| {
        page.try_borrow_mut()
            .ok()
            .and_then(|mut guard| guard.take())
    });
    let Some(PageState {
        mut env,
        mut registry,
        ..
    }) = state
    else {
        return None;
    };
    let ids: Vec<ControllerId> = registry.ids().cloned().collect();
    let report = registry.teardown(&mut env);
    for id in &ids {
        env.release(id);
    }
    debug!(controllers = ids.len(), "page torn down");
    Some(report)
}
