#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;

use framestage_core::{BootstrapReport, FrameStageConfig, TeardownReport};
use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Event;

use crate::page;

thread_local! {
    static UNLOAD: RefCell<Option<Closure<dyn FnMut(Event)>>> = const { RefCell::new(None) };
}

fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(func) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(func) = func.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = func.call1(&console, &JsValue::from_str(msg));
}

fn console_error(msg: &str) {
    console_call("error", msg);
}

fn console_warn(msg: &str) {
    console_call("warn", msg);
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn bootstrap_summary(report: &BootstrapReport) -> JsValue {
    let obj = Object::new();
    set_js(
        &obj,
        "attached",
        JsValue::from(report.attached.len() as u32),
    );
    set_js(&obj, "failed", JsValue::from(report.failures.len() as u32));
    set_js(
        &obj,
        "stylesheetInjected",
        JsValue::from_bool(report.stylesheet_injected),
    );
    set_js(&obj, "deferred", JsValue::FALSE);
    obj.into()
}

fn teardown_summary(report: &TeardownReport) -> JsValue {
    let obj = Object::new();
    set_js(&obj, "restored", JsValue::from(report.restored as u32));
    set_js(
        &obj,
        "parentDisconnected",
        JsValue::from(report.parent_disconnected as u32),
    );
    set_js(&obj, "failed", JsValue::from(report.failures.len() as u32));
    obj.into()
}

fn report_failures(report: &BootstrapReport) {
    for (index, err) in &report.failures {
        console_warn(&format!("framestage: frame #{index} skipped: {err}"));
    }
}

fn boot_now(config: FrameStageConfig) -> Result<JsValue, JsValue> {
    if page::is_active() {
        page::shutdown();
    }
    let report = page::boot(config)?;
    report_failures(&report);
    install_unload_teardown();
    Ok(bootstrap_summary(&report))
}

fn install_unload_teardown() {
    let Some(window) = web_sys::window() else {
        return;
    };
    UNLOAD.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            return;
        };
        if slot.is_some() {
            return;
        }
        let closure = Closure::<dyn FnMut(Event)>::new(|_event: Event| {
            if let Some(report) = page::shutdown() {
                for (id, err) in &report.failures {
                    console_warn(&format!("framestage: teardown of {id} failed: {err}"));
                }
            }
        });
        if window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())
            .is_ok()
        {
            *slot = Some(closure);
        }
    });
}

fn remove_unload_teardown() {
    let Some(window) = web_sys::window() else {
        return;
    };
    UNLOAD.with(|slot| {
        let Ok(mut slot) = slot.try_borrow_mut() else {
            return;
        };
        if let Some(closure) = slot.take() {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                closure.as_ref().unchecked_ref(),
            );
        }
    });
}

/// Parse an optional JSON config, tear down any previous page state and
/// attach controllers once the document is parsed.
#[wasm_bindgen(js_name = init)]
pub fn init(config_json: Option<String>) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let config = match config_json.as_deref() {
        Some(json) => {
            FrameStageConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?
        }
        None => FrameStageConfig::default(),
    };
    if page::is_active() {
        page::shutdown();
    }

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() != "loading" {
        return boot_now(config);
    }

    let on_ready = Closure::once_into_js(move |_event: Event| {
        if let Err(err) = boot_now(config) {
            console_error(&format!("framestage init failed: {err:?}"));
        }
    });
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        .map_err(|err| {
            console_error("framestage: could not wait for DOMContentLoaded");
            err
        })?;
    let obj = Object::new();
    set_js(&obj, "deferred", JsValue::TRUE);
    Ok(obj.into())
}

/// Detach every controller and restore all frames.
#[wasm_bindgen(js_name = teardown)]
pub fn teardown() -> JsValue {
    remove_unload_teardown();
    match page::shutdown() {
        Some(report) => teardown_summary(&report),
        None => JsValue::NULL,
    }
}

#[wasm_bindgen(js_name = controllerCount)]
pub fn controller_count() -> u32 {
    u32::try_from(page::controller_count()).unwrap_or(u32::MAX)
}

#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    if let Err(err) = init(None) {
        console_error(&format!("framestage start failed: {err:?}"));
    }
}
