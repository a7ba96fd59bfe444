#![forbid(unsafe_code)]

//! Browser binding for framestage.
//!
//! [`web_env::WebEnv`] implements the controller seams over `web-sys`, and
//! the `wasm-bindgen` exports drive a page-wide registry:
//! - `init(configJson?)` attaches a controller to every frame matching the
//!   configured selector, after `DOMContentLoaded` if the document is still
//!   loading,
//! - `teardown()` restores every frame (also run on `beforeunload`),
//! - `controllerCount()` reports live controllers.
//!
//! Vendor name tables live in [`vendor`] and are usable on every target.

pub mod vendor;

#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
pub mod web_env;

#[cfg(target_arch = "wasm32")]
pub use wasm::{controller_count, init, teardown};
