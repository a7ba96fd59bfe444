#![forbid(unsafe_code)]

//! Test support for framestage.
//!
//! [`MemoryDom`] implements the full controller environment over an arena
//! tree, with scriptable native fullscreen ([`FullscreenBehavior`]) and
//! inspectable listener and wake registrations. [`fixtures`] builds the
//! reference pages the integration tests and benches share.

pub mod dom;
pub mod fixtures;

pub use dom::{FullscreenBehavior, MemoryDom, NodeId};
pub use fixtures::{ArticlePage, article_page, ms};
