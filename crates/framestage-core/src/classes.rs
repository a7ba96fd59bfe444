#![forbid(unsafe_code)]

//! Class names shared by the controller and the stylesheet.

use crate::env::Control;

pub const CONTAINER: &str = "iframe-container";
pub const HEADER: &str = "iframe-header";
pub const TITLE: &str = "iframe-title";
pub const CONTROLS: &str = "iframe-controls";
pub const BUTTON: &str = "iframe-btn";
pub const BUTTON_THEATER: &str = "iframe-btn-theater";
pub const BUTTON_FULLSCREEN: &str = "iframe-btn-fullscreen";
pub const OVERLAY: &str = "iframe-overlay";
pub const OVERLAY_ACTIVE: &str = "active";
pub const THEATER_MODE: &str = "theater-mode";
pub const FULLSCREEN_MODE: &str = "fullscreen-mode";
pub const BODY_NO_SCROLL: &str = "body-no-scroll";

/// Classes that mark a non-normal presentation on the container.
pub const MODE_CLASSES: [&str; 2] = [THEATER_MODE, FULLSCREEN_MODE];

/// Every class the controller may add to some element. None of them may
/// remain on the frame after restore.
pub const ALL: [&str; 12] = [
    CONTAINER,
    HEADER,
    TITLE,
    CONTROLS,
    BUTTON,
    BUTTON_THEATER,
    BUTTON_FULLSCREEN,
    OVERLAY,
    OVERLAY_ACTIVE,
    THEATER_MODE,
    FULLSCREEN_MODE,
    BODY_NO_SCROLL,
];

#[must_use]
pub const fn button_variant(control: Control) -> &'static str {
    match control {
        Control::Theater => BUTTON_THEATER,
        Control::Fullscreen => BUTTON_FULLSCREEN,
    }
}
