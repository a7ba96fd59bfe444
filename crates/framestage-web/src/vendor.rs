#![forbid(unsafe_code)]

//! Browser API names, including legacy vendor-prefixed variants.
//!
//! Lists are in lookup order: the first name present on the target wins.

use framestage_core::{HostEvent, ListenerKind};

pub const REQUEST_FULLSCREEN: [&str; 4] = [
    "requestFullscreen",
    "webkitRequestFullscreen",
    "mozRequestFullScreen",
    "msRequestFullscreen",
];

pub const EXIT_FULLSCREEN: [&str; 4] = [
    "exitFullscreen",
    "webkitExitFullscreen",
    "mozCancelFullScreen",
    "msExitFullscreen",
];

pub const FULLSCREEN_ELEMENT: [&str; 4] = [
    "fullscreenElement",
    "webkitFullscreenElement",
    "mozFullScreenElement",
    "msFullscreenElement",
];

/// Every variant is subscribed; browsers fire only their own.
pub const FULLSCREEN_CHANGE: [&str; 4] = [
    "fullscreenchange",
    "webkitfullscreenchange",
    "mozfullscreenchange",
    "MSFullscreenChange",
];

/// Refusals of legacy requests, which return no promise, only arrive as these.
pub const FULLSCREEN_ERROR: [&str; 4] = [
    "fullscreenerror",
    "webkitfullscreenerror",
    "mozfullscreenerror",
    "MSFullscreenError",
];

const FULLSCREEN_EVENTS: [&str; 8] = [
    FULLSCREEN_CHANGE[0],
    FULLSCREEN_CHANGE[1],
    FULLSCREEN_CHANGE[2],
    FULLSCREEN_CHANGE[3],
    FULLSCREEN_ERROR[0],
    FULLSCREEN_ERROR[1],
    FULLSCREEN_ERROR[2],
    FULLSCREEN_ERROR[3],
];

const KEYDOWN: [&str; 1] = ["keydown"];
const CLICK: [&str; 1] = ["click"];

/// DOM event names backing one listener kind.
#[must_use]
pub fn event_names(kind: ListenerKind) -> &'static [&'static str] {
    match kind {
        ListenerKind::FullscreenChange => &FULLSCREEN_EVENTS,
        ListenerKind::CancelKey => &KEYDOWN,
        ListenerKind::OverlayClick | ListenerKind::ControlClick(_) => &CLICK,
    }
}

/// Host event for a document-level fullscreen event named `name`.
#[must_use]
pub fn fullscreen_event(name: &str) -> HostEvent {
    if FULLSCREEN_ERROR.contains(&name) {
        HostEvent::NativeFullscreenRejected
    } else {
        HostEvent::FullscreenChanged
    }
}

#[cfg(test)]
mod tests {
    use super::{FULLSCREEN_CHANGE, FULLSCREEN_ERROR, event_names, fullscreen_event};
    use framestage_core::{Control, HostEvent, ListenerKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_name_is_tried_first() {
        assert_eq!(super::REQUEST_FULLSCREEN[0], "requestFullscreen");
        assert_eq!(super::EXIT_FULLSCREEN[0], "exitFullscreen");
        assert_eq!(super::FULLSCREEN_ELEMENT[0], "fullscreenElement");
    }

    #[test]
    fn listener_kinds_map_to_dom_events() {
        let fullscreen = event_names(ListenerKind::FullscreenChange);
        assert_eq!(fullscreen.len(), 8);
        assert!(
            FULLSCREEN_CHANGE
                .iter()
                .all(|name| fullscreen.contains(name))
        );
        assert!(
            FULLSCREEN_ERROR
                .iter()
                .all(|name| fullscreen.contains(name))
        );
        assert_eq!(event_names(ListenerKind::CancelKey), &["keydown"][..]);
        assert_eq!(
            event_names(ListenerKind::ControlClick(Control::Theater)),
            &["click"][..]
        );
    }

    #[test]
    fn fullscreen_errors_report_rejection() {
        for name in FULLSCREEN_ERROR {
            assert_eq!(fullscreen_event(name), HostEvent::NativeFullscreenRejected);
        }
        for name in FULLSCREEN_CHANGE {
            assert_eq!(fullscreen_event(name), HostEvent::FullscreenChanged);
        }
    }
}
