#![forbid(unsafe_code)]

//! Host-delivered input signals.

use crate::env::Control;

/// Legacy `keyCode` of the Escape key.
pub const CANCEL_KEY_CODE: u32 = 27;

/// One input signal delivered by the host to a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A header control was clicked; goes through the debouncer.
    ControlClicked(Control),
    /// The debounce wake of a control fired.
    DebounceElapsed(Control),
    OverlayClicked,
    /// Document-level key press.
    Key {
        key: String,
        key_code: u32,
    },
    /// Document fullscreen-change notification (any vendor variant).
    FullscreenChanged,
    /// A pending native fullscreen request settled as rejected.
    NativeFullscreenRejected,
}

impl HostEvent {
    #[must_use]
    pub fn key(key: impl Into<String>, key_code: u32) -> Self {
        Self::Key {
            key: key.into(),
            key_code,
        }
    }
}

/// True for the cancel key in any of its historical spellings.
#[must_use]
pub fn is_cancel_key(key: &str, key_code: u32) -> bool {
    matches!(key, "Escape" | "Esc") || key_code == CANCEL_KEY_CODE
}

#[cfg(test)]
mod tests {
    use super::is_cancel_key;

    #[test]
    fn cancel_key_spellings() {
        assert!(is_cancel_key("Escape", 0));
        assert!(is_cancel_key("Esc", 0));
        assert!(is_cancel_key("Unidentified", 27));
        assert!(!is_cancel_key("Enter", 13));
        assert!(!is_cancel_key("escape", 0));
    }
}
