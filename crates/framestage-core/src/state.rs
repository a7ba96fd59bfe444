#![forbid(unsafe_code)]

//! Presentation states.

use crate::classes;

/// Externally visible presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Theater,
    Fullscreen,
}

/// How fullscreen is being provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullscreenVariant {
    /// Native Fullscreen API on the container; the browser paints the backdrop.
    Native,
    /// Fixed full-viewport styling with the dimming overlay and scroll lock.
    Simulated,
}

/// Full controller state, including the fullscreen variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presentation {
    #[default]
    Normal,
    Theater,
    Fullscreen(FullscreenVariant),
}

impl Presentation {
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::Normal => Mode::Normal,
            Self::Theater => Mode::Theater,
            Self::Fullscreen(_) => Mode::Fullscreen,
        }
    }

    #[must_use]
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Overlay and scroll lock are active in this state.
    #[must_use]
    pub const fn dims_page(self) -> bool {
        matches!(
            self,
            Self::Theater | Self::Fullscreen(FullscreenVariant::Simulated)
        )
    }

    /// Container class that marks this state, if any.
    #[must_use]
    pub const fn mode_class(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Theater => Some(classes::THEATER_MODE),
            Self::Fullscreen(_) => Some(classes::FULLSCREEN_MODE),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Theater => "theater",
            Self::Fullscreen(FullscreenVariant::Native) => "fullscreen_native",
            Self::Fullscreen(FullscreenVariant::Simulated) => "fullscreen_simulated",
        }
    }
}
