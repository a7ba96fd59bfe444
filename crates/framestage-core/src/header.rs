#![forbid(unsafe_code)]

//! Header (title + controls) description and rendering.

use crate::classes;
use crate::config::FrameStageConfig;
use crate::env::{Control, Dom};
use crate::error::DomError;

/// Widescreen rectangle.
pub const THEATER_ICON: &str = concat!(
    r#"<svg width="20" height="20" viewBox="0 0 100 100" xmlns="http://www.w3.org/2000/svg" aria-hidden="true">"#,
    r#"<path fill="currentColor" d="M8.5 22.5A3.5 3.5 0 0 0 5 26v48a3.5 3.5 0 0 0 3.5 3.5h83A3.5 3.5 0 0 0 95 74V26a3.5 3.5 0 0 0-3.5-3.5h-83zm3.5 7h76v41H12v-41z"></path>"#,
    "</svg>"
);

/// Four outward corners.
pub const FULLSCREEN_ICON: &str = concat!(
    r#"<svg width="20" height="20" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg" aria-hidden="true">"#,
    r#"<path fill="currentColor" d="M3 3h6v2H5v4H3V3zm12 0h6v6h-2V5h-4V3zM3 15h2v4h4v2H3v-6zm16 0h2v6h-6v-2h4v-4z"></path>"#,
    "</svg>"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub control: Control,
    pub classes: [&'static str; 2],
    pub label: String,
    pub icon: &'static str,
}

/// Everything needed to render one header. Derived, never stored as state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub title: String,
    pub buttons: [ButtonSpec; 2],
}

impl HeaderSpec {
    /// Build the header for a frame whose `title` attribute is `frame_title`.
    #[must_use]
    pub fn for_frame(frame_title: Option<&str>, config: &FrameStageConfig) -> Self {
        let title = frame_title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(config.fallback_title.as_str())
            .to_owned();
        Self {
            title,
            buttons: [
                button(Control::Theater, &config.theater_label, THEATER_ICON),
                button(
                    Control::Fullscreen,
                    &config.fullscreen_label,
                    FULLSCREEN_ICON,
                ),
            ],
        }
    }

    #[must_use]
    pub fn button(&self, control: Control) -> &ButtonSpec {
        &self.buttons[control.index()]
    }
}

fn button(control: Control, label: &str, icon: &'static str) -> ButtonSpec {
    ButtonSpec {
        control,
        classes: [classes::BUTTON, classes::button_variant(control)],
        label: label.to_owned(),
        icon,
    }
}

/// Nodes produced by [`render_header`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderNodes<N> {
    pub header: N,
    pub title: N,
    pub controls: N,
    pub buttons: [N; 2],
}

impl<N> HeaderNodes<N> {
    #[must_use]
    pub fn button(&self, control: Control) -> &N {
        &self.buttons[control.index()]
    }
}

/// Create the header subtree. The result is detached; the caller appends it.
pub fn render_header<D: Dom>(
    dom: &mut D,
    spec: &HeaderSpec,
) -> Result<HeaderNodes<D::Node>, DomError> {
    let header = dom.create_element("div")?;
    dom.add_class(&header, classes::HEADER);

    let title = dom.create_element("div")?;
    dom.add_class(&title, classes::TITLE);
    dom.set_text(&title, &spec.title);

    let controls = dom.create_element("div")?;
    dom.add_class(&controls, classes::CONTROLS);

    let theater = render_button(dom, spec.button(Control::Theater))?;
    let fullscreen = render_button(dom, spec.button(Control::Fullscreen))?;
    dom.append_child(&controls, &theater)?;
    dom.append_child(&controls, &fullscreen)?;

    dom.append_child(&header, &title)?;
    dom.append_child(&header, &controls)?;

    Ok(HeaderNodes {
        header,
        title,
        controls,
        buttons: [theater, fullscreen],
    })
}

fn render_button<D: Dom>(dom: &mut D, spec: &ButtonSpec) -> Result<D::Node, DomError> {
    let button = dom.create_element("button")?;
    for class in spec.classes {
        dom.add_class(&button, class);
    }
    dom.set_attribute(&button, "type", "button")?;
    dom.set_attribute(&button, "aria-label", &spec.label)?;
    dom.set_attribute(&button, "title", &spec.label)?;
    dom.set_markup(&button, spec.icon);
    Ok(button)
}
