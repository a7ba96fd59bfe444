#![forbid(unsafe_code)]

//! Page-wide stylesheet, injected at most once.

use crate::classes;
use crate::config::FrameStageConfig;
use crate::env::Dom;
use crate::error::DomError;

/// Element id of the injected `<style>` block. Its presence is the guard.
pub const STYLESHEET_ID: &str = "iframe-fullscreen-styles";

/// Render the stylesheet rules for `config`.
#[must_use]
pub fn stylesheet_text(config: &FrameStageConfig) -> String {
    let z = config.z_index_base;
    let header_height = config.header_height_px;
    let fade = config.animation_ms;
    let container = classes::CONTAINER;
    let header = classes::HEADER;
    let title = classes::TITLE;
    let controls = classes::CONTROLS;
    let button = classes::BUTTON;
    let button_theater = classes::BUTTON_THEATER;
    let button_fullscreen = classes::BUTTON_FULLSCREEN;
    let overlay = classes::OVERLAY;
    let active = classes::OVERLAY_ACTIVE;
    let theater = classes::THEATER_MODE;
    let fullscreen = classes::FULLSCREEN_MODE;
    let no_scroll = classes::BODY_NO_SCROLL;
    let header_z = z.saturating_add(1);
    let overlay_z = z.saturating_sub(1);
    let fullscreen_z = z.saturating_add(2);

    format!(
        "\
.{container} {{ position: relative !important; display: block; width: 100%; }}
.{header} {{ position: absolute; top: 0; left: 0; right: 0; height: {header_height}px; \
box-sizing: border-box; padding: 10px 20px; display: flex; justify-content: space-between; \
align-items: center; background: rgba(30, 30, 30, 0.95); color: #fff; z-index: {header_z}; \
opacity: 0; visibility: hidden; transition: opacity {fade}ms ease, visibility {fade}ms ease; \
font-family: Arial, sans-serif; }}
.{container}:hover .{header}, .{container}.{theater} .{header}, \
.{container}.{fullscreen} .{header} {{ opacity: 1; visibility: visible; }}
.{title} {{ flex: 1; margin: 0 20px 0 0; font-size: 16px; font-weight: bold; \
white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }}
.{controls} {{ display: flex; gap: 8px; flex-shrink: 0; }}
.{button} {{ cursor: pointer; padding: 8px; border-radius: 4px; display: flex; \
align-items: center; justify-content: center; color: #fff; background: transparent; \
border: 1px solid rgba(255, 255, 255, 0.3); transition: all 0.3s ease; }}
.{button}:hover {{ background: rgba(255, 255, 255, 0.2); border-color: rgba(255, 255, 255, 0.6); }}
.{button_theater}:hover {{ background: rgba(255, 193, 7, 0.3); }}
.{button_fullscreen} {{ background: rgba(220, 53, 69, 0.3); }}
.{overlay} {{ position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
background: rgba(0, 0, 0, 0.85); z-index: {overlay_z}; opacity: 0; visibility: hidden; \
transition: opacity {fade}ms ease, visibility {fade}ms ease; }}
.{overlay}.{active} {{ opacity: 1; visibility: visible; }}
.{theater} {{ position: fixed !important; top: 50% !important; left: 50% !important; \
transform: translate(-50%, -50%) !important; width: 85vw !important; height: 85vh !important; \
max-width: 1200px !important; max-height: 800px !important; z-index: {z} !important; \
border-radius: 12px !important; overflow: hidden !important; background: #000 !important; }}
.{fullscreen} {{ position: fixed !important; top: 0 !important; left: 0 !important; \
width: 100vw !important; height: 100vh !important; z-index: {fullscreen_z} !important; \
margin: 0 !important; padding: 0 !important; background: #000 !important; }}
.{theater} iframe, .{fullscreen} iframe {{ width: 100% !important; height: 100% !important; \
border: none !important; }}
.{no_scroll} {{ overflow: hidden !important; }}
@media (max-width: 768px) {{ .{theater} {{ width: 95vw !important; height: 95vh !important; }} \
.{title} {{ font-size: 14px; }} .{controls} {{ gap: 4px; }} .{button} {{ padding: 6px; }} }}
"
    )
}

/// Inject the stylesheet unless it is already present.
///
/// Returns `true` when this call created it.
pub fn ensure_stylesheet<D: Dom>(dom: &mut D, config: &FrameStageConfig) -> Result<bool, DomError> {
    if dom.element_by_id(STYLESHEET_ID).is_some() {
        return Ok(false);
    }
    let Some(target) = dom.head().or_else(|| dom.body()) else {
        return Err(DomError::host("document has neither head nor body"));
    };
    let style = dom.create_element("style")?;
    dom.set_attribute(&style, "id", STYLESHEET_ID)?;
    dom.set_text(&style, &stylesheet_text(config));
    dom.append_child(&target, &style)?;
    Ok(true)
}
