#![forbid(unsafe_code)]

//! Reference pages for controller tests.

use core::time::Duration;

use framestage_core::Dom;

use crate::dom::{MemoryDom, NodeId};

/// An `<article>` holding frames interleaved with paragraphs:
/// `p, iframe, p, iframe, ..., p`.
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub article: NodeId,
    pub frames: Vec<NodeId>,
    /// One more paragraph than frames; `paragraphs[i + 1]` follows `frames[i]`.
    pub paragraphs: Vec<NodeId>,
}

/// Append an article with one frame per entry of `titles` to the body.
///
/// `Some(title)` becomes the frame's `title` attribute. Panics when `dom`
/// has no body.
#[must_use]
pub fn article_page(dom: &mut MemoryDom, titles: &[Option<&str>]) -> ArticlePage {
    let body = dom.body().expect("fixture document should have a body");
    let article = dom.append_element(body, "article");
    let mut frames = Vec::with_capacity(titles.len());
    let mut paragraphs = Vec::with_capacity(titles.len() + 1);
    for (index, title) in titles.iter().enumerate() {
        let paragraph = dom.append_element(article, "p");
        dom.append_text(paragraph, &format!("paragraph {index}"));
        paragraphs.push(paragraph);

        let frame = dom.append_element(article, "iframe");
        dom.set_attribute(&frame, "src", &format!("/embed/{index}"))
            .expect("fixture attribute");
        if let Some(title) = title {
            dom.set_attribute(&frame, "title", title)
                .expect("fixture attribute");
        }
        dom.set_computed_style(frame, "width", "640px");
        dom.set_computed_style(frame, "height", "360px");
        frames.push(frame);
    }
    let tail = dom.append_element(article, "p");
    dom.append_text(tail, "tail");
    paragraphs.push(tail);
    ArticlePage {
        article,
        frames,
        paragraphs,
    }
}

/// Shorthand for a host timestamp.
#[must_use]
pub const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
