#![forbid(unsafe_code)]

use framestage_core::classes;
use framestage_core::{
    Control, ControllerId, DetachOutcome, Dom, DomError, FrameController, FrameStageConfig,
    FrameStageError, FullscreenApi, Lifecycle, ListenerKind, ListenerSet, Presentation,
    RestoreOutcome,
};
use framestage_harness::{MemoryDom, NodeId, article_page, ms};
use pretty_assertions::assert_eq;

fn controller(frame: NodeId, id: &str) -> FrameController<MemoryDom> {
    FrameController::with_id(ControllerId::new(id), frame, FrameStageConfig::default())
}

fn body(dom: &MemoryDom) -> NodeId {
    dom.body().expect("test document has a body")
}

#[test]
fn attach_wraps_frame_with_header_and_overlay() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("Space Game")]);
    let frame = page.frames[0];
    let mut stage = controller(frame, "stage-1");

    stage.attach(&mut dom).expect("attach");

    let container = *stage.container().expect("container");
    assert_eq!(dom.parent(&container), Some(page.article));
    assert_eq!(dom.next_sibling(&container), Some(page.paragraphs[1]));
    assert_eq!(dom.children(container)[0], frame);
    assert_eq!(dom.attribute(&container, "id").as_deref(), Some("stage-1"));
    assert!(dom.has_class(&container, classes::CONTAINER));

    let header = stage.header().expect("header");
    assert_eq!(dom.children(container)[1], header.header);
    assert_eq!(dom.text(header.title), "Space Game");
    let theater = *header.button(Control::Theater);
    assert_eq!(
        dom.attribute(&theater, "aria-label").as_deref(),
        Some("Theater mode")
    );
    assert_eq!(dom.attribute(&theater, "type").as_deref(), Some("button"));
    assert!(
        dom.markup(theater)
            .is_some_and(|svg| svg.starts_with("<svg"))
    );

    let overlay = *stage.overlay().expect("overlay");
    assert_eq!(dom.parent(&overlay), Some(body(&dom)));
    assert_eq!(
        dom.attribute(&overlay, "id").as_deref(),
        Some("stage-1-overlay")
    );
    assert!(!dom.has_class(&overlay, classes::OVERLAY_ACTIVE));

    assert_eq!(stage.lifecycle(), Lifecycle::Attached);
    assert_eq!(stage.presentation(), Presentation::Normal);
    assert_eq!(
        stage.listeners(),
        ListenerSet::FULLSCREEN_CHANGE
            | ListenerSet::OVERLAY_CLICK
            | ListenerSet::THEATER_CLICK
            | ListenerSet::FULLSCREEN_CLICK
    );
    assert_eq!(
        dom.listener_target(stage.id(), ListenerKind::OverlayClick),
        Some(overlay)
    );
    assert!(stage.is_consistent(&dom));
}

#[test]
fn untitled_frame_uses_fallback_title() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None, Some("   ")]);
    for (index, frame) in page.frames.iter().enumerate() {
        let mut stage = controller(*frame, &format!("f{index}"));
        stage.attach(&mut dom).expect("attach");
        let title = stage.header().expect("header").title;
        assert_eq!(dom.text(title), "Embedded content");
    }
}

#[test]
fn generated_ids_use_config_prefix() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let config = FrameStageConfig {
        id_prefix: "stage-".to_owned(),
        ..FrameStageConfig::default()
    };
    let mut stage = FrameController::<MemoryDom>::create(page.frames[0], config);
    stage.attach(&mut dom).expect("attach");
    let container = *stage.container().expect("container");
    let dom_id = dom.attribute(&container, "id").expect("container id");
    assert!(dom_id.starts_with("stage-"));
    assert_eq!(dom_id, stage.id().as_str());
}

#[test]
fn second_attach_is_rejected() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let mut stage = controller(page.frames[0], "dup");
    stage.attach(&mut dom).expect("first attach");
    let before = dom.outer_html(page.article);

    let err = stage.attach(&mut dom).unwrap_err();
    assert_eq!(
        err,
        FrameStageError::AlreadyAttached {
            id: "dup".to_owned()
        }
    );
    assert_eq!(dom.outer_html(page.article), before);

    stage.detach(&mut dom).expect("detach");
    assert!(matches!(
        stage.attach(&mut dom),
        Err(FrameStageError::AlreadyAttached { .. })
    ));
    assert!(matches!(
        stage.detach(&mut dom),
        Err(FrameStageError::NotAttached { .. })
    ));
}

#[test]
fn detached_frame_cannot_be_attached() {
    let mut dom = MemoryDom::new();
    let frame = dom.element("iframe");
    let mut stage = controller(frame, "orphan");
    assert_eq!(stage.attach(&mut dom), Err(FrameStageError::NoParent));
    assert_eq!(stage.lifecycle(), Lifecycle::Created);
    assert_eq!(dom.listener_count(), 0);
}

#[test]
fn missing_body_fails_before_touching_the_frame() {
    let mut dom = MemoryDom::without_body();
    let html = dom.elements_by_tag("html")[0];
    let frame = dom.append_element(html, "iframe");
    let before = dom.outer_html(html);

    let mut stage = controller(frame, "nobody");
    assert_eq!(stage.attach(&mut dom), Err(FrameStageError::NoBody));
    assert_eq!(dom.outer_html(html), before);
}

#[test]
fn failed_element_creation_leaves_document_untouched() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("Demo")]);
    let before = dom.outer_html(body(&dom));
    dom.fail_create_on(Some("button"));

    let mut stage = controller(page.frames[0], "nobutton");
    assert!(matches!(
        stage.attach(&mut dom),
        Err(FrameStageError::Dom(DomError::Host { .. }))
    ));
    assert_eq!(dom.outer_html(body(&dom)), before);
    assert_eq!(stage.lifecycle(), Lifecycle::Created);
}

#[test]
fn failed_listener_registration_rolls_back_attach() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("Demo")]);
    let before = dom.outer_html(body(&dom));
    dom.fail_listen_on(Some(ListenerKind::OverlayClick));

    let mut stage = controller(page.frames[0], "nolisten");
    assert!(stage.attach(&mut dom).is_err());
    assert_eq!(dom.outer_html(body(&dom)), before);
    assert_eq!(dom.listener_count(), 0);
    assert!(stage.listeners().is_empty());
    assert!(stage.container().is_none());

    dom.fail_listen_on(None);
    stage.attach(&mut dom).expect("retry after host recovers");
    assert_eq!(stage.lifecycle(), Lifecycle::Attached);
}

#[test]
fn detach_restores_document_exactly() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("One"), Some("Two")]);
    dom.set_inline_style(&page.frames[1], "width", Some("480px"));
    dom.set_inline_style(&page.frames[1], "border", Some("1px solid red"));
    let before = dom.outer_html(body(&dom));

    let mut stage = controller(page.frames[1], "restore");
    stage.attach(&mut dom).expect("attach");
    dom.set_inline_style(&page.frames[1], "width", Some("100%"));
    dom.set_inline_style(&page.frames[1], "position", Some("absolute"));
    dom.add_class(&page.frames[1], classes::THEATER_MODE);

    assert_eq!(stage.detach(&mut dom), Ok(DetachOutcome::Restored));
    assert_eq!(dom.outer_html(body(&dom)), before);
    assert_eq!(stage.lifecycle(), Lifecycle::Detached);
    assert!(stage.container().is_none());
}

#[test]
fn detach_from_theater_clears_page_state() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("Demo")]);
    let before = dom.outer_html(body(&dom));
    let mut stage = controller(page.frames[0], "theater");
    stage.attach(&mut dom).expect("attach");

    assert!(stage.toggle_theater(&mut dom).applied());
    assert!(dom.has_class(&body(&dom), classes::BODY_NO_SCROLL));

    assert_eq!(stage.detach(&mut dom), Ok(DetachOutcome::Restored));
    assert_eq!(stage.presentation(), Presentation::Normal);
    assert!(!dom.has_class(&body(&dom), classes::BODY_NO_SCROLL));
    assert_eq!(dom.outer_html(body(&dom)), before);
    assert_eq!(dom.listener_count(), 0);

    let logs = stage.take_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[1].contains("trigger=detach from=theater to=normal"));
}

#[test]
fn detach_leaks_no_listeners_or_wakes() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let mut stage = controller(page.frames[0], "leak");
    stage.attach(&mut dom).expect("attach");
    stage.toggle_fullscreen(&mut dom);
    stage.activate(&mut dom, Control::Theater, ms(0));
    assert!(dom.wake(stage.id(), Control::Theater).is_some());
    assert!(
        dom.active_listeners(stage.id())
            .contains(&ListenerKind::CancelKey)
    );

    stage.detach(&mut dom).expect("detach");
    assert_eq!(dom.listener_count(), 0);
    assert_eq!(dom.wake_count(), 0);
    assert!(stage.listeners().is_empty());
    assert!(!stage.debouncer().is_pending(Control::Theater));
    assert!(!dom.is_fullscreen_active());
}

#[test]
fn restore_is_idempotent() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let frame = page.frames[0];
    let mut stage = controller(frame, "idem");
    stage.attach(&mut dom).expect("attach");
    let placement = stage.placement().expect("placement").clone();

    stage.detach(&mut dom).expect("detach");
    let restored = dom.outer_html(page.article);
    assert_eq!(
        placement.restore(&mut dom, &frame),
        Ok(RestoreOutcome::AlreadyInPlace)
    );
    assert_eq!(
        placement.restore(&mut dom, &frame),
        Ok(RestoreOutcome::AlreadyInPlace)
    );
    assert_eq!(dom.outer_html(page.article), restored);
}

#[test]
fn restore_appends_when_captured_sibling_is_gone() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let frame = page.frames[0];
    let mut stage = controller(frame, "sibling");
    stage.attach(&mut dom).expect("attach");

    dom.remove(&page.paragraphs[1]);
    assert_eq!(stage.detach(&mut dom), Ok(DetachOutcome::Restored));
    let children = dom.children(page.article);
    assert_eq!(children, vec![page.paragraphs[0], frame]);
}

#[test]
fn disconnected_parent_keeps_frame_in_container() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let frame = page.frames[0];
    let mut stage = controller(frame, "gone");
    stage.attach(&mut dom).expect("attach");
    let container = *stage.container().expect("container");
    let overlay = *stage.overlay().expect("overlay");

    dom.remove(&page.article);
    assert_eq!(
        stage.detach(&mut dom),
        Ok(DetachOutcome::ParentDisconnected)
    );
    assert_eq!(dom.parent(&frame), Some(container));
    assert_eq!(dom.parent(&overlay), None);
    assert_eq!(dom.listener_count(), 0);
}

#[test]
fn snapshot_captures_inline_and_resolved_style() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let frame = page.frames[0];
    dom.set_inline_style(&frame, "height", Some("200px"));
    dom.set_computed_style(page.article, "position", "relative");
    dom.add_class(&page.article, "post");
    dom.add_class(&page.article, "wide");
    let mut stage = controller(frame, "style");
    stage.attach(&mut dom).expect("attach");

    let placement = stage.placement().expect("placement");
    assert_eq!(placement.parent(), &page.article);
    assert_eq!(placement.next_sibling(), Some(&page.paragraphs[1]));
    let width = placement.style_value("width").expect("width");
    assert_eq!(width.inline, None);
    assert_eq!(width.resolved.as_deref(), Some("640px"));
    let height = placement.style_value("height").expect("height");
    assert_eq!(height.inline.as_deref(), Some("200px"));
    assert_eq!(height.resolved.as_deref(), Some("200px"));
    assert_eq!(placement.parent_position(), Some("relative"));
    assert_eq!(placement.parent_class(), Some("post wide"));
}
