#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use framestage_core::classes;
use framestage_core::{
    Control, ControllerId, Dom, FrameController, FrameStageConfig, FrameStageError, HostEvent,
    Mode, Registry, STYLESHEET_ID,
};
use framestage_harness::{MemoryDom, article_page, ms};
use pretty_assertions::assert_eq;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

struct WarnCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for WarnCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct MessageVisitor {
            message: String,
        }

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}");
                }
            }
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .expect("capture lock")
            .push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
            });
    }
}

fn with_capture<T>(run: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarnCapture {
        events: Arc::clone(&events),
    });
    let out = tracing::subscriber::with_default(subscriber, run);
    let captured = events.lock().expect("capture lock").clone();
    (out, captured)
}

#[test]
fn bootstrap_attaches_every_frame_and_injects_styles_once() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("A"), Some("B"), None]);
    let mut registry = Registry::new(FrameStageConfig::default());

    let report = registry.bootstrap(&mut dom, page.frames.clone());
    assert_eq!(report.attached.len(), 3);
    assert!(report.failures.is_empty());
    assert!(report.stylesheet_injected);
    assert_eq!(registry.len(), 3);
    assert_eq!(dom.elements_by_class(classes::CONTAINER).len(), 3);

    let style = dom.element_by_id(STYLESHEET_ID).expect("stylesheet");
    assert_eq!(dom.parent(&style), dom.head());
    assert!(dom.text(style).contains(".iframe-container"));

    // Frames already controlled are skipped on a second pass.
    let again = registry.bootstrap(&mut dom, page.frames.clone());
    assert!(again.attached.is_empty());
    assert!(!again.stylesheet_injected);
    assert_eq!(registry.len(), 3);
    assert_eq!(dom.elements_by_tag("style").len(), 1);
}

#[test]
fn failing_frame_does_not_block_siblings() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("A"), Some("B")]);
    let orphan = dom.element("iframe");
    let frames = vec![page.frames[0], orphan, page.frames[1]];
    let mut registry = Registry::new(FrameStageConfig::default());

    let (report, events) = with_capture(|| registry.bootstrap(&mut dom, frames));
    assert_eq!(report.attached.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 1);
    assert_eq!(report.failures[0].1, FrameStageError::NoParent);
    assert!(
        events
            .iter()
            .any(|event| event.level == tracing::Level::WARN && event.message == "frame skipped")
    );
}

#[test]
fn dispatch_routes_by_id() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("A"), Some("B")]);
    let mut registry = Registry::new(FrameStageConfig::default());
    let report = registry.bootstrap(&mut dom, page.frames.clone());
    let first = report.attached[0].clone();
    let second = report.attached[1].clone();

    registry.dispatch(
        &mut dom,
        &second,
        HostEvent::ControlClicked(Control::Theater),
        ms(0),
    );
    let flush = registry
        .dispatch(
            &mut dom,
            &second,
            HostEvent::DebounceElapsed(Control::Theater),
            ms(300),
        )
        .expect("known controller");
    assert!(flush.applied());

    assert_eq!(
        registry.get(&first).map(FrameController::mode),
        Some(Mode::Normal)
    );
    assert_eq!(
        registry.get(&second).map(FrameController::mode),
        Some(Mode::Theater)
    );

    let unknown = ControllerId::new("missing");
    assert!(
        registry
            .dispatch(&mut dom, &unknown, HostEvent::OverlayClicked, ms(400))
            .is_none()
    );

    let logs = registry.take_logs();
    let theater_line = format!("id={second} trigger=toggle_theater");
    assert!(logs.iter().any(|line| line.contains(&theater_line)));
    assert!(registry.take_logs().is_empty());
}

#[test]
fn teardown_restores_page_and_reports_outcomes() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[Some("A"), Some("B")]);
    let second_article = article_page(&mut dom, &[Some("C")]);
    let body = dom.body().expect("body");
    let before = dom.outer_html(page.article);
    let mut registry = Registry::new(FrameStageConfig::default());
    let mut frames = page.frames.clone();
    frames.extend(second_article.frames.iter().copied());
    let report = registry.bootstrap(&mut dom, frames);
    assert_eq!(report.attached.len(), 3);

    let first = report.attached[0].clone();
    registry
        .get_mut(&first)
        .expect("first")
        .toggle_theater(&mut dom);
    assert!(dom.has_class(&body, classes::BODY_NO_SCROLL));
    dom.remove(&second_article.article);

    let (teardown, events) = with_capture(|| registry.teardown(&mut dom));
    assert_eq!(teardown.restored, 2);
    assert_eq!(teardown.parent_disconnected, 1);
    assert!(teardown.failures.is_empty());
    assert!(registry.is_empty());
    assert!(
        events
            .iter()
            .any(|event| event.level == tracing::Level::WARN)
    );

    assert!(!dom.has_class(&body, classes::BODY_NO_SCROLL));
    assert!(dom.elements_by_class(classes::OVERLAY).is_empty());
    assert_eq!(dom.listener_count(), 0);
    assert_eq!(dom.outer_html(page.article), before);
    let orphaned = second_article.frames[0];
    assert!(dom.has_class(
        &dom.parent(&orphaned).expect("container"),
        classes::CONTAINER
    ));
}

#[test]
fn teardown_failure_is_isolated_per_controller() {
    let mut dom = MemoryDom::new();
    let pages: Vec<_> = (0..3)
        .map(|_| article_page(&mut dom, &[Some("Frame")]))
        .collect();
    let body = dom.body().expect("body");
    let mut registry = Registry::new(FrameStageConfig::default());
    let report = registry.bootstrap(&mut dom, pages.iter().map(|page| page.frames[0]));
    assert_eq!(report.attached.len(), 3);

    let failing = report.attached[1].clone();
    registry
        .get_mut(&failing)
        .expect("second")
        .toggle_theater(&mut dom);
    dom.fail_insert_into(Some(pages[1].article));

    let (teardown, events) = with_capture(|| registry.teardown(&mut dom));
    assert_eq!(teardown.restored, 2);
    assert_eq!(teardown.parent_disconnected, 0);
    assert_eq!(teardown.failures.len(), 1);
    assert_eq!(teardown.failures[0].0, failing);
    assert!(matches!(teardown.failures[0].1, FrameStageError::Dom(_)));
    assert!(registry.is_empty());
    assert!(
        events
            .iter()
            .any(|event| event.message.contains("controller teardown failed"))
    );

    assert_eq!(dom.listener_count(), 0);
    assert!(dom.elements_by_class(classes::OVERLAY).is_empty());
    assert!(!dom.has_class(&body, classes::BODY_NO_SCROLL));
    for (index, page) in pages.iter().enumerate() {
        let parent = dom.parent(&page.frames[0]).expect("parent");
        if index == 1 {
            assert!(dom.has_class(&parent, classes::CONTAINER));
            assert!(!dom.has_class(&parent, classes::THEATER_MODE));
        } else {
            assert_eq!(parent, page.article);
        }
    }
}

#[test]
fn adopt_requires_attached_controller() {
    let mut dom = MemoryDom::new();
    let page = article_page(&mut dom, &[None]);
    let mut registry = Registry::new(FrameStageConfig::default());
    let stage = FrameController::with_id(
        ControllerId::new("loose"),
        page.frames[0],
        FrameStageConfig::default(),
    );
    assert!(matches!(
        registry.adopt(stage),
        Err(FrameStageError::NotAttached { .. })
    ));

    let mut stage = FrameController::with_id(
        ControllerId::new("held"),
        page.frames[0],
        FrameStageConfig::default(),
    );
    stage.attach(&mut dom).expect("attach");
    registry.adopt(stage).expect("adopt");
    assert_eq!(
        registry.ids().cloned().collect::<Vec<_>>(),
        vec![ControllerId::new("held")]
    );
}
