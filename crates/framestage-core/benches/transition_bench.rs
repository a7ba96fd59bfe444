#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use framestage_core::{
    Control, ControllerId, FrameController, FrameStageConfig, HostEvent, Registry,
};
use framestage_harness::{FullscreenBehavior, MemoryDom, article_page, ms};
use std::hint::black_box;

fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("framestage/lifecycle");

    group.bench_function("attach_detach_single", |b| {
        b.iter(|| {
            let mut dom = MemoryDom::new();
            let page = article_page(&mut dom, &[Some("Demo")]);
            let mut stage = FrameController::with_id(
                ControllerId::new("bench"),
                page.frames[0],
                FrameStageConfig::default(),
            );
            stage.attach(&mut dom).expect("bench frame should attach");
            black_box(stage.detach(&mut dom).expect("bench frame should detach"));
        });
    });

    group.bench_function("bootstrap_teardown_16", |b| {
        let titles = vec![Some("Frame"); 16];
        b.iter(|| {
            let mut dom = MemoryDom::new();
            let page = article_page(&mut dom, &titles);
            let mut registry = Registry::new(FrameStageConfig::default());
            let report = registry.bootstrap(&mut dom, page.frames.clone());
            black_box(report.attached.len());
            black_box(registry.teardown(&mut dom).restored);
        });
    });

    group.finish();
}

fn bench_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("framestage/transitions");

    for (name, behavior) in [
        ("toggle_cycle_native", FullscreenBehavior::Accept),
        ("toggle_cycle_simulated", FullscreenBehavior::Reject),
    ] {
        group.bench_function(name, |b| {
            let mut dom = MemoryDom::new().with_fullscreen(behavior);
            let page = article_page(&mut dom, &[Some("Demo")]);
            let mut stage = FrameController::with_id(
                ControllerId::new("bench"),
                page.frames[0],
                FrameStageConfig::default(),
            );
            stage.attach(&mut dom).expect("bench frame should attach");
            b.iter(|| {
                black_box(stage.toggle_theater(&mut dom).log.to);
                black_box(stage.toggle_fullscreen(&mut dom).log.to);
                black_box(stage.handle(&mut dom, HostEvent::key("Escape", 27), ms(0)));
                stage.take_logs();
            });
        });
    }

    group.bench_function("debounced_burst_32", |b| {
        let mut dom = MemoryDom::new();
        let page = article_page(&mut dom, &[Some("Demo")]);
        let mut stage = FrameController::with_id(
            ControllerId::new("bench"),
            page.frames[0],
            FrameStageConfig::default(),
        );
        stage.attach(&mut dom).expect("bench frame should attach");
        let mut now = ms(0);
        b.iter(|| {
            for _ in 0..32 {
                now += ms(10);
                stage.handle(&mut dom, HostEvent::ControlClicked(Control::Theater), now);
            }
            now += ms(300);
            black_box(stage.handle(&mut dom, HostEvent::DebounceElapsed(Control::Theater), now));
            stage.take_logs();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_attach_detach, bench_transitions);
criterion_main!(benches);
