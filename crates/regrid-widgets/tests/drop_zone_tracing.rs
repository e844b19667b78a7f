//! Span capture for drop zone drags.
//!
//! Run with: cargo test -p regrid-widgets --features tracing

#![cfg(feature = "tracing")]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use regrid_core::geometry::{Bounds, Point};
use regrid_core::gesture::DragSignal;
use regrid_widgets::{DropZoneConfig, GridDropZone, GridProvider};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Default)]
struct DragTraceState {
    drag_spans: usize,
    has_target_field: bool,
    has_duration_field: bool,
    duration_recorded: bool,
    start_events: usize,
    end_events: usize,
}

struct DragTraceCapture {
    state: Arc<Mutex<DragTraceState>>,
}

impl<S> Layer<S> for DragTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() != "drop_zone.drag" {
            return;
        }
        let fields = attrs.metadata().fields();
        let mut state = self.state.lock().expect("drag trace state lock");
        state.drag_spans += 1;
        state.has_target_field |= fields.field("target_index").is_some();
        state.has_duration_field |= fields.field("drag_duration_us").is_some();
    }

    fn on_record(
        &self,
        id: &tracing::Id,
        values: &tracing::span::Record<'_>,
        ctx: Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if span.metadata().name() != "drop_zone.drag" {
            return;
        }
        struct DurationVisitor {
            saw_duration: bool,
        }
        impl tracing::field::Visit for DurationVisitor {
            fn record_u64(&mut self, field: &tracing::field::Field, _value: u64) {
                if field.name() == "drag_duration_us" {
                    self.saw_duration = true;
                }
            }

            fn record_debug(
                &mut self,
                field: &tracing::field::Field,
                _value: &dyn std::fmt::Debug,
            ) {
                if field.name() == "drag_duration_us" {
                    self.saw_duration = true;
                }
            }
        }
        let mut visitor = DurationVisitor {
            saw_duration: false,
        };
        values.record(&mut visitor);
        if visitor.saw_duration {
            self.state
                .lock()
                .expect("drag trace state lock")
                .duration_recorded = true;
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct MessageVisitor {
            message: Option<String>,
        }
        impl tracing::field::Visit for MessageVisitor {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }
        let mut visitor = MessageVisitor { message: None };
        event.record(&mut visitor);
        let mut state = self.state.lock().expect("drag trace state lock");
        match visitor.message.as_deref() {
            Some("drop_zone.drag_start") => state.start_events += 1,
            Some("drop_zone.drag_end") => state.end_events += 1,
            _ => {}
        }
    }
}

#[test]
fn drag_span_and_lifecycle_events_are_emitted() {
    let trace_state = Arc::new(Mutex::new(DragTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(DragTraceCapture {
        state: Arc::clone(&trace_state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let measure = Rc::new(Cell::new(Bounds::new(0.0, 0.0, 300.0, 200.0)));
    let mut zone = GridDropZone::new(
        "traced",
        GridProvider::default(),
        DropZoneConfig::new(3, 100.0),
        measure,
    )
    .expect("valid config");
    zone.mount();
    zone.set_items([1u8, 2, 3, 4]);

    zone.handle_signal(0, DragSignal::Claim).expect("item exists");
    let delta = Point::new(100.0, 0.0);
    zone.handle_signal(0, DragSignal::Move { delta })
        .expect("item exists");
    zone.handle_signal(0, DragSignal::Release { delta })
        .expect("item exists");

    tracing::callsite::rebuild_interest_cache();
    let snapshot = trace_state.lock().expect("drag trace state lock");
    assert_eq!(snapshot.drag_spans, 1, "expected one drop_zone.drag span");
    assert!(snapshot.has_target_field, "drop_zone.drag missing target_index");
    assert!(snapshot.has_duration_field, "drop_zone.drag missing drag_duration_us");
    assert!(snapshot.duration_recorded, "drag duration never recorded");
    assert_eq!(snapshot.start_events, 1);
    assert_eq!(snapshot.end_events, 1);
}
