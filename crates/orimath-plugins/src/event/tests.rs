//! Unit tests for event sources and subscriptions.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rstest::{fixture, rstest};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PaperRequested(u32);

#[fixture]
fn source() -> EventSource<PaperRequested> {
    EventSource::new()
}

fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(&PaperRequested) + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[rstest]
fn emit_without_subscribers_runs_nothing(source: EventSource<PaperRequested>) {
    assert_eq!(source.emit(&PaperRequested(1)), 0);
    assert_eq!(source.subscriber_count(), 0);
}

#[rstest]
fn subscription_receives_every_emit(source: EventSource<PaperRequested>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let _subscription = source.subscribe(counting(&counter));

    source.emit(&PaperRequested(1));
    source.emit(&PaperRequested(2));

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[rstest]
fn dropping_subscription_unsubscribes(source: EventSource<PaperRequested>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscription = source.subscribe(counting(&counter));
    assert_eq!(source.subscriber_count(), 1);

    drop(subscription);

    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(source.emit(&PaperRequested(1)), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[rstest]
fn cancel_only_removes_its_own_handler(source: EventSource<PaperRequested>) {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let first_subscription = source.subscribe(counting(&first));
    let _second_subscription = source.subscribe(counting(&second));

    first_subscription.cancel();
    source.emit(&PaperRequested(3));

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn subscription_outliving_source_cancels_quietly() {
    let source = EventSource::<PaperRequested>::new();
    let subscription = source.subscribe(|_| {});
    drop(source);
    subscription.cancel();
}

#[rstest]
fn handlers_see_the_event_payload(source: EventSource<PaperRequested>) {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = source.subscribe(move |event: &PaperRequested| {
        sink.lock().expect("sink lock").push(event.clone());
    });

    source.emit(&PaperRequested(9));

    assert_eq!(*seen.lock().expect("seen lock"), [PaperRequested(9)]);
}

#[rstest]
fn emit_from_background_thread_reaches_handler(source: EventSource<PaperRequested>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let _subscription = source.subscribe(counting(&counter));
    let shared = Arc::new(source);

    let emitter = Arc::clone(&shared);
    thread::spawn(move || emitter.emit(&PaperRequested(4)))
        .join()
        .expect("emitter thread");

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn debug_reports_subscriber_count() {
    let source = EventSource::<PaperRequested>::new();
    let _subscription = source.subscribe(|_| {});
    assert!(format!("{source:?}").contains("subscribers: 1"));
}
