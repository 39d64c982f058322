use spark_streams::{
    manual_view, publisher, reactive_context, reactive_context_with, Observer, StreamError,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_view_destroy_ends_subscription() {
    let recorded = Rc::new(RefCell::new(Vec::new()));
    let recorded_clone = recorded.clone();

    let view = manual_view();
    let feed = publisher::<i32>();
    let ctx = reactive_context_with(feed.clone(), view.clone());

    ctx.subscribe_and_render(Observer::values(move |v: &i32| {
        recorded_clone.borrow_mut().push(*v)
    }))
    .unwrap();

    // The view dies before the source completes.
    feed.push(1);
    feed.push(2);
    view.destroy();
    feed.push(3);

    assert_eq!(*recorded.borrow(), vec![1, 2]);
    assert_eq!(view.refresh_count(), 2);

    // Re-subscribing yields immediate completion with no values.
    let completed = Rc::new(Cell::new(false));
    let completed_clone = completed.clone();
    let late = ctx
        .subscribe(Observer::<i32>::new().on_complete(move || completed_clone.set(true)))
        .unwrap();

    assert!(completed.get());
    assert!(late.is_closed());
}

#[test]
fn test_unsubscribe_matches_view_destroy() {
    let by_unsubscribe = Rc::new(RefCell::new(Vec::new()));
    let by_destroy = Rc::new(RefCell::new(Vec::new()));

    // Same scenario twice: once ended by unsubscribe(), once by destroy().
    for (recorder, destroy_view) in [(by_unsubscribe.clone(), false), (by_destroy.clone(), true)] {
        let view = manual_view();
        let feed = publisher::<i32>();
        let ctx = reactive_context_with(feed.clone(), view.clone());

        let sink = recorder.clone();
        ctx.subscribe(Observer::values(move |v: &i32| sink.borrow_mut().push(*v)))
            .unwrap();

        feed.push(1);
        if destroy_view {
            view.destroy();
        } else {
            ctx.unsubscribe();
        }
        feed.push(2);

        assert!(ctx.is_terminated());
        // Firing the other path afterwards changes nothing.
        ctx.unsubscribe();
        view.destroy();
        feed.push(3);
    }

    assert_eq!(*by_unsubscribe.borrow(), *by_destroy.borrow());
    assert_eq!(*by_unsubscribe.borrow(), vec![1]);
}

#[test]
fn test_connect_replaces_stream_for_new_subscribers() {
    let from_a = Rc::new(RefCell::new(Vec::new()));
    let from_b = Rc::new(RefCell::new(Vec::new()));
    let a_clone = from_a.clone();
    let b_clone = from_b.clone();

    let a = publisher::<i32>();
    let b = publisher::<i32>();
    let view = manual_view();
    let ctx = reactive_context_with(a.clone(), view.clone());

    ctx.subscribe(Observer::values(move |v: &i32| a_clone.borrow_mut().push(*v)))
        .unwrap();
    ctx.connect(b.clone());
    ctx.subscribe(Observer::values(move |v: &i32| b_clone.borrow_mut().push(*v)))
        .unwrap();

    a.push(10);
    b.push(20);
    a.push(11);

    assert_eq!(*from_a.borrow(), vec![10, 11]);
    assert_eq!(*from_b.borrow(), vec![20]);

    // One destruction ends both, regardless of which stream they follow.
    view.destroy();
    a.push(12);
    b.push(21);

    assert_eq!(*from_a.borrow(), vec![10, 11]);
    assert_eq!(*from_b.borrow(), vec![20]);
}

#[test]
fn test_upstream_error_does_not_terminate_the_context() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let errors_clone = errors.clone();

    let feed = publisher::<i32>();
    let ctx = reactive_context_with(feed.clone(), manual_view());

    ctx.subscribe(Observer::<i32>::new().on_error(move |e| errors_clone.borrow_mut().push(e)))
        .unwrap();

    feed.error(StreamError::Upstream("boom".into()));

    assert_eq!(*errors.borrow(), vec![StreamError::Upstream("boom".into())]);
    assert!(!ctx.is_terminated());

    // The context is still usable with a fresh stream.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let fresh = publisher::<i32>();
    ctx.connect(fresh.clone());
    ctx.subscribe(Observer::values(move |v: &i32| {
        seen_clone.borrow_mut().push(*v)
    }))
    .unwrap();

    fresh.push(5);
    assert_eq!(*seen.borrow(), vec![5]);
}

#[test]
fn test_subscribe_without_connect_fails_fast() {
    let ctx = reactive_context::<i32>(manual_view());

    assert!(matches!(
        ctx.subscribe(Observer::new()),
        Err(StreamError::NotConnected)
    ));
    assert!(matches!(
        ctx.subscribe_and_render(Observer::new()),
        Err(StreamError::NotConnected)
    ));
}
