use std::cell::Cell;

use super::*;

fn counting_listener(count: &Rc<Cell<u32>>) -> SessionListener {
    let count = Rc::clone(count);
    Rc::new(move |_: AuthEvent, _: Option<&Session>| count.set(count.get() + 1))
}

#[test]
fn emit_reaches_every_listener() {
    let registry = ListenerRegistry::new();
    let count = Rc::new(Cell::new(0));
    let _a = registry.subscribe(counting_listener(&count));
    let _b = registry.subscribe(counting_listener(&count));

    registry.emit(AuthEvent::SignedOut, None);
    assert_eq!(count.get(), 2);
}

#[test]
fn dropping_subscription_unsubscribes() {
    let registry = ListenerRegistry::new();
    let count = Rc::new(Cell::new(0));
    let sub = registry.subscribe(counting_listener(&count));
    assert_eq!(registry.len(), 1);

    sub.unsubscribe();
    assert!(registry.is_empty());
    registry.emit(AuthEvent::SignedOut, None);
    assert_eq!(count.get(), 0);
}

#[test]
fn listener_may_unsubscribe_itself_during_dispatch() {
    let registry = ListenerRegistry::new();
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let calls = Rc::new(Cell::new(0));

    let slot_in = Rc::clone(&slot);
    let calls_in = Rc::clone(&calls);
    let sub = registry.subscribe(Rc::new(move |_: AuthEvent, _: Option<&Session>| {
        calls_in.set(calls_in.get() + 1);
        slot_in.borrow_mut().take();
    }));
    *slot.borrow_mut() = Some(sub);

    registry.emit(AuthEvent::SignedIn, None);
    registry.emit(AuthEvent::SignedIn, None);
    assert_eq!(calls.get(), 1);
    assert!(registry.is_empty());
}

#[test]
fn subscription_outliving_registry_is_harmless() {
    let registry = ListenerRegistry::new();
    let sub = registry.subscribe(Rc::new(|_: AuthEvent, _: Option<&Session>| {}));
    drop(registry);
    drop(sub);
}

#[test]
fn detached_subscription_releases_nothing() {
    let sub = Subscription::detached();
    assert_eq!(format!("{sub:?}"), "Subscription { active: false }");
}

#[test]
fn provider_error_messages() {
    let err = ProviderError::Status { status: 401, message: "invalid JWT".to_owned() };
    assert_eq!(err.to_string(), "provider returned status 401: invalid JWT");
    assert_eq!(ProviderError::Unavailable("ssr").to_string(), "not available: ssr");
}
