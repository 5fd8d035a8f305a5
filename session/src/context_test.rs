use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::executor::LocalPool;

use super::*;
use crate::provider::ListenerRegistry;

// =========================================================================
// Fakes
// =========================================================================

struct FakeProvider {
    listeners: ListenerRegistry,
    current: RefCell<Result<Option<Session>, ProviderError>>,
    probe_gate: RefCell<Option<oneshot::Receiver<()>>>,
    sign_out_result: RefCell<Result<(), ProviderError>>,
    emit_on_sign_out: Cell<bool>,
    sign_outs: Cell<u32>,
}

impl FakeProvider {
    fn new(current: Option<Session>) -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            current: RefCell::new(Ok(current)),
            probe_gate: RefCell::new(None),
            sign_out_result: RefCell::new(Ok(())),
            emit_on_sign_out: Cell::new(false),
            sign_outs: Cell::new(0),
        }
    }

    fn gate_probe(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.probe_gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        let gate = self.probe_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.current.borrow().clone()
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        if self.emit_on_sign_out.get() {
            self.listeners.emit(AuthEvent::SignedOut, None);
        }
        self.sign_out_result.borrow().clone()
    }

    fn on_session_change(&self, listener: crate::provider::SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

#[derive(Default)]
struct FakeStore {
    rows: RefCell<HashMap<String, Result<Vec<RoleRow>, ProviderError>>>,
    gates: RefCell<HashMap<String, VecDeque<oneshot::Receiver<()>>>>,
    calls: RefCell<Vec<String>>,
}

impl FakeStore {
    fn with_roles(self, user_id: &str, roles: &[&str]) -> Self {
        let rows = roles.iter().map(|role| RoleRow { role: (*role).to_owned() }).collect();
        self.rows.borrow_mut().insert(user_id.to_owned(), Ok(rows));
        self
    }

    fn with_error(self, user_id: &str) -> Self {
        self.rows.borrow_mut().insert(user_id.to_owned(), Err(ProviderError::Request("network down".to_owned())));
        self
    }

    fn gate(&self, user_id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().entry(user_id.to_owned()).or_default().push_back(rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl RoleStore for FakeStore {
    async fn roles_for(&self, user_id: &str) -> Result<Vec<RoleRow>, ProviderError> {
        self.calls.borrow_mut().push(user_id.to_owned());
        let gate = self.gates.borrow_mut().get_mut(user_id).and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.rows.borrow().get(user_id).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

struct Harness {
    pool: LocalPool,
    provider: Rc<FakeProvider>,
    store: Rc<FakeStore>,
    ctx: SessionContext,
}

impl Harness {
    fn new(provider: FakeProvider, store: FakeStore) -> Self {
        let pool = LocalPool::new();
        let provider = Rc::new(provider);
        let store = Rc::new(store);
        let ctx = SessionContext::mount(provider.clone(), store.clone(), Rc::new(pool.spawner()));
        Self { pool, provider, store, ctx }
    }

    fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        self.provider.listeners.emit(event, session);
    }

    fn record(&self) -> (Rc<RefCell<Vec<AuthSnapshot>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = self.ctx.watch(move |snapshot| sink.borrow_mut().push(snapshot.clone()));
        (seen, sub)
    }
}

fn session(user_id: &str) -> Session {
    Session {
        access_token: format!("access-{user_id}"),
        refresh_token: format!("refresh-{user_id}"),
        expires_at: 4_102_444_800,
        user: Identity {
            id: user_id.to_owned(),
            email: Some(format!("{user_id}@example.com")),
            user_metadata: serde_json::Value::Null,
        },
    }
}

fn role_set(roles: &[Role]) -> RoleSet {
    roles.iter().cloned().collect()
}

// =========================================================================
// Initial probe
// =========================================================================

#[test]
fn mount_starts_loading_with_no_roles() {
    let h = Harness::new(FakeProvider::new(None), FakeStore::default());
    assert!(h.ctx.is_loading());
    assert!(!h.ctx.is_roles_loading());
    assert!(h.ctx.user().is_none());
    assert!(h.ctx.roles().is_empty());
    assert_eq!(h.provider.listeners.len(), 1);
}

#[test]
fn probe_without_session_settles_anonymous() {
    let mut h = Harness::new(FakeProvider::new(None), FakeStore::default());
    h.settle();
    assert_eq!(h.ctx.snapshot(), AuthSnapshot::anonymous());
    assert!(h.store.calls().is_empty());
}

#[test]
fn probe_failure_settles_anonymous() {
    let provider = FakeProvider::new(None);
    *provider.current.borrow_mut() = Err(ProviderError::Request("offline".to_owned()));
    let mut h = Harness::new(provider, FakeStore::default());
    h.settle();
    assert!(!h.ctx.is_loading());
    assert!(h.ctx.session().is_none());
}

#[test]
fn probe_with_session_fetches_roles_for_that_user() {
    let store = FakeStore::default().with_roles("u1", &["admin"]);
    let gate = store.gate("u1");
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), store);

    h.settle();
    assert!(!h.ctx.is_loading());
    assert!(h.ctx.is_roles_loading());
    assert_eq!(h.ctx.user().map(|u| u.id), Some("u1".to_owned()));
    assert_eq!(h.store.calls(), vec!["u1".to_owned()]);

    gate.send(()).unwrap();
    h.settle();
    assert!(!h.ctx.is_roles_loading());
    assert_eq!(h.ctx.roles(), role_set(&[Role::Admin]));
    assert!(h.ctx.is_admin());
    assert!(!h.ctx.is_branch_admin());
    assert!(!h.ctx.is_teacher());
    assert!(!h.ctx.is_sales());
    assert!(!h.ctx.is_support());
    assert!(!h.ctx.is_student());
    assert_eq!(h.ctx.primary_role(), Some(Role::Admin));
}

#[test]
fn notification_before_probe_supersedes_probe_result() {
    let provider = FakeProvider::new(None);
    let probe_gate = provider.gate_probe();
    let mut h = Harness::new(provider, FakeStore::default().with_roles("u1", &["student"]));

    h.emit(AuthEvent::SignedIn, Some(&session("u1")));
    h.settle();
    probe_gate.send(()).unwrap();
    h.settle();

    assert_eq!(h.ctx.user().map(|u| u.id), Some("u1".to_owned()));
    assert!(h.ctx.is_student());
    assert!(!h.ctx.is_loading());
}

// =========================================================================
// Change notifications
// =========================================================================

#[test]
fn sign_in_notification_defers_role_fetch_to_next_turn() {
    let mut h = Harness::new(FakeProvider::new(None), FakeStore::default().with_roles("u1", &["teacher"]));
    h.settle();

    h.emit(AuthEvent::SignedIn, Some(&session("u1")));
    assert!(h.ctx.session().is_some());
    assert!(h.ctx.is_roles_loading());
    assert!(h.store.calls().is_empty(), "role fetch must not run inside the notification");

    h.settle();
    assert_eq!(h.store.calls(), vec!["u1".to_owned()]);
    assert!(h.ctx.is_teacher());
    assert!(!h.ctx.is_roles_loading());
}

#[test]
fn sign_out_notification_clears_roles_and_flags_in_one_update() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["sales"]));
    h.settle();
    assert!(h.ctx.is_sales());

    let (seen, _sub) = h.record();
    h.emit(AuthEvent::SignedOut, None);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], AuthSnapshot::anonymous());
    assert!(h.ctx.roles().is_empty());
}

#[test]
fn sign_out_notification_during_role_fetch_clears_everything_in_one_update() {
    let store = FakeStore::default().with_roles("u1", &["admin"]);
    let gate = store.gate("u1");
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), store);
    h.settle();
    assert!(h.ctx.is_roles_loading());

    let (seen, _sub) = h.record();
    h.emit(AuthEvent::SignedOut, None);
    assert_eq!(*seen.borrow(), vec![AuthSnapshot::anonymous()]);

    gate.send(()).unwrap();
    h.settle();
    assert_eq!(*seen.borrow(), vec![AuthSnapshot::anonymous()]);
    assert_eq!(h.ctx.snapshot(), AuthSnapshot::anonymous());
}

#[test]
fn sign_out_notification_before_probe_settles_clears_loading_in_one_update() {
    let provider = FakeProvider::new(Some(session("u1")));
    let probe_gate = provider.gate_probe();
    let mut h = Harness::new(provider, FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();
    assert!(h.ctx.is_loading());

    let (seen, _sub) = h.record();
    h.emit(AuthEvent::SignedOut, None);
    assert_eq!(*seen.borrow(), vec![AuthSnapshot::anonymous()]);

    probe_gate.send(()).unwrap();
    h.settle();
    assert_eq!(*seen.borrow(), vec![AuthSnapshot::anonymous()]);
    assert!(h.store.calls().is_empty());
}

#[test]
fn token_refresh_for_same_identity_keeps_roles_while_refetching() {
    let mut h =
        Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["support"]));
    h.settle();

    h.emit(AuthEvent::TokenRefreshed, Some(&session("u1")));
    assert!(h.ctx.is_support());
    assert!(h.ctx.is_roles_loading());

    h.settle();
    assert!(h.ctx.is_support());
    assert_eq!(h.store.calls().len(), 2);
}

#[test]
fn switching_identity_drops_previous_roles_immediately() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();
    assert!(h.ctx.is_admin());

    h.emit(AuthEvent::SignedIn, Some(&session("u2")));
    assert!(h.ctx.roles().is_empty());
    assert!(h.ctx.is_roles_loading());
}

#[test]
fn stale_role_fetch_does_not_overwrite_newer_identity() {
    let store = FakeStore::default().with_roles("u1", &["admin"]).with_roles("u2", &["student"]);
    let slow_u1 = store.gate("u1");
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), store);
    h.settle();
    assert!(h.ctx.is_roles_loading());

    h.emit(AuthEvent::SignedIn, Some(&session("u2")));
    h.settle();
    assert_eq!(h.ctx.roles(), role_set(&[Role::Student]));

    slow_u1.send(()).unwrap();
    h.settle();
    assert_eq!(h.ctx.roles(), role_set(&[Role::Student]));
    assert_eq!(h.ctx.user().map(|u| u.id), Some("u2".to_owned()));
}

// =========================================================================
// Role fetch outcomes
// =========================================================================

#[test]
fn role_fetch_failure_degrades_to_no_roles() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_error("u1"));
    h.settle();

    assert!(h.ctx.session().is_some());
    assert!(h.ctx.roles().is_empty());
    assert!(!h.ctx.is_loading());
    assert!(!h.ctx.is_roles_loading());
    assert_eq!(h.ctx.primary_role(), None);
}

#[test]
fn unknown_role_is_kept_but_never_primary() {
    let mut h = Harness::new(
        FakeProvider::new(Some(session("u1"))),
        FakeStore::default().with_roles("u1", &["custom_unlisted_role"]),
    );
    h.settle();

    assert!(!h.ctx.roles().is_empty());
    assert!(h.ctx.has_role(&Role::Unknown("custom_unlisted_role".to_owned())));
    assert_eq!(h.ctx.primary_role(), None);
}

#[test]
fn primary_role_follows_priority_over_store_order() {
    let mut h =
        Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["student", "teacher"]));
    h.settle();

    assert!(h.ctx.is_teacher());
    assert!(h.ctx.is_student());
    assert_eq!(h.ctx.primary_role(), Some(Role::Teacher));
}

// =========================================================================
// Sign-out
// =========================================================================

#[test]
fn sign_out_clears_roles_but_leaves_session_to_provider() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();

    let result = h.pool.run_until(h.ctx.sign_out());
    assert!(result.is_ok());
    assert_eq!(h.provider.sign_outs.get(), 1);
    assert!(h.ctx.roles().is_empty());
    assert!(h.ctx.session().is_some(), "session clears only via provider notification");
}

#[test]
fn sign_out_clears_roles_even_when_provider_fails() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();
    *h.provider.sign_out_result.borrow_mut() = Err(ProviderError::Status { status: 500, message: "boom".to_owned() });

    let result = h.pool.run_until(h.ctx.sign_out());
    assert!(result.is_err());
    assert!(h.ctx.roles().is_empty());
    assert!(!h.ctx.is_admin());
}

#[test]
fn sign_out_with_provider_notification_reaches_anonymous() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();
    h.provider.emit_on_sign_out.set(true);

    h.pool.run_until(h.ctx.sign_out()).unwrap();
    assert_eq!(h.ctx.snapshot(), AuthSnapshot::anonymous());
}

#[test]
fn sign_out_discards_in_flight_role_fetch() {
    let store = FakeStore::default().with_roles("u1", &["admin"]);
    let gate = store.gate("u1");
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), store);
    h.settle();
    assert!(h.ctx.is_roles_loading());

    h.pool.run_until(h.ctx.sign_out()).unwrap();
    gate.send(()).unwrap();
    h.settle();

    assert!(h.ctx.roles().is_empty());
    assert!(!h.ctx.is_roles_loading());
}

// =========================================================================
// Teardown
// =========================================================================

#[test]
fn teardown_releases_listener_and_resets_state() {
    let mut h = Harness::new(FakeProvider::new(Some(session("u1"))), FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();

    h.ctx.teardown();
    assert!(!h.ctx.is_mounted());
    assert!(h.provider.listeners.is_empty());
    assert_eq!(h.ctx.snapshot(), AuthSnapshot::anonymous());

    h.emit(AuthEvent::SignedIn, Some(&session("u2")));
    h.settle();
    assert!(h.ctx.user().is_none());
}

#[test]
fn teardown_before_probe_settles_discards_probe_result() {
    let provider = FakeProvider::new(Some(session("u1")));
    let probe_gate = provider.gate_probe();
    let mut h = Harness::new(provider, FakeStore::default().with_roles("u1", &["admin"]));
    h.settle();

    h.ctx.teardown();
    probe_gate.send(()).unwrap();
    h.settle();

    assert_eq!(h.ctx.snapshot(), AuthSnapshot::anonymous());
    assert!(h.store.calls().is_empty());
}

#[test]
fn dropping_last_handle_unsubscribes() {
    let mut h = Harness::new(FakeProvider::new(None), FakeStore::default());
    h.settle();
    let provider = Rc::clone(&h.provider);

    drop(h);
    assert!(provider.listeners.is_empty());
}

#[test]
fn dropped_watch_handle_stops_notifications() {
    let mut h = Harness::new(FakeProvider::new(None), FakeStore::default());
    let (seen, sub) = h.record();
    h.settle();
    assert_eq!(seen.borrow().len(), 1);

    drop(sub);
    h.emit(AuthEvent::SignedIn, Some(&session("u1")));
    h.settle();
    assert_eq!(seen.borrow().len(), 1);
}

// =========================================================================
// Snapshot predicates
// =========================================================================

#[test]
fn snapshot_predicates_mirror_membership() {
    let snapshot = AuthSnapshot { roles: role_set(&[Role::BranchAdmin, Role::Support]), ..AuthSnapshot::anonymous() };
    assert!(snapshot.is_branch_admin());
    assert!(snapshot.is_support());
    assert!(!snapshot.is_admin());
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.primary_role(), Some(Role::BranchAdmin));
}
