//! The session manager: single owner of "who is signed in".
//!
//! `SessionManager` is the only writer of the [`SessionState`]. Every other
//! component reads it through a [`SessionHandle`], which always observes a
//! whole state value (states are replaced, never edited in place).
//!
//! Failure handling per operation:
//! - `hydrate` / `refresh_user`: any failure means "no identity"; nothing is
//!   returned to the caller as an error.
//! - `login` / `register`: failures come back as [`AuthOutcome::Failure`]
//!   carrying a message fit for display.
//! - `logout`: the backend call is best-effort; local state is always cleared.

use crate::backend::AuthBackend;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::response::{ApiResponse, ProbeVerdict, logout_acknowledged};
use gatehouse_access::{Identity, RoleRequirement, SessionState, extract_user_record};
use gatehouse_core::Result;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Shown when a login fails without a usable server message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";

/// Shown when a registration fails without a usable server message.
pub const REGISTER_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Result of `login` and `register`.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The server accepted the request; `data` is its payload.
    Success { data: Value },
    /// The server rejected the request or could not be reached.
    Failure { error: String },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// Read-only accessor to the current session state.
///
/// Cheap to clone; hand one to every view, guard and menu.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    /// Returns the signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Arc<Identity>> {
        match &*self.receiver.borrow() {
            SessionState::Authenticated(identity) => Some(Arc::clone(identity)),
            SessionState::Hydrating | SessionState::Unauthenticated => None,
        }
    }

    /// Role predicate over the current identity.
    #[must_use]
    pub fn has_role(&self, required: impl Into<RoleRequirement>) -> bool {
        self.receiver.borrow().has_role(required)
    }

    /// Waits for the next state change and returns the new state.
    ///
    /// Returns `None` once the manager has been dropped.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until hydration has finished and returns the settled state.
    pub async fn settled(&mut self) -> SessionState {
        if let Ok(state) = self.receiver.wait_for(|state| !state.is_hydrating()).await {
            return state.clone();
        }
        self.current()
    }
}

/// Owns the session lifecycle: hydrate, login, logout, register, refresh.
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<SessionState>,
    hydrate_started: AtomicBool,
    timeout: Duration,
    cancel: CancellationToken,
}

impl SessionManager {
    /// Creates a manager in the `Hydrating` state.
    ///
    /// Every backend call is bounded by `timeout`.
    #[must_use]
    pub fn new(backend: Arc<dyn AuthBackend>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(SessionState::Hydrating);
        Self {
            backend,
            state,
            hydrate_started: AtomicBool::new(false),
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a new read-only accessor.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            receiver: self.state.subscribe(),
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Token that aborts in-flight and future backend calls when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Role predicate over the current identity.
    ///
    /// Accepts a single role name or a set of names.
    #[must_use]
    pub fn has_role(&self, required: impl Into<RoleRequirement>) -> bool {
        self.state.borrow().has_role(required)
    }

    /// Resolves the initial session state from the probe.
    ///
    /// Runs at most once; later calls return the current state without
    /// probing. The state always leaves `Hydrating`, even if this future is
    /// dropped before the probe completes. A login or logout that finishes
    /// while the probe is in flight takes precedence over the probe result.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> SessionState {
        if self.hydrate_started.swap(true, Ordering::SeqCst) {
            warn!("hydrate called more than once; ignoring");
            return self.state();
        }

        let settle = LeaveHydrating(&self.state);
        let identity = self.probe_identity().await;
        let published = settle_hydration(&self.state, SessionState::from(identity));
        drop(settle);
        if !published {
            debug!("session changed during hydration; probe result dropped");
        }

        let state = self.state();
        info!(state = state.label(), "session hydrated");
        state
    }

    /// Re-runs the probe to re-sync the identity.
    ///
    /// Does not touch the `Hydrating` flag: while hydration is in flight
    /// the result is returned but not published. Concurrent calls are not
    /// deduplicated; the last one to finish wins.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Option<Arc<Identity>> {
        let identity = self.probe_identity().await.map(Arc::new);

        let next = match &identity {
            Some(identity) => SessionState::Authenticated(Arc::clone(identity)),
            None => SessionState::Unauthenticated,
        };
        let published = self.state.send_if_modified(|state| {
            if state.is_hydrating() {
                return false;
            }
            *state = next;
            true
        });
        debug!(published, found = identity.is_some(), "identity refreshed");

        identity
    }

    /// Signs in with an email or mobile number and a password.
    ///
    /// On failure the session state is left untouched. `remember_me` does
    /// not change what is sent; session lifetime is decided by the server's
    /// cookie.
    #[instrument(skip(self, credentials), fields(identifier = credentials.identifier().field()))]
    pub async fn login(&self, credentials: &Credentials, remember_me: bool) -> AuthOutcome {
        debug!(remember_me, "login requested");

        let response = match self.bounded("login", self.backend.login(credentials)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "login request failed");
                return AuthOutcome::Failure {
                    error: LOGIN_FAILED_MESSAGE.to_string(),
                };
            }
        };

        if response.status != 200 || !response.success_flag() {
            debug!(status = response.status, "login rejected");
            return AuthOutcome::Failure {
                error: response
                    .error_message()
                    .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
            };
        }

        let identity = identity_from(&response);
        info!(user_id = %identity.id(), role = %identity.role(), "logged in");
        self.state.send_replace(SessionState::from(identity));

        AuthOutcome::Success {
            data: response.body,
        }
    }

    /// Signs out. The local session is cleared whatever the backend says.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _clear = ClearOnDrop(&self.state);

        match self.bounded("logout", self.backend.logout()).await {
            Ok(response) if logout_acknowledged(response.status) => {
                debug!(status = response.status, "logout acknowledged");
            }
            Ok(response) => {
                warn!(status = response.status, "logout rejected by server");
            }
            Err(e) => {
                warn!(error = %e, "logout request failed");
            }
        }
    }

    /// Creates an account. The current session is not affected.
    #[instrument(skip(self, user_data))]
    pub async fn register(&self, user_data: &Value) -> AuthOutcome {
        let response = match self
            .bounded("register", self.backend.register(user_data))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "register request failed");
                return AuthOutcome::Failure {
                    error: REGISTER_FAILED_MESSAGE.to_string(),
                };
            }
        };

        if !response.is_success() || rejected_by_flag(&response) {
            debug!(status = response.status, "registration rejected");
            return AuthOutcome::Failure {
                error: response
                    .error_message()
                    .unwrap_or_else(|| REGISTER_FAILED_MESSAGE.to_string()),
            };
        }

        let data = match response.body.get("data") {
            Some(data) => data.clone(),
            None => response.body,
        };
        AuthOutcome::Success { data }
    }

    async fn probe_identity(&self) -> Option<Identity> {
        let response = match self.bounded("probe", self.backend.probe()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "session probe failed");
                return None;
            }
        };

        match ProbeVerdict::from_status(response.status) {
            ProbeVerdict::Authenticated => Some(identity_from(&response)),
            ProbeVerdict::Unauthenticated => None,
            ProbeVerdict::Unexpected => {
                warn!(status = response.status, "unexpected probe status");
                None
            }
        }
    }

    async fn bounded<F>(&self, operation: &str, call: F) -> Result<ApiResponse, ApiError>
    where
        F: Future<Output = Result<ApiResponse, ApiError>>,
    {
        tokio::select! {
            () = self.cancel.cancelled() => Err(ApiError::Cancelled {
                operation: operation.to_string(),
            }
            .into()),
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout {
                    operation: operation.to_string(),
                }
                .into()),
            },
        }
    }
}

/// True when the body carries an explicit `success: false`.
fn rejected_by_flag(response: &ApiResponse) -> bool {
    response.body.get("success").and_then(Value::as_bool) == Some(false)
}

fn identity_from(response: &ApiResponse) -> Identity {
    Identity::from_record(extract_user_record(&response.body).unwrap_or(&Value::Null))
}

/// Replaces the state with `next` only while it is still `Hydrating`.
fn settle_hydration(state: &watch::Sender<SessionState>, next: SessionState) -> bool {
    state.send_if_modified(|state| {
        if !state.is_hydrating() {
            return false;
        }
        *state = next;
        true
    })
}

/// Moves the state out of `Hydrating` when dropped, if nothing else did.
struct LeaveHydrating<'a>(&'a watch::Sender<SessionState>);

impl Drop for LeaveHydrating<'_> {
    fn drop(&mut self) {
        settle_hydration(self.0, SessionState::Unauthenticated);
    }
}

/// Clears the identity when dropped.
struct ClearOnDrop<'a>(&'a watch::Sender<SessionState>);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if *state == SessionState::Unauthenticated {
                return false;
            }
            *state = SessionState::Unauthenticated;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gatehouse_access::Role;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One scripted backend reply.
    enum Reply {
        Respond(u16, Value),
        Fail,
        Hang,
        Delay(Duration, u16, Value),
    }

    #[derive(Default)]
    struct ScriptedBackend {
        probes: Mutex<VecDeque<Reply>>,
        logins: Mutex<VecDeque<Reply>>,
        logouts: Mutex<VecDeque<Reply>>,
        registers: Mutex<VecDeque<Reply>>,
    }

    impl ScriptedBackend {
        fn on_probe(self, reply: Reply) -> Self {
            self.probes.lock().expect("lock").push_back(reply);
            self
        }

        fn on_login(self, reply: Reply) -> Self {
            self.logins.lock().expect("lock").push_back(reply);
            self
        }

        fn on_logout(self, reply: Reply) -> Self {
            self.logouts.lock().expect("lock").push_back(reply);
            self
        }

        fn on_register(self, reply: Reply) -> Self {
            self.registers.lock().expect("lock").push_back(reply);
            self
        }

        async fn play(queue: &Mutex<VecDeque<Reply>>) -> Result<ApiResponse, ApiError> {
            let reply = queue.lock().expect("lock").pop_front().unwrap_or(Reply::Fail);
            match reply {
                Reply::Respond(status, body) => Ok(ApiResponse::new(status, body)),
                Reply::Fail => Err(ApiError::Transport {
                    details: "connection refused".to_string(),
                }
                .into()),
                Reply::Hang => std::future::pending().await,
                Reply::Delay(delay, status, body) => {
                    tokio::time::sleep(delay).await;
                    Ok(ApiResponse::new(status, body))
                }
            }
        }
    }

    #[async_trait]
    impl AuthBackend for ScriptedBackend {
        async fn probe(&self) -> Result<ApiResponse, ApiError> {
            Self::play(&self.probes).await
        }

        async fn login(&self, _credentials: &Credentials) -> Result<ApiResponse, ApiError> {
            Self::play(&self.logins).await
        }

        async fn logout(&self) -> Result<ApiResponse, ApiError> {
            Self::play(&self.logouts).await
        }

        async fn register(&self, _user_data: &Value) -> Result<ApiResponse, ApiError> {
            Self::play(&self.registers).await
        }
    }

    fn manager(backend: ScriptedBackend) -> SessionManager {
        SessionManager::new(Arc::new(backend), Duration::from_secs(5))
    }

    fn user_body(role: Value) -> Value {
        json!({
            "success": true,
            "statusCode": 200,
            "data": { "_id": "u1", "name": "Asha", "email": "asha@example.com", "role": role }
        })
    }

    fn login_ok(role: &str) -> Reply {
        Reply::Respond(200, user_body(json!({ "name": role })))
    }

    fn roles_of(state: &SessionState) -> Vec<Role> {
        state.identity().expect("identity").roles().to_vec()
    }

    #[tokio::test]
    async fn hydrate_with_admin_record_authenticates() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(200, user_body(json!({ "name": "admin" })))),
        );
        assert!(manager.state().is_hydrating());

        let state = manager.hydrate().await;

        assert!(state.is_authenticated());
        assert_eq!(roles_of(&state), vec![Role::new("admin")]);
    }

    #[tokio::test]
    async fn hydrate_with_401_is_unauthenticated() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, json!({ "message": "Not authorized" }))),
        );

        let state = manager.hydrate().await;

        assert_eq!(state, SessionState::Unauthenticated);
        assert!(manager.handle().identity().is_none());
    }

    #[tokio::test]
    async fn hydrate_treats_403_as_authenticated() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(403, json!({ "message": "Forbidden" }))),
        );

        let state = manager.hydrate().await;

        assert!(state.is_authenticated());
        assert_eq!(roles_of(&state), vec![Role::user()]);
    }

    #[tokio::test]
    async fn hydrate_failures_settle_unauthenticated() {
        for reply in [
            Reply::Fail,
            Reply::Respond(500, json!({ "message": "boom" })),
            Reply::Respond(204, Value::Null),
        ] {
            let manager = manager(ScriptedBackend::default().on_probe(reply));
            assert_eq!(manager.hydrate().await, SessionState::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn hydrate_runs_only_once() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_probe(login_ok("admin")),
        );

        assert_eq!(manager.hydrate().await, SessionState::Unauthenticated);
        assert_eq!(manager.hydrate().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn hung_probe_times_out() {
        let manager = SessionManager::new(
            Arc::new(ScriptedBackend::default().on_probe(Reply::Hang)),
            Duration::from_millis(50),
        );

        assert_eq!(manager.hydrate().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn cancelled_probe_settles_unauthenticated() {
        let manager = manager(ScriptedBackend::default().on_probe(Reply::Hang));
        manager.cancellation_token().cancel();

        assert_eq!(manager.hydrate().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn dropped_hydrate_future_settles_unauthenticated() {
        let manager = manager(ScriptedBackend::default().on_probe(Reply::Hang));

        let hydrate = manager.hydrate();
        let timed_out = tokio::time::timeout(Duration::from_millis(10), hydrate).await;

        assert!(timed_out.is_err());
        assert_eq!(manager.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn handle_observes_settled_state() {
        let manager = Arc::new(manager(
            ScriptedBackend::default().on_probe(Reply::Delay(
                Duration::from_millis(20),
                200,
                user_body(json!({ "name": "reception" })),
            )),
        ));
        let mut handle = manager.handle();
        assert!(handle.current().is_hydrating());

        let task = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.hydrate().await }
        });

        let settled = handle.settled().await;
        assert!(settled.is_authenticated());
        assert!(handle.has_role("reception"));
        task.await.expect("join");
    }

    #[tokio::test]
    async fn login_success_publishes_identity() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_login(login_ok("admin")),
        );
        manager.hydrate().await;

        let outcome = manager.login(&Credentials::new("a@b.com", "x"), false).await;

        assert!(outcome.is_success());
        assert_eq!(
            outcome,
            AuthOutcome::Success {
                data: user_body(json!({ "name": "admin" }))
            }
        );
        assert_eq!(roles_of(&manager.state()), vec![Role::new("admin")]);
        assert!(manager.has_role(["admin", "super_admin"]));
    }

    #[tokio::test]
    async fn login_rejection_returns_server_message() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_login(Reply::Respond(
                    401,
                    json!({ "success": false, "message": "Invalid credentials" }),
                )),
        );
        manager.hydrate().await;
        let before = manager.state();

        let outcome = manager.login(&Credentials::new("a@b.com", "x"), true).await;

        assert_eq!(
            outcome,
            AuthOutcome::Failure {
                error: "Invalid credentials".to_string()
            }
        );
        assert_eq!(manager.state(), before);
    }

    #[tokio::test]
    async fn login_with_success_false_on_200_is_failure() {
        let manager = manager(ScriptedBackend::default().on_login(Reply::Respond(
            200,
            json!({ "success": false, "message": "Invalid credentials" }),
        )));

        let outcome = manager.login(&Credentials::new("a@b.com", "x"), false).await;

        assert_eq!(outcome.error(), Some("Invalid credentials"));
        assert!(manager.state().is_hydrating());
    }

    #[tokio::test]
    async fn login_transport_failure_uses_fallback_message() {
        let manager = manager(ScriptedBackend::default().on_login(Reply::Fail));

        let outcome = manager.login(&Credentials::new("9876543210", "x"), false).await;

        assert_eq!(outcome.error(), Some(LOGIN_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn login_then_logout_always_clears() {
        for logout in [
            Reply::Respond(200, json!({ "success": true })),
            Reply::Respond(404, Value::Null),
            Reply::Respond(500, json!({ "message": "boom" })),
            Reply::Fail,
        ] {
            let manager = manager(
                ScriptedBackend::default()
                    .on_login(login_ok("admin"))
                    .on_logout(logout),
            );

            let outcome = manager.login(&Credentials::new("a@b.com", "x"), false).await;
            assert!(outcome.is_success());

            manager.logout().await;

            assert_eq!(manager.state(), SessionState::Unauthenticated);
            assert!(manager.handle().identity().is_none());
        }
    }

    #[tokio::test]
    async fn logout_network_error_still_clears() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(login_ok("admin"))
                .on_logout(Reply::Fail),
        );
        manager.hydrate().await;
        assert!(manager.state().is_authenticated());

        manager.logout().await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn register_does_not_touch_session() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_register(Reply::Respond(
                    201,
                    json!({ "success": true, "data": { "_id": "u9", "name": "New Hire" } }),
                ))
                .on_register(Reply::Respond(
                    409,
                    json!({ "success": false, "message": "Mobile already registered" }),
                ))
                .on_register(Reply::Fail),
        );
        manager.hydrate().await;

        let outcome = manager.register(&json!({ "name": "New Hire" })).await;
        assert_eq!(
            outcome,
            AuthOutcome::Success {
                data: json!({ "_id": "u9", "name": "New Hire" })
            }
        );
        assert_eq!(manager.state(), SessionState::Unauthenticated);

        let outcome = manager.register(&json!({ "name": "New Hire" })).await;
        assert_eq!(outcome.error(), Some("Mobile already registered"));

        let outcome = manager.register(&json!({ "name": "New Hire" })).await;
        assert_eq!(outcome.error(), Some(REGISTER_FAILED_MESSAGE));
        assert_eq!(manager.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn refresh_with_unchanged_record_is_identical() {
        let record = user_body(json!({ "name": "admin" }));
        let manager = manager(
            ScriptedBackend::default()
                .on_login(Reply::Respond(200, record.clone()))
                .on_probe(Reply::Respond(401, Value::Null))
                .on_probe(Reply::Respond(200, record)),
        );
        manager.hydrate().await;
        manager.login(&Credentials::new("a@b.com", "x"), false).await;
        let after_login = manager.handle().identity().expect("identity");

        let refreshed = manager.refresh_user().await.expect("identity");

        assert_eq!(*refreshed, *after_login);
        assert_eq!(after_login.roles(), &[Role::new("admin")]);
    }

    #[tokio::test]
    async fn refresh_failure_clears_identity() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(login_ok("admin"))
                .on_probe(Reply::Fail),
        );
        manager.hydrate().await;

        assert!(manager.refresh_user().await.is_none());
        assert_eq!(manager.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn refresh_during_hydration_is_not_published() {
        let manager = manager(ScriptedBackend::default().on_probe(login_ok("admin")));

        let identity = manager.refresh_user().await;

        assert!(identity.is_some());
        assert!(manager.state().is_hydrating());
    }

    #[tokio::test]
    async fn concurrent_refreshes_last_to_resolve_wins() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_probe(Reply::Delay(
                    Duration::from_millis(40),
                    200,
                    user_body(json!({ "name": "admin" })),
                ))
                .on_probe(Reply::Delay(
                    Duration::from_millis(5),
                    200,
                    user_body(json!({ "name": "reception" })),
                )),
        );
        manager.hydrate().await;

        let (slow, fast) = tokio::join!(manager.refresh_user(), manager.refresh_user());

        assert_eq!(slow.expect("slow").role(), &Role::new("admin"));
        assert_eq!(fast.expect("fast").role(), &Role::new("reception"));
        assert_eq!(roles_of(&manager.state()), vec![Role::new("admin")]);
    }

    #[tokio::test]
    async fn has_role_is_false_without_identity() {
        let manager = manager(ScriptedBackend::default().on_probe(Reply::Respond(401, Value::Null)));
        manager.hydrate().await;

        assert!(!manager.has_role("user"));
        assert!(!manager.has_role(RoleRequirement::any()));
    }

    #[tokio::test]
    async fn login_during_slow_hydration_is_kept() {
        let manager = Arc::new(manager(
            ScriptedBackend::default()
                .on_probe(Reply::Delay(Duration::from_millis(50), 401, Value::Null))
                .on_login(login_ok("reception")),
        ));

        let hydrate = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.hydrate().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let outcome = manager.login(&Credentials::new("a@b.com", "x"), false).await;
        assert!(outcome.is_success());

        let settled = hydrate.await.expect("join");
        assert!(settled.is_authenticated());
        assert_eq!(roles_of(&manager.state()), vec![Role::new("reception")]);
    }

    #[tokio::test]
    async fn logout_during_slow_hydration_is_kept() {
        let manager = Arc::new(manager(
            ScriptedBackend::default()
                .on_probe(Reply::Delay(
                    Duration::from_millis(50),
                    200,
                    user_body(json!({ "name": "admin" })),
                ))
                .on_logout(Reply::Respond(200, json!({ "success": true }))),
        ));

        let hydrate = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.hydrate().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        manager.logout().await;

        let settled = hydrate.await.expect("join");
        assert_eq!(settled, SessionState::Unauthenticated);
        assert_eq!(manager.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn register_with_success_false_on_200_is_failure() {
        let manager = manager(ScriptedBackend::default().on_register(Reply::Respond(
            200,
            json!({ "success": false, "message": "Mobile already registered" }),
        )));

        let outcome = manager.register(&json!({ "mobile": "5550100" })).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.error(), Some("Mobile already registered"));
    }

    #[tokio::test]
    async fn handle_sees_each_change() {
        let manager = manager(
            ScriptedBackend::default()
                .on_probe(Reply::Respond(401, Value::Null))
                .on_login(login_ok("admin"))
                .on_logout(Reply::Respond(204, Value::Null)),
        );
        let mut handle = manager.handle();

        manager.hydrate().await;
        assert_eq!(handle.changed().await, Some(SessionState::Unauthenticated));

        manager.login(&Credentials::new("a@b.com", "x"), false).await;
        let state = handle.changed().await.expect("state");
        assert_eq!(roles_of(&state), vec![Role::new("admin")]);

        manager.logout().await;
        assert_eq!(handle.changed().await, Some(SessionState::Unauthenticated));
    }

    #[tokio::test]
    async fn handle_changed_ends_when_manager_is_dropped() {
        let manager = manager(ScriptedBackend::default());
        let mut handle = manager.handle();

        drop(manager);

        assert_eq!(handle.changed().await, None);
    }
}
