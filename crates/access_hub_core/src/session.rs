//! crates/access_hub_core/src/session.rs
//!
//! The identity session and the single shared reconciliation path.
//!
//! `IdentitySession` wraps the external identity provider, owns the
//! observable auth state, and merges provider session fields with the
//! backend's persisted user record on every state transition. Identity
//! success is independent of backend success: a failed sync leaves the user
//! authenticated with default survey fields and an explicit `Failed` sync
//! status.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::{ReconciledUser, Session, SyncStatus, UserUpsert};
use crate::ports::{ContentBackend, IdentityProvider, ProviderCode, ProviderError};

/// Enumeration-safe acknowledgement for password reset requests.
pub const RESET_SENT_MESSAGE: &str =
    "If this email exists, a password reset link has been sent.";

//=========================================================================================
// Observable Auth State
//=========================================================================================

/// Two-phase state machine: `Loading` until the first identity-state event
/// arrives, then settled as `Anonymous` or `Authenticated`.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Loading,
    Anonymous,
    Authenticated(ReconciledUser),
}

impl AuthState {
    pub fn user(&self) -> Option<&ReconciledUser> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

//=========================================================================================
// IdentitySession
//=========================================================================================

/// Owns the auth watch channel. It is the only writer; stores and UI get
/// read-only receivers through [`IdentitySession::subscribe`].
pub struct IdentitySession {
    provider: Arc<dyn IdentityProvider>,
    backend: Arc<dyn ContentBackend>,
    state: watch::Sender<AuthState>,
    /// Bumped on every identity-state transition; a reconciliation fetch
    /// only publishes if its generation is still current.
    generation: AtomicU64,
    /// Token of the in-flight reconciliation, cancelled when superseded.
    sync_guard: Mutex<CancellationToken>,
}

impl IdentitySession {
    pub fn new(provider: Arc<dyn IdentityProvider>, backend: Arc<dyn ContentBackend>) -> Arc<Self> {
        let (state, _) = watch::channel(AuthState::Loading);
        Arc::new(Self {
            provider,
            backend,
            state,
            generation: AtomicU64::new(0),
            sync_guard: Mutex::new(CancellationToken::new()),
        })
    }

    /// Emits the first identity-state event by asking the provider for a
    /// previously issued session. The reconciliation round trip runs in the
    /// background so the loading flag settles without waiting on it.
    pub async fn initialize(self: &Arc<Self>) {
        match self.provider.restore_session().await {
            Ok(session) => self.publish(session, true).await,
            Err(e) => {
                warn!("session restore failed, treating as signed out: {e}");
                self.publish(None, true).await;
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<ReconciledUser> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Authenticated(_))
    }

    /// True until the first identity-state event arrives.
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Loading)
    }

    // --- Credential operations -----------------------------------------------------------

    /// Creates an account and sets the display name. Backend registration
    /// happens through the shared reconciliation path; its failure is
    /// logged, not surfaced, and signup still reports success.
    pub async fn sign_up(
        self: &Arc<Self>,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, String> {
        self.provider.sign_up(email, password).await.map_err(|e| {
            error!("sign-up failed: {e}");
            sign_up_message(&e)
        })?;
        let session = self.provider.set_display_name(name).await.map_err(|e| {
            error!("profile update failed after sign-up: {e}");
            sign_up_message(&e)
        })?;
        info!("account created for {}", session.id);
        self.publish(Some(session.clone()), false).await;
        Ok(session)
    }

    pub async fn sign_in(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> Result<Session, String> {
        let session = self.provider.sign_in(email, password).await.map_err(|e| {
            error!("sign-in failed: {e}");
            sign_in_message(&e)
        })?;
        info!("signed in as {}", session.id);
        self.publish(Some(session.clone()), false).await;
        Ok(session)
    }

    /// Completes the provider's federated consent flow, mapping
    /// cancellation and blocked-popup conditions to user-facing messages.
    pub async fn sign_in_federated(self: &Arc<Self>) -> Result<Session, String> {
        let session = self.provider.sign_in_federated().await.map_err(|e| {
            error!("federated sign-in failed: {e}");
            federated_message(&e)
        })?;
        info!("federated sign-in as {}", session.id);
        self.publish(Some(session.clone()), false).await;
        Ok(session)
    }

    /// Always acknowledges with the same success-shaped message so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn reset_password(&self, email: &str) -> Result<String, String> {
        match self.provider.send_password_reset(email).await {
            Ok(()) => Ok(RESET_SENT_MESSAGE.to_string()),
            Err(e) => {
                error!("password reset failed: {e}");
                Err("Failed to send reset email. Please try again.".to_string())
            }
        }
    }

    pub async fn sign_out(self: &Arc<Self>) -> Result<(), String> {
        self.provider.sign_out().await.map_err(|e| {
            error!("sign-out failed: {e}");
            "Failed to sign out.".to_string()
        })?;
        self.publish(None, false).await;
        Ok(())
    }

    /// Flips the survey flag on the published state only. The survey
    /// payload itself is persisted separately via the backend.
    pub fn mark_survey_completed(&self) {
        self.state.send_modify(|state| {
            if let AuthState::Authenticated(user) = state {
                user.survey_completed = true;
            }
        });
    }

    // --- Reconciliation ------------------------------------------------------------------

    /// Publishes a new identity state. An authenticated session is visible
    /// immediately with `Pending` sync; the upsert-then-fetch round trip
    /// settles it afterwards, inline for credential operations and spawned
    /// for restore so the loading flag is never blocked on the backend.
    async fn publish(self: &Arc<Self>, session: Option<Session>, background: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut guard = self.sync_guard.lock().expect("sync guard poisoned");
            guard.cancel();
            *guard = token.clone();
        }

        let Some(session) = session else {
            self.state.send_replace(AuthState::Anonymous);
            return;
        };

        self.state
            .send_replace(AuthState::Authenticated(ReconciledUser::pending(
                session.clone(),
            )));

        if background {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                this.run_reconciliation(generation, token, session).await;
            });
        } else {
            self.run_reconciliation(generation, token, session).await;
        }
    }

    async fn run_reconciliation(
        &self,
        generation: u64,
        token: CancellationToken,
        session: Session,
    ) {
        let merged = tokio::select! {
            _ = token.cancelled() => return,
            merged = reconcile(self.backend.as_ref(), &session) => merged,
        };
        // A later transition may have raced the fetch; the generation check
        // runs inside the channel lock so a concurrent publish cannot land
        // between the check and the write.
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = AuthState::Authenticated(merged);
            true
        });
    }
}

/// The single reconciliation implementation: upsert the identity fields,
/// fetch the canonical record, merge the survey fields. Any failure keeps
/// the identity-derived fields with defaults and marks the sync `Failed`.
async fn reconcile(backend: &dyn ContentBackend, session: &Session) -> ReconciledUser {
    let upsert = UserUpsert {
        id: session.id.clone(),
        email: session.email.clone(),
        display_name: session.display_name_or_default(),
    };

    let fetched = match backend.upsert_user(&upsert).await {
        Ok(_) => backend.get_user(&session.id).await,
        Err(e) => Err(e),
    };

    let mut user = ReconciledUser::pending(session.clone());
    match fetched {
        Ok(record) => {
            user.survey_completed = record.survey_completed;
            user.survey_data = record.survey_data;
            user.sync = SyncStatus::Synced;
        }
        Err(e) => {
            warn!("backend sync skipped, auth still works: {e}");
            user.sync = SyncStatus::Failed;
        }
    }
    user
}

//=========================================================================================
// Provider Code → User-Facing Message Tables
//=========================================================================================

fn sign_up_message(error: &ProviderError) -> String {
    match error.code {
        ProviderCode::EmailAlreadyInUse => "Account already exists with this email.",
        ProviderCode::InvalidEmail => "Invalid email address.",
        ProviderCode::WeakPassword => {
            "Password is too weak. Use at least 8 characters with numbers and special characters."
        }
        ProviderCode::OperationNotAllowed => {
            "Email/password sign-up is not enabled. Please contact support."
        }
        _ => "Something went wrong. Please try again.",
    }
    .to_string()
}

fn sign_in_message(error: &ProviderError) -> String {
    match error.code {
        ProviderCode::UserNotFound => "No account found with this email.",
        ProviderCode::InvalidEmail => "Invalid email address.",
        ProviderCode::UserDisabled => "This account has been disabled.",
        ProviderCode::TooManyRequests => "Too many failed attempts. Please try again later.",
        _ => "Invalid email or password.",
    }
    .to_string()
}

fn federated_message(error: &ProviderError) -> String {
    match error.code {
        ProviderCode::PopupClosed => "Sign in popup was closed.",
        ProviderCode::PopupCancelled => "Sign in was cancelled.",
        ProviderCode::PopupBlocked => {
            "Popup was blocked by browser. Please allow popups for this site."
        }
        ProviderCode::UnauthorizedDomain => {
            "This domain is not authorized for federated sign-in."
        }
        ProviderCode::OperationNotAllowed => "Federated sign-in is not enabled.",
        _ => "Failed to sign in with the federated provider.",
    }
    .to_string()
}
