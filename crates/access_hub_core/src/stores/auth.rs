//! crates/access_hub_core/src/stores/auth.rs
//!
//! Thin wrapper over the shared [`IdentitySession`] for form-driven UI.
//! Holds the `loading`/`error` pair the login and signup pages render; the
//! session itself owns the observable auth state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::domain::ReconciledUser;
use crate::ports::ContentBackend;
use crate::session::IdentitySession;

pub struct AuthStore {
    session: Arc<IdentitySession>,
    backend: Arc<dyn ContentBackend>,
    loading: AtomicBool,
    error: Mutex<Option<String>>,
    /// Local-only preference overrides; not guaranteed to reach the
    /// backend (known gap carried over from the original contract).
    preferences: Mutex<serde_json::Map<String, serde_json::Value>>,
}

impl AuthStore {
    pub fn new(session: Arc<IdentitySession>, backend: Arc<dyn ContentBackend>) -> Self {
        Self {
            session,
            backend,
            loading: AtomicBool::new(false),
            error: Mutex::new(None),
            preferences: Mutex::new(serde_json::Map::new()),
        }
    }

    pub fn current_user(&self) -> Option<ReconciledUser> {
        self.session.current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().expect("error lock poisoned").clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), String> {
        self.run_credential_op(self.session.sign_in(email, password))
            .await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), String> {
        self.run_credential_op(self.session.sign_up(name, email, password))
            .await
    }

    pub async fn logout(&self) -> Result<(), String> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.session.sign_out().await;
        self.loading.store(false, Ordering::SeqCst);
        self.record(&result.clone().err());
        result
    }

    /// Merges preference overrides into local state only. Backend
    /// persistence of these values is not guaranteed by this action.
    pub fn update_user_preferences(&self, preferences: serde_json::Value) -> Result<(), String> {
        if self.current_user().is_none() {
            return Err("Not authenticated".to_string());
        }
        if let serde_json::Value::Object(map) = preferences {
            let mut local = self.preferences.lock().expect("preferences lock poisoned");
            for (key, value) in map {
                local.insert(key, value);
            }
        }
        Ok(())
    }

    pub fn preferences(&self) -> serde_json::Map<String, serde_json::Value> {
        self.preferences
            .lock()
            .expect("preferences lock poisoned")
            .clone()
    }

    /// Flips the survey flag locally without a guaranteed backend write.
    pub fn mark_survey_completed(&self) {
        self.session.mark_survey_completed();
    }

    /// Persists survey answers to the backend, then marks completion
    /// locally. The local flip happens only after the backend confirms.
    pub async fn submit_survey(&self, survey: serde_json::Value) -> Result<(), String> {
        let user = self
            .current_user()
            .ok_or_else(|| "Not authenticated".to_string())?;
        self.backend
            .update_survey(&user.id, &survey)
            .await
            .map_err(|e| {
                warn!("survey submission failed: {e}");
                e.to_string()
            })?;
        self.session.mark_survey_completed();
        Ok(())
    }

    async fn run_credential_op(
        &self,
        op: impl std::future::Future<Output = Result<crate::domain::Session, String>>,
    ) -> Result<(), String> {
        self.loading.store(true, Ordering::SeqCst);
        *self.error.lock().expect("error lock poisoned") = None;
        let result = op.await.map(|_| ());
        self.loading.store(false, Ordering::SeqCst);
        self.record(&result.clone().err());
        result
    }

    fn record(&self, error: &Option<String>) {
        *self.error.lock().expect("error lock poisoned") = error.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::{
        BackendUser, NewSavedContent, NewUpload, SavedContent, Session, Upload, UserPreferences,
        UserStats, UserUpsert,
    };
    use crate::ports::{IdentityProvider, PortError, PortResult, ProviderCode, ProviderError};

    struct OkProvider {
        reject_sign_in: bool,
    }

    #[async_trait]
    impl IdentityProvider for OkProvider {
        async fn restore_session(&self) -> Result<Option<Session>, ProviderError> {
            Ok(None)
        }

        async fn sign_up(&self, email: &str, _password: &str) -> Result<Session, ProviderError> {
            Ok(session_for(email))
        }

        async fn set_display_name(&self, _name: &str) -> Result<Session, ProviderError> {
            Ok(session_for("new@example.com"))
        }

        async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, ProviderError> {
            if self.reject_sign_in {
                Err(ProviderError::new(ProviderCode::WrongPassword, "denied"))
            } else {
                Ok(session_for(email))
            }
        }

        async fn sign_in_federated(&self) -> Result<Session, ProviderError> {
            Ok(session_for("fed@example.com"))
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn session_for(email: &str) -> Session {
        Session {
            id: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            display_name: None,
            photo_url: None,
        }
    }

    /// Backend that records survey writes and optionally rejects them.
    #[derive(Default)]
    struct SurveyBackend {
        reject_survey: bool,
        surveys: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl ContentBackend for SurveyBackend {
        async fn upsert_user(&self, user: &UserUpsert) -> PortResult<BackendUser> {
            Ok(BackendUser {
                id: user.id.clone(),
                email: user.email.clone(),
                display_name: None,
                survey_completed: false,
                survey_data: None,
                created_at: None,
                updated_at: None,
            })
        }

        async fn get_user(&self, user_id: &str) -> PortResult<BackendUser> {
            Ok(BackendUser {
                id: user_id.to_string(),
                email: format!("{user_id}@example.com"),
                display_name: None,
                survey_completed: false,
                survey_data: None,
                created_at: None,
                updated_at: None,
            })
        }

        async fn update_survey(
            &self,
            user_id: &str,
            survey: &serde_json::Value,
        ) -> PortResult<BackendUser> {
            if self.reject_survey {
                return Err(PortError::Rejected {
                    status: 500,
                    message: "survey write failed".into(),
                });
            }
            self.surveys.lock().unwrap().push(survey.clone());
            self.get_user(user_id).await
        }

        async fn save_upload(&self, _upload: &NewUpload) -> PortResult<Upload> {
            unimplemented!("not exercised in auth store tests")
        }

        async fn list_uploads(&self, _user_id: &str) -> PortResult<Vec<Upload>> {
            Ok(Vec::new())
        }

        async fn delete_upload(&self, _upload_id: &str) -> PortResult<()> {
            Ok(())
        }

        async fn upload_document(
            &self,
            _user_id: &str,
            _filename: &str,
            _bytes: Vec<u8>,
        ) -> PortResult<Upload> {
            unimplemented!("not exercised in auth store tests")
        }

        async fn upload_url(&self, _user_id: &str, _url: &str) -> PortResult<Upload> {
            unimplemented!("not exercised in auth store tests")
        }

        async fn save_content(&self, _content: &NewSavedContent) -> PortResult<SavedContent> {
            unimplemented!("not exercised in auth store tests")
        }

        async fn list_saved_content(&self, _user_id: &str) -> PortResult<Vec<SavedContent>> {
            Ok(Vec::new())
        }

        async fn get_saved_content_item(&self, content_id: &str) -> PortResult<SavedContent> {
            Err(PortError::NotFound(content_id.to_string()))
        }

        async fn delete_saved_content(&self, _content_id: &str) -> PortResult<()> {
            Ok(())
        }

        async fn get_preferences(&self, _user_id: &str) -> PortResult<UserPreferences> {
            Ok(UserPreferences::default())
        }

        async fn update_preferences(
            &self,
            _user_id: &str,
            prefs: &UserPreferences,
        ) -> PortResult<UserPreferences> {
            Ok(prefs.clone())
        }

        async fn get_stats(&self, _user_id: &str) -> PortResult<UserStats> {
            Ok(UserStats {
                total_uploads: 0,
                total_saved: 0,
                recent_uploads: Vec::new(),
                recent_saved: Vec::new(),
            })
        }
    }

    fn store(reject_sign_in: bool, reject_survey: bool) -> (AuthStore, Arc<SurveyBackend>) {
        let backend = Arc::new(SurveyBackend {
            reject_survey,
            ..Default::default()
        });
        let session = IdentitySession::new(
            Arc::new(OkProvider { reject_sign_in }),
            backend.clone(),
        );
        (AuthStore::new(session, backend.clone()), backend)
    }

    #[tokio::test]
    async fn login_settles_loading_and_clears_error() {
        let (store, _) = store(false, false);
        store.login("alice@example.com", "pw").await.unwrap();
        assert!(store.is_logged_in());
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn failed_login_records_the_message() {
        let (store, _) = store(true, false);
        let err = store.login("alice@example.com", "bad").await.unwrap_err();
        assert_eq!(store.error().as_deref(), Some(err.as_str()));
        assert!(!store.is_logged_in());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn submit_survey_flips_the_flag_only_after_backend_confirms() {
        let (store, backend) = store(false, false);
        store.login("alice@example.com", "pw").await.unwrap();
        assert!(!store.current_user().unwrap().survey_completed);

        store
            .submit_survey(serde_json::json!({"q1": "a1"}))
            .await
            .unwrap();
        assert!(store.current_user().unwrap().survey_completed);
        assert_eq!(backend.surveys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_survey_leaves_the_flag_unset() {
        let (store, backend) = store(false, true);
        store.login("alice@example.com", "pw").await.unwrap();
        assert!(store
            .submit_survey(serde_json::json!({"q1": "a1"}))
            .await
            .is_err());
        assert!(!store.current_user().unwrap().survey_completed);
        assert!(backend.surveys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preference_updates_require_authentication() {
        let (store, _) = store(false, false);
        assert_eq!(
            store.update_user_preferences(serde_json::json!({"theme": "dark"})),
            Err("Not authenticated".to_string())
        );

        store.login("alice@example.com", "pw").await.unwrap();
        store
            .update_user_preferences(serde_json::json!({"theme": "dark"}))
            .unwrap();
        assert_eq!(
            store.preferences().get("theme"),
            Some(&serde_json::json!("dark"))
        );
    }
}
