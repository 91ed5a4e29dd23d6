//! services/client/src/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use tracing::info;

use access_hub_core::generative::GenerativeContent;
use access_hub_core::ports::{ContentBackend, GenerativeModel, PreferenceStorage, SchemeDetector};
use access_hub_core::session::IdentitySession;
use access_hub_core::stores::{AuthStore, ContentStore, ThemeStore};

use crate::config::Config;

//=========================================================================================
// HubState (Shared Across the Whole Client)
//=========================================================================================

/// The shared client state, created once at startup and handed to the
/// presentation layer. Owns the session, the stores, and the generative
/// client when an API key is configured.
pub struct HubState {
    pub config: Arc<Config>,
    pub session: Arc<IdentitySession>,
    pub auth: AuthStore,
    pub content: ContentStore,
    pub theme: ThemeStore,
    /// Present only when a generative API key is configured; content
    /// transformation features are hidden otherwise.
    pub generative: Option<GenerativeContent>,
}

impl HubState {
    pub fn new(
        config: Arc<Config>,
        backend: Arc<dyn ContentBackend>,
        session: Arc<IdentitySession>,
        storage: Arc<dyn PreferenceStorage>,
        scheme: Arc<dyn SchemeDetector>,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        Self {
            config,
            auth: AuthStore::new(session.clone(), backend.clone()),
            content: ContentStore::new(backend),
            theme: ThemeStore::new(storage, scheme),
            generative: model.map(GenerativeContent::new),
            session,
        }
    }

    pub fn generative_enabled(&self) -> bool {
        self.generative.is_some()
    }

    /// Primes the content store for the signed-in user. A no-op while
    /// anonymous; fetch failures are already recorded on the store.
    pub async fn refresh_content(&self) {
        let Some(user) = self.session.current_user() else {
            return;
        };
        if let Err(e) = self.content.fetch_user_content(&user.id).await {
            info!("initial content fetch failed: {e}");
            return;
        }
        info!(
            uploads = self.content.uploads().len(),
            saved = self.content.saved_content().len(),
            "content store primed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use access_hub_core::domain::{
        BackendUser, NewSavedContent, NewUpload, SavedContent, Session, ThemePreferences, Upload,
        UploadStatus, UserPreferences, UserStats, UserUpsert,
    };
    use access_hub_core::ports::{IdentityProvider, PortError, PortResult, ProviderError};

    struct RestoredProvider;

    #[async_trait]
    impl IdentityProvider for RestoredProvider {
        async fn restore_session(&self) -> Result<Option<Session>, ProviderError> {
            Ok(Some(Session {
                id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                display_name: None,
                photo_url: None,
            }))
        }

        async fn sign_up(&self, _email: &str, _password: &str) -> Result<Session, ProviderError> {
            unimplemented!("not exercised in state tests")
        }

        async fn set_display_name(&self, _name: &str) -> Result<Session, ProviderError> {
            unimplemented!("not exercised in state tests")
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, ProviderError> {
            unimplemented!("not exercised in state tests")
        }

        async fn sign_in_federated(&self) -> Result<Session, ProviderError> {
            unimplemented!("not exercised in state tests")
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    struct OneUploadBackend;

    #[async_trait]
    impl ContentBackend for OneUploadBackend {
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
            _survey: &serde_json::Value,
        ) -> PortResult<BackendUser> {
            self.get_user(user_id).await
        }

        async fn save_upload(&self, _upload: &NewUpload) -> PortResult<Upload> {
            unimplemented!("not exercised in state tests")
        }

        async fn list_uploads(&self, user_id: &str) -> PortResult<Vec<Upload>> {
            Ok(vec![Upload {
                id: "up1".to_string(),
                user_id: user_id.to_string(),
                filename: Some("doc.pdf".to_string()),
                url: None,
                file_type: Some("pdf".to_string()),
                file_size: None,
                title: None,
                upload_type: None,
                status: UploadStatus::Completed,
                uploaded_at: None,
                processed_at: None,
            }])
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
            unimplemented!("not exercised in state tests")
        }

        async fn upload_url(&self, _user_id: &str, _url: &str) -> PortResult<Upload> {
            unimplemented!("not exercised in state tests")
        }

        async fn save_content(&self, _content: &NewSavedContent) -> PortResult<SavedContent> {
            unimplemented!("not exercised in state tests")
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
                total_uploads: 1,
                total_saved: 0,
                recent_uploads: Vec::new(),
                recent_saved: Vec::new(),
            })
        }
    }

    struct EchoModel;

    #[async_trait]
    impl GenerativeModel for EchoModel {
        async fn generate(&self, prompt: &str) -> PortResult<String> {
            Ok(prompt.to_string())
        }

        async fn generate_with_image(
            &self,
            prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> PortResult<String> {
            Ok(prompt.to_string())
        }
    }

    struct NoStorage;

    #[async_trait]
    impl PreferenceStorage for NoStorage {
        async fn load_theme(&self) -> PortResult<Option<ThemePreferences>> {
            Ok(None)
        }

        async fn save_theme(&self, _prefs: &ThemePreferences) -> PortResult<()> {
            Ok(())
        }

        async fn load_token(&self) -> PortResult<Option<String>> {
            Ok(None)
        }

        async fn save_token(&self, _token: Option<&str>) -> PortResult<()> {
            Ok(())
        }
    }

    struct LightScheme;

    impl SchemeDetector for LightScheme {
        fn prefers_dark(&self) -> bool {
            false
        }
    }

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            backend_base_url: "http://localhost:5001/api".to_string(),
            identity_base_url: "https://identity.invalid/v1".to_string(),
            identity_api_key: "test-key".to_string(),
            generative_api_key: None,
            generative_model: "gpt-4o-mini".to_string(),
            storage_dir: std::env::temp_dir(),
            log_level: tracing::Level::INFO,
            request_timeout_ms: 3000,
        })
    }

    fn state(model: Option<Arc<dyn GenerativeModel>>) -> HubState {
        let backend = Arc::new(OneUploadBackend);
        let session = IdentitySession::new(Arc::new(RestoredProvider), backend.clone());
        HubState::new(
            test_config(),
            backend,
            session,
            Arc::new(NoStorage),
            Arc::new(LightScheme),
            model,
        )
    }

    #[tokio::test]
    async fn generative_client_exists_only_with_a_model() {
        assert!(!state(None).generative_enabled());
        assert!(state(Some(Arc::new(EchoModel))).generative_enabled());
    }

    #[tokio::test]
    async fn refresh_content_primes_the_store_for_a_restored_session() {
        let state = state(None);
        state.session.initialize().await;
        assert!(state.session.is_authenticated());

        state.refresh_content().await;
        assert_eq!(state.content.uploads().len(), 1);
    }

    #[tokio::test]
    async fn refresh_content_is_a_noop_while_anonymous() {
        let state = state(None);
        state.refresh_content().await;
        assert!(state.content.uploads().is_empty());
    }
}
