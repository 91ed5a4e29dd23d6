//! crates/access_hub_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client state layer.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! identity provider's REST surface, the backend API, or a vendor model SDK.

use async_trait::async_trait;

use crate::domain::{
    BackendUser, NewSavedContent, NewUpload, SavedContent, Session, ThemePreferences, Upload,
    UserPreferences, UserStats, UserUpsert,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for backend, storage, and model port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The remote service could not be reached at the transport level.
    #[error("Network error: {0}")]
    Network(String),
    /// The remote service answered with an error status.
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Identity Provider Port
//=========================================================================================

/// Provider-defined failure conditions. Adapters translate the provider's
/// raw error payloads into these codes; the session layer maps codes to
/// user-facing messages and never surfaces them raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    OperationNotAllowed,
    UserNotFound,
    WrongPassword,
    UserDisabled,
    InvalidCredential,
    TooManyRequests,
    PopupClosed,
    PopupCancelled,
    PopupBlocked,
    UnauthorizedDomain,
    Other,
}

/// A failure reported by the external identity provider.
#[derive(Debug, Clone, thiserror::Error)]
#[error("identity provider error ({code:?}): {message}")]
pub struct ProviderError {
    pub code: ProviderCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Raw credential operations against the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Restores a previously issued session, if the provider still has one.
    async fn restore_session(&self) -> Result<Option<Session>, ProviderError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Updates the profile display name of the currently signed-in session.
    async fn set_display_name(&self, name: &str) -> Result<Session, ProviderError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Completes a federated consent flow driven by the embedding shell.
    async fn sign_in_federated(&self) -> Result<Session, ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;
}

//=========================================================================================
// Backend Content Port
//=========================================================================================

/// Typed surface of the application's own REST API. One HTTP call per
/// method, bounded by the adapter's uniform request timeout.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    // --- Users ---
    async fn upsert_user(&self, user: &UserUpsert) -> PortResult<BackendUser>;
    async fn get_user(&self, user_id: &str) -> PortResult<BackendUser>;
    async fn update_survey(
        &self,
        user_id: &str,
        survey: &serde_json::Value,
    ) -> PortResult<BackendUser>;

    // --- Uploads ---
    async fn save_upload(&self, upload: &NewUpload) -> PortResult<Upload>;
    async fn list_uploads(&self, user_id: &str) -> PortResult<Vec<Upload>>;
    async fn delete_upload(&self, upload_id: &str) -> PortResult<()>;
    /// Multipart document submission for server-side text extraction.
    async fn upload_document(
        &self,
        user_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> PortResult<Upload>;
    async fn upload_url(&self, user_id: &str, url: &str) -> PortResult<Upload>;

    // --- Saved content ---
    async fn save_content(&self, content: &NewSavedContent) -> PortResult<SavedContent>;
    async fn list_saved_content(&self, user_id: &str) -> PortResult<Vec<SavedContent>>;
    async fn get_saved_content_item(&self, content_id: &str) -> PortResult<SavedContent>;
    async fn delete_saved_content(&self, content_id: &str) -> PortResult<()>;

    // --- Preferences and stats ---
    async fn get_preferences(&self, user_id: &str) -> PortResult<UserPreferences>;
    async fn update_preferences(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
    ) -> PortResult<UserPreferences>;
    async fn get_stats(&self, user_id: &str) -> PortResult<UserStats>;
}

//=========================================================================================
// Generative Model Port
//=========================================================================================

/// A single generative model endpoint. Prompt construction and fallback
/// handling live above this port; adapters only move text and bytes.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> PortResult<String>;

    /// Generates from a prompt plus one inline binary image part.
    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> PortResult<String>;
}

//=========================================================================================
// Local Storage Ports
//=========================================================================================

/// Client-local persistence: one key for the theme snapshot, one for the
/// backend bearer token.
#[async_trait]
pub trait PreferenceStorage: Send + Sync {
    async fn load_theme(&self) -> PortResult<Option<ThemePreferences>>;
    async fn save_theme(&self, prefs: &ThemePreferences) -> PortResult<()>;
    async fn load_token(&self) -> PortResult<Option<String>>;
    async fn save_token(&self, token: Option<&str>) -> PortResult<()>;
}

/// OS-level color scheme preference.
pub trait SchemeDetector: Send + Sync {
    fn prefers_dark(&self) -> bool;
}
