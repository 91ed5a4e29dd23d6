//! crates/access_hub_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client state layer.
//! These structs are independent of any transport or vendor SDK; wire types
//! use camelCase field names because the backend speaks camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated identity-provider session. Ephemeral: replaced on every
/// identity-state change and cleared on sign-out. The provider owns durable
/// session storage, not this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Session {
    /// The display name shown in the UI, falling back to the local part of
    /// the email when the provider has no profile name.
    pub fn display_name_or_default(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }
}

/// Whether the backend half of a reconciled user is trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The backend round trip has not settled yet.
    Pending,
    /// Backend fields were fetched successfully.
    Synced,
    /// The backend was unreachable or rejected the sync; survey fields hold
    /// defaults and may be stale.
    Failed,
}

/// Identity-provider session fields merged with backend-persisted profile
/// fields. Derived state: recomputed on every session change, never the
/// source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub survey_completed: bool,
    pub survey_data: Option<serde_json::Value>,
    pub sync: SyncStatus,
}

impl ReconciledUser {
    /// A reconciled user whose backend round trip has not settled. Survey
    /// fields hold defaults; the user is already considered authenticated.
    pub fn pending(session: Session) -> Self {
        Self {
            id: session.id,
            email: session.email,
            display_name: session.display_name,
            photo_url: session.photo_url,
            survey_completed: false,
            survey_data: None,
            sync: SyncStatus::Pending,
        }
    }
}

/// The backend's canonical user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub survey_completed: bool,
    #[serde(default)]
    pub survey_data: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create-or-update payload for the backend user record, keyed by the
/// identity provider's stable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// Processing status of an upload. The backend owns the transitions; the
/// client only mirrors the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// A user-submitted document or URL, mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upload_type: Option<String>,
    pub status: UploadStatus,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields when registering a new upload. The backend mints
/// the id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpload {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_type: Option<String>,
}

/// A persisted, processed artifact. Saving implies processing, so saved
/// content and processed content are one collection in this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContent {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub upload_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub simplified_text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Option<serde_json::Value>,
    #[serde(default)]
    pub reading_level: Option<String>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Client-supplied fields when saving processed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedContent {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplified_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_points: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_level: Option<String>,
}

/// Backend-persisted accessibility preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub default_reading_level: Option<String>,
    #[serde(default)]
    pub text_to_speech_enabled: Option<bool>,
    #[serde(default)]
    pub dyslexia_font_enabled: Option<bool>,
    #[serde(default)]
    pub high_contrast_enabled: Option<bool>,
    #[serde(default)]
    pub image_descriptions_enabled: Option<bool>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub font_size: Option<String>,
}

/// Aggregate usage statistics from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_uploads: i64,
    pub total_saved: i64,
    #[serde(default)]
    pub recent_uploads: Vec<Upload>,
    #[serde(default)]
    pub recent_saved: Vec<SavedContent>,
}

/// Font size choices for the reading view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
    Xl,
}

impl FontSize {
    /// The CSS utility class the presentation layer applies for this size.
    pub fn css_class(self) -> &'static str {
        match self {
            FontSize::Small => "text-sm",
            FontSize::Medium => "text-base",
            FontSize::Large => "text-lg",
            FontSize::Xl => "text-xl",
        }
    }
}

/// Local-only accessibility preferences. Persisted as one JSON snapshot in
/// client-local storage; lifecycle spans the device profile, not the user
/// account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreferences {
    pub is_dark: bool,
    pub font_size: FontSize,
    pub dyslexia_font: bool,
    pub high_contrast: bool,
    pub text_to_speech: bool,
    pub speech_rate: f32,
    pub preferred_voice: Option<String>,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            is_dark: false,
            font_size: FontSize::Medium,
            dyslexia_font: false,
            high_contrast: false,
            text_to_speech: false,
            speech_rate: 1.0,
            preferred_voice: None,
        }
    }
}

impl ThemePreferences {
    pub fn theme(&self) -> &'static str {
        if self.is_dark {
            "dark"
        } else {
            "light"
        }
    }

    pub fn font_size_class(&self) -> &'static str {
        self.font_size.css_class()
    }

    pub fn font_family(&self) -> &'static str {
        if self.dyslexia_font {
            "font-dyslexic"
        } else {
            "font-sans"
        }
    }
}

/// A study flashcard parsed out of generative model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    pub flipped: bool,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            flipped: false,
        }
    }
}
