//! services/client/src/adapters/backend.rs
//!
//! Concrete implementation of the `ContentBackend` port: a typed wrapper
//! over the application's own REST API. Persistence endpoints live under
//! `/db`; upload/processing endpoints sit at the API root and use multipart
//! bodies. Every request shares one uniform timeout.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use access_hub_core::domain::{
    BackendUser, NewSavedContent, NewUpload, SavedContent, Upload, UserPreferences, UserStats,
    UserUpsert,
};
use access_hub_core::ports::{ContentBackend, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `ContentBackend` port.
pub struct HttpContentBackend {
    http: reqwest::Client,
    base_url: String,
    /// Bearer token attached to every request when present.
    token: RwLock<Option<String>>,
}

impl HttpContentBackend {
    /// Creates a new `HttpContentBackend` with a uniform request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Replaces the bearer token used for subsequent requests.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn db_url(&self, path: &str) -> String {
        format!("{}/db{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().expect("token lock poisoned").as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Unexpected(format!("undecodable response body: {e}")))
    }

    /// For endpoints whose response body carries no data the client needs.
    async fn execute_ack(&self, request: RequestBuilder) -> PortResult<()> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        check_status(response).await.map(|_| ())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn check_status(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

/// Maps a non-2xx backend answer onto the port error taxonomy, preferring
/// the backend's own `error` message when the body is decodable.
fn rejection(status: StatusCode, body: &str) -> PortError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string());
    match status {
        StatusCode::UNAUTHORIZED => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

//=========================================================================================
// `ContentBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentBackend for HttpContentBackend {
    async fn upsert_user(&self, user: &UserUpsert) -> PortResult<BackendUser> {
        debug!(user_id = %user.id, "upserting backend user");
        self.execute(self.http.post(self.db_url("/users")).json(user))
            .await
    }

    async fn get_user(&self, user_id: &str) -> PortResult<BackendUser> {
        self.execute(self.http.get(self.db_url(&format!("/users/{user_id}"))))
            .await
    }

    async fn update_survey(
        &self,
        user_id: &str,
        survey: &serde_json::Value,
    ) -> PortResult<BackendUser> {
        self.execute(
            self.http
                .put(self.db_url(&format!("/users/{user_id}/survey")))
                .json(survey),
        )
        .await
    }

    async fn save_upload(&self, upload: &NewUpload) -> PortResult<Upload> {
        self.execute(self.http.post(self.db_url("/uploads")).json(upload))
            .await
    }

    async fn list_uploads(&self, user_id: &str) -> PortResult<Vec<Upload>> {
        self.execute(self.http.get(self.db_url(&format!("/uploads/{user_id}"))))
            .await
    }

    async fn delete_upload(&self, upload_id: &str) -> PortResult<()> {
        self.execute_ack(self.http.delete(self.db_url(&format!("/uploads/{upload_id}"))))
            .await
    }

    async fn upload_document(
        &self,
        user_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> PortResult<Upload> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename.to_string()))
            .text("userId", user_id.to_string());
        self.execute(
            self.http
                .post(self.api_url("/upload/document"))
                .multipart(form),
        )
        .await
    }

    async fn upload_url(&self, user_id: &str, url: &str) -> PortResult<Upload> {
        self.execute(
            self.http
                .post(self.api_url("/upload/url"))
                .json(&serde_json::json!({ "url": url, "userId": user_id })),
        )
        .await
    }

    async fn save_content(&self, content: &NewSavedContent) -> PortResult<SavedContent> {
        self.execute(self.http.post(self.db_url("/saved-content")).json(content))
            .await
    }

    async fn list_saved_content(&self, user_id: &str) -> PortResult<Vec<SavedContent>> {
        self.execute(
            self.http
                .get(self.db_url(&format!("/saved-content/{user_id}"))),
        )
        .await
    }

    async fn get_saved_content_item(&self, content_id: &str) -> PortResult<SavedContent> {
        self.execute(
            self.http
                .get(self.db_url(&format!("/saved-content/item/{content_id}"))),
        )
        .await
    }

    async fn delete_saved_content(&self, content_id: &str) -> PortResult<()> {
        self.execute_ack(
            self.http
                .delete(self.db_url(&format!("/saved-content/{content_id}"))),
        )
        .await
    }

    async fn get_preferences(&self, user_id: &str) -> PortResult<UserPreferences> {
        self.execute(
            self.http
                .get(self.db_url(&format!("/preferences/{user_id}"))),
        )
        .await
    }

    async fn update_preferences(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
    ) -> PortResult<UserPreferences> {
        self.execute(
            self.http
                .put(self.db_url(&format!("/preferences/{user_id}")))
                .json(prefs),
        )
        .await
    }

    async fn get_stats(&self, user_id: &str) -> PortResult<UserStats> {
        self.execute(self.http.get(self.db_url(&format!("/stats/{user_id}"))))
            .await
    }
}
