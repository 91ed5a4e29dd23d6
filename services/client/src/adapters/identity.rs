//! services/client/src/adapters/identity.rs
//!
//! Concrete implementation of the `IdentityProvider` port against the
//! provider's REST token endpoints. The provider's raw error strings are
//! translated here into `ProviderCode`s; user-facing wording is applied one
//! layer up, in the core session.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use access_hub_core::domain::Session;
use access_hub_core::ports::{IdentityProvider, ProviderCode, ProviderError};

/// A federated consent result handed over by the embedding shell
/// (the shell drives the actual popup window).
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// The redirect URI the consent flow completed on.
    pub request_uri: String,
    /// Provider-encoded credential payload (`id_token=...&providerId=...`).
    pub post_body: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct HttpIdentityProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Token of the currently signed-in session, used for profile updates
    /// and session restore. In-process only; the provider owns durable
    /// session storage.
    id_token: RwLock<Option<String>>,
    /// One-shot credential deposited by the shell before a federated
    /// sign-in attempt.
    federated_credential: RwLock<Option<FederatedCredential>>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            id_token: RwLock::new(None),
            federated_credential: RwLock::new(None),
        })
    }

    /// Deposits the outcome of a consent popup for the next
    /// `sign_in_federated` call.
    pub fn set_federated_credential(&self, credential: FederatedCredential) {
        *self
            .federated_credential
            .write()
            .expect("credential lock poisoned") = Some(credential);
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key)
    }

    async fn call(
        &self,
        action: &str,
        body: serde_json::Value,
    ) -> Result<TokenResponse, ProviderError> {
        debug!(action, "calling identity provider");
        let response = self
            .http
            .post(self.endpoint(action))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))?;

        if response.status().is_success() {
            response
                .json::<TokenResponse>()
                .await
                .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(provider_error(&body))
        }
    }

    fn remember(&self, response: &TokenResponse) -> Session {
        if let Some(token) = &response.id_token {
            *self.id_token.write().expect("token lock poisoned") = Some(token.clone());
        }
        Session {
            id: response.local_id.clone(),
            email: response.email.clone().unwrap_or_default(),
            display_name: response.display_name.clone(),
            photo_url: response.photo_url.clone(),
        }
    }

    fn current_token(&self) -> Option<String> {
        self.id_token.read().expect("token lock poisoned").clone()
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Translates the provider's raw error payload into a `ProviderCode`.
/// Some messages carry a ` : reason` suffix, so prefixes are matched.
fn provider_error(body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());
    let code = match message.split(&[' ', ':'][..]).next().unwrap_or("") {
        "EMAIL_EXISTS" => ProviderCode::EmailAlreadyInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => ProviderCode::InvalidEmail,
        "WEAK_PASSWORD" => ProviderCode::WeakPassword,
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => ProviderCode::OperationNotAllowed,
        "EMAIL_NOT_FOUND" => ProviderCode::UserNotFound,
        "INVALID_PASSWORD" => ProviderCode::WrongPassword,
        "USER_DISABLED" => ProviderCode::UserDisabled,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => ProviderCode::InvalidCredential,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderCode::TooManyRequests,
        "USER_CANCELLED" => ProviderCode::PopupCancelled,
        "UNAUTHORIZED_DOMAIN" => ProviderCode::UnauthorizedDomain,
        _ => ProviderCode::Other,
    };
    ProviderError::new(code, message)
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn restore_session(&self) -> Result<Option<Session>, ProviderError> {
        let Some(token) = self.current_token() else {
            return Ok(None);
        };
        let response = self
            .http
            .post(self.endpoint("lookup"))
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))?;
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(&body));
        }
        let lookup = response
            .json::<LookupResponse>()
            .await
            .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))?;
        Ok(lookup.users.into_iter().next().map(|u| Session {
            id: u.local_id,
            email: u.email.unwrap_or_default(),
            display_name: u.display_name,
            photo_url: u.photo_url,
        }))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let response = self
            .call(
                "signUp",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true
                }),
            )
            .await?;
        Ok(self.remember(&response))
    }

    async fn set_display_name(&self, name: &str) -> Result<Session, ProviderError> {
        let token = self.current_token().ok_or_else(|| {
            ProviderError::new(ProviderCode::Other, "no active session to update")
        })?;
        let response = self
            .call(
                "update",
                serde_json::json!({
                    "idToken": token,
                    "displayName": name,
                    "returnSecureToken": true
                }),
            )
            .await?;
        Ok(self.remember(&response))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let response = self
            .call(
                "signInWithPassword",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true
                }),
            )
            .await?;
        Ok(self.remember(&response))
    }

    async fn sign_in_federated(&self) -> Result<Session, ProviderError> {
        let credential = self
            .federated_credential
            .write()
            .expect("credential lock poisoned")
            .take()
            .ok_or_else(|| {
                ProviderError::new(
                    ProviderCode::PopupClosed,
                    "consent flow did not produce a credential",
                )
            })?;
        let response = self
            .call(
                "signInWithIdp",
                serde_json::json!({
                    "requestUri": credential.request_uri,
                    "postBody": credential.post_body,
                    "returnSecureToken": true,
                    "returnIdpCredential": true
                }),
            )
            .await?;
        Ok(self.remember(&response))
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(self.endpoint("sendOobCode"))
            .json(&serde_json::json!({
                "requestType": "PASSWORD_RESET",
                "email": email
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderCode::Other, e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(provider_error(&body))
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        *self.id_token.write().expect("token lock poisoned") = None;
        Ok(())
    }
}
