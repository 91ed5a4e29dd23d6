//! services/client/src/adapters/storage.rs
//!
//! Local persistence for theme preferences and the backend auth token,
//! stored as JSON files under a configurable directory. Stands in for the
//! browser's localStorage in the original deployment target.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use access_hub_core::domain::ThemePreferences;
use access_hub_core::ports::{PortError, PortResult, PreferenceStorage, SchemeDetector};

const THEME_FILE: &str = "theme-preferences.json";
const TOKEN_FILE: &str = "auth-token.json";

pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        file: &str,
    ) -> PortResult<Option<T>> {
        let path = self.dir.join(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(e.to_string())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // A corrupt file behaves like an absent one rather than
                // wedging startup.
                warn!(file, error = %e, "discarding unreadable preference file");
                Ok(None)
            }
        }
    }

    async fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> PortResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(self.dir.join(file), bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl PreferenceStorage for JsonFileStorage {
    async fn load_theme(&self) -> PortResult<Option<ThemePreferences>> {
        self.read_json(THEME_FILE).await
    }

    async fn save_theme(&self, prefs: &ThemePreferences) -> PortResult<()> {
        self.write_json(THEME_FILE, prefs).await
    }

    async fn load_token(&self) -> PortResult<Option<String>> {
        self.read_json(TOKEN_FILE).await
    }

    async fn save_token(&self, token: Option<&str>) -> PortResult<()> {
        match token {
            Some(token) => self.write_json(TOKEN_FILE, &token).await,
            None => match tokio::fs::remove_file(self.dir.join(TOKEN_FILE)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(PortError::Unexpected(e.to_string())),
            },
        }
    }
}

/// Resolves the OS color scheme from the environment. Desktop shells embed
/// a platform-native detector instead.
pub struct EnvSchemeDetector;

impl SchemeDetector for EnvSchemeDetector {
    fn prefers_dark(&self) -> bool {
        std::env::var("HUB_PREFERS_DARK")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
