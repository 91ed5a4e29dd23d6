//! crates/access_hub_core/src/stores/content.rs
//!
//! Client-side mirror of the backend's upload and saved-content
//! collections. The backend is the source of truth; local state mutates
//! only after the backend confirms a write, so a failed call leaves the
//! mirror unchanged.

use std::sync::{Arc, Mutex};

use tracing::error;

use crate::domain::{NewSavedContent, NewUpload, SavedContent, Upload, UserStats};
use crate::ports::{ContentBackend, PortError};

const RECENT_LIMIT: usize = 5;

pub struct ContentStore {
    backend: Arc<dyn ContentBackend>,
    uploads: Mutex<Vec<Upload>>,
    /// Saved content doubles as processed content: every save implies the
    /// item was processed. One collection, two accessors.
    saved_content: Mutex<Vec<SavedContent>>,
    current_content: Mutex<Option<SavedContent>>,
    error: Mutex<Option<String>>,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn ContentBackend>) -> Self {
        Self {
            backend,
            uploads: Mutex::new(Vec::new()),
            saved_content: Mutex::new(Vec::new()),
            current_content: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    // --- Accessors -----------------------------------------------------------------------

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().expect("uploads lock poisoned").clone()
    }

    pub fn saved_content(&self) -> Vec<SavedContent> {
        self.saved_content
            .lock()
            .expect("saved content lock poisoned")
            .clone()
    }

    /// Alias of [`ContentStore::saved_content`].
    pub fn processed_content(&self) -> Vec<SavedContent> {
        self.saved_content()
    }

    pub fn recent_uploads(&self) -> Vec<Upload> {
        let uploads = self.uploads.lock().expect("uploads lock poisoned");
        uploads.iter().take(RECENT_LIMIT).cloned().collect()
    }

    pub fn recent_processed(&self) -> Vec<SavedContent> {
        let saved = self
            .saved_content
            .lock()
            .expect("saved content lock poisoned");
        saved.iter().take(RECENT_LIMIT).cloned().collect()
    }

    pub fn current_content(&self) -> Option<SavedContent> {
        self.current_content
            .lock()
            .expect("current content lock poisoned")
            .clone()
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().expect("error lock poisoned").clone()
    }

    // --- Actions -------------------------------------------------------------------------

    /// Populates uploads and saved/processed content from the backend.
    pub async fn fetch_user_content(&self, user_id: &str) -> Result<(), String> {
        self.clear_error();
        let uploads = self.backend.list_uploads(user_id).await;
        let saved = self.backend.list_saved_content(user_id).await;
        match (uploads, saved) {
            (Ok(uploads), Ok(saved)) => {
                *self.uploads.lock().expect("uploads lock poisoned") = uploads;
                *self
                    .saved_content
                    .lock()
                    .expect("saved content lock poisoned") = saved;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => Err(self.fail("fetch user content", e)),
        }
    }

    /// Registers an upload with the backend, then prepends the confirmed
    /// record to the local mirror.
    pub async fn save_upload(&self, upload: &NewUpload) -> Result<Upload, String> {
        match self.backend.save_upload(upload).await {
            Ok(saved) => {
                self.uploads
                    .lock()
                    .expect("uploads lock poisoned")
                    .insert(0, saved.clone());
                Ok(saved)
            }
            Err(e) => Err(self.fail("save upload", e)),
        }
    }

    /// Persists processed content, then prepends it locally.
    pub async fn save_processed_content(
        &self,
        content: &NewSavedContent,
    ) -> Result<SavedContent, String> {
        match self.backend.save_content(content).await {
            Ok(saved) => {
                self.saved_content
                    .lock()
                    .expect("saved content lock poisoned")
                    .insert(0, saved.clone());
                Ok(saved)
            }
            Err(e) => Err(self.fail("save content", e)),
        }
    }

    /// Deletes an upload. A delete of an id the backend no longer has is a
    /// no-op success, making back-to-back deletes idempotent.
    pub async fn delete_upload(&self, upload_id: &str) -> Result<(), String> {
        match self.backend.delete_upload(upload_id).await {
            Ok(()) => {}
            Err(e) if is_absent(&e) => {}
            Err(e) => return Err(self.fail("delete upload", e)),
        }
        self.uploads
            .lock()
            .expect("uploads lock poisoned")
            .retain(|u| u.id != upload_id);
        Ok(())
    }

    /// Deletes saved content with the same idempotence contract as
    /// [`ContentStore::delete_upload`].
    pub async fn delete_content(&self, content_id: &str) -> Result<(), String> {
        match self.backend.delete_saved_content(content_id).await {
            Ok(()) => {}
            Err(e) if is_absent(&e) => {}
            Err(e) => return Err(self.fail("delete content", e)),
        }
        self.saved_content
            .lock()
            .expect("saved content lock poisoned")
            .retain(|c| c.id != content_id);
        if let Some(current) = self.current_content() {
            if current.id == content_id {
                self.clear_current_content();
            }
        }
        Ok(())
    }

    pub async fn fetch_user_stats(&self, user_id: &str) -> Result<UserStats, String> {
        self.backend
            .get_stats(user_id)
            .await
            .map_err(|e| self.fail("fetch stats", e))
    }

    pub fn set_current_content(&self, content: SavedContent) {
        *self
            .current_content
            .lock()
            .expect("current content lock poisoned") = Some(content);
    }

    pub fn clear_current_content(&self) {
        *self
            .current_content
            .lock()
            .expect("current content lock poisoned") = None;
    }

    fn fail(&self, op: &str, e: PortError) -> String {
        error!("{op} failed: {e}");
        let message = e.to_string();
        *self.error.lock().expect("error lock poisoned") = Some(message.clone());
        message
    }

    fn clear_error(&self) {
        *self.error.lock().expect("error lock poisoned") = None;
    }
}

/// The backend answering "already gone" still satisfies a delete.
fn is_absent(e: &PortError) -> bool {
    matches!(e, PortError::NotFound(_)) || matches!(e, PortError::Rejected { status: 404, .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    use crate::domain::{BackendUser, UploadStatus, UserPreferences, UserUpsert};
    use crate::ports::PortResult;

    fn upload(id: &str) -> Upload {
        Upload {
            id: id.to_string(),
            user_id: "u1".to_string(),
            filename: Some(format!("{id}.pdf")),
            url: None,
            file_type: Some("pdf".to_string()),
            file_size: Some(1024),
            title: None,
            upload_type: Some("file".to_string()),
            status: UploadStatus::Completed,
            uploaded_at: None,
            processed_at: None,
        }
    }

    fn saved(id: &str) -> SavedContent {
        SavedContent {
            id: id.to_string(),
            user_id: "u1".to_string(),
            upload_id: None,
            file_name: Some(format!("{id}.pdf")),
            original_text: Some("orig".to_string()),
            simplified_text: Some("simple".to_string()),
            summary: None,
            key_points: None,
            reading_level: Some("simple".to_string()),
            saved_at: None,
        }
    }

    /// Backend with fixed collections; deletes succeed once per id and
    /// report 404 afterwards. `broken` fails every write.
    #[derive(Default)]
    struct FixtureBackend {
        broken: bool,
        deleted: Mutex<HashSet<String>>,
    }

    impl FixtureBackend {
        fn reject(&self) -> PortResult<()> {
            if self.broken {
                Err(PortError::Rejected {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ContentBackend for FixtureBackend {
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
            Err(PortError::NotFound(user_id.to_string()))
        }

        async fn update_survey(
            &self,
            user_id: &str,
            _survey: &serde_json::Value,
        ) -> PortResult<BackendUser> {
            Err(PortError::NotFound(user_id.to_string()))
        }

        async fn save_upload(&self, new: &NewUpload) -> PortResult<Upload> {
            self.reject()?;
            let mut u = upload("fresh");
            u.filename = new.filename.clone();
            Ok(u)
        }

        async fn list_uploads(&self, _user_id: &str) -> PortResult<Vec<Upload>> {
            self.reject()?;
            Ok(vec![upload("up1"), upload("up2")])
        }

        async fn delete_upload(&self, upload_id: &str) -> PortResult<()> {
            self.reject()?;
            let mut deleted = self.deleted.lock().unwrap();
            if deleted.contains(upload_id) {
                return Err(PortError::Rejected {
                    status: 404,
                    message: "Upload not found".into(),
                });
            }
            deleted.insert(upload_id.to_string());
            Ok(())
        }

        async fn upload_document(
            &self,
            _user_id: &str,
            filename: &str,
            _bytes: Vec<u8>,
        ) -> PortResult<Upload> {
            self.reject()?;
            let mut u = upload("doc");
            u.filename = Some(filename.to_string());
            Ok(u)
        }

        async fn upload_url(&self, _user_id: &str, url: &str) -> PortResult<Upload> {
            self.reject()?;
            let mut u = upload("url");
            u.url = Some(url.to_string());
            Ok(u)
        }

        async fn save_content(&self, new: &NewSavedContent) -> PortResult<SavedContent> {
            self.reject()?;
            let mut s = saved("fresh");
            s.file_name = new.file_name.clone();
            Ok(s)
        }

        async fn list_saved_content(&self, _user_id: &str) -> PortResult<Vec<SavedContent>> {
            self.reject()?;
            Ok(vec![saved("sc1"), saved("sc2")])
        }

        async fn get_saved_content_item(&self, content_id: &str) -> PortResult<SavedContent> {
            Ok(saved(content_id))
        }

        async fn delete_saved_content(&self, content_id: &str) -> PortResult<()> {
            self.reject()?;
            let mut deleted = self.deleted.lock().unwrap();
            if deleted.contains(content_id) {
                return Err(PortError::Rejected {
                    status: 404,
                    message: "Content not found".into(),
                });
            }
            deleted.insert(content_id.to_string());
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
            self.reject()?;
            Ok(UserStats {
                total_uploads: 2,
                total_saved: 2,
                recent_uploads: vec![upload("up1")],
                recent_saved: vec![saved("sc1")],
            })
        }
    }

    fn store(broken: bool) -> ContentStore {
        ContentStore::new(Arc::new(FixtureBackend {
            broken,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn fetch_populates_uploads_and_both_content_views() {
        let store = store(false);
        store.fetch_user_content("u1").await.unwrap();
        assert_eq!(store.uploads().len(), 2);
        assert_eq!(store.saved_content().len(), 2);
        assert_eq!(store.processed_content(), store.saved_content());
    }

    #[tokio::test]
    async fn save_prepends_after_backend_confirms() {
        let store = store(false);
        store.fetch_user_content("u1").await.unwrap();
        store
            .save_processed_content(&NewSavedContent {
                user_id: "u1".to_string(),
                upload_id: None,
                file_name: Some("new.pdf".to_string()),
                original_text: None,
                simplified_text: None,
                summary: None,
                key_points: None,
                reading_level: None,
            })
            .await
            .unwrap();
        assert_eq!(store.saved_content()[0].file_name.as_deref(), Some("new.pdf"));
        assert_eq!(store.saved_content().len(), 3);
    }

    #[tokio::test]
    async fn failed_save_leaves_local_state_unchanged() {
        let store = store(true);
        let err = store
            .save_upload(&NewUpload {
                user_id: "u1".to_string(),
                filename: Some("x.pdf".to_string()),
                url: None,
                file_type: None,
                file_size: None,
                title: None,
                upload_type: None,
            })
            .await
            .unwrap_err();
        assert!(err.contains("500"));
        assert!(store.uploads().is_empty());
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn back_to_back_deletes_are_idempotent() {
        let store = store(false);
        store.fetch_user_content("u1").await.unwrap();
        assert_eq!(store.saved_content().len(), 2);

        store.delete_content("sc1").await.unwrap();
        assert_eq!(store.saved_content().len(), 1);

        // The backend now reports the id absent; still a no-op success.
        store.delete_content("sc1").await.unwrap();
        assert_eq!(store.saved_content().len(), 1);
    }

    #[tokio::test]
    async fn deleting_current_content_clears_selection() {
        let store = store(false);
        store.fetch_user_content("u1").await.unwrap();
        store.set_current_content(saved("sc2"));
        store.delete_content("sc2").await.unwrap();
        assert!(store.current_content().is_none());
    }

    #[tokio::test]
    async fn recent_views_cap_at_five() {
        let store = store(false);
        for i in 0..8 {
            store
                .uploads
                .lock()
                .unwrap()
                .push(upload(&format!("u{i}")));
        }
        assert_eq!(store.recent_uploads().len(), 5);
    }

    #[tokio::test]
    async fn stats_pass_through() {
        let store = store(false);
        let stats = store.fetch_user_stats("u1").await.unwrap();
        assert_eq!(stats.total_uploads, 2);
        assert_eq!(stats.recent_saved.len(), 1);
    }
}
