//! crates/access_hub_core/src/stores/theme.rs
//!
//! Local-only accessibility preference store. Every mutation persists the
//! whole snapshot; initialization loads the snapshot or falls back to the
//! OS color-scheme preference. OS scheme changes are honored only while the
//! user has never saved an explicit preference.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::domain::{FontSize, ThemePreferences};
use crate::ports::{PreferenceStorage, SchemeDetector};

pub struct ThemeStore {
    storage: Arc<dyn PreferenceStorage>,
    scheme: Arc<dyn SchemeDetector>,
    state: Mutex<ThemePreferences>,
    /// Set once a snapshot exists in storage; gates the OS-scheme fallback.
    explicit: AtomicBool,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn PreferenceStorage>, scheme: Arc<dyn SchemeDetector>) -> Self {
        Self {
            storage,
            scheme,
            state: Mutex::new(ThemePreferences::default()),
            explicit: AtomicBool::new(false),
        }
    }

    /// Loads the stored snapshot, or seeds `is_dark` from the OS preference
    /// when nothing was ever saved.
    pub async fn initialize(&self) {
        match self.storage.load_theme().await {
            Ok(Some(saved)) => {
                *self.state.lock().expect("theme lock poisoned") = saved;
                self.explicit.store(true, Ordering::SeqCst);
            }
            Ok(None) => {
                let prefers_dark = self.scheme.prefers_dark();
                self.state.lock().expect("theme lock poisoned").is_dark = prefers_dark;
            }
            Err(e) => {
                warn!("loading theme preferences failed, using defaults: {e}");
            }
        }
    }

    /// Applies an OS-level scheme change. Ignored once the user has an
    /// explicitly saved preference.
    pub fn on_system_scheme_change(&self, prefers_dark: bool) {
        if !self.explicit.load(Ordering::SeqCst) {
            self.state.lock().expect("theme lock poisoned").is_dark = prefers_dark;
        }
    }

    // --- Accessors -----------------------------------------------------------------------

    pub fn snapshot(&self) -> ThemePreferences {
        self.state.lock().expect("theme lock poisoned").clone()
    }

    pub fn theme(&self) -> &'static str {
        self.snapshot().theme()
    }

    pub fn font_size_class(&self) -> &'static str {
        self.snapshot().font_size_class()
    }

    pub fn font_family(&self) -> &'static str {
        self.snapshot().font_family()
    }

    // --- Mutations (each persists the full snapshot) -------------------------------------

    pub async fn toggle_theme(&self) {
        self.mutate(|p| p.is_dark = !p.is_dark).await;
    }

    pub async fn set_theme(&self, is_dark: bool) {
        self.mutate(|p| p.is_dark = is_dark).await;
    }

    pub async fn set_font_size(&self, size: FontSize) {
        self.mutate(|p| p.font_size = size).await;
    }

    pub async fn toggle_dyslexia_font(&self) {
        self.mutate(|p| p.dyslexia_font = !p.dyslexia_font).await;
    }

    pub async fn toggle_high_contrast(&self) {
        self.mutate(|p| p.high_contrast = !p.high_contrast).await;
    }

    pub async fn toggle_text_to_speech(&self) {
        self.mutate(|p| p.text_to_speech = !p.text_to_speech).await;
    }

    pub async fn set_speech_rate(&self, rate: f32) {
        self.mutate(|p| p.speech_rate = rate).await;
    }

    pub async fn set_preferred_voice(&self, voice: Option<String>) {
        self.mutate(|p| p.preferred_voice = voice).await;
    }

    async fn mutate(&self, apply: impl FnOnce(&mut ThemePreferences)) {
        let snapshot = {
            let mut state = self.state.lock().expect("theme lock poisoned");
            apply(&mut state);
            state.clone()
        };
        self.explicit.store(true, Ordering::SeqCst);
        if let Err(e) = self.storage.save_theme(&snapshot).await {
            warn!("persisting theme preferences failed: {e}");
        }
    }
}
