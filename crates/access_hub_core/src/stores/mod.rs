//! crates/access_hub_core/src/stores/mod.rs
//!
//! UI state stores: local caches of reconciled/derived state plus the
//! mutation actions the presentation layer invokes.

pub mod auth;
pub mod content;
pub mod theme;

pub use auth::AuthStore;
pub use content::ContentStore;
pub use theme::ThemeStore;
