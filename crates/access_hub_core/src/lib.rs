pub mod domain;
pub mod flashcards;
pub mod generative;
pub mod ports;
pub mod session;
pub mod stores;
pub mod validate;

pub use domain::{
    Flashcard, FontSize, ReconciledUser, SavedContent, Session, SyncStatus, ThemePreferences,
    Upload, UserStats,
};
pub use generative::{Generated, GenerativeContent, ReadingLevel};
pub use ports::{
    ContentBackend, GenerativeModel, IdentityProvider, PortError, PortResult, PreferenceStorage,
    ProviderCode, ProviderError, SchemeDetector,
};
pub use session::{AuthState, IdentitySession};
pub use stores::{AuthStore, ContentStore, ThemeStore};
