pub mod backend;
pub mod generative;
pub mod identity;
pub mod storage;

pub use backend::HttpContentBackend;
pub use generative::OpenAiGenerativeAdapter;
pub use identity::{FederatedCredential, HttpIdentityProvider};
pub use storage::{EnvSchemeDetector, JsonFileStorage};
