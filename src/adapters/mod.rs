// Adapters layer: concrete implementations for external systems
// (generative search service, session stores, export storage).

pub mod gemini;
pub mod storage;
pub mod store;

pub use gemini::GeminiClient;
pub use storage::LocalStorage;
pub use store::{FileSessionStore, MemoryStore};
