use crate::domain::model::SearchPrompt;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Output sink for exported documents.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Session-scoped string key/value store.
///
/// Each call is atomic with respect to other calls on the same store.
pub trait SessionStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Removes `key` only while it still holds `expected`, as one step.
    /// Returns whether the entry was removed.
    fn remove_if(&self, key: &str, expected: &str) -> Result<bool>;
}

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Generative web-search service answering a prompt with raw text.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Whether a service credential is configured.
    fn has_credential(&self) -> bool;

    async fn generate(&self, prompt: &SearchPrompt) -> Result<String>;
}
