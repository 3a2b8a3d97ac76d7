//! Third-party script/resource loading port.

use crate::error::ProviderError;

/// Something that can be loaded once per session, such as a widget script.
#[async_trait::async_trait]
pub trait ScriptSource: Send + Sync + 'static {
    /// Performs one load attempt.
    async fn load(&self) -> Result<(), ProviderError>;
}
