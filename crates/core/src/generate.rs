//! Text-generation contract — the seam to the external LLM routing layer.
//!
//! Reverie never talks HTTP itself; the provider-routing stack lives
//! behind this trait. Failures here pass through to callers uncaught.

use crate::error::ProviderError;
use async_trait::async_trait;

/// Routes a prompt to whichever provider the routing layer selects and
/// returns the raw response text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// The generator name (e.g., "router", "mock").
    fn name(&self) -> &str;

    /// Send one prompt, await one response.
    async fn route_request(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}
