use async_trait::async_trait;

use crate::error::InvokeError;

use super::usage::Usage;

/// Text returned by a single model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Response text; empty when the provider returned no content
    pub content: String,
    /// Model identifier that produced the response
    pub model: String,
    pub usage: Option<Usage>,
}

/// Anything that can answer a prompt with a given model and temperature.
///
/// Transient failures are reported with the kinds for which
/// [`InvokeError::is_transient`] is true so wrappers can retry them.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<Completion, InvokeError>;
}
