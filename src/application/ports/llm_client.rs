use async_trait::async_trait;

/// Chat-completion style LLM access used for lesson evaluation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    RequestFailed(String),
    #[error("invalid api response: {0}")]
    InvalidResponse(String),
}
