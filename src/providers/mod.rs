use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ProviderError;

pub mod echo;
pub mod openrouter;

pub use echo::EchoProvider;
pub use openrouter::OpenRouterProvider;

/// A backend that turns a tutoring prompt into an answer.
#[async_trait]
pub trait TutorProvider: Send + Sync {
    async fn ask(&self, prompt: &str, student_id: &str) -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenRouter,
    Echo,
}

impl std::str::FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openrouter" => Ok(Self::OpenRouter),
            "echo" => Ok(Self::Echo),
            _ => Err(ProviderError::UnknownProvider(s.to_string())),
        }
    }
}

pub fn create_provider(config: &Config) -> Result<Arc<dyn TutorProvider>, ProviderError> {
    let kind = config.provider.parse::<ProviderKind>()?;

    match kind {
        ProviderKind::OpenRouter => Ok(Arc::new(OpenRouterProvider::from_config(config)?)),
        ProviderKind::Echo => Ok(Arc::new(EchoProvider)),
    }
}
