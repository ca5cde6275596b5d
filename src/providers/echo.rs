use async_trait::async_trait;

use super::TutorProvider;
use crate::errors::ProviderError;

/// Answers with the prompt itself. Useful for running the service without an API key.
pub struct EchoProvider;

#[async_trait]
impl TutorProvider for EchoProvider {
    async fn ask(&self, prompt: &str, _student_id: &str) -> Result<String, ProviderError> {
        Ok(format!("echo: {}", prompt))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo() {
        let reply = EchoProvider.ask("What is 2 + 2?", "s-1").await.unwrap();
        assert_eq!(reply, "echo: What is 2 + 2?");
    }
}
