use log::*;
use std::time::Duration;

use crate::{
    deadline::within,
    generator::{BackendFailure, GenerationError, TextBackend},
};

/// Text produced by the first backend that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub backend: String,
    pub text: String,
}

/// Tries each backend once, in order, until one returns non-empty text.
pub struct FallbackChain {
    backends: Vec<Box<dyn TextBackend>>,
    timeout: Duration,
}

impl FallbackChain {
    pub fn new(backends: Vec<Box<dyn TextBackend>>, timeout: Duration) -> Self {
        Self { backends, timeout }
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn backend_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub async fn generate(
        &self,
        prompt: &str,
    ) -> Result<Generated, GenerationError> {
        let mut attempts = vec![];

        for backend in self.backends.iter() {
            let name = backend.name();
            debug!("generating with {name}");

            let result =
                within(&name, self.timeout, backend.generate(prompt)).await;

            match result {
                Ok(text) if !text.trim().is_empty() => {
                    info!("generated text with {name}");
                    return Ok(Generated {
                        backend: name,
                        text: text.trim().to_string(),
                    });
                }
                Ok(_) => {
                    warn!("{name} returned an empty response");
                    attempts.push(BackendFailure {
                        backend: name,
                        error: "empty response".into(),
                    });
                }
                Err(err) => {
                    warn!("{name} failed: {err}");
                    attempts.push(BackendFailure {
                        backend: name,
                        error: err.to_string(),
                    });
                }
            }
        }

        Err(GenerationError::Exhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NotesaurusError, generator::MockTextBackend};

    fn backend(
        name: &'static str,
        response: Option<&'static str>,
        calls: usize,
    ) -> Box<dyn TextBackend> {
        let mut mock = MockTextBackend::new();
        mock.expect_name().returning(move || name.to_string());
        mock.expect_generate()
            .times(calls)
            .returning(move |_| match response {
                Some(text) => Ok(text.to_string()),
                None => Err(NotesaurusError::NetworkError("503".into())),
            });
        Box::new(mock)
    }

    #[tokio::test]
    async fn returns_first_successful_backend() {
        let chain = FallbackChain::new(
            vec![
                backend("first", None, 1),
                backend("second", Some("  polished notes \n"), 1),
                backend("third", Some("never used"), 0),
            ],
            Duration::from_secs(5),
        );

        let generated = chain.generate("prompt").await.unwrap();

        assert_eq!(generated.backend, "second");
        assert_eq!(generated.text, "polished notes");
    }

    #[tokio::test]
    async fn treats_empty_text_as_failure() {
        let chain = FallbackChain::new(
            vec![backend("blank", Some("   "), 1), backend("real", Some("ok"), 1)],
            Duration::from_secs(5),
        );

        let generated = chain.generate("prompt").await.unwrap();
        assert_eq!(generated.backend, "real");
    }

    #[tokio::test]
    async fn reports_every_attempt_when_exhausted() {
        let chain = FallbackChain::new(
            vec![backend("a", None, 1), backend("b", Some(""), 1)],
            Duration::from_secs(5),
        );

        let GenerationError::Exhausted { attempts } =
            chain.generate("prompt").await.unwrap_err();

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].backend, "a");
        assert_eq!(attempts[1].error, "empty response");
    }

    #[tokio::test]
    async fn empty_chain_is_exhausted_immediately() {
        let chain = FallbackChain::new(vec![], Duration::from_secs(5));

        assert!(chain.is_empty());
        let GenerationError::Exhausted { attempts } =
            chain.generate("prompt").await.unwrap_err();
        assert!(attempts.is_empty());
    }
}
