//! Text generation through an ordered chain of model backends.
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::Result;

pub mod chain;
pub mod gemini;

pub use chain::{FallbackChain, Generated};

/// One backend attempt that did not produce usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    pub backend: String,
    pub error: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("all generation backends failed: {}", describe(.attempts))]
    Exhausted { attempts: Vec<BackendFailure> },
}

fn describe(attempts: &[BackendFailure]) -> String {
    if attempts.is_empty() {
        return "no backends configured".into();
    }

    attempts
        .iter()
        .map(|a| format!("{} ({})", a.backend, a.error))
        .collect::<Vec<String>>()
        .join(", ")
}

/// A single text-generation service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextBackend {
    /// Identifier reported in logs and run summaries, e.g. the model name.
    fn name(&self) -> String;
    async fn generate(&self, prompt: &str) -> Result<String>;
}
