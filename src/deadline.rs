use std::{future::Future, time::Duration};

use crate::{NotesaurusError, Result};

/// Awaits `fut`, failing with [`NotesaurusError::Timeout`] once `after`
/// elapses.
pub async fn within<T, F>(operation: &str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(NotesaurusError::timeout(operation, after)),
    }
}
