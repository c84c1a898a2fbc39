pub mod bucket;
pub mod cli;
pub mod config;
mod deadline;
pub mod draft;
pub mod error;
pub mod fetcher;
pub mod forge;
pub mod generator;
pub mod git;
pub mod month;
pub mod orchestrator;
pub mod references;
pub mod render;
pub mod sync;

pub use error::{NotesaurusError, Result};
pub use orchestrator::{Orchestrator, RunSummary};

#[cfg(test)]
pub mod test_helpers;
