//! Reusable tracker data: NPC templates and the condition vocabulary
//!
//! Both collections live in memory and are written back to the key-value
//! store after every change. Persistence is best effort: a failed save is
//! logged and the in-memory change stands.

mod conditions;
mod templates;

pub use conditions::{ConditionVocabulary, DEFAULT_CONDITIONS};
pub use templates::{default_templates, NpcTemplate, TemplateLibrary};

use thiserror::Error;

/// Store key for the NPC template library
pub const LIBRARY_KEY: &str = "npc_library";

/// Store key for the condition vocabulary
pub const CONDITIONS_KEY: &str = "conditions";

/// Library and vocabulary errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),
}
