//! Encounter errors

use thiserror::Error;

/// Reasons a command against the encounter is rejected.
///
/// A rejected command leaves the encounter unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),
}

impl EncounterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EncounterError::InvalidInput(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        EncounterError::NotFound(what.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        EncounterError::InvalidState(msg.into())
    }
}
