//! Condition vocabulary
//!
//! The list of status-effect names offered when staging conditions. The
//! encounter does not validate against it; arbitrary names are allowed.

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{LibraryError, CONDITIONS_KEY};
use crate::db::KvStore;

/// Built-in 5e conditions plus concentration
pub const DEFAULT_CONDITIONS: &[&str] = &[
    "Blinded",
    "Charmed",
    "Deafened",
    "Exhaustion",
    "Frightened",
    "Grappled",
    "Incapacitated",
    "Invisible",
    "Paralyzed",
    "Petrified",
    "Poisoned",
    "Prone",
    "Restrained",
    "Stunned",
    "Unconscious",
    "Concentration",
];

fn defaults() -> Vec<String> {
    DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect()
}

/// Ordered set of condition names with save-on-write persistence
#[derive(Debug)]
pub struct ConditionVocabulary {
    conditions: RwLock<Vec<String>>,
    store: Option<KvStore>,
}

impl ConditionVocabulary {
    /// Create a vocabulary holding the default conditions
    pub fn new(store: Option<KvStore>) -> Self {
        Self {
            conditions: RwLock::new(defaults()),
            store,
        }
    }

    /// Load the persisted vocabulary, falling back to the defaults
    pub async fn load(store: Option<KvStore>) -> Self {
        let vocab = Self::new(store);
        if let Some(ref store) = vocab.store {
            match store.get_json::<Vec<String>>(CONDITIONS_KEY).await {
                Ok(Some(saved)) => {
                    debug!("Loaded {} conditions", saved.len());
                    *vocab.conditions.write().await = saved;
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load conditions, using defaults: {}", e),
            }
        }
        vocab
    }

    pub async fn list(&self) -> Vec<String> {
        self.conditions.read().await.clone()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.conditions.read().await.iter().any(|c| c == name)
    }

    /// Add a condition name (trimmed). Exact duplicates are rejected.
    pub async fn add(&self, name: &str) -> Result<String, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::InvalidInput("Condition name required".into()));
        }

        let snapshot = {
            let mut conditions = self.conditions.write().await;
            if conditions.iter().any(|c| c == name) {
                return Err(LibraryError::Duplicate(format!("Condition \"{}\"", name)));
            }
            conditions.push(name.to_string());
            conditions.clone()
        };
        debug!("Added condition '{}'", name);
        self.persist(&snapshot).await;

        Ok(name.to_string())
    }

    /// Remove a condition name
    pub async fn remove(&self, name: &str) -> Result<(), LibraryError> {
        let snapshot = {
            let mut conditions = self.conditions.write().await;
            let pos = conditions
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| LibraryError::NotFound(format!("Condition \"{}\"", name)))?;
            conditions.remove(pos);
            conditions.clone()
        };
        debug!("Removed condition '{}'", name);
        self.persist(&snapshot).await;

        Ok(())
    }

    /// Replace the vocabulary with the built-in conditions
    pub async fn reset_to_defaults(&self) {
        let defaults = defaults();
        *self.conditions.write().await = defaults.clone();
        debug!("Conditions reset to defaults");
        self.persist(&defaults).await;
    }

    async fn persist(&self, conditions: &[String]) {
        if let Some(ref store) = self.store {
            if let Err(e) = store.put_json(CONDITIONS_KEY, conditions).await {
                warn!("Failed to persist conditions: {}", e);
            }
        }
    }
}
