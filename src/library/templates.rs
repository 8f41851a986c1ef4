//! NPC template library
//!
//! Templates are stat summaries (name, max HP, AC, CR) that the encounter
//! instantiates into numbered combatants.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{LibraryError, LIBRARY_KEY};
use crate::db::KvStore;

/// Placeholder for unknown AC/CR values
const UNKNOWN: &str = "—";

/// A reusable NPC stat template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcTemplate {
    pub id: String,
    pub name: String,
    pub max_hp: i32,
    /// Armor class, free text ("15", "16 (chain shirt)")
    pub ac: String,
    /// Challenge rating, free text ("1/4", "17")
    pub cr: String,
}

impl NpcTemplate {
    pub fn new(id: &str, name: &str, max_hp: i32, ac: &str, cr: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_hp,
            ac: ac.to_string(),
            cr: cr.to_string(),
        }
    }
}

/// The built-in SRD monster list
pub fn default_templates() -> Vec<NpcTemplate> {
    [
        ("npc_goblin", "Goblin", 7, "15", "1/4"),
        ("npc_skeleton", "Skeleton", 13, "13", "1/4"),
        ("npc_zombie", "Zombie", 22, "8", "1/4"),
        ("npc_orc", "Orc", 15, "13", "1/2"),
        ("npc_wolf", "Wolf", 11, "13", "1/4"),
        ("npc_bandit", "Bandit", 11, "12", "1/8"),
        ("npc_cultist", "Cultist", 9, "12", "1/8"),
        ("npc_guard", "Guard", 11, "16", "1/8"),
        ("npc_hobgoblin", "Hobgoblin", 11, "18", "1/2"),
        ("npc_bugbear", "Bugbear", 27, "16", "1"),
        ("npc_gnoll", "Gnoll", 22, "15", "1/2"),
        ("npc_kobold", "Kobold", 5, "12", "1/8"),
        ("npc_troll", "Troll", 84, "15", "5"),
        ("npc_ogre", "Ogre", 59, "11", "2"),
        ("npc_banshee", "Banshee", 58, "12", "4"),
        ("npc_vampire", "Vampire", 144, "16", "13"),
        ("npc_dragon_young", "Young Red Dragon", 178, "18", "17"),
        ("npc_imp", "Imp", 10, "13", "1"),
        ("npc_merrow", "Merrow", 45, "13", "2"),
        ("npc_worg", "Worg", 26, "13", "1/2"),
    ]
    .into_iter()
    .map(|(id, name, hp, ac, cr)| NpcTemplate::new(id, name, hp, ac, cr))
    .collect()
}

/// Ordered collection of NPC templates with save-on-write persistence
#[derive(Debug)]
pub struct TemplateLibrary {
    templates: RwLock<Vec<NpcTemplate>>,
    store: Option<KvStore>,
}

impl TemplateLibrary {
    /// Create a library holding the default templates
    pub fn new(store: Option<KvStore>) -> Self {
        Self {
            templates: RwLock::new(default_templates()),
            store,
        }
    }

    /// Load the persisted library, falling back to the defaults
    pub async fn load(store: Option<KvStore>) -> Self {
        let library = Self::new(store);
        if let Some(ref store) = library.store {
            match store.get_json::<Vec<NpcTemplate>>(LIBRARY_KEY).await {
                Ok(Some(saved)) => {
                    debug!("Loaded {} NPC templates", saved.len());
                    *library.templates.write().await = saved;
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load NPC library, using defaults: {}", e),
            }
        }
        library
    }

    /// Snapshot of all templates in library order
    pub async fn list(&self) -> Vec<NpcTemplate> {
        self.templates.read().await.clone()
    }

    /// Look up a template by id
    pub async fn get(&self, id: &str) -> Option<NpcTemplate> {
        self.templates
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Add a custom template. Blank AC/CR become "—".
    pub async fn add_template(
        &self,
        name: &str,
        max_hp: i32,
        ac: &str,
        cr: &str,
    ) -> Result<NpcTemplate, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::InvalidInput("Name required".into()));
        }
        if max_hp < 1 {
            return Err(LibraryError::InvalidInput("Valid HP required".into()));
        }

        let or_unknown = |s: &str| {
            let s = s.trim();
            if s.is_empty() {
                UNKNOWN.to_string()
            } else {
                s.to_string()
            }
        };
        let template = NpcTemplate {
            id: format!("npc_{}", uuid::Uuid::new_v4().simple()),
            name: name.to_string(),
            max_hp,
            ac: or_unknown(ac),
            cr: or_unknown(cr),
        };

        let snapshot = {
            let mut templates = self.templates.write().await;
            templates.push(template.clone());
            templates.clone()
        };
        debug!("Added NPC template {} '{}'", template.id, template.name);
        self.persist(&snapshot).await;

        Ok(template)
    }

    /// Remove a template by id
    pub async fn remove(&self, id: &str) -> Result<NpcTemplate, LibraryError> {
        let (removed, snapshot) = {
            let mut templates = self.templates.write().await;
            let pos = templates
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| LibraryError::NotFound(format!("Template {}", id)))?;
            let removed = templates.remove(pos);
            (removed, templates.clone())
        };
        debug!("Removed NPC template {} '{}'", removed.id, removed.name);
        self.persist(&snapshot).await;

        Ok(removed)
    }

    /// Replace the library with the built-in templates
    pub async fn reset_to_defaults(&self) {
        let defaults = default_templates();
        *self.templates.write().await = defaults.clone();
        debug!("NPC library reset to defaults");
        self.persist(&defaults).await;
    }

    async fn persist(&self, templates: &[NpcTemplate]) {
        if let Some(ref store) = self.store {
            if let Err(e) = store.put_json(LIBRARY_KEY, templates).await {
                warn!("Failed to persist NPC library: {}", e);
            }
        }
    }
}
