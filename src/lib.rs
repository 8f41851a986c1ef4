//! initrack - tabletop combat encounter tracker
//!
//! Tracks initiative order, hit points and conditions across combat rounds,
//! with a persistent NPC template library and condition vocabulary.

pub mod console;
pub mod db;
pub mod encounter;
pub mod input;
pub mod library;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::info;

use db::Database;
use encounter::{Combatant, Encounter, EncounterError, IdGenerator};
use library::{ConditionVocabulary, TemplateLibrary};

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file for the template library and conditions; None = in-memory
    pub db_path: Option<String>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Default name for new environment turns
    pub lair_action_name: String,
    /// Default initiative for new environment turns
    pub lair_action_initiative: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            log_filter: "initrack=info".to_string(),
            lair_action_name: "Lair Action".to_string(),
            lair_action_initiative: 20,
        }
    }
}

impl Config {
    /// Layer defaults, an optional TOML file, then `INITRACK_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config = figment.merge(Env::prefixed("INITRACK_")).extract()?;
        Ok(config)
    }

    /// Point storage at `path`, overriding any configured `db_path`
    pub fn with_database(mut self, path: &Path) -> Self {
        self.db_path = Some(path.to_string_lossy().into_owned());
        self
    }
}

/// A tracker session: one encounter plus the shared library data
pub struct Tracker {
    config: Config,
    encounter: Encounter,
    library: Arc<TemplateLibrary>,
    conditions: Arc<ConditionVocabulary>,
}

impl Tracker {
    /// Open storage and load the library and vocabulary
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::new(config.db_path.as_deref()).await?;
        let library = TemplateLibrary::load(Some(db.kv())).await;
        let conditions = ConditionVocabulary::load(Some(db.kv())).await;

        info!(
            "Tracker ready ({} templates, {} conditions)",
            library.list().await.len(),
            conditions.list().await.len()
        );

        Ok(Self {
            config,
            encounter: Encounter::with_ids(IdGenerator::shared()),
            library: Arc::new(library),
            conditions: Arc::new(conditions),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn encounter_mut(&mut self) -> &mut Encounter {
        &mut self.encounter
    }

    pub fn library(&self) -> Arc<TemplateLibrary> {
        self.library.clone()
    }

    pub fn conditions(&self) -> Arc<ConditionVocabulary> {
        self.conditions.clone()
    }

    /// Instantiate a library template into the encounter
    pub async fn add_from_library(
        &mut self,
        template_id: &str,
        initiative: i32,
    ) -> Result<Combatant, EncounterError> {
        let templates = self.library.list().await;
        self.encounter
            .add_from_template(&templates, template_id, initiative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.db_path, None);
        assert_eq!(config.lair_action_name, "Lair Action");
        assert_eq!(config.lair_action_initiative, 20);
    }

    #[test]
    fn test_config_from_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "initrack.toml",
                "db_path = \"/tmp/tracker.db\"\nlair_action_initiative = 15",
            )?;

            let config =
                Config::load(Some(Path::new("initrack.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.db_path.as_deref(), Some("/tmp/tracker.db"));
            assert_eq!(config.lair_action_initiative, 15);
            assert_eq!(config.lair_action_name, "Lair Action");
            Ok(())
        });
    }

    #[test]
    fn test_config_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "initrack.toml",
                "lair_action_initiative = 15\nlair_action_name = \"Collapse\"",
            )?;
            jail.set_env("INITRACK_LAIR_ACTION_INITIATIVE", 12);
            jail.set_env("INITRACK_LOG_FILTER", "initrack=debug");

            let config =
                Config::load(Some(Path::new("initrack.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.lair_action_initiative, 12);
            assert_eq!(config.lair_action_name, "Collapse");
            assert_eq!(config.log_filter, "initrack=debug");
            Ok(())
        });
    }

    #[test]
    fn test_config_with_database_overrides_db_path() {
        let config = Config {
            db_path: Some("/tmp/from-config.db".to_string()),
            ..Config::default()
        };

        let config = config.with_database(Path::new("/var/lib/initrack/cli.db"));
        assert_eq!(config.db_path.as_deref(), Some("/var/lib/initrack/cli.db"));
        assert_eq!(
            Config::default().with_database(Path::new("x.db")).db_path.as_deref(),
            Some("x.db")
        );
    }

    #[tokio::test]
    async fn test_tracker_add_from_library() {
        let mut tracker = Tracker::new(Config::default()).await.unwrap();

        let orc = tracker.add_from_library("npc_orc", 11).await.unwrap();
        assert_eq!(orc.name(), "Orc");
        assert_eq!(orc.max_hp(), 15);

        let err = tracker.add_from_library("npc_nothing", 11).await.unwrap_err();
        assert!(matches!(err, EncounterError::NotFound(_)));
        assert_eq!(tracker.encounter().roster().len(), 1);
    }
}
