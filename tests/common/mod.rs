//! Common test utilities - TrackerTest harness for end-to-end testing

#![allow(dead_code)]

use std::path::Path;

use anyhow::Result;
use initrack::console::{self, Reply};
use initrack::encounter::{CombatantType, Encounter};
use initrack::{Config, Tracker};

/// Test harness wrapping a tracker with its own database
pub struct TrackerTest {
    pub tracker: Tracker,
}

impl TrackerTest {
    /// Start a tracker on an in-memory database
    pub async fn start() -> Result<Self> {
        let tracker = Tracker::new(Config::default()).await?;
        Ok(Self { tracker })
    }

    /// Start a tracker on a database file
    pub async fn open(path: &Path) -> Result<Self> {
        let tracker = Tracker::new(Config::default().with_database(path)).await?;
        Ok(Self { tracker })
    }

    /// Run one console line and return its output
    pub async fn run(&mut self, line: &str) -> String {
        match console::execute(&mut self.tracker, line).await {
            Reply::Output(text) => text,
            Reply::Quit => "<quit>".to_string(),
        }
    }

    /// Run a line and fail the test if it reports an error
    pub async fn ok(&mut self, line: &str) -> String {
        let out = self.run(line).await;
        assert!(!out.starts_with("error:"), "`{}` failed: {}", line, out);
        out
    }

    pub fn encounter(&self) -> &Encounter {
        self.tracker.encounter()
    }

    /// Id of the active entry
    pub fn active_id(&self) -> Option<String> {
        self.encounter().current_entry().map(|e| e.id().to_string())
    }
}

/// Encounter with the order Aria (18), Goblin (12), Borin (9).
/// Returns the ids in that order.
pub fn party_encounter() -> (Encounter, [String; 3]) {
    let mut enc = Encounter::new();
    let goblin = enc
        .add_combatant("Goblin", 7, 12, CombatantType::Npc)
        .unwrap();
    let aria = enc
        .add_combatant("Aria", 24, 18, CombatantType::Player)
        .unwrap();
    let borin = enc
        .add_combatant("Borin", 30, 9, CombatantType::Player)
        .unwrap();
    (
        enc,
        [
            aria.id().to_string(),
            goblin.id().to_string(),
            borin.id().to_string(),
        ],
    )
}

/// Ids of the initiative order, top to bottom
pub fn order_ids(enc: &Encounter) -> Vec<String> {
    enc.order().iter().map(|e| e.id().to_string()).collect()
}
