//! Roster of live combatants and environment turns
//!
//! The roster owns entry storage and enforces per-entry invariants
//! (valid names, positive max HP, clamped current HP). Turn bookkeeping
//! that depends on the initiative order lives in [`super::Encounter`].

use std::sync::Arc;

use tracing::debug;

use super::entry::{Combatant, CombatantType, EnvironmentTurn};
use super::ids::IdGenerator;
use super::EncounterError;

/// Live entries of the current encounter, in insertion order
#[derive(Debug)]
pub struct Roster {
    combatants: Vec<Combatant>,
    env_turns: Vec<EnvironmentTurn>,
    ids: Arc<IdGenerator>,
}

impl Roster {
    /// Create an empty roster with its own identifier generator
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::shared())
    }

    /// Create an empty roster drawing identifiers from `ids`
    pub fn with_ids(ids: Arc<IdGenerator>) -> Self {
        Self {
            combatants: Vec::new(),
            env_turns: Vec::new(),
            ids,
        }
    }

    /// Add a combatant at full HP.
    ///
    /// `took_turn` seeds the turn-taken flag; the encounter decides it from
    /// the current turn pointer.
    pub fn add_combatant(
        &mut self,
        name: &str,
        max_hp: i32,
        initiative: i32,
        kind: CombatantType,
        took_turn: bool,
    ) -> Result<Combatant, EncounterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EncounterError::invalid("Name required"));
        }
        if max_hp < 1 {
            return Err(EncounterError::invalid("Valid HP required"));
        }

        let mut combatant = Combatant::new(self.ids.next(), name.to_string(), max_hp, initiative, kind);
        combatant.set_took_turn(took_turn);
        debug!(
            "Added combatant {} '{}' (hp {}, init {})",
            combatant.id(),
            combatant.name(),
            max_hp,
            initiative
        );
        self.combatants.push(combatant.clone());
        Ok(combatant)
    }

    /// Add a non-combatant turn slot
    pub fn add_environment_turn(
        &mut self,
        name: &str,
        initiative: i32,
        description: &str,
    ) -> Result<EnvironmentTurn, EncounterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EncounterError::invalid("Name required"));
        }

        let turn = EnvironmentTurn::new(
            self.ids.next(),
            name.to_string(),
            initiative,
            description.trim().to_string(),
        );
        debug!("Added environment turn {} '{}' (init {})", turn.id(), turn.name(), initiative);
        self.env_turns.push(turn.clone());
        Ok(turn)
    }

    /// Display name for a new instance of `base`: the bare name for the
    /// first instance, then `"{base} 2"`, `"{base} 3"`, ...
    pub fn instance_name(&self, base: &str) -> String {
        let count = self
            .combatants
            .iter()
            .filter(|c| c.name().starts_with(base))
            .count();
        if count == 0 {
            base.to_string()
        } else {
            format!("{} {}", base, count + 1)
        }
    }

    /// Remove an entry by id. Returns false if no entry had that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.len();
        self.combatants.retain(|c| c.id() != id);
        self.env_turns.retain(|e| e.id() != id);
        let removed = self.len() != before;
        if removed {
            debug!("Removed roster entry {}", id);
        }
        removed
    }

    /// Shift a combatant's HP by `delta` (negative = damage).
    /// Returns the new HP, or None if `id` is not a combatant.
    pub fn apply_delta(&mut self, id: &str, delta: i64) -> Option<i32> {
        let combatant = self.combatant_mut(id)?;
        let hp = combatant.apply_delta(delta);
        debug!("HP of {} changed by {} -> {}", id, delta, hp);
        Some(hp)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.combatants.clear();
        self.env_turns.clear();
    }

    /// Reset every combatant's turn-taken flag
    pub fn reset_turn_flags(&mut self) {
        for c in &mut self.combatants {
            c.set_took_turn(false);
        }
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    pub(crate) fn combatant_mut(&mut self, id: &str) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id() == id)
    }

    pub fn environment_turn(&self, id: &str) -> Option<&EnvironmentTurn> {
        self.env_turns.iter().find(|e| e.id() == id)
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn environment_turns(&self) -> &[EnvironmentTurn] {
        &self.env_turns
    }

    pub fn contains(&self, id: &str) -> bool {
        self.combatant(id).is_some() || self.environment_turn(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.combatants.len() + self.env_turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_combatant_validation() {
        let mut roster = Roster::new();

        let err = roster
            .add_combatant("   ", 10, 5, CombatantType::Player, false)
            .unwrap_err();
        assert_eq!(err, EncounterError::InvalidInput("Name required".into()));

        let err = roster
            .add_combatant("Aria", 0, 5, CombatantType::Player, false)
            .unwrap_err();
        assert_eq!(err, EncounterError::InvalidInput("Valid HP required".into()));

        assert!(roster.is_empty());

        let c = roster
            .add_combatant("  Aria ", 24, 15, CombatantType::Player, false)
            .unwrap();
        assert_eq!(c.name(), "Aria");
        assert_eq!(c.current_hp(), 24);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_instance_names() {
        let mut roster = Roster::new();
        assert_eq!(roster.instance_name("Goblin"), "Goblin");

        roster
            .add_combatant("Goblin", 7, 10, CombatantType::Npc, false)
            .unwrap();
        assert_eq!(roster.instance_name("Goblin"), "Goblin 2");

        roster
            .add_combatant("Goblin 2", 7, 10, CombatantType::Npc, false)
            .unwrap();
        assert_eq!(roster.instance_name("Goblin"), "Goblin 3");
        assert_eq!(roster.instance_name("Orc"), "Orc");
    }

    #[test]
    fn test_remove_and_delta() {
        let mut roster = Roster::new();
        let c = roster
            .add_combatant("Orc", 15, 12, CombatantType::Npc, false)
            .unwrap();
        let env = roster.add_environment_turn("Lair Action", 20, "").unwrap();

        assert_eq!(roster.apply_delta(c.id(), -20), Some(0));
        assert_eq!(roster.apply_delta(c.id(), 5), Some(5));
        assert_eq!(roster.apply_delta(env.id(), -5), None);
        assert_eq!(roster.apply_delta("missing", -5), None);

        assert!(roster.remove(env.id()));
        assert!(!roster.remove(env.id()));
        assert!(!roster.contains(env.id()));
        assert!(roster.contains(c.id()));

        roster.clear();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_ids_unique_across_kinds() {
        let mut roster = Roster::new();
        let a = roster
            .add_combatant("A", 5, 1, CombatantType::Player, false)
            .unwrap();
        let b = roster.add_environment_turn("B", 1, "").unwrap();
        roster.remove(a.id());
        let c = roster
            .add_combatant("C", 5, 1, CombatantType::Player, false)
            .unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_ne!(b.id(), c.id());
    }
}
