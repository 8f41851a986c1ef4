//! Encounter session: roster, turn cursor and staged edits
//!
//! An encounter starts in the Building phase where entries are added and
//! removed freely. `start` switches to Active and points the cursor at the
//! top of the initiative order; `commit_turn` and `prev_turn` move the
//! cursor, and `end` clears everything back to Building.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::entry::{Combatant, CombatantType, ConditionSet, EnvironmentTurn, Entry};
use super::ids::IdGenerator;
use super::order::{initiative_order, position_of};
use super::roster::Roster;
use super::targeting::{TargetEffect, TargetingSession};
use super::EncounterError;
use crate::library::NpcTemplate;

/// Encounter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Roster building; no turn pointer
    #[default]
    Building,
    /// Combat in progress
    Active,
}

/// Uncommitted edits for the active entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedEdits {
    pub damage: i32,
    pub heal: i32,
    /// Conditions whose membership flips on commit
    pub condition_toggles: ConditionSet,
}

impl StagedEdits {
    pub fn is_empty(&self) -> bool {
        self.damage == 0 && self.heal == 0 && self.condition_toggles.is_empty()
    }

    fn clear(&mut self) {
        *self = StagedEdits::default();
    }
}

/// Cursor position after a turn transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnResult {
    pub round: u32,
    pub current_index: usize,
    /// The transition crossed a round boundary
    pub new_round: bool,
}

/// A single combat encounter
#[derive(Debug)]
pub struct Encounter {
    roster: Roster,
    phase: Phase,
    current_index: usize,
    round: u32,
    staged: StagedEdits,
    targeting: Option<TargetingSession>,
}

impl Encounter {
    /// Create an empty encounter in the Building phase
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::shared())
    }

    /// Create an encounter drawing entry identifiers from `ids`
    pub fn with_ids(ids: Arc<IdGenerator>) -> Self {
        Self {
            roster: Roster::with_ids(ids),
            phase: Phase::Building,
            current_index: 0,
            round: 1,
            staged: StagedEdits::default(),
            targeting: None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current initiative order, rebuilt from the roster
    pub fn order(&self) -> Vec<Entry<'_>> {
        initiative_order(&self.roster)
    }

    /// The entry whose turn it is, if combat is active
    pub fn current_entry(&self) -> Option<Entry<'_>> {
        if self.phase != Phase::Active {
            return None;
        }
        let order = self.order();
        if order.is_empty() {
            return None;
        }
        let idx = self.current_index % order.len();
        order.get(idx).copied()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.roster.combatant(id)
    }

    /// Look up any entry by id
    pub fn entry(&self, id: &str) -> Option<Entry<'_>> {
        if let Some(c) = self.roster.combatant(id) {
            return Some(Entry::Combatant(c));
        }
        self.roster.environment_turn(id).map(Entry::Environment)
    }

    pub fn staged(&self) -> &StagedEdits {
        &self.staged
    }

    pub fn targeting(&self) -> Option<&TargetingSession> {
        self.targeting.as_ref()
    }

    fn current_id(&self) -> Option<String> {
        self.current_entry().map(|e| e.id().to_string())
    }

    // ------------------------------------------------------------------
    // Roster commands
    // ------------------------------------------------------------------

    /// Add a combatant.
    ///
    /// During combat, a newcomer whose initiative is at or above the active
    /// entry's is marked as having already acted this round.
    pub fn add_combatant(
        &mut self,
        name: &str,
        max_hp: i32,
        initiative: i32,
        kind: CombatantType,
    ) -> Result<Combatant, EncounterError> {
        let took_turn = self.late_joiner_took_turn(initiative);
        let active = self.current_id();
        let combatant = self
            .roster
            .add_combatant(name, max_hp, initiative, kind, took_turn)?;
        self.keep_cursor_on(active.as_deref());
        Ok(combatant)
    }

    /// Instantiate an NPC from a library template
    pub fn add_from_template(
        &mut self,
        templates: &[NpcTemplate],
        template_id: &str,
        initiative: i32,
    ) -> Result<Combatant, EncounterError> {
        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| EncounterError::not_found(format!("Template {}", template_id)))?;

        let name = self.roster.instance_name(&template.name);
        self.add_combatant(&name, template.max_hp, initiative, CombatantType::Npc)
    }

    /// Add an environment turn (lair action, hazard, ...)
    pub fn add_environment_turn(
        &mut self,
        name: &str,
        initiative: i32,
        description: &str,
    ) -> Result<EnvironmentTurn, EncounterError> {
        let active = self.current_id();
        let turn = self
            .roster
            .add_environment_turn(name, initiative, description)?;
        self.keep_cursor_on(active.as_deref());
        Ok(turn)
    }

    /// Remove an entry. Returns false (and changes nothing) if absent.
    ///
    /// Entries before the cursor shift it back by one so the same entry stays
    /// active. Removing the active entry hands the turn to its successor and
    /// discards its staged edits.
    pub fn remove(&mut self, id: &str) -> bool {
        let (idx, len) = {
            let order = self.order();
            match position_of(&order, id) {
                Some(idx) => (idx, order.len()),
                None => return false,
            }
        };

        let was_active = self.is_started() && idx == self.current_index % len;
        self.roster.remove(id);

        if self.is_started() {
            if idx < self.current_index {
                self.current_index -= 1;
            }
            let new_len = len - 1;
            self.current_index = if new_len == 0 {
                0
            } else {
                self.current_index % new_len
            };
            if was_active {
                self.staged.clear();
            }
        }

        if let Some(session) = self.targeting.as_mut() {
            if session.source_id() == id {
                self.targeting = None;
            } else {
                session.drop_target(id);
            }
        }
        true
    }

    /// Shift a combatant's HP by `delta` outside the staged-turn flow.
    /// No-op returning None if `id` is not a combatant.
    pub fn apply_delta(&mut self, id: &str, delta: i32) -> Option<i32> {
        self.roster.apply_delta(id, delta as i64)
    }

    /// Quick damage: subtracts `|amount|`
    pub fn apply_damage(&mut self, id: &str, amount: i32) -> Option<i32> {
        self.roster.apply_delta(id, -(amount as i64).abs())
    }

    /// Quick heal: adds `|amount|`
    pub fn apply_heal(&mut self, id: &str, amount: i32) -> Option<i32> {
        self.roster.apply_delta(id, (amount as i64).abs())
    }

    /// Remove every entry without leaving the current phase
    pub fn clear_roster(&mut self) {
        self.roster.clear();
        self.current_index = 0;
        self.staged.clear();
        self.targeting = None;
    }

    // ------------------------------------------------------------------
    // Turn cursor
    // ------------------------------------------------------------------

    /// Begin combat at the top of the order in round 1
    pub fn start(&mut self) -> Result<(), EncounterError> {
        let len = self.order().len();
        if len == 0 {
            return Err(EncounterError::state("Add at least one entry before starting combat"));
        }

        self.phase = Phase::Active;
        self.current_index = 0;
        self.round = 1;
        self.staged.clear();
        self.roster.reset_turn_flags();
        info!("Combat started with {} entries", len);
        Ok(())
    }

    /// Commit the active entry's staged edits and advance the cursor.
    pub fn commit_turn(&mut self) -> Result<TurnResult, EncounterError> {
        if !self.is_started() {
            return Err(EncounterError::state("Combat has not started"));
        }
        let len = self.order().len();
        if len == 0 {
            return Err(EncounterError::state("No entries in the initiative order"));
        }

        let idx = self.current_index % len;
        let active = self.current_entry().and_then(|e| {
            e.as_combatant().map(|c| c.id().to_string())
        });

        if let Some(id) = active {
            let delta = self.staged.heal as i64 - self.staged.damage as i64;
            if let Some(c) = self.roster.combatant_mut(&id) {
                let hp = c.apply_delta(delta);
                c.conditions_mut().apply_toggles(&self.staged.condition_toggles);
                c.set_took_turn(true);
                debug!("Committed turn for {}: hp {}", id, hp);
            }
        }
        self.staged.clear();

        let new_round = idx + 1 >= len;
        if new_round {
            self.round += 1;
            self.roster.reset_turn_flags();
            info!("Round {} begins", self.round);
        }
        self.current_index = (idx + 1) % len;

        Ok(TurnResult {
            round: self.round,
            current_index: self.current_index,
            new_round,
        })
    }

    /// Step the cursor back one entry, discarding staged edits.
    /// Committed HP and condition changes are not reverted.
    pub fn prev_turn(&mut self) -> Result<TurnResult, EncounterError> {
        if !self.is_started() {
            return Err(EncounterError::state("Combat has not started"));
        }
        let len = self.order().len();
        if len == 0 {
            return Err(EncounterError::state("No entries in the initiative order"));
        }

        let idx = self.current_index % len;
        let new_round = idx == 0;
        if new_round {
            self.round = self.round.saturating_sub(1).max(1);
            self.current_index = len - 1;
        } else {
            self.current_index = idx - 1;
        }
        self.staged.clear();

        Ok(TurnResult {
            round: self.round,
            current_index: self.current_index,
            new_round,
        })
    }

    /// End combat: clear the roster and return to Building
    pub fn end(&mut self) {
        let round = self.round;
        self.phase = Phase::Building;
        self.clear_roster();
        self.round = 1;
        info!("Combat ended after {} round(s)", round);
    }

    // ------------------------------------------------------------------
    // Staged turn edits
    // ------------------------------------------------------------------

    pub fn set_pending_damage(&mut self, amount: i32) -> Result<(), EncounterError> {
        self.require_active_entry()?;
        self.staged.damage = amount;
        Ok(())
    }

    pub fn set_pending_heal(&mut self, amount: i32) -> Result<(), EncounterError> {
        self.require_active_entry()?;
        self.staged.heal = amount;
        Ok(())
    }

    /// Stage (or unstage) a condition flip for the active entry.
    /// Returns true if the condition is now staged.
    pub fn toggle_staged_condition(&mut self, name: &str) -> Result<bool, EncounterError> {
        self.require_active_entry()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EncounterError::invalid("Condition name required"));
        }
        Ok(self.staged.condition_toggles.toggle(name))
    }

    fn require_active_entry(&self) -> Result<(), EncounterError> {
        match self.current_entry() {
            Some(_) => Ok(()),
            None => Err(EncounterError::state("No active entry")),
        }
    }

    // ------------------------------------------------------------------
    // Multi-target operations
    // ------------------------------------------------------------------

    /// Open a targeting session for `source_id`, discarding any open one
    pub fn open_targeting(&mut self, source_id: &str) -> Result<&TargetingSession, EncounterError> {
        if self.roster.combatant(source_id).is_none() {
            return Err(EncounterError::not_found(format!("Combatant {}", source_id)));
        }
        Ok(self.targeting.insert(TargetingSession::new(source_id)))
    }

    /// Close the targeting session without applying it
    pub fn close_targeting(&mut self) {
        self.targeting = None;
    }

    /// Select or deselect a target. Returns true if it is now selected.
    pub fn toggle_target(&mut self, id: &str) -> Result<bool, EncounterError> {
        let exists = self.roster.combatant(id).is_some();
        let session = self.session_mut()?;
        if session.source_id() == id {
            return Err(EncounterError::invalid("A combatant cannot target itself"));
        }
        if !exists {
            return Err(EncounterError::not_found(format!("Combatant {}", id)));
        }
        Ok(session.toggle_target(id))
    }

    /// Set or clear the amount of the open session
    pub fn set_target_amount(&mut self, amount: Option<i32>) -> Result<(), EncounterError> {
        self.session_mut()?.set_amount(amount);
        Ok(())
    }

    /// Stage (or unstage) a condition flip for every target
    pub fn toggle_target_condition(&mut self, name: &str) -> Result<bool, EncounterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EncounterError::invalid("Condition name required"));
        }
        Ok(self.session_mut()?.toggle_condition(name))
    }

    /// Damage every target, toggling any staged conditions, then close the session
    pub fn apply_targeted_damage(&mut self) -> Result<usize, EncounterError> {
        self.apply_targeting(TargetEffect::Damage)
    }

    /// Heal every target, toggling any staged conditions, then close the session
    pub fn apply_targeted_heal(&mut self) -> Result<usize, EncounterError> {
        self.apply_targeting(TargetEffect::Heal)
    }

    /// Toggle staged conditions on every target, then close the session
    pub fn apply_targeted_conditions(&mut self) -> Result<usize, EncounterError> {
        self.apply_targeting(TargetEffect::ConditionsOnly)
    }

    fn session_mut(&mut self) -> Result<&mut TargetingSession, EncounterError> {
        self.targeting
            .as_mut()
            .ok_or_else(|| EncounterError::state("No targeting session is open"))
    }

    fn apply_targeting(&mut self, effect: TargetEffect) -> Result<usize, EncounterError> {
        let session = self
            .targeting
            .as_ref()
            .ok_or_else(|| EncounterError::state("No targeting session is open"))?;
        let delta = session.validate(effect)?;

        let mut applied = 0;
        for id in session.targets() {
            if let Some(c) = self.roster.combatant_mut(id) {
                if delta != 0 {
                    c.apply_delta(delta);
                }
                c.conditions_mut().apply_toggles(session.pending_conditions());
                applied += 1;
            }
        }
        debug!(
            "Applied {:?} from {} to {} target(s)",
            effect,
            session.source_id(),
            applied
        );

        self.targeting = None;
        Ok(applied)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn late_joiner_took_turn(&self, initiative: i32) -> bool {
        if !self.is_started() {
            return false;
        }
        let current = self.current_entry().map(|e| e.initiative()).unwrap_or(0);
        initiative >= current
    }

    /// Re-point the cursor at `active` after the order changed shape
    fn keep_cursor_on(&mut self, active: Option<&str>) {
        let Some(id) = active else {
            return;
        };
        let order = self.order();
        if let Some(idx) = position_of(&order, id) {
            self.current_index = idx;
        }
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}
