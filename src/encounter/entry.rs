//! Roster entries: combatants and environment turns
//!
//! Combatants carry HP and conditions; environment turns ("lair actions")
//! only occupy a slot in the initiative order.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which side of the screen a combatant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatantType {
    /// Player character
    #[default]
    Player,
    /// Non-player character or monster
    Npc,
}

impl FromStr for CombatantType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" | "pc" => Ok(CombatantType::Player),
            "npc" | "monster" => Ok(CombatantType::Npc),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CombatantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CombatantType::Player => "player",
            CombatantType::Npc => "npc",
        };
        write!(f, "{}", s)
    }
}

/// Ordered set of condition names with toggle semantics
///
/// Insertion order is preserved so conditions display in the order they
/// were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<String>);

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `name`. Returns true if it is now present.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|c| c == name) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(name.to_string());
            true
        }
    }

    /// Toggle every name in `toggles` into this set
    pub fn apply_toggles(&mut self, toggles: &ConditionSet) {
        for name in toggles.iter() {
            self.toggle(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ConditionSet::new();
        for name in iter {
            let name = name.into();
            if !set.contains(&name) {
                set.0.push(name);
            }
        }
        set
    }
}

/// A roster entry with hit points and conditions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    id: String,
    name: String,
    max_hp: i32,
    current_hp: i32,
    initiative: i32,
    #[serde(rename = "type")]
    kind: CombatantType,
    conditions: ConditionSet,
    took_turn_this_round: bool,
}

impl Combatant {
    /// Create a combatant at full HP with no conditions.
    /// Callers validate `max_hp > 0` beforehand.
    pub(crate) fn new(
        id: String,
        name: String,
        max_hp: i32,
        initiative: i32,
        kind: CombatantType,
    ) -> Self {
        Self {
            id,
            name,
            max_hp,
            current_hp: max_hp,
            initiative,
            kind,
            conditions: ConditionSet::new(),
            took_turn_this_round: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    pub fn kind(&self) -> CombatantType {
        self.kind
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn took_turn_this_round(&self) -> bool {
        self.took_turn_this_round
    }

    /// Whether the combatant is at 0 HP
    pub fn is_down(&self) -> bool {
        self.current_hp <= 0
    }

    /// Shift HP by `delta`, clamped to `[0, max_hp]`. Returns the new HP.
    pub(crate) fn apply_delta(&mut self, delta: i64) -> i32 {
        let next = (self.current_hp as i64)
            .saturating_add(delta)
            .clamp(0, self.max_hp as i64);
        self.current_hp = next as i32;
        self.current_hp
    }

    pub(crate) fn conditions_mut(&mut self) -> &mut ConditionSet {
        &mut self.conditions
    }

    pub(crate) fn set_took_turn(&mut self, took: bool) {
        self.took_turn_this_round = took;
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}) init {} HP {}/{}",
            self.id, self.name, self.kind, self.initiative, self.current_hp, self.max_hp
        )?;
        if !self.conditions.is_empty() {
            let names: Vec<&str> = self.conditions.iter().collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

/// A scripted world event that takes a slot in the initiative order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentTurn {
    id: String,
    name: String,
    initiative: i32,
    description: String,
}

impl EnvironmentTurn {
    pub(crate) fn new(id: String, name: String, initiative: i32, description: String) -> Self {
        Self {
            id,
            name,
            initiative,
            description,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    /// Free-text note, empty when none was given
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for EnvironmentTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (env) init {}", self.id, self.name, self.initiative)?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

/// Borrowed view of one slot in the initiative order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entry", rename_all = "lowercase")]
pub enum Entry<'a> {
    Combatant(&'a Combatant),
    #[serde(rename = "env")]
    Environment(&'a EnvironmentTurn),
}

impl<'a> Entry<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Entry::Combatant(c) => c.id(),
            Entry::Environment(e) => e.id(),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Entry::Combatant(c) => c.name(),
            Entry::Environment(e) => e.name(),
        }
    }

    pub fn initiative(&self) -> i32 {
        match self {
            Entry::Combatant(c) => c.initiative(),
            Entry::Environment(e) => e.initiative(),
        }
    }

    pub fn as_combatant(&self) -> Option<&'a Combatant> {
        match self {
            Entry::Combatant(c) => Some(c),
            Entry::Environment(_) => None,
        }
    }

    pub fn is_combatant(&self) -> bool {
        matches!(self, Entry::Combatant(_))
    }
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Combatant(c) => c.fmt(f),
            Entry::Environment(e) => e.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> Combatant {
        Combatant::new("c_1".into(), "Goblin".into(), 7, 12, CombatantType::Npc)
    }

    #[test]
    fn test_new_combatant_full_hp() {
        let c = goblin();
        assert_eq!(c.current_hp(), 7);
        assert_eq!(c.max_hp(), 7);
        assert!(c.conditions().is_empty());
        assert!(!c.took_turn_this_round());
    }

    #[test]
    fn test_apply_delta_clamps() {
        let mut c = goblin();

        assert_eq!(c.apply_delta(-3), 4);
        assert_eq!(c.apply_delta(-100), 0);
        assert!(c.is_down());

        assert_eq!(c.apply_delta(2), 2);
        assert_eq!(c.apply_delta(1000), 7);

        // Extreme values saturate instead of overflowing
        assert_eq!(c.apply_delta(i64::MIN), 0);
        assert_eq!(c.apply_delta(i64::MAX), 7);
    }

    #[test]
    fn test_condition_toggle() {
        let mut set = ConditionSet::new();
        assert!(set.toggle("Prone"));
        assert!(set.contains("Prone"));
        assert!(!set.toggle("Prone"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_apply_toggles_flips_membership() {
        let mut current: ConditionSet = ["Prone", "Poisoned"].into_iter().collect();
        let toggles: ConditionSet = ["Prone", "Stunned"].into_iter().collect();

        current.apply_toggles(&toggles);

        let names: Vec<&str> = current.iter().collect();
        assert_eq!(names, vec!["Poisoned", "Stunned"]);
    }

    #[test]
    fn test_combatant_type_parsing() {
        assert_eq!("player".parse::<CombatantType>(), Ok(CombatantType::Player));
        assert_eq!("NPC".parse::<CombatantType>(), Ok(CombatantType::Npc));
        assert_eq!("monster".parse::<CombatantType>(), Ok(CombatantType::Npc));
        assert!("dragon".parse::<CombatantType>().is_err());
    }

    #[test]
    fn test_entry_accessors() {
        let c = goblin();
        let env = EnvironmentTurn::new("c_2".into(), "Lair Action".into(), 20, String::new());

        let a = Entry::Combatant(&c);
        let b = Entry::Environment(&env);

        assert_eq!(a.id(), "c_1");
        assert!(a.is_combatant());
        assert_eq!(b.initiative(), 20);
        assert!(b.as_combatant().is_none());
    }

    #[test]
    fn test_display() {
        let mut c = goblin();
        c.conditions_mut().toggle("Prone");
        assert_eq!(c.to_string(), "[c_1] Goblin (npc) init 12 HP 7/7 [Prone]");

        let env = EnvironmentTurn::new("c_2".into(), "Lair".into(), 20, "rocks fall".into());
        assert_eq!(env.to_string(), "[c_2] Lair (env) init 20 - rocks fall");
    }
}
