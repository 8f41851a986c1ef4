//! Initiative order derivation
//!
//! The order is never stored. It is rebuilt from the roster on every read so
//! the turn pointer always indexes a current view.

use super::entry::Entry;
use super::roster::Roster;

/// All roster entries sorted by initiative, highest first.
///
/// Combatants come before environment turns in the pre-sort sequence and the
/// sort is stable, so ties keep that insertion order.
pub fn initiative_order(roster: &Roster) -> Vec<Entry<'_>> {
    let mut entries: Vec<Entry<'_>> = roster
        .combatants()
        .iter()
        .map(Entry::Combatant)
        .chain(roster.environment_turns().iter().map(Entry::Environment))
        .collect();
    entries.sort_by(|a, b| b.initiative().cmp(&a.initiative()));
    entries
}

/// Position of `id` in `order`
pub fn position_of(order: &[Entry<'_>], id: &str) -> Option<usize> {
    order.iter().position(|e| e.id() == id)
}
