//! Combat encounter tracking
//!
//! Bookkeeping for a tabletop combat encounter:
//! - Roster of combatants and environment turns
//! - Initiative order (derived on every read)
//! - Turn cursor with round counting
//! - Staged damage/heal/condition edits for the active entry
//! - Multi-target damage, healing and condition application
//!
//! This is not a rules engine: no dice, resistances or legality checks.

mod entry;
mod error;
mod ids;
mod order;
mod roster;
mod session;
mod targeting;

pub use entry::{Combatant, CombatantType, ConditionSet, Entry, EnvironmentTurn};
pub use error::EncounterError;
pub use ids::IdGenerator;
pub use order::{initiative_order, position_of};
pub use roster::Roster;
pub use session::{Encounter, Phase, StagedEdits, TurnResult};
pub use targeting::{TargetEffect, TargetingSession};
