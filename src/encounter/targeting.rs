//! Multi-target operations
//!
//! A targeting session batches one amount and a set of condition toggles
//! against several combatants chosen by an acting source. Applying the
//! session is all-or-nothing: validation happens before any HP changes.

use serde::Serialize;

use super::entry::ConditionSet;
use super::EncounterError;

/// What a targeting session applies to its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEffect {
    Damage,
    Heal,
    ConditionsOnly,
}

/// An open, uncommitted multi-target request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingSession {
    source_id: String,
    targets: Vec<String>,
    amount: Option<i32>,
    pending_conditions: ConditionSet,
}

impl TargetingSession {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            targets: Vec::new(),
            amount: None,
            pending_conditions: ConditionSet::new(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn is_targeted(&self, id: &str) -> bool {
        self.targets.iter().any(|t| t == id)
    }

    pub fn amount(&self) -> Option<i32> {
        self.amount
    }

    pub fn pending_conditions(&self) -> &ConditionSet {
        &self.pending_conditions
    }

    /// Flip whether `id` is targeted. Returns true if it is now targeted.
    pub(crate) fn toggle_target(&mut self, id: &str) -> bool {
        if let Some(pos) = self.targets.iter().position(|t| t == id) {
            self.targets.remove(pos);
            false
        } else {
            self.targets.push(id.to_string());
            true
        }
    }

    pub(crate) fn drop_target(&mut self, id: &str) {
        self.targets.retain(|t| t != id);
    }

    pub(crate) fn set_amount(&mut self, amount: Option<i32>) {
        self.amount = amount;
    }

    pub(crate) fn toggle_condition(&mut self, name: &str) -> bool {
        self.pending_conditions.toggle(name)
    }

    /// Check the session can be applied with `effect`.
    /// Returns the HP delta to apply to each target.
    pub(crate) fn validate(&self, effect: TargetEffect) -> Result<i64, EncounterError> {
        if self.targets.is_empty() {
            return Err(EncounterError::invalid("Select at least one target"));
        }

        match effect {
            TargetEffect::ConditionsOnly => {
                if self.pending_conditions.is_empty() {
                    return Err(EncounterError::invalid("Select at least one condition"));
                }
                Ok(0)
            }
            TargetEffect::Damage | TargetEffect::Heal => {
                let amount = match self.amount {
                    Some(n) if n > 0 => n as i64,
                    _ => return Err(EncounterError::invalid("Amount must be a positive number")),
                };
                if effect == TargetEffect::Damage {
                    Ok(-amount)
                } else {
                    Ok(amount)
                }
            }
        }
    }
}
