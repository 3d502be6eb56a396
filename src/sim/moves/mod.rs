//! Applying a move's effect list once its damage has been resolved.

pub mod effects;

use crate::sim::pokemon::Combatant;

pub use effects::{apply_effect, EffectOutcome};

/// The combatants a move touches. Moves aimed at the user's own side resolve
/// to the user alone.
pub enum Participants<'a> {
    Pair {
        user: &'a mut Combatant,
        target: &'a mut Combatant,
    },
    Solo(&'a mut Combatant),
}

impl<'a> Participants<'a> {
    pub fn user(&mut self) -> &mut Combatant {
        match self {
            Participants::Pair { user, .. } => user,
            Participants::Solo(user) => user,
        }
    }

    pub fn target(&mut self) -> &mut Combatant {
        match self {
            Participants::Pair { target, .. } => target,
            Participants::Solo(user) => user,
        }
    }

    pub fn targets_user(&self) -> bool {
        matches!(self, Participants::Solo(_))
    }
}
