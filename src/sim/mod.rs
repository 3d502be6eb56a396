pub mod battle;
pub mod damage;
pub mod moves;
pub mod pokemon;
pub mod stats;

pub use battle::{Action, Battle, BattlePhase, BattleResult, Side, TurnReport};
pub use pokemon::{Combatant, CombatantSnapshot, MajorStatus};
