//! Turn-based battle engine for chat-hosted Pokemon battles.
//!
//! [`manager::BattleManager`] is the entry point: it owns challenges and
//! running battles, and resolves turns as players submit actions.

pub mod battle_logger;
pub mod config;
pub mod data;
pub mod error;
pub mod ids;
pub mod manager;
pub mod sim;

pub use config::load_config;
pub use error::{BattleError, ErrorKind, Result};

/// Commonly used exports for external consumers.
pub mod prelude {
    pub use crate::config::{BattleSettings, ManagerConfig, Mechanics};
    pub use crate::data::moves::{find_move, get_move, MoveId};
    pub use crate::error::{BattleError, ErrorKind};
    pub use crate::ids::{BattleId, ChallengeId, ChannelId, PlayerId};
    pub use crate::manager::{BattleManager, Challenge};
    pub use crate::sim::battle::{Action, Battle, BattlePhase, BattleResult, TurnReport};
    pub use crate::sim::pokemon::{Combatant, CombatantSnapshot, MajorStatus};
    pub use crate::sim::stats::{random_ivs, Nature};
}
