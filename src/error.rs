//! Error types returned by the battle engine and the registry.
//!
//! Every failure is surfaced to the caller; the engine keeps working after any
//! single failed call.
use thiserror::Error;

use crate::ids::{BattleId, ChannelId, PlayerId};
use crate::sim::battle::BattlePhase;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum BattleError {
    #[error("{action} is not allowed while the battle is {phase:?}")]
    InvalidState {
        action: &'static str,
        phase: BattlePhase,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("side {side} already submitted an action for turn {turn}")]
    AlreadySubmitted { side: usize, turn: u32 },

    #[error("{0} not found")]
    NotFound(Missing),

    #[error("challenge for {challenged} expired")]
    Expired { challenged: PlayerId },

    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// What a `NotFound` error was looking for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    Battle(BattleId),
    PlayerBattle(PlayerId),
    ChannelBattle(ChannelId),
    Challenge(PlayerId),
    Player(PlayerId),
    Opponent,
    Move(u16),
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Battle(id) => write!(f, "battle {id}"),
            Missing::PlayerBattle(id) => write!(f, "active battle for player {id}"),
            Missing::ChannelBattle(id) => write!(f, "active battle in channel {id}"),
            Missing::Challenge(id) => write!(f, "pending challenge for {id}"),
            Missing::Player(id) => write!(f, "player {id}"),
            Missing::Opponent => write!(f, "opponent side"),
            Missing::Move(id) => write!(f, "move #{id}"),
        }
    }
}

/// Fieldless error classification for callers that only branch on the kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidState,
    ValidationFailed,
    AlreadySubmitted,
    NotFound,
    Expired,
    Unavailable,
}

impl BattleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BattleError::InvalidState { .. } => ErrorKind::InvalidState,
            BattleError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            BattleError::AlreadySubmitted { .. } => ErrorKind::AlreadySubmitted,
            BattleError::NotFound(_) => ErrorKind::NotFound,
            BattleError::Expired { .. } => ErrorKind::Expired,
            BattleError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BattleError::ValidationFailed(msg.into())
    }
}
