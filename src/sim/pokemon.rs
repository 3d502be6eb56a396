use crate::data::moves::MoveId;
use crate::data::species::get_species;
use crate::data::types::Type;
use crate::ids::PlayerId;
use crate::sim::stats::{apply_stage, BaseStats, BattleStat, Nature, StatsSet, MAX_STAGE, MIN_STAGE};
use anyhow::{anyhow, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mutually exclusive major status conditions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorStatus {
    Poison,
    Burn,
    Paralysis,
    Sleep,
    Freeze,
}

impl MajorStatus {
    pub fn inflicted_text(self) -> &'static str {
        match self {
            MajorStatus::Poison => "was poisoned",
            MajorStatus::Burn => "was burned",
            MajorStatus::Paralysis => "is paralyzed! It may be unable to move",
            MajorStatus::Sleep => "fell asleep",
            MajorStatus::Freeze => "was frozen solid",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct StatusEffect {
    pub condition: MajorStatus,
    /// Only sleep counts down; the other conditions last until cured.
    pub turns_remaining: Option<u8>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct DisabledMove {
    pub move_id: MoveId,
    pub turns_remaining: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ChargingMove {
    pub move_id: MoveId,
    pub turns_remaining: u8,
}

/// Immutable description of a team member, supplied by the caller. The engine
/// only ever works on its own copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: String,
    pub owner: PlayerId,
    pub species: String,
    pub level: u8,
    pub types: (Type, Option<Type>),
    pub base_stats: BaseStats,
    pub ivs: [u8; 6],
    pub nature: Nature,
    pub moves: Vec<MoveId>,
}

impl CombatantSnapshot {
    pub fn from_species(
        owner: impl Into<PlayerId>,
        species: &str,
        level: u8,
        ivs: [u8; 6],
        nature: Nature,
        moves: Vec<MoveId>,
    ) -> Result<Self> {
        let data = get_species(species)
            .ok_or_else(|| anyhow!("Species '{}' not found in the roster", species))?;
        let owner = owner.into();
        Ok(Self {
            id: format!("{}:{}", owner, data.name.to_ascii_lowercase()),
            owner,
            species: data.name.to_string(),
            level: level.clamp(1, 100),
            types: data.types,
            base_stats: data.base_stats,
            ivs,
            nature,
            moves,
        })
    }

    pub fn stats(&self) -> StatsSet {
        StatsSet::compute(&self.base_stats, self.ivs, self.level, self.nature)
    }

    pub fn has_type(&self, ty: Type) -> bool {
        self.types.0 == ty || self.types.1 == Some(ty)
    }
}

/// Per-battle mutable state of one team member.
#[derive(Clone, Debug, Serialize)]
pub struct Combatant {
    pub snapshot: CombatantSnapshot,
    pub stats: StatsSet,
    pub current_hp: u16,
    pub stages: [i8; 7],
    pub status: Option<StatusEffect>,
    pub confusion_turns: u8,
    pub flinched: bool,
    pub protect_turns: u8,
    pub trap_turns: u8,
    pub disabled: Option<DisabledMove>,
    pub charging: Option<ChargingMove>,
    pub recharge_turns: u8,
    pub last_move: Option<MoveId>,
}

/// Something that changed during end-of-turn housekeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Housekeeping {
    WokeUp,
    Thawed,
    ConfusionEnded,
    ProtectEnded,
    TrapEnded,
    DisableEnded(MoveId),
}

impl Combatant {
    pub fn new(snapshot: CombatantSnapshot) -> Self {
        let stats = snapshot.stats();
        Self {
            snapshot,
            current_hp: stats.hp,
            stats,
            stages: [0; 7],
            status: None,
            confusion_turns: 0,
            flinched: false,
            protect_turns: 0,
            trap_turns: 0,
            disabled: None,
            charging: None,
            recharge_turns: 0,
            last_move: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.snapshot.species
    }

    pub fn level(&self) -> u8 {
        self.snapshot.level
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Returns the HP actually removed.
    pub fn take_damage(&mut self, damage: u16) -> u16 {
        let dealt = damage.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Returns the HP actually restored. Fainted combatants cannot be healed.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let healed = amount.min(self.max_hp() - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn faint(&mut self) {
        self.current_hp = 0;
    }

    pub fn stage(&self, stat: BattleStat) -> i8 {
        self.stages[stat.index()]
    }

    /// Applies a stage delta clamped to `[-6, 6]` and returns the change that
    /// actually took place.
    pub fn modify_stage(&mut self, stat: BattleStat, delta: i8) -> i8 {
        let current = self.stages[stat.index()];
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        self.stages[stat.index()] = next;
        next - current
    }

    pub fn reset_stages(&mut self) {
        self.stages = [0; 7];
    }

    pub fn has_status(&self, condition: MajorStatus) -> bool {
        self.status.map(|s| s.condition) == Some(condition)
    }

    pub fn is_confused(&self) -> bool {
        self.confusion_turns > 0
    }

    pub fn is_protected(&self) -> bool {
        self.protect_turns > 0
    }

    pub fn is_trapped(&self) -> bool {
        self.trap_turns > 0
    }

    pub fn is_recharging(&self) -> bool {
        self.recharge_turns > 0
    }

    /// Speed used for turn order: stage-adjusted when stages are enabled, and
    /// halved while paralyzed.
    pub fn effective_speed(&self, use_stages: bool) -> u16 {
        let mut speed = if use_stages {
            apply_stage(self.stats.spe, self.stage(BattleStat::Speed))
        } else {
            self.stats.spe
        };
        if self.has_status(MajorStatus::Paralysis) {
            speed /= 2;
        }
        speed
    }

    /// Returns false without touching state when a major status is already set
    /// or the combatant has fainted.
    pub fn apply_status(&mut self, condition: MajorStatus, rng: &mut impl Rng) -> bool {
        if self.status.is_some() || self.is_fainted() {
            return false;
        }
        let turns_remaining = match condition {
            // 1-3 turns asleep once the infliction turn's countdown is spent.
            MajorStatus::Sleep => Some(rng.gen_range(2..=4)),
            _ => None,
        };
        self.status = Some(StatusEffect {
            condition,
            turns_remaining,
        });
        true
    }

    pub fn apply_confusion(&mut self, rng: &mut impl Rng) -> bool {
        if self.confusion_turns > 0 || self.is_fainted() {
            return false;
        }
        self.confusion_turns = rng.gen_range(2..=5);
        true
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn knows_move(&self, move_id: MoveId) -> bool {
        self.snapshot.moves.contains(&move_id)
    }

    pub fn is_move_disabled(&self, move_id: MoveId) -> bool {
        self.disabled.map(|d| d.move_id) == Some(move_id)
    }

    /// Charged move due to fire this turn.
    pub fn ready_charge(&self) -> Option<MoveId> {
        self.charging
            .filter(|c| c.turns_remaining == 0)
            .map(|c| c.move_id)
    }

    /// Volatile state does not survive leaving the field.
    pub fn reset_on_switch(&mut self) {
        self.reset_stages();
        self.confusion_turns = 0;
        self.flinched = false;
        self.protect_turns = 0;
        self.trap_turns = 0;
        self.disabled = None;
        self.charging = None;
        self.recharge_turns = 0;
    }

    /// End-of-turn bookkeeping, in order: status durations, single-turn
    /// flags, protect/trap/disable counters, multi-turn moves.
    pub fn end_of_turn(&mut self, rng: &mut impl Rng) -> Vec<Housekeeping> {
        let mut events = Vec::new();
        if self.is_fainted() {
            return events;
        }

        if let Some(mut status) = self.status {
            match status.condition {
                MajorStatus::Sleep => {
                    let left = status.turns_remaining.unwrap_or(0).saturating_sub(1);
                    if left == 0 {
                        self.status = None;
                        events.push(Housekeeping::WokeUp);
                    } else {
                        status.turns_remaining = Some(left);
                        self.status = Some(status);
                    }
                }
                MajorStatus::Freeze => {
                    if rng.gen_bool(0.2) {
                        self.status = None;
                        events.push(Housekeeping::Thawed);
                    }
                }
                _ => {}
            }
        }
        if self.confusion_turns > 0 {
            self.confusion_turns -= 1;
            if self.confusion_turns == 0 {
                events.push(Housekeeping::ConfusionEnded);
            }
        }

        self.flinched = false;

        if self.protect_turns > 0 {
            self.protect_turns -= 1;
            if self.protect_turns == 0 {
                events.push(Housekeeping::ProtectEnded);
            }
        }
        if self.trap_turns > 0 {
            self.trap_turns -= 1;
            if self.trap_turns == 0 {
                events.push(Housekeeping::TrapEnded);
            }
        }
        if let Some(mut disabled) = self.disabled {
            disabled.turns_remaining = disabled.turns_remaining.saturating_sub(1);
            if disabled.turns_remaining == 0 {
                self.disabled = None;
                events.push(Housekeeping::DisableEnded(disabled.move_id));
            } else {
                self.disabled = Some(disabled);
            }
        }

        if let Some(mut charging) = self.charging {
            charging.turns_remaining = charging.turns_remaining.saturating_sub(1);
            self.charging = Some(charging);
        }
        self.recharge_turns = self.recharge_turns.saturating_sub(1);
        events
    }
}
