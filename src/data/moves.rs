use crate::data::types::Type;
use crate::sim::pokemon::MajorStatus;
use crate::sim::stats::BattleStat;
use phf::phf_map;
use serde::Serialize;

pub type MoveId = u16;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Accuracy {
    Percent(u8),
    NeverMiss,
}

/// Critical-hit odds. The default is 1/24.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CritRatio {
    Normal,
    High,
    VeryHigh,
    Always,
}

impl CritRatio {
    pub fn chance(self) -> f64 {
        match self {
            CritRatio::Normal => 1.0 / 24.0,
            CritRatio::High => 1.0 / 8.0,
            CritRatio::VeryHigh => 1.0 / 2.0,
            CritRatio::Always => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum MoveTarget {
    SingleFoe,
    AllFoes,
    User,
    SingleAlly,
    AllAllies,
    Any,
}

impl MoveTarget {
    /// Whether the move lands on the user's side. In singles the only ally is
    /// the user itself.
    pub fn targets_user(self) -> bool {
        matches!(self, MoveTarget::User | MoveTarget::SingleAlly | MoveTarget::AllAllies)
    }
}

/// Which participant an effect lands on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum EffectTarget {
    Target,
    User,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum HealAmount {
    Percent(u8),
    Fixed(u16),
}

/// One step of a move's effect list. Chances are percentages; 100 always applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Effect {
    InflictStatus { status: MajorStatus, chance: u8 },
    Confuse { chance: u8 },
    ModifyStat {
        who: EffectTarget,
        stat: BattleStat,
        stages: i8,
        chance: u8,
    },
    Recoil { percent: u8 },
    Drain { percent: u8 },
    FixedDamage(u16),
    Flinch { chance: u8 },
    Heal(HealAmount),
    Protect,
    Recharge,
    SelfDestruct,
    Charge,
    Disable { turns: u8 },
    Trap { turns: u8 },
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: &'static str,
    pub move_type: Type,
    pub category: MoveCategory,
    pub power: u16,
    pub accuracy: Accuracy,
    pub priority: i8,
    pub crit: CritRatio,
    pub target: MoveTarget,
    pub effects: &'static [Effect],
}

impl MoveData {
    pub fn has_effect(&self, wanted: fn(&Effect) -> bool) -> bool {
        self.effects.iter().any(wanted)
    }

    pub fn fixed_damage(&self) -> Option<u16> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::FixedDamage(amount) => Some(*amount),
            _ => None,
        })
    }

    pub fn is_charge(&self) -> bool {
        self.has_effect(|e| matches!(e, Effect::Charge))
    }

    pub fn is_protect(&self) -> bool {
        self.has_effect(|e| matches!(e, Effect::Protect))
    }
}

pub fn get_move(id: MoveId) -> Option<&'static MoveData> {
    MOVES.get(&id)
}

pub fn normalize_move_name(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn find_move(name: &str) -> Option<&'static MoveData> {
    let wanted = normalize_move_name(name);
    MOVES
        .values()
        .find(|data| normalize_move_name(data.name) == wanted)
}

macro_rules! mv {
    ($id:expr, $name:expr, $ty:ident, $cat:ident, $power:expr, $acc:expr, $prio:expr, $crit:ident, $target:ident, [$($effect:expr),* $(,)?]) => {
        MoveData {
            id: $id,
            name: $name,
            move_type: Type::$ty,
            category: MoveCategory::$cat,
            power: $power,
            accuracy: $acc,
            priority: $prio,
            crit: CritRatio::$crit,
            target: MoveTarget::$target,
            effects: &[$($effect),*],
        }
    };
}

const fn pct(value: u8) -> Accuracy {
    Accuracy::Percent(value)
}

const SURE: Accuracy = Accuracy::NeverMiss;

const fn status(status: MajorStatus, chance: u8) -> Effect {
    Effect::InflictStatus { status, chance }
}

const fn foe_stat(stat: BattleStat, stages: i8, chance: u8) -> Effect {
    Effect::ModifyStat {
        who: EffectTarget::Target,
        stat,
        stages,
        chance,
    }
}

const fn own_stat(stat: BattleStat, stages: i8, chance: u8) -> Effect {
    Effect::ModifyStat {
        who: EffectTarget::User,
        stat,
        stages,
        chance,
    }
}

pub static MOVES: phf::Map<u16, MoveData> = phf_map! {
    1u16 => mv!(1, "Tackle", Normal, Physical, 40, pct(100), 0, Normal, SingleFoe, []),
    2u16 => mv!(2, "Quick Attack", Normal, Physical, 40, pct(100), 1, Normal, SingleFoe, []),
    3u16 => mv!(3, "Body Slam", Normal, Physical, 85, pct(100), 0, Normal, SingleFoe, [
        status(MajorStatus::Paralysis, 30),
    ]),
    4u16 => mv!(4, "Double-Edge", Normal, Physical, 120, pct(100), 0, Normal, SingleFoe, [
        Effect::Recoil { percent: 33 },
    ]),
    5u16 => mv!(5, "Hyper Beam", Normal, Special, 150, pct(90), 0, Normal, SingleFoe, [
        Effect::Recharge,
    ]),
    6u16 => mv!(6, "Swords Dance", Normal, Status, 0, SURE, 0, Normal, User, [
        own_stat(BattleStat::Atk, 2, 100),
    ]),
    7u16 => mv!(7, "Growl", Normal, Status, 0, pct(100), 0, Normal, AllFoes, [
        foe_stat(BattleStat::Atk, -1, 100),
    ]),
    8u16 => mv!(8, "Protect", Normal, Status, 0, SURE, 4, Normal, User, [
        Effect::Protect,
    ]),
    9u16 => mv!(9, "Recover", Normal, Status, 0, SURE, 0, Normal, User, [
        Effect::Heal(HealAmount::Percent(50)),
    ]),
    10u16 => mv!(10, "Explosion", Normal, Physical, 250, pct(100), 0, Normal, AllFoes, [
        Effect::SelfDestruct,
    ]),
    11u16 => mv!(11, "Flamethrower", Fire, Special, 90, pct(100), 0, Normal, SingleFoe, [
        status(MajorStatus::Burn, 10),
    ]),
    12u16 => mv!(12, "Fire Blast", Fire, Special, 110, pct(85), 0, Normal, SingleFoe, [
        status(MajorStatus::Burn, 10),
    ]),
    13u16 => mv!(13, "Will-O-Wisp", Fire, Status, 0, pct(85), 0, Normal, SingleFoe, [
        status(MajorStatus::Burn, 100),
    ]),
    14u16 => mv!(14, "Surf", Water, Special, 90, pct(100), 0, Normal, AllFoes, []),
    15u16 => mv!(15, "Hydro Pump", Water, Special, 110, pct(80), 0, Normal, SingleFoe, []),
    16u16 => mv!(16, "Aqua Jet", Water, Physical, 40, pct(100), 1, Normal, SingleFoe, []),
    17u16 => mv!(17, "Thunderbolt", Electric, Special, 90, pct(100), 0, Normal, SingleFoe, [
        status(MajorStatus::Paralysis, 10),
    ]),
    18u16 => mv!(18, "Thunder Wave", Electric, Status, 0, pct(90), 0, Normal, SingleFoe, [
        status(MajorStatus::Paralysis, 100),
    ]),
    19u16 => mv!(19, "Thunder", Electric, Special, 110, pct(70), 0, Normal, SingleFoe, [
        status(MajorStatus::Paralysis, 30),
    ]),
    20u16 => mv!(20, "Ice Beam", Ice, Special, 90, pct(100), 0, Normal, SingleFoe, [
        status(MajorStatus::Freeze, 10),
    ]),
    21u16 => mv!(21, "Blizzard", Ice, Special, 110, pct(70), 0, Normal, AllFoes, [
        status(MajorStatus::Freeze, 10),
    ]),
    22u16 => mv!(22, "Razor Leaf", Grass, Physical, 55, pct(95), 0, High, AllFoes, []),
    23u16 => mv!(23, "Giga Drain", Grass, Special, 75, pct(100), 0, Normal, SingleFoe, [
        Effect::Drain { percent: 50 },
    ]),
    24u16 => mv!(24, "Solar Beam", Grass, Special, 120, pct(100), 0, Normal, SingleFoe, [
        Effect::Charge,
    ]),
    25u16 => mv!(25, "Sleep Powder", Grass, Status, 0, pct(75), 0, Normal, SingleFoe, [
        status(MajorStatus::Sleep, 100),
    ]),
    26u16 => mv!(26, "Close Combat", Fighting, Physical, 120, pct(100), 0, Normal, SingleFoe, [
        own_stat(BattleStat::Def, -1, 100),
        own_stat(BattleStat::SpDef, -1, 100),
    ]),
    27u16 => mv!(27, "Poison Jab", Poison, Physical, 80, pct(100), 0, Normal, SingleFoe, [
        status(MajorStatus::Poison, 30),
    ]),
    28u16 => mv!(28, "Poison Powder", Poison, Status, 0, pct(75), 0, Normal, SingleFoe, [
        status(MajorStatus::Poison, 100),
    ]),
    29u16 => mv!(29, "Earthquake", Ground, Physical, 100, pct(100), 0, Normal, AllFoes, []),
    30u16 => mv!(30, "Sand Attack", Ground, Status, 0, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::Accuracy, -1, 100),
    ]),
    31u16 => mv!(31, "Air Slash", Flying, Special, 75, pct(95), 0, Normal, Any, [
        Effect::Flinch { chance: 30 },
    ]),
    32u16 => mv!(32, "Psychic", Psychic, Special, 90, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::SpDef, -1, 10),
    ]),
    33u16 => mv!(33, "Confusion", Psychic, Special, 50, pct(100), 0, Normal, SingleFoe, [
        Effect::Confuse { chance: 10 },
    ]),
    34u16 => mv!(34, "Confuse Ray", Ghost, Status, 0, pct(100), 0, Normal, SingleFoe, [
        Effect::Confuse { chance: 100 },
    ]),
    35u16 => mv!(35, "Shadow Ball", Ghost, Special, 80, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::SpDef, -1, 20),
    ]),
    36u16 => mv!(36, "Dragon Rage", Dragon, Special, 0, pct(100), 0, Normal, SingleFoe, [
        Effect::FixedDamage(40),
    ]),
    37u16 => mv!(37, "Dragon Claw", Dragon, Physical, 80, pct(100), 0, Normal, SingleFoe, []),
    38u16 => mv!(38, "Crunch", Dark, Physical, 80, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::Def, -1, 20),
    ]),
    39u16 => mv!(39, "Iron Tail", Steel, Physical, 100, pct(75), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::Def, -1, 30),
    ]),
    40u16 => mv!(40, "Moonblast", Fairy, Special, 95, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::SpAtk, -1, 30),
    ]),
    41u16 => mv!(41, "Stone Edge", Rock, Physical, 100, pct(80), 0, High, SingleFoe, []),
    42u16 => mv!(42, "Bug Buzz", Bug, Special, 90, pct(100), 0, Normal, SingleFoe, [
        foe_stat(BattleStat::SpDef, -1, 10),
    ]),
    43u16 => mv!(43, "Disable", Normal, Status, 0, pct(100), 0, Normal, SingleFoe, [
        Effect::Disable { turns: 4 },
    ]),
    44u16 => mv!(44, "Mean Look", Normal, Status, 0, SURE, 0, Normal, SingleFoe, [
        Effect::Trap { turns: 5 },
    ]),
    45u16 => mv!(45, "Frost Breath", Ice, Special, 60, pct(90), 0, Always, SingleFoe, []),
    46u16 => mv!(46, "Aeroblast", Flying, Special, 100, pct(95), 0, VeryHigh, Any, []),
    47u16 => mv!(47, "Sonic Boom", Normal, Special, 0, pct(90), 0, Normal, SingleFoe, [
        Effect::FixedDamage(20),
    ]),
    48u16 => mv!(48, "Fake Out", Normal, Physical, 40, pct(100), 3, Normal, SingleFoe, [
        Effect::Flinch { chance: 100 },
    ]),
    49u16 => mv!(49, "Swift", Normal, Special, 60, SURE, 0, Normal, AllFoes, []),
    50u16 => mv!(50, "Absorb", Grass, Special, 20, pct(100), 0, Normal, SingleFoe, [
        Effect::Drain { percent: 50 },
    ]),
    51u16 => mv!(51, "Agility", Psychic, Status, 0, SURE, 0, Normal, User, [
        own_stat(BattleStat::Speed, 2, 100),
    ]),
    52u16 => mv!(52, "Howl", Normal, Status, 0, SURE, 0, Normal, AllAllies, [
        own_stat(BattleStat::Atk, 1, 100),
    ]),
    53u16 => mv!(53, "Aromatic Mist", Fairy, Status, 0, SURE, 0, Normal, SingleAlly, [
        own_stat(BattleStat::SpDef, 1, 100),
    ]),
    54u16 => mv!(54, "Aerial Ace", Flying, Physical, 60, SURE, 0, Normal, Any, []),
    55u16 => mv!(55, "Take Down", Normal, Physical, 90, pct(85), 0, Normal, SingleFoe, [
        Effect::Recoil { percent: 25 },
    ]),
    56u16 => mv!(56, "Brave Bird", Flying, Physical, 120, pct(100), 0, Normal, SingleFoe, [
        Effect::Recoil { percent: 33 },
    ]),
    57u16 => mv!(57, "Double Team", Normal, Status, 0, SURE, 0, Normal, User, [
        own_stat(BattleStat::Evasion, 1, 100),
    ]),
    58u16 => mv!(58, "Hone Claws", Dark, Status, 0, SURE, 0, Normal, User, [
        own_stat(BattleStat::Atk, 1, 100),
        own_stat(BattleStat::Accuracy, 1, 100),
    ]),
    59u16 => mv!(59, "Fire Fang", Fire, Physical, 65, pct(95), 0, Normal, SingleFoe, [
        status(MajorStatus::Burn, 10),
        Effect::Flinch { chance: 10 },
    ]),
    60u16 => mv!(60, "Leech Life", Bug, Physical, 80, pct(100), 0, Normal, SingleFoe, [
        Effect::Drain { percent: 50 },
    ]),
};
