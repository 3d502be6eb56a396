use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;
pub const MIN_IV: u8 = 1;
pub const MAX_IV: u8 = 31;

/// Personality tag. Each non-neutral nature raises one stat by 10% and lowers
/// another by 10%.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Hardy,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Atk,
    Def,
    SpAtk,
    SpDef,
    Speed,
}

/// The seven stats that carry an in-battle stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BattleStat {
    Atk,
    Def,
    SpAtk,
    SpDef,
    Speed,
    Accuracy,
    Evasion,
}

impl BattleStat {
    pub const ALL: [BattleStat; 7] = [
        BattleStat::Atk,
        BattleStat::Def,
        BattleStat::SpAtk,
        BattleStat::SpDef,
        BattleStat::Speed,
        BattleStat::Accuracy,
        BattleStat::Evasion,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            BattleStat::Atk => 0,
            BattleStat::Def => 1,
            BattleStat::SpAtk => 2,
            BattleStat::SpDef => 3,
            BattleStat::Speed => 4,
            BattleStat::Accuracy => 5,
            BattleStat::Evasion => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BattleStat::Atk => "Attack",
            BattleStat::Def => "Defense",
            BattleStat::SpAtk => "Sp. Atk",
            BattleStat::SpDef => "Sp. Def",
            BattleStat::Speed => "Speed",
            BattleStat::Accuracy => "accuracy",
            BattleStat::Evasion => "evasiveness",
        }
    }
}

pub fn stat_modifier(nature: Nature, stat: Stat) -> f32 {
    match nature {
        Nature::Hardy | Nature::Docile | Nature::Serious | Nature::Bashful | Nature::Quirky => 1.0,
        Nature::Lonely => bonus(stat, Stat::Atk, Stat::Def),
        Nature::Brave => bonus(stat, Stat::Atk, Stat::Speed),
        Nature::Adamant => bonus(stat, Stat::Atk, Stat::SpAtk),
        Nature::Naughty => bonus(stat, Stat::Atk, Stat::SpDef),
        Nature::Bold => bonus(stat, Stat::Def, Stat::Atk),
        Nature::Relaxed => bonus(stat, Stat::Def, Stat::Speed),
        Nature::Impish => bonus(stat, Stat::Def, Stat::SpAtk),
        Nature::Lax => bonus(stat, Stat::Def, Stat::SpDef),
        Nature::Timid => bonus(stat, Stat::Speed, Stat::Atk),
        Nature::Hasty => bonus(stat, Stat::Speed, Stat::Def),
        Nature::Jolly => bonus(stat, Stat::Speed, Stat::SpAtk),
        Nature::Naive => bonus(stat, Stat::Speed, Stat::SpDef),
        Nature::Modest => bonus(stat, Stat::SpAtk, Stat::Atk),
        Nature::Mild => bonus(stat, Stat::SpAtk, Stat::Def),
        Nature::Quiet => bonus(stat, Stat::SpAtk, Stat::Speed),
        Nature::Rash => bonus(stat, Stat::SpAtk, Stat::SpDef),
        Nature::Calm => bonus(stat, Stat::SpDef, Stat::Atk),
        Nature::Gentle => bonus(stat, Stat::SpDef, Stat::Def),
        Nature::Sassy => bonus(stat, Stat::SpDef, Stat::Speed),
        Nature::Careful => bonus(stat, Stat::SpDef, Stat::SpAtk),
    }
}

fn bonus(stat: Stat, boosted: Stat, lowered: Stat) -> f32 {
    if stat == boosted {
        1.1
    } else if stat == lowered {
        0.9
    } else {
        1.0
    }
}

pub fn calc_hp(base: u16, iv: u8, level: u8) -> u16 {
    let base_value = base as u32 * 2 + iv as u32;
    let intermediate = base_value * level as u32 / 100;
    (intermediate + level as u32 + 10) as u16
}

pub fn calc_stat(base: u16, iv: u8, level: u8, nature_mod: f32) -> u16 {
    let base_value = base as u32 * 2 + iv as u32 + 5;
    let intermediate = base_value * level as u32 / 100;
    let stat = (intermediate + 5) as f32 * nature_mod;
    stat.floor() as u16
}

/// Multiplier for a stat stage, `(2+s)/2` when raised and `2/(2+|s|)` when lowered.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as i32;
    if stage >= 0 {
        (2 + stage) as f64 / 2.0
    } else {
        2.0 / (2 - stage) as f64
    }
}

pub fn apply_stage(value: u16, stage: i8) -> u16 {
    let scaled = (value as f64 * stage_multiplier(stage)).floor();
    scaled.max(1.0) as u16
}

/// Draws six IVs (hp, atk, def, spa, spd, spe) uniformly in `1..=31`.
pub fn random_ivs(rng: &mut impl Rng) -> [u8; 6] {
    let mut ivs = [0u8; 6];
    for iv in ivs.iter_mut() {
        *iv = rng.gen_range(MIN_IV..=MAX_IV);
    }
    ivs
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatsSet {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl StatsSet {
    pub fn compute(base: &BaseStats, ivs: [u8; 6], level: u8, nature: Nature) -> Self {
        let ivs = ivs.map(|iv| iv.clamp(MIN_IV, MAX_IV));
        Self {
            hp: calc_hp(base.hp, ivs[0], level),
            atk: calc_stat(base.atk, ivs[1], level, stat_modifier(nature, Stat::Atk)),
            def: calc_stat(base.def, ivs[2], level, stat_modifier(nature, Stat::Def)),
            spa: calc_stat(base.spa, ivs[3], level, stat_modifier(nature, Stat::SpAtk)),
            spd: calc_stat(base.spd, ivs[4], level, stat_modifier(nature, Stat::SpDef)),
            spe: calc_stat(base.spe, ivs[5], level, stat_modifier(nature, Stat::Speed)),
        }
    }

    pub fn get(&self, stat: Stat) -> u16 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::SpAtk => self.spa,
            Stat::SpDef => self.spd,
            Stat::Speed => self.spe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn stage_multipliers_follow_the_table() {
        for stage in MIN_STAGE..=MAX_STAGE {
            let expected = if stage >= 0 {
                (2.0 + stage as f64) / 2.0
            } else {
                2.0 / (2.0 + stage.unsigned_abs() as f64)
            };
            assert!((stage_multiplier(stage) - expected).abs() < 1e-12);
        }
        assert_eq!(stage_multiplier(2), 2.0);
        assert_eq!(stage_multiplier(-2), 0.5);
        assert_eq!(stage_multiplier(6), 4.0);
        assert_eq!(stage_multiplier(-6), 0.25);
    }

    #[test]
    fn stat_formula_with_neutral_nature() {
        // ((2*100 + 31 + 5) * 50 / 100 + 5) = 118 + 5
        assert_eq!(calc_stat(100, 31, 50, 1.0), 123);
        // (2*80 + 31) * 50 / 100 + 50 + 10
        assert_eq!(calc_hp(80, 31, 50), 155);
    }

    #[test]
    fn nature_modifies_only_its_pair() {
        assert!((stat_modifier(Nature::Adamant, Stat::Atk) - 1.1).abs() < f32::EPSILON);
        assert!((stat_modifier(Nature::Adamant, Stat::SpAtk) - 0.9).abs() < f32::EPSILON);
        assert_eq!(stat_modifier(Nature::Adamant, Stat::Def), 1.0);
        assert_eq!(stat_modifier(Nature::Adamant, Stat::Hp), 1.0);
        let boosted = calc_stat(100, 31, 50, stat_modifier(Nature::Adamant, Stat::Atk));
        assert_eq!(boosted, (123.0f32 * 1.1).floor() as u16);
    }

    #[test]
    fn random_ivs_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            for iv in random_ivs(&mut rng) {
                assert!((MIN_IV..=MAX_IV).contains(&iv));
            }
        }
    }

    #[test]
    fn compute_uses_every_base_stat() {
        let base = BaseStats {
            hp: 78,
            atk: 84,
            def: 78,
            spa: 109,
            spd: 85,
            spe: 100,
        };
        let set = StatsSet::compute(&base, [31; 6], 100, Nature::Hardy);
        assert_eq!(set.hp, calc_hp(78, 31, 100));
        assert_eq!(set.spa, calc_stat(109, 31, 100, 1.0));
        assert_eq!(set.get(Stat::Speed), set.spe);
    }
}
