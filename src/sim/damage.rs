use crate::config::Mechanics;
use crate::data::moves::{Accuracy, MoveCategory, MoveData};
use crate::data::types::{effectiveness_dual, effectiveness_text, Type};
use crate::sim::pokemon::{Combatant, MajorStatus};
use crate::sim::stats::{apply_stage, stage_multiplier, BattleStat};
use rand::Rng;
use serde::Serialize;

pub const STAB_MULTIPLIER: f64 = 1.5;
pub const CRIT_MULTIPLIER: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DamageResult {
    pub damage: u16,
    pub hit: bool,
    pub critical: bool,
    pub effectiveness: f32,
    pub effectiveness_text: &'static str,
}

impl DamageResult {
    fn miss() -> Self {
        Self {
            damage: 0,
            hit: false,
            critical: false,
            effectiveness: 1.0,
            effectiveness_text: "",
        }
    }

    fn landed(damage: u16) -> Self {
        Self {
            damage,
            hit: true,
            ..Self::miss()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageModifiers {
    pub stab: f64,
    pub effectiveness: f64,
    pub crit: f64,
    pub random: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            stab: 1.0,
            effectiveness: 1.0,
            crit: 1.0,
            random: 1.0,
        }
    }
}

/// `((2·level/5 + 2) · power · attack / defense) / 50 + 2`, in integer steps.
pub fn base_damage(level: u8, power: u16, attack: u16, defense: u16) -> u32 {
    let level = level as u32;
    let defense = defense.max(1) as u32;
    let mut damage = 2 * level / 5 + 2;
    damage = damage.saturating_mul(power as u32);
    damage = damage.saturating_mul(attack as u32);
    damage /= defense;
    damage /= 50;
    damage + 2
}

/// Applies STAB, effectiveness, critical and random multipliers in that order
/// and rounds once at the end.
pub fn apply_modifiers(base: u32, modifiers: DamageModifiers) -> u32 {
    let mut value = base as f64;
    value *= modifiers.stab;
    value *= modifiers.effectiveness;
    value *= modifiers.crit;
    value *= modifiers.random;
    value.round().max(0.0) as u32
}

pub fn is_stab(move_type: Type, types: (Type, Option<Type>)) -> bool {
    types.0 == move_type || types.1 == Some(move_type)
}

/// Accuracy after stage scaling, capped at 100. `None` for moves that never miss.
pub fn effective_accuracy(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    mechanics: &Mechanics,
) -> Option<f64> {
    let Accuracy::Percent(base) = move_data.accuracy else {
        return None;
    };
    let mut accuracy = base as f64;
    if mechanics.stat_stages {
        accuracy *= stage_multiplier(attacker.stage(BattleStat::Accuracy))
            / stage_multiplier(defender.stage(BattleStat::Evasion));
    }
    Some(accuracy.min(100.0))
}

pub fn roll_accuracy(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    mechanics: &Mechanics,
    rng: &mut impl Rng,
) -> bool {
    match effective_accuracy(attacker, defender, move_data, mechanics) {
        None => true,
        Some(accuracy) => {
            let roll = rng.gen_range(1..=100) as f64;
            roll <= accuracy
        }
    }
}

pub fn roll_critical(move_data: &MoveData, mechanics: &Mechanics, rng: &mut impl Rng) -> bool {
    if !mechanics.critical_hits {
        return false;
    }
    let chance = move_data.crit.chance();
    chance >= 1.0 || rng.gen_bool(chance)
}

pub fn roll_random_factor(mechanics: &Mechanics, rng: &mut impl Rng) -> f64 {
    if !mechanics.random_damage {
        return 1.0;
    }
    rng.gen_range(85..=100) as f64 / 100.0
}

/// Attack and defense values for the move's category. A critical hit ignores
/// the attacker's negative attack stage and the defender's positive defense
/// stage.
pub fn attack_and_defense(
    attacker: &Combatant,
    defender: &Combatant,
    category: MoveCategory,
    critical: bool,
    mechanics: &Mechanics,
) -> (u16, u16) {
    let (attack, defense, atk_stat, def_stat) = match category {
        MoveCategory::Special => (
            attacker.stats.spa,
            defender.stats.spd,
            BattleStat::SpAtk,
            BattleStat::SpDef,
        ),
        _ => (
            attacker.stats.atk,
            defender.stats.def,
            BattleStat::Atk,
            BattleStat::Def,
        ),
    };
    let (mut attack, defense) = if mechanics.stat_stages {
        let mut atk_stage = attacker.stage(atk_stat);
        let mut def_stage = defender.stage(def_stat);
        if critical {
            atk_stage = atk_stage.max(0);
            def_stage = def_stage.min(0);
        }
        (apply_stage(attack, atk_stage), apply_stage(defense, def_stage))
    } else {
        (attack, defense)
    };
    if category == MoveCategory::Physical && attacker.has_status(MajorStatus::Burn) {
        attack = (attack / 2).max(1);
    }
    (attack, defense)
}

/// Resolves one use of `move_data` from `attacker` against `defender`.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    mechanics: &Mechanics,
    rng: &mut impl Rng,
) -> DamageResult {
    if !roll_accuracy(attacker, defender, move_data, mechanics, rng) {
        return DamageResult::miss();
    }
    if move_data.category == MoveCategory::Status {
        return DamageResult::landed(0);
    }
    if let Some(fixed) = move_data.fixed_damage() {
        return DamageResult::landed(fixed);
    }
    if move_data.power == 0 {
        return DamageResult::landed(0);
    }

    let effectiveness = if mechanics.type_effectiveness {
        let (first, second) = defender.snapshot.types;
        effectiveness_dual(move_data.move_type, first, second)
    } else {
        1.0
    };
    if effectiveness == 0.0 {
        return DamageResult {
            effectiveness,
            effectiveness_text: effectiveness_text(effectiveness),
            ..DamageResult::miss()
        };
    }

    let critical = roll_critical(move_data, mechanics, rng);
    let (attack, defense) =
        attack_and_defense(attacker, defender, move_data.category, critical, mechanics);
    let base = base_damage(attacker.level(), move_data.power, attack, defense);
    let stab = mechanics.stab && is_stab(move_data.move_type, attacker.snapshot.types);
    let modifiers = DamageModifiers {
        stab: if stab { STAB_MULTIPLIER } else { 1.0 },
        effectiveness: effectiveness as f64,
        crit: if critical { CRIT_MULTIPLIER } else { 1.0 },
        random: roll_random_factor(mechanics, rng),
    };
    let damage = apply_modifiers(base, modifiers).clamp(1, u16::MAX as u32) as u16;
    DamageResult {
        damage,
        hit: true,
        critical,
        effectiveness,
        effectiveness_text: effectiveness_text(effectiveness),
    }
}

/// Typeless 40-power physical hit a confused combatant deals to itself.
pub fn confusion_self_damage(combatant: &Combatant, mechanics: &Mechanics, rng: &mut impl Rng) -> u16 {
    let (attack, defense) =
        attack_and_defense(combatant, combatant, MoveCategory::Physical, false, mechanics);
    let base = base_damage(combatant.level(), 40, attack, defense);
    let modifiers = DamageModifiers {
        random: roll_random_factor(mechanics, rng),
        ..DamageModifiers::default()
    };
    apply_modifiers(base, modifiers).clamp(1, u16::MAX as u32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::moves::get_move;
    use crate::sim::pokemon::CombatantSnapshot;
    use crate::sim::stats::Nature;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn mk(species: &str) -> Combatant {
        let snapshot =
            CombatantSnapshot::from_species("ash", species, 50, [31; 6], Nature::Hardy, vec![1])
                .expect("species exists");
        Combatant::new(snapshot)
    }

    #[test]
    fn base_damage_reference_case() {
        let expected = ((2 * 50 / 5 + 2) * 90 * 100 / 80) / 50 + 2;
        assert_eq!(base_damage(50, 90, 100, 80), expected);
        assert_eq!(base_damage(50, 90, 100, 80), 51);
    }

    #[test]
    fn modifiers_round_once_at_the_end() {
        let modifiers = DamageModifiers {
            stab: 1.5,
            effectiveness: 2.0,
            crit: 1.0,
            random: 0.85,
        };
        // 51 * 1.5 * 2 * 0.85 = 130.05
        assert_eq!(apply_modifiers(51, modifiers), 130);
        assert_eq!(apply_modifiers(51, DamageModifiers::default()), 51);
    }

    #[test]
    fn test_is_stab() {
        let types = (Type::Electric, Some(Type::Flying));
        assert!(is_stab(Type::Electric, types));
        assert!(is_stab(Type::Flying, types));
        assert!(!is_stab(Type::Fire, types));
    }

    #[test]
    fn plain_mechanics_match_formula() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut attacker = mk("pikachu");
        let mut defender = mk("snorlax");
        attacker.stats.spa = 100;
        defender.stats.spd = 80;
        let thunderbolt = get_move(17).expect("thunderbolt");
        let result = calculate_damage(&attacker, &defender, thunderbolt, &Mechanics::plain(), &mut rng);
        assert!(result.hit);
        assert!(!result.critical);
        assert_eq!(result.damage as u32, base_damage(50, 90, 100, 80));
        assert_eq!(result.effectiveness_text, "");
    }

    #[test]
    fn immune_target_takes_nothing() {
        let mut rng = SmallRng::seed_from_u64(0);
        let attacker = mk("pikachu");
        let defender = mk("garchomp");
        let thunderbolt = get_move(17).expect("thunderbolt");
        let result = calculate_damage(&attacker, &defender, thunderbolt, &Mechanics::default(), &mut rng);
        assert_eq!(result.damage, 0);
        assert!(!result.hit);
        assert_eq!(result.effectiveness_text, "no effect!");
    }

    #[test]
    fn damage_is_at_least_one_when_it_lands() {
        let mut rng = SmallRng::seed_from_u64(9);
        let attacker = mk("pikachu");
        let mut defender = mk("onix");
        defender.stats.def = 999;
        let tackle = get_move(1).expect("tackle");
        for _ in 0..50 {
            let result = calculate_damage(&attacker, &defender, tackle, &Mechanics::default(), &mut rng);
            if result.hit {
                assert!(result.damage >= 1);
            }
        }
    }

    #[test]
    fn fixed_damage_bypasses_formula() {
        let mut rng = SmallRng::seed_from_u64(1);
        let attacker = mk("dragonite");
        let defender = mk("snorlax");
        let rage = get_move(36).expect("dragon rage");
        let mechanics = Mechanics {
            stat_stages: false,
            ..Mechanics::default()
        };
        let mut landed = 0;
        for _ in 0..20 {
            let result = calculate_damage(&attacker, &defender, rage, &mechanics, &mut rng);
            if result.hit {
                landed += 1;
                assert_eq!(result.damage, 40);
            }
        }
        assert!(landed > 0);
    }

    #[test]
    fn status_moves_deal_no_damage() {
        let mut rng = SmallRng::seed_from_u64(1);
        let attacker = mk("pikachu");
        let defender = mk("snorlax");
        let growl = get_move(7).expect("growl");
        let result = calculate_damage(&attacker, &defender, growl, &Mechanics::default(), &mut rng);
        assert!(result.hit);
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn critical_ignores_unfavourable_stages() {
        let mut attacker = mk("machamp");
        let mut defender = mk("snorlax");
        attacker.modify_stage(BattleStat::Atk, -2);
        defender.modify_stage(BattleStat::Def, 2);
        let mechanics = Mechanics::default();
        let (atk, def) =
            attack_and_defense(&attacker, &defender, MoveCategory::Physical, true, &mechanics);
        assert_eq!((atk, def), (attacker.stats.atk, defender.stats.def));
        let (atk, def) =
            attack_and_defense(&attacker, &defender, MoveCategory::Physical, false, &mechanics);
        assert_eq!(atk, apply_stage(attacker.stats.atk, -2));
        assert_eq!(def, apply_stage(defender.stats.def, 2));
    }

    #[test]
    fn burn_halves_physical_attack_only() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut attacker = mk("machamp");
        let defender = mk("snorlax");
        attacker.apply_status(MajorStatus::Burn, &mut rng);
        let mechanics = Mechanics::default();
        let (atk, _) =
            attack_and_defense(&attacker, &defender, MoveCategory::Physical, false, &mechanics);
        assert_eq!(atk, attacker.stats.atk / 2);
        let (spa, _) =
            attack_and_defense(&attacker, &defender, MoveCategory::Special, false, &mechanics);
        assert_eq!(spa, attacker.stats.spa);
    }

    #[test]
    fn guaranteed_crit_always_crits() {
        let mut rng = SmallRng::seed_from_u64(4);
        let frost_breath = get_move(45).expect("frost breath");
        for _ in 0..20 {
            assert!(roll_critical(frost_breath, &Mechanics::default(), &mut rng));
        }
        assert!(!roll_critical(frost_breath, &Mechanics::plain(), &mut rng));
    }

    #[test]
    fn evasion_lowers_accuracy() {
        let attacker = mk("pikachu");
        let mut defender = mk("snorlax");
        let tackle = get_move(1).expect("tackle");
        let mechanics = Mechanics::default();
        assert_eq!(effective_accuracy(&attacker, &defender, tackle, &mechanics), Some(100.0));
        defender.modify_stage(BattleStat::Evasion, 2);
        assert_eq!(effective_accuracy(&attacker, &defender, tackle, &mechanics), Some(50.0));
        let swift = get_move(49).expect("swift");
        assert_eq!(effective_accuracy(&attacker, &defender, swift, &mechanics), None);
    }
}
