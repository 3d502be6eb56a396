use crate::config::Mechanics;
use crate::data::moves::{get_move, Effect, EffectTarget, HealAmount};
use crate::sim::moves::Participants;
use crate::sim::pokemon::DisabledMove;
use crate::sim::stats::BattleStat;
use rand::Rng;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub applied: bool,
    pub lines: Vec<String>,
}

impl EffectOutcome {
    fn skipped() -> Self {
        Self::default()
    }

    fn applied(line: impl Into<String>) -> Self {
        Self {
            applied: true,
            lines: vec![line.into()],
        }
    }

    fn silent() -> Self {
        Self {
            applied: true,
            lines: Vec::new(),
        }
    }

    fn failed(guaranteed: bool) -> Self {
        let lines = if guaranteed {
            vec!["But it failed!".to_string()]
        } else {
            Vec::new()
        };
        Self {
            applied: false,
            lines,
        }
    }
}

pub(crate) fn roll_chance(chance: u8, rng: &mut impl Rng) -> bool {
    chance >= 100 || (chance > 0 && rng.gen_range(0..100u8) < chance)
}

fn percent_of(value: u16, percent: u8) -> u16 {
    ((value as u32 * percent as u32) / 100).max(1) as u16
}

fn stage_line(name: &str, stat: BattleStat, requested: i8, change: i8) -> String {
    let label = stat.label();
    match change {
        0 if requested > 0 => format!("{name}'s {label} won't go any higher!"),
        0 => format!("{name}'s {label} won't go any lower!"),
        1 => format!("{name}'s {label} rose!"),
        c if c >= 2 => format!("{name}'s {label} rose sharply!"),
        -1 => format!("{name}'s {label} fell!"),
        _ => format!("{name}'s {label} harshly fell!"),
    }
}

/// Applies one effect. `damage_dealt` is the HP the move just removed from its
/// target, used by recoil and drain.
pub fn apply_effect(
    effect: &Effect,
    participants: &mut Participants<'_>,
    damage_dealt: u16,
    mechanics: &Mechanics,
    rng: &mut impl Rng,
) -> EffectOutcome {
    match *effect {
        Effect::InflictStatus { status, chance } => {
            if !mechanics.status_effects || participants.target().is_fainted() {
                return EffectOutcome::skipped();
            }
            if !roll_chance(chance, rng) {
                return EffectOutcome::skipped();
            }
            let target = participants.target();
            if target.apply_status(status, rng) {
                EffectOutcome::applied(format!("{} {}!", target.name(), status.inflicted_text()))
            } else {
                EffectOutcome::failed(chance >= 100)
            }
        }
        Effect::Confuse { chance } => {
            if !mechanics.status_effects || participants.target().is_fainted() {
                return EffectOutcome::skipped();
            }
            if !roll_chance(chance, rng) {
                return EffectOutcome::skipped();
            }
            let target = participants.target();
            if target.apply_confusion(rng) {
                EffectOutcome::applied(format!("{} became confused!", target.name()))
            } else {
                EffectOutcome::failed(chance >= 100)
            }
        }
        Effect::ModifyStat {
            who,
            stat,
            stages,
            chance,
        } => {
            if !mechanics.stat_stages || !roll_chance(chance, rng) {
                return EffectOutcome::skipped();
            }
            let subject = match who {
                EffectTarget::Target => participants.target(),
                EffectTarget::User => participants.user(),
            };
            if subject.is_fainted() {
                return EffectOutcome::skipped();
            }
            let change = subject.modify_stage(stat, stages);
            EffectOutcome {
                applied: change != 0,
                lines: vec![stage_line(subject.name(), stat, stages, change)],
            }
        }
        Effect::Recoil { percent } => {
            let user = participants.user();
            if damage_dealt == 0 || user.is_fainted() {
                return EffectOutcome::skipped();
            }
            user.take_damage(percent_of(damage_dealt, percent));
            EffectOutcome::applied(format!("{} is damaged by recoil!", user.name()))
        }
        Effect::Drain { percent } => {
            if damage_dealt == 0 {
                return EffectOutcome::skipped();
            }
            let target_name = participants.target().name().to_string();
            let user = participants.user();
            if user.heal(percent_of(damage_dealt, percent)) == 0 {
                return EffectOutcome::skipped();
            }
            EffectOutcome::applied(format!("{target_name} had its energy drained!"))
        }
        // Resolved by the damage calculator; charging is driven by the turn engine.
        Effect::FixedDamage(_) | Effect::Charge => EffectOutcome::skipped(),
        Effect::Flinch { chance } => {
            if participants.targets_user() || participants.target().is_fainted() {
                return EffectOutcome::skipped();
            }
            if !roll_chance(chance, rng) {
                return EffectOutcome::skipped();
            }
            participants.target().flinched = true;
            EffectOutcome::silent()
        }
        Effect::Heal(amount) => {
            let target = participants.target();
            let wanted = match amount {
                HealAmount::Percent(percent) => percent_of(target.max_hp(), percent),
                HealAmount::Fixed(hp) => hp,
            };
            if target.heal(wanted) == 0 {
                return EffectOutcome::failed(true);
            }
            EffectOutcome::applied(format!(
                "{} regained health! (HP: {}/{})",
                target.name(),
                target.current_hp,
                target.max_hp()
            ))
        }
        Effect::Protect => {
            let user = participants.user();
            user.protect_turns = 1;
            EffectOutcome::applied(format!("{} protected itself!", user.name()))
        }
        Effect::Recharge => {
            // Counted down once at the end of this turn, then blocks the next one.
            participants.user().recharge_turns = 2;
            EffectOutcome::silent()
        }
        Effect::SelfDestruct => {
            participants.user().faint();
            EffectOutcome::silent()
        }
        Effect::Disable { turns } => {
            let target = participants.target();
            match target.last_move {
                Some(move_id) if target.disabled.is_none() && !target.is_fainted() => {
                    target.disabled = Some(DisabledMove {
                        move_id,
                        turns_remaining: turns,
                    });
                    let move_name = get_move(move_id).map(|m| m.name).unwrap_or("move");
                    EffectOutcome::applied(format!("{}'s {} was disabled!", target.name(), move_name))
                }
                _ => EffectOutcome::failed(true),
            }
        }
        Effect::Trap { turns } => {
            let target = participants.target();
            if target.is_trapped() || target.is_fainted() {
                return EffectOutcome::failed(true);
            }
            target.trap_turns = turns;
            EffectOutcome::applied(format!("{} can no longer escape!", target.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pokemon::{Combatant, CombatantSnapshot, MajorStatus};
    use crate::sim::stats::Nature;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn mk(species: &str) -> Combatant {
        let snapshot =
            CombatantSnapshot::from_species("ash", species, 50, [31; 6], Nature::Hardy, vec![1, 17])
                .expect("species exists");
        Combatant::new(snapshot)
    }

    #[test]
    fn guaranteed_status_fails_loudly_on_statused_target() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("pikachu");
        let mut target = mk("snorlax");
        target.apply_status(MajorStatus::Burn, &mut rng);
        let mut participants = Participants::Pair {
            user: &mut user,
            target: &mut target,
        };
        let effect = Effect::InflictStatus {
            status: MajorStatus::Paralysis,
            chance: 100,
        };
        let outcome = apply_effect(&effect, &mut participants, 0, &Mechanics::default(), &mut rng);
        assert!(!outcome.applied);
        assert_eq!(outcome.lines, vec!["But it failed!".to_string()]);
        assert!(target.has_status(MajorStatus::Burn));
    }

    #[test]
    fn status_effects_can_be_switched_off() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("pikachu");
        let mut target = mk("snorlax");
        let mut participants = Participants::Pair {
            user: &mut user,
            target: &mut target,
        };
        let effect = Effect::InflictStatus {
            status: MajorStatus::Paralysis,
            chance: 100,
        };
        let mechanics = Mechanics {
            status_effects: false,
            ..Mechanics::default()
        };
        let outcome = apply_effect(&effect, &mut participants, 0, &mechanics, &mut rng);
        assert!(!outcome.applied);
        assert!(target.status.is_none());
    }

    #[test]
    fn recoil_and_drain_use_damage_dealt() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("snorlax");
        let mut target = mk("pikachu");
        user.take_damage(100);
        let before = user.current_hp;
        let mut participants = Participants::Pair {
            user: &mut user,
            target: &mut target,
        };
        let mechanics = Mechanics::default();
        apply_effect(&Effect::Drain { percent: 50 }, &mut participants, 60, &mechanics, &mut rng);
        assert_eq!(participants.user().current_hp, before + 30);
        apply_effect(&Effect::Recoil { percent: 33 }, &mut participants, 60, &mechanics, &mut rng);
        assert_eq!(participants.user().current_hp, before + 30 - 19);
    }

    #[test]
    fn self_targeted_stat_boost_lands_on_user() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("machamp");
        let mut participants = Participants::Solo(&mut user);
        let effect = Effect::ModifyStat {
            who: EffectTarget::User,
            stat: BattleStat::Atk,
            stages: 2,
            chance: 100,
        };
        let outcome = apply_effect(&effect, &mut participants, 0, &Mechanics::default(), &mut rng);
        assert!(outcome.applied);
        assert_eq!(outcome.lines, vec!["Machamp's Attack rose sharply!".to_string()]);
        assert_eq!(user.stage(BattleStat::Atk), 2);
    }

    #[test]
    fn heal_at_full_hp_fails() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("snorlax");
        let mut participants = Participants::Solo(&mut user);
        let outcome = apply_effect(
            &Effect::Heal(HealAmount::Percent(50)),
            &mut participants,
            0,
            &Mechanics::default(),
            &mut rng,
        );
        assert!(!outcome.applied);
        user.take_damage(30);
        let mut participants = Participants::Solo(&mut user);
        let outcome = apply_effect(
            &Effect::Heal(HealAmount::Fixed(20)),
            &mut participants,
            0,
            &Mechanics::default(),
            &mut rng,
        );
        assert!(outcome.applied);
        assert_eq!(user.current_hp, user.max_hp() - 10);
    }

    #[test]
    fn disable_needs_a_last_move() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("gengar");
        let mut target = mk("pikachu");
        let effect = Effect::Disable { turns: 4 };
        {
            let mut participants = Participants::Pair {
                user: &mut user,
                target: &mut target,
            };
            let outcome = apply_effect(&effect, &mut participants, 0, &Mechanics::default(), &mut rng);
            assert!(!outcome.applied);
        }
        target.last_move = Some(17);
        let mut participants = Participants::Pair {
            user: &mut user,
            target: &mut target,
        };
        let outcome = apply_effect(&effect, &mut participants, 0, &Mechanics::default(), &mut rng);
        assert!(outcome.applied);
        assert!(target.is_move_disabled(17));
    }

    #[test]
    fn flinch_never_lands_on_the_user() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut user = mk("pikachu");
        let mut participants = Participants::Solo(&mut user);
        apply_effect(
            &Effect::Flinch { chance: 100 },
            &mut participants,
            10,
            &Mechanics::default(),
            &mut rng,
        );
        assert!(!user.flinched);
    }
}
