use crate::battle_logger::BattleLogger;
use crate::config::{BattleSettings, Mechanics};
use crate::data::moves::{get_move, MoveId};
use crate::error::{BattleError, Missing, Result};
use crate::ids::{BattleId, ChannelId, PlayerId};
use crate::sim::damage::{calculate_damage, confusion_self_damage};
use crate::sim::moves::{apply_effect, Participants};
use crate::sim::pokemon::{ChargingMove, Combatant, CombatantSnapshot, Housekeeping, MajorStatus};
use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BattlePhase {
    WaitingForPlayers,
    TeamSelection,
    InProgress,
    Finished,
    Cancelled,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Finished | BattlePhase::Cancelled)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Attack(MoveId),
    Switch(usize),
    Skip,
    Forfeit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BattleResult {
    /// Index of the winning side.
    Winner(usize),
    Draw,
}

/// What one call to `process_turn` produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    pub lines: Vec<String>,
    pub outcome: Option<BattleResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Side {
    pub player: PlayerId,
    pub team: Vec<Combatant>,
    pub active: usize,
    pub pending: Option<Action>,
}

impl Side {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            team: Vec::new(),
            active: 0,
            pending: None,
        }
    }

    pub fn has_alive_pokemon(&self) -> bool {
        self.team.iter().any(|c| !c.is_fainted())
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.team.get(self.active)
    }

    pub fn first_alive(&self) -> Option<usize> {
        self.team.iter().position(|c| !c.is_fainted())
    }

    /// Remaining and maximum HP summed over the whole team.
    pub fn hp_totals(&self) -> (u64, u64) {
        self.team.iter().fold((0, 0), |(cur, max), c| {
            (cur + c.current_hp as u64, max + c.max_hp() as u64)
        })
    }
}

/// One match between two players.
#[derive(Clone, Debug, Serialize)]
pub struct Battle {
    pub id: BattleId,
    pub channel: ChannelId,
    pub sides: Vec<Side>,
    pub phase: BattlePhase,
    /// Completed turns.
    pub turn: u32,
    pub turn_order: Vec<usize>,
    pub settings: BattleSettings,
    pub log: BattleLogger,
    pub result: Option<BattleResult>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    rng: SmallRng,
}

fn opponent(side: usize) -> usize {
    1 - side
}

/// The acting combatant and the opposing active one.
fn actives_mut(sides: &mut [Side], side: usize) -> Result<(&mut Combatant, &mut Combatant)> {
    let [first, second] = sides else {
        return Err(BattleError::NotFound(Missing::Opponent));
    };
    let (own, foe) = if side == 0 { (first, second) } else { (second, first) };
    let own_active = own.active;
    let foe_active = foe.active;
    let user = own
        .team
        .get_mut(own_active)
        .ok_or_else(|| BattleError::NotFound(Missing::Player(own.player.clone())))?;
    let target = foe
        .team
        .get_mut(foe_active)
        .ok_or(BattleError::NotFound(Missing::Opponent))?;
    Ok((user, target))
}

/// Status and volatile checks made when a combatant is about to move.
fn can_act(
    combatant: &mut Combatant,
    mechanics: &Mechanics,
    rng: &mut SmallRng,
    log: &mut BattleLogger,
) -> bool {
    if combatant.flinched {
        log.log_line(format!("{} flinched and couldn't move!", combatant.name()));
        return false;
    }
    match combatant.status.map(|s| s.condition) {
        Some(MajorStatus::Sleep) => {
            log.log_line(format!("{} is fast asleep.", combatant.name()));
            return false;
        }
        Some(MajorStatus::Freeze) => {
            log.log_line(format!("{} is frozen solid!", combatant.name()));
            return false;
        }
        Some(MajorStatus::Paralysis) if rng.gen_bool(0.25) => {
            log.log_line(format!("{} is paralyzed! It can't move!", combatant.name()));
            return false;
        }
        _ => {}
    }
    if combatant.is_confused() {
        log.log_line(format!("{} is confused!", combatant.name()));
        if rng.gen_bool(1.0 / 3.0) {
            let damage = confusion_self_damage(combatant, mechanics, rng);
            combatant.take_damage(damage);
            log.log_line("It hurt itself in its confusion!");
            log.log_damage(combatant.name(), damage, combatant.current_hp, combatant.max_hp());
            return false;
        }
    }
    true
}

fn housekeeping_line(name: &str, event: Housekeeping) -> Option<String> {
    match event {
        Housekeeping::WokeUp => Some(format!("{name} woke up!")),
        Housekeeping::Thawed => Some(format!("{name} thawed out!")),
        Housekeeping::ConfusionEnded => Some(format!("{name} snapped out of its confusion!")),
        Housekeeping::TrapEnded => Some(format!("{name} was freed!")),
        Housekeeping::DisableEnded(move_id) => {
            let move_name = get_move(move_id).map(|m| m.name).unwrap_or("move");
            Some(format!("{name}'s {move_name} is no longer disabled!"))
        }
        Housekeeping::ProtectEnded => None,
    }
}

impl Battle {
    pub fn new(
        id: BattleId,
        channel: ChannelId,
        settings: BattleSettings,
        seed: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel,
            sides: Vec::with_capacity(2),
            phase: BattlePhase::WaitingForPlayers,
            turn: 0,
            turn_order: Vec::new(),
            settings,
            log: BattleLogger::new(),
            result: None,
            created_at,
            finished_at: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn side_of(&self, player: &PlayerId) -> Option<usize> {
        self.sides.iter().position(|s| &s.player == player)
    }

    pub fn side(&self, side: usize) -> Result<&Side> {
        self.sides
            .get(side)
            .ok_or_else(|| BattleError::invalid(format!("side {side} does not exist")))
    }

    fn side_mut(&mut self, side: usize) -> Result<&mut Side> {
        self.sides
            .get_mut(side)
            .ok_or_else(|| BattleError::invalid(format!("side {side} does not exist")))
    }

    pub fn active(&self, side: usize) -> Option<&Combatant> {
        self.sides.get(side).and_then(Side::active_combatant)
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match self.result {
            Some(BattleResult::Winner(side)) => self.sides.get(side).map(|s| &s.player),
            _ => None,
        }
    }

    pub fn log_lines(&self) -> &[String] {
        self.log.log_lines()
    }

    fn require_phase(&self, action: &'static str, phase: BattlePhase) -> Result<()> {
        if self.phase != phase {
            return Err(BattleError::InvalidState {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Seats a player; the second seat moves the battle to team selection.
    pub fn add_player(&mut self, player: PlayerId) -> Result<usize> {
        self.require_phase("add_player", BattlePhase::WaitingForPlayers)?;
        if self.side_of(&player).is_some() {
            return Err(BattleError::invalid(format!("{player} is already seated")));
        }
        self.sides.push(Side::new(player));
        if self.sides.len() == 2 {
            self.phase = BattlePhase::TeamSelection;
        }
        Ok(self.sides.len() - 1)
    }

    /// Adds a copy of `snapshot` to a side's team after checking the team
    /// policies in the battle settings.
    pub fn add_to_team(&mut self, side: usize, snapshot: CombatantSnapshot) -> Result<()> {
        self.require_phase("add_to_team", BattlePhase::TeamSelection)?;
        let settings = self.settings.clone();
        let entry = self.side_mut(side)?;
        if entry.team.len() >= settings.team_size {
            return Err(BattleError::invalid(format!(
                "team is full ({} members)",
                settings.team_size
            )));
        }
        if !settings.allow_duplicates
            && entry
                .team
                .iter()
                .any(|c| c.snapshot.species.eq_ignore_ascii_case(&snapshot.species))
        {
            return Err(BattleError::invalid(format!(
                "{} is already on the team",
                snapshot.species
            )));
        }
        if let Some(cap) = settings.level_cap {
            if snapshot.level > cap {
                return Err(BattleError::invalid(format!(
                    "{} is level {}, above the cap of {cap}",
                    snapshot.species, snapshot.level
                )));
            }
        }
        if snapshot.moves.is_empty() {
            return Err(BattleError::invalid(format!("{} knows no moves", snapshot.species)));
        }
        if let Some(unknown) = snapshot.moves.iter().find(|id| get_move(**id).is_none()) {
            return Err(BattleError::invalid(format!("unknown move #{unknown}")));
        }
        entry.team.push(Combatant::new(snapshot));
        Ok(())
    }

    pub fn teams_ready(&self) -> bool {
        self.sides.len() == 2
            && self
                .sides
                .iter()
                .all(|s| s.team.len() == self.settings.team_size)
    }

    pub fn start(&mut self) -> Result<()> {
        self.require_phase("start", BattlePhase::TeamSelection)?;
        if let Some(short) = self
            .sides
            .iter()
            .find(|s| s.team.len() != self.settings.team_size)
        {
            return Err(BattleError::invalid(format!(
                "{} has {}/{} team members",
                short.player,
                short.team.len(),
                self.settings.team_size
            )));
        }
        self.phase = BattlePhase::InProgress;
        self.log.log_line(format!(
            "Battle started: {} vs {}!",
            self.sides[0].player, self.sides[1].player
        ));
        for side in &mut self.sides {
            side.active = 0;
            if let Some(lead) = side.team.first() {
                self.log.log_switch(side.player.as_str(), lead.name());
            }
        }
        debug!(battle = %self.id, "battle started");
        Ok(())
    }

    /// Cancels a battle that has not started yet.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !matches!(
            self.phase,
            BattlePhase::WaitingForPlayers | BattlePhase::TeamSelection
        ) {
            return Err(BattleError::InvalidState {
                action: "cancel",
                phase: self.phase,
            });
        }
        self.phase = BattlePhase::Cancelled;
        self.finished_at = Some(now);
        self.log.log_line("The battle was cancelled.");
        debug!(battle = %self.id, "battle cancelled");
        Ok(())
    }

    fn finish(&mut self, result: BattleResult, now: DateTime<Utc>) {
        self.phase = BattlePhase::Finished;
        self.result = Some(result);
        self.finished_at = Some(now);
        match result {
            BattleResult::Winner(side) => {
                let winner = self.sides[side].player.to_string();
                self.log.log_win(&winner);
            }
            BattleResult::Draw => self.log.log_tie(),
        }
        debug!(battle = %self.id, ?result, turn = self.turn, "battle finished");
    }

    pub fn ready_to_process(&self) -> bool {
        self.phase == BattlePhase::InProgress
            && self.sides.len() == 2
            && self.sides.iter().all(|s| s.pending.is_some())
    }

    /// Actions the side may submit this turn.
    pub fn legal_actions(&self, side: usize) -> Vec<Action> {
        let Some(entry) = self.sides.get(side) else {
            return Vec::new();
        };
        if self.phase != BattlePhase::InProgress || entry.pending.is_some() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if let Some(active) = entry.active_combatant() {
            let locked = active.is_recharging() || active.charging.is_some();
            if !active.is_fainted() && !locked {
                actions.extend(
                    active
                        .snapshot
                        .moves
                        .iter()
                        .filter(|id| get_move(**id).is_some() && !active.is_move_disabled(**id))
                        .map(|id| Action::Attack(*id)),
                );
            }
            if !active.is_trapped() && !locked {
                actions.extend(
                    entry
                        .team
                        .iter()
                        .enumerate()
                        .filter(|(idx, c)| *idx != entry.active && !c.is_fainted())
                        .map(|(idx, _)| Action::Switch(idx)),
                );
            }
        }
        actions.push(Action::Skip);
        actions.push(Action::Forfeit);
        actions
    }

    fn validate_action(&self, side: usize, action: Action) -> Result<()> {
        let entry = self.side(side)?;
        let active = entry
            .active_combatant()
            .ok_or_else(|| BattleError::NotFound(Missing::Player(entry.player.clone())))?;
        let locked = active.is_recharging() || active.charging.is_some();
        if locked && matches!(action, Action::Attack(_) | Action::Switch(_)) {
            return Err(BattleError::invalid(format!(
                "{} is busy with a multi-turn move",
                active.name()
            )));
        }
        match action {
            Action::Attack(move_id) => {
                if active.is_fainted() {
                    return Err(BattleError::invalid(format!("{} has fainted", active.name())));
                }
                let move_data =
                    get_move(move_id).ok_or(BattleError::NotFound(Missing::Move(move_id)))?;
                if !active.knows_move(move_id) {
                    return Err(BattleError::invalid(format!(
                        "{} does not know {}",
                        active.name(),
                        move_data.name
                    )));
                }
                if active.is_move_disabled(move_id) {
                    return Err(BattleError::invalid(format!("{} is disabled", move_data.name)));
                }
            }
            Action::Switch(idx) => {
                let target = entry
                    .team
                    .get(idx)
                    .ok_or_else(|| BattleError::invalid(format!("no team member at slot {idx}")))?;
                if idx == entry.active {
                    return Err(BattleError::invalid(format!("{} is already in battle", target.name())));
                }
                if target.is_fainted() {
                    return Err(BattleError::invalid(format!("{} has fainted", target.name())));
                }
                if active.is_trapped() && !active.is_fainted() {
                    return Err(BattleError::invalid(format!("{} can't escape", active.name())));
                }
            }
            Action::Skip | Action::Forfeit => {}
        }
        Ok(())
    }

    pub fn add_action(&mut self, side: usize, action: Action) -> Result<()> {
        self.add_action_at(side, action, Utc::now())
    }

    /// Records one side's action for the coming turn. A forfeit ends the
    /// battle immediately.
    pub fn add_action_at(&mut self, side: usize, action: Action, now: DateTime<Utc>) -> Result<()> {
        self.require_phase("add_action", BattlePhase::InProgress)?;
        let turn = self.turn + 1;
        if self.side(side)?.pending.is_some() {
            return Err(BattleError::AlreadySubmitted { side, turn });
        }
        self.validate_action(side, action)?;
        if action == Action::Forfeit {
            let player = self.sides[side].player.to_string();
            self.log.log_line(format!("{player} forfeited the battle."));
            for s in &mut self.sides {
                s.pending = None;
            }
            self.finish(BattleResult::Winner(opponent(side)), now);
            return Ok(());
        }
        self.side_mut(side)?.pending = Some(action);
        Ok(())
    }

    /// Ordering key: switches first, then move priority, then effective speed.
    fn action_rank(&self, side: usize, action: Action) -> (u8, i8, u16) {
        let Some(active) = self.active(side) else {
            return (0, 0, 0);
        };
        let speed = active.effective_speed(self.settings.mechanics.stat_stages);
        let committed = active.ready_charge().map(Action::Attack).unwrap_or(action);
        match committed {
            Action::Switch(_) => (1, 0, speed),
            Action::Attack(move_id) => {
                let priority = get_move(move_id).map(|m| m.priority).unwrap_or(0);
                (0, priority, speed)
            }
            Action::Skip | Action::Forfeit => (0, 0, speed),
        }
    }

    fn order_actions(&mut self, actions: &[Action; 2]) -> Vec<usize> {
        let mut keyed: Vec<(usize, (u8, i8, u16), u64)> = Vec::with_capacity(2);
        for (side, action) in actions.iter().enumerate() {
            let rank = self.action_rank(side, *action);
            keyed.push((side, rank, self.rng.gen()));
        }
        keyed.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
        keyed.into_iter().map(|(side, _, _)| side).collect()
    }

    pub fn process_turn(&mut self) -> Result<TurnReport> {
        self.process_turn_at(Utc::now())
    }

    /// Resolves the turn once both sides have submitted an action.
    pub fn process_turn_at(&mut self, now: DateTime<Utc>) -> Result<TurnReport> {
        self.require_phase("process_turn", BattlePhase::InProgress)?;
        if !self.ready_to_process() {
            return Err(BattleError::invalid("both sides must submit an action first"));
        }
        let start = self.log.len();
        let turn = self.turn + 1;
        self.log.log_turn(turn);

        let mut actions = [Action::Skip; 2];
        for (slot, side) in actions.iter_mut().zip(self.sides.iter_mut()) {
            *slot = side.pending.take().unwrap_or(Action::Skip);
        }
        let starters = [self.sides[0].active, self.sides[1].active];
        self.turn_order = self.order_actions(&actions);

        for side in self.turn_order.clone() {
            if self.phase != BattlePhase::InProgress {
                break;
            }
            let action = actions[side];
            let replaced = self.sides[side].active != starters[side];
            if replaced && !matches!(action, Action::Switch(_)) {
                continue;
            }
            if let Err(err) = self.execute_action(side, action) {
                debug!(battle = %self.id, side, ?action, %err, "action skipped");
                let player = self.sides[side].player.to_string();
                self.log
                    .log_line(format!("{player}'s action could not be carried out: {err}"));
            }
            self.resolve_faints(now);
        }

        if self.phase == BattlePhase::InProgress {
            self.end_of_turn();
            self.resolve_faints(now);
        }
        if self.phase == BattlePhase::InProgress {
            self.turn = turn;
            if self.settings.turn_limit > 0 && self.turn >= self.settings.turn_limit {
                self.log
                    .log_line(format!("The turn limit of {} was reached!", self.settings.turn_limit));
                let result = self.decide_by_hp();
                self.finish(result, now);
            }
        }
        for side in &mut self.sides {
            side.pending = None;
        }
        debug!(battle = %self.id, turn, phase = ?self.phase, "turn resolved");
        Ok(TurnReport {
            turn,
            lines: self.log.lines_since(start).to_vec(),
            outcome: self.result,
        })
    }

    fn execute_action(&mut self, side: usize, action: Action) -> Result<()> {
        let Some(actor) = self.active(side) else {
            return Err(BattleError::NotFound(Missing::Player(self.sides[side].player.clone())));
        };
        if actor.is_fainted() {
            return Ok(());
        }
        if actor.is_recharging() {
            let line = format!("{} must recharge!", actor.name());
            self.log.log_line(line);
            return Ok(());
        }
        // A charged move fires whatever was submitted.
        if let Some(move_id) = actor.ready_charge() {
            return self.use_move(side, move_id, true);
        }
        match action {
            Action::Attack(move_id) => self.use_move(side, move_id, false),
            Action::Switch(idx) => self.switch_in(side, idx),
            Action::Skip | Action::Forfeit => Ok(()),
        }
    }

    fn switch_in(&mut self, side: usize, idx: usize) -> Result<()> {
        let entry = self.side_mut(side)?;
        if idx == entry.active {
            return Ok(());
        }
        let incoming = entry
            .team
            .get(idx)
            .ok_or_else(|| BattleError::invalid(format!("no team member at slot {idx}")))?;
        if incoming.is_fainted() {
            return Err(BattleError::invalid(format!("{} has fainted", incoming.name())));
        }
        let outgoing = entry.active;
        let withdrawn = entry.team.get_mut(outgoing).map(|leaving| {
            leaving.reset_on_switch();
            leaving.name().to_string()
        });
        entry.active = idx;
        let player = entry.player.to_string();
        let name = entry.team[idx].name().to_string();
        if let Some(withdrawn) = withdrawn {
            self.log.log_line(format!("{player} withdrew {withdrawn}!"));
        }
        self.log.log_switch(&player, &name);
        Ok(())
    }

    fn use_move(&mut self, side: usize, move_id: MoveId, release_charge: bool) -> Result<()> {
        let move_data = get_move(move_id).ok_or(BattleError::NotFound(Missing::Move(move_id)))?;
        let mechanics = self.settings.mechanics;
        let (user, foe) = actives_mut(&mut self.sides, side)?;
        let rng = &mut self.rng;
        let log = &mut self.log;

        if !release_charge {
            if !user.knows_move(move_id) {
                return Err(BattleError::invalid(format!(
                    "{} does not know {}",
                    user.name(),
                    move_data.name
                )));
            }
            if user.is_move_disabled(move_id) {
                log.log_line(format!("{}'s {} is disabled!", user.name(), move_data.name));
                return Ok(());
            }
        }
        if !can_act(user, &mechanics, rng, log) {
            user.charging = None;
            return Ok(());
        }
        user.last_move = Some(move_id);

        if move_data.is_charge() && !release_charge {
            user.charging = Some(ChargingMove {
                move_id,
                turns_remaining: 1,
            });
            log.log_line(format!("{} is charging up {}!", user.name(), move_data.name));
            return Ok(());
        }
        user.charging = None;
        log.log_move(user.name(), move_data.name);

        let targets_user = move_data.target.targets_user();
        let mut damage_dealt = 0;
        if !targets_user {
            if foe.is_fainted() {
                log.log_line("But there was no target...");
                return Ok(());
            }
            if foe.is_protected() {
                log.log_line(format!("{} protected itself!", foe.name()));
                return Ok(());
            }
            let result = calculate_damage(user, foe, move_data, &mechanics, rng);
            if !result.hit {
                if result.effectiveness == 0.0 {
                    log.log_line(format!("It doesn't affect {}...", foe.name()));
                } else {
                    log.log_line(format!("{}'s attack missed!", user.name()));
                }
                return Ok(());
            }
            if result.damage > 0 {
                damage_dealt = foe.take_damage(result.damage);
                if result.critical {
                    log.log_line("A critical hit!");
                }
                if !result.effectiveness_text.is_empty() {
                    log.log_line(format!("It's {}", result.effectiveness_text));
                }
                log.log_damage(foe.name(), damage_dealt, foe.current_hp, foe.max_hp());
            }
        }

        let mut participants = if targets_user {
            Participants::Solo(user)
        } else {
            Participants::Pair { user, target: foe }
        };
        for effect in move_data.effects {
            let outcome = apply_effect(effect, &mut participants, damage_dealt, &mechanics, rng);
            log.log_all(outcome.lines);
        }
        Ok(())
    }

    /// Narrates faints, brings in replacements and ends the battle when a side
    /// has nobody left.
    fn resolve_faints(&mut self, now: DateTime<Utc>) {
        let mut lost = [false; 2];
        for (idx, side) in self.sides.iter_mut().enumerate() {
            let Some(active) = side.team.get(side.active) else {
                continue;
            };
            if !active.is_fainted() {
                continue;
            }
            self.log.log_faint(active.name());
            match side.first_alive() {
                Some(next) => {
                    side.active = next;
                    self.log.log_switch(side.player.as_str(), side.team[next].name());
                }
                None => lost[idx] = true,
            }
        }
        match lost {
            [true, true] => self.finish(BattleResult::Draw, now),
            [true, false] => self.finish(BattleResult::Winner(1), now),
            [false, true] => self.finish(BattleResult::Winner(0), now),
            [false, false] => {}
        }
    }

    /// Residual status damage, then per-combatant housekeeping.
    fn end_of_turn(&mut self) {
        let mechanics = self.settings.mechanics;
        let order = self.turn_order.clone();
        for &idx in &order {
            let side = &mut self.sides[idx];
            let Some(active) = side.team.get_mut(side.active) else {
                continue;
            };
            if active.is_fainted() || !mechanics.status_effects {
                continue;
            }
            let (divisor, cause) = match active.status.map(|s| s.condition) {
                Some(MajorStatus::Poison) => (8, "poison"),
                Some(MajorStatus::Burn) => (16, "its burn"),
                _ => continue,
            };
            let damage = (active.max_hp() / divisor).max(1);
            active.take_damage(damage);
            self.log.log_line(format!("{} is hurt by {cause}!", active.name()));
            self.log
                .log_damage(active.name(), damage, active.current_hp, active.max_hp());
        }
        for &idx in &order {
            let side = &mut self.sides[idx];
            let Some(active) = side.team.get_mut(side.active) else {
                continue;
            };
            for event in active.end_of_turn(&mut self.rng) {
                if let Some(line) = housekeeping_line(active.name(), event) {
                    self.log.log_line(line);
                }
            }
        }
    }

    /// Higher share of remaining team HP wins; an exact tie is a draw.
    pub fn decide_by_hp(&self) -> BattleResult {
        let (cur_a, max_a) = self.sides[0].hp_totals();
        let (cur_b, max_b) = self.sides[1].hp_totals();
        let left = cur_a * max_b.max(1);
        let right = cur_b * max_a.max(1);
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => BattleResult::Winner(0),
            std::cmp::Ordering::Less => BattleResult::Winner(1),
            std::cmp::Ordering::Equal => BattleResult::Draw,
        }
    }
}
