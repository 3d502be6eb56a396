//! Process-wide registry of battles and pending challenges.
//!
//! Every public operation takes the registry lock for its whole duration, so
//! all battle mutation in the process is serialized. The manager runs no
//! timers: expiry is checked lazily on accept, and the `cleanup_*` sweeps are
//! driven by an outside scheduler.
use crate::config::{BattleSettings, ManagerConfig};
use crate::error::{BattleError, Missing, Result};
use crate::ids::{BattleId, ChallengeId, ChannelId, PlayerId};
use crate::sim::battle::{Action, Battle, BattlePhase, TurnReport};
use crate::sim::pokemon::CombatantSnapshot;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A time-limited proposal to battle, keyed by the challenged player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub challenger: PlayerId,
    pub challenged: PlayerId,
    pub channel: ChannelId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub settings: BattleSettings,
}

impl Challenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

struct Registry {
    battles: HashMap<BattleId, Battle>,
    players: HashMap<PlayerId, BattleId>,
    channels: HashMap<ChannelId, BattleId>,
    challenges: HashMap<PlayerId, Challenge>,
    seeds: SmallRng,
}

impl Registry {
    fn battle_for_player(&self, player: &PlayerId) -> Result<BattleId> {
        self.players
            .get(player)
            .copied()
            .ok_or_else(|| BattleError::NotFound(Missing::PlayerBattle(player.clone())))
    }

    fn battle_mut(&mut self, id: BattleId) -> Result<&mut Battle> {
        self.battles
            .get_mut(&id)
            .ok_or(BattleError::NotFound(Missing::Battle(id)))
    }

    /// Drops the player and channel index entries of a battle that ended.
    fn release(&mut self, id: BattleId) {
        self.players.retain(|_, battle| *battle != id);
        self.channels.retain(|_, battle| *battle != id);
    }

    fn release_if_over(&mut self, id: BattleId) {
        if self.battles.get(&id).is_some_and(Battle::is_over) {
            self.release(id);
            debug!(battle = %id, "battle released from indexes");
        }
    }
}

pub struct BattleManager {
    config: ManagerConfig,
    registry: Mutex<Registry>,
}

impl Default for BattleManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl BattleManager {
    pub fn new(config: ManagerConfig) -> Self {
        let seeds = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            config,
            registry: Mutex::new(Registry {
                battles: HashMap::new(),
                players: HashMap::new(),
                channels: HashMap::new(),
                challenges: HashMap::new(),
                seeds,
            }),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A panic elsewhere must not take the whole registry down with it.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_challenge(
        &self,
        challenger: PlayerId,
        challenged: PlayerId,
        channel: ChannelId,
        settings: Option<BattleSettings>,
    ) -> Result<Challenge> {
        self.create_challenge_at(challenger, challenged, channel, settings, Utc::now())
    }

    pub fn create_challenge_at(
        &self,
        challenger: PlayerId,
        challenged: PlayerId,
        channel: ChannelId,
        settings: Option<BattleSettings>,
        now: DateTime<Utc>,
    ) -> Result<Challenge> {
        if challenger == challenged {
            return Err(BattleError::invalid("a player cannot challenge themselves"));
        }
        let settings = settings.unwrap_or_else(|| self.config.default_settings.clone());
        settings.validate()?;

        let mut registry = self.lock();
        for player in [&challenger, &challenged] {
            if registry.players.contains_key(player) {
                return Err(BattleError::Unavailable(format!("{player} is already in a battle")));
            }
        }
        if registry.channels.contains_key(&channel) {
            return Err(BattleError::Unavailable(format!(
                "channel {channel} already hosts a battle"
            )));
        }
        let pending = registry
            .challenges
            .get(&challenged)
            .map(|c| (c.is_expired(now), c.challenger == challenger));
        match pending {
            Some((true, _)) => {
                registry.challenges.remove(&challenged);
            }
            Some((false, true)) => {
                return Err(BattleError::invalid(format!(
                    "{challenger} already challenged {challenged}"
                )));
            }
            Some((false, false)) => {
                return Err(BattleError::Unavailable(format!(
                    "{challenged} already has a pending challenge"
                )));
            }
            None => {}
        }

        let challenge = Challenge {
            id: ChallengeId::new(),
            challenger,
            challenged: challenged.clone(),
            channel,
            created_at: now,
            expires_at: now + self.config.challenge_ttl(),
            settings,
        };
        registry.challenges.insert(challenged, challenge.clone());
        debug!(
            challenge = %challenge.id,
            challenger = %challenge.challenger,
            challenged = %challenge.challenged,
            "challenge created"
        );
        Ok(challenge)
    }

    pub fn accept_challenge(&self, challenged: &PlayerId) -> Result<BattleId> {
        self.accept_challenge_at(challenged, Utc::now())
    }

    /// Turns the pending challenge into a battle in team selection. The
    /// challenge is consumed whether or not acceptance succeeds.
    pub fn accept_challenge_at(&self, challenged: &PlayerId, now: DateTime<Utc>) -> Result<BattleId> {
        let mut registry = self.lock();
        let challenge = registry
            .challenges
            .remove(challenged)
            .ok_or_else(|| BattleError::NotFound(Missing::Challenge(challenged.clone())))?;
        if challenge.is_expired(now) {
            debug!(challenge = %challenge.id, "challenge expired before acceptance");
            return Err(BattleError::Expired {
                challenged: challenged.clone(),
            });
        }
        for player in [&challenge.challenger, &challenge.challenged] {
            if registry.players.contains_key(player) {
                return Err(BattleError::Unavailable(format!("{player} is already in a battle")));
            }
        }
        if registry.channels.contains_key(&challenge.channel) {
            return Err(BattleError::Unavailable(format!(
                "channel {} already hosts a battle",
                challenge.channel
            )));
        }

        let seed: u64 = registry.seeds.gen();
        let id = BattleId::new();
        let mut battle = Battle::new(id, challenge.channel.clone(), challenge.settings, seed, now);
        battle.add_player(challenge.challenger.clone())?;
        battle.add_player(challenge.challenged.clone())?;

        registry.players.insert(challenge.challenger, id);
        registry.players.insert(challenge.challenged, id);
        registry.channels.insert(challenge.channel, id);
        registry.battles.insert(id, battle);
        debug!(battle = %id, "challenge accepted");
        Ok(id)
    }

    pub fn decline_challenge(&self, challenged: &PlayerId) -> Result<Challenge> {
        let challenge = self
            .lock()
            .challenges
            .remove(challenged)
            .ok_or_else(|| BattleError::NotFound(Missing::Challenge(challenged.clone())))?;
        debug!(challenge = %challenge.id, "challenge declined");
        Ok(challenge)
    }

    pub fn cancel_battle(&self, player: &PlayerId) -> Result<BattleId> {
        self.cancel_battle_at(player, Utc::now())
    }

    /// Cancels a battle that has not started yet.
    pub fn cancel_battle_at(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<BattleId> {
        let mut registry = self.lock();
        let id = registry.battle_for_player(player)?;
        registry.battle_mut(id)?.cancel(now)?;
        registry.release(id);
        Ok(id)
    }

    /// Stores a copy of `snapshot` on the player's side.
    pub fn add_character_to_team(&self, player: &PlayerId, snapshot: &CombatantSnapshot) -> Result<()> {
        let mut registry = self.lock();
        let id = registry.battle_for_player(player)?;
        let battle = registry.battle_mut(id)?;
        let side = battle
            .side_of(player)
            .ok_or_else(|| BattleError::NotFound(Missing::Player(player.clone())))?;
        battle.add_to_team(side, snapshot.clone())
    }

    pub fn start_battle(&self, player: &PlayerId) -> Result<BattleId> {
        let mut registry = self.lock();
        let id = registry.battle_for_player(player)?;
        registry.battle_mut(id)?.start()?;
        Ok(id)
    }

    pub fn submit_action(&self, player: &PlayerId, action: Action) -> Result<Option<TurnReport>> {
        self.submit_action_at(player, action, Utc::now())
    }

    /// Records the player's action and resolves the turn as soon as both
    /// sides have one. Returns the report of a resolved turn.
    pub fn submit_action_at(
        &self,
        player: &PlayerId,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<Option<TurnReport>> {
        let mut registry = self.lock();
        let id = registry.battle_for_player(player)?;
        let battle = registry.battle_mut(id)?;
        let side = battle
            .side_of(player)
            .ok_or_else(|| BattleError::NotFound(Missing::Player(player.clone())))?;
        battle.add_action_at(side, action, now)?;
        let report = if battle.ready_to_process() {
            Some(battle.process_turn_at(now)?)
        } else {
            None
        };
        registry.release_if_over(id);
        Ok(report)
    }

    pub fn forfeit(&self, player: &PlayerId) -> Result<BattlePhase> {
        self.forfeit_at(player, Utc::now())
    }

    /// Forfeits a running battle, or cancels one that has not started yet.
    /// Returns the phase the battle ended in.
    pub fn forfeit_at(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<BattlePhase> {
        let mut registry = self.lock();
        let id = registry.battle_for_player(player)?;
        let battle = registry.battle_mut(id)?;
        if matches!(
            battle.phase,
            BattlePhase::WaitingForPlayers | BattlePhase::TeamSelection
        ) {
            battle.cancel(now)?;
        } else {
            let side = battle
                .side_of(player)
                .ok_or_else(|| BattleError::NotFound(Missing::Player(player.clone())))?;
            battle.add_action_at(side, Action::Forfeit, now)?;
        }
        let phase = battle.phase;
        registry.release_if_over(id);
        debug!(battle = %id, player = %player, ?phase, "player forfeited");
        Ok(phase)
    }

    pub fn cleanup_expired_challenges(&self) -> usize {
        self.cleanup_expired_challenges_at(Utc::now())
    }

    /// Removes challenges past their expiry; returns how many were removed.
    pub fn cleanup_expired_challenges_at(&self, now: DateTime<Utc>) -> usize {
        let mut registry = self.lock();
        let before = registry.challenges.len();
        registry.challenges.retain(|_, c| !c.is_expired(now));
        let removed = before - registry.challenges.len();
        if removed > 0 {
            debug!(removed, "expired challenges removed");
        }
        removed
    }

    pub fn cleanup_finished_battles(&self, max_age: Duration) -> usize {
        self.cleanup_finished_battles_at(max_age, Utc::now())
    }

    /// Evicts battles that ended more than `max_age` before `now`.
    pub fn cleanup_finished_battles_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut registry = self.lock();
        let stale: Vec<BattleId> = registry
            .battles
            .values()
            .filter(|b| b.is_over() && b.finished_at.is_some_and(|at| now - at > max_age))
            .map(|b| b.id)
            .collect();
        for id in &stale {
            registry.battles.remove(id);
            registry.release(*id);
            debug!(battle = %id, "finished battle evicted");
        }
        stale.len()
    }

    pub fn cancel_stale_battles(&self, max_age: Duration) -> usize {
        self.cancel_stale_battles_at(max_age, Utc::now())
    }

    /// Cancels battles still in team selection more than `max_age` after they
    /// were created, freeing their players and channel. Cancelled battles are
    /// then evicted by `cleanup_finished_battles` like finished ones.
    pub fn cancel_stale_battles_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut registry = self.lock();
        let stale: Vec<BattleId> = registry
            .battles
            .values()
            .filter(|b| {
                matches!(b.phase, BattlePhase::WaitingForPlayers | BattlePhase::TeamSelection)
                    && now - b.created_at > max_age
            })
            .map(|b| b.id)
            .collect();
        for id in &stale {
            let cancelled = registry
                .battles
                .get_mut(id)
                .is_some_and(|b| b.cancel(now).is_ok());
            if cancelled {
                registry.release(*id);
                debug!(battle = %id, "stale battle cancelled");
            }
        }
        stale.len()
    }

    /// Runs `f` against the battle while holding the registry lock.
    pub fn with_battle<T>(&self, id: BattleId, f: impl FnOnce(&Battle) -> T) -> Result<T> {
        let registry = self.lock();
        let battle = registry
            .battles
            .get(&id)
            .ok_or(BattleError::NotFound(Missing::Battle(id)))?;
        Ok(f(battle))
    }

    pub fn battle_snapshot(&self, id: BattleId) -> Result<Battle> {
        self.with_battle(id, Battle::clone)
    }

    pub fn battle_id_for_player(&self, player: &PlayerId) -> Option<BattleId> {
        self.lock().players.get(player).copied()
    }

    pub fn battle_id_for_channel(&self, channel: &ChannelId) -> Option<BattleId> {
        self.lock().channels.get(channel).copied()
    }

    pub fn pending_challenge(&self, challenged: &PlayerId) -> Option<Challenge> {
        self.lock().challenges.get(challenged).cloned()
    }

    /// Battles currently held by the registry, finished ones included until
    /// they are evicted.
    pub fn battle_count(&self) -> usize {
        self.lock().battles.len()
    }

    /// Battles that have not reached a terminal phase.
    pub fn active_battle_count(&self) -> usize {
        self.lock().battles.values().filter(|b| !b.is_over()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> BattleManager {
        BattleManager::new(ManagerConfig {
            rng_seed: Some(7),
            ..ManagerConfig::default()
        })
    }

    #[test]
    fn self_challenge_is_rejected() {
        let manager = manager();
        let err = manager
            .create_challenge("ash".into(), "ash".into(), "arena".into(), None)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationFailed);
        assert!(manager.pending_challenge(&"ash".into()).is_none());
    }

    #[test]
    fn release_clears_only_the_given_battle() {
        let manager = manager();
        manager
            .create_challenge("ash".into(), "gary".into(), "arena".into(), None)
            .unwrap();
        manager
            .create_challenge("misty".into(), "brock".into(), "gym".into(), None)
            .unwrap();
        let first = manager.accept_challenge(&"gary".into()).unwrap();
        let second = manager.accept_challenge(&"brock".into()).unwrap();
        manager.lock().release(first);
        assert_eq!(manager.battle_id_for_player(&"ash".into()), None);
        assert_eq!(manager.battle_id_for_channel(&"arena".into()), None);
        assert_eq!(manager.battle_id_for_player(&"misty".into()), Some(second));
        assert_eq!(manager.battle_id_for_channel(&"gym".into()), Some(second));
    }
}
