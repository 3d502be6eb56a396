use chrono::{Duration, Utc};
use pokemon_battle_arena::config::{BattleSettings, ManagerConfig};
use pokemon_battle_arena::error::{BattleError, ErrorKind};
use pokemon_battle_arena::ids::{ChannelId, PlayerId};
use pokemon_battle_arena::manager::BattleManager;
use pokemon_battle_arena::sim::battle::{Action, BattlePhase, BattleResult};
use pokemon_battle_arena::sim::pokemon::CombatantSnapshot;
use pokemon_battle_arena::sim::stats::Nature;
use std::sync::Arc;
use std::thread;

fn player(name: &str) -> PlayerId {
    PlayerId::new(name)
}

fn channel(name: &str) -> ChannelId {
    ChannelId::new(name)
}

fn manager() -> BattleManager {
    BattleManager::new(ManagerConfig {
        rng_seed: Some(99),
        default_settings: BattleSettings {
            team_size: 1,
            ..BattleSettings::default()
        },
        ..ManagerConfig::default()
    })
}

fn snapshot(owner: &str, species: &str, moves: Vec<u16>) -> CombatantSnapshot {
    CombatantSnapshot::from_species(owner, species, 50, [31; 6], Nature::Hardy, moves)
        .expect("species exists")
}

/// Challenge, accept, build one-member teams and start.
fn running_battle_for(manager: &BattleManager, challenger: &str, challenged: &str, room: &str) {
    manager
        .create_challenge(player(challenger), player(challenged), channel(room), None)
        .expect("challenge");
    manager.accept_challenge(&player(challenged)).expect("accept");
    manager
        .add_character_to_team(&player(challenger), &snapshot(challenger, "pikachu", vec![17, 2]))
        .expect("challenger member");
    manager
        .add_character_to_team(&player(challenged), &snapshot(challenged, "gyarados", vec![1]))
        .expect("challenged member");
    manager.start_battle(&player(challenger)).expect("start");
}

fn running_battle(manager: &BattleManager) {
    running_battle_for(manager, "ash", "gary", "arena");
}

#[test]
fn challenger_in_battle_is_unavailable_and_nothing_is_stored() {
    let manager = manager();
    running_battle(&manager);
    let err = manager
        .create_challenge(player("ash"), player("misty"), channel("gym"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(manager.pending_challenge(&player("misty")).is_none());
    assert_eq!(manager.battle_id_for_player(&player("misty")), None);
    assert_eq!(manager.battle_id_for_channel(&channel("gym")), None);
    assert_eq!(manager.battle_count(), 1);
}

#[test]
fn expired_challenge_is_consumed_on_accept() {
    let manager = manager();
    let now = Utc::now();
    let challenge = manager
        .create_challenge_at(player("ash"), player("gary"), channel("arena"), None, now)
        .expect("challenge");
    assert_eq!(challenge.expires_at, now + Duration::seconds(300));
    let later = now + Duration::seconds(301);
    let err = manager.accept_challenge_at(&player("gary"), later).unwrap_err();
    assert_eq!(
        err,
        BattleError::Expired {
            challenged: player("gary")
        }
    );
    assert!(manager.pending_challenge(&player("gary")).is_none());
    let err = manager.accept_challenge_at(&player("gary"), later).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(manager.battle_count(), 0);
}

#[test]
fn pending_challenge_rules() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    let duplicate = manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::ValidationFailed);
    let other = manager
        .create_challenge(player("misty"), player("gary"), channel("gym"), None)
        .unwrap_err();
    assert_eq!(other.kind(), ErrorKind::Unavailable);

    let declined = manager.decline_challenge(&player("gary")).expect("decline");
    assert_eq!(declined.challenger, player("ash"));
    assert!(manager.pending_challenge(&player("gary")).is_none());
    assert_eq!(
        manager.decline_challenge(&player("gary")).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn invalid_settings_are_rejected_up_front() {
    let manager = manager();
    let settings = BattleSettings {
        team_size: 9,
        ..BattleSettings::default()
    };
    let err = manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), Some(settings))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
}

#[test]
fn accepted_challenge_registers_both_players_and_channel() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    let id = manager.accept_challenge(&player("gary")).expect("accept");
    assert_eq!(manager.battle_id_for_player(&player("ash")), Some(id));
    assert_eq!(manager.battle_id_for_player(&player("gary")), Some(id));
    assert_eq!(manager.battle_id_for_channel(&channel("arena")), Some(id));
    assert!(manager.pending_challenge(&player("gary")).is_none());
    let phase = manager.with_battle(id, |b| b.phase).expect("battle exists");
    assert_eq!(phase, BattlePhase::TeamSelection);
}

#[test]
fn team_members_are_copies() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    let id = manager.accept_challenge(&player("gary")).expect("accept");
    let mut source = snapshot("ash", "pikachu", vec![17]);
    manager
        .add_character_to_team(&player("ash"), &source)
        .expect("member added");
    source.moves.push(2);
    source.level = 5;
    let battle = manager.battle_snapshot(id).expect("snapshot");
    let stored = &battle.sides[0].team[0].snapshot;
    assert_eq!(stored.moves, vec![17]);
    assert_eq!(stored.level, 50);
}

#[test]
fn team_policies_surface_through_the_manager() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    manager.accept_challenge(&player("gary")).expect("accept");
    manager
        .add_character_to_team(&player("ash"), &snapshot("ash", "pikachu", vec![17]))
        .expect("first member");
    let err = manager
        .add_character_to_team(&player("ash"), &snapshot("ash", "raichu", vec![17]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    let err = manager.start_battle(&player("ash")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    let err = manager
        .add_character_to_team(&player("brock"), &snapshot("brock", "onix", vec![1]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn turn_resolves_once_both_actions_arrive() {
    let manager = manager();
    running_battle(&manager);
    let first = manager
        .submit_action(&player("ash"), Action::Attack(17))
        .expect("ash acts");
    assert!(first.is_none());
    let again = manager
        .submit_action(&player("ash"), Action::Attack(2))
        .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::AlreadySubmitted);
    let report = manager
        .submit_action(&player("gary"), Action::Attack(1))
        .expect("gary acts")
        .expect("turn resolved");
    assert_eq!(report.turn, 1);
    assert!(!report.lines.is_empty());
}

#[test]
fn forfeit_releases_indexes_and_eviction_removes_the_battle() {
    let manager = manager();
    running_battle(&manager);
    let id = manager.battle_id_for_player(&player("ash")).expect("in battle");
    assert_eq!(manager.forfeit(&player("ash")).expect("forfeit"), BattlePhase::Finished);

    let (phase, result) = manager
        .with_battle(id, |b| (b.phase, b.result))
        .expect("battle kept until eviction");
    assert_eq!(phase, BattlePhase::Finished);
    assert_eq!(result, Some(BattleResult::Winner(1)));
    assert_eq!(manager.battle_id_for_player(&player("ash")), None);
    assert_eq!(manager.battle_id_for_player(&player("gary")), None);
    assert_eq!(manager.battle_id_for_channel(&channel("arena")), None);
    assert_eq!(manager.active_battle_count(), 0);

    assert_eq!(
        manager
            .submit_action(&player("gary"), Action::Skip)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );

    assert_eq!(manager.cleanup_finished_battles(Duration::minutes(10)), 0);
    let later = Utc::now() + Duration::minutes(11);
    assert_eq!(
        manager.cleanup_finished_battles_at(Duration::minutes(10), later),
        1
    );
    assert_eq!(manager.battle_count(), 0);
    assert_eq!(manager.with_battle(id, |_| ()).unwrap_err().kind(), ErrorKind::NotFound);

    // Both players are free to battle again.
    manager
        .create_challenge(player("gary"), player("ash"), channel("arena"), None)
        .expect("rematch");
}

#[test]
fn forfeit_during_team_selection_cancels_the_battle() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    let id = manager.accept_challenge(&player("gary")).expect("accept");
    let phase = manager.forfeit(&player("ash")).expect("forfeit");
    assert_eq!(phase, BattlePhase::Cancelled);
    let (phase, result) = manager
        .with_battle(id, |b| (b.phase, b.result))
        .expect("kept until eviction");
    assert_eq!(phase, BattlePhase::Cancelled);
    assert_eq!(result, None);
    assert_eq!(manager.battle_id_for_player(&player("ash")), None);
    assert_eq!(manager.battle_id_for_player(&player("gary")), None);
    assert_eq!(manager.battle_id_for_channel(&channel("arena")), None);
    assert_eq!(
        manager.forfeit(&player("gary")).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    manager
        .create_challenge(player("gary"), player("ash"), channel("arena"), None)
        .expect("both players are free again");
}

#[test]
fn stale_team_selection_is_cancelled_then_evicted() {
    let manager = manager();
    let now = Utc::now();
    manager
        .create_challenge_at(player("ash"), player("gary"), channel("arena"), None, now)
        .expect("challenge");
    let stale = manager
        .accept_challenge_at(&player("gary"), now)
        .expect("accept");
    running_battle_for(&manager, "misty", "brock", "gym");

    let max_age = manager.config().stale_battle_max_age();
    assert_eq!(manager.cancel_stale_battles_at(max_age, now), 0);
    let later = now + max_age + Duration::seconds(1);
    assert_eq!(manager.cancel_stale_battles_at(max_age, later), 1);
    let phase = manager.with_battle(stale, |b| b.phase).expect("kept");
    assert_eq!(phase, BattlePhase::Cancelled);
    assert_eq!(manager.battle_id_for_player(&player("ash")), None);
    assert_eq!(manager.battle_id_for_channel(&channel("arena")), None);
    assert!(manager.battle_id_for_player(&player("misty")).is_some());
    assert_eq!(manager.active_battle_count(), 1);

    let evict_at = later + Duration::minutes(11);
    assert_eq!(
        manager.cleanup_finished_battles_at(Duration::minutes(10), evict_at),
        1
    );
    assert_eq!(manager.battle_count(), 1);
}

#[test]
fn cancel_only_before_the_battle_starts() {
    let manager = manager();
    manager
        .create_challenge(player("ash"), player("gary"), channel("arena"), None)
        .expect("challenge");
    let id = manager.accept_challenge(&player("gary")).expect("accept");
    assert_eq!(manager.cancel_battle(&player("gary")).expect("cancel"), id);
    assert_eq!(manager.battle_id_for_player(&player("ash")), None);
    let phase = manager.with_battle(id, |b| b.phase).expect("kept");
    assert_eq!(phase, BattlePhase::Cancelled);

    let manager = self::manager();
    running_battle(&manager);
    let err = manager.cancel_battle(&player("ash")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn expired_challenges_are_swept() {
    let manager = manager();
    let now = Utc::now();
    manager
        .create_challenge_at(player("ash"), player("gary"), channel("arena"), None, now)
        .expect("challenge");
    manager
        .create_challenge_at(
            player("misty"),
            player("brock"),
            channel("gym"),
            None,
            now + Duration::seconds(200),
        )
        .expect("challenge");
    let removed = manager.cleanup_expired_challenges_at(now + Duration::seconds(400));
    assert_eq!(removed, 1);
    assert!(manager.pending_challenge(&player("gary")).is_none());
    assert!(manager.pending_challenge(&player("brock")).is_some());
}

#[test]
fn concurrent_challenges_keep_one_battle_per_player() {
    let manager = Arc::new(manager());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let target = player(&format!("target-{i}"));
                let _ = manager.create_challenge(
                    player("ash"),
                    target.clone(),
                    channel(&format!("room-{i}")),
                    None,
                );
                manager.accept_challenge(&target).is_ok()
            })
        })
        .collect();
    let accepted = handles
        .into_iter()
        .map(|h| h.join().expect("thread finished"))
        .filter(|ok| *ok)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(manager.battle_count(), 1);
    assert!(manager.battle_id_for_player(&player("ash")).is_some());
}
