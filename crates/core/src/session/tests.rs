use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::*;
use crate::hazards::HazardKind;
use crate::items::has_tool_unlocked;
use crate::save::SaveCodec;
use crate::types::CellKind;
use crate::visibility::RedrawMode;

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    fn advance(&self, ms: i64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

fn start(state: SaveState) -> (GameSession<ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    clock.advance(1_000_000);
    let session = GameSession::with_clock(state, WorldConfig::default(), clock.clone())
        .expect("level should generate");
    (session, clock)
}

fn fresh(seed: &str) -> (GameSession<ManualClock>, ManualClock) {
    start(SaveState::new_game(seed, PlayerCharacterId::default()))
}

/// First new-game session among a few seeds whose level 1 holds `item`.
fn fresh_with_item(
    prefix: &str,
    item: Collectible,
) -> (GameSession<ManualClock>, ManualClock, ItemSpawn) {
    for attempt in 0..20 {
        let (session, clock) = fresh(&format!("{prefix}-{attempt}"));
        if let Some(spawn) = session.items().spawns().into_iter().find(|spawn| spawn.item == item) {
            return (session, clock, spawn);
        }
    }
    panic!("no level 1 with {item:?} among 20 seeds");
}

fn kinds(maze: &MazeInstance) -> Vec<CellKind> {
    maze.cells.iter().map(|cell| cell.kind).collect()
}

#[test]
fn new_game_starts_on_the_level_one_entry() {
    let (session, _) = fresh("session-start");
    let maze = session.maze().expect("current maze");

    assert_eq!(session.current_level(), 1);
    assert_eq!(session.player_tile(), maze.entry);
    assert!(maze.cell(maze.entry).is_some_and(|cell| cell.currently_visible && cell.explored));
    assert_eq!(session.progress().maze_first_entry_times, BTreeMap::from([(1, 0)]));
    assert_eq!(session.visibility_radius(), WorldConfig::default().base_visibility_radius);

    let regenerated = generate_level("session-start", 1).expect("level should generate");
    assert_eq!(kinds(maze), kinds(&regenerated));
    assert_eq!((maze.entry, maze.exit), (regenerated.entry, regenerated.exit));
}

#[test]
fn moves_are_single_steps_onto_open_tiles() {
    let (mut session, _) = fresh("session-moves");
    let maze = session.maze().expect("current maze").clone();
    let entry = maze.entry;

    let (_, open) = maze.passable_neighbors(entry)[0];
    assert!(session.try_move(entry, open));
    assert!(session.try_move(entry, entry));
    assert!(!session.try_move(entry, maze.exit));

    let (floor, wall) = maze
        .cells
        .iter()
        .filter(|cell| cell.kind.is_passable())
        .find_map(|cell| {
            Direction::CARDINAL
                .into_iter()
                .map(|direction| cell.pos.step(direction))
                .find(|&next| !maze.is_passable(next))
                .map(|wall| (cell.pos, wall))
        })
        .expect("some floor tile borders a wall");
    assert!(!session.try_move(floor, wall));
}

#[test]
fn playtime_accumulates_and_stamps_level_timings() {
    let (mut session, _) = fresh("session-clock");
    let entry = session.player_tile();

    session.step(1.25, entry);
    session.step(-4.0, entry);
    session.step(1.0, entry);
    assert_eq!(session.progress().playtime, 2);

    session.complete_level().expect("level 2 should generate");
    assert_eq!(session.current_level(), 2);
    assert_eq!(session.progress().completed_mazes, vec![1]);
    assert_eq!(session.progress().maze_first_entry_times, BTreeMap::from([(1, 0), (2, 2)]));
    assert_eq!(session.progress().maze_first_completion_times, BTreeMap::from([(1, 2)]));
}

#[test]
fn pickups_happen_once_and_are_remembered() {
    let (mut session, _, shard) = fresh_with_item("session-shard", Collectible::MazeShard);
    let entry = session.player_tile();

    let events = session.step(0.1, shard.tile);
    assert_eq!(
        events.pickups,
        vec![ItemPickup { spawn_id: shard.id.clone(), item: Collectible::MazeShard }]
    );
    assert_eq!(session.progress().collected_shards, 1);
    assert!(session.step(0.1, shard.tile).pickups.is_empty());

    session.step(0.1, entry);
    assert!(session.step(0.1, shard.tile).pickups.is_empty());
    assert!(session.items().spawns().iter().all(|spawn| spawn.id != shard.id));
    assert_eq!(session.to_save_state().picked_up_items, BTreeMap::from([(1, vec![shard.id])]));
}

#[test]
fn tool_pickup_unlocks_equips_and_later_expires() {
    let (mut session, clock, torch) =
        fresh_with_item("session-torch", Collectible::Tool(ToolId::BasicTorch));
    let base = session.visibility_radius();

    let events = session.step(0.1, torch.tile);
    assert_eq!(events.pickups.len(), 1);
    assert!(has_tool_unlocked(session.progress().unlocked_tools, ToolId::BasicTorch));
    assert_eq!(session.tools().active_tool(), Some(ToolId::BasicTorch));
    assert_eq!(session.visibility_radius(), base + 2.0);

    let widened = session.step(0.1, torch.tile);
    assert_eq!(widened.visibility.map(|update| update.mode), Some(RedrawMode::Dirty));
    assert_eq!(session.step(0.1, torch.tile).visibility, None);

    clock.advance(60_000);
    let events = session.step(0.1, torch.tile);
    assert_eq!(events.expired_tool, Some(ToolId::BasicTorch));
    assert!(events.visibility.is_some());
    assert_eq!(session.visibility_radius(), base);
    assert_eq!(session.step(0.1, torch.tile).expired_tool, None);
}

#[test]
fn backtracking_reuses_the_completed_level_and_lands_on_its_exit() {
    let (mut session, _) = fresh("session-backtrack");
    assert!(!session.can_backtrack());
    assert_eq!(session.backtrack(), Ok(None));
    let level_one = session.maze().expect("current maze").fingerprint();

    let entered = session.complete_level().expect("level 2 should generate");
    assert_eq!(entered.mode, RedrawMode::Full);
    assert!(session.can_backtrack());

    let update = session.backtrack().expect("cached level").expect("backtrack allowed");
    assert_eq!(update.mode, RedrawMode::Full);
    let maze = session.maze().expect("current maze");
    assert_eq!(session.current_level(), 1);
    assert_eq!(maze.fingerprint(), level_one);
    assert_eq!(session.player_tile(), maze.exit);
    assert!(!session.can_backtrack());
}

fn veteran(seed: &str, hub_unlocked: bool) -> SaveState {
    SaveState {
        current_maze: 4,
        completed_mazes: vec![1, 2, 3],
        portal_hub_unlocked: hub_unlocked,
        ..SaveState::new_game(seed, PlayerCharacterId::Ranger)
    }
}

#[test]
fn portal_travel_needs_the_wayfinder_stone() {
    let (mut session, _) = start(veteran("portal-locked", false));

    assert!(!session.can_travel_to(2));
    assert_eq!(session.travel_to(2), Ok(None));
    assert_eq!(session.current_level(), 4);
}

#[test]
fn portal_travel_only_reaches_completed_levels() {
    let (mut session, _) = start(veteran("portal-open", true));

    for level in [0, 4, 5, 9] {
        assert_eq!(session.travel_to(level), Ok(None), "level {level}");
    }
    assert_eq!(session.current_level(), 4);
    assert_eq!(session.player_tile(), session.maze().expect("current maze").entry);
}

#[test]
fn portal_travel_reaches_any_completed_level_at_its_exit() {
    let (mut session, _) = start(veteran("portal-far", true));
    assert!(session.can_travel_to(1));

    let update = session.travel_to(1).expect("level 1 generates").expect("travel allowed");
    assert_eq!(update.mode, RedrawMode::Full);
    assert_eq!(session.current_level(), 1);
    let maze = session.maze().expect("current maze");
    assert_eq!(session.player_tile(), maze.exit);
    let regenerated = generate_level("portal-far", 1).expect("level should generate");
    assert_eq!(kinds(maze), kinds(&regenerated));
    assert_eq!(maze.exit, regenerated.exit);

    session.travel_to(3).expect("level 3 generates").expect("travel allowed");
    assert_eq!(session.current_level(), 3);
    assert_eq!(session.to_save_state().current_maze, 3);
}

#[test]
fn completing_a_level_twice_keeps_the_first_record() {
    let (mut session, _) = fresh("session-repeat");
    session.step(5.0, session.player_tile());
    session.complete_level().expect("level 2 should generate");
    session.backtrack().expect("cached level").expect("backtrack allowed");

    let exit = session.player_tile();
    session.step(30.0, exit);
    session.complete_level().expect("level 2 is cached");

    assert_eq!(session.progress().completed_mazes, vec![1]);
    assert_eq!(session.progress().maze_first_completion_times, BTreeMap::from([(1, 5)]));
    assert_eq!(session.progress().maze_first_entry_times.get(&2), Some(&5));
}

#[test]
fn save_codes_restore_the_session() {
    let (mut session, clock, spawn) = fresh_with_item("session-save", Collectible::MazeShard);
    session.step(42.7, spawn.tile);
    session.complete_level().expect("level 2 should generate");

    let state = session.to_save_state();
    let decoded = SaveCodec::decode(&SaveCodec::encode(&state)).expect("own codes decode");
    assert_eq!(decoded, state);

    let mut restored =
        GameSession::with_clock(decoded, WorldConfig::default(), clock).expect("level generates");
    assert_eq!(restored.current_level(), 2);
    assert_eq!(restored.progress().collected_shards, 1);
    assert_eq!(
        restored.maze().map(MazeInstance::fingerprint),
        session.maze().map(MazeInstance::fingerprint)
    );
    assert_eq!(restored.items().spawns(), session.items().spawns());

    restored.backtrack().expect("level 1 generates").expect("backtrack allowed");
    assert!(restored.items().spawns().iter().all(|remaining| remaining.id != spawn.id));
}

#[test]
fn skeleton_key_opens_a_locked_door_for_good() {
    for attempt in 0..20 {
        let mut state =
            SaveState::new_game(format!("session-locks-{attempt}"), PlayerCharacterId::Knight);
        state.current_maze = 21;
        let (mut session, _) = start(state);

        let Some(door) = session
            .hazards()
            .hazards()
            .find(|hazard| matches!(hazard.kind, HazardKind::LockedDoor { .. }))
            .cloned()
        else {
            continue;
        };
        let maze = session.maze().expect("current maze");
        let (_, approach) = maze.passable_neighbors(door.tile)[0];

        assert!(!session.try_move(approach, door.tile));
        session.tools_mut().equip(ToolId::SkeletonKey);
        assert!(session.try_move(approach, door.tile));
        assert_eq!(session.tools().active_tool(), None);
        assert!(session.try_move(approach, door.tile));
        return;
    }
    panic!("no locked door on level 21 among 20 seeds");
}
