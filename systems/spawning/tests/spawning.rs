use std::{collections::BTreeMap, time::Duration};

use retro_hunter_core::{
    Command, EnemyKind, Event, SeededRandom, SpawnEntry, UnitRandom, WaveDefinition,
};
use retro_hunter_system_spawning::{weighted_draw, Config, SpawnGeometry, SpawnRequest, Spawning};

#[derive(Debug, Default)]
struct Recorder {
    accept: bool,
    requests: Vec<SpawnRequest>,
}

impl Recorder {
    fn accepting() -> Self {
        Self {
            accept: true,
            requests: Vec::new(),
        }
    }
}

impl SpawnGeometry for Recorder {
    fn spawn(&mut self, request: SpawnRequest) -> bool {
        self.requests.push(request);
        self.accept
    }
}

fn single_invader_wave(max_enemies: u32) -> WaveDefinition {
    WaveDefinition::new(
        max_enemies,
        Duration::from_secs(1),
        vec![SpawnEntry::new(EnemyKind::Invader, 1.0, false)],
    )
}

fn clock(millis: u64) -> Event {
    Event::WaveClockAdvanced {
        dt: Duration::from_millis(millis),
        remaining: Duration::from_secs(30),
    }
}

#[test]
fn weighted_draw_matches_declared_ratios() {
    let entries = [
        SpawnEntry::new(EnemyKind::Invader, 1.0, false),
        SpawnEntry::new(EnemyKind::Stepper, 1.0, false),
        SpawnEntry::new(EnemyKind::Bomber, 2.0, true),
    ];
    let mut random = SeededRandom::from_seed(0x5a17_e5ee_d000_0001);
    let mut counts: BTreeMap<EnemyKind, u32> = BTreeMap::new();
    let draws = 10_000;

    for _ in 0..draws {
        let entry = weighted_draw(&entries, random.next_unit()).expect("weights are positive");
        *counts.entry(entry.enemy()).or_default() += 1;
    }

    let share = |kind| f64::from(counts.get(&kind).copied().unwrap_or(0)) / f64::from(draws);
    assert!((share(EnemyKind::Invader) - 0.25).abs() < 0.02);
    assert!((share(EnemyKind::Stepper) - 0.25).abs() < 0.02);
    assert!((share(EnemyKind::Bomber) - 0.5).abs() < 0.02);
}

#[test]
fn live_cap_holds_spawns_until_an_enemy_leaves() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::accepting();
    spawning.start_wave(single_invader_wave(2));

    let second = Duration::from_secs(1);
    assert_eq!(spawning.tick(second, 1.0, &mut geometry), Some(EnemyKind::Invader));
    assert_eq!(spawning.tick(second, 1.0, &mut geometry), Some(EnemyKind::Invader));
    assert_eq!(spawning.tick(second, 1.0, &mut geometry), None);
    assert_eq!(spawning.alive(), 2);
    assert_eq!(spawning.timer(), second, "timer keeps running at the cap");

    let mut commands = Vec::new();
    spawning.notify_despawned(false, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(spawning.tick(Duration::ZERO, 1.0, &mut geometry), Some(EnemyKind::Invader));
    assert_eq!(geometry.requests.len(), 3);
}

#[test]
fn declined_spawns_do_not_count_but_reset_the_timer() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::default();
    spawning.start_wave(single_invader_wave(1));

    assert_eq!(spawning.tick(Duration::from_secs(1), 1.0, &mut geometry), None);
    assert_eq!(geometry.requests.len(), 1);
    assert_eq!(spawning.alive(), 0);
    assert_eq!(spawning.timer(), Duration::ZERO);
}

#[test]
fn spawn_rate_upgrade_shortens_the_interval() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::accepting();
    spawning.start_wave(single_invader_wave(10));

    assert_eq!(spawning.tick(Duration::from_millis(499), 2.0, &mut geometry), None);
    assert_eq!(
        spawning.tick(Duration::from_millis(1), 2.0, &mut geometry),
        Some(EnemyKind::Invader)
    );
}

#[test]
fn empty_or_missing_definitions_never_spawn() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::accepting();
    assert_eq!(spawning.tick(Duration::from_secs(5), 1.0, &mut geometry), None);

    spawning.start_wave(WaveDefinition::new(5, Duration::from_secs(1), Vec::new()));
    assert_eq!(spawning.tick(Duration::from_secs(5), 1.0, &mut geometry), None);

    spawning.start_wave(WaveDefinition::new(
        5,
        Duration::from_secs(1),
        vec![SpawnEntry::new(EnemyKind::Stepper, 0.0, false)],
    ));
    assert_eq!(spawning.tick(Duration::from_secs(5), 1.0, &mut geometry), None);
    assert!(geometry.requests.is_empty());
}

#[test]
fn handle_reacts_to_wave_events_only() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::accepting();
    let mut commands = Vec::new();

    spawning.handle(
        &[
            Event::WaveStarted {
                wave: 1,
                definition: WaveDefinition::new(
                    4,
                    Duration::from_secs(1),
                    vec![SpawnEntry::new(EnemyKind::Bomber, 1.0, true)],
                ),
                duration: Duration::from_secs(60),
            },
            Event::TimeAdvanced {
                dt: Duration::from_secs(3),
            },
        ],
        1.0,
        &mut geometry,
        &mut commands,
    );
    assert!(geometry.requests.is_empty(), "paused or intro time never spawns");

    spawning.handle(&[clock(1_000)], 1.0, &mut geometry, &mut commands);
    assert_eq!(
        geometry.requests,
        vec![SpawnRequest {
            enemy: EnemyKind::Bomber,
            assign_target: true,
        }]
    );

    spawning.handle(
        &[
            Event::EnemyDespawned {
                enemy: EnemyKind::Bomber,
                killed_by_player: true,
            },
            Event::EnemyDespawned {
                enemy: EnemyKind::Bomber,
                killed_by_player: false,
            },
        ],
        1.0,
        &mut geometry,
        &mut commands,
    );
    assert_eq!(commands, vec![Command::GrantExperience]);
    assert_eq!(spawning.alive(), 0);
}

#[test]
fn new_wave_resets_timer_and_live_count() {
    let mut spawning = Spawning::new(Config::new(7));
    let mut geometry = Recorder::accepting();
    spawning.start_wave(single_invader_wave(3));
    let _ = spawning.tick(Duration::from_secs(1), 1.0, &mut geometry);
    let _ = spawning.tick(Duration::from_millis(600), 1.0, &mut geometry);

    spawning.start_wave(single_invader_wave(3));
    assert_eq!(spawning.alive(), 0);
    assert_eq!(spawning.timer(), Duration::ZERO);
}
