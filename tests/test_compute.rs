use glam::Vec2;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use shadowed_forest::compute::*;
use shadowed_forest::config::GameConfig;
use shadowed_forest::entities::*;
use shadowed_forest::error::GameError;
use shadowed_forest::events::FrameEvent;
use shadowed_forest::geometry::Rect;
use shadowed_forest::input::InputSnapshot;
use shadowed_forest::map::{MapLayout, FALLBACK_SPAWN_POINTS};
use shadowed_forest::timer::Countdown;

const SPAWN: Vec2 = Vec2::new(2000.0, 2000.0);

fn open_map() -> MapLayout {
    MapLayout {
        size: Vec2::new(4000.0, 4000.0),
        player_spawn: SPAWN,
        enemy_spawns: vec![Vec2::new(200.0, 200.0), Vec2::new(3800.0, 3800.0)],
        obstacles: Vec::new(),
        ground: Vec::new(),
    }
}

fn make_world() -> World {
    init_state(GameConfig::default(), open_map(), "Tester", Skin::Veronica).unwrap()
}

/// Countdown already over, spawner parked far in the future.
fn quiet_world() -> World {
    let mut w = make_world();
    w.countdown.clear();
    w.spawn_timer = Countdown::new(1000.0);
    w
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

fn fire_right() -> InputSnapshot {
    InputSnapshot {
        fire: true,
        aim: Vec2::X,
        ..Default::default()
    }
}

fn enemy_at(world: &World, kind: EnemyKind, center: Vec2) -> Enemy {
    Enemy::spawn(kind, center, world.difficulty, world.player.max_health, &world.config)
}

fn count(events: &[FrameEvent], pred: impl Fn(&FrameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// ── init_state / reset ────────────────────────────────────────────────────────

#[test]
fn init_state_builds_a_fresh_round() {
    let w = make_world();
    assert_eq!(w.player.center(), SPAWN);
    assert_eq!(w.player.health, 200.0);
    assert_eq!(w.status, GameStatus::Playing);
    assert!(w.countdown.is_active());
    assert!(w.enemies.is_empty() && w.bullets.is_empty() && w.drops.is_empty());
    assert_eq!(w.spawn_points.len(), 2);
    assert_eq!(w.difficulty, 0);
    assert_eq!(w.score, 0.0);
    assert_eq!(w.player_name, "Tester");
}

#[test]
fn init_state_rejects_spawn_inside_obstacle() {
    let mut map = open_map();
    map.obstacles.push(Rect::new(1900.0, 1900.0, 200.0, 200.0));
    let result = init_state(GameConfig::default(), map, "Tester", Skin::Veronica);
    assert!(matches!(result, Err(GameError::MapInvalid(_))));
}

#[test]
fn init_state_rejects_bad_config() {
    let config = GameConfig {
        bullet_speed: 0.0,
        ..GameConfig::default()
    };
    let result = init_state(config, open_map(), "Tester", Skin::Veronica);
    assert!(matches!(
        result,
        Err(GameError::InvalidConfig { name: "bullet_speed", .. })
    ));
}

#[test]
fn init_state_rejects_negative_burst_spread() {
    let config = GameConfig {
        bat_burst_spread: -40.0,
        ..GameConfig::default()
    };
    let result = init_state(config, open_map(), "Tester", Skin::Veronica);
    assert!(matches!(
        result,
        Err(GameError::InvalidConfig { name: "bat_burst_spread", .. })
    ));
}

#[test]
fn zero_burst_spread_stacks_bats_on_the_point() {
    let config = GameConfig {
        bat_burst_spread: 0.0,
        ..GameConfig::default()
    };
    let mut w = init_state(config, open_map(), "Tester", Skin::Veronica).unwrap();
    let mut rng = seeded_rng();
    let point = Vec2::new(200.0, 200.0);
    let n = try_spawn(&mut w, EnemyKind::Bat, point, &mut rng);
    assert!(n >= 2);
    assert!(w.enemies.iter().all(|e| (e.center() - point).length() < 1e-3));
}

#[test]
fn spawn_points_fall_back_when_all_too_close() {
    let mut map = open_map();
    map.enemy_spawns = vec![Vec2::new(2100.0, 2000.0), Vec2::new(2000.0, 2300.0)];
    let w = init_state(GameConfig::default(), map, "Tester", Skin::Veronica).unwrap();
    assert_eq!(w.spawn_points, FALLBACK_SPAWN_POINTS.to_vec());
}

#[test]
fn reset_clears_the_round() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.enemies.push(enemy_at(&w, EnemyKind::Bat, Vec2::new(3000.0, 3000.0)));
    tick(&mut w, &fire_right(), 0.5, &mut rng);
    w.player.health = 50.0;
    w.difficulty = 3;
    w.player.skin = Skin::Santiago;

    reset(&mut w);
    assert!(w.enemies.is_empty() && w.bullets.is_empty() && w.drops.is_empty());
    assert_eq!(w.score, 0.0);
    assert_eq!(w.difficulty, 0);
    assert_eq!(w.player.health, 200.0);
    assert_eq!(w.player.light_charge, 100.0);
    assert_eq!(w.player.skin, Skin::Santiago);
    assert!(w.countdown.is_active());
    assert!(w.fog_active);
    assert_eq!(w.status, GameStatus::Playing);
}

// ── tick: countdown ───────────────────────────────────────────────────────────

#[test]
fn countdown_suspends_spawning_score_and_light() {
    let mut w = make_world();
    let mut rng = seeded_rng();
    let mut finished = 0;
    for _ in 0..4 {
        let events = tick(&mut w, &idle(), 0.5, &mut rng);
        finished += count(&events, |e| *e == FrameEvent::CountdownFinished);
    }
    assert_eq!(finished, 1);
    assert!(w.enemies.is_empty());
    assert_eq!(w.score, 0.0);
    assert_eq!(w.player.light_charge, 100.0);
    assert_eq!(w.player.light.remaining(), 30.0);

    tick(&mut w, &idle(), 0.4, &mut rng);
    assert!(!w.enemies.is_empty());
    assert!((w.score - 4.0).abs() < 1e-3);
}

#[test]
fn countdown_suspends_contact_damage() {
    let mut w = make_world();
    let mut rng = seeded_rng();
    let skeleton = enemy_at(&w, EnemyKind::Skeleton, SPAWN);
    w.enemies.push(skeleton);
    let events = tick(&mut w, &idle(), 0.1, &mut rng);
    assert_eq!(w.player.health, 200.0);
    assert_eq!(count(&events, |e| matches!(e, FrameEvent::PlayerHit { .. })), 0);
}

// ── tick: weapon ──────────────────────────────────────────────────────────────

#[test]
fn fire_spawns_bullet_at_muzzle() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let events = tick(&mut w, &fire_right(), 0.01, &mut rng);
    assert!(events.contains(&FrameEvent::ShotFired));
    assert_eq!(w.bullets.len(), 1);
    let b = &w.bullets[0];
    assert_eq!(b.direction, Vec2::X);
    // 60 px muzzle offset, then one frame of travel at 1200 px/s
    assert!((b.rect.center().x - 2072.0).abs() < 1e-3);
    assert!((b.rect.center().y - 2000.0).abs() < 1e-3);
}

#[test]
fn weapon_cooldown_limits_fire_rate() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    tick(&mut w, &fire_right(), 0.01, &mut rng);
    let events = tick(&mut w, &fire_right(), 0.01, &mut rng);
    assert!(!events.contains(&FrameEvent::ShotFired));
    assert_eq!(w.bullets.len(), 1);

    tick(&mut w, &fire_right(), 0.1, &mut rng);
    assert_eq!(w.bullets.len(), 2);
}

#[test]
fn zero_aim_keeps_previous_direction() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let input = InputSnapshot {
        fire: true,
        aim: Vec2::ZERO,
        ..Default::default()
    };
    tick(&mut w, &input, 0.01, &mut rng);
    assert_eq!(w.aim, Vec2::Y);
    assert_eq!(w.bullets[0].direction, Vec2::Y);
}

#[test]
fn bullets_expire_after_lifetime() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    tick(&mut w, &fire_right(), 0.01, &mut rng);
    tick(&mut w, &idle(), 0.5, &mut rng);
    assert_eq!(w.bullets.len(), 1);
    tick(&mut w, &idle(), 0.5, &mut rng);
    assert!(w.bullets.is_empty());
}

#[test]
fn bullet_carries_only_motion_and_lifetime() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.bullets.push(Bullet {
        rect: Rect::from_center(SPAWN, Vec2::new(16.0, 16.0)),
        direction: Vec2::NEG_Y,
        speed: 100.0,
        lifetime: Countdown::new(0.3),
    });
    tick(&mut w, &idle(), 0.2, &mut rng);
    assert_eq!(w.bullets.len(), 1);
    assert!((w.bullets[0].rect.center().y - 1980.0).abs() < 1e-3);
    tick(&mut w, &idle(), 0.1, &mut rng);
    assert!(w.bullets.is_empty());
}

// ── tick: bullet × enemy ──────────────────────────────────────────────────────

#[test]
fn bullet_damages_only_the_first_enemy() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let at = SPAWN + Vec2::new(200.0, 0.0);
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, at));
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, at));

    let events = tick(&mut w, &fire_right(), 0.1, &mut rng);
    assert_eq!(count(&events, |e| matches!(e, FrameEvent::BulletHit { .. })), 1);
    assert_eq!(w.enemies[0].health, 90.0);
    assert_eq!(w.enemies[1].health, 100.0);
    assert!(w.bullets.is_empty());
}

#[test]
fn skeleton_killed_scored_and_removed() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, SPAWN + Vec2::new(400.0, 0.0)));

    let mut all_events = Vec::new();
    for _ in 0..300 {
        all_events.extend(tick(&mut w, &fire_right(), 0.02, &mut rng));
        if w.kills.skeletons == 1 {
            break;
        }
    }
    assert_eq!(w.kills.skeletons, 1);
    assert_eq!(
        count(&all_events, |e| matches!(e, FrameEvent::BulletHit { kind: EnemyKind::Skeleton })),
        10
    );
    assert!(all_events.contains(&FrameEvent::EnemyKilled {
        kind: EnemyKind::Skeleton,
        bonus: 100
    }));
    assert!(!w.enemies[0].is_alive());
    assert!((w.score - (100.0 + 10.0 * w.clock)).abs() < 0.05);
    let spawned = count(&all_events, |e| matches!(e, FrameEvent::DropSpawned { .. }));
    assert!(spawned <= 1);
    assert_eq!(w.drops.len(), spawned);

    for _ in 0..5 {
        tick(&mut w, &idle(), 0.1, &mut rng);
    }
    assert!(w.enemies.is_empty());
}

#[test]
fn forced_loot_drops_at_enemy() {
    let mut w = quiet_world();
    let mut ghost = enemy_at(&w, EnemyKind::Ghost, SPAWN + Vec2::new(200.0, 0.0));
    ghost.health = 10.0;
    w.enemies.push(ghost);

    let mut always = StepRng::new(0, 0);
    let events = tick(&mut w, &fire_right(), 0.1, &mut always);
    assert_eq!(w.kills.ghosts, 1);
    assert_eq!(w.drops.len(), 1);
    assert_eq!(w.drops[0].kind, DropKind::Health);
    assert!((w.drops[0].rect.center() - w.enemies[0].center()).length() < 1e-2);
    assert_eq!(count(&events, |e| matches!(e, FrameEvent::DropSpawned { .. })), 1);
}

#[test]
fn no_loot_when_roll_fails() {
    let mut w = quiet_world();
    let mut ghost = enemy_at(&w, EnemyKind::Ghost, SPAWN + Vec2::new(200.0, 0.0));
    ghost.health = 10.0;
    w.enemies.push(ghost);

    let mut never = StepRng::new(u64::MAX, 0);
    tick(&mut w, &fire_right(), 0.1, &mut never);
    assert_eq!(w.kills.ghosts, 1);
    assert!(w.drops.is_empty());
}

// ── tick: player × enemy ──────────────────────────────────────────────────────

#[test]
fn contact_deals_scaled_damage() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, SPAWN));
    let events = tick(&mut w, &idle(), 0.01, &mut rng);
    assert!((w.player.health - 170.0).abs() < 1e-3);
    assert_eq!(count(&events, |e| matches!(e, FrameEvent::PlayerHit { .. })), 1);
}

#[test]
fn invulnerability_absorbs_overlapping_hits() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let mut a = enemy_at(&w, EnemyKind::Skeleton, SPAWN);
    let mut b = enemy_at(&w, EnemyKind::Skeleton, SPAWN);
    a.damage = 40.0;
    b.damage = 40.0;
    w.enemies.push(a);
    w.enemies.push(b);

    tick(&mut w, &idle(), 0.1, &mut rng);
    for _ in 0..3 {
        tick(&mut w, &idle(), 0.1, &mut rng);
    }
    assert_eq!(w.player.health, 160.0);

    tick(&mut w, &idle(), 0.3, &mut rng);
    assert_eq!(w.player.health, 120.0);
}

#[test]
fn dying_enemy_is_harmless() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let mut e = enemy_at(&w, EnemyKind::Skeleton, SPAWN);
    e.take_damage(1000.0, 0.0, 0.4);
    w.enemies.push(e);
    tick(&mut w, &idle(), 0.01, &mut rng);
    assert_eq!(w.player.health, 200.0);
}

#[test]
fn health_drop_collected_in_tick() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.player.health = 100.0;
    w.drops.push(Drop {
        rect: Rect::from_center(SPAWN, Vec2::new(60.0, 60.0)),
        kind: DropKind::Health,
    });
    let events = tick(&mut w, &idle(), 0.01, &mut rng);
    assert_eq!(w.player.health, 140.0);
    assert!(w.drops.is_empty());
    assert!(events.contains(&FrameEvent::DropCollected {
        kind: DropKind::Health
    }));
}

// ── tick: game over ───────────────────────────────────────────────────────────

#[test]
fn game_over_fires_once_and_freezes_world() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.player.health = 10.0;
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, SPAWN));

    let events = tick(&mut w, &idle(), 0.01, &mut rng);
    assert_eq!(w.status, GameStatus::GameOver);
    assert_eq!(w.player.health, 0.0);
    assert_eq!(count(&events, |e| matches!(e, FrameEvent::GameOver { .. })), 1);

    let clock = w.clock;
    let score = w.score;
    let center = w.enemies[0].center();
    for _ in 0..10 {
        let later = tick(&mut w, &fire_right(), 0.1, &mut rng);
        assert!(later.is_empty());
    }
    assert_eq!(w.clock, clock);
    assert_eq!(w.score, score);
    assert_eq!(w.enemies[0].center(), center);
    assert!(w.bullets.is_empty());
}

// ── tick: score, difficulty, fog, pause ───────────────────────────────────────

#[test]
fn score_accrues_with_time() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    tick(&mut w, &idle(), 0.5, &mut rng);
    tick(&mut w, &idle(), 0.5, &mut rng);
    assert_eq!(final_score(&w), 10);
}

#[test]
fn difficulty_rises_without_rescaling_existing_enemies() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.enemies.push(enemy_at(&w, EnemyKind::Skeleton, Vec2::new(3500.0, 2000.0)));
    w.difficulty_timer = Countdown::new(0.5);

    let events = tick(&mut w, &idle(), 0.5, &mut rng);
    assert_eq!(w.difficulty, 1);
    assert!(events.contains(&FrameEvent::DifficultyRaised { level: 1 }));
    assert_eq!(w.enemies[0].speed, 140.0);

    try_spawn(&mut w, EnemyKind::Skeleton, Vec2::new(3000.0, 3000.0), &mut rng);
    assert!((w.enemies[1].speed - 154.0).abs() < 1e-3);
}

#[test]
fn fog_alternates() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    assert!(w.fog_active);
    tick(&mut w, &idle(), 5.0, &mut rng);
    assert!(!w.fog_active);
    tick(&mut w, &idle(), 3.0, &mut rng);
    assert!(w.fog_active);
}

#[test]
fn paused_world_does_not_advance() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    toggle_pause(&mut w);
    assert_eq!(w.status, GameStatus::Paused);
    let events = tick(&mut w, &fire_right(), 1.0, &mut rng);
    assert!(events.is_empty());
    assert_eq!(w.clock, 0.0);
    toggle_pause(&mut w);
    assert_eq!(w.status, GameStatus::Playing);
}

#[test]
fn pause_does_not_resume_finished_round() {
    let mut w = quiet_world();
    w.status = GameStatus::GameOver;
    toggle_pause(&mut w);
    assert_eq!(w.status, GameStatus::GameOver);
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawn_cap_per_archetype() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let point = Vec2::new(200.0, 200.0);
    for _ in 0..5 {
        assert_eq!(try_spawn(&mut w, EnemyKind::Ghost, point, &mut rng), 1);
    }
    assert_eq!(try_spawn(&mut w, EnemyKind::Ghost, point, &mut rng), 0);
    assert_eq!(active_count(&w, EnemyKind::Ghost), 5);
    // Other archetypes have their own cap
    assert_eq!(try_spawn(&mut w, EnemyKind::Skeleton, point, &mut rng), 1);
}

#[test]
fn dying_enemies_still_count_toward_cap() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let point = Vec2::new(200.0, 200.0);
    for _ in 0..5 {
        try_spawn(&mut w, EnemyKind::Skeleton, point, &mut rng);
    }
    w.enemies[0].take_damage(1000.0, 0.0, 0.4);
    assert_eq!(try_spawn(&mut w, EnemyKind::Skeleton, point, &mut rng), 0);
}

#[test]
fn bat_bursts_are_trimmed_to_cap() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let point = Vec2::new(200.0, 200.0);
    let first = try_spawn(&mut w, EnemyKind::Bat, point, &mut rng);
    assert!((2..=4).contains(&first));
    for _ in 0..10 {
        let n = try_spawn(&mut w, EnemyKind::Bat, point, &mut rng);
        assert!(n <= 4);
        assert!(active_count(&w, EnemyKind::Bat) <= 5);
    }
    assert_eq!(active_count(&w, EnemyKind::Bat), 5);
    for bat in &w.enemies {
        let offset = bat.center() - point;
        assert!(offset.x.abs() <= 40.0 + 1e-3 && offset.y.abs() <= 40.0 + 1e-3);
    }
}

#[test]
fn single_bat_when_burst_disabled() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    w.config.bat_burst = false;
    let point = Vec2::new(200.0, 200.0);
    assert_eq!(try_spawn(&mut w, EnemyKind::Bat, point, &mut rng), 1);
    assert_eq!(w.enemies[0].center(), point);
}

#[test]
fn spawn_wave_uses_eligible_points() {
    let mut w = quiet_world();
    let mut rng = seeded_rng();
    let spawned = spawn_wave(&mut w, &mut rng);
    assert!(spawned >= 1);
    for e in &w.enemies {
        let near = w
            .spawn_points
            .iter()
            .any(|p| (e.center() - *p).abs().max_element() <= 40.0 + 1e-3);
        assert!(near);
    }
}

#[test]
fn caps_and_score_hold_over_a_long_run() {
    let mut w = make_world();
    let mut rng = seeded_rng();
    for _ in 0..400 {
        let before = w.score;
        tick(&mut w, &idle(), 0.05, &mut rng);
        assert!(w.score >= before);
        for kind in EnemyKind::ALL {
            assert!(active_count(&w, kind) <= 5);
        }
    }
}
