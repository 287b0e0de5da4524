/// World setup and the per-frame simulation step.
///
/// Every public function takes the `World` explicitly and, where needed, an
/// RNG handle, so callers control determinism (tests use a seeded RNG).
///
/// Order of one [`tick`]:
/// 1. round-start countdown
/// 2. player (input, move, light, pickups, speed, invulnerability)
/// 3. weapon (aim, fire)
/// 4. enemies (pursuit, or death animation and removal)
/// 5. bullets (motion, expiry)
/// 6. bullet × enemy hits, deaths, loot
/// 7. player × enemy contact damage, game over
/// 8. score and difficulty
/// 9. spawning
/// 10. fog cycle

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::enemy::roll_loot;
use crate::entities::{
    Bullet, Drop, Enemy, EnemyKind, GameStatus, KillTally, Player, Skin, World,
};
use crate::error::GameResult;
use crate::events::FrameEvent;
use crate::geometry::Rect;
use crate::input::InputSnapshot;
use crate::map::MapLayout;
use crate::timer::Countdown;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a world ready to start its first round.  Invalid configuration or
/// map geometry is reported here, before anything is simulated.
pub fn init_state(
    config: GameConfig,
    map: MapLayout,
    player_name: impl Into<String>,
    skin: Skin,
) -> GameResult<World> {
    config.validate()?;
    map.validate()?;

    let player = Player::new(map.player_spawn, skin, &config);
    let mut world = World {
        spawn_points: Vec::new(),
        player,
        player_name: player_name.into(),
        enemies: Vec::new(),
        bullets: Vec::new(),
        drops: Vec::new(),
        difficulty: 0,
        score: 0.0,
        kills: KillTally::default(),
        status: GameStatus::Playing,
        clock: 0.0,
        countdown: Countdown::new(config.countdown_duration),
        weapon_cooldown: Countdown::idle(config.weapon_cooldown),
        aim: Vec2::Y,
        spawn_timer: Countdown::new(config.spawn_interval),
        difficulty_timer: Countdown::new(config.difficulty_interval),
        fog_active: true,
        fog_timer: Countdown::new(config.fog_active_duration),
        config,
        map,
    };
    reset(&mut world);
    Ok(world)
}

/// Start (or restart) a round: clear every collection, reset score,
/// difficulty and timers, and rebuild from the map.
pub fn reset(world: &mut World) {
    let config = &world.config;
    let skin = world.player.skin;

    world.player = Player::new(world.map.player_spawn, skin, config);
    world.player.reset_flashlight(config);
    world.enemies.clear();
    world.bullets.clear();
    world.drops.clear();
    world.spawn_points = world.map.eligible_spawn_points(config.min_spawn_distance);

    world.difficulty = 0;
    world.score = 0.0;
    world.kills = KillTally::default();
    world.status = GameStatus::Playing;
    world.clock = 0.0;
    world.aim = Vec2::Y;

    world.countdown = Countdown::new(config.countdown_duration);
    world.weapon_cooldown = Countdown::idle(config.weapon_cooldown);
    world.spawn_timer = Countdown::new(config.spawn_interval);
    world.difficulty_timer = Countdown::new(config.difficulty_interval);
    world.fog_active = true;
    world.fog_timer = Countdown::new(config.fog_active_duration);

    info!(
        player = %world.player_name,
        spawn_points = world.spawn_points.len(),
        "round started"
    );
}

/// Playing ↔ Paused.  A finished round stays finished.
pub fn toggle_pause(world: &mut World) {
    world.status = match world.status {
        GameStatus::Playing => GameStatus::Paused,
        GameStatus::Paused => GameStatus::Playing,
        GameStatus::GameOver => GameStatus::GameOver,
    };
}

/// Integer score handed to persistence.
pub fn final_score(world: &World) -> u32 {
    world.score.max(0.0).floor() as u32
}

pub fn active_count(world: &World, kind: EnemyKind) -> usize {
    world.enemies.iter().filter(|e| e.kind == kind).count()
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds.  Does nothing unless the round is
/// being played.
pub fn tick(
    world: &mut World,
    input: &InputSnapshot,
    dt: f32,
    rng: &mut impl Rng,
) -> Vec<FrameEvent> {
    let mut events = Vec::new();
    if world.status != GameStatus::Playing {
        return events;
    }
    let dt = dt.max(0.0);
    world.clock += dt;

    // ── 1. Round-start countdown ─────────────────────────────────────────────
    let countdown_active = world.countdown.is_active();
    if countdown_active && world.countdown.tick(dt) {
        debug!("countdown finished");
        events.push(FrameEvent::CountdownFinished);
    }

    // ── 2. Player ────────────────────────────────────────────────────────────
    let taken = world.player.update(
        input,
        dt,
        countdown_active,
        &world.map.obstacles,
        &mut world.drops,
        &world.config,
        rng,
    );
    events.extend(taken.into_iter().map(|kind| FrameEvent::DropCollected { kind }));

    // ── 3. Weapon ────────────────────────────────────────────────────────────
    fire_weapon(world, input, dt, &mut events);

    // ── 4-5. Enemies, bullets ────────────────────────────────────────────────
    advance_enemies(world, dt);
    advance_bullets(world, dt);

    // ── 6. Bullet ↔ enemy ────────────────────────────────────────────────────
    resolve_bullet_hits(world, rng, &mut events);

    // ── 7. Player ↔ enemy ────────────────────────────────────────────────────
    if !countdown_active {
        resolve_player_contacts(world, &mut events);
    }
    if world.player.is_dead() {
        world.status = GameStatus::GameOver;
        let score = final_score(world);
        info!(score, kills = world.kills.total(), difficulty = world.difficulty, "game over");
        events.push(FrameEvent::GameOver { score });
        return events;
    }

    // ── 8. Score & difficulty ────────────────────────────────────────────────
    if !countdown_active {
        world.score += world.config.score_per_second * dt;
        if world.difficulty_timer.tick(dt) {
            world.difficulty += 1;
            world.difficulty_timer.restart();
            info!(level = world.difficulty, "difficulty raised");
            events.push(FrameEvent::DifficultyRaised { level: world.difficulty });
        }
    }

    // ── 9. Spawning ──────────────────────────────────────────────────────────
    if !countdown_active && world.spawn_timer.tick(dt) {
        world.spawn_timer.restart();
        spawn_wave(world, rng);
    }

    // ── 10. Fog ──────────────────────────────────────────────────────────────
    if world.fog_timer.tick(dt) {
        world.fog_active = !world.fog_active;
        let next = if world.fog_active {
            world.config.fog_active_duration
        } else {
            world.config.fog_inactive_duration
        };
        world.fog_timer.restart_with(next);
    }

    events
}

// ── Weapon ───────────────────────────────────────────────────────────────────

fn fire_weapon(world: &mut World, input: &InputSnapshot, dt: f32, events: &mut Vec<FrameEvent>) {
    world.weapon_cooldown.tick(dt);

    // Pointer exactly on the player keeps the previous aim.
    let aim = input.aim.normalize_or_zero();
    if aim != Vec2::ZERO {
        world.aim = aim;
    }

    if !input.fire || world.weapon_cooldown.is_active() {
        return;
    }
    let config = &world.config;
    let origin = world.player.center() + world.aim * config.muzzle_offset;
    world.bullets.push(Bullet {
        rect: Rect::from_center(origin, config.bullet_size),
        direction: world.aim,
        speed: config.bullet_speed,
        lifetime: Countdown::new(config.bullet_lifetime),
    });
    world.weapon_cooldown.restart();
    events.push(FrameEvent::ShotFired);
}

// ── Movement ─────────────────────────────────────────────────────────────────

fn advance_enemies(world: &mut World, dt: f32) {
    let target = world.player.center();
    let obstacles = &world.map.obstacles;
    world.enemies.retain_mut(|enemy| {
        if enemy.is_alive() {
            enemy.move_toward(target, dt, obstacles);
            true
        } else {
            !enemy.tick_death(dt)
        }
    });
}

fn advance_bullets(world: &mut World, dt: f32) {
    world.bullets.retain_mut(|bullet| {
        let step = bullet.direction * bullet.speed * dt;
        bullet.rect.x += step.x;
        bullet.rect.y += step.y;
        bullet.lifetime.tick(dt);
        bullet.lifetime.is_active()
    });
}

// ── Collisions ───────────────────────────────────────────────────────────────

/// Each bullet damages at most one enemy: the first alive one, in collection
/// order, whose hitbox it overlaps.
fn resolve_bullet_hits(world: &mut World, rng: &mut impl Rng, events: &mut Vec<FrameEvent>) {
    let damage = world.config.bullet_damage;
    let death_duration = world.config.enemy_death_duration;
    let clock = world.clock;

    let mut spent: Vec<usize> = Vec::new();
    let mut deaths: Vec<(EnemyKind, Vec2)> = Vec::new();

    for (bi, bullet) in world.bullets.iter().enumerate() {
        let target = world
            .enemies
            .iter_mut()
            .find(|e| e.is_alive() && e.hitbox.overlaps(&bullet.rect));
        if let Some(enemy) = target {
            spent.push(bi);
            events.push(FrameEvent::BulletHit { kind: enemy.kind });
            if enemy.take_damage(damage, clock, death_duration) {
                deaths.push((enemy.kind, enemy.center()));
            }
        }
    }

    if !spent.is_empty() {
        world.bullets = std::mem::take(&mut world.bullets)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !spent.contains(i))
            .map(|(_, b)| b)
            .collect();
    }

    for (kind, at) in deaths {
        on_enemy_death(world, kind, at, rng, events);
    }
}

/// Award the kill bonus, bump the tally and roll for loot.
fn on_enemy_death(
    world: &mut World,
    kind: EnemyKind,
    at: Vec2,
    rng: &mut impl Rng,
    events: &mut Vec<FrameEvent>,
) {
    let bonus = kind.stats().bonus;
    world.score += bonus as f32;
    match kind {
        EnemyKind::Ghost => world.kills.ghosts += 1,
        EnemyKind::Bat => world.kills.bats += 1,
        EnemyKind::Skeleton => world.kills.skeletons += 1,
    }
    debug!(kind = kind.label(), bonus, "enemy killed");
    events.push(FrameEvent::EnemyKilled { kind, bonus });

    if let Some(drop_kind) = roll_loot(world.difficulty, rng) {
        world.drops.push(Drop {
            rect: Rect::from_center(at, world.config.drop_size),
            kind: drop_kind,
        });
        events.push(FrameEvent::DropSpawned { kind: drop_kind, at });
    }
}

/// Every alive enemy touching the player tries to hurt it; invulnerability
/// turns all but the first into no-ops.
fn resolve_player_contacts(world: &mut World, events: &mut Vec<FrameEvent>) {
    for enemy in world.enemies.iter().filter(|e| e.is_alive()) {
        if !enemy.hitbox.overlaps(&world.player.hitbox) {
            continue;
        }
        if world.player.take_damage(enemy.damage) {
            debug!(kind = enemy.kind.label(), damage = enemy.damage, "player hit");
            events.push(FrameEvent::PlayerHit {
                damage: enemy.damage,
                health: world.player.health,
            });
        }
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// One spawn attempt: uniform archetype, uniform spawn point.  Returns the
/// number of enemies created.
pub fn spawn_wave(world: &mut World, rng: &mut impl Rng) -> usize {
    if world.spawn_points.is_empty() {
        return 0;
    }
    let kind = EnemyKind::ALL[rng.gen_range(0..EnemyKind::ALL.len())];
    let point = world.spawn_points[rng.gen_range(0..world.spawn_points.len())];
    try_spawn(world, kind, point, rng)
}

/// Spawn `kind` at `point` unless that archetype is at its cap.  Bats may
/// arrive as a small burst clustered around the point; the burst is trimmed
/// to the remaining capacity.
pub fn try_spawn(world: &mut World, kind: EnemyKind, point: Vec2, rng: &mut impl Rng) -> usize {
    let config = &world.config;
    let active = active_count(world, kind);
    let cap = config.max_enemies_per_type;
    if active >= cap {
        debug!(kind = kind.label(), active, "spawn skipped, archetype at cap");
        return 0;
    }

    let burst = kind == EnemyKind::Bat && config.bat_burst;
    let wanted = if burst {
        rng.gen_range(config.bat_burst_min..=config.bat_burst_max)
    } else {
        1
    };
    let count = wanted.min(cap - active);

    for _ in 0..count {
        let offset = if burst {
            let s = config.bat_burst_spread;
            Vec2::new(rng.gen_range(-s..=s), rng.gen_range(-s..=s))
        } else {
            Vec2::ZERO
        };
        let enemy = Enemy::spawn(
            kind,
            point + offset,
            world.difficulty,
            world.player.max_health,
            config,
        );
        world.enemies.push(enemy);
    }
    debug!(kind = kind.label(), count, x = point.x, y = point.y, "spawned");
    count
}
