//! Enemy archetypes, pursuit steering and the alive → dying → removed
//! lifecycle.

use glam::Vec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{DropKind, Enemy, EnemyKind, EnemyState};
use crate::geometry::{move_and_collide, Rect};
use crate::timer::Countdown;

// ── Archetype table ──────────────────────────────────────────────────────────

/// Static per-archetype stats, looked up once at spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub base_speed: f32,
    /// Fraction of the player's max health dealt per contact at difficulty 0.
    pub base_damage_percent: f32,
    /// Upper bound on the scaled damage fraction.
    pub max_damage_percent: f32,
    pub max_health: f32,
    pub collides_with_obstacles: bool,
    /// Score awarded on death.
    pub bonus: u32,
}

const GHOST: EnemyStats = EnemyStats {
    base_speed: 180.0,
    base_damage_percent: 0.10,
    max_damage_percent: 0.20,
    max_health: 30.0,
    collides_with_obstacles: false,
    bonus: 50,
};

const BAT: EnemyStats = EnemyStats {
    base_speed: 260.0,
    base_damage_percent: 0.05,
    max_damage_percent: 0.12,
    max_health: 20.0,
    collides_with_obstacles: true,
    bonus: 20,
};

const SKELETON: EnemyStats = EnemyStats {
    base_speed: 140.0,
    base_damage_percent: 0.15,
    max_damage_percent: 0.30,
    max_health: 100.0,
    collides_with_obstacles: true,
    bonus: 100,
};

impl EnemyKind {
    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Ghost => &GHOST,
            EnemyKind::Bat => &BAT,
            EnemyKind::Skeleton => &SKELETON,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnemyKind::Ghost => "ghost",
            EnemyKind::Bat => "bat",
            EnemyKind::Skeleton => "skeleton",
        }
    }
}

// ── Difficulty scaling ───────────────────────────────────────────────────────

/// Damage fraction at `difficulty`, never above the archetype cap.
pub fn damage_percent(kind: EnemyKind, difficulty: u32) -> f32 {
    let stats = kind.stats();
    (stats.base_damage_percent * (1.0 + 0.03 * difficulty as f32)).min(stats.max_damage_percent)
}

pub fn scaled_speed(kind: EnemyKind, difficulty: u32) -> f32 {
    kind.stats().base_speed * (1.0 + 0.1 * difficulty as f32)
}

/// Chance that a dying enemy leaves a drop; floored at 10%.
pub fn drop_probability(difficulty: u32) -> f64 {
    (0.7 - 0.05 * difficulty as f64).max(0.1)
}

/// Roll loot for one death: at most one drop, health or battery 50/50.
pub fn roll_loot(difficulty: u32, rng: &mut impl Rng) -> Option<DropKind> {
    if !rng.gen_bool(drop_probability(difficulty)) {
        return None;
    }
    if rng.gen_bool(0.5) {
        Some(DropKind::Health)
    } else {
        Some(DropKind::Battery)
    }
}

// ── Behaviour ────────────────────────────────────────────────────────────────

impl Enemy {
    /// Build an enemy centred on `center`.  Speed and damage are fixed here
    /// from the current difficulty and never rescaled afterwards.
    pub fn spawn(
        kind: EnemyKind,
        center: Vec2,
        difficulty: u32,
        player_max_health: f32,
        config: &GameConfig,
    ) -> Self {
        let stats = kind.stats();
        let sprite = Rect::from_center(center, config.enemy_sprite_size);
        let hitbox = sprite.inflate(-config.enemy_hitbox_inset.x, -config.enemy_hitbox_inset.y);
        Self {
            kind,
            hitbox,
            sprite_size: config.enemy_sprite_size,
            direction: Vec2::ZERO,
            speed: scaled_speed(kind, difficulty),
            damage: damage_percent(kind, difficulty) * player_max_health,
            health: stats.max_health,
            max_health: stats.max_health,
            state: EnemyState::Alive,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    pub fn sprite_rect(&self) -> Rect {
        Rect::from_center(self.hitbox.center(), self.sprite_size)
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Steer straight at `target`, clipping against obstacles unless this
    /// archetype passes through them.
    pub fn move_toward(&mut self, target: Vec2, dt: f32, obstacles: &[Rect]) {
        if !self.is_alive() {
            return;
        }
        self.direction = (target - self.center()).normalize_or_zero();
        let displacement = self.direction * self.speed * dt;
        if self.kind.stats().collides_with_obstacles {
            move_and_collide(&mut self.hitbox, displacement, obstacles);
        } else {
            self.hitbox.x += displacement.x;
            self.hitbox.y += displacement.y;
        }
    }

    /// Returns `true` when this hit moved the enemy into its dying state.
    pub fn take_damage(&mut self, amount: f32, clock: f32, death_duration: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health <= 0.0 {
            self.state = EnemyState::Dying {
                died_at: clock,
                remaining: Countdown::new(death_duration),
            };
            return true;
        }
        false
    }

    /// Advance the death animation.  Returns `true` once it has elapsed and
    /// the enemy should be removed.
    pub fn tick_death(&mut self, dt: f32) -> bool {
        match &mut self.state {
            EnemyState::Alive => false,
            EnemyState::Dying { remaining, .. } => {
                remaining.tick(dt);
                !remaining.is_active()
            }
        }
    }
}
