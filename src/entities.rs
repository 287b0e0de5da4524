/// All game entity types, pure data.  Behaviour lives in `player`, `enemy`
/// and `compute`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::geometry::Rect;
use crate::map::MapLayout;
use crate::timer::Countdown;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Ghost,
    Bat,
    Skeleton,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Ghost, EnemyKind::Bat, EnemyKind::Skeleton];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    Health,
    Battery,
}

/// Cosmetic only; nothing in the simulation reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Skin {
    #[default]
    Veronica,
    Santiago,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Paused,
    GameOver,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    /// Collision box; its centre is the player's position.
    pub hitbox: Rect,
    /// Full sprite box, kept centred on the hitbox.
    pub sprite_size: Vec2,
    /// Unit vector or zero.
    pub direction: Vec2,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub invulnerability: Countdown,
    pub light: Countdown,
    pub light_radius: f32,
    /// Percent, `[0, 100]`.
    pub light_charge: f32,
    pub skin: Skin,
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum EnemyState {
    Alive,
    /// Visual-only: no movement, no damage dealt or taken.
    Dying { died_at: f32, remaining: Countdown },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hitbox: Rect,
    pub sprite_size: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    /// Absolute hit points dealt to the player per contact.
    pub damage: f32,
    pub health: f32,
    pub max_health: f32,
    pub state: EnemyState,
}

// ── Projectiles & pickups ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub rect: Rect,
    /// Set at creation, never changes.
    pub direction: Vec2,
    pub speed: f32,
    pub lifetime: Countdown,
}

#[derive(Clone, Debug)]
pub struct Drop {
    pub rect: Rect,
    pub kind: DropKind,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Per-kind defeated counters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KillTally {
    pub ghosts: u32,
    pub bats: u32,
    pub skeletons: u32,
}

impl KillTally {
    pub fn total(&self) -> u32 {
        self.ghosts + self.bats + self.skeletons
    }
}

/// The entire simulation state for one round.
#[derive(Clone, Debug)]
pub struct World {
    pub config: GameConfig,
    /// Static geometry; every collision query borrows `map.obstacles`.
    pub map: MapLayout,
    /// Enemy spawn points left after distance filtering at reset.
    pub spawn_points: Vec<Vec2>,
    pub player: Player,
    pub player_name: String,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub drops: Vec<Drop>,
    pub difficulty: u32,
    pub score: f32,
    pub kills: KillTally,
    pub status: GameStatus,
    /// Seconds of simulated time since the round was (re)started.
    pub clock: f32,
    /// While active: no spawning, no damage, no light drain, no score.
    pub countdown: Countdown,
    pub weapon_cooldown: Countdown,
    /// Unit vector the gun points along.
    pub aim: Vec2,
    pub spawn_timer: Countdown,
    pub difficulty_timer: Countdown,
    pub fog_active: bool,
    pub fog_timer: Countdown,
}
