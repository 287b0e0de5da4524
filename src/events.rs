//! Notifications produced by one simulation step.
//!
//! Collaborators (audio, persistence, logging) consume these after `tick`
//! returns; the core never waits on them.

use glam::Vec2;

use crate::entities::{DropKind, EnemyKind};

#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    ShotFired,
    /// A bullet struck an enemy (impact sound cue).
    BulletHit { kind: EnemyKind },
    EnemyKilled { kind: EnemyKind, bonus: u32 },
    DropSpawned { kind: DropKind, at: Vec2 },
    DropCollected { kind: DropKind },
    PlayerHit { damage: f32, health: f32 },
    DifficultyRaised { level: u32 },
    CountdownFinished,
    /// Emitted exactly once per round; carries the score to persist.
    GameOver { score: u32 },
}
