//! Read-only view of the world handed to the renderer once per frame.
//!
//! The camera keeps the player centred.  Sprites are split into a ground
//! layer (floor patches, drawn first) and an object layer holding everything
//! else, each sorted by world-space centre Y so lower sprites overlap higher
//! ones.

use glam::Vec2;

use crate::entities::{DropKind, EnemyKind, GameStatus, Skin, World};
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteKind {
    Player(Skin),
    Enemy(EnemyKind),
    Bullet,
    Drop(DropKind),
    Obstacle,
    Ground,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteView {
    pub kind: SpriteKind,
    /// Screen-space box (world box shifted by the camera offset).
    pub rect: Rect,
    /// World-space centre Y, the depth sort key.
    pub depth: f32,
    pub is_ground: bool,
    /// Dying enemies are drawn as a flat silhouette.
    pub silhouette: bool,
    /// Health fraction for an overlay bar; only living enemies carry one.
    pub health_bar: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudView {
    pub health_ratio: f32,
    pub light_charge_ratio: f32,
    pub light_radius: f32,
    pub score: u32,
    pub difficulty: u32,
    pub kills: u32,
    /// Seconds left before the round starts, while counting down.
    pub countdown_secs: Option<f32>,
    pub fog_active: bool,
    pub status: GameStatus,
    pub aim: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    pub camera_offset: Vec2,
    pub viewport: Vec2,
    pub ground: Vec<SpriteView>,
    pub objects: Vec<SpriteView>,
    pub hud: HudView,
}

impl RenderSnapshot {
    /// Draw order: ground layer, then objects.
    pub fn layers(&self) -> impl Iterator<Item = &SpriteView> {
        self.ground.iter().chain(self.objects.iter())
    }
}

pub fn build(world: &World, viewport: Vec2) -> RenderSnapshot {
    let camera_offset = viewport / 2.0 - world.player.center();
    let screen = Rect::new(0.0, 0.0, viewport.x, viewport.y);

    let view = |kind: SpriteKind, world_rect: Rect, is_ground: bool| SpriteView {
        kind,
        rect: Rect::new(
            world_rect.x + camera_offset.x,
            world_rect.y + camera_offset.y,
            world_rect.w,
            world_rect.h,
        ),
        depth: world_rect.center().y,
        is_ground,
        silhouette: false,
        health_bar: None,
    };

    let mut ground = Vec::new();
    let mut objects = Vec::new();

    for patch in &world.map.ground {
        ground.push(view(SpriteKind::Ground, *patch, true));
    }
    for drop in &world.drops {
        objects.push(view(SpriteKind::Drop(drop.kind), drop.rect, false));
    }
    for obstacle in &world.map.obstacles {
        objects.push(view(SpriteKind::Obstacle, *obstacle, false));
    }
    for enemy in &world.enemies {
        let alive = enemy.is_alive();
        objects.push(SpriteView {
            silhouette: !alive,
            health_bar: alive.then(|| enemy.health_ratio()),
            ..view(SpriteKind::Enemy(enemy.kind), enemy.sprite_rect(), false)
        });
    }
    for bullet in &world.bullets {
        objects.push(view(SpriteKind::Bullet, bullet.rect, false));
    }
    objects.push(view(
        SpriteKind::Player(world.player.skin),
        world.player.sprite_rect(),
        false,
    ));

    ground.retain(|s| s.rect.overlaps(&screen));
    objects.retain(|s| s.rect.overlaps(&screen));
    ground.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    objects.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    let hud = HudView {
        health_ratio: world.player.health_ratio(),
        light_charge_ratio: (world.player.light_charge / 100.0).clamp(0.0, 1.0),
        light_radius: world.player.light_radius,
        score: crate::compute::final_score(world),
        difficulty: world.difficulty,
        kills: world.kills.total(),
        countdown_secs: world
            .countdown
            .is_active()
            .then(|| world.countdown.remaining()),
        fog_active: world.fog_active,
        status: world.status,
        aim: world.aim,
    };

    RenderSnapshot {
        camera_offset,
        viewport,
        ground,
        objects,
        hud,
    }
}
