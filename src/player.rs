//! Player behaviour: movement, flashlight, pickups and damage.
//!
//! Per-frame order inside [`Player::update`]:
//! input → move → update_light → collect_drops → speed tier → invulnerability.
//! Because pickups are collected after the light update, a battery grabbed
//! this frame does not lift the speed penalty until the next frame.

use glam::Vec2;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Drop, DropKind, Player, Skin};
use crate::geometry::{move_and_collide, Rect};
use crate::input::InputSnapshot;
use crate::timer::Countdown;

impl Player {
    /// Place a fresh player centred on `spawn` with full health and light.
    pub fn new(spawn: Vec2, skin: Skin, config: &GameConfig) -> Self {
        let sprite = Rect::from_center(spawn, config.player_sprite_size);
        let hitbox = sprite.inflate(-config.player_hitbox_inset.x, -config.player_hitbox_inset.y);
        Self {
            hitbox,
            sprite_size: config.player_sprite_size,
            direction: Vec2::ZERO,
            speed: config.player_normal_speed,
            health: config.player_max_health,
            max_health: config.player_max_health,
            invulnerability: Countdown::idle(config.invulnerability_duration),
            light: Countdown::new(config.light_duration),
            light_radius: config.light_max_radius,
            light_charge: 100.0,
            skin,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    /// Visual box, used by the render boundary.
    pub fn sprite_rect(&self) -> Rect {
        Rect::from_center(self.hitbox.center(), self.sprite_size)
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn handle_input(&mut self, input: &InputSnapshot) -> Vec2 {
        self.direction = input.direction();
        self.direction
    }

    pub fn move_by(&mut self, dt: f32, obstacles: &[Rect]) {
        let displacement = self.direction * self.speed * dt;
        move_and_collide(&mut self.hitbox, displacement, obstacles);
    }

    /// Drain the flashlight and derive radius/charge.  While the round-start
    /// countdown runs the light is held at full charge.
    pub fn update_light(
        &mut self,
        dt: f32,
        countdown_active: bool,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) {
        if countdown_active {
            self.reset_flashlight(config);
            return;
        }
        if !self.light.is_active() {
            self.light_radius = 0.0;
            self.light_charge = 0.0;
            return;
        }

        self.light.tick(dt);
        if !self.light.is_active() {
            self.light_radius = 0.0;
            self.light_charge = 0.0;
            return;
        }

        let ratio = self.light.remaining() / self.light.duration();
        let base = (ratio * config.light_max_radius).max(config.light_min_radius);
        self.light_charge = (ratio * 100.0).clamp(0.0, 100.0);

        if base <= config.light_flicker_threshold {
            let amplitude = config.light_flicker_amount * base;
            let flicker = if amplitude > 0.0 {
                rng.gen_range(-amplitude..=amplitude)
            } else {
                0.0
            };
            self.light_radius = (base + flicker).min(base).max(config.light_min_radius);
        } else {
            self.light_radius = base;
        }
    }

    /// Consume every drop overlapping the hitbox.  Returns the kinds taken.
    pub fn collect_drops(&mut self, drops: &mut Vec<Drop>, config: &GameConfig) -> Vec<DropKind> {
        let mut taken = Vec::new();
        let hitbox = self.hitbox;
        drops.retain(|drop| {
            if drop.rect.overlaps(&hitbox) {
                taken.push(drop.kind);
                false
            } else {
                true
            }
        });
        for kind in &taken {
            match kind {
                DropKind::Health => self.heal(config.health_drop_heal * self.max_health),
                // Timer only: radius and charge follow on the next light update.
                DropKind::Battery => self.light.restart(),
            }
        }
        taken
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).min(self.max_health);
    }

    /// Apply `amount` unless invulnerable.  Returns `true` if damage landed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.invulnerability.is_active() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        self.invulnerability.restart();
        true
    }

    pub fn reset_flashlight(&mut self, config: &GameConfig) {
        self.light.restart();
        self.light_radius = config.light_max_radius;
        self.light_charge = 100.0;
    }

    /// Two tiers only: slowed when the light is fully off.
    pub fn derive_speed(&mut self, config: &GameConfig) {
        self.speed = if self.light_radius == 0.0 {
            config.player_slow_speed
        } else {
            config.player_normal_speed
        };
    }

    /// Full per-frame player update.  Returns the drops collected.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        countdown_active: bool,
        obstacles: &[Rect],
        drops: &mut Vec<Drop>,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Vec<DropKind> {
        self.handle_input(input);
        self.move_by(dt, obstacles);
        self.update_light(dt, countdown_active, config, rng);
        let taken = self.collect_drops(drops, config);
        self.derive_speed(config);
        self.invulnerability.tick(dt);
        taken
    }
}
