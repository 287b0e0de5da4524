//! Runtime gameplay configuration, optionally loaded from a TOML file.
//!
//! [`GameConfig::default`] is the authoritative source of every tuning value.
//! A TOML file may override any subset of fields; missing keys keep their
//! defaults.  Durations are seconds, speeds are pixels per second, sizes are
//! pixels.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use tracing::info;

use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Player ───────────────────────────────────────────────────────────────
    pub player_max_health: f32,
    pub player_normal_speed: f32,
    pub player_slow_speed: f32,
    pub player_sprite_size: Vec2,
    /// Shrink applied to the sprite box to get the collision hitbox.
    pub player_hitbox_inset: Vec2,
    pub invulnerability_duration: f32,
    /// Fraction of max health restored by a health drop.
    pub health_drop_heal: f32,

    // ── Flashlight ───────────────────────────────────────────────────────────
    pub light_duration: f32,
    pub light_max_radius: f32,
    pub light_min_radius: f32,
    pub light_flicker_threshold: f32,
    /// Flicker amplitude as a fraction of the base radius.
    pub light_flicker_amount: f32,

    // ── Weapon ───────────────────────────────────────────────────────────────
    pub weapon_cooldown: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub bullet_damage: f32,
    pub bullet_size: Vec2,
    /// Distance from the player centre at which bullets appear.
    pub muzzle_offset: f32,

    // ── Enemies ──────────────────────────────────────────────────────────────
    pub enemy_sprite_size: Vec2,
    pub enemy_hitbox_inset: Vec2,
    pub enemy_death_duration: f32,

    // ── Spawn policy ─────────────────────────────────────────────────────────
    pub spawn_interval: f32,
    pub max_enemies_per_type: usize,
    /// Spawn points closer than this to the player spawn are discarded.
    pub min_spawn_distance: f32,
    pub bat_burst: bool,
    pub bat_burst_min: usize,
    pub bat_burst_max: usize,
    pub bat_burst_spread: f32,

    // ── Drops ────────────────────────────────────────────────────────────────
    pub drop_size: Vec2,

    // ── Round pacing ─────────────────────────────────────────────────────────
    pub countdown_duration: f32,
    pub difficulty_interval: f32,
    pub score_per_second: f32,
    pub fog_active_duration: f32,
    pub fog_inactive_duration: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_max_health: 200.0,
            player_normal_speed: 500.0,
            player_slow_speed: 250.0,
            player_sprite_size: Vec2::new(100.0, 100.0),
            player_hitbox_inset: Vec2::new(60.0, 60.0),
            invulnerability_duration: 0.5,
            health_drop_heal: 0.2,

            light_duration: 30.0,
            light_max_radius: 150.0,
            light_min_radius: 50.0,
            light_flicker_threshold: 90.0,
            light_flicker_amount: 0.1,

            weapon_cooldown: 0.1,
            bullet_speed: 1200.0,
            bullet_lifetime: 1.0,
            bullet_damage: 10.0,
            bullet_size: Vec2::new(16.0, 16.0),
            muzzle_offset: 60.0,

            enemy_sprite_size: Vec2::new(80.0, 100.0),
            enemy_hitbox_inset: Vec2::new(20.0, 40.0),
            enemy_death_duration: 0.4,

            spawn_interval: 0.4,
            max_enemies_per_type: 5,
            min_spawn_distance: 500.0,
            bat_burst: true,
            bat_burst_min: 2,
            bat_burst_max: 4,
            bat_burst_spread: 40.0,

            drop_size: Vec2::new(60.0, 60.0),

            countdown_duration: 2.0,
            difficulty_interval: 180.0,
            score_per_second: 10.0,
            fog_active_duration: 5.0,
            fog_inactive_duration: 3.0,
        }
    }
}

impl GameConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    /// A file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no config file, using compiled defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> GameResult<Self> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or break the simulation.
    pub fn validate(&self) -> GameResult<()> {
        let sizes: [(&'static str, Vec2); 6] = [
            ("player_sprite_size", self.player_sprite_size),
            ("player_hitbox_inset", self.player_hitbox_inset),
            ("bullet_size", self.bullet_size),
            ("enemy_sprite_size", self.enemy_sprite_size),
            ("enemy_hitbox_inset", self.enemy_hitbox_inset),
            ("drop_size", self.drop_size),
        ];
        for (name, size) in sizes {
            for value in [size.x, size.y] {
                if !value.is_finite() || value < 0.0 {
                    return Err(GameError::InvalidConfig {
                        name,
                        value,
                        reason: "must be finite and >= 0",
                    });
                }
            }
        }

        let positive: [(&'static str, f32); 12] = [
            ("player_max_health", self.player_max_health),
            ("player_normal_speed", self.player_normal_speed),
            ("player_slow_speed", self.player_slow_speed),
            ("light_duration", self.light_duration),
            ("light_max_radius", self.light_max_radius),
            ("weapon_cooldown", self.weapon_cooldown),
            ("bullet_speed", self.bullet_speed),
            ("bullet_lifetime", self.bullet_lifetime),
            ("spawn_interval", self.spawn_interval),
            ("difficulty_interval", self.difficulty_interval),
            ("fog_active_duration", self.fog_active_duration),
            ("fog_inactive_duration", self.fog_inactive_duration),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GameError::InvalidConfig {
                    name,
                    value,
                    reason: "must be finite and > 0",
                });
            }
        }

        let non_negative: [(&'static str, f32); 12] = [
            ("invulnerability_duration", self.invulnerability_duration),
            ("health_drop_heal", self.health_drop_heal),
            ("light_min_radius", self.light_min_radius),
            ("light_flicker_threshold", self.light_flicker_threshold),
            ("light_flicker_amount", self.light_flicker_amount),
            ("bullet_damage", self.bullet_damage),
            ("muzzle_offset", self.muzzle_offset),
            ("enemy_death_duration", self.enemy_death_duration),
            ("min_spawn_distance", self.min_spawn_distance),
            ("bat_burst_spread", self.bat_burst_spread),
            ("countdown_duration", self.countdown_duration),
            ("score_per_second", self.score_per_second),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GameError::InvalidConfig {
                    name,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }

        if self.light_min_radius > self.light_max_radius {
            return Err(GameError::InvalidConfig {
                name: "light_min_radius",
                value: self.light_min_radius,
                reason: "must not exceed light_max_radius",
            });
        }
        if self.bat_burst_min == 0 || self.bat_burst_min > self.bat_burst_max {
            return Err(GameError::InvalidConfig {
                name: "bat_burst_min",
                value: self.bat_burst_min as f32,
                reason: "must be in 1..=bat_burst_max",
            });
        }
        Ok(())
    }
}
