//! Map geometry: static obstacles, the player spawn point and candidate enemy
//! spawn points, all in world pixels.
//!
//! A round is built from a fixed snapshot returned once per setup, either the
//! built-in forest clearing or a TOML file:
//!
//! ```toml
//! player_spawn = [1200.0, 900.0]
//! enemy_spawns = [[100.0, 100.0], [2300.0, 1700.0]]
//!
//! [[obstacles]]
//! x = 0.0
//! y = 0.0
//! w = 2400.0
//! h = 40.0
//!
//! [[ground]]
//! x = 1000.0
//! y = 700.0
//! w = 400.0
//! h = 400.0
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GameError, GameResult};
use crate::geometry::Rect;

/// Used when distance filtering leaves no spawn point at all.
pub const FALLBACK_SPAWN_POINTS: [Vec2; 4] = [
    Vec2::new(200.0, 200.0),
    Vec2::new(2200.0, 200.0),
    Vec2::new(200.0, 1600.0),
    Vec2::new(2200.0, 1600.0),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapLayout {
    /// World extent, used only to frame the view.
    #[serde(default = "default_size")]
    pub size: Vec2,
    pub player_spawn: Vec2,
    #[serde(default)]
    pub enemy_spawns: Vec<Vec2>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    /// Walkable floor patches; drawn beneath everything, never collide.
    #[serde(default)]
    pub ground: Vec<Rect>,
}

fn default_size() -> Vec2 {
    Vec2::new(2400.0, 1800.0)
}

impl MapLayout {
    /// A walled clearing with a few tree clusters and spawn points around
    /// the edge.
    pub fn built_in() -> Self {
        let (w, h) = (2400.0, 1800.0);
        let wall = 40.0;
        let mut obstacles = vec![
            Rect::new(0.0, 0.0, w, wall),
            Rect::new(0.0, h - wall, w, wall),
            Rect::new(0.0, 0.0, wall, h),
            Rect::new(w - wall, 0.0, wall, h),
        ];
        // Tree clusters
        obstacles.extend([
            Rect::new(500.0, 400.0, 120.0, 160.0),
            Rect::new(1700.0, 380.0, 160.0, 120.0),
            Rect::new(450.0, 1250.0, 200.0, 100.0),
            Rect::new(1650.0, 1200.0, 120.0, 200.0),
            Rect::new(1100.0, 300.0, 200.0, 80.0),
            Rect::new(1100.0, 1420.0, 200.0, 80.0),
            Rect::new(850.0, 800.0, 80.0, 80.0),
            Rect::new(1470.0, 850.0, 80.0, 80.0),
        ]);
        let enemy_spawns = vec![
            Vec2::new(150.0, 150.0),
            Vec2::new(1200.0, 120.0),
            Vec2::new(2250.0, 150.0),
            Vec2::new(120.0, 900.0),
            Vec2::new(2280.0, 900.0),
            Vec2::new(150.0, 1650.0),
            Vec2::new(1200.0, 1680.0),
            Vec2::new(2250.0, 1650.0),
        ];
        // Dirt clearing around the spawn and the paths leading out of it
        let ground = vec![
            Rect::new(1000.0, 700.0, 400.0, 400.0),
            Rect::new(wall, 860.0, 960.0, 80.0),
            Rect::new(1400.0, 860.0, w - 1400.0 - wall, 80.0),
            Rect::new(1160.0, wall, 80.0, 660.0),
            Rect::new(1160.0, 1100.0, 80.0, h - 1100.0 - wall),
        ];
        Self {
            size: Vec2::new(w, h),
            player_spawn: Vec2::new(w / 2.0, h / 2.0),
            enemy_spawns,
            obstacles,
            ground,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> GameResult<Self> {
        let map: MapLayout = toml::from_str(contents)?;
        map.validate()?;
        Ok(map)
    }

    /// A map whose player spawn sits inside an obstacle cannot start a round.
    pub fn validate(&self) -> GameResult<()> {
        if let Some(o) = self
            .obstacles
            .iter()
            .find(|o| o.contains_point(self.player_spawn))
        {
            return Err(GameError::MapInvalid(format!(
                "player spawn ({}, {}) is inside obstacle at ({}, {})",
                self.player_spawn.x, self.player_spawn.y, o.x, o.y
            )));
        }
        if self.obstacles.iter().any(|o| o.w < 0.0 || o.h < 0.0) {
            return Err(GameError::MapInvalid(
                "obstacle with negative size".to_string(),
            ));
        }
        if self.ground.iter().any(|g| g.w < 0.0 || g.h < 0.0) {
            return Err(GameError::MapInvalid(
                "ground patch with negative size".to_string(),
            ));
        }
        Ok(())
    }

    /// Spawn points at least `min_distance` away from the player spawn, or
    /// the fallback list when none qualify.
    pub fn eligible_spawn_points(&self, min_distance: f32) -> Vec<Vec2> {
        let eligible: Vec<Vec2> = self
            .enemy_spawns
            .iter()
            .copied()
            .filter(|p| p.distance(self.player_spawn) >= min_distance)
            .collect();
        if eligible.is_empty() {
            warn!(
                candidates = self.enemy_spawns.len(),
                min_distance, "no eligible enemy spawn points, using fallback list"
            );
            FALLBACK_SPAWN_POINTS.to_vec()
        } else {
            eligible
        }
    }
}
