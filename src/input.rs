/// Per-frame input snapshot.  The front-end samples keyboard and pointer
/// state once per frame; the simulation never waits for input.

use glam::Vec2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Pointer position relative to the screen centre (where the player is
    /// drawn).  Zero means "keep the previous aim".
    pub aim: Vec2,
}

impl InputSnapshot {
    /// Movement direction: 8-way, normalised, opposing keys cancel.
    pub fn direction(&self) -> Vec2 {
        let x = self.right as i32 - self.left as i32;
        let y = self.down as i32 - self.up as i32;
        Vec2::new(x as f32, y as f32).normalize_or_zero()
    }
}
