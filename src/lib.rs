pub mod compute;
pub mod config;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod map;
pub mod player;
pub mod scores;
pub mod snapshot;
pub mod timer;
