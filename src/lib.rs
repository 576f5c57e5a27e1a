//! A small platformer: collect every star before the clock runs out, keep
//! away from the bombs, then reach the door.

pub mod animation;
pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod quadtree;
pub mod scene;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod timer;

#[cfg(feature = "window")]
pub mod engine;
#[cfg(feature = "window")]
pub mod renderer;

pub use config::GameConfig;
pub use error::{AssetError, ConfigError};
pub use scene::{AssetLoader, Frame, Scene, Snapshot, StarScene};
pub use session::{Outcome, Session};
