use glam::DVec2;

use crate::animation::Clip;
use crate::collision::Aabb;

/// Centre of the entity in world coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position(pub DVec2);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity(pub DVec2);

/// Soft removal: disabled entities are skipped by physics and not drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disabled;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bomb;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Door;

/// What the player hit, in the order contacts are reported each frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trigger {
    Star,
    Bomb,
    Door,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Touching {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub size: DVec2,
    pub bounce: DVec2,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub collide_world_bounds: bool,
    /// Resolve contacts against static bodies
    pub collide_static: bool,
    /// Contact with another body this step
    pub touching: Touching,
}

impl Body {
    pub fn new(size: DVec2) -> Self {
        Self {
            size,
            bounce: DVec2::ZERO,
            allow_gravity: true,
            immovable: false,
            collide_world_bounds: false,
            collide_static: true,
            touching: Touching::default(),
        }
    }

    pub fn bounds(&self, center: DVec2) -> Aabb {
        Aabb::from_center(center, self.size)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteInfo {
    pub texture: String,
    pub scale: DVec2,
    pub tint: Option<[u8; 3]>,
    pub visible: bool,
    /// Draw order, lower first
    pub depth: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animator {
    pub clip: Clip,
    /// Index into the clip's frame list
    pub index: usize,
    pub elapsed: f64,
}

impl Animator {
    pub fn new(clip: Clip) -> Self {
        Self {
            clip,
            index: 0,
            elapsed: 0.0,
        }
    }

    /// Switch clips. With `ignore_if_playing` a clip already running keeps
    /// its current frame instead of restarting.
    pub fn play(&mut self, clip: Clip, ignore_if_playing: bool) {
        if ignore_if_playing && self.clip == clip {
            return;
        }

        *self = Self::new(clip);
    }
}

impl SpriteInfo {
    pub fn new(texture: &str) -> Self {
        Self {
            texture: texture.to_string(),
            scale: DVec2::ONE,
            tint: None,
            visible: true,
            depth: 0,
        }
    }
}
