use glam::DVec2;

use crate::collision::Aabb;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    Sprite {
        texture: String,
        /// Spritesheet frame, `None` for plain images
        frame: Option<u32>,
        center: DVec2,
        scale: DVec2,
        tint: Option<[u8; 3]>,
    },
    Text {
        text: String,
        /// Top-left corner
        pos: DVec2,
        size: u32,
    },
}

/// Everything needed to draw one frame, in world coordinates
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSnapshot {
    pub scroll: DVec2,
    pub items: Vec<DrawItem>,
    /// Body outlines, only filled in debug mode
    pub debug: Vec<Aabb>,
    /// Overlap quadtree cells, only filled in debug mode
    pub quads: Vec<Aabb>,
}

impl RenderSnapshot {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn sprites_of<'a>(&'a self, texture: &'a str) -> impl Iterator<Item = &'a DrawItem> {
        self.items.iter().filter(move |item| {
            matches!(item, DrawItem::Sprite { texture: t, .. } if t == texture)
        })
    }
}
