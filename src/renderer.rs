//! Texture loading and drawing on top of SFML

use std::collections::HashMap;
use std::path::Path;

use glam::DVec2;
use sfml::cpp::FBox;
use sfml::graphics::*;

use crate::collision::Aabb;
use crate::error::AssetError;
use crate::scene::AssetLoader;
use crate::snapshot::{DrawItem, RenderSnapshot};

/// Solid rectangle image, rendered once at load time
pub fn solid(width: u32, height: u32, color: Color) -> Option<FBox<Image>> {
    let mut render_target = RenderTexture::new(width, height).ok()?;

    render_target.clear(Color::TRANSPARENT);

    let mut rect = RectangleShape::new();
    rect.set_size((width as f32, height as f32));
    rect.set_fill_color(color);
    rect.set_position((0., 0.));

    render_target.draw(&rect);
    render_target.display();

    render_target.texture().copy_to_image().ok()
}

/// `0xRRGGBB` to an opaque colour
pub fn hex(rgb: u32) -> Color {
    Color::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Loaded textures by key, with the frame size of spritesheets
#[derive(Default)]
pub struct TextureStore {
    textures: HashMap<String, FBox<Texture>>,
    frames: HashMap<String, (u32, u32)>,
}

impl TextureStore {
    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key).map(|t| &**t)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    fn insert(&mut self, key: &str, texture: FBox<Texture>) -> Result<(), AssetError> {
        if self.textures.contains_key(key) {
            return Err(AssetError::Duplicate(key.to_string()));
        }
        self.textures.insert(key.to_string(), texture);
        Ok(())
    }

    fn load_file(&mut self, key: &str, path: &str) -> Result<(), AssetError> {
        if !Path::new(path).is_file() {
            return Err(AssetError::Missing {
                key: key.to_string(),
                path: path.into(),
            });
        }

        let mut texture = Texture::from_file(path).map_err(|e| AssetError::Load {
            key: key.to_string(),
            path: path.into(),
            reason: format!("{e:?}"),
        })?;
        texture.set_smooth(true);

        log::debug!("loaded texture '{key}' from {path}");
        self.insert(key, texture)
    }

    /// Texture sub-rectangle for a spritesheet frame, row-major
    fn frame_rect(&self, key: &str, texture: &Texture, frame: u32) -> Option<IntRect> {
        let (fw, fh) = *self.frames.get(key)?;
        let columns = (texture.size().x / fw.max(1)).max(1);
        Some(IntRect::new(
            ((frame % columns) * fw) as i32,
            ((frame / columns) * fh) as i32,
            fw as i32,
            fh as i32,
        ))
    }
}

impl AssetLoader for TextureStore {
    fn image(&mut self, key: &str, path: &str) -> Result<(), AssetError> {
        self.load_file(key, path)
    }

    fn spritesheet(
        &mut self,
        key: &str,
        path: &str,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<(), AssetError> {
        self.load_file(key, path)?;
        self.frames
            .insert(key.to_string(), (frame_width, frame_height));
        Ok(())
    }

    fn solid(&mut self, key: &str, width: u32, height: u32, rgb: u32) -> Result<(), AssetError> {
        let failed = |reason: &str| AssetError::Load {
            key: key.to_string(),
            path: "<generated>".into(),
            reason: reason.to_string(),
        };

        let image = solid(width, height, hex(rgb)).ok_or_else(|| failed("render target"))?;
        let texture = Texture::from_image(&image, Rect::new(0, 0, width as i32, height as i32))
            .map_err(|_| failed("texture upload"))?;

        self.insert(key, texture)
    }
}

/// Maps world coordinates onto the window: camera scroll, then the
/// canvas scale and letterbox offset.
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
    pub scroll: DVec2,
    pub scale: f64,
    pub offset: DVec2,
}

impl ViewTransform {
    pub fn apply(&self, world: DVec2) -> (f32, f32) {
        let p = (world - self.scroll) * self.scale + self.offset;
        (p.x as f32, p.y as f32)
    }
}

pub fn draw(
    window: &mut RenderWindow,
    snapshot: &RenderSnapshot,
    store: &TextureStore,
    font: &Font,
    scale: f64,
    offset: DVec2,
) {
    let view = ViewTransform {
        scroll: snapshot.scroll,
        scale,
        offset,
    };

    for item in &snapshot.items {
        match item {
            DrawItem::Sprite {
                texture: key,
                frame,
                center,
                scale: sprite_scale,
                tint,
            } => {
                let Some(texture) = store.get(key) else {
                    continue;
                };

                let mut sprite = Sprite::new();
                sprite.set_texture(texture, true);

                let size = match frame.and_then(|f| store.frame_rect(key, texture, f)) {
                    Some(rect) => {
                        sprite.set_texture_rect(rect);
                        (rect.width as f32, rect.height as f32)
                    }
                    None => {
                        let size = texture.size();
                        (size.x as f32, size.y as f32)
                    }
                };

                sprite.set_origin((size.0 * 0.5, size.1 * 0.5));
                sprite.set_position(view.apply(*center));
                sprite.set_scale((
                    (sprite_scale.x * scale) as f32,
                    (sprite_scale.y * scale) as f32,
                ));
                if let Some([r, g, b]) = tint {
                    sprite.set_color(Color::rgb(*r, *g, *b));
                }

                window.draw(&sprite);
            }

            DrawItem::Text { text, pos, size } => {
                let mut label = Text::new(text.as_str(), font, (*size as f64 * scale) as u32);
                label.set_fill_color(Color::WHITE);
                label.set_position(view.apply(*pos));
                window.draw(&label);
            }
        }
    }

    for cell in &snapshot.quads {
        outline(window, &view, cell, Color::rgb(120, 120, 120));
    }
    for body in &snapshot.debug {
        outline(window, &view, body, Color::GREEN);
    }
}

fn outline(window: &mut RenderWindow, view: &ViewTransform, aabb: &Aabb, color: Color) {
    let size = aabb.size() * view.scale;

    let mut rect = RectangleShape::new();
    rect.set_size((size.x as f32, size.y as f32));
    rect.set_position(view.apply(aabb.min));
    rect.set_outline_color(color);
    rect.set_outline_thickness(0.5);
    rect.set_fill_color(Color::TRANSPARENT);

    window.draw(&rect);
}
