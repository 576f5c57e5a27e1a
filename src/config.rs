//! Game configuration
//!
//! Everything the scene reads once at startup lives here: canvas and
//! physics settings for the engine, the level layout, the asset manifest
//! and the tuning of the game rules. Stored as RON so a level can be
//! tweaked without recompiling; [`GameConfig::default`] is the built-in
//! level.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas: CanvasConfig,
    pub physics: PhysicsConfig,
    pub world: WorldConfig,
    pub camera: CameraConfig,
    pub rules: RulesConfig,
    pub hud: HudConfig,
    pub level: LevelLayout,
    pub assets: AssetManifest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Render at canvas size, no scaling
    None,
    /// Uniformly scale the canvas to fit its parent and centre it
    Fit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub scale_mode: ScaleMode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub gravity_y: f64,
    /// Draws body outlines, the overlap quadtree and an info window
    pub debug: bool,
    pub quadtree_capacity: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub lerp_x: f64,
    pub lerp_y: f64,
    pub round_pixels: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Seconds on the countdown when the scene starts
    pub time_limit: u32,
    pub countdown_delay_ms: f64,
    pub run_speed: f64,
    pub jump_speed: f64,
    /// A bomb drops every time the score hits a multiple of this
    pub bomb_every: u32,
    /// Cancel the countdown once the game has ended. When false the timer
    /// keeps firing after a terminal state, as the first version of the
    /// game did.
    pub stop_countdown_on_game_over: bool,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub x: f64,
    pub y: f64,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudConfig {
    pub score: TextStyle,
    pub timer: TextStyle,
    pub banner: TextStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub texture: String,
    pub sx: f64,
    pub sy: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64, texture: &str) -> Self {
        Self {
            x,
            y,
            texture: texture.to_string(),
            sx: 1.0,
            sy: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundStrip {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
    pub color: u32,
    pub texture: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpawn {
    pub x: f64,
    pub y: f64,
    pub sheet: String,
    pub bounce: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarGrid {
    pub texture: String,
    pub count: usize,
    pub per_row: usize,
    pub origin: (f64, f64),
    pub step: (f64, f64),
    pub bounce_y: (f64, f64),
}

impl StarGrid {
    /// Centre of the `index`-th star
    pub fn position(&self, index: usize) -> (f64, f64) {
        let row = index / self.per_row;
        let col = index % self.per_row;
        (
            self.origin.0 + col as f64 * self.step.0,
            self.origin.1 + row as f64 * self.step.1,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BombSpawn {
    pub texture: String,
    pub x: (i32, i32),
    pub y: f64,
    pub vx: (i32, i32),
    pub vy: f64,
    pub bounce: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub background: Placement,
    pub ground: GroundStrip,
    /// Static platforms in creation order
    pub platforms: Vec<Placement>,
    pub player: PlayerSpawn,
    pub stars: StarGrid,
    pub bombs: BombSpawn,
    pub door: Placement,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub key: String,
    pub path: String,
    /// Nominal texture size, used for physics bodies
    pub size: (f64, f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetAsset {
    pub key: String,
    pub path: String,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub images: Vec<ImageAsset>,
    pub sheets: Vec<SheetAsset>,
    pub font: String,
}

impl AssetManifest {
    pub fn image(&self, key: &str) -> Option<&ImageAsset> {
        self.images.iter().find(|i| i.key == key)
    }

    pub fn sheet(&self, key: &str) -> Option<&SheetAsset> {
        self.sheets.iter().find(|s| s.key == key)
    }

    /// Size of a texture by key. Spritesheets report their frame size.
    pub fn size_of(&self, key: &str) -> Option<(f64, f64)> {
        self.image(key).map(|i| i.size).or_else(|| {
            self.sheet(key)
                .map(|s| (s.frame_width as f64, s.frame_height as f64))
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig {
                width: 700,
                height: 640,
                title: "Star Dash".to_string(),
                scale_mode: ScaleMode::Fit,
            },
            physics: PhysicsConfig {
                gravity_y: 300.0,
                debug: false,
                quadtree_capacity: 8,
            },
            world: WorldConfig {
                width: 1280.0,
                height: 640.0,
            },
            camera: CameraConfig {
                lerp_x: 0.05,
                lerp_y: 0.05,
                round_pixels: true,
            },
            rules: RulesConfig {
                time_limit: 90,
                countdown_delay_ms: 1000.0,
                run_speed: 160.0,
                jump_speed: 330.0,
                bomb_every: 3,
                stop_countdown_on_game_over: true,
                seed: None,
            },
            hud: HudConfig {
                score: TextStyle {
                    x: 16.0,
                    y: 16.0,
                    size: 32,
                },
                timer: TextStyle {
                    x: 1050.0,
                    y: 16.0,
                    size: 32,
                },
                banner: TextStyle {
                    x: 500.0,
                    y: 300.0,
                    size: 50,
                },
            },
            level: LevelLayout::default(),
            assets: AssetManifest::default(),
        }
    }
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            background: Placement::new(640.0, 320.0, "sky"),
            ground: GroundStrip {
                x: 640.0,
                y: 635.0,
                width: 1280,
                height: 10,
                color: 0x8B4513,
                texture: "groundTexture".to_string(),
            },
            platforms: vec![
                Placement::new(640.0, 608.0, "platform"),
                Placement::new(200.0, 150.0, "platform"),
                Placement::new(500.0, 450.0, "platform"),
                Placement::new(800.0, 300.0, "platform"),
                Placement::new(300.0, 280.0, "platform"),
                Placement::new(550.0, 150.0, "platform"),
                Placement::new(1100.0, 100.0, "platform"),
            ],
            player: PlayerSpawn {
                x: 100.0,
                y: 450.0,
                sheet: "dude".to_string(),
                bounce: 0.2,
            },
            stars: StarGrid {
                texture: "star".to_string(),
                count: 23,
                per_row: 12,
                origin: (100.0, 100.0),
                step: (70.0, 100.0),
                bounce_y: (0.4, 0.8),
            },
            bombs: BombSpawn {
                texture: "bomb".to_string(),
                x: (800, 1800),
                y: 16.0,
                vx: (-200, 200),
                vy: 20.0,
                bounce: 1.0,
            },
            door: Placement::new(1050.0, 200.0, "door"),
        }
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        let image = |key: &str, path: &str, w: f64, h: f64| ImageAsset {
            key: key.to_string(),
            path: path.to_string(),
            size: (w, h),
        };

        Self {
            images: vec![
                image("sky", "assets/sky.jpg", 1280.0, 640.0),
                image("platform", "assets/platform.png", 400.0, 32.0),
                image("star", "assets/star.png", 24.0, 22.0),
                image("bomb", "assets/bomb.png", 14.0, 14.0),
                image("door", "assets/door.png", 48.0, 80.0),
            ],
            sheets: vec![SheetAsset {
                key: "dude".to_string(),
                path: "assets/dude.png".to_string(),
                frame_width: 32,
                frame_height: 48,
            }],
            font: "assets/font.ttf".to_string(),
        }
    }
}

impl GameConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&contents).inspect_err(|e| {
            log::error!("failed to load config {}: {}", path.display(), e);
        })?;

        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor("  ".to_string());

        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let level = &self.level;

        if level.stars.count == 0 {
            return invalid("star grid is empty".into());
        }
        if level.stars.per_row == 0 {
            return invalid("star grid needs at least one star per row".into());
        }
        let (lo, hi) = level.stars.bounce_y;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return invalid(format!("star bounce range [{lo}, {hi}] out of [0, 1]"));
        }
        if level.bombs.x.0 > level.bombs.x.1 || level.bombs.vx.0 > level.bombs.vx.1 {
            return invalid("bomb spawn range is reversed".into());
        }
        if self.rules.bomb_every == 0 {
            return invalid("bomb_every must be positive".into());
        }
        if self.rules.countdown_delay_ms <= 0.0 {
            return invalid("countdown delay must be positive".into());
        }
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return invalid("world bounds must be positive".into());
        }

        let mut keys = HashSet::new();
        for key in self
            .assets
            .images
            .iter()
            .map(|i| &i.key)
            .chain(self.assets.sheets.iter().map(|s| &s.key))
        {
            if !keys.insert(key.as_str()) {
                return invalid(format!("asset key '{key}' declared twice"));
            }
        }

        let referenced = level
            .platforms
            .iter()
            .chain([&level.background, &level.door])
            .map(|p| p.texture.as_str())
            .chain([
                level.stars.texture.as_str(),
                level.bombs.texture.as_str(),
                level.player.sheet.as_str(),
            ]);

        for key in referenced {
            if !keys.contains(key) {
                return invalid(format!("texture '{key}' is not in the asset manifest"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level.platforms.len(), 7);
        assert_eq!(config.level.stars.count, 23);
        assert_eq!(config.rules.time_limit, 90);
    }

    #[test]
    fn star_grid_wraps_rows_of_twelve() {
        let grid = GameConfig::default().level.stars;
        assert_eq!(grid.position(0), (100.0, 100.0));
        assert_eq!(grid.position(11), (870.0, 100.0));
        assert_eq!(grid.position(12), (100.0, 200.0));
        assert_eq!(grid.position(22), (800.0, 200.0));
    }

    #[test]
    fn ron_text_survives_save_and_load() {
        let mut config = GameConfig::default();
        config.rules.seed = Some(7);
        config.physics.debug = true;

        let text = config.to_ron_string().unwrap();
        let loaded = GameConfig::from_ron_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config = GameConfig::from_ron_str("(rules: (time_limit: 30, countdown_delay_ms: 500.0, run_speed: 160.0, jump_speed: 330.0, bomb_every: 3, stop_countdown_on_game_over: false, seed: Some(1)))").unwrap();
        assert_eq!(config.rules.time_limit, 30);
        assert!(!config.rules.stop_countdown_on_game_over);
        assert_eq!(config.level, LevelLayout::default());
    }

    #[test]
    fn unknown_platform_texture_is_rejected() {
        let mut config = GameConfig::default();
        config.level.platforms.push(Placement::new(0.0, 0.0, "lava"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn duplicate_asset_key_is_rejected() {
        let mut config = GameConfig::default();
        let star = config.assets.image("star").unwrap().clone();
        config.assets.images.push(star);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_star_grid_is_rejected() {
        let mut config = GameConfig::default();
        config.level.stars.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.ron");
        fs::write(&path, GameConfig::default().to_ron_string().unwrap()).unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded, GameConfig::default());

        let missing = GameConfig::load(dir.path().join("nope.ron"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn sheet_reports_frame_size() {
        let assets = AssetManifest::default();
        assert_eq!(assets.size_of("dude"), Some((32.0, 48.0)));
        assert_eq!(assets.size_of("bomb"), Some((14.0, 14.0)));
        assert_eq!(assets.size_of("ghost"), None);
    }
}
