//! The star-collecting level
//!
//! [`StarScene`] owns the ECS world, the session state and every entity
//! handle. The host loop drives it through the three [`Scene`] phases:
//! `preload` once to register assets, `create` once to build the level,
//! then `update` every frame. Collision and timer handlers are plain
//! methods on the scene, called after each physics step for the contacts
//! that step reported and for each countdown tick.

use glam::DVec2;
use legion::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{Animations, Clip};
use crate::camera::Camera;
use crate::collision::Aabb;
use crate::components::*;
use crate::config::{GameConfig, Placement};
use crate::error::{AssetError, ConfigError};
use crate::events::{Contact, EventQueue};
use crate::input::{InputState, steer};
use crate::quadtree::QuadTree;
use crate::session::{Outcome, Session};
use crate::snapshot::{DrawItem, RenderSnapshot};
use crate::systems::{PhysicsWorld, TriggerTree, animation_schedule, physics_schedule};
use crate::timer::TimerEvent;

/// Texture sources the host engine knows how to load
pub trait AssetLoader {
    fn image(&mut self, key: &str, path: &str) -> Result<(), AssetError>;

    fn spritesheet(
        &mut self,
        key: &str,
        path: &str,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<(), AssetError>;

    /// Solid-colour texture generated at load time
    fn solid(&mut self, key: &str, width: u32, height: u32, rgb: u32) -> Result<(), AssetError>;
}

/// Per-frame input from the host loop
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    /// Seconds since the previous frame
    pub dt: f64,
    pub input: InputState,
}

/// Lifecycle the host loop calls into
pub trait Scene {
    fn preload(&mut self, loader: &mut dyn AssetLoader) -> Result<(), AssetError>;
    fn create(&mut self);
    fn update(&mut self, frame: &Frame);
}

/// Something the renderer can draw
pub trait Snapshot {
    fn snapshot(&self) -> RenderSnapshot;
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudText {
    pub text: String,
    pub pos: DVec2,
    pub size: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    pub score: Option<HudText>,
    pub timer: Option<HudText>,
    /// End-of-round messages, in the order they were shown
    pub banners: Vec<HudText>,
}

/// Handles to everything `create` builds
#[derive(Clone, Debug)]
pub struct Handles {
    pub background: Entity,
    pub ground: Entity,
    pub platforms: Vec<Entity>,
    pub player: Entity,
    pub stars: Vec<Entity>,
    pub bombs: Vec<Entity>,
    pub door: Option<Entity>,
}

pub struct StarScene {
    config: GameConfig,
    world: World,
    resources: Resources,
    physics_step: Schedule,
    animation_step: Schedule,
    session: Session,
    hud: Hud,
    countdown: Option<TimerEvent>,
    camera: Camera,
    rng: StdRng,
    handles: Option<Handles>,
}

impl StarScene {
    /// Build an empty scene for `config`. A config that fails
    /// [`GameConfig::validate`] is rejected here, before any handler can
    /// trip over it.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.rules.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let bounds = world_bounds(&config);
        let viewport = DVec2::new(config.canvas.width as f64, config.canvas.height as f64);

        Ok(Self {
            session: Session::new(config.rules.time_limit),
            camera: Camera::new(viewport, bounds),
            config,
            world: World::default(),
            resources: Resources::default(),
            physics_step: physics_schedule(),
            animation_step: animation_schedule(),
            hud: Hud::default(),
            countdown: None,
            rng,
            handles: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn countdown(&self) -> Option<&TimerEvent> {
        self.countdown.as_ref()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> Option<PhysicsWorld> {
        self.resources.get::<PhysicsWorld>().map(|p| *p)
    }

    /// Entity handles, `None` before `create`
    pub fn handles(&self) -> Option<&Handles> {
        self.handles.as_ref()
    }

    pub fn active_stars(&self) -> usize {
        <&Star>::query()
            .filter(!component::<Disabled>())
            .iter(&self.world)
            .count()
    }

    pub fn is_disabled(&self, entity: Entity) -> bool {
        self.world
            .entry_ref(entity)
            .map(|e| e.get_component::<Disabled>().is_ok())
            .unwrap_or(true)
    }

    fn texture_size(&self, key: &str) -> DVec2 {
        let (w, h) = self.config.assets.size_of(key).unwrap_or_else(|| {
            log::warn!("no size for texture '{key}', using an empty body");
            (0.0, 0.0)
        });
        DVec2::new(w, h)
    }

    fn push_static(&mut self, placement: &Placement, size: DVec2) -> Entity {
        let scale = DVec2::new(placement.sx, placement.sy);
        let mut sprite = SpriteInfo::new(&placement.texture);
        sprite.scale = scale;

        self.world.push((
            Position(DVec2::new(placement.x, placement.y)),
            Body::new(size * scale),
            StaticBody,
            sprite,
        ))
    }

    fn set_velocity(&mut self, entity: Entity, f: impl FnOnce(&mut DVec2)) {
        if let Some(mut entry) = self.world.entry(entity) {
            if let Ok(vel) = entry.get_component_mut::<Velocity>() {
                f(&mut vel.0);
            }
        }
    }

    fn player_grounded(&self, player: Entity) -> bool {
        self.world
            .entry_ref(player)
            .ok()
            .and_then(|e| e.get_component::<Body>().ok().map(|b| b.touching.down))
            .unwrap_or(false)
    }

    fn play(&mut self, entity: Entity, clip: Clip, ignore_if_playing: bool) {
        if let Some(mut entry) = self.world.entry(entity) {
            if let Ok(animator) = entry.get_component_mut::<Animator>() {
                animator.play(clip, ignore_if_playing);
            }
        }
    }

    fn show_banner(&mut self, outcome: Outcome) {
        let style = &self.config.hud.banner;
        self.hud.banners.push(HudText {
            text: outcome.banner().to_string(),
            pos: DVec2::new(style.x, style.y),
            size: style.size,
        });
    }

    /// Banners stack on purpose: with the countdown left running after the
    /// round, each later time-up tick shows another one.
    fn end_round(&mut self, outcome: Outcome) {
        self.show_banner(outcome);

        if !self.session.game_over {
            log::info!(
                "round over: {:?} with score {} and {}s left",
                outcome,
                self.session.score,
                self.session.time_remaining
            );
        }
        self.session.finish(outcome);

        if self.config.rules.stop_countdown_on_game_over {
            if let Some(countdown) = self.countdown.as_mut() {
                countdown.cancel();
            }
        }
    }

    /// Per-frame input mapping. Does nothing once the round is over.
    fn steer_player(&mut self, input: &InputState) {
        if self.session.game_over {
            return;
        }

        let Some(player) = self.handles.as_ref().map(|h| h.player) else {
            return;
        };

        let steering = steer(input, self.player_grounded(player), &self.config.rules);

        self.set_velocity(player, |vel| {
            vel.x = steering.vx;
            if let Some(vy) = steering.vy {
                vel.y = vy;
            }
        });
        self.play(player, steering.clip, steering.ignore_if_playing);
    }

    fn dispatch(&mut self, contacts: Vec<Contact>) {
        for contact in contacts {
            if self.session.game_over {
                break;
            }

            match contact.trigger {
                Trigger::Star => self.collect_star(contact.entity),
                Trigger::Bomb => self.hit_bomb(contact.entity),
                Trigger::Door => self.reach_door(),
            }
        }
    }

    /// Player touched a star: bank it, maybe drop a bomb, maybe open the door
    pub fn collect_star(&mut self, star: Entity) {
        if self.is_disabled(star) {
            return;
        }

        if let Some(mut entry) = self.world.entry(star) {
            if let Ok(sprite) = entry.get_component_mut::<SpriteInfo>() {
                sprite.visible = false;
            }
            entry.add_component(Disabled);
        }

        self.session.score += 1;
        if let Some(text) = self.hud.score.as_mut() {
            text.text = self.session.score_text();
        }
        log::debug!("star collected, score {}", self.session.score);

        if self.session.score % self.config.rules.bomb_every == 0 {
            self.spawn_bomb();
        }

        if self.active_stars() == 0 && self.handles.as_ref().is_some_and(|h| h.door.is_none()) {
            self.spawn_door();
        }
    }

    fn spawn_bomb(&mut self) {
        let spawn = self.config.level.bombs.clone();
        let x = self.rng.gen_range(spawn.x.0..=spawn.x.1) as f64;
        let vx = self.rng.gen_range(spawn.vx.0..=spawn.vx.1) as f64;

        let mut body = Body::new(self.texture_size(&spawn.texture));
        body.bounce = DVec2::splat(spawn.bounce);
        body.collide_world_bounds = true;
        body.allow_gravity = false;

        let bomb = self.world.push((
            Position(DVec2::new(x, spawn.y)),
            Velocity(DVec2::new(vx, spawn.vy)),
            body,
            Trigger::Bomb,
            Bomb,
            SpriteInfo::new(&spawn.texture),
        ));

        log::debug!("bomb dropped at x={x} with vx={vx}");

        if let Some(handles) = self.handles.as_mut() {
            handles.bombs.push(bomb);
        }
    }

    fn spawn_door(&mut self) {
        let placement = self.config.level.door.clone();
        let mut body = Body::new(self.texture_size(&placement.texture));
        body.allow_gravity = false;
        body.immovable = true;
        body.collide_static = false;

        let door = self.world.push((
            Position(DVec2::new(placement.x, placement.y)),
            Velocity(DVec2::ZERO),
            body,
            Trigger::Door,
            Door,
            SpriteInfo::new(&placement.texture),
        ));

        log::info!("all stars collected, door open at ({}, {})", placement.x, placement.y);

        if let Some(handles) = self.handles.as_mut() {
            handles.door = Some(door);
        }
    }

    /// Player hit a bomb: freeze everything and end the round
    pub fn hit_bomb(&mut self, bomb: Entity) {
        log::debug!("player hit bomb {:?}", bomb);

        if let Some(mut physics) = self.resources.get_mut::<PhysicsWorld>() {
            physics.pause();
        }

        if let Some(player) = self.handles.as_ref().map(|h| h.player) {
            if let Some(mut entry) = self.world.entry(player) {
                if let Ok(sprite) = entry.get_component_mut::<SpriteInfo>() {
                    sprite.tint = Some([0xFF, 0x00, 0x00]);
                }
            }
            self.play(player, Clip::Turn, false);
        }

        self.end_round(Outcome::Bombed);
    }

    /// One second of the countdown went by
    pub fn tick_countdown(&mut self) {
        if self.session.time_remaining > 0 {
            self.session.time_remaining -= 1;
            if let Some(text) = self.hud.timer.as_mut() {
                text.text = self.session.time_text();
            }
            return;
        }

        if let Some(player) = self.handles.as_ref().map(|h| h.player) {
            if let Some(mut entry) = self.world.entry(player) {
                if let Ok(sprite) = entry.get_component_mut::<SpriteInfo>() {
                    sprite.visible = false;
                }
                entry.add_component(Disabled);
            }
        }

        self.end_round(Outcome::TimeUp);
    }

    /// Player reached the door
    pub fn reach_door(&mut self) {
        self.end_round(Outcome::Champion);
    }

    fn player_position(&self) -> Option<DVec2> {
        let player = self.handles.as_ref()?.player;
        let entry = self.world.entry_ref(player).ok()?;
        entry.get_component::<Position>().ok().map(|p| p.0)
    }
}

fn world_bounds(config: &GameConfig) -> Aabb {
    Aabb::new(
        DVec2::ZERO,
        DVec2::new(config.world.width, config.world.height),
    )
}

impl Scene for StarScene {
    fn preload(&mut self, loader: &mut dyn AssetLoader) -> Result<(), AssetError> {
        let assets = &self.config.assets;

        for image in &assets.images {
            loader.image(&image.key, &image.path)?;
        }
        for sheet in &assets.sheets {
            loader.spritesheet(&sheet.key, &sheet.path, sheet.frame_width, sheet.frame_height)?;
        }

        let ground = &self.config.level.ground;
        loader.solid(&ground.texture, ground.width, ground.height, ground.color)?;

        log::info!(
            "preloaded {} images and {} spritesheets",
            assets.images.len(),
            assets.sheets.len()
        );
        Ok(())
    }

    fn create(&mut self) {
        let config = self.config.clone();
        let level = &config.level;
        let bounds = world_bounds(&config);

        self.world = World::default();
        self.resources = Resources::default();
        self.session = Session::new(config.rules.time_limit);
        self.hud = Hud::default();

        self.resources.insert(PhysicsWorld::new(
            DVec2::new(0.0, config.physics.gravity_y),
            bounds,
            config.physics.quadtree_capacity,
        ));
        self.resources.insert(0.0f32);
        self.resources
            .insert::<TriggerTree>(QuadTree::new(config.physics.quadtree_capacity, bounds));
        self.resources.insert(EventQueue::<Contact>::new());
        self.resources.insert(Animations::player());

        let mut sky = SpriteInfo::new(&level.background.texture);
        sky.scale = DVec2::new(level.background.sx, level.background.sy);
        sky.depth = -1;
        let background = self.world.push((
            Position(DVec2::new(level.background.x, level.background.y)),
            sky,
        ));

        let ground_size = DVec2::new(level.ground.width as f64, level.ground.height as f64);
        let ground = self.push_static(
            &Placement::new(level.ground.x, level.ground.y, &level.ground.texture),
            ground_size,
        );

        let platforms = level
            .platforms
            .iter()
            .map(|p| {
                let size = self.texture_size(&p.texture);
                self.push_static(p, size)
            })
            .collect::<Vec<_>>();

        let mut body = Body::new(self.texture_size(&level.player.sheet));
        body.bounce = DVec2::splat(level.player.bounce);
        body.collide_world_bounds = true;
        let mut sprite = SpriteInfo::new(&level.player.sheet);
        sprite.depth = 1;
        let player = self.world.push((
            Position(DVec2::new(level.player.x, level.player.y)),
            Velocity(DVec2::ZERO),
            body,
            Player,
            sprite,
            Animator::new(Clip::Turn),
        ));

        let star_size = self.texture_size(&level.stars.texture);
        let (lo, hi) = level.stars.bounce_y;
        let stars = (0..level.stars.count)
            .map(|index| {
                let (x, y) = level.stars.position(index);
                let mut body = Body::new(star_size);
                body.bounce.y = if lo < hi { self.rng.gen_range(lo..=hi) } else { lo };

                self.world.push((
                    Position(DVec2::new(x, y)),
                    Velocity(DVec2::ZERO),
                    body,
                    Trigger::Star,
                    Star,
                    SpriteInfo::new(&level.stars.texture),
                ))
            })
            .collect::<Vec<_>>();

        let hud = &config.hud;
        self.hud.score = Some(HudText {
            text: self.session.score_text(),
            pos: DVec2::new(hud.score.x, hud.score.y),
            size: hud.score.size,
        });
        self.hud.timer = Some(HudText {
            text: self.session.time_text(),
            pos: DVec2::new(hud.timer.x, hud.timer.y),
            size: hud.timer.size,
        });

        self.countdown = Some(TimerEvent::looping(config.rules.countdown_delay_ms));

        self.camera = Camera::new(
            DVec2::new(config.canvas.width as f64, config.canvas.height as f64),
            bounds,
        );
        self.camera.lerp = DVec2::new(config.camera.lerp_x, config.camera.lerp_y);
        self.camera.round_pixels = config.camera.round_pixels;
        self.camera.center_on(DVec2::new(level.player.x, level.player.y));

        log::info!(
            "level created: {} platforms, {} stars, {}s on the clock",
            platforms.len(),
            stars.len(),
            self.session.time_remaining
        );

        self.handles = Some(Handles {
            background,
            ground,
            platforms,
            player,
            stars,
            bombs: Vec::new(),
            door: None,
        });
    }

    fn update(&mut self, frame: &Frame) {
        if self.handles.is_none() {
            return;
        }

        self.steer_player(&frame.input);

        self.resources.insert(frame.dt as f32);

        let paused = self.physics().is_some_and(|p| p.paused);
        if !paused {
            log::trace!("physics step dt={:.4}", frame.dt);
            self.physics_step.execute(&mut self.world, &mut self.resources);
        }
        self.animation_step.execute(&mut self.world, &mut self.resources);

        let contacts = self
            .resources
            .get_mut::<EventQueue<Contact>>()
            .map(|mut q| q.take())
            .unwrap_or_default();
        self.dispatch(contacts);

        let ticks = self
            .countdown
            .as_mut()
            .map(|c| c.advance(frame.dt * 1000.0))
            .unwrap_or(0);
        for _ in 0..ticks {
            if self.countdown.as_ref().is_some_and(|c| c.is_cancelled()) {
                break;
            }
            self.tick_countdown();
        }

        if let Some(target) = self.player_position() {
            self.camera.follow(target);
        }
    }
}

impl Snapshot for StarScene {
    fn snapshot(&self) -> RenderSnapshot {
        let mut snapshot = RenderSnapshot {
            scroll: self.camera.render_scroll(),
            ..Default::default()
        };

        let animations = self.resources.get::<Animations>();
        let mut sprites = Vec::new();

        <(Entity, &Position, &SpriteInfo)>::query().for_each(
            &self.world,
            |(entity, pos, sprite)| {
                if !sprite.visible {
                    return;
                }

                let entry = self.world.entry_ref(*entity).ok();
                let frame = entry.as_ref().and_then(|e| {
                    let animator = e.get_component::<Animator>().ok()?;
                    animations.as_ref().map(|a| a.frame(animator))
                });

                sprites.push((
                    sprite.depth,
                    DrawItem::Sprite {
                        texture: sprite.texture.clone(),
                        frame,
                        center: pos.0,
                        scale: sprite.scale,
                        tint: sprite.tint,
                    },
                ));
            },
        );

        sprites.sort_by_key(|(depth, _)| *depth);
        snapshot
            .items
            .extend(sprites.into_iter().map(|(_, item)| item));

        let texts = self
            .hud
            .score
            .iter()
            .chain(self.hud.timer.iter())
            .chain(self.hud.banners.iter());
        for text in texts {
            snapshot.items.push(DrawItem::Text {
                text: text.text.clone(),
                pos: text.pos,
                size: text.size,
            });
        }

        if self.config.physics.debug {
            <(&Position, &Body, Option<&Disabled>)>::query().for_each(
                &self.world,
                |(pos, body, disabled)| {
                    if disabled.is_none() {
                        snapshot.debug.push(body.bounds(pos.0));
                    }
                },
            );

            if let Some(tree) = self.resources.get::<TriggerTree>() {
                collect_quads(&tree, &mut snapshot.quads);
            }
        }

        snapshot
    }
}

fn collect_quads(tree: &TriggerTree, out: &mut Vec<Aabb>) {
    out.push(tree.boundary());
    if let Some(children) = tree.children() {
        children.iter().for_each(|c| collect_quads(c, out));
    }
}
