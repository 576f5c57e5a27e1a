//! SFML host loop: window, keyboard, frame clock and drawing around a
//! [`Scene`].

use anyhow::{Context, anyhow};
use egui_sfml::SfEgui;
use egui_sfml::egui;
use glam::DVec2;
use sfml::{graphics::*, system::*, window::*};

use crate::camera::fit;
use crate::config::{GameConfig, ScaleMode};
use crate::input::InputState;
use crate::renderer::{self, TextureStore};
use crate::scene::{Frame, Scene, Snapshot};

/// Share of the desktop the window may cover in `Fit` mode
const DESKTOP_SHARE: f64 = 0.9;

/// Longest frame fed to the simulation, so a stall does not tunnel bodies
const MAX_DT: f32 = 1.0 / 20.0;

fn track_key(input: &mut InputState, code: Key, down: bool) {
    match code {
        Key::Left => input.left = down,
        Key::Right => input.right = down,
        Key::Up => input.up = down,
        _ => {}
    }
}

pub fn run<S: Scene + Snapshot>(config: &GameConfig, scene: &mut S) -> anyhow::Result<()> {
    let canvas = DVec2::new(config.canvas.width as f64, config.canvas.height as f64);

    let (scale, window_size) = match config.canvas.scale_mode {
        ScaleMode::None => (1.0, canvas),
        ScaleMode::Fit => {
            let desktop = VideoMode::desktop_mode();
            let parent = DVec2::new(desktop.width as f64, desktop.height as f64) * DESKTOP_SHARE;
            let (scale, _) = fit(canvas, parent);
            (scale, (canvas * scale).round())
        }
    };

    let mut window = RenderWindow::new(
        (window_size.x as u32, window_size.y as u32),
        config.canvas.title.as_str(),
        Style::CLOSE,
        &ContextSettings::default(),
    )
    .map_err(|e| anyhow!("cannot open window: {e:?}"))?;
    window.set_framerate_limit(60);

    let font = Font::from_file(&config.assets.font)
        .map_err(|e| anyhow!("{e:?}"))
        .with_context(|| format!("loading font {}", config.assets.font))?;

    let mut store = TextureStore::default();
    scene.preload(&mut store).context("preloading assets")?;
    scene.create();

    log::info!(
        "window {}x{} (scale {:.2}), {} textures",
        window_size.x,
        window_size.y,
        scale,
        store.len()
    );

    let mut sfegui = SfEgui::new(&window);
    let mut input = InputState::default();
    let mut clock = Clock::start().map_err(|e| anyhow!("cannot start clock: {e:?}"))?;

    while window.is_open() {
        let dt = clock.restart().as_seconds().min(MAX_DT);

        while let Some(event) = window.poll_event() {
            sfegui.add_event(&event);
            match event {
                Event::Closed
                | Event::KeyPressed {
                    code: Key::Escape, ..
                } => window.close(),
                Event::KeyPressed { code, .. } => track_key(&mut input, code, true),
                Event::KeyReleased { code, .. } => track_key(&mut input, code, false),
                Event::LostFocus => input = InputState::default(),
                _ => {}
            }
        }

        scene.update(&Frame {
            dt: dt as f64,
            input,
        });

        let snapshot = scene.snapshot();

        window.clear(Color::BLACK);
        let (_, offset) = fit(canvas * scale, window_size);
        renderer::draw(&mut window, &snapshot, &store, &font, scale, offset);

        if config.physics.debug {
            let di = sfegui
                .run(&mut window, |_rw, ctx| {
                    egui::Window::new("Debug")
                        .default_pos((10.0, 60.0))
                        .collapsible(true)
                        .resizable(false)
                        .show(ctx, |ui| {
                            ui.label(format!("FPS: {:.0}", 1.0 / dt.max(f32::EPSILON)));
                            ui.label(format!("Camera: {:.0}, {:.0}", snapshot.scroll.x, snapshot.scroll.y));
                            ui.separator();
                            ui.label(format!("Bodies: {}", snapshot.debug.len()));
                            ui.label(format!("Quadtree cells: {}", snapshot.quads.len()));
                        });
                })
                .map_err(|e| anyhow!("egui frame failed: {e:?}"))?;

            sfegui.draw(di, &mut window, None);
        }

        window.display();
    }

    Ok(())
}
