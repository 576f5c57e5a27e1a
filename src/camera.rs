use glam::DVec2;

use crate::collision::Aabb;

/// Scrolling camera that eases towards a target and never leaves its bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Top-left corner of the view in world space
    pub scroll: DVec2,
    pub viewport: DVec2,
    pub bounds: Aabb,
    pub lerp: DVec2,
    pub round_pixels: bool,
}

impl Camera {
    pub fn new(viewport: DVec2, bounds: Aabb) -> Self {
        Self {
            scroll: bounds.min,
            viewport,
            bounds,
            lerp: DVec2::ONE,
            round_pixels: false,
        }
    }

    /// Ease the view centre towards `target` by `lerp` of the remaining
    /// distance on each axis.
    pub fn follow(&mut self, target: DVec2) {
        let desired = target - self.viewport * 0.5;
        self.scroll += (desired - self.scroll) * self.lerp;
        self.clamp();
    }

    /// Jump straight to `target`
    pub fn center_on(&mut self, target: DVec2) {
        self.scroll = target - self.viewport * 0.5;
        self.clamp();
    }

    fn clamp(&mut self) {
        let max = (self.bounds.max - self.viewport).max(self.bounds.min);
        self.scroll = self.scroll.clamp(self.bounds.min, max);
    }

    /// Scroll offset used for drawing
    pub fn render_scroll(&self) -> DVec2 {
        if self.round_pixels {
            self.scroll.round()
        } else {
            self.scroll
        }
    }
}

/// Uniform scale and offset that fit a `canvas` inside `parent` while
/// keeping its aspect ratio, centred on both axes.
pub fn fit(canvas: DVec2, parent: DVec2) -> (f64, DVec2) {
    if canvas.x <= 0.0 || canvas.y <= 0.0 {
        return (1.0, DVec2::ZERO);
    }

    let scale = (parent.x / canvas.x).min(parent.y / canvas.y);
    let offset = (parent - canvas * scale) * 0.5;
    (scale, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut cam = Camera::new(
            DVec2::new(700.0, 640.0),
            Aabb::new(DVec2::ZERO, DVec2::new(1280.0, 640.0)),
        );
        cam.lerp = DVec2::splat(0.05);
        cam
    }

    #[test]
    fn follow_eases_towards_the_target() {
        let mut cam = camera();
        cam.follow(DVec2::new(900.0, 320.0));
        // desired scroll x = 550, 5% of the way from 0
        assert!((cam.scroll.x - 27.5).abs() < 1e-9);
        assert_eq!(cam.scroll.y, 0.0);
    }

    #[test]
    fn scroll_stays_inside_bounds() {
        let mut cam = camera();
        cam.center_on(DVec2::new(5000.0, 5000.0));
        assert_eq!(cam.scroll, DVec2::new(580.0, 0.0));

        cam.center_on(DVec2::new(-100.0, -100.0));
        assert_eq!(cam.scroll, DVec2::ZERO);
    }

    #[test]
    fn fit_letterboxes_a_wide_parent() {
        let (scale, offset) = fit(DVec2::new(700.0, 640.0), DVec2::new(1400.0, 640.0));
        assert_eq!(scale, 1.0);
        assert_eq!(offset, DVec2::new(350.0, 0.0));

        let (scale, offset) = fit(DVec2::new(700.0, 640.0), DVec2::new(350.0, 640.0));
        assert_eq!(scale, 0.5);
        assert_eq!(offset, DVec2::new(0.0, 160.0));
    }
}
