use glam::DVec2;

/// Axis-aligned box, `min` is the top-left corner (y grows downward)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: DVec2, size: DVec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Touching edges count as an intersection
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains(&self, point: DVec2) -> bool {
        (self.min.x <= point.x && point.x < self.max.x)
            && (self.min.y <= point.y && point.y < self.max.y)
    }
}

/// Separation to apply to `a` so it stops overlapping `b`, along the axis
/// of least penetration. `None` when the boxes do not interpenetrate.
pub fn separation(a: &Aabb, b: &Aabb) -> Option<DVec2> {
    let dx = a.max.x.min(b.max.x) - a.min.x.max(b.min.x);
    let dy = a.max.y.min(b.max.y) - a.min.y.max(b.min.y);

    if dx <= 0.0 || dy <= 0.0 {
        return None;
    }

    let delta = a.center() - b.center();

    if dx < dy {
        Some(DVec2::new(if delta.x < 0.0 { -dx } else { dx }, 0.0))
    } else {
        Some(DVec2::new(0.0, if delta.y < 0.0 { -dy } else { dy }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_resolves_upward() {
        let player = Aabb::from_center(DVec2::new(100.0, 585.0), DVec2::new(32.0, 48.0));
        let ground = Aabb::from_center(DVec2::new(640.0, 608.0), DVec2::new(400.0, 32.0));
        // player's feet at 609, platform top at 592: not even touching horizontally
        assert_eq!(separation(&player, &ground), None);

        let player = Aabb::from_center(DVec2::new(500.0, 570.0), DVec2::new(32.0, 48.0));
        let push = separation(&player, &ground).unwrap();
        assert_eq!(push, DVec2::new(0.0, -2.0));
    }

    #[test]
    fn side_hit_resolves_horizontally() {
        let a = Aabb::from_center(DVec2::new(0.0, 0.0), DVec2::new(10.0, 10.0));
        let b = Aabb::from_center(DVec2::new(8.0, 0.0), DVec2::new(10.0, 10.0));
        assert_eq!(separation(&a, &b), Some(DVec2::new(-2.0, 0.0)));
        assert_eq!(separation(&b, &a), Some(DVec2::new(2.0, 0.0)));
    }

    #[test]
    fn edge_contact_intersects_without_penetration() {
        let a = Aabb::new(DVec2::ZERO, DVec2::new(10.0, 10.0));
        let b = Aabb::new(DVec2::new(10.0, 0.0), DVec2::new(20.0, 10.0));
        assert!(a.intersects(&b));
        assert_eq!(separation(&a, &b), None);
    }
}
