use crate::collision::Aabb;

/// Make sure not to put a big object as the generic
/// type parameter since there's a lot of cloning.
#[derive(Debug, Clone)]
pub struct QuadTree<T: Clone> {
    boundary: Aabb,
    capacity: usize,
    items: Vec<(Aabb, T)>,
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Clone> QuadTree<T> {
    pub fn new(capacity: usize, boundary: Aabb) -> Self {
        Self {
            capacity: capacity.max(1),
            boundary,
            items: Vec::with_capacity(capacity),
            children: None,
        }
    }

    pub fn boundary(&self) -> Aabb {
        self.boundary
    }

    pub fn children(&self) -> Option<&[QuadTree<T>; 4]> {
        self.children.as_deref()
    }

    /// Number of stored items. A box that straddles quadrants is counted
    /// once per quadrant holding it.
    pub fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map(|i| i.iter().map(|i| i.len()).sum())
                .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get everything whose box touches the specified area
    pub fn query(&self, area: &Aabb) -> Vec<T> {
        let mut found = vec![];

        if !self.boundary.intersects(area) {
            return found;
        }

        found.extend(
            self.items
                .iter()
                .filter(|(bounds, _)| bounds.intersects(area))
                .map(|(_, data)| data.clone()),
        );

        if let Some(children) = &self.children {
            children
                .iter()
                .map(|c| c.query(area))
                .for_each(|i| found.extend(i));
        }

        found
    }

    pub fn push(&mut self, bounds: Aabb, data: T) {
        if !self.boundary.intersects(&bounds) {
            return;
        }

        if self.items.len() < self.capacity {
            self.items.push((bounds, data));
            return;
        }

        // sub-divide into 4 parts

        if self.children.is_none() {
            let min = self.boundary.min;
            let half = self.boundary.size() * 0.5;
            let mid = min + half;

            self.children = Some(Box::new([
                // top left
                QuadTree::new(self.capacity, Aabb::new(min, mid)),
                // top right
                QuadTree::new(
                    self.capacity,
                    Aabb::new(
                        glam::DVec2::new(mid.x, min.y),
                        glam::DVec2::new(self.boundary.max.x, mid.y),
                    ),
                ),
                // bottom left
                QuadTree::new(
                    self.capacity,
                    Aabb::new(
                        glam::DVec2::new(min.x, mid.y),
                        glam::DVec2::new(mid.x, self.boundary.max.y),
                    ),
                ),
                // bottom right
                QuadTree::new(self.capacity, Aabb::new(mid, self.boundary.max)),
            ]));
        }

        if let Some(children) = self.children.as_mut() {
            children
                .iter_mut()
                .for_each(|c| c.push(bounds, data.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;

    fn world() -> Aabb {
        Aabb::new(DVec2::ZERO, DVec2::new(1280.0, 640.0))
    }

    fn square(x: f64, y: f64) -> Aabb {
        Aabb::from_center(DVec2::new(x, y), DVec2::splat(20.0))
    }

    #[test]
    fn query_finds_only_nearby_items() {
        let mut qt = QuadTree::new(2, world());
        for (i, x) in [100.0, 300.0, 500.0, 900.0, 1200.0].into_iter().enumerate() {
            qt.push(square(x, 100.0), i);
        }

        let mut hits = qt.query(&square(310.0, 105.0));
        hits.dedup();
        assert_eq!(hits, vec![1]);
        assert!(qt.query(&square(700.0, 500.0)).is_empty());
    }

    #[test]
    fn items_outside_the_boundary_are_dropped() {
        let mut qt = QuadTree::new(4, world());
        qt.push(square(-100.0, -100.0), 0);
        assert!(qt.is_empty());
    }

    #[test]
    fn subdivides_when_full() {
        let mut qt = QuadTree::new(1, world());
        qt.push(square(100.0, 100.0), 0);
        assert!(qt.children().is_none());
        qt.push(square(1000.0, 500.0), 1);
        assert!(qt.children().is_some());
        assert_eq!(qt.query(&square(1000.0, 500.0)), vec![1]);
    }
}
