use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Square cell, stored as center plus half side length.
#[derive(Clone, Copy)]
pub(super) struct CellBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl CellBounds {
    fn around(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared distance between the closest points of two cells, zero when
    /// they touch or overlap.
    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let gap = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - gap).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - gap).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        ((point.x >= self.center.x) as usize) | (((point.y >= self.center.y) as usize) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(dx, dy),
            half_extent: quarter,
        }
    }
}

/// Barnes-Hut quadtree over body positions. Interior cells carry the mass
/// (body count) and center of mass used for far-field approximation.
pub(super) struct QuadNode {
    pub(super) bounds: CellBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = CellBounds::around(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(bounds: CellBounds, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let mut center_of_mass = Vec2::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        // All points in one quadrant means splitting gains nothing.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::build_node(
                    bounds.child(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}
