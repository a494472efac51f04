use eframe::egui::{Vec2, vec2};

const QUADTREE_LEAF_CAPACITY: usize = 8;
const QUADTREE_MAX_DEPTH: usize = 12;

/// Square cell addressed by its minimum corner.
///
/// Quadrant numbering: bit 0 set for the right half, bit 1 set for the lower
/// half (screen coordinates, y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct QuadBounds {
    pub(crate) min: Vec2,
    pub(crate) side: f32,
}

impl QuadBounds {
    /// Smallest padded square around `points`; `None` when any coordinate
    /// is non-finite.
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (low, high) = rest.iter().fold((*first, *first), |(low, high), point| {
            (low.min(*point), high.max(*point))
        });
        if !low.is_finite() || !high.is_finite() {
            return None;
        }

        let extent = high - low;
        let side = extent.x.max(extent.y).max(1.0) + 2.0;
        let middle = (low + high) * 0.5;
        Some(Self {
            min: middle - Vec2::splat(side * 0.5),
            side,
        })
    }

    pub(crate) fn center(self) -> Vec2 {
        self.min + Vec2::splat(self.side * 0.5)
    }

    pub(crate) fn contains(self, point: Vec2) -> bool {
        let max = self.min + Vec2::splat(self.side);
        (self.min.x..=max.x).contains(&point.x) && (self.min.y..=max.y).contains(&point.y)
    }

    fn child(self, quadrant: usize) -> Self {
        let half = self.side * 0.5;
        let step = vec2((quadrant & 1) as f32, (quadrant >> 1) as f32);
        Self {
            min: self.min + step * half,
            side: half,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let center = self.center();
        usize::from(point.x >= center.x) | (usize::from(point.y >= center.y) << 1)
    }

    pub(crate) fn side_length(self) -> f32 {
        self.side
    }
}

/// Barnes-Hut cell: aggregate mass and mass-weighted centroid of its subtree.
#[derive(Debug)]
pub(crate) struct QuadNode {
    pub(crate) bounds: QuadBounds,
    pub(crate) center_of_mass: Vec2,
    pub(crate) mass: f32,
    pub(crate) count: usize,
    pub(crate) indices: Vec<usize>,
    pub(crate) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    /// Builds the tree over `positions`, weighting each point by `masses[i]`.
    ///
    /// Returns `None` for an empty or non-finite point set.
    pub(crate) fn build(positions: &[Vec2], masses: &[f32]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, masses, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        masses: &[f32],
        depth: usize,
    ) -> Self {
        let mut weighted = Vec2::ZERO;
        let mut plain = Vec2::ZERO;
        let mut mass = 0.0_f32;
        for &index in &indices {
            let weight = masses.get(index).copied().unwrap_or(1.0);
            weighted += positions[index] * weight;
            plain += positions[index];
            mass += weight;
        }

        let center_of_mass = if mass > 0.0 {
            weighted / mass
        } else if indices.is_empty() {
            bounds.center()
        } else {
            plain / indices.len() as f32
        };

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            count: indices.len(),
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= QUADTREE_MAX_DEPTH || node.indices.len() <= QUADTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            let quadrant = bounds.quadrant_for(positions[index]);
            buckets[quadrant].push(index);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            // Every point landed in one quadrant; keep descending so
            // clustered points still split, up to the depth limit.
            let Some(quadrant) = buckets.iter().position(|bucket| !bucket.is_empty()) else {
                return node;
            };
            let bucket = std::mem::take(&mut buckets[quadrant]);
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                masses,
                depth + 1,
            )));
            node.indices.clear();
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }

            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                masses,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    #[cfg(test)]
    fn leaf_point_count(&self) -> usize {
        if self.is_leaf() {
            return self.indices.len();
        }
        self.children
            .iter()
            .flatten()
            .map(|child| child.leaf_point_count())
            .sum()
    }
}
