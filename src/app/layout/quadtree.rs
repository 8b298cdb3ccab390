use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Axis-aligned square region of layout space.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (vec2(f32::INFINITY, f32::INFINITY), vec2(f32::NEG_INFINITY, f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(dx, dy),
            half: quarter,
        }
    }
}

/// Barnes-Hut cell: aggregate position of every node below it.
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    pub(super) members: Vec<usize>,
    pub(super) children: Vec<Cell>,
}

impl Cell {
    pub(super) fn build(points: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(points)?;
        Some(Self::subdivide(square, (0..points.len()).collect(), points, 0))
    }

    fn subdivide(square: Square, members: Vec<usize>, points: &[Vec2], depth: usize) -> Self {
        let count = members.len();
        let centroid = if count == 0 {
            square.center
        } else {
            members.iter().map(|&index| points[index]).fold(Vec2::ZERO, |sum, p| sum + p)
                / count as f32
        };

        if depth >= MAX_DEPTH || count <= LEAF_CAPACITY {
            return Self {
                square,
                centroid,
                count,
                members,
                children: Vec::new(),
            };
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &members {
            buckets[square.quadrant_of(points[index])].push(index);
        }

        // Coincident points cannot be separated by splitting.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return Self {
                square,
                centroid,
                count,
                members,
                children: Vec::new(),
            };
        }

        let children = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(quadrant, bucket)| {
                Self::subdivide(square.quadrant(quadrant), bucket, points, depth + 1)
            })
            .collect();

        Self {
            square,
            centroid,
            count,
            members: Vec::new(),
            children,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
