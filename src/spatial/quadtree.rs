//! Point quad-tree with center/half-extent rectangles.
//!
//! A node stores up to `capacity` points. The first insert beyond capacity
//! subdivides the node into four children (northeast, northwest, southeast,
//! southwest, with y growing downwards) and every later insert is delegated
//! to the first child whose boundary contains the point. Subdivision happens
//! at most once per node.
//!
//! ```
//! use glam::Vec2;
//! use plexus::spatial::quadtree::{QuadTree, Rect};
//!
//! let boundary = Rect::new(0.0, 0.0, 10.0, 10.0);
//! let mut tree = QuadTree::new(boundary, 1);
//! assert!(tree.insert(Vec2::new(1.0, 1.0)));
//! assert!(tree.insert(Vec2::new(-1.0, -1.0)));
//! assert!(!tree.insert(Vec2::new(50.0, 0.0)));
//!
//! assert_eq!(tree.query_range(&boundary).len(), 2);
//! ```

use glam::Vec2;

/// Recursion limit. Nodes at this depth keep any overflow points instead of
/// subdividing, so coincident points cannot recurse forever.
pub const MAX_DEPTH: u32 = 12;

/// Axis-aligned rectangle stored as center plus half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    /// Half-width.
    pub w: f32,
    /// Half-height.
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of half-extent `reach` centered on `center`.
    pub fn around(center: Vec2, reach: f32) -> Self {
        Self::new(center.x, center.y, reach, reach)
    }

    /// Smallest rectangle spanning the two corners.
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        let center = (min + max) * 0.5;
        let half = (max - min) * 0.5;
        Self::new(center.x, center.y, half.x, half.y)
    }

    /// Inclusive on every edge.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x - self.w
            && point.x <= self.x + self.w
            && point.y >= self.y - self.h
            && point.y <= self.y + self.h
    }

    /// True when the rectangles overlap or touch.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.x - other.w > self.x + self.w
            || other.x + other.w < self.x - self.w
            || other.y - other.h > self.y + self.h
            || other.y + other.h < self.y - self.h)
    }

    /// The four quadrants in insertion order: NE, NW, SE, SW.
    fn quadrants(&self) -> [Rect; 4] {
        let w = self.w / 2.0;
        let h = self.h / 2.0;
        [
            Rect::new(self.x + w, self.y - h, w, h),
            Rect::new(self.x - w, self.y - h, w, h),
            Rect::new(self.x + w, self.y + h, w, h),
            Rect::new(self.x - w, self.y + h, w, h),
        ]
    }
}

/// Anything with a position can live in a quad-tree.
pub trait Locate {
    fn position(&self) -> Vec2;
}

impl Locate for Vec2 {
    #[inline]
    fn position(&self) -> Vec2 {
        *self
    }
}

/// A position tagged with the index of the particle it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indexed {
    pub index: usize,
    pub position: Vec2,
}

impl Locate for Indexed {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// A quad-tree node. The root is just a node at depth zero.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    boundary: Rect,
    capacity: usize,
    depth: u32,
    points: Vec<T>,
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Locate> QuadTree<T> {
    /// Create an empty root. `capacity` must be at least 1.
    pub fn new(boundary: Rect, capacity: usize) -> Self {
        Self::with_depth(boundary, capacity, 0)
    }

    fn with_depth(boundary: Rect, capacity: usize, depth: u32) -> Self {
        Self {
            boundary,
            capacity,
            depth,
            points: Vec::with_capacity(capacity),
            children: None,
        }
    }

    /// Insert a point. Returns `false` only when it lies outside the boundary.
    pub fn insert(&mut self, item: T) -> bool {
        let position = item.position();
        if !self.boundary.contains(position) {
            return false;
        }

        if self.points.len() < self.capacity || self.depth >= MAX_DEPTH {
            self.points.push(item);
            return true;
        }

        let (boundary, capacity, depth) = (self.boundary, self.capacity, self.depth);
        let children = self.children.get_or_insert_with(|| {
            let [ne, nw, se, sw] = boundary.quadrants();
            Box::new([
                QuadTree::with_depth(ne, capacity, depth + 1),
                QuadTree::with_depth(nw, capacity, depth + 1),
                QuadTree::with_depth(se, capacity, depth + 1),
                QuadTree::with_depth(sw, capacity, depth + 1),
            ])
        });

        match children.iter_mut().find(|child| child.boundary.contains(position)) {
            Some(child) => child.insert(item),
            None => {
                // Quadrants tile the parent, so only float rounding lands here
                log::warn!(
                    "quad-tree insert at ({}, {}) fell through all quadrants at depth {}; keeping it on the parent",
                    position.x,
                    position.y,
                    depth
                );
                self.points.push(item);
                true
            }
        }
    }

    /// Visit every stored point contained in `range`.
    pub fn query_with<F: FnMut(&T)>(&self, range: &Rect, visit: &mut F) {
        if !self.boundary.intersects(range) {
            return;
        }
        for point in &self.points {
            if range.contains(point.position()) {
                visit(point);
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_with(range, visit);
            }
        }
    }

    /// Append every stored point contained in `range` to `found`.
    pub fn query<'a>(&self, range: &Rect, found: &'a mut Vec<T>) -> &'a mut Vec<T>
    where
        T: Clone,
    {
        self.query_with(range, &mut |p: &T| found.push(p.clone()));
        found
    }

    /// Convenience form of [`QuadTree::query`] with a fresh accumulator.
    pub fn query_range(&self, range: &Rect) -> Vec<T>
    where
        T: Clone,
    {
        let mut found = Vec::new();
        self.query(range, &mut found);
        found
    }

    #[inline]
    pub fn boundary(&self) -> &Rect {
        &self.boundary
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Points stored directly on this node.
    #[inline]
    pub fn points(&self) -> &[T] {
        &self.points
    }

    #[inline]
    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }

    /// Children in NE, NW, SE, SW order once subdivided.
    pub fn children(&self) -> Option<&[QuadTree<T>; 4]> {
        self.children.as_deref()
    }

    /// Total points in this subtree.
    pub fn len(&self) -> usize {
        self.points.len() + self.children().map_or(0, |c| c.iter().map(QuadTree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth-first walk over every node, parents before children.
    pub fn for_each_node<F: FnMut(&QuadTree<T>)>(&self, visit: &mut F) {
        visit(self);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.for_each_node(visit);
            }
        }
    }
}
