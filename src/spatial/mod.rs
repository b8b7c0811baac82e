//! Neighbor search strategies.
//!
//! Connection finding asks one question per particle: which other particles
//! might be within the connection distance? Three interchangeable answers are
//! provided behind the [`NeighborIndex`] trait:
//!
//! | Strategy | Build | Query |
//! |----------|-------|-------|
//! | [`BruteForce`] | nothing | every later particle, O(n) |
//! | [`GridIndex`] | O(n) hash into cells | 3x3 cell block |
//! | [`QuadTreeIndex`] | O(n log n) tree | rectangle range query |
//!
//! Every index only reports candidates with a larger slice index than the
//! querying particle, so each unordered pair is tested exactly once no matter
//! which strategy is active. Candidates are an over-approximation; the exact
//! distance test happens in [`ParticleField`](crate::field::ParticleField).

pub mod grid;
pub mod quadtree;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use grid::UniformGrid;
use quadtree::{Indexed, QuadTree, Rect};

/// A spatial index rebuilt from particle positions every frame.
pub trait NeighborIndex {
    /// Short name for logs and window titles.
    fn name(&self) -> &'static str;

    /// Discard previous contents and index `positions`.
    ///
    /// `bounds` is the canvas size; positions may lie outside it when the
    /// boundary policy lets particles escape.
    fn rebuild(&mut self, positions: &[Vec2], bounds: Vec2);

    /// Append candidate neighbors `j > index` of `positions[index]` to `out`.
    fn candidates(&self, index: usize, positions: &[Vec2], out: &mut Vec<usize>);
}

/// Which neighbor index a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeighborStrategy {
    BruteForce,
    /// `cell_size` defaults to the connection distance.
    Grid {
        #[serde(default)]
        cell_size: Option<f32>,
    },
    QuadTree {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
}

fn default_capacity() -> usize {
    4
}

impl Default for NeighborStrategy {
    fn default() -> Self {
        NeighborStrategy::Grid { cell_size: None }
    }
}

impl NeighborStrategy {
    /// Quad-tree with the default node capacity.
    pub fn quad_tree() -> Self {
        NeighborStrategy::QuadTree {
            capacity: default_capacity(),
        }
    }

    /// Check the strategy parameters against the connection distance.
    pub fn validate(&self, connection_distance: f32) -> Result<(), ConfigError> {
        match *self {
            NeighborStrategy::BruteForce => Ok(()),
            NeighborStrategy::Grid { cell_size } => {
                let size = cell_size.unwrap_or(connection_distance);
                if !(size.is_finite() && size > 0.0) {
                    return Err(ConfigError::InvalidCellSize(size));
                }
                Ok(())
            }
            NeighborStrategy::QuadTree { capacity } => {
                if capacity == 0 {
                    return Err(ConfigError::ZeroCapacity);
                }
                Ok(())
            }
        }
    }

    /// Build an empty index for the given connection distance.
    pub fn build(&self, connection_distance: f32) -> Result<Box<dyn NeighborIndex>, ConfigError> {
        self.validate(connection_distance)?;
        Ok(match *self {
            NeighborStrategy::BruteForce => Box::new(BruteForce),
            NeighborStrategy::Grid { cell_size } => {
                let size = cell_size.unwrap_or(connection_distance);
                if size < connection_distance {
                    log::warn!(
                        "grid cell size {} is smaller than the connection distance {}; neighbors beyond the 3x3 block will be missed",
                        size,
                        connection_distance
                    );
                }
                Box::new(GridIndex::new(size))
            }
            NeighborStrategy::QuadTree { capacity } => Box::new(QuadTreeIndex::new(capacity, connection_distance)),
        })
    }
}

impl fmt::Display for NeighborStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborStrategy::BruteForce => write!(f, "brute-force"),
            NeighborStrategy::Grid { cell_size: Some(s) } => write!(f, "grid ({}px cells)", s),
            NeighborStrategy::Grid { cell_size: None } => write!(f, "grid"),
            NeighborStrategy::QuadTree { capacity } => write!(f, "quad-tree (capacity {})", capacity),
        }
    }
}

/// Pairwise scan with no index.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl NeighborIndex for BruteForce {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn rebuild(&mut self, _positions: &[Vec2], _bounds: Vec2) {}

    fn candidates(&self, index: usize, positions: &[Vec2], out: &mut Vec<usize>) {
        out.extend(index + 1..positions.len());
    }
}

/// [`UniformGrid`] adapted to the [`NeighborIndex`] contract.
#[derive(Debug, Clone)]
pub struct GridIndex {
    grid: UniformGrid,
}

impl GridIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: UniformGrid::new(cell_size),
        }
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }
}

impl NeighborIndex for GridIndex {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn rebuild(&mut self, positions: &[Vec2], _bounds: Vec2) {
        self.grid.clear();
        self.grid.insert_all(positions);
    }

    fn candidates(&self, index: usize, positions: &[Vec2], out: &mut Vec<usize>) {
        let start = out.len();
        self.grid.query_neighbors(positions[index], out);
        let mut keep = start;
        for read in start..out.len() {
            if out[read] > index {
                out[keep] = out[read];
                keep += 1;
            }
        }
        out.truncate(keep);
    }
}

/// Fresh quad-tree per frame, queried with a square of half-extent equal to
/// the connection distance.
#[derive(Debug, Clone)]
pub struct QuadTreeIndex {
    capacity: usize,
    reach: f32,
    tree: Option<QuadTree<Indexed>>,
}

impl QuadTreeIndex {
    pub fn new(capacity: usize, reach: f32) -> Self {
        Self {
            capacity,
            reach,
            tree: None,
        }
    }

    /// The tree built by the last [`NeighborIndex::rebuild`].
    pub fn tree(&self) -> Option<&QuadTree<Indexed>> {
        self.tree.as_ref()
    }
}

/// Root boundary covering the canvas and every position outside it.
///
/// Padded by a pixel so rounding in the center/half-extent form never
/// excludes an extreme position.
pub fn covering_rect(positions: &[Vec2], bounds: Vec2) -> Rect {
    let (min, max) = positions
        .iter()
        .fold((Vec2::ZERO, bounds), |(min, max), &p| (min.min(p), max.max(p)));
    Rect::from_corners(min - Vec2::ONE, max + Vec2::ONE)
}

impl NeighborIndex for QuadTreeIndex {
    fn name(&self) -> &'static str {
        "quad-tree"
    }

    fn rebuild(&mut self, positions: &[Vec2], bounds: Vec2) {
        let mut tree = QuadTree::new(covering_rect(positions, bounds), self.capacity);
        for (index, &position) in positions.iter().enumerate() {
            if !tree.insert(Indexed { index, position }) {
                log::warn!("quad-tree rejected particle {} at ({}, {})", index, position.x, position.y);
            }
        }
        self.tree = Some(tree);
    }

    fn candidates(&self, index: usize, positions: &[Vec2], out: &mut Vec<usize>) {
        let Some(tree) = &self.tree else {
            return;
        };
        let range = Rect::around(positions[index], self.reach);
        tree.query_with(&range, &mut |p: &Indexed| {
            if p.index > index {
                out.push(p.index);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> Vec<Vec2> {
        vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(300.0, 300.0),
            Vec2::new(15.0, 30.0),
        ]
    }

    fn sorted_candidates(index: &dyn NeighborIndex, i: usize, positions: &[Vec2]) -> Vec<usize> {
        let mut out = Vec::new();
        index.candidates(i, positions, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn test_brute_force_returns_later_indices() {
        let p = positions();
        assert_eq!(sorted_candidates(&BruteForce, 1, &p), vec![2, 3]);
        assert!(sorted_candidates(&BruteForce, 3, &p).is_empty());
    }

    #[test]
    fn test_grid_index_filters_earlier_and_far() {
        let p = positions();
        let mut index = GridIndex::new(50.0);
        index.rebuild(&p, Vec2::new(400.0, 400.0));
        assert_eq!(sorted_candidates(&index, 0, &p), vec![1, 3]);
        assert_eq!(sorted_candidates(&index, 1, &p), vec![3]);
    }

    #[test]
    fn test_quadtree_index_range_query() {
        let p = positions();
        let mut index = QuadTreeIndex::new(1, 50.0);
        index.rebuild(&p, Vec2::new(400.0, 400.0));
        assert_eq!(index.tree().map(|t| t.len()), Some(4));
        assert_eq!(sorted_candidates(&index, 0, &p), vec![1, 3]);
        assert!(sorted_candidates(&index, 2, &p).is_empty());
    }

    #[test]
    fn test_covering_rect_includes_escaped_points() {
        let rect = covering_rect(&[Vec2::new(-20.0, 50.0), Vec2::new(10.0, 130.0)], Vec2::new(100.0, 100.0));
        assert!(rect.contains(Vec2::new(-20.0, 50.0)));
        assert!(rect.contains(Vec2::new(10.0, 130.0)));
        assert!(rect.contains(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_strategy_validation() {
        assert!(NeighborStrategy::default().build(120.0).is_ok());
        assert!(matches!(
            NeighborStrategy::Grid { cell_size: Some(0.0) }.validate(120.0),
            Err(ConfigError::InvalidCellSize(_))
        ));
        assert!(matches!(
            NeighborStrategy::QuadTree { capacity: 0 }.build(120.0),
            Err(ConfigError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_strategy_serde_names() {
        let s: NeighborStrategy = serde_json::from_str(r#"{"kind":"quad_tree"}"#).unwrap();
        assert_eq!(s, NeighborStrategy::quad_tree());
        let s: NeighborStrategy = serde_json::from_str(r#"{"kind":"grid","cell_size":80.0}"#).unwrap();
        assert_eq!(s, NeighborStrategy::Grid { cell_size: Some(80.0) });
        assert_eq!(NeighborStrategy::BruteForce.to_string(), "brute-force");
    }
}
