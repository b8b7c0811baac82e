//! Cross-module properties of the particle field.

use std::time::{Duration, Instant};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use plexus::canvas::PixelCanvas;
use plexus::config::FieldConfig;
use plexus::controller::{ClearMode, Controller, FrameOutcome, ManualScheduler};
use plexus::field::ParticleField;
use plexus::particle::{Behavior, BoundaryPolicy, Particle};
use plexus::pointer::{Pointer, PointerConfig};
use plexus::render::connection_opacity;
use plexus::spatial::quadtree::{QuadTree, Rect, MAX_DEPTH};
use plexus::spatial::NeighborStrategy;

fn scattered(seed: u64, count: usize, extent: Vec2, margin: f32) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let position = Vec2::new(
                rng.gen_range(-margin..extent.x + margin),
                rng.gen_range(-margin..extent.y + margin),
            );
            Particle::new(position, Vec2::ZERO, 1.0)
        })
        .collect()
}

fn connected_pairs(strategy: NeighborStrategy, particles: Vec<Particle>, distance: f32) -> Vec<(usize, usize, f32)> {
    let config = FieldConfig::default()
        .with_connection_distance(distance)
        .with_strategy(strategy);
    let mut field = ParticleField::from_particles(config, 640, 480, particles).unwrap();
    let mut pairs: Vec<_> = field
        .find_connections()
        .iter()
        .map(|c| (c.a, c.b, c.opacity))
        .collect();
    pairs.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
    pairs
}

#[test]
fn test_strategies_agree_on_connections() {
    for seed in 0..4 {
        for distance in [15.0, 60.0, 150.0] {
            let particles = scattered(seed, 300, Vec2::new(640.0, 480.0), 40.0);
            let expected = connected_pairs(NeighborStrategy::BruteForce, particles.clone(), distance);
            assert!(!expected.is_empty());

            for strategy in [
                NeighborStrategy::default(),
                NeighborStrategy::Grid { cell_size: Some(distance * 1.5) },
                NeighborStrategy::quad_tree(),
                NeighborStrategy::QuadTree { capacity: 1 },
            ] {
                let found = connected_pairs(strategy, particles.clone(), distance);
                assert_eq!(found.len(), expected.len(), "{} seed {} distance {}", strategy, seed, distance);
                for (f, e) in found.iter().zip(&expected) {
                    assert_eq!((f.0, f.1), (e.0, e.1), "{}", strategy);
                    assert!((f.2 - e.2).abs() < 1e-6);
                }
            }
        }
    }
}

#[test]
fn test_connections_are_unique_and_ordered() {
    let particles = scattered(9, 200, Vec2::new(640.0, 480.0), 0.0);
    let pairs = connected_pairs(NeighborStrategy::quad_tree(), particles, 80.0);
    for window in pairs.windows(2) {
        assert!((window[0].0, window[0].1) < (window[1].0, window[1].1));
    }
    assert!(pairs.iter().all(|&(a, b, _)| a < b));
}

#[test]
fn test_coincident_particles_connect_at_full_opacity() {
    let particles = vec![
        Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0),
        Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0),
    ];
    let pairs = connected_pairs(NeighborStrategy::quad_tree(), particles, 50.0);
    assert_eq!(pairs, vec![(0, 1, 1.0)]);
}

#[test]
fn test_quadtree_points_stay_within_boundaries() {
    let mut rng = StdRng::seed_from_u64(17);
    let root = Rect::new(0.0, 0.0, 100.0, 100.0);
    let mut tree = QuadTree::new(root, 3);
    let mut inserted = 0;
    for _ in 0..1000 {
        let p = Vec2::new(rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0));
        if tree.insert(p) {
            inserted += 1;
            assert!(root.contains(p));
        }
    }
    assert_eq!(tree.len(), inserted);

    tree.for_each_node(&mut |node: &QuadTree<Vec2>| {
        for &p in node.points() {
            assert!(node.boundary().contains(p));
        }
        if node.depth() < MAX_DEPTH {
            assert!(node.points().len() <= node.capacity());
        }
        if node.is_divided() {
            assert_eq!(node.points().len(), node.capacity());
        }
    });

    let range = Rect::new(25.0, -30.0, 40.0, 20.0);
    let found = tree.query_range(&range);
    assert!(!found.is_empty());
    assert!(found.iter().all(|&p| range.contains(p)));
}

#[test]
fn test_quadtree_root_query_returns_inserted_set() {
    let mut rng = StdRng::seed_from_u64(23);
    let root = Rect::new(320.0, 240.0, 320.0, 240.0);
    let mut tree = QuadTree::new(root, 2);

    let mut inserted: Vec<Vec2> = (0..2000)
        .map(|_| Vec2::new(rng.gen_range(0.0..=640.0), rng.gen_range(0.0..=480.0)))
        .collect();
    for &p in &inserted {
        assert!(tree.insert(p));
    }

    let mut found = tree.query_range(&root);
    let by_xy = |a: &Vec2, b: &Vec2| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y));
    found.sort_by(by_xy);
    inserted.sort_by(by_xy);
    assert_eq!(found.len(), inserted.len());
    assert_eq!(found, inserted);
}

#[test]
fn test_quadtree_duplicates_stop_at_max_depth() {
    let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1);
    for _ in 0..50 {
        assert!(tree.insert(Vec2::new(3.0, 3.0)));
    }
    assert_eq!(tree.len(), 50);
    let mut deepest = 0;
    tree.for_each_node(&mut |node: &QuadTree<Vec2>| deepest = deepest.max(node.depth()));
    assert_eq!(deepest, MAX_DEPTH);
}

#[test]
fn test_pointer_radius_stays_clamped() {
    let config = PointerConfig {
        radius: 50.0,
        min_radius: 20.0,
        max_radius: 80.0,
        ..PointerConfig::default()
    };
    let mut pointer = Pointer::new(&config);
    for _ in 0..100 {
        pointer.increase_radius(7.0);
        assert!(pointer.radius() <= 80.0);
    }
    assert_eq!(pointer.radius(), 80.0);
    for _ in 0..100 {
        pointer.reduce_radius(3.0);
        assert!(pointer.radius() >= 20.0);
    }
    assert_eq!(pointer.radius(), 20.0);
}

#[test]
fn test_opacity_fades_with_distance() {
    let threshold_sq = 120.0 * 120.0;
    let mut last = f32::INFINITY;
    for d in (0..120).step_by(5) {
        let d = d as f32;
        let alpha = connection_opacity(d * d, threshold_sq, 1.0).unwrap();
        assert!(alpha <= last);
        assert!((0.0..=1.0).contains(&alpha));
        last = alpha;
    }
    assert_eq!(connection_opacity(threshold_sq, threshold_sq, 1.0), None);

    let alpha = connection_opacity(100.0, threshold_sq, 1.0).unwrap();
    assert!((alpha - 0.9167).abs() < 1e-4);
    let half = connection_opacity(100.0, threshold_sq, 0.5).unwrap();
    assert!((half - alpha * 0.5).abs() < 1e-6);
}

#[test]
fn test_reflected_particles_stay_inside() {
    let bounds = Vec2::new(200.0, 120.0);
    let mut rng = StdRng::seed_from_u64(5);
    let behavior = Behavior {
        boundary: BoundaryPolicy::Reflect,
        ..Behavior::default()
    };
    let mut particles: Vec<Particle> = (0..100)
        .map(|_| Particle::random(&mut rng, bounds, 3.0, 6.0).with_behavior(behavior))
        .collect();

    for frame in 0..500 {
        let step = [0.5, 1.0, 3.0][frame % 3];
        for p in &mut particles {
            p.advance(bounds, step);
            assert!(p.position.x >= p.radius && p.position.x <= bounds.x - p.radius);
            assert!(p.position.y >= p.radius && p.position.y <= bounds.y - p.radius);
        }
    }
}

#[test]
fn test_wrapped_particles_stay_on_canvas() {
    let bounds = Vec2::new(50.0, 50.0);
    let behavior = Behavior {
        boundary: BoundaryPolicy::Wrap,
        ..Behavior::default()
    };
    let mut p = Particle::new(Vec2::new(49.0, 1.0), Vec2::new(3.0, -4.0), 1.0).with_behavior(behavior);
    for _ in 0..100 {
        p.move_within(bounds);
        assert!((0.0..50.0).contains(&p.position.x));
        assert!((0.0..50.0).contains(&p.position.y));
    }
}

#[test]
fn test_controller_applies_debounced_resize() {
    let config = FieldConfig::default().with_particle_count(30).with_clear(ClearMode::Hard);
    let field = ParticleField::with_seed(config.clone(), 300, 200, 2).unwrap();
    let mut controller = Controller::new(field, ManualScheduler::default(), &config);
    let mut canvas = PixelCanvas::new(300, 200).unwrap();
    controller.start();

    let t0 = Instant::now();
    controller.on_resize(400, 300, t0);
    controller.on_resize(500, 400, t0 + Duration::from_millis(100));
    assert_eq!(controller.poll_resize(t0 + Duration::from_millis(200)).unwrap(), None);
    assert_eq!(controller.scene().size(), (300, 200));

    let settled = controller.poll_resize(t0 + Duration::from_millis(400)).unwrap();
    assert_eq!(settled, Some((500, 400)));
    assert_eq!(controller.scene().size(), (500, 400));

    canvas.resize(500, 400).unwrap();
    let request = controller.scheduler_mut().take_request().unwrap();
    let at = t0 + Duration::from_millis(400);
    assert_eq!(controller.on_requested_frame(request, at, &mut canvas), FrameOutcome::Ticked);
    assert!(controller
        .scene()
        .particles()
        .iter()
        .all(|p| p.position.x <= 500.0 && p.position.y <= 400.0));
}
