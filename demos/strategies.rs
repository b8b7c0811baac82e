//! # Neighbor Strategy Comparison
//!
//! Builds the same seeded field under each neighbor strategy, checks that
//! they agree on the connections, and prints how long the search took.
//!
//! Run with: `cargo run --example strategies --release -- [COUNT]`

use std::time::Instant;

use plexus::prelude::*;

const FRAMES: u32 = 120;

fn main() {
    env_logger::init();

    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2000);

    println!("=== Plexus Neighbor Strategies ===");
    println!("Particles: {}", count);
    println!("Surface: 1920x1080, {} frames each", FRAMES);
    println!();

    let strategies = [
        NeighborStrategy::BruteForce,
        NeighborStrategy::default(),
        NeighborStrategy::quad_tree(),
    ];

    let mut reference: Option<Vec<(usize, usize)>> = None;
    for strategy in strategies {
        let config = FieldConfig::default()
            .with_particle_count(count)
            .with_strategy(strategy);
        let mut field = match ParticleField::with_seed(config, 1920, 1080, 1) {
            Ok(field) => field,
            Err(e) => {
                eprintln!("{}: {}", strategy, e);
                continue;
            }
        };

        let mut pairs: Vec<(usize, usize)> = field.find_connections().iter().map(|c| (c.a, c.b)).collect();
        pairs.sort_unstable();
        let agrees = match &reference {
            Some(expected) => *expected == pairs,
            None => {
                reference = Some(pairs.clone());
                true
            }
        };

        let start = Instant::now();
        let mut total = 0;
        for _ in 0..FRAMES {
            total += field.find_connections().len();
        }
        let per_frame = start.elapsed() / FRAMES;

        println!(
            "{:<28} {:>7} connections  {:>10.3?}/frame  {}",
            strategy.to_string(),
            total / FRAMES as usize,
            per_frame,
            if agrees { "ok" } else { "MISMATCH" }
        );
    }
}
