//! # Constellation Backdrop
//!
//! The full backdrop: 2000 drifting particles, pointer bulge, proximity
//! links over the first 100.
//!
//! Run with: `cargo run --example backdrop --release`
//!
//! Controls: move the mouse to bulge the cloud, scroll to move the
//! camera, Space pauses, T toggles the theme, Escape quits.

use constel::prelude::*;

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2000);

    println!("=== constel backdrop ===");
    println!("Particles: {}", count);
    println!("Links: threshold 15 over the first 100 particles");
    println!();
    println!("Space pauses, T toggles the theme, Escape quits.");

    let result = Backdrop::new()
        .with_particle_count(count)
        .with_extent(150.0)
        .with_links(LinkConfig {
            scan_limit: 100,
            threshold: 15.0,
            max_segments: 100,
        })
        .with_title("constel backdrop")
        .run();

    if let Err(e) = result {
        eprintln!("backdrop failed: {}", e);
        std::process::exit(1);
    }
}
