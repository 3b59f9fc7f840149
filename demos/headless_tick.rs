//! # Headless Tick
//!
//! Drives the simulation without a window: the same per-frame sequence
//! the backdrop host runs, printing link counts instead of drawing.
//! Useful as a template for embedding the simulation in your own render
//! loop.
//!
//! Run with: `cargo run --example headless_tick`

use constel::prelude::*;

fn main() {
    let mut field = ParticleField::new(&FieldConfig {
        seed: Some(7),
        ..FieldConfig::default()
    })
    .expect("default field config is valid");

    let mut linker = ProximityLinker::new(LinkConfig::default())
        .expect("default link config is valid");

    let mut positions: Vec<Vec3> = Vec::with_capacity(field.len());
    let dt = 1.0 / 60.0;

    // Sweep the pointer across the cloud over two simulated seconds.
    for frame in 0..120u32 {
        let elapsed = frame as f32 * dt;
        let raw = Vec2::new(elapsed - 1.0, 0.0);

        field.update_pointer(raw, 0.05);
        field.displace_into(elapsed, &mut positions);
        let segments = linker.compute(&positions);

        if frame % 30 == 0 {
            println!(
                "t={:.2}s  pointer=({:+.2}, {:+.2})  links={}/{}",
                elapsed,
                field.pointer().x,
                field.pointer().y,
                segments.len(),
                linker.capacity(),
            );
        }
    }
}
