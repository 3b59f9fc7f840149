//! # constel - Constellation Particle Backdrop
//!
//! An animated backdrop of drifting points with proximity-linked line
//! segments: a fixed cloud ripples on a wave field, bulges toward the
//! pointer, and nearby particles are joined by ephemeral links rebuilt
//! every frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use constel::prelude::*;
//!
//! fn main() -> Result<(), BackdropError> {
//!     Backdrop::new()
//!         .with_particle_count(2000)
//!         .with_extent(150.0)
//!         .with_links(LinkConfig {
//!             scan_limit: 100,
//!             threshold: 15.0,
//!             max_segments: 100,
//!         })
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! [`ParticleField`] owns the rest geometry: positions uniform in a
//! bounding cube, colors sampled from a [`Palette`], sizes uniform in
//! `[0, size_max)`. All of it is immutable after creation. Motion is a
//! pure function of rest position, elapsed time, and the smoothed
//! pointer - nothing integrates, so the cloud can never wander off.
//!
//! ### Proximity links
//!
//! [`ProximityLinker`] scans a prefix of the displaced positions each
//! frame and emits a segment for every pair closer than a threshold, up
//! to a fixed budget, in deterministic scan order. The scan is
//! deliberately the naive pairwise pass over a small prefix; see
//! [`LinkConfig`].
//!
//! ### Driving it yourself
//!
//! [`Backdrop::run`] owns a winit window and ticks the simulation once
//! per frame. The simulation types have no window or GPU in their
//! signatures, so a host with its own render loop can call
//! [`ParticleField::update_pointer`], [`ParticleField::displace_into`],
//! and [`ProximityLinker::compute`] directly and draw the results with
//! whatever it likes.
//!
//! ## Frame order
//!
//! One tick per displayed frame, in order: advance the clock, smooth the
//! pointer (at most once per frame), displace every particle into a fresh
//! position buffer, rebuild the segment buffer, draw. Everything is
//! synchronous on the frame thread.

mod backdrop;
pub mod camera;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod linker;
pub mod pointer;
pub mod time;
pub mod visuals;

pub use backdrop::Backdrop;
pub use camera::{drift_rotation, Camera};
pub use error::{BackdropError, ConfigError, GpuError};
pub use field::{displaced_position, smoothstep, wave_offset, FieldConfig, ParticleField};
pub use glam::{Vec2, Vec3};
pub use input::Input;
pub use linker::{LineSegment, LinkConfig, ProximityLinker};
pub use pointer::PointerState;
pub use time::Time;
pub use visuals::{BlendMode, Palette, Theme, VisualConfig};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use constel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::Backdrop;
    pub use crate::camera::Camera;
    pub use crate::error::{BackdropError, ConfigError};
    pub use crate::field::{FieldConfig, ParticleField};
    pub use crate::linker::{LineSegment, LinkConfig, ProximityLinker};
    pub use crate::pointer::PointerState;
    pub use crate::time::Time;
    pub use crate::visuals::{BlendMode, Palette, Theme, VisualConfig};
    pub use crate::{Vec2, Vec3};
}
