//! The particle field: rest geometry plus per-frame displacement.
//!
//! A field owns a fixed set of particles - rest position, color, and size
//! are drawn once at creation and never change. What moves every frame is
//! a derived quantity: [`ParticleField::current_position`] combines a wave
//! offset driven by elapsed time with a z-bulge toward the smoothed
//! pointer. The rest geometry is the sole input to both, so displacement
//! never accumulates drift across frames.
//!
//! # Example
//!
//! ```ignore
//! use constel::{FieldConfig, ParticleField};
//!
//! let mut field = ParticleField::new(&FieldConfig::default())?;
//! let mut positions = Vec::new();
//!
//! // Per frame:
//! field.update_pointer(pointer_ndc, 0.05);
//! field.displace_into(elapsed_secs, &mut positions);
//! ```

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::pointer::PointerState;
use crate::visuals::Palette;

/// How far a pointer in [-1, 1] reaches into world units.
const POINTER_WORLD_SCALE: f32 = 50.0;
/// Radius (world units) within which the pointer bulges particles.
const BULGE_RADIUS: f32 = 20.0;
/// Peak z-offset of the pointer bulge.
const BULGE_DEPTH: f32 = 10.0;

/// Parameters for creating a [`ParticleField`].
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of particles. Fixed for the lifetime of the field.
    pub count: usize,
    /// Side length of the bounding cube; rest positions are uniform in
    /// `[-extent/2, extent/2]` on each axis.
    pub extent: f32,
    /// Particle sizes are uniform in `[0, size_max)`.
    pub size_max: f32,
    /// Colors are sampled uniformly from this palette.
    pub palette: Palette,
    /// RNG seed for reproducible geometry. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 150.0,
            size_max: 2.0,
            palette: Palette::default(),
            seed: None,
        }
    }
}

impl FieldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ZeroParticleCount);
        }
        if !(self.extent > 0.0) {
            return Err(ConfigError::NonPositiveExtent(self.extent));
        }
        if !(self.size_max > 0.0) {
            return Err(ConfigError::NonPositiveSizeMax(self.size_max));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

/// A fixed cloud of particles with per-frame displacement.
///
/// All methods are synchronous and expect to be called from a single
/// logical frame thread; `update_pointer` at most once per frame, before
/// that frame's position queries.
#[derive(Debug, Clone)]
pub struct ParticleField {
    rest: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    pointer: PointerState,
}

impl ParticleField {
    /// Allocate a field per `config`. Fails with [`ConfigError`] on
    /// non-positive count/extent/size or an empty palette, before any
    /// sampling happens.
    pub fn new(config: &FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let stops = config.palette.colors();
        let mut rest = Vec::with_capacity(config.count);
        let mut colors = Vec::with_capacity(config.count);
        let mut sizes = Vec::with_capacity(config.count);

        for _ in 0..config.count {
            rest.push(Vec3::new(
                (rng.gen::<f32>() - 0.5) * config.extent,
                (rng.gen::<f32>() - 0.5) * config.extent,
                (rng.gen::<f32>() - 0.5) * config.extent,
            ));
            colors.push(stops[rng.gen_range(0..stops.len())]);
            sizes.push(rng.gen::<f32>() * config.size_max);
        }

        Ok(Self {
            rest,
            colors,
            sizes,
            pointer: PointerState::new(),
        })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.rest.len()
    }

    /// Whether the field holds no particles. Always false for a field
    /// built through [`ParticleField::new`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Rest position of particle `i`, as recorded at creation.
    #[inline]
    pub fn rest_position(&self, i: usize) -> Vec3 {
        self.rest[i]
    }

    /// Immutable per-particle colors.
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Immutable per-particle sizes.
    #[inline]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// The smoothed pointer as of the last `update_pointer`.
    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer.smoothed()
    }

    /// Advance the smoothed pointer one lerp step toward `raw_target`.
    ///
    /// Call at most once per frame, before `current_position` or
    /// `displace_into` for that frame.
    pub fn update_pointer(&mut self, raw_target: Vec2, smoothing_factor: f32) -> Vec2 {
        self.pointer.aim(raw_target);
        self.pointer.advance(smoothing_factor)
    }

    /// Current displaced position of particle `i`.
    ///
    /// Pure in its inputs: rest position, elapsed seconds, and the given
    /// (already smoothed) pointer. See [`displaced_position`].
    #[inline]
    pub fn current_position(&self, i: usize, elapsed_secs: f32, pointer: Vec2) -> Vec3 {
        displaced_position(self.rest[i], elapsed_secs, pointer)
    }

    /// Fill `out` with the current position of every particle, using the
    /// stored smoothed pointer. The buffer is overwritten, not appended.
    pub fn displace_into(&self, elapsed_secs: f32, out: &mut Vec<Vec3>) {
        let pointer = self.pointer.smoothed();
        out.clear();
        out.extend(
            self.rest
                .iter()
                .map(|&rest| displaced_position(rest, elapsed_secs, pointer)),
        );
    }
}

/// Clamped cubic Hermite interpolation between `edge0` and `edge1`.
///
/// `edge0 > edge1` is allowed and inverts the ramp, matching the shader
/// builtin.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Wave offset of a particle at rest position `rest` after `t` seconds.
///
/// Each axis swings on its own frequency, phase-shifted by a rest
/// coordinate so the cloud ripples instead of sloshing in unison.
#[inline]
pub fn wave_offset(rest: Vec3, t: f32) -> Vec3 {
    Vec3::new(
        (t * 0.5 + rest.y * 0.05).sin() * 2.0,
        (t * 0.3 + rest.x * 0.05).cos() * 2.0,
        (t * 0.4 + rest.z * 0.05).sin() * 1.5,
    )
}

/// Displaced position: rest + wave offset + pointer bulge.
///
/// The bulge pushes particles toward the viewer along +Z when their
/// wave-displaced XY position falls within 20 world units of the pointer
/// mapped into world space.
pub fn displaced_position(rest: Vec3, t: f32, pointer: Vec2) -> Vec3 {
    let wave = wave_offset(rest, t);
    let xy = Vec2::new(rest.x + wave.x, rest.y + wave.y);
    let dist = xy.distance(pointer * POINTER_WORLD_SCALE);
    let bulge = smoothstep(BULGE_RADIUS, 0.0, dist) * BULGE_DEPTH;
    rest + wave + Vec3::new(0.0, 0.0, bulge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field(seed: u64) -> ParticleField {
        ParticleField::new(&FieldConfig {
            count: 64,
            extent: 150.0,
            size_max: 2.0,
            palette: Palette::default(),
            seed: Some(seed),
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let bad = |config: FieldConfig| ParticleField::new(&config).unwrap_err();

        assert_eq!(
            bad(FieldConfig { count: 0, ..FieldConfig::default() }),
            ConfigError::ZeroParticleCount
        );
        assert_eq!(
            bad(FieldConfig { extent: -1.0, ..FieldConfig::default() }),
            ConfigError::NonPositiveExtent(-1.0)
        );
        assert_eq!(
            bad(FieldConfig { size_max: 0.0, ..FieldConfig::default() }),
            ConfigError::NonPositiveSizeMax(0.0)
        );
        assert_eq!(
            bad(FieldConfig { palette: Palette::new(vec![]), ..FieldConfig::default() }),
            ConfigError::EmptyPalette
        );
    }

    #[test]
    fn test_creation_samples_within_bounds() {
        let field = small_field(7);
        let palette = Palette::default();

        for i in 0..field.len() {
            let rest = field.rest_position(i);
            assert!(rest.x.abs() <= 75.0 && rest.y.abs() <= 75.0 && rest.z.abs() <= 75.0);
            assert!(field.sizes()[i] >= 0.0 && field.sizes()[i] < 2.0);
            assert!(palette.colors().contains(&field.colors()[i]));
        }
    }

    #[test]
    fn test_seeded_creation_is_reproducible() {
        let a = small_field(42);
        let b = small_field(42);
        let c = small_field(43);

        for i in 0..a.len() {
            assert_eq!(a.rest_position(i), b.rest_position(i));
            assert_eq!(a.colors()[i], b.colors()[i]);
            assert_eq!(a.sizes()[i], b.sizes()[i]);
        }
        assert!((0..a.len()).any(|i| a.rest_position(i) != c.rest_position(i)));
    }

    #[test]
    fn test_smoothstep_edges_and_midpoint() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        // inverted edges ramp the other way
        assert_eq!(smoothstep(20.0, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(20.0, 0.0, 20.0), 0.0);
    }

    #[test]
    fn test_zero_time_baseline() {
        // At t=0 with pointer at the origin the displacement reduces to the
        // t=0 wave sample plus the bulge at that wave-shifted distance.
        let rest = Vec3::new(3.0, -4.0, 5.0);
        let pos = displaced_position(rest, 0.0, Vec2::ZERO);

        let wave = Vec3::new(
            (rest.y * 0.05).sin() * 2.0,
            (rest.x * 0.05).cos() * 2.0,
            (rest.z * 0.05).sin() * 1.5,
        );
        let d = Vec2::new(rest.x + wave.x, rest.y + wave.y).length();
        let bulge = smoothstep(20.0, 0.0, d) * 10.0;

        assert!((pos - (rest + wave + Vec3::new(0.0, 0.0, bulge))).length() < 1e-6);
    }

    #[test]
    fn test_bulge_only_near_pointer() {
        // A particle far outside the bulge radius gets wave motion only.
        let rest = Vec3::new(60.0, 60.0, 0.0);
        let pos = displaced_position(rest, 1.25, Vec2::ZERO);
        let wave = wave_offset(rest, 1.25);
        assert!((pos.z - (rest.z + wave.z)).abs() < 1e-6);

        // Dead center under the pointer the bulge peaks near BULGE_DEPTH.
        let center = displaced_position(Vec3::ZERO, 0.0, Vec2::ZERO);
        let wave0 = wave_offset(Vec3::ZERO, 0.0);
        let bulge = center.z - wave0.z;
        assert!(bulge > 9.0 && bulge <= 10.0);
    }

    #[test]
    fn test_displace_into_overwrites_buffer() {
        let field = small_field(9);
        let mut out = vec![Vec3::splat(999.0); 500];

        field.displace_into(0.5, &mut out);
        assert_eq!(out.len(), field.len());
        for (i, &pos) in out.iter().enumerate() {
            assert_eq!(pos, field.current_position(i, 0.5, Vec2::ZERO));
        }
    }

    #[test]
    fn test_update_pointer_feeds_displacement() {
        let mut field = small_field(11);
        for _ in 0..10 {
            field.update_pointer(Vec2::ONE, 0.05);
        }

        // Ten smoothing steps land partway: 1 - 0.95^10 of the distance.
        let smoothed = field.pointer();
        assert!(smoothed.x > 0.3 && smoothed.x < 0.5);
        assert_eq!(smoothed.x, smoothed.y);

        // The bulk pass must see the smoothed pointer, not the raw target.
        let mut out = Vec::new();
        field.displace_into(2.0, &mut out);
        for (i, &pos) in out.iter().enumerate() {
            assert_eq!(pos, field.current_position(i, 2.0, smoothed));
        }
    }
}
