//! Proximity links between nearby particles.
//!
//! Each frame the linker scans a prefix of the displaced position buffer
//! and emits a line segment for every pair closer than a distance
//! threshold, up to a fixed segment budget. The scan is the naive O(n²)
//! pairwise pass; the prefix is kept small enough (default 100 of 2000
//! particles) that a spatial index would cost more than it saves.

use glam::Vec3;

use crate::error::ConfigError;

/// A single link between two displaced particle positions.
///
/// Ephemeral: recomputed every frame, never persisted.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub a: Vec3,
    pub b: Vec3,
}

/// Parameters for a [`ProximityLinker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    /// Only the first `scan_limit` positions are considered for linking.
    pub scan_limit: usize,
    /// Pairs closer than this (strictly) are linked.
    pub threshold: f32,
    /// Hard cap on segments emitted per frame.
    pub max_segments: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            scan_limit: 100,
            threshold: 15.0,
            max_segments: 100,
        }
    }
}

impl LinkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_limit == 0 {
            return Err(ConfigError::ZeroScanLimit);
        }
        if !(self.threshold > 0.0) {
            return Err(ConfigError::NonPositiveThreshold(self.threshold));
        }
        if self.max_segments == 0 {
            return Err(ConfigError::ZeroSegmentCapacity);
        }
        Ok(())
    }
}

/// Builds the per-frame segment buffer connecting nearby particles.
///
/// The internal buffer is allocated once at `max_segments` capacity and
/// fully overwritten on every [`compute`](ProximityLinker::compute) call;
/// the returned slice length is the used count, so a consumer can never
/// observe segments left over from an earlier frame.
#[derive(Debug, Clone)]
pub struct ProximityLinker {
    config: LinkConfig,
    segments: Vec<LineSegment>,
}

impl ProximityLinker {
    /// Create a linker. Fails with [`ConfigError`] on a zero scan limit,
    /// non-positive threshold, or zero segment capacity.
    pub fn new(config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            segments: Vec::with_capacity(config.max_segments),
        })
    }

    /// The validated configuration.
    #[inline]
    pub fn config(&self) -> LinkConfig {
        self.config
    }

    /// Maximum number of segments a frame can produce.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.max_segments
    }

    /// Number of segments produced by the most recent `compute`.
    #[inline]
    pub fn used(&self) -> usize {
        self.segments.len()
    }

    /// Scan `positions` and rebuild the segment buffer.
    ///
    /// Pairs are visited in ascending `(i, j)` order with `j > i`, over the
    /// first `scan_limit` positions (clamped to the buffer length), and the
    /// scan stops outright once `max_segments` segments are written. The
    /// output is deterministic: identical positions and configuration yield
    /// a bit-identical segment sequence.
    pub fn compute(&mut self, positions: &[Vec3]) -> &[LineSegment] {
        self.segments.clear();
        scan_pairs(
            positions,
            self.config.scan_limit,
            self.config.threshold,
            self.config.max_segments,
            &mut self.segments,
        );
        &self.segments
    }

    /// The segments from the most recent `compute`.
    #[inline]
    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }
}

/// The pairwise pass behind [`ProximityLinker::compute`].
///
/// Appends to `out` in iteration order and returns early when the budget
/// fills. Fewer than two scannable positions, a zero budget, or a
/// threshold no pair can beat all degenerate to an empty output.
fn scan_pairs(
    positions: &[Vec3],
    scan_limit: usize,
    threshold: f32,
    max_segments: usize,
    out: &mut Vec<LineSegment>,
) {
    let scan = scan_limit.min(positions.len());
    if out.len() >= max_segments {
        return;
    }

    for i in 0..scan {
        for j in (i + 1)..scan {
            if positions[i].distance(positions[j]) < threshold {
                out.push(LineSegment {
                    a: positions[i],
                    b: positions[j],
                });
                if out.len() >= max_segments {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linker(scan_limit: usize, threshold: f32, max_segments: usize) -> ProximityLinker {
        ProximityLinker::new(LinkConfig {
            scan_limit,
            threshold,
            max_segments,
        })
        .unwrap()
    }

    /// Positions on a line, unit spacing: pair (i, j) has distance j - i.
    fn ladder(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let bad = |c: LinkConfig| ProximityLinker::new(c).unwrap_err();
        assert_eq!(
            bad(LinkConfig { scan_limit: 0, ..Default::default() }),
            ConfigError::ZeroScanLimit
        );
        assert_eq!(
            bad(LinkConfig { threshold: 0.0, ..Default::default() }),
            ConfigError::NonPositiveThreshold(0.0)
        );
        assert_eq!(
            bad(LinkConfig { max_segments: 0, ..Default::default() }),
            ConfigError::ZeroSegmentCapacity
        );
    }

    #[test]
    fn test_links_pairs_in_scan_order() {
        let mut l = linker(10, 1.5, 100);
        let segments = l.compute(&ladder(4));

        // Only adjacent rungs are under 1.5 apart, in ascending i order.
        assert_eq!(segments.len(), 3);
        for (k, seg) in segments.iter().enumerate() {
            assert_eq!(seg.a, Vec3::new(k as f32, 0.0, 0.0));
            assert_eq!(seg.b, Vec3::new(k as f32 + 1.0, 0.0, 0.0));
        }
        assert_eq!(l.used(), 3);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut l = linker(10, 1.0, 100);
        // distance exactly 1.0 is not < 1.0
        assert!(l.compute(&ladder(3)).is_empty());
    }

    #[test]
    fn test_budget_truncates_to_first_pairs() {
        let positions = ladder(8);

        let mut unbounded = linker(8, 100.0, 1000);
        let all: Vec<_> = unbounded.compute(&positions).to_vec();
        assert_eq!(all.len(), 8 * 7 / 2);

        let mut capped = linker(8, 100.0, 5);
        let got = capped.compute(&positions);
        assert_eq!(got.len(), 5);
        assert_eq!(got, &all[..5]);
        assert!(capped.used() <= capped.capacity());
    }

    #[test]
    fn test_scan_limit_excludes_tail() {
        let mut l = linker(2, 100.0, 100);
        let segments = l.compute(&ladder(6));
        // Only the (0, 1) pair is inside the scanned prefix.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].b, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_short_buffers_scan_in_full() {
        let mut l = linker(100, 5.0, 100);
        assert!(l.compute(&[]).is_empty());
        assert!(l.compute(&[Vec3::ZERO]).is_empty());
        assert_eq!(l.compute(&ladder(3)).len(), 3);
    }

    #[test]
    fn test_degenerate_scan_parameters_yield_nothing() {
        let positions = ladder(4);
        let mut out = Vec::new();

        scan_pairs(&positions, 0, 10.0, 100, &mut out);
        assert!(out.is_empty());
        scan_pairs(&positions, 1, 10.0, 100, &mut out);
        assert!(out.is_empty());
        // No two distinct indices are closer than zero.
        scan_pairs(&positions, 4, 0.0, 100, &mut out);
        assert!(out.is_empty());
        scan_pairs(&positions, 4, 10.0, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let positions: Vec<Vec3> = (0..50)
            .map(|i| {
                let f = i as f32;
                Vec3::new((f * 0.37).sin() * 20.0, (f * 0.61).cos() * 20.0, f % 7.0)
            })
            .collect();

        let mut a = linker(50, 10.0, 40);
        let mut b = linker(50, 10.0, 40);
        assert_eq!(a.compute(&positions), b.compute(&positions));
    }

    #[test]
    fn test_recompute_discards_previous_frame() {
        let mut l = linker(10, 1.5, 100);
        assert_eq!(l.compute(&ladder(6)).len(), 5);

        // Next frame: everything far apart. No stale segments survive.
        let sparse: Vec<Vec3> = (0..6).map(|i| Vec3::splat(i as f32 * 100.0)).collect();
        assert!(l.compute(&sparse).is_empty());
        assert_eq!(l.used(), 0);
    }
}
