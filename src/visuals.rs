//! Visual configuration for the backdrop.
//!
//! Rendering options that control how the backdrop appears, separate from
//! the simulation that controls how it moves: the color palette particles
//! are sampled from, the light/dark theme, and the blend mode.

use glam::Vec3;

/// An ordered set of reference colors particles are sampled from.
///
/// Each particle picks one color uniformly at random at creation; no
/// further relationship between particles and palette entries is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec3>,
}

impl Palette {
    /// Build a palette from RGB triples in [0, 1].
    ///
    /// An empty palette is representable but rejected at field creation.
    pub fn new(colors: Vec<Vec3>) -> Self {
        Self { colors }
    }

    /// The default nebula palette: violet through cyan.
    pub fn nebula() -> Self {
        Self::new(vec![
            Vec3::new(0.424, 0.361, 0.906), // #6c5ce7
            Vec3::new(0.635, 0.608, 0.996), // #a29bfe
            Vec3::new(0.455, 0.725, 1.0),   // #74b9ff
            Vec3::new(0.506, 0.925, 0.925), // #81ecec
        ])
    }

    /// The color stops, in order.
    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Number of colors in the palette.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no colors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::nebula()
    }
}

/// Light or dark presentation.
///
/// The theme selects the clear color behind the particles and the color of
/// link segments. It is a plain in-memory flag; flipping it at runtime only
/// rewrites uniforms, never rebuilds pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Background clear color.
    pub fn background(&self) -> Vec3 {
        match self {
            Theme::Dark => Vec3::new(0.02, 0.02, 0.05),
            Theme::Light => Vec3::new(0.95, 0.95, 0.98),
        }
    }

    /// Color used for link segments.
    pub fn link_color(&self) -> Vec3 {
        match self {
            Theme::Dark => Vec3::new(0.424, 0.361, 0.906), // #6c5ce7
            Theme::Light => Vec3::new(0.294, 0.231, 0.741),
        }
    }

    /// The other theme.
    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// How particle and link colors combine with the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Additive blending - overlapping particles glow brighter (default).
    #[default]
    Additive,
}

/// Rendering options for a backdrop window.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualConfig {
    pub theme: Theme,
    pub blend_mode: BlendMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nebula_palette_has_four_stops() {
        let p = Palette::default();
        assert_eq!(p.len(), 4);
        assert!(!p.is_empty());
        // first stop is the violet anchor color
        assert!((p.colors()[0].x - 0.424).abs() < 1e-6);
    }

    #[test]
    fn test_theme_toggle_round_trips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_ne!(Theme::Dark.background(), Theme::Light.background());
    }
}
