//! Per-zone CIELAB statistics.
//!
//! Pixels are bucketed by L* into three tonal zones and each zone's mean and
//! population standard deviation are accumulated in one linear pass:
//!
//! ```text
//!   shadows     L* < 33
//!   midtones    33 ≤ L* < 66
//!   highlights  L* ≥ 66
//! ```
//!
//! Every std component carries a `1e-4` floor so the transfer can divide by
//! it unconditionally. An empty zone reports [`ColorStats::FALLBACK`].

use glam::{DVec3, Vec3};

use crate::color_management::rgb_to_lab;
use crate::image::{CHANNELS, PixelBuffer};
use crate::parallel::{ExecContext, fold_chunks};

/// Upper L* bound (exclusive) of the shadow zone.
pub const SHADOW_LIMIT: f32 = 33.0;
/// Upper L* bound (exclusive) of the midtone zone.
pub const HIGHLIGHT_LIMIT: f32 = 66.0;
/// Added to every standard deviation component.
pub const STD_EPSILON: f32 = 1e-4;

/// One of the three tonal zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Shadows,
    Midtones,
    Highlights,
}

impl Zone {
    /// Zone that a lightness value falls in.
    pub fn of(lightness: f32) -> Self {
        if lightness < SHADOW_LIMIT {
            Self::Shadows
        } else if lightness < HIGHLIGHT_LIMIT {
            Self::Midtones
        } else {
            Self::Highlights
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Shadows => 0,
            Self::Midtones => 1,
            Self::Highlights => 2,
        }
    }
}

/// Mean and standard deviation of `(L*, a*, b*)` for one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStats {
    pub mean: Vec3,
    /// Strictly positive in every component.
    pub std: Vec3,
}

impl ColorStats {
    /// Reported for a zone with no pixels.
    pub const FALLBACK: ColorStats = ColorStats {
        mean: Vec3::new(50.0, 0.0, 0.0),
        std: Vec3::new(15.0, 10.0, 10.0),
    };

    pub const fn new(mean: Vec3, std: Vec3) -> Self {
        Self { mean, std }
    }

    /// Component-wise linear blend toward `other`.
    pub fn lerp(&self, other: &ColorStats, t: f32) -> ColorStats {
        ColorStats {
            mean: self.mean.lerp(other.mean, t),
            std: self.std.lerp(other.std, t),
        }
    }
}

/// Zone statistics of a whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvancedStats {
    pub shadows: ColorStats,
    pub midtones: ColorStats,
    pub highlights: ColorStats,
    /// Mean L* over every pixel.
    pub global_mean_l: f32,
}

impl AdvancedStats {
    /// Synthetic target profile used when pushing the Hald identity cube
    /// through the transfer. It approximates a neutral, evenly exposed image
    /// and is not derived from any real picture.
    pub const NEUTRAL_EXPORT_TARGET: AdvancedStats = AdvancedStats {
        shadows: ColorStats::new(Vec3::new(15.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0)),
        midtones: ColorStats::new(Vec3::new(50.0, 0.0, 0.0), Vec3::new(15.0, 15.0, 15.0)),
        highlights: ColorStats::new(Vec3::new(85.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0)),
        global_mean_l: 50.0,
    };

    pub fn zone(&self, zone: Zone) -> &ColorStats {
        match zone {
            Zone::Shadows => &self.shadows,
            Zone::Midtones => &self.midtones,
            Zone::Highlights => &self.highlights,
        }
    }
}

/// Running sums for one zone.
#[derive(Debug, Clone, Copy, Default)]
struct ZoneSums {
    count: u64,
    sum: DVec3,
    sum_sq: DVec3,
}

impl ZoneSums {
    fn finish(&self) -> ColorStats {
        if self.count == 0 {
            return ColorStats::FALLBACK;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(DVec3::ZERO);
        ColorStats {
            mean: mean.as_vec3(),
            std: DVec3::from_array(variance.to_array().map(f64::sqrt)).as_vec3()
                + Vec3::splat(STD_EPSILON),
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StatsAccumulator {
    zones: [ZoneSums; 3],
    total_l: f64,
    pixels: u64,
}

impl StatsAccumulator {
    fn push(mut self, px: &[u8]) -> Self {
        let lab = rgb_to_lab([px[0] as f32, px[1] as f32, px[2] as f32]);
        let v = DVec3::new(lab[0] as f64, lab[1] as f64, lab[2] as f64);
        let zone = &mut self.zones[Zone::of(lab[0]).index()];
        zone.count += 1;
        zone.sum += v;
        zone.sum_sq += v * v;
        self.total_l += v.x;
        self.pixels += 1;
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            zones: [
                self.zones[0].merge(other.zones[0]),
                self.zones[1].merge(other.zones[1]),
                self.zones[2].merge(other.zones[2]),
            ],
            total_l: self.total_l + other.total_l,
            pixels: self.pixels + other.pixels,
        }
    }

    fn finish(&self) -> AdvancedStats {
        AdvancedStats {
            shadows: self.zones[0].finish(),
            midtones: self.zones[1].finish(),
            highlights: self.zones[2].finish(),
            global_mean_l: (self.total_l / self.pixels.max(1) as f64) as f32,
        }
    }
}

/// Compute zone statistics for an image. Alpha is ignored.
pub fn compute_stats(buffer: &PixelBuffer) -> AdvancedStats {
    compute_stats_with(buffer, &ExecContext::default())
}

/// [`compute_stats`] with explicit execution settings.
pub fn compute_stats_with(buffer: &PixelBuffer, exec: &ExecContext<'_>) -> AdvancedStats {
    fold_chunks(
        buffer.as_bytes(),
        CHANNELS,
        exec,
        StatsAccumulator::default,
        StatsAccumulator::push,
        StatsAccumulator::merge,
    )
    .finish()
}
