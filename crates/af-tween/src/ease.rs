//! Ease Curves
//!
//! Power eases plus a deterministic "rough" jitter used for flicker fades.

use serde::{Deserialize, Serialize};

/// Ease curve for property transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Ease {
    /// Constant rate
    Linear = 0,
    /// Quadratic, slow start
    Power1In = 1,
    /// Quadratic, slow end
    #[default]
    Power1Out = 2,
    /// Quadratic S
    Power1InOut = 3,
    /// Cubic, slow start
    Power2In = 4,
    /// Cubic, slow end
    Power2Out = 5,
    /// Cubic S
    Power2InOut = 6,
    /// Jittery linear ramp (fixed 10-point template)
    Rough = 7,
}

/// Vertical offsets of the rough template, one per interior point
const ROUGH_JITTER: [f32; 10] = [
    0.31, -0.22, 0.18, 0.44, -0.27, 0.12, -0.38, 0.25, -0.15, 0.33,
];

impl Ease {
    /// Convert from u8 index
    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Ease::Linear,
            1 => Ease::Power1In,
            2 => Ease::Power1Out,
            3 => Ease::Power1InOut,
            4 => Ease::Power2In,
            5 => Ease::Power2Out,
            6 => Ease::Power2InOut,
            7 => Ease::Rough,
            _ => Ease::Power1Out,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Ease::Linear => "linear",
            Ease::Power1In => "power1.in",
            Ease::Power1Out => "power1.out",
            Ease::Power1InOut => "power1.inOut",
            Ease::Power2In => "power2.in",
            Ease::Power2Out => "power2.out",
            Ease::Power2InOut => "power2.inOut",
            Ease::Rough => "rough",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Endpoints are exact: `evaluate(0) == 0`, `evaluate(1) == 1`.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Ease::Linear => t,

            Ease::Power1In => t * t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Ease::Power2In => t * t * t,
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Ease::Rough => rough(t),
        }
    }
}

/// Piecewise-linear walk through jittered points around y = t
fn rough(t: f32) -> f32 {
    if t >= 1.0 {
        return 1.0;
    }
    let segments = (ROUGH_JITTER.len() + 1) as f32;
    let point = |i: usize| -> f32 {
        if i == 0 {
            0.0
        } else if i > ROUGH_JITTER.len() {
            1.0
        } else {
            i as f32 / segments + ROUGH_JITTER[i - 1]
        }
    };

    let scaled = t * segments;
    let i = scaled.floor() as usize;
    let frac = scaled - i as f32;
    let (a, b) = (point(i), point(i + 1));
    a + (b - a) * frac
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
