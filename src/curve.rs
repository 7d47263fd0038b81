use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// One control point of a falloff curve: reception quality at a tuning offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub offset: f32,
    pub quality: f32,
}

impl CurvePoint {
    pub const fn new(offset: f32, quality: f32) -> Self {
        CurvePoint { offset, quality }
    }
}

/// Maps a tuning offset to base reception quality.
///
/// Control points are sorted by offset. Between points the quality is
/// linearly interpolated; before the first and after the last point it holds
/// flat at that point's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct FalloffCurve {
    points: Vec<CurvePoint>,
}

impl FalloffCurve {
    /// Build a curve, rejecting empty, unsorted, out-of-range or rising point sets.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, ConfigurationError> {
        if points.is_empty() {
            return Err(ConfigurationError::InvalidCurve(
                "at least one control point is required".into(),
            ));
        }
        for p in &points {
            if !p.offset.is_finite() || p.offset < 0.0 {
                return Err(ConfigurationError::InvalidCurve(format!(
                    "offset {} must be finite and >= 0",
                    p.offset
                )));
            }
            if !(0.0..=1.0).contains(&p.quality) {
                return Err(ConfigurationError::InvalidCurve(format!(
                    "quality {} at offset {} is outside [0, 1]",
                    p.quality, p.offset
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].offset <= pair[0].offset {
                return Err(ConfigurationError::InvalidCurve(format!(
                    "offsets must be strictly increasing ({} then {})",
                    pair[0].offset, pair[1].offset
                )));
            }
            if pair[1].quality > pair[0].quality {
                return Err(ConfigurationError::InvalidCurve(format!(
                    "quality rises from {} to {} between offsets {} and {}",
                    pair[0].quality, pair[1].quality, pair[0].offset, pair[1].offset
                )));
            }
        }
        Ok(FalloffCurve { points })
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Base quality for an absolute tuning offset. Always within `[0, 1]`.
    pub fn evaluate(&self, offset: f32) -> f32 {
        let offset = offset.abs();
        let first = self.points[0];
        if offset.is_nan() || offset <= first.offset {
            return first.quality;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if offset <= b.offset {
                let t = (offset - a.offset) / (b.offset - a.offset);
                return a.quality + (b.quality - a.quality) * t;
            }
        }
        self.points[self.points.len() - 1].quality
    }
}

impl Default for FalloffCurve {
    fn default() -> Self {
        FalloffCurve {
            points: vec![
                CurvePoint::new(0.0, 1.0),
                CurvePoint::new(0.1, 0.8),
                CurvePoint::new(0.2, 0.4),
                CurvePoint::new(0.3, 0.0),
            ],
        }
    }
}

impl TryFrom<Vec<CurvePoint>> for FalloffCurve {
    type Error = ConfigurationError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        FalloffCurve::new(points)
    }
}

impl From<FalloffCurve> for Vec<CurvePoint> {
    fn from(curve: FalloffCurve) -> Self {
        curve.points
    }
}
