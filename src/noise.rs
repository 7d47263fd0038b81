/// Deterministic, smooth pseudo-random signal sampled along one axis.
pub trait NoiseSource {
    /// Sample the noise at `x`. Implementations return values in `[0, 1]`
    /// and give the same value for the same `x` every time.
    fn sample(&self, x: f64) -> f32;
}

/// 1-D value noise: seeded random values on integer lattice points, blended
/// with a smoothstep so the signal drifts rather than jumps.
#[derive(Debug, Clone, Copy)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    pub fn new(seed: u64) -> Self {
        ValueNoise { seed }
    }

    fn lattice(&self, i: i64) -> f32 {
        let key = self.seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        fastrand::Rng::with_seed(key).f32()
    }
}

impl NoiseSource for ValueNoise {
    fn sample(&self, x: f64) -> f32 {
        if !x.is_finite() {
            return 0.0;
        }
        let floor = x.floor();
        let i = floor as i64;
        let t = (x - floor) as f32;
        let t = t * t * (3.0 - 2.0 * t);
        let a = self.lattice(i);
        let b = self.lattice(i.wrapping_add(1));
        (a + (b - a) * t).clamp(0.0, 1.0)
    }
}

/// Noise that always returns the same value. Useful to pin interference.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f32);

impl NoiseSource for ConstantNoise {
    fn sample(&self, _x: f64) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}
