use crate::config::EngineConfig;
use crate::curve::FalloffCurve;
use crate::noise::NoiseSource;
use crate::output::{AudioOutput, Channel};

/// Reception quality from tuning offset, minus drifting interference, and
/// the main/static volume mix that follows from it.
pub struct SignalModel {
    curve: FalloffCurve,
    noise: Box<dyn NoiseSource>,
    interference_rate: f64,
    interference_depth: f32,
    max_strength: f32,
    static_strength: f32,
}

impl SignalModel {
    pub fn new(config: &EngineConfig, noise: Box<dyn NoiseSource>) -> Self {
        SignalModel {
            curve: config.falloff.clone(),
            noise,
            interference_rate: config.interference_rate,
            interference_depth: config.interference_depth,
            max_strength: config.max_strength,
            static_strength: config.static_strength,
        }
    }

    pub fn set_noise(&mut self, noise: Box<dyn NoiseSource>) {
        self.noise = noise;
    }

    /// Interference at a point in simulated time (seconds since start).
    pub fn interference(&self, elapsed_secs: f64) -> f32 {
        self.noise.sample(elapsed_secs * self.interference_rate) * self.interference_depth
    }

    /// Quality for a dial `offset` from the station at `elapsed_secs`, in `[0, 1]`.
    pub fn quality(&self, offset: f32, elapsed_secs: f64) -> f32 {
        let base = self.curve.evaluate(offset.abs());
        let q = base - self.interference(elapsed_secs);
        if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) }
    }

    /// Push the volume mix for `quality` to the output.
    pub fn apply(&self, output: &mut dyn AudioOutput, quality: f32) {
        output.set_volume(Channel::Main, quality * self.max_strength);
        output.set_volume(Channel::Static, (1.0 - quality) * self.static_strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{ConstantNoise, ValueNoise};
    use crate::output::RecordingOutput;

    fn model(noise: f32) -> SignalModel {
        SignalModel::new(&EngineConfig::default(), Box::new(ConstantNoise(noise)))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn perfect_tuning_without_noise_is_full_quality() {
        assert_eq!(model(0.0).quality(0.0, 10.0), 1.0);
    }

    #[test]
    fn interference_scales_noise_by_depth() {
        let m = model(0.5);
        assert!(approx(m.interference(3.0), 0.1));
        assert!(approx(m.quality(0.0, 3.0), 0.9));
    }

    #[test]
    fn quality_clamped_at_zero() {
        let m = model(1.0);
        assert_eq!(m.quality(0.29, 0.0), 0.0);
        assert_eq!(m.quality(2.0, 0.0), 0.0);
    }

    #[test]
    fn quality_in_range_with_real_noise() {
        let m = SignalModel::new(&EngineConfig::default(), Box::new(ValueNoise::new(3)));
        for i in 0..1000 {
            let q = m.quality((i % 40) as f32 * 0.01, i as f64 * 0.7);
            assert!((0.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn apply_sets_main_and_static_mix() {
        let config = EngineConfig {
            max_strength: 0.8,
            static_strength: 0.5,
            ..EngineConfig::default()
        };
        let m = SignalModel::new(&config, Box::new(ConstantNoise(0.0)));
        let mut out = RecordingOutput::new();
        m.apply(&mut out, 0.25);
        assert!(approx(out.volume(Channel::Main), 0.2));
        assert!(approx(out.volume(Channel::Static), 0.375));
    }

    #[test]
    fn noise_axis_uses_interference_rate() {
        struct Identity;
        impl NoiseSource for Identity {
            fn sample(&self, x: f64) -> f32 {
                (x as f32).clamp(0.0, 1.0)
            }
        }
        let m = SignalModel::new(&EngineConfig::default(), Box::new(Identity));
        // 5 s * 0.1 = 0.5 on the noise axis, * 0.2 depth
        assert!(approx(m.interference(5.0), 0.1));
    }
}
