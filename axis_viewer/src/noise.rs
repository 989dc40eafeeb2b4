//! Optional control-vector noise injected while simulating: an exponential
//! low-pass over the previous controls plus Gaussian perturbation.

use rand::Rng;

/// One standard-normal sample via the Box–Muller transform.
pub fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 − u keeps the logarithm away from zero.
    let u: f64 = 1.0 - rng.r#gen::<f64>();
    let v: f64 = rng.r#gen::<f64>();
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CtrlNoise {
    /// Low-pass time constant in seconds; near zero means pure noise.
    pub rate: f64,
    /// Standard deviation of the injected noise; zero disables injection.
    pub std: f64,
}

impl CtrlNoise {
    pub fn is_enabled(&self) -> bool {
        self.std > 0.0
    }

    /// Filter and perturb every actuator control for one sub-step.
    pub fn apply<R: Rng>(&self, timestep: f64, ctrl: &mut [f64], rng: &mut R) {
        let rate = (-timestep / self.rate.max(1e-10)).exp();
        let scale = self.std * (1.0 - rate * rate).sqrt();
        for value in ctrl.iter_mut() {
            *value = rate * *value + scale * standard_normal(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zero_std_is_disabled() {
        assert!(!CtrlNoise::default().is_enabled());
        assert!(CtrlNoise { rate: 0.0, std: 0.1 }.is_enabled());
    }

    #[test]
    fn perturbs_controls_when_enabled() {
        let noise = CtrlNoise {
            rate: 0.0,
            std: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctrl = vec![0.0; 8];
        noise.apply(0.002, &mut ctrl, &mut rng);
        assert!(ctrl.iter().any(|&value| value != 0.0));
    }

    #[test]
    fn long_time_constant_preserves_previous_controls() {
        let noise = CtrlNoise {
            rate: 1e9,
            std: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctrl = vec![0.5; 4];
        noise.apply(0.002, &mut ctrl, &mut rng);
        for value in ctrl {
            assert!((value - 0.5).abs() < 1e-3);
        }
    }

    #[test]
    fn samples_have_roughly_unit_variance() {
        let mut rng = StdRng::seed_from_u64(11);
        let samples: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>()
            / samples.len() as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.1);
    }
}
