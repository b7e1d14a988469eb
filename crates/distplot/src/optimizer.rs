use nalgebra as na;

/// Adam step rule. One instance belongs to exactly one solve.
#[derive(Debug, Clone)]
pub struct Adam {
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    m: na::DVector<f64>,
    v: na::DVector<f64>,
    t: u64,
}

impl Adam {
    pub const DEFAULT_BETA1: f64 = 0.9;
    pub const DEFAULT_BETA2: f64 = 0.999;
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    pub fn new(param_count: usize) -> Self {
        Self::with_rates(
            param_count,
            Self::DEFAULT_BETA1,
            Self::DEFAULT_BETA2,
            Self::DEFAULT_EPSILON,
        )
    }

    pub fn with_rates(param_count: usize, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            m: na::DVector::zeros(param_count),
            v: na::DVector::zeros(param_count),
            t: 0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.t
    }

    /// Returns `m_hat / (sqrt(v_hat) + epsilon)`; the caller applies the step size.
    pub fn step(&mut self, gradient: &na::DVector<f64>) -> na::DVector<f64> {
        debug_assert_eq!(gradient.len(), self.m.len());
        self.t = self.t.saturating_add(1);

        self.m.axpy(1.0 - self.beta1, gradient, self.beta1);
        self.v
            .axpy(1.0 - self.beta2, &gradient.component_mul(gradient), self.beta2);

        // `powf` keeps the corrections at 1.0 for step counts beyond `i32::MAX`.
        let t = self.t as f64;
        let m_correction = 1.0 - self.beta1.powf(t);
        let v_correction = 1.0 - self.beta2.powf(t);
        let eps = self.epsilon;

        self.m.zip_map(&self.v, |m, v| {
            (m / m_correction) / ((v / v_correction).sqrt() + eps)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Adam;
    use nalgebra as na;

    #[test]
    fn first_step_is_sign_of_gradient() {
        let mut adam = Adam::new(3);
        let update = adam.step(&na::DVector::from_vec(vec![4.0, -0.25, 0.0]));
        assert!((update[0] - 1.0).abs() < 1e-6);
        assert!((update[1] + 1.0).abs() < 1e-6);
        assert_eq!(update[2], 0.0);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn bias_correction_keeps_constant_gradient_at_unit_step() {
        let mut adam = Adam::new(1);
        let g = na::DVector::from_vec(vec![0.3]);
        for _ in 0..50 {
            let update = adam.step(&g);
            assert!((update[0] - 1.0).abs() < 1e-6, "update: {}", update[0]);
        }
    }

    #[test]
    fn moments_follow_exponential_averages() {
        let mut adam = Adam::new(1);
        adam.step(&na::DVector::from_vec(vec![1.0]));
        let update = adam.step(&na::DVector::from_vec(vec![-1.0]));
        // m = 0.9 * 0.1 - 0.1 = -0.01, v = 0.999 * 0.001 + 0.001 = 0.001999
        let m_hat = -0.01 / (1.0 - 0.9f64.powi(2));
        let v_hat = 0.001999 / (1.0 - 0.999f64.powi(2));
        let expected = m_hat / (v_hat.sqrt() + 1e-8);
        assert!((update[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn fresh_instances_do_not_share_state() {
        let mut a = Adam::new(1);
        a.step(&na::DVector::from_vec(vec![5.0]));
        a.step(&na::DVector::from_vec(vec![5.0]));

        let mut b = Adam::new(1);
        let mut c = Adam::new(1);
        let g = na::DVector::from_vec(vec![-2.0]);
        assert_eq!(b.step(&g), c.step(&g));
        assert_eq!(b.steps(), 1);
    }

    #[test]
    fn long_runs_keep_producing_finite_updates() {
        let g = na::DVector::from_vec(vec![0.5]);
        for start in [i32::MAX as u64, u32::MAX as u64, u64::MAX - 1] {
            let mut adam = Adam::new(1);
            adam.t = start;
            for _ in 0..3 {
                let update = adam.step(&g);
                assert!(
                    update[0].is_finite() && update[0] > 0.0,
                    "t={start}: update {}",
                    update[0]
                );
            }
            assert!(adam.steps() > start);
        }
    }
}
