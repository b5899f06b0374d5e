#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    /// Hermite smoothstep `t²(3-2t)`; the blend-weight reparameterization
    /// used between key images to avoid linear-blend popping.
    SmoothStep,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_stable() {
        for ease in [Ease::Linear, Ease::SmoothStep] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn smoothstep_midpoint_is_half() {
        assert!((Ease::SmoothStep.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn monotonic_on_unit_interval() {
        for ease in [Ease::Linear, Ease::SmoothStep] {
            let mut prev = ease.apply(0.0);
            for i in 1..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!(v >= prev);
                prev = v;
            }
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Ease::SmoothStep.apply(-1.0), 0.0);
        assert_eq!(Ease::SmoothStep.apply(2.0), 1.0);
    }
}
