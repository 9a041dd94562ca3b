/// One-pole exponential parameter smoother
///
/// Moves an internal value one step toward a target on every `smooth()`
/// call, using a coefficient derived from the smoothing time and the rate
/// at which `smooth()` is called. Convergence is monotonic and never
/// overshoots. Used to avoid audible steps when a user-facing parameter
/// changes.
///
/// With a smoothing time of zero (or before `prepare_to_play`) the smoother
/// is a direct passthrough.
#[derive(Debug, Clone)]
pub struct Smoother {
    current: f32,
    coef: f32,
    smoothing_time_ms: f32,
    sample_rate: f32,
    active: bool,
}

impl Smoother {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            coef: 0.0,
            smoothing_time_ms: 0.0,
            sample_rate: 0.0,
            active: false,
        }
    }

    /// Set the rate at which `smooth()` will be called. For audio-rate
    /// smoothing this is the sample rate; for block-rate smoothing pass
    /// `sample_rate / block_size`.
    pub fn prepare_to_play(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficient();
    }

    pub fn set_smoothing_time(&mut self, ms: f32) {
        self.smoothing_time_ms = ms;
        self.update_coefficient();
    }

    pub fn smoothing_time(&self) -> f32 {
        self.smoothing_time_ms
    }

    /// Snap the internal value, e.g. to start playback at the current
    /// target without an initial ramp.
    pub fn reset_to(&mut self, value: f32) {
        self.current = value;
    }

    pub fn current_value(&self) -> f32 {
        self.current
    }

    /// Advance one step toward `target` and return the new value.
    #[inline]
    pub fn smooth(&mut self, target: f32) -> f32 {
        if !self.active {
            self.current = target;
            return target;
        }

        self.current = target + self.coef * (self.current - target);
        self.current
    }

    fn update_coefficient(&mut self) {
        if self.smoothing_time_ms > 0.0 && self.sample_rate > 0.0 {
            self.coef = (-1.0 / (self.sample_rate * self.smoothing_time_ms * 0.001)).exp();
            self.active = true;
        } else {
            self.coef = 0.0;
            self.active = false;
        }
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_without_smoothing_time() {
        let mut smoother = Smoother::new();
        smoother.prepare_to_play(44100.0);
        assert_eq!(smoother.smooth(0.7), 0.7);
        assert_eq!(smoother.smooth(-1.5), -1.5);
    }

    #[test]
    fn test_monotonic_convergence_no_overshoot() {
        let mut smoother = Smoother::new();
        smoother.prepare_to_play(44100.0);
        smoother.set_smoothing_time(4.0);
        smoother.reset_to(0.0);

        let target = 1.0;
        let mut previous = 0.0;
        for _ in 0..44100 {
            let value = smoother.smooth(target);
            assert!(value >= previous, "smoother moved away from target");
            assert!(value <= target, "smoother overshot target");
            previous = value;
        }
        assert!((previous - target).abs() < 1e-4);
    }

    #[test]
    fn test_convergence_from_above() {
        let mut smoother = Smoother::new();
        smoother.prepare_to_play(44100.0);
        smoother.set_smoothing_time(10.0);
        smoother.reset_to(2.0);

        let mut previous = 2.0;
        for _ in 0..44100 {
            let value = smoother.smooth(0.5);
            assert!(value <= previous);
            assert!(value >= 0.5);
            previous = value;
        }
        assert!((previous - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_deterministic() {
        let mut a = Smoother::new();
        let mut b = Smoother::new();
        for s in [&mut a, &mut b] {
            s.prepare_to_play(48000.0);
            s.set_smoothing_time(4.0);
            s.reset_to(0.25);
        }
        for _ in 0..1000 {
            assert_eq!(a.smooth(0.9), b.smooth(0.9));
        }
    }
}
