use std::f32::consts::{FRAC_PI_4, SQRT_2};

/// Constant-power balance between left and right channels
///
/// Balance runs from -100 (hard left) through 0 (center) to +100 (hard
/// right). The pan law keeps the sum of the squared channel gains constant
/// and is normalized so both channels sit at exactly 1.0 at the center, so
/// a centered balance changes nothing.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Gain factor for one channel at the given balance value.
    #[inline]
    pub fn gain_factor_for_balance(balance: f32, left_channel: bool) -> f32 {
        if balance == 0.0 {
            return 1.0;
        }

        let normalized = balance.clamp(-100.0, 100.0) / 100.0;
        let pan = FRAC_PI_4 * (normalized + 1.0);

        SQRT_2 * if left_channel { pan.cos() } else { pan.sin() }
    }

    /// Per-sample balance for a modulated block. `balance_values` holds one
    /// modulation sample (0..1) per frame, scaled into the -100..100
    /// balance range before the pan law is applied.
    pub fn process_buffer(left: &mut [f32], right: &mut [f32], balance_values: &[f32]) {
        debug_assert_eq!(left.len(), right.len());
        debug_assert!(balance_values.len() >= left.len());

        for ((l, r), value) in left.iter_mut().zip(right.iter_mut()).zip(balance_values) {
            let balance = value * 100.0;
            *l *= Self::gain_factor_for_balance(balance, true);
            *r *= Self::gain_factor_for_balance(balance, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_unity_on_both_channels() {
        assert_eq!(BalanceCalculator::gain_factor_for_balance(0.0, true), 1.0);
        assert_eq!(BalanceCalculator::gain_factor_for_balance(0.0, false), 1.0);
    }

    #[test]
    fn test_left_right_symmetry() {
        for b in (-100..=100).map(|i| i as f32) {
            let left = BalanceCalculator::gain_factor_for_balance(b, true);
            let right_mirrored = BalanceCalculator::gain_factor_for_balance(-b, false);
            assert!(
                (left - right_mirrored).abs() < 1e-6,
                "asymmetric at balance {}",
                b
            );
        }
    }

    #[test]
    fn test_constant_power() {
        let center = {
            let l = BalanceCalculator::gain_factor_for_balance(0.0, true);
            let r = BalanceCalculator::gain_factor_for_balance(0.0, false);
            l * l + r * r
        };
        for b in [-100.0, -75.0, -30.0, 10.0, 55.0, 100.0] {
            let l = BalanceCalculator::gain_factor_for_balance(b, true);
            let r = BalanceCalculator::gain_factor_for_balance(b, false);
            assert!(
                (l * l + r * r - center).abs() < 1e-5,
                "power not constant at balance {}",
                b
            );
        }
    }

    #[test]
    fn test_extremes() {
        // Hard right: left channel fully attenuated, right at the law's
        // maximum.
        let l = BalanceCalculator::gain_factor_for_balance(100.0, true);
        let r = BalanceCalculator::gain_factor_for_balance(100.0, false);
        assert!(l.abs() < 1e-6);
        assert!((r - SQRT_2).abs() < 1e-6);

        let l = BalanceCalculator::gain_factor_for_balance(-100.0, true);
        let r = BalanceCalculator::gain_factor_for_balance(-100.0, false);
        assert!((l - SQRT_2).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        assert_eq!(
            BalanceCalculator::gain_factor_for_balance(250.0, true),
            BalanceCalculator::gain_factor_for_balance(100.0, true)
        );
    }

    #[test]
    fn test_process_buffer_scales_modulation_to_balance_range() {
        let mut left = [1.0_f32; 4];
        let mut right = [1.0_f32; 4];
        // Modulation value 1.0 maps to balance +100 (hard right)
        let values = [1.0_f32; 4];

        BalanceCalculator::process_buffer(&mut left, &mut right, &values);

        for (l, r) in left.iter().zip(right.iter()) {
            assert!(l.abs() < 1e-6);
            assert!((r - SQRT_2).abs() < 1e-6);
        }
    }
}
