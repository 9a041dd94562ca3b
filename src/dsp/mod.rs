mod balance;
mod delay_line;
mod smoother;
mod stereo_width;

pub use balance::BalanceCalculator;
pub use delay_line::{DelayLine, MAX_DELAY_SAMPLES};
pub use smoother::Smoother;
pub use stereo_width::MidSideDecoder;

/// Convert decibels to linear gain
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db <= -100.0 {
        0.0
    } else {
        10.0_f32.powf(db / 20.0)
    }
}

/// Convert linear gain to decibels
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -100.0
    } else {
        20.0 * linear.log10()
    }
}
