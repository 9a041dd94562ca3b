use super::types::Parameter;

/// Audio effect processor trait
///
/// All effects must be Send to be usable in the audio thread.
/// Effects should be real-time safe: no allocations, no blocking
/// operations, no panics in `process`.
pub trait Effect: Send {
    /// Propagate the sample rate and maximum block size to internal state.
    /// Called from a non-real-time thread before processing starts; this is
    /// the only place buffers may grow. A sample rate <= 0 leaves the
    /// effect inert.
    fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize);

    /// Process one block in place. `left` and `right` must be the same
    /// length. Block sizes that are not a multiple of 4 are handled by a
    /// remainder loop and carry no penalty beyond losing the stride.
    fn process(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Set a parameter by ID, value in external units (dB, ms, percent).
    /// An unknown ID is a programming error: asserts in debug builds and
    /// is ignored in release builds.
    fn set_parameter(&mut self, id: u32, value: f32);

    /// Get a parameter by ID in external units. An unknown ID asserts in
    /// debug builds and returns 1.0 in release builds.
    fn get_parameter(&self, id: u32) -> f32;

    /// User-facing parameter definitions
    fn parameters(&self) -> &[Parameter];

    /// Reset internal state (clear delays, smoothing ramps, etc.)
    fn reset(&mut self);

    /// Get the effect name
    fn name(&self) -> &str;
}
