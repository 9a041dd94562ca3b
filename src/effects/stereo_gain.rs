use serde::{Deserialize, Serialize};

use super::effect_trait::Effect;
use super::types::{Parameter, ParameterUnit};
use crate::command::{Command, EffectController};
use crate::dsp::{db_to_linear, linear_to_db, BalanceCalculator, DelayLine, MidSideDecoder, Smoother};
use crate::modulation::{ModulationSource, ModulatorSlot};

pub const PARAM_GAIN: u32 = 0;
pub const PARAM_DELAY: u32 = 1;
pub const PARAM_WIDTH: u32 = 2;
pub const PARAM_BALANCE: u32 = 3;

const GAIN_SMOOTHING_MS: f32 = 4.0;
const BALANCE_SMOOTHING_MS: f32 = 1000.0;
const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Persistable parameter state, in external units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectState {
    /// Gain in dB
    pub gain: f32,
    /// Delay time in ms
    pub delay: f32,
    /// Stereo width in percent (100 = unchanged)
    pub width: f32,
    /// Balance, -100 (left) to 100 (right)
    pub balance: f32,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            gain: 0.0,
            delay: 0.0,
            width: 100.0,
            balance: 0.0,
        }
    }
}

/// Modulatable stereo gain/delay/width/balance effect
///
/// Runs four stages in a fixed order every block:
///
/// 1. smoothed gain, routed through the per-channel delay lines when the
///    delay time is non-zero (the delayed image must see pre-width,
///    pre-balance signal),
/// 2. mid/side width transform when width is not 100%,
/// 3. a second, independent gain stage from the gain modulation chain,
/// 4. balance last, so it positions the final signal regardless of what
///    produced it.
///
/// Each stage has its own modulation chain; a bypassed or childless chain
/// leaves that stage at its static parameter value. The gain+delay pass
/// advances in strides of 4 frames with a remainder loop for host blocks
/// that are not a multiple of 4.
pub struct StereoGainEffect {
    // Static parameters
    gain: f32,     // linear
    delay_ms: f32, // milliseconds
    balance: f32,  // -100..100
    ms_decoder: MidSideDecoder,

    left_delay: DelayLine,
    right_delay: DelayLine,
    gain_smoother: Smoother,
    balance_smoother: Smoother,

    gain_chain: ModulatorSlot,
    delay_chain: ModulatorSlot,
    width_chain: ModulatorSlot,
    balance_chain: ModulatorSlot,

    command_rx: Option<rtrb::Consumer<Command>>,
    parameters: Vec<Parameter>,
    sample_rate: f32,
}

impl StereoGainEffect {
    pub fn new() -> Self {
        let parameters = vec![
            Parameter::new(PARAM_GAIN, "Gain", -100.0, 24.0, 0.0, ParameterUnit::Decibels),
            Parameter::new(PARAM_DELAY, "Delay", 0.0, 1000.0, 0.0, ParameterUnit::Milliseconds),
            Parameter::new(PARAM_WIDTH, "Width", 0.0, 200.0, 100.0, ParameterUnit::Percent),
            Parameter::new(PARAM_BALANCE, "Balance", -100.0, 100.0, 0.0, ParameterUnit::Generic),
        ];

        Self {
            gain: 1.0,
            delay_ms: 0.0,
            balance: 0.0,
            ms_decoder: MidSideDecoder::new(),
            left_delay: DelayLine::new(),
            right_delay: DelayLine::new(),
            gain_smoother: Smoother::new(),
            balance_smoother: Smoother::new(),
            gain_chain: ModulatorSlot::new(),
            delay_chain: ModulatorSlot::new(),
            width_chain: ModulatorSlot::new(),
            balance_chain: ModulatorSlot::new(),
            command_rx: None,
            parameters,
            sample_rate: 0.0,
        }
    }

    /// Create the UI-thread handle for this effect. Replaces any previous
    /// controller's queue.
    pub fn create_controller(&mut self) -> EffectController {
        let (command_tx, command_rx) = rtrb::RingBuffer::new(COMMAND_QUEUE_CAPACITY);
        self.command_rx = Some(command_rx);
        EffectController::new(command_tx)
    }

    pub fn set_gain_modulation(&mut self, source: Option<Box<dyn ModulationSource>>) {
        self.gain_chain.set_source(source);
    }

    pub fn set_delay_modulation(&mut self, source: Option<Box<dyn ModulationSource>>) {
        self.delay_chain.set_source(source);
    }

    pub fn set_width_modulation(&mut self, source: Option<Box<dyn ModulationSource>>) {
        self.width_chain.set_source(source);
    }

    pub fn set_balance_modulation(&mut self, source: Option<Box<dyn ModulationSource>>) {
        self.balance_chain.set_source(source);
    }

    /// Sample rate from the last successful `prepare_to_play`, 0 if the
    /// effect has not been prepared yet.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Snapshot of the four parameters in external units.
    pub fn export_state(&self) -> EffectState {
        EffectState {
            gain: self.get_parameter(PARAM_GAIN),
            delay: self.get_parameter(PARAM_DELAY),
            width: self.get_parameter(PARAM_WIDTH),
            balance: self.get_parameter(PARAM_BALANCE),
        }
    }

    pub fn restore_state(&mut self, state: &EffectState) {
        self.set_parameter(PARAM_GAIN, state.gain);
        self.set_parameter(PARAM_DELAY, state.delay);
        self.set_parameter(PARAM_WIDTH, state.width);
        self.set_parameter(PARAM_BALANCE, state.balance);
    }

    fn set_delay_time(&mut self, ms: f32) {
        self.delay_ms = ms.max(0.0);
        self.left_delay.set_delay_time_seconds(self.delay_ms / 1000.0);
        self.right_delay.set_delay_time_seconds(self.delay_ms / 1000.0);
    }

    fn drain_commands(&mut self) {
        if let Some(mut command_rx) = self.command_rx.take() {
            while let Ok(command) = command_rx.pop() {
                match command {
                    Command::SetParameter(id, value) => self.set_parameter(id, value),
                    Command::Reset => self.reset(),
                }
            }
            self.command_rx = Some(command_rx);
        }
    }

    #[inline]
    fn process_frame(&mut self, l: &mut f32, r: &mut f32, use_delay: bool) {
        let gain = self.gain_smoother.smooth(self.gain);
        if use_delay {
            // Gain is applied before the delay so the delayed image carries
            // the gain ramp with it.
            *l = self.left_delay.get_delayed_value(gain * *l);
            *r = self.right_delay.get_delayed_value(gain * *r);
        } else {
            *l *= gain;
            *r *= gain;
        }
    }
}

impl Default for StereoGainEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for StereoGainEffect {
    fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize) {
        if sample_rate <= 0.0 || block_size == 0 {
            log::warn!(
                "prepare_to_play with sample rate {} and block size {}; effect stays inert",
                sample_rate,
                block_size
            );
            return;
        }

        self.sample_rate = sample_rate;

        self.gain_chain.prepare_to_play(sample_rate, block_size);
        self.delay_chain.prepare_to_play(sample_rate, block_size);
        self.width_chain.prepare_to_play(sample_rate, block_size);
        self.balance_chain.prepare_to_play(sample_rate, block_size);

        for delay in [&mut self.left_delay, &mut self.right_delay] {
            delay.prepare_to_play(sample_rate);
            // Apply the static delay to the freshly cleared line without a
            // fade, then fade future changes over one block.
            delay.set_fade_time_samples(0);
            delay.set_delay_time_seconds(self.delay_ms / 1000.0);
            delay.set_fade_time_samples(block_size);
        }

        self.gain_smoother.prepare_to_play(sample_rate);
        self.gain_smoother.set_smoothing_time(GAIN_SMOOTHING_MS);
        self.gain_smoother.reset_to(self.gain);

        // Balance is smoothed once per block, so the smoother runs at the
        // block rate.
        self.balance_smoother
            .prepare_to_play(sample_rate / block_size as f32);
        self.balance_smoother.set_smoothing_time(BALANCE_SMOOTHING_MS);
        self.balance_smoother.reset_to(self.balance);
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        let num_samples = left.len().min(right.len());
        if num_samples == 0 {
            return;
        }

        self.drain_commands();

        self.gain_chain.begin_block(num_samples);
        self.delay_chain.begin_block(num_samples);
        self.width_chain.begin_block(num_samples);
        self.balance_chain.begin_block(num_samples);

        // Delay modulation scales the static delay time, sampled once per
        // block.
        if self.delay_chain.is_active() {
            let delay_ms = self.delay_ms * self.delay_chain.values(num_samples)[0];
            self.left_delay.set_delay_time_seconds(delay_ms / 1000.0);
            self.right_delay.set_delay_time_seconds(delay_ms / 1000.0);
        }

        // Stage 1: smoothed gain, through the delay lines when delaying.
        let use_delay = self.delay_ms != 0.0;
        {
            let mut l_chunks = left.chunks_exact_mut(4);
            let mut r_chunks = right.chunks_exact_mut(4);
            for (lc, rc) in (&mut l_chunks).zip(&mut r_chunks) {
                for (l, r) in lc.iter_mut().zip(rc.iter_mut()) {
                    self.process_frame(l, r, use_delay);
                }
            }
            // Trailing frames of an off-stride host block
            for (l, r) in l_chunks
                .into_remainder()
                .iter_mut()
                .zip(r_chunks.into_remainder().iter_mut())
            {
                self.process_frame(l, r, use_delay);
            }
        }

        // Stage 2: stereo width, whole block, effective width recomputed
        // from modulation once per block.
        let static_width = self.ms_decoder.width();
        if static_width != 1.0 {
            let width = if self.width_chain.is_active() {
                (static_width - 1.0) * self.width_chain.values(num_samples)[0] + 1.0
            } else {
                static_width
            };

            let mut l_chunks = left.chunks_exact_mut(4);
            let mut r_chunks = right.chunks_exact_mut(4);
            for (lc, rc) in (&mut l_chunks).zip(&mut r_chunks) {
                for (l, r) in lc.iter_mut().zip(rc.iter_mut()) {
                    MidSideDecoder::apply_width(l, r, width);
                }
            }
            for (l, r) in l_chunks
                .into_remainder()
                .iter_mut()
                .zip(r_chunks.into_remainder().iter_mut())
            {
                MidSideDecoder::apply_width(l, r, width);
            }
        }

        // Stage 3: gain modulation, layered on top of the smoothed static
        // gain from stage 1.
        if self.gain_chain.is_active() {
            let values = self.gain_chain.values(num_samples);
            for (l, v) in left.iter_mut().zip(values) {
                *l *= v;
            }
            for (r, v) in right.iter_mut().zip(values) {
                *r *= v;
            }
        }

        // Stage 4: balance last.
        if self.balance_chain.is_active() {
            BalanceCalculator::process_buffer(left, right, self.balance_chain.values(num_samples));
        } else {
            let balance = self.balance_smoother.smooth(self.balance);
            let left_gain = BalanceCalculator::gain_factor_for_balance(balance, true);
            let right_gain = BalanceCalculator::gain_factor_for_balance(balance, false);

            if left_gain != right_gain {
                for l in left.iter_mut() {
                    *l *= left_gain;
                }
                for r in right.iter_mut() {
                    *r *= right_gain;
                }
            }
        }
    }

    fn set_parameter(&mut self, id: u32, value: f32) {
        match id {
            PARAM_GAIN => self.gain = db_to_linear(value),
            PARAM_DELAY => self.set_delay_time(value),
            PARAM_WIDTH => self.ms_decoder.set_width(value / 100.0),
            PARAM_BALANCE => self.balance = value.clamp(-100.0, 100.0),
            _ => debug_assert!(false, "unknown parameter id {}", id),
        }
    }

    fn get_parameter(&self, id: u32) -> f32 {
        match id {
            PARAM_GAIN => linear_to_db(self.gain),
            PARAM_DELAY => self.delay_ms,
            PARAM_WIDTH => self.ms_decoder.width() * 100.0,
            PARAM_BALANCE => self.balance,
            _ => {
                debug_assert!(false, "unknown parameter id {}", id);
                1.0
            }
        }
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn reset(&mut self) {
        self.left_delay.clear();
        self.right_delay.clear();
        self.gain_smoother.reset_to(self.gain);
        self.balance_smoother.reset_to(self.balance);
    }

    fn name(&self) -> &str {
        "Stereo Gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_round_trip() {
        let mut effect = StereoGainEffect::new();

        effect.set_parameter(PARAM_GAIN, 6.0);
        assert!((effect.get_parameter(PARAM_GAIN) - 6.0).abs() < 1e-4);

        effect.set_parameter(PARAM_DELAY, 250.0);
        assert_eq!(effect.get_parameter(PARAM_DELAY), 250.0);

        effect.set_parameter(PARAM_WIDTH, 150.0);
        assert!((effect.get_parameter(PARAM_WIDTH) - 150.0).abs() < 1e-4);

        effect.set_parameter(PARAM_BALANCE, -40.0);
        assert_eq!(effect.get_parameter(PARAM_BALANCE), -40.0);
    }

    #[test]
    fn test_parameter_metadata() {
        let effect = StereoGainEffect::new();
        let params = effect.parameters();
        assert_eq!(params.len(), 4);
        assert_eq!(params[PARAM_WIDTH as usize].default, 100.0);
        assert_eq!(params[PARAM_GAIN as usize].unit, ParameterUnit::Decibels);
    }

    #[test]
    fn test_invalid_sample_rate_leaves_effect_inert() {
        let mut effect = StereoGainEffect::new();
        effect.prepare_to_play(0.0, 512);

        // Still safe to process; gain 0 dB passes through
        let mut left = [0.5_f32; 8];
        let mut right = [0.5_f32; 8];
        effect.process(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 0.5));
        assert!(right.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_state_serialization_round_trip() {
        let mut effect = StereoGainEffect::new();
        effect.set_parameter(PARAM_GAIN, -12.0);
        effect.set_parameter(PARAM_DELAY, 125.0);
        effect.set_parameter(PARAM_WIDTH, 180.0);
        effect.set_parameter(PARAM_BALANCE, 33.0);

        let json = serde_json::to_string(&effect.export_state()).unwrap();
        let state: EffectState = serde_json::from_str(&json).unwrap();

        let mut restored = StereoGainEffect::new();
        restored.restore_state(&state);

        assert!((restored.get_parameter(PARAM_GAIN) - -12.0).abs() < 1e-3);
        assert_eq!(restored.get_parameter(PARAM_DELAY), 125.0);
        assert!((restored.get_parameter(PARAM_WIDTH) - 180.0).abs() < 1e-3);
        assert_eq!(restored.get_parameter(PARAM_BALANCE), 33.0);
    }

    #[test]
    fn test_default_state_is_neutral() {
        let state = EffectState::default();
        assert_eq!(state.gain, 0.0);
        assert_eq!(state.delay, 0.0);
        assert_eq!(state.width, 100.0);
        assert_eq!(state.balance, 0.0);
    }
}
