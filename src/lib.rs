// stereofx - modulatable stereo gain/delay/width/balance effect
//
// A headless effect core for DAW-style hosts: four processing stages
// (delay, stereo width, gain, balance) in a fixed per-block order, each
// drivable by an external per-sample modulation source. Designed to run
// inside a real-time audio callback: no allocation, locking or panics on
// the processing path. Uses a lock-free command queue for parameter
// changes coming from a UI/automation thread.

pub mod command;
pub mod dsp;
pub mod effects;
pub mod modulation;

// Re-export commonly used types
pub use command::{Command, EffectController};
pub use dsp::{BalanceCalculator, DelayLine, MidSideDecoder, Smoother};
pub use effects::{
    Effect, EffectState, Parameter, ParameterUnit, StereoGainEffect, PARAM_BALANCE, PARAM_DELAY,
    PARAM_GAIN, PARAM_WIDTH,
};
pub use modulation::{ConstantModulation, ModulationSource, ModulatorSlot, NoModulation};
