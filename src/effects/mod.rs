mod effect_trait;
mod stereo_gain;
mod types;

pub use effect_trait::Effect;
pub use stereo_gain::{
    EffectState, StereoGainEffect, PARAM_BALANCE, PARAM_DELAY, PARAM_GAIN, PARAM_WIDTH,
};
pub use types::{Parameter, ParameterUnit};
