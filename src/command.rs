//! Cross-thread parameter control
//!
//! Parameter changes from a UI or automation thread reach the audio thread
//! through a lock-free single-producer single-consumer queue. The effect
//! drains the queue at the start of every `process` call, so a change is
//! applied at the next block boundary at the latest.

/// Commands sent from the UI/control thread to the audio thread
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Set an effect parameter (id, value in external units)
    SetParameter(u32, f32),
    /// Clear delay and smoothing state
    Reset,
}

/// Handle for controlling an effect from the UI thread
///
/// Pushes are non-blocking; if the queue is full the command is dropped,
/// which for scalar parameter updates means an older value wins until the
/// next successful push.
pub struct EffectController {
    command_tx: rtrb::Producer<Command>,
}

impl EffectController {
    pub(crate) fn new(command_tx: rtrb::Producer<Command>) -> Self {
        Self { command_tx }
    }

    pub fn set_parameter(&mut self, id: u32, value: f32) {
        let _ = self.command_tx.push(Command::SetParameter(id, value));
    }

    pub fn reset(&mut self) {
        let _ = self.command_tx.push(Command::Reset);
    }
}
