//! Modulation source contract
//!
//! A modulation source produces one control value per audio frame, used by
//! the effect to scale a parameter over a block. The source's internal
//! structure (LFOs, envelopes, automation curves) is the host's concern;
//! the effect only needs the bypass state, whether any child modulators
//! exist, and a filled buffer per block.

/// External per-sample modulation source
///
/// Implementations must be Send and real-time safe: `render` is called
/// from the audio thread once per block and must not allocate or block.
pub trait ModulationSource: Send {
    /// Bypassed sources contribute identity modulation.
    fn is_bypassed(&self) -> bool;

    /// Number of active child modulators. A source with zero children
    /// contributes identity modulation.
    fn num_children(&self) -> usize;

    fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize);

    /// Fill `buffer` with one modulation value per frame.
    fn render(&mut self, buffer: &mut [f32]);
}

/// Identity source for stages without modulation.
pub struct NoModulation;

impl ModulationSource for NoModulation {
    fn is_bypassed(&self) -> bool {
        true
    }

    fn num_children(&self) -> usize {
        0
    }

    fn prepare_to_play(&mut self, _sample_rate: f32, _block_size: usize) {}

    fn render(&mut self, buffer: &mut [f32]) {
        buffer.fill(1.0);
    }
}

/// Source producing a fixed modulation value on every frame.
pub struct ConstantModulation {
    pub value: f32,
}

impl ConstantModulation {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl ModulationSource for ConstantModulation {
    fn is_bypassed(&self) -> bool {
        false
    }

    fn num_children(&self) -> usize {
        1
    }

    fn prepare_to_play(&mut self, _sample_rate: f32, _block_size: usize) {}

    fn render(&mut self, buffer: &mut [f32]) {
        buffer.fill(self.value);
    }
}

/// One modulation chain slot owned by the effect
///
/// Owns the optional source and the buffer it renders into. The buffer is
/// grown in `prepare_to_play` only; `begin_block` caches the bypass/active
/// decision once per block so the per-sample loops never touch the trait
/// object.
pub struct ModulatorSlot {
    source: Option<Box<dyn ModulationSource>>,
    buffer: Vec<f32>,
    active: bool,
    sample_rate: f32,
}

impl ModulatorSlot {
    pub fn new() -> Self {
        Self {
            source: None,
            buffer: Vec::new(),
            active: false,
            sample_rate: 0.0,
        }
    }

    /// Attach a source; pass None to detach.
    pub fn set_source(&mut self, source: Option<Box<dyn ModulationSource>>) {
        self.source = source;
        self.active = false;
        if let Some(source) = self.source.as_mut() {
            if self.sample_rate > 0.0 && !self.buffer.is_empty() {
                source.prepare_to_play(self.sample_rate, self.buffer.len());
            }
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize) {
        self.sample_rate = sample_rate;
        if self.buffer.len() < block_size {
            self.buffer.resize(block_size, 1.0);
        }
        if let Some(source) = self.source.as_mut() {
            source.prepare_to_play(sample_rate, block_size);
        }
    }

    /// Evaluate the chain for the coming block. Returns whether the chain
    /// is active; if it is, the slot buffer holds `num_samples` fresh
    /// modulation values.
    pub fn begin_block(&mut self, num_samples: usize) -> bool {
        self.active = false;

        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if source.is_bypassed() || source.num_children() == 0 {
            return false;
        }
        if self.buffer.len() < num_samples {
            // Host sent a bigger block than it prepared for.
            debug_assert!(false, "block larger than prepared size");
            return false;
        }

        source.render(&mut self.buffer[..num_samples]);
        self.active = true;
        true
    }

    /// Whether the last `begin_block` found the chain active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Modulation values rendered by the last `begin_block`.
    pub fn values(&self, num_samples: usize) -> &[f32] {
        &self.buffer[..num_samples]
    }
}

impl Default for ModulatorSlot {
    fn default() -> Self {
        Self::new()
    }
}
