/// Maximum delay in samples. Power of two so read/write positions can wrap
/// with a mask. 65536 samples is ~1.49 s at 44.1 kHz, which covers the
/// 0..1000 ms delay parameter at any common sample rate.
pub const MAX_DELAY_SAMPLES: usize = 1 << 16;

const INDEX_MASK: usize = MAX_DELAY_SAMPLES - 1;

/// Single-channel delay line with click-free time changes
///
/// Keeps a circular history of past samples. When the delay time changes,
/// the read position does not jump; instead the output crossfades linearly
/// from the old read offset to the new one over `fade_time_samples`
/// samples. A time change arriving while a fade is still running is stored
/// and applied once the fade completes.
///
/// A delay time of zero returns the input sample unchanged. Left and right
/// channels use independent instances.
pub struct DelayLine {
    buffer: Box<[f32]>,
    write_index: usize,
    read_index: usize,
    old_read_index: usize,
    current_delay: usize,
    pending_delay: Option<usize>,
    fade_time_samples: usize,
    fade_counter: usize,
    sample_rate: f32,
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; MAX_DELAY_SAMPLES].into_boxed_slice(),
            write_index: 0,
            read_index: 0,
            old_read_index: 0,
            current_delay: 0,
            pending_delay: None,
            fade_time_samples: 1024,
            fade_counter: 0,
            sample_rate: 0.0,
        }
    }

    pub fn prepare_to_play(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.clear();
    }

    /// Clear the history and cancel any running fade. The current delay
    /// time is kept.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
        self.read_index = (MAX_DELAY_SAMPLES - self.current_delay) & INDEX_MASK;
        self.old_read_index = self.read_index;
        self.pending_delay = None;
        self.fade_counter = 0;
    }

    /// Number of samples the crossfade spans when the delay time changes.
    pub fn set_fade_time_samples(&mut self, samples: usize) {
        self.fade_time_samples = samples;
    }

    pub fn set_delay_time_seconds(&mut self, seconds: f32) {
        if self.sample_rate <= 0.0 {
            return;
        }
        let samples = (seconds.max(0.0) * self.sample_rate) as usize;
        self.set_delay_time_samples(samples);
    }

    pub fn set_delay_time_samples(&mut self, samples: usize) {
        let samples = samples.min(MAX_DELAY_SAMPLES - 1);

        if self.fade_counter > 0 {
            // Finish the running fade first; remember the latest request.
            if samples != self.current_delay {
                self.pending_delay = Some(samples);
            } else {
                self.pending_delay = None;
            }
            return;
        }

        if samples != self.current_delay {
            self.start_fade(samples);
        }
    }

    pub fn delay_time_samples(&self) -> usize {
        self.current_delay
    }

    /// Push one input sample and return the delayed output sample.
    #[inline]
    pub fn get_delayed_value(&mut self, input: f32) -> f32 {
        self.buffer[self.write_index] = input;
        self.write_index = (self.write_index + 1) & INDEX_MASK;

        let new_value = self.buffer[self.read_index];
        self.read_index = (self.read_index + 1) & INDEX_MASK;

        if self.fade_counter == 0 {
            return new_value;
        }

        let old_value = self.buffer[self.old_read_index];
        self.old_read_index = (self.old_read_index + 1) & INDEX_MASK;

        self.fade_counter -= 1;
        let mix = 1.0 - self.fade_counter as f32 / self.fade_time_samples as f32;

        if self.fade_counter == 0 {
            if let Some(pending) = self.pending_delay.take() {
                self.start_fade(pending);
            }
        }

        old_value * (1.0 - mix) + new_value * mix
    }

    fn start_fade(&mut self, new_delay: usize) {
        self.old_read_index = self.read_index;
        self.read_index = (self.write_index + MAX_DELAY_SAMPLES - new_delay) & INDEX_MASK;
        self.current_delay = new_delay;
        if self.fade_time_samples > 0 {
            self.fade_counter = self.fade_time_samples;
        }
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}
