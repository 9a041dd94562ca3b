/// Mid/side stereo width transform
///
/// Encodes a stereo pair into mid (common) and side (difference)
/// components, scales the side component by the width factor and decodes
/// back. Width 1.0 is an exact passthrough, 0.0 collapses to mono, values
/// above 1.0 exaggerate the stereo image and may push samples outside the
/// unit range (deliberately not clipped here).
#[derive(Debug, Clone)]
pub struct MidSideDecoder {
    width: f32,
}

impl MidSideDecoder {
    pub fn new() -> Self {
        Self { width: 1.0 }
    }

    /// Width factor: 0.0 = mono, 1.0 = unchanged, 2.0 = doubled side level.
    pub fn set_width(&mut self, width: f32) {
        self.width = width.clamp(0.0, 2.0);
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Transform one stereo sample pair in place.
    #[inline]
    pub fn calculate_stereo_values(&self, left: &mut f32, right: &mut f32) {
        Self::apply_width(left, right, self.width);
    }

    /// Width transform with an explicit factor, for block-level modulated
    /// width where the stored value must stay untouched.
    #[inline]
    pub fn apply_width(left: &mut f32, right: &mut f32, width: f32) {
        if width == 1.0 {
            return;
        }

        let mid = 0.5 * (*left + *right);
        let side = 0.5 * (*left - *right) * width;

        *left = mid + side;
        *right = mid - side;
    }
}

impl Default for MidSideDecoder {
    fn default() -> Self {
        Self::new()
    }
}
