// ABOUTME: Float RGBA frame buffers and the double-buffer pair that CLEAR toggles.
// ABOUTME: Handles lazy resets and composition into RGBA8 bytes for presentation.

use rayon::prelude::*;
use vcrt_core::Palette;

/// One pixel: `[r, g, b]` trail color plus `a` glow intensity, all in `[0, 1]`
pub type Texel = [f32; 4];

pub const BLANK: Texel = [0.0; 4];

/// Row-major grid of texels
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    texels: Vec<Texel>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            texels: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texel(&self, x: usize, y: usize) -> Option<Texel> {
        if x < self.width && y < self.height {
            Some(self.texels[y * self.width + x])
        } else {
            None
        }
    }

    /// Glow intensity at a pixel, 0 outside the buffer
    pub fn alpha(&self, x: usize, y: usize) -> f32 {
        self.texel(x, y).map_or(0.0, |t| t[3])
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [Texel] {
        &mut self.texels
    }

    pub fn reset(&mut self) {
        self.texels.fill(BLANK);
    }

    pub fn is_blank(&self) -> bool {
        self.texels.iter().all(|t| *t == BLANK)
    }

    /// Compose against the palette background into tightly packed RGBA8.
    /// Each channel is `primary + (trail - primary) * a`.
    pub fn compose_rgba8(&self, palette: &Palette, out: &mut Vec<u8>) {
        let background = palette.primary.to_f32();
        out.resize(self.texels.len() * 4, 0);
        out.par_chunks_mut(4)
            .zip(self.texels.par_iter())
            .for_each(|(pixel, texel)| {
                let a = texel[3].clamp(0.0, 1.0);
                for channel in 0..3 {
                    let value = background[channel] + (texel[channel] - background[channel]) * a;
                    pixel[channel] = to_byte(value);
                }
                pixel[3] = u8::MAX;
            });
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Two owned buffers. Exactly one is current (the write target).
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    buffers: [FrameBuffer; 2],
    current: usize,
    pending_reset: [bool; 2],
}

impl DoubleBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffers: [FrameBuffer::new(width, height), FrameBuffer::new(width, height)],
            current: 0,
            pending_reset: [false; 2],
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &FrameBuffer {
        &self.buffers[self.current]
    }

    /// Write access to the current buffer; fires its pending reset first
    pub fn current_mut(&mut self) -> &mut FrameBuffer {
        self.reset_if_pending(self.current);
        &mut self.buffers[self.current]
    }

    pub fn buffer(&self, index: usize) -> &FrameBuffer {
        &self.buffers[index & 1]
    }

    pub fn is_reset_pending(&self, index: usize) -> bool {
        self.pending_reset[index & 1]
    }

    /// Make the other buffer current and mark the old one for a lazy reset
    pub fn swap(&mut self) {
        self.pending_reset[self.current] = true;
        self.current ^= 1;
    }

    /// Run every outstanding reset. Called at the end of a tick.
    pub fn flush_resets(&mut self) {
        for index in 0..2 {
            self.reset_if_pending(index);
        }
    }

    fn reset_if_pending(&mut self, index: usize) {
        if self.pending_reset[index] {
            self.buffers[index].reset();
            self.pending_reset[index] = false;
        }
    }
}
