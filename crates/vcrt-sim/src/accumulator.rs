// ABOUTME: Afterglow accumulation: paints the traced beam path and decays everything else.
// ABOUTME: One parallel pass over the current buffer per tick, bounded by trace capacity.

use rayon::prelude::*;
use vcrt_core::{Palette, Point};

use crate::framebuffer::{DoubleBuffer, FrameBuffer, Texel};
use crate::gun::ElectronGun;
use crate::trace::PositionTrace;

/// A powered segment with its radius-expanded bounding box
#[derive(Debug, Clone, Copy)]
struct Stroke {
    a: Point,
    b: Point,
    min: Point,
    max: Point,
}

impl Stroke {
    fn new(a: Point, b: Point, radius: f32) -> Self {
        Self {
            a,
            b,
            min: Point::new(a.x.min(b.x) - radius, a.y.min(b.y) - radius),
            max: Point::new(a.x.max(b.x) + radius, a.y.max(b.y) + radius),
        }
    }

    fn spans_row(&self, y: f32) -> bool {
        y >= self.min.y && y <= self.max.y
    }

    fn spans_column(&self, x: f32) -> bool {
        x >= self.min.x && x <= self.max.x
    }
}

/// The beam disc at the gun's current position, if it is powered
#[derive(Debug, Clone, Copy)]
struct Spot {
    center: Point,
    radius: f32,
}

pub struct FrameAccumulator {
    buffers: DoubleBuffer,
    beam: [f32; 3],
    strokes: Vec<Stroke>,
}

impl FrameAccumulator {
    pub fn new(width: usize, height: usize, palette: &Palette) -> Self {
        Self {
            buffers: DoubleBuffer::new(width, height),
            beam: palette.secondary.to_f32(),
            strokes: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.buffers.current().width()
    }

    pub fn height(&self) -> usize {
        self.buffers.current().height()
    }

    /// The buffer presentation reads from
    pub fn current(&self) -> &FrameBuffer {
        self.buffers.current()
    }

    pub fn current_index(&self) -> usize {
        self.buffers.current_index()
    }

    pub fn buffers(&self) -> &DoubleBuffer {
        &self.buffers
    }

    /// Handle a CLEAR: later strokes land in the other buffer
    pub fn clear(&mut self) {
        self.buffers.swap();
    }

    /// Run one draw/decay pass over the current buffer, then settle lazy resets
    pub fn accumulate(&mut self, gun: &ElectronGun, trace: &PositionTrace) {
        let radius = gun.radius();
        let dim = gun.dim_factor();
        let beam = self.beam;

        self.strokes.clear();
        self.strokes.extend(
            trace
                .segments()
                .filter(|(a, b)| a.powered_on && b.powered_on)
                .map(|(a, b)| Stroke::new(a.position, b.position, radius)),
        );
        let spot = gun.is_powered_on().then(|| Spot {
            center: gun.position(),
            radius,
        });

        let strokes = &self.strokes;
        let buffer = self.buffers.current_mut();
        let width = buffer.width();
        if width > 0 {
            buffer
                .texels_mut()
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, texels)| {
                    shade_row(row as f32, texels, strokes, spot, radius, dim, beam);
                });
        }

        self.buffers.flush_resets();
    }

    /// Compose the current buffer into RGBA8 for upload
    pub fn compose_rgba8(&self, palette: &Palette, out: &mut Vec<u8>) {
        self.buffers.current().compose_rgba8(palette, out);
    }
}

fn shade_row(
    y: f32,
    texels: &mut [Texel],
    strokes: &[Stroke],
    spot: Option<Spot>,
    radius: f32,
    dim: f32,
    beam: [f32; 3],
) {
    let row_strokes: Vec<&Stroke> = strokes.iter().filter(|s| s.spans_row(y)).collect();
    let spot = spot.filter(|s| (s.center.y - y).abs() < s.radius);

    for (column, texel) in texels.iter_mut().enumerate() {
        let p = Point::new(column as f32, y);

        let on_spot = spot.is_some_and(|s| p.distance(s.center) < s.radius);
        let on_stroke = !on_spot
            && row_strokes
                .iter()
                .any(|s| s.spans_column(p.x) && p.distance_to_segment(s.a, s.b) <= radius);

        if on_spot || on_stroke {
            *texel = [beam[0], beam[1], beam[2], 1.0];
        } else {
            decay(texel, dim);
        }
    }
}

fn decay(texel: &mut Texel, dim: f32) {
    let trail = dim / 10.0;
    texel[0] = (texel[0] - trail).clamp(0.0, 1.0);
    texel[1] = (texel[1] - trail).clamp(0.0, 1.0);
    texel[2] = (texel[2] - trail).clamp(0.0, 1.0);
    texel[3] = (texel[3] - dim).clamp(0.0, 1.0);
}
