use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use rayon::iter::ParallelIterator;
use rayon::slice::ParallelSliceMut;

use crate::core::Color;

/// Upper half block. Foreground paints the top pixel of a cell, background the bottom.
pub const HALF_BLOCK: char = '▀';

/// A color target with a depth buffer. Depth is NDC z remapped to `[0, 1]`,
/// smaller is closer.
pub trait Buffer {
    fn new(width: usize, height: usize) -> Self
    where
        Self: Sized;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Reallocate for new dimensions. Contents are undefined until the next clear.
    fn resize(&mut self, width: usize, height: usize);
    fn clear(&mut self, background: Color);
    /// Depth tested write.
    fn set_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color);
    /// Depth tested saturating add onto the current color.
    fn blend_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color, depth_write: bool);
    fn get_pixel(&self, pos: (usize, usize)) -> Option<Color>;
}

pub struct TermBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<Color>,
    pub depth: Vec<f32>,
}

impl TermBuffer {
    fn index(&self, pos: (usize, usize)) -> Option<usize> {
        (pos.0 < self.width && pos.1 < self.height).then(|| pos.0 + pos.1 * self.width)
    }

    /// Write the buffer as half-block cells, two pixel rows per terminal row.
    /// Color escapes are only emitted when a cell differs from the previous one.
    pub fn write_half_blocks<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut last_colors: Option<(Color, Color)> = None;

        for row in 0..self.height.div_ceil(2) {
            out.queue(MoveTo(0, row as u16))?;
            let top_y = row * 2;
            let bottom_y = top_y + 1;

            for x in 0..self.width {
                let top = self.data[x + top_y * self.width];
                let bottom = if bottom_y < self.height {
                    self.data[x + bottom_y * self.width]
                } else {
                    Color::BLACK
                };

                if last_colors != Some((top, bottom)) {
                    out.queue(SetForegroundColor(top.to_crossterm_color()))?;
                    out.queue(SetBackgroundColor(bottom.to_crossterm_color()))?;
                    last_colors = Some((top, bottom));
                }
                out.queue(Print(HALF_BLOCK))?;
            }
        }
        out.flush()
    }
}

impl Buffer for TermBuffer {
    fn new(width: usize, height: usize) -> Self {
        TermBuffer {
            width,
            height,
            data: vec![Color::BLACK; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, Color::BLACK);
        self.depth.resize(width * height, f32::INFINITY);
    }

    fn clear(&mut self, background: Color) {
        self.data.par_chunks_mut(1024).for_each(|chunk| {
            for point in chunk {
                *point = background;
            }
        });
        self.depth.par_chunks_mut(1024).for_each(|chunk| {
            for depth in chunk {
                *depth = f32::INFINITY;
            }
        });
    }

    fn set_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color) {
        if let Some(index) = self.index(pos) {
            if *depth < self.depth[index] {
                self.data[index] = color;
                self.depth[index] = *depth;
            }
        }
    }

    fn blend_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color, depth_write: bool) {
        if let Some(index) = self.index(pos) {
            if *depth < self.depth[index] {
                self.data[index] = self.data[index].add_clamped(&color);
                if depth_write {
                    self.depth[index] = *depth;
                }
            }
        }
    }

    fn get_pixel(&self, pos: (usize, usize)) -> Option<Color> {
        self.index(pos).map(|i| self.data[i])
    }
}

/// Packed `0RGB` pixels, ready for `minifb::Window::update_with_buffer`.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl FrameBuffer {
    fn index(&self, pos: (usize, usize)) -> Option<usize> {
        (pos.0 < self.width && pos.1 < self.height).then(|| pos.0 + pos.1 * self.width)
    }
}

impl Buffer for FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        let buf_size = width * height;
        FrameBuffer {
            width,
            height,
            data: vec![0; buf_size],
            depth: vec![f32::INFINITY; buf_size],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, 0);
        self.depth.resize(width * height, f32::INFINITY);
    }

    fn clear(&mut self, background: Color) {
        let packed = background.to_u32();
        self.data.par_chunks_mut(1024).for_each(|chunk| {
            for point in chunk {
                *point = packed;
            }
        });
        self.depth.par_chunks_mut(1024).for_each(|chunk| {
            for d in chunk {
                *d = f32::INFINITY;
            }
        });
    }

    fn set_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color) {
        if let Some(index) = self.index(pos) {
            if *depth < self.depth[index] {
                self.data[index] = color.to_u32();
                self.depth[index] = *depth;
            }
        }
    }

    fn blend_pixel(&mut self, pos: (usize, usize), depth: &f32, color: Color, depth_write: bool) {
        if let Some(index) = self.index(pos) {
            if *depth < self.depth[index] {
                let dst = Color::from_u32(self.data[index]);
                self.data[index] = dst.add_clamped(&color).to_u32();
                if depth_write {
                    self.depth[index] = *depth;
                }
            }
        }
    }

    fn get_pixel(&self, pos: (usize, usize)) -> Option<Color> {
        self.index(pos).map(|i| Color::from_u32(self.data[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_nearest() {
        let mut buf = FrameBuffer::new(4, 4);
        buf.clear(Color::BLACK);
        buf.set_pixel((1, 1), &0.5, Color::RED);
        buf.set_pixel((1, 1), &0.8, Color::GREEN);
        assert_eq!(buf.get_pixel((1, 1)), Some(Color::RED));
        buf.set_pixel((1, 1), &0.2, Color::BLUE);
        assert_eq!(buf.get_pixel((1, 1)), Some(Color::BLUE));
    }

    #[test]
    fn additive_blend_saturates_and_skips_depth() {
        let mut buf = TermBuffer::new(2, 2);
        buf.clear(Color::BLACK);
        buf.blend_pixel((0, 0), &0.5, Color::new(0.6, 0.0, 0.0), false);
        buf.blend_pixel((0, 0), &0.9, Color::new(0.6, 0.3, 0.0), false);
        assert_eq!(buf.get_pixel((0, 0)), Some(Color::new(1.0, 0.3, 0.0)));
        assert_eq!(buf.depth[0], f32::INFINITY);

        // hidden behind an opaque surface
        buf.set_pixel((1, 0), &0.1, Color::BLACK);
        buf.blend_pixel((1, 0), &0.5, Color::WHITE, false);
        assert_eq!(buf.get_pixel((1, 0)), Some(Color::BLACK));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.set_pixel((5, 0), &0.0, Color::WHITE);
        assert_eq!(buf.get_pixel((5, 0)), None);
    }

    #[test]
    fn resize_then_clear_fills_new_area() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.resize(8, 3);
        buf.clear(Color::WHITE);
        assert_eq!((buf.width(), buf.height()), (8, 3));
        assert_eq!(buf.data.len(), 24);
        assert!(buf.data.iter().all(|&p| p == 0x00FF_FFFF));
    }

    #[test]
    fn half_blocks_cover_odd_heights() {
        let mut buf = TermBuffer::new(3, 3);
        buf.clear(Color::WHITE);
        let mut out = Vec::new();
        buf.write_half_blocks(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 6);
    }
}
