//! Display hosts: the surface a frame is shown on and the source of input and
//! resize notifications.

use std::io;

use crate::pipeline::Buffer;

mod terminal;
mod window;

pub use terminal::TerminalHost;
pub use window::WindowHost;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// New logical size of the drawing surface.
    Resize {
        width: usize,
        height: usize,
        pixel_ratio: f32,
    },
    /// Primary button held while the pointer moved, in logical pixels.
    Drag { dx: f32, dy: f32 },
    /// Wheel notches, positive toward the scene.
    Zoom(f32),
    Close,
}

pub trait Host {
    type Target: Buffer;

    fn title(&self) -> &str;
    /// Logical size of the drawing surface.
    fn size(&self) -> (usize, usize);
    fn pixel_ratio(&self) -> f32;
    fn is_open(&self) -> bool;
    /// Everything that happened since the last call, oldest first.
    fn poll_events(&mut self) -> io::Result<Vec<HostEvent>>;
    /// Show a finished frame. Blocks as needed to hold the host's frame rate.
    fn present(&mut self, frame: &Self::Target) -> io::Result<()>;
}
