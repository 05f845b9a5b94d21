use std::io;

use log::{debug, info};
use minifb::{Key, MouseButton, MouseMode, Scale, Window, WindowOptions};

use crate::error::Result;
use crate::pipeline::FrameBuffer;

use super::{Host, HostEvent};

/// A resizable desktop window. minifb reports sizes in physical pixels and
/// scales nothing itself, so the pixel ratio is always 1.
pub struct WindowHost {
    window: Window,
    title: String,
    size: (usize, usize),
    last_mouse: Option<(f32, f32)>,
    closed: bool,
}

impl WindowHost {
    pub fn open(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self> {
        let opts = WindowOptions {
            resize: true,
            scale: Scale::X1,
            title: true,
            borderless: false,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, opts)?;
        window.set_target_fps(target_fps);
        let size = window.get_size();
        info!("Opened window '{}' at {}x{}", title, size.0, size.1);

        Ok(Self {
            window,
            title: title.to_string(),
            size,
            last_mouse: None,
            closed: false,
        })
    }

    fn poll_pointer(&mut self, events: &mut Vec<HostEvent>) {
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        if self.window.get_mouse_down(MouseButton::Left) {
            if let (Some((x, y)), Some((lx, ly))) = (pos, self.last_mouse) {
                if (x, y) != (lx, ly) {
                    events.push(HostEvent::Drag {
                        dx: x - lx,
                        dy: y - ly,
                    });
                }
            }
            self.last_mouse = pos;
        } else {
            self.last_mouse = None;
        }

        if let Some((_, scroll_y)) = self.window.get_scroll_wheel() {
            if scroll_y != 0.0 {
                events.push(HostEvent::Zoom(scroll_y.signum()));
            }
        }
    }
}

impl Host for WindowHost {
    type Target = FrameBuffer;

    fn title(&self) -> &str {
        &self.title
    }

    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    fn is_open(&self) -> bool {
        !self.closed && self.window.is_open()
    }

    fn poll_events(&mut self) -> io::Result<Vec<HostEvent>> {
        let mut events = Vec::new();

        if !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
        {
            self.closed = true;
            events.push(HostEvent::Close);
            return Ok(events);
        }

        let size = self.window.get_size();
        if size != self.size {
            debug!("Window resized {:?} -> {:?}", self.size, size);
            self.size = size;
            events.push(HostEvent::Resize {
                width: size.0,
                height: size.1,
                pixel_ratio: self.pixel_ratio(),
            });
        }

        self.poll_pointer(&mut events);
        Ok(events)
    }

    fn present(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        self.window
            .update_with_buffer(&frame.data, frame.width, frame.height)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}
