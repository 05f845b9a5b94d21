use std::io::{self, stdout, BufWriter, Stdout};
use std::panic;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    style::SetBackgroundColor,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info, warn};

use crate::core::Color;
use crate::error::Result;
use crate::pipeline::TermBuffer;

use super::{Host, HostEvent};

/// Draws into the terminal's alternate screen with half-block cells, so one
/// cell holds two vertically stacked pixels.
pub struct TerminalHost {
    out: BufWriter<Stdout>,
    size: (usize, usize),
    frame_time: Duration,
    last_present: Instant,
    drag_anchor: Option<(u16, u16)>,
    closed: bool,
}

impl TerminalHost {
    pub fn open(target_fps: usize) -> Result<Self> {
        // Set up panic hook for terminal cleanup
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            if let Err(e) = cleanup_terminal() {
                eprintln!("Failed to cleanup terminal: {}", e);
            }
            eprintln!("\n=== Panic Occurred ===");
            original_hook(panic_info);
            error!("Panic occurred: {:?}", panic_info);
        }));

        let mut out = BufWriter::new(stdout());
        enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            Hide,
            EnableMouseCapture,
            SetBackgroundColor(Color::BLACK.to_crossterm_color()),
            Clear(ClearType::All),
        )?;

        let (cols, rows) = terminal::size()?;
        info!("Attached to terminal with {}x{} cells", cols, rows);

        Ok(Self {
            out,
            size: cell_to_pixel_size(cols, rows),
            frame_time: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            last_present: Instant::now(),
            drag_anchor: None,
            closed: false,
        })
    }

    fn translate(&mut self, event: Event) -> Option<HostEvent> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(HostEvent::Close),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(HostEvent::Close)
                }
                _ => None,
            },
            Event::Resize(cols, rows) => {
                let (width, height) = cell_to_pixel_size(cols, rows);
                if (width, height) == self.size {
                    return None;
                }
                self.size = (width, height);
                Some(HostEvent::Resize {
                    width,
                    height,
                    pixel_ratio: 1.0,
                })
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.drag_anchor = Some((mouse.column, mouse.row));
                    None
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    let anchor = self.drag_anchor.replace((mouse.column, mouse.row))?;
                    Some(HostEvent::Drag {
                        dx: mouse.column as f32 - anchor.0 as f32,
                        // two pixel rows per cell
                        dy: (mouse.row as f32 - anchor.1 as f32) * 2.0,
                    })
                }
                MouseEventKind::Up(MouseButton::Left) => {
                    self.drag_anchor = None;
                    None
                }
                MouseEventKind::ScrollUp => Some(HostEvent::Zoom(1.0)),
                MouseEventKind::ScrollDown => Some(HostEvent::Zoom(-1.0)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Host for TerminalHost {
    type Target = TermBuffer;

    fn title(&self) -> &str {
        "terminal"
    }

    fn size(&self) -> (usize, usize) {
        self.size
    }

    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    fn is_open(&self) -> bool {
        !self.closed
    }

    fn poll_events(&mut self) -> io::Result<Vec<HostEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Some(ev) = self.translate(event::read()?) {
                if ev == HostEvent::Close {
                    self.closed = true;
                }
                events.push(ev);
            }
        }
        Ok(events)
    }

    fn present(&mut self, frame: &TermBuffer) -> io::Result<()> {
        frame.write_half_blocks(&mut self.out)?;

        let elapsed = self.last_present.elapsed();
        if elapsed < self.frame_time {
            thread::sleep(self.frame_time - elapsed);
        }
        self.last_present = Instant::now();
        Ok(())
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

fn cell_to_pixel_size(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize, rows as usize * 2)
}

fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = stdout();
    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
