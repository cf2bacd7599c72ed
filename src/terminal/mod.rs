//! Terminal display for the booth.
//!
//! Frames are drawn as 24-bit colored half blocks: each character cell shows
//! two vertically stacked pixels (`▀` with the top pixel as foreground and
//! the bottom pixel as background). Overlay text is drawn on top, centered.

mod prompt;
mod screen;

pub use prompt::{console_prompt, ConsolePrompt, LinePrompt};
pub use screen::ScreenGuard;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::{queue, terminal};
use image::imageops;
use image::RgbImage;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crate::bridge::BoothEvent;
use crate::geometry::Dimensions;
use crate::renderer::{RenderError, Renderer, TextStyle};

/// Map a key press to a booth event.
pub fn key_to_event(key: KeyEvent) -> Option<BoothEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(BoothEvent::Start),
        KeyCode::Esc | KeyCode::Char('q') => Some(BoothEvent::Quit),
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(BoothEvent::Quit)
        }
        _ => None,
    }
}

/// Pad overlay text according to its style.
fn styled_text(text: &str, style: TextStyle) -> String {
    match style {
        TextStyle::Small => text.to_string(),
        TextStyle::Large => format!(" {} ", text),
        TextStyle::Huge => format!("   {}   ", text),
    }
}

/// Renderer drawing to the controlling terminal.
pub struct TerminalRenderer {
    out: Stdout,
    screen: Option<ScreenGuard>,
    canvas: RgbImage,
    overlays: Vec<(String, TextStyle)>,
    cols: u16,
    rows: u16,
}

impl TerminalRenderer {
    /// Take over the terminal.
    pub fn new() -> io::Result<Self> {
        let screen = ScreenGuard::enter()?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out: io::stdout(),
            screen: Some(screen),
            canvas: RgbImage::new(cols as u32, rows as u32 * 2),
            overlays: Vec::new(),
            cols,
            rows,
        })
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.canvas = RgbImage::new(cols as u32, rows as u32 * 2);
    }

    fn queue_canvas(&mut self) -> io::Result<()> {
        for row in 0..self.rows {
            queue!(self.out, MoveTo(0, row))?;
            for col in 0..self.cols {
                let x = col as u32;
                let top = self.canvas.get_pixel(x, row as u32 * 2).0;
                let bottom = self.canvas.get_pixel(x, row as u32 * 2 + 1).0;
                queue!(
                    self.out,
                    SetForegroundColor(Color::Rgb {
                        r: top[0],
                        g: top[1],
                        b: top[2]
                    }),
                    SetBackgroundColor(Color::Rgb {
                        r: bottom[0],
                        g: bottom[1],
                        b: bottom[2]
                    }),
                    Print('▀')
                )?;
            }
        }
        queue!(self.out, ResetColor)
    }

    fn queue_overlays(&mut self) -> io::Result<()> {
        let count = self.overlays.len() as u16;
        let first_row = (self.rows / 2).saturating_sub(count / 2);
        for (i, (text, style)) in self.overlays.iter().enumerate() {
            let text = styled_text(text, *style);
            let width = text.chars().count() as u16;
            let col = self.cols.saturating_sub(width) / 2;
            queue!(self.out, MoveTo(col, first_row + i as u16), SetAttribute(Attribute::Bold))?;
            if *style == TextStyle::Huge {
                queue!(self.out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(
                self.out,
                SetForegroundColor(Color::White),
                SetBackgroundColor(Color::Black),
                Print(text),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }
        Ok(())
    }
}

impl Renderer for TerminalRenderer {
    fn screen_size(&self) -> Dimensions {
        Dimensions::new(self.cols as u32, self.rows as u32 * 2)
    }

    fn poll_events(&mut self) -> Result<Vec<BoothEvent>, RenderError> {
        let mut events = Vec::new();
        if self.screen.is_none() {
            return Ok(events);
        }
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => events.extend(key_to_event(key)),
                Event::Resize(cols, rows) => self.resize(cols, rows),
                _ => {}
            }
        }
        Ok(events)
    }

    fn draw_frame(&mut self, frame: &RgbImage, x: i64, y: i64) -> Result<(), RenderError> {
        imageops::replace(&mut self.canvas, frame, x, y);
        Ok(())
    }

    fn draw_centered_text(&mut self, text: &str, style: TextStyle) -> Result<(), RenderError> {
        self.overlays.push((text.to_string(), style));
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), RenderError> {
        if fullscreen {
            if self.screen.is_none() {
                self.screen = Some(ScreenGuard::enter()?);
                let (cols, rows) = terminal::size()?;
                self.resize(cols, rows);
            }
        } else if let Some(mut screen) = self.screen.take() {
            screen.exit()?;
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if self.screen.is_some() {
            self.queue_canvas()?;
            self.queue_overlays()?;
            self.out.flush()?;
        }
        self.overlays.clear();
        self.canvas.fill(0);
        Ok(())
    }
}
