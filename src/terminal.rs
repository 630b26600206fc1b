// SPDX-License-Identifier: GPL-3.0-only

//! Terminal display surface
//!
//! Presents the software canvas in the terminal using Unicode half-block
//! characters for improved vertical resolution, with a one-line status bar
//! at the bottom. Keyboard input arrives through crossterm.

use crate::constants::{COLOR_HEIGHT, COLOR_WIDTH, RGBA_CHANNELS, STATUS_CAPACITY, WINDOW_TITLE};
use crate::errors::RenderError;
use crate::pipeline::Vertex;
use crate::render::{
    Canvas, DisplaySurface, ImageView, InputEvent, Key, KeyAction, KeyInput, RenderBackend,
    RenderState,
};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::cell::Cell;
use std::io::{self, Stdout, stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Canvas size in pixels that fits `cols`x`rows` cells (minus the status
/// line) while keeping the window aspect ratio
pub fn fit_canvas(cols: u16, rows: u16, aspect: f64) -> (usize, usize) {
    let term_width = cols as f64;
    // *2 because half-blocks
    let term_height = (rows.saturating_sub(1) as f64) * 2.0;
    if term_width < 1.0 || term_height < 2.0 {
        return (0, 0);
    }

    let (w, h) = if term_width / term_height > aspect {
        // Terminal is wider - fit to height
        (term_height * aspect, term_height)
    } else {
        // Terminal is taller - fit to width
        (term_width, term_width / aspect)
    };

    // Keep an even pixel height so every cell has two rows
    let cells = (h / 2.0) as usize;
    (w as usize, cells * 2)
}

/// Write the status bar text for `status` into `out`, reusing its storage
fn compose_status(out: &mut String, status: &str) {
    out.clear();
    out.push_str(WINDOW_TITLE);
    out.push_str(" | ");
    out.push_str(status);
}

/// Runs `undo` on drop unless disarmed
///
/// Covers the window in [`TerminalDisplay::new`] where the terminal is already
/// in raw mode but no display exists yet to restore it.
struct SetupGuard<F: FnMut()> {
    undo: Option<F>,
}

impl<F: FnMut()> SetupGuard<F> {
    fn new(undo: F) -> Self {
        Self { undo: Some(undo) }
    }

    fn disarm(mut self) {
        self.undo = None;
    }
}

impl<F: FnMut()> Drop for SetupGuard<F> {
    fn drop(&mut self) {
        if let Some(mut undo) = self.undo.take() {
            undo();
        }
    }
}

fn map_key(key: KeyEvent) -> InputEvent {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return InputEvent::CloseRequested;
    }

    let action = match key.kind {
        KeyEventKind::Press => KeyAction::Press,
        KeyEventKind::Repeat => KeyAction::Repeat,
        KeyEventKind::Release => KeyAction::Release,
    };
    let key = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Escape,
        _ => Key::Other,
    };
    InputEvent::Key(KeyInput { key, action })
}

/// The viewer's window, drawn into the terminal
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    canvas: Canvas,
    status: String,
    stop: Arc<AtomicBool>,
    closed: bool,
    keyboard_enhanced: bool,
    restored: bool,
}

impl TerminalDisplay {
    /// Take over the terminal
    ///
    /// `stop` is shared with the interrupt handler; once set, the display
    /// reports that it should close.
    pub fn new(stop: Arc<AtomicBool>) -> Result<Self, RenderError> {
        let setup = |e: io::Error| RenderError::SurfaceCreation(e.to_string());

        let enhanced = Cell::new(false);
        enable_raw_mode().map_err(setup)?;
        let guard = SetupGuard::new(|| {
            let mut out = stdout();
            if enhanced.get() {
                let _ = execute!(out, PopKeyboardEnhancementFlags);
            }
            let _ = execute!(out, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        });

        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen).map_err(setup)?;

        // Press/repeat/release reporting, where the terminal supports it
        let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        enhanced.set(keyboard_enhanced);

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(setup)?;
        terminal.hide_cursor().map_err(setup)?;
        let size = terminal.size().map_err(setup)?;

        let (width, height) = fit_canvas(
            size.width,
            size.height,
            COLOR_WIDTH as f64 / COLOR_HEIGHT as f64,
        );
        info!(
            cols = size.width,
            rows = size.height,
            width,
            height,
            keyboard_enhanced,
            "Terminal display ready"
        );

        let canvas = Canvas::new(width, height, COLOR_WIDTH as u32, COLOR_HEIGHT as u32)
            .with_texture_capacity(COLOR_WIDTH * COLOR_HEIGHT * RGBA_CHANNELS);

        guard.disarm();
        Ok(Self {
            terminal,
            canvas,
            status: String::with_capacity(STATUS_CAPACITY),
            stop,
            closed: false,
            keyboard_enhanced,
            restored: false,
        })
    }

    /// Give the terminal back; safe to call more than once
    pub fn close(&mut self) -> Result<(), RenderError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode()?;
        if self.keyboard_enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl DisplaySurface for TerminalDisplay {
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, RenderError> {
        let input = |e: io::Error| RenderError::Input(e.to_string());

        if !event::poll(timeout).map_err(input)? {
            return Ok(None);
        }

        let event = match event::read().map_err(input)? {
            Event::Key(key) => map_key(key),
            Event::Resize(cols, rows) => {
                let (width, height) = fit_canvas(
                    cols,
                    rows,
                    COLOR_WIDTH as f64 / COLOR_HEIGHT as f64,
                );
                debug!(cols, rows, width, height, "Terminal resized");
                self.canvas.resize(width, height);
                InputEvent::Resized {
                    width: cols,
                    height: rows,
                }
            }
            _ => return Ok(None),
        };

        if event == InputEvent::CloseRequested {
            self.closed = true;
        }
        Ok(Some(event))
    }

    fn present(&mut self, status: &str) -> Result<(), RenderError> {
        compose_status(&mut self.status, status);
        let canvas = &self.canvas;
        let message = self.status.as_str();
        self.terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let canvas_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            f.render_widget(FrameWidget { canvas }, canvas_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(StatusBar { message }, status_area);
        })?;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.closed || self.stop.load(Ordering::SeqCst)
    }
}

impl RenderBackend for TerminalDisplay {
    fn state(&self) -> RenderState {
        self.canvas.state()
    }

    fn set_state(&mut self, state: RenderState) {
        self.canvas.set_state(state);
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn upload_texture(&mut self, image: ImageView<'_>) -> Result<(), RenderError> {
        self.canvas.upload_texture(image)
    }

    fn draw_textured_quad(&mut self) -> Result<(), RenderError> {
        self.canvas.draw_textured_quad()
    }

    fn draw_points(
        &mut self,
        positions: &[Vertex],
        colors: &[Vertex],
        point_size: f32,
    ) -> Result<(), RenderError> {
        self.canvas.draw_points(positions, colors, point_size)
    }

    fn draw_lines(
        &mut self,
        segments: &[(Vertex, Vertex)],
        color: Vertex,
    ) -> Result<(), RenderError> {
        self.canvas.draw_lines(segments, color)
    }
}

/// Widget that shows the canvas using half-block characters
struct FrameWidget<'a> {
    canvas: &'a Canvas,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let canvas = self.canvas;
        if canvas.width() == 0 || canvas.height() == 0 {
            let msg = "Terminal too small";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        }

        let display_width = canvas.width() as u16;
        let display_height = (canvas.height() / 2) as u16;

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Each terminal cell represents 2 vertical pixels:
        // - Upper half (▀) colored with fg
        // - Lower half colored with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let x = tx as usize;
                let y = ty as usize * 2;
                let [tr, tg, tb] = canvas.pixel(x, y).unwrap_or_default();
                let [br, bg, bb] = canvas.pixel(x, y + 1).unwrap_or_default();

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Render text
        let end = self
            .message
            .char_indices()
            .nth(area.width as usize)
            .map_or(self.message.len(), |(i, _)| i);
        let text = &self.message[..end];

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_canvas_wide_terminal_fits_height() {
        // 200x41 cells: 40 rows for the image = 80 pixel rows
        let (w, h) = fit_canvas(200, 41, 16.0 / 9.0);
        assert_eq!(h, 80);
        assert_eq!(w, 142);
    }

    #[test]
    fn test_fit_canvas_tall_terminal_fits_width() {
        let (w, h) = fit_canvas(32, 100, 16.0 / 9.0);
        assert_eq!(w, 32);
        assert_eq!(h, 18);
    }

    #[test]
    fn test_fit_canvas_degenerate() {
        assert_eq!(fit_canvas(0, 10, 1.0), (0, 0));
        assert_eq!(fit_canvas(10, 1, 1.0), (0, 0));
    }

    #[test]
    fn test_ctrl_c_closes() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), InputEvent::CloseRequested);
    }

    #[test]
    fn test_key_kinds_map_to_actions() {
        let mut key = KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE);
        assert_eq!(
            map_key(key),
            InputEvent::Key(KeyInput::press(Key::Char('4')))
        );

        key.kind = KeyEventKind::Repeat;
        assert_eq!(
            map_key(key),
            InputEvent::Key(KeyInput {
                key: Key::Char('4'),
                action: KeyAction::Repeat,
            })
        );

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(map_key(esc), InputEvent::Key(KeyInput::press(Key::Escape)));
    }

    #[test]
    fn test_frame_widget_draws_half_blocks() {
        let mut canvas = Canvas::new(2, 2, 2, 2);
        canvas
            .upload_texture(ImageView {
                width: 1,
                height: 2,
                rgba: &[255, 0, 0, 255, 0, 0, 255, 255],
            })
            .unwrap();
        canvas.draw_textured_quad().unwrap();

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        FrameWidget { canvas: &canvas }.render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_setup_guard_undoes_unless_disarmed() {
        let undone = Cell::new(0);
        {
            let _guard = SetupGuard::new(|| undone.set(undone.get() + 1));
        }
        assert_eq!(undone.get(), 1);

        SetupGuard::new(|| undone.set(undone.get() + 1)).disarm();
        assert_eq!(undone.get(), 1);
    }

    #[test]
    fn test_setup_guard_runs_on_early_return() {
        fn setup(undone: &Cell<bool>, step: Result<(), RenderError>) -> Result<(), RenderError> {
            let guard = SetupGuard::new(|| undone.set(true));
            step?;
            guard.disarm();
            Ok(())
        }

        let undone = Cell::new(false);
        assert!(setup(&undone, Ok(())).is_ok());
        assert!(!undone.get());

        let failed = Err(RenderError::SurfaceCreation("no tty".to_string()));
        assert!(setup(&undone, failed).is_err());
        assert!(undone.get());
    }

    #[test]
    fn test_compose_status_reuses_storage() {
        let mut out = String::with_capacity(STATUS_CAPACITY);
        let ptr = out.as_ptr();

        compose_status(&mut out, "1 Color");
        assert_eq!(out, format!("{} | 1 Color", WINDOW_TITLE));
        compose_status(&mut out, "2 Depth | 500-4500 mm");
        assert!(out.ends_with("500-4500 mm"));
        assert_eq!(out.as_ptr(), ptr);
    }

    #[test]
    fn test_status_bar_truncates_on_char_boundary() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        StatusBar { message: "ab\u{e9}cd" }.render(area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "a");
        assert_eq!(buf[(2, 0)].symbol(), "\u{e9}");
    }
}
