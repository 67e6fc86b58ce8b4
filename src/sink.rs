//! Terminal rendering of the phase display.

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use kztracker_core::{DisplaySink, PhaseDisplay, PhaseRow};
use kztracker_types::{ColorToken, OverlaySettings};

const RESET: &str = "\x1b[0m";
const ROW_SEPARATOR: &str = "  |  ";

/// Prints one line per display change.
///
/// The clock is polled every 50ms; repeated identical displays are dropped
/// so the terminal only scrolls when a countdown ticks or the phase moves.
/// A hidden overlay prints nothing.
pub struct TerminalSink<W: Write + Send = Stdout> {
    out: Mutex<Output<W>>,
    color: bool,
    visible: bool,
}

struct Output<W> {
    writer: W,
    last: Option<String>,
}

impl TerminalSink<Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::with_writer(io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn with_writer(writer: W, color: bool) -> Self {
        Self {
            out: Mutex::new(Output { writer, last: None }),
            color,
            visible: true,
        }
    }

    /// Apply the saved overlay settings.
    pub fn with_overlay(mut self, overlay: &OverlaySettings) -> Self {
        self.visible = overlay.visible;
        self
    }

    pub fn into_writer(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .writer
    }
}

impl<W: Write + Send> DisplaySink for TerminalSink<W> {
    fn show(&self, display: &PhaseDisplay) {
        if !self.visible {
            return;
        }
        let plain = render(display, false);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if out.last.as_deref() == Some(plain.as_str()) {
            return;
        }

        let text = if self.color {
            render(display, true)
        } else {
            plain.clone()
        };
        let stamp = Local::now().format("%H:%M:%S");
        if let Err(e) = writeln!(out.writer, "[{stamp}] {text}").and_then(|_| out.writer.flush()) {
            tracing::debug!(error = %e, "Failed to write display");
        }
        out.last = Some(plain);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// One-line rendering of both rows and the cycle timer.
pub fn render(display: &PhaseDisplay, color: bool) -> String {
    let mut parts: Vec<String> = [&display.row1, &display.row2]
        .into_iter()
        .filter(|row| !row.is_empty())
        .map(|row| render_row(row, color))
        .collect();

    if !display.cycle_timer_text.is_empty() {
        parts.push(paint(&display.cycle_timer_text, ColorToken::Default, color));
    }

    parts.join(ROW_SEPARATOR)
}

fn render_row(row: &PhaseRow, color: bool) -> String {
    let mut text = paint(&row.message, row.color, color);
    if !row.actor_name.is_empty() {
        text.push_str(&paint(&row.actor_name, ColorToken::Player, color));
    }
    if !row.timer_text.is_empty() {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&paint(&row.timer_text, row.color, color));
    }
    text
}

/// Commented palette listing for the config dump.
pub fn palette_comment() -> String {
    ColorToken::ALL
        .iter()
        .map(|token| format!("# {token:?} = {}\n", token.hex()))
        .collect()
}

fn paint(text: &str, token: ColorToken, color: bool) -> String {
    if !color || text.is_empty() {
        return text.to_string();
    }
    let [r, g, b, _] = token.rgba();
    format!("\x1b[38;2;{r};{g};{b}m{text}{RESET}")
}
