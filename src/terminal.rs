//! Interactive front end: mouse drags in the terminal feed the session.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::{cursor, execute, queue, style::Print, terminal};

use bloch::canvas::{draw_sphere, Canvas};
use bloch::config::Settings;
use bloch::presets::{GatePreset, StatePreset};
use bloch::session::BlochSession;
use bloch::view::ViewPreset;

use crate::{describe_rotation, format_complex};

const STATUS_LINES: u16 = 4;
/// Rough pixel size of a terminal cell; move deltas are reported in pixels.
const CELL_WIDTH_PX: f64 = 8.0;
const CELL_HEIGHT_PX: f64 = 16.0;

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            event::EnableFocusChange,
            cursor::Hide
        )?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            event::DisableFocusChange,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Terminal size as (columns, rows).
fn viewport() -> (u16, u16) {
    match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => terminal::size().unwrap_or((80, 24)),
    }
}

struct App {
    session: BlochSession,
    canvas: Canvas,
    last_cell: Option<(u16, u16)>,
    gate: Option<GatePreset>,
    view: ViewPreset,
    message: String,
    quit: bool,
}

impl App {
    fn new(session: BlochSession, (cols, rows): (u16, u16)) -> Self {
        let mut app = App {
            session,
            canvas: Canvas::new(0, 0),
            last_cell: None,
            gate: None,
            view: ViewPreset::Default,
            message: String::new(),
            quit: false,
        };
        app.resize(cols, rows);
        app
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let height = rows.saturating_sub(STATUS_LINES).max(1);
        self.canvas = Canvas::new(cols as usize, height as usize);
        let aspect = (cols as f64 * CELL_WIDTH_PX) / (height as f64 * CELL_HEIGHT_PX);
        self.session.set_aspect(aspect);
        tracing::debug!("[terminal] viewport {cols}x{rows}, aspect {aspect:.3}");
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            Event::FocusLost => {
                self.session.cancel_drag();
                self.last_cell = None;
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let row = mouse.row.min(self.canvas.height().saturating_sub(1) as u16);
        let [x, y] = self.canvas.from_cell(mouse.column, row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.session.on_mouse_down(x, y),
            MouseEventKind::Up(MouseButton::Left) => self.session.on_mouse_up(x, y),
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                let (dx, dy) = match self.last_cell {
                    Some((col, r)) => (
                        (mouse.column as f64 - col as f64) * CELL_WIDTH_PX,
                        (row as f64 - r as f64) * CELL_HEIGHT_PX,
                    ),
                    None => (0.0, 0.0),
                };
                self.session.on_mouse_move(x, y, dx, dy);
            }
            _ => return,
        }
        self.last_cell = Some((mouse.column, row));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char('0') => self.session.set_state_preset(StatePreset::Zero),
            KeyCode::Char('1') => self.session.set_state_preset(StatePreset::One),
            KeyCode::Char('+') => self.session.set_state_preset(StatePreset::Plus),
            KeyCode::Char('-') => self.session.set_state_preset(StatePreset::Minus),
            KeyCode::Char('i') => self.session.set_state_preset(StatePreset::PlusI),
            KeyCode::Char('j') => self.session.set_state_preset(StatePreset::MinusI),
            KeyCode::Char('g') => self.next_gate(),
            KeyCode::Char('c') => {
                self.gate = None;
                self.session.clear_gate();
            }
            KeyCode::Char('a') => match self.session.apply_gate() {
                Ok(_) => self.message.clear(),
                Err(err) => self.message = err.to_string(),
            },
            KeyCode::Char('v') => {
                self.view = self.view.next();
                self.session.set_view_preset(self.view);
            }
            _ => {}
        }
    }

    fn next_gate(&mut self) {
        let next = match self.gate {
            Some(gate) => {
                let index = GatePreset::ALL
                    .iter()
                    .position(|g| *g == gate)
                    .unwrap_or(0);
                GatePreset::ALL[(index + 1) % GatePreset::ALL.len()]
            }
            None => GatePreset::ALL[0],
        };
        let result = next
            .matrix()
            .map_err(anyhow::Error::from)
            .and_then(|matrix| Ok(self.session.set_gate_matrix(matrix)?));
        match result {
            Ok(_) => {
                self.gate = Some(next);
                self.message.clear();
            }
            Err(err) => self.message = err.to_string(),
        }
    }

    fn status(&self) -> [String; STATUS_LINES as usize] {
        let state = self.session.state();
        let [alpha, beta] = state.amplitudes();
        let gate = match self.gate {
            Some(gate) => format!(
                "gate {gate}: {}",
                describe_rotation(self.session.rotation_indicator().as_ref())
            ),
            None => "gate: none".to_string(),
        };
        let hint = if !self.message.is_empty() {
            self.message.clone()
        } else if self.session.dragging_state() {
            "dragging the state vector".to_string()
        } else if self.session.handle_hovered() {
            "press to grab the state vector".to_string()
        } else if self.session.hint_visible() {
            "drag the @ to move the state; drag elsewhere to turn the sphere".to_string()
        } else {
            String::new()
        };
        [
            format!(
                "theta = {:.4}pi  phi = {:.4}pi   |psi> = ({})|0> + ({})|1>",
                state.theta() / std::f64::consts::PI,
                state.phi() / std::f64::consts::PI,
                format_complex(alpha),
                format_complex(beta)
            ),
            format!("{gate}   view: {}", self.view.label()),
            hint,
            "[0 1 + - i j] states  [g] next gate  [c] clear  [a] apply  [v] view  [q] quit"
                .to_string(),
        ]
    }

    fn draw(&mut self, out: &mut Stdout) -> io::Result<()> {
        self.canvas.clear();
        let view = self.session.view();
        let state = self.session.state().to_point();
        let indicator = self.session.rotation_indicator();
        draw_sphere(&mut self.canvas, &view, &state, indicator.as_ref());

        for (y, row) in self.canvas.rows().enumerate() {
            queue!(out, cursor::MoveTo(0, y as u16), Print(row))?;
        }
        let top = self.canvas.height() as u16;
        for (i, line) in self.status().iter().enumerate() {
            queue!(
                out,
                cursor::MoveTo(0, top + i as u16),
                terminal::Clear(terminal::ClearType::CurrentLine),
                Print(line)
            )?;
        }
        out.flush()
    }
}

pub fn run(settings: &Settings) -> Result<()> {
    let session = BlochSession::new(settings)?;
    let mut app = App::new(session, viewport());
    let tick = Duration::from_millis(settings.tick_ms.max(1));

    let _guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();
    tracing::info!("[terminal] interactive session started");

    while !app.quit {
        let deadline = Instant::now() + tick;
        while event::poll(deadline.saturating_duration_since(Instant::now()))? {
            app.handle(event::read()?);
            if app.quit {
                break;
            }
        }
        app.session.tick();
        app.draw(&mut stdout)?;
    }

    tracing::info!("[terminal] interactive session ended");
    Ok(())
}
