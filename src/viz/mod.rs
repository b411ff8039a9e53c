//! Terminal performance UI
//!
//! Shows the bus waveform, the zone grid with the controller position, the
//! chord keys and the sub state. Keys drive the engine through
//! [`Performer`].

mod grid;
mod input;
mod waveform;

pub use grid::ZoneGrid;
pub use input::{Flow, InputMode, Performer, SUB_KEY};
pub use waveform::Scope;

use std::io::Stdout;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::control::ModulationVector;
use crate::engine::{AnalyserTap, Engine};

/// Engine state copied out under the lock for one frame
#[derive(Debug, Clone, Default)]
pub struct EngineView {
    pub modulation: ModulationVector,
    pub sub_enabled: bool,
    pub active: usize,
    pub tails: usize,
    pub time: f64,
}

impl EngineView {
    pub fn capture(engine: &Engine) -> Self {
        Self {
            modulation: engine.modulation(),
            sub_enabled: engine.sub_enabled(),
            active: engine.active_count(),
            tails: engine.tail_count(),
            time: engine.current_time(),
        }
    }
}

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the UI until the user quits
pub fn run_tui(
    engine: Arc<Mutex<Engine>>,
    tap: AnalyserTap,
    mut performer: Performer,
) -> Result<()> {
    let rate_hz = lock(&engine)?.config().controller.rate_hz.max(1);
    let frame = Duration::from_secs_f64(1.0 / f64::from(rate_hz));

    let mut terminal = setup_terminal(performer.mode())?;
    let result = event_loop(&mut terminal, &engine, &tap, &mut performer, frame);

    restore_terminal(&mut terminal, performer.mode())?;
    release_held(&engine, &mut performer);
    result
}

/// Key release events are only reported with the enhancement protocol
pub fn detect_input_mode() -> InputMode {
    match supports_keyboard_enhancement() {
        Ok(true) => InputMode::Held,
        _ => InputMode::Latched,
    }
}

fn setup_terminal(mode: InputMode) -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mode == InputMode::Held {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term, mode: InputMode) -> Result<()> {
    if mode == InputMode::Held {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn event_loop(
    terminal: &mut Term,
    engine: &Mutex<Engine>,
    tap: &AnalyserTap,
    performer: &mut Performer,
    frame: Duration,
) -> Result<()> {
    let mut next_tick = Instant::now();
    loop {
        let view = {
            let mut engine = lock(engine)?;
            performer.tick(&mut engine);
            EngineView::capture(&engine)
        };
        let samples = tap.snapshot();
        terminal.draw(|f| draw_ui(f, &samples, &view, performer))?;

        next_tick += frame;
        // Drain input until the next controller frame is due.
        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            if !event::poll(wait)? {
                break;
            }
            if let Event::Key(key) = event::read()? {
                if performer.handle(key, &mut *lock(engine)?) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

/// Release whatever still sounds; a poisoned lock has nothing left to release
fn release_held(engine: &Mutex<Engine>, performer: &mut Performer) {
    if let Ok(mut engine) = engine.lock() {
        performer.release_all(&mut engine);
    }
}

fn lock(engine: &Mutex<Engine>) -> Result<MutexGuard<'_, Engine>> {
    engine.lock().map_err(|_| anyhow!("engine lock poisoned"))
}

fn draw_ui(f: &mut Frame, samples: &[f32], view: &EngineView, performer: &Performer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),     // Waveform
            Constraint::Length(11), // Grid + chords
            Constraint::Length(3),  // Status
        ])
        .split(f.area());

    let scope = Scope::new(samples)
        .gain(2.0)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Output "));
    f.render_widget(scope, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(20)])
        .split(rows[1]);

    let grid = ZoneGrid::new(view.modulation).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.modulation)),
    );
    f.render_widget(grid, middle[0]);
    draw_chords(f, middle[1], performer);
    draw_status(f, rows[2], view, performer);
}

fn draw_chords(f: &mut Frame, area: Rect, performer: &Performer) {
    let lines: Vec<Line> = performer
        .bindings()
        .iter()
        .map(|b| {
            let style = if performer.is_sounding(b.key) {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} ", b.key.to_ascii_uppercase()),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {:<5}", b.degree), Style::default().fg(Color::DarkGray)),
                Span::styled(b.name.clone(), style),
            ])
        })
        .collect();

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Chords "));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, area: Rect, view: &EngineView, performer: &Performer) {
    let (sub, sub_color) = if view.sub_enabled {
        ("SUB ON", Color::Green)
    } else {
        ("SUB OFF", Color::DarkGray)
    };
    let mode = match performer.mode() {
        InputMode::Held => "hold keys",
        InputMode::Latched => "keys latch",
    };

    let text = Line::from(vec![
        Span::raw("  "),
        Span::styled(sub, Style::default().fg(sub_color)),
        Span::raw(format!(
            "  |  voices: {} (+{} fading)  |  {:.1}s  |  {}  |  WASD: steer  B: sub  Esc: quit",
            view.active, view.tails, view.time, mode
        )),
    ]);

    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
