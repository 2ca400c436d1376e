//! TUI event loop.
//!
//! Design: timer-driven redraw. Every refresh tick the loop takes a fresh
//! snapshot and draws it; nothing from one tick is kept for the next. The
//! producer never wakes the loop, and the loop never blocks the producer.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use movequest_core::{Snapshot, TelemetryBuffer};

/// Where the chart's data comes from.
pub enum Feed {
    /// The receiver's live buffer, re-read every tick.
    Live(Arc<TelemetryBuffer>),
    /// A fixed snapshot, e.g. loaded from a CSV log.
    Static(Snapshot),
}

impl Feed {
    pub fn snapshot(&self) -> Snapshot {
        match self {
            Self::Live(buffer) => buffer.snapshot(),
            Self::Static(snap) => snap.clone(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Key input poll granularity; bounds how quickly `q` is noticed.
const INPUT_POLL: Duration = Duration::from_millis(50);

pub struct App {
    feed: Feed,
    /// Optional per-axis rows, one per sample of a static feed.
    axes: Vec<[f64; 3]>,
    header: String,
    refresh_rate: Duration,
    running: bool,
}

impl App {
    pub fn new(feed: Feed, header: String, refresh_rate: Duration) -> Self {
        Self {
            feed,
            axes: Vec::new(),
            header,
            refresh_rate,
            running: true,
        }
    }

    /// Also chart X/Y/Z acceleration.
    pub fn with_axes(mut self, axes: Vec<[f64; 3]>) -> Self {
        self.axes = axes;
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let mut last_draw: Option<Instant> = None;

        while self.running {
            if last_draw.is_none_or(|t| t.elapsed() >= self.refresh_rate) {
                let snap = self.feed.snapshot();
                let live = self.feed.is_live();
                terminal.draw(|f| super::ui::draw(f, &self.header, live, &snap, &self.axes))?;
                last_draw = Some(Instant::now());
            }

            if event::poll(INPUT_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Resize(..) => last_draw = None,
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            // Raw mode swallows SIGINT, so Ctrl+C arrives as a key.
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false
            }
            _ => {}
        }
    }
}
