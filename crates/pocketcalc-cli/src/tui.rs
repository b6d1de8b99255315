//! Full-screen keypad on ratatui and crossterm.
//!
//! Physical keys are translated to calculator keys; each translated key is
//! pressed once and the screen is redrawn from the latest rendered frame.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use pocketcalc_core::{format, Calculator, DisplaySink, EngineOptions, KeyEvent, Session};

/// Keypad legend, one row per line.
const LEGEND: &[&str] = &[
    " 7  8  9  /   sqrt:r",
    " 4  5  6  *   neg :n",
    " 1  2  3  -   M+  :m",
    " 0  .  %  +   M-  :M",
    " =/Enter      MRC :R",
    " CE:Bksp  AC:Esc  quit:q",
];

/// What a physical key asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press(KeyEvent),
    Quit,
}

/// Translate a terminal key to an action. Unmapped keys give `None`.
pub fn map_key(key: event::KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    let calc_key = match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Esc => KeyEvent::ClearAll,
        KeyCode::Backspace | KeyCode::Delete => KeyEvent::ClearEntry,
        KeyCode::Enter => KeyEvent::Equals,
        KeyCode::Char('r') => KeyEvent::SquareRoot,
        KeyCode::Char('n') => KeyEvent::Negate,
        KeyCode::Char('m') => KeyEvent::MemoryAdd,
        KeyCode::Char('M') => KeyEvent::MemorySubtract,
        KeyCode::Char('R') => KeyEvent::MemoryRecallOrClear,
        KeyCode::Char(c) => KeyEvent::from_char(c)?,
        _ => return None,
    };
    Some(Action::Press(calc_key))
}

/// Holds the latest frame until the next redraw.
#[derive(Debug, Default)]
pub struct Screen {
    text: String,
}

impl DisplaySink for Screen {
    fn render(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}

pub struct App {
    session: Session<Screen>,
    show_memory: bool,
    last_key: Option<KeyEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(options: EngineOptions, show_memory: bool) -> Self {
        let mut session = Session::new(Calculator::with_options(options), Screen::default());
        session.render_current();
        Self {
            session,
            show_memory,
            last_key: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: event::KeyEvent) {
        match map_key(key) {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::Press(k)) => {
                self.session.press(k);
                self.last_key = Some(k);
            }
            None => {}
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn render(&self, frame: &mut Frame) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(" pocketcalc ");
        let area = centered(frame.area(), 30, 12);
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let display = Paragraph::new(Line::from(Span::styled(
            self.session.display().text.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(display, rows[0]);

        let status = Paragraph::new(Line::from(self.status_line()))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, rows[1]);

        let legend: Vec<Line> = LEGEND.iter().map(|l| Line::from(*l)).collect();
        frame.render_widget(Paragraph::new(legend), rows[2]);
    }

    fn status_line(&self) -> String {
        let snap = self.session.calculator().snapshot();
        let mut parts = Vec::new();
        if self.show_memory && snap.memory != 0.0 {
            parts.push(format!("M={}", format::format_number(snap.memory)));
        }
        if let (Some(first), Some(op)) = (snap.first_operand, snap.operator) {
            parts.push(format!("{} {op}", format::format_number(first)));
        }
        if let Some(key) = self.last_key {
            parts.push(format!("[{key}]"));
        }
        parts.join("  ")
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the keypad until the user quits.
pub fn run_tui(options: EngineOptions, show_memory: bool) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, App::new(options, show_memory));
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}
