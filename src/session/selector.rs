use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::session::transcript::TranscriptSummary;
use crate::utils::KitError;

/// Outcome of the resume menu: continue a saved conversation or start a
/// fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Resume(String),
    StartNew,
}

/// Presents saved transcript summaries and returns the user's choice.
/// The engine only consults the menu when resume was requested and at
/// least one saved transcript exists.
pub trait InteractiveMenu {
    fn select(&self, summaries: &[TranscriptSummary]) -> Result<MenuChoice, KitError>;
}

/// Full-screen terminal selector.
pub struct TerminalMenu;

impl InteractiveMenu for TerminalMenu {
    fn select(&self, summaries: &[TranscriptSummary]) -> Result<MenuChoice, KitError> {
        if summaries.is_empty() {
            return Ok(MenuChoice::StartNew);
        }

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let mut selected = 0usize;
        let result = run_menu(&mut terminal, summaries, &mut selected);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

fn run_menu(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    summaries: &[TranscriptSummary],
    selected: &mut usize,
) -> Result<MenuChoice, KitError> {
    loop {
        terminal.draw(|f| render_menu(f, summaries, *selected))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('n') => {
                    return Ok(MenuChoice::StartNew);
                }
                KeyCode::Enter => {
                    return Ok(MenuChoice::Resume(summaries[*selected].id.clone()));
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *selected < summaries.len() - 1 {
                        *selected += 1;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    *selected = selected.saturating_sub(1);
                }
                KeyCode::Home => *selected = 0,
                KeyCode::End => *selected = summaries.len() - 1,
                _ => {}
            }
        }
    }
}

fn render_menu(f: &mut Frame, summaries: &[TranscriptSummary], selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Select a conversation to resume")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" kit - Resume Chat "));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let style = if i == selected {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let content = vec![
                Line::from(Span::styled(summary.preview.clone(), style)),
                Line::from(Span::styled(
                    format!(
                        "  {} | {} messages",
                        summary.created_at.format("%Y-%m-%d %H:%M"),
                        summary.turn_count
                    ),
                    style.fg(Color::Gray),
                )),
            ];
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Saved Conversations "),
    );
    f.render_widget(list, chunks[1]);

    let help = Line::from(vec![
        Span::raw("Up/k: Up  Down/j: Down  "),
        Span::styled("Enter", Style::default().fg(Color::Green)),
        Span::raw(": Resume  "),
        Span::styled("n", Style::default().fg(Color::Yellow)),
        Span::raw(": New chat  "),
        Span::styled("q/Esc", Style::default().fg(Color::Red)),
        Span::raw(": Cancel"),
    ]);
    let help_widget = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[2]);
}
