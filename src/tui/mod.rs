//! TUI form over the augmentation service.
//!
//! One screen mirroring the service's HTML forms: a channel field, the
//! three prefix fields, and named submit controls. Failure text from
//! the service is shown in a modal that blocks input until dismissed.
//! Controls are never disabled while a dispatch is in flight; actions
//! may overlap and race, and the refresh of whichever finishes first
//! resets the form.

mod state;

use crate::cli::{build_config, Cli};
use crate::engine::ActionEngine;
use crate::model::{route_submit, Action, ActionEvent, SubmitRoute};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};
use state::{apply_event, Focus, UiState};
use std::io;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub async fn run(args: Cli) -> Result<()> {
    let engine = ActionEngine::new(build_config(&args))?;

    // Restore the terminal even if a draw panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, engine).await;

    restore_terminal()?;
    res
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: ActionEngine,
) -> Result<()> {
    let mut state = UiState::default();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<ActionEvent>();
    let mut dispatches: JoinSet<()> = JoinSet::new();
    let mut input = EventStream::new();

    loop {
        state.in_flight = dispatches.len();
        terminal.draw(|f| draw(f.area(), f, &state))?;

        tokio::select! {
            maybe_ev = input.next() => {
                match maybe_ev {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(key, &mut state, &engine, &evt_tx, &mut dispatches) {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(ev) = evt_rx.recv() => {
                apply_event(&mut state, ev);
            }
            Some(res) = dispatches.join_next(), if !dispatches.is_empty() => {
                if let Err(e) = res {
                    tracing::warn!("dispatch task join failed: {e}");
                }
            }
        }
    }
    Ok(())
}

fn spawn_dispatch(
    engine: &ActionEngine,
    evt_tx: &mpsc::UnboundedSender<ActionEvent>,
    dispatches: &mut JoinSet<()>,
    action: Action,
) {
    let engine = engine.clone();
    let tx = evt_tx.clone();
    dispatches.spawn(async move {
        if let Err(e) = engine.run(action, &tx).await {
            // Transport failures surface only in the log, like an
            // uncaught rejection in the original page: no alert, no
            // refresh.
            tracing::warn!("dispatch failed: {e:#}");
        }
    });
}

/// Handle one key press. Returns true to quit.
fn handle_key(
    key: KeyEvent,
    state: &mut UiState,
    engine: &ActionEngine,
    evt_tx: &mpsc::UnboundedSender<ActionEvent>,
    dispatches: &mut JoinSet<()>,
) -> bool {
    // A raised alert is modal, like `alert()`.
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            state.alert = None;
        }
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('g') => {
                spawn_dispatch(
                    engine,
                    evt_tx,
                    dispatches,
                    Action::QuickAugment {
                        channel: state.channel.clone(),
                    },
                );
                return false;
            }
            KeyCode::Char('r') => {
                spawn_dispatch(
                    engine,
                    evt_tx,
                    dispatches,
                    Action::Remove {
                        channel: state.channel.clone(),
                    },
                );
                return false;
            }
            _ => return false,
        }
    }

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::Down => state.focus = state.focus.next(),
        KeyCode::BackTab | KeyCode::Up => state.focus = state.focus.prev(),
        KeyCode::Enter => {
            if state.focus.is_field() {
                state.focus = state.focus.next();
            } else if let Some(action) = submit(state) {
                spawn_dispatch(engine, evt_tx, dispatches, action);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = state.field_mut() {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = state.field_mut() {
                field.push(c);
            }
        }
        _ => {}
    }
    false
}

/// Build the action for the focused submit control. The augment form
/// submits directly; the combined update form routes by control name,
/// and an unknown name is a silent no-op.
fn submit(state: &UiState) -> Option<Action> {
    let name = state.focus.control_name()?;
    if name == "augment" {
        return Some(Action::Augment {
            channel: state.channel.clone(),
            prefix: state.prefix_set(),
        });
    }
    match route_submit(name)? {
        SubmitRoute::Update => Some(Action::ChangePrefix {
            channel: state.channel.clone(),
            prefix: state.prefix_set(),
        }),
        SubmitRoute::Abridge => Some(Action::Abridge {
            channel: state.channel.clone(),
        }),
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(6), // form
            Constraint::Length(3), // buttons
            Constraint::Length(1), // status
            Constraint::Min(3),    // log
            Constraint::Length(1), // help
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "augment-cli",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  channel-tree augmentation"),
    ]));
    f.render_widget(title, rows[0]);

    let form = Paragraph::new(vec![
        field_line("Channel", &state.channel, state.focus == Focus::Channel),
        field_line("First prefix", &state.first, state.focus == Focus::First),
        field_line("Middle prefix", &state.middle, state.focus == Focus::Middle),
        field_line("Last prefix", &state.last, state.focus == Focus::Last),
    ])
    .block(Block::default().borders(Borders::ALL).title("Augmentation"));
    f.render_widget(form, rows[1]);

    let buttons = Paragraph::new(Line::from(vec![
        button("Augment", state.focus == Focus::Augment),
        Span::raw("  "),
        button("Update", state.focus == Focus::Update),
        Span::raw("  "),
        button("Abridge", state.focus == Focus::Abridge),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(buttons, rows[2]);

    let status = if state.in_flight > 0 {
        format!(
            "{}  [{} in flight, {} refreshes]",
            state.status, state.in_flight, state.refreshes
        )
    } else {
        state.status.clone()
    };
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Gray)),
        rows[3],
    );

    let log_height = rows[4].height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(log_height);
    let log_lines: Vec<Line> = state.log[start..]
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    let log = Paragraph::new(log_lines)
        .block(Block::default().borders(Borders::ALL).title("Activity"));
    f.render_widget(log, rows[4]);

    let help = Paragraph::new(
        "Tab move · Enter submit · Ctrl-G quick augment · Ctrl-R remove · Esc quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, rows[5]);

    if let Some(text) = &state.alert {
        draw_alert(area, f, text);
    }
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(format!("{label:>13}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn button(label: &str, focused: bool) -> Span<'_> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(format!("[ {label} ]"), style)
}

/// Centered modal with the service's failure text, verbatim.
fn draw_alert(area: Rect, f: &mut ratatui::Frame, text: &str) {
    let width = (text.chars().count() as u16 + 6)
        .clamp(24, area.width.saturating_sub(4).max(24));
    let height = 5u16.min(area.height);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width: width.min(area.width),
        height,
    };
    f.render_widget(Clear, rect);
    let body = Paragraph::new(vec![
        Line::from(text.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Alert")
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(body, rect);
}
