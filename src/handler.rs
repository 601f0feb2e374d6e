use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use equityeye_core::state::PhaseKind;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_tasks().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.controller.phase().kind() {
        PhaseKind::Idle => handle_idle_key(app, key),
        PhaseKind::Analyzing => handle_analyzing_key(app, key),
        PhaseKind::Results => handle_results_key(app, key),
        PhaseKind::Error => handle_error_key(app, key),
    }
}

fn handle_idle_key(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('e') | KeyCode::Char('i') => {
                app.status = None;
                app.input_mode = InputMode::Editing;
            }
            KeyCode::Enter => app.submit_document(),
            _ => {}
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                app.input_mode = InputMode::Normal;
                app.submit_document();
            }
            KeyCode::Backspace => {
                app.path_input.pop();
            }
            KeyCode::Char(c) => {
                app.path_input.push(c);
            }
            _ => {}
        },
    }
}

fn handle_analyzing_key(app: &mut App, key: KeyEvent) {
    // No cancellation once the audit is running; only quitting remains.
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('r') => app.reset(),
            KeyCode::Char('e') | KeyCode::Char('i') => {
                app.input_mode = InputMode::Editing;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                app.report_scroll = app.report_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.report_scroll = app.report_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => app.report_scroll = 0,
            _ => {}
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            KeyCode::Enter => app.submit_chat_message(),
            KeyCode::Backspace => {
                app.chat_input.pop();
            }
            KeyCode::Char(c) => {
                app.chat_input.push(c);
            }
            _ => {}
        },
    }
}

fn handle_error_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('r') | KeyCode::Enter => app.reset(),
        _ => {}
    }
}
