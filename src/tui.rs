use std::io;
use std::sync::mpsc;
use std::time::Duration;

use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use ficous_quiz::model::ItemKind;
use ficous_quiz::timer::{Ticker, TimerEvent};

use crate::editor;
use crate::state::*;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub fn run_tui(mut state: AppState, runtime: &Runtime) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Cannot enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| format!("Cannot enter alternate screen: {}", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("Cannot create terminal: {}", e))?;

    let result = main_loop(&mut terminal, &mut state, runtime);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();

    result
}

fn load(terminal: &mut Term, state: &mut AppState, runtime: &Runtime) -> Result<(), String> {
    // Show the loading screen while the request is in flight.
    state.controller.begin_load();
    terminal
        .draw(|f| crate::ui::draw(f, state))
        .map_err(|e| format!("Draw error: {}", e))?;

    if runtime.block_on(state.controller.load()).is_ok() {
        state.sync_current_item();
    }
    Ok(())
}

fn main_loop(terminal: &mut Term, state: &mut AppState, runtime: &Runtime) -> Result<(), String> {
    let (timer_tx, timer_rx) = mpsc::channel::<TimerEvent>();
    let mut ticker: Option<Ticker> = None;

    load(terminal, state, runtime)?;

    loop {
        terminal
            .draw(|f| crate::ui::draw(f, state))
            .map_err(|e| format!("Draw error: {}", e))?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("Poll error: {}", e))? {
            match event::read().map_err(|e| format!("Read error: {}", e))? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if state.screen() == Screen::LoadFailed
                        && key.code == KeyCode::Char('r')
                        && !state.has_dialog()
                    {
                        load(terminal, state, runtime)?;
                    } else {
                        handle_key(key, state, terminal)?;
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size().unwrap_or_default();
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse(mouse, state, area);
                }
                _ => {}
            }
        }

        // Ticks only flow while the session runs.
        let change = sync_ticker(state.is_running(), &mut ticker, || {
            Ticker::every_second(timer_tx.clone())
        });
        if let Some(change) = change {
            debug!(?change, "ticker");
        }

        while let Ok(TimerEvent::Tick) = timer_rx.try_recv() {
            state.on_tick();
        }

        if let Some(e) = state.controller.poll_grades() {
            warn!(error = %e, "grade error shown");
        }
    }

    Ok(())
}

fn handle_key(key: KeyEvent, state: &mut AppState, terminal: &mut Term) -> Result<(), String> {
    if state.has_dialog() {
        handle_dialog_key(key, state);
        return Ok(());
    }

    match state.screen() {
        Screen::Loading => {}
        Screen::LoadFailed => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => state.should_quit = true,
            _ => {}
        },
        Screen::Working => handle_working_key(key, state, terminal)?,
        Screen::Results => handle_results_key(key, state),
    }
    Ok(())
}

fn handle_results_key(key: KeyEvent, state: &mut AppState) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('r') if ctrl => state.reset(),
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => state.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => {
            state.results_scroll = state.results_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.results_scroll = state.results_scroll.saturating_add(1);
        }
        KeyCode::PageUp => state.results_scroll = state.results_scroll.saturating_sub(10),
        KeyCode::PageDown => state.results_scroll = state.results_scroll.saturating_add(10),
        _ => {}
    }
}

fn handle_working_key(
    key: KeyEvent,
    state: &mut AppState,
    terminal: &mut Term,
) -> Result<(), String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings
    if ctrl {
        match key.code {
            KeyCode::Char('q') => state.push_dialog(Dialog::ConfirmQuit),
            KeyCode::Char('p') => state.toggle_running(),
            KeyCode::Char('s') => state.request_finish(),
            KeyCode::Char('r') => state.push_dialog(Dialog::ConfirmReset),
            KeyCode::Char('e') => edit_in_editor(state, terminal),
            KeyCode::Left | KeyCode::Up => state.navigate_prev(),
            KeyCode::Right | KeyCode::Down => state.advance(),
            _ => {}
        }
        return Ok(());
    }

    if key.code == KeyCode::F(1) {
        state.push_dialog(Dialog::Help);
        return Ok(());
    }

    match state.input_mode {
        InputMode::TextInput => handle_text_input_key(key, state),
        InputMode::ChoiceSelect => handle_choice_key(key, state),
        InputMode::Navigation => handle_nav_key(key, state),
    }
    Ok(())
}

fn edit_in_editor(state: &mut AppState, terminal: &mut Term) {
    if state.current_item().map(|item| item.kind) != Some(ItemKind::Open) {
        return;
    }
    let current_text = state.text_input.clone();

    // Suspend terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();

    let edited = editor::open_editor(&current_text);

    // Restore terminal
    execute!(terminal.backend_mut(), EnterAlternateScreen, EnableMouseCapture).ok();
    enable_raw_mode().ok();
    terminal.clear().ok();

    match edited {
        Ok(text) => state.replace_text(text),
        Err(e) => {
            warn!(error = %e, "editor failed");
            state.status_message = Some(e);
        }
    }
}

fn handle_text_input_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char(c) => state.insert_char(c),
        KeyCode::Enter => state.insert_char('\n'),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Delete => state.delete_char(),
        KeyCode::Left => state.cursor_left(),
        KeyCode::Right => state.cursor_right(),
        KeyCode::Home => state.cursor_home(),
        KeyCode::End => state.cursor_end(),
        KeyCode::Up => state.navigate_prev(),
        KeyCode::Down => state.advance(),
        KeyCode::Esc => state.input_mode = InputMode::Navigation,
        _ => {}
    }
}

fn handle_choice_key(key: KeyEvent, state: &mut AppState) {
    let count = state.current_item().map_or(0, |item| item.choice_count());
    match key.code {
        KeyCode::Left => state.navigate_prev(),
        KeyCode::Right => state.advance(),
        KeyCode::Up => state.choice_cursor = state.choice_cursor.saturating_sub(1),
        KeyCode::Down => {
            if state.choice_cursor + 1 < count {
                state.choice_cursor += 1;
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => state.select_choice(state.choice_cursor),
        KeyCode::Char('?') => state.push_dialog(Dialog::Help),
        KeyCode::Char(c) if c.is_ascii_lowercase() => {
            state.select_choice((c as u8 - b'a') as usize);
        }
        _ => handle_page_keys(key, state),
    }
}

fn handle_nav_key(key: KeyEvent, state: &mut AppState) {
    let is_open = state.current_item().map(|item| item.kind) == Some(ItemKind::Open);
    if is_open {
        match key.code {
            KeyCode::Enter => {
                state.input_mode = InputMode::TextInput;
                return;
            }
            KeyCode::Char(c) if c != '?' => {
                state.input_mode = InputMode::TextInput;
                state.insert_char(c);
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Up | KeyCode::Left => state.navigate_prev(),
        KeyCode::Down | KeyCode::Right => state.advance(),
        KeyCode::Char('?') => state.push_dialog(Dialog::Help),
        _ => handle_page_keys(key, state),
    }
}

fn handle_page_keys(key: KeyEvent, state: &mut AppState) {
    let total = state.session().map_or(0, |s| s.items().len());
    let current = state.session().map_or(0, |s| s.current_index());
    match key.code {
        KeyCode::PageUp => state.navigate_to(current.saturating_sub(5)),
        KeyCode::PageDown => state.navigate_to(current + 5),
        KeyCode::Home => state.navigate_to(0),
        KeyCode::End => state.navigate_to(total.saturating_sub(1)),
        _ => {}
    }
}

fn handle_dialog_key(key: KeyEvent, state: &mut AppState) {
    let dialog = state.top_dialog().cloned();
    match dialog {
        Some(Dialog::ConfirmFinish) => match key.code {
            KeyCode::Enter => {
                state.pop_dialog();
                state.finish();
            }
            KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmReset) => match key.code {
            KeyCode::Enter => {
                state.pop_dialog();
                state.reset();
            }
            KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmQuit) => match key.code {
            KeyCode::Enter => {
                state.pop_dialog();
                state.should_quit = true;
            }
            KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::TimeWarning) => match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::Help) => match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => {
                state.pop_dialog();
            }
            _ => {}
        },
        None => {}
    }
}

fn handle_mouse(mouse: MouseEvent, state: &mut AppState, size: Rect) {
    if state.has_dialog() {
        return;
    }

    match state.screen() {
        Screen::Working => {}
        Screen::Results => {
            match mouse.kind {
                MouseEventKind::ScrollUp => {
                    state.results_scroll = state.results_scroll.saturating_sub(3)
                }
                MouseEventKind::ScrollDown => {
                    state.results_scroll = state.results_scroll.saturating_add(3)
                }
                _ => {}
            }
            return;
        }
        _ => return,
    }

    let layout = crate::ui::layout::compute_layout(size);
    let (x, y) = (mouse.column, mouse.row);
    let in_sidebar = x >= layout.sidebar.x
        && x < layout.sidebar.x + layout.sidebar.width
        && y > layout.sidebar.y
        && y < layout.sidebar.y + layout.sidebar.height.saturating_sub(1);
    let in_main = x >= layout.main.x
        && x < layout.main.x + layout.main.width
        && y >= layout.main.y
        && y < layout.main.y + layout.main.height;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if in_sidebar => {
            let visible = layout.sidebar.height.saturating_sub(2) as usize;
            let current = state.session().map_or(0, |s| s.current_index());
            let offset = crate::ui::sidebar::scroll_offset(current, visible);
            let row = (y - layout.sidebar.y - 1) as usize;
            let total = state.session().map_or(0, |s| s.items().len());
            if offset + row < total {
                state.navigate_to(offset + row);
            }
        }
        MouseEventKind::ScrollUp if in_sidebar => state.navigate_prev(),
        MouseEventKind::ScrollDown if in_sidebar => {
            state.navigate_next();
        }
        MouseEventKind::ScrollUp if in_main => {
            state.question_scroll = state.question_scroll.saturating_sub(1);
        }
        MouseEventKind::ScrollDown if in_main => {
            state.question_scroll = state.question_scroll.saturating_add(1);
        }
        _ => {}
    }
}
