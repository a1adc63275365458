pub mod dialog;
pub mod keybar;
pub mod layout;
pub mod loading;
pub mod markdown;
pub mod question;
pub mod result;
pub mod sidebar;
pub mod statusbar;
pub mod titlebar;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::state::{AppState, Screen};

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    match state.screen() {
        Screen::Loading => loading::draw_loading(f, area, state),
        Screen::LoadFailed => loading::draw_load_failed(f, area, state),
        Screen::Working => draw_working(f, area, state),
        Screen::Results => result::draw_results(f, area, state),
    }

    // Draw dialog overlay if any
    if state.has_dialog() {
        dialog::draw_dialog(f, area, state);
    }
}

fn draw_working(f: &mut Frame, area: Rect, state: &AppState) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, state);
    sidebar::draw_sidebar(f, layout.sidebar, state);
    question::draw_question(f, layout.main, state);
    statusbar::draw_statusbar(f, layout.statusbar, state);
    keybar::draw_keybar(f, layout.keybar, state);
}
