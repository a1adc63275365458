use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Question list width; narrower on small terminals.
const SIDEBAR_WIDTH: u16 = 32;

pub struct AppLayout {
    pub titlebar: Rect,
    pub sidebar: Rect,
    pub main: Rect,
    pub statusbar: Rect,
    pub keybar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let [titlebar, middle, statusbar, keybar] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

    let sidebar_width = SIDEBAR_WIDTH.min(area.width / 3);
    let [sidebar, main] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
        .areas(middle);

    AppLayout {
        titlebar,
        sidebar,
        main,
        statusbar,
        keybar,
    }
}
