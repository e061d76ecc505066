mod activity_panel;
mod footer;
mod header;
mod keymap_grid;
mod popover_panel;
mod side_panel;

use ratatui::prelude::*;

use crate::tui::app::App;

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let layout = app.layout();

    header::render(frame, app, layout.header);
    side_panel::render(frame, app, layout.side);
    keymap_grid::render(frame, app, layout.grid);
    activity_panel::render(frame, app, layout.activity);
    footer::render(frame, app, layout.footer);

    // Drawn last so it floats over the grid
    popover_panel::render(frame, app);
}
