pub mod board_display;
pub mod tui;

pub use board_display::render_board;
pub use tui::{SharedService, TuiApp};
