use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::board::{BoardView, CellMarker, CellView, ColumnView};
use crate::preview::{Highlight, SumHighlight};
use crate::types::{MarkerColor, PairColor, Player};

const CELL_WIDTH: usize = 3;

pub fn player_color(player: Player) -> Color {
    match player {
        Player::One => Color::Red,
        Player::Two => Color::Blue,
    }
}

pub fn pair_color(color: PairColor) -> Color {
    match color {
        PairColor::Pair1 => Color::Rgb(255, 140, 0),
        PairColor::Pair2 => Color::Green,
    }
}

pub fn marker_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Pair1 => pair_color(PairColor::Pair1),
        MarkerColor::Pair2 => pair_color(PairColor::Pair2),
        MarkerColor::Invalid => Color::DarkGray,
    }
}

fn marker_span(marker: &CellMarker) -> Span<'static> {
    match *marker {
        CellMarker::Permanent(player) => Span::styled(
            "●",
            Style::default()
                .fg(player_color(player))
                .add_modifier(Modifier::BOLD),
        ),
        CellMarker::Runner(player) => Span::styled(
            "▲",
            Style::default()
                .fg(player_color(player))
                .add_modifier(Modifier::BOLD),
        ),
        CellMarker::Preview {
            color: MarkerColor::Invalid,
            ..
        } => Span::styled("×", Style::default().fg(Color::DarkGray)),
        CellMarker::Preview {
            color, is_solid, ..
        } => {
            let glyph = if is_solid { "◆" } else { "◇" };
            Span::styled(glyph, Style::default().fg(marker_color(color)))
        }
    }
}

fn cell_spans(cell: &CellView, show_numbers: bool) -> Vec<Span<'static>> {
    if cell.markers.is_empty() {
        let text = if show_numbers {
            format!("{:^width$}", cell.position, width = CELL_WIDTH)
        } else {
            format!("{:^width$}", "·", width = CELL_WIDTH)
        };
        return vec![Span::styled(text, Style::default().fg(Color::DarkGray))];
    }

    let mut spans: Vec<Span<'static>> = cell
        .markers
        .iter()
        .take(CELL_WIDTH)
        .map(marker_span)
        .collect();
    if spans.len() == 1 {
        spans.insert(0, Span::raw(" "));
    }
    while spans.len() < CELL_WIDTH {
        spans.push(Span::raw(" "));
    }
    spans
}

/// Column number styled by completion, highlight and runner state. A value
/// shared by both sums of the pairing is split into one half per pair color.
fn header_spans(column: &ColumnView, highlight: &Highlight) -> Vec<Span<'static>> {
    let text = format!("{:^width$}", column.column, width = CELL_WIDTH);
    if let Some(player) = column.completed_by {
        return vec![Span::styled(
            text,
            Style::default()
                .fg(player_color(player))
                .add_modifier(Modifier::REVERSED),
        )];
    }

    let mut emphasis = Modifier::empty();
    if column.highlighted {
        emphasis |= Modifier::BOLD;
    }
    if column.active {
        emphasis |= Modifier::UNDERLINED;
    }

    let colors = highlight
        .sum(column.column)
        .map_or(&[][..], |sum| sum.colors());
    match colors {
        [first, second] => {
            let (left, right) = text.split_at(text.len().div_ceil(2));
            [(*first, left), (*second, right)]
                .into_iter()
                .map(|(color, half)| {
                    Span::styled(
                        half.to_string(),
                        Style::default()
                            .fg(Color::Black)
                            .bg(pair_color(color))
                            .add_modifier(emphasis),
                    )
                })
                .collect()
        }
        _ => {
            let mut style = Style::default().add_modifier(emphasis);
            if let [color] = colors {
                style = style.fg(pair_color(*color));
            }
            if column.highlighted {
                style = style.add_modifier(Modifier::REVERSED);
            }
            vec![Span::styled(text, style)]
        }
    }
}

/// Columns side by side, bottom-aligned, with the column numbers as the last
/// line.
pub fn render_board(
    board: &BoardView,
    highlight: &Highlight,
    show_cell_numbers: bool,
) -> Vec<Line<'static>> {
    let tallest = board.tallest();
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(tallest as usize + 1);

    for row in (1..=tallest).rev() {
        let mut spans = Vec::new();
        for column in &board.columns {
            match column.cell(row) {
                Some(cell) => spans.extend(cell_spans(cell, show_cell_numbers)),
                None => spans.push(Span::raw(" ".repeat(CELL_WIDTH))),
            }
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let mut header = Vec::new();
    for column in &board.columns {
        header.extend(header_spans(column, highlight));
        header.push(Span::raw(" "));
    }
    lines.push(Line::from(header));
    lines
}
