use std::io::{self, Stdout, stdout};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use itertools::Itertools;
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tracing::{debug, info};

use crate::api::GameService;
use crate::board::PlayerSummary;
use crate::cli::board_display::{pair_color, player_color, render_board};
use crate::game::snapshot::COLUMNS_TO_WIN;
use crate::preview::{MovePreview, PairingOption};
use crate::session::{Applied, Completion, PendingRequest, Session};
use crate::types::{PairColor, Player};

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

pub type SharedService = Arc<dyn GameService + Send + Sync>;

pub struct TuiApp {
    session: Session,
    service: SharedService,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    show_help: bool,
    show_cell_numbers: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(service: SharedService, show_cell_numbers: bool) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            session: Session::new(),
            service,
            sender,
            receiver,
            show_help: false,
            show_cell_numbers,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run(&mut self) -> io::Result<()> {
        info!(session = %self.session.id(), "starting terminal client");
        let request = self.session.new_game();
        self.dispatch(request);

        enable_raw_mode()?;
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = loop {
            if self.should_quit {
                break Ok(());
            }

            self.drain_completions();

            if let Err(err) = terminal.draw(|f| self.render(f)) {
                break Err(err);
            }

            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key)
                    }
                    Ok(_) => {}
                    Err(err) => break Err(err),
                },
                Ok(false) => {}
                Err(err) => break Err(err),
            }
        };

        // Always cleanup terminal state
        let _ = terminal.clear();
        let _ = disable_raw_mode();
        let _ = terminal.show_cursor();

        result
    }

    /// Runs the request on a worker thread; the answer comes back through
    /// the channel and is applied on the UI thread.
    fn dispatch(&self, request: PendingRequest) {
        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let completion = request.execute(service.as_ref());
            // the receiver only goes away when the client is shutting down
            let _ = sender.send(completion);
        });
    }

    fn dispatch_opt(&self, request: Option<PendingRequest>) {
        if let Some(request) = request {
            self.dispatch(request);
        }
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.receiver.try_recv() {
            let tag = completion.tag;
            if self.session.apply(completion) == Applied::Stale {
                debug!(?tag, "ignored stale completion");
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Char('#') => self.show_cell_numbers = !self.show_cell_numbers,
            KeyCode::Char('n') => {
                let request = self.session.new_game();
                self.dispatch(request);
            }
            KeyCode::Char('r') => {
                let request = self.session.roll();
                self.dispatch_opt(request);
            }
            KeyCode::Char('s') => {
                let request = self.session.stop();
                self.dispatch_opt(request);
            }
            KeyCode::Char('c') => {
                let request = self.session.continue_after_bust();
                self.dispatch_opt(request);
            }
            KeyCode::Up => self.move_hover(-1),
            KeyCode::Down => self.move_hover(1),
            KeyCode::Left => self.session.hover_sum_slot(PairColor::Pair1),
            KeyCode::Right => self.session.hover_sum_slot(PairColor::Pair2),
            KeyCode::Enter => {
                let request = self.session.activate();
                self.dispatch_opt(request);
            }
            KeyCode::Esc => self.session.cancel(),
            _ => {}
        }
    }

    fn move_hover(&mut self, delta: isize) {
        let count = self
            .session
            .snapshot()
            .map(|snapshot| snapshot.available_pairings.len())
            .unwrap_or(0);
        if count == 0 {
            return;
        }
        let next = match self.session.interaction().hovered_pairing {
            Some(current) => (current as isize + delta).rem_euclid(count as isize) as usize,
            None if delta < 0 => count - 1,
            None => 0,
        };
        self.session.hover_pairing(Some(next));
    }

    pub fn render(&self, f: &mut Frame<'_>) {
        let area = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(18),   // Main content
                Constraint::Length(3), // Help/status bar
            ])
            .split(area);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55), // Board
                Constraint::Percentage(45), // Players, dice and pairings
            ])
            .split(chunks[0]);

        let preview = self.session.preview();

        self.render_board(f, main_chunks[0], preview.as_ref());
        self.render_right_panel(f, main_chunks[1], preview.as_ref());
        self.render_status_bar(f, chunks[1]);
    }

    fn render_board(&self, f: &mut Frame<'_>, area: Rect, preview: Option<&MovePreview>) {
        let lines = match (self.session.board(preview), preview) {
            (Some(board), Some(preview)) => {
                render_board(&board, &preview.highlight, self.show_cell_numbers)
            }
            _ => vec![Line::from("Waiting for the game service...")],
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Board")
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);

        f.render_widget(paragraph, area);
    }

    fn render_right_panel(&self, f: &mut Frame<'_>, area: Rect, preview: Option<&MovePreview>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8), // Players
                Constraint::Length(4), // Dice
                Constraint::Min(5),    // Pairings
            ])
            .split(area);

        self.render_players(f, chunks[0]);
        self.render_dice(f, chunks[1], preview);
        self.render_pairings(f, chunks[2], preview);
    }

    fn render_players(&self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line<'_>> = vec![];

        if let Some(snapshot) = self.session.snapshot() {
            for player in Player::ALL {
                let summary = PlayerSummary::for_player(snapshot, player);
                let marker = if summary.is_active && !snapshot.game_over {
                    "→ "
                } else {
                    "  "
                };
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(
                        player.to_string(),
                        Style::default()
                            .fg(player_color(player))
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.push(Line::from(vec![
                    Span::raw("  Completed: "),
                    Span::styled(
                        format!("{}/{}", summary.completed.len(), COLUMNS_TO_WIN),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(format!(" [{}]", summary.completed.iter().join(", "))),
                    Span::raw(format!("  Steps: {}", summary.total_steps)),
                ]));
            }

            if let Some(winner) = snapshot.winner.filter(|_| snapshot.game_over) {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{winner} wins! Press 'n' for a new game"),
                    Style::default()
                        .fg(player_color(winner))
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }

        let block = Block::default().borders(Borders::ALL).title("Players");
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, area);
    }

    fn render_dice(&self, f: &mut Frame<'_>, area: Rect, preview: Option<&MovePreview>) {
        let rolled = self
            .session
            .snapshot()
            .is_some_and(|snapshot| snapshot.has_dice());

        let mut spans: Vec<Span<'_>> = Vec::new();
        if let Some(dice) = self.session.display_dice() {
            for (index, die) in dice.iter().enumerate() {
                let color = preview
                    .filter(|_| rolled)
                    .and_then(|preview| preview.highlight.die_color(index));
                let style = match color {
                    Some(color) => Style::default()
                        .fg(pair_color(color))
                        .add_modifier(Modifier::BOLD),
                    None if rolled => Style::default(),
                    None => Style::default().fg(Color::DarkGray),
                };
                spans.push(Span::styled(format!("[{die}]"), style));
                spans.push(Span::raw(" "));
            }
        }

        let mut lines = vec![Line::from(spans)];
        if let Some(snapshot) = self.session.snapshot() {
            if snapshot.is_bust {
                lines.push(Line::from(Span::styled(
                    "BUST! Press 'c' to continue",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
            }
        }

        let block = Block::default().borders(Borders::ALL).title("Dice");
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn sum_span(&self, option: &PairingOption, slot: PairColor) -> Span<'static> {
        let value = option.pairing.sum(slot);
        let mut style = if option.playability.slot_playable(slot) {
            Style::default().fg(pair_color(slot))
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        };

        let focused = self
            .session
            .focused_pairing()
            .is_some_and(|(pairing, _)| pairing.same_sums(&option.pairing))
            && option.needs_choice();
        let hovered_slot = self
            .session
            .interaction()
            .hovered_sum
            .and_then(|sum| option.pairing.slot_of(sum));
        if focused && hovered_slot == Some(slot) {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        Span::styled(format!("{value:>2}"), style)
    }

    fn render_pairings(&self, f: &mut Frame<'_>, area: Rect, preview: Option<&MovePreview>) {
        let options: &[PairingOption] = preview.map(|p| p.options.as_slice()).unwrap_or(&[]);

        let items: Vec<ListItem<'_>> = options
            .iter()
            .map(|option| {
                let mut spans = vec![
                    Span::raw(format!("[{}] ", option.available_index)),
                    self.sum_span(option, PairColor::Pair1),
                    Span::raw(" + "),
                    self.sum_span(option, PairColor::Pair2),
                    Span::raw("  "),
                ];
                if option.was_chosen {
                    spans.push(Span::styled("✓ chosen", Style::default().fg(Color::Green)));
                } else if let Some(reason) = option.disabled_reason {
                    spans.push(Span::styled(
                        reason.to_string(),
                        Style::default().fg(Color::DarkGray),
                    ));
                } else if option.selected && option.needs_choice() {
                    spans.push(Span::styled(
                        "pick a sum (←/→, Enter)",
                        Style::default().fg(Color::Yellow),
                    ));
                } else if option.needs_choice() {
                    spans.push(Span::styled("choose one", Style::default().fg(Color::Cyan)));
                } else if option.selected {
                    spans.push(Span::styled("confirming...", Style::default().fg(Color::Yellow)));
                }

                let style = if option.selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else if option.locked || !option.is_valid() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(spans)).style(style)
            })
            .collect();

        let title = match self.session.snapshot() {
            Some(snapshot) if snapshot.is_locked() => "Pairings (locked until next roll)",
            _ => "Pairings",
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(self.session.interaction().hovered_pairing);

        f.render_stateful_widget(list, area, &mut state);
    }

    fn status_text(&self) -> String {
        if self.show_help {
            return "↑/↓: Pairing | ←/→: Sum | Enter: Select | Esc: Cancel | r: Roll | s: Stop | c: Continue | n: New game | #: Cell numbers | q: Quit".to_string();
        }
        if let Some(kind) = self.session.in_flight() {
            return format!("Waiting for {kind}...");
        }
        if let Some(notice) = self.session.notice() {
            return notice.to_string();
        }

        let controls = self.session.controls();
        let mut hints = Vec::new();
        if controls.can_roll {
            hints.push("r: Roll");
        }
        if controls.can_stop {
            hints.push("s: Stop");
        }
        if controls.can_continue {
            hints.push("c: Continue");
        }
        hints.push("h: Help");
        hints.iter().join(" | ")
    }

    fn render_status_bar(&self, f: &mut Frame<'_>, area: Rect) {
        let style = if self.session.notice().is_some() && !self.show_help {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::White)
        };
        let paragraph = Paragraph::new(self.status_text())
            .block(Block::default().borders(Borders::ALL))
            .style(style)
            .alignment(Alignment::Center);

        f.render_widget(paragraph, area);
    }
}
