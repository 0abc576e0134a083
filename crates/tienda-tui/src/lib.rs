// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tienda_app::{
    AppCommand, AppEvent, AppMode, AppState, CartLedger, CatalogStatus, CatalogStore, ChatSession,
    ChatVisibility, Product,
};

const DEFAULT_CHAT_GREETING: &str = "Hello! What can I help you with today?";
const TRANSCRIPT_WINDOW: usize = 12;
const CART_MARK: &str = "◆";
const DESCRIPTION_COLUMN_CHARS: usize = 56;

/// Seam between the dashboard view and the catalog feed. The default spawn
/// runs the load synchronously and reports through the channel; production
/// runtimes override it with a worker thread.
pub trait AppRuntime {
    fn load_catalog(&mut self) -> Result<Vec<Product>>;

    fn spawn_catalog_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.load_catalog() {
            Ok(products) => InternalEvent::Feed(FeedEvent::Loaded(products)),
            Err(error) => InternalEvent::Feed(FeedEvent::Failed(error.to_string())),
        };
        tx.send(event)
            .map_err(|_| anyhow::anyhow!("feed event channel closed"))?;
        Ok(())
    }

    fn chat_greeting(&self) -> String {
        DEFAULT_CHAT_GREETING.to_owned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Loaded(Vec<Product>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Feed(FeedEvent),
}

/// One rendered catalog entry, annotated with cart membership.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub product: Product,
    pub in_cart: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    catalog: CatalogStore,
    cart: CartLedger,
    chat: ChatSession,
    cursor: usize,
    help_visible: bool,
    feed_requested: bool,
    status_token: u64,
    greeting: String,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        greeting: runtime.chat_greeting(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    start_catalog_load(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_catalog_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    // One fetch per mount; redraws and repeat calls never retrigger it.
    if view_data.feed_requested {
        return;
    }
    view_data.feed_requested = true;

    if let Err(error) = runtime.spawn_catalog_load(internal_tx.clone()) {
        let message = format!("catalog unavailable: {error}");
        view_data.catalog.fail(message.clone());
        state.dispatch(AppCommand::SetStatus(message));
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Feed(event) => handle_feed_event(state, view_data, tx, event),
        }
    }
}

fn handle_feed_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: FeedEvent,
) {
    match event {
        FeedEvent::Loaded(products) => {
            let count = products.len();
            view_data.catalog.install(products);
            emit_status(
                state,
                view_data,
                tx,
                format!("catalog loaded: {count} products"),
            );
        }
        FeedEvent::Failed(error) => {
            let message = format!("catalog unavailable: {error}");
            view_data.catalog.fail(message.clone());
            emit_status(state, view_data, tx, message);
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Routes a command through the state machine; any status it produced gets
/// a token-guarded timed clear.
fn dispatch_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_command(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.chat == ChatVisibility::Visible {
        handle_chat_overlay_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.mode {
        AppMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::Browse => handle_browse_key(state, view_data, internal_tx, key),
    }
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc | KeyCode::Enter, _) => {
            dispatch_command(state, view_data, internal_tx, AppCommand::ExitToBrowse);
        }
        (KeyCode::Backspace, _) => {
            let mut term = view_data.catalog.search_term().to_owned();
            term.pop();
            view_data.catalog.set_search_term(term);
            clamp_cursor(view_data);
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                let mut term = view_data.catalog.search_term().to_owned();
                term.push(ch);
                view_data.catalog.set_search_term(term);
                clamp_cursor(view_data);
            }
        }
        _ => {}
    }
}

fn handle_browse_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            dispatch_command(state, view_data, internal_tx, AppCommand::EnterSearch);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.cursor = view_data.cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let last = view_data
                .catalog
                .visible_products()
                .len()
                .saturating_sub(1);
            view_data.cursor = (view_data.cursor + 1).min(last);
        }
        KeyCode::Char(' ') | KeyCode::Enter => toggle_selected(state, view_data, internal_tx),
        KeyCode::Char('b') => buy_selected(state, view_data, internal_tx),
        KeyCode::Char('c') => {
            // The session flag and the state machine move together; the
            // controller is the only writer of either.
            view_data.chat.open();
            dispatch_command(state, view_data, internal_tx, AppCommand::OpenChat);
        }
        KeyCode::Char('?') => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn handle_chat_overlay_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.chat.close();
            dispatch_command(state, view_data, internal_tx, AppCommand::CloseChat);
        }
        (KeyCode::Enter, _) => {
            view_data.chat.send();
        }
        (KeyCode::Char('l'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.chat.clear();
            emit_status(state, view_data, internal_tx, "chat cleared");
        }
        (KeyCode::Backspace, _) => {
            let mut draft = view_data.chat.draft().to_owned();
            draft.pop();
            view_data.chat.set_draft(draft);
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                let mut draft = view_data.chat.draft().to_owned();
                draft.push(ch);
                view_data.chat.set_draft(draft);
            }
        }
        _ => {}
    }
}

fn selected_product(view_data: &ViewData) -> Option<Product> {
    view_data
        .catalog
        .visible_products()
        .get(view_data.cursor)
        .map(|product| (*product).clone())
}

fn clamp_cursor(view_data: &mut ViewData) {
    let last = view_data
        .catalog
        .visible_products()
        .len()
        .saturating_sub(1);
    view_data.cursor = view_data.cursor.min(last);
}

fn toggle_selected(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(product) = selected_product(view_data) else {
        emit_status(state, view_data, internal_tx, "no product selected");
        return;
    };

    view_data.cart.toggle(product.id);
    let status = if view_data.cart.contains(product.id) {
        format!("added to cart: {}", product.title)
    } else {
        format!("removed from cart: {}", product.title)
    };
    emit_status(state, view_data, internal_tx, status);
}

fn buy_selected(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(product) = selected_product(view_data) else {
        emit_status(state, view_data, internal_tx, "no product selected");
        return;
    };

    let notice = view_data.cart.buy_now(&product);
    emit_status(state, view_data, internal_tx, notice);
}

fn visible_cards(catalog: &CatalogStore, cart: &CartLedger) -> Vec<ProductCard> {
    catalog
        .visible_products()
        .into_iter()
        .map(|product| ProductCard {
            product: product.clone(),
            in_cart: cart.contains(product.id),
        })
        .collect()
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state, view_data))
        .block(Block::default().title("tienda").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let cards = visible_cards(&view_data.catalog, &view_data.cart);
    if cards.is_empty() {
        let placeholder = Paragraph::new(empty_state_text(view_data.catalog.status()))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("products"));
        frame.render_widget(placeholder, layout[1]);
    } else {
        render_product_table(frame, layout[1], view_data, &cards);
    }

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.chat == ChatVisibility::Visible {
        let area = centered_rect(70, 45, frame.area());
        frame.render_widget(Clear, area);
        let chat = Paragraph::new(render_chat_overlay_text(
            &view_data.chat,
            &view_data.greeting,
        ))
        .block(Block::default().title("chat").borders(Borders::ALL));
        frame.render_widget(chat, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_product_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view_data: &ViewData,
    cards: &[ProductCard],
) {
    let rows = cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let mark = if card.in_cart { CART_MARK } else { "" };
            let row = Row::new(vec![
                Cell::from(mark.to_owned()),
                Cell::from(card.product.title.clone()),
                Cell::from(format!("${:.2}", card.product.price)),
                Cell::from(truncate_label(
                    &card.product.description,
                    DESCRIPTION_COLUMN_CHARS,
                )),
            ]);
            if index == view_data.cursor {
                row.style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                row
            }
        })
        .collect::<Vec<_>>();

    let header = Row::new(vec!["", "title", "price", "description"]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Percentage(30),
            Constraint::Length(10),
            Constraint::Percentage(55),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("products"));
    frame.render_widget(table, area);
}

fn header_text(state: &AppState, view_data: &ViewData) -> String {
    let search = if state.mode == AppMode::Search {
        format!("search: {}_", view_data.catalog.search_term())
    } else if view_data.catalog.search_term().is_empty() {
        "search: (press / to search)".to_owned()
    } else {
        format!("search: {}", view_data.catalog.search_term())
    };

    match cart_badge_text(&view_data.cart) {
        Some(badge) => format!("{search} | {badge}"),
        None => search,
    }
}

fn cart_badge_text(cart: &CartLedger) -> Option<String> {
    if cart.count() == 0 {
        None
    } else {
        Some(format!("cart [{}]", cart.count()))
    }
}

fn empty_state_text(status: &CatalogStatus) -> String {
    match status {
        CatalogStatus::Loading => "loading catalog...".to_owned(),
        CatalogStatus::Failed(message) => message.clone(),
        CatalogStatus::Ready => "No products found.".to_owned(),
    }
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        AppMode::Browse => "browse",
        AppMode::Search => "search",
    };
    let default = "/ search | j/k move | space cart | b buy | c chat | ? help | q quit";
    match &state.status_line {
        Some(status) => format!("{mode} | {status}"),
        None => format!("{mode} | {default}"),
    }
}

fn render_chat_overlay_text(chat: &ChatSession, greeting: &str) -> String {
    let mut lines = Vec::new();
    // The greeting is rendering-only; it is never part of the transcript.
    lines.push(format!("bot: {greeting}"));

    let keep = chat.transcript().len().saturating_sub(TRANSCRIPT_WINDOW);
    for message in chat.transcript().iter().skip(keep) {
        lines.push(format!("you: {message}"));
    }

    lines.push(String::new());
    lines.push(format!("> {}", chat.draft()));
    lines.push("enter send | ctrl+l clear | esc close".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "browse: j/k or up/down move | space or enter toggle cart | b buy now\n\
browse: / search | c chat | ? help | q or ctrl+q quit\n\
search: type to filter titles | backspace erase | enter or esc back to browse\n\
chat: type a message | enter send | ctrl+l clear transcript | esc close"
}

fn truncate_label(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
