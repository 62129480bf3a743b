// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ledgerlens_app::{
    Applied, BrowserCommand, BrowserState, ChannelScope, ColumnId, ColumnSpec, Effect, FetchEvent,
    LookupState, Page, PresentationModel, Record, ResourceKind, SortDirection, columns_for,
    format_connection_hops, format_delay_period, format_port_id, format_timestamp,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const STATUS_CLEAR_SECS: u64 = 4;

/// Per-request cancellation flag. A fresh handle is allocated for every
/// lookup; handles are never reused across requests.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Fetch(FetchEvent),
}

/// Data source for the browsing loop. The synchronous operations do the
/// actual work; the `spawn_` wrappers deliver the outcome as an
/// [`InternalEvent`] and default to running inline, which keeps tests
/// deterministic. Production runtimes override them to run on worker
/// threads so the UI loop never blocks.
pub trait BrowseRuntime {
    fn load_page(
        &mut self,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
    ) -> Result<Vec<Record>>;

    fn lookup_record(&mut self, kind: ResourceKind, identifier: &str) -> Result<Vec<Record>>;

    fn spawn_page_load(
        &mut self,
        generation: u64,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .load_page(kind, scope, page)
            .map_err(|error| error.to_string());
        tx.send(InternalEvent::Fetch(FetchEvent::PageLoaded { generation, result }))
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }

    fn spawn_lookup(
        &mut self,
        request_id: u64,
        cancel: CancelHandle,
        kind: ResourceKind,
        identifier: &str,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .lookup_record(kind, identifier)
            .map_err(|error| error.to_string());
        // A canceled request's outcome is dropped before delivery, no
        // matter how it resolved.
        if cancel.is_canceled() {
            debug!(request_id, "lookup canceled before delivery");
            return Ok(());
        }
        tx.send(InternalEvent::Fetch(FetchEvent::LookupResolved { request_id, result }))
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }

    fn cancel_lookup(&mut self, _request_id: u64) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Nav,
    LookupEntry,
    FilterEntry,
}

#[derive(Debug, Clone)]
struct LookupInFlight {
    request_id: u64,
    cancel: CancelHandle,
}

#[derive(Debug)]
pub struct UiState {
    pub browser: BrowserState,
    input_mode: InputMode,
    lookup_input: String,
    filter_input: String,
    selected_row: usize,
    selected_col: usize,
    status_line: Option<String>,
    status_token: u64,
    lookup_in_flight: Option<LookupInFlight>,
}

impl UiState {
    pub fn new(browser: BrowserState) -> Self {
        Self {
            browser,
            input_mode: InputMode::Nav,
            lookup_input: String::new(),
            filter_input: String::new(),
            selected_row: 0,
            selected_col: 0,
            status_line: None,
            status_token: 0,
            lookup_in_flight: None,
        }
    }

    fn selected_column_spec(&self) -> &'static ColumnSpec {
        let columns = columns_for(self.browser.kind());
        let visible = self.browser.table.visible_column_indices();
        let index = visible
            .get(self.selected_col.min(visible.len().saturating_sub(1)))
            .copied()
            .unwrap_or(0);
        &columns[index]
    }
}

pub fn run_app<R: BrowseRuntime>(
    browser: BrowserState,
    runtime: &mut R,
    deep_link: Option<&str>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut ui = UiState::new(browser);
    let (internal_tx, internal_rx) = mpsc::channel();

    let effects = ui.browser.mount(deep_link);
    run_effects(&mut ui, runtime, &internal_tx, effects);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut ui, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, &ui)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(&mut ui, runtime, &internal_tx, key) {
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

fn process_internal_events(ui: &mut UiState, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == ui.status_token => {
                ui.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Fetch(fetch) => {
                let is_lookup = matches!(fetch, FetchEvent::LookupResolved { .. });
                match ui.browser.apply(fetch) {
                    Applied::Committed => {
                        if is_lookup {
                            ui.lookup_in_flight = None;
                        }
                        clamp_selection(ui);
                    }
                    Applied::Stale => {
                        debug!("stale fetch result discarded");
                    }
                }
            }
        }
    }
}

fn clamp_selection(ui: &mut UiState) {
    let rows = ui.browser.presentation().rows.len();
    if rows == 0 {
        ui.selected_row = 0;
    } else if ui.selected_row >= rows {
        ui.selected_row = rows - 1;
    }
}

fn run_effects<R: BrowseRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::LoadPage {
                generation,
                kind,
                scope,
                page,
            } => {
                if let Err(error) =
                    runtime.spawn_page_load(generation, kind, scope, page, tx.clone())
                {
                    set_status(ui, tx, format!("load failed: {error}"));
                }
            }
            Effect::StartLookup {
                request_id,
                kind,
                identifier,
            } => {
                let cancel = CancelHandle::new();
                ui.lookup_in_flight = Some(LookupInFlight {
                    request_id,
                    cancel: cancel.clone(),
                });
                if let Err(error) =
                    runtime.spawn_lookup(request_id, cancel, kind, &identifier, tx.clone())
                {
                    set_status(ui, tx, format!("lookup failed to start: {error}"));
                }
            }
            Effect::CancelLookup { request_id } => {
                if let Some(in_flight) = &ui.lookup_in_flight
                    && in_flight.request_id == request_id
                {
                    in_flight.cancel.cancel();
                    ui.lookup_in_flight = None;
                }
                let _ = runtime.cancel_lookup(request_id);
            }
        }
    }
}

fn set_status(ui: &mut UiState, tx: &Sender<InternalEvent>, message: impl Into<String>) {
    ui.status_line = Some(message.into());
    ui.status_token = ui.status_token.wrapping_add(1);
    schedule_status_clear(tx, ui.status_token);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(STATUS_CLEAR_SECS));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Returns true when the app should quit.
fn handle_key_event<R: BrowseRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match ui.input_mode {
        InputMode::LookupEntry => {
            handle_lookup_entry_key(ui, runtime, tx, key);
            false
        }
        InputMode::FilterEntry => {
            handle_filter_entry_key(ui, runtime, tx, key);
            false
        }
        InputMode::Nav => handle_nav_key(ui, runtime, tx, key),
    }
}

fn handle_lookup_entry_key<R: BrowseRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            ui.input_mode = InputMode::Nav;
        }
        KeyCode::Enter => {
            // The submit control is inert while the input is empty.
            if ui.lookup_input.trim().is_empty() {
                return;
            }
            let effects = ui
                .browser
                .dispatch(BrowserCommand::SubmitLookup(ui.lookup_input.clone()));
            ui.input_mode = InputMode::Nav;
            ui.lookup_input.clear();
            run_effects(ui, runtime, tx, effects);
        }
        KeyCode::Backspace => {
            ui.lookup_input.pop();
        }
        KeyCode::Char(ch) => {
            ui.lookup_input.push(ch);
        }
        _ => {}
    }
}

fn handle_filter_entry_key<R: BrowseRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            ui.input_mode = InputMode::Nav;
        }
        KeyCode::Enter => {
            let column = ui.selected_column_spec().id;
            let command = if ui.filter_input.trim().is_empty() {
                BrowserCommand::ClearFilter
            } else {
                BrowserCommand::SetFilter(column, ui.filter_input.clone())
            };
            let effects = ui.browser.dispatch(command);
            ui.input_mode = InputMode::Nav;
            ui.filter_input.clear();
            clamp_selection(ui);
            set_status(ui, tx, "filter applied");
            run_effects(ui, runtime, tx, effects);
        }
        KeyCode::Backspace => {
            ui.filter_input.pop();
        }
        KeyCode::Char(ch) => {
            ui.filter_input.push(ch);
        }
        _ => {}
    }
}

fn handle_nav_key<R: BrowseRuntime>(
    ui: &mut UiState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let model = ui.browser.presentation();
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => return true,
        (KeyCode::Esc, _) => {
            // Each overlay dismisses independently of the other.
            if model.lookup.surface_open() {
                let effects = ui.browser.dispatch(BrowserCommand::DismissLookup);
                run_effects(ui, runtime, tx, effects);
            } else if model.error.is_some() {
                ui.browser.dispatch(BrowserCommand::DismissError);
            }
        }
        (KeyCode::Char('r'), _) => {
            let effects = ui.browser.dispatch(BrowserCommand::Reload);
            set_status(ui, tx, "reloading");
            run_effects(ui, runtime, tx, effects);
        }
        (KeyCode::Char('t'), _) => {
            if ui.browser.kind() == ResourceKind::Channels {
                let next = ui.browser.scope().next();
                let effects = ui.browser.dispatch(BrowserCommand::SetScope(next));
                set_status(ui, tx, next.header_label());
                run_effects(ui, runtime, tx, effects);
            }
        }
        (KeyCode::Char('/'), _) => {
            ui.input_mode = InputMode::LookupEntry;
        }
        (KeyCode::Char('f'), _) => {
            ui.input_mode = InputMode::FilterEntry;
        }
        (KeyCode::Char('F'), _) => {
            ui.browser.dispatch(BrowserCommand::ClearFilter);
            set_status(ui, tx, "filter cleared");
        }
        (KeyCode::Right, _) | (KeyCode::Char('n'), KeyModifiers::NONE) => {
            let effects = ui.browser.dispatch(BrowserCommand::NextPage);
            if !effects.is_empty() {
                ui.selected_row = 0;
            }
            run_effects(ui, runtime, tx, effects);
        }
        (KeyCode::Left, _) | (KeyCode::Char('p'), KeyModifiers::NONE) => {
            let effects = ui.browser.dispatch(BrowserCommand::PrevPage);
            if !effects.is_empty() {
                ui.selected_row = 0;
            }
            run_effects(ui, runtime, tx, effects);
        }
        (KeyCode::Down, _) => {
            if ui.selected_row + 1 < model.rows.len() {
                ui.selected_row += 1;
            }
        }
        (KeyCode::Up, _) => {
            ui.selected_row = ui.selected_row.saturating_sub(1);
        }
        (KeyCode::Tab, _) => {
            let visible = ui.browser.table.visible_column_indices();
            ui.selected_col = (ui.selected_col + 1) % visible.len().max(1);
        }
        (KeyCode::BackTab, _) => {
            let visible = ui.browser.table.visible_column_indices();
            let count = visible.len().max(1);
            ui.selected_col = (ui.selected_col + count - 1) % count;
        }
        (KeyCode::Char('s'), _) => {
            let spec = ui.selected_column_spec();
            let column = spec.id;
            let label = spec.label;
            ui.browser.dispatch(BrowserCommand::CycleSort(column));
            let message = match sort_direction_for(&ui.browser, column) {
                Some(SortDirection::Asc) => format!("sort {label} asc"),
                Some(SortDirection::Desc) => format!("sort {label} desc"),
                None => format!("sort {label} cleared"),
            };
            set_status(ui, tx, message);
        }
        (KeyCode::Char('S'), _) => {
            ui.browser.dispatch(BrowserCommand::ClearSort);
            set_status(ui, tx, "sort cleared");
        }
        (KeyCode::Char('h'), _) => {
            let spec = ui.selected_column_spec();
            let label = spec.label;
            let command = BrowserCommand::ToggleColumn(spec.id);
            ui.browser.dispatch(command);
            ui.selected_col = 0;
            set_status(ui, tx, format!("column toggled: {label}"));
        }
        (KeyCode::Char('a'), _) => {
            ui.browser.dispatch(BrowserCommand::ShowAllColumns);
            set_status(ui, tx, "all columns shown");
        }
        _ => {}
    }
    false
}

fn sort_direction_for(browser: &BrowserState, column: ColumnId) -> Option<SortDirection> {
    browser
        .table
        .sorts
        .iter()
        .find(|sort| sort.column == column)
        .map(|sort| sort.direction)
}

fn render(frame: &mut ratatui::Frame, ui: &UiState) {
    let model = ui.browser.presentation();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(&model)).block(
        Block::default()
            .title("ledgerlens")
            .borders(Borders::ALL),
    );
    frame.render_widget(header, layout[0]);

    render_table(frame, layout[1], ui, &model);

    let footer = Paragraph::new(footer_text(ui, &model))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    if model.error.is_some() {
        let area = centered_rect(60, 32, frame.area());
        frame.render_widget(Clear, area);
        let modal = Paragraph::new(error_modal_text(&model)).block(
            Block::default()
                .title("error")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(modal, area);
    }

    if model.lookup.surface_open() {
        let area = centered_rect(72, 62, frame.area());
        frame.render_widget(Clear, area);
        let modal = Paragraph::new(lookup_modal_text(&model.lookup)).block(
            Block::default()
                .title("lookup")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(modal, area);
    }
}

fn render_table(frame: &mut ratatui::Frame, area: Rect, ui: &UiState, model: &PresentationModel) {
    let columns = columns_for(model.kind);
    let widths = vec![Constraint::Min(10); model.visible_columns.len().max(1)];

    let header_cells = model.visible_columns.iter().map(|full_index| {
        let label = header_label(model, &columns[*full_index]);
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = model.rows.iter().enumerate().map(|(row_index, row)| {
        let selected = row_index == ui.selected_row;
        let cells = model.visible_columns.iter().map(|full_index| {
            let text = row
                .cells
                .get(*full_index)
                .map(|cell| cell.display())
                .unwrap_or_default();
            let style = if selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Cell::from(text).style(style)
        });
        Row::new(cells.collect::<Vec<_>>())
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn header_label(model: &PresentationModel, spec: &ColumnSpec) -> String {
    let mut label = spec.label.to_owned();
    if let Some(sort) = model.sorts.iter().find(|sort| sort.column == spec.id) {
        label.push(' ');
        label.push_str(match sort.direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        });
    }
    label
}

fn header_text(model: &PresentationModel) -> String {
    if model.loading {
        format!("{} (loading...)", model.header)
    } else {
        model.header.clone()
    }
}

fn footer_text(ui: &UiState, model: &PresentationModel) -> String {
    match ui.input_mode {
        InputMode::LookupEntry => format!("lookup id: {}_", ui.lookup_input),
        InputMode::FilterEntry => format!(
            "filter {}: {}_",
            ui.selected_column_spec().label,
            ui.filter_input
        ),
        InputMode::Nav => {
            if let Some(status) = &ui.status_line {
                status.clone()
            } else {
                let more = if model.has_more { " | right: next" } else { "" };
                format!(
                    "page {}{} | / lookup | r reload | t scope | s sort | h hide | q quit",
                    model.page_number, more
                )
            }
        }
    }
}

fn error_modal_text(model: &PresentationModel) -> String {
    let subject = match model.kind {
        ResourceKind::Channels => "channel",
        ResourceKind::Connections => "connection",
    };
    let detail = model
        .error
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default();
    format!("There was an issue fetching {subject} data{detail}\n\npress esc to dismiss")
}

fn lookup_modal_text(lookup: &LookupState) -> String {
    match lookup {
        LookupState::Idle => String::new(),
        LookupState::Pending { .. } => "searching...".to_owned(),
        LookupState::Found(record) => record_details_text(record),
        LookupState::NotFound => {
            "No record matches the submitted identifier.\n\npress esc to dismiss".to_owned()
        }
        LookupState::Error(message) => {
            format!("Lookup failed: {message}\n\npress esc to dismiss")
        }
    }
}

/// Full field listing for one record, hidden-by-default columns included.
pub fn record_details_text(record: &Record) -> String {
    match record {
        Record::Channel(channel) => [
            format!("Channel ID: {}", channel.channel_id),
            format!("State: {}", channel.state.label()),
            format!("Port ID: {}", format_port_id(&channel.port_id)),
            format!("Counterparty: {}", channel.counterparty.channel_id),
            format!(
                "Counterparty Port: {}",
                format_port_id(&channel.counterparty.port_id)
            ),
            format!(
                "Connection Hops: {}",
                format_connection_hops(&channel.connection_hops)
            ),
            format!("Create Time: {}", format_timestamp(channel.create_time)),
            format!("Transaction Hash: {}", channel.transaction_hash),
        ]
        .join("\n"),
        Record::Connection(connection) => [
            format!("Connection ID: {}", connection.id),
            format!("Client ID: {}", connection.client_id),
            format!("State: {}", connection.state.label()),
            format!(
                "Counterparty Connection: {}",
                connection.counterparty.connection_id
            ),
            format!(
                "Counterparty Client: {}",
                connection.counterparty.client_id
            ),
            format!(
                "Delay Period: {}",
                format_delay_period(connection.delay_period)
            ),
        ]
        .join("\n"),
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
