// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use invtrack_app::{
    ApiOutcome, ApiRequest, AppCommand, AppEvent, FormField, InventoryState, Item, ItemId,
    ItemPayload, ModalState,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const FIELD_LABEL_WIDTH: usize = 12;

/// Data access behind the view. The TUI only ever talks to the inventory
/// API through this trait.
pub trait AppRuntime {
    fn list_items(&mut self) -> Result<Vec<Item>>;
    fn create_item(&mut self, payload: &ItemPayload) -> Result<Item>;
    fn update_item(&mut self, id: ItemId, payload: &ItemPayload) -> Result<Item>;
    fn delete_item(&mut self, id: ItemId) -> Result<()>;

    fn api_label(&self) -> String {
        "inventory API".to_owned()
    }

    /// Run `request` and report its outcome on `tx`. The default runs inline;
    /// runtimes backed by a network move the call off the UI thread.
    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = execute_request(self, request);
        tx.send(InternalEvent::Api(outcome))
            .map_err(|_| anyhow!("api event channel closed"))?;
        Ok(())
    }
}

pub fn execute_request<R: AppRuntime + ?Sized>(runtime: &mut R, request: ApiRequest) -> ApiOutcome {
    let kind = request.kind();
    let result = match request {
        ApiRequest::ListItems => runtime.list_items().map(ApiOutcome::ItemsListed),
        ApiRequest::CreateItem(payload) => {
            runtime.create_item(&payload).map(ApiOutcome::ItemSaved)
        }
        ApiRequest::UpdateItem(id, payload) => runtime
            .update_item(id, &payload)
            .map(ApiOutcome::ItemSaved),
        ApiRequest::DeleteItem(id) => runtime
            .delete_item(id)
            .map(|()| ApiOutcome::ItemDeleted(id)),
    };
    result.unwrap_or_else(|error| ApiOutcome::Failed {
        request: kind,
        error: format!("{error:#}"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Api(ApiOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableUiState {
    selected_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FormUiState {
    field_index: usize,
}

impl FormUiState {
    fn field(self) -> FormField {
        FormField::ALL[self.field_index.min(FormField::ALL.len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    api_label: String,
    table_state: TableUiState,
    form: Option<FormUiState>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut InventoryState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        api_label: runtime.api_label(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    mount(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(anyhow::Error::new(error).context("draw frame"));
            break;
        }

        match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(false) => {}
            Ok(true) => match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            },
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn mount<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    dispatch(state, runtime, view_data, internal_tx, AppCommand::Refresh);
}

fn process_internal_events<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
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
            InternalEvent::Api(outcome) => {
                dispatch(state, runtime, view_data, tx, AppCommand::ApplyOutcome(outcome));
            }
        }
    }
}

/// Apply `command` and carry out the side effects its events ask for.
fn dispatch<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    for event in state.dispatch(command) {
        match event {
            AppEvent::RequestIssued(request) => {
                let kind = request.kind();
                debug!(request = kind.as_str(), "issuing API request");
                if let Err(error) = runtime.spawn_request(request, internal_tx.clone()) {
                    dispatch(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        AppCommand::ApplyOutcome(ApiOutcome::Failed {
                            request: kind,
                            error: format!("{error:#}"),
                        }),
                    );
                }
            }
            AppEvent::ModalOpened(_) => {
                view_data.form = Some(FormUiState::default());
            }
            AppEvent::ModalClosed => {
                view_data.form = None;
            }
            AppEvent::ListReplaced(_) => clamp_table_cursor(state, view_data),
            AppEvent::ValidationFailed(errors) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("form invalid: {}", errors.summary()),
                );
            }
            AppEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::DraftChanged(_)
            | AppEvent::DeleteConfirmationRequested(_)
            | AppEvent::DeleteCancelled
            | AppEvent::NoticeRaised(_)
            | AppEvent::NoticeDismissed
            | AppEvent::StatusCleared => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut InventoryState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::ConfirmDelete);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::CancelDelete);
                emit_status(state, view_data, internal_tx, "delete canceled");
            }
            _ => {}
        }
        return false;
    }

    if state.modal.is_some() {
        handle_modal_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_row(state, view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_row(state, view_data, -1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
            view_data.table_state.selected_row = 0;
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            view_data.table_state.selected_row = state.items.len().saturating_sub(1);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            dispatch(state, runtime, view_data, internal_tx, AppCommand::OpenCreate);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
            match selected_item(state, view_data).cloned() {
                Some(item) => {
                    dispatch(state, runtime, view_data, internal_tx, AppCommand::OpenEdit(item));
                }
                None => emit_status(state, view_data, internal_tx, "no item selected"),
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
            match selected_item(state, view_data).map(|item| item.id) {
                Some(id) => {
                    dispatch(
                        state,
                        runtime,
                        view_data,
                        internal_tx,
                        AppCommand::RequestDelete(id),
                    );
                }
                None => emit_status(state, view_data, internal_tx, "no item selected"),
            }
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            dispatch(state, runtime, view_data, internal_tx, AppCommand::Refresh);
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        (KeyCode::Esc, _) => {
            if state.notice.is_some() {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::DismissNotice);
            } else {
                state.dispatch(AppCommand::ClearStatus);
            }
        }
        _ => {}
    }

    false
}

fn handle_modal_key<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let form = view_data.form.unwrap_or_default();
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch(state, runtime, view_data, internal_tx, AppCommand::CloseModal);
        }
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            if state.is_submitting() {
                emit_status(state, view_data, internal_tx, "save already in progress");
                return;
            }
            dispatch(state, runtime, view_data, internal_tx, AppCommand::Submit);
        }
        (KeyCode::Tab, _) | (KeyCode::Down, _) => move_form_field_cursor(view_data, 1),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => move_form_field_cursor(view_data, -1),
        (KeyCode::Backspace, _) => {
            edit_focused_field(state, runtime, view_data, internal_tx, form.field(), |value| {
                value.pop();
            });
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            edit_focused_field(state, runtime, view_data, internal_tx, form.field(), String::clear);
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT =>
        {
            edit_focused_field(state, runtime, view_data, internal_tx, form.field(), |value| {
                value.push(ch);
            });
        }
        _ => {}
    }
}

fn edit_focused_field<R: AppRuntime>(
    state: &mut InventoryState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    field: FormField,
    edit: impl FnOnce(&mut String),
) {
    let Some(modal) = &state.modal else {
        return;
    };
    let mut value = modal.draft.field(field).to_owned();
    edit(&mut value);
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SetDraftField(field, value),
    );
}

fn move_form_field_cursor(view_data: &mut ViewData, delta: isize) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let len = FormField::ALL.len() as isize;
    form.field_index = (form.field_index as isize + delta).rem_euclid(len) as usize;
}

fn selected_item<'a>(state: &'a InventoryState, view_data: &ViewData) -> Option<&'a Item> {
    state.items.get(view_data.table_state.selected_row)
}

fn move_row(state: &InventoryState, view_data: &mut ViewData, delta: isize) {
    if state.items.is_empty() {
        view_data.table_state.selected_row = 0;
        return;
    }
    let max = state.items.len() as isize - 1;
    let next = (view_data.table_state.selected_row as isize + delta).clamp(0, max);
    view_data.table_state.selected_row = next as usize;
}

fn clamp_table_cursor(state: &InventoryState, view_data: &mut ViewData) {
    view_data.table_state.selected_row = view_data
        .table_state
        .selected_row
        .min(state.items.len().saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &InventoryState, view_data: &ViewData) {
    let notice_height = if state.notice.is_some() { 3 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(notice_height),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state, view_data))
        .block(Block::default().title("invtrack").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    if let Some(notice) = &state.notice {
        let notice = Paragraph::new(format!("{} (esc to dismiss)", notice.text()))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("error").borders(Borders::ALL));
        frame.render_widget(notice, layout[1]);
    }

    render_items(frame, layout[2], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if let Some(modal) = &state.modal {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let field = view_data.form.unwrap_or_default().field();
        let form = Paragraph::new(render_form_text(modal, field, state.is_submitting())).block(
            Block::default()
                .title(modal_title(modal, state.is_submitting()))
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(form, area);
    }

    if let Some(id) = state.pending_delete {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(render_confirm_text(state, id))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_items(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &InventoryState,
    view_data: &ViewData,
) {
    let block = Block::default().title("items").borders(Borders::ALL);
    if state.loading {
        frame.render_widget(Paragraph::new("Loading...").block(block), area);
        return;
    }
    if state.items.is_empty() {
        frame.render_widget(
            Paragraph::new("no items -- press a to add one").block(block),
            area,
        );
        return;
    }

    let header = Row::new(TABLE_COLUMNS.iter().map(|label| Cell::from(*label))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let rows = state.items.iter().enumerate().map(|(index, item)| {
        let row = Row::new(table_row_cells(item));
        if index == view_data.table_state.selected_row {
            row.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            row
        }
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(25),
        Constraint::Length(6),
        Constraint::Percentage(20),
        Constraint::Percentage(35),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

const TABLE_COLUMNS: [&str; 6] = ["id", "name", "qty", "location", "description", "added"];

fn table_row_cells(item: &Item) -> Vec<String> {
    vec![
        item.id.to_string(),
        item.name.clone(),
        item.quantity.to_string(),
        item.location.clone().unwrap_or_default(),
        item.description.clone().unwrap_or_default(),
        item.added_on()
            .map(|date| date.to_string())
            .unwrap_or_default(),
    ]
}

fn header_text(state: &InventoryState, view_data: &ViewData) -> String {
    let count = match state.items.len() {
        1 => "1 item".to_owned(),
        n => format!("{n} items"),
    };
    if state.loading {
        format!("{} | {count} | loading...", view_data.api_label)
    } else {
        format!("{} | {count}", view_data.api_label)
    }
}

fn modal_title(modal: &ModalState, submitting: bool) -> String {
    let base = match modal.mode.target() {
        Some(id) => format!("{} #{id}", modal.mode.label()),
        None => modal.mode.label().to_owned(),
    };
    if submitting {
        format!("{base} (saving...)")
    } else {
        base
    }
}

fn render_form_text(modal: &ModalState, focused: FormField, submitting: bool) -> String {
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let marker = if field == focused { '>' } else { ' ' };
        lines.push(format!(
            "{marker} {:<width$} {}",
            field.label(),
            modal.draft.field(field),
            width = FIELD_LABEL_WIDTH,
        ));
        if let Some(error) = modal.errors.for_field(field) {
            lines.push(format!("  {:<width$} ! {error}", "", width = FIELD_LABEL_WIDTH));
        }
    }
    lines.push(String::new());
    if submitting {
        lines.push("saving...".to_owned());
    } else {
        lines.push("enter save | tab/shift+tab field | ctrl+u clear | esc cancel".to_owned());
    }
    lines.join("\n")
}

fn render_confirm_text(state: &InventoryState, id: ItemId) -> String {
    match state.item(id) {
        Some(item) => format!("delete {} (#{id})? y/n", item.name),
        None => format!("delete item #{id}? y/n"),
    }
}

fn status_text(state: &InventoryState, view_data: &ViewData) -> String {
    let default = if state.modal.is_some() {
        let field = view_data.form.unwrap_or_default().field();
        format!("field: {} | enter save | esc cancel | ctrl+q quit", field.label())
    } else if state.pending_delete.is_some() {
        "y confirm | n cancel".to_owned()
    } else {
        "j/k move | a add | e edit | d delete | r refresh | ? help | ctrl+q quit".to_owned()
    };
    match &state.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default,
    }
}

fn help_overlay_text() -> &'static str {
    "j/k, up/down   move selection\n\
     g/G            first/last row\n\
     a              add item\n\
     e, enter       edit selected item\n\
     d, delete      delete selected item (asks first)\n\
     r              reload from the API\n\
     esc            dismiss error / close dialog\n\
     \n\
     in the dialog:\n\
     tab/shift+tab  next/previous field\n\
     ctrl+s or enter submit\n\
     ctrl+u         clear field\n\
     \n\
     ctrl+q         quit"
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
