// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::display::normalize_identifier;
use crate::table::{ColumnId, SortSpec, TableRow, TableState, project};
use crate::{ChannelScope, Page, Record, ResourceKind};

/// Lifecycle of the exact-match lookup flow. The lookup surface is open
/// exactly when the state is not `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Idle,
    Pending { request_id: u64 },
    Found(Record),
    NotFound,
    Error(String),
}

impl LookupState {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub const fn surface_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCommand {
    SetScope(ChannelScope),
    SetPage(u64),
    NextPage,
    PrevPage,
    Reload,
    SubmitLookup(String),
    DismissLookup,
    DismissError,
    CycleSort(ColumnId),
    ClearSort,
    ToggleColumn(ColumnId),
    ShowAllColumns,
    SetFilter(ColumnId, String),
    ClearFilter,
}

/// Completion of a fetch issued earlier as an [`Effect`]. Errors travel as
/// rendered strings so events stay comparable and channel-friendly.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    PageLoaded {
        generation: u64,
        result: Result<Vec<Record>, String>,
    },
    LookupResolved {
        request_id: u64,
        result: Result<Vec<Record>, String>,
    },
}

/// Work the caller must carry out after a dispatch. The state machine never
/// performs IO itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadPage {
        generation: u64,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
    },
    StartLookup {
        request_id: u64,
        kind: ResourceKind,
        identifier: String,
    },
    CancelLookup {
        request_id: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Committed,
    Stale,
}

/// View-ready snapshot, recomputed on demand and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationModel {
    pub kind: ResourceKind,
    pub header: String,
    pub page_number: u64,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub lookup: LookupState,
    pub rows: Vec<TableRow>,
    pub visible_columns: Vec<usize>,
    pub sorts: Vec<SortSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserState {
    kind: ResourceKind,
    scope: ChannelScope,
    page: Page,
    records: Vec<Record>,
    loading: bool,
    error: Option<String>,
    lookup: LookupState,
    pub table: TableState,
    deep_link: Option<String>,
    page_generation: u64,
    next_lookup_request_id: u64,
}

impl BrowserState {
    pub fn new(kind: ResourceKind, page_size: u64) -> Self {
        Self {
            kind,
            scope: ChannelScope::Universal,
            page: Page::new(1, page_size),
            records: Vec::new(),
            loading: false,
            error: None,
            lookup: LookupState::Idle,
            table: TableState::for_kind(kind),
            deep_link: None,
            page_generation: 0,
            next_lookup_request_id: 0,
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub const fn scope(&self) -> ChannelScope {
        self.scope
    }

    pub const fn page(&self) -> Page {
        self.page
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn lookup(&self) -> &LookupState {
        &self.lookup
    }

    pub fn deep_link(&self) -> Option<&str> {
        self.deep_link.as_deref()
    }

    /// Full page implies more pages may follow; the list endpoint has no
    /// pagination envelope.
    pub fn has_more(&self) -> bool {
        self.records.len() as u64 >= self.page.size()
    }

    /// Initial load. A deep-linked identifier from the navigation context
    /// triggers an immediate lookup on top of the first page load; once the
    /// lookup surface is dismissed the identifier is cleared and later
    /// mounts load the list only.
    pub fn mount(&mut self, deep_link: Option<&str>) -> Vec<Effect> {
        if let Some(identifier) = deep_link {
            self.deep_link = Some(identifier.to_owned());
        }
        let mut effects = vec![self.start_page_load()];
        if let Some(identifier) = self.deep_link.clone() {
            effects.extend(self.dispatch(BrowserCommand::SubmitLookup(identifier)));
        }
        effects
    }

    pub fn dispatch(&mut self, command: BrowserCommand) -> Vec<Effect> {
        match command {
            BrowserCommand::SetScope(scope) => {
                if self.kind != ResourceKind::Channels || scope == self.scope {
                    return Vec::new();
                }
                self.scope = scope;
                self.page = self.page.with_number(1);
                vec![self.start_page_load()]
            }
            BrowserCommand::SetPage(number) => {
                let number = number.max(1);
                if number == self.page.number() {
                    return Vec::new();
                }
                self.page = self.page.with_number(number);
                vec![self.start_page_load()]
            }
            BrowserCommand::NextPage => {
                if !self.has_more() {
                    return Vec::new();
                }
                self.dispatch(BrowserCommand::SetPage(self.page.number() + 1))
            }
            BrowserCommand::PrevPage => {
                if self.page.number() <= 1 {
                    return Vec::new();
                }
                self.dispatch(BrowserCommand::SetPage(self.page.number() - 1))
            }
            BrowserCommand::Reload => vec![self.start_page_load()],
            BrowserCommand::SubmitLookup(raw) => {
                let identifier = normalize_identifier(&raw);
                if identifier.is_empty() {
                    return Vec::new();
                }
                let mut effects = Vec::new();
                if let LookupState::Pending { request_id } = self.lookup {
                    effects.push(Effect::CancelLookup { request_id });
                }
                let request_id = self.next_lookup_request_id();
                self.lookup = LookupState::Pending { request_id };
                effects.push(Effect::StartLookup {
                    request_id,
                    kind: self.kind,
                    identifier,
                });
                effects
            }
            BrowserCommand::DismissLookup => {
                let mut effects = Vec::new();
                if let LookupState::Pending { request_id } = self.lookup {
                    effects.push(Effect::CancelLookup { request_id });
                }
                self.lookup = LookupState::Idle;
                self.deep_link = None;
                effects
            }
            BrowserCommand::DismissError => {
                self.error = None;
                Vec::new()
            }
            BrowserCommand::CycleSort(column) => {
                self.table.cycle_sort(column);
                Vec::new()
            }
            BrowserCommand::ClearSort => {
                self.table.clear_sorts();
                Vec::new()
            }
            BrowserCommand::ToggleColumn(column) => {
                self.table.toggle_column(column);
                Vec::new()
            }
            BrowserCommand::ShowAllColumns => {
                self.table.show_all_columns();
                Vec::new()
            }
            BrowserCommand::SetFilter(column, query) => {
                self.table.set_filter(column, &query);
                Vec::new()
            }
            BrowserCommand::ClearFilter => {
                self.table.clear_filter();
                Vec::new()
            }
        }
    }

    /// Commits a fetch completion, or discards it as stale. Page results
    /// are gated on the latest issued generation; lookup results on the
    /// currently pending request id. A result that arrives after dismissal
    /// or supersession changes nothing.
    pub fn apply(&mut self, event: FetchEvent) -> Applied {
        match event {
            FetchEvent::PageLoaded { generation, result } => {
                if generation != self.page_generation {
                    return Applied::Stale;
                }
                self.loading = false;
                match result {
                    Ok(records) => {
                        self.records = records;
                        self.error = None;
                    }
                    Err(message) => {
                        self.error = Some(message);
                    }
                }
                Applied::Committed
            }
            FetchEvent::LookupResolved { request_id, result } => {
                match self.lookup {
                    LookupState::Pending { request_id: pending } if pending == request_id => {}
                    _ => return Applied::Stale,
                }
                self.lookup = match result {
                    Ok(records) => match records.into_iter().next() {
                        Some(record) => LookupState::Found(record),
                        None => LookupState::NotFound,
                    },
                    Err(message) => LookupState::Error(message),
                };
                Applied::Committed
            }
        }
    }

    pub fn presentation(&self) -> PresentationModel {
        let projection = project(&self.records, &self.table);
        PresentationModel {
            kind: self.kind,
            header: match self.kind {
                ResourceKind::Channels => self.scope.header_label().to_owned(),
                ResourceKind::Connections => self.kind.label().to_owned(),
            },
            page_number: self.page.number(),
            has_more: self.has_more(),
            loading: self.loading,
            error: self.error.clone(),
            lookup: self.lookup.clone(),
            rows: projection.rows,
            visible_columns: self.table.visible_column_indices(),
            sorts: self.table.sorts.clone(),
        }
    }

    fn start_page_load(&mut self) -> Effect {
        self.page_generation = self.page_generation.saturating_add(1);
        self.loading = true;
        Effect::LoadPage {
            generation: self.page_generation,
            kind: self.kind,
            scope: (self.kind == ResourceKind::Channels).then_some(self.scope),
            page: self.page,
        }
    }

    fn next_lookup_request_id(&mut self) -> u64 {
        self.next_lookup_request_id = self.next_lookup_request_id.saturating_add(1);
        if self.next_lookup_request_id == 0 {
            self.next_lookup_request_id = 1;
        }
        self.next_lookup_request_id
    }
}
