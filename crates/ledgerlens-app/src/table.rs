// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::display::{
    chain_from_port_id, format_connection_hops, format_port_id, format_timestamp, shorten_hex,
};
use crate::{Record, ResourceKind, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnId {
    ChannelId,
    State,
    Source,
    Dest,
    PortId,
    CounterpartyChannel,
    CounterpartyPort,
    ConnectionHops,
    CreateTime,
    TransactionHash,
    ConnectionId,
    ClientId,
    CounterpartyConnection,
    CounterpartyClient,
    DelayPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub label: &'static str,
    pub hidden_by_default: bool,
}

const fn column(id: ColumnId, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        id,
        label,
        hidden_by_default: false,
    }
}

const fn hidden_column(id: ColumnId, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        id,
        label,
        hidden_by_default: true,
    }
}

pub const CHANNEL_COLUMNS: [ColumnSpec; 10] = [
    column(ColumnId::ChannelId, "Channel ID"),
    column(ColumnId::State, "State"),
    column(ColumnId::Source, "Source"),
    column(ColumnId::Dest, "Dest"),
    column(ColumnId::PortId, "Port ID"),
    column(ColumnId::CounterpartyChannel, "Counterparty"),
    hidden_column(ColumnId::CounterpartyPort, "Counterparty Port"),
    hidden_column(ColumnId::ConnectionHops, "Connection Hops"),
    hidden_column(ColumnId::CreateTime, "Create Time"),
    hidden_column(ColumnId::TransactionHash, "Transaction Hash"),
];

pub const CONNECTION_COLUMNS: [ColumnSpec; 6] = [
    column(ColumnId::ConnectionId, "Connection ID"),
    column(ColumnId::ClientId, "Client ID"),
    column(ColumnId::State, "State"),
    column(ColumnId::CounterpartyConnection, "Counterparty Connection"),
    column(ColumnId::CounterpartyClient, "Counterparty Client"),
    column(ColumnId::DelayPeriod, "Delay Period"),
];

pub const fn columns_for(kind: ResourceKind) -> &'static [ColumnSpec] {
    match kind {
        ResourceKind::Channels => &CHANNEL_COLUMNS,
        ResourceKind::Connections => &CONNECTION_COLUMNS,
    }
}

pub fn column_index(kind: ResourceKind, id: ColumnId) -> Option<usize> {
    columns_for(kind).iter().position(|spec| spec.id == id)
}

pub fn primary_column(kind: ResourceKind) -> ColumnId {
    match kind {
        ResourceKind::Channels => ColumnId::ChannelId,
        ResourceKind::Connections => ColumnId::ConnectionId,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Timestamp(i64),
    Hash(String),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Timestamp(seconds) => format_timestamp(*seconds),
            Self::Hash(value) => shorten_hex(value),
        }
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Timestamp(left), Self::Timestamp(right)) => left.cmp(right),
            (Self::Text(left), Self::Text(right)) => {
                left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase())
            }
            (Self::Hash(left), Self::Hash(right)) => {
                left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase())
            }
            _ => self
                .display()
                .to_ascii_lowercase()
                .cmp(&other.display().to_ascii_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: ColumnId,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: ColumnId,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    kind: ResourceKind,
    pub sorts: Vec<SortSpec>,
    pub hidden: BTreeSet<ColumnId>,
    pub filter: Option<ColumnFilter>,
}

impl TableState {
    pub fn for_kind(kind: ResourceKind) -> Self {
        let hidden = columns_for(kind)
            .iter()
            .filter(|spec| spec.hidden_by_default)
            .map(|spec| spec.id)
            .collect();
        Self {
            kind,
            sorts: vec![SortSpec {
                column: primary_column(kind),
                direction: SortDirection::Desc,
            }],
            hidden,
            filter: None,
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Unsorted -> ascending -> descending -> unsorted. A newly sorted
    /// column becomes the highest-priority key.
    pub fn cycle_sort(&mut self, column: ColumnId) -> Option<SortDirection> {
        if column_index(self.kind, column).is_none() {
            return None;
        }
        match self.sorts.iter().position(|sort| sort.column == column) {
            Some(index) => match self.sorts[index].direction {
                SortDirection::Asc => {
                    self.sorts[index].direction = SortDirection::Desc;
                    Some(SortDirection::Desc)
                }
                SortDirection::Desc => {
                    self.sorts.remove(index);
                    None
                }
            },
            None => {
                self.sorts.insert(
                    0,
                    SortSpec {
                        column,
                        direction: SortDirection::Asc,
                    },
                );
                Some(SortDirection::Asc)
            }
        }
    }

    pub fn clear_sorts(&mut self) {
        self.sorts.clear();
    }

    /// Returns the column's new hidden state; the last visible column
    /// cannot be hidden.
    pub fn toggle_column(&mut self, column: ColumnId) -> bool {
        if column_index(self.kind, column).is_none() {
            return false;
        }
        if self.hidden.contains(&column) {
            self.hidden.remove(&column);
            return false;
        }
        if self.hidden.len() + 1 == columns_for(self.kind).len() {
            return false;
        }
        self.hidden.insert(column);
        true
    }

    pub fn show_all_columns(&mut self) {
        self.hidden.clear();
    }

    pub fn set_filter(&mut self, column: ColumnId, query: &str) {
        let query = query.trim();
        if query.is_empty() || column_index(self.kind, column).is_none() {
            self.filter = None;
            return;
        }
        self.filter = Some(ColumnFilter {
            column,
            query: query.to_lowercase(),
        });
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn visible_column_indices(&self) -> Vec<usize> {
        let visible: Vec<usize> = columns_for(self.kind)
            .iter()
            .enumerate()
            .filter(|(_, spec)| !self.hidden.contains(&spec.id))
            .map(|(index, _)| index)
            .collect();
        if visible.is_empty() {
            (0..columns_for(self.kind).len()).collect()
        } else {
            visible
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableProjection {
    pub kind: ResourceKind,
    pub rows: Vec<TableRow>,
}

impl TableProjection {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        columns_for(self.kind).len()
    }
}

/// Derives the render-ready row set for one loaded page. Hidden columns
/// still carry cells so that sorting and filtering can reference them;
/// visibility only masks the render set.
pub fn project(records: &[Record], state: &TableState) -> TableProjection {
    let mut rows: Vec<TableRow> = records
        .iter()
        .filter(|record| record.kind() == state.kind())
        .map(base_row)
        .collect();

    if let Some(filter) = &state.filter
        && let Some(index) = column_index(state.kind(), filter.column)
    {
        rows.retain(|row| {
            row.cells
                .get(index)
                .map(|cell| cell.display().to_lowercase().contains(&filter.query))
                .unwrap_or(false)
        });
    }

    if !state.sorts.is_empty() {
        let keys: Vec<(usize, SortDirection)> = state
            .sorts
            .iter()
            .filter_map(|sort| {
                column_index(state.kind(), sort.column).map(|index| (index, sort.direction))
            })
            .collect();
        rows.sort_by(|left, right| {
            for (index, direction) in &keys {
                let order = match (left.cells.get(*index), right.cells.get(*index)) {
                    (Some(left_cell), Some(right_cell)) => match direction {
                        SortDirection::Asc => left_cell.cmp_value(right_cell),
                        SortDirection::Desc => left_cell.cmp_value(right_cell).reverse(),
                    },
                    _ => Ordering::Equal,
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
            Ordering::Equal
        });
    }

    TableProjection {
        kind: state.kind(),
        rows,
    }
}

fn base_row(record: &Record) -> TableRow {
    let cells = match record {
        Record::Channel(channel) => vec![
            CellValue::Text(channel.channel_id.clone()),
            CellValue::Text(channel.state.label()),
            CellValue::Text(chain_from_port_id(&channel.port_id).to_owned()),
            CellValue::Text(chain_from_port_id(&channel.counterparty.port_id).to_owned()),
            CellValue::Text(format_port_id(&channel.port_id)),
            CellValue::Text(channel.counterparty.channel_id.clone()),
            CellValue::Text(format_port_id(&channel.counterparty.port_id)),
            CellValue::Text(format_connection_hops(&channel.connection_hops)),
            CellValue::Timestamp(channel.create_time),
            CellValue::Hash(channel.transaction_hash.clone()),
        ],
        Record::Connection(connection) => vec![
            CellValue::Text(connection.id.clone()),
            CellValue::Text(connection.client_id.clone()),
            CellValue::Text(connection.state.label()),
            CellValue::Text(connection.counterparty.connection_id.clone()),
            CellValue::Text(connection.counterparty.client_id.clone()),
            CellValue::Integer(connection.delay_period as i64),
        ],
    };
    TableRow { cells }
}
