// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Channels,
    Connections,
}

impl ResourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Channels => "channels",
            Self::Connections => "connections",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "channels" => Some(Self::Channels),
            "connections" => Some(Self::Connections),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Channels => "Channels",
            Self::Connections => "Connections",
        }
    }

    /// Query parameter used by the exact-match lookup endpoint.
    pub const fn id_param(self) -> &'static str {
        match self {
            Self::Channels => "channelId",
            Self::Connections => "connectionId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelScope {
    Universal,
    Recent,
    InProgress,
}

impl ChannelScope {
    pub const ALL: [Self; 3] = [Self::Universal, Self::Recent, Self::InProgress];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::Recent => "recent",
            Self::InProgress => "in-progress",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "universal" => Some(Self::Universal),
            "recent" => Some(Self::Recent),
            "in-progress" => Some(Self::InProgress),
            _ => None,
        }
    }

    pub const fn header_label(self) -> &'static str {
        match self {
            Self::Universal => "Universal Channels",
            Self::Recent => "Recent Channels",
            Self::InProgress => "In-Progress Channels",
        }
    }

    pub fn next(self) -> Self {
        let current = Self::ALL
            .iter()
            .position(|scope| *scope == self)
            .unwrap_or(0);
        Self::ALL[(current + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ChannelState {
    Uninitialized,
    Init,
    TryOpen,
    Open,
    Closed,
    Unrecognized(i32),
}

impl From<i32> for ChannelState {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Uninitialized,
            1 => Self::Init,
            2 => Self::TryOpen,
            3 => Self::Open,
            4 => Self::Closed,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<ChannelState> for i32 {
    fn from(state: ChannelState) -> Self {
        match state {
            ChannelState::Uninitialized => 0,
            ChannelState::Init => 1,
            ChannelState::TryOpen => 2,
            ChannelState::Open => 3,
            ChannelState::Closed => 4,
            ChannelState::Unrecognized(other) => other,
        }
    }
}

impl ChannelState {
    pub fn label(self) -> String {
        match self {
            Self::Uninitialized => "Uninitialized".to_owned(),
            Self::Init => "Init".to_owned(),
            Self::TryOpen => "Try Open".to_owned(),
            Self::Open => "Open".to_owned(),
            Self::Closed => "Closed".to_owned(),
            Self::Unrecognized(code) => format!("State {code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ConnectionState {
    Uninitialized,
    Init,
    TryOpen,
    Open,
    Unrecognized(i32),
}

impl From<i32> for ConnectionState {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Uninitialized,
            1 => Self::Init,
            2 => Self::TryOpen,
            3 => Self::Open,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<ConnectionState> for i32 {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Uninitialized => 0,
            ConnectionState::Init => 1,
            ConnectionState::TryOpen => 2,
            ConnectionState::Open => 3,
            ConnectionState::Unrecognized(other) => other,
        }
    }
}

impl ConnectionState {
    pub fn label(self) -> String {
        match self {
            Self::Uninitialized => "Uninitialized".to_owned(),
            Self::Init => "Init".to_owned(),
            Self::TryOpen => "Try Open".to_owned(),
            Self::Open => "Open".to_owned(),
            Self::Unrecognized(code) => format!("State {code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCounterparty {
    pub port_id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub channel_id: String,
    pub port_id: String,
    pub state: ChannelState,
    pub counterparty: ChannelCounterparty,
    #[serde(default)]
    pub connection_hops: Vec<String>,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub transaction_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCounterparty {
    pub connection_id: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub client_id: String,
    pub state: ConnectionState,
    pub counterparty: ConnectionCounterparty,
    #[serde(default)]
    pub delay_period: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Channel(Channel),
    Connection(Connection),
}

impl Record {
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Channel(_) => ResourceKind::Channels,
            Self::Connection(_) => ResourceKind::Connections,
        }
    }

    pub fn primary_id(&self) -> &str {
        match self {
            Self::Channel(channel) => &channel.channel_id,
            Self::Connection(connection) => &connection.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u64,
    size: u64,
}

impl Page {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub const fn number(self) -> u64 {
        self.number
    }

    pub const fn size(self) -> u64 {
        self.size
    }

    pub const fn offset(self) -> u64 {
        (self.number - 1) * self.size
    }

    pub fn with_number(self, number: u64) -> Self {
        Self::new(number, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[cfg(test)]
mod tests {
    use super::{Channel, ChannelScope, ChannelState, Connection, Page, Record, ResourceKind};

    #[test]
    fn page_offset_follows_page_number() {
        assert_eq!(Page::new(1, 20).offset(), 0);
        assert_eq!(Page::new(2, 20).offset(), 20);
        assert_eq!(Page::new(7, 20).offset(), 120);
    }

    #[test]
    fn page_clamps_degenerate_inputs() {
        let page = Page::new(0, 0);
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn scope_round_trips_through_parse() {
        for scope in ChannelScope::ALL {
            assert_eq!(ChannelScope::parse(scope.as_str()), Some(scope));
        }
        assert_eq!(ChannelScope::parse("upcoming"), None);
    }

    #[test]
    fn scope_cycling_wraps() {
        assert_eq!(ChannelScope::Universal.next(), ChannelScope::Recent);
        assert_eq!(ChannelScope::InProgress.next(), ChannelScope::Universal);
    }

    #[test]
    fn channel_state_decodes_from_wire_code() {
        let raw = r#"{
            "channelId": "channel-42",
            "portId": "polyibc.eth.71C95911E9a5D330f4D621842EC243EE1343292e",
            "state": 3,
            "counterparty": {"portId": "polyibc.optimism.abc", "channelId": "channel-7"},
            "connectionHops": ["connection-1", "connection-2"],
            "createTime": 1715600000,
            "transactionHash": "0x5a9c1e8f"
        }"#;
        let channel: Channel = serde_json::from_str(raw).expect("decode channel");
        assert_eq!(channel.state, ChannelState::Open);
        assert_eq!(channel.counterparty.channel_id, "channel-7");
        assert_eq!(channel.connection_hops.len(), 2);
    }

    #[test]
    fn channel_state_preserves_unknown_codes() {
        let state = ChannelState::from(9);
        assert_eq!(state, ChannelState::Unrecognized(9));
        assert_eq!(i32::from(state), 9);
        assert_eq!(state.label(), "State 9");
    }

    #[test]
    fn channel_optional_fields_default() {
        let raw = r#"{
            "channelId": "channel-1",
            "portId": "transfer",
            "state": 1,
            "counterparty": {"portId": "transfer", "channelId": ""}
        }"#;
        let channel: Channel = serde_json::from_str(raw).expect("decode sparse channel");
        assert_eq!(channel.create_time, 0);
        assert!(channel.connection_hops.is_empty());
        assert!(channel.transaction_hash.is_empty());
    }

    #[test]
    fn record_exposes_kind_and_primary_id() {
        let raw = r#"{
            "id": "connection-11",
            "clientId": "client-3",
            "state": 3,
            "counterparty": {"connectionId": "connection-12", "clientId": "client-9"},
            "delayPeriod": 0
        }"#;
        let connection: Connection = serde_json::from_str(raw).expect("decode connection");
        let record = Record::Connection(connection);
        assert_eq!(record.kind(), ResourceKind::Connections);
        assert_eq!(record.primary_id(), "connection-11");
    }
}
