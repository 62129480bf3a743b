// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use ledgerlens_app::{
    Channel, ChannelCounterparty, ChannelScope, ChannelState, Connection, ConnectionCounterparty,
    ConnectionState, Page, Record, ResourceKind,
};
use ledgerlens_tui::BrowseRuntime;

const CHAINS: [&str; 8] = [
    "eth",
    "optimism",
    "base",
    "arbitrum",
    "polygon",
    "avalanche",
    "celestia",
    "osmosis",
];

const PORT_MODULES: [&str; 3] = ["polyibc", "transfer", "interchain"];

const CHANNEL_STATES: [ChannelState; 5] = [
    ChannelState::Uninitialized,
    ChannelState::Init,
    ChannelState::TryOpen,
    ChannelState::Open,
    ChannelState::Closed,
];

const CONNECTION_STATES: [ConnectionState; 4] = [
    ConnectionState::Uninitialized,
    ConnectionState::Init,
    ConnectionState::TryOpen,
    ConnectionState::Open,
];

const REFERENCE_TIME: i64 = 1_715_600_000;

#[derive(Debug)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic record fixtures: the same seed always produces the same
/// channels and connections.
#[derive(Debug)]
pub struct LedgerFaker {
    rng: DeterministicRng,
    next_channel: u64,
    next_connection: u64,
}

impl LedgerFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
            next_channel: 0,
            next_connection: 0,
        }
    }

    pub fn channel(&mut self) -> Channel {
        let number = self.next_channel;
        self.next_channel += 1;
        let state = CHANNEL_STATES[self.rng.int_n(CHANNEL_STATES.len())];
        let source = CHAINS[self.rng.int_n(CHAINS.len())];
        let dest = CHAINS[self.rng.int_n(CHAINS.len())];
        let module = PORT_MODULES[self.rng.int_n(PORT_MODULES.len())];
        Channel {
            channel_id: format!("channel-{number}"),
            port_id: format!("{module}.{source}.{:040x}", self.rng.next_u64()),
            state,
            counterparty: ChannelCounterparty {
                port_id: format!("{module}.{dest}.{:040x}", self.rng.next_u64()),
                channel_id: format!("channel-{}", number + 1000),
            },
            connection_hops: vec![
                format!("connection-{}", self.rng.int_n(64)),
                format!("connection-{}", self.rng.int_n(64)),
            ],
            create_time: REFERENCE_TIME - (number as i64) * 3_600,
            transaction_hash: format!("0x{:064x}", self.rng.next_u64()),
        }
    }

    pub fn connection(&mut self) -> Connection {
        let number = self.next_connection;
        self.next_connection += 1;
        Connection {
            id: format!("connection-{number}"),
            client_id: format!("client-{}", self.rng.int_n(32)),
            state: CONNECTION_STATES[self.rng.int_n(CONNECTION_STATES.len())],
            counterparty: ConnectionCounterparty {
                connection_id: format!("connection-{}", number + 500),
                client_id: format!("client-{}", self.rng.int_n(32)),
            },
            delay_period: [0, 0, 30, 3_600][self.rng.int_n(4)],
        }
    }

    pub fn channels(&mut self, count: usize) -> Vec<Channel> {
        (0..count).map(|_| self.channel()).collect()
    }

    pub fn connections(&mut self, count: usize) -> Vec<Connection> {
        (0..count).map(|_| self.connection()).collect()
    }
}

pub fn channels_json(channels: &[Channel]) -> Result<String> {
    Ok(serde_json::to_string(channels)?)
}

pub fn connections_json(connections: &[Connection]) -> Result<String> {
    Ok(serde_json::to_string(connections)?)
}

/// In-memory data source with the list endpoint's semantics: scope
/// narrowing, offset/limit slicing, exact-match lookup. Backs demo mode
/// and integration tests without a network.
#[derive(Debug)]
pub struct StaticRuntime {
    channels: Vec<Channel>,
    connections: Vec<Connection>,
}

impl StaticRuntime {
    pub fn new(channels: Vec<Channel>, connections: Vec<Connection>) -> Self {
        Self {
            channels,
            connections,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        let mut faker = LedgerFaker::new(seed);
        let channels = faker.channels(50);
        let connections = faker.connections(50);
        Self::new(channels, connections)
    }

    fn scoped_channels(&self, scope: Option<ChannelScope>) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = match scope {
            None | Some(ChannelScope::Universal) => self.channels.iter().collect(),
            Some(ChannelScope::Recent) => {
                let mut recent: Vec<&Channel> = self.channels.iter().collect();
                recent.sort_by_key(|channel| std::cmp::Reverse(channel.create_time));
                return recent;
            }
            Some(ChannelScope::InProgress) => self
                .channels
                .iter()
                .filter(|channel| {
                    matches!(channel.state, ChannelState::Init | ChannelState::TryOpen)
                })
                .collect(),
        };
        channels.sort_by(|left, right| left.channel_id.cmp(&right.channel_id));
        channels
    }

    fn slice<T: Clone>(rows: Vec<&T>, page: Page) -> Vec<T> {
        rows.into_iter()
            .skip(page.offset() as usize)
            .take(page.size() as usize)
            .cloned()
            .collect()
    }
}

impl BrowseRuntime for StaticRuntime {
    fn load_page(
        &mut self,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
    ) -> Result<Vec<Record>> {
        Ok(match kind {
            ResourceKind::Channels => Self::slice(self.scoped_channels(scope), page)
                .into_iter()
                .map(Record::Channel)
                .collect(),
            ResourceKind::Connections => {
                Self::slice(self.connections.iter().collect(), page)
                    .into_iter()
                    .map(Record::Connection)
                    .collect()
            }
        })
    }

    fn lookup_record(&mut self, kind: ResourceKind, identifier: &str) -> Result<Vec<Record>> {
        Ok(match kind {
            ResourceKind::Channels => self
                .channels
                .iter()
                .filter(|channel| channel.channel_id == identifier)
                .cloned()
                .map(Record::Channel)
                .collect(),
            ResourceKind::Connections => self
                .connections
                .iter()
                .filter(|connection| connection.id == identifier)
                .cloned()
                .map(Record::Connection)
                .collect(),
        })
    }
}
