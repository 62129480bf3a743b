// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use ledgerlens_api::Client;
use ledgerlens_app::{ChannelScope, FetchEvent, Page, Record, ResourceKind};
use ledgerlens_tui::{BrowseRuntime, CancelHandle, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, warn};

/// HTTP-backed data source. Fetches run on short-lived worker threads with
/// a cloned client so the UI loop never blocks on the network.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl BrowseRuntime for HttpRuntime {
    fn load_page(
        &mut self,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
    ) -> Result<Vec<Record>> {
        Ok(self.client.list_page(kind, scope, page)?)
    }

    fn lookup_record(&mut self, kind: ResourceKind, identifier: &str) -> Result<Vec<Record>> {
        Ok(self.client.lookup(kind, identifier)?)
    }

    fn spawn_page_load(
        &mut self,
        generation: u64,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let result = client
                .list_page(kind, scope, page)
                .map_err(|error| error.to_string());
            if let Err(message) = &result {
                warn!(generation, %message, "page load failed");
            }
            let _ = tx.send(InternalEvent::Fetch(FetchEvent::PageLoaded {
                generation,
                result,
            }));
        });
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
        let client = self.client.clone();
        let identifier = identifier.to_owned();
        thread::spawn(move || {
            let result = client
                .lookup(kind, &identifier)
                .map_err(|error| error.to_string());
            if cancel.is_canceled() {
                debug!(request_id, "canceled lookup result discarded");
                return;
            }
            if let Err(message) = &result {
                warn!(request_id, %message, "lookup failed");
            }
            let _ = tx.send(InternalEvent::Fetch(FetchEvent::LookupResolved {
                request_id,
                result,
            }));
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpRuntime;
    use anyhow::{Result, anyhow};
    use ledgerlens_api::Client;
    use ledgerlens_app::{ChannelScope, FetchEvent, Page, ResourceKind};
    use ledgerlens_tui::{BrowseRuntime, CancelHandle, InternalEvent};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    const CHANNELS_BODY: &str = r#"[
        {
            "channelId": "channel-1",
            "portId": "polyibc.eth.relay",
            "state": 3,
            "counterparty": {"portId": "polyibc.base.relay", "channelId": "channel-2"}
        }
    ]"#;

    fn serve_one(body: &'static str) -> Result<(String, thread::JoinHandle<()>)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            let response = Response::from_string(body).with_status_code(200).with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
            request.respond(response).expect("response should succeed");
        });
        Ok((addr, handle))
    }

    fn runtime_for(addr: &str) -> Result<HttpRuntime> {
        Ok(HttpRuntime::new(Client::new(
            addr,
            Duration::from_secs(1),
            20,
        )?))
    }

    #[test]
    fn spawned_page_load_delivers_an_event() -> Result<()> {
        let (addr, handle) = serve_one(CHANNELS_BODY)?;
        let mut runtime = runtime_for(&addr)?;
        let (tx, rx) = mpsc::channel();

        runtime.spawn_page_load(
            3,
            ResourceKind::Channels,
            Some(ChannelScope::Universal),
            Page::new(1, 20),
            tx,
        )?;

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(InternalEvent::Fetch(FetchEvent::PageLoaded { generation, result })) => {
                assert_eq!(generation, 3);
                let records = result.expect("page should load");
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].primary_id(), "channel-1");
            }
            other => panic!("expected a page event, got {other:?}"),
        }

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn spawned_lookup_honors_cancellation() -> Result<()> {
        let (addr, handle) = serve_one(CHANNELS_BODY)?;
        let mut runtime = runtime_for(&addr)?;
        let (tx, rx) = mpsc::channel();

        let cancel = CancelHandle::new();
        cancel.cancel();
        runtime.spawn_lookup(9, cancel, ResourceKind::Channels, "channel-1", tx)?;

        assert!(
            rx.recv_timeout(Duration::from_millis(500)).is_err(),
            "canceled lookup must not deliver"
        );

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn spawned_lookup_delivers_failures_as_strings() -> Result<()> {
        let mut runtime = runtime_for("http://127.0.0.1:1")?;
        let (tx, rx) = mpsc::channel();

        runtime.spawn_lookup(
            4,
            CancelHandle::new(),
            ResourceKind::Channels,
            "channel-1",
            tx,
        )?;

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(InternalEvent::Fetch(FetchEvent::LookupResolved { request_id, result })) => {
                assert_eq!(request_id, 4);
                let message = result.expect_err("unreachable endpoint should fail");
                assert!(message.contains("cannot reach"));
            }
            other => panic!("expected a lookup event, got {other:?}"),
        }
        Ok(())
    }
}
