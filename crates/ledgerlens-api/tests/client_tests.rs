// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ledgerlens_api::{ApiError, Client};
use ledgerlens_app::{ChannelScope, Page, Record, ResourceKind};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};

const CHANNELS_BODY: &str = r#"[
    {
        "channelId": "channel-12",
        "portId": "polyibc.eth.71C95911E9a5D330f4D621842EC243EE1343292e",
        "state": 3,
        "counterparty": {"portId": "polyibc.optimism.peer", "channelId": "channel-13"},
        "connectionHops": ["connection-1"],
        "createTime": 1715600000,
        "transactionHash": "0x5a9c1e8f2b64d7a3c0e915f8b264d7a3"
    },
    {
        "channelId": "channel-9",
        "portId": "polyibc.base.relay",
        "state": 1,
        "counterparty": {"portId": "polyibc.eth.relay", "channelId": ""}
    }
]"#;

const CONNECTIONS_BODY: &str = r#"[
    {
        "id": "connection-4",
        "clientId": "client-1",
        "state": 3,
        "counterparty": {"connectionId": "connection-5", "clientId": "client-2"},
        "delayPeriod": 0
    }
]"#;

fn spawn_server() -> (Server, String) {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let addr = format!("http://{}", server.server_addr());
    (server, addr)
}

fn json_response(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body).with_status_code(200).with_header(
        Header::from_bytes("Content-Type", "application/json").expect("valid content type header"),
    )
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.to_string())
}

fn client(addr: &str) -> Client {
    Client::new(addr, Duration::from_secs(1), 20).expect("client should initialize")
}

#[test]
fn list_channels_sends_scope_offset_limit_and_cache_bypass() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/channels?channelType=universal&offset=0&limit=20"
        );
        assert_eq!(
            header_value(&request, "Cache-Control").as_deref(),
            Some("no-store")
        );
        request
            .respond(json_response(CHANNELS_BODY))
            .expect("response should succeed");
    });

    let records = client(&addr)
        .list_page(
            ResourceKind::Channels,
            Some(ChannelScope::Universal),
            Page::new(1, 20),
        )
        .expect("list should succeed");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].primary_id(), "channel-12");
    assert!(matches!(records[1], Record::Channel(_)));

    handle.join().expect("server thread should join");
}

#[test]
fn list_offset_reflects_the_requested_page() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/channels?channelType=recent&offset=40&limit=20"
        );
        request
            .respond(json_response("[]"))
            .expect("response should succeed");
    });

    let records = client(&addr)
        .list_page(
            ResourceKind::Channels,
            Some(ChannelScope::Recent),
            Page::new(3, 20),
        )
        .expect("list should succeed");
    assert!(records.is_empty());

    handle.join().expect("server thread should join");
}

#[test]
fn list_connections_omits_the_scope_parameter() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/connections?offset=0&limit=20");
        request
            .respond(json_response(CONNECTIONS_BODY))
            .expect("response should succeed");
    });

    let records = client(&addr)
        .list_page(ResourceKind::Connections, None, Page::new(1, 20))
        .expect("list should succeed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].primary_id(), "connection-4");

    handle.join().expect("server thread should join");
}

#[test]
fn lookup_uses_the_id_parameter_and_default_caching() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/channels?channelId=channel-12");
        assert_eq!(header_value(&request, "Cache-Control"), None);
        request
            .respond(json_response(CHANNELS_BODY))
            .expect("response should succeed");
    });

    let records = client(&addr)
        .lookup(ResourceKind::Channels, "channel-12")
        .expect("lookup should succeed");
    assert_eq!(records[0].primary_id(), "channel-12");

    handle.join().expect("server thread should join");
}

#[test]
fn lookup_with_no_matches_is_an_empty_success() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/connections?connectionId=connection-99");
        request
            .respond(json_response("[]"))
            .expect("response should succeed");
    });

    let records = client(&addr)
        .lookup(ResourceKind::Connections, "connection-99")
        .expect("lookup should succeed");
    assert!(records.is_empty());

    handle.join().expect("server thread should join");
}

#[test]
fn server_failure_surfaces_status_and_reason() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string("ignored body").with_status_code(500);
        request.respond(response).expect("response should succeed");
    });

    let error = client(&addr)
        .list_page(
            ResourceKind::Channels,
            Some(ChannelScope::Universal),
            Page::new(1, 20),
        )
        .expect_err("500 should fail");

    assert_eq!(error.status(), Some(500));
    assert_eq!(
        error.to_string(),
        "server returned 500 (Internal Server Error)"
    );

    handle.join().expect("server thread should join");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50), 20)
        .expect("client should initialize");

    let error = client
        .lookup(ResourceKind::Channels, "channel-1")
        .expect_err("lookup should fail for unreachable endpoint");
    assert!(matches!(error, ApiError::Transport { .. }));
    assert!(error.to_string().contains("cannot reach"));
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let (server, addr) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"not":"an array"}"#))
            .expect("response should succeed");
    });

    let error = client(&addr)
        .list_page(ResourceKind::Connections, None, Page::new(1, 20))
        .expect_err("object body should fail to decode");
    assert!(matches!(error, ApiError::Decode { .. }));

    handle.join().expect("server thread should join");
}
