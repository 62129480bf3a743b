// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

const SHORT_HEX_MAX: usize = 12;

/// Lowercased, whitespace-trimmed form of a user-supplied identifier, as
/// submitted to the lookup endpoint.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Shortens long hex strings to `123456...abcd`; anything short enough to
/// read in full is left alone.
pub fn shorten_hex(value: &str) -> String {
    if value.len() <= SHORT_HEX_MAX {
        return value.to_owned();
    }
    format!("{}...{}", &value[..6], &value[value.len() - 4..])
}

/// Unix seconds to a human-readable UTC timestamp. Zero and missing
/// timestamps render as the epoch.
pub fn format_timestamp(unix_seconds: i64) -> String {
    let seconds = unix_seconds.max(0);
    let stamp =
        OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    stamp
        .format(&time::macros::format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| stamp.unix_timestamp().to_string())
}

/// Port identifiers are dot-separated (`polyibc.eth.71C959...`); the chain
/// lives in the second segment. Port ids without segments are returned
/// whole.
pub fn chain_from_port_id(port_id: &str) -> &str {
    let mut segments = port_id.split('.');
    let first = segments.next().unwrap_or(port_id);
    segments.next().unwrap_or(first)
}

/// A port id with a long trailing hex segment gets that segment shortened;
/// everything else is left intact.
pub fn format_port_id(port_id: &str) -> String {
    match port_id.rsplit_once('.') {
        Some((head, tail)) if tail.len() > SHORT_HEX_MAX && is_hex_segment(tail) => {
            format!("{head}.{}", shorten_hex(tail))
        }
        _ => port_id.to_owned(),
    }
}

pub fn format_connection_hops(hops: &[String]) -> String {
    hops.join(", ")
}

pub fn format_delay_period(seconds: u64) -> String {
    format!("{seconds}s")
}

fn is_hex_segment(value: &str) -> bool {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::{
        chain_from_port_id, format_connection_hops, format_delay_period, format_port_id,
        format_timestamp, normalize_identifier, shorten_hex,
    };

    #[test]
    fn normalize_identifier_trims_and_lowercases() {
        assert_eq!(normalize_identifier("  Channel-7 "), "channel-7");
        assert_eq!(normalize_identifier("ABC "), "abc");
        assert_eq!(normalize_identifier("   "), "");
    }

    #[test]
    fn shorten_hex_keeps_short_values() {
        assert_eq!(shorten_hex("0xabcd"), "0xabcd");
        assert_eq!(shorten_hex(""), "");
    }

    #[test]
    fn shorten_hex_compresses_long_values() {
        let hash = "0x5a9c1e8f2b64d7a3c0e915f8b264d7a3";
        assert_eq!(shorten_hex(hash), "0x5a9c...d7a3");
    }

    #[test]
    fn format_timestamp_renders_epoch_for_missing_values() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(-5), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn format_timestamp_renders_unix_seconds() {
        assert_eq!(format_timestamp(1_715_600_000), "2024-05-13 11:33:20 UTC");
    }

    #[test]
    fn chain_from_port_id_takes_second_segment() {
        assert_eq!(chain_from_port_id("polyibc.eth.71C95911E9a5"), "eth");
        assert_eq!(chain_from_port_id("polyibc.optimism"), "optimism");
        assert_eq!(chain_from_port_id("transfer"), "transfer");
    }

    #[test]
    fn format_port_id_shortens_trailing_hex() {
        assert_eq!(
            format_port_id("polyibc.eth.71C95911E9a5D330f4D621842EC243EE1343292e"),
            "polyibc.eth.71C959...292e"
        );
    }

    #[test]
    fn format_port_id_leaves_plain_ports_alone() {
        assert_eq!(format_port_id("transfer"), "transfer");
        assert_eq!(format_port_id("polyibc.base.relay"), "polyibc.base.relay");
    }

    #[test]
    fn format_connection_hops_joins_in_order() {
        let hops = vec!["connection-1".to_owned(), "connection-9".to_owned()];
        assert_eq!(format_connection_hops(&hops), "connection-1, connection-9");
        assert_eq!(format_connection_hops(&[]), "");
    }

    #[test]
    fn format_delay_period_appends_unit() {
        assert_eq!(format_delay_period(0), "0s");
        assert_eq!(format_delay_period(3600), "3600s");
    }
}
