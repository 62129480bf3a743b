// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ledgerlens_app::{Channel, ChannelScope, Connection, Page, Record, ResourceKind};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::CACHE_CONTROL;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failures of the protocol-query service client. Error responses are
/// treated as opaque: the surfaced text comes from the status line, never
/// from the body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("cannot reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned {status} ({reason})")]
    Http { status: u16, reason: String },
    #[error("decode response body: {source}")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    page_size: u64,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, page_size: u64) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let parsed = url::Url::parse(&base_url).map_err(|error| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: error.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url,
                reason: "expected an http(s) url".to_owned(),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::InvalidBaseUrl {
                url: base_url.clone(),
                reason: error.to_string(),
            })?;

        Ok(Self {
            base_url,
            page_size: page_size.max(1),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// One page of the server-paginated listing. List requests bypass HTTP
    /// caching so a reload always observes fresh data.
    pub fn list_page(
        &self,
        kind: ResourceKind,
        scope: Option<ChannelScope>,
        page: Page,
    ) -> Result<Vec<Record>, ApiError> {
        let url = self.endpoint(kind);
        let mut query: Vec<(&str, String)> = Vec::new();
        if kind == ResourceKind::Channels
            && let Some(scope) = scope
        {
            query.push(("channelType", scope.as_str().to_owned()));
        }
        query.push(("offset", page.offset().to_string()));
        query.push(("limit", page.size().to_string()));

        debug!(url = %url, offset = page.offset(), limit = page.size(), "list request");
        let request = self
            .http
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .query(&query);
        match kind {
            ResourceKind::Channels => Ok(self
                .fetch::<Vec<Channel>>(&url, request)?
                .into_iter()
                .map(Record::Channel)
                .collect()),
            ResourceKind::Connections => Ok(self
                .fetch::<Vec<Connection>>(&url, request)?
                .into_iter()
                .map(Record::Connection)
                .collect()),
        }
    }

    /// Exact-match lookup by identifier, outside pagination. Uses default
    /// caching; the identifier is expected to be normalized by the caller.
    pub fn lookup(&self, kind: ResourceKind, identifier: &str) -> Result<Vec<Record>, ApiError> {
        let url = self.endpoint(kind);
        debug!(url = %url, identifier, "lookup request");
        let request = self
            .http
            .get(&url)
            .query(&[(kind.id_param(), identifier)]);
        match kind {
            ResourceKind::Channels => Ok(self
                .fetch::<Vec<Channel>>(&url, request)?
                .into_iter()
                .map(Record::Channel)
                .collect()),
            ResourceKind::Connections => Ok(self
                .fetch::<Vec<Connection>>(&url, request)?
                .into_iter()
                .map(Record::Connection)
                .collect()),
        }
    }

    fn endpoint(&self, kind: ResourceKind) -> String {
        format!("{}/api/{}", self.base_url, kind.as_str())
    }

    fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().map_err(|source| ApiError::Transport {
            url: url.to_owned(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "request failed");
            return Err(http_error(status));
        }

        response
            .json::<T>()
            .map_err(|source| ApiError::Decode { source })
    }
}

fn http_error(status: StatusCode) -> ApiError {
    ApiError::Http {
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("unrecognized status")
            .to_owned(),
    }
}
