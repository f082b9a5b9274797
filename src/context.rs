//! Per-request origin snapshot and the reverse-proxy header rules behind it.
//!
//! A proxy in front of the service may rewrite the host (`X-Forwarded-Host`)
//! and mount the service under a path prefix (`X-Forwarded-Path`). Those
//! headers are honoured only when the app is configured to trust its proxy;
//! otherwise any client could forge them.

use std::collections::BTreeMap;

use http::header::{HOST, HeaderMap, HeaderName};
use tracing::trace;
use url::{Url, form_urlencoded};

use crate::error::Error;

pub static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub static X_FORWARDED_PATH: HeaderName = HeaderName::from_static("x-forwarded-path");
pub static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Everything link building needs to know about the current request.
///
/// Built once per request by [`ProxyResolver::resolve`] and never mutated.
#[derive(Clone, Debug)]
pub struct RequestContext {
    protocol: String,
    host: String,
    proxy_base: String,
    original_path: String,
    route_base: String,
    query: BTreeMap<String, String>,
}

impl RequestContext {
    /// Scheme as seen by the client, e.g. `"https"`.
    pub fn protocol(&self) -> &str { &self.protocol }
    /// `host[:port]` as seen by the client.
    pub fn host(&self) -> &str { &self.host }
    /// Path prefix added by the reverse proxy; empty when there is none.
    pub fn proxy_base(&self) -> &str { &self.proxy_base }
    /// Path and query exactly as this server received them.
    pub fn original_path(&self) -> &str { &self.original_path }
    /// Prefix the matched route is mounted under; empty at the root.
    pub fn route_base(&self) -> &str { &self.route_base }
    /// Incoming query parameters, last value wins on duplicate keys.
    pub fn query_params(&self) -> &BTreeMap<String, String> { &self.query }

    /// The URL of the current request from the client's point of view:
    /// `protocol://host` + proxy base + original path.
    pub fn current_href(&self) -> Result<Url, Error> {
        let href = format!(
            "{}://{}{}{}",
            self.protocol, self.host, self.proxy_base, self.original_path
        );
        if self.protocol.is_empty() {
            return Err(Error::resolution(href, "", "empty protocol"));
        }
        if self.host.is_empty() {
            return Err(Error::resolution(href, "", "empty host"));
        }
        if self.host.contains(|c: char| matches!(c, '/' | '?' | '#' | '@' | '\\') || c.is_whitespace()) {
            return Err(Error::resolution(href, "", format!("malformed host `{}`", self.host)));
        }
        if !self.proxy_base.is_empty()
            && (!self.proxy_base.starts_with('/')
                || self.proxy_base.contains(|c: char| matches!(c, '?' | '#' | '\\')))
        {
            return Err(Error::resolution(
                href,
                "",
                format!("malformed proxy base `{}`", self.proxy_base),
            ));
        }
        let url = Url::parse(&href).map_err(|e| Error::resolution(href.as_str(), "", e))?;
        if url.host_str().is_none() {
            return Err(Error::resolution(href, "", "no host in request origin"));
        }
        Ok(url)
    }
}

/// Builds [`RequestContext`]s, applying the proxy trust setting.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyResolver {
    trust_proxy: bool,
}

impl ProxyResolver {
    pub fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }

    pub fn trusts_proxy(&self) -> bool { self.trust_proxy }

    /// Snapshots one request.
    ///
    /// `protocol` is taken as given. With trust off, forwarded headers are
    /// ignored entirely; with trust on, a non-empty `X-Forwarded-Host`
    /// (first entry of a comma list) replaces `Host` and `X-Forwarded-Path`
    /// becomes the proxy base.
    pub fn resolve(
        &self,
        headers: &HeaderMap,
        protocol: impl Into<String>,
        route_base: &str,
        original_path: &str,
    ) -> RequestContext {
        let raw_host = header_str(headers, &HOST).unwrap_or_default();

        let (host, proxy_base) = if self.trust_proxy {
            let host = header_str(headers, &X_FORWARDED_HOST)
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .unwrap_or(raw_host);
            let base = header_str(headers, &X_FORWARDED_PATH).unwrap_or_default();
            (host, base)
        } else {
            (raw_host, "")
        };

        let query = original_path
            .split_once('?')
            .map(|(_, q)| parse_query(q))
            .unwrap_or_default();

        let ctx = RequestContext {
            protocol: protocol.into(),
            host: host.to_owned(),
            proxy_base: proxy_base.to_owned(),
            original_path: original_path.to_owned(),
            route_base: route_base.to_owned(),
            query,
        };
        trace!(?ctx, trust_proxy = self.trust_proxy, "resolved request context");
        ctx
    }

    /// The scheme the client used.
    ///
    /// A trusted `X-Forwarded-Proto` wins (first entry of a comma list);
    /// otherwise `fallback`, normally the scheme the server itself observed.
    pub fn protocol(&self, headers: &HeaderMap, fallback: &str) -> String {
        if self.trust_proxy {
            let forwarded = header_str(headers, &X_FORWARDED_PROTO)
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|p| !p.is_empty());
            if let Some(proto) = forwarded {
                return proto.to_ascii_lowercase();
            }
        }
        fallback.to_owned()
    }
}

/// Form-decodes a query string; the last occurrence of a key wins.
pub(crate) fn parse_query(query: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}
