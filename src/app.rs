//! Application: routes plus the per-app link configuration.
//!
//! Every request gets its own [`RequestContext`](crate::RequestContext),
//! snapshotted by the app's [`ProxyResolver`] before the handler runs, and a
//! [`LinkBuilder`] over it and the app's base [`LinkOptions`].

use std::fmt::Display;
use std::sync::Arc;

use bytes::Bytes;
use http::header::HOST;
use http::{HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use tracing::warn;

use crate::context::ProxyResolver;
use crate::link::LinkBuilder;
use crate::options::LinkOptions;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// A router together with proxy trust and base link options.
///
/// ```rust,no_run
/// use tsu::{App, LinkOptions, ParamsPolicy, Router};
///
/// let app = App::new(Router::new())
///     .trust_proxy(true)
///     .link_options(LinkOptions::new().params(ParamsPolicy::allow_list(["lang"])));
/// # let _ = app;
/// ```
pub struct App {
    router: Router,
    resolver: ProxyResolver,
    links: Arc<LinkOptions>,
}

impl App {
    /// Proxy headers untrusted, default link options.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            resolver: ProxyResolver::default(),
            links: Arc::new(LinkOptions::default()),
        }
    }

    /// Honour `X-Forwarded-Host`, `X-Forwarded-Path` and `X-Forwarded-Proto`.
    ///
    /// Enable only when every request reaches the service through a proxy
    /// that overwrites these headers.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.resolver = ProxyResolver::new(trust);
        self
    }

    /// Base options for every `link_to` call; per-call options layer on top.
    pub fn link_options(mut self, opts: LinkOptions) -> Self {
        self.links = Arc::new(opts);
        self
    }

    /// Routes and answers one request, without a socket.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();

        let Some(matched) = self.router.lookup(&parts.method, parts.uri.path()) else {
            return Response::status(StatusCode::NOT_FOUND).into_http();
        };

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(path = parts.uri.path(), "failed to read request body: {e}");
                return Response::status(StatusCode::BAD_REQUEST).into_http();
            }
        };

        let mut headers = parts.headers;
        // HTTP/2 carries the host in the :authority pseudo-header.
        if !headers.contains_key(HOST) {
            if let Some(value) = parts.uri.authority().and_then(|a| HeaderValue::from_str(a.as_str()).ok()) {
                headers.insert(HOST, value);
            }
        }

        let scheme = parts.uri.scheme_str().unwrap_or("http");
        let protocol = self.resolver.protocol(&headers, scheme);
        let original_path = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
        let ctx = self.resolver.resolve(&headers, protocol, &matched.base, original_path);

        let req = Request {
            method: parts.method,
            uri: parts.uri,
            headers,
            body,
            params: matched.params,
            links: LinkBuilder::new(ctx, Arc::clone(&self.links)),
        };
        matched.handler.call(req).await.into_http()
    }
}

impl From<Router> for App {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("resolver", &self.resolver)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}
