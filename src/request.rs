//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

use crate::context::RequestContext;
use crate::error::Error;
use crate::link::LinkBuilder;
use crate::options::LinkOptions;

/// An incoming HTTP request with its body fully read.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) links: LinkBuilder,
}

impl Request {
    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a decoded query parameter (last value wins).
    pub fn query(&self, key: &str) -> Option<&str> {
        self.links.context().query_params().get(key).map(String::as_str)
    }

    /// Origin, proxy base and route base of this request as the client sees them.
    pub fn context(&self) -> &RequestContext {
        self.links.context()
    }

    /// The link builder bound to this request.
    pub fn links(&self) -> &LinkBuilder { &self.links }

    /// Absolute URL for `path`, valid from the client's side of the proxy.
    ///
    /// ```rust,no_run
    /// # use tsu::{Error, Request, Response};
    /// async fn create(req: Request) -> Result<Response, Error> {
    ///     // relative to the current page, root-relative, or with a query
    ///     let next = req.link_to("../items?page=2")?;
    ///     Ok(Response::see_other(&next))
    /// }
    /// ```
    pub fn link_to(&self, path: &str) -> Result<String, Error> {
        self.links.link_to(path)
    }

    /// [`link_to`](Self::link_to) with per-call options over the app's base options.
    pub fn link_to_with(&self, path: &str, opts: &LinkOptions) -> Result<String, Error> {
        self.links.link_to_with(path, opts)
    }
}
