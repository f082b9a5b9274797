//! Absolute link building.
//!
//! # Resolution steps
//!
//! ```text
//! "/base"          root-relative → prefixed per AbsoluteMode
//! "params?a=A"     query split off → explicit parameters
//!                  incoming query  → propagated parameters (ParamsPolicy)
//!                  merge, explicit wins
//! resolve against  protocol://host + proxy base + original path   (RFC 3986)
//! append merged query, form-encoded
//! ```
//!
//! Relative targets (`"quux"`, `"../back"`) are resolved the way a browser
//! would resolve them from the page the client actually requested, so they
//! pick up the proxy base automatically.

use std::sync::Arc;

use tracing::debug;

use crate::context::{RequestContext, parse_query};
use crate::error::Error;
use crate::options::LinkOptions;

/// A `link_to` bound to one request.
///
/// Cloning is cheap: both the context and the base options are shared.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    ctx: Arc<RequestContext>,
    base: Arc<LinkOptions>,
}

impl LinkBuilder {
    pub fn new(ctx: impl Into<Arc<RequestContext>>, base: impl Into<Arc<LinkOptions>>) -> Self {
        Self { ctx: ctx.into(), base: base.into() }
    }

    pub fn context(&self) -> &RequestContext { &self.ctx }

    /// Builds an absolute URL for `path` using the base options.
    pub fn link_to(&self, path: &str) -> Result<String, Error> {
        link_to(&self.ctx, &self.base, path, None)
    }

    /// Like [`link_to`](Self::link_to), with `opts` layered over the base options.
    pub fn link_to_with(&self, path: &str, opts: &LinkOptions) -> Result<String, Error> {
        link_to(&self.ctx, &self.base, path, Some(opts))
    }
}

/// Builds an absolute URL for `path` as seen by the client of `ctx`.
///
/// Pure: neither `ctx` nor `base` is modified, so it may be called any
/// number of times per request.
///
/// `path` is a URI reference resolved per RFC 3986. A target starting with
/// `//` (after any prefix) is a network-path reference and replaces the host:
/// with an empty prefix, `"//other.example/x"` yields `http://other.example/x`.
/// Do not pass client-supplied input as `path` when building redirects.
pub fn link_to(
    ctx: &RequestContext,
    base: &LinkOptions,
    path: &str,
    call: Option<&LinkOptions>,
) -> Result<String, Error> {
    let opts = base.effective(call);

    let target = if path.starts_with('/') {
        format!("{}{path}", opts.absolute.prefix(ctx))
    } else {
        path.to_owned()
    };

    let (target, fragment) = match target.split_once('#') {
        Some((t, f)) => (t, Some(f)),
        None => (target.as_str(), None),
    };
    let (target, explicit) = match target.split_once('?') {
        Some((t, q)) => (t, parse_query(q)),
        None => (target, Default::default()),
    };

    let mut query = opts.params.select(ctx.query_params());
    query.extend(explicit);

    let href = ctx.current_href()?;
    let mut url = href
        .join(target)
        .map_err(|e| Error::resolution(href.as_str(), target, e))?;
    url.set_query(None);
    url.set_fragment(fragment);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(&query);
    }

    debug!(path, absolute = %opts.absolute, link = %url, "built link");
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderName, HeaderValue};

    use super::*;
    use crate::context::ProxyResolver;
    use crate::options::AbsoluteMode;
    use crate::params::ParamsPolicy;

    fn ctx(
        proto: &str,
        headers: &[(&str, &str)],
        route_base: &str,
        original_path: &str,
    ) -> RequestContext {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        ProxyResolver::new(true).resolve(&map, proto, route_base, original_path)
    }

    fn plain(original_path: &str) -> LinkBuilder {
        LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", original_path),
            LinkOptions::new(),
        )
    }

    #[test]
    fn relative_targets_resolve_as_siblings() {
        let links = plain("/foo/bar/baz?one=1");
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/foo/bar/quux");
        assert_eq!(links.link_to("there").unwrap(), "http://example.com/foo/bar/there");
        assert_eq!(links.link_to("../back").unwrap(), "http://example.com/foo/back");
        assert_eq!(links.link_to("./same").unwrap(), "http://example.com/foo/bar/same");
    }

    #[test]
    fn root_relative_target_replaces_path() {
        let links = plain("/foo/bar/baz?one=1");
        assert_eq!(links.link_to("/base").unwrap(), "http://example.com/base");
    }

    #[test]
    fn explicit_query_is_kept_without_propagation() {
        let links = plain("/foo/bar/baz?one=1");
        assert_eq!(
            links.link_to("params?a=A&b=B").unwrap(),
            "http://example.com/foo/bar/params?a=A&b=B"
        );
    }

    #[test]
    fn relative_target_from_root_path() {
        let links = plain("/");
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/quux");
        assert_eq!(links.link_to("../quux").unwrap(), "http://example.com/quux");

        let links = plain("/foo/bar/");
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/foo/bar/quux");
    }

    #[test]
    fn proxy_base_prefixes_root_and_relative_targets() {
        let links = LinkBuilder::new(
            ctx("https", &[("host", "example.com"), ("x-forwarded-path", "/basepath")], "", "/foo/bar/baz"),
            LinkOptions::new(),
        );
        assert_eq!(links.link_to("/base").unwrap(), "https://example.com/basepath/base");
        assert_eq!(links.link_to("quux").unwrap(), "https://example.com/basepath/foo/bar/quux");
    }

    #[test]
    fn absolute_modes_choose_the_prefix() {
        let c = ctx(
            "http",
            &[("host", "example.com"), ("x-forwarded-path", "/nginx/frontend")],
            "/routebase",
            "/routebase/foo/bar",
        );
        let links = LinkBuilder::new(c, LinkOptions::new());
        let with = |mode| links.link_to_with("/base", &LinkOptions::new().absolute(mode)).unwrap();

        assert_eq!(with(AbsoluteMode::Host), "http://example.com/base");
        assert_eq!(with(AbsoluteMode::Proxy), "http://example.com/nginx/frontend/base");
        assert_eq!(with(AbsoluteMode::Route), "http://example.com/nginx/frontend/routebase/base");
        assert_eq!(links.link_to("/base").unwrap(), "http://example.com/nginx/frontend/base");
    }

    #[test]
    fn mode_does_not_affect_relative_targets() {
        let c = ctx("http", &[("host", "example.com")], "/routebase", "/routebase/foo/bar");
        let links = LinkBuilder::new(c, LinkOptions::new().absolute(AbsoluteMode::Host));
        assert_eq!(links.link_to("../back").unwrap(), "http://example.com/routebase/back");
    }

    #[test]
    fn allow_list_propagates_only_listed_present_keys() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/foo/bar/baz?a=Ape&c=Cheetah"),
            LinkOptions::new().params(ParamsPolicy::allow_list(["c", "missing"])),
        );
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/foo/bar/quux?c=Cheetah");
        assert_eq!(
            links.link_to("params?a=A&b=B").unwrap(),
            "http://example.com/foo/bar/params?a=A&b=B&c=Cheetah"
        );
    }

    #[test]
    fn explicit_parameters_win_over_propagated() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/foo/bar/baz?a=Ape&c=Cheetah"),
            LinkOptions::new().params(ParamsPolicy::All),
        );
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/foo/bar/quux?a=Ape&c=Cheetah");
        assert_eq!(
            links.link_to("params?a=A&b=B&a=Again").unwrap(),
            "http://example.com/foo/bar/params?a=Again&b=B&c=Cheetah"
        );
    }

    #[test]
    fn predicate_filters_propagated_keys() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/foo/bar/baz?a=Ape&keepC=Cheetah&d=Duck"),
            LinkOptions::new().params(ParamsPolicy::predicate(|k, _| k.starts_with("keep"))),
        );
        assert_eq!(links.link_to("quux").unwrap(), "http://example.com/foo/bar/quux?keepC=Cheetah");
    }

    #[test]
    fn call_options_override_without_touching_base() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/foo?one=1"),
            LinkOptions::new().params(ParamsPolicy::All),
        );
        let none = LinkOptions::new().params(ParamsPolicy::None);
        assert_eq!(links.link_to_with("bar", &none).unwrap(), "http://example.com/bar");
        assert_eq!(links.link_to("bar").unwrap(), "http://example.com/bar?one=1");
    }

    #[test]
    fn values_are_form_encoded() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/search?q=two+words&x=%26"),
            LinkOptions::new().params(ParamsPolicy::All),
        );
        assert_eq!(
            links.link_to("results").unwrap(),
            "http://example.com/results?q=two+words&x=%26"
        );
    }

    #[test]
    fn fragment_follows_merged_query() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/doc?v=2"),
            LinkOptions::new().params(ParamsPolicy::All),
        );
        assert_eq!(links.link_to("page#top").unwrap(), "http://example.com/page?v=2#top");
    }

    #[test]
    fn empty_target_is_the_current_page_without_its_query() {
        let links = plain("/foo/bar?one=1");
        assert_eq!(links.link_to("").unwrap(), "http://example.com/foo/bar");
    }

    #[test]
    fn proxy_base_cannot_move_the_host() {
        for base in ["basepath", "@evil.com", ".evil.com"] {
            let links = LinkBuilder::new(
                ctx("http", &[("host", "example.com"), ("x-forwarded-path", base)], "", "/foo/bar"),
                LinkOptions::new(),
            );
            let host_mode = LinkOptions::new().absolute(AbsoluteMode::Host);
            assert!(
                matches!(links.link_to("quux"), Err(Error::UrlResolution { .. })),
                "relative link under proxy base {base:?}",
            );
            assert!(
                matches!(links.link_to_with("/base", &host_mode), Err(Error::UrlResolution { .. })),
                "host-mode link under proxy base {base:?}",
            );
        }
    }

    #[test]
    fn double_slash_target_is_a_network_path_reference() {
        let links = LinkBuilder::new(
            ctx("http", &[("host", "example.com")], "", "/foo"),
            LinkOptions::new().absolute(AbsoluteMode::Host),
        );
        assert_eq!(links.link_to("//other.example/x").unwrap(), "http://other.example/x");
    }

    #[test]
    fn missing_host_is_a_resolution_error() {
        let links = LinkBuilder::new(ctx("http", &[], "", "/foo"), LinkOptions::new());
        assert!(matches!(links.link_to("bar"), Err(Error::UrlResolution { .. })));
    }
}
