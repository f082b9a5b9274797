//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Routers compose with
//! [`Router::nest`]; the mount prefix a route was registered under is its
//! *route base*, which anchors [`AbsoluteMode::Route`](crate::AbsoluteMode::Route)
//! links.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

struct Route {
    method: Method,
    path: String,
    base: String,
    handler: BoxedHandler,
}

/// A matched route: its handler, mount prefix, and path parameters.
pub(crate) struct Matched {
    pub handler: BoxedHandler,
    pub base: String,
    pub params: HashMap<String, String>,
}

/// The application router.
///
/// Build it once at startup; hand it to [`App::new`](crate::App::new) or
/// straight to [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: Vec<Arc<Route>>,
    trees: HashMap<Method, MatchitRouter<Arc<Route>>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new(), trees: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path.to_owned(), String::new(), handler.into_boxed_handler())
    }

    /// Mount every route of `child` under `prefix`.
    ///
    /// ```rust,no_run
    /// # use tsu::{Method, Request, Router};
    /// # async fn show(_: Request) -> &'static str { "" }
    /// let api = Router::new().on(Method::GET, "/items/{id}", show);
    /// // GET /routebase/items/7 → show, with route base "/routebase"
    /// let app = Router::new().nest("/routebase", api);
    /// ```
    pub fn nest(mut self, prefix: &str, child: Router) -> Self {
        let prefix = normalize_prefix(prefix);
        for route in child.routes {
            let path = format!("{prefix}{}", route.path);
            let base = format!("{prefix}{}", route.base);
            self = self.add(route.method.clone(), path, base, Arc::clone(&route.handler));
        }
        self
    }

    fn add(mut self, method: Method, path: String, base: String, handler: BoxedHandler) -> Self {
        let route = Arc::new(Route { method: method.clone(), path, base, handler });
        self.trees
            .entry(method)
            .or_default()
            .insert(route.path.clone(), Arc::clone(&route))
            .unwrap_or_else(|e| panic!("invalid route `{}`: {e}", route.path));
        self.routes.push(route);
        self
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<Matched> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some(Matched {
            handler: Arc::clone(&matched.value.handler),
            base: matched.value.base.clone(),
            params,
        })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// `"/api/"` → `"/api"`, `"api"` → `"/api"`, `"/"` → `""`.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Request;

    async fn noop(_: Request) -> &'static str { "" }

    #[test]
    fn top_level_routes_have_no_base() {
        let router = Router::new().on(Method::GET, "/foo/bar/baz", noop);
        let m = router.lookup(&Method::GET, "/foo/bar/baz").unwrap();
        assert_eq!(m.base, "");
        assert!(router.lookup(&Method::POST, "/foo/bar/baz").is_none());
    }

    #[test]
    fn nested_routes_record_accumulated_base() {
        let inner = Router::new().on(Method::GET, "/items/{id}", noop);
        let middle = Router::new().nest("v1/", inner);
        let router = Router::new()
            .on(Method::GET, "/", noop)
            .nest("/api", middle);

        let m = router.lookup(&Method::GET, "/api/v1/items/7").unwrap();
        assert_eq!(m.base, "/api/v1");
        assert_eq!(m.params.get("id").map(String::as_str), Some("7"));
        assert!(router.lookup(&Method::GET, "/items/7").is_none());
    }

    #[test]
    fn nesting_at_root_keeps_paths() {
        let router = Router::new().nest("/", Router::new().on(Method::GET, "/x", noop));
        assert_eq!(router.lookup(&Method::GET, "/x").unwrap().base, "");
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .on(Method::GET, "/x", noop)
            .on(Method::GET, "/x", noop);
    }
}
