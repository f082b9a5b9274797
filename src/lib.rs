//! # tsu
//!
//! A minimal HTTP framework for services behind a reverse proxy, built
//! around one question: *what URL does the client need to see?*
//!
//! ## The problem
//!
//! nginx serves your app at `https://example.com/nginx/frontend/`, but the
//! app itself sees `http://10.0.0.5:3000/`. A redirect to `/items` sends the
//! client out of the proxy's mount; a redirect built from the local host
//! sends it to an address it cannot reach.
//!
//! ## The contract
//!
//! With [`App::trust_proxy`] on, the proxy tells the app how it is mounted:
//!
//! | Header | Meaning |
//! |---|---|
//! | `X-Forwarded-Host` | host the client connected to |
//! | `X-Forwarded-Path` | path prefix the proxy mounts the app under |
//! | `X-Forwarded-Proto` | scheme the client used |
//!
//! and [`Request::link_to`] turns any target into the absolute URL the client
//! needs:
//!
//! | target | resolves like |
//! |---|---|
//! | `"quux"`, `"../back"` | a browser link on the current page |
//! | `"/base"` | root-relative, anchored per [`AbsoluteMode`] |
//! | `"params?a=A"` | with an explicit query, merged over propagated ones ([`ParamsPolicy`]) |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu::{App, Error, LinkOptions, Method, ParamsPolicy, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let items = Router::new().on(Method::POST, "/items", create_item);
//!
//!     let app = App::new(Router::new().nest("/shop", items))
//!         .trust_proxy(true)
//!         .link_options(LinkOptions::new().params(ParamsPolicy::allow_list(["lang"])));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn create_item(req: Request) -> Result<Response, Error> {
//!     // https://example.com/nginx/frontend/shop/items/99?lang=de
//!     Ok(Response::see_other(&req.link_to("items/99")?))
//! }
//! ```

mod app;
mod context;
mod error;
mod handler;
mod link;
mod options;
mod params;
mod request;
mod response;
mod router;
mod server;

pub use app::App;
pub use context::{ProxyResolver, RequestContext, X_FORWARDED_HOST, X_FORWARDED_PATH, X_FORWARDED_PROTO};
pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use link::{LinkBuilder, link_to};
pub use options::{AbsoluteMode, LinkOptions};
pub use params::ParamsPolicy;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
