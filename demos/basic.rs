//! Minimal tsu example — proxy-aware redirects and links.
//!
//! Run with:
//!   RUST_LOG=debug TRUST_PROXY=1 LINK_PARAMS=allow:lang cargo run --example basic
//!
//! Try, pretending to be nginx mounting the app under /nginx/frontend:
//!   curl -i http://localhost:3000/shop/items?lang=de \
//!        -H 'x-forwarded-host: example.com' \
//!        -H 'x-forwarded-path: /nginx/frontend' \
//!        -H 'x-forwarded-proto: https'
//!   curl -i -X POST http://localhost:3000/shop/items

use tsu::{
    AbsoluteMode, App, Error, LinkOptions, Method, ParamsPolicy, Request, Response, Router,
    Server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    // Misconfigured modes and policies fail here, at startup.
    let mut links = LinkOptions::new();
    if let Ok(mode) = std::env::var("LINK_ABSOLUTE") {
        links = links.absolute(mode.parse::<AbsoluteMode>()?);
    }
    if let Ok(policy) = std::env::var("LINK_PARAMS") {
        links = links.params(policy.parse::<ParamsPolicy>()?);
    }
    let trust = std::env::var("TRUST_PROXY").is_ok_and(|v| v == "1" || v == "true");

    let shop = Router::new()
        .on(Method::GET,  "/items",      list_items)
        .on(Method::GET,  "/items/{id}", show_item)
        .on(Method::POST, "/items",      create_item);

    let app = App::new(Router::new().nest("/shop", shop))
        .trust_proxy(trust)
        .link_options(links);

    Server::bind("0.0.0.0:3000").serve(app).await
}

// GET /shop/items — hypermedia links, relative and root-relative.
async fn list_items(req: Request) -> Result<Response, Error> {
    let route_root = LinkOptions::new().absolute(AbsoluteMode::Route);
    let body = format!(
        r#"{{"self":"{}","first":"{}","home":"{}","next":"{}"}}"#,
        req.link_to("items")?,
        req.link_to("items/1")?,
        req.link_to_with("/", &route_root)?,
        req.link_to("items?page=2")?,
    );
    Ok(Response::json(body.into_bytes()))
}

// GET /shop/items/{id}
async fn show_item(req: Request) -> Result<Response, Error> {
    let id = req.param("id").unwrap_or("unknown");
    let back = req.link_to("../items")?;
    Ok(Response::json(format!(r#"{{"id":"{id}","collection":"{back}"}}"#).into_bytes()))
}

// POST /shop/items → 303 to the new item, valid on the client's side of the proxy.
async fn create_item(req: Request) -> Result<Response, Error> {
    Ok(Response::see_other(&req.link_to("items/99")?))
}
