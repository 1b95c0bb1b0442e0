//! Minimal waymark example: register a CRUD-style route table, resolve a
//! few requests, then print the conflict report and lookup stats.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic

use std::collections::HashMap;

use waymark::{Conflict, ConstraintKind, Method, Route, Router, RouterConfig};

// Handlers are whatever the host framework uses. Here, plain fn pointers
// over the extracted path parameters.
type Handler = fn(&HashMap<String, String>) -> String;

const CONFIG: &str = r#"
cache_size = 256
optimize_priorities = true
"#;

fn main() -> Result<(), waymark::Error> {
    tracing_subscriber::fmt::init();

    let config = RouterConfig::from_toml_str(CONFIG)?;
    let mut router: Router<Handler> = Router::with_config(config);

    router.add_route(route(Method::Get, "/users/{id:number}", get_user).with_name("users.show"))?;
    router.add_route(route(Method::Get, "/users/create", user_form))?;
    router.add_route(route(Method::Post, "/users", create_user).with_middleware("auth"))?;
    router.add_route(
        route(Method::Get, "/posts/{slug}", get_post)
            .with_constraint("slug", ConstraintKind::Slug)
            .with_name("posts.show"),
    )?;
    router.add_route(route(Method::Get, "/assets/{*path}", asset))?;
    // Shadowed by the numeric route above for digits; reported below.
    router.add_route(route(Method::Get, "/users/{name}", get_user))?;

    let requests = [
        (Method::Get, "/users/42"),
        (Method::Get, "/users/create"),
        (Method::Get, "/users/alice"),
        (Method::Post, "/users"),
        (Method::Get, "/posts/hello-world"),
        (Method::Get, "/posts/Hello_World"),
        (Method::Get, "/assets/css/site.css"),
        (Method::Get, "/users/42"),
    ];

    for (method, path) in requests {
        match router.match_route(method, path) {
            Some(found) => {
                let handler = found.handler();
                let middleware = found.route().middleware().join(",");
                println!("{method:<6} {path:<24} → {} [{middleware}]", handler(found.params()));
            }
            None => println!("{method:<6} {path:<24} → 404"),
        }
    }

    println!();
    println!("routes (most specific first):");
    for route in router.compiled_routes() {
        println!("  {:<6} {:<22} score={} priority={}", route.method(), route.path(), route.static_score(), route.priority());
    }

    let report: Vec<_> = router.route_conflicts().iter().map(Conflict::summary).collect();
    println!();
    println!("conflicts: {}", serde_json::to_string_pretty(&report).unwrap_or_default());
    println!("stats: {}", serde_json::to_string_pretty(&router.stats()).unwrap_or_default());
    println!("cache: {}", serde_json::to_string_pretty(&router.cache_stats()).unwrap_or_default());

    if let Some(url) = router.url_for_params("posts.show", &[("slug", "release-notes")]) {
        println!("posts.show → {url}");
    }
    Ok(())
}

fn route(method: Method, path: &str, handler: Handler) -> Route<Handler> {
    Route::new(method, path, handler)
}

fn get_user(params: &HashMap<String, String>) -> String {
    match (params.get("id"), params.get("name")) {
        (Some(id), _) => format!("user #{id}"),
        (_, Some(name)) => format!("user {name}"),
        _ => "user ?".to_owned(),
    }
}

fn user_form(_: &HashMap<String, String>) -> String {
    "new user form".to_owned()
}

fn create_user(_: &HashMap<String, String>) -> String {
    "created".to_owned()
}

fn get_post(params: &HashMap<String, String>) -> String {
    format!("post {}", params["slug"])
}

fn asset(params: &HashMap<String, String>) -> String {
    format!("file {}", params["path"])
}
