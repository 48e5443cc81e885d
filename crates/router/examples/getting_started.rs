use http::{Method, Request};
use micro_route::{Context, Router, empty_body, handler_fn};

async fn hello(_ctx: Context) -> &'static str {
    "hello world"
}

async fn show_user(ctx: Context) -> String {
    format!("user {}", ctx.param("id").unwrap())
}

// A wildcard route delegating its suffix to a nested router: the `id`
// capture travels along as an ambient value.
async fn user_section(ctx: Context) -> micro_route::RouterBuilder {
    ctx.next().path(
        "/posts",
        handler_fn(|ctx: Context| async move { format!("posts of user {}", ctx.param("id").unwrap()) }),
    )
}

async fn default_handler(_ctx: Context) -> &'static str {
    "404 not found"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let router = Router::builder()
        .get("/", handler_fn(hello))
        .get("/users/:id", handler_fn(show_user))
        .get("/users/:id/*", handler_fn(user_section))
        .default(handler_fn(default_handler))
        .build()
        .unwrap();

    for path in ["/", "/users/7", "/users/7/posts", "/missing"] {
        let request = Request::builder().method(Method::GET).uri(path).body(empty_body()).unwrap();
        let response = router.handle(request).await;
        println!("GET {path} -> {}", response.status());
    }
}
