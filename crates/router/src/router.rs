//! The route table and dispatcher.
//!
//! A [`RouterBuilder`] is the mutable registration-time half; [`build`]
//! compiles every pattern eagerly and produces the immutable serving-time
//! [`Router`]. Registration order is the sole precedence rule: the
//! dispatcher walks static entries first (read methods only), then the
//! dynamic table in order, and the first structurally matching entry wins.
//!
//! [`build`]: RouterBuilder::build

use crate::body::{OptionReqBody, ReqBody, ResponseBody};
use crate::context::Context;
use crate::error::{BoxError, RouterBuildError};
use crate::handler::Handler;
use crate::respond::{failure_response, not_found, respond};
use crate::statics::{FileResolver, StaticDir};
use crate::ws::{Upgrader, wants_websocket};
use http::request::Parts;
use http::{Method, Request, Response};
use micro_match::Pattern;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error};

/// Protocol kind of a route entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain request/response.
    Plain,
    /// WebSocket upgrade; requires the upgrade signature to match at all.
    Socket,
    /// Server-sent events.
    Sse,
}

struct Route {
    method: Option<Method>,
    protocol: Protocol,
    pattern: Option<Pattern>,
    handler: Arc<dyn Handler>,
}

struct StaticRoute {
    pattern: Pattern,
    resolver: Arc<dyn FileResolver>,
}

/// The immutable, serving-time router.
///
/// Tables are fixed once built; dispatch only reads them, so a single
/// instance serves any number of concurrent requests.
pub struct Router {
    routes: Vec<Route>,
    statics: Vec<StaticRoute>,
    default_handler: Option<Arc<dyn Handler>>,
    catcher: Option<Arc<dyn Handler>>,
    upgrader: Option<Arc<dyn Upgrader>>,
    ambient: HashMap<String, String>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The single entry point: routes one request to a response.
    ///
    /// Never fails; per-request errors become responses at the boundary
    /// where they occur.
    pub async fn handle(&self, request: Request<ReqBody>) -> Response<ResponseBody> {
        let (parts, body) = request.into_parts();
        let segments = micro_match::segments(parts.uri.path());
        self.dispatch(Arc::new(parts), OptionReqBody::from(body), segments).await
    }

    /// One dispatch pass over `parts`. Boxed because nested-router
    /// delegation recurses through here with the parent's remainder.
    pub(crate) fn dispatch<'a>(
        &'a self,
        request: Arc<Parts>,
        body: OptionReqBody,
        parts: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Response<ResponseBody>> + Send + 'a>> {
        Box::pin(async move {
            if request.method == Method::GET || request.method == Method::HEAD {
                for entry in &self.statics {
                    let Some(captures) = entry.pattern.matches(&parts) else {
                        continue;
                    };
                    if captures.remainder().is_empty() {
                        continue;
                    }
                    if let Some(response) = entry.resolver.resolve(captures.remainder(), &request).await {
                        return response;
                    }
                }
            }

            for route in &self.routes {
                if let Some(method) = &route.method {
                    if *method != request.method {
                        continue;
                    }
                }

                let (values, remainder) = match &route.pattern {
                    Some(pattern) => match pattern.matches(&parts) {
                        Some(captures) => captures.into_parts(),
                        None => continue,
                    },
                    None => (Vec::new(), parts.clone()),
                };

                if route.protocol == Protocol::Socket && !wants_websocket(&request) {
                    continue;
                }

                let mut params = self.ambient.clone();
                params.extend(values);
                let ctx = Context::new(Arc::clone(&request), body.clone(), params, remainder, route.protocol);

                if route.protocol == Protocol::Socket {
                    let upgrader = self.upgrader.as_ref().expect("socket route built without upgrader");
                    match upgrader.upgrade(&request) {
                        Ok(upgrade) => ctx.attach_upgrade(upgrade.socket, upgrade.response),
                        Err(e) => return self.fail(ctx, e).await,
                    }
                }

                return self.guard(route.handler.as_ref(), ctx).await;
            }

            if let Some(default_handler) = &self.default_handler {
                let ctx =
                    Context::new(Arc::clone(&request), body.clone(), self.ambient.clone(), parts, Protocol::Plain);
                return self.guard(default_handler.as_ref(), ctx).await;
            }

            debug!("no route matched {} {}", request.method, request.uri.path());
            not_found()
        })
    }

    /// The error boundary around one handler invocation.
    async fn guard(&self, handler: &dyn Handler, ctx: Context) -> Response<ResponseBody> {
        match handler.invoke(ctx.clone()).await {
            Ok(outcome) => respond(ctx, outcome).await,
            Err(err) => self.fail(ctx, err).await,
        }
    }

    /// Routes a failure through the registered error handler, at most
    /// once. A failing error handler is terminal.
    async fn fail(&self, ctx: Context, err: BoxError) -> Response<ResponseBody> {
        let Some(catcher) = &self.catcher else {
            return failure_response(&err);
        };

        let ctx = ctx.with_error(err);
        match catcher.invoke(ctx.clone()).await {
            Ok(outcome) => respond(ctx, outcome).await,
            Err(second) => {
                error!(cause = %second, "error handler failed");
                failure_response(&second)
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("statics", &self.statics.len())
            .field("ambient", &self.ambient)
            .finish_non_exhaustive()
    }
}

struct RouteDef {
    method: Option<Method>,
    protocol: Protocol,
    pattern: Option<String>,
    handler: Arc<dyn Handler>,
}

struct StaticDef {
    pattern: String,
    resolver: Arc<dyn FileResolver>,
}

/// Registration-time router under construction.
pub struct RouterBuilder {
    routes: Vec<RouteDef>,
    statics: Vec<StaticDef>,
    default_handler: Option<Arc<dyn Handler>>,
    catcher: Option<Arc<dyn Handler>>,
    upgrader: Option<Arc<dyn Upgrader>>,
    ambient: HashMap<String, String>,
}

macro_rules! method_route {
    ($with_pattern:ident, $any:ident, $method:ident) => {
        pub fn $with_pattern<H: Handler + 'static>(self, pattern: impl Into<String>, handler: H) -> Self {
            self.push(Some(Method::$method), Protocol::Plain, Some(pattern.into()), handler)
        }

        pub fn $any<H: Handler + 'static>(self, handler: H) -> Self {
            self.push(Some(Method::$method), Protocol::Plain, None, handler)
        }
    };
}

impl RouterBuilder {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            statics: Vec::new(),
            default_handler: None,
            catcher: None,
            upgrader: None,
            ambient: HashMap::new(),
        }
    }

    fn push<H: Handler + 'static>(
        mut self,
        method: Option<Method>,
        protocol: Protocol,
        pattern: Option<String>,
        handler: H,
    ) -> Self {
        self.routes.push(RouteDef { method, protocol, pattern, handler: Arc::new(handler) });
        self
    }

    method_route!(get, get_any, GET);
    method_route!(post, post_any, POST);
    method_route!(put, put_any, PUT);
    method_route!(delete, delete_any, DELETE);

    /// Registers a handler for any method on `pattern`.
    pub fn path<H: Handler + 'static>(self, pattern: impl Into<String>, handler: H) -> Self {
        self.push(None, Protocol::Plain, Some(pattern.into()), handler)
    }

    /// Registers a WebSocket route. Requires an [`upgrader`](Self::upgrader)
    /// before `build()`.
    pub fn socket<H: Handler + 'static>(self, pattern: impl Into<String>, handler: H) -> Self {
        self.push(None, Protocol::Socket, Some(pattern.into()), handler)
    }

    /// Registers a server-sent-events route.
    pub fn sse<H: Handler + 'static>(self, pattern: impl Into<String>, handler: H) -> Self {
        self.push(None, Protocol::Sse, Some(pattern.into()), handler)
    }

    /// Registers the handler invoked when no route matches, with the full
    /// request path as remainder.
    pub fn default<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.default_handler = Some(Arc::new(handler));
        self
    }

    /// Registers the error handler failures are routed through, once.
    pub fn catch<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.catcher = Some(Arc::new(handler));
        self
    }

    /// Serves files below `root` for paths matching `pattern`; the pattern
    /// needs a trailing wildcard, since the remainder is the relative file
    /// path.
    pub fn files(self, pattern: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.files_with(pattern, StaticDir::new(root))
    }

    /// Like [`files`](Self::files) with a custom resolver.
    pub fn files_with<R: FileResolver + 'static>(mut self, pattern: impl Into<String>, resolver: R) -> Self {
        self.statics.push(StaticDef { pattern: pattern.into(), resolver: Arc::new(resolver) });
        self
    }

    /// Sets the upgrade collaborator socket routes hand the handshake to.
    pub fn upgrader<U: Upgrader + 'static>(mut self, upgrader: U) -> Self {
        self.upgrader = Some(Arc::new(upgrader));
        self
    }

    /// Adds one ambient value, visible to every handler on this router and
    /// threaded into nested routers via `next`.
    pub fn ambient(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ambient.insert(key.into(), value.into());
        self
    }

    pub(crate) fn ambient_all(mut self, params: HashMap<String, String>) -> Self {
        self.ambient.extend(params);
        self
    }

    /// Compiles every pattern and produces the immutable router.
    pub fn build(self) -> Result<Router, RouterBuildError> {
        let mut routes = Vec::with_capacity(self.routes.len());
        for def in self.routes {
            if def.protocol == Protocol::Socket && self.upgrader.is_none() {
                return Err(RouterBuildError::missing_upgrader(def.pattern.as_deref().unwrap_or("*")));
            }

            let pattern = match &def.pattern {
                Some(raw) => {
                    Some(Pattern::parse(raw).map_err(|e| RouterBuildError::invalid_pattern(raw, e))?)
                }
                None => None,
            };
            routes.push(Route { method: def.method, protocol: def.protocol, pattern, handler: def.handler });
        }

        let mut statics = Vec::with_capacity(self.statics.len());
        for def in self.statics {
            let pattern = Pattern::parse(&def.pattern)
                .map_err(|e| RouterBuildError::invalid_pattern(&def.pattern, e))?;
            statics.push(StaticRoute { pattern, resolver: def.resolver });
        }

        Ok(Router {
            routes,
            statics,
            default_handler: self.default_handler,
            catcher: self.catcher,
            upgrader: self.upgrader,
            ambient: self.ambient,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::body::{ResponseBody, empty_body};
    use crate::context::Context;
    use crate::error::{BoxError, RouterBuildError};
    use crate::handler::handler_fn;
    use crate::outcome::Outcome;
    use crate::router::Router;
    use crate::statics::FileResolver;
    use crate::ws::{SocketIo, SocketMessage, Upgrade, Upgrader, WebSocket};
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::request::Parts;
    use http::{Method, Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use mockall::mock;

    fn request(method: Method, path: &str) -> Request<crate::body::ReqBody> {
        Request::builder().method(method).uri(path).body(empty_body()).unwrap()
    }

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn greet(_ctx: Context) -> &'static str {
        "greetings"
    }

    #[tokio::test]
    async fn slash_placement_does_not_change_matching() {
        for pattern in ["hello/world", "/hello/world/", "hello//world"] {
            let router = Router::builder().get(pattern, handler_fn(greet)).build().unwrap();
            let response = router.handle(request(Method::GET, "/hello/world")).await;
            assert_eq!(response.status(), StatusCode::OK, "pattern {pattern:?}");
        }
    }

    #[tokio::test]
    async fn captures_reach_the_handler() {
        let router = Router::builder()
            .get("/:name", handler_fn(|ctx: Context| async move { ctx.param("name").unwrap().to_string() }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/Alice")).await;
        assert_eq!(body_text(response).await, "Alice");
    }

    #[tokio::test]
    async fn wildcard_remainder_reaches_the_handler() {
        let router = Router::builder()
            .get("/files/*", handler_fn(|ctx: Context| async move { ctx.remainder().join("/") }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/files/a/b/c")).await;
        assert_eq!(body_text(response).await, "a/b/c");
    }

    #[tokio::test]
    async fn methods_route_independently() {
        let router = Router::builder()
            .get("/thing", handler_fn(|_ctx: Context| async { "got" }))
            .post("/thing", handler_fn(|_ctx: Context| async { "posted" }))
            .build()
            .unwrap();

        assert_eq!(body_text(router.handle(request(Method::GET, "/thing")).await).await, "got");
        assert_eq!(body_text(router.handle(request(Method::POST, "/thing")).await).await, "posted");

        let response = router.handle(request(Method::DELETE, "/thing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn first_registered_match_wins() {
        // The capture route is less specific but registered first.
        let router = Router::builder()
            .get("/:x", handler_fn(|_ctx: Context| async { "capture" }))
            .get("/a", handler_fn(|_ctx: Context| async { "literal" }))
            .build()
            .unwrap();

        assert_eq!(body_text(router.handle(request(Method::GET, "/a")).await).await, "capture");
    }

    #[tokio::test]
    async fn nested_router_consumes_the_remainder() {
        let router = Router::builder()
            .get(
                "/users/:id/*",
                handler_fn(|ctx: Context| async move {
                    ctx.next().path(
                        "/posts",
                        handler_fn(|ctx: Context| async move {
                            format!("posts of {}", ctx.param("id").unwrap())
                        }),
                    )
                }),
            )
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/users/7/posts")).await;
        assert_eq!(body_text(response).await, "posts of 7");
    }

    #[tokio::test]
    async fn nested_router_misses_fall_to_404() {
        let router = Router::builder()
            .get(
                "/users/:id/*",
                handler_fn(|ctx: Context| async move {
                    ctx.next().path("/posts", handler_fn(greet))
                }),
            )
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/users/7/albums")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn next_with_extends_ambient_values() {
        let router = Router::builder()
            .ambient("tenant", "acme")
            .get(
                "/projects/:id/*",
                handler_fn(|ctx: Context| async move {
                    ctx.next_with([("stage".to_string(), "beta".to_string())]).path(
                        "/info",
                        handler_fn(|ctx: Context| async move {
                            format!(
                                "{}/{}/{}",
                                ctx.param("tenant").unwrap(),
                                ctx.param("id").unwrap(),
                                ctx.param("stage").unwrap()
                            )
                        }),
                    )
                }),
            )
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/projects/42/info")).await;
        assert_eq!(body_text(response).await, "acme/42/beta");
    }

    #[tokio::test]
    async fn thrown_errors_reach_the_catch_handler() {
        let router = Router::builder()
            .get("/boom", handler_fn(|_ctx: Context| async {
                Err::<String, BoxError>("boom".into())
            }))
            .catch(handler_fn(|ctx: Context| async move {
                format!("caught: {}", ctx.error().unwrap())
            }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/boom")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "caught: boom");
    }

    #[tokio::test]
    async fn errors_without_catch_become_500() {
        let router = Router::builder()
            .get("/boom", handler_fn(|_ctx: Context| async {
                Err::<String, BoxError>("boom".into())
            }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "boom");
    }

    #[tokio::test]
    async fn failing_catch_handler_is_terminal() {
        let router = Router::builder()
            .get("/boom", handler_fn(|_ctx: Context| async {
                Err::<String, BoxError>("first".into())
            }))
            .catch(handler_fn(|_ctx: Context| async {
                Err::<String, BoxError>("second".into())
            }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "second");
    }

    #[tokio::test]
    async fn unmatched_request_is_404() {
        let router = Router::builder().build().unwrap();
        let response = router.handle(request(Method::GET, "/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not Found");
    }

    #[tokio::test]
    async fn default_handler_sees_the_full_path_as_remainder() {
        let router = Router::builder()
            .default(handler_fn(|ctx: Context| async move { ctx.remainder().join(",") }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/a/b")).await;
        assert_eq!(body_text(response).await, "a,b");
    }

    #[tokio::test]
    async fn json_coercion_is_deterministic() {
        let router = Router::builder()
            .get("/data", handler_fn(|_ctx: Context| async {
                Outcome::json(serde_json::json!({"zeta": 1, "alpha": [2, 3]}))
                    .map_err(BoxError::from)
            }))
            .build()
            .unwrap();

        let first = router.handle(request(Method::GET, "/data")).await;
        assert_eq!(first.headers()[http::header::CONTENT_TYPE], "application/json");
        let first = body_text(first).await;
        let second = body_text(router.handle(request(Method::GET, "/data")).await).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn ambient_values_reach_handlers() {
        let router = Router::builder()
            .ambient("region", "eu")
            .get("/where", handler_fn(|ctx: Context| async move { ctx.param("region").unwrap().to_string() }))
            .build()
            .unwrap();

        assert_eq!(body_text(router.handle(request(Method::GET, "/where")).await).await, "eu");
    }

    #[tokio::test]
    async fn text_coercion_is_html() {
        let router = Router::builder().get("/hi", handler_fn(greet)).build().unwrap();
        let response = router.handle(request(Method::GET, "/hi")).await;
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn invalid_pattern_fails_the_build() {
        let result = Router::builder().get("/a/*/b", handler_fn(greet)).build();
        assert!(matches!(result, Err(RouterBuildError::InvalidPattern { .. })));
    }

    // -- static phase ------------------------------------------------------

    struct FixedResolver {
        serves: &'static str,
    }

    #[async_trait]
    impl FileResolver for FixedResolver {
        async fn resolve(&self, remainder: &[String], _request: &Parts) -> Option<Response<ResponseBody>> {
            if remainder.join("/") == self.serves {
                Some(Response::new(ResponseBody::from(Bytes::from(format!("static:{}", self.serves)))))
            } else {
                None
            }
        }
    }

    #[tokio::test]
    async fn static_entries_run_before_dynamic_routes() {
        let router = Router::builder()
            .files_with("/assets/*", FixedResolver { serves: "app.css" })
            .get("/assets/app.css", handler_fn(|_ctx: Context| async { "dynamic" }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/assets/app.css")).await;
        assert_eq!(body_text(response).await, "static:app.css");
    }

    #[tokio::test]
    async fn static_miss_falls_through_to_dynamic_routes() {
        let router = Router::builder()
            .files_with("/assets/*", FixedResolver { serves: "app.css" })
            .get("/assets/other.css", handler_fn(|_ctx: Context| async { "dynamic" }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/assets/other.css")).await;
        assert_eq!(body_text(response).await, "dynamic");
    }

    #[tokio::test]
    async fn static_phase_skips_non_read_methods() {
        let router = Router::builder()
            .files_with("/assets/*", FixedResolver { serves: "app.css" })
            .post("/assets/app.css", handler_fn(|_ctx: Context| async { "dynamic" }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::POST, "/assets/app.css")).await;
        assert_eq!(body_text(response).await, "dynamic");
    }

    #[tokio::test]
    async fn static_entry_requires_a_non_empty_remainder() {
        let router = Router::builder()
            .files_with("/assets/*", FixedResolver { serves: "" })
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/assets")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -- websocket upgrades ------------------------------------------------

    struct NullSocket;

    #[async_trait]
    impl SocketIo for NullSocket {
        async fn send(&mut self, _message: SocketMessage) -> Result<(), BoxError> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<SocketMessage> {
            None
        }

        async fn close(&mut self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    mock! {
        UpgradeService {}

        impl Upgrader for UpgradeService {
            fn upgrade(&self, request: &Parts) -> Result<Upgrade, BoxError>;
        }
    }

    fn upgrade_request(path: &str) -> Request<crate::body::ReqBody> {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(http::header::UPGRADE, "websocket")
            .body(empty_body())
            .unwrap()
    }

    #[tokio::test]
    async fn socket_route_upgrades_and_returns_the_handshake_response() {
        let mut upgrader = MockUpgradeService::new();
        upgrader.expect_upgrade().times(1).returning(|_| {
            let response = Response::builder()
                .status(StatusCode::SWITCHING_PROTOCOLS)
                .body(ResponseBody::empty())
                .unwrap();
            Ok(Upgrade { socket: WebSocket::new(NullSocket), response })
        });

        let router = Router::builder()
            .upgrader(upgrader)
            .socket("/live", handler_fn(|ctx: Context| async move {
                assert!(ctx.take_socket().is_some());
            }))
            .build()
            .unwrap();

        let response = router.handle(upgrade_request("/live")).await;
        assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
    }

    #[tokio::test]
    async fn socket_route_without_signature_keeps_scanning() {
        let mut upgrader = MockUpgradeService::new();
        upgrader.expect_upgrade().never();

        let router = Router::builder()
            .upgrader(upgrader)
            .socket("/live", handler_fn(|_ctx: Context| async {}))
            .get("/live", handler_fn(|_ctx: Context| async { "plain" }))
            .build()
            .unwrap();

        // Plain GET without the Upgrade header: the socket entry must not
        // abort the scan.
        let response = router.handle(request(Method::GET, "/live")).await;
        assert_eq!(body_text(response).await, "plain");
    }

    #[tokio::test]
    async fn failed_handshake_routes_through_the_error_boundary() {
        let mut upgrader = MockUpgradeService::new();
        upgrader.expect_upgrade().returning(|_| Err("bad key".into()));

        let router = Router::builder()
            .upgrader(upgrader)
            .socket("/live", handler_fn(|_ctx: Context| async {}))
            .catch(handler_fn(|ctx: Context| async move {
                format!("handshake failed: {}", ctx.error().unwrap())
            }))
            .build()
            .unwrap();

        let response = router.handle(upgrade_request("/live")).await;
        assert_eq!(body_text(response).await, "handshake failed: bad key");
    }

    #[test]
    fn socket_route_without_upgrader_fails_the_build() {
        let result = Router::builder().socket("/live", handler_fn(|_ctx: Context| async {})).build();
        assert!(matches!(result, Err(RouterBuildError::MissingUpgrader { .. })));
    }

    // -- sse ---------------------------------------------------------------

    #[tokio::test]
    async fn sse_route_streams_events() {
        use crate::sse::{Event, event_channel};

        let router = Router::builder()
            .sse("/events", handler_fn(|_ctx: Context| async {
                let (stream, mut emitter) = event_channel(4);
                tokio::spawn(async move {
                    let _ = emitter.send(Event::from_data("one".to_string())).await;
                    let _ = emitter.close().await;
                });
                stream
            }))
            .build()
            .unwrap();

        let response = router.handle(request(Method::GET, "/events")).await;
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[http::header::CACHE_CONTROL], "no-cache");
        assert_eq!(body_text(response).await, "data: one\n\n");
    }
}
