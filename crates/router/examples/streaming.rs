use http::{Method, Request};
use http_body_util::BodyExt;
use micro_route::sse::{Event, EventStream, event_channel};
use micro_route::stream::{Chunk, StreamChunks, chunks};
use micro_route::{BoxError, Context, Router, empty_body, handler_fn};

async fn events(_ctx: Context) -> EventStream {
    let (stream, mut emitter) = event_channel(8);

    tokio::spawn(async move {
        for i in 0..3 {
            let _ = emitter.send(Event::from_data(format!("tick {i}"))).await;
        }
        let _ = emitter.close().await;
    });

    stream
}

async fn report(_ctx: Context) -> StreamChunks<impl futures::Stream<Item = Result<Chunk, BoxError>> + Send, fn()> {
    chunks(futures::stream::iter(vec![
        Ok(Chunk::Text("line one\n".to_string())),
        Ok(Chunk::Text("line two\n".to_string())),
    ]))
}

#[tokio::main]
async fn main() {
    let router = Router::builder()
        .sse("/events", handler_fn(events))
        .get("/report", handler_fn(report))
        .build()
        .unwrap();

    for path in ["/events", "/report"] {
        let request = Request::builder().method(Method::GET).uri(path).body(empty_body()).unwrap();
        let response = router.handle(request).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        println!("GET {path}:\n{}", String::from_utf8_lossy(&body));
    }
}
