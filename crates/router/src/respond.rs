//! Outcome-to-response coercion.
//!
//! One exhaustive match over the handler outcome, in the documented arm
//! order. Per-request failures never reach this layer; the only failure
//! mode here is a handler producing a value its route kind cannot carry,
//! which panics (a programming defect, not a request error).

use crate::body::ResponseBody;
use crate::context::Context;
use crate::error::BoxError;
use crate::file::NamedFile;
use crate::outcome::{Outcome, Part, Payload};
use crate::router::Protocol;
use crate::sse::{EventStream, wire_stream};
use crate::stream::{BoxChunkStream, ChunkBody};
use bytes::Bytes;
use futures::TryStreamExt;
use http::{HeaderValue, Response, StatusCode, header};
use http_body::Frame;
use http_body_util::StreamBody;
use tokio_util::io::ReaderStream;

pub(crate) async fn respond(ctx: Context, outcome: Outcome) -> Response<ResponseBody> {
    match outcome {
        Outcome::Empty => match ctx.take_upgrade_response() {
            Some(response) => response,
            None => Response::new(ResponseBody::empty()),
        },
        Outcome::Text(text) => text_response(text),
        Outcome::Response(response) => response,
        Outcome::Nested(child) => {
            let remainder = ctx.remainder().to_vec();
            child.dispatch(ctx.request_arc(), ctx.body(), remainder).await
        }
        Outcome::Payload(payload) => payload_response(payload),
        Outcome::File(file) => file_response(file),
        Outcome::Events(events) => {
            if ctx.protocol() != Protocol::Sse {
                panic!(
                    "handler for {} returned a server-event stream on a non-sse route; register it with `sse()`",
                    ctx.uri()
                );
            }
            sse_response(events)
        }
        Outcome::Chunks(stream) => chunk_response(stream),
        Outcome::Value(value) => json_response(&value),
    }
}

pub(crate) fn not_found() -> Response<ResponseBody> {
    let mut builder = Response::builder().status(StatusCode::NOT_FOUND);
    let headers = builder.headers_mut().unwrap();
    headers.insert(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref().parse().unwrap());
    builder.body(ResponseBody::from("Not Found")).unwrap()
}

/// The generic failure response: 500 carrying the stringified error.
pub(crate) fn failure_response(error: &BoxError) -> Response<ResponseBody> {
    let mut builder = Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = builder.headers_mut().unwrap();
    headers.insert(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref().parse().unwrap());
    builder.body(ResponseBody::from(error.to_string())).unwrap()
}

fn text_response(text: String) -> Response<ResponseBody> {
    let mut builder = Response::builder();
    let headers = builder.headers_mut().unwrap();
    headers.reserve(8);
    headers.insert(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref().parse().unwrap());

    builder.status(StatusCode::OK).body(ResponseBody::from(text)).unwrap()
}

fn json_response(value: &serde_json::Value) -> Response<ResponseBody> {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => panic!("handler json value failed to serialize: {e}"),
    };

    let mut builder = Response::builder();
    let headers = builder.headers_mut().unwrap();
    headers.insert(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref().parse().unwrap());

    builder.status(StatusCode::OK).body(ResponseBody::from(bytes)).unwrap()
}

fn payload_response(payload: Payload) -> Response<ResponseBody> {
    match payload {
        Payload::Bytes(bytes) => Response::new(ResponseBody::from(bytes)),
        Payload::Stream(stream) => {
            let body = StreamBody::new(stream.map_ok(Frame::data));
            Response::new(ResponseBody::stream(body))
        }
        Payload::Blob { content_type, data } => {
            let mut builder = Response::builder();
            let headers = builder.headers_mut().unwrap();
            headers.insert(header::CONTENT_TYPE, content_type.as_ref().parse().unwrap());
            builder.status(StatusCode::OK).body(ResponseBody::from(data)).unwrap()
        }
        Payload::Form(pairs) => {
            let encoded = match serde_urlencoded::to_string(&pairs) {
                Ok(encoded) => encoded,
                Err(e) => panic!("form payload failed to encode: {e}"),
            };

            let mut builder = Response::builder();
            let headers = builder.headers_mut().unwrap();
            headers
                .insert(header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref().parse().unwrap());
            builder.status(StatusCode::OK).body(ResponseBody::from(encoded)).unwrap()
        }
        Payload::Multipart(parts) => {
            let boundary = format!("{:032x}", fastrand::u128(..));
            let body = encode_multipart(&boundary, parts);

            let mut builder = Response::builder();
            let headers = builder.headers_mut().unwrap();
            let content_type = format!("multipart/form-data; boundary={boundary}");
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(&content_type).unwrap());
            builder.status(StatusCode::OK).body(ResponseBody::once(body)).unwrap()
        }
    }
}

fn encode_multipart(boundary: &str, parts: Vec<Part>) -> Bytes {
    let mut buf = Vec::new();
    for part in parts {
        buf.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match &part.filename {
            Some(filename) => buf.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => buf.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = &part.content_type {
            buf.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&part.data);
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Bytes::from(buf)
}

fn file_response(file: NamedFile) -> Response<ResponseBody> {
    let (file, name, size, content_type) = file.into_parts();

    let mut builder = Response::builder().status(StatusCode::OK);
    let headers = builder.headers_mut().unwrap();
    headers.reserve(8);

    let content_type = content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM);
    headers.insert(header::CONTENT_TYPE, content_type.as_ref().parse().unwrap());
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));

    let filename = name.replace(['"', '\r', '\n'], "_");
    let disposition = format!("attachment; filename=\"{filename}\"");
    headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_str(&disposition).unwrap());

    let stream = ReaderStream::new(file).map_ok(Frame::data).map_err(BoxError::from);
    builder.body(ResponseBody::stream(StreamBody::new(stream))).unwrap()
}

fn sse_response(events: EventStream) -> Response<ResponseBody> {
    let mut builder = Response::builder();
    let headers = builder.headers_mut().unwrap();
    headers.reserve(16);
    headers.insert(header::CONTENT_TYPE, mime::TEXT_EVENT_STREAM.as_ref().parse().unwrap());
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    let stream_body = StreamBody::new(wire_stream(events));
    builder.status(StatusCode::OK).body(ResponseBody::stream(stream_body)).unwrap()
}

fn chunk_response(stream: BoxChunkStream) -> Response<ResponseBody> {
    Response::new(ResponseBody::stream(ChunkBody::new(stream)))
}
