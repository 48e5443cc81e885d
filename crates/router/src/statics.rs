//! Static-file resolution contract and the directory-backed resolver.
//!
//! The dispatcher tries static entries before dynamic routes (read-style
//! methods only) and treats a `None` resolution as "keep scanning". What a
//! hit looks like (content type, index files, `.html` fallback) is owned
//! entirely by the resolver.

use crate::body::ResponseBody;
use crate::error::BoxError;
use crate::file::content_type_of;
use async_trait::async_trait;
use futures::TryStreamExt;
use http::request::Parts;
use http::{HeaderValue, Method, Response, StatusCode, header};
use http_body::Frame;
use http_body_util::StreamBody;
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

/// Resolves the remainder of a matched static pattern to a response.
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// `None` is the not-found signal; the dispatcher falls through to the
    /// next static entry and eventually to the dynamic phase.
    async fn resolve(&self, remainder: &[String], request: &Parts) -> Option<Response<ResponseBody>>;
}

/// Serves files below a root directory.
///
/// Lookup order: the literal path, `index.html` inside a directory, then
/// the path with an `.html` suffix appended. Segments that could step
/// outside the root are refused outright.
#[derive(Debug)]
pub struct StaticDir {
    root: PathBuf,
}

impl StaticDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn join_checked(&self, remainder: &[String]) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in remainder {
            if segment == "." || segment == ".." || segment.contains('/') || segment.contains('\\') {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

#[async_trait]
impl FileResolver for StaticDir {
    async fn resolve(&self, remainder: &[String], request: &Parts) -> Option<Response<ResponseBody>> {
        let requested = self.join_checked(remainder)?;

        let path = match tokio::fs::metadata(&requested).await {
            Ok(meta) if meta.is_dir() => requested.join("index.html"),
            Ok(_) => requested,
            Err(_) => with_html_suffix(requested),
        };

        let meta = tokio::fs::metadata(&path).await.ok()?;
        if !meta.is_file() {
            return None;
        }

        let file = tokio::fs::File::open(&path).await.ok()?;

        let mut builder = Response::builder().status(StatusCode::OK);
        let headers = builder.headers_mut().unwrap();
        let content_type = content_type_of(&path).unwrap_or(mime::APPLICATION_OCTET_STREAM);
        headers.insert(header::CONTENT_TYPE, content_type.as_ref().parse().unwrap());
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.len()));

        let body = if request.method == Method::HEAD {
            ResponseBody::empty()
        } else {
            let stream = ReaderStream::new(file)
                .map_ok(Frame::data)
                .map_err(BoxError::from);
            ResponseBody::stream(StreamBody::new(stream))
        };

        Some(builder.body(body).unwrap())
    }
}

fn with_html_suffix(path: PathBuf) -> PathBuf {
    let mut raw = path.into_os_string();
    raw.push(".html");
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::{FileResolver, StaticDir};
    use http::request::Parts;
    use http::{Method, Request};
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    fn parts(method: Method) -> Parts {
        Request::builder().method(method).uri("/files/x").body(()).unwrap().into_parts().0
    }

    fn fixture_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("micro-route-statics-{}-{tag}", std::process::id()));
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("docs").join("guide.html"), "<h1>guide</h1>").unwrap();
        std::fs::write(root.join("docs").join("notes.txt"), "notes").unwrap();
        std::fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
        root
    }

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn serves_an_existing_file() {
        let dir = StaticDir::new(fixture_root("serve"));
        let response = dir.resolve(&seg(&["docs", "notes.txt"]), &parts(Method::GET)).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain; charset=utf-8");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "notes");
    }

    #[tokio::test]
    async fn falls_back_to_html_suffix() {
        let dir = StaticDir::new(fixture_root("suffix"));
        let response = dir.resolve(&seg(&["docs", "guide"]), &parts(Method::GET)).await.unwrap();
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn serves_directory_index() {
        let root = fixture_root("index");
        let dir = StaticDir::new(&root);
        let response = dir.resolve(&seg(&["docs"]), &parts(Method::GET)).await;
        // docs/ has no index.html, so this misses...
        assert!(response.is_none());

        // ...but a directory that has one serves it.
        std::fs::create_dir_all(root.join("site")).unwrap();
        std::fs::write(root.join("site").join("index.html"), "<h1>site</h1>").unwrap();
        let response = dir.resolve(&seg(&["site"]), &parts(Method::GET)).await.unwrap();
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn missing_file_is_a_fallthrough() {
        let dir = StaticDir::new(fixture_root("miss"));
        assert!(dir.resolve(&seg(&["nope.png"]), &parts(Method::GET)).await.is_none());
    }

    #[tokio::test]
    async fn traversal_segments_are_refused() {
        let dir = StaticDir::new(fixture_root("traversal"));
        assert!(dir.resolve(&seg(&["..", "etc", "passwd"]), &parts(Method::GET)).await.is_none());
        assert!(dir.resolve(&seg(&["a/b"]), &parts(Method::GET)).await.is_none());
    }

    #[tokio::test]
    async fn head_keeps_headers_drops_body() {
        let dir = StaticDir::new(fixture_root("head"));
        let response = dir.resolve(&seg(&["docs", "notes.txt"]), &parts(Method::HEAD)).await.unwrap();

        assert_eq!(response.headers()[http::header::CONTENT_LENGTH], "5");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
