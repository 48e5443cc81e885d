//! Path tokenization: turning a raw URL path into decoded segments.
//!
//! Splitting happens before decoding, so an encoded slash (`%2F`) inside a
//! segment stays inside that segment instead of introducing a new one.

/// Splits a raw URL path into its non-empty, URL-decoded segments.
///
/// Duplicate, leading and trailing slashes all collapse away, so
/// `"/hello//world/"` and `"hello/world"` tokenize identically. Any input
/// produces a (possibly empty) sequence; no segment in the output is empty.
pub fn segments(path: &str) -> Vec<String> {
    path.split('/').filter(|raw| !raw.is_empty()).map(decode).collect()
}

/// Decodes one percent-encoded segment, keeping the raw text when the
/// escapes do not form valid UTF-8.
fn decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
