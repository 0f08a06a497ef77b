//! # reqguard-http-common — Shared HTTP helpers for `reqguard` integrations
//!
//! Turns an [`http::Request`]'s parts and buffered body into the
//! framework-independent [`RequestData`] the core adapter reads, and turns
//! an [`HttpError`] back into a JSON response body.
//!
//! **Not intended for direct use by end users.** Import via the
//! framework-specific crate instead.

use std::collections::HashMap;

use http::request::Parts;
use http::StatusCode;
use reqguard::{is_content_type, HttpError, Issue, ParamGroup, RequestData};
use serde::Serialize;
use serde_json::Value;

/// Percent-decode a URL component.
///
/// Handles `%XX` hex encoding (multi-byte UTF-8 sequences included) and
/// `+` → space. Malformed escapes are kept literally.
pub fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push((hex_value(bytes[i + 1]) << 4) | hex_value(bytes[i + 2]));
                i += 3;
                continue;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Insert a text value; a repeated key collects its values into an array.
fn push_text(map: &mut serde_json::Map<String, Value>, key: String, value: String) {
    match map.get_mut(&key) {
        Some(Value::Array(values)) => values.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
        None => {
            map.insert(key, Value::String(value));
        }
    }
}

/// Parse a URL query string into a `serde_json::Map`.
///
/// Keys and values are URL-decoded and kept as strings; the model's field
/// types decide how they are read (see [`reqguard::from_text_value`]).
/// Empty pairs are skipped, a key without `=` has the value `""` and a
/// repeated key collects its values into an array.
pub fn parse_query_string(query: &str) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        push_text(&mut map, url_decode(key), url_decode(raw_value));
    }

    map
}

/// Parse a URL query string into a `serde_json::Value::Object`.
pub fn query_string_to_json(query: &str) -> Value {
    Value::Object(parse_query_string(query))
}

/// Build a JSON object from a `Cookie` header value.
///
/// Cookie names and values are kept as-is.
pub fn cookies_to_json(cookie_header: &str) -> Value {
    let mut map = serde_json::Map::new();

    for cookie in cookie_header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let (name, value) = cookie.split_once('=').unwrap_or((cookie, ""));
        map.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
    }

    Value::Object(map)
}

/// Build a JSON object from HTTP headers.
///
/// Header names are normalised: `Content-Type` → `content_type`.
/// Values stay strings, a repeated header collects its values into an
/// array. Non-UTF-8 values are skipped.
pub fn headers_to_json(headers: &http::HeaderMap) -> Value {
    let mut map = serde_json::Map::new();

    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            push_text(&mut map, name.as_str().replace('-', "_"), v.to_string());
        }
    }

    Value::Object(map)
}

/// Raw `Content-Type` header value.
pub fn content_type(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

/// `application/json` or any `*/*+json` type.
pub fn is_json(content_type: Option<&str>) -> bool {
    let ct = content_type.unwrap_or("");
    is_content_type(ct, "json") || is_content_type(ct, "+json")
}

/// Convert a buffered body into the value of the `body` group.
///
/// - empty body → `None` (the group is missing)
/// - JSON (`application/json`, `*/*+json`) → parsed JSON
/// - `application/x-www-form-urlencoded` → map of text values
/// - anything else → the UTF-8 text
pub fn body_to_value(content_type: Option<&str>, bytes: &[u8]) -> Result<Option<Value>, HttpError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    if is_json(content_type) {
        return serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| HttpError::bad_request(format!("Invalid JSON: {}", e)));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| HttpError::bad_request("Invalid UTF-8"))?;

    if is_content_type(content_type.unwrap_or(""), "urlencoded") {
        return Ok(Some(query_string_to_json(text)));
    }

    Ok(Some(Value::String(text.to_string())))
}

/// Custom parameter groups attached to a request by earlier middleware.
///
/// Insert it into the request extensions; every entry becomes a group of
/// the resulting [`RequestData`]. Standard names (`params`, `body`, ...)
/// replace the group built from the request itself.
#[derive(Debug, Clone, Default)]
pub struct ExtraParams(pub HashMap<String, Value>);

impl ExtraParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }
}

/// Build [`RequestData`] from request parts and an optional buffered body.
///
/// `body` is `None` when the integration did not read the body; the body
/// group is then missing. Query, headers, cookies and non-JSON bodies are
/// text groups. Integrations run
/// [`Validation::check_content_type`](reqguard::Validation::check_content_type)
/// before reading the body, so `body` is only decoded once its type is
/// accepted.
pub fn request_data(parts: &Parts, body: Option<&[u8]>) -> Result<RequestData, HttpError> {
    let content_type = content_type(&parts.headers);
    let mut data = RequestData::new();

    if let Some(query) = parts.uri.query() {
        data.insert_text(ParamGroup::Query, query_string_to_json(query));
    }

    data.insert_text(ParamGroup::Headers, headers_to_json(&parts.headers));

    if let Some(cookie) = parts
        .headers
        .get(http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        data.insert_text(ParamGroup::Cookies, cookies_to_json(cookie));
    }

    if let Some(bytes) = body {
        if let Some(value) = body_to_value(content_type, bytes)? {
            if is_json(content_type) {
                data.insert(ParamGroup::Body, value);
            } else {
                data.insert_text(ParamGroup::Body, value);
            }
        }
    }

    if let Some(extra) = parts.extensions.get::<ExtraParams>() {
        for (name, value) in &extra.0 {
            data.insert(ParamGroup::from(name.as_str()), value.clone());
        }
    }

    data.set_content_type(content_type.map(str::to_string));
    Ok(data)
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

/// JSON body sent for every [`HttpError`]:
/// `{ "error": "...", "status": 400, "issues": [...] }`.
///
/// `issues` is omitted when the error carries none.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    pub status: u16,
    #[serde(skip_serializing_if = "no_issues")]
    pub issues: &'a [Issue],
}

fn no_issues(issues: &&[Issue]) -> bool {
    issues.is_empty()
}

/// Format an [`HttpError`] as a JSON value.
pub fn error_body(err: &HttpError) -> Value {
    serde_json::to_value(ErrorBody {
        error: err.message(),
        status: err.status().as_u16(),
        issues: err.issues(),
    })
    .unwrap_or_else(|_| serde_json::json!({ "error": err.message() }))
}

/// Status and serialized JSON body for an [`HttpError`].
pub fn error_response_parts(err: &HttpError) -> (StatusCode, Vec<u8>) {
    (err.status(), error_body(err).to_string().into_bytes())
}

/// `413` error used by integrations when a body exceeds its limit.
pub fn payload_too_large() -> HttpError {
    HttpError::payload_too_large("Payload too large")
}
