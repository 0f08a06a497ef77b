//! `Content-Type` matching.
//!
//! Matching follows the usual web-framework conventions:
//!
//! - comparison is case-insensitive and media type parameters
//!   (`; charset=utf-8`) are ignored;
//! - the expected value may be a shorthand (`json`, `urlencoded`,
//!   `multipart`, `text`, `html`, `xml`, `form`);
//! - `*` is a wildcard for either half (`application/*`, `*/*`);
//! - a `+suffix` expectation (`+json`) matches structured syntax suffixes
//!   such as `application/vnd.api+json`.

use crate::error::HttpError;

/// Default expected type of [`ContentTypeCheck`].
pub const APPLICATION_JSON: &str = "application/json";

fn expand_shorthand(expected: &str) -> String {
    let expected = expected.trim().to_ascii_lowercase();
    match expected.as_str() {
        "json" => APPLICATION_JSON.to_string(),
        "urlencoded" | "form" => "application/x-www-form-urlencoded".to_string(),
        "multipart" => "multipart/*".to_string(),
        "text" => "text/plain".to_string(),
        "html" => "text/html".to_string(),
        "xml" => "application/xml".to_string(),
        _ if expected.starts_with('+') => format!("*/*{}", expected),
        _ => expected,
    }
}

/// Split a media type into `(type, subtype)`, dropping parameters.
///
/// Returns `None` for anything that is not `token/token`.
fn split_media_type(raw: &str) -> Option<(String, String)> {
    let essence = raw.split(';').next().unwrap_or("").trim();
    let (ty, subtype) = essence.split_once('/')?;
    let valid = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace) && !s.contains('/');
    if !valid(ty) || !valid(subtype) {
        return None;
    }
    Some((ty.to_ascii_lowercase(), subtype.to_ascii_lowercase()))
}

/// Does the `actual` header value satisfy the `expected` media type?
pub fn is_content_type(actual: &str, expected: &str) -> bool {
    let Some((actual_ty, actual_sub)) = split_media_type(actual) else {
        return false;
    };
    let Some((expected_ty, expected_sub)) = split_media_type(&expand_shorthand(expected)) else {
        return false;
    };

    if expected_ty != "*" && expected_ty != actual_ty {
        return false;
    }

    if let Some(suffix) = expected_sub.strip_prefix("*+") {
        // `*/*+json` needs a real suffix: `application/json` does not match.
        return actual_sub.len() > suffix.len() + 1
            && actual_sub.ends_with(suffix)
            && actual_sub[..actual_sub.len() - suffix.len()].ends_with('+');
    }

    expected_sub == "*" || expected_sub == actual_sub
}

/// Checks a request's `Content-Type` header against an expected value.
///
/// ```
/// use reqguard::ContentTypeCheck;
///
/// let check = ContentTypeCheck::new("application/json");
/// assert!(check.check(Some("application/json; charset=utf-8")).is_ok());
///
/// let err = check.check(Some("text/plain")).unwrap_err();
/// assert_eq!(err.status().as_u16(), 400);
/// ```
#[derive(Debug, Clone)]
pub struct ContentTypeCheck {
    expected: String,
    error: Option<HttpError>,
}

impl ContentTypeCheck {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            error: None,
        }
    }

    /// Use `error` instead of the generated `400` on mismatch.
    pub fn with_error(mut self, error: HttpError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Custom mismatch error set with [`with_error`](Self::with_error).
    pub fn error(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    /// Does the raw header value match? A missing header never does.
    pub fn matches(&self, header: Option<&str>) -> bool {
        header.is_some_and(|actual| is_content_type(actual, &self.expected))
    }

    /// Check the raw header value.
    pub fn check(&self, header: Option<&str>) -> Result<(), HttpError> {
        if self.matches(header) {
            return Ok(());
        }

        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        Err(HttpError::bad_request(format!(
            "Invalid header content-type=\"{}\". Expected: \"{}\"",
            header.unwrap_or("undefined"),
            self.expected
        )))
    }
}

impl Default for ContentTypeCheck {
    fn default() -> Self {
        Self::new(APPLICATION_JSON)
    }
}

/// Shorthand for [`ContentTypeCheck::new`].
pub fn content_type_check(expected: impl Into<String>) -> ContentTypeCheck {
    ContentTypeCheck::new(expected)
}
