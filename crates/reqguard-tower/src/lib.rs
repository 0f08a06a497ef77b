//! # reqguard-tower — Tower middleware for `reqguard`
//!
//! Two layers that work with **any** Tower-compatible server (Axum, Hyper,
//! Tonic, ...):
//!
//! - [`ContentTypeLayer`] rejects requests whose `Content-Type` does not
//!   match; everything else passes through untouched.
//! - [`ValidateLayer<T>`] maps a parameter group onto `T`, validates it and
//!   stores the model in [`http::Request::extensions`] so downstream
//!   handlers can retrieve it without re-parsing. The inner service sees a
//!   [`ValidatedBody`]: the buffered bytes when the body group was
//!   validated, the untouched body otherwise.
//!
//! On failure a JSON error response carrying the status of the
//! [`HttpError`](reqguard::HttpError) is returned immediately and the
//! inner service is never called.
//!
//! # Quick Start (with Axum)
//!
//! ```rust,no_run
//! use reqguard_tower::{ContentTypeLayer, ValidateLayer};
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Clone, Deserialize, Validate)]
//! pub struct CreateUser {
//!     #[validate(length(min = 2, max = 100))]
//!     pub name: String,
//!     #[validate(email)]
//!     pub email: String,
//! }
//!
//! let _content_type = ContentTypeLayer::json();
//! let _validate = ValidateLayer::<CreateUser>::body();
//! // let app = Router::new()
//! //     .route("/users", post(handler))
//! //     .layer(ValidateLayer::<CreateUser>::body());
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::{Request, Response};
use http_body::Body;
use http_body_util::{BodyExt, Either, Full, LengthLimitError, Limited};
use reqguard::{validate_body, validate_query, ContentTypeCheck, HttpError, Model, Validation};
use reqguard_http_common::{content_type, error_response_parts, payload_too_large, request_data};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Request body handed to the service behind [`ValidateLayer`].
///
/// `Left` holds the buffered bytes of a validated body, `Right` the
/// original body of a request whose other groups were validated.
pub type ValidatedBody<B> = Either<Full<Bytes>, B>;

/// Build the JSON error response for `err`.
fn error_response<B: From<Bytes>>(err: &HttpError) -> Response<B> {
    let (status, body) = error_response_parts(err);
    let mut resp = Response::new(B::from(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    resp
}

// ---------------------------------------------------------------------------
// Content-Type layer
// ---------------------------------------------------------------------------

/// A [`tower_layer::Layer`] that checks the `Content-Type` header.
#[derive(Debug, Clone)]
pub struct ContentTypeLayer {
    check: ContentTypeCheck,
}

impl ContentTypeLayer {
    pub fn new(check: ContentTypeCheck) -> Self {
        Self { check }
    }

    /// Require `application/json`.
    pub fn json() -> Self {
        Self::new(ContentTypeCheck::default())
    }
}

impl<S> tower_layer::Layer<S> for ContentTypeLayer {
    type Service = ContentTypeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContentTypeService {
            inner,
            check: self.check.clone(),
        }
    }
}

/// The middleware service created by [`ContentTypeLayer`].
#[derive(Debug, Clone)]
pub struct ContentTypeService<S> {
    inner: S,
    check: ContentTypeCheck,
}

impl<S, ReqBody, ResBody> tower_service::Service<Request<ReqBody>> for ContentTypeService<S>
where
    S: tower_service::Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: From<Bytes> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let header = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        match self.check.check(header) {
            Ok(()) => Box::pin(self.inner.call(req)),
            Err(err) => {
                tracing::debug!(
                    expected = self.check.expected(),
                    status = err.status().as_u16(),
                    "content-type rejected"
                );
                Box::pin(std::future::ready(Ok(error_response(&err))))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation layer
// ---------------------------------------------------------------------------

/// A [`tower_layer::Layer`] that validates one parameter group as `T`.
///
/// `T` must implement [`Model`] + [`Clone`] + [`Send`] + [`Sync`] +
/// `'static` to be stored in request extensions.
///
/// # Behaviour
///
/// 1. Checks the `Content-Type` header, if the validation requires one.
/// 2. For the body group only, reads the full request body (honouring
///    `body_limit`). Other groups leave the body untouched.
/// 3. Runs the [`Validation`]: group lookup, deserialization, constraints.
/// 4. **Valid**: inserts `T` into request extensions and calls the inner
///    service with a [`ValidatedBody`].
/// 5. **Invalid**: responds with the error's status and JSON body. The
///    inner service is **not** called.
pub struct ValidateLayer<T> {
    validation: Validation<T>,
}

impl<T> Clone for ValidateLayer<T> {
    fn clone(&self) -> Self {
        Self {
            validation: self.validation.clone(),
        }
    }
}

impl<T: Model> ValidateLayer<T> {
    pub fn new(validation: Validation<T>) -> Self {
        Self { validation }
    }

    /// Validate the JSON body.
    pub fn body() -> Self {
        Self::new(validate_body())
    }

    /// Validate the query string.
    pub fn query() -> Self {
        Self::new(validate_query())
    }
}

impl<S, T> tower_layer::Layer<S> for ValidateLayer<T> {
    type Service = ValidateService<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidateService {
            inner,
            validation: self.validation.clone(),
        }
    }
}

/// The middleware service created by [`ValidateLayer`].
pub struct ValidateService<S, T> {
    inner: S,
    validation: Validation<T>,
}

impl<S: Clone, T> Clone for ValidateService<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validation: self.validation.clone(),
        }
    }
}

async fn read_body<B>(body: B, limit: Option<usize>) -> Result<Bytes, HttpError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limited = Limited::new(body, limit.unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => Err(payload_too_large()),
        Err(err) => Err(HttpError::bad_request(format!(
            "Failed to read request body: {}",
            err
        ))),
    }
}

impl<S, T, ReqBody, ResBody> tower_service::Service<Request<ReqBody>> for ValidateService<S, T>
where
    S: tower_service::Service<Request<ValidatedBody<ReqBody>>, Response = Response<ResBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Body<Data = Bytes> + Send + 'static,
    ReqBody::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    ResBody: From<Bytes> + Send + 'static,
    T: Model + Clone + Send + Sync + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        // Swap so `self` is ready for next call (standard Tower pattern)
        std::mem::swap(&mut self.inner, &mut inner);
        let validation = self.validation.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            if let Err(err) = validation.check_content_type(content_type(&parts.headers)) {
                return Ok(error_response(&err));
            }

            let (bytes, body) = if validation.reads_body() {
                match read_body(body, validation.get_options().body_limit).await {
                    Ok(bytes) => (Some(bytes.clone()), Either::Left(Full::new(bytes))),
                    Err(err) => return Ok(error_response(&err)),
                }
            } else {
                (None, Either::Right(body))
            };

            let validated = request_data(&parts, bytes.as_deref())
                .and_then(|data| validation.run(&data));

            match validated {
                Ok(model) => {
                    let mut new_req = Request::from_parts(parts, body);
                    new_req.extensions_mut().insert(model);
                    inner.call(new_req).await
                }
                Err(err) => Ok(error_response(&err)),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Helper: extract validated value from request extensions
// ---------------------------------------------------------------------------

/// Extract the validated value from request extensions.
///
/// # Panics
///
/// Panics if `T` is not present in extensions (i.e. the middleware was
/// not applied).
pub fn validated<T: Clone + Send + Sync + 'static, B>(req: &Request<B>) -> T {
    req.extensions().get::<T>().cloned().unwrap_or_else(|| {
        panic!(
            "reqguard-tower: `{}` not found in request extensions. \
             Make sure ValidateLayer is applied.",
            std::any::type_name::<T>()
        )
    })
}

/// Try to extract the validated value from request extensions.
///
/// Returns `None` if the middleware was not applied or the value type
/// doesn't match.
pub fn try_validated<T: Clone + Send + Sync + 'static, B>(req: &Request<B>) -> Option<T> {
    req.extensions().get::<T>().cloned()
}

/// Prelude: import everything you need.
pub mod prelude {
    pub use crate::{
        try_validated, validated, ContentTypeLayer, ContentTypeService, ValidateLayer,
        ValidateService, ValidatedBody,
    };
}
