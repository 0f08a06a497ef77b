//! # reqguard-axum — Axum integration for `reqguard`
//!
//! Extractors that map one part of the request onto a model, validate it
//! and hand the model to the handler:
//!
//! | Extractor | Replaces | Source |
//! |---|---|---|
//! | [`ValidBody<T>`] | `axum::Json<T>` | JSON body, `Content-Type: application/json` required |
//! | [`ValidQuery<T>`] | `axum::extract::Query<T>` | URL query parameters, missing query = `{}` |
//! | [`ValidParams<T>`] | `axum::extract::Path<T>` | URL path parameters |
//! | [`Valid<T>`] | — | whatever [`ValidationConfig`] says |
//! | [`Validated<T>`] | — | value stored by `reqguard_tower::ValidateLayer` |
//!
//! Failures are answered with the status carried by the
//! [`HttpError`] (400 for bad input, 500 when the validator itself fails)
//! and a JSON body `{ "error", "status", "issues" }`.
//!
//! # Quick example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use reqguard_axum::{ValidBody, ValidQuery};
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Deserialize, Validate)]
//! pub struct CreateUser {
//!     #[validate(email)]
//!     pub email: String,
//!     #[validate(length(min = 10, max = 20))]
//!     pub surname: Option<String>,
//! }
//!
//! #[derive(Debug, Deserialize, Validate)]
//! pub struct Notify {
//!     #[validate(range(min = 0, max = 3))]
//!     pub retries: Option<u8>,
//! }
//!
//! async fn handler(ValidQuery(q): ValidQuery<Notify>, ValidBody(user): ValidBody<CreateUser>) -> String {
//!     format!("{} retries={:?}", user.email, q.retries)
//! }
//! ```

use std::collections::HashMap;
use std::error::Error as StdError;

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use reqguard::{
    validate, validate_body, validate_query, HttpError, Model, ParamGroup, RequestData,
    Validation, ValidationOptions,
};
use reqguard_http_common::{content_type, error_response_parts, payload_too_large, request_data};

// ============================= Rejection =====================================

/// Rejection returned by every extractor in this crate.
pub struct HttpRejection(pub HttpError);

impl HttpRejection {
    /// Get a reference to the underlying [`HttpError`].
    pub fn error(&self) -> &HttpError {
        &self.0
    }
}

impl From<HttpError> for HttpRejection {
    fn from(err: HttpError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpRejection {
    fn into_response(self) -> Response {
        let (status, body) = error_response_parts(&self.0);
        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

impl std::fmt::Display for HttpRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, self.0.status())
    }
}

impl std::fmt::Debug for HttpRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HttpRejection").field(&self.0).finish()
    }
}

// ============================= Helpers =======================================

fn is_length_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Build the [`RequestData`] `validation` needs.
///
/// The content-type check runs on the raw header first. The body is only
/// buffered (honouring `body_limit`) and decoded when `validation` reads the
/// body group; otherwise it is dropped unread.
async fn buffered_request_data<T: Model>(
    parts: &Parts,
    body: axum::body::Body,
    validation: &Validation<T>,
) -> Result<RequestData, HttpRejection> {
    validation.check_content_type(content_type(&parts.headers))?;
    if !validation.reads_body() {
        return Ok(request_data(parts, None)?);
    }

    let limit = validation.get_options().body_limit.unwrap_or(usize::MAX);
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        if is_length_limit(&err) {
            payload_too_large()
        } else {
            HttpError::bad_request(format!("Failed to read request body: {}", err))
        }
    })?;

    Ok(request_data(parts, Some(bytes.as_ref()))?)
}

/// Path parameters of the matched route, as text values.
///
/// `None` when the router captured no parameters. Segments that cannot be
/// decoded are rejected with the router's status and message.
async fn path_params<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Option<serde_json::Value>, HttpError> {
    match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
        Ok(Path(raw)) => {
            let map = raw
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect::<serde_json::Map<_, _>>();
            Ok(Some(serde_json::Value::Object(map)))
        }
        Err(PathRejection::MissingPathParams(_)) => Ok(None),
        Err(rejection) => Err(HttpError::new(rejection.body_text(), rejection.status())),
    }
}

// ============================= ValidBody =====================================

/// Validates the **JSON request body**.
///
/// Requires `Content-Type: application/json` and a non-empty body.
pub struct ValidBody<T>(pub T);

impl<S, T> FromRequest<S> for ValidBody<T>
where
    S: Send + Sync,
    T: Model,
{
    type Rejection = HttpRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let validation = validate_body::<T>();
        let (parts, body) = req.into_parts();
        let data = buffered_request_data(&parts, body, &validation).await?;
        Ok(ValidBody(validation.run(&data)?))
    }
}

// ============================= ValidQuery ====================================

/// Validates **URL query parameters**.
///
/// Values are read as the model's field types ask: `"42"` is a number for
/// an integer field and stays `"42"` for a `String` field. A request without
/// a query string validates `{}`.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: Model,
{
    type Rejection = HttpRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let data = request_data(parts, None)?;
        Ok(ValidQuery(validate_query::<T>().run(&data)?))
    }
}

// ============================= ValidParams ===================================

/// Validates **URL path parameters**.
///
/// Segment values are read the same way as query parameters.
///
/// ```ignore
/// // Route: /users/{id}
/// #[derive(Deserialize, Validate)]
/// struct UserPath {
///     #[validate(range(min = 1))]
///     id: i64,
/// }
///
/// async fn get_user(ValidParams(p): ValidParams<UserPath>) -> String {
///     format!("user {}", p.id)
/// }
/// ```
pub struct ValidParams<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidParams<T>
where
    S: Send + Sync,
    T: Model,
{
    type Rejection = HttpRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let mut data = RequestData::new();
        if let Some(params) = path_params(parts, state).await? {
            data.insert_text(ParamGroup::Params, params);
        }

        let validation = validate::<T>(ParamGroup::Params, "", ValidationOptions::default());
        Ok(ValidParams(validation.run(&data)?))
    }
}

// ============================= Valid =========================================

/// Per-model choice of group, content type and options for [`Valid`].
///
/// ```ignore
/// impl ValidationConfig for Upload {
///     fn validation() -> Validation<Self> {
///         reqguard::validate(
///             "metadata",
///             "",
///             ValidationOptions::default().allow_missing_param_group(false),
///         )
///     }
/// }
/// ```
pub trait ValidationConfig: Model + Sized {
    fn validation() -> Validation<Self>;
}

/// Validates the group chosen by `T`'s [`ValidationConfig`].
///
/// Sees every group: body, query, path params, headers, cookies and the
/// custom groups inserted as [`ExtraParams`](reqguard_http_common::ExtraParams).
/// The body is only read when the configured group is `body`.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: ValidationConfig,
{
    type Rejection = HttpRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validation = T::validation();
        let (mut parts, body) = req.into_parts();

        let params = path_params(&mut parts, state).await?;
        let mut data = buffered_request_data(&parts, body, &validation).await?;
        if let Some(params) = params {
            data.insert_text(ParamGroup::Params, params);
        }

        Ok(Valid(validation.run(&data)?))
    }
}

// ============================= Validated =====================================

/// The model stored in request extensions by
/// `reqguard_tower::ValidateLayer`.
///
/// A missing value means the layer was not applied to the route; the
/// request is answered with `500`.
pub struct Validated<T>(pub T);

impl<S, T> FromRequestParts<S> for Validated<T>
where
    S: Send + Sync,
    T: Clone + Send + Sync + 'static,
{
    type Rejection = HttpRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<T>() {
            Some(value) => Ok(Validated(value.clone())),
            None => {
                tracing::error!(
                    model = std::any::type_name::<T>(),
                    "validated value not found in request extensions; is ValidateLayer applied?"
                );
                Err(HttpError::internal("Validated request data is not available").into())
            }
        }
    }
}

/// Prelude: import everything you need.
pub mod prelude {
    pub use crate::{
        HttpRejection, Valid, ValidBody, ValidParams, ValidQuery, Validated, ValidationConfig,
    };
    pub use reqguard::prelude::*;
}
