use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::content_type::{ContentTypeCheck, APPLICATION_JSON};
use crate::error::HttpError;
use crate::model::{flatten_issues, Model, ModelError};
use crate::options::ValidationOptions;
use crate::param::{ParamGroup, RequestData};
use crate::text::from_text_value;

/// Maps one parameter group of a request onto a `T` and validates it.
///
/// Built with [`validate`], [`validate_body`] or [`validate_query`] and run
/// once per request by a framework integration. The adapter is stateless,
/// so a single instance can be shared by every request of a route.
pub struct Validation<T> {
    group: ParamGroup,
    content_type: Option<ContentTypeCheck>,
    options: ValidationOptions,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Validation<T> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            content_type: self.content_type.clone(),
            options: self.options.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Validation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("model", &type_name::<T>())
            .field("group", &self.group)
            .field("content_type", &self.content_type)
            .field("options", &self.options)
            .finish()
    }
}

impl<T> Validation<T> {
    /// Validate `group` with default options and no content-type check.
    pub fn new(group: impl Into<ParamGroup>) -> Self {
        Self {
            group: group.into(),
            content_type: None,
            options: ValidationOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Require a matching `Content-Type` header. An empty value disables
    /// the check.
    pub fn content_type(mut self, expected: &str) -> Self {
        self.content_type = (!expected.is_empty()).then(|| ContentTypeCheck::new(expected));
        self
    }

    /// Use a prepared check, e.g. one carrying a custom error.
    pub fn content_type_check(mut self, check: ContentTypeCheck) -> Self {
        self.content_type = Some(check);
        self
    }

    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn group(&self) -> &ParamGroup {
        &self.group
    }

    pub fn get_options(&self) -> &ValidationOptions {
        &self.options
    }

    pub fn get_content_type(&self) -> Option<&ContentTypeCheck> {
        self.content_type.as_ref()
    }

    /// Does this validation read the request body?
    pub fn reads_body(&self) -> bool {
        self.group == ParamGroup::Body
    }
}

impl<T: Model> Validation<T> {
    /// Run the adapter against one request.
    ///
    /// Returns the deserialized, validated model or the error the
    /// framework should respond with.
    pub fn run(&self, request: &RequestData) -> Result<T, HttpError> {
        self.run_inner(request).inspect_err(|err| self.log_rejection(err))
    }

    /// Only the content-type step of [`run`](Self::run).
    ///
    /// Integrations call it on the raw header before buffering or decoding
    /// the body, so a body in an unexpected format is never parsed.
    pub fn check_content_type(&self, header: Option<&str>) -> Result<(), HttpError> {
        self.content_type_step(header).inspect_err(|err| self.log_rejection(err))
    }

    fn log_rejection(&self, err: &HttpError) {
        if err.is_internal() {
            tracing::warn!(
                group = %self.group,
                model = type_name::<T>(),
                status = err.status().as_u16(),
                error = %err,
                "request validation failed"
            );
        } else {
            tracing::debug!(
                group = %self.group,
                model = type_name::<T>(),
                status = err.status().as_u16(),
                error = %err,
                "request rejected"
            );
        }
    }

    fn content_type_step(&self, header: Option<&str>) -> Result<(), HttpError> {
        let Some(check) = &self.content_type else {
            return Ok(());
        };
        if check.matches(header) {
            return Ok(());
        }
        if let Some(err) = check.error() {
            return Err(err.clone());
        }
        Err(HttpError::bad_request(format!(
            "Invalid header content-type=\"{}\". Expected \"{}\"",
            header.unwrap_or("undefined"),
            check.expected()
        )))
    }

    fn run_inner(&self, request: &RequestData) -> Result<T, HttpError> {
        self.content_type_step(request.content_type())?;

        let group = &self.group;
        let data = match request.group(group) {
            Some(data) => data.clone(),
            None if self.options.allow_missing_param_group => Value::Object(Default::default()),
            None => {
                return Err(HttpError::bad_request(format!(
                    "Request {} - missing {}.",
                    group, group
                )))
            }
        };

        let assigned = if request.is_text(group) {
            from_text_value::<T>(data.clone())
        } else {
            serde_json::from_value::<T>(data.clone())
        };
        let model: T = assigned.map_err(|err| {
            HttpError::bad_request(format!(
                "Failed to assign data=\"{}\" to its model \"{}\": {}",
                data,
                short_type_name::<T>(),
                err
            ))
        })?;

        match model.validate_model() {
            Ok(()) => Ok(model),
            Err(ModelError::Invalid(errors)) => {
                let issues = flatten_issues(&errors);
                Err(HttpError::bad_request(format!(
                    "Validation of request {}. {}",
                    group,
                    crate::model::join_issues(&issues)
                ))
                .with_issues(issues))
            }
            Err(ModelError::Internal(details)) => Err(HttpError::internal(format!(
                "Validator returned an unknown error during validation of request {}. Details: {}",
                group, details
            ))),
        }
    }
}

/// `my_app::models::User` → `User`.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Generic adapter: validate `group`, optionally requiring `content_type`
/// (empty string = no check).
pub fn validate<T: Model>(
    group: impl Into<ParamGroup>,
    content_type: &str,
    options: ValidationOptions,
) -> Validation<T> {
    Validation::new(group)
        .content_type(content_type)
        .options(options)
}

/// JSON body adapter: requires `application/json` and a present body.
pub fn validate_body<T: Model>() -> Validation<T> {
    validate(
        ParamGroup::Body,
        APPLICATION_JSON,
        ValidationOptions::default().allow_missing_param_group(false),
    )
}

/// Query adapter: no content-type requirement, a missing query is `{}`.
pub fn validate_query<T: Model>() -> Validation<T> {
    validate(
        ParamGroup::Query,
        "",
        ValidationOptions::default().allow_missing_param_group(true),
    )
}
