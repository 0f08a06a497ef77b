//! The seam between the adapter and the validation library.
//!
//! A *model* is a plain struct that can be built from a parameter group
//! (`serde::Deserialize`) and knows how to check its own constraints.
//! Every `#[derive(Deserialize, Validate)]` struct is a model through the
//! blanket implementation below:
//!
//! ```
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Deserialize, Validate)]
//! struct User {
//!     #[validate(email)]
//!     email: String,
//!     #[validate(length(min = 10, max = 20))]
//!     surname: Option<String>,
//! }
//!
//! fn assert_model<T: reqguard::Model>() {}
//! assert_model::<User>();
//! ```
//!
//! Implement [`Model`] by hand when constraints are checked by something
//! other than `validator`; return [`ModelError::Internal`] when the check
//! itself could not run.

use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::Issue;

/// Failure reported by [`Model::validate_model`].
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model violates one or more constraints.
    #[error("{}", join_issues(&flatten_issues(.0)))]
    Invalid(#[from] ValidationErrors),
    /// The validator failed for a reason unrelated to the input.
    #[error("{0}")]
    Internal(String),
}

/// A type a parameter group can be mapped onto and validated as.
pub trait Model: DeserializeOwned {
    fn validate_model(&self) -> Result<(), ModelError>;
}

impl<T> Model for T
where
    T: DeserializeOwned + Validate,
{
    fn validate_model(&self) -> Result<(), ModelError> {
        self.validate().map_err(ModelError::Invalid)
    }
}

/// Flatten nested `validator` errors into a sorted list of [`Issue`]s.
pub fn flatten_issues(errors: &ValidationErrors) -> Vec<Issue> {
    let mut issues = Vec::new();
    collect(errors, "", &mut issues);
    issues.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.code.cmp(&b.code)));
    issues
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Issue>) {
    for (field, kind) in errors.errors() {
        // Struct-level (schema) errors are keyed `__all__` and belong to the
        // enclosing path.
        let path = match (prefix.is_empty(), field.as_ref()) {
            (_, "__all__") => prefix.to_string(),
            (true, _) => field.to_string(),
            (false, _) => format!("{}.{}", prefix, field),
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|err| Issue {
                    path: path.clone(),
                    code: err.code.to_string(),
                    message: describe(err),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

fn describe(err: &ValidationError) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None => format!("failed `{}` constraint", err.code),
    }
}

pub(crate) fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
