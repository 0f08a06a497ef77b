//! Table-driven checks for models.
//!
//! Feed a model a list of inputs together with the expected verdict and
//! let the same adapters the middleware uses decide:
//!
//! ```ignore
//! use reqguard::testing::{assert_cases, Case};
//! use reqguard::ParamGroup;
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Deserialize, Validate)]
//! struct User {
//!     #[validate(email)]
//!     email: String,
//! }
//!
//! assert_cases::<User>(
//!     &ParamGroup::Body,
//!     &[
//!         Case::valid(serde_json::json!({ "email": "abc@def.com" })),
//!         Case::invalid(serde_json::json!({ "email": "abcdef.com" })),
//!     ],
//! );
//! ```

use serde_json::Value;

use crate::error::HttpError;
use crate::model::Model;
use crate::options::ValidationOptions;
use crate::param::{ParamGroup, RequestData};
use crate::validate::{validate, validate_body, validate_query, Validation};

/// One input and whether the model is expected to accept it.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub is_valid: bool,
    pub data: Value,
}

impl Case {
    pub fn valid(data: Value) -> Self {
        Self {
            is_valid: true,
            data,
        }
    }

    pub fn invalid(data: Value) -> Self {
        Self {
            is_valid: false,
            data,
        }
    }
}

/// Outcome of one [`Case`].
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub index: usize,
    pub case: Case,
    /// Error returned by the adapter, if any.
    pub error: Option<HttpError>,
    /// Why the case failed; `None` when the verdict matched.
    pub failure: Option<String>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

fn adapter_for<T: Model>(group: &ParamGroup) -> Validation<T> {
    match group {
        ParamGroup::Body => validate_body(),
        ParamGroup::Query => validate_query(),
        other => validate(other.clone(), "", ValidationOptions::default()),
    }
}

/// Run every case through the adapter for `group`.
///
/// The content-type header always matches what the adapter expects, so
/// only the mapping and the constraints are exercised.
pub fn run_cases<T: Model>(group: &ParamGroup, cases: &[Case]) -> Vec<CaseReport> {
    let adapter = adapter_for::<T>(group);
    let content_type = adapter
        .get_content_type()
        .map(|check| check.expected().to_string())
        .unwrap_or_else(|| crate::content_type::APPLICATION_JSON.to_string());

    cases
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, case)| {
            let request = RequestData::new()
                .with_content_type(content_type.clone())
                .with_group(group.clone(), case.data.clone());

            let error = adapter.run(&request).err();
            let failure = match (&error, case.is_valid) {
                (Some(err), _) if err.is_internal() => {
                    Some(format!("Unexpected error while validating: {}", err))
                }
                (Some(err), true) => Some(format!("Validation failed. Detailed error: {}", err)),
                (None, false) => Some("Validation passed but a failure was expected.".to_string()),
                _ => None,
            };

            CaseReport {
                index,
                case,
                error,
                failure,
            }
        })
        .collect()
}

/// Like [`run_cases`], panicking with every failing case.
#[track_caller]
pub fn assert_cases<T: Model>(group: &ParamGroup, cases: &[Case]) {
    let failures: Vec<String> = run_cases::<T>(group, cases)
        .into_iter()
        .filter_map(|report| {
            report
                .failure
                .map(|reason| format!("data[{}]={}: {}", report.index, report.case.data, reason))
        })
        .collect();

    if !failures.is_empty() {
        panic!(
            "{} of {} cases failed for `{}`:\n{}",
            failures.len(),
            cases.len(),
            std::any::type_name::<T>(),
            failures.join("\n")
        );
    }
}
