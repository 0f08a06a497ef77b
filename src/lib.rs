//! # reqguard — request validation glue
//!
//! `reqguard` sits between an HTTP framework and a validation library. For
//! one request it:
//!
//! 1. optionally checks the `Content-Type` header;
//! 2. picks a parameter group (body, query, path params, headers, cookies
//!    or a custom group);
//! 3. maps it onto a model with `serde`;
//! 4. runs the model's `validator` constraints;
//! 5. returns the validated model, or an [`HttpError`] carrying the status
//!    the framework should answer with.
//!
//! Framework integrations live in `reqguard-axum` and `reqguard-tower`.
//!
//! ## Quick Start
//!
//! ```rust
//! use reqguard::prelude::*;
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Debug, Deserialize, Validate)]
//! struct CreateUser {
//!     #[validate(email)]
//!     email: String,
//!     #[validate(length(min = 10, max = 20))]
//!     surname: Option<String>,
//! }
//!
//! let request = RequestData::new()
//!     .with_content_type("application/json")
//!     .with_group(ParamGroup::Body, serde_json::json!({ "email": "alex@example.com" }));
//!
//! let user = validate_body::<CreateUser>().run(&request).unwrap();
//! assert_eq!(user.email, "alex@example.com");
//!
//! let bad = RequestData::new()
//!     .with_content_type("application/json")
//!     .with_group(ParamGroup::Body, serde_json::json!({ "email": "nope" }));
//! let err = validate_body::<CreateUser>().run(&bad).unwrap_err();
//! assert_eq!(err.status().as_u16(), 400);
//! ```

pub mod content_type;
pub mod error;
pub mod model;
pub mod options;
pub mod param;
#[cfg(feature = "testing")]
pub mod testing;
pub mod text;
pub mod validate;

pub use content_type::{content_type_check, is_content_type, ContentTypeCheck};
pub use error::{HttpError, Issue};
pub use model::{flatten_issues, Model, ModelError};
pub use options::ValidationOptions;
pub use param::{ParamGroup, RequestData};
pub use text::from_text_value;
pub use validate::{validate, validate_body, validate_query, Validation};

// Re-exported so integrations and users agree on one version.
#[doc(hidden)]
pub use serde_json;
pub use validator;

/// Prelude: import everything you need.
pub mod prelude {
    pub use crate::content_type::{content_type_check, ContentTypeCheck};
    pub use crate::error::{HttpError, Issue};
    pub use crate::model::{Model, ModelError};
    pub use crate::options::ValidationOptions;
    pub use crate::param::{ParamGroup, RequestData};
    pub use crate::validate::{validate, validate_body, validate_query, Validation};
}
