use serde::Deserialize;

/// Tuning knobs of a [`Validation`](crate::Validation).
///
/// Deserializable with defaults, so it can sit inside an application's
/// own configuration:
///
/// ```
/// use reqguard::ValidationOptions;
///
/// let opts: ValidationOptions =
///     serde_json::from_str(r#"{ "body_limit": 65536 }"#).unwrap();
/// assert!(opts.allow_missing_param_group);
/// assert_eq!(opts.body_limit, Some(65536));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Treat a missing parameter group as an empty object instead of
    /// rejecting the request.
    pub allow_missing_param_group: bool,
    /// Upper bound for buffered request bodies. `None` means unlimited.
    pub body_limit: Option<usize>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            allow_missing_param_group: true,
            body_limit: None,
        }
    }
}

impl ValidationOptions {
    pub fn allow_missing_param_group(mut self, allow: bool) -> Self {
        self.allow_missing_param_group = allow;
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }
}
