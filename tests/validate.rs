use reqguard::prelude::*;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
struct UserClass {
    #[validate(email)]
    email: String,
    #[validate(length(min = 10, max = 20))]
    surname: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct Filters {
    #[validate(range(min = 1, max = 50))]
    limit: Option<u32>,
    #[serde(default)]
    archived: bool,
}

fn json_request(body: serde_json::Value) -> RequestData {
    RequestData::new()
        .with_content_type("application/json")
        .with_group(ParamGroup::Body, body)
}

#[test]
fn body_valid() {
    let user = validate_body::<UserClass>()
        .run(&json_request(json!({"email": "abc@def.com", "surname": "1234567890"})))
        .unwrap();
    assert_eq!(user.email, "abc@def.com");
    assert_eq!(user.surname.as_deref(), Some("1234567890"));
}

#[test]
fn body_requires_json_content_type() {
    let req = RequestData::new()
        .with_content_type("text/plain")
        .with_group(ParamGroup::Body, json!({"email": "abc@def.com"}));
    let err = validate_body::<UserClass>().run(&req).unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert_eq!(
        err.message(),
        "Invalid header content-type=\"text/plain\". Expected \"application/json\""
    );
}

#[test]
fn missing_content_type_reads_undefined() {
    let err = validate_body::<UserClass>()
        .check_content_type(None)
        .unwrap_err();
    assert_eq!(
        err.message(),
        "Invalid header content-type=\"undefined\". Expected \"application/json\""
    );
    assert!(validate_body::<UserClass>()
        .check_content_type(Some("application/json; charset=utf-8"))
        .is_ok());
}

#[test]
fn body_missing_is_rejected() {
    let req = RequestData::new().with_content_type("application/json");
    let err = validate_body::<UserClass>().run(&req).unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert_eq!(err.message(), "Request body - missing body.");

    let req = json_request(serde_json::Value::Null);
    let err = validate_body::<UserClass>().run(&req).unwrap_err();
    assert_eq!(err.message(), "Request body - missing body.");
}

#[test]
fn body_constraint_failures_are_collected() {
    let err = validate_body::<UserClass>()
        .run(&json_request(json!({"email": " ", "surname": "too short"})))
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert!(err.message().starts_with("Validation of request body. "));

    let issues = err.issues();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].path, "email");
    assert_eq!(issues[0].code, "email");
    assert_eq!(issues[1].path, "surname");
    assert_eq!(issues[1].code, "length");
}

#[test]
fn assign_failure_names_the_model() {
    let err = validate_body::<UserClass>()
        .run(&json_request(json!({"email": 42})))
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert!(err
        .message()
        .starts_with("Failed to assign data=\"{\"email\":42}\" to its model \"UserClass\""));
    assert!(err.issues().is_empty());
}

#[test]
fn query_missing_becomes_empty_object() {
    let filters = validate_query::<Filters>().run(&RequestData::new()).unwrap();
    assert_eq!(filters.limit, None);
    assert!(!filters.archived);
}

#[test]
fn query_has_no_content_type_requirement() {
    let req = RequestData::new()
        .with_content_type("text/html")
        .with_group(ParamGroup::Query, json!({"limit": 10, "archived": true}));
    let filters = validate_query::<Filters>().run(&req).unwrap();
    assert_eq!(filters.limit, Some(10));
    assert!(filters.archived);
}

#[test]
fn query_text_values_follow_field_types() {
    let req = RequestData::new()
        .with_text_group(ParamGroup::Query, json!({"limit": "10", "archived": "true"}));
    let filters = validate_query::<Filters>().run(&req).unwrap();
    assert_eq!(filters.limit, Some(10));
    assert!(filters.archived);
}

#[derive(Debug, Deserialize, Validate)]
struct Lookup {
    #[validate(length(min = 1))]
    name: String,
}

#[test]
fn numeric_looking_text_stays_a_string() {
    let req = RequestData::new().with_text_group(ParamGroup::Query, json!({"name": "01234"}));
    let lookup = validate_query::<Lookup>().run(&req).unwrap();
    assert_eq!(lookup.name, "01234");
}

#[test]
fn unparseable_text_fails_to_assign() {
    let req = RequestData::new().with_text_group(ParamGroup::Query, json!({"limit": "ten"}));
    let err = validate_query::<Filters>().run(&req).unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert!(err
        .message()
        .starts_with("Failed to assign data=\"{\"limit\":\"ten\"}\" to its model \"Filters\""));
}

#[test]
fn json_groups_stay_strict() {
    let req = json_request(json!({"email": "abc@def.com", "surname": 1234567890}));
    let err = validate_body::<UserClass>().run(&req).unwrap_err();
    assert!(err.message().starts_with("Failed to assign data="));
}

#[test]
fn query_out_of_range() {
    let req = RequestData::new().with_group(ParamGroup::Query, json!({"limit": 500}));
    let err = validate_query::<Filters>().run(&req).unwrap_err();
    assert!(err.message().starts_with("Validation of request query. limit:"));
}

#[test]
fn generic_group_with_defaults() {
    let validation = validate::<Filters>("filters", "", ValidationOptions::default());
    assert!(validation.get_content_type().is_none());
    assert_eq!(validation.group(), &ParamGroup::Other("filters".into()));

    let filters = validation.run(&RequestData::new()).unwrap();
    assert_eq!(filters.limit, None);

    let req = RequestData::new().with_group("filters", json!({"limit": 3}));
    assert_eq!(validation.run(&req).unwrap().limit, Some(3));
}

#[test]
fn caller_options_are_honoured() {
    let validation = validate::<Filters>(
        "filters",
        "",
        ValidationOptions::default().allow_missing_param_group(false),
    );
    let err = validation.run(&RequestData::new()).unwrap_err();
    assert_eq!(err.message(), "Request filters - missing filters.");
}

#[test]
fn generic_group_with_content_type() {
    let validation = validate::<Filters>(ParamGroup::Body, "urlencoded", ValidationOptions::default());
    let req = RequestData::new()
        .with_content_type("application/x-www-form-urlencoded")
        .with_group(ParamGroup::Body, json!({"limit": 2}));
    assert_eq!(validation.run(&req).unwrap().limit, Some(2));

    let req = RequestData::new().with_content_type("application/json");
    assert!(validation.run(&req).is_err());
}

#[test]
fn custom_content_type_error_is_used() {
    let validation = Validation::<Filters>::new(ParamGroup::Body).content_type_check(
        ContentTypeCheck::new("application/json")
            .with_error(HttpError::new("json please", http::StatusCode::UNSUPPORTED_MEDIA_TYPE)),
    );
    let err = validation.run(&RequestData::new()).unwrap_err();
    assert_eq!(err.status().as_u16(), 415);
    assert_eq!(err.message(), "json please");

    let err = validation.check_content_type(Some("text/plain")).unwrap_err();
    assert_eq!(err.status().as_u16(), 415);
    assert_eq!(err.message(), "json please");
}

#[test]
fn only_the_body_group_reads_the_body() {
    assert!(validate_body::<UserClass>().reads_body());
    assert!(!validate_query::<Filters>().reads_body());
    assert!(!Validation::<Filters>::new(ParamGroup::Headers).reads_body());
    assert!(!validate::<Filters>("filters", "", ValidationOptions::default()).reads_body());
}

#[derive(Debug, Deserialize)]
struct Broken {}

impl Model for Broken {
    fn validate_model(&self) -> Result<(), ModelError> {
        Err(ModelError::Internal("schema cache poisoned".into()))
    }
}

#[test]
fn internal_validator_error_is_500() {
    let err = validate_query::<Broken>().run(&RequestData::new()).unwrap_err();
    assert_eq!(err.status().as_u16(), 500);
    assert!(err.is_internal());
    assert_eq!(
        err.message(),
        "Validator returned an unknown error during validation of request query. Details: schema cache poisoned"
    );
}

#[test]
fn adapter_is_reusable() {
    let validation = validate_body::<UserClass>();
    let cloned = validation.clone();
    for email in ["a@b.co", "c@d.co"] {
        let req = json_request(json!({ "email": email }));
        assert_eq!(validation.run(&req).unwrap().email, email);
        assert_eq!(cloned.run(&req).unwrap().email, email);
    }
    assert!(format!("{:?}", validation).contains("UserClass"));
}
