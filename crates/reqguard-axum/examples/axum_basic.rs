//! Axum example showing the reqguard extractors.
//!
//! Run:
//! ```sh
//! RUST_LOG=reqguard=debug cargo run -p reqguard-axum --example axum_basic
//! ```
//!
//! Try:
//! ```sh
//! curl -i -X POST localhost:3000/users -H 'content-type: application/json' \
//!      -d '{"email":"abc@def.com","surname":"1234567890"}'
//! curl -i -X POST localhost:3000/users -H 'content-type: application/json' \
//!      -d '{"email":"abcdef.com"}'
//! curl -i 'localhost:3000/users?limit=500'
//! curl -i localhost:3000/users/0
//! ```

use axum::response::Json;
use axum::{routing, Router};
use reqguard_axum::prelude::*;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use validator::Validate;

// ===========================================================================
// POST /users — ValidBody
// ===========================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 10, max = 20))]
    pub surname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub status: &'static str,
    pub email: String,
}

async fn create_user(ValidBody(user): ValidBody<CreateUser>) -> Json<UserResponse> {
    println!("-> POST /users  {user:?}");
    Json(UserResponse {
        status: "created",
        email: user.email,
    })
}

// ===========================================================================
// GET /users — ValidQuery
// ===========================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListUsers {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[validate(length(min = 1))]
    pub email: Option<String>,
}

async fn list_users(ValidQuery(query): ValidQuery<ListUsers>) -> Json<serde_json::Value> {
    println!("-> GET /users  {query:?}");
    Json(serde_json::json!({
        "limit": query.limit.unwrap_or(20),
        "filter": query.email,
        "users": [],
    }))
}

// ===========================================================================
// GET /users/{id} — ValidParams
// ===========================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct UserPath {
    #[validate(range(min = 1))]
    pub id: i64,
}

async fn get_user(ValidParams(path): ValidParams<UserPath>) -> Json<serde_json::Value> {
    println!("-> GET /users/{{id}}  {path:?}");
    Json(serde_json::json!({ "id": path.id }))
}

// ===========================================================================
// GET /whoami — Valid with a custom group
// ===========================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct Client {
    #[validate(length(min = 1))]
    pub user_agent: String,
}

impl ValidationConfig for Client {
    fn validation() -> Validation<Self> {
        validate(
            ParamGroup::Headers,
            "",
            ValidationOptions::default().allow_missing_param_group(false),
        )
    }
}

async fn whoami(Valid(client): Valid<Client>) -> String {
    format!("you are {}", client.user_agent)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reqguard=debug")),
        )
        .init();

    let app = Router::new()
        .route("/users", routing::post(create_user).get(list_users))
        .route("/users/{id}", routing::get(get_user))
        .route("/whoami", routing::get(whoami));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();
    println!("listening on http://{}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}
