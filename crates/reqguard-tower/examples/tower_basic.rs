use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use reqguard_tower::{validated, ContentTypeLayer, ValidateLayer, ValidatedBody};
use serde::Deserialize;
use tower::{ServiceBuilder, ServiceExt};
use validator::Validate;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

async fn handler(req: Request<ValidatedBody<Full<Bytes>>>) -> Result<Response<Full<Bytes>>, BoxError> {
    // The layer already deserialized and validated the body
    let user: CreateUser = validated(&req);
    println!("Validated user: {:?}", user);

    let resp_body = serde_json::json!({
        "status": "created",
        "name": user.name,
        "email": user.email,
    });

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(serde_json::to_vec(&resp_body)?)))?)
}

fn post(content_type: &str, body: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", content_type)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

async fn print_response(resp: Response<Full<Bytes>>) {
    println!("Status: {}", resp.status());
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    println!("Body: {}", String::from_utf8_lossy(&body));
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("reqguard=debug"))
        .init();

    let svc = ServiceBuilder::new()
        .layer(ValidateLayer::<CreateUser>::body())
        .service_fn(handler);

    println!("=== Valid request ===");
    let req = post(
        "application/json",
        r#"{"name": "Alice", "email": "alice@example.com"}"#,
    );
    print_response(svc.clone().oneshot(req).await.unwrap()).await;

    println!("\n=== Invalid request ===");
    let req = post("application/json", r#"{"name": "A", "email": "bad"}"#);
    print_response(svc.clone().oneshot(req).await.unwrap()).await;

    println!("\n=== Wrong content type ===");
    let req = post("text/plain", "hello");
    print_response(svc.oneshot(req).await.unwrap()).await;

    println!("\n=== Content-type gate only ===");
    let gate = ServiceBuilder::new()
        .layer(ContentTypeLayer::json())
        .service_fn(|_req: Request<Full<Bytes>>| async {
            Ok::<_, BoxError>(Response::new(Full::new(Bytes::from("accepted"))))
        });
    print_response(gate.clone().oneshot(post("application/json", "{}")).await.unwrap()).await;
    print_response(gate.oneshot(post("text/csv", "a,b")).await.unwrap()).await;
}
