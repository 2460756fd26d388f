use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use platform_db::MemoryEmployeeStore;
use serde_json::{Value, json};
use staffdesk_server::{AppConfig, AppState, EmployeeService, build_router};
use tower::ServiceExt;
use url::form_urlencoded::byte_serialize;

fn app() -> Router {
    let service = EmployeeService::new(Arc::new(MemoryEmployeeStore::new()));
    build_router(AppState::new(service, Arc::new(AppConfig::default())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn query(path: &str, input: Option<Value>) -> Request<Body> {
    let uri = match input {
        Some(input) => {
            let encoded = byte_serialize(input.to_string().as_bytes()).collect::<String>();
            format!("/trpc/{path}?input={encoded}")
        }
        None => format!("/trpc/{path}"),
    };
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn mutation(path: &str, input: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/trpc/{path}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(input.to_string()))
        .unwrap()
}

fn ada() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@x.com",
        "department": "Engineering",
        "position": "Analyst",
        "salary": 90000
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn create_update_delete_flow() {
    let app = app();
    let (status, body) = send(&app, mutation("employee.create", ada())).await;
    assert_eq!(status, StatusCode::OK);
    let created = &body["result"]["data"];
    assert_eq!(created["isActive"], true);
    let id = created["id"].as_i64().unwrap();

    let (_, body) = send(&app, query("employee.getAll", None)).await;
    assert_eq!(body["result"]["data"][0]["firstName"], "Ada");

    let (status, body) = send(
        &app,
        mutation("employee.update", json!({"id": id, "salary": 95000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["salary"], 95000.0);
    assert_eq!(body["result"]["data"]["firstName"], "Ada");

    let (status, body) = send(&app, mutation("employee.delete", json!({"id": id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["id"], id);

    let (status, body) = send(&app, query("employee.getById", Some(json!({"id": id})))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["data"]["path"], "employee.getById");
}

#[tokio::test]
async fn validation_errors_list_every_field() {
    let app = app();
    let (status, body) = send(
        &app,
        mutation(
            "employee.create",
            json!({"firstName": "", "email": "nope", "salary": -1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    let fields = body["error"]["data"]["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["field"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    for field in ["firstName", "lastName", "email", "department", "position", "salary"] {
        assert!(fields.iter().any(|f| f == field), "missing issue for {field}");
    }

    let (_, body) = send(&app, query("employee.getAll", None)).await;
    assert_eq!(body["result"]["data"], json!([]));
}

#[tokio::test]
async fn search_filters_and_orders() {
    let app = app();
    let mut grace = ada();
    grace["firstName"] = json!("Grace");
    grace["email"] = json!("grace@x.com");
    grace["department"] = json!("Research");
    let mut linus = ada();
    linus["firstName"] = json!("Linus");
    linus["email"] = json!("linus@x.com");
    for payload in [ada(), grace, linus] {
        let (status, _) = send(&app, mutation("employee.create", payload)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, query("employee.search", Some(json!({"query": "Engin"})))).await;
    let names = body["result"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["firstName"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Linus", "Ada"]);

    let (status, body) = send(&app, query("employee.search", Some(json!({"query": "zzz"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"], json!([]));
}

#[tokio::test]
async fn transport_errors_use_rpc_codes() {
    let app = app();

    let (status, body) = send(&app, query("employee.drop", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send(&app, mutation("employee.getAll", Value::Null)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], "METHOD_NOT_SUPPORTED");

    let (status, body) = send(&app, query("employee.create", None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], "METHOD_NOT_SUPPORTED");

    let request = Request::builder()
        .uri("/trpc/employee.getById?input=%7Bid")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PARSE_ERROR");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/trpc/employee.delete")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn cors_preflight_allows_the_frontend_origin() {
    let app = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/trpc/employee.create")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn request_ids_are_propagated() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn graphql_mirrors_the_procedures() {
    let app = app();
    send(&app, mutation("employee.create", ada())).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"query": "{ searchEmployees(query: \"Love\") { firstName isActive } }"})
                .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["searchEmployees"],
        json!([{"firstName": "Ada", "isActive": true}])
    );
}
