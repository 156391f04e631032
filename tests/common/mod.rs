// 集成测试共用的请求辅助函数
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("response should carry a Location header")
    }
}

// 发送请求并获取状态码、响应头和 JSON 响应体
pub async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(axum::http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // 空响应体记为 null
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    TestResponse { status, headers, body }
}

pub async fn create_tag(app: &Router, name: &str) -> String {
    let res = request(app, Method::POST, "/tags", Some(json!({ "name": name }))).await;
    assert_eq!(res.status, StatusCode::CREATED, "tag creation failed: {}", res.body);
    res.location().to_string()
}

pub async fn create_note(app: &Router, payload: Value) -> TestResponse {
    request(app, Method::POST, "/notes", Some(payload)).await
}
