mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{in_days, setup};
use dinely_api::routes::app;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(router: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        post_json(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn reservation_create_returns_201_and_lookup_finds_it() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());

    let (status, body) = send(
        &router,
        post_json(
            "/api/reservation/create",
            json!({
                "name": "Ana López",
                "email": "ana.lopez@example.com",
                "date_time": in_days(3),
                "table_area": "terraza",
                "amount_people": 4
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["state"], "active");
    let code = body["data"]["code"].as_str().expect("code").to_string();
    assert!(code.starts_with("DIN-"));

    let (status, body) = send(&router, get(&format!("/api/reservation?code={code}"), None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"][0]["code"], code.as_str());

    let (status, _) = send(
        &router,
        get("/api/reservation?email=nadie%40example.com", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_reservation_returns_400_with_field_keys() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());

    let (status, body) = send(
        &router,
        post_json(
            "/api/reservation/create",
            json!({ "name": "", "email": "sin-arroba", "amount_people": 0 }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &body["data"]["fields"];
    for key in ["valid_name", "valid_email", "valid_date_time", "valid_amount_people"] {
        assert!(fields.get(key).is_some(), "missing {key}: {body}");
    }
    let summary = body["data"]["error"].as_str().expect("summary");
    assert_eq!(summary.lines().count(), 4);
}

#[tokio::test]
async fn staff_routes_require_a_token() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());

    let (status, _) = send(&router, get("/api/kitchen/queue", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/api/bill", Some("Bearer not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        post_json(
            "/api/auth/login",
            json!({ "email": "mesero@dinely.mx", "password": "incorrecta" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn waiter_bill_lifecycle_over_http() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());
    let token = login(&router, "mesero@dinely.mx", "mesero12345").await;

    let (status, body) = send(&router, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_waiter"], true);

    let (status, body) = send(
        &router,
        post_json("/api/bill/open", json!({ "table_code": "A1" }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let bill_id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, _) = send(
        &router,
        post_json("/api/bill/open", json!({ "table_code": "A1" }), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let guacamole = test_app.plate_id("Guacamole").await;
    let (status, body) = send(
        &router,
        post_json(
            &format!("/api/bill/add-plate/{bill_id}"),
            json!({ "plate_id": guacamole, "quantity": 2 }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total"], "230.00");

    let (status, body) = send(
        &router,
        post_json(
            &format!("/api/bill/finalize/{bill_id}"),
            json!({ "amount_paid": "300", "tip_percentage": "10" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["state"], "closed");
    assert_eq!(body["data"]["tip_amount"], "23.00");
    assert_eq!(body["data"]["total_with_tip"], "253.00");
    assert_eq!(body["data"]["change"], "47.00");

    let (status, _) = send(&router, get("/api/admin/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_path_falls_back_to_404() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());
    let (status, body) = send(&router, get("/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/nope");
}

#[tokio::test]
async fn registered_guest_sees_own_reservations_and_reviews_once() {
    let test_app = setup().await;
    let router = app(test_app.state.clone());

    let (status, body) = send(
        &router,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Ana López",
                "email": "ana.lopez@example.com",
                "password": "tacos-y-mas",
                "password_confirmation": "tacos-y-mas"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["is_admin"], false);

    let (status, body) = send(
        &router,
        post_json(
            "/api/reservation/create",
            json!({
                "name": "Ana López",
                "email": "ana.lopez@example.com",
                "date_time": in_days(2),
                "amount_people": 2
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let code = body["data"]["code"].as_str().expect("code").to_string();

    let (status, _) = send(&router, get("/api/reservation/mine", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&router, "ana.lopez@example.com", "tacos-y-mas").await;
    let (status, body) = send(&router, get("/api/reservation/mine", Some(&token))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["items"][0]["code"], code.as_str());

    let review = json!({ "content": "Todo delicioso", "score": 5 });
    let (status, body) = send(&router, post_json("/api/reviews", review.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
    let (status, body) = send(&router, post_json("/api/reviews", review.clone(), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let (status, _) = send(&router, post_json("/api/reviews", review, Some(&token))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&router, get("/api/reviews", Some(&token))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user_has_reviewed"], true);
    assert_eq!(body["data"]["reviews"][0]["user_name"], "Ana López");

    let (status, body) = send(&router, get("/api/reviews", None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user_has_reviewed"], false);

    let (status, _) = send(&router, get("/api/reviews", Some("Bearer not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
