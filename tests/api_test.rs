//! End-to-end checks of the HTTP surface, driven in-process with `oneshot`.

mod common;

use angelic::db::models::UserRole;
use angelic::routes;
use angelic::state::AppState;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{add_service, add_staff, add_user, count, setup};

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    // Keep only the "name=value" pair
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        cookie,
        body,
    }
}

fn signup_body(username: &str) -> Value {
    json!({
        "name": "Alice Johnson",
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "hunter22",
        "image": "alice.png",
        "gender": "Female",
    })
}

async fn login(app: &Router, username: &str) -> String {
    let reply = send(
        app,
        Method::POST,
        "/login",
        Some(json!({ "username": username, "password": "password123" })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    reply.cookie.expect("login sets a session cookie")
}

fn app_for(state: &AppState) -> Router {
    routes::app(state.clone())
}

// ============================================================================
// ACCOUNTS
// ============================================================================

#[tokio::test]
async fn test_signup_starts_a_session() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let reply = send(&app, Method::POST, "/signup", Some(signup_body("alicej")), None).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["user"]["username"], "alicej");
    assert_eq!(reply.body["user"]["role"], "user");
    assert!(reply.body["user"].get("password_hash").is_none());
    let cookie = reply.cookie.unwrap();
    assert!(cookie.starts_with("angelic_session="));

    let me = send(&app, Method::GET, "/check_session", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alicej");
    assert_eq!(me.body["email"], "alicej@example.com");
}

#[tokio::test]
async fn test_signup_cannot_claim_admin_role() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let mut body = signup_body("sneaky");
    body["role"] = json!("admin");
    let reply = send(&app, Method::POST, "/signup", Some(body), None).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["user"]["role"], "user");
}

#[tokio::test]
async fn test_duplicate_signup_conflicts_without_new_row() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let first = send(&app, Method::POST, "/signup", Some(signup_body("alicej")), None).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let again = send(&app, Method::POST, "/signup", Some(signup_body("alicej")), None).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert!(again.body["error"].is_string());
    assert_eq!(count(&state, "users"), 1);
}

#[tokio::test]
async fn test_signup_reports_missing_fields() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let reply = send(
        &app,
        Method::POST,
        "/signup",
        Some(json!({ "name": "Bob", "username": "bob" })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Missing fields: email, password, image");
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let (_tmp, state) = setup();
    add_user(&state, "bob", UserRole::User);
    let app = app_for(&state);

    let reply = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "bob", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body, json!({ "error": "Invalid credentials" }));

    let unknown = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({ "username": "nobody", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let (_tmp, state) = setup();
    add_user(&state, "bob", UserRole::User);
    let app = app_for(&state);
    let cookie = login(&app, "bob").await;

    let out = send(&app, Method::POST, "/logout", None, Some(&cookie)).await;
    assert_eq!(out.status, StatusCode::OK);

    let me = send(&app, Method::GET, "/check_session", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// BOOKINGS & PAYMENTS
// ============================================================================

#[tokio::test]
async fn test_booking_requires_session_and_rejects_double_booking() {
    let (_tmp, state) = setup();
    let service = add_service(&state, "Haircut", 20.0);
    let staff = add_staff(&state, "Lisa");
    add_user(&state, "alice", UserRole::User);
    add_user(&state, "bob", UserRole::User);
    let app = app_for(&state);

    let body = json!({
        "service_id": service.id,
        "staff_id": staff.id,
        "booking_time": "2026-11-02T10:00:00Z",
    });

    let anonymous = send(&app, Method::POST, "/bookings", Some(body.clone()), None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let alice = login(&app, "alice").await;
    let created = send(&app, Method::POST, "/bookings", Some(body.clone()), Some(&alice)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["booking"]["status"], "pending");

    let bob = login(&app, "bob").await;
    let clash = send(&app, Method::POST, "/bookings", Some(body), Some(&bob)).await;
    assert_eq!(clash.status, StatusCode::CONFLICT);
    assert_eq!(clash.body["error"], "staff already booked");

    let listed = send(&app, Method::GET, "/bookings", None, Some(&bob)).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn test_payment_amount_is_checked_against_price() {
    let (_tmp, state) = setup();
    let service = add_service(&state, "Haircut", 20.0);
    let staff = add_staff(&state, "Mike");
    let app = app_for(&state);

    let mut body = json!({
        "service_id": service.id,
        "staff_id": staff.id,
        "client_name": "Walk-in",
        "amount_paid": 15.0,
        "time_taken": 0.5,
    });

    let wrong = send(&app, Method::POST, "/transactions", Some(body.clone()), None).await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    let message = wrong.body["error"].as_str().unwrap();
    assert!(message.contains("Expected: 20.0, Received: 15.0"), "{}", message);
    assert_eq!(count(&state, "transactions"), 0);

    body["amount_paid"] = json!(20.0);
    let paid = send(&app, Method::POST, "/transactions", Some(body), None).await;
    assert_eq!(paid.status, StatusCode::CREATED);
    assert_eq!(paid.body["message"], "Transaction successfully added");

    let listed = send(&app, Method::GET, "/transactions", None, None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let reply = send(&app, Method::GET, "/services/missing", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "Service not found");

    let reply = send(&app, Method::GET, "/staff/missing", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// CATALOG, REVIEWS, REPORTS
// ============================================================================

#[tokio::test]
async fn test_staff_reviews_route_is_not_a_staff_id() {
    let (_tmp, state) = setup();
    add_staff(&state, "Lisa");
    let app = app_for(&state);

    let reply = send(&app, Method::GET, "/staff/reviews", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body[0]["name"], "Lisa");
    assert_eq!(reply.body[0]["average_rating"], Value::Null);
}

#[tokio::test]
async fn test_review_out_of_range_is_rejected() {
    let (_tmp, state) = setup();
    let staff = add_staff(&state, "Lisa");
    let client = add_user(&state, "alice", UserRole::User);
    let app = app_for(&state);

    let reply = send(
        &app,
        Method::POST,
        "/reviews",
        Some(json!({ "staff_id": staff.id, "client_id": client.id, "rating": 6 })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        Method::POST,
        "/reviews",
        Some(json!({ "staff_id": staff.id, "client_id": client.id, "rating": 5 })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let staff_view = send(&app, Method::GET, &format!("/staff/{}", staff.id), None, None).await;
    assert_eq!(staff_view.body["average_rating"], 5.0);
}

#[tokio::test]
async fn test_staff_writes_require_a_session() {
    let (_tmp, state) = setup();
    add_user(&state, "alice", UserRole::User);
    let app = app_for(&state);
    let body = json!({
        "name": "Ravi",
        "picture": "ravi.png",
        "gender": "male",
        "role": "barber",
    });

    let anonymous = send(&app, Method::POST, "/staff", Some(body.clone()), None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "alice").await;
    let created = send(&app, Method::POST, "/staff", Some(body), Some(&cookie)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["staff"]["role"], "barber");
}

#[tokio::test]
async fn test_reports_use_camel_case_keys() {
    let (_tmp, state) = setup();
    let app = app_for(&state);

    let reply = send(&app, Method::GET, "/reports", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["dailyRevenue"], 0.0);
    assert_eq!(reply.body["mostBookedStaff"], json!([]));

    let summary = send(&app, Method::GET, "/reports/summary", None, None).await;
    assert_eq!(summary.body["total_services"], 0);
}

// ============================================================================
// ADMIN
// ============================================================================

#[tokio::test]
async fn test_member_admin_is_role_gated() {
    let (_tmp, state) = setup();
    add_user(&state, "alice", UserRole::User);
    add_user(&state, "boss", UserRole::Admin);
    let app = app_for(&state);

    let anonymous = send(&app, Method::GET, "/admin/members", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let alice = login(&app, "alice").await;
    let denied = send(&app, Method::GET, "/admin/members", None, Some(&alice)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let boss = login(&app, "boss").await;
    let members = send(&app, Method::GET, "/admin/members", None, Some(&boss)).await;
    assert_eq!(members.status, StatusCode::OK);
    assert_eq!(members.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_can_remove_a_member() {
    let (_tmp, state) = setup();
    let alice = add_user(&state, "alice", UserRole::User);
    add_user(&state, "boss", UserRole::Admin);
    let app = app_for(&state);
    let alice_cookie = login(&app, "alice").await;
    let boss = login(&app, "boss").await;

    let uri = format!("/admin/members/{}", alice.id);
    let removed = send(&app, Method::DELETE, &uri, None, Some(&boss)).await;
    assert_eq!(removed.status, StatusCode::OK);

    let gone = send(&app, Method::DELETE, &uri, None, Some(&boss)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    // Sessions went with the account
    let me = send(&app, Method::GET, "/check_session", None, Some(&alice_cookie)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}
