use std::sync::Arc;

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use http_body_util::BodyExt;
use hotel_server::{
    app,
    config::ServerConfig,
    db,
    mailer::MemoryMailer,
    models::{Booking, Inquiry, Review, Room, User},
    routes::{AuthResponse, MessageResponse},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    state: AppState,
    mailer: Arc<MemoryMailer>,
}

impl TestApp {
    fn new() -> Self {
        let mailer = Arc::new(MemoryMailer::new());
        let state = AppState::with_mailer(&ServerConfig::default(), mailer.clone()).unwrap();
        Self { state, mailer }
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        app(self.state.clone()).oneshot(request).await.unwrap()
    }

    async fn admin_token(&self) -> String {
        let id = self
            .state
            .seed_admin("admin@hotel.test", "admin-pass")
            .await
            .unwrap();
        self.state.tokens.issue(id).unwrap()
    }

    async fn register(&self, name: &str, email: &str) -> AuthResponse {
        let resp = self
            .send(json_request(
                "POST",
                "/api/v1/auth/register",
                None,
                json!({"user": {"name": name, "email": email, "password": "secret-pw"}}),
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    async fn create_room(&self, token: &str, room: Value) -> Room {
        let resp = self
            .send(json_request("POST", "/api/v1/rooms", Some(token), json!({ "room": room })))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn suite() -> Value {
    json!({
        "name": "Royal Suite",
        "description": "Two rooms with a balcony",
        "price": 250.0,
        "capacity": 4,
        "category": "suite",
        "is_featured": true
    })
}

fn single() -> Value {
    json!({
        "name": "Single",
        "description": "Compact room",
        "price": 80.0,
        "capacity": 1,
        "category": "standard"
    })
}

// --- rooms ---

#[tokio::test]
async fn list_rooms_empty() {
    let t = TestApp::new();
    let resp = t.send(get("/api/v1/rooms", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rooms: Vec<Room> = body_json(resp).await;
    assert!(rooms.is_empty());
}

#[tokio::test]
async fn create_room_without_token_returns_401() {
    let t = TestApp::new();
    let resp = t
        .send(json_request("POST", "/api/v1/rooms", None, json!({ "room": suite() })))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "missing authorization header");
}

#[tokio::test]
async fn create_room_as_guest_returns_403() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/rooms",
            Some(&guest.token),
            json!({ "room": suite() }),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn room_lifecycle() {
    let t = TestApp::new();
    let admin = t.admin_token().await;

    let created = t.create_room(&admin, suite()).await;
    assert_eq!(created.name, "Royal Suite");
    assert_eq!(created.status, hotel_server::models::RoomStatus::Available);
    assert!(created.is_featured);

    // update uses PUT
    let resp = t
        .send(json_request(
            "PUT",
            &format!("/api/v1/rooms/{}", created.id),
            Some(&admin),
            json!({"room": {"price": 275.5, "status": "maintenance"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Room = body_json(resp).await;
    assert_eq!(updated.price, 275.5);
    assert_eq!(updated.name, "Royal Suite");
    assert_eq!(updated.status, hotel_server::models::RoomStatus::Maintenance);

    let resp = t.send(get(&format!("/api/v1/rooms/{}", created.id), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = t
        .send(delete(&format!("/api/v1/rooms/{}", created.id), &admin))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = t.send(get(&format!("/api/v1/rooms/{}", created.id), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], format!("room {} not found", created.id));
}

#[tokio::test]
async fn room_patch_is_not_routed() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, suite()).await;
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/rooms/{}", room.id),
            Some(&admin),
            json!({"room": {"price": 1.0}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn create_room_missing_column_returns_422() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/rooms",
            Some(&admin),
            json!({"room": {"name": "Nameless"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn featured_and_filters() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let suite = t.create_room(&admin, suite()).await;
    let single = t.create_room(&admin, single()).await;

    let rooms: Vec<Room> = body_json(t.send(get("/api/v1/rooms/featured", None)).await).await;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, suite.id);

    let rooms: Vec<Room> =
        body_json(t.send(get("/api/v1/rooms?max_price=100", None)).await).await;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, single.id);

    let rooms: Vec<Room> =
        body_json(t.send(get("/api/v1/rooms?category=suite&capacity=2", None)).await).await;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, suite.id);

    let rooms: Vec<Room> =
        body_json(t.send(get("/api/v1/rooms?capacity=5", None)).await).await;
    assert!(rooms.is_empty());
}

// --- inquiries ---

#[tokio::test]
async fn inquiry_defaults_to_pending() {
    let t = TestApp::new();
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/inquiries",
            None,
            json!({"inquiry": {
                "name": "Bo",
                "email": "bo@example.com",
                "subject": "Late check-in",
                "message": "Can I arrive at midnight?"
            }}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let inquiry: Inquiry = body_json(resp).await;
    assert_eq!(inquiry.status, "pending");

    let admin = t.admin_token().await;
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/inquiries/{}", inquiry.id),
            Some(&admin),
            json!({"inquiry": {"status": "resolved"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Inquiry = body_json(resp).await;
    assert_eq!(updated.status, "resolved");
    assert_eq!(updated.subject, "Late check-in");

    let resp = t.send(get("/api/v1/inquiries", Some(&admin))).await;
    let all: Vec<Inquiry> = body_json(resp).await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn inquiries_list_requires_admin() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t.send(get("/api/v1/inquiries", Some(&guest.token))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn inquiry_without_envelope_returns_422() {
    let t = TestApp::new();
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/inquiries",
            None,
            json!({"name": "Bo", "email": "bo@example.com"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- bookings ---

#[tokio::test]
async fn booking_lifecycle() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, suite()).await;
    let guest = t.register("Ana", "ana@example.com").await;

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/bookings",
            Some(&guest.token),
            json!({"booking": {
                "room_id": room.id,
                "check_in": "2024-07-01",
                "check_out": "2024-07-04",
                "guests": 2
            }}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booking: Booking = body_json(resp).await;
    assert_eq!(booking.total_price, 750.0);
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.user_id, guest.user.id);
    assert!(booking.payment_method.is_none());

    // payment details via PATCH
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/bookings/{}", booking.id),
            Some(&guest.token),
            json!({"booking": {"payment_method": "card", "payment_status": "paid"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let paid: Booking = body_json(resp).await;
    assert_eq!(paid.payment_method.as_deref(), Some("card"));
    assert_eq!(paid.payment_status.as_deref(), Some("paid"));
    assert_eq!(paid.total_price, 750.0);

    // shortening the stay re-prices it
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/bookings/{}", booking.id),
            Some(&guest.token),
            json!({"booking": {"check_out": "2024-07-02"}}),
        ))
        .await;
    let shorter: Booking = body_json(resp).await;
    assert_eq!(shorter.total_price, 250.0);

    // guests may cancel but not confirm
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/bookings/{}", booking.id),
            Some(&guest.token),
            json!({"booking": {"status": "confirmed"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/bookings/{}", booking.id),
            Some(&admin),
            json!({"booking": {"status": "confirmed"}}),
        ))
        .await;
    let confirmed: Booking = body_json(resp).await;
    assert_eq!(confirmed.status, "confirmed");

    // a different guest can't see it
    let other = t.register("Bo", "bo@example.com").await;
    let resp = t
        .send(get(&format!("/api/v1/bookings/{}", booking.id), Some(&other.token)))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let mine: Vec<Booking> = body_json(t.send(get("/api/v1/bookings", Some(&other.token))).await).await;
    assert!(mine.is_empty());

    let all: Vec<Booking> = body_json(t.send(get("/api/v1/bookings", Some(&admin))).await).await;
    assert_eq!(all.len(), 1);

    let resp = t
        .send(delete(&format!("/api/v1/bookings/{}", booking.id), &guest.token))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn booking_rejects_inverted_dates() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, suite()).await;
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/bookings",
            Some(&guest.token),
            json!({"booking": {
                "room_id": room.id,
                "check_in": "2024-07-04",
                "check_out": "2024-07-04"
            }}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "check_out must be after check_in");
}

#[tokio::test]
async fn booking_rejects_too_many_guests() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, single()).await;
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/bookings",
            Some(&guest.token),
            json!({"booking": {
                "room_id": room.id,
                "check_in": "2024-07-01",
                "check_out": "2024-07-02",
                "guests": 3
            }}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn booking_for_missing_room_returns_404() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/bookings",
            Some(&guest.token),
            json!({"booking": {
                "room_id": 99,
                "check_in": "2024-07-01",
                "check_out": "2024-07-02"
            }}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- reviews ---

#[tokio::test]
async fn reviews_nested_under_room() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, suite()).await;
    let guest = t.register("Ana", "ana@example.com").await;

    let resp = t
        .send(json_request(
            "POST",
            &format!("/api/v1/rooms/{}/reviews", room.id),
            Some(&guest.token),
            json!({"review": {"rating": 5, "comment": "Lovely view"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review: Review = body_json(resp).await;
    assert_eq!(review.room_id, room.id);
    assert_eq!(review.user_id, guest.user.id);

    let for_room: Vec<Review> = body_json(
        t.send(get(&format!("/api/v1/rooms/{}/reviews", room.id), None))
            .await,
    )
    .await;
    assert_eq!(for_room.len(), 1);

    let by_user: Vec<Review> = body_json(
        t.send(get(&format!("/api/v1/reviews?user_id={}", guest.user.id), None))
            .await,
    )
    .await;
    assert_eq!(by_user.len(), 1);
    let by_nobody: Vec<Review> =
        body_json(t.send(get("/api/v1/reviews?user_id=999", None)).await).await;
    assert!(by_nobody.is_empty());

    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/reviews/{}", review.id),
            Some(&guest.token),
            json!({"review": {"rating": 4}}),
        ))
        .await;
    let updated: Review = body_json(resp).await;
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.comment, "Lovely view");

    let other = t.register("Bo", "bo@example.com").await;
    let resp = t
        .send(delete(&format!("/api/v1/reviews/{}", review.id), &other.token))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn review_rating_out_of_range_returns_422() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let room = t.create_room(&admin, suite()).await;
    let resp = t
        .send(json_request(
            "POST",
            &format!("/api/v1/rooms/{}/reviews", room.id),
            Some(&admin),
            json!({"review": {"rating": 6, "comment": "Too good"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- users ---

#[tokio::test]
async fn user_updates_self_with_json() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/users/{}", guest.user.id),
            Some(&guest.token),
            json!({"user": {"phone": "+44 20 7946 0000"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.phone.as_deref(), Some("+44 20 7946 0000"));
    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn user_updates_avatar_with_multipart() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let boundary = "XyZboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"name\"\r\n\r\n\
         Ana Maria\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/v1/users/{}", guest.user.id))
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(http::header::AUTHORIZATION, format!("Bearer {}", guest.token))
        .body(Body::from(body))
        .unwrap();
    let resp = t.send(request).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Ana Maria");
    assert_eq!(
        user.avatar.as_deref(),
        Some(format!("/uploads/avatars/{}/me.png", guest.user.id).as_str())
    );

    let resp = t.send(get(user.avatar.as_deref().unwrap(), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "image/png");
    assert_eq!(&body_bytes(resp).await[..], b"PNGDATA");
}

fn avatar_upload(user_id: i64, token: &str, file_name: &str) -> Request<Body> {
    let boundary = "XyZboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"avatar\"; filename=\"{file_name}\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("PATCH")
        .uri(format!("/api/v1/users/{user_id}"))
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn avatar_file_name_cannot_escape_its_directory() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(avatar_upload(guest.user.id, &guest.token, "../../admin/me.png"))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    let expected = format!("/uploads/avatars/{}/me.png", guest.user.id);
    assert_eq!(user.avatar.as_deref(), Some(expected.as_str()));

    let resp = t.send(get(&expected, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn replaced_avatar_is_no_longer_served() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    t.send(avatar_upload(guest.user.id, &guest.token, "old.png")).await;
    t.send(avatar_upload(guest.user.id, &guest.token, "new.png")).await;

    let old = format!("/uploads/avatars/{}/old.png", guest.user.id);
    let resp = t.send(get(&old, None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let new = format!("/uploads/avatars/{}/new.png", guest.user.id);
    assert_eq!(t.send(get(&new, None)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejected_update_keeps_no_avatar() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let other = t.register("Bo", "bo@example.com").await;
    let resp = t
        .send(avatar_upload(other.user.id, &guest.token, "me.png"))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let path = format!("/uploads/avatars/{}/me.png", other.user.id);
    assert_eq!(t.send(get(&path, None)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn email_change_is_normalized_and_unique() {
    let t = TestApp::new();
    let ana = t.register("Ana", "ana@example.com").await;
    t.register("Bo", "bo@example.com").await;

    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/users/{}", ana.user.id),
            Some(&ana.token),
            json!({"user": {"email": "BO@example.com"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/users/{}", ana.user.id),
            Some(&ana.token),
            json!({"user": {"email": "  Ana.New@Example.COM "}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.email, "ana.new@example.com");

    // logging in with any casing reaches Ana, not someone else
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": "ANA.NEW@example.com", "password": "secret-pw"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let auth: AuthResponse = body_json(resp).await;
    assert_eq!(auth.user.id, ana.user.id);
}

#[tokio::test]
async fn blank_name_update_returns_422() {
    let t = TestApp::new();
    let ana = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/users/{}", ana.user.id),
            Some(&ana.token),
            json!({"user": {"name": "   "}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn guest_cannot_promote_self() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "PATCH",
            &format!("/api/v1/users/{}", guest.user.id),
            Some(&guest.token),
            json!({"user": {"role": "admin"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn users_admin_routes() {
    let t = TestApp::new();
    let admin = t.admin_token().await;
    let guest = t.register("Ana", "ana@example.com").await;

    let resp = t.send(get("/api/v1/users", Some(&guest.token))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let users: Vec<User> = body_json(t.send(get("/api/v1/users", Some(&admin))).await).await;
    assert_eq!(users.len(), 2);

    let resp = t
        .send(delete(&format!("/api/v1/users/{}", guest.user.id), &admin))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // the deleted user's token no longer authenticates
    let resp = t
        .send(get(&format!("/api/v1/users/{}", guest.user.id), Some(&guest.token)))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- auth ---

#[tokio::test]
async fn register_then_login() {
    let t = TestApp::new();
    let registered = t.register("Ana", "Ana@Example.com").await;
    assert_eq!(registered.user.email, "ana@example.com");
    assert_eq!(registered.user.role, "guest");

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": "ana@example.com", "password": "secret-pw"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: AuthResponse = body_json(resp).await;
    assert_eq!(login.user.id, registered.user.id);

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": "ana@example.com", "password": "wrong-pw"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_email_returns_422() {
    let t = TestApp::new();
    t.register("Ana", "ana@example.com").await;
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            json!({"user": {"name": "Other", "email": "ana@example.com", "password": "secret-pw"}}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn password_reset_flow() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/forgot_password",
            None,
            json!({"email": "ana@example.com"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let _: MessageResponse = body_json(resp).await;

    let outbox = t.mailer.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, "ana@example.com");
    assert_eq!(
        outbox[0].subject,
        "Password Reset Instructions - Hotel Management System by Sagheer Ahmad"
    );

    let stored = t.state.db.read().await.find("users", guest.user.id).unwrap();
    let token = stored["reset_password_token"].as_str().unwrap().to_string();
    assert!(outbox[0].body.contains(&format!(
        "http://localhost:5173/reset-password?email=ana%40example.com&token={token}"
    )));

    let reset = json!({"email": "ana@example.com", "token": token, "password": "new-secret"});
    let resp = t
        .send(json_request("POST", "/api/v1/auth/reset_password", None, reset.clone()))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // tokens are single use
    let resp = t
        .send(json_request("POST", "/api/v1/auth/reset_password", None, reset))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": "ana@example.com", "password": "new-secret"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn forgot_password_for_unknown_email_sends_nothing() {
    let t = TestApp::new();
    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/forgot_password",
            None,
            json!({"email": "nobody@example.com"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(t.mailer.outbox().is_empty());
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let t = TestApp::new();
    let guest = t.register("Ana", "ana@example.com").await;
    t.send(json_request(
        "POST",
        "/api/v1/auth/forgot_password",
        None,
        json!({"email": "ana@example.com"}),
    ))
    .await;

    let token = {
        let mut db = t.state.db.write().await;
        let sent_at = (chrono::Utc::now() - chrono::Duration::hours(3)).to_rfc3339();
        let row = db
            .update(
                "users",
                guest.user.id,
                db::to_row(&json!({ "reset_password_sent_at": sent_at })).unwrap(),
            )
            .unwrap();
        row["reset_password_token"].as_str().unwrap().to_string()
    };

    let resp = t
        .send(json_request(
            "POST",
            "/api/v1/auth/reset_password",
            None,
            json!({"email": "ana@example.com", "token": token, "password": "new-secret"}),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
