//! End-to-end tests driving the router in-process against an in-memory
//! database, a fixed clock and a notifier that records codes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use stockbook_api::clock::Clock;
use stockbook_api::mailer::{EmailError, OtpNotifier};
use stockbook_api::{router, ApiConfig, AppState};
use stockbook_db::{Database, DbConfig};

const ORIGIN: &str = "http://localhost:5173";

// =============================================================================
// Fixtures
// =============================================================================

struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    fn last_code(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("no OTP sent to this address")
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send_otp(&self, to: &str, code: &str, _ttl_minutes: i64) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::InvalidAddress(to.to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    db: Database,
    clock: Arc<TestClock>,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let start = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let clock = Arc::new(TestClock(Mutex::new(start)));
        let notifier = Arc::new(RecordingNotifier::default());

        let state = AppState::new(
            &ApiConfig::default(),
            db.clone(),
            notifier.clone(),
            clock.clone(),
        );
        let router = router(state, &[ORIGIN.to_string()]);

        TestApp {
            router,
            db,
            clock,
            notifier,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn api(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.api(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.api(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.api(Method::PUT, uri, Some(body)).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/register",
            json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    async fn add_product(&self, name: &str, quantity: i64, price: f64) -> Value {
        let (status, body) = self
            .post(
                "/add-product",
                json!({ "name": name, "quantity": quantity, "price": price }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    async fn save_bill(&self, bill_date: &str, email: &str, lines: &[(&str, i64)]) -> (StatusCode, Value) {
        let order: Vec<Value> = lines
            .iter()
            .map(|(name, qty)| {
                json!({ "productName": name, "price": 10, "quantity": qty, "totalPrice": 10 * qty })
            })
            .collect();
        let total: i64 = lines.iter().map(|(_, qty)| 10 * qty).sum();

        self.post(
            "/save-bill",
            json!({
                "customer": { "name": "Walk-in", "mobile": "0300-1234567", "email": email },
                "billDate": bill_date,
                "order": order,
                "total": total,
            }),
        )
        .await
    }

    async fn product_quantity(&self, name: &str) -> i64 {
        let (_, products) = self.get("/products").await;
        products
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == name)
            .and_then(|p| p["quantity"].as_i64())
            .unwrap()
    }
}

// =============================================================================
// OTP Login
// =============================================================================

#[tokio::test]
async fn otp_login_succeeds_once() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;

    let (status, body) = app
        .post("/login-with-otp", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "otp-sent" }));

    let code = app.notifier.last_code("asha@shop.pk");
    assert_eq!(code.len(), 6);

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": code }))
        .await;
    assert_eq!(body, json!({ "status": "success" }));

    let (status, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": code }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "error", "message": "OTP not sent" }));
}

#[tokio::test]
async fn otp_request_rejects_bad_credentials_alike() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;

    let (_, wrong_password) = app
        .post("/login-with-otp", json!({ "email": "asha@shop.pk", "password": "nope" }))
        .await;
    let (_, unknown_email) = app
        .post("/login-with-otp", json!({ "email": "ghost@shop.pk", "password": "s3cret" }))
        .await;

    assert_eq!(wrong_password, json!({ "status": "invalid" }));
    assert_eq!(unknown_email, wrong_password);
    assert_eq!(app.notifier.sent_count(), 0);
}

#[tokio::test]
async fn otp_verify_after_six_minutes_is_expired() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;
    app.post("/login-with-otp", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    let code = app.notifier.last_code("asha@shop.pk");

    app.clock.advance(Duration::minutes(6));

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": code }))
        .await;
    assert_eq!(body, json!({ "status": "expired", "message": "OTP expired" }));

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": code }))
        .await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn otp_wrong_code_keeps_pending_code() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;
    app.post("/login-with-otp", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    let code = app.notifier.last_code("asha@shop.pk");
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": wrong }))
        .await;
    assert_eq!(body, json!({ "status": "invalid", "message": "Invalid OTP" }));

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": code }))
        .await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn second_otp_request_replaces_first_code() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;
    let credentials = json!({ "email": "asha@shop.pk", "password": "s3cret" });

    app.post("/login-with-otp", credentials.clone()).await;
    let first = app.notifier.last_code("asha@shop.pk");
    app.post("/login-with-otp", credentials).await;
    let second = app.notifier.last_code("asha@shop.pk");

    if first != second {
        let (_, body) = app
            .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": first }))
            .await;
        assert_eq!(body["status"], "invalid");
    }

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": second }))
        .await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn failed_delivery_leaves_no_pending_code() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;
    app.notifier.set_failing(true);

    let (status, body) = app
        .post("/login-with-otp", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_ERROR");

    let (_, body) = app
        .post("/verify-login-otp", json!({ "email": "asha@shop.pk", "otp": "123456" }))
        .await;
    assert_eq!(body["status"], "error");
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn legacy_login_distinguishes_outcomes() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;

    let cases = [
        ("asha@shop.pk", "s3cret", "success"),
        ("asha@shop.pk", "wrong", "incorrect password"),
        ("ghost@shop.pk", "s3cret", "no record exists"),
    ];
    for (email, password, expected) in cases {
        let (status, body) = app
            .post("/login", json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(expected));
    }
}

#[tokio::test]
async fn register_returns_account_without_hash() {
    let app = TestApp::new().await;

    let (status, body) = app.register("Asha", "asha@shop.pk", "s3cret").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "asha@shop.pk");
    assert_eq!(body["name"], "Asha");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn duplicate_registration_fails_and_keeps_one_account() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;

    let (status, body) = app.register("Imposter", "asha@shop.pk", "other").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DUPLICATE");
    assert_eq!(app.db.admins().count().await.unwrap(), 1);

    let (_, body) = app
        .post("/login", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    assert_eq!(body, json!("success"));
}

#[tokio::test]
async fn register_requires_fields() {
    let app = TestApp::new().await;

    let (status, body) = app.register("", "asha@shop.pk", "s3cret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app.register("Asha", "not-an-email", "s3cret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.db.admins().count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_admin_changes_password_only_when_given() {
    let app = TestApp::new().await;
    app.register("Asha", "asha@shop.pk", "s3cret").await;

    let (status, body) = app
        .put("/update-admin", json!({ "email": "asha@shop.pk", "name": "Asha K", "password": "" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success" }));
    let (_, body) = app
        .post("/login", json!({ "email": "asha@shop.pk", "password": "s3cret" }))
        .await;
    assert_eq!(body, json!("success"));

    app.put(
        "/update-admin",
        json!({ "email": "asha@shop.pk", "name": "Asha K", "password": "n3w" }),
    )
    .await;
    let (_, body) = app
        .post("/login", json!({ "email": "asha@shop.pk", "password": "n3w" }))
        .await;
    assert_eq!(body, json!("success"));

    let account = app.db.admins().find_by_email("asha@shop.pk").await.unwrap().unwrap();
    assert_eq!(account.name, "Asha K");
}

#[tokio::test]
async fn update_admin_unknown_email_is_404() {
    let app = TestApp::new().await;

    let (status, body) = app
        .put("/update-admin", json!({ "email": "ghost@shop.pk", "name": "Ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": "error", "message": "no record exists" }));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn product_crud() {
    let app = TestApp::new().await;

    let created = app.add_product("Case", 5, 12.5).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Case");
    assert_eq!(created["quantity"], 5);
    assert_eq!(created["price"].as_f64(), Some(12.5));

    let (status, updated) = app
        .put(
            &format!("/update-product/{id}"),
            json!({ "name": "Phone Case", "quantity": 8, "price": 15 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["name"], "Phone Case");
    assert_eq!(updated["price"].as_f64(), Some(15.0));

    let (_, products) = app.get("/products").await;
    assert_eq!(products.as_array().unwrap().len(), 1);

    let (status, body) = app
        .api(Method::DELETE, &format!("/delete-product/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Product deleted successfully" }));

    let (_, products) = app.get("/products").await;
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_product_ids_are_404() {
    let app = TestApp::new().await;

    let (status, body) = app
        .put(
            "/update-product/missing",
            json!({ "name": "Case", "quantity": 1, "price": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.api(Method::DELETE, "/delete-product/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_product_input_is_400() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/add-product", json!({ "name": "Case", "quantity": -1, "price": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/add-product", json!({ "name": "  ", "quantity": 1, "price": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/add-product", json!({ "name": "Case", "quantity": "lots", "price": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, products) = app.get("/products").await;
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn add_product_accepts_form_strings() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/add-product", json!({ "name": "Case", "quantity": "5", "price": "10" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["price"], 10.0);

    let id = body["id"].as_str().unwrap().to_string();
    let (status, body) = app
        .put(
            &format!("/update-product/{id}"),
            json!({ "name": "Case", "quantity": "3", "price": "12.5" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.product_quantity("Case").await, 3);
}

// =============================================================================
// Bills
// =============================================================================

#[tokio::test]
async fn oversold_bill_clamps_stock_at_zero() {
    let app = TestApp::new().await;
    app.add_product("Case", 5, 10.0).await;

    let (status, body) = app
        .save_bill("2025-03-14T10:00:00.000Z", "c@shop.pk", &[("Case", 7)])
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Bill saved & inventory updated successfully!");
    assert_eq!(body["adjusted"], 1);
    assert!(body["billId"].as_str().is_some());

    assert_eq!(app.product_quantity("Case").await, 0);

    let (_, bills) = app.get("/bills").await;
    let bills = bills.as_array().unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0]["order"][0]["quantity"], 7);
    assert_eq!(bills[0]["customer"]["email"], "c@shop.pk");
}

#[tokio::test]
async fn unknown_product_line_is_stored_and_skipped() {
    let app = TestApp::new().await;
    app.add_product("Case", 5, 10.0).await;

    let (status, body) = app
        .save_bill("2025-03-14", "", &[("Ghost", 2), ("Case", 1)])
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["adjusted"], 1);
    assert_eq!(body["skipped"], json!(["Ghost"]));

    assert_eq!(app.product_quantity("Case").await, 4);

    let (_, bills) = app.get("/bills").await;
    let order = &bills[0]["order"];
    assert_eq!(order[0]["productName"], "Ghost");
    assert_eq!(order[0]["quantity"], 2);
    assert_eq!(order[1]["productName"], "Case");
}

#[tokio::test]
async fn malformed_bill_writes_nothing() {
    let app = TestApp::new().await;
    app.add_product("Case", 5, 10.0).await;

    let (status, body) = app
        .save_bill("2025-03-14", "", &[("Case", 1), ("", 1)])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post("/save-bill", json!({ "order": [{ "price": 10, "quantity": 1 }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/save-bill")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, bills) = app.get("/bills").await;
    assert!(bills.as_array().unwrap().is_empty());
    assert_eq!(app.product_quantity("Case").await, 5);
}

#[tokio::test]
async fn huge_line_quantity_is_rejected() {
    let app = TestApp::new().await;
    app.add_product("A", 5, 1.0).await;

    let (status, body) = app
        .post(
            "/save-bill",
            json!({
                "billDate": "2025-03-14",
                "order": [{ "productName": "A", "price": 1, "quantity": i64::MAX, "totalPrice": 1 }],
                "total": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app.save_bill("2025-03-14", "", &[("A", 1_000_000_000)]).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.save_bill("2025-03-15", "", &[("A", 1)]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, ranking) = app.get("/top-selling-products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranking[0]["name"], "A");
    assert_eq!(ranking[0]["quantitySold"], 1_000_000_001_i64);

    let (status, _) = app.get("/dashboard-summary?month=2025-03").await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn top_selling_products_ranking() {
    let app = TestApp::new().await;
    app.add_product("A", 10, 1.0).await;
    app.add_product("B", 1, 1.0).await;
    app.add_product("C", 0, 1.0).await;

    app.save_bill("2025-03-01", "", &[("A", 3), ("B", 1)]).await;
    app.save_bill("2025-03-02", "", &[("A", 2)]).await;

    let (status, body) = app.get("/top-selling-products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "name": "A", "quantitySold": 5, "quantityInStock": 5, "isOutOfStock": false },
            { "name": "B", "quantitySold": 1, "quantityInStock": 0, "isOutOfStock": true },
            { "name": "C", "quantitySold": 0, "quantityInStock": 0, "isOutOfStock": true },
        ])
    );
}

#[tokio::test]
async fn top_selling_products_window() {
    let app = TestApp::new().await;
    app.add_product("A", 10, 1.0).await;

    app.save_bill("2025-02-10", "", &[("A", 4)]).await;
    app.save_bill("2025-03-10", "", &[("A", 1)]).await;

    let (_, body) = app.get("/top-selling-products?month=2025-03").await;
    assert_eq!(body[0]["quantitySold"], 1);

    let (_, body) = app.get("/top-selling-products?year=2025").await;
    assert_eq!(body[0]["quantitySold"], 5);

    let (status, body) = app.get("/top-selling-products?month=2025-13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn sales_report_groups_by_month_and_year() {
    let app = TestApp::new().await;

    app.save_bill("2024-12-31T23:00:00", "", &[("A", 1)]).await;
    app.save_bill("2025-03-01", "", &[("A", 2)]).await;
    app.save_bill("2025-03-20 09:15", "", &[("A", 3)]).await;
    app.save_bill("sometime", "", &[("A", 100)]).await;

    let (status, body) = app.get("/sales-report").await;
    assert_eq!(status, StatusCode::OK);

    let monthly = body["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0]["monthKey"], "2024-12");
    assert_eq!(monthly[1]["monthKey"], "2025-03");
    assert_eq!(monthly[1]["monthLabel"], "Mar 2025");
    assert_eq!(monthly[1]["total"].as_f64(), Some(50.0));
    assert_eq!(monthly[1]["start"], "2025-03-01");
    assert_eq!(monthly[1]["end"], "2025-03-31");

    let yearly = body["yearly"].as_array().unwrap();
    assert_eq!(yearly[0]["year"], 2024);
    assert_eq!(yearly[1]["year"], 2025);
}

#[tokio::test]
async fn dashboard_defaults_to_current_month() {
    let app = TestApp::new().await;
    app.add_product("A", 10, 1.0).await;

    app.save_bill("2025-02-27", "old@shop.pk", &[("A", 1)]).await;
    app.save_bill("2025-03-02", "a@shop.pk", &[("A", 2)]).await;
    app.save_bill("2025-03-05", "a@shop.pk", &[("A", 1)]).await;
    app.save_bill("2025-03-09", "", &[("A", 1)]).await;

    let (status, body) = app.get("/dashboard-summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthKey"], "2025-03");
    assert_eq!(body["totalRevenue"].as_f64(), Some(50.0));
    assert_eq!(body["monthlyRevenue"].as_f64(), Some(40.0));
    assert_eq!(body["monthlyOrders"], 3);
    assert_eq!(body["monthlyCustomers"], 1);
    assert_eq!(body["monthlyTarget"].as_f64(), Some(50_000.0));
    assert_eq!(body["milestones"], 0);
    assert_eq!(body["topSellers"][0]["quantitySold"], 4);

    let (_, body) = app.get("/dashboard-summary?month=2025-02").await;
    assert_eq!(body["monthlyOrders"], 1);

    let (status, _) = app.get("/dashboard-summary?month=Feb").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health / CORS
// =============================================================================

#[tokio::test]
async fn health_reports_database_and_migrations() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["migrations"]["applied"], body["migrations"]["total"]);
}

#[tokio::test]
async fn health_degrades_when_database_closed() {
    let app = TestApp::new().await;
    app.db.close().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn cors_allows_only_configured_origins() {
    let app = TestApp::new().await;

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/products")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.router.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let response = app
        .router
        .clone()
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
