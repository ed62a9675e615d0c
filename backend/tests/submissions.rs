//! End-to-end tests for the submission endpoint, driven through the real
//! actix `App` with a temporary record store and an in-memory notifier.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use actix_web::{
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web, App,
};
use backend::{
    config::Config,
    notifier::{Notification, Notifier, NotifyError},
    state::AppState,
    storage::SubmissionStore,
};
use chrono::{DateTime, Local};
use futures_util::future::join_all;
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tempfile::TempDir;

const ENDPOINT: &str = "/form-handler.php";

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl Outbox {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for Outbox {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Transport("relay unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

struct Harness {
    dir: TempDir,
    outbox: Arc<Outbox>,
    state: web::Data<AppState>,
}

impl Harness {
    fn new(outbox: Outbox) -> Self {
        Self::with_vars(outbox, &[])
    }

    fn with_vars(outbox: Outbox, extra: &[(&str, String)]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut vars: HashMap<String, String> = HashMap::from([
            (
                "LEADS_DATA_DIR".to_string(),
                dir.path().join("data").display().to_string(),
            ),
            (
                "LEADS_SITE_DIR".to_string(),
                dir.path().join("public").display().to_string(),
            ),
        ]);
        for (key, value) in extra {
            vars.insert(key.to_string(), value.clone());
        }

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let outbox = Arc::new(outbox);
        let state = web::Data::new(AppState {
            store: Arc::new(SubmissionStore::new(&config.data_dir, &config.csv_file)),
            notifier: outbox.clone(),
            config,
        });

        Self { dir, outbox, state }
    }

    fn csv_file(&self) -> PathBuf {
        self.state.config.csv_file.clone()
    }

    async fn app(
        &self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
        let state = self.state.clone();
        test::init_service(App::new().configure(move |cfg| backend::configure(cfg, state))).await
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new(Outbox::default())
}

fn rows(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.deserialize().map(Result::unwrap).collect()
}

fn post_json(body: &Value) -> test::TestRequest {
    test::TestRequest::post().uri(ENDPOINT).set_json(body)
}

fn post_form(body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(ENDPOINT)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body.to_string())
}

fn location<B>(response: &ServiceResponse<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[rstest]
#[actix_web::test]
async fn valid_json_is_stored_and_mailed(harness: Harness) {
    let app = harness.app().await;
    let arrival = Local::now().timestamp();

    let response = test::call_service(
        &app,
        post_json(&json!({ "name": "Ada", "email": "ada@example.com", "phone": "555-1234" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "ok": true, "email_sent": true, "csv_saved": true }));

    let rows = rows(&harness.csv_file());
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row["name"], "Ada");
    assert_eq!(row["email"], "ada@example.com");
    assert_eq!(row["phone"], "555-1234");
    for column in ["date", "guests", "location", "referral", "source", "notes"] {
        assert_eq!(row[column], "", "column {column}");
    }

    let submitted_at = DateTime::parse_from_rfc3339(&row["submittedAt"]).unwrap();
    assert!(submitted_at.timestamp() >= arrival);
    assert_eq!(harness.outbox.count(), 1);
}

#[rstest]
#[actix_web::test]
async fn invalid_json_lists_every_violation(harness: Harness) {
    let app = harness.app().await;

    let response = test::call_service(
        &app,
        post_json(&json!({ "name": "", "email": "bad", "phone": "" })).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "ok": false,
            "error": "Validation failed",
            "fields": {
                "name": "Name is required.",
                "email": "Valid email is required.",
                "phone": "Phone is required."
            }
        })
    );
    assert!(!harness.csv_file().exists());
    assert_eq!(harness.outbox.count(), 0);
}

#[rstest]
#[case(json!({ "email": "ada@example.com", "phone": "555-1234" }), &["name"])]
#[case(json!({ "name": "Ada", "email": "ada@example", "phone": "555-1234" }), &["email"])]
#[case(json!({ "name": "Ada", "email": "ada@example.com" }), &["phone"])]
#[case(json!({ "name": "   ", "email": " <b></b> ", "phone": "555" }), &["name", "email"])]
#[actix_web::test]
async fn only_violated_fields_are_reported(
    harness: Harness,
    #[case] payload: Value,
    #[case] violated: &[&str],
) {
    let app = harness.app().await;

    let response = test::call_service(&app, post_json(&payload).to_request()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(response).await;
    let mut fields: Vec<&str> = body["fields"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    fields.sort_unstable();
    let mut expected = violated.to_vec();
    expected.sort_unstable();
    assert_eq!(fields, expected);
    assert!(!harness.csv_file().exists());
    assert_eq!(harness.outbox.count(), 0);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_an_empty_submission(harness: Harness) {
    let app = harness.app().await;

    let request = test::TestRequest::post()
        .uri(ENDPOINT)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"name\": \"Ada\",")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["fields"].as_object().unwrap().len(), 3);
}

#[rstest]
#[actix_web::test]
async fn form_post_redirects_on_success(harness: Harness) {
    let app = harness.app().await;

    let response = test::call_service(
        &app,
        post_form("name=Ada&email=ada%40example.com&phone=555-1234&guests=40").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "success.html?submitted=1");

    let rows = rows(&harness.csv_file());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["guests"], "40");
    assert_eq!(rows[0]["source"], "form");
}

#[rstest]
#[actix_web::test]
async fn form_post_redirects_on_validation_failure(harness: Harness) {
    let app = harness.app().await;

    let response = test::call_service(&app, post_form("name=Ada").to_request()).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "success.html?error=validation");
    assert!(!harness.csv_file().exists());
    assert_eq!(harness.outbox.count(), 0);
}

#[rstest]
#[actix_web::test]
async fn multipart_form_post_is_accepted(harness: Harness) {
    let app = harness.app().await;
    let boundary = "----leadform";
    let part = |name: &str, value: &str| {
        format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
    };
    let body = [
        part("name", "Ada"),
        part("email", "ada@example.com"),
        part("phone", "555-1234"),
        part("source", "booking"),
        format!("--{boundary}--\r\n"),
    ]
    .concat();

    let request = test::TestRequest::post()
        .uri(ENDPOINT)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "success.html?submitted=1");
    let rows = rows(&harness.csv_file());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["source"], "booking");
}

#[rstest]
#[actix_web::test]
async fn stored_values_are_sanitized_and_escaped(harness: Harness) {
    let app = harness.app().await;

    let response = test::call_service(
        &app,
        post_json(&json!({
            "name": "  O'Brien, \"Ada\"  ",
            "email": "ada@example.com",
            "phone": "555-1234",
            "notes": "<em>Vegan</em>, please\r\n\r\nand \"quiet\"",
            "guests": 12,
            "source": "quick-lead"
        }))
        .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = rows(&harness.csv_file());
    assert_eq!(rows[0]["name"], "O'Brien, \"Ada\"");
    assert_eq!(rows[0]["notes"], "Vegan, please and \"quiet\"");
    assert_eq!(rows[0]["guests"], "12");
    assert_eq!(rows[0]["source"], "quick-lead");

    let sent = harness.outbox.sent.lock().unwrap();
    assert!(sent[0].body.contains("Notes: Vegan, please and \"quiet\"\n"));
}

#[actix_web::test]
async fn mail_failure_is_reported_not_fatal() {
    let harness = Harness::new(Outbox::failing());
    let app = harness.app().await;

    let response = test::call_service(
        &app,
        post_json(&json!({ "name": "Ada", "email": "ada@example.com", "phone": "555-1234" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "ok": true, "email_sent": false, "csv_saved": true }));
    assert_eq!(rows(&harness.csv_file()).len(), 1);
}

#[actix_web::test]
async fn storage_failure_is_reported_not_fatal() {
    let blocked = TempDir::new().unwrap();
    let not_a_dir = blocked.path().join("data");
    fs::write(&not_a_dir, "").unwrap();
    let harness = Harness::with_vars(
        Outbox::default(),
        &[("LEADS_DATA_DIR", not_a_dir.display().to_string())],
    );
    let app = harness.app().await;

    let response = test::call_service(
        &app,
        post_json(&json!({ "name": "Ada", "email": "ada@example.com", "phone": "555-1234" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "ok": true, "email_sent": true, "csv_saved": false }));
    assert_eq!(harness.outbox.count(), 1);
}

#[rstest]
#[actix_web::test]
async fn concurrent_first_requests_share_one_header(harness: Harness) {
    let app = harness.app().await;

    let requests = (0..12).map(|i| {
        test::call_service(
            &app,
            post_json(&json!({
                "name": format!("Guest {i}"),
                "email": format!("guest{i}@example.com"),
                "phone": "555-0000"
            }))
            .to_request(),
        )
    });
    let responses = join_all(requests).await;
    assert!(responses.iter().all(|r| r.status() == StatusCode::OK));

    let contents = fs::read_to_string(harness.csv_file()).unwrap();
    assert_eq!(contents.matches("submittedAt").count(), 1);
    assert_eq!(rows(&harness.csv_file()).len(), 12);
}

#[actix_web::test]
async fn custom_success_page_and_endpoint() {
    let harness = Harness::with_vars(
        Outbox::default(),
        &[
            ("LEADS_ENDPOINT_PATH", "/api/leads".to_string()),
            ("LEADS_SUCCESS_REDIRECT", "/thanks.html".to_string()),
        ],
    );
    let app = harness.app().await;

    let request = test::TestRequest::post()
        .uri("/api/leads")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("name=Ada&email=ada%40example.com&phone=1")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/thanks.html?submitted=1");
}

#[actix_web::test]
async fn static_site_is_served() {
    let harness = Harness::new(Outbox::default());
    let site = harness.dir.path().join("public");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("index.html"), "<h1>Soulful Kitchen</h1>").unwrap();
    fs::write(site.join("success.html"), "<h1>Thank you</h1>").unwrap();
    let app = harness.app().await;

    let index = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(test::read_body(index).await, "<h1>Soulful Kitchen</h1>");

    let success =
        test::call_service(&app, test::TestRequest::get().uri("/success.html").to_request()).await;
    assert_eq!(success.status(), StatusCode::OK);
}
