use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ACCOUNT_ID, DEFAULT_API_KEY, REVOKED_API_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str, key: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, key)
        .body(String::new())
        .unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::AUTHORIZATION, DEFAULT_API_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn account_uri(resource: &str) -> String {
    format!("/api/investor/v1/accounts/{ACCOUNT_ID}/{resource}")
}

// --- auth ---

#[tokio::test]
async fn missing_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/investor/v1/loans/listing")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_key_returns_401() {
    let resp = app()
        .oneshot(get_request("/api/investor/v1/loans/listing", "nope"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoked_key_returns_403() {
    let resp = app()
        .oneshot(get_request("/api/investor/v1/loans/listing", REVOKED_API_KEY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn auth_failure_body_is_not_json() {
    let resp = app()
        .oneshot(get_request(&account_uri("summary"), "nope"))
        .await
        .unwrap();

    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}

// --- listing ---

#[tokio::test]
async fn listing_defaults_to_recent_loans() {
    let resp = app()
        .oneshot(get_request("/api/investor/v1/loans/listing", DEFAULT_API_KEY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["asOfDate"], "2014-09-03T14:41:53.959-07:00");
    assert_eq!(body["loans"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_show_all_returns_every_loan() {
    let resp = app()
        .oneshot(get_request(
            "/api/investor/v1/loans/listing?showAll=true",
            DEFAULT_API_KEY,
        ))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["loans"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_api_version_returns_404() {
    let resp = app()
        .oneshot(get_request("/api/investor/v9/loans/listing", DEFAULT_API_KEY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- account ---

#[tokio::test]
async fn summary_for_known_account() {
    let resp = app()
        .oneshot(get_request(&account_uri("summary"), DEFAULT_API_KEY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["investorId"], ACCOUNT_ID);
}

#[tokio::test]
async fn unknown_account_returns_404() {
    let resp = app()
        .oneshot(get_request(
            "/api/investor/v1/accounts/1/summary",
            DEFAULT_API_KEY,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_transfers_use_display_frequencies() {
    let resp = app()
        .oneshot(get_request(&account_uri("funds/pending"), DEFAULT_API_KEY))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["transfers"][0]["frequency"], "One Time");
    assert!(body["transfers"][0]["endDate"].is_null());
}

#[tokio::test]
async fn detailed_notes_carry_next_payment_date() {
    let resp = app()
        .oneshot(get_request(&account_uri("detailednotes"), DEFAULT_API_KEY))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert!(body["myNotes"][0]["nextPaymentDate"].is_string());
}

// --- portfolios ---

#[tokio::test]
async fn create_portfolio_then_list() {
    use tower::Service;

    let mut app = app().into_service();

    let req = json_request(
        &account_uri("portfolios"),
        &json!({"actorId": ACCOUNT_ID, "portfolioName": "Growth", "portfolioDescription": null})
            .to_string(),
    );
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["portfolioName"], "Growth");
    assert_eq!(created["portfolioId"], 22223);

    let req = get_request(&account_uri("portfolios"), DEFAULT_API_KEY);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(req)
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["myPortfolios"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn duplicate_portfolio_name_returns_400_with_errors() {
    let resp = app()
        .oneshot(json_request(
            &account_uri("portfolios"),
            &json!({"actorId": ACCOUNT_ID, "portfolioName": "Portfolio1"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "portfolio-name-exists");
}

// --- orders ---

#[tokio::test]
async fn orders_are_confirmed() {
    let resp = app()
        .oneshot(json_request(
            &account_uri("orders"),
            &json!({
                "aid": ACCOUNT_ID,
                "orders": [
                    {"loanId": 111111, "requestedAmount": 25.0},
                    {"loanId": 333333, "requestedAmount": 30.0, "portfolioId": 11111}
                ]
            })
            .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["orderInstructId"], 1);
    let confirmations = body["orderConfirmations"].as_array().unwrap();
    assert_eq!(confirmations[0]["executionStatus"][0], "ORDER_FULFILLED");
    assert_eq!(confirmations[1]["executionStatus"][0], "NOT_AN_INCREMENT_OF_25");
}

#[tokio::test]
async fn malformed_order_json_returns_422() {
    let resp = app()
        .oneshot(json_request(&account_uri("orders"), r#"{"aid": 1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- diagnostics ---

#[tokio::test]
async fn status_route_answers_with_requested_code() {
    let resp = app()
        .oneshot(get_request("/api/investor/v1/status/418", DEFAULT_API_KEY))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
}

#[tokio::test]
async fn echo_headers_omits_credential() {
    let req = Request::builder()
        .uri("/api/investor/v1/echo/headers")
        .header(http::header::AUTHORIZATION, DEFAULT_API_KEY)
        .header(http::header::ACCEPT, "application/json")
        .header(http::header::USER_AGENT, "test-agent")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["accept"], "application/json");
    assert_eq!(body["userAgent"], "test-agent");
    assert!(body.get("authorization").is_none());
}
