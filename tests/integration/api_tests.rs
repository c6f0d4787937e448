//! API integration tests
//!
//! These run against a live server seeded with the default admin account.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@motac.gov.my",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@motac.gov.my",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_equipment_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_email_application_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Create a draft
    let response = client
        .post(format!("{}/email-applications", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "service_status": "permanent",
            "purpose": "New officer mailbox",
            "proposed_email": "officer@motac.gov.my",
            "certification_accepted": true
        }))
        .send()
        .await
        .expect("Failed to create draft");
    assert_eq!(response.status(), 201);

    let draft: Value = response.json().await.expect("Failed to parse draft");
    assert_eq!(draft["status"], "draft");
    let id = draft["id"].as_i64().expect("No id");

    // Submit it
    let response = client
        .post(format!("{}/email-applications/{}/submit", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to submit");
    assert!(response.status().is_success());

    let submitted: Value = response.json().await.expect("Failed to parse");
    assert_eq!(submitted["status"], "pending_support");
    assert_eq!(submitted["approvals"][0]["stage"], "support");
    assert_eq!(submitted["approvals"][0]["decision"], "pending");

    // A second submit conflicts
    let response = client
        .post(format!("{}/email-applications/{}/submit", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send second submit");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_submission_without_certification_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/email-applications", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "service_status": "contract",
            "purpose": "Contractor mailbox"
        }))
        .send()
        .await
        .expect("Failed to create draft");
    let draft: Value = response.json().await.expect("Failed to parse draft");
    let id = draft["id"].as_i64().expect("No id");

    let response = client
        .post(format!("{}/email-applications/{}/submit", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to submit");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert!(body["fields"]["certification_accepted"].is_array());
}

/// Helper to register a laptop unit, returning its id
async fn create_laptop(client: &Client, token: &str, serial: &str) -> i64 {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "asset_type": "laptop",
            "brand": "Dell",
            "serial_number": serial
        }))
        .send()
        .await
        .expect("Failed to create equipment");
    assert_eq!(response.status(), 201);

    let unit: Value = response.json().await.expect("Failed to parse equipment");
    unit["id"].as_i64().expect("No id")
}

/// Helper that takes a one-laptop loan application through both approval
/// stages, returning its id
async fn approved_loan_application(client: &Client, token: &str) -> i64 {
    let today = chrono::Utc::now().date_naive();
    let response = client
        .post(format!("{}/loan-applications", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "purpose": "Field audit",
            "location": "Putrajaya",
            "loan_start_date": today.to_string(),
            "loan_end_date": (today + chrono::Duration::days(5)).to_string(),
            "applicant_confirmed": true,
            "items": [{"equipment_type": "laptop", "quantity": 1}]
        }))
        .send()
        .await
        .expect("Failed to create draft");
    assert_eq!(response.status(), 201);
    let draft: Value = response.json().await.expect("Failed to parse draft");
    let id = draft["id"].as_i64().expect("No id");

    let response = client
        .post(format!("{}/loan-applications/{}/submit", BASE_URL, id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to submit");
    assert!(response.status().is_success());

    // Support stage, then admin stage
    for _ in 0..2 {
        let response = client
            .post(format!("{}/loan-applications/{}/decision", BASE_URL, id))
            .bearer_auth(token)
            .json(&json!({ "decision": "approved" }))
            .send()
            .await
            .expect("Failed to decide");
        assert!(response.status().is_success());
    }
    id
}

#[tokio::test]
#[ignore]
async fn test_loan_issued_exactly_once_then_returned() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let serial = format!("SN-A-{}", chrono::Utc::now().timestamp_micros());
    let unit = create_laptop(&client, &token, &serial).await;
    let id = approved_loan_application(&client, &token).await;

    let response = client
        .post(format!("{}/loan-applications/{}/issue", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "equipment_ids": [unit] }))
        .send()
        .await
        .expect("Failed to issue");
    assert!(response.status().is_success());

    let issued: Value = response.json().await.expect("Failed to parse");
    assert_eq!(issued["status"], "issued");
    assert_eq!(issued["transactions"].as_array().unwrap().len(), 1);

    // The unit now reads as out
    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, unit))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get equipment");
    let body: Value = response.json().await.expect("Failed to parse equipment");
    assert_eq!(body["effective_availability"], "on_loan");

    // While out, the stored availability is not editable
    let response = client
        .put(format!("{}/equipment/{}", BASE_URL, unit))
        .bearer_auth(&token)
        .json(&json!({ "availability_status": "under_maintenance" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(response.status(), 409);

    // A second issuance of the same application conflicts
    let response = client
        .post(format!("{}/loan-applications/{}/issue", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "equipment_ids": [unit] }))
        .send()
        .await
        .expect("Failed to send second issue");
    assert_eq!(response.status(), 409);

    // Return closes every transaction and releases the unit
    let response = client
        .post(format!("{}/loan-applications/{}/return", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "condition": "good" }))
        .send()
        .await
        .expect("Failed to return");
    assert!(response.status().is_success());

    let returned: Value = response.json().await.expect("Failed to parse");
    assert_eq!(returned["status"], "returned");
    for transaction in returned["transactions"].as_array().unwrap() {
        assert!(!transaction["returned_at"].is_null());
    }

    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, unit))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get equipment");
    let body: Value = response.json().await.expect("Failed to parse equipment");
    assert_eq!(body["effective_availability"], "available");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_issuance_has_one_winner() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let serial = format!("SN-B-{}", chrono::Utc::now().timestamp_micros());
    let unit = create_laptop(&client, &token, &serial).await;
    let first = approved_loan_application(&client, &token).await;
    let second = approved_loan_application(&client, &token).await;

    let issue = |id: i64| {
        let client = &client;
        let token = &token;
        async move {
            client
                .post(format!("{}/loan-applications/{}/issue", BASE_URL, id))
                .bearer_auth(token)
                .json(&json!({ "equipment_ids": [unit] }))
                .send()
                .await
                .expect("Failed to send issue")
                .status()
        }
    };
    let (a, b) = tokio::join!(issue(first), issue(second));

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|s| s.is_success()).count(), 1);
    assert_eq!(outcomes.iter().filter(|s| s.as_u16() == 409).count(), 1);
}

#[tokio::test]
#[ignore]
async fn test_stored_availability_cannot_be_set_to_on_loan() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let serial = format!("SN-C-{}", chrono::Utc::now().timestamp_micros());
    let unit = create_laptop(&client, &token, &serial).await;

    let response = client
        .put(format!("{}/equipment/{}", BASE_URL, unit))
        .bearer_auth(&token)
        .json(&json!({ "availability_status": "on_loan" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert!(body["fields"]["availability_status"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_fingerprint_import_reports_bad_rows() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let sheet = "nric,date,check_in,check_out\n\
999999-99-9999,2024-06-03,08:00,17:00\n";

    let response = client
        .post(format!(
            "{}/fingerprints/import?file_name=test.csv",
            BASE_URL
        ))
        .bearer_auth(&token)
        .header("content-type", "text/csv")
        .body(sheet)
        .send()
        .await
        .expect("Failed to import");
    assert!(response.status().is_success());

    let job: Value = response.json().await.expect("Failed to parse job");
    assert_eq!(job["status"], "completed_with_errors");
    assert_eq!(job["failure_count"], 1);
    assert_eq!(job["failures"][0]["row"], 1);
}
