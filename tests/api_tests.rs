//! API integration tests
//!
//! These run against a live server with the default configuration:
//! `cargo run`, then `cargo test -- --ignored`.

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8000/api/v1";
const DOCS_URL: &str = "http://localhost:8000";

fn api_key() -> String {
    std::env::var("API_KEY").unwrap_or_else(|_| "dev-api-key-change-me".to_string())
}

/// Unique suffix so tests can run repeatedly against the same database
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .subsec_nanos();
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_secs();
    format!("{}-{}{}", prefix, secs, nanos)
}

async fn create_test_user(client: &Client) -> Value {
    let username = unique("user");
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "first_name": "Test",
            "last_name": "User"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["user"].clone()
}

async fn create_test_book(client: &Client, copies: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "title": unique("Test Book"),
            "copies_count": copies
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["book"].clone()
}

async fn delete_book(client: &Client, book_id: i64) {
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
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
async fn test_missing_api_key_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "API Key required");
}

#[tokio::test]
#[ignore]
async fn test_wrong_api_key_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("x-api-key", "definitely-not-the-key")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid API Key");
}

#[tokio::test]
#[ignore]
async fn test_openapi_routes_are_open() {
    let client = Client::new();

    let response = client
        .get(format!("{}/api-docs/openapi.json", DOCS_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["paths"].is_object());
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_copies() {
    let client = Client::new();

    let title = unique("1984");
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "title": title,
            "year_published": 1949,
            "copies_count": 3
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("created successfully with 3 copies"));

    let book = &body["book"];
    assert_eq!(book["total_copies"], 3);
    assert_eq!(book["available_copies_count"], 3);
    assert_eq!(book["borrowed_copies_count"], 0);
    assert_eq!(book["is_available"], true);
    assert_eq!(book["availability_status"], "Fully available");

    delete_book(&client, book["id"].as_i64().expect("No book ID")).await;
}

#[tokio::test]
#[ignore]
async fn test_book_validation() {
    let client = Client::new();

    // Empty title and out-of-range copies count
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "title": "",
            "copies_count": 51
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected() {
    let client = Client::new();

    // ISBNs are 13 characters; build one from the unique suffix
    let digits = unique("")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>();
    let isbn = format!("{:0>13}", &digits[digits.len().saturating_sub(13)..]);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "title": unique("First"),
            "isbn": isbn,
            "copies_count": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["book"]["id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "title": unique("Second"),
            "isbn": isbn,
            "copies_count": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("already exists"));

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let user_id = user["id"].as_i64().expect("No user ID");

    let book = create_test_book(&client, 1).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    // Borrow the copy
    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Copy borrowed successfully");

    let details = &body["borrowing_details"];
    assert_eq!(details["copy_id"], copy_id);

    // Due date is the borrow date plus the 30 day loan period
    let borrowed_at = NaiveDate::parse_from_str(
        details["borrowed_at"].as_str().expect("No borrowed_at"),
        "%Y-%m-%d",
    )
    .expect("Bad borrowed_at");
    let due_date =
        NaiveDate::parse_from_str(details["due_date"].as_str().expect("No due_date"), "%Y-%m-%d")
            .expect("Bad due_date");
    assert_eq!((due_date - borrowed_at).num_days(), 30);

    // The book now shows the copy as borrowed
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["availability_status"], "Not available");
    assert_eq!(body["borrowed_copies_count"], 1);
    assert_eq!(body["borrowed_copies"][0]["copy_id"], copy_id);
    assert_eq!(body["borrowed_copies"][0]["is_overdue"], false);

    // A second borrow of the same copy is refused
    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Return the copy
    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book returned successfully");
    assert_eq!(body["return_details"]["copy_id"], copy_id);

    // Returning again fails: no open borrowing left
    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // The copy is available again
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["availability_status"], "Fully available");

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrowing_one_of_many_copies() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let user_id = user["id"].as_i64().expect("No user ID");

    let book = create_test_book(&client, 3).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Exactly the borrowed copy flips; the other two stay available
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["availability_status"], "2 of 3 available");
    assert_eq!(body["available_copies_count"], 2);
    assert_eq!(body["borrowed_copies_count"], 1);
    assert_eq!(body["borrowed_copies"][0]["copy_id"], copy_id);
    for copy in body["available_copies"].as_array().expect("Expected an array") {
        assert_ne!(copy["id"], copy_id);
        assert_eq!(copy["status"], "available");
    }

    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_requires_user_header() {
    let client = Client::new();

    let book = create_test_book(&client, 1).await;
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    delete_book(&client, book["id"].as_i64().expect("No book ID")).await;
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_copy_is_not_found() {
    let client = Client::new();

    let user = create_test_user(&client).await;

    let response = client
        .post(format!("{}/copies/999999999/borrow", BASE_URL))
        .header("x-api-key", api_key())
        .header("x-user-id", user["id"].as_i64().expect("No user ID").to_string())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_copy_status_lifecycle() {
    let client = Client::new();

    let book = create_test_book(&client, 1).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    // Mark damaged
    let response = client
        .put(format!("{}/copies/{}/status", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .json(&json!({ "status": "damaged" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "damaged");

    // A damaged copy cannot be borrowed
    let user = create_test_user(&client).await;
    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user["id"].as_i64().expect("No user ID").to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Borrowed is reserved for the borrow flow
    let response = client
        .put(format!("{}/copies/{}/status", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .json(&json!({ "status": "borrowed" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Back to available
    let response = client
        .put(format!("{}/copies/{}/status", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .json(&json!({ "status": "available" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_create_user() {
    let client = Client::new();

    let username = unique("reader");
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "first_name": "Ada",
            "last_name": "Lovelace",
            "phone": "+44 20 7946 0102"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["full_name"], "Ada Lovelace");
    assert_eq!(body["user"]["active"], true);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_username_is_rejected() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let username = user["username"].as_str().expect("No username");

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "username": username,
            "email": format!("other-{}@example.com", username),
            "first_name": "Other",
            "last_name": "Person"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_rejected() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let email = user["email"].as_str().expect("No email");

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "username": unique("other"),
            "email": email,
            "first_name": "Other",
            "last_name": "Person"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
#[ignore]
async fn test_user_validation() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("x-api-key", api_key())
        .json(&json!({
            "username": "ab",
            "email": "not-an-email",
            "first_name": "",
            "last_name": "User"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_update_user_and_deactivation_guard() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let user_id = user["id"].as_i64().expect("No user ID");

    let book = create_test_book(&client, 1).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    // Borrow, so deactivation is blocked
    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .put(format!("{}/users/{}", BASE_URL, user_id))
        .header("x-api-key", api_key())
        .json(&json!({ "active": false }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("must be returned before deactivation"));

    // Return and deactivate
    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .put(format!("{}/users/{}", BASE_URL, user_id))
        .header("x-api-key", api_key())
        .json(&json!({ "active": false, "phone": "+1 555 0100" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["active"], false);
    assert_eq!(body["phone"], "+1 555 0100");

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_user_borrowing_history() {
    let client = Client::new();

    let user = create_test_user(&client).await;
    let user_id = user["id"].as_i64().expect("No user ID");

    let book = create_test_book(&client, 1).await;
    let book_id = book["id"].as_i64().expect("No book ID");
    let title = book["title"].as_str().expect("No title");
    let copy_id = book["available_copies"][0]["id"]
        .as_i64()
        .expect("No copy ID");

    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/users/{}/borrowings", BASE_URL, user_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body.as_array().expect("Expected an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["book_title"], title);
    assert_eq!(entries[0]["is_active"], true);
    assert_eq!(entries[0]["is_overdue"], false);

    // After the return the entry stays, marked inactive
    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/users/{}/borrowings", BASE_URL, user_id))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body[0]["is_active"], false);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_overdue_listing() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrowings/overdue", BASE_URL))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body.as_array().expect("Expected an array");

    // A fresh borrowing is never overdue, so nothing created by these
    // tests shows up here; entries that do must all be past due.
    for entry in entries {
        assert_eq!(entry["is_overdue"], true);
        assert!(entry["days_until_due"].as_i64().expect("No days_until_due") < 0);
    }
}

#[tokio::test]
#[ignore]
async fn test_unknown_user_history_is_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users/999999999/borrowings", BASE_URL))
        .header("x-api-key", api_key())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
